use rotlog::{gdebug, ginfo, ginfof, gwarningf, Config, Error, Level};
use std::fs;
use tempfile::TempDir;

// Глобальный логгер один на процесс, поэтому весь сценарий в одном тесте
#[test]
fn global_handle_lifecycle() {
    // До init всё идёт в консоль и ничего не теряется
    assert!(rotlog::global().is_none());
    assert!(rotlog::enabled(Level::Debug));
    gdebug!("before init", 1, 2.5);
    rotlog::close();

    let dir = TempDir::new().unwrap();
    rotlog::init(Config::new(dir.path(), "global").level(Level::Info)).unwrap();
    assert!(rotlog::global().is_some());
    assert!(!rotlog::enabled(Level::Debug));

    let again = rotlog::init(Config::new(dir.path(), "other"));
    assert!(matches!(again, Err(Error::AlreadyInitialized)));
    assert!(!dir.path().join("other.log").exists());

    gdebug!("filtered");
    ginfo!("service", "started");
    ginfof!("pid={} workers={}", 4242u32, 8);
    gwarningf!("missing {} and {}", "one");
    rotlog::close();

    let content = fs::read_to_string(dir.path().join("global.log")).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].ends_with(":0024  service started"));
    assert!(lines[1].ends_with(" INFO global.rs:0025 pid=4242 workers=8"));
    assert!(lines[2].ends_with("missing one and {!missing}"));
    assert!(!content.contains("filtered"));
}
