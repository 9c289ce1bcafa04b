use chrono::{DateTime, Local, TimeZone};
use parking_lot::Mutex;
use rotlog::{
    debugf, errorf, info, infof, Clock, Config, Level, Logger, PublishError, Publisher,
};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

const MIB: u64 = 1024 * 1024;

fn rotated_files(dir: &Path, base: &str) -> Vec<String> {
    let prefix = format!("{}.", base);
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .filter(|name| name.starts_with(&prefix))
        .collect();
    names.sort();
    names
}

struct SteppingClock(Mutex<DateTime<Local>>);

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Local> {
        let mut t = self.0.lock();
        *t += chrono::Duration::seconds(1);
        *t
    }
}

#[derive(Clone, Default)]
struct Mirror(Arc<Mutex<Vec<(String, Vec<u8>)>>>);

impl Publisher for Mirror {
    fn publish(&mut self, topic: &str, batch: &[Vec<u8>]) -> Result<(), PublishError> {
        let mut seen = self.0.lock();
        for msg in batch {
            seen.push((topic.to_owned(), msg.clone()));
        }
        Ok(())
    }
}

#[test]
fn rotation_and_retention_under_load() {
    let dir = TempDir::new().unwrap();
    let config = Config::new(dir.path(), "app")
        .file_size(1)
        .file_num(2)
        .level(Level::Info);
    let logger = Logger::new(config).unwrap();

    // ~83 байта на запись, ~1.6 МБ всего
    for i in 0..20_000 {
        infof!(logger, "record {:05} {}", i, "....................");
    }
    logger.close();

    let rotated = rotated_files(dir.path(), "app.log");
    assert!(!rotated.is_empty());
    assert!(rotated.len() <= 2);

    let active = fs::metadata(dir.path().join("app.log")).unwrap().len();
    assert!(active < MIB);

    let last = fs::read_to_string(dir.path().join("app.log")).unwrap();
    assert!(last.ends_with("record 19999 ....................\n"));
    assert!(last
        .lines()
        .all(|l| l.len() == 82 && l.contains(" INFO pipeline.rs:")));
}

#[test]
fn filtered_record_never_touches_queue_or_file() {
    let dir = TempDir::new().unwrap();
    let logger = Logger::new(Config::new(dir.path(), "quiet").level(Level::Warning)).unwrap();

    debugf!(logger, "val={}", 5);
    assert_eq!(logger.queued(), 0);
    logger.close();
    assert_eq!(fs::metadata(dir.path().join("quiet.log")).unwrap().len(), 0);

    errorf!(logger, "val={}", 5);
    logger.close();
    let content = fs::read_to_string(dir.path().join("quiet.log")).unwrap();
    assert!(content.contains(" ERROR pipeline.rs:"));
    assert!(content.ends_with(" val=5\n"));
}

#[test]
fn retention_keeps_newest_rotations() {
    let dir = TempDir::new().unwrap();
    let start = Local.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
    let logger = Logger::builder(Config::new(dir.path(), "svc").file_size(1).file_num(2))
        .clock(SteppingClock(Mutex::new(start)))
        .build()
        .unwrap();

    // ~4.5 МБ при пороге в 1 МБ: четыре ротации
    for i in 0..55_000 {
        infof!(logger, "record {:05} {}", i, "..................");
    }
    drop(logger);

    let rotated = rotated_files(dir.path(), "svc.log");
    assert_eq!(rotated.len(), 2);
    assert!(rotated.iter().all(|n| n.starts_with("svc.log.2024050")));
    assert!(rotated[0] < rotated[1]);

    // Оставшиеся файлы — самые свежие: последняя ротированная запись идёт
    // сразу перед первой записью активного файла
    let newest = fs::read_to_string(dir.path().join(&rotated[1])).unwrap();
    let active = fs::read_to_string(dir.path().join("svc.log")).unwrap();
    let last_rotated: u32 = newest.lines().last().unwrap()[56..61].parse().unwrap();
    let first_active: u32 = active.lines().next().unwrap()[56..61].parse().unwrap();
    assert_eq!(last_rotated + 1, first_active);
}

#[test]
fn publisher_receives_exact_file_bytes() {
    let dir = TempDir::new().unwrap();
    let mirror = Mirror::default();
    let config = Config::new(dir.path(), "mirrored").broker(Vec::<String>::new(), "audit");
    let logger = Logger::builder(config)
        .publisher(mirror.clone())
        .build()
        .unwrap();

    info!(logger, "user", "alice", "logged in");
    infof!(logger, "{} attempts left", 3);
    drop(logger);

    let file = fs::read(dir.path().join("mirrored.log")).unwrap();
    let seen = mirror.0.lock();
    assert_eq!(seen.len(), 2);
    assert!(seen.iter().all(|(topic, _)| topic == "audit"));
    let joined: Vec<u8> = seen.iter().flat_map(|(_, m)| m.iter().copied()).collect();
    assert_eq!(joined, file);
}

#[test]
fn reopening_continues_the_byte_count() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.log");
    fs::write(&path, vec![b'x'; 2 * MIB as usize]).unwrap();

    let logger = Logger::new(Config::new(dir.path(), "app").file_size(1).file_num(3)).unwrap();
    info!(logger, "first after restart");
    logger.close();

    // Существующий файл уже больше порога: первая же запись его ротирует
    let rotated = rotated_files(dir.path(), "app.log");
    assert_eq!(rotated.len(), 1);
    assert_eq!(fs::metadata(dir.path().join(&rotated[0])).unwrap().len(), 2 * MIB);
    let content = fs::read_to_string(&path).unwrap();
    assert!(content.ends_with("  first after restart\n"));
}

#[test]
fn concurrent_producers_block_on_full_queue_without_losing_records() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 5_000;

    let dir = TempDir::new().unwrap();
    let mut config = Config::new(dir.path(), "shared");
    config.queue_capacity = 4;
    let logger = Arc::new(Logger::new(config).unwrap());

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    infof!(logger, "t{} seq {:05}", t, i);
                    assert!(logger.queued() <= 4);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    logger.close();

    let content = fs::read_to_string(dir.path().join("shared.log")).unwrap();
    let mut next = [0usize; THREADS];
    let mut total = 0;
    for line in content.lines() {
        // 49 байт префикса + "tN seq NNNNN"
        assert_eq!(line.len(), 61, "torn line: {:?}", line);
        assert!(line[26..].starts_with(" INFO pipeline.rs:"));
        let (t, seq) = line[49..].split_once(" seq ").unwrap();
        let t: usize = t[1..].parse().unwrap();
        let seq: usize = seq.parse().unwrap();
        // Внутри одного потока порядок сохраняется
        assert_eq!(seq, next[t]);
        next[t] += 1;
        total += 1;
    }
    assert_eq!(total, THREADS * PER_THREAD);
    assert!(next.iter().all(|&n| n == PER_THREAD));
}
