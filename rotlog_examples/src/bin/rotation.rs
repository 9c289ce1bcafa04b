//! example_rotation — демонстрация ротации логов по размеру

use rotlog::{debugf, errorf, infof, warningf, Config, Level, Logger};
use std::thread;
use std::time::Duration;

const APP_NAME: &str = "example_rotation";
const APP_VERSION: &str = "1.0.0";

// Минимальный порог — 1 МБ, поэтому сообщений нужно много
const MAX_LOG_SIZE_MB: u64 = 1;
const MAX_LOG_FILES: usize = 3;

fn main() {
    let config = Config::new("logs", "rotation")
        .file_size(MAX_LOG_SIZE_MB)
        .file_num(MAX_LOG_FILES)
        .level(Level::Debug);
    let logger = match Logger::new(config) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("[FATAL] Cannot initialize logger: {}", e);
            std::process::exit(1);
        }
    };

    infof!(logger, "Starting {} v{}", APP_NAME, APP_VERSION);
    debugf!(
        logger,
        "Logger initialized with filesize={}MB, filenum={}",
        MAX_LOG_SIZE_MB,
        MAX_LOG_FILES
    );

    // Ротированные файлы получают суффикс с секундой ротации,
    // поэтому между пачками делаем паузу
    for round in 0..5 {
        for i in 0..15_000 {
            debugf!(logger, "round {} message number {:05} {:->24}", round, i, "");
            if i % 5000 == 0 {
                warningf!(logger, "Warning message at iteration {}", i);
            }
        }
        errorf!(logger, "Round {} done", round);
        logger.flush();
        thread::sleep(Duration::from_millis(1100));
    }

    infof!(logger, "Check 'logs/' directory: at most {} rotated files remain", MAX_LOG_FILES);
    logger.close();
}
