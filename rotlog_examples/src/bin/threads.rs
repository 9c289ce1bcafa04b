// example_threads — многопоточный пример: несколько потоков пишут в один логгер
// через Arc, запись в файл идёт в фоновом потоке

use rotlog::{debugf, errorf, infof, warningf, Config, Level, Logger};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const APP_NAME: &str = "example_threads";
const APP_VERSION: &str = "1.1.0";

pub struct Worker {
    id: u32,
    log: Arc<Logger>,
}

impl Worker {
    pub fn new(id: u32, log: Arc<Logger>) -> Self {
        Self { id, log }
    }

    pub fn run(&self) {
        debugf!(self.log, "Worker {} started execution", self.id);

        for step in 0..1000 {
            debugf!(self.log, "Worker {} step {:04}", self.id, step);
        }
        thread::sleep(Duration::from_millis(50 + (self.id as u64) * 100));

        if self.id % 2 == 1 {
            warningf!(self.log, "Worker {} detected odd workload", self.id);
        }
        if self.id == 2 {
            errorf!(self.log, "Worker {} encountered a transient error", self.id);
        }

        debugf!(self.log, "Worker {} finished", self.id);
    }
}

fn main() {
    let config = Config::new("logs", "threads")
        .file_size(1)
        .file_num(5)
        .level(Level::Debug)
        .syslog(true);
    let logger = match Logger::new(config) {
        Ok(l) => Arc::new(l),
        Err(e) => {
            eprintln!("[FATAL] Cannot initialize logger: {}", e);
            std::process::exit(1);
        }
    };

    infof!(logger, "Starting {} v{}", APP_NAME, APP_VERSION);

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let log = Arc::clone(&logger);
            thread::spawn(move || Worker::new(i, log).run())
        })
        .collect();

    for h in handles {
        let _ = h.join();
    }

    infof!(logger, "All workers have finished, {} records still queued", logger.queued());
    logger.close();
}
