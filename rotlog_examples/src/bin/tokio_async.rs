// example_tokio — асинхронный пример с tokio и общим Logger
// Макросы не ждут диска: в async-коде их можно вызывать напрямую

use rotlog::{debugf, errorf, infof, warningf, Config, Level, Logger};
use std::sync::Arc;
use tokio::task;
use tokio::time::{sleep, Duration};

const APP_NAME: &str = "example_tokio";
const APP_VERSION: &str = "1.0.0";

pub struct Worker {
    id: u32,
    log: Arc<Logger>,
}

impl Worker {
    pub fn new(id: u32, log: Arc<Logger>) -> Self {
        Self { id, log }
    }

    pub async fn run(&self) {
        debugf!(self.log, "Worker {} started (async)", self.id);

        sleep(Duration::from_millis(50 + (self.id as u64) * 100)).await;

        if self.id % 3 == 0 {
            warningf!(self.log, "Worker {} has high priority task", self.id);
        }
        if self.id == 2 {
            errorf!(self.log, "Worker {} failed to process data", self.id);
        }

        debugf!(self.log, "Worker {} completed", self.id);
    }
}

#[tokio::main]
async fn main() {
    let config = Config::new("logs", "tokio").file_size(1).file_num(5).level(Level::Debug);
    let logger = match Logger::new(config) {
        Ok(l) => Arc::new(l),
        Err(e) => {
            eprintln!("[FATAL] Cannot initialize logger: {}", e);
            std::process::exit(1);
        }
    };

    infof!(logger, "Starting {} v{}", APP_NAME, APP_VERSION);

    let mut handles = vec![];
    for i in 0..5 {
        let log = Arc::clone(&logger);
        handles.push(task::spawn(async move {
            Worker::new(i, log).run().await;
        }));
    }
    for h in handles {
        let _ = h.await;
    }

    // close() ждёт фоновый поток: из async-контекста — через spawn_blocking
    let log = Arc::clone(&logger);
    let _ = task::spawn_blocking(move || {
        infof!(log, "{} finished successfully", APP_NAME);
        log.close();
    })
    .await;
}
