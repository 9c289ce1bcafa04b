use crossbeam_channel::{select, tick, Receiver, Sender};
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::clock::{Clock, Stamp};
use crate::config::Settings;
use crate::diag::Diagnostics;
use crate::format::format_record;
use crate::forward::Forwarder;
use crate::level::Level;
use crate::policy;
use crate::pool::BufferPool;
use crate::record::{LogRecord, QueueItem};
use crate::sink::FileSink;

// ===== Фоновый writer =====

/// Единственный потребитель очереди. Только он трогает файл и счётчик байт,
/// поэтому блокировки вокруг файлового состояния не нужны.
pub(crate) struct Worker {
    settings: Settings,
    sink: FileSink,
    forwarder: Option<Forwarder>,
    pool: Arc<BufferPool>,
    clock: Arc<dyn Clock>,
    diag: Diagnostics,
}

impl Worker {
    pub fn new(
        settings: Settings,
        sink: FileSink,
        forwarder: Option<Forwarder>,
        pool: Arc<BufferPool>,
        clock: Arc<dyn Clock>,
        diag: Diagnostics,
    ) -> Self {
        Worker {
            settings,
            sink,
            forwarder,
            pool,
            clock,
            diag,
        }
    }

    pub fn spawn(self, rx: Receiver<QueueItem>) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("rotlog-writer".into())
            .spawn(move || self.run(rx))
    }

    pub fn run(mut self, rx: Receiver<QueueItem>) {
        while let Ok(item) = rx.recv() {
            if !self.handle(item) {
                break;
            }
        }
        self.flush();
    }

    /// `false` — пора завершаться.
    pub fn handle(&mut self, item: QueueItem) -> bool {
        match item {
            QueueItem::Record(record) => self.write(&record),
            QueueItem::Flush => self.on_tick(),
            QueueItem::Sync(ack) => {
                self.on_tick();
                let _ = ack.send(());
            }
            QueueItem::Shutdown => return false,
        }
        true
    }

    fn write(&mut self, record: &LogRecord) {
        if policy::should_rotate(self.sink.written(), self.settings.max_bytes) {
            self.rotate();
        }

        let now = self.clock.now();
        let mut buf = self.pool.acquire();
        format_record(record, &Stamp::from_datetime(&now), &mut buf);

        if let Err(e) = self.sink.append(&buf) {
            self.report(Level::Error, || format!("log write failed: {}", e));
        }
        if let Some(ref forwarder) = self.forwarder {
            forwarder.forward(&buf);
        }
    }

    fn rotate(&mut self) {
        let name = policy::rotated_name(&self.settings.base_name, &self.clock.now());
        let rotated = self.settings.dir.join(name);
        if let Err(e) = self.sink.rotate(&rotated) {
            self.report(Level::Error, || {
                format!("log rotation to {} failed: {}", rotated.display(), e)
            });
        }

        let failures = policy::prune(
            &self.settings.dir,
            &self.settings.base_name,
            self.settings.max_files,
        );
        for (path, e) in failures {
            self.report(Level::Warning, || {
                format!("failed to remove {}: {}", path.display(), e)
            });
        }
    }

    fn on_tick(&mut self) {
        match self.sink.recover_if_missing() {
            Ok(true) => {
                let path = self.sink.path().display().to_string();
                self.report(Level::Warning, || format!("log file {} recreated", path));
            }
            Ok(false) => {}
            Err(e) => {
                let path = self.sink.path().display().to_string();
                self.report(Level::Error, || format!("cannot reopen {}: {}", path, e));
            }
        }
        self.flush();
    }

    fn flush(&mut self) {
        if let Err(e) = self.sink.flush() {
            self.report(Level::Error, || format!("log flush failed: {}", e));
        }
    }

    fn report<F: FnOnce() -> String>(&mut self, level: Level, msg: F) {
        if self.diag.is_enabled() {
            self.diag.report(level, &msg());
        }
    }
}

// ===== Таймер сброса буфера =====

/// Раз в `interval` кладёт `Flush` в общую очередь. Останавливается, когда
/// закрыт `stop` или некому больше читать очередь.
pub(crate) fn spawn_ticker(
    tx: Sender<QueueItem>,
    interval: Duration,
    stop: Receiver<()>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("rotlog-ticker".into())
        .spawn(move || {
            let ticker = tick(interval);
            loop {
                select! {
                    recv(ticker) -> _ => {
                        if tx.send(QueueItem::Flush).is_err() {
                            break;
                        }
                    }
                    recv(stop) -> _ => break,
                }
            }
        })
}
