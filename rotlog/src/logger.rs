use crossbeam_channel::{bounded, Sender};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::fs;
use std::io::{self, Write};
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::clock::{Clock, Stamp, SystemClock};
use crate::config::Config;
use crate::diag::Diagnostics;
use crate::error::Result;
use crate::format::format_record;
use crate::forward::{self, BatchPolicy, Forwarder, Publisher};
use crate::level::Level;
use crate::pool::BufferPool;
use crate::record::{LogRecord, QueueItem};
use crate::sink::FileSink;
use crate::worker::{spawn_ticker, Worker};

// ===== Консольный режим =====

static CONSOLE_LOCK: Mutex<()> = parking_lot::const_mutex(());
static CONSOLE_POOL: Lazy<Arc<BufferPool>> = Lazy::new(|| BufferPool::with_slots(8));

/// Синхронная запись в stdout. Используется в режиме отладки и до инициализации
/// глобального логгера; фильтра по уровню здесь нет.
pub(crate) fn write_console(pool: &Arc<BufferPool>, clock: &dyn Clock, record: &LogRecord) {
    let mut buf = pool.acquire();
    format_record(record, &Stamp::from_datetime(&clock.now()), &mut buf);

    let _guard = CONSOLE_LOCK.lock();
    let mut out = io::stdout().lock();
    let _ = out.write_all(&buf);
    let _ = out.flush();
}

pub(crate) fn write_console_default(record: &LogRecord) {
    write_console(&CONSOLE_POOL, &SystemClock, record);
}

// ===== Основной логгер =====

/// Точка входа в конвейер: фильтрует по уровню и ставит записи в очередь.
/// Сам файл принадлежит фоновому потоку.
pub struct Logger {
    config: Config,
    pool: Arc<BufferPool>,
    clock: Arc<dyn Clock>,
    pipeline: Option<Pipeline>,
}

struct Pipeline {
    tx: Sender<QueueItem>,
    stop_ticker: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
    ticker: Option<JoinHandle<()>>,
}

impl Logger {
    pub fn new(config: Config) -> Result<Self> {
        Builder::new(config).build()
    }

    pub fn builder(config: Config) -> Builder {
        Builder::new(config)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_debug(&self) -> bool {
        self.pipeline.is_none()
    }

    /// Пройдёт ли запись этого уровня. В режиме отладки — всегда.
    #[inline]
    pub fn enabled(&self, level: Level) -> bool {
        self.pipeline.is_none() || level >= self.config.level
    }

    /// Ставит запись в очередь; при полной очереди ждёт.
    pub fn log(&self, record: LogRecord) {
        match self.pipeline {
            None => write_console(&self.pool, self.clock.as_ref(), &record),
            Some(ref p) => {
                if record.level >= self.config.level {
                    // Writer уже остановлен: запись теряется молча
                    let _ = p.tx.send(QueueItem::Record(record));
                }
            }
        }
    }

    /// Сколько элементов ждёт в очереди.
    pub fn queued(&self) -> usize {
        self.pipeline.as_ref().map_or(0, |p| p.tx.len())
    }

    /// Дожидается, пока writer запишет всё, что было поставлено до вызова,
    /// и сбросит буфер на диск.
    pub fn flush(&self) {
        let Some(ref p) = self.pipeline else {
            let _ = io::stdout().flush();
            return;
        };
        let (ack_tx, ack_rx) = bounded(1);
        if p.tx.send(QueueItem::Sync(ack_tx)).is_ok() {
            let _ = ack_rx.recv();
        }
    }

    /// Сбрасывает буфер. Фоновый поток продолжает работать.
    pub fn close(&self) {
        self.flush();
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        let Some(mut p) = self.pipeline.take() else {
            return;
        };
        drop(p.stop_ticker.take());
        let _ = p.tx.send(QueueItem::Shutdown);
        if let Some(worker) = p.worker.take() {
            let _ = worker.join();
        }
        if let Some(ticker) = p.ticker.take() {
            let _ = ticker.join();
        }
    }
}

// ===== Сборка =====

pub struct Builder {
    config: Config,
    clock: Option<Arc<dyn Clock>>,
    publisher: Option<Box<dyn Publisher>>,
    batch: BatchPolicy,
}

impl Builder {
    pub fn new(config: Config) -> Self {
        Builder {
            config,
            clock: None,
            publisher: None,
            batch: BatchPolicy::default(),
        }
    }

    pub fn clock<C: Clock>(mut self, clock: C) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Свой клиент брокера вместо Kafka. Зеркалирование включается
    /// независимо от `kafka` в конфигурации, тема берётся из `topic`.
    /// В режиме отладки (`Config::debug`) файла нет, и клиент не используется.
    pub fn publisher<P: Publisher>(mut self, publisher: P) -> Self {
        self.publisher = Some(Box::new(publisher));
        self
    }

    pub fn batch_policy(mut self, batch: BatchPolicy) -> Self {
        self.batch = batch;
        self
    }

    pub fn build(self) -> Result<Logger> {
        let Builder {
            config,
            clock,
            publisher,
            batch,
        } = self;
        config.validate()?;

        let clock = clock.unwrap_or_else(|| Arc::new(SystemClock) as Arc<dyn Clock>);
        let pool = BufferPool::new();

        if config.debug {
            return Ok(Logger {
                config,
                pool,
                clock,
                pipeline: None,
            });
        }

        let settings = config.settings();
        fs::create_dir_all(&settings.dir)?;
        let sink = FileSink::open(settings.active_path(), settings.buffer_size)?;

        let mut diag = if config.syslog {
            Diagnostics::system(&config.file_name)
        } else {
            Diagnostics::disabled()
        };

        let forwarder = match publisher {
            Some(publisher) => Some(Forwarder::spawn(publisher, config.topic.clone(), batch)?),
            None if config.broker_enabled() => forward::broker_forwarder(&config, &mut diag)?,
            None => None,
        };

        let (tx, rx) = bounded(config.queue_capacity);
        let flush_interval = settings.flush_interval;
        let worker = Worker::new(
            settings,
            sink,
            forwarder,
            Arc::clone(&pool),
            Arc::clone(&clock),
            diag,
        )
        .spawn(rx)?;

        let (stop_tx, stop_rx) = bounded(0);
        let ticker = spawn_ticker(tx.clone(), flush_interval, stop_rx)?;

        Ok(Logger {
            config,
            pool,
            clock,
            pipeline: Some(Pipeline {
                tx,
                stop_ticker: Some(stop_tx),
                worker: Some(worker),
                ticker: Some(ticker),
            }),
        })
    }
}
