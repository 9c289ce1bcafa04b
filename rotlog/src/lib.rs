//! Асинхронный логгер с ротацией файлов по размеру.
//!
//! Вызывающий поток только фильтрует по уровню и кладёт запись в ограниченную
//! очередь. Форматирование, запись, ротация и удаление старых файлов делает
//! один фоновый поток. По желанию каждая записанная строка зеркалируется
//! в брокер сообщений (feature `kafka` или свой [`Publisher`]).
//!
//! ```no_run
//! use rotlog::{infof, warning, Config, Level, Logger};
//!
//! let logger = Logger::new(Config::new("logs", "server").level(Level::Info))?;
//! infof!(logger, "listening on {}:{}", "0.0.0.0", 8080);
//! warning!(logger, "disk usage", 91.5, "%");
//! logger.close();
//! # Ok::<(), rotlog::Error>(())
//! ```

mod clock;
mod config;
mod diag;
mod error;
pub mod format;
mod forward;
mod level;
mod logger;
mod macros;
pub mod policy;
mod pool;
mod record;
mod sink;
mod worker;

pub use clock::{Clock, Stamp, SystemClock};
pub use config::Config;
pub use error::{Error, Result};
#[cfg(feature = "kafka")]
pub use forward::KafkaPublisher;
pub use forward::{BatchPolicy, PublishError, Publisher};
pub use level::Level;
pub use logger::{Builder, Logger};
pub use pool::{BufferPool, PooledBuffer};
pub use record::{Arg, CallSite, LogRecord};

use once_cell::sync::OnceCell;

// ===== Глобальный логгер =====

static GLOBAL_LOGGER: OnceCell<Logger> = OnceCell::new();

/// Создаёт глобальный логгер. Повторный вызов — `Error::AlreadyInitialized`.
pub fn init(config: Config) -> Result<()> {
    if GLOBAL_LOGGER.get().is_some() {
        return Err(Error::AlreadyInitialized);
    }
    let logger = Logger::new(config)?;
    // Гонка двух init: проигравший логгер просто закрывается
    GLOBAL_LOGGER
        .set(logger)
        .map_err(|_| Error::AlreadyInitialized)
}

pub fn global() -> Option<&'static Logger> {
    GLOBAL_LOGGER.get()
}

/// Дожидается записи всего, что было поставлено в очередь глобального логгера.
pub fn close() {
    if let Some(logger) = GLOBAL_LOGGER.get() {
        logger.close();
    }
}

/// До `init` пропускается всё: записи печатаются в консоль.
#[inline]
pub fn enabled(level: Level) -> bool {
    GLOBAL_LOGGER.get().map_or(true, |logger| logger.enabled(level))
}

pub fn log(record: LogRecord) {
    match GLOBAL_LOGGER.get() {
        Some(logger) => logger.log(record),
        None => logger::write_console_default(&record),
    }
}
