use std::io;
use thiserror::Error;

/// Ошибки создания логгера. Запись в лог сама по себе ошибок не возвращает.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unknown log level: {0}")]
    UnknownLevel(String),

    #[error("global logger is already initialized")]
    AlreadyInitialized,

    #[error("broker forwarding requested but rotlog was built without the `kafka` feature")]
    BrokerUnsupported,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
