use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::level::Level;

const MEGABYTE: u64 = 1024 * 1024;

/// Настройки логгера. Имена полей совпадают с ключами конфигурационного файла.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Каталог для логов.
    pub dir: PathBuf,
    /// Базовое имя: активный файл `<dir>/<filename>.log`.
    #[serde(rename = "filename")]
    pub file_name: String,
    /// Порог ротации в мегабайтах.
    #[serde(rename = "filesize")]
    pub file_size: u64,
    /// Сколько ротированных файлов хранить.
    #[serde(rename = "filenum")]
    pub file_num: usize,
    pub level: Level,
    /// Синхронный вывод в консоль вместо файла.
    pub debug: bool,
    /// Адреса брокеров; пусто — зеркалирование выключено.
    pub kafka: Vec<String>,
    pub topic: String,
    /// Писать внутренние сбои логгера в системный журнал.
    pub syslog: bool,
    pub queue_capacity: usize,
    pub flush_interval_ms: u64,
    pub buffer_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            dir: PathBuf::from("logs"),
            file_name: "INFO".to_owned(),
            file_size: 100,
            file_num: 10,
            level: Level::Debug,
            debug: false,
            kafka: Vec::new(),
            topic: String::new(),
            syslog: false,
            queue_capacity: 1024,
            flush_interval_ms: 1000,
            buffer_size: 1024 * 1024,
        }
    }
}

impl Config {
    pub fn new<P: AsRef<Path>>(dir: P, file_name: &str) -> Self {
        Config {
            dir: dir.as_ref().to_path_buf(),
            file_name: file_name.to_owned(),
            ..Config::default()
        }
    }

    pub fn file_size(mut self, megabytes: u64) -> Self {
        self.file_size = megabytes;
        self
    }

    pub fn file_num(mut self, count: usize) -> Self {
        self.file_num = count;
        self
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    pub fn broker<I, S>(mut self, addrs: I, topic: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.kafka = addrs.into_iter().map(Into::into).collect();
        self.topic = topic.to_owned();
        self
    }

    pub fn syslog(mut self, enabled: bool) -> Self {
        self.syslog = enabled;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.debug {
            // В режиме отладки файл не открывается, проверять нечего
            return Ok(());
        }
        if self.file_name.is_empty() {
            return Err(Error::InvalidConfig("filename must not be empty".into()));
        }
        if self.file_name.contains(['/', '\\']) {
            return Err(Error::InvalidConfig(format!(
                "filename must be a bare name, got {:?}",
                self.file_name
            )));
        }
        if self.file_size == 0 {
            return Err(Error::InvalidConfig("filesize must be at least 1 MB".into()));
        }
        if self.queue_capacity == 0 {
            return Err(Error::InvalidConfig("queue_capacity must be positive".into()));
        }
        if self.flush_interval_ms == 0 {
            return Err(Error::InvalidConfig(
                "flush_interval_ms must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn broker_enabled(&self) -> bool {
        !self.kafka.is_empty() && !self.topic.is_empty()
    }

    pub(crate) fn settings(&self) -> Settings {
        Settings {
            dir: self.dir.clone(),
            base_name: format!("{}.log", self.file_name),
            max_bytes: self.file_size.saturating_mul(MEGABYTE),
            max_files: self.file_num,
            buffer_size: self.buffer_size.max(1),
            flush_interval: Duration::from_millis(self.flush_interval_ms),
        }
    }
}

/// Разрешённые параметры файлового приёмника, которыми владеет writer.
#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub dir: PathBuf,
    pub base_name: String,
    pub max_bytes: u64,
    pub max_files: usize,
    pub buffer_size: usize,
    pub flush_interval: Duration,
}

impl Settings {
    pub fn active_path(&self) -> PathBuf {
        self.dir.join(&self.base_name)
    }
}
