use crate::level::Level;

// ===== Системный журнал для собственных сбоев логгера =====

#[cfg(target_os = "linux")]
type SystemLogger = syslog::Logger<syslog::LoggerBackend, syslog::Formatter3164>;

/// Куда писать ошибки самого логгера (не удалось открыть, переименовать, удалить).
/// Вызывающий код их никогда не видит; по умолчанию они просто теряются.
pub(crate) struct Diagnostics {
    #[cfg(target_os = "linux")]
    system_logger: Option<SystemLogger>,
}

impl Diagnostics {
    pub fn disabled() -> Self {
        Diagnostics {
            #[cfg(target_os = "linux")]
            system_logger: None,
        }
    }

    #[cfg(target_os = "linux")]
    pub fn system(app_name: &str) -> Self {
        let formatter = syslog::Formatter3164 {
            facility: syslog::Facility::LOG_USER,
            hostname: None,
            process: app_name.to_owned(),
            pid: std::process::id(),
        };
        Diagnostics {
            system_logger: syslog::unix(formatter).ok(),
        }
    }

    #[cfg(not(target_os = "linux"))]
    pub fn system(_app_name: &str) -> Self {
        Self::disabled()
    }

    pub fn is_enabled(&self) -> bool {
        #[cfg(target_os = "linux")]
        {
            self.system_logger.is_some()
        }
        #[cfg(not(target_os = "linux"))]
        {
            false
        }
    }

    #[cfg(target_os = "linux")]
    pub fn report(&mut self, level: Level, msg: &str) {
        let Some(ref mut logger) = self.system_logger else {
            return;
        };
        let _ = match level {
            Level::Debug => logger.debug(msg),
            Level::Info => logger.info(msg),
            Level::Warning => logger.warning(msg),
            Level::Error => logger.err(msg),
            Level::Fatal => logger.crit(msg),
        };
    }

    #[cfg(not(target_os = "linux"))]
    pub fn report(&mut self, _level: Level, _msg: &str) {}
}
