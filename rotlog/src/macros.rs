// ===== Макросы =====
//
// `debug!(logger, a, b, c)` — значения через пробел,
// `debugf!(logger, "x={} y={}", a, b)` — подстановка в шаблон.
// Аргументы захватываются как `Arg` только если уровень проходит фильтр.

#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr $(, $arg:expr)* $(,)?) => {{
        let logger = &$logger;
        let level: $crate::Level = $level;
        if logger.enabled(level) {
            logger.log($crate::LogRecord::new(
                level,
                $crate::CallSite::new(file!(), line!()),
                vec![$($crate::Arg::from($arg)),*],
            ));
        }
    }};
}

#[macro_export]
macro_rules! logf {
    ($logger:expr, $level:expr, $template:expr $(, $arg:expr)* $(,)?) => {{
        let logger = &$logger;
        let level: $crate::Level = $level;
        if logger.enabled(level) {
            logger.log($crate::LogRecord::with_template(
                level,
                $crate::CallSite::new(file!(), line!()),
                $template,
                vec![$($crate::Arg::from($arg)),*],
            ));
        }
    }};
}

#[macro_export]
macro_rules! debug {
    ($logger:expr $(, $arg:expr)* $(,)?) => {
        $crate::log!($logger, $crate::Level::Debug $(, $arg)*)
    };
}
#[macro_export]
macro_rules! info {
    ($logger:expr $(, $arg:expr)* $(,)?) => {
        $crate::log!($logger, $crate::Level::Info $(, $arg)*)
    };
}
#[macro_export]
macro_rules! warning {
    ($logger:expr $(, $arg:expr)* $(,)?) => {
        $crate::log!($logger, $crate::Level::Warning $(, $arg)*)
    };
}
#[macro_export]
macro_rules! error {
    ($logger:expr $(, $arg:expr)* $(,)?) => {
        $crate::log!($logger, $crate::Level::Error $(, $arg)*)
    };
}
#[macro_export]
macro_rules! fatal {
    ($logger:expr $(, $arg:expr)* $(,)?) => {
        $crate::log!($logger, $crate::Level::Fatal $(, $arg)*)
    };
}

#[macro_export]
macro_rules! debugf {
    ($logger:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $crate::logf!($logger, $crate::Level::Debug, $template $(, $arg)*)
    };
}
#[macro_export]
macro_rules! infof {
    ($logger:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $crate::logf!($logger, $crate::Level::Info, $template $(, $arg)*)
    };
}
#[macro_export]
macro_rules! warningf {
    ($logger:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $crate::logf!($logger, $crate::Level::Warning, $template $(, $arg)*)
    };
}
#[macro_export]
macro_rules! errorf {
    ($logger:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $crate::logf!($logger, $crate::Level::Error, $template $(, $arg)*)
    };
}
#[macro_export]
macro_rules! fatalf {
    ($logger:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $crate::logf!($logger, $crate::Level::Fatal, $template $(, $arg)*)
    };
}

// ===== Глобальные макросы =====

#[macro_export]
macro_rules! glog {
    ($level:expr $(, $arg:expr)* $(,)?) => {{
        let level: $crate::Level = $level;
        if $crate::enabled(level) {
            $crate::log($crate::LogRecord::new(
                level,
                $crate::CallSite::new(file!(), line!()),
                vec![$($crate::Arg::from($arg)),*],
            ));
        }
    }};
}

#[macro_export]
macro_rules! glogf {
    ($level:expr, $template:expr $(, $arg:expr)* $(,)?) => {{
        let level: $crate::Level = $level;
        if $crate::enabled(level) {
            $crate::log($crate::LogRecord::with_template(
                level,
                $crate::CallSite::new(file!(), line!()),
                $template,
                vec![$($crate::Arg::from($arg)),*],
            ));
        }
    }};
}

#[macro_export]
macro_rules! gdebug {
    ($($arg:expr),* $(,)?) => { $crate::glog!($crate::Level::Debug $(, $arg)*) };
}
#[macro_export]
macro_rules! ginfo {
    ($($arg:expr),* $(,)?) => { $crate::glog!($crate::Level::Info $(, $arg)*) };
}
#[macro_export]
macro_rules! gwarning {
    ($($arg:expr),* $(,)?) => { $crate::glog!($crate::Level::Warning $(, $arg)*) };
}
#[macro_export]
macro_rules! gerror {
    ($($arg:expr),* $(,)?) => { $crate::glog!($crate::Level::Error $(, $arg)*) };
}
#[macro_export]
macro_rules! gfatal {
    ($($arg:expr),* $(,)?) => { $crate::glog!($crate::Level::Fatal $(, $arg)*) };
}

#[macro_export]
macro_rules! gdebugf {
    ($template:expr $(, $arg:expr)* $(,)?) => { $crate::glogf!($crate::Level::Debug, $template $(, $arg)*) };
}
#[macro_export]
macro_rules! ginfof {
    ($template:expr $(, $arg:expr)* $(,)?) => { $crate::glogf!($crate::Level::Info, $template $(, $arg)*) };
}
#[macro_export]
macro_rules! gwarningf {
    ($template:expr $(, $arg:expr)* $(,)?) => { $crate::glogf!($crate::Level::Warning, $template $(, $arg)*) };
}
#[macro_export]
macro_rules! gerrorf {
    ($template:expr $(, $arg:expr)* $(,)?) => { $crate::glogf!($crate::Level::Error, $template $(, $arg)*) };
}
#[macro_export]
macro_rules! gfatalf {
    ($template:expr $(, $arg:expr)* $(,)?) => { $crate::glogf!($crate::Level::Fatal, $template $(, $arg)*) };
}
