use crossbeam_channel::Sender;
use std::borrow::Cow;
use std::fmt;

use crate::level::Level;

// ===== Место вызова =====

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    pub file: &'static str,
    pub line: u32,
}

impl CallSite {
    /// Принимает `file!()` и `line!()`, оставляет только имя файла.
    pub fn new(path: &'static str, line: u32) -> Self {
        let file = path.rsplit(['/', '\\']).next().unwrap_or(path);
        CallSite { file, line }
    }
}

// ===== Аргументы записи =====

/// Значение, захваченное в месте вызова. Примитивы хранятся без аллокаций,
/// форматирование откладывается до фонового потока.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    Char(char),
    Str(Cow<'static, str>),
}

impl Arg {
    pub fn display<T: fmt::Display + ?Sized>(value: &T) -> Self {
        Arg::Str(Cow::Owned(value.to_string()))
    }

    pub fn debug<T: fmt::Debug + ?Sized>(value: &T) -> Self {
        Arg::Str(Cow::Owned(format!("{:?}", value)))
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Int(v) => fmt::Display::fmt(v, f),
            Arg::Uint(v) => fmt::Display::fmt(v, f),
            Arg::Float(v) => fmt::Display::fmt(v, f),
            Arg::Bool(v) => fmt::Display::fmt(v, f),
            Arg::Char(v) => fmt::Display::fmt(v, f),
            Arg::Str(v) => fmt::Display::fmt(v, f),
        }
    }
}

macro_rules! arg_from {
    ($variant:ident as $target:ty: $($t:ty),*) => {
        $(
            impl From<$t> for Arg {
                fn from(v: $t) -> Self {
                    Arg::$variant(v as $target)
                }
            }

            impl From<&$t> for Arg {
                fn from(v: &$t) -> Self {
                    Arg::$variant(*v as $target)
                }
            }
        )*
    };
}

arg_from!(Int as i64: i8, i16, i32, i64, isize);
arg_from!(Uint as u64: u8, u16, u32, u64, usize);
arg_from!(Float as f64: f32, f64);

impl From<i128> for Arg {
    fn from(v: i128) -> Self {
        match i64::try_from(v) {
            Ok(v) => Arg::Int(v),
            Err(_) => Arg::Str(Cow::Owned(v.to_string())),
        }
    }
}

impl From<u128> for Arg {
    fn from(v: u128) -> Self {
        match u64::try_from(v) {
            Ok(v) => Arg::Uint(v),
            Err(_) => Arg::Str(Cow::Owned(v.to_string())),
        }
    }
}

impl From<bool> for Arg {
    fn from(v: bool) -> Self {
        Arg::Bool(v)
    }
}

impl From<char> for Arg {
    fn from(v: char) -> Self {
        Arg::Char(v)
    }
}

impl From<&str> for Arg {
    fn from(v: &str) -> Self {
        Arg::Str(Cow::Owned(v.to_owned()))
    }
}

impl From<String> for Arg {
    fn from(v: String) -> Self {
        Arg::Str(Cow::Owned(v))
    }
}

impl From<&String> for Arg {
    fn from(v: &String) -> Self {
        Arg::Str(Cow::Owned(v.clone()))
    }
}

impl From<Cow<'static, str>> for Arg {
    fn from(v: Cow<'static, str>) -> Self {
        Arg::Str(v)
    }
}

impl From<fmt::Arguments<'_>> for Arg {
    fn from(v: fmt::Arguments<'_>) -> Self {
        match v.as_str() {
            Some(s) => Arg::Str(Cow::Borrowed(s)),
            None => Arg::Str(Cow::Owned(v.to_string())),
        }
    }
}

// ===== Запись и элемент очереди =====

#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub level: Level,
    pub site: CallSite,
    pub template: Option<Cow<'static, str>>,
    pub args: Vec<Arg>,
}

impl LogRecord {
    pub fn new(level: Level, site: CallSite, args: Vec<Arg>) -> Self {
        LogRecord {
            level,
            site,
            template: None,
            args,
        }
    }

    pub fn with_template(
        level: Level,
        site: CallSite,
        template: impl Into<Cow<'static, str>>,
        args: Vec<Arg>,
    ) -> Self {
        LogRecord {
            level,
            site,
            template: Some(template.into()),
            args,
        }
    }
}

/// Всё, что читает фоновый writer: записи и управляющие сигналы.
#[derive(Debug)]
pub(crate) enum QueueItem {
    Record(LogRecord),
    /// Периодический тик: проверить файл и сбросить буфер.
    Flush,
    /// То же, что Flush, плюс подтверждение вызывающему.
    Sync(Sender<()>),
    Shutdown,
}
