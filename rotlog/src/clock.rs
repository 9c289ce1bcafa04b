use chrono::{DateTime, Datelike, Local, TimeZone, Timelike};

/// Источник времени для записей и имён ротированных файлов.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Local>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Разложенное на поля время: всё, что нужно форматтеру.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stamp {
    pub year: u32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub micros: u32,
}

impl Stamp {
    pub fn from_datetime<Tz: TimeZone>(dt: &DateTime<Tz>) -> Self {
        Stamp {
            year: dt.year().rem_euclid(10_000) as u32,
            month: dt.month(),
            day: dt.day(),
            hour: dt.hour(),
            minute: dt.minute(),
            second: dt.second(),
            // nanosecond() > 1e9 во время високосной секунды
            micros: (dt.nanosecond() / 1_000) % 1_000_000,
        }
    }
}
