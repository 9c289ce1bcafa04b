use chrono::{DateTime, TimeZone};
use std::fmt::Display;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

// ===== Ротация =====

/// Строго больше: одна запись может вывести файл за порог.
pub fn should_rotate(written: u64, max_bytes: u64) -> bool {
    written > max_bytes
}

/// `<base>.<YYYYMMDDHHMMSS>` — лексикографический порядок совпадает с хронологическим.
/// Две ротации в одну секунду дают одно имя: вторая перезаписывает первый файл.
pub fn rotated_name<Tz>(base_name: &str, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!("{}.{}", base_name, now.format("%Y%m%d%H%M%S"))
}

// ===== Хранение =====

/// Имена ротированных файлов сверх `keep`, от новых к старым.
/// Активный файл (`<base>` без суффикса) сюда не попадает.
pub fn stale_files<I>(names: I, base_name: &str, keep: usize) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let prefix = format!("{}.", base_name);
    let mut rotated: Vec<String> = names
        .into_iter()
        .filter(|name| name.starts_with(&prefix))
        .collect();
    rotated.sort_unstable_by(|a, b| b.cmp(a));
    rotated.into_iter().skip(keep).collect()
}

/// Удаляет лишние ротированные файлы. Ошибки возвращаются для диагностики,
/// повторных попыток нет.
pub fn prune(dir: &Path, base_name: &str, keep: usize) -> Vec<(PathBuf, io::Error)> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => return vec![(dir.to_path_buf(), e)],
    };
    let names = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok());

    stale_files(names, base_name, keep)
        .into_iter()
        .filter_map(|name| {
            let path = dir.join(name);
            fs::remove_file(&path).err().map(|e| (path, e))
        })
        .collect()
}
