use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Активный лог-файл с буфером записи. Им владеет только фоновый writer.
pub(crate) struct FileSink {
    path: PathBuf,
    buffer_size: usize,
    writer: Option<BufWriter<File>>,
    written: u64,
}

impl FileSink {
    pub fn open<P: AsRef<Path>>(path: P, buffer_size: usize) -> io::Result<Self> {
        let mut sink = FileSink {
            path: path.as_ref().to_path_buf(),
            buffer_size,
            writer: None,
            written: 0,
        };
        sink.reopen()?;
        Ok(sink)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Размер активного файла с момента открытия, включая ещё не сброшенный буфер.
    pub fn written(&self) -> u64 {
        self.written
    }

    #[cfg(test)]
    pub fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    /// Без открытого файла байты теряются, но учитываются в счётчике.
    pub fn append(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.written += bytes.len() as u64;
        match self.writer {
            Some(ref mut w) => w.write_all(bytes),
            None => Ok(()),
        }
    }

    pub fn flush(&mut self) -> io::Result<()> {
        match self.writer {
            Some(ref mut w) => w.flush(),
            None => Ok(()),
        }
    }

    /// Сбросить, закрыть, переименовать в `rotated` и открыть новый файл.
    /// Новый файл открывается даже если что-то до этого не удалось.
    pub fn rotate(&mut self, rotated: &Path) -> io::Result<()> {
        let flushed = self.flush();
        self.writer = None;
        let renamed = fs::rename(&self.path, rotated);
        let reopened = self.reopen();
        flushed.and(renamed).and(reopened)
    }

    /// Если активный файл удалили снаружи, создаёт его заново.
    /// Содержимое буфера при этом отбрасывается.
    pub fn recover_if_missing(&mut self) -> io::Result<bool> {
        if self.writer.is_some() && fs::metadata(&self.path).is_ok() {
            return Ok(false);
        }
        if let Some(w) = self.writer.take() {
            let (_file, _discarded) = w.into_parts();
        }
        self.written = 0;
        self.reopen()?;
        Ok(true)
    }

    fn reopen(&mut self) -> io::Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        // Дописываем в существующий файл — счётчик начинается с его размера
        self.written = file.metadata().map(|m| m.len()).unwrap_or(0);
        self.writer = Some(BufWriter::with_capacity(self.buffer_size, file));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn file_len(path: &Path) -> u64 {
        fs::metadata(path).unwrap().len()
    }

    #[test]
    fn append_is_buffered_until_flush() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        let mut sink = FileSink::open(&path, 1024).unwrap();

        sink.append(b"hello\n").unwrap();
        assert_eq!(sink.written(), 6);
        assert_eq!(file_len(&path), 0);

        sink.flush().unwrap();
        assert_eq!(file_len(&path), 6);

        // Повторный flush ничего не меняет
        sink.flush().unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"hello\n");
    }

    #[test]
    fn counter_starts_from_existing_size() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, b"0123456789").unwrap();

        let mut sink = FileSink::open(&path, 1024).unwrap();
        assert_eq!(sink.written(), 10);
        sink.append(b"ab").unwrap();
        sink.flush().unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"0123456789ab");
    }

    #[test]
    fn rotate_moves_file_and_starts_fresh() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        let rotated = dir.path().join("app.log.20240101000000");
        let mut sink = FileSink::open(&path, 1024).unwrap();

        sink.append(b"first\n").unwrap();
        sink.rotate(&rotated).unwrap();
        assert_eq!(fs::read(&rotated).unwrap(), b"first\n");
        assert_eq!(sink.written(), 0);
        assert_eq!(file_len(&path), 0);

        sink.append(b"second\n").unwrap();
        sink.flush().unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"second\n");
    }

    #[test]
    fn recovers_deleted_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        let mut sink = FileSink::open(&path, 1024).unwrap();

        assert!(!sink.recover_if_missing().unwrap());

        sink.append(b"lost\n").unwrap();
        fs::remove_file(&path).unwrap();
        assert!(sink.recover_if_missing().unwrap());
        assert_eq!(sink.written(), 0);

        sink.flush().unwrap();
        assert_eq!(file_len(&path), 0);
        assert!(sink.is_open());
    }

    #[test]
    fn failed_rename_reports_error_and_keeps_writing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        let mut sink = FileSink::open(&path, 1024).unwrap();
        sink.append(b"kept\n").unwrap();

        let bad = dir.path().join("missing-dir").join("app.log.1");
        assert!(sink.rotate(&bad).is_err());

        // Старый файл открыт заново, счётчик равен его размеру
        assert!(sink.is_open());
        assert_eq!(sink.written(), 5);
        sink.append(b"more\n").unwrap();
        sink.flush().unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"kept\nmore\n");
    }
}
