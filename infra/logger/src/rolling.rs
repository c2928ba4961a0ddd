use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

/// A `Write` implementation that rolls the target file once it crosses a
/// byte threshold, keeping a bounded set of numbered backups
/// (`app.log` -> `app.log.1` -> ... -> `app.log.<keep>`).
///
/// Fed through `tracing_appender::non_blocking`, so writes happen on the
/// appender worker thread, never on request paths.
#[derive(Debug)]
pub(crate) struct SizeRollingWriter {
    path: PathBuf,
    max_bytes: u64,
    keep: usize,
    file: File,
    written: u64,
}

impl SizeRollingWriter {
    pub(crate) fn new(path: PathBuf, max_bytes: u64, keep: usize) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata()?.len();
        Ok(Self { path, max_bytes, keep, file, written })
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(format!(".{index}"));
        PathBuf::from(name)
    }

    fn rotate(&mut self) -> io::Result<()> {
        let _ = fs::remove_file(self.backup_path(self.keep));
        for index in (1..self.keep).rev() {
            let from = self.backup_path(index);
            if from.exists() {
                fs::rename(from, self.backup_path(index + 1))?;
            }
        }
        fs::rename(&self.path, self.backup_path(1))?;

        self.file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        self.written = 0;
        Ok(())
    }
}

impl Write for SizeRollingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written > 0 && self.written + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }
        let written = self.file.write(buf)?;
        self.written += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn line(len: usize) -> Vec<u8> {
        let mut buf = vec![b'x'; len - 1];
        buf.push(b'\n');
        buf
    }

    #[test]
    fn rolls_once_threshold_is_crossed() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("app.log");
        let mut writer = SizeRollingWriter::new(path.clone(), 64, 3).expect("writer");

        writer.write_all(&line(48)).expect("first write");
        writer.write_all(&line(48)).expect("second write triggers roll");
        writer.flush().expect("flush");

        assert!(path.exists(), "active file recreated after roll");
        assert!(dir.path().join("app.log.1").exists(), "first backup created");
        assert_eq!(fs::read(&path).expect("active file").len(), 48);
    }

    #[test]
    fn prunes_backups_beyond_keep() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("app.log");
        let mut writer = SizeRollingWriter::new(path, 16, 2).expect("writer");

        for _ in 0..5 {
            writer.write_all(&line(16)).expect("write");
        }
        writer.flush().expect("flush");

        assert!(dir.path().join("app.log.1").exists());
        assert!(dir.path().join("app.log.2").exists());
        assert!(!dir.path().join("app.log.3").exists(), "backups beyond keep are pruned");
    }

    #[test]
    fn oversized_single_write_stays_in_one_file() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("app.log");
        let mut writer = SizeRollingWriter::new(path.clone(), 8, 2).expect("writer");

        writer.write_all(&line(32)).expect("oversized write");
        writer.flush().expect("flush");

        assert_eq!(fs::read(&path).expect("active file").len(), 32);
        assert!(!dir.path().join("app.log.1").exists(), "empty file is never rotated");
    }
}
