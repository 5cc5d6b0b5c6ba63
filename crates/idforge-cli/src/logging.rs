use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;

const DEFAULT_FILTER: &str = "info";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("cannot open log file: {0}")]
    Open(#[from] io::Error),
    #[error("cannot install subscriber: {0}")]
    Install(#[from] TryInitError),
}

/// Route tracing events as JSON lines into `path`, filtered by `RUST_LOG`.
pub fn init_logging(path: &Path) -> Result<(), LoggingError> {
    let log = SharedLog::open(path)?;
    let make_writer = BoxMakeWriter::new(move || log.clone());

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let layer = tracing_subscriber::fmt::layer()
        .json()
        .with_timer(UtcTime::rfc_3339())
        .with_writer(make_writer);

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()?;
    Ok(())
}

/// Append-only log file shared by every writer the subscriber hands out.
#[derive(Clone)]
struct SharedLog {
    file: Arc<Mutex<File>>,
}

impl SharedLog {
    fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Arc::new(Mutex::new(file)),
        })
    }

    fn with_file<T>(&self, op: impl FnOnce(&mut File) -> io::Result<T>) -> io::Result<T> {
        let mut file = self
            .file
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;
        op(&mut file)
    }
}

impl Write for SharedLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.with_file(|file| file.write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.with_file(|file| file.flush())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_log_directory_is_an_open_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("absent").join("cli.log");
        let err = init_logging(&path).expect_err("directory does not exist");
        assert!(matches!(err, LoggingError::Open(_)), "{err}");
    }

    #[test]
    fn shared_log_appends_from_every_clone() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cli.log");
        let log = SharedLog::open(&path).expect("open");
        let mut first = log.clone();
        let mut second = log;
        first.write_all(b"one\n").expect("write");
        second.write_all(b"two\n").expect("write");
        second.flush().expect("flush");
        assert_eq!(std::fs::read_to_string(&path).expect("read"), "one\ntwo\n");
    }
}
