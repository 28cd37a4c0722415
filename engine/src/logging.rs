//! Leveled log sink.
//!
//! The sink is an explicitly passed observer, not a global: the CLI opens
//! one `FileLog` at startup and every component receives it by reference.
//! Tests use `MemoryLog` to assert on what a run logged.
//!
//! Wire format, one line per event: `[yyyy/MM/dd HH:mm:ss][LEVEL]message`,
//! appended to a daily-named file under the configured log directory.
//! The only levels are INFO and WARN.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

use chrono::{Local, NaiveDate};

use crate::error::ArchiveError;

/// Log severity. There is no error level; failures that abort the run are
/// reported once at WARN by the top-level handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
        }
    }
}

/// Destination for leveled log lines.
pub trait LogSink {
    /// Append one line at the given level.
    fn log(&self, level: LogLevel, message: &str);

    fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }
}

/// File-backed sink appending to `<log_dir>/<yyyyMMdd>.log`.
pub struct FileLog {
    writer: Mutex<BufWriter<File>>,
}

impl FileLog {
    /// Open (creating the log directory and file as needed) the daily log
    /// file for `today`.
    ///
    /// # Errors
    /// Returns `ArchiveError::CreateDir` if the log directory cannot be
    /// created, `ArchiveError::LogOpen` if the file cannot be opened.
    pub fn open(log_dir: &Path, today: NaiveDate) -> Result<FileLog, ArchiveError> {
        if !log_dir.exists() {
            fs::create_dir_all(log_dir).map_err(|e| ArchiveError::CreateDir {
                path: log_dir.to_path_buf(),
                source: e,
            })?;
        }
        let path = log_dir.join(format!("{}.log", today.format("%Y%m%d")));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| ArchiveError::LogOpen { path, source: e })?;
        Ok(FileLog {
            writer: Mutex::new(BufWriter::new(file)),
        })
    }
}

impl LogSink for FileLog {
    fn log(&self, level: LogLevel, message: &str) {
        let line = format!(
            "[{}][{}]{}",
            Local::now().format("%Y/%m/%d %H:%M:%S"),
            level.as_str(),
            message
        );
        // Best effort: a failed log write must not take the run down.
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

/// Collecting sink for tests.
#[derive(Default)]
pub struct MemoryLog {
    lines: Mutex<Vec<String>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        MemoryLog::default()
    }

    /// All lines logged so far, formatted as `[LEVEL]message`.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().expect("log mutex poisoned").clone()
    }

    /// True if any logged line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }
}

impl LogSink for MemoryLog {
    fn log(&self, level: LogLevel, message: &str) {
        self.lines
            .lock()
            .expect("log mutex poisoned")
            .push(format!("[{}]{}", level.as_str(), message));
    }
}
