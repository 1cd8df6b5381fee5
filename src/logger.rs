//! Custom logging module.
//!
//! `Logger` formats records with a timestamp and forwards them either to
//! stderr (headless commands) or to a bounded buffer shown in the log panel
//! of the terminal UI.

use crate::error::AppError;
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::collections::VecDeque;
use std::io::Write;
use std::sync::{Arc, Mutex};

/// Number of entries kept by default in the log panel buffer.
pub const DEFAULT_CAPACITY: usize = 500;

/// Format a log record into a string for display
///
pub fn format_log(record: &Record) -> String {
    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
    let level_str = match record.level() {
        Level::Error => "ERROR",
        Level::Warn => "WARN",
        Level::Info => "INFO",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    };
    format!("{} {} {}", timestamp, level_str, record.args())
}

/// Shared ring buffer of formatted log lines.
///
#[derive(Clone, Debug)]
pub struct LogBuffer {
    entries: Arc<Mutex<VecDeque<String>>>,
    capacity: usize,
}

impl Default for LogBuffer {
    fn default() -> Self {
        LogBuffer::with_capacity(DEFAULT_CAPACITY)
    }
}

impl LogBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        LogBuffer {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&self, line: String) {
        if let Ok(mut entries) = self.entries.lock() {
            if entries.len() == self.capacity {
                entries.pop_front();
            }
            entries.push_back(line);
        }
    }

    /// Return up to `limit` of the most recent lines, oldest first.
    ///
    pub fn tail(&self, limit: usize) -> Vec<String> {
        match self.entries.lock() {
            Ok(entries) => {
                let skip = entries.len().saturating_sub(limit);
                entries.iter().skip(skip).cloned().collect()
            }
            Err(_) => vec![],
        }
    }
}

/// Where formatted entries go.
///
#[derive(Clone, Debug)]
pub enum Sink {
    Stderr,
    Buffer(LogBuffer),
}

/// Custom logger with a level filter and a sink.
///
pub struct Logger {
    level: LevelFilter,
    sink: Sink,
}

impl Logger {
    pub fn new(level: LevelFilter, sink: Sink) -> Self {
        Logger { level, sink }
    }

    /// Install as the global logger.
    ///
    pub fn init(self) -> Result<(), AppError> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self)).map_err(|e| AppError::Logger(e.to_string()))?;
        log::set_max_level(level);
        Ok(())
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        // dependencies only get through with warnings and errors
        metadata.level() <= self.level
            && (metadata.target().starts_with(env!("CARGO_CRATE_NAME"))
                || metadata.level() <= Level::Warn)
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let formatted = format_log(record);
        match &self.sink {
            Sink::Stderr => {
                let _ = writeln!(std::io::stderr(), "{}", formatted);
            }
            Sink::Buffer(buffer) => buffer.push(formatted),
        }
    }

    fn flush(&self) {
        if let Sink::Stderr = self.sink {
            let _ = std::io::stderr().flush();
        }
    }
}

/// Map the number of `-v` flags to a level filter.
///
pub fn level_for_verbosity(occurrences: u64) -> LevelFilter {
    match occurrences {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}
