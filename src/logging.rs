//! Logging for the organizer core.
//!
//! Core components never log through a global. They receive a `&dyn Logger`
//! and report through it, which lets the CLI forward to `tracing` while tests
//! capture every line in a [`MemoryLogger`].
//!
//! [`init_tracing`] installs the process-wide `tracing` subscriber used by
//! [`TracingLogger`].

use serde_json::Value;
use std::cell::RefCell;
use std::fmt;
use tracing_subscriber::EnvFilter;

/// Severity of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        };
        f.write_str(label)
    }
}

/// Sink for diagnostic messages emitted by the core.
///
/// Implementations must not affect organizer behavior; a logger that drops
/// everything is always valid.
pub trait Logger {
    /// Records a message at `level` with optional structured details.
    fn log(&self, level: LogLevel, message: &str, details: Option<&Value>);

    fn debug(&self, message: &str, details: Option<&Value>) {
        self.log(LogLevel::Debug, message, details);
    }

    fn info(&self, message: &str, details: Option<&Value>) {
        self.log(LogLevel::Info, message, details);
    }

    fn warn(&self, message: &str, details: Option<&Value>) {
        self.log(LogLevel::Warn, message, details);
    }

    fn error(&self, message: &str, details: Option<&Value>) {
        self.log(LogLevel::Error, message, details);
    }
}

/// Forwards every record to the `tracing` macros.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, message: &str, details: Option<&Value>) {
        match (level, details) {
            (LogLevel::Debug, Some(d)) => tracing::debug!(details = %d, "{}", message),
            (LogLevel::Debug, None) => tracing::debug!("{}", message),
            (LogLevel::Info, Some(d)) => tracing::info!(details = %d, "{}", message),
            (LogLevel::Info, None) => tracing::info!("{}", message),
            (LogLevel::Warn, Some(d)) => tracing::warn!(details = %d, "{}", message),
            (LogLevel::Warn, None) => tracing::warn!("{}", message),
            (LogLevel::Error, Some(d)) => tracing::error!(details = %d, "{}", message),
            (LogLevel::Error, None) => tracing::error!("{}", message),
        }
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _level: LogLevel, _message: &str, _details: Option<&Value>) {}
}

/// A single entry captured by [`MemoryLogger`].
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    /// RFC 3339 timestamp taken when the record was appended.
    pub timestamp: String,
    pub level: LogLevel,
    pub message: String,
    pub details: Option<Value>,
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.timestamp, self.level, self.message)?;
        if let Some(details) = &self.details {
            write!(f, " {}", details)?;
        }
        Ok(())
    }
}

/// Append-only in-memory log buffer.
///
/// Records are never removed or rewritten. The CLI drains the rendered buffer
/// into `--log-file` at the end of a run.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    records: RefCell<Vec<LogRecord>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all records appended so far.
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }

    /// Records at exactly `level`.
    pub fn records_at(&self, level: LogLevel) -> Vec<LogRecord> {
        self.records
            .borrow()
            .iter()
            .filter(|record| record.level == level)
            .cloned()
            .collect()
    }

    /// One line per record, newline terminated.
    pub fn render(&self) -> String {
        self.records
            .borrow()
            .iter()
            .map(|record| format!("{}\n", record))
            .collect()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, level: LogLevel, message: &str, details: Option<&Value>) {
        self.records.borrow_mut().push(LogRecord {
            timestamp: chrono::Utc::now().to_rfc3339(),
            level,
            message: message.to_string(),
            details: details.cloned(),
        });
    }
}

/// Sends every record to two loggers.
pub struct TeeLogger<'a> {
    first: &'a dyn Logger,
    second: &'a dyn Logger,
}

impl<'a> TeeLogger<'a> {
    pub fn new(first: &'a dyn Logger, second: &'a dyn Logger) -> Self {
        Self { first, second }
    }
}

impl Logger for TeeLogger<'_> {
    fn log(&self, level: LogLevel, message: &str, details: Option<&Value>) {
        self.first.log(level, message, details);
        self.second.log(level, message, details);
    }
}

/// Maps `-v` occurrences to a default filter directive.
fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise the level comes from `verbosity`.
/// Calling this twice is harmless: the second installation is ignored.
pub fn init_tracing(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}
