use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::{Error, Result};

/// Message severity, ordered from quietest to noisiest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// No log messages
    Silent = 0,
    /// Only errors
    Error = 1,
    /// Enable warnings
    Warning = 2,
    /// Information messages. The default level
    Info = 3,
    /// Debug messages
    Debug = 4,
    /// Verbose messages
    Verbose = 5,
}

impl LogLevel {
    fn tag(&self) -> &'static str {
        match self {
            LogLevel::Silent => "[SILENT]",
            LogLevel::Error => "[ERROR]",
            LogLevel::Warning => "[WARNING]",
            LogLevel::Info => "[INFO]",
            LogLevel::Debug => "[DEBUG]",
            LogLevel::Verbose => "[VERBOSE]",
        }
    }

    fn from_usize(v: usize) -> LogLevel {
        match v {
            0 => LogLevel::Silent,
            1 => LogLevel::Error,
            2 => LogLevel::Warning,
            3 => LogLevel::Info,
            4 => LogLevel::Debug,
            _ => LogLevel::Verbose,
        }
    }
}

impl FromStr for LogLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<LogLevel> {
        match s {
            "silent" => Ok(LogLevel::Silent),
            "error" => Ok(LogLevel::Error),
            "warning" => Ok(LogLevel::Warning),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "verbose" => Ok(LogLevel::Verbose),
            other => Err(Error::Config(format!("unknown log level \"{}\"", other))),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.tag())
    }
}

type Sink = Mutex<Box<dyn Write + Send>>;

struct LoggerInner {
    scope: String,
    filter: AtomicUsize,
    sink: Arc<Sink>,
}

/// Scoped line logger.
///
/// Every line is written as `[LEVEL] <scope> - <message>`. Cells derive
/// their own logger via [`Logger::scoped`] with an `Actor[<name>]`
/// scope, sharing the sink and the severity filter origin of the
/// system logger.
///
/// The default sink is stderr; [`Logger::redirect`] swaps it for any
/// writer.
#[derive(Clone)]
pub struct Logger {
    inner: Arc<LoggerInner>,
}

impl Logger {
    pub fn new(scope: impl Into<String>, filter: LogLevel) -> Logger {
        Logger::with_sink(
            scope,
            filter,
            Arc::new(Mutex::new(Box::new(io::stderr()) as Box<dyn Write + Send>)),
        )
    }

    fn with_sink(scope: impl Into<String>, filter: LogLevel, sink: Arc<Sink>) -> Logger {
        Logger {
            inner: Arc::new(LoggerInner {
                scope: scope.into(),
                filter: AtomicUsize::new(filter as usize),
                sink,
            }),
        }
    }

    /// Derive a logger with another scope writing to the same sink.
    pub fn scoped(&self, scope: impl Into<String>) -> Logger {
        Logger::with_sink(scope, self.filter(), self.inner.sink.clone())
    }

    pub fn filter(&self) -> LogLevel {
        LogLevel::from_usize(self.inner.filter.load(Ordering::Relaxed))
    }

    pub fn set_filter(&self, level: LogLevel) {
        self.inner.filter.store(level as usize, Ordering::Relaxed);
    }

    /// Replace the output sink for this logger and all loggers sharing it.
    pub fn redirect(&self, sink: Box<dyn Write + Send>) {
        *self.inner.sink.lock().unwrap() = sink;
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.write(LogLevel::Error, None, message.as_ref());
    }

    pub fn warning(&self, message: impl AsRef<str>) {
        self.write(LogLevel::Warning, None, message.as_ref());
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.write(LogLevel::Info, None, message.as_ref());
    }

    pub fn debug(&self, message: impl AsRef<str>) {
        self.write(LogLevel::Debug, None, message.as_ref());
    }

    pub fn verbose(&self, message: impl AsRef<str>) {
        self.write(LogLevel::Verbose, None, message.as_ref());
    }

    /// Install this logger as the backend of the `log` facade, so that
    /// `log::info!` and friends from the application or from other
    /// crates end up in the same sink.
    pub fn install_facade(&self) {
        // set_boxed_logger fails if a facade is already installed;
        // keeping the earlier one is the right outcome then.
        let _ = log::set_boxed_logger(Box::new(self.clone()));
        log::set_max_level(facade_filter(self.filter()));
    }

    fn write(&self, level: LogLevel, scope: Option<&str>, message: &str) {
        if level == LogLevel::Silent || level > self.filter() {
            return;
        }
        let scope = scope.unwrap_or(&self.inner.scope);
        let mut sink = self.inner.sink.lock().unwrap();
        let _ = writeln!(sink, "{} {} - {}", level.tag(), scope, message);
        let _ = sink.flush();
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Logger[{}]", self.inner.scope)
    }
}

fn facade_level(level: log::Level) -> LogLevel {
    match level {
        log::Level::Error => LogLevel::Error,
        log::Level::Warn => LogLevel::Warning,
        log::Level::Info => LogLevel::Info,
        log::Level::Debug => LogLevel::Debug,
        log::Level::Trace => LogLevel::Verbose,
    }
}

fn facade_filter(level: LogLevel) -> log::LevelFilter {
    match level {
        LogLevel::Silent => log::LevelFilter::Off,
        LogLevel::Error => log::LevelFilter::Error,
        LogLevel::Warning => log::LevelFilter::Warn,
        LogLevel::Info => log::LevelFilter::Info,
        LogLevel::Debug => log::LevelFilter::Debug,
        LogLevel::Verbose => log::LevelFilter::Trace,
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        facade_level(metadata.level()) <= self.filter()
    }

    fn log(&self, record: &log::Record) {
        self.write(
            facade_level(record.level()),
            Some(record.target()),
            &format!("{}", record.args()),
        );
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_parsing() {
        assert_eq!("verbose".parse::<LogLevel>().unwrap(), LogLevel::Verbose);
        assert_eq!("silent".parse::<LogLevel>().unwrap(), LogLevel::Silent);
        assert!("noisy".parse::<LogLevel>().is_err());
    }

    #[test]
    fn level_ordering() {
        assert!(LogLevel::Error < LogLevel::Warning);
        assert!(LogLevel::Debug < LogLevel::Verbose);
    }

    #[test]
    fn scoped_loggers_share_filter_origin() {
        let root = Logger::new("ActorSystem[test]", LogLevel::Warning);
        let child = root.scoped("Actor[a]");
        assert_eq!(child.filter(), LogLevel::Warning);
    }
}
