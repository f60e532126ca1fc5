//! Backend of the `log` facade for the workspace.
//!
//! Every record is turned into a [`LogMessage`] and handed to a [`LogSink`]:
//! either colored on stderr or to a user callback (eg. a front-end log pane).
use std::{fmt, io::Write};

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use strum::{Display, FromRepr};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Logger levels, from the most verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, FromRepr, Display)]
#[repr(u32)]
pub enum LogLevel {
    #[strum(serialize = "TRACE")]
    Trace = 0,
    #[strum(serialize = "DEBUG")]
    Debug = 1,
    #[strum(serialize = "INFO")]
    Info = 2,
    #[strum(serialize = "WARN")]
    Warn = 3,
    #[strum(serialize = "ERROR")]
    Error = 4,
}

impl LogLevel {
    /// Level for a count of `-v` flags, `Warn` when there is none.
    pub fn from_verbosity(count: u8) -> Self {
        match count {
            0 => LogLevel::Warn,
            1 => LogLevel::Info,
            2 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    fn color(self) -> Color {
        match self {
            LogLevel::Trace => Color::Magenta,
            LogLevel::Debug => Color::Blue,
            LogLevel::Info => Color::Green,
            LogLevel::Warn => Color::Yellow,
            LogLevel::Error => Color::Red,
        }
    }
}

impl From<log::Level> for LogLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Trace => LogLevel::Trace,
            log::Level::Debug => LogLevel::Debug,
            log::Level::Info => LogLevel::Info,
            log::Level::Warn => LogLevel::Warn,
            log::Level::Error => LogLevel::Error,
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::Trace,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Error => LevelFilter::Error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogMessage {
    pub level: LogLevel,
    pub timepoint: chrono::NaiveDateTime,
    pub message: String,
    pub module: String,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub thread_name: Option<String>,
}

impl LogMessage {
    pub fn from_record(record: &Record<'_>) -> Self {
        Self {
            level: record.level().into(),
            timepoint: chrono::Local::now().naive_local(),
            message: record.args().to_string(),
            module: record
                .module_path()
                .unwrap_or_else(|| record.target())
                .to_string(),
            file: record.file().map(str::to_string),
            line: record.line(),
            thread_name: std::thread::current().name().map(str::to_string),
        }
    }
}

impl fmt::Display for LogMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:<5} [{}] {}",
            self.timepoint.format("%H:%M:%S%.3f"),
            self.level.to_string(),
            self.module,
            self.message
        )
    }
}

pub type LogCallback = Box<dyn Fn(LogMessage) + Send + Sync>;

/// Destination of log messages.
pub enum LogSink {
    Stderr(ColorChoice),
    Callback(LogCallback),
}

impl LogSink {
    pub fn callback(f: impl Fn(LogMessage) + Send + Sync + 'static) -> Self {
        LogSink::Callback(Box::new(f))
    }
}

impl Default for LogSink {
    fn default() -> Self {
        LogSink::Stderr(ColorChoice::Auto)
    }
}

fn write_colored(stream: &mut impl WriteColor, msg: &LogMessage) -> std::io::Result<()> {
    write!(stream, "{} ", msg.timepoint.format("%H:%M:%S%.3f"))?;
    stream.set_color(ColorSpec::new().set_fg(Some(msg.level.color())).set_bold(true))?;
    write!(stream, "{:<5}", msg.level.to_string())?;
    stream.reset()?;
    if let Some(thread) = &msg.thread_name {
        write!(stream, " ({})", thread)?;
    }
    writeln!(stream, " [{}] {}", msg.module, msg.message)
}

pub struct Logger {
    level: LogLevel,
    sink: LogSink,
}

impl Logger {
    pub fn new(level: LogLevel, sink: LogSink) -> Self {
        Self { level, sink }
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn dispatch(&self, msg: LogMessage) {
        match &self.sink {
            LogSink::Stderr(choice) => {
                let stream = StandardStream::stderr(*choice);
                let mut lock = stream.lock();
                // Nowhere left to report a failing stderr.
                let _ = write_colored(&mut lock, &msg);
            }
            LogSink::Callback(callback) => callback(msg),
        }
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        LogLevel::from(metadata.level()) >= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            self.dispatch(LogMessage::from_record(record));
        }
    }

    fn flush(&self) {
        if let LogSink::Stderr(choice) = &self.sink {
            let _ = StandardStream::stderr(*choice).flush();
        }
    }
}

/// Install the global logger. Fails if a logger is already installed.
pub fn init(level: LogLevel, sink: LogSink) -> Result<(), SetLoggerError> {
    log::set_boxed_logger(Box::new(Logger::new(level, sink)))?;
    log::set_max_level(level.into());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    fn capturing(level: LogLevel) -> (Logger, Arc<Mutex<Vec<LogMessage>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = Arc::clone(&seen);
        let logger = Logger::new(
            level,
            LogSink::callback(move |msg| sink_seen.lock().unwrap().push(msg)),
        );
        (logger, seen)
    }

    #[test]
    fn test_callback_receives_fields() {
        let (logger, seen) = capturing(LogLevel::Info);
        logger.log(
            &Record::builder()
                .level(log::Level::Warn)
                .target("pmcore::job")
                .module_path(Some("pmcore::job"))
                .file(Some("pmcore/src/job.rs"))
                .line(Some(42))
                .args(format_args!("job {} killed", 7))
                .build(),
        );

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].level, LogLevel::Warn);
        assert_eq!(seen[0].message, "job 7 killed");
        assert_eq!(seen[0].module, "pmcore::job");
        assert_eq!(seen[0].file.as_deref(), Some("pmcore/src/job.rs"));
        assert_eq!(seen[0].line, Some(42));
        assert!(seen[0].to_string().ends_with("WARN  [pmcore::job] job 7 killed"));
    }

    #[test]
    fn test_level_filter() {
        let (logger, seen) = capturing(LogLevel::Info);
        logger.log(
            &Record::builder()
                .level(log::Level::Debug)
                .target("pmopt::session")
                .args(format_args!("cascade"))
                .build(),
        );
        assert!(seen.lock().unwrap().is_empty());
        assert!(!logger.enabled(&Metadata::builder().level(log::Level::Trace).build()));
        assert!(logger.enabled(&Metadata::builder().level(log::Level::Error).build()));
    }

    #[test]
    fn test_module_falls_back_to_target() {
        let (logger, seen) = capturing(LogLevel::Trace);
        logger.log(
            &Record::builder()
                .level(log::Level::Trace)
                .target("custom")
                .args(format_args!("x"))
                .build(),
        );
        assert_eq!(seen.lock().unwrap()[0].module, "custom");
    }

    #[test]
    fn test_verbosity() {
        assert_eq!(LogLevel::from_verbosity(0), LogLevel::Warn);
        assert_eq!(LogLevel::from_verbosity(2), LogLevel::Debug);
        assert_eq!(LogLevel::from_verbosity(9), LogLevel::Trace);
        assert_eq!(LogLevel::from_repr(2), Some(LogLevel::Info));
        assert_eq!(LevelFilter::from(LogLevel::Error), LevelFilter::Error);
    }

    #[test]
    fn test_colored_layout() {
        let mut buffer = termcolor::Buffer::no_color();
        let msg = LogMessage {
            level: LogLevel::Info,
            timepoint: chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
                .and_then(|date| date.and_hms_milli_opt(3, 4, 5, 6))
                .unwrap(),
            message: "started".to_string(),
            module: "pmcore::job".to_string(),
            file: None,
            line: None,
            thread_name: Some("pm-job-1".to_string()),
        };
        write_colored(&mut buffer, &msg).unwrap();
        assert_eq!(
            String::from_utf8(buffer.into_inner()).unwrap(),
            "03:04:05.006 INFO  (pm-job-1) [pmcore::job] started\n"
        );
    }
}
