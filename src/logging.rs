/// Structured logging for the venue flood watch service
///
/// Context-rich log lines with a component tag, an optional station or
/// venue identifier, UTC timestamps and a severity level. Supports console
/// output and an optional append-only log file for daemon operation.

use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;

use crate::model::UpstreamError;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARN",
            LogLevel::Error => "ERROR",
        };
        f.pad(name)
    }
}

impl LogLevel {
    /// Parses a level name as used in `FLOWATCH_LOG` (case-insensitive).
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warning),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Usgs,
    Registry,
    Scheduler,
    Notify,
    Http,
    System,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Usgs => write!(f, "USGS"),
            Component::Registry => write!(f, "STN"),
            Component::Scheduler => write!(f, "SCHED"),
            Component::Notify => write!(f, "NOTIFY"),
            Component::Http => write!(f, "HTTP"),
            Component::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger
// ---------------------------------------------------------------------------

static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    min_level: LogLevel,
    log_file: Option<String>,
    console_timestamps: bool,
}

impl Logger {
    fn format_entry(level: LogLevel, component: Component, id: Option<&str>, message: &str) -> String {
        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        let id_part = id.map(|s| format!(" [{}]", s)).unwrap_or_default();
        format!("{} {:<5} {}{}: {}", timestamp, level, component, id_part, message)
    }

    fn log(&self, level: LogLevel, component: Component, id: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let entry = Self::format_entry(level, component, id, message);
        let id_part = id.map(|s| format!(" [{}]", s)).unwrap_or_default();

        if self.console_timestamps {
            match level {
                LogLevel::Error | LogLevel::Warning => eprintln!("{}", entry),
                LogLevel::Info | LogLevel::Debug => println!("{}", entry),
            }
        } else {
            match level {
                LogLevel::Error => eprintln!("   ✗ {}{}: {}", component, id_part, message),
                LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", component, id_part, message),
                LogLevel::Info => println!("   {}", message),
                LogLevel::Debug => println!("   [DEBUG] {}{}: {}", component, id_part, message),
            }
        }

        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)
    }
}

/// Installs the global logger. Calling again replaces the previous settings.
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    let logger = Logger {
        min_level,
        log_file: log_file.map(String::from),
        console_timestamps,
    };
    let mut guard = LOGGER.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = Some(logger);
}

fn dispatch(level: LogLevel, component: Component, id: Option<&str>, message: &str) {
    let guard = LOGGER.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(logger) = guard.as_ref() {
        logger.log(level, component, id, message);
    }
}

pub fn debug(component: Component, id: Option<&str>, message: &str) {
    dispatch(LogLevel::Debug, component, id, message);
}

pub fn info(component: Component, id: Option<&str>, message: &str) {
    dispatch(LogLevel::Info, component, id, message);
}

pub fn warn(component: Component, id: Option<&str>, message: &str) {
    dispatch(LogLevel::Warning, component, id, message);
}

pub fn error(component: Component, id: Option<&str>, message: &str) {
    dispatch(LogLevel::Error, component, id, message);
}

// ---------------------------------------------------------------------------
// Upstream failure logging
// ---------------------------------------------------------------------------

/// Logs an absorbed upstream failure for one station.
///
/// Transport and HTTP failures point at the provider or the network and are
/// logged as errors. A well-formed response without gage-height data is
/// common for seasonal or offline gauges and is only a warning.
pub fn log_upstream_failure(site: &str, operation: &str, err: &UpstreamError) {
    let message = format!("{} failed: {}", operation, err);
    match err {
        UpstreamError::Unavailable(_) | UpstreamError::HttpStatus(_) | UpstreamError::Malformed(_) => {
            error(Component::Usgs, Some(site), &message)
        }
        UpstreamError::MissingVariable(_) => warn(Component::Usgs, Some(site), &message),
    }
}
