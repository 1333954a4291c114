//! svcreg Logging
//!
//! Instance-scoped logging for the svcreg registry client.
//!
//! Nothing in this crate installs a global subscriber or writes process-wide
//! state. A [`LogOutput`] is handed to a client through its configuration and
//! every operation of that client runs under the output's dispatcher, so two
//! clients in the same process can log to different sinks (or not at all).
//!
//! # Usage
//!
//! ```rust
//! use svcreg_log::{LogConfig, LogOutput, Level, Format};
//!
//! // Emit through whatever subscriber the application installed.
//! let inherit = LogOutput::Inherit;
//!
//! // Swallow everything this client logs.
//! let quiet = LogOutput::Discard;
//!
//! // Debug output to stderr in compact form.
//! let config = LogConfig::default().with_level(Level::Debug).with_format(Format::Compact);
//! let stderr = LogOutput::stderr(&config);
//! # let _ = (inherit, quiet, stderr);
//! ```
//!
//! # Environment Variables
//!
//! Read by [`LogConfig::from_env`]:
//!
//! - `SVCREG_DEBUG=1` - Enable debug logging
//! - `SVCREG_LOG_LEVEL=trace|debug|info|warn|error|off` - Set log level
//! - `SVCREG_LOG_FORMAT=pretty|json|compact` - Set output format
//! - `SVCREG_LOG_COLOR=1|0` - Enable/disable colors
//! - `SVCREG_LOG_TIMESTAMPS=1|0` - Include timestamps
//! - `SVCREG_LOG_MODULE=1|0` - Include the event target

use std::env;
use std::fmt;
use std::future::Future;

use tracing::Dispatch;
use tracing::instrument::{WithDispatch, WithSubscriber};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;

// ============================================================================
// Log Levels
// ============================================================================

/// Minimum level a scoped output records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Level {
    /// Trace level (most verbose)
    Trace = 0,
    /// Debug level
    Debug = 1,
    /// Info level
    Info = 2,
    /// Warning level
    Warn = 3,
    /// Error level (least verbose)
    Error = 4,
    /// Off (no logging)
    Off = 5,
}

impl Level {
    /// Parse a level name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Some(Level::Trace),
            "debug" => Some(Level::Debug),
            "info" => Some(Level::Info),
            "warn" | "warning" => Some(Level::Warn),
            "error" => Some(Level::Error),
            "off" | "none" => Some(Level::Off),
            _ => None,
        }
    }

    /// Get level name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Off => "OFF",
        }
    }

    /// The equivalent `tracing` filter.
    pub fn as_filter(&self) -> LevelFilter {
        match self {
            Level::Trace => LevelFilter::TRACE,
            Level::Debug => LevelFilter::DEBUG,
            Level::Info => LevelFilter::INFO,
            Level::Warn => LevelFilter::WARN,
            Level::Error => LevelFilter::ERROR,
            Level::Off => LevelFilter::OFF,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Log Format
// ============================================================================

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Multi-line human readable format
    Pretty,
    /// Compact single-line format
    Compact,
    /// JSON format for structured logging
    Json,
}

impl Format {
    /// Parse a format name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pretty" => Some(Format::Pretty),
            "compact" => Some(Format::Compact),
            "json" => Some(Format::Json),
            _ => None,
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// How a scoped output renders events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Minimum log level
    pub level: Level,
    /// Output format
    pub format: Format,
    /// Whether colors are enabled
    pub color: bool,
    /// Whether to include timestamps
    pub timestamps: bool,
    /// Whether to include the event target (module path)
    pub module_path: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::Info,
            format: Format::Compact,
            color: false,
            timestamps: true,
            module_path: true,
        }
    }
}

impl LogConfig {
    /// Read the configuration from `SVCREG_*` environment variables.
    ///
    /// Unset or unparsable variables keep their default.
    pub fn from_env() -> Self {
        let debug = env_flag("SVCREG_DEBUG").unwrap_or(false);

        let level = env::var("SVCREG_LOG_LEVEL")
            .ok()
            .and_then(|s| Level::parse(&s))
            .unwrap_or(if debug { Level::Debug } else { Level::Info });

        let format = env::var("SVCREG_LOG_FORMAT")
            .ok()
            .and_then(|s| Format::parse(&s))
            .unwrap_or(Format::Compact);

        let color = env_flag("SVCREG_LOG_COLOR")
            .unwrap_or_else(|| env::var("NO_COLOR").is_err() && env::var("TERM").is_ok());

        Self {
            level,
            format,
            color,
            timestamps: env_flag("SVCREG_LOG_TIMESTAMPS").unwrap_or(true),
            module_path: env_flag("SVCREG_LOG_MODULE").unwrap_or(true),
        }
    }

    /// Set the minimum level.
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set the output format.
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Enable or disable ANSI colors.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Enable or disable timestamps.
    pub fn with_timestamps(mut self, timestamps: bool) -> Self {
        self.timestamps = timestamps;
        self
    }

    /// Enable or disable the event target.
    pub fn with_module_path(mut self, module_path: bool) -> Self {
        self.module_path = module_path;
        self
    }
}

fn env_flag(key: &str) -> Option<bool> {
    env::var(key)
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

// ============================================================================
// Scoped Output
// ============================================================================

/// Where a client's log events go.
#[derive(Clone, Default)]
pub enum LogOutput {
    /// Use the dispatcher that is current when the operation runs.
    #[default]
    Inherit,
    /// Drop every event.
    Discard,
    /// Send events to a dedicated dispatcher.
    Dispatch(Dispatch),
}

impl LogOutput {
    /// Build an output that formats events into `make_writer`.
    ///
    /// Anything implementing [`MakeWriter`] works: `std::io::stderr`, a
    /// `Mutex<File>`, or a closure returning a writer.
    pub fn writer<W>(config: &LogConfig, make_writer: W) -> Self
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        Self::Dispatch(build_dispatch(config, make_writer))
    }

    /// Build an output that writes to standard error.
    pub fn stderr(config: &LogConfig) -> Self {
        Self::writer(config, std::io::stderr)
    }

    /// The dispatcher events should be routed to right now.
    pub fn dispatch(&self) -> Dispatch {
        match self {
            Self::Inherit => tracing::dispatcher::get_default(|current| current.clone()),
            Self::Discard => Dispatch::none(),
            Self::Dispatch(dispatch) => dispatch.clone(),
        }
    }

    /// Run `future` with every event it emits routed to this output.
    pub fn scope<F: Future>(&self, future: F) -> WithDispatch<F> {
        future.with_subscriber(self.dispatch())
    }

    /// Run a synchronous closure with events routed to this output.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch(), f)
    }
}

impl fmt::Debug for LogOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inherit => f.write_str("LogOutput::Inherit"),
            Self::Discard => f.write_str("LogOutput::Discard"),
            Self::Dispatch(_) => f.write_str("LogOutput::Dispatch(..)"),
        }
    }
}

fn build_dispatch<W>(config: &LogConfig, make_writer: W) -> Dispatch
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let builder = tracing_subscriber::fmt()
        .with_writer(make_writer)
        .with_max_level(config.level.as_filter())
        .with_ansi(config.color)
        .with_target(config.module_path);

    match (config.format, config.timestamps) {
        (Format::Json, true) => Dispatch::new(builder.json().finish()),
        (Format::Json, false) => Dispatch::new(builder.json().without_time().finish()),
        (Format::Compact, true) => Dispatch::new(builder.compact().finish()),
        (Format::Compact, false) => Dispatch::new(builder.compact().without_time().finish()),
        (Format::Pretty, true) => Dispatch::new(builder.pretty().finish()),
        (Format::Pretty, false) => Dispatch::new(builder.pretty().without_time().finish()),
    }
}

// ============================================================================
// Tests
// ============================================================================
