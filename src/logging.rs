//! Logging setup helpers
//!
//! The engine emits structured `tracing` events under the `beanwire`
//! target. Library users normally install their own subscriber; this
//! module is for binaries and test harnesses that want a one-liner.
//!
//! # Features
//!
//! - `logging` - emit events (default)
//! - `logging-json` - subscriber setup with JSON output
//! - `logging-pretty` - subscriber setup with human-readable output
//!
//! # Example
//!
//! ```rust,ignore
//! use beanwire::logging;
//!
//! logging::init_pretty();
//!
//! // or with custom configuration
//! logging::builder()
//!     .trace()
//!     .wire_only()
//!     .json()
//!     .init();
//! ```

#[cfg(feature = "logging")]
use tracing::Level;

/// Output format for the installed subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// JSON structured output
    #[default]
    Json,
    /// Multi-line colorful output
    Pretty,
    /// Compact single-line output
    Compact,
}

/// Builder for subscriber configuration
#[cfg(feature = "logging")]
#[derive(Debug, Clone)]
pub struct LoggingBuilder {
    level: Level,
    format: LogFormat,
    target: Option<&'static str>,
    with_file: bool,
    with_line_number: bool,
}

#[cfg(feature = "logging")]
impl Default for LoggingBuilder {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            format: LogFormat::Json,
            target: None,
            with_file: false,
            with_line_number: false,
        }
    }
}

#[cfg(feature = "logging")]
impl LoggingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum log level
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set log level to TRACE (most verbose)
    pub fn trace(mut self) -> Self {
        self.level = Level::TRACE;
        self
    }

    /// Set log level to DEBUG
    pub fn debug(mut self) -> Self {
        self.level = Level::DEBUG;
        self
    }

    /// Set log level to INFO
    pub fn info(mut self) -> Self {
        self.level = Level::INFO;
        self
    }

    /// Set log level to ERROR (least verbose)
    pub fn error(mut self) -> Self {
        self.level = Level::ERROR;
        self
    }

    /// Filter to only show logs from a specific target
    pub fn with_target_filter(mut self, target: &'static str) -> Self {
        self.target = Some(target);
        self
    }

    /// Only show engine logs, hiding other crates
    pub fn wire_only(self) -> Self {
        self.with_target_filter("beanwire")
    }

    /// Include file names in log output
    pub fn with_file(mut self) -> Self {
        self.with_file = true;
        self
    }

    /// Include line numbers in log output
    pub fn with_line_number(mut self) -> Self {
        self.with_line_number = true;
        self
    }

    /// Use JSON output
    pub fn json(mut self) -> Self {
        self.format = LogFormat::Json;
        self
    }

    /// Use pretty output
    pub fn pretty(mut self) -> Self {
        self.format = LogFormat::Pretty;
        self
    }

    /// Use compact output
    pub fn compact(mut self) -> Self {
        self.format = LogFormat::Compact;
        self
    }

    /// Install a global subscriber with the configured settings.
    ///
    /// Requires the `logging-json` or `logging-pretty` feature.
    #[cfg(any(feature = "logging-json", feature = "logging-pretty"))]
    pub fn init(self) {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        let filter = if let Some(target) = self.target {
            EnvFilter::new(format!("{}={}", target, self.level))
        } else {
            EnvFilter::new(self.level.to_string())
        };

        let layer = fmt::layer()
            .with_file(self.with_file)
            .with_line_number(self.with_line_number)
            .with_target(true);

        match self.format {
            LogFormat::Json => {
                #[cfg(feature = "logging-json")]
                {
                    tracing_subscriber::registry()
                        .with(filter)
                        .with(layer.json())
                        .init();
                }
                #[cfg(not(feature = "logging-json"))]
                {
                    tracing_subscriber::registry().with(filter).with(layer).init();
                }
            }
            LogFormat::Pretty => {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(layer.pretty())
                    .init();
            }
            LogFormat::Compact => {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(layer.compact())
                    .init();
            }
        }
    }

    /// Initialize (no-op without a subscriber feature)
    #[cfg(not(any(feature = "logging-json", feature = "logging-pretty")))]
    pub fn init(self) {}
}

/// Create a new logging builder
#[cfg(feature = "logging")]
pub fn builder() -> LoggingBuilder {
    LoggingBuilder::new()
}

/// Initialize with the default format: JSON when `logging-json` is
/// enabled, pretty otherwise.
#[cfg(any(feature = "logging-json", feature = "logging-pretty"))]
pub fn init() {
    #[cfg(feature = "logging-json")]
    {
        init_json();
    }
    #[cfg(all(feature = "logging-pretty", not(feature = "logging-json")))]
    {
        init_pretty();
    }
}

/// Initialize logging (no-op without a subscriber feature)
#[cfg(not(any(feature = "logging-json", feature = "logging-pretty")))]
pub fn init() {}

/// Initialize JSON structured logging at DEBUG level
#[cfg(any(feature = "logging-json", feature = "logging-pretty"))]
pub fn init_json() {
    builder().json().debug().init();
}

/// Initialize JSON logging (no-op without a subscriber feature)
#[cfg(not(any(feature = "logging-json", feature = "logging-pretty")))]
pub fn init_json() {}

/// Initialize pretty colorful logging at DEBUG level
#[cfg(any(feature = "logging-json", feature = "logging-pretty"))]
pub fn init_pretty() {
    builder().pretty().debug().init();
}

/// Initialize pretty logging (no-op without a subscriber feature)
#[cfg(not(any(feature = "logging-json", feature = "logging-pretty")))]
pub fn init_pretty() {}

/// Initialize logging for engine events only, hiding other crates
#[cfg(any(feature = "logging-json", feature = "logging-pretty"))]
pub fn init_wire_only() {
    builder().wire_only().debug().init();
}

/// Initialize engine-only logging (no-op without a subscriber feature)
#[cfg(not(any(feature = "logging-json", feature = "logging-pretty")))]
pub fn init_wire_only() {}
