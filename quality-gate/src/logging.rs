//! Logging configuration for the quality gate.
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the binary. [`setup::init_logging`] is the one the CLI uses.

use tracing::Level;

/// Controls how much the gate logs about each run.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Base log level for gate components
    pub base_level: Level,
    /// Whether to log one event per violation and per tested column
    pub log_column_details: bool,
    /// Whether to log collaborator hand-offs (lineage records)
    pub log_lineage: bool,
    /// Maximum length for logged field values (offending cell values can be
    /// arbitrary user text)
    pub max_field_length: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            base_level: Level::INFO,
            log_column_details: false,
            log_lineage: true,
            max_field_length: 256,
        }
    }
}

impl LogConfig {
    /// Everything, with long field values.
    pub fn verbose() -> Self {
        Self {
            base_level: Level::DEBUG,
            log_column_details: true,
            log_lineage: true,
            max_field_length: 1024,
        }
    }

    /// Verdicts and warnings only.
    pub fn production() -> Self {
        Self {
            base_level: Level::WARN,
            log_column_details: false,
            log_lineage: false,
            max_field_length: 128,
        }
    }
}

/// Debug event gated on [`LogConfig::log_column_details`].
#[macro_export]
macro_rules! log_column {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_column_details {
            tracing::debug!($($arg)*);
        }
    };
}

/// Truncates a string to at most `max_length` bytes, on a char boundary.
pub fn truncate_field(value: &str, max_length: usize) -> String {
    if value.len() <= max_length {
        return value.to_string();
    }
    let mut end = max_length;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...(truncated)", &value[..end])
}

/// Subscriber installation for binaries.
pub mod setup {
    use tracing::Level;

    /// Subscriber configuration.
    #[derive(Debug, Clone)]
    pub struct LoggingConfig {
        /// Level for everything outside the gate
        pub level: Level,
        /// Level for `quality_gate` targets
        pub gate_level: Level,
        /// Emit one JSON object per event instead of text
        pub json_format: bool,
        /// Overrides the computed filter string
        pub env_filter: Option<String>,
    }

    impl Default for LoggingConfig {
        fn default() -> Self {
            Self {
                level: Level::WARN,
                gate_level: Level::INFO,
                json_format: false,
                env_filter: None,
            }
        }
    }

    impl LoggingConfig {
        pub fn production() -> Self {
            Self {
                level: Level::WARN,
                gate_level: Level::INFO,
                json_format: true,
                env_filter: None,
            }
        }

        pub fn development() -> Self {
            Self {
                level: Level::DEBUG,
                gate_level: Level::DEBUG,
                json_format: false,
                env_filter: None,
            }
        }

        pub fn with_level(mut self, level: Level) -> Self {
            self.level = level;
            self
        }

        pub fn with_gate_level(mut self, level: Level) -> Self {
            self.gate_level = level;
            self
        }

        pub fn with_json_format(mut self, enabled: bool) -> Self {
            self.json_format = enabled;
            self
        }

        pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
            self.env_filter = Some(filter.into());
            self
        }

        /// Builds the `EnvFilter` directive string.
        pub fn env_filter(&self) -> String {
            match &self.env_filter {
                Some(filter) => filter.clone(),
                None => format!(
                    "{},quality_gate={}",
                    self.level.as_str().to_lowercase(),
                    self.gate_level.as_str().to_lowercase()
                ),
            }
        }
    }

    /// Installs a global subscriber. `RUST_LOG` wins over the config filter.
    ///
    /// Logs go to stderr so stdout stays free for verdict output.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use quality_gate::logging::setup::{init_logging, LoggingConfig};
    ///
    /// init_logging(LoggingConfig::default().with_json_format(true)).unwrap();
    /// ```
    pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.env_filter()));

        let fmt_layer = if config.json_format {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .boxed()
        } else {
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .boxed()
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;

        Ok(())
    }
}
