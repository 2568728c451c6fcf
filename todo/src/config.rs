//! Configuration management for the `todo` binary.
//!
//! Loads configuration from environment variables with sensible defaults.

use composable_todo_core::environment::{
    ClockIdGenerator, IdGenerator, SequentialIdGenerator, SystemClock,
};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while reading configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable was set to a value that could not be parsed
    #[error("Invalid value {value:?} for {key}")]
    InvalidValue {
        /// Environment variable name
        key: &'static str,
        /// The rejected value
        value: String,
    },
}

/// How ids for new items are produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdStrategy {
    /// Monotonic counter starting at 1
    #[default]
    Sequential,
    /// Millisecond timestamps, bumped so they never repeat
    Clock,
}

impl IdStrategy {
    /// Builds the id source for this strategy
    #[must_use]
    pub fn build(self) -> Arc<dyn IdGenerator> {
        match self {
            Self::Sequential => Arc::new(SequentialIdGenerator::new()),
            Self::Clock => Arc::new(ClockIdGenerator::new(SystemClock)),
        }
    }
}

impl FromStr for IdStrategy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(Self::Sequential),
            "clock" => Ok(Self::Clock),
            _ => Err(()),
        }
    }
}

/// How lines read from stdin are interpreted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputFormat {
    /// Plain text: a line is a new item, `/command` lines act on items
    #[default]
    Text,
    /// One JSON action envelope per line
    Json,
}

impl FromStr for InputFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(()),
        }
    }
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Id source for new items (`TODO_ID_STRATEGY`)
    pub id_strategy: IdStrategy,
    /// Input line format (`TODO_INPUT_FORMAT`)
    pub input_format: InputFormat,
    /// How long shutdown waits for in-flight effects (`TODO_SHUTDOWN_TIMEOUT_MS`)
    pub shutdown_timeout: Duration,
    /// Tracing filter directives (`RUST_LOG`)
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            id_strategy: IdStrategy::default(),
            input_format: InputFormat::default(),
            shutdown_timeout: Duration::from_millis(DEFAULT_SHUTDOWN_TIMEOUT_MS),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

const DEFAULT_SHUTDOWN_TIMEOUT_MS: u64 = 1_000;
const DEFAULT_LOG_FILTER: &str = "info,todo=debug";

impl Config {
    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a variable is set but unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    ///
    /// Unset keys fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a key is set but unparseable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Ok(Self {
            id_strategy: parse_or(&lookup, "TODO_ID_STRATEGY", defaults.id_strategy)?,
            input_format: parse_or(&lookup, "TODO_INPUT_FORMAT", defaults.input_format)?,
            shutdown_timeout: Duration::from_millis(parse_or(
                &lookup,
                "TODO_SHUTDOWN_TIMEOUT_MS",
                DEFAULT_SHUTDOWN_TIMEOUT_MS,
            )?),
            log_filter: lookup("RUST_LOG").unwrap_or(defaults.log_filter),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => {
            let parsed = value.trim().parse().ok();
            parsed.ok_or(ConfigError::InvalidValue { key, value })
        },
    }
}
