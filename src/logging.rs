//! Structured logging setup.
//!
//! Every stage of the dispatcher emits `tracing` events with structured
//! fields (`request_id`, `handler_name`, `route_pattern`, `status`, ...).
//! This module installs the subscriber that renders them.
//!
//! | variable             | values                                 | default |
//! |----------------------|----------------------------------------|---------|
//! | `BRRTRPC_LOG_LEVEL`  | `trace`, `debug`, `info`, `warn`, `error` | `info`  |
//! | `BRRTRPC_LOG_FORMAT` | `json`, `pretty`                       | `json`  |
//! | `BRRTRPC_LOG_TARGETS`| extra comma-separated filter directives | none    |
//!
//! `RUST_LOG`, when set, replaces the level filter entirely.

use anyhow::{Context, Result};
use std::env;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Log format: JSON for production, pretty-print for development.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Json,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub log_level: String,
    pub format: LogFormat,
    /// Additional filter directives, comma-separated.
    pub target_filter: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            format: LogFormat::Json,
            target_filter: None,
        }
    }
}

impl LogConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`LogConfig::from_env`] but reading variables through `lookup`.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            log_level: lookup("BRRTRPC_LOG_LEVEL").unwrap_or(defaults.log_level),
            format: lookup("BRRTRPC_LOG_FORMAT")
                .map_or(defaults.format, |f| LogFormat::parse(&f)),
            target_filter: lookup("BRRTRPC_LOG_TARGETS").filter(|t| !t.trim().is_empty()),
        }
    }

    /// Level parsed from `log_level`; unknown names fall back to `INFO`.
    #[must_use]
    pub fn level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}

/// Install the global subscriber described by [`LogConfig::from_env`].
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_logging() -> Result<()> {
    init_logging_with_config(&LogConfig::from_env())
}

/// Install the global subscriber for `config`.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_logging_with_config(config: &LogConfig) -> Result<()> {
    let mut env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level().as_str()));

    // Client disconnects are logged by the transport at debug/info.
    if let Ok(directive) = "may_minihttp=warn".parse() {
        env_filter = env_filter.add_directive(directive);
    }

    if let Some(target_filter) = &config.target_filter {
        for filter in target_filter.split(',') {
            let filter = filter.trim();
            if filter.is_empty() {
                continue;
            }
            match filter.parse() {
                Ok(directive) => env_filter = env_filter.add_directive(directive),
                Err(_) => eprintln!("Warning: Invalid log filter directive: {filter}"),
            }
        }
    }

    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_thread_ids(true)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_ids(false)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")?;
    Ok(())
}
