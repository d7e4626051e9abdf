//! # Configuration
//!
//! Router and server settings, read from a TOML file and then overridden by
//! environment variables.
//!
//! ```toml
//! [router]
//! separator = "_"
//! pattern_prefix = "/v1"
//! verbs = ["Get", "Post", "Put", "Delete"]
//! permissive = false
//!
//! [server]
//! addr = "0.0.0.0:9898"
//! stack_size = "0x8000"
//! ```
//!
//! ## Environment variables
//!
//! | variable                 | overrides               |
//! |--------------------------|-------------------------|
//! | `BRRTRPC_ADDR`           | `server.addr`           |
//! | `BRRTRPC_STACK_SIZE`     | `server.stack_size`     |
//! | `BRRTRPC_SEPARATOR`      | `router.separator`      |
//! | `BRRTRPC_PATTERN_PREFIX` | `router.pattern_prefix` |
//!
//! Stack sizes accept decimal (`16384`) or hexadecimal (`0x4000`).

use crate::router::derive::DEFAULT_SEPARATOR;
use serde::{Deserialize, Deserializer, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Coroutine stack size when none is configured (16 KB).
pub const DEFAULT_STACK_SIZE: usize = 0x4000;

pub const DEFAULT_ADDR: &str = "127.0.0.1:9898";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// How handler names become routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Wildcard marker in method names.
    pub separator: String,
    /// Path prefix inserted after the verb, e.g. `/v1`.
    pub pattern_prefix: Option<String>,
    /// Accepted verb prefixes; `None` means `Get`, `Post`, `Put`, `Delete`.
    pub verbs: Option<Vec<String>>,
    /// Accept structured arguments received by value.
    pub permissive: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
            pattern_prefix: None,
            verbs: None,
            permissive: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
    /// Coroutine stack size in bytes.
    #[serde(deserialize_with = "deserialize_stack_size")]
    pub stack_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            stack_size: DEFAULT_STACK_SIZE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub router: RouterConfig,
    pub server: ServerConfig,
}

impl Config {
    /// Read `path`, then apply environment overrides.
    ///
    /// # Errors
    ///
    /// The file cannot be read or is not valid TOML for this schema.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&text)?;
        config.apply_env();
        Ok(config)
    }

    /// Parse TOML text without looking at the environment.
    ///
    /// # Errors
    ///
    /// The text is not valid TOML for this schema.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Defaults plus environment overrides.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    /// Apply overrides read through `lookup`. Invalid values are logged and
    /// ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = lookup("BRRTRPC_ADDR") {
            self.server.addr = addr;
        }
        if let Some(raw) = lookup("BRRTRPC_STACK_SIZE") {
            match parse_stack_size(&raw) {
                Some(size) => self.server.stack_size = size,
                None => warn!(value = %raw, "Ignoring invalid BRRTRPC_STACK_SIZE"),
            }
        }
        if let Some(sep) = lookup("BRRTRPC_SEPARATOR") {
            self.router.separator = sep;
        }
        if let Some(prefix) = lookup("BRRTRPC_PATTERN_PREFIX") {
            self.router.pattern_prefix = Some(prefix).filter(|p| !p.is_empty());
        }
    }
}

/// Decimal or `0x`-prefixed hexadecimal byte count.
#[must_use]
pub fn parse_stack_size(raw: &str) -> Option<usize> {
    let raw = raw.trim();
    match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => raw.parse().ok(),
    }
}

fn deserialize_stack_size<'de, D: Deserializer<'de>>(d: D) -> Result<usize, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bytes(usize),
        Text(String),
    }
    match Raw::deserialize(d)? {
        Raw::Bytes(n) => Ok(n),
        Raw::Text(s) => parse_stack_size(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid stack size `{s}`"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stack_size() {
        assert_eq!(parse_stack_size("16384"), Some(16384));
        assert_eq!(parse_stack_size("0x8000"), Some(0x8000));
        assert_eq!(parse_stack_size(" 0X10 "), Some(16));
        assert_eq!(parse_stack_size("lots"), None);
    }

    #[test]
    fn test_overrides() {
        let mut config = Config::default();
        config.apply_overrides(|key| match key {
            "BRRTRPC_ADDR" => Some("0.0.0.0:1".to_string()),
            "BRRTRPC_STACK_SIZE" => Some("bogus".to_string()),
            "BRRTRPC_PATTERN_PREFIX" => Some("/v2".to_string()),
            _ => None,
        });
        assert_eq!(config.server.addr, "0.0.0.0:1");
        assert_eq!(config.server.stack_size, DEFAULT_STACK_SIZE);
        assert_eq!(config.router.pattern_prefix.as_deref(), Some("/v2"));
        assert_eq!(config.router.separator, "_");
    }
}
