//! Configuration loading
//!
//! Settings are resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing TOML file is not fatal: defaults apply.
//! A TOML file that exists but cannot be parsed is a configuration error.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming an alternate config file
pub const ENV_CONFIG: &str = "PLAYLIST_API_CONFIG";
/// Environment variable overriding the bind host
pub const ENV_HOST: &str = "PLAYLIST_API_HOST";
/// Environment variable overriding the listen port
pub const ENV_PORT: &str = "PLAYLIST_API_PORT";
/// Environment variable overriding the log level
pub const ENV_LOG_LEVEL: &str = "PLAYLIST_API_LOG_LEVEL";
/// Environment variable toggling the demo playlist at startup
pub const ENV_SEED_DEMO_DATA: &str = "PLAYLIST_API_SEED_DEMO_DATA";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TomlConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Start with the demo playlist loaded
    #[serde(default = "default_seed")]
    pub seed_demo_data: bool,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_seed() -> bool {
    true
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            seed_demo_data: default_seed(),
            logging: LoggingConfig::default(),
        }
    }
}

impl TomlConfig {
    /// Parse a config file that must exist
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load the config file if present, falling back to defaults when missing
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }
}

/// Default config file location for the platform
///
/// `~/.config/playlist-api/config.toml` on Linux, the platform config
/// directory elsewhere.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("playlist-api").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("playlist-api.toml"))
}

/// Resolve which config file to read: CLI argument, then environment, then default
pub fn resolve_config_path(cli_arg: Option<&Path>) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ENV_CONFIG) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    default_config_path()
}

/// Values supplied on the command line; `None` defers to lower tiers
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
    pub seed_demo_data: Option<bool>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub seed_demo_data: bool,
}

impl ServiceConfig {
    /// Merge command line, environment and TOML values
    pub fn resolve(cli: CliOverrides, toml: TomlConfig) -> Result<Self> {
        let host = cli
            .host
            .or_else(|| env_string(ENV_HOST))
            .unwrap_or(toml.host);

        let port = match cli.port {
            Some(port) => port,
            None => match env_string(ENV_PORT) {
                Some(raw) => raw
                    .parse::<u16>()
                    .map_err(|_| Error::Config(format!("{} must be a port number, got '{}'", ENV_PORT, raw)))?,
                None => toml.port,
            },
        };

        let log_level = cli
            .log_level
            .or_else(|| env_string(ENV_LOG_LEVEL))
            .unwrap_or(toml.logging.level);

        let seed_demo_data = match cli.seed_demo_data {
            Some(seed) => seed,
            None => match env_string(ENV_SEED_DEMO_DATA) {
                Some(raw) => parse_bool(&raw).ok_or_else(|| {
                    Error::Config(format!("{} must be true or false, got '{}'", ENV_SEED_DEMO_DATA, raw))
                })?,
                None => toml.seed_demo_data,
            },
        };

        Ok(Self {
            host,
            port,
            log_level,
            seed_demo_data,
        })
    }

    /// Socket address string for `TcpListener::bind`
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_variants() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" off "), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_bind_addr_format() {
        let config = ServiceConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            seed_demo_data: true,
        };
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
    }
}
