//! # Server Configuration
//!
//! Settings are layered, later layers winning:
//!
//! 1. Built-in defaults
//! 2. TOML file given with `--config`
//! 3. Environment variables
//! 4. CLI flags (applied by the `server` command)
//!
//! ## Environment Variables
//!
//! - `SPO_HOST`: bind address (default: 127.0.0.1)
//! - `SPO_PORT`: bind port (default: 8080)
//! - `SPO_CORS_ORIGINS`: comma-separated origins, or "*" for all (default: localhost only)
//! - `SPO_RATE_LIMIT`: requests per second (default: 100, 0 to disable)
//! - `SPO_MAX_BODY_BYTES`: request body cap (default: 2 MiB)
//!
//! ## Example File
//!
//! ```toml
//! host = "0.0.0.0"
//! port = 9000
//! cors_origins = ["http://localhost:5173"]
//! rate_limit = 20
//! ```

use serde::{Deserialize, Serialize};
use spo_core::SpoError;
use std::path::Path;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_RATE_LIMIT: u32 = 100;
pub const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Maximum accepted size of a config file (64 KiB).
const MAX_CONFIG_FILE_SIZE: u64 = 64 * 1024;

/// Resolved server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Empty means localhost only; a single "*" allows every origin.
    pub cors_origins: Vec<String>,
    /// Requests per second; 0 disables limiting.
    pub rate_limit: u32,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            cors_origins: Vec::new(),
            rate_limit: DEFAULT_RATE_LIMIT,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ServerConfig {
    /// Defaults, then the optional file, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, SpoError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, SpoError> {
        toml::from_str(contents)
            .map_err(|e| SpoError::ConfigError(format!("Invalid config file: {}", e)))
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, SpoError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            SpoError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(SpoError::ConfigError(format!(
                "Config file size {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }
        let contents = std::fs::read_to_string(path).map_err(|e| {
            SpoError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Override fields from `SPO_*` variables.
    ///
    /// `lookup` abstracts the environment so tests need not touch the real one.
    /// Unparseable values are errors rather than silently ignored.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), SpoError> {
        if let Some(host) = lookup("SPO_HOST") {
            self.host = host.trim().to_string();
        }
        if let Some(port) = lookup("SPO_PORT") {
            self.port = parse_var("SPO_PORT", &port)?;
        }
        if let Some(origins) = lookup("SPO_CORS_ORIGINS") {
            self.cors_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(limit) = lookup("SPO_RATE_LIMIT") {
            self.rate_limit = parse_var("SPO_RATE_LIMIT", &limit)?;
        }
        if let Some(bytes) = lookup("SPO_MAX_BODY_BYTES") {
            self.max_body_bytes = parse_var("SPO_MAX_BODY_BYTES", &bytes)?;
        }
        Ok(())
    }

    /// `host:port` for the listener.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    #[must_use]
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|origin| origin == "*")
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, SpoError> {
    raw.trim()
        .parse()
        .map_err(|_| SpoError::ConfigError(format!("{} has an invalid value '{}'", name, raw)))
}

// =============================================================================
// TESTS
// =============================================================================
