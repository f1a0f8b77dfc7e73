//! Configuration module for filedrop.

use serde::Deserialize;
use std::path::Path;

use crate::{FiledropError, Result};

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// File store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FilesConfig {
    /// Path to the store directory.
    #[serde(default = "default_storage_path")]
    pub storage_path: String,
    /// Request body ceiling for uploads, in megabytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
}

fn default_storage_path() -> String {
    "./files".to_string()
}

fn default_max_upload_size() -> u64 {
    10_000
}

impl FilesConfig {
    /// Body ceiling in bytes.
    pub fn max_upload_size_bytes(&self) -> usize {
        let bytes = self.max_upload_size_mb.saturating_mul(1024 * 1024);
        usize::try_from(bytes).unwrap_or(usize::MAX)
    }
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
            max_upload_size_mb: default_max_upload_size(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/filedrop.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Web layer configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// CORS allowed origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Whether to serve the UI bundle.
    #[serde(default)]
    pub serve_static: bool,
    /// Path to the UI bundle directory.
    #[serde(default = "default_static_path")]
    pub static_path: String,
    /// Whether to expose the store directory read-only under `/files`.
    #[serde(default)]
    pub public_files: bool,
}

fn default_static_path() -> String {
    "frontend/dist".to_string()
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            cors_origins: vec![],
            serve_static: false,
            static_path: default_static_path(),
            public_files: false,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// File store configuration.
    #[serde(default)]
    pub files: FilesConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Web layer configuration.
    #[serde(default)]
    pub web: WebConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(FiledropError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| FiledropError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `FILEDROP_STORAGE_PATH`: Override the store directory
    /// - `FILEDROP_PORT`: Override the listen port
    pub fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("FILEDROP_STORAGE_PATH") {
            if !path.is_empty() {
                self.files.storage_path = path;
            }
        }

        if let Ok(port) = std::env::var("FILEDROP_PORT") {
            match port.parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(_) if port.is_empty() => {}
                Err(e) => {
                    tracing::warn!(value = %port, error = %e, "Ignoring invalid FILEDROP_PORT");
                }
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - The storage path is empty
    /// - The upload ceiling is zero
    pub fn validate(&self) -> Result<()> {
        if self.files.storage_path.trim().is_empty() {
            return Err(FiledropError::Validation(
                "files.storage_path must not be empty".to_string(),
            ));
        }
        if self.files.max_upload_size_mb == 0 {
            return Err(FiledropError::Validation(
                "files.max_upload_size_mb must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
