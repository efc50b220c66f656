//! Configuration file parsing for the server.
//!
//! Loads bind address, database location, upload limit and LLM settings
//! from TOML. Secrets (the LLM API key and blob store credentials) come
//! from the environment and never appear here.

use docsift_llm::openrouter::{DEFAULT_ENDPOINT, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};
use docsift_pipeline::DEFAULT_MAX_BYTES;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A field holds an unusable value
    #[error("Invalid configuration value for {field}: {reason}")]
    Invalid {
        /// Field name as written in the file
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

/// Server configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1")
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Bind port (e.g., 3000)
    #[serde(default = "default_bind_port")]
    pub bind_port: u16,

    /// SQLite database file
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Upper bound for a single analysis call, including the LLM round trip
    #[serde(default = "default_analysis_timeout")]
    pub analysis_timeout_secs: u64,

    /// Upload limits
    #[serde(default)]
    pub upload: UploadConfig,

    /// LLM provider settings
    #[serde(default)]
    pub llm: LlmConfig,
}

/// `[upload]` section
#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Largest accepted file in bytes (default: 5 MiB)
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_bytes(),
        }
    }
}

/// `[llm]` section
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// OpenAI-compatible API base URL
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,

    /// Model identifier
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// HTTP timeout for one completion request
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_llm_endpoint(),
            model: default_llm_model(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_bind_port() -> u16 {
    3000
}

fn default_database_path() -> PathBuf {
    PathBuf::from("docsift.db")
}

/// Default analysis bound: 2 minutes
fn default_analysis_timeout() -> u64 {
    120
}

fn default_max_bytes() -> usize {
    DEFAULT_MAX_BYTES
}

fn default_llm_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_llm_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_request_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_address: default_bind_address(),
            bind_port: default_bind_port(),
            database_path: default_database_path(),
            analysis_timeout_secs: default_analysis_timeout(),
            upload: UploadConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load and validate configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Create a default configuration for testing
    pub fn default_test_config() -> Self {
        ServerConfig {
            database_path: PathBuf::from(":memory:"),
            analysis_timeout_secs: 5,
            ..ServerConfig::default()
        }
    }

    /// Reject values the server cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bind_address.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "bind_address",
                reason: "must not be empty".to_string(),
            });
        }
        if self.upload.max_bytes == 0 {
            return Err(ConfigError::Invalid {
                field: "upload.max_bytes",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.analysis_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "analysis_timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.llm.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "llm.request_timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        if !(self.llm.endpoint.starts_with("http://") || self.llm.endpoint.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                field: "llm.endpoint",
                reason: format!("expected an http(s) URL, got '{}'", self.llm.endpoint),
            });
        }
        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "llm.model",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Override the bind address and port from an `addr:port` string
    pub fn with_bind(mut self, bind: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::Invalid {
            field: "bind",
            reason: format!("{} in '{}'", reason, bind),
        };
        let (address, port) = bind
            .rsplit_once(':')
            .ok_or_else(|| invalid("expected addr:port"))?;
        if address.is_empty() {
            return Err(invalid("missing address"));
        }
        self.bind_port = port.parse().map_err(|_| invalid("invalid port"))?;
        self.bind_address = address.to_string();
        Ok(self)
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }

    /// Analysis bound as a duration
    pub fn analysis_timeout(&self) -> Duration {
        Duration::from_secs(self.analysis_timeout_secs)
    }

    /// LLM HTTP timeout as a duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.llm.request_timeout_secs)
    }
}
