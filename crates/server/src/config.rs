use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming an optional TOML config file.
pub const CONFIG_ENV: &str = "FINLENS_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid {var}: '{value}'")]
    InvalidEnv { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    /// Empty means any origin.
    pub cors_origins: Vec<String>,
    /// Extra header/category synonyms layered over the built-in vocabulary.
    pub vocabulary_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_upload_bytes: 10 * 1024 * 1024,
            cors_origins: Vec::new(),
            vocabulary_path: None,
        }
    }
}

impl ServerConfig {
    pub fn from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// File named by `FINLENS_CONFIG` (defaults if unset), then `HOST` and
    /// `PORT` overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        config.with_env_overrides(|var| std::env::var(var).ok())
    }

    fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.port = port.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: "PORT",
                value: port,
            })?;
        }
        Ok(self)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
