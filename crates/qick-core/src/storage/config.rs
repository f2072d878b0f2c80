//! Configuration management
//!
//! Priority for the API base URL: CLI argument > QICK_BASE_URL environment
//! variable > config.toml > built-in default.

use super::Result;
use crate::error::{ConfigError, StorageError};
use crate::utils::validation::validate_url;
use dirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "https://qick-backend-staging.onrender.com/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const BASE_URL_ENV: &str = "QICK_BASE_URL";

/// Where the session snapshot is kept between runs.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Keyring,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    /// Backend server URL
    pub base_url: Option<String>,
    /// Prefix inserted between the base URL and every endpoint path
    pub api_prefix: Option<String>,
    pub timeout_secs: Option<u64>,
    pub storage: Option<StorageBackend>,
    /// Opaque key for the places/maps provider; unused by this crate
    pub maps_api_key: Option<String>,
}

impl Config {
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p,
            None => Self::config_file_path()?,
        };

        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&config_path).map_err(|source| StorageError::FileIo {
            path: config_path.to_string_lossy().to_string(),
            source,
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|e| StorageError::ConfigParseError {
                message: format!("Failed to parse config file: {}", e),
            })?;

        Ok(config)
    }

    pub fn save(&self, path: Option<PathBuf>) -> Result<()> {
        let config_path = match path {
            Some(p) => p,
            None => Self::config_file_path()?,
        };

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|source| StorageError::FileIo {
                path: parent.to_string_lossy().to_string(),
                source,
            })?;
        }

        let toml_content = toml::to_string(self).map_err(|e| StorageError::ConfigParseError {
            message: format!("Failed to serialize config: {}", e),
        })?;

        fs::write(&config_path, toml_content).map_err(|source| StorageError::FileIo {
            path: config_path.to_string_lossy().to_string(),
            source,
        })?;

        Ok(())
    }

    pub fn config_file_path() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().ok_or(StorageError::ConfigDirNotFound)?;
        Ok(home_dir.join(".config").join("qick").join("config.toml"))
    }

    /// Base URL with fallback to the environment, then the built-in default.
    pub fn get_base_url(&self) -> String {
        std::env::var(BASE_URL_ENV)
            .ok()
            .filter(|s| !s.is_empty())
            .or_else(|| self.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    pub fn get_api_prefix(&self) -> String {
        self.api_prefix.clone().unwrap_or_default()
    }

    pub fn get_timeout_secs(&self) -> u64 {
        self.timeout_secs
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    pub fn get_storage(&self) -> StorageBackend {
        self.storage.unwrap_or_default()
    }

    /// Set one field from its textual form, as typed on the command line.
    pub fn set_field(&mut self, key: &str, value: &str) -> crate::Result<()> {
        let invalid = |reason: &str| ConfigError::InvalidValue {
            field: key.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        };

        match key {
            "base_url" => {
                validate_url(value)?;
                self.base_url = Some(value.to_string());
            }
            "api_prefix" => {
                let prefix = value.trim_end_matches('/');
                if !prefix.is_empty() && !prefix.starts_with('/') {
                    return Err(invalid("prefix must start with '/'").into());
                }
                self.api_prefix = Some(prefix.to_string());
            }
            "timeout_secs" => {
                let secs: u64 = value
                    .parse()
                    .map_err(|_| invalid("expected a whole number of seconds"))?;
                if secs == 0 {
                    return Err(invalid("timeout must be greater than zero").into());
                }
                self.timeout_secs = Some(secs);
            }
            "storage" => {
                self.storage = Some(match value {
                    "file" => StorageBackend::File,
                    "keyring" => StorageBackend::Keyring,
                    _ => return Err(invalid("expected 'file' or 'keyring'").into()),
                });
            }
            "maps_api_key" => self.maps_api_key = Some(value.to_string()),
            _ => {
                return Err(ConfigError::UnknownKey {
                    key: key.to_string(),
                }
                .into());
            }
        }
        Ok(())
    }
}
