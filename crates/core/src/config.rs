//! Configuration management
//!
//! This module handles loading the optional swift configuration file.
//! The configuration file is stored in YAML format at ~/.swift.yaml unless
//! another path is given on the command line. Every key is optional; values
//! found in the process environment take precedence over the file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name, looked up in the home directory
pub const DEFAULT_CONFIG_FILE: &str = ".swift.yaml";

/// Timeout configuration for the HTTP transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Connection timeout in milliseconds
    #[serde(default = "default_connect_timeout")]
    pub connect_ms: u64,

    /// Read timeout in milliseconds
    #[serde(default = "default_read_timeout")]
    pub read_ms: u64,
}

fn default_connect_timeout() -> u64 {
    5000
}

fn default_read_timeout() -> u64 {
    30000
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_ms: default_connect_timeout(),
            read_ms: default_read_timeout(),
        }
    }
}

/// Main configuration structure
///
/// Field names mirror the OpenStack `OS_*` environment variables with the
/// prefix removed and lower-cased.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub auth_url: Option<String>,
    pub username: Option<String>,
    pub user_id: Option<String>,
    pub password: Option<String>,
    pub token: Option<String>,
    pub user_domain_name: Option<String>,
    pub user_domain_id: Option<String>,
    pub project_name: Option<String>,
    pub project_id: Option<String>,
    pub project_domain_name: Option<String>,
    pub project_domain_id: Option<String>,
    pub domain_name: Option<String>,
    pub domain_id: Option<String>,
    pub application_credential_id: Option<String>,
    pub application_credential_name: Option<String>,
    pub application_credential_secret: Option<String>,
    pub region: Option<String>,
    pub interface: Option<String>,

    /// Transport timeouts
    pub timeout: Option<TimeoutConfig>,

    /// Number of names requested per listing page
    pub page_size: Option<u32>,
}

impl Config {
    /// Look up the file value backing an `OS_*` environment variable
    pub fn value_for(&self, var: &str) -> Option<&str> {
        let value = match var {
            "OS_AUTH_URL" => &self.auth_url,
            "OS_USERNAME" => &self.username,
            "OS_USERID" => &self.user_id,
            "OS_PASSWORD" => &self.password,
            "OS_TOKEN" => &self.token,
            "OS_USER_DOMAIN_NAME" => &self.user_domain_name,
            "OS_USER_DOMAIN_ID" => &self.user_domain_id,
            "OS_PROJECT_NAME" => &self.project_name,
            "OS_PROJECT_ID" => &self.project_id,
            "OS_PROJECT_DOMAIN_NAME" => &self.project_domain_name,
            "OS_PROJECT_DOMAIN_ID" => &self.project_domain_id,
            "OS_DOMAIN_NAME" => &self.domain_name,
            "OS_DOMAIN_ID" => &self.domain_id,
            "OS_APPLICATION_CREDENTIAL_ID" => &self.application_credential_id,
            "OS_APPLICATION_CREDENTIAL_NAME" => &self.application_credential_name,
            "OS_APPLICATION_CREDENTIAL_SECRET" => &self.application_credential_secret,
            "OS_REGION_NAME" => &self.region,
            "OS_INTERFACE" => &self.interface,
            _ => return None,
        };
        value.as_deref()
    }

    /// Get the effective timeout configuration
    pub fn timeout_config(&self) -> TimeoutConfig {
        self.timeout.clone().unwrap_or_default()
    }
}

/// Configuration manager handles locating and loading the config file
#[derive(Debug)]
pub struct ConfigManager {
    config_path: PathBuf,
    explicit: bool,
}

impl ConfigManager {
    /// Create a new ConfigManager with the default config path ($HOME/.swift.yaml)
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".into()))?;
        Ok(Self {
            config_path: home.join(DEFAULT_CONFIG_FILE),
            explicit: false,
        })
    }

    /// Create a ConfigManager for a file named on the command line
    ///
    /// Unlike the default location, an explicit file must exist.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            explicit: true,
        }
    }

    /// Pick the explicit path if one was given, the default location otherwise
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Ok(Self::with_path(p)),
            None => Self::new(),
        }
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load configuration from disk
    ///
    /// A missing default file yields an empty configuration; a missing
    /// explicit file is an error.
    pub fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            if self.explicit {
                return Err(Error::Config(format!(
                    "Configuration file not found: {}",
                    self.config_path.display()
                )));
            }
            tracing::debug!(path = %self.config_path.display(), "no configuration file");
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&self.config_path)?;
        if content.trim().is_empty() {
            return Ok(Config::default());
        }
        let config: Config = serde_yaml::from_str(&content)?;
        tracing::debug!(path = %self.config_path.display(), "loaded configuration file");
        Ok(config)
    }
}
