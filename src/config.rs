// src/config.rs
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::{ClientError, Result};

pub const MAX_UPLOAD_BYTES: u64 = 16 * 1024 * 1024;
pub const MAX_NOTIFICATION_TTL_SECS: u64 = 3600;

/// Credentials for the classification backend's `/login`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BackendCredentials {
    pub email: String,
    pub password: String,
}

/// Connection settings for the classification backend.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BackendConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub credentials: Option<BackendCredentials>,
    /// No timeout when unset; a hung request keeps the loading indicator up.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            credentials: None,
            request_timeout_secs: None,
        }
    }
}

impl BackendConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Client-side limits that form an implicit contract with the backend.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct UploadConfig {
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
    #[serde(default = "default_max_upload_bytes")]
    pub max_bytes: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: default_allowed_extensions(),
            max_bytes: default_max_upload_bytes(),
        }
    }
}

/// High-level application configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default = "default_notification_ttl_secs")]
    pub notification_ttl_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            backend: BackendConfig::default(),
            upload: UploadConfig::default(),
            notification_ttl_secs: default_notification_ttl_secs(),
        }
    }
}

// One browser session per process, so stay on loopback unless told otherwise.
fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_api_base() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_allowed_extensions() -> Vec<String> {
    vec![".xlsx".to_string(), ".xls".to_string(), ".csv".to_string()]
}

fn default_max_upload_bytes() -> u64 {
    MAX_UPLOAD_BYTES
}

fn default_notification_ttl_secs() -> u64 {
    crate::notify::DEFAULT_TTL_SECS
}

impl AppConfig {
    /// Parses a TOML document; omitted keys take their defaults.
    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Loads the TOML file at `path`, or the defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(AppConfig::default());
        }
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    /// `BLOOMSCOPE_CONFIG` if set, else `<config dir>/bloomscope/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("BLOOMSCOPE_CONFIG") {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|dir| dir.join("bloomscope").join("config.toml"))
    }

    /// Loads the config file (if any), then applies environment overrides.
    pub fn from_env() -> Result<Self> {
        let mut config = match Self::default_path() {
            Some(path) => Self::load(&path)?,
            None => AppConfig::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `BLOOMSCOPE_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("BLOOMSCOPE_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("BLOOMSCOPE_PORT") {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| ClientError::Config(format!("invalid BLOOMSCOPE_PORT '{}'", port)))?;
        }
        if let Some(api_base) = lookup("BLOOMSCOPE_BACKEND_URL") {
            self.backend.api_base = api_base;
        }
        if let Some(timeout) = lookup("BLOOMSCOPE_REQUEST_TIMEOUT_SECS") {
            let secs = timeout.trim().parse().map_err(|_| {
                ClientError::Config(format!("invalid BLOOMSCOPE_REQUEST_TIMEOUT_SECS '{}'", timeout))
            })?;
            self.backend.request_timeout_secs = Some(secs);
        }
        if let (Some(email), Some(password)) =
            (lookup("BLOOMSCOPE_BACKEND_EMAIL"), lookup("BLOOMSCOPE_BACKEND_PASSWORD"))
        {
            self.backend.credentials = Some(BackendCredentials { email, password });
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.backend.api_base.trim().is_empty() {
            return Err(ClientError::Config("backend api_base must not be empty".to_string()));
        }
        if self.upload.allowed_extensions.is_empty() {
            return Err(ClientError::Config("at least one upload extension is required".to_string()));
        }
        if let Some(bad) = self.upload.allowed_extensions.iter().find(|e| !e.starts_with('.')) {
            return Err(ClientError::Config(format!(
                "upload extension '{}' must start with a dot",
                bad
            )));
        }
        if self.notification_ttl_secs == 0 || self.notification_ttl_secs > MAX_NOTIFICATION_TTL_SECS {
            return Err(ClientError::Config(format!(
                "notification_ttl_secs must be between 1 and {}",
                MAX_NOTIFICATION_TTL_SECS
            )));
        }
        Ok(())
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_secs(self.notification_ttl_secs)
    }
}
