//! Server configuration.
//!
//! Loaded from a YAML file, then overridden from the environment.

use std::path::Path;

use perkdesk_auth::AuthConfig;
use perkdesk_core::lockout::DEFAULT_FAILED_LOGIN_WARNING_THRESHOLD;
use perkdesk_db::DbConfig;
use serde::Deserialize;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub auth: AuthSettings,
}

/// SurrealDB connection settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        let db = DbConfig::default();
        Self {
            url: db.url,
            namespace: db.namespace,
            database: db.database,
            username: db.username,
            password: db.password,
        }
    }
}

/// Admin authentication settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub pepper: Option<String>,
    pub min_password_length: usize,
    pub failed_login_warning_threshold: u32,
    /// Seconds between background unlock sweeps; `0` disables the sweeper.
    pub auto_unlock_sweep_interval_secs: u64,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            pepper: None,
            min_password_length: 8,
            failed_login_warning_threshold: DEFAULT_FAILED_LOGIN_WARNING_THRESHOLD,
            auto_unlock_sweep_interval_secs: 60,
        }
    }
}

impl Config {
    /// Load from `PERKDESK_CONFIG` (default `perkdesk.yaml`), falling back
    /// to defaults when the file does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("PERKDESK_CONFIG").unwrap_or_else(|_| "perkdesk.yaml".to_string());

        let mut config = if Path::new(&config_path).exists() {
            Self::from_file(&config_path)?
        } else {
            Self::default()
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(url) = std::env::var("PERKDESK_DB_URL") {
            self.database.url = url;
        }
        if let Ok(ns) = std::env::var("PERKDESK_DB_NS") {
            self.database.namespace = ns;
        }
        if let Ok(db) = std::env::var("PERKDESK_DB_NAME") {
            self.database.database = db;
        }
        if let Ok(user) = std::env::var("PERKDESK_DB_USER") {
            self.database.username = user;
        }
        if let Ok(pass) = std::env::var("PERKDESK_DB_PASS") {
            self.database.password = pass;
        }
        if let Ok(pepper) = std::env::var("PERKDESK_PASSWORD_PEPPER") {
            self.auth.pepper = Some(pepper);
        }
        if let Ok(secs) = std::env::var("PERKDESK_UNLOCK_SWEEP_SECS") {
            self.auth.auto_unlock_sweep_interval_secs = secs
                .parse()
                .map_err(|_| ConfigError::InvalidEnv("PERKDESK_UNLOCK_SWEEP_SECS", secs))?;
        }
        Ok(())
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            url: self.database.url.clone(),
            namespace: self.database.namespace.clone(),
            database: self.database.database.clone(),
            username: self.database.username.clone(),
            password: self.database.password.clone(),
        }
    }

    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig {
            pepper: self.auth.pepper.clone(),
            min_password_length: self.auth.min_password_length,
            failed_login_warning_threshold: self.auth.failed_login_warning_threshold,
            auto_unlock_sweep_interval_secs: match self.auth.auto_unlock_sweep_interval_secs {
                0 => None,
                secs => Some(secs),
            },
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{0}': {1}")]
    FileRead(String, String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid value for {0}: '{1}'")]
    InvalidEnv(&'static str, String),
}
