use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::environment::Environment;

/// Default Google Calendar API base.
pub const DEFAULT_CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding config.toml and stored tokens
    #[serde(default = "default_config_dir")]
    pub config_dir: PathBuf,

    /// Deployment environment; `CADENCE_ENV` wins over the file value
    #[serde(default)]
    pub environment: Environment,

    /// Google OAuth client and API settings
    #[serde(default)]
    pub google: GoogleConfig,

    /// Operator alerting
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

/// Google OAuth client and Calendar API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    /// OAuth client ID, needed to refresh expired access tokens
    pub client_id: Option<String>,

    /// OAuth client secret
    pub client_secret: Option<String>,

    /// Calendar API base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

fn default_api_base_url() -> String {
    DEFAULT_CALENDAR_API_BASE.to_string()
}

impl GoogleConfig {
    /// Check if OAuth client credentials are configured (not placeholders)
    pub fn is_configured(&self) -> bool {
        match (&self.client_id, &self.client_secret) {
            (Some(id), Some(secret)) => {
                !id.is_empty()
                    && !secret.is_empty()
                    && !id.starts_with("YOUR_")
                    && !secret.starts_with("YOUR_")
            }
            _ => false,
        }
    }

    /// Returns (client_id, client_secret) when configured.
    pub fn credentials(&self) -> Option<(String, String)> {
        if !self.is_configured() {
            return None;
        }
        Some((self.client_id.clone()?, self.client_secret.clone()?))
    }
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            api_base_url: default_api_base_url(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Webhook that receives operator alerts (e.g. a chat incoming webhook).
    /// Alerts only go to the log when unset.
    pub webhook_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            environment: Environment::default(),
            google: GoogleConfig::default(),
            notifications: NotificationsConfig::default(),
        }
    }
}

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cadence")
}

impl Config {
    /// Load configuration from the user config directory, creating a default
    /// file if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_override()?;
        Ok(config)
    }

    /// Load configuration from an explicit path, creating it with defaults
    /// when missing. Does not consult `CADENCE_ENV`.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let mut config = Self::default();
            if let Some(parent) = path.parent() {
                config.config_dir = parent.to_path_buf();
            }
            config.save_to(path)?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Warnings are logged; errors fail the load.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    fn apply_env_override(&mut self) -> Result<()> {
        if let Some(environment) = Environment::from_env()? {
            tracing::debug!(%environment, "Environment overridden from CADENCE_ENV");
            self.environment = environment;
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        validate_url(&self.google.api_base_url, "google.api_base_url", &mut result);

        if let Some(webhook) = &self.notifications.webhook_url {
            validate_url(webhook, "notifications.webhook_url", &mut result);
        } else if self.environment.is_production() {
            result.add_warning(
                "notifications.webhook_url",
                "No webhook configured - token failures will only be logged",
            );
        }

        if !self.google.is_configured() {
            result.add_warning(
                "google",
                "Google OAuth client not configured - expired tokens cannot be refreshed",
            );
        }

        result
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Directory where service tokens are kept.
    pub fn token_dir(&self) -> PathBuf {
        self.config_dir.join("tokens")
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("cadence");

        Ok(config_dir.join("config.toml"))
    }
}

fn validate_url(url_str: &str, field_name: &str, result: &mut ValidationResult) {
    match Url::parse(url_str) {
        Ok(url) => {
            if url.scheme() != "http" && url.scheme() != "https" {
                result.add_error(
                    field_name,
                    format!("URL must use http or https scheme, got: {}", url.scheme()),
                );
            }

            if url.host().is_none() {
                result.add_error(field_name, "URL must have a host");
            }
        }
        Err(e) => {
            result.add_error(field_name, format!("Invalid URL: {}", e));
        }
    }
}
