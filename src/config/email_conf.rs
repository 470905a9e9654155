use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use tracing::{debug, error, info, warn};

use crate::config::ConfigError;

/// SMTP settings used for request notifications and contact forwarding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub use_tls: bool,
    pub use_starttls: bool,
    /// Sender address
    pub from_email: String,
    /// Sender display name
    pub from_name: String,
    pub connection_timeout_secs: u64,
}

fn required(name: &str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| {
        error!("{} environment variable not found", name);
        ConfigError::EnvVarNotFound(name.to_string())
    })
}

fn optional<T: FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.parse::<T>().map_err(|_| {
            error!("Invalid {} value", name);
            ConfigError::InvalidValue(format!("Invalid {name} value"))
        }),
        Err(_) => {
            warn!("{} not set, using default", name);
            Ok(default)
        }
    }
}

impl EmailConfig {
    /// Expected environment variables: SMTP_HOST, SMTP_USERNAME, SMTP_PASSWORD and
    /// SMTP_FROM_EMAIL (required); SMTP_PORT, SMTP_USE_TLS, SMTP_USE_STARTTLS,
    /// SMTP_FROM_NAME and SMTP_CONNECTION_TIMEOUT (optional).
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading email configuration from environment variables");

        let config = EmailConfig {
            smtp_host: required("SMTP_HOST")?,
            smtp_port: optional("SMTP_PORT", 587)?,
            smtp_username: required("SMTP_USERNAME")?,
            smtp_password: required("SMTP_PASSWORD")?,
            use_tls: optional("SMTP_USE_TLS", true)?,
            use_starttls: optional("SMTP_USE_STARTTLS", true)?,
            from_email: required("SMTP_FROM_EMAIL")?,
            from_name: optional("SMTP_FROM_NAME", "Blood Bank".to_string())?,
            connection_timeout_secs: optional("SMTP_CONNECTION_TIMEOUT", 30)?,
        };
        debug!(host = %config.smtp_host, port = config.smtp_port, "SMTP server");

        config.validate()?;
        info!("Email configuration loaded successfully");
        Ok(config)
    }

    /// Local mail catcher settings, no TLS
    pub fn from_test_env() -> Self {
        EmailConfig {
            smtp_host: "localhost".to_string(),
            smtp_port: 1025,
            smtp_username: "test".to_string(),
            smtp_password: "test".to_string(),
            use_tls: false,
            use_starttls: false,
            from_email: "noreply@bloodbank.test".to_string(),
            from_name: "Blood Bank Test".to_string(),
            connection_timeout_secs: 10,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.smtp_host.is_empty() {
            return Err(ConfigError::ValidationError("SMTP host cannot be empty".to_string()));
        }

        if self.smtp_port == 0 {
            return Err(ConfigError::ValidationError("SMTP port cannot be 0".to_string()));
        }

        if self.from_email.is_empty() || !self.from_email.contains('@') {
            error!("Invalid from email: {}", self.from_email);
            return Err(ConfigError::ValidationError("Invalid from email format".to_string()));
        }

        if self.connection_timeout_secs == 0 {
            return Err(ConfigError::ValidationError("Connection timeout cannot be 0".to_string()));
        }

        Ok(())
    }

    pub fn get_smtp_url(&self) -> String {
        format!("{}:{}", self.smtp_host, self.smtp_port)
    }
}
