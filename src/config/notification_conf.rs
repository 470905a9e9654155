use serde::{Deserialize, Serialize};
use std::env;
use tracing::{info, warn};

use crate::config::ConfigError;

/// Addresses and phone numbers that appear in outgoing mail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Inbox that receives contact form messages
    pub contact_inbox: String,
    /// Phone number quoted to requesters when a request is fulfilled
    pub coordination_phone: String,
    /// Name used in subjects and signatures
    pub app_display_name: String,
}

impl NotificationConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading notification configuration from environment variables");
        let contact_inbox = env::var("CONTACT_INBOX")
            .map_err(|_| ConfigError::EnvVarNotFound("CONTACT_INBOX".to_string()))?;
        let coordination_phone = env::var("COORDINATION_PHONE").unwrap_or_else(|_| {
            warn!("COORDINATION_PHONE not set, using default");
            "93538477254".to_string()
        });
        let app_display_name = env::var("APP_DISPLAY_NAME").unwrap_or_else(|_| "Blood Bank".to_string());

        let config = NotificationConfig { contact_inbox, coordination_phone, app_display_name };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.contact_inbox.contains('@') {
            return Err(ConfigError::ValidationError("CONTACT_INBOX must be an email address".to_string()));
        }
        if self.coordination_phone.trim().is_empty() {
            return Err(ConfigError::ValidationError("COORDINATION_PHONE cannot be empty".to_string()));
        }
        Ok(())
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        NotificationConfig {
            contact_inbox: "support@bloodbank.test".to_string(),
            coordination_phone: "93538477254".to_string(),
            app_display_name: "Blood Bank".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(NotificationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_inbox_must_be_address() {
        let config = NotificationConfig { contact_inbox: "support".to_string(), ..Default::default() };
        assert!(config.validate().is_err());
    }
}
