use serde::{Deserialize, Serialize};
use std::env;
use tracing::{info, warn};

use crate::config::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentConfig {
    /// Currency label attached to payment prompts
    pub currency: String,
    /// Make the simulated gateway decline every charge
    pub simulate_decline: bool,
}

impl PaymentConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading payment configuration from environment variables");
        let currency = env::var("PAYMENT_CURRENCY").unwrap_or_else(|_| {
            warn!("PAYMENT_CURRENCY not set, defaulting to INR");
            "INR".to_string()
        });
        let simulate_decline = match env::var("PAYMENT_SIMULATE_DECLINE") {
            Ok(raw) => raw.parse::<bool>().map_err(|_| {
                ConfigError::InvalidValue("Invalid PAYMENT_SIMULATE_DECLINE value".to_string())
            })?,
            Err(_) => false,
        };
        let config = PaymentConfig { currency, simulate_decline };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ConfigError::ValidationError(format!(
                "PAYMENT_CURRENCY must be a 3-letter ISO code, got '{}'",
                self.currency
            )));
        }
        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        PaymentConfig { currency: "INR".to_string(), simulate_decline: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_code_validation() {
        assert!(PaymentConfig::default().validate().is_ok());
        let config = PaymentConfig { currency: "rupees".to_string(), simulate_decline: false };
        assert!(config.validate().is_err());
    }
}
