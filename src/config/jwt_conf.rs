use std::env;
use tracing::{debug, error, info, warn};

use crate::config::ConfigError;

/// JWT configuration structure
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// JWT secret key for signing tokens
    pub jwt_secret: String,
    /// Access token expiration time in minutes
    pub access_token_expiration: i64,
    /// Refresh token expiration time in minutes
    pub refresh_token_expiration: i64,
}

impl JwtConfig {
    /// Load JWT configuration from environment variables
    ///
    /// Expected environment variables:
    /// - JWT_SECRET: Secret key for signing JWT tokens (required, 32+ chars)
    /// - JWT_ACCESS_TOKEN_EXPIRY: Access token expiration in minutes (defaults to 15)
    /// - JWT_REFRESH_TOKEN_EXPIRY: Refresh token expiration in minutes (defaults to 10080 = 1 week)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_prefixed_env("")
    }

    /// Same as `from_env` but reads `TEST_` prefixed variables.
    pub fn from_test_env() -> Result<Self, ConfigError> {
        Self::from_prefixed_env("TEST_")
    }

    fn from_prefixed_env(prefix: &str) -> Result<Self, ConfigError> {
        info!("Loading JWT configuration from {}environment variables", prefix);

        let secret_var = format!("{prefix}JWT_SECRET");
        let jwt_secret = env::var(&secret_var).map_err(|_| {
            error!("{} environment variable not found", secret_var);
            ConfigError::EnvVarNotFound(secret_var.clone())
        })?;
        debug!("JWT secret loaded (length: {} chars)", jwt_secret.len());

        let access_token_expiration = Self::minutes_var(&format!("{prefix}JWT_ACCESS_TOKEN_EXPIRY"), 15)?;
        let refresh_token_expiration = Self::minutes_var(&format!("{prefix}JWT_REFRESH_TOKEN_EXPIRY"), 10080)?;

        let config = JwtConfig {
            jwt_secret,
            access_token_expiration,
            refresh_token_expiration,
        };
        config.validate()?;

        info!("JWT configuration loaded successfully");
        Ok(config)
    }

    fn minutes_var(name: &str, default: i64) -> Result<i64, ConfigError> {
        match env::var(name) {
            Ok(raw) => raw.parse::<i64>().map_err(|e| {
                error!("Invalid {} value: {}", name, e);
                ConfigError::InvalidValue(format!("{name}: {e}"))
            }),
            Err(_) => {
                warn!("{} not set, using default: {} minutes", name, default);
                Ok(default)
            }
        }
    }

    /// Validate the JWT configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.len() < 32 {
            error!("JWT secret is too short (minimum 32 characters required)");
            return Err(ConfigError::ValidationError("JWT secret must be at least 32 characters long".to_string()));
        }

        if self.access_token_expiration <= 0 || self.refresh_token_expiration <= 0 {
            error!("Token expirations must be greater than 0");
            return Err(ConfigError::ValidationError("Token expirations must be greater than 0".to_string()));
        }

        if self.access_token_expiration >= self.refresh_token_expiration {
            warn!("Access token expiration is greater than or equal to refresh token expiration");
        }
        Ok(())
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        JwtConfig {
            jwt_secret: "test_secret_key_for_blood_app_tokens_long_enough_for_hs256".to_string(),
            access_token_expiration: 15,
            refresh_token_expiration: 10080,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(JwtConfig::default().validate().is_ok());
    }

    #[test]
    fn test_short_secret_rejected() {
        let config = JwtConfig { jwt_secret: "short".to_string(), ..JwtConfig::default() };
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_non_positive_expiry_rejected() {
        let config = JwtConfig { access_token_expiration: 0, ..JwtConfig::default() };
        assert!(config.validate().is_err());
    }
}
