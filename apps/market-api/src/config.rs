//! API server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! development defaults.

use std::env;

use market_core::DEFAULT_ORDER_NO_ATTEMPTS;
use market_db::order_no::DEFAULT_PREFIX;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// HTTP listen port
    pub http_port: u16,

    /// Path to the SQLite database file
    pub database_path: String,

    /// Secret for signing admin JWTs
    pub jwt_secret: String,

    /// Admin token lifetime in seconds
    pub jwt_lifetime_secs: i64,

    /// Prefix of generated order numbers
    pub order_no_prefix: String,

    /// Order-number insert attempts before the request fails
    pub order_no_attempts: u32,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ApiConfig {
            http_port: env::var("HTTP_PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("HTTP_PORT".to_string()))?,

            database_path: env::var("DATABASE_PATH").unwrap_or_else(|_| "./market.db".to_string()),

            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| {
                // Development fallback only; production MUST set the variable
                "market-dev-secret-change-in-production".to_string()
            }),

            jwt_lifetime_secs: env::var("JWT_LIFETIME_SECS")
                .unwrap_or_else(|_| "86400".to_string()) // 24 hours
                .parse()
                .map_err(|_| ConfigError::InvalidValue("JWT_LIFETIME_SECS".to_string()))?,

            order_no_prefix: env::var("ORDER_NO_PREFIX")
                .unwrap_or_else(|_| DEFAULT_PREFIX.to_string()),

            order_no_attempts: env::var("ORDER_NO_ATTEMPTS")
                .unwrap_or_else(|_| DEFAULT_ORDER_NO_ATTEMPTS.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("ORDER_NO_ATTEMPTS".to_string()))?,
        };

        Ok(config)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
