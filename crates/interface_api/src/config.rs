//! API configuration
//!
//! Read from `API_*` environment variables (a `.env` file is honoured),
//! falling back to local development defaults.

use serde::Deserialize;

/// API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// PostgreSQL connection string
    pub database_url: String,
    /// Redis connection string for driver notifications
    pub redis_url: String,
    /// Log level
    pub log_level: String,
    /// `production` hides internal error details from responses
    pub environment: String,
    /// Seeds the global commission setting on first read
    pub default_commission_percent: f64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: "postgres://localhost/stay_settlement".to_string(),
            redis_url: "redis://127.0.0.1:6379".to_string(),
            log_level: "info".to_string(),
            environment: "development".to_string(),
            default_commission_percent: 10.0,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from the environment
    ///
    /// Every field has a default; `API_PORT=9000` overrides just the port.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let _ = dotenvy::dotenv();
        let defaults = Self::default();

        config::Config::builder()
            .set_default("host", defaults.host)?
            .set_default("port", defaults.port as i64)?
            .set_default("database_url", defaults.database_url)?
            .set_default("redis_url", defaults.redis_url)?
            .set_default("log_level", defaults.log_level)?
            .set_default("environment", defaults.environment)?
            .set_default("default_commission_percent", defaults.default_commission_percent)?
            .add_source(config::Environment::with_prefix("API").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.server_addr(), "0.0.0.0:8080");
        assert!(!config.is_production());
        assert_eq!(config.default_commission_percent, 10.0);
    }

    #[test]
    fn test_production_flag_ignores_case() {
        let config = ApiConfig {
            environment: "Production".to_string(),
            ..ApiConfig::default()
        };
        assert!(config.is_production());
    }
}
