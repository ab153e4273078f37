//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Variables use the `ROOM_SUBSCRIPTIONS`
//! prefix and `__` between nested keys.
//!
//! # Example
//!
//! ```no_run
//! use room_subscriptions::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! let settings = config.commerce.coordinator_settings();
//! ```

mod commerce;
mod database;
mod environment;
mod error;
mod logging;
mod redis;

pub use commerce::{CommerceConfig, StorePlatform};
pub use database::DatabaseConfig;
pub use environment::Environment;
pub use error::{ConfigError, ValidationError};
pub use logging::LoggingConfig;
pub use redis::RedisConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub environment: Environment,

    /// PostgreSQL profile store
    pub database: DatabaseConfig,

    /// Redis notification fan-out
    pub redis: RedisConfig,

    /// Commerce SDK settings
    pub commerce: CommerceConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `ROOM_SUBSCRIPTIONS` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `ROOM_SUBSCRIPTIONS__DATABASE__URL=...` -> `database.url = ...`
    /// - `ROOM_SUBSCRIPTIONS__COMMERCE__PUBLIC_API_KEY=appl_...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or cannot be
    /// parsed into the expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("ROOM_SUBSCRIPTIONS")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Load and validate in one step.
    pub fn load_validated() -> Result<Self, ConfigError> {
        let config = Self::load()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first invalid section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.database.validate()?;
        self.redis.validate()?;
        self.commerce.validate(&self.environment)?;
        self.logging.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::env;
    use std::sync::Mutex;

    // Env vars are process-global
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "ROOM_SUBSCRIPTIONS__DATABASE__URL",
        "ROOM_SUBSCRIPTIONS__REDIS__URL",
        "ROOM_SUBSCRIPTIONS__COMMERCE__PUBLIC_API_KEY",
        "ROOM_SUBSCRIPTIONS__COMMERCE__MANAGEMENT_URL",
        "ROOM_SUBSCRIPTIONS__ENVIRONMENT",
        "ROOM_SUBSCRIPTIONS__LOGGING__JSON",
    ];

    fn set_minimal_env() {
        env::set_var(
            "ROOM_SUBSCRIPTIONS__DATABASE__URL",
            "postgresql://test@localhost/test",
        );
        env::set_var("ROOM_SUBSCRIPTIONS__REDIS__URL", "redis://localhost:6379");
        env::set_var("ROOM_SUBSCRIPTIONS__COMMERCE__PUBLIC_API_KEY", "appl_test");
    }

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.database.url, "postgresql://test@localhost/test");
        assert_eq!(config.redis.url, "redis://localhost:6379");
        assert_eq!(config.commerce.public_api_key.expose_secret(), "appl_test");
        assert_eq!(config.environment, Environment::Development);
        assert!(!config.logging.json);
    }

    #[test]
    fn test_validate_minimal_config() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load_validated();
        clear_env();

        assert!(result.is_ok(), "Invalid config: {:?}", result.err());
    }

    #[test]
    fn test_missing_commerce_key_fails_to_load() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::remove_var("ROOM_SUBSCRIPTIONS__COMMERCE__PUBLIC_API_KEY");
        let result = AppConfig::load();
        clear_env();

        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }

    #[test]
    fn test_production_rejects_plain_http_management_url() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("ROOM_SUBSCRIPTIONS__ENVIRONMENT", "production");
        env::set_var(
            "ROOM_SUBSCRIPTIONS__COMMERCE__MANAGEMENT_URL",
            "http://example.com/manage",
        );
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.is_production());
        assert_eq!(
            config.validate(),
            Err(ValidationError::ManagementUrlMustBeHttps)
        );
    }

    #[test]
    fn test_json_logging_flag() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("ROOM_SUBSCRIPTIONS__LOGGING__JSON", "true");
        let result = AppConfig::load();
        clear_env();

        assert!(result.unwrap().logging.json);
    }
}
