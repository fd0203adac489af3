//! Database configuration - environment loading
//!
//! Configuration is loaded from environment variables:
//! - `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD`, `DB_NAME` (required)
//! - `DB_ADMIN_NAME`: administrative database used while provisioning (default: postgres)
//! - `DB_CONNECT_ATTEMPTS`, `DB_CONNECT_DELAY_MS`: connection retry policy

use std::time::Duration;

use sqlx::postgres::PgConnectOptions;

use crate::db::RetryPolicy;

/// Administrative database every Postgres server ships with.
pub const DEFAULT_ADMIN_DATABASE: &str = "postgres";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {var}: '{value}'")]
    Invalid { var: &'static str, value: String },
}

/// Connection settings for the database server
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// Application database, created at startup if absent
    pub database: String,
    /// Database to connect to while checking/creating `database`
    pub admin_database: String,
    pub retry: RetryPolicy,
}

impl DatabaseConfig {
    /// Create config from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = required("DB_PORT")?;
        let port = port
            .parse()
            .map_err(|_| ConfigError::Invalid { var: "DB_PORT", value: port })?;

        let mut retry = RetryPolicy::default();
        if let Some(attempts) = optional("DB_CONNECT_ATTEMPTS") {
            retry.max_attempts = attempts.parse().map_err(|_| ConfigError::Invalid {
                var: "DB_CONNECT_ATTEMPTS",
                value: attempts,
            })?;
        }
        if let Some(delay) = optional("DB_CONNECT_DELAY_MS") {
            let millis: u64 = delay.parse().map_err(|_| ConfigError::Invalid {
                var: "DB_CONNECT_DELAY_MS",
                value: delay,
            })?;
            retry.delay = Duration::from_millis(millis);
        }

        Ok(Self {
            host: required("DB_HOST")?,
            port,
            user: required("DB_USER")?,
            password: required("DB_PASSWORD")?,
            database: required("DB_NAME")?,
            admin_database: optional("DB_ADMIN_NAME")
                .unwrap_or_else(|| DEFAULT_ADMIN_DATABASE.to_owned()),
            retry,
        })
    }

    /// Connect options for the application database
    pub fn connect_options(&self) -> PgConnectOptions {
        self.options_for(&self.database)
    }

    /// Connect options for the administrative database
    pub fn admin_connect_options(&self) -> PgConnectOptions {
        self.options_for(&self.admin_database)
    }

    fn options_for(&self, database: &str) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(database)
    }
}

fn required(var: &'static str) -> Result<String, ConfigError> {
    optional(var).ok_or(ConfigError::Missing(var))
}

fn optional(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DatabaseConfig {
        DatabaseConfig {
            host: "db.internal".into(),
            port: 5433,
            user: "roster".into(),
            password: "secret".into(),
            database: "roster_app".into(),
            admin_database: DEFAULT_ADMIN_DATABASE.into(),
            retry: RetryPolicy::default(),
        }
    }

    #[test]
    fn connect_options_target_the_application_database() {
        let config = sample();
        let options = config.connect_options();
        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 5433);
        assert_eq!(options.get_username(), "roster");
        assert_eq!(options.get_database(), Some("roster_app"));
    }

    #[test]
    fn admin_options_target_the_admin_database() {
        let options = sample().admin_connect_options();
        assert_eq!(options.get_database(), Some("postgres"));
    }

    #[test]
    fn error_display() {
        let err = ConfigError::Invalid {
            var: "DB_PORT",
            value: "abc".into(),
        };
        assert_eq!(err.to_string(), "invalid value for DB_PORT: 'abc'");
        assert_eq!(
            ConfigError::Missing("DB_HOST").to_string(),
            "missing required environment variable DB_HOST"
        );
    }
}
