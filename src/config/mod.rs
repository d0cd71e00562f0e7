use chrono::Duration;
use std::env;
use std::ops::RangeInclusive;
use thiserror::Error;

/// Secret used when `JWT_SECRET` is unset in development. Never accepted elsewhere.
const DEVELOPMENT_JWT_SECRET: &str = "floki-development-secret";

/// One hour up to one year.
const JWT_EXPIRY_HOURS: RangeInclusive<u64> = 1..=8760;

/// One minute up to one week.
const RECOVER_TOKEN_EXPIRY_MINUTES: RangeInclusive<u64> = 1..=10080;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    /// Seconds to wait for a pooled connection.
    pub connection_timeout: u64,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub recover_token_expiry_minutes: u64,
}

impl SecurityConfig {
    /// Bearer token lifetime. `None` when the configured hours overflow.
    pub fn jwt_expiry(&self) -> Option<Duration> {
        i64::try_from(self.jwt_expiry_hours)
            .ok()
            .and_then(Duration::try_hours)
    }

    /// Recovery code lifetime. `None` when the configured minutes overflow.
    pub fn recover_token_expiry(&self) -> Option<Duration> {
        i64::try_from(self.recover_token_expiry_minutes)
            .ok()
            .and_then(Duration::try_minutes)
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides(|name| env::var(name).ok())
    }

    fn with_env_overrides<F>(mut self, var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        // Server overrides
        if let Some(v) = var("PORT") {
            self.server.port = parse("PORT", v)?;
        }

        // Database overrides
        if let Some(v) = var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Some(v) = var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse("DATABASE_MAX_CONNECTIONS", v)?;
        }
        if let Some(v) = var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = parse("DATABASE_CONNECTION_TIMEOUT", v)?;
        }

        // Security overrides
        match var("JWT_SECRET").filter(|s| !s.trim().is_empty()) {
            Some(secret) => self.security.jwt_secret = secret,
            None if self.environment == Environment::Development => {
                tracing::warn!("JWT_SECRET not set, using the development secret");
                self.security.jwt_secret = DEVELOPMENT_JWT_SECRET.to_string();
            }
            None => return Err(ConfigError::Missing("JWT_SECRET")),
        }
        if let Some(v) = var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours =
                parse_in_range("SECURITY_JWT_EXPIRY_HOURS", v, JWT_EXPIRY_HOURS)?;
        }
        if let Some(v) = var("SECURITY_RECOVER_TOKEN_EXPIRY_MINUTES") {
            self.security.recover_token_expiry_minutes =
                parse_in_range("SECURITY_RECOVER_TOKEN_EXPIRY_MINUTES", v, RECOVER_TOKEN_EXPIRY_MINUTES)?;
        }

        Ok(self)
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { port: 3333 },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24 * 7, // 1 week
                recover_token_expiry_minutes: 60,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig { port: 3333 },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                recover_token_expiry_minutes: 30,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig { port: 3333 },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24 * 7,
                recover_token_expiry_minutes: 15,
            },
        }
    }

    /// Development profile with a fixed secret, for tests and local tooling.
    pub fn for_tests() -> Self {
        let mut config = Self::development();
        config.security.jwt_secret = "floki-test-secret".to_string();
        config
    }
}

fn parse<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value })
}

fn parse_in_range(
    name: &'static str,
    value: String,
    range: RangeInclusive<u64>,
) -> Result<u64, ConfigError> {
    let parsed: u64 = parse(name, value.clone())?;
    if range.contains(&parsed) {
        Ok(parsed)
    } else {
        Err(ConfigError::Invalid { name, value })
    }
}
