use std::env;
use std::str::FromStr;

use chrono::Duration;
use thiserror::Error;

/// Lowest and highest work factors bcrypt accepts.
pub const MIN_BCRYPT_COST: u32 = 4;
pub const MAX_BCRYPT_COST: u32 = 31;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Runtime settings read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub server_port: u16,
    pub server_host: String,
    pub jwt_secret: String,
    pub jwt_expires_in: Duration,
    pub bcrypt_cost: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = required(&lookup, "JWT_SECRET")?;
        if jwt_secret.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "JWT_SECRET",
                value: jwt_secret,
            });
        }

        let bcrypt_cost = parsed(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                key: "BCRYPT_COST",
                value: bcrypt_cost.to_string(),
            });
        }

        // Must be positive and small enough to be represented as a Duration
        let jwt_expires_in_secs: i64 = parsed(&lookup, "JWT_EXPIRES_IN_SECS", 3600)?;
        let jwt_expires_in = Duration::try_seconds(jwt_expires_in_secs)
            .filter(|ttl| *ttl > Duration::zero())
            .ok_or_else(|| ConfigError::Invalid {
                key: "JWT_EXPIRES_IN_SECS",
                value: jwt_expires_in_secs.to_string(),
            })?;

        Ok(Self {
            database_url: required(&lookup, "DATABASE_URL")?,
            database_max_connections: parsed(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?,
            server_port: parsed(&lookup, "SERVER_PORT", 3000)?,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            jwt_secret,
            jwt_expires_in,
            bcrypt_cost,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).ok_or(ConfigError::Missing(key))
}

fn parsed<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}
