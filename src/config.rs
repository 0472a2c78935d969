//! Application configuration loaded once at start-up.

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Credentials of the admin account created at start-up.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub email: String,
    pub username: String,
    pub password: String,
}

/// Server configuration.
///
/// Reads from environment variables:
/// - `DATABASE_URL`: store connection string (required)
/// - `JWT_SECRET`: token signing secret (required)
/// - `HOST` / `PORT`: bind address (default: `0.0.0.0:3000`)
/// - `DB_MAX_CONNECTIONS`: pool size (default: `10`)
/// - `TOKEN_TTL_SECONDS`: token lifetime (default: `7200`)
/// - `ADMIN_EMAIL`, `ADMIN_USERNAME`, `ADMIN_PASSWORD`: optional bootstrap admin
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub token_ttl_seconds: i64,
    pub admin: Option<AdminSeed>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let admin = match (
            lookup("ADMIN_EMAIL"),
            lookup("ADMIN_USERNAME"),
            lookup("ADMIN_PASSWORD"),
        ) {
            (Some(email), Some(username), Some(password)) => Some(AdminSeed {
                email,
                username,
                password,
            }),
            _ => None,
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or("PORT", lookup("PORT"), 3000)?,
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", lookup("DB_MAX_CONNECTIONS"), 10)?,
            token_ttl_seconds: parse_or("TOKEN_TTL_SECONDS", lookup("TOKEN_TTL_SECONDS"), 7200)?,
            admin,
        })
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("JWT_SECRET", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.addr(), "0.0.0.0:3000");
        assert_eq!(config.db_max_connections, 10);
        assert_eq!(config.token_ttl_seconds, 7200);
        assert!(config.admin.is_none());
    }

    #[test]
    fn test_missing_secret() {
        let err = Config::from_lookup(lookup_from(&[("DATABASE_URL", "sqlite::memory:")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::Missing("JWT_SECRET"));
    }

    #[test]
    fn test_invalid_port() {
        let err = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("JWT_SECRET", "secret"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                name: "PORT",
                value: "eighty".to_string()
            }
        );
    }

    #[test]
    fn test_admin_seed_needs_all_three() {
        let partial = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("JWT_SECRET", "secret"),
            ("ADMIN_EMAIL", "admin@example.com"),
        ]))
        .unwrap();
        assert!(partial.admin.is_none());

        let full = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("JWT_SECRET", "secret"),
            ("ADMIN_EMAIL", "admin@example.com"),
            ("ADMIN_USERNAME", "admin"),
            ("ADMIN_PASSWORD", "Secret15"),
        ]))
        .unwrap();
        assert_eq!(full.admin.unwrap().username, "admin");
    }
}
