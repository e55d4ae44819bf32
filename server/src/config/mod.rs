use std::env;
use std::net::SocketAddr;

use chrono::Duration;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/bidboard";
const DEFAULT_PORT: u16 = 3001;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
/// Two weeks.
const DEFAULT_SESSION_TTL_HOURS: i64 = 336;
/// Ten years.
const MAX_SESSION_TTL_HOURS: i64 = 87_600;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} has an invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    /// In-process store; data is lost on restart.
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    pub session_ttl: Duration,
    pub store_backend: StoreBackend,
    pub cors_allowed_origins: Option<String>,
    pub production: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any variable source; `from_env` passes the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let bind_addr = parse_or(
            "BIND_ADDR",
            lookup("BIND_ADDR"),
            SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
        )?;

        let max_connections = parse_or(
            "DATABASE_MAX_CONNECTIONS",
            lookup("DATABASE_MAX_CONNECTIONS"),
            DEFAULT_MAX_CONNECTIONS,
        )?;
        if max_connections == 0 {
            return Err(ConfigError::Invalid {
                name: "DATABASE_MAX_CONNECTIONS",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let ttl_hours: i64 = parse_or(
            "SESSION_TTL_HOURS",
            lookup("SESSION_TTL_HOURS"),
            DEFAULT_SESSION_TTL_HOURS,
        )?;
        let session_ttl = (1..=MAX_SESSION_TTL_HOURS)
            .contains(&ttl_hours)
            .then(|| Duration::try_hours(ttl_hours))
            .flatten()
            .ok_or_else(|| ConfigError::Invalid {
                name: "SESSION_TTL_HOURS",
                value: ttl_hours.to_string(),
                reason: format!("must be between 1 and {MAX_SESSION_TTL_HOURS}"),
            })?;

        let store_backend = match lookup("STORE_BACKEND").as_deref().map(str::trim) {
            None | Some("") | Some("postgres") => StoreBackend::Postgres,
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "STORE_BACKEND",
                    value: other.to_string(),
                    reason: "expected 'postgres' or 'memory'".to_string(),
                })
            }
        };

        let production = lookup("RUST_ENV")
            .map(|value| value.to_lowercase() == "production")
            .unwrap_or(false);

        Ok(Self {
            database_url,
            bind_addr,
            max_connections,
            session_ttl,
            store_backend,
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS"),
            production,
        })
    }
}

fn parse_or<T>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let Some(value) = raw else {
        return Ok(default);
    };
    let parsed = value.trim().parse::<T>();
    parsed.map_err(|err| ConfigError::Invalid {
        name,
        reason: err.to_string(),
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config(&[]).unwrap();
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.bind_addr.port(), 3001);
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.session_ttl, Duration::hours(336));
        assert_eq!(config.store_backend, StoreBackend::Postgres);
        assert!(!config.production);
    }

    #[test]
    fn reads_overrides() {
        let config = config(&[
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("SESSION_TTL_HOURS", "12"),
            ("STORE_BACKEND", "memory"),
            ("RUST_ENV", "Production"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.session_ttl, Duration::hours(12));
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert!(config.production);
    }

    #[test]
    fn accepts_the_longest_session_ttl() {
        let config = config(&[("SESSION_TTL_HOURS", "87600")]).unwrap();
        assert_eq!(config.session_ttl, Duration::hours(MAX_SESSION_TTL_HOURS));
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(config(&[("BIND_ADDR", "nowhere")]).is_err());
        assert!(config(&[("DATABASE_MAX_CONNECTIONS", "0")]).is_err());
        assert!(config(&[("SESSION_TTL_HOURS", "-3")]).is_err());
        assert!(config(&[("SESSION_TTL_HOURS", "87601")]).is_err());
        assert!(config(&[("SESSION_TTL_HOURS", "2500000000")]).is_err());
        assert!(config(&[("SESSION_TTL_HOURS", "9999999999999")]).is_err());
        let err = config(&[("STORE_BACKEND", "redis")]).unwrap_err();
        assert!(err.to_string().contains("STORE_BACKEND"));
    }
}
