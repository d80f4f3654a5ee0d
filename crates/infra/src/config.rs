//! Process configuration read from the environment.

use std::net::SocketAddr;

use thiserror::Error;
use tracing::warn;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEV_JWT_SECRET: &str = "dev-secret";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_MEDIA_URL: &str = "/media/";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} has an invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0} must be set")]
    Missing(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub use_persistent_stores: bool,
    /// Required when `use_persistent_stores` is set.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    /// Prefix joined with stored image paths, e.g. `/media/`.
    pub media_url: String,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build settings from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let bind_addr = parse("BIND_ADDR", var("BIND_ADDR"), DEFAULT_BIND_ADDR.to_string())?;

        let jwt_secret = var("JWT_SECRET").unwrap_or_else(|| {
            warn!("JWT_SECRET not set; using insecure dev default");
            DEV_JWT_SECRET.to_string()
        });

        let use_persistent_stores = match var("USE_PERSISTENT_STORES") {
            None => false,
            Some(raw) => parse_bool("USE_PERSISTENT_STORES", &raw)?,
        };

        let database_url = var("DATABASE_URL");
        if use_persistent_stores && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let database_max_connections = parse(
            "DATABASE_MAX_CONNECTIONS",
            var("DATABASE_MAX_CONNECTIONS"),
            DEFAULT_MAX_CONNECTIONS.to_string(),
        )?;
        if database_max_connections == 0 {
            return Err(ConfigError::Invalid {
                name: "DATABASE_MAX_CONNECTIONS",
                value: "0".into(),
                reason: "must be at least 1".into(),
            });
        }

        let mut media_url = var("MEDIA_URL").unwrap_or_else(|| DEFAULT_MEDIA_URL.to_string());
        if !media_url.ends_with('/') {
            media_url.push('/');
        }

        Ok(Self {
            bind_addr,
            jwt_secret,
            use_persistent_stores,
            database_url,
            database_max_connections,
            media_url,
        })
    }
}

fn parse<T>(name: &'static str, raw: Option<String>, default: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let value = raw.unwrap_or(default);
    let parsed = value.trim().parse::<T>();
    parsed.map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
        value,
    })
}

fn parse_bool(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value: raw.to_string(),
            reason: "expected a boolean".into(),
        }),
    }
}
