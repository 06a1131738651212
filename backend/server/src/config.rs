use std::{env, fmt::Display, fs::read_to_string, str::FromStr};

use anyhow::{Context, Result, anyhow};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Redis,
    Memory,
}

impl FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown store '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub redis_url: String,
    pub store: StoreKind,
    pub catalog_path: String,
    pub catalog_url: Option<String>,
    pub identity_header: String,
    pub validate_locations: bool,
    pub proxy_secret: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Ok(Self {
            port: try_load("RUST_PORT", "1111")?,
            redis_url: try_load("REDIS_URL", "redis://redis:6379")?,
            store: try_load("STORE", "redis")?,
            catalog_path: try_load("CATALOG_PATH", "../catalog.bin")?,
            catalog_url: env::var("CATALOG_URL").ok(),
            identity_header: try_load::<String>("IDENTITY_HEADER", "x-user-id")?.to_lowercase(),
            validate_locations: try_load("VALIDATE_LOCATIONS", "true")?,
            proxy_secret: read_secret("PROXY_SECRET"),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 1111,
            redis_url: "redis://redis:6379".to_string(),
            store: StoreKind::Memory,
            catalog_path: "../catalog.bin".to_string(),
            catalog_url: None,
            identity_header: "x-user-id".to_string(),
            validate_locations: true,
            proxy_secret: None,
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| anyhow!("Invalid {key} value: {e}"))
}

fn read_secret(secret_name: &str) -> Option<String> {
    let path = format!("/run/secrets/{secret_name}");

    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .with_context(|| format!("Failed to read {secret_name}"))
        .map_err(|e| {
            info!("{e}, continuing without it");
        })
        .ok()
        .filter(|secret| !secret.is_empty())
}
