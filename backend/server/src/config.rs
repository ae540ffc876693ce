use std::{env, fmt::Display, fs::read_to_string, str::FromStr};

use tracing::{info, warn};

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub redis_url: Option<String>,
    pub redis_prefix: String,
    pub admin_token_secret: String,
    pub cors_max_age_secs: u64,
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        Ok(Self {
            port: try_load("RUST_PORT", "1111")?,
            redis_url: var("REDIS_URL").ok(),
            redis_prefix: try_load("REDIS_PREFIX", "aarambh")?,
            admin_token_secret: read_secret("ADMIN_TOKEN_SECRET")?,
            cors_max_age_secs: try_load("CORS_MAX_AGE_SECS", "3600")?,
        })
    }

    /// Settings for tests and local runs: in-memory store, fixed secret.
    pub fn local(admin_token_secret: &str) -> Self {
        Self {
            port: 1111,
            redis_url: None,
            redis_prefix: "aarambh".to_string(),
            admin_token_secret: admin_token_secret.to_string(),
            cors_max_age_secs: 3600,
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T, AppError>
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid {key} value: {e}")))
}

fn read_secret(secret_name: &str) -> Result<String, AppError> {
    let path = format!("/run/secrets/{secret_name}");

    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .or_else(|e| {
            warn!("Failed to read {secret_name} from file: {e}, trying environment");
            env::var(secret_name)
        })
        .ok()
        .filter(|secret| !secret.is_empty())
        .ok_or_else(|| AppError::Config(format!("Secret {secret_name} is not configured")))
}
