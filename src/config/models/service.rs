//! Top level service configuration

use super::*;
use crate::utils::error::{AccessError, Result};
use serde::{Deserialize, Serialize};

/// Main service configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServiceConfig {
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub events: EventsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub seed: SeedConfig,
}

impl ServiceConfig {
    /// Build from `ACCESS_*` variables resolved through `lookup`
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(secret) = lookup("ACCESS_JWT_SECRET") {
            config.auth.jwt_secret = secret;
        }
        if let Some(ttl) = lookup("ACCESS_TOKEN_TTL") {
            config.auth.access_expiration = parse_number("ACCESS_TOKEN_TTL", &ttl)?;
        }
        if let Some(ttl) = lookup("ACCESS_REFRESH_TTL") {
            config.auth.refresh_expiration = parse_number("ACCESS_REFRESH_TTL", &ttl)?;
        }
        if let Some(backend) = lookup("ACCESS_STORE") {
            config.storage.backend = backend.parse().map_err(AccessError::Config)?;
        }
        if let Some(url) = lookup("ACCESS_REDIS_URL") {
            config.storage.redis.url = url;
        }
        if let Some(capacity) = lookup("ACCESS_EVENT_QUEUE") {
            config.events.queue_capacity = parse_number("ACCESS_EVENT_QUEUE", &capacity)?;
        }
        if let Some(level) = lookup("ACCESS_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Some(json) = lookup("ACCESS_LOG_JSON") {
            config.logging.json = matches!(json.as_str(), "1" | "true" | "yes");
        }
        if let Some(dir) = lookup("ACCESS_SEED_DIR") {
            config.seed.template_dir = Some(dir.into());
        }

        Ok(config)
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| AccessError::config(format!("{} must be a number, got '{}'", name, raw)))
}
