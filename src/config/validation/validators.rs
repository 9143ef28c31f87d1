//! Validators for the engine configuration sections

use super::trait_def::Validate;
use crate::config::models::*;
use tracing::debug;

impl Validate for AuthConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating auth configuration");

        if self.jwt_secret.is_empty() {
            return Err("JWT secret cannot be empty".to_string());
        }

        if self.jwt_secret.len() < 32 {
            return Err("JWT secret should be at least 32 characters long".to_string());
        }

        if self.access_expiration == 0 {
            return Err("Access token expiration must be greater than 0".to_string());
        }

        if self.refresh_expiration <= self.access_expiration {
            return Err(
                "Refresh token expiration must be longer than access token expiration".to_string(),
            );
        }

        if self.issuer.is_empty() {
            return Err("Token issuer cannot be empty".to_string());
        }

        Ok(())
    }
}

impl Validate for StorageConfig {
    fn validate(&self) -> Result<(), String> {
        if self.backend == StoreBackend::Redis {
            self.redis.validate()?;
        }
        Ok(())
    }
}

impl Validate for RedisConfig {
    fn validate(&self) -> Result<(), String> {
        let parsed =
            url::Url::parse(&self.url).map_err(|e| format!("Invalid Redis URL: {}", e))?;

        if !matches!(parsed.scheme(), "redis" | "rediss") {
            return Err(format!(
                "Redis URL must use redis:// or rediss://, got {}://",
                parsed.scheme()
            ));
        }

        if self.connection_timeout == 0 {
            return Err("Redis connection timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for EventsConfig {
    fn validate(&self) -> Result<(), String> {
        if self.queue_capacity == 0 {
            return Err("Event queue capacity must be greater than 0".to_string());
        }
        Ok(())
    }
}
