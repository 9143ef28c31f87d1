//! Redis connection pool and core connection management

use crate::config::RedisConfig;
use crate::utils::error::{AccessError, Result};
use redis::{Client, aio::MultiplexedConnection};
use std::time::Duration;
use tracing::{debug, info};

/// Redis connection pool
///
/// A single multiplexed connection is shared by every clone of the pool.
#[derive(Clone)]
pub struct RedisPool {
    pub(crate) connection_manager: MultiplexedConnection,
    pub(crate) config: RedisConfig,
}

impl std::fmt::Debug for RedisPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisPool")
            .field("url", &Self::sanitize_url(&self.config.url))
            .finish()
    }
}

impl RedisPool {
    /// Create a new Redis pool
    pub async fn new(config: &RedisConfig) -> Result<Self> {
        info!("Creating Redis connection pool");
        debug!("Redis URL: {}", Self::sanitize_url(&config.url));

        let client = Client::open(config.url.as_str())?;

        let timeout = Duration::from_secs(config.connection_timeout);
        let connection_manager =
            tokio::time::timeout(timeout, client.get_multiplexed_async_connection())
                .await
                .map_err(|_| {
                    AccessError::store(format!(
                        "timed out connecting to {} after {}s",
                        Self::sanitize_url(&config.url),
                        config.connection_timeout
                    ))
                })??;

        info!("Redis connection pool created successfully");
        Ok(Self {
            connection_manager,
            config: config.clone(),
        })
    }

    /// Get a connection handle
    pub(crate) fn connection(&self) -> MultiplexedConnection {
        self.connection_manager.clone()
    }

    /// Health check
    pub async fn health_check(&self) -> Result<()> {
        debug!("Performing Redis health check");

        let mut conn = self.connection();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;

        debug!("Redis health check passed");
        Ok(())
    }

    /// Sanitize Redis URL for logging (hide password)
    pub(crate) fn sanitize_url(url: &str) -> String {
        if let Ok(parsed) = url::Url::parse(url) {
            let mut sanitized = parsed.clone();
            if sanitized.password().is_some() {
                let _ = sanitized.set_password(Some("***"));
            }
            sanitized.to_string()
        } else {
            "invalid_url".to_string()
        }
    }
}
