//! String key operations

use super::pool::RedisPool;
use crate::utils::error::Result;
use redis::AsyncCommands;

impl RedisPool {
    /// Get a value
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    /// Set a key-value pair with optional TTL
    pub async fn set(&self, key: &str, value: &str, ttl: Option<u64>) -> Result<()> {
        let mut conn = self.connection();

        if let Some(ttl_seconds) = ttl {
            let _: () = conn.set_ex(key, value, ttl_seconds).await?;
        } else {
            let _: () = conn.set(key, value).await?;
        }
        Ok(())
    }

    /// Delete a key, returning whether it existed
    pub async fn delete(&self, key: &str) -> Result<bool> {
        let mut conn = self.connection();
        let removed: i64 = conn.del(key).await?;
        Ok(removed > 0)
    }

    /// Read and delete a value in one command (GETDEL)
    pub async fn take(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection();
        let value: Option<String> = conn.get_del(key).await?;
        Ok(value)
    }

    /// Check if a key exists
    pub async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.connection();
        let exists: bool = conn.exists(key).await?;
        Ok(exists)
    }

    /// Increment key value by delta
    pub async fn increment(&self, key: &str, delta: i64) -> Result<i64> {
        let mut conn = self.connection();
        let new_value: i64 = conn.incr(key, delta).await?;
        Ok(new_value)
    }
}
