//! Redis hash operations

use super::pool::RedisPool;
use crate::utils::error::Result;
use redis::AsyncCommands;
use std::collections::HashMap;

impl RedisPool {
    /// Set hash field value
    pub async fn hash_set(&self, key: &str, field: &str, value: &str) -> Result<()> {
        let mut conn = self.connection();
        let _: () = conn.hset(key, field, value).await?;
        Ok(())
    }

    /// Get hash field value
    pub async fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>> {
        let mut conn = self.connection();
        let value: Option<String> = conn.hget(key, field).await?;
        Ok(value)
    }

    /// Delete hash field
    pub async fn hash_delete(&self, key: &str, field: &str) -> Result<()> {
        let mut conn = self.connection();
        let _: () = conn.hdel(key, field).await?;
        Ok(())
    }

    /// Get all hash fields and values
    pub async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>> {
        let mut conn = self.connection();
        let hash: HashMap<String, String> = conn.hgetall(key).await?;
        Ok(hash)
    }
}
