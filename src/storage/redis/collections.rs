//! Redis set operations

use super::pool::RedisPool;
use crate::utils::error::Result;
use redis::AsyncCommands;

impl RedisPool {
    /// Add member to set
    pub async fn set_add(&self, key: &str, member: &str) -> Result<()> {
        let mut conn = self.connection();
        let _: () = conn.sadd(key, member).await?;
        Ok(())
    }

    /// Remove member from set
    pub async fn set_remove(&self, key: &str, member: &str) -> Result<()> {
        let mut conn = self.connection();
        let _: () = conn.srem(key, member).await?;
        Ok(())
    }

    /// Get all set members
    pub async fn set_members(&self, key: &str) -> Result<Vec<String>> {
        let mut conn = self.connection();
        let members: Vec<String> = conn.smembers(key).await?;
        Ok(members)
    }

    /// Check if member is in set
    pub async fn set_is_member(&self, key: &str, member: &str) -> Result<bool> {
        let mut conn = self.connection();
        let is_member: bool = conn.sismember(key, member).await?;
        Ok(is_member)
    }
}
