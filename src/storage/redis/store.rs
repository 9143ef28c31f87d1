//! `KeyValueStore` implementation for Redis

use super::pool::RedisPool;
use crate::storage::{KeyValueStore, WriteBatch};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

#[async_trait]
impl KeyValueStore for RedisPool {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        RedisPool::get(self, key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<u64>) -> Result<()> {
        RedisPool::set(self, key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        RedisPool::delete(self, key).await
    }

    async fn take(&self, key: &str) -> Result<Option<String>> {
        RedisPool::take(self, key).await
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        RedisPool::exists(self, key).await
    }

    async fn set_add(&self, key: &str, member: &str) -> Result<()> {
        RedisPool::set_add(self, key, member).await
    }

    async fn set_remove(&self, key: &str, member: &str) -> Result<()> {
        RedisPool::set_remove(self, key, member).await
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>> {
        RedisPool::set_members(self, key).await
    }

    async fn set_is_member(&self, key: &str, member: &str) -> Result<bool> {
        RedisPool::set_is_member(self, key, member).await
    }

    async fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>> {
        RedisPool::hash_get(self, key, field).await
    }

    async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>> {
        RedisPool::hash_get_all(self, key).await
    }

    async fn hash_set(&self, key: &str, field: &str, value: &str) -> Result<()> {
        RedisPool::hash_set(self, key, field, value).await
    }

    async fn hash_delete(&self, key: &str, field: &str) -> Result<()> {
        RedisPool::hash_delete(self, key, field).await
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        RedisPool::keys_with_prefix(self, prefix).await
    }

    async fn increment(&self, key: &str, delta: i64) -> Result<i64> {
        RedisPool::increment(self, key, delta).await
    }

    async fn execute(&self, batch: WriteBatch) -> Result<()> {
        RedisPool::execute(self, batch).await
    }

    async fn health_check(&self) -> Result<()> {
        RedisPool::health_check(self).await
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}
