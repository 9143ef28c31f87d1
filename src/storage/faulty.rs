//! Test store that fails chosen writes
//!
//! Wraps a [`MemoryStore`] and lets tests make `delete` or `execute` fail
//! after a given number of successful calls.

use super::{KeyValueStore, MemoryStore, WriteBatch};
use crate::utils::error::{AccessError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug)]
pub struct FaultyStore {
    inner: MemoryStore,
    deletes_left: AtomicUsize,
    executes_left: AtomicUsize,
    executes: AtomicUsize,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            deletes_left: AtomicUsize::new(usize::MAX),
            executes_left: AtomicUsize::new(usize::MAX),
            executes: AtomicUsize::new(0),
        }
    }

    /// Let `count` more deletes through, then fail every later one
    pub fn fail_deletes_after(&self, count: usize) {
        self.deletes_left.store(count, Ordering::SeqCst);
    }

    /// Let `count` more batches through, then fail every later one
    pub fn fail_executes_after(&self, count: usize) {
        self.executes_left.store(count, Ordering::SeqCst);
    }

    /// Batches applied so far
    pub fn executes(&self) -> usize {
        self.executes.load(Ordering::SeqCst)
    }

    fn allow(budget: &AtomicUsize, op: &str) -> Result<()> {
        budget
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .map(|_| ())
            .map_err(|_| AccessError::store(format!("injected {} failure", op)))
    }
}

impl Default for FaultyStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for FaultyStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<u64>) -> Result<()> {
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        Self::allow(&self.deletes_left, "delete")?;
        self.inner.delete(key).await
    }

    async fn take(&self, key: &str) -> Result<Option<String>> {
        self.inner.take(key).await
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        self.inner.exists(key).await
    }

    async fn set_add(&self, key: &str, member: &str) -> Result<()> {
        self.inner.set_add(key, member).await
    }

    async fn set_remove(&self, key: &str, member: &str) -> Result<()> {
        self.inner.set_remove(key, member).await
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>> {
        self.inner.set_members(key).await
    }

    async fn set_is_member(&self, key: &str, member: &str) -> Result<bool> {
        self.inner.set_is_member(key, member).await
    }

    async fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>> {
        self.inner.hash_get(key, field).await
    }

    async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>> {
        self.inner.hash_get_all(key).await
    }

    async fn hash_set(&self, key: &str, field: &str, value: &str) -> Result<()> {
        self.inner.hash_set(key, field, value).await
    }

    async fn hash_delete(&self, key: &str, field: &str) -> Result<()> {
        self.inner.hash_delete(key, field).await
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        self.inner.keys_with_prefix(prefix).await
    }

    async fn increment(&self, key: &str, delta: i64) -> Result<i64> {
        self.inner.increment(key, delta).await
    }

    async fn execute(&self, batch: WriteBatch) -> Result<()> {
        Self::allow(&self.executes_left, "batch")?;
        self.executes.fetch_add(1, Ordering::SeqCst);
        self.inner.execute(batch).await
    }

    async fn health_check(&self) -> Result<()> {
        self.inner.health_check().await
    }

    fn backend_name(&self) -> &'static str {
        "faulty"
    }
}
