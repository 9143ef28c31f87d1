//! Storage layer for the access engine
//!
//! Everything the engine persists (role assignments, the permission template,
//! per-user caches and session identifiers) goes through [`KeyValueStore`].

#[cfg(test)]
pub(crate) mod faulty;
pub mod keys;
/// Process-local backend
pub mod memory;
/// Redis backend
#[cfg(feature = "redis")]
pub mod redis;

use crate::config::{StorageConfig, StoreBackend};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

pub use memory::MemoryStore;

/// A single write inside a [`WriteBatch`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    Set {
        key: String,
        value: String,
        ttl: Option<u64>,
    },
    Delete {
        key: String,
    },
    SetAdd {
        key: String,
        members: Vec<String>,
    },
    SetRemove {
        key: String,
        members: Vec<String>,
    },
    HashSet {
        key: String,
        field: String,
        value: String,
    },
    HashDelete {
        key: String,
        field: String,
    },
}

/// Ordered list of writes executed in one round trip
///
/// Both shipped backends apply a batch atomically: readers see either none
/// or all of its writes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<BatchOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
        ttl: Option<u64>,
    ) -> &mut Self {
        self.ops.push(BatchOp::Set {
            key: key.into(),
            value: value.into(),
            ttl,
        });
        self
    }

    pub fn delete(&mut self, key: impl Into<String>) -> &mut Self {
        self.ops.push(BatchOp::Delete { key: key.into() });
        self
    }

    /// Add members to a set; an empty member list is dropped
    pub fn set_add<I, S>(&mut self, key: impl Into<String>, members: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let members: Vec<String> = members.into_iter().map(Into::into).collect();
        if !members.is_empty() {
            self.ops.push(BatchOp::SetAdd {
                key: key.into(),
                members,
            });
        }
        self
    }

    /// Remove members from a set; an empty member list is dropped
    pub fn set_remove<I, S>(&mut self, key: impl Into<String>, members: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let members: Vec<String> = members.into_iter().map(Into::into).collect();
        if !members.is_empty() {
            self.ops.push(BatchOp::SetRemove {
                key: key.into(),
                members,
            });
        }
        self
    }

    pub fn hash_set(
        &mut self,
        key: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.ops.push(BatchOp::HashSet {
            key: key.into(),
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn hash_delete(&mut self, key: impl Into<String>, field: impl Into<String>) -> &mut Self {
        self.ops.push(BatchOp::HashDelete {
            key: key.into(),
            field: field.into(),
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<BatchOp> {
        self.ops
    }
}

/// Key-value store with string, set and hash values and per-key TTL
///
/// Missing keys read as empty (`None`, empty set, empty hash). Removing the
/// last member of a set or the last field of a hash removes the key.
#[async_trait]
pub trait KeyValueStore: Send + Sync + std::fmt::Debug {
    /// Get a string value
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Set a string value, expiring after `ttl` seconds when given
    async fn set(&self, key: &str, value: &str, ttl: Option<u64>) -> Result<()>;

    /// Delete a key of any type, returning whether it existed
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Atomically read and delete a string value
    async fn take(&self, key: &str) -> Result<Option<String>>;

    async fn exists(&self, key: &str) -> Result<bool>;

    async fn set_add(&self, key: &str, member: &str) -> Result<()>;

    async fn set_remove(&self, key: &str, member: &str) -> Result<()>;

    async fn set_members(&self, key: &str) -> Result<Vec<String>>;

    async fn set_is_member(&self, key: &str, member: &str) -> Result<bool>;

    async fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>>;

    async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>>;

    async fn hash_set(&self, key: &str, field: &str, value: &str) -> Result<()>;

    async fn hash_delete(&self, key: &str, field: &str) -> Result<()>;

    /// Every live key starting with `prefix`, in no particular order
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>>;

    /// Increment an integer value, creating it at zero first
    async fn increment(&self, key: &str, delta: i64) -> Result<i64>;

    /// Apply a batch of writes atomically
    async fn execute(&self, batch: WriteBatch) -> Result<()>;

    async fn health_check(&self) -> Result<()>;

    fn backend_name(&self) -> &'static str;
}

/// Shared handle to the configured store
pub type SharedStore = Arc<dyn KeyValueStore>;

/// Build the store selected by configuration
pub async fn create_store(config: &StorageConfig) -> Result<SharedStore> {
    info!("Initializing {:?} store", config.backend);

    match config.backend {
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
        #[cfg(feature = "redis")]
        StoreBackend::Redis => {
            let pool = redis::RedisPool::new(&config.redis).await?;
            pool.health_check().await?;
            Ok(Arc::new(pool))
        }
        #[cfg(not(feature = "redis"))]
        StoreBackend::Redis => Err(crate::utils::error::AccessError::config(
            "redis backend requested but the `redis` feature is disabled",
        )),
    }
}
