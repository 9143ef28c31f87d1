//! In-memory key-value store
//!
//! Mirrors the subset of Redis semantics the engine relies on: typed values,
//! lazy TTL expiry, empty collections disappear, and wrong-type access fails.


use super::{BatchOp, KeyValueStore, WriteBatch};
use crate::utils::error::{AccessError, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone)]
enum Value {
    Str(String),
    Set(BTreeSet<String>),
    Hash(HashMap<String, String>),
}

impl Value {
    fn type_name(&self) -> &'static str {
        match self {
            Value::Str(_) => "string",
            Value::Set(_) => "set",
            Value::Hash(_) => "hash",
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn new(value: Value, ttl: Option<u64>) -> Self {
        Self {
            value,
            // A deadline past what `Instant` can represent never arrives
            expires_at: ttl.and_then(|secs| Instant::now().checked_add(Duration::from_secs(secs))),
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

type Entries = HashMap<String, Entry>;

/// Process-local store backed by a `HashMap` behind a `RwLock`
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<Entries>>,
}

fn wrong_type(key: &str, expected: &str, found: &Value) -> AccessError {
    AccessError::store(format!(
        "WRONGTYPE key '{}' holds a {}, not a {}",
        key,
        found.type_name(),
        expected
    ))
}

/// Live entry for `key`, dropping it first if it has expired
fn live<'a>(entries: &'a mut Entries, key: &str) -> Option<&'a mut Entry> {
    let now = Instant::now();
    if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
        entries.remove(key);
    }
    entries.get_mut(key)
}

fn read_string(entries: &mut Entries, key: &str) -> Result<Option<String>> {
    match live(entries, key) {
        None => Ok(None),
        Some(Entry {
            value: Value::Str(s),
            ..
        }) => Ok(Some(s.clone())),
        Some(other) => Err(wrong_type(key, "string", &other.value)),
    }
}

fn set_mut<'a>(entries: &'a mut Entries, key: &str) -> Result<&'a mut BTreeSet<String>> {
    if live(entries, key).is_none() {
        entries.insert(key.to_string(), Entry::new(Value::Set(BTreeSet::new()), None));
    }
    match entries.get_mut(key) {
        Some(Entry {
            value: Value::Set(set),
            ..
        }) => Ok(set),
        Some(other) => Err(wrong_type(key, "set", &other.value)),
        None => Err(AccessError::internal("set entry vanished")),
    }
}

fn hash_mut<'a>(entries: &'a mut Entries, key: &str) -> Result<&'a mut HashMap<String, String>> {
    if live(entries, key).is_none() {
        entries.insert(key.to_string(), Entry::new(Value::Hash(HashMap::new()), None));
    }
    match entries.get_mut(key) {
        Some(Entry {
            value: Value::Hash(hash),
            ..
        }) => Ok(hash),
        Some(other) => Err(wrong_type(key, "hash", &other.value)),
        None => Err(AccessError::internal("hash entry vanished")),
    }
}

fn drop_if_empty(entries: &mut Entries, key: &str) {
    let empty = match entries.get(key).map(|entry| &entry.value) {
        Some(Value::Set(set)) => set.is_empty(),
        Some(Value::Hash(hash)) => hash.is_empty(),
        _ => false,
    };
    if empty {
        entries.remove(key);
    }
}

fn remove_members(entries: &mut Entries, key: &str, members: &[String]) -> Result<()> {
    match live(entries, key) {
        None => return Ok(()),
        Some(Entry {
            value: Value::Set(set),
            ..
        }) => {
            for member in members {
                set.remove(member);
            }
        }
        Some(other) => return Err(wrong_type(key, "set", &other.value)),
    }
    drop_if_empty(entries, key);
    Ok(())
}

fn remove_field(entries: &mut Entries, key: &str, field: &str) -> Result<()> {
    match live(entries, key) {
        None => return Ok(()),
        Some(Entry {
            value: Value::Hash(hash),
            ..
        }) => {
            hash.remove(field);
        }
        Some(other) => return Err(wrong_type(key, "hash", &other.value)),
    }
    drop_if_empty(entries, key);
    Ok(())
}

/// Reject a batch up front so a type error cannot leave it half applied
fn check_op(entries: &mut Entries, op: &BatchOp) -> Result<()> {
    let (key, expected) = match op {
        BatchOp::Set { .. } | BatchOp::Delete { .. } => return Ok(()),
        BatchOp::SetAdd { key, .. } | BatchOp::SetRemove { key, .. } => (key, "set"),
        BatchOp::HashSet { key, .. } | BatchOp::HashDelete { key, .. } => (key, "hash"),
    };
    match live(entries, key).map(|entry| &entry.value) {
        None => Ok(()),
        Some(Value::Set(_)) if expected == "set" => Ok(()),
        Some(Value::Hash(_)) if expected == "hash" => Ok(()),
        Some(found) => Err(wrong_type(key, expected, found)),
    }
}

fn apply_op(entries: &mut Entries, op: BatchOp) -> Result<()> {
    match op {
        BatchOp::Set { key, value, ttl } => {
            entries.insert(key, Entry::new(Value::Str(value), ttl));
        }
        BatchOp::Delete { key } => {
            entries.remove(&key);
        }
        BatchOp::SetAdd { key, members } => {
            set_mut(entries, &key)?.extend(members);
        }
        BatchOp::SetRemove { key, members } => remove_members(entries, &key, &members)?,
        BatchOp::HashSet { key, field, value } => {
            hash_mut(entries, &key)?.insert(field, value);
        }
        BatchOp::HashDelete { key, field } => remove_field(entries, &key, &field)?,
    }
    Ok(())
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .values()
            .filter(|entry| !entry.is_expired(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every key
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        read_string(&mut self.entries.write(), key)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<u64>) -> Result<()> {
        self.entries
            .write()
            .insert(key.to_string(), Entry::new(Value::Str(value.to_string()), ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut entries = self.entries.write();
        let existed = live(&mut entries, key).is_some();
        entries.remove(key);
        Ok(existed)
    }

    async fn take(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.entries.write();
        let value = read_string(&mut entries, key)?;
        if value.is_some() {
            entries.remove(key);
        }
        Ok(value)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(live(&mut self.entries.write(), key).is_some())
    }

    async fn set_add(&self, key: &str, member: &str) -> Result<()> {
        set_mut(&mut self.entries.write(), key)?.insert(member.to_string());
        Ok(())
    }

    async fn set_remove(&self, key: &str, member: &str) -> Result<()> {
        remove_members(&mut self.entries.write(), key, &[member.to_string()])
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>> {
        let mut entries = self.entries.write();
        match live(&mut entries, key) {
            None => Ok(Vec::new()),
            Some(Entry {
                value: Value::Set(set),
                ..
            }) => Ok(set.iter().cloned().collect()),
            Some(other) => Err(wrong_type(key, "set", &other.value)),
        }
    }

    async fn set_is_member(&self, key: &str, member: &str) -> Result<bool> {
        let mut entries = self.entries.write();
        match live(&mut entries, key) {
            None => Ok(false),
            Some(Entry {
                value: Value::Set(set),
                ..
            }) => Ok(set.contains(member)),
            Some(other) => Err(wrong_type(key, "set", &other.value)),
        }
    }

    async fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>> {
        let mut entries = self.entries.write();
        match live(&mut entries, key) {
            None => Ok(None),
            Some(Entry {
                value: Value::Hash(hash),
                ..
            }) => Ok(hash.get(field).cloned()),
            Some(other) => Err(wrong_type(key, "hash", &other.value)),
        }
    }

    async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>> {
        let mut entries = self.entries.write();
        match live(&mut entries, key) {
            None => Ok(HashMap::new()),
            Some(Entry {
                value: Value::Hash(hash),
                ..
            }) => Ok(hash.clone()),
            Some(other) => Err(wrong_type(key, "hash", &other.value)),
        }
    }

    async fn hash_set(&self, key: &str, field: &str, value: &str) -> Result<()> {
        hash_mut(&mut self.entries.write(), key)?.insert(field.to_string(), value.to_string());
        Ok(())
    }

    async fn hash_delete(&self, key: &str, field: &str) -> Result<()> {
        remove_field(&mut self.entries.write(), key, field)
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let now = Instant::now();
        let mut entries = self.entries.write();
        entries.retain(|_, entry| !entry.is_expired(now));
        Ok(entries
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn increment(&self, key: &str, delta: i64) -> Result<i64> {
        let mut entries = self.entries.write();
        let current = match read_string(&mut entries, key)? {
            Some(raw) => raw.parse::<i64>().map_err(|_| {
                AccessError::store(format!("value at '{}' is not an integer", key))
            })?,
            None => 0,
        };
        let next = current + delta;
        let expires_at = entries.get(key).and_then(|entry| entry.expires_at);
        entries.insert(
            key.to_string(),
            Entry {
                value: Value::Str(next.to_string()),
                expires_at,
            },
        );
        Ok(next)
    }

    async fn execute(&self, batch: WriteBatch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        debug!("Applying batch of {} writes", batch.len());

        let mut entries = self.entries.write();
        for op in batch.ops() {
            check_op(&mut entries, op)?;
        }
        for op in batch.into_ops() {
            apply_op(&mut entries, op)?;
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
