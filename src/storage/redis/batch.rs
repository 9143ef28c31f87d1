//! Batch Redis operations

use super::pool::RedisPool;
use crate::storage::{BatchOp, WriteBatch};
use crate::utils::error::Result;
use redis::AsyncCommands;
use tracing::debug;

/// Escape glob metacharacters so `prefix` matches literally in KEYS/SCAN
pub(crate) fn escape_pattern(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('*');
    escaped
}

/// Translate a write batch into a MULTI/EXEC pipeline
pub(crate) fn build_pipeline(batch: WriteBatch) -> redis::Pipeline {
    let mut pipe = redis::pipe();
    pipe.atomic();

    for op in batch.into_ops() {
        match op {
            BatchOp::Set { key, value, ttl } => match ttl {
                Some(ttl_seconds) => {
                    pipe.set_ex(key, value, ttl_seconds).ignore();
                }
                None => {
                    pipe.set(key, value).ignore();
                }
            },
            BatchOp::Delete { key } => {
                pipe.del(key).ignore();
            }
            BatchOp::SetAdd { key, members } => {
                pipe.sadd(key, members).ignore();
            }
            BatchOp::SetRemove { key, members } => {
                pipe.srem(key, members).ignore();
            }
            BatchOp::HashSet { key, field, value } => {
                pipe.hset(key, field, value).ignore();
            }
            BatchOp::HashDelete { key, field } => {
                pipe.hdel(key, field).ignore();
            }
        }
    }
    pipe
}

impl RedisPool {
    /// Apply every write of `batch` in one atomic pipeline
    pub async fn execute(&self, batch: WriteBatch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        debug!("Executing Redis pipeline with {} writes", batch.len());

        let mut conn = self.connection();
        let pipe = build_pipeline(batch);
        let _: () = pipe.query_async(&mut conn).await?;
        Ok(())
    }

    /// Every key starting with `prefix`
    pub async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let mut conn = self.connection();
        let keys: Vec<String> = conn.keys(escape_pattern(prefix)).await?;
        Ok(keys)
    }
}
