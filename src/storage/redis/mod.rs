//! Redis storage implementation
//!
//! ## Module Structure
//!
//! - `pool` - Connection setup and health checks
//! - `cache` - String operations (get, set, delete, take, exists, increment)
//! - `collections` - Set operations
//! - `hash` - Hash operations
//! - `batch` - Atomic write pipelines and prefix scans
//! - `store` - `KeyValueStore` implementation
//! - `tests` - Module tests

mod batch;
mod cache;
mod collections;
mod hash;
mod pool;
mod store;

pub use pool::RedisPool;
