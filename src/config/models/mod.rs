//! Configuration data models
//!
//! This module defines all configuration structures used throughout the engine.

#![allow(missing_docs)]

pub mod auth;
pub mod events;
pub mod logging;
pub mod seed;
pub mod service;
pub mod storage;

pub use auth::*;
pub use events::*;
pub use logging::*;
pub use seed::*;
pub use service::*;
pub use storage::*;

/// Default access token lifetime in seconds
pub fn default_access_expiration() -> u64 {
    3600
}

/// Default refresh token lifetime in seconds
pub fn default_refresh_expiration() -> u64 {
    86400
}

pub fn default_issuer() -> String {
    "roleguard".to_string()
}

pub fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

pub fn default_connection_timeout() -> u64 {
    5
}

pub fn default_queue_capacity() -> usize {
    256
}

pub fn default_log_level() -> String {
    "info".to_string()
}
