//! Common test utilities for roleguard
//!
//! - Engine fixtures on the in-memory store
//! - A banking permission template
//! - Polling for state written by background listeners
//!
//! # Usage
//!
//! ```rust
//! use crate::common::fixtures;
//!
//! #[tokio::test]
//! async fn my_test() {
//!     let engine = fixtures::memory_engine().await;
//!     let user = fixtures::UserFactory::create("u1");
//!     // ...
//! }
//! ```

pub mod fixtures;

use std::future::Future;
use std::time::Duration;

pub use fixtures::{TemplateFactory, UserFactory, memory_engine};

/// How long listeners get to catch up before a test fails
pub const SETTLE_TIMEOUT: Duration = Duration::from_secs(3);

/// Poll `check` until it returns true or `SETTLE_TIMEOUT` passes
pub async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    tokio::time::timeout(SETTLE_TIMEOUT, async {
        loop {
            if check().await {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .is_ok()
}

/// Skip test if environment variable is not set
#[macro_export]
macro_rules! skip_without_env {
    ($var:expr) => {
        if std::env::var($var).is_err() {
            eprintln!("Skipping test: {} environment variable not set", $var);
            return;
        }
    };
}

/// Assert that a result is Ok and return the value
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
}

/// Assert that a result is Err
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(v) => panic!("Expected Err, got Ok: {:?}", v),
            Err(e) => e,
        }
    };
}
