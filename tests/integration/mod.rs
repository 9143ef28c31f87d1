//! Integration tests for roleguard
//!
//! These run the whole engine on the in-memory store with both
//! invalidation listeners active.

pub mod config_tests;
pub mod invalidation_tests;
pub mod session_tests;
