//! End-to-end tests against a real Redis server
//!
//! Ignored by default; set `REDIS_URL` and run with `--ignored`. Every test
//! flushes the selected database, so point it at a scratch index.

pub mod redis_tests;
