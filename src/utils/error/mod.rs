//! Error handling for the access engine
//!
//! This module defines the error type shared by every layer of the crate.

#![allow(missing_docs)]

mod conversions;
mod helpers;
mod types;

pub use types::{AccessError, Result};
