//! Utility modules for the access engine
//!
//! - **error**: Error type shared by every component
//! - **logging**: Tracing subscriber setup

pub mod error;
pub mod logging;

pub use error::{AccessError, Result};
pub use logging::init_logging;
