//! JWT token handling
//!
//! Signs and verifies the bearer tokens handed out by the session manager.
//! A token proves who issued it; whether it is still live is decided by
//! the session store.

mod handler;
pub mod types;
mod utils;

#[cfg(test)]
mod tests;

pub use types::{Claims, IssuedToken, JwtHandler, TokenKind};
pub use utils::unix_now;
