//! Authentication
//!
//! - `jwt`: Token signing and verification
//! - `session`: Session token lifecycle backed by the store

pub mod jwt;
pub mod session;

pub use jwt::{Claims, JwtHandler, TokenKind};
pub use session::{LoggedUser, SessionManager, StoredSession, TokenPair};
