//! Session token lifecycle
//!
//! Issues access/refresh pairs and mirrors each token's identifier in the
//! store, so that a correctly signed token is only honoured while its
//! `session:<uuid>` entry exists.

mod manager;
mod types;


pub use manager::SessionManager;
pub use types::{LoggedUser, StoredSession, TokenPair};
