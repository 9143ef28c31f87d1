//! Session types

use crate::rbac::User;
use serde::{Deserialize, Serialize};

/// Token pair (access + refresh)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Access token
    pub access_token: String,
    /// Refresh token
    pub refresh_token: String,
    /// Token type (always "Bearer")
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: u64,
}

/// Server side record of an issued pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSession {
    pub user_id: String,
    pub access_token_id: String,
    pub access_expiry: u64,
    pub refresh_token_id: String,
    pub refresh_expiry: u64,
}

/// Result of a successful login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggedUser {
    pub user: User,
    pub tokens: TokenPair,
}
