//! JWT utility functions

use super::types::{Claims, JwtHandler};
use crate::utils::error::{AccessError, Result};
use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds since the Unix epoch
pub fn unix_now() -> Result<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| AccessError::internal(format!("System time error: {}", e)))
}

impl JwtHandler {
    /// Extract token from Authorization header
    pub fn extract_token_from_header(header_value: &str) -> Option<String> {
        header_value
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| token.to_string())
    }

    /// Access token lifetime in seconds
    pub fn access_expiration(&self) -> u64 {
        self.access_expiration
    }

    /// Refresh token lifetime in seconds
    pub fn refresh_expiration(&self) -> u64 {
        self.refresh_expiration
    }

    /// Get time until token expires
    pub fn time_until_expiry(&self, claims: &Claims) -> Option<u64> {
        let now = unix_now().ok()?;

        if claims.exp > now {
            Some(claims.exp - now)
        } else {
            None
        }
    }
}
