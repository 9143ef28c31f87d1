//! Type conversions for AccessError

use super::types::AccessError;

#[cfg(feature = "redis")]
impl From<redis::RedisError> for AccessError {
    fn from(err: redis::RedisError) -> Self {
        AccessError::StoreUnavailable(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AccessError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        let reason = match err.kind() {
            ErrorKind::ExpiredSignature => "token expired".to_string(),
            ErrorKind::InvalidSignature => "bad signature".to_string(),
            ErrorKind::InvalidAlgorithm => "wrong signing algorithm".to_string(),
            ErrorKind::MissingRequiredClaim(claim) => format!("missing claim: {}", claim),
            ErrorKind::Json(e) => format!("malformed claims: {}", e),
            _ => err.to_string(),
        };
        AccessError::InvalidToken(reason)
    }
}

impl From<serde_yaml::Error> for AccessError {
    fn from(err: serde_yaml::Error) -> Self {
        AccessError::Config(format!("Failed to parse config: {}", err))
    }
}
