//! Core JWT handler implementation

use super::types::{Claims, IssuedToken, JwtHandler, TokenKind};
use super::utils::unix_now;
use crate::config::AuthConfig;
use crate::utils::error::{AccessError, Result};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::{debug, warn};
use uuid::Uuid;

impl JwtHandler {
    /// Create a new JWT handler
    pub fn new(config: &AuthConfig) -> Result<Self> {
        if config.jwt_secret.is_empty() {
            return Err(AccessError::config("JWT secret cannot be empty"));
        }
        let secret = config.jwt_secret.as_bytes();

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            access_expiration: config.access_expiration,
            refresh_expiration: config.refresh_expiration,
            issuer: config.issuer.clone(),
        })
    }

    /// Sign a new token of the given kind for `user_id`
    pub fn issue(&self, user_id: &str, kind: TokenKind) -> Result<IssuedToken> {
        let now = unix_now()?;
        let ttl = match kind {
            TokenKind::Access => self.access_expiration,
            TokenKind::Refresh => self.refresh_expiration,
        };

        let claims = Claims {
            user_id: user_id.to_string(),
            token_uuid: Uuid::new_v4().to_string(),
            kind,
            iat: now,
            exp: now + ttl,
            iss: self.issuer.clone(),
        };

        let header = Header::new(self.algorithm);
        let token = encode(&header, &claims, &self.encoding_key)
            .map_err(|e| AccessError::internal(format!("Unable to sign token: {}", e)))?;

        debug!("Created {} token for user: {}", kind, user_id);
        Ok(IssuedToken {
            token,
            token_uuid: claims.token_uuid,
            expires_at: claims.exp,
            ttl,
        })
    }

    /// Verify signature, algorithm, issuer and expiry, and check the kind
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<Claims> {
        self.decode_claims(token, expected, true)
    }

    /// Like [`verify`](Self::verify) but accepts expired tokens
    ///
    /// Used only to locate session entries that should be deleted.
    pub fn verify_ignoring_expiry(&self, token: &str, expected: TokenKind) -> Result<Claims> {
        self.decode_claims(token, expected, false)
    }

    fn decode_claims(&self, token: &str, expected: TokenKind, check_exp: bool) -> Result<Claims> {
        let mut validation = Validation::new(self.algorithm);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "iss"]);
        validation.validate_exp = check_exp;
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            warn!("JWT verification failed: {}", e);
            AccessError::from(e)
        })?;
        let claims = token_data.claims;

        if claims.kind != expected {
            return Err(AccessError::invalid_token(format!(
                "expected {} token, got {}",
                expected, claims.kind
            )));
        }
        if claims.user_id.is_empty() {
            return Err(AccessError::invalid_token("missing claim: user_id"));
        }
        if claims.token_uuid.is_empty() {
            return Err(AccessError::invalid_token("missing claim: token_uuid"));
        }

        debug!("Token verified for user: {}", claims.user_id);
        Ok(claims)
    }
}
