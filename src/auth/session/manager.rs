//! Session manager implementation

use super::types::{LoggedUser, StoredSession, TokenPair};
use crate::auth::jwt::{JwtHandler, TokenKind};
use crate::rbac::UserDirectory;
use crate::storage::{KeyValueStore, SharedStore, WriteBatch, keys};
use crate::utils::error::{AccessError, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct SessionManager {
    store: SharedStore,
    jwt: Arc<JwtHandler>,
    users: UserDirectory,
}

impl SessionManager {
    pub fn new(store: SharedStore, jwt: Arc<JwtHandler>, users: UserDirectory) -> Self {
        Self { store, jwt, users }
    }

    pub fn jwt(&self) -> &JwtHandler {
        &self.jwt
    }

    /// Issue a new pair for `user_id` and record both identifiers
    pub async fn create_token(&self, user_id: &str) -> Result<TokenPair> {
        if user_id.trim().is_empty() {
            return Err(AccessError::validation("user id cannot be empty"));
        }

        let access = self.jwt.issue(user_id, TokenKind::Access)?;
        let refresh = self.jwt.issue(user_id, TokenKind::Refresh)?;
        let session = StoredSession {
            user_id: user_id.to_string(),
            access_token_id: access.token_uuid.clone(),
            access_expiry: access.expires_at,
            refresh_token_id: refresh.token_uuid.clone(),
            refresh_expiry: refresh.expires_at,
        };
        self.store_session(&session, access.ttl, refresh.ttl).await?;

        info!(user_id = %user_id, "Issued token pair");
        Ok(TokenPair {
            access_token: access.token,
            refresh_token: refresh.token,
            token_type: "Bearer".to_string(),
            expires_in: access.ttl,
        })
    }

    /// Return the user behind a live access token
    pub async fn verify_token(&self, access_token: &str) -> Result<String> {
        let claims = self.jwt.verify(access_token, TokenKind::Access)?;

        let stored = self.store.get(&keys::session(&claims.token_uuid)).await?;
        match stored {
            Some(user_id) if user_id == claims.user_id => Ok(user_id),
            Some(_) => {
                warn!(user_id = %claims.user_id, "Session identifier owned by another user");
                Err(AccessError::invalid_token("session does not match token"))
            }
            None => Err(AccessError::invalid_token("token revoked or expired")),
        }
    }

    /// Exchange a refresh token for a new pair
    ///
    /// The refresh identifier is consumed atomically, so a refresh token
    /// works at most once. The prior access token, when given, is revoked on
    /// a best-effort basis.
    pub async fn refresh_token(
        &self,
        refresh_token: &str,
        prior_access: Option<&str>,
    ) -> Result<TokenPair> {
        let claims = self.jwt.verify(refresh_token, TokenKind::Refresh)?;

        let stored = self.store.take(&keys::session(&claims.token_uuid)).await?;
        match stored {
            Some(user_id) if user_id == claims.user_id => {}
            Some(_) => {
                warn!(user_id = %claims.user_id, "Refresh identifier owned by another user");
                return Err(AccessError::invalid_token("session does not match token"));
            }
            None => return Err(AccessError::invalid_token("token revoked or expired")),
        }

        if let Some(access_token) = prior_access {
            self.revoke_quietly(access_token, TokenKind::Access).await;
        }

        debug!(user_id = %claims.user_id, "Rotating token pair");
        self.create_token(&claims.user_id).await
    }

    /// Revoke both tokens of a pair
    ///
    /// Tokens that fail to decode or whose identifiers are already gone are
    /// skipped. Both deletes are always attempted; the first store failure is
    /// returned afterwards.
    pub async fn logout(&self, access_token: &str, refresh_token: &str) -> Result<()> {
        let mut revoked = 0;
        let mut failure = None;
        for (token, kind) in [
            (access_token, TokenKind::Access),
            (refresh_token, TokenKind::Refresh),
        ] {
            let claims = match self.jwt.verify_ignoring_expiry(token, kind) {
                Ok(claims) => claims,
                Err(e) => {
                    debug!("Skipping undecodable {} token on logout: {}", kind, e);
                    continue;
                }
            };
            match self.store.delete(&keys::session(&claims.token_uuid)).await {
                Ok(true) => revoked += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!("Failed to revoke {} token on logout: {}", kind, e);
                    failure.get_or_insert(e);
                }
            }
        }

        info!(revoked, "Logged out");
        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Look a user up by email and issue a pair
    pub async fn login(&self, email: &str) -> Result<LoggedUser> {
        let user = self.users.user_by_email(email).await?;
        let tokens = self.create_token(&user.id).await?;
        Ok(LoggedUser { user, tokens })
    }

    async fn store_session(
        &self,
        session: &StoredSession,
        access_ttl: u64,
        refresh_ttl: u64,
    ) -> Result<()> {
        let mut batch = WriteBatch::new();
        batch
            .set(
                keys::session(&session.access_token_id),
                &session.user_id,
                Some(access_ttl.max(1)),
            )
            .set(
                keys::session(&session.refresh_token_id),
                &session.user_id,
                Some(refresh_ttl.max(1)),
            );
        self.store.execute(batch).await
    }

    async fn revoke_quietly(&self, token: &str, kind: TokenKind) {
        let claims = match self.jwt.verify_ignoring_expiry(token, kind) {
            Ok(claims) => claims,
            Err(e) => {
                debug!("Not revoking undecodable {} token: {}", kind, e);
                return;
            }
        };
        if let Err(e) = self.store.delete(&keys::session(&claims.token_uuid)).await {
            warn!("Failed to revoke {} token: {}", kind, e);
        }
    }
}
