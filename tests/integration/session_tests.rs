//! Session lifecycle integration tests

#[cfg(test)]
mod tests {
    use crate::common::fixtures::UserFactory;
    use crate::common::memory_engine;
    use crate::{assert_err, assert_ok};
    use roleguard::{AccessError, JwtHandler, TokenKind};

    #[tokio::test]
    async fn test_login_issues_usable_pair() {
        let engine = memory_engine().await;
        assert_ok!(
            engine
                .authorization()
                .add_user(&UserFactory::admin("ops"))
                .await
        );

        let logged = assert_ok!(engine.sessions().login("ops@bank.test").await);
        assert!(logged.user.is_admin);
        assert_eq!(logged.tokens.token_type, "Bearer");

        let header = format!("Bearer {}", logged.tokens.access_token);
        let token = JwtHandler::extract_token_from_header(&header).unwrap();
        assert_eq!(assert_ok!(engine.sessions().verify_token(&token).await), "ops");
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let engine = memory_engine().await;
        let err = assert_err!(engine.sessions().login("nobody@bank.test").await);
        assert!(matches!(err, AccessError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_refresh_rotates_and_is_single_use() {
        let engine = memory_engine().await;
        let sessions = engine.sessions();
        let first = assert_ok!(sessions.create_token("u1").await);

        let second = assert_ok!(
            sessions
                .refresh_token(&first.refresh_token, Some(&first.access_token))
                .await
        );
        assert_ne!(first.refresh_token, second.refresh_token);
        assert_eq!(assert_ok!(sessions.verify_token(&second.access_token).await), "u1");

        // the old access token was revoked along with the refresh
        assert!(assert_err!(sessions.verify_token(&first.access_token).await).is_invalid_token());
        let reused = assert_err!(sessions.refresh_token(&first.refresh_token, None).await);
        assert!(reused.is_invalid_token());
    }

    #[tokio::test]
    async fn test_logout_revokes_both_tokens() {
        let engine = memory_engine().await;
        let sessions = engine.sessions();
        let pair = assert_ok!(sessions.create_token("u1").await);

        assert_ok!(sessions.logout(&pair.access_token, &pair.refresh_token).await);

        assert!(assert_err!(sessions.verify_token(&pair.access_token).await).is_invalid_token());
        assert!(
            assert_err!(sessions.refresh_token(&pair.refresh_token, None).await)
                .is_invalid_token()
        );
    }

    #[tokio::test]
    async fn test_tokens_from_another_secret_are_rejected() {
        let engine = memory_engine().await;
        let mut other = crate::common::fixtures::test_config();
        other.service.auth.jwt_secret = "a-completely-different-secret-0123456789".to_string();
        let foreign = assert_ok!(JwtHandler::new(other.auth()));

        let issued = assert_ok!(foreign.issue("u1", TokenKind::Access));
        let err = assert_err!(engine.sessions().verify_token(&issued.token).await);
        assert!(err.is_invalid_token());
    }
}
