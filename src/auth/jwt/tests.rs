//! JWT module tests

use super::types::{Claims, JwtHandler, TokenKind};
use super::utils::unix_now;
use crate::config::AuthConfig;
use crate::utils::error::AccessError;
use jsonwebtoken::{EncodingKey, Header, encode};

const SECRET: &str = "test_secret_key_for_testing_only_0123456789";

fn test_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: SECRET.to_string(),
        access_expiration: 900,
        refresh_expiration: 3600,
        issuer: "roleguard".to_string(),
    }
}

fn create_test_handler() -> JwtHandler {
    JwtHandler::new(&test_config()).unwrap()
}

fn sign(claims: &serde_json::Value, secret: &str) -> String {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

#[test]
fn test_issue_and_verify_access_token() {
    let handler = create_test_handler();
    let issued = handler.issue("42", TokenKind::Access).unwrap();

    let claims = handler.verify(&issued.token, TokenKind::Access).unwrap();
    assert_eq!(claims.user_id, "42");
    assert_eq!(claims.token_uuid, issued.token_uuid);
    assert_eq!(claims.kind, TokenKind::Access);
    assert_eq!(claims.iss, "roleguard");
    assert_eq!(issued.ttl, 900);
    assert_eq!(claims.exp, issued.expires_at);
}

#[test]
fn test_refresh_outlives_access() {
    let handler = create_test_handler();
    let access = handler.issue("1", TokenKind::Access).unwrap();
    let refresh = handler.issue("1", TokenKind::Refresh).unwrap();

    assert!(refresh.expires_at > access.expires_at);
    assert_ne!(access.token_uuid, refresh.token_uuid);
}

#[test]
fn test_kind_mismatch_rejected() {
    let handler = create_test_handler();
    let refresh = handler.issue("1", TokenKind::Refresh).unwrap();

    let err = handler.verify(&refresh.token, TokenKind::Access).unwrap_err();
    assert!(err.is_invalid_token());
}

#[test]
fn test_wrong_secret_rejected() {
    let handler = create_test_handler();
    let mut other = test_config();
    other.jwt_secret = "a_completely_different_secret_value_9876".to_string();
    let other = JwtHandler::new(&other).unwrap();

    let issued = other.issue("1", TokenKind::Access).unwrap();
    assert!(matches!(
        handler.verify(&issued.token, TokenKind::Access),
        Err(AccessError::InvalidToken(_))
    ));
}

#[test]
fn test_missing_claim_rejected() {
    let handler = create_test_handler();
    let now = unix_now().unwrap();
    let token = sign(
        &serde_json::json!({
            "user_id": "1",
            "kind": "access",
            "iat": now,
            "exp": now + 60,
            "iss": "roleguard",
        }),
        SECRET,
    );

    assert!(handler.verify(&token, TokenKind::Access).unwrap_err().is_invalid_token());
}

#[test]
fn test_empty_claim_rejected() {
    let handler = create_test_handler();
    let now = unix_now().unwrap();
    let claims = Claims {
        user_id: "1".to_string(),
        token_uuid: String::new(),
        kind: TokenKind::Access,
        iat: now,
        exp: now + 60,
        iss: "roleguard".to_string(),
    };
    let token = sign(&serde_json::to_value(&claims).unwrap(), SECRET);

    assert!(handler.verify(&token, TokenKind::Access).is_err());
}

#[test]
fn test_expired_token() {
    let handler = create_test_handler();
    let now = unix_now().unwrap();
    let token = sign(
        &serde_json::json!({
            "user_id": "1",
            "token_uuid": "abc",
            "kind": "access",
            "iat": now - 120,
            "exp": now - 60,
            "iss": "roleguard",
        }),
        SECRET,
    );

    let err = handler.verify(&token, TokenKind::Access).unwrap_err();
    assert!(err.to_string().contains("expired"));

    let claims = handler
        .verify_ignoring_expiry(&token, TokenKind::Access)
        .unwrap();
    assert_eq!(claims.token_uuid, "abc");
}

#[test]
fn test_foreign_issuer_rejected() {
    let handler = create_test_handler();
    let now = unix_now().unwrap();
    let token = sign(
        &serde_json::json!({
            "user_id": "1",
            "token_uuid": "abc",
            "kind": "access",
            "iat": now,
            "exp": now + 60,
            "iss": "someone-else",
        }),
        SECRET,
    );

    assert!(handler.verify(&token, TokenKind::Access).is_err());
}

#[test]
fn test_extract_token_from_header() {
    assert_eq!(
        JwtHandler::extract_token_from_header("Bearer abc.def.ghi"),
        Some("abc.def.ghi".to_string())
    );
    assert_eq!(JwtHandler::extract_token_from_header("Basic abc"), None);
    assert_eq!(JwtHandler::extract_token_from_header("Bearer "), None);
}

#[test]
fn test_debug_redacts_keys() {
    let printed = format!("{:?}", create_test_handler());
    assert!(printed.contains("[REDACTED]"));
    assert!(!printed.contains(SECRET));
}
