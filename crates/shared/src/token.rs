//! Session token generation and validation.
//!
//! Sessions are signed JWTs carrying the caller's id, username, and role,
//! expiring after a fixed window (3 hours by default).

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;
use uuid::Uuid;

use crate::auth::Claims;

/// Session token configuration.
#[derive(Debug, Clone)]
pub struct SessionTokenConfig {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Session lifetime in minutes.
    pub expires_minutes: i64,
}

impl Default for SessionTokenConfig {
    fn default() -> Self {
        Self {
            secret: "change-me-in-production".to_string(),
            expires_minutes: 180,
        }
    }
}

/// Errors that can occur during session token operations.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Token encoding failed.
    #[error("failed to encode token: {0}")]
    EncodingError(String),

    /// Token decoding failed.
    #[error("failed to decode token: {0}")]
    DecodingError(String),

    /// Token has expired.
    #[error("token has expired")]
    Expired,

    /// Token is invalid.
    #[error("invalid token")]
    Invalid,
}

/// Service for issuing and validating session tokens.
#[derive(Clone)]
pub struct SessionTokenService {
    config: SessionTokenConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for SessionTokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokenService")
            .field("config", &self.config)
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

impl SessionTokenService {
    /// Creates a new session token service with the given configuration.
    #[must_use]
    pub fn new(config: SessionTokenConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Issues a session token for a user.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::EncodingError` if token generation fails.
    pub fn issue(&self, user_id: Uuid, username: &str, role: &str) -> Result<String, TokenError> {
        let expires_at = Utc::now() + Duration::minutes(self.config.expires_minutes);
        let claims = Claims::new(user_id, username, role, expires_at);

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| TokenError::EncodingError(e.to_string()))
    }

    /// Validates and decodes a session token.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Expired` if the token has expired.
    /// Returns `TokenError::DecodingError` if the token is malformed.
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let validation = Validation::default();

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::DecodingError(e.to_string()),
            })
    }

    /// Returns the session lifetime in seconds.
    #[must_use]
    pub const fn expires_in(&self) -> i64 {
        self.config.expires_minutes * 60
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_service() -> SessionTokenService {
        SessionTokenService::new(SessionTokenConfig {
            secret: "test-secret-key-for-testing".to_string(),
            expires_minutes: 180,
        })
    }

    #[test]
    fn test_issue_token() {
        let service = create_test_service();
        let user_id = Uuid::new_v4();

        let token = service.issue(user_id, "alice", "student").unwrap();
        assert!(!token.is_empty());
    }

    #[test]
    fn test_validate_token() {
        let service = create_test_service();
        let user_id = Uuid::new_v4();

        let token = service.issue(user_id, "alice", "admin").unwrap();
        let claims = service.validate(&token).unwrap();

        assert_eq!(claims.user_id(), user_id);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role, "admin");
    }

    #[test]
    fn test_invalid_token() {
        let service = create_test_service();
        let result = service.validate("invalid.token.here");
        assert!(result.is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let service = create_test_service();
        let other = SessionTokenService::new(SessionTokenConfig {
            secret: "a-different-secret".to_string(),
            expires_minutes: 180,
        });

        let token = service.issue(Uuid::new_v4(), "bob", "teacher").unwrap();
        assert!(other.validate(&token).is_err());
    }

    #[test]
    fn test_expires_in_seconds() {
        let service = create_test_service();
        assert_eq!(service.expires_in(), 180 * 60);
    }
}
