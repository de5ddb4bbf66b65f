//! Bearer-token authentication for the REST surface.
//!
//! Tokens are HS256 JWTs issued by the account service; this crate only
//! verifies them and extracts the caller's user id.

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::SharedState;

/// Token lifetime in seconds.
const TOKEN_TTL_SECS: i64 = 6 * 60 * 60;

/// Authentication failure reported as 401 to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No `Authorization` header on the request.
    #[error("missing authorization header")]
    MissingHeader,
    /// The header is present but not a `Bearer <token>` value.
    #[error("authorization header is not a bearer token")]
    NotBearer,
    /// The token signature checked out but the token is past its expiry.
    #[error("token expired")]
    Expired,
    /// The token could not be decoded or its signature does not match.
    #[error("invalid token")]
    Invalid,
    /// A fresh token could not be signed.
    #[error("failed to sign token")]
    Signing,
}

/// Claims carried by access tokens.
///
/// `name` and `email` are minted by the account service for display purposes;
/// nothing here depends on them being present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Authenticated user id.
    pub sub: Uuid,
    /// Display name, when the account service included one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Contact e-mail, when the account service included one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Issued-at (seconds since epoch).
    pub iat: i64,
    /// Expiry (seconds since epoch).
    pub exp: i64,
}

/// Verifies (and, for tests and tooling, mints) HS256 access tokens.
pub struct AuthVerifier {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl AuthVerifier {
    /// Build a verifier around a shared secret.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            // Default validation already checks `exp`; pin the algorithm.
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Sign a token for `user` valid for [`TOKEN_TTL_SECS`].
    pub fn mint(&self, user: Uuid) -> Result<String, AuthError> {
        let iat = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| AuthError::Signing)?
            .as_secs() as i64;
        let claims = Claims {
            sub: user,
            name: None,
            email: None,
            iat,
            exp: iat + TOKEN_TTL_SECS,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|_| AuthError::Signing)
    }

    /// Decode and validate a token, returning its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::Invalid,
            })
    }
}

/// Caller identity extracted from the `Authorization` header.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
    /// Authenticated user id.
    pub id: Uuid,
}

fn parse_bearer(header: &str) -> Result<&str, AuthError> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::NotBearer)
}

impl FromRequestParts<SharedState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingHeader)?
            .to_str()
            .map_err(|_| AuthError::NotBearer)?;

        let token = parse_bearer(header)?;
        let claims = state.auth().verify(token)?;

        Ok(AuthenticatedUser { id: claims.sub })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verifier() -> AuthVerifier {
        AuthVerifier::new(b"unit-test-secret")
    }

    #[test]
    fn mint_and_verify_roundtrip() {
        let verifier = verifier();
        let user = Uuid::new_v4();

        let token = verifier.mint(user).unwrap();
        let claims = verifier.verify(&token).unwrap();

        assert_eq!(claims.sub, user);
        assert_eq!(claims.exp, claims.iat + TOKEN_TTL_SECS);
    }

    #[test]
    fn verify_rejects_expired_token() {
        let verifier = verifier();
        let iat = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64;
        // Expired well past the default decoding leeway.
        let claims = Claims {
            sub: Uuid::new_v4(),
            name: None,
            email: None,
            iat: iat - TOKEN_TTL_SECS,
            exp: iat - TOKEN_TTL_SECS + 1,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"unit-test-secret"),
        )
        .unwrap();

        assert_eq!(verifier.verify(&token).unwrap_err(), AuthError::Expired);
    }

    #[test]
    fn verify_rejects_foreign_signature() {
        let token = AuthVerifier::new(b"other-secret")
            .mint(Uuid::new_v4())
            .unwrap();
        assert_eq!(verifier().verify(&token).unwrap_err(), AuthError::Invalid);
    }

    #[test]
    fn bearer_prefix_is_required() {
        assert_eq!(parse_bearer("Basic abc").unwrap_err(), AuthError::NotBearer);
        assert_eq!(parse_bearer("Bearer ").unwrap_err(), AuthError::NotBearer);
        assert_eq!(parse_bearer("Bearer abc").unwrap(), "abc");
    }
}
