//! Bearer token validation and caller identity.
//!
//! Tokens are minted by the external identity provider and verified here with
//! the shared HS256 secret. A pre-compiled validator caches the decoding key
//! for the lifetime of the process.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use http::request::Parts;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Validated caller identity extracted from a bearer token.
#[derive(Debug, Clone)]
pub struct AuthInfo {
    pub user_id: Uuid,
    pub email: String,
}

/// Claims the identity provider puts into access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// User email
    #[serde(default)]
    pub email: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Token validation errors.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("missing authorization header")]
    MissingHeader,
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("invalid claim: {0}")]
    InvalidClaim(&'static str),
}

impl TryFrom<Claims> for AuthInfo {
    type Error = JwtError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: Uuid::parse_str(&claims.sub).map_err(|_| JwtError::InvalidClaim("sub"))?,
            email: claims.email,
        })
    }
}

/// Pre-compiled JWT validator with a cached decoding key.
///
/// Thread-safe and cloneable via `Arc`.
#[derive(Clone)]
pub struct JwtValidator {
    decoding_key: Arc<DecodingKey>,
    validation: Validation,
}

impl JwtValidator {
    /// Create a new validator from the provider's shared secret.
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // The provider sets its own audience; only expiry is enforced here.
        validation.validate_aud = false;
        validation.validate_exp = true;

        Self {
            decoding_key: Arc::new(DecodingKey::from_secret(
                secret.expose_secret().as_bytes(),
            )),
            validation,
        }
    }

    /// Resolve a bearer credential to the caller's identity.
    ///
    /// Tolerates an optional `Bearer ` prefix; otherwise the value is used
    /// verbatim. Empty or malformed credentials fail as unauthenticated.
    pub fn resolve(&self, credential: &str) -> Result<AuthInfo, JwtError> {
        let token = credential
            .strip_prefix("Bearer ")
            .or_else(|| credential.strip_prefix("bearer "))
            .unwrap_or(credential)
            .trim();

        if token.is_empty() {
            return Err(JwtError::MissingHeader);
        }

        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|_| JwtError::InvalidToken)?;

        token_data.claims.try_into()
    }
}

impl<S> FromRequestParts<S> for AuthInfo
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthInfo>()
            .cloned()
            .ok_or_else(|| AppError::Unauthenticated("Unauthorized".to_string()))
    }
}

/// Optional caller identity for routes that work with or without a token.
#[derive(Debug, Clone)]
pub struct MaybeAuth(pub Option<AuthInfo>);

impl<S> FromRequestParts<S> for MaybeAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<AuthInfo>().cloned()))
    }
}
