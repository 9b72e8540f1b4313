use axum::http::{header::AUTHORIZATION, HeaderMap};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, decode_header, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::CallerId;

/// Claim set carried by issued tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub exp: i64,
}

/// Claim set as read back during verification; the identity is checked by hand
#[derive(Debug, Deserialize)]
struct UnverifiedClaims {
    #[serde(rename = "userId", default)]
    user_id: serde_json::Value,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(String),

    /// Signature checked out but the identity claim is unusable
    #[error("malformed token claim: {0}")]
    MalformedClaim(String),

    #[error("token signing failed: {0}")]
    Signing(String),
}

/// Issues and verifies bearer tokens for a caller identity
pub trait TokenService: Send + Sync {
    fn issue(&self, caller: CallerId) -> Result<String, TokenError>;

    fn verify(&self, token: &str) -> Result<CallerId, TokenError>;
}

/// HMAC-signed JWTs under a single process-wide secret
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl JwtTokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.leeway = 0;
        validation
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, caller: CallerId) -> Result<String, TokenError> {
        let claims = Claims {
            user_id: caller.get(),
            exp: (Utc::now() + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    fn verify(&self, token: &str) -> Result<CallerId, TokenError> {
        if token.is_empty() {
            return Err(TokenError::Invalid("missing bearer token".to_string()));
        }

        // Header problems are never the server's fault, whatever the parser says
        decode_header(token).map_err(|e| TokenError::Invalid(e.to_string()))?;

        let data = decode::<UnverifiedClaims>(token, &self.decoding_key, &Self::validation())
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::Json(inner) => TokenError::MalformedClaim(inner.to_string()),
                _ => TokenError::Invalid(e.to_string()),
            })?;

        parse_user_id(&data.claims.user_id)
            .map(CallerId::new)
            .ok_or_else(|| TokenError::MalformedClaim(format!("userId is not numeric: {}", data.claims.user_id)))
    }
}

fn parse_user_id(value: &serde_json::Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.is_finite() && f.fract() == 0.0)
            .map(|f| f as i64)
    })
}

/// Extract the token from an `Authorization: Bearer <token>` header.
///
/// Anything other than exactly two space-separated parts led by `Bearer`
/// yields an empty string, which then fails verification.
pub fn extract_bearer_token(headers: &HeaderMap) -> String {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    match value.split(' ').collect::<Vec<_>>().as_slice() {
        ["Bearer", token] => token.to_string(),
        _ => String::new(),
    }
}
