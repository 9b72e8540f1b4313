//! Authentication primitives
//!
//! Provides:
//! - Password hashing and verification with Argon2 ([`CredentialVerifier`])
//! - Signed, time-limited bearer tokens ([`TokenService`])
//! - Bearer token extraction from request headers

pub mod password;
pub mod token;

use std::fmt;

pub use password::{Argon2Verifier, CredentialError, CredentialVerifier};
pub use token::{extract_bearer_token, Claims, JwtTokenService, TokenError, TokenService};

/// Numeric identity of the authenticated caller, derived per request from a verified token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallerId(i64);

impl CallerId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for CallerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
