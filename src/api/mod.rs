//! Request binding and validation
//!
//! Decodes inbound JSON into candidate entities, applies per-action
//! preparation (timestamps, sanitizing, values taken from request context)
//! and validates required fields. The first violation wins.

pub mod action;
pub mod article;
pub mod user;
pub mod validate;

use serde::de::DeserializeOwned;

use crate::error::ApiError;

pub use action::Action;
pub use article::ArticleRequest;
pub use user::{UserRequest, UserResponse};

/// Decoded body where every known field is optional
trait Payload: DeserializeOwned {
    /// Error text when the body carries no entity fields at all
    const MISSING_FIELDS: &'static str;

    fn is_empty(&self) -> bool;
}

/// Decode a raw JSON body, rejecting bodies that carry no entity fields.
fn decode<P: Payload>(body: &[u8]) -> Result<P, ApiError> {
    let payload: Option<P> = serde_json::from_slice(body).map_err(|e| ApiError::validation(e.to_string()))?;

    payload
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::validation(P::MISSING_FIELDS))
}
