// HTTP API Error Types
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::auth::{CredentialError, TokenError};
use crate::database::DatabaseError;

/// Error taxonomy shared by middleware, handlers and the response translator
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// Missing or malformed request field
    #[error("{0}")]
    Validation(String),

    #[error("not found")]
    NotFound,

    /// Missing, invalid or expired bearer token
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Authenticated caller does not own the resource
    #[error("caller does not own this resource")]
    Authorization,

    #[error("{0}")]
    Conflict(String),

    /// Login password mismatch
    #[error("wrong credentials")]
    Credentials,

    /// Unexpected store or internal failure
    #[error("{0}")]
    Fatal(String),

    /// Response serialization failure
    #[error("{0}")]
    Render(String),
}

/// Wire body for every error response
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        ApiError::Authentication(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        ApiError::Fatal(message.into())
    }

    pub fn render(message: impl Into<String>) -> Self {
        ApiError::Render(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::Authentication(_) | ApiError::Authorization | ApiError::Credentials => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Render(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Fatal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message
    pub fn message(&self) -> &'static str {
        match self {
            ApiError::Validation(_) | ApiError::Conflict(_) => "Invalid request.",
            ApiError::Authentication(_) | ApiError::Authorization | ApiError::Credentials => "Unauthorized",
            ApiError::NotFound => "Resource not found.",
            ApiError::Render(_) => "Error rendering response.",
            ApiError::Fatal(_) => "Server Error",
        }
    }

    /// Detail text for the `error` field, if this kind carries one on the wire
    pub fn detail(&self, expose_fatal: bool) -> Option<&str> {
        match self {
            ApiError::Validation(msg) | ApiError::Conflict(msg) | ApiError::Render(msg) => Some(msg),
            ApiError::Fatal(msg) if expose_fatal => Some(msg),
            _ => None,
        }
    }

    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

/// Maps the error taxonomy onto wire-level status codes and bodies
#[derive(Debug, Clone, Copy)]
pub struct ResponseTranslator {
    expose_error_details: bool,
}

impl Default for ResponseTranslator {
    fn default() -> Self {
        Self { expose_error_details: true }
    }
}

impl ResponseTranslator {
    pub fn new(expose_error_details: bool) -> Self {
        Self { expose_error_details }
    }

    pub fn expose_error_details(&self) -> bool {
        self.expose_error_details
    }

    pub fn render(&self, error: &ApiError) -> Response {
        let status = error.status_code();
        let body = ErrorBody {
            message: error.message(),
            error: error.detail(self.expose_error_details),
        };

        let mut response = match serde_json::to_vec(&body) {
            Ok(bytes) => {
                let mut response = (status, bytes).into_response();
                response
                    .headers_mut()
                    .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
                response
            }
            Err(e) => {
                // Nothing left to report through; surface it in the logs and fail the request.
                tracing::error!("Failed to render error response for {:?}: {}", error, e);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        };

        // Keep the typed error on the response so outer layers can re-render it
        response.extensions_mut().insert(error.clone());
        response
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(_) => ApiError::NotFound,
            DatabaseError::Conflict(msg) => ApiError::Conflict(msg),
            other => {
                tracing::error!("Database error: {}", other);
                ApiError::Fatal(other.to_string())
            }
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired | TokenError::Invalid(_) => ApiError::Authentication(err.to_string()),
            TokenError::MalformedClaim(_) | TokenError::Signing(_) => {
                tracing::error!("Token error: {}", err);
                ApiError::Fatal(err.to_string())
            }
        }
    }
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        tracing::error!("Credential error: {}", err);
        ApiError::Fatal(err.to_string())
    }
}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        ResponseTranslator::default().render(&self)
    }
}
