use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validate::{is_valid_email, require, sanitize};
use super::{decode, Action, Payload};
use crate::database::User;
use crate::error::ApiError;

/// User fields as a client may send them
#[derive(Debug, Default, Deserialize)]
struct UserPayload {
    id: Option<i64>,
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl Payload for UserPayload {
    const MISSING_FIELDS: &'static str = "missing required User fields";

    fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.username.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.created_at.is_none()
            && self.updated_at.is_none()
    }
}

/// Binds a request body to a candidate [`User`] for one action
#[derive(Debug, Clone)]
pub struct UserRequest {
    action: Action,
}

impl UserRequest {
    pub fn new(action: Action) -> Self {
        Self { action }
    }

    /// Decode, prepare and validate a user.
    ///
    /// The returned `password` is still plaintext; hashing belongs to the auth service.
    pub fn bind(&self, body: &[u8]) -> Result<User, ApiError> {
        let payload: UserPayload = decode(body)?;
        let now = Utc::now();

        let mut user = User {
            id: payload.id.unwrap_or_default(),
            username: payload.username.unwrap_or_default(),
            email: payload.email.unwrap_or_default(),
            password: payload.password.unwrap_or_default(),
            created_at: payload.created_at.unwrap_or(now),
            updated_at: payload.updated_at.unwrap_or(now),
        };

        if self.action == Action::Signup {
            user.id = 0;
            user.username = sanitize(&user.username);
            user.email = sanitize(&user.email);
            user.created_at = now;
            user.updated_at = now;
        }

        self.validate(&user)?;
        Ok(user)
    }

    fn validate(&self, user: &User) -> Result<(), ApiError> {
        match &self.action {
            Action::Signup => {
                require(&user.username, "required username")?;
                require(&user.password, "required password")?;
                require(&user.email, "required email")?;
                validate_email(&user.email)
            }
            Action::Login => {
                require(&user.password, "required password")?;
                require(&user.email, "required email")?;
                validate_email(&user.email)
            }
            other => {
                tracing::warn!("User bound with action '{}' passes without validation", other);
                Ok(())
            }
        }
    }
}

fn validate_email(email: &str) -> Result<(), ApiError> {
    if !is_valid_email(email) {
        return Err(ApiError::validation("invalid email"));
    }
    Ok(())
}

/// User as returned to clients: never the password, plus a token when one was issued
#[derive(Debug, Serialize)]
pub struct UserResponse {
    #[serde(flatten)]
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl UserResponse {
    pub fn new(user: User) -> Self {
        Self { user, token: None }
    }

    pub fn with_token(user: User, token: String) -> Self {
        Self {
            user,
            token: Some(token).filter(|t| !t.is_empty()),
        }
    }
}
