use std::sync::Arc;

use axum::http::HeaderMap;

use crate::auth::{extract_bearer_token, CallerId, CredentialVerifier, TokenService};
use crate::database::{DatabaseError, User, UserGateway};
use crate::error::ApiError;

/// Account operations: signup, login, token authentication, current user
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserGateway>,
    credentials: Arc<dyn CredentialVerifier>,
    tokens: Arc<dyn TokenService>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserGateway>,
        credentials: Arc<dyn CredentialVerifier>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            users,
            credentials,
            tokens,
        }
    }

    /// Resolve the bearer token on a request into a caller identity
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<CallerId, ApiError> {
        let token = extract_bearer_token(headers);
        Ok(self.tokens.verify(&token)?)
    }

    pub fn issue_token(&self, user_id: i64) -> Result<String, ApiError> {
        Ok(self.tokens.issue(CallerId::new(user_id))?)
    }

    /// Register a bound user and issue their first token.
    ///
    /// `user.password` arrives in plaintext and is stored hashed.
    pub async fn signup(&self, mut user: User) -> Result<(User, String), ApiError> {
        if self.users.count_by_email(&user.email).await? > 0 {
            return Err(ApiError::conflict("email already in use"));
        }

        user.password = self.credentials.hash(&user.password)?;

        let user = self.users.save(user).await.map_err(|e| match e {
            DatabaseError::Conflict(_) => ApiError::conflict("email already in use"),
            other => other.into(),
        })?;

        let token = self.issue_token(user.id)?;
        tracing::info!("Registered user {} ({})", user.id, user.email);
        Ok((user, token))
    }

    /// Check credentials and issue a token. Every mismatch reads as wrong credentials.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), ApiError> {
        let user = match self.users.get_by_email(email).await {
            Ok(user) => user,
            Err(DatabaseError::NotFound(_)) => {
                tracing::warn!("Login rejected: no account for {}", email);
                return Err(ApiError::Credentials);
            }
            Err(other) => return Err(other.into()),
        };

        match self.credentials.verify(&user.password, password) {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!("Login rejected: wrong password for user {}", user.id);
                return Err(ApiError::Credentials);
            }
            Err(e) => {
                tracing::warn!("Login rejected: unusable stored hash for user {}: {}", user.id, e);
                return Err(ApiError::Credentials);
            }
        }

        let token = self.issue_token(user.id)?;
        Ok((user, token))
    }

    pub async fn current_user(&self, caller: CallerId) -> Result<User, ApiError> {
        Ok(self.users.get_by_id(caller.get()).await?)
    }
}
