// handlers/public/auth.rs - POST /auth/signup and POST /auth/login handlers

use axum::{body::Bytes, extract::State};

use crate::api::{Action, UserRequest, UserResponse};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/**
 * POST /auth/signup - Register an account and receive a bearer token
 *
 * Expected Input:
 * ```json
 * { "username": "string", "email": "string", "password": "string" }
 * ```
 *
 * Responds 201 with the stored user (no password) plus `token`.
 */
pub async fn signup(State(state): State<AppState>, body: Bytes) -> ApiResult<UserResponse> {
    let candidate = UserRequest::new(Action::Signup).bind(&body)?;
    let (user, token) = state.auth.signup(candidate).await?;

    Ok(ApiResponse::created(UserResponse::with_token(user, token)))
}

/// POST /auth/login - Exchange email and password for a bearer token
pub async fn login(State(state): State<AppState>, body: Bytes) -> ApiResult<UserResponse> {
    let credentials = UserRequest::new(Action::Login).bind(&body)?;
    let (user, token) = state.auth.login(&credentials.email, &credentials.password).await?;

    tracing::info!("User {} logged in", user.id);
    Ok(ApiResponse::success(UserResponse::with_token(user, token)))
}
