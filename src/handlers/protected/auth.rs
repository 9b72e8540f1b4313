// handlers/protected/auth.rs - GET /auth/me handler

use axum::extract::State;

use crate::api::UserResponse;
use crate::middleware::{ApiResponse, ApiResult, RequestContext};
use crate::state::AppState;

/// Current caller's account, without password or token
pub async fn me(State(state): State<AppState>, ctx: RequestContext) -> ApiResult<UserResponse> {
    let caller = ctx.require_caller()?;
    let user = state.auth.current_user(caller).await?;

    Ok(ApiResponse::success(UserResponse::new(user)))
}
