use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::context::RequestContext;
use crate::error::ApiError;
use crate::state::AppState;

/// Bearer token authentication.
///
/// On success the caller identity is placed in the [`RequestContext`] and the
/// request continues; otherwise the chain stops here.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let caller = state.auth.authenticate(request.headers()).map_err(|e| {
        if !e.is_server_error() {
            tracing::warn!("Rejected {} {}: {}", request.method(), request.uri().path(), e);
        }
        e
    })?;

    tracing::debug!("Authenticated caller {}", caller);
    RequestContext::update(&mut request, |ctx| ctx.with_caller(caller));

    Ok(next.run(request).await)
}
