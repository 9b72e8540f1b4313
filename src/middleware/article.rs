use axum::{
    extract::{rejection::PathRejection, Path, Request, State},
    middleware::Next,
    response::Response,
};

use super::context::RequestContext;
use crate::error::ApiError;
use crate::state::AppState;

/// Load the article named by the `:slug` path segment into the request context.
///
/// A missing slug is a 404; any other store failure is fatal.
pub async fn resolve_article(
    State(state): State<AppState>,
    slug: Result<Path<String>, PathRejection>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Path(slug) = slug.map_err(|e| ApiError::validation(e.body_text()))?;
    let article = state.articles.get_by_slug(&slug).await?;

    tracing::debug!("Resolved article {} ({})", article.id, article.slug);
    RequestContext::update(&mut request, |ctx| ctx.with_article(article));

    Ok(next.run(request).await)
}

/// Allow the request through only when the caller owns the resolved article.
///
/// Must run after [`authenticate`](super::authenticate) and [`resolve_article`].
pub async fn require_article_owner(request: Request, next: Next) -> Result<Response, ApiError> {
    let ctx = request.extensions().get::<RequestContext>().cloned().unwrap_or_default();
    let caller = ctx.require_caller()?;
    let article = ctx.require_article()?;

    if !article.is_owned_by(caller.get()) {
        tracing::warn!(
            "Caller {} denied access to article {} owned by {}",
            caller,
            article.slug,
            article.user_id
        );
        return Err(ApiError::Authorization);
    }

    Ok(next.run(request).await)
}
