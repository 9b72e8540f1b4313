// handlers/protected/articles.rs - POST /articles, PATCH and DELETE /articles/:slug handlers

use axum::{body::Bytes, extract::State};

use crate::api::{Action, ArticleRequest};
use crate::database::Article;
use crate::middleware::{ApiResponse, ApiResult, RequestContext};
use crate::state::AppState;

/**
 * POST /articles - Publish an article owned by the caller
 *
 * Expected Input:
 * ```json
 * { "title": "string", "body": "string" }
 * ```
 *
 * Responds 201 with the stored article, including its generated slug.
 */
pub async fn create_article(
    State(state): State<AppState>,
    ctx: RequestContext,
    body: Bytes,
) -> ApiResult<Article> {
    let article = ArticleRequest::new(Action::Create).bind(&body, &ctx)?;
    let article = state.articles.save(article).await?;

    tracing::info!("Article {} created by user {}", article.slug, article.user_id);
    Ok(ApiResponse::created(article))
}

/// PATCH /articles/:slug - Replace title and body; the slug is regenerated
pub async fn update_article(
    State(state): State<AppState>,
    ctx: RequestContext,
    body: Bytes,
) -> ApiResult<Article> {
    let article = ArticleRequest::new(Action::Update).bind(&body, &ctx)?;
    let article = state.articles.update(article).await?;

    Ok(ApiResponse::success(article))
}

/// DELETE /articles/:slug
pub async fn delete_article(State(state): State<AppState>, ctx: RequestContext) -> ApiResult<()> {
    let article = ctx.require_article()?;
    state.articles.delete(&article.slug).await?;

    tracing::info!("Article {} deleted", article.slug);
    Ok(ApiResponse::no_content())
}
