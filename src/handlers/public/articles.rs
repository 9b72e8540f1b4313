// handlers/public/articles.rs - GET /articles and GET /articles/:slug handlers

use axum::extract::State;

use crate::database::Article;
use crate::middleware::{ApiResponse, ApiResult, RequestContext};
use crate::state::AppState;

pub async fn list_articles(State(state): State<AppState>) -> ApiResult<Vec<Article>> {
    let articles = state.articles.get_all().await?;
    Ok(ApiResponse::success(articles))
}

/// Article already loaded by the resolution middleware
pub async fn get_article(ctx: RequestContext) -> ApiResult<Article> {
    Ok(ApiResponse::success(ctx.require_article()?.clone()))
}
