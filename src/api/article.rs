use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::validate::require;
use super::{decode, Action, Payload};
use crate::database::Article;
use crate::error::ApiError;
use crate::middleware::RequestContext;

/// Article fields as a client may send them
#[derive(Debug, Default, Deserialize)]
struct ArticlePayload {
    id: Option<i64>,
    slug: Option<String>,
    title: Option<String>,
    body: Option<String>,
    user_id: Option<i64>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl Payload for ArticlePayload {
    const MISSING_FIELDS: &'static str = "missing required Article fields";

    fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.slug.is_none()
            && self.title.is_none()
            && self.body.is_none()
            && self.user_id.is_none()
            && self.created_at.is_none()
            && self.updated_at.is_none()
    }
}

/// Binds a request body to an [`Article`] for one action
#[derive(Debug, Clone)]
pub struct ArticleRequest {
    action: Action,
}

impl ArticleRequest {
    pub fn new(action: Action) -> Self {
        Self { action }
    }

    /// Decode, prepare and validate an article.
    ///
    /// The owner is always the caller in `ctx`. On update, id, slug and
    /// creation time come from the article already resolved into `ctx`.
    pub fn bind(&self, body: &[u8], ctx: &RequestContext) -> Result<Article, ApiError> {
        let payload: ArticlePayload = decode(body)?;
        let now = Utc::now();

        let mut article = Article {
            id: payload.id.unwrap_or_default(),
            slug: payload.slug.unwrap_or_default(),
            title: payload.title.unwrap_or_default(),
            body: payload.body.unwrap_or_default(),
            user_id: payload.user_id.unwrap_or_default(),
            created_at: payload.created_at.unwrap_or(now),
            updated_at: payload.updated_at.unwrap_or(now),
        };

        match &self.action {
            Action::Create => {
                article.id = 0;
                article.slug = String::new();
                article.created_at = now;
                article.updated_at = now;
            }
            Action::Update => {
                let resolved = ctx.require_article()?;
                article.id = resolved.id;
                article.slug = resolved.slug.clone();
                article.created_at = resolved.created_at;
                article.updated_at = now;
            }
            _ => {}
        }

        article.user_id = ctx.require_caller()?.get();

        self.validate(&article)?;
        Ok(article)
    }

    fn validate(&self, article: &Article) -> Result<(), ApiError> {
        match &self.action {
            Action::Create | Action::Update => {
                require(&article.title, "required title")?;
                require(&article.body, "required body")?;
                Ok(())
            }
            other => {
                tracing::warn!("Article bound with action '{}' passes without validation", other);
                Ok(())
            }
        }
    }
}
