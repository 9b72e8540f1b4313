use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request},
    http::request::Parts,
};

use crate::auth::CallerId;
use crate::database::Article;
use crate::error::ApiError;

/// Request-scoped state filled in by middleware as the request moves down the chain.
///
/// Lives in the request extensions for exactly one request.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    caller: Option<CallerId>,
    article: Option<Article>,
}

impl RequestContext {
    pub fn caller(&self) -> Option<CallerId> {
        self.caller
    }

    pub fn article(&self) -> Option<&Article> {
        self.article.as_ref()
    }

    pub fn with_caller(mut self, caller: CallerId) -> Self {
        self.caller = Some(caller);
        self
    }

    pub fn with_article(mut self, article: Article) -> Self {
        self.article = Some(article);
        self
    }

    /// Caller identity placed by the authentication middleware.
    ///
    /// Absence means the route was wired without authentication in front of it.
    pub fn require_caller(&self) -> Result<CallerId, ApiError> {
        self.caller.ok_or_else(|| {
            tracing::error!("Caller identity missing from request context");
            ApiError::fatal("caller identity missing from request context")
        })
    }

    /// Article placed by the resolution middleware.
    pub fn require_article(&self) -> Result<&Article, ApiError> {
        self.article.as_ref().ok_or_else(|| {
            tracing::error!("Resolved article missing from request context");
            ApiError::fatal("resolved article missing from request context")
        })
    }

    /// Apply `f` to the context stored on `request`, creating it if needed.
    pub fn update(request: &mut Request, f: impl FnOnce(Self) -> Self) {
        let current = request.extensions_mut().remove::<Self>().unwrap_or_default();
        request.extensions_mut().insert(f(current));
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Self>().cloned().unwrap_or_default())
    }
}
