use std::sync::Arc;

use crate::database::ArticleGateway;
use crate::error::ResponseTranslator;
use crate::services::AuthService;

/// Shared application state handed to handlers and middleware
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub articles: Arc<dyn ArticleGateway>,
    pub translator: ResponseTranslator,
}

impl AppState {
    pub fn new(auth: AuthService, articles: Arc<dyn ArticleGateway>, translator: ResponseTranslator) -> Self {
        Self {
            auth,
            articles,
            translator,
        }
    }
}
