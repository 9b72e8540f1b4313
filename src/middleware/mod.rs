pub mod article;
pub mod auth;
pub mod context;
pub mod response;

pub use article::{require_article_owner, resolve_article};
pub use auth::authenticate;
pub use context::RequestContext;
pub use response::{translate_errors, ApiResponse, ApiResult};
