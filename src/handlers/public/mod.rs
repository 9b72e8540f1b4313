// handlers/public/mod.rs - Handlers reachable without a bearer token

pub mod articles;
pub mod auth;
pub mod health;

pub use articles::{get_article, list_articles};
pub use auth::{login, signup};
pub use health::health;
