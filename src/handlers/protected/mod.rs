// handlers/protected/mod.rs - Handlers behind bearer authentication

pub mod articles;
pub mod auth;

pub use articles::{create_article, delete_article, update_article};
pub use auth::me;
