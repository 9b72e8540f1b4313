pub mod articles;
pub mod manager;
pub mod memory;
pub mod models;
pub mod users;

pub use articles::{generate_slug, ArticleGateway, PgArticleGateway};
pub use manager::{connect, health_check, DatabaseError};
pub use memory::{MemoryArticleGateway, MemoryUserGateway};
pub use models::{Article, User};
pub use users::{PgUserGateway, UserGateway};
