pub mod article;
pub mod user;

pub use article::Article;
pub use user::User;
