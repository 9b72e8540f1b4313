use async_trait::async_trait;
use rand::{distributions::Alphanumeric, Rng};
use sqlx::PgPool;

use super::manager::DatabaseError;
use super::models::Article;

/// Length of the random suffix appended to every slug
pub const SLUG_SUFFIX_LEN: usize = 12;

/// Persistence surface for articles
#[async_trait]
pub trait ArticleGateway: Send + Sync {
    async fn get_all(&self) -> Result<Vec<Article>, DatabaseError>;

    async fn get_by_slug(&self, slug: &str) -> Result<Article, DatabaseError>;

    /// Insert a new article, assigning its id and a fresh slug.
    async fn save(&self, article: Article) -> Result<Article, DatabaseError>;

    /// Rewrite title and body of the article stored under `article.slug`.
    ///
    /// The slug is regenerated from the new title; id, owner and creation
    /// time are taken from the stored row.
    async fn update(&self, article: Article) -> Result<Article, DatabaseError>;

    /// Remove the article with this slug. A missing slug is not an error.
    async fn delete(&self, slug: &str) -> Result<(), DatabaseError>;
}

/// `slugify(title)-XXXXXXXXXXXX` with a random alphanumeric suffix.
///
/// Collisions are not checked; the suffix makes them negligible.
pub fn generate_slug(title: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SLUG_SUFFIX_LEN)
        .map(char::from)
        .collect();

    format!("{}-{}", slugify(title), suffix)
}

fn slugify(title: &str) -> String {
    title.to_lowercase().replace(' ', "-")
}

pub struct PgArticleGateway {
    pool: PgPool,
}

impl PgArticleGateway {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ArticleGateway for PgArticleGateway {
    async fn get_all(&self) -> Result<Vec<Article>, DatabaseError> {
        let articles = sqlx::query_as::<_, Article>(
            "SELECT id, slug, title, body, user_id, created_at, updated_at
             FROM articles
             ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(articles)
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Article, DatabaseError> {
        sqlx::query_as::<_, Article>(
            "SELECT id, slug, title, body, user_id, created_at, updated_at
             FROM articles
             WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("article {}", slug)))
    }

    async fn save(&self, mut article: Article) -> Result<Article, DatabaseError> {
        article.slug = generate_slug(&article.title);

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO articles (slug, title, body, user_id, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id",
        )
        .bind(&article.slug)
        .bind(&article.title)
        .bind(&article.body)
        .bind(article.user_id)
        .bind(article.created_at)
        .bind(article.updated_at)
        .fetch_one(&self.pool)
        .await?;

        article.id = id;
        Ok(article)
    }

    async fn update(&self, article: Article) -> Result<Article, DatabaseError> {
        let slug = generate_slug(&article.title);

        sqlx::query_as::<_, Article>(
            "UPDATE articles
             SET slug = $1, title = $2, body = $3, updated_at = $4
             WHERE slug = $5
             RETURNING id, slug, title, body, user_id, created_at, updated_at",
        )
        .bind(&slug)
        .bind(&article.title)
        .bind(&article.body)
        .bind(article.updated_at)
        .bind(&article.slug)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("article {}", article.slug)))
    }

    async fn delete(&self, slug: &str) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM articles WHERE slug = $1")
            .bind(slug)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
