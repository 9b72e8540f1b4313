//! In-process gateways with the same contracts as the Postgres ones.
//!
//! Used by `--in-memory` mode and by tests. Each gateway counts mutating
//! calls so callers can assert a request never reached persistence.

use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::articles::{generate_slug, ArticleGateway};
use super::manager::DatabaseError;
use super::models::{Article, User};
use super::users::UserGateway;

#[derive(Default)]
pub struct MemoryUserGateway {
    users: RwLock<Vec<User>>,
    next_id: AtomicI64,
    save_calls: AtomicUsize,
}

impl MemoryUserGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save_calls(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserGateway for MemoryUserGateway {
    async fn get_by_id(&self, id: i64) -> Result<User, DatabaseError> {
        self.users
            .read()
            .await
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| DatabaseError::NotFound(format!("user {}", id)))
    }

    async fn get_by_email(&self, email: &str) -> Result<User, DatabaseError> {
        self.users
            .read()
            .await
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| DatabaseError::NotFound(format!("user with email {}", email)))
    }

    async fn count_by_email(&self, email: &str) -> Result<i64, DatabaseError> {
        let count = self.users.read().await.iter().filter(|u| u.email == email).count();
        Ok(count as i64)
    }

    async fn save(&self, mut user: User) -> Result<User, DatabaseError> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);

        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(DatabaseError::Conflict("unique constraint violated: users_email_key".to_string()));
        }

        user.id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        users.push(user.clone());
        Ok(user)
    }
}

#[derive(Default)]
pub struct MemoryArticleGateway {
    articles: RwLock<Vec<Article>>,
    next_id: AtomicI64,
    save_calls: AtomicUsize,
    update_calls: AtomicUsize,
    delete_calls: AtomicUsize,
}

impl MemoryArticleGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save_calls(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ArticleGateway for MemoryArticleGateway {
    async fn get_all(&self) -> Result<Vec<Article>, DatabaseError> {
        Ok(self.articles.read().await.clone())
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Article, DatabaseError> {
        self.articles
            .read()
            .await
            .iter()
            .find(|a| a.slug == slug)
            .cloned()
            .ok_or_else(|| DatabaseError::NotFound(format!("article {}", slug)))
    }

    async fn save(&self, mut article: Article) -> Result<Article, DatabaseError> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);

        article.slug = generate_slug(&article.title);
        article.id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.articles.write().await.push(article.clone());
        Ok(article)
    }

    async fn update(&self, article: Article) -> Result<Article, DatabaseError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);

        let mut articles = self.articles.write().await;
        let stored = articles
            .iter_mut()
            .find(|a| a.slug == article.slug)
            .ok_or_else(|| DatabaseError::NotFound(format!("article {}", article.slug)))?;

        stored.slug = generate_slug(&article.title);
        stored.title = article.title;
        stored.body = article.body;
        stored.updated_at = article.updated_at;
        Ok(stored.clone())
    }

    async fn delete(&self, slug: &str) -> Result<(), DatabaseError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);

        self.articles.write().await.retain(|a| a.slug != slug);
        Ok(())
    }
}
