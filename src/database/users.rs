use async_trait::async_trait;
use sqlx::PgPool;

use super::manager::DatabaseError;
use super::models::User;

/// Persistence surface for user accounts
#[async_trait]
pub trait UserGateway: Send + Sync {
    async fn get_by_id(&self, id: i64) -> Result<User, DatabaseError>;

    async fn get_by_email(&self, email: &str) -> Result<User, DatabaseError>;

    async fn count_by_email(&self, email: &str) -> Result<i64, DatabaseError>;

    /// Insert a user whose `password` is already hashed; returns it with the assigned id.
    async fn save(&self, user: User) -> Result<User, DatabaseError>;
}

pub struct PgUserGateway {
    pool: PgPool,
}

impl PgUserGateway {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserGateway for PgUserGateway {
    async fn get_by_id(&self, id: i64) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, email, password, created_at, updated_at
             FROM users
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("user {}", id)))
    }

    async fn get_by_email(&self, email: &str) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, email, password, created_at, updated_at
             FROM users
             WHERE email = $1
             LIMIT 1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("user with email {}", email)))
    }

    async fn count_by_email(&self, email: &str) -> Result<i64, DatabaseError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(id) FROM users WHERE email = $1")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn save(&self, mut user: User) -> Result<User, DatabaseError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO users (username, email, password, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await?;

        user.id = id;
        Ok(user)
    }
}
