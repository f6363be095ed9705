use crate::db::models::{NewUser, User};
use crate::db::UserStore;
use crate::error::DatabaseError;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub struct PgUserStore {
    pool: Arc<PgPool>,
}

impl PgUserStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Builds a lazily connecting pool so the process can start (and report
    /// itself not-ready) while the database is down.
    pub fn connect_lazy(url: &str, max_connections: u32) -> Result<Self, DatabaseError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect_lazy(url)?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    pub fn pool(&self) -> Arc<PgPool> {
        self.pool.clone()
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, password_hash, country_code, external_account_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, email, password_hash, country_code, external_account_id, created_at
            "#,
        )
        .bind(user.id)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.country_code)
        .bind(user.external_account_id)
        .bind(user.created_at)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, country_code, external_account_id, created_at \
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, country_code, external_account_id, created_at \
             FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(user)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .map_err(|e| DatabaseError::Unavailable(e.to_string()))?;

        Ok(())
    }
}
