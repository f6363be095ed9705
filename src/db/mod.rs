//! User persistence capability.
//!
//! The auth core never talks to Postgres directly; it depends on the
//! `UserStore` trait so tests and alternative backends can be swapped in
//! without touching the authentication or admission logic.

mod models;
mod postgres;

pub use models::{NewUser, User};
pub use postgres::PgUserStore;

use crate::error::DatabaseError;
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a new user. Fails with `DatabaseError::Duplicate` when the
    /// email is already registered.
    async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;

    /// Cheap connectivity probe used by the health reporter.
    async fn ping(&self) -> Result<(), DatabaseError>;
}
