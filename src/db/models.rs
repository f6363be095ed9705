use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub country_code: String,
    pub external_account_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insertion payload; the store assigns nothing, ids and timestamps are fixed
/// here so a created row round-trips unchanged.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub country_code: String,
    pub external_account_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewUser {
    pub fn new(
        email: String,
        password_hash: String,
        country_code: String,
        external_account_id: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            country_code,
            external_account_id,
            created_at: Utc::now(),
        }
    }

    pub fn into_user(self) -> User {
        User {
            id: self.id,
            email: self.email,
            password_hash: self.password_hash,
            country_code: self.country_code,
            external_account_id: self.external_account_id,
            created_at: self.created_at,
        }
    }
}
