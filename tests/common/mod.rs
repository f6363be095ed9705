use async_trait::async_trait;
use payrail_server::error::DatabaseError;
use payrail_server::{
    AppState, InMemoryCounterStore, NewUser, Settings, User, UserStore,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Map-backed user store so HTTP-level tests exercise the full auth flow
/// without a database.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.email) {
            return Err(DatabaseError::Duplicate);
        }
        let user = user.into_user();
        users.insert(user.email.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

/// Fresh application state with isolated counters and users.
#[allow(dead_code)]
pub fn test_state(requests_per_minute: u32) -> AppState {
    let mut config = Settings::new_for_test().expect("Failed to load test config");
    config.rate_limit.requests_per_minute = requests_per_minute;

    AppState::new(
        config,
        Arc::new(InMemoryUserStore::default()),
        Arc::new(InMemoryCounterStore::new()),
    )
    .expect("Failed to build test state")
}
