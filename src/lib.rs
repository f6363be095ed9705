pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod health;

use std::sync::Arc;

pub use config::Settings;
pub use error::AppError;
pub type Result<T> = std::result::Result<T, AppError>;

pub use auth::{AuthService, ClientIdentity, CounterStore, InMemoryCounterStore, RateLimiter, TokenService};
pub use db::{NewUser, PgUserStore, User, UserStore};
pub use health::HealthReporter;

/// Application state shared across all request handlers.
///
/// The counter store is process-wide mutable state with an explicit
/// lifecycle: empty at startup, discarded at exit. It is injected here rather
/// than reached as a singleton so tests can instantiate isolated instances.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub users: Arc<dyn UserStore>,
    pub auth: Arc<AuthService>,
    pub limiter: Arc<RateLimiter>,
    pub health: Arc<HealthReporter>,
}

impl AppState {
    /// Fails fast on signing misconfiguration; a server with a broken token
    /// service must not accept traffic.
    pub fn new(
        config: Settings,
        users: Arc<dyn UserStore>,
        counters: Arc<dyn CounterStore>,
    ) -> Result<Self> {
        let tokens = TokenService::new(
            &config.auth.jwt_secret,
            &config.auth.jwt_algorithm,
            config.auth.token_expiry_days,
        )?;

        let auth = Arc::new(AuthService::new(users.clone(), tokens));
        let limiter = Arc::new(RateLimiter::new(
            counters,
            config.rate_limit.requests_per_minute,
        ));
        let health = Arc::new(HealthReporter::new(users.clone()));

        Ok(Self {
            config: Arc::new(config),
            users,
            auth,
            limiter,
            health,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with(config: Settings) -> Result<AppState> {
        struct NullStore;

        #[async_trait::async_trait]
        impl UserStore for NullStore {
            async fn create_user(
                &self,
                user: NewUser,
            ) -> std::result::Result<User, error::DatabaseError> {
                Ok(user.into_user())
            }
            async fn find_by_email(
                &self,
                _email: &str,
            ) -> std::result::Result<Option<User>, error::DatabaseError> {
                Ok(None)
            }
            async fn find_by_id(
                &self,
                _id: uuid::Uuid,
            ) -> std::result::Result<Option<User>, error::DatabaseError> {
                Ok(None)
            }
            async fn ping(&self) -> std::result::Result<(), error::DatabaseError> {
                Ok(())
            }
        }

        AppState::new(
            config,
            Arc::new(NullStore),
            Arc::new(InMemoryCounterStore::new()),
        )
    }

    #[test]
    fn test_app_state_creation() {
        let config = Settings::new_for_test().expect("Failed to load test config");
        assert!(state_with(config).is_ok());
    }

    #[test]
    fn test_app_state_rejects_empty_signing_secret() {
        let mut config = Settings::new_for_test().expect("Failed to load test config");
        config.auth.jwt_secret = String::new();

        let state = state_with(config);
        assert!(matches!(state, Err(AppError::ConfigError(_))));
    }

    #[test]
    fn test_app_state_clone_shares_services() {
        let config = Settings::new_for_test().expect("Failed to load test config");
        let state = state_with(config).unwrap();
        let cloned = state.clone();

        assert!(Arc::ptr_eq(&state.config, &cloned.config));
        assert!(Arc::ptr_eq(&state.auth, &cloned.auth));
        assert!(Arc::ptr_eq(&state.limiter, &cloned.limiter));
    }
}
