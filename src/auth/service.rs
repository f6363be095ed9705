use crate::auth::credentials;
use crate::auth::tokens::{Claims, TokenService};
use crate::db::{NewUser, User, UserStore};
use crate::error::{AppError, AuthError, DatabaseError};
use std::sync::Arc;
use tracing::info;

pub struct AuthService {
    users: Arc<dyn UserStore>,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, tokens: TokenService) -> Self {
        Self { users, tokens }
    }

    /// Registers a new account: strength policy, hash, persist, issue a token.
    /// The plaintext password never leaves this call.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        country_code: &str,
        external_account_id: Option<String>,
    ) -> Result<(String, User), AppError> {
        credentials::validate_strength(password)?;

        let password_hash = credentials::hash(password)?;
        let new_user = NewUser::new(
            email.to_string(),
            password_hash,
            country_code.to_string(),
            external_account_id,
        );

        let user = match self.users.create_user(new_user).await {
            Ok(user) => user,
            Err(DatabaseError::Duplicate) => {
                return Err(AuthError::DuplicateIdentity.into());
            }
            Err(e) => return Err(e.into()),
        };

        info!("Registered new user {}", user.id);
        let token = self.tokens.issue(&user)?;
        Ok((token, user))
    }

    /// Authenticates by email and password and issues a fresh token. An
    /// unknown email and a wrong password are distinct outcomes (404 vs 401).
    pub async fn login(&self, email: &str, password: &str) -> Result<(String, User), AppError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AuthError::UnknownIdentity)?;

        if !credentials::verify(password, &user.password_hash) {
            return Err(AuthError::InvalidCredentials.into());
        }

        let token = self.tokens.issue(&user)?;
        Ok((token, user))
    }

    /// Verifies a presented token and returns its claims.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.tokens.verify(token)
    }

    /// Pulls and verifies the bearer token from an `Authorization` header
    /// value. A missing or non-bearer header means no credential was
    /// presented.
    pub fn authenticate_header(&self, header_value: Option<&str>) -> Result<Claims, AuthError> {
        let token = header_value
            .and_then(TokenService::extract_bearer)
            .ok_or(AuthError::InvalidCredentials)?;
        self.tokens.verify(token)
    }
}
