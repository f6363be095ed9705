use crate::auth::rate_limit::Decision;
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    AuthError(#[from] AuthError),

    #[error("Rate limit exceeded")]
    RateLimited(Decision),

    #[error("Database error: {0}")]
    DatabaseError(#[from] DatabaseError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Password does not meet policy: {0}")]
    WeakPassword(String),

    #[error("An account with this email already exists")]
    DuplicateIdentity,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("No account found for this email")]
    UnknownIdentity,

    #[error("Token expired")]
    ExpiredToken,

    #[error("Invalid token")]
    InvalidToken,
}

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database unavailable: {0}")]
    Unavailable(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Record not found")]
    NotFound,

    #[error("Duplicate record")]
    Duplicate,
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DatabaseError::NotFound,
            sqlx::Error::Database(e) if e.is_unique_violation() => DatabaseError::Duplicate,
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                DatabaseError::Unavailable(err.to_string())
            }
            _ => DatabaseError::QueryError(err.to_string()),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(err.to_string())
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = json!({
            "error": {
                "status": status.as_u16(),
                "message": self.to_string()
            }
        });

        let mut builder = HttpResponse::build(status);
        // A denied request carries the same quota headers as an allowed one so
        // clients can back off deterministically.
        if let AppError::RateLimited(decision) = self {
            for (name, value) in decision.header_values() {
                builder.insert_header((name, value));
            }
        }
        builder.json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::AuthError(e) => match e {
                AuthError::WeakPassword(_) => StatusCode::BAD_REQUEST,
                AuthError::DuplicateIdentity => StatusCode::BAD_REQUEST,
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::UnknownIdentity => StatusCode::NOT_FOUND,
                AuthError::ExpiredToken => StatusCode::UNAUTHORIZED,
                AuthError::InvalidToken => StatusCode::BAD_REQUEST,
            },
            AppError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::DatabaseError(DatabaseError::Unavailable(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::DatabaseError(DatabaseError::NotFound) => StatusCode::NOT_FOUND,
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
