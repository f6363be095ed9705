use crate::db::User;
use crate::error::{AppError, AuthError};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
}

/// Identity payload embedded in a signed token. Never mutated; a new token
/// replaces an old one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub country_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_account_id: Option<String>,
    pub iat: i64,
    pub exp: i64,
    pub token_type: TokenType,
}

/// Stateless token issuer/verifier. Validity is purely a function of the
/// signature and `exp`; there is no server-side session table and no
/// revocation state.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    expiry_days: i64,
}

impl TokenService {
    /// Fails on an empty secret or a non-HMAC algorithm name; both silently
    /// break verification of every token, so startup must not proceed.
    pub fn new(secret: &str, algorithm: &str, expiry_days: i64) -> Result<Self, AppError> {
        if secret.is_empty() {
            return Err(AppError::ConfigError("token signing secret is empty".into()));
        }

        let algorithm = Algorithm::from_str(algorithm)
            .map_err(|_| AppError::ConfigError(format!("unknown signing algorithm: {algorithm}")))?;
        if !matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            return Err(AppError::ConfigError(format!(
                "signing algorithm {algorithm:?} is not supported with a shared secret"
            )));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            algorithm,
            expiry_days,
        })
    }

    pub fn issue(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            country_code: user.country_code.clone(),
            external_account_id: user.external_account_id.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::days(self.expiry_days)).timestamp(),
            token_type: TokenType::Access,
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| AppError::InternalError(e.to_string()))
    }

    /// Expired-but-well-formed tokens fail as `ExpiredToken`; signature
    /// mismatch or structural corruption fails as `InvalidToken`, so callers
    /// can answer "re-authenticate" versus "malformed request".
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;

        match decode::<Claims>(token, &self.decoding_key, &validation) {
            Ok(data) => Ok(data.claims),
            Err(e) => match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => Err(AuthError::ExpiredToken),
                _ => Err(AuthError::InvalidToken),
            },
        }
    }

    /// Pulls the token out of an `Authorization` header value. Accepts only
    /// the two-token `Bearer <token>` form, scheme case-insensitive; anything
    /// else means "no credential presented".
    pub fn extract_bearer(header_value: &str) -> Option<&str> {
        let mut parts = header_value.split_whitespace();
        let scheme = parts.next()?;
        let token = parts.next()?;
        if parts.next().is_some() || !scheme.eq_ignore_ascii_case("bearer") {
            return None;
        }
        Some(token)
    }
}
