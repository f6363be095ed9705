use crate::auth::identity::ClientIdentity;
use crate::auth::rate_limit::Decision;
use crate::error::{AppError, AuthError};
use crate::AppState;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, HttpRequest, HttpResponse, HttpResponseBuilder};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub country_code: String,
    pub external_account_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
}

fn apply_quota_headers(builder: &mut HttpResponseBuilder, decision: &Decision) {
    for (name, value) in decision.header_values() {
        builder.insert_header((name, value));
    }
}

fn authorization_header(req: &HttpRequest) -> Option<&str> {
    req.headers().get(AUTHORIZATION).and_then(|h| h.to_str().ok())
}

pub async fn register(
    http_req: HttpRequest,
    req: web::Json<RegisterRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    // Anonymous traffic is throttled by origin before any work happens, so
    // registration spam from one address is bounded.
    let identity = ClientIdentity::from_request(&http_req);
    let decision = state.limiter.check(&identity).await?;

    info!("Received registration request for email: {}", req.email);
    match state
        .auth
        .register(
            &req.email,
            &req.password,
            &req.country_code,
            req.external_account_id.clone(),
        )
        .await
    {
        Ok((token, user)) => {
            info!("Registration successful for email: {}", req.email);
            let mut builder = HttpResponse::Created();
            apply_quota_headers(&mut builder, &decision);
            Ok(builder.json(json!({ "token": token, "user": user })))
        }
        Err(e) => {
            error!("Registration failed for email: {}: {}", req.email, e);
            Err(e)
        }
    }
}

pub async fn login(
    http_req: HttpRequest,
    req: web::Json<LoginRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let identity = ClientIdentity::from_request(&http_req);
    let decision = state.limiter.check(&identity).await?;

    info!("Received login request for email: {}", req.email);
    match state.auth.login(&req.email, &req.password).await {
        Ok((token, _user)) => {
            info!("Login successful for email: {}", req.email);
            let mut builder = HttpResponse::Ok();
            apply_quota_headers(&mut builder, &decision);
            Ok(builder.json(AuthResponse { token }))
        }
        Err(e) => {
            error!("Login failed for email: {}: {}", req.email, e);
            Err(e)
        }
    }
}

/// Returns the verified identity behind the presented bearer token. Once
/// authenticated, throttling is keyed by user rather than by origin, so a
/// shared address neither hides an abusive account nor penalizes its
/// neighbors.
pub async fn me(
    http_req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    // Identity resolution never fails: a request that does not verify is
    // throttled by origin, so an invalid-token flood still consumes a budget.
    // The verification outcome is surfaced only after the admission check.
    let verified = state
        .auth
        .authenticate_header(authorization_header(&http_req))
        .and_then(|claims| {
            let subject = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;
            Ok((subject, claims))
        });

    let identity = match &verified {
        Ok((subject, _)) => ClientIdentity::authenticated(*subject),
        Err(_) => ClientIdentity::from_request(&http_req),
    };
    let decision = state.limiter.check(&identity).await?;

    let (_, claims) = verified?;

    let mut builder = HttpResponse::Ok();
    apply_quota_headers(&mut builder, &decision);
    Ok(builder.json(json!({
        "id": claims.sub,
        "email": claims.email,
        "country_code": claims.country_code,
        "external_account_id": claims.external_account_id,
    })))
}
