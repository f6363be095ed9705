mod common;

use actix_web::{test, web, App};
use payrail_server::auth::handlers::{login, me, register};
use serde_json::json;

macro_rules! test_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .route("/auth/register", web::post().to(register))
                .route("/auth/login", web::post().to(login))
                .route("/auth/me", web::get().to(me)),
        )
        .await
    };
}

#[actix_web::test]
async fn test_register_login_scenario() {
    let app = test_app!(common::test_state(100));

    // Register
    let resp = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({
            "email": "user@x.com",
            "password": "Secret123",
            "country_code": "ES"
        }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 201);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body.get("token").is_some());
    assert_eq!(body["user"]["email"], "user@x.com");
    assert_eq!(body["user"]["country_code"], "ES");
    // The stored hash never leaves the server
    assert!(body["user"].get("password_hash").is_none());

    // Register again with the same email
    let resp = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({
            "email": "user@x.com",
            "password": "Secret123",
            "country_code": "ES"
        }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 400);

    // Login with the wrong password
    let resp = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "email": "user@x.com", "password": "Secret124" }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 401);

    // Login with an unknown email
    let resp = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "email": "nobody@x.com", "password": "Secret123" }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 404);

    // Login correctly
    let resp = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "email": "user@x.com", "password": "Secret123" }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    let token = body["token"].as_str().unwrap().to_string();

    // The token verifies back to the registered identity
    let resp = test::TestRequest::get()
        .uri("/auth/me")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["email"], "user@x.com");
    assert_eq!(body["country_code"], "ES");
}

#[actix_web::test]
async fn test_register_rejects_weak_passwords() {
    let app = test_app!(common::test_state(100));

    for password in ["Passw1", "password1", "PASSWORD"] {
        let resp = test::TestRequest::post()
            .uri("/auth/register")
            .set_json(json!({
                "email": "weak@x.com",
                "password": password,
                "country_code": "ES"
            }))
            .send_request(&app)
            .await;
        assert_eq!(resp.status(), 400, "password {password:?} should be rejected");
    }
}

#[actix_web::test]
async fn test_register_keeps_external_account_id() {
    let app = test_app!(common::test_state(100));

    let resp = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({
            "email": "wallet@x.com",
            "password": "Secret123",
            "country_code": "DE",
            "external_account_id": "0xabc123"
        }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 201);
    let body: serde_json::Value = test::read_body_json(resp).await;
    let token = body["token"].as_str().unwrap().to_string();

    let resp = test::TestRequest::get()
        .uri("/auth/me")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["external_account_id"], "0xabc123");
}

#[actix_web::test]
async fn test_me_without_credential_is_unauthorized() {
    let app = test_app!(common::test_state(100));

    let resp = test::TestRequest::get()
        .uri("/auth/me")
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 401);

    // Wrong scheme is "no credential presented", not a broken token
    let resp = test::TestRequest::get()
        .uri("/auth/me")
        .insert_header(("Authorization", "Basic dXNlcjpwdw=="))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn test_me_with_corrupt_token_is_bad_request() {
    let app = test_app!(common::test_state(100));

    let resp = test::TestRequest::get()
        .uri("/auth/me")
        .insert_header(("Authorization", "Bearer not.a.token"))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 400);
}
