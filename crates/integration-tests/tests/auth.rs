//! Integration tests for signup, login, token refresh and logout.
//!
//! HTTP tests require a migrated database and a running server
//! (cargo run -p kasir-server). Run with: cargo test -- --ignored

use chrono::Utc;
use kasir_core::{AuthSession, Email, UserRole};
use kasir_integration_tests::{TEST_PASSWORD, TestContext, base_url, try_login};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

// ============================================================================
// Library types
// ============================================================================

#[test]
fn test_session_validity_window() {
    let now = Utc::now().timestamp();
    let session = AuthSession {
        access_token: Some("token".to_string()),
        refresh_token: Some("refresh".to_string()),
        expires_at: Some(now + 60),
    };
    assert!(session.is_valid_at(now));
    assert!(!session.is_valid_at(now + 60));

    let no_expiry = AuthSession {
        expires_at: None,
        ..session.clone()
    };
    assert!(!no_expiry.is_valid_at(now));

    let empty_token = AuthSession {
        access_token: Some(String::new()),
        ..session
    };
    assert!(!empty_token.is_valid_at(now));
}

#[test]
fn test_session_json_shape() {
    let session: AuthSession = serde_json::from_value(json!({
        "access_token": "a",
        "refresh_token": "r",
        "expires_at": 1_900_000_000_i64,
    }))
    .unwrap();
    assert_eq!(session.expires_at, Some(1_900_000_000));
}

#[test]
fn test_email_and_role_parsing() {
    assert_eq!(
        Email::parse("  Kasir@Example.com ").unwrap().as_str(),
        "kasir@example.com"
    );
    assert!(Email::parse("not-an-email").is_err());
    assert_eq!("admin".parse::<UserRole>().unwrap(), UserRole::Admin);
    assert!("owner".parse::<UserRole>().is_err());
}

// ============================================================================
// HTTP
// ============================================================================

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_protected_routes_reject_missing_token() {
    let client = Client::new();
    let base_url = base_url();

    for path in ["/api/products", "/api/transactions", "/api/cash", "/api/auth/me"] {
        let resp = client
            .get(format!("{base_url}{path}"))
            .send()
            .await
            .expect("Request failed");
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "GET {path}");
        let body: Value = resp.json().await.unwrap();
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_garbage_token_is_unauthorized() {
    let resp = Client::new()
        .get(format!("{}/api/products", base_url()))
        .bearer_auth("not-a-real-token")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_signup_login_me() {
    let ctx = TestContext::fresh().await;

    let me = ctx.get_json("/api/auth/me").await;
    assert_eq!(me["email"], ctx.email.as_str());
    assert_eq!(me["role"], "cashier");
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_duplicate_signup_conflicts() {
    let ctx = TestContext::fresh().await;

    let resp = ctx
        .client
        .post(ctx.url("/api/auth/signup"))
        .json(&json!({ "email": ctx.email, "password": TEST_PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_short_password_rejected() {
    let resp = Client::new()
        .post(format!("{}/api/auth/signup", base_url()))
        .json(&json!({ "email": "short@kasir.test", "password": "abc" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_wrong_password_is_unauthorized() {
    let ctx = TestContext::fresh().await;

    let resp = try_login(&ctx.client, &ctx.base_url, &ctx.email, "wrong-password-123").await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_refresh_rotates_tokens() {
    let ctx = TestContext::fresh().await;
    // Resolve the access token once so it sits in the server's cache.
    let resp = ctx.get("/api/auth/me").send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = ctx
        .client
        .post(ctx.url("/api/auth/refresh"))
        .json(&json!({ "refresh_token": ctx.refresh_token }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let session: AuthSession = resp.json().await.unwrap();
    assert!(session.is_valid());
    assert_ne!(session.access_token.as_deref(), Some(ctx.access_token.as_str()));

    // The retired access token stops working right away.
    let resp = ctx.get("/api/auth/me").send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // The old refresh token is spent.
    let resp = ctx
        .client
        .post(ctx.url("/api/auth/refresh"))
        .json(&json!({ "refresh_token": ctx.refresh_token }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_logout_revokes_access_token() {
    let ctx = TestContext::fresh().await;

    let resp = ctx.post("/api/auth/logout").send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = ctx.get("/api/auth/me").send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_cashier_cannot_override_cash() {
    let ctx = TestContext::new().await;

    let rows = ctx.get_json("/api/cash").await;
    let Some(id) = rows[0]["id"].as_str() else {
        return;
    };

    let resp = ctx
        .put(&format!("/api/cash/{id}"))
        .json(&json!({ "nominal": "1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
