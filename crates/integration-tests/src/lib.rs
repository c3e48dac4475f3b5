//! Integration tests for Kasir.
//!
//! # Running Tests
//!
//! ```bash
//! kasir migrate
//! kasir cash init --nominal 0
//! cargo run -p kasir-server &
//! cargo test -p kasir-integration-tests -- --ignored
//! ```
//!
//! HTTP tests are `#[ignore]`d by default because they need a running
//! server and database. `KASIR_TEST_BASE_URL` points them at the server
//! (default `http://localhost:3000`). Tests in one binary share a cashier
//! account; auth tests that end sessions use their own.
//!
//! Tests that assert cash movements hold [`CASH_LOCK`] so they do not
//! interleave with each other inside one test binary.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::str::FromStr;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use tokio::sync::OnceCell;
use uuid::Uuid;

/// Serializes tests that read and then assert the cash balance.
pub static CASH_LOCK: tokio::sync::Mutex<()> = tokio::sync::Mutex::const_new(());

/// Password used for every account the tests create.
pub const TEST_PASSWORD: &str = "kasir-test-password";

/// Login is rate limited per client IP; retry this many times on 429.
const LOGIN_ATTEMPTS: usize = 10;

/// Signed-in cashier shared by the tests of one binary.
static SHARED: OnceCell<(String, String, String)> = OnceCell::const_new();

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("KASIR_TEST_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Parse a decimal serialized as a JSON string or number.
#[must_use]
pub fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).unwrap(),
        other => Decimal::from_str(&other.to_string()).unwrap(),
    }
}

/// A client logged in as a freshly created cashier.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
    pub email: String,
    pub access_token: String,
    pub refresh_token: String,
}

impl TestContext {
    /// Context for the cashier shared by this test binary.
    pub async fn new() -> Self {
        let (email, access_token, refresh_token) = SHARED
            .get_or_init(|| async {
                let ctx = Self::fresh().await;
                (ctx.email, ctx.access_token, ctx.refresh_token)
            })
            .await
            .clone();

        Self {
            client: Client::new(),
            base_url: base_url(),
            email,
            access_token,
            refresh_token,
        }
    }

    /// Sign up a unique cashier and log in.
    pub async fn fresh() -> Self {
        let client = Client::new();
        let base_url = base_url();
        let email = format!("cashier-{}@kasir.test", Uuid::new_v4().simple());

        let resp = client
            .post(format!("{base_url}/api/auth/signup"))
            .json(&json!({ "email": email, "password": TEST_PASSWORD }))
            .send()
            .await
            .expect("Failed to sign up");
        assert_eq!(resp.status(), StatusCode::CREATED);

        let session = login(&client, &base_url, &email, TEST_PASSWORD).await;

        Self {
            client,
            base_url,
            email,
            access_token: session["access_token"].as_str().unwrap().to_string(),
            refresh_token: session["refresh_token"].as_str().unwrap().to_string(),
        }
    }

    /// Full URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    #[must_use]
    pub fn get(&self, path: &str) -> RequestBuilder {
        self.client
            .get(self.url(path))
            .bearer_auth(&self.access_token)
    }

    #[must_use]
    pub fn post(&self, path: &str) -> RequestBuilder {
        self.client
            .post(self.url(path))
            .bearer_auth(&self.access_token)
    }

    #[must_use]
    pub fn put(&self, path: &str) -> RequestBuilder {
        self.client
            .put(self.url(path))
            .bearer_auth(&self.access_token)
    }

    #[must_use]
    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.client
            .delete(self.url(path))
            .bearer_auth(&self.access_token)
    }

    /// GET `path` and return the JSON body, asserting 200.
    pub async fn get_json(&self, path: &str) -> Value {
        let resp = self.get(path).send().await.expect("Request failed");
        assert_eq!(resp.status(), StatusCode::OK, "GET {path}");
        resp.json().await.expect("Invalid JSON")
    }

    /// Current balance of the first cash row.
    pub async fn cash_nominal(&self) -> Decimal {
        let rows = self.get_json("/api/cash").await;
        let first = rows
            .as_array()
            .and_then(|rows| rows.first())
            .expect("No cash row; run `kasir cash init` first");
        decimal(&first["nominal"])
    }

    /// Create a product and return its JSON.
    pub async fn create_product(&self, name: &str, price: &str, in_stock: i32) -> Value {
        let resp = self
            .post("/api/products")
            .json(&json!({
                "name": name,
                "category": "food",
                "price": price,
                "in_stock": in_stock,
            }))
            .send()
            .await
            .expect("Failed to create product");
        assert_eq!(resp.status(), StatusCode::CREATED);
        resp.json().await.expect("Invalid JSON")
    }

    /// Number of elements in the array returned by `path`.
    pub async fn count(&self, path: &str) -> usize {
        self.get_json(path).await.as_array().map_or(0, Vec::len)
    }
}

/// POST credentials to the login endpoint, waiting out the rate limiter.
pub async fn try_login(
    client: &Client,
    base_url: &str,
    email: &str,
    password: &str,
) -> reqwest::Response {
    for _ in 0..LOGIN_ATTEMPTS {
        let resp = client
            .post(format!("{base_url}/api/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to log in");
        if resp.status() != StatusCode::TOO_MANY_REQUESTS {
            return resp;
        }
        let wait = resp
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(6);
        tokio::time::sleep(Duration::from_secs(wait)).await;
    }
    panic!("login still rate limited after {LOGIN_ATTEMPTS} attempts");
}

/// Log in and return the session JSON, asserting success.
pub async fn login(client: &Client, base_url: &str, email: &str, password: &str) -> Value {
    let resp = try_login(client, base_url, email, password).await;
    assert_eq!(resp.status(), StatusCode::OK);
    resp.json().await.expect("Invalid JSON")
}

/// Unique product name for a test.
#[must_use]
pub fn unique_name(prefix: &str) -> String {
    format!("{prefix} {}", Uuid::new_v4().simple())
}
