//! Integration tests for Outpost.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database, run migrations and start the server
//! cargo run -p outpost-cli -- migrate
//! cargo run -p outpost-web
//!
//! # Run the tests that need a live server
//! cargo test -p outpost-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `OUTPOST_TEST_BASE_URL` - server under test (default `http://localhost:3000`)
//! - `OUTPOST_TEST_ADMIN_EMAIL` / `OUTPOST_TEST_ADMIN_PASSWORD` - an account
//!   already promoted with `outpost-cli user promote`; admin tests are
//!   skipped when unset
//!
//! Tests that do not need a server (domain rules across crates) run with a
//! plain `cargo test`.

use reqwest::{Client, StatusCode, redirect};
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL of the server under test.
#[must_use]
pub fn base_url() -> String {
    std::env::var("OUTPOST_TEST_BASE_URL")
        .unwrap_or_else(|_| "http://localhost:3000".to_owned())
        .trim_end_matches('/')
        .to_owned()
}

/// Absolute URL for `path`.
#[must_use]
pub fn url(path: &str) -> String {
    format!("{}{path}", base_url())
}

/// A client with a cookie jar that does not follow redirects.
///
/// # Panics
///
/// Panics if the HTTP client cannot be built.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// Register a fresh account and return its signed-in client and email.
///
/// # Panics
///
/// Panics if registration does not return 201.
pub async fn registered_client() -> (Client, String) {
    let client = client();
    let suffix = Uuid::new_v4().simple().to_string();
    let email = format!("player-{suffix}@example.com");
    let resp = client
        .post(url("/api/auth/register"))
        .json(&json!({
            "email": email,
            "username": format!("player{}", &suffix[..8]),
            "password": "correct horse battery staple",
        }))
        .send()
        .await
        .expect("register request failed");
    assert_eq!(resp.status(), StatusCode::CREATED, "registration failed");
    (client, email)
}

/// A client signed in as the configured admin, or `None` when no admin
/// credentials are configured.
///
/// # Panics
///
/// Panics if the configured credentials are rejected.
pub async fn admin_client() -> Option<Client> {
    let email = std::env::var("OUTPOST_TEST_ADMIN_EMAIL").ok()?;
    let password = std::env::var("OUTPOST_TEST_ADMIN_PASSWORD").ok()?;

    let client = client();
    let resp = client
        .post(url("/api/auth/login"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("login request failed");
    assert_eq!(resp.status(), StatusCode::OK, "admin login failed");

    let me: Value = client
        .get(url("/api/auth/me"))
        .send()
        .await
        .expect("me request failed")
        .json()
        .await
        .expect("me response is not JSON");
    assert_eq!(me["user"]["role"], "admin", "test account is not an admin");

    Some(client)
}
