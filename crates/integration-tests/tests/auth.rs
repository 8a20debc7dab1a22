//! Account flows and the role guard.

#![allow(clippy::unwrap_used)]

use outpost_integration_tests::{client, registered_client, url};
use reqwest::StatusCode;
use serde_json::{Value, json};

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_register_me_logout() {
    let (client, email) = registered_client().await;

    let me: Value = client
        .get(url("/api/auth/me"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me["user"]["email"], email.as_str());
    assert_eq!(me["user"]["role"], "user");

    let resp = client.post(url("/api/auth/logout")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = client.get(url("/api/auth/me")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_wrong_password_is_rejected() {
    let (_, email) = registered_client().await;

    let resp = client()
        .post(url("/api/auth/login"))
        .json(&json!({ "email": email, "password": "definitely wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_role_guard_on_api_routes() {
    let resp = client().get(url("/api/orders")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let (client, _) = registered_client().await;
    let resp = client.get(url("/api/admin/users")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = client.get(url("/api/orders")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_admin_page_redirects_with_flash() {
    let anonymous = client();
    let resp = anonymous.get(url("/admin")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()["location"], "/login");

    let flash: Value = anonymous
        .get(url("/api/flash"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(flash["flash"]["message"], "Please sign in to continue.");

    let (user, _) = registered_client().await;
    let resp = user.get(url("/admin/users")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()["location"], "/");

    let resp = user.get(url("/orders")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
