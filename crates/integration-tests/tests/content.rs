//! Content resolution and translation overrides.

#![allow(clippy::unwrap_used)]

use outpost_integration_tests::{admin_client, client, url};
use reqwest::StatusCode;
use serde_json::{Value, json};

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_builtin_content_resolves_in_both_languages() {
    let client = client();

    for language in ["en", "ar"] {
        let resp = client
            .get(url(&format!("/api/content/hero?language={language}")))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let hero: Value = resp.json().await.unwrap();
        assert!(hero.is_object(), "{language}: {hero}");
    }

    let all: Value = client
        .get(url("/api/content/hero"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(all.get("en").is_some());
    assert!(all.get("ar").is_some());
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_unknown_content_type_and_language() {
    let client = client();

    let resp = client
        .get(url("/api/content/neverConfigured"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = client
        .get(url("/api/content/hero?language=fr"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_translation_override_keeps_other_locale() {
    let Some(admin) = admin_client().await else {
        return;
    };

    let before: Value = admin
        .get(url("/api/admin/translations"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let strings = json!({ "nav": { "home": "Front page" } });
    let resp = admin
        .post(url("/api/translations"))
        .json(&json!({ "language": "en", "translations": strings }))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let after: Value = admin
        .get(url("/api/admin/translations"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(after["en"], strings);
    assert_eq!(after.get("ar"), before.get("ar"));

    let resolved: Value = client()
        .get(url("/api/translations?language=en"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(resolved["nav"]["home"], "Front page");
    // Keys the override does not set still come from the bundle.
    assert!(resolved["store"].is_object());
}
