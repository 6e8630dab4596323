//! Smoke test against an already running profile server.
//!
//! These tests require:
//! - The server running (cargo run -p heartline-server)
//! - A user with id `HEARTLINE_TEST_USER` (default `alice`) created via
//!   `heartline-cli user create`
//!
//! Run with: cargo test -p heartline-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

fn base_url() -> String {
    std::env::var("HEARTLINE_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

fn test_user() -> String {
    std::env::var("HEARTLINE_TEST_USER").unwrap_or_else(|_| "alice".to_string())
}

#[tokio::test]
#[ignore = "Requires running server and a seeded user"]
async fn test_live_profile_roundtrip() {
    let client = Client::new();
    let base_url = base_url();
    let user = test_user();

    let resp = client
        .get(format!("{base_url}/health/ready"))
        .send()
        .await
        .expect("Failed to reach server");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .put(format!("{base_url}/api/profile/{user}/social/twitter"))
        .json(&json!({"username": "live_check", "isVerified": false}))
        .send()
        .await
        .expect("Failed to upsert handle");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = client
        .get(format!("{base_url}/api/profile/{user}"))
        .send()
        .await
        .expect("Failed to get profile")
        .json()
        .await
        .expect("Failed to parse profile");

    assert_eq!(body["success"], true);
    let handles = body["data"]["socialHandles"].as_array().expect("handles array");
    assert!(
        handles
            .iter()
            .any(|h| h["platform"] == "twitter" && h["username"] == "live_check")
    );
}
