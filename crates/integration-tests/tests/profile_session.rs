//! Client draft store driven against an in-process profile server.

use heartline_client::{ClientError, Mode};
use heartline_core::{Gender, Trait, TraitCategory};

use heartline_integration_tests::{StalledServer, TestServer, session};

#[tokio::test]
async fn test_edit_save_and_reload() {
    let server = TestServer::spawn(&[("alice", "Alice")]).await;
    let config = server.client_config();

    let mut profile = session(&config, "alice");
    profile.load().await.expect("load");
    assert_eq!(profile.committed().name, "Alice");

    profile.begin_edit();
    profile.set_name("Alice W").expect("editing");
    profile.set_age("28").expect("valid age");
    profile.set_gender(Some(Gender::Female)).expect("editing");
    profile.set_handle_username("Twitter", "alice_w").expect("editing");
    profile
        .toggle_selected_trait(Trait::new("🎨", "Painting", TraitCategory::Creativity))
        .expect("editing");

    let result = profile.save().await.expect("save");
    assert_eq!(profile.mode(), Mode::Viewing);
    let outcomes: Vec<_> = result
        .handles
        .iter()
        .map(|h| (h.platform.as_str(), h.outcome))
        .collect();
    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[1].0, "twitter");

    // A second session on a fresh data dir sees only server state.
    let other = server.client_config();
    let mut reloaded = session(&other, "alice");
    let committed = reloaded.load().await.expect("load").clone();
    assert_eq!(committed.name, "Alice W");
    assert_eq!(committed.age.map(|a| a.years()), Some(28));
    assert_eq!(committed.gender, Some(Gender::Female));
    assert!(committed.selected_traits.contains("Painting"));
    assert_eq!(committed.handle("twitter").expect("twitter row").username, "alice_w");
}

#[tokio::test]
async fn test_verify_then_cancel_keeps_verification() {
    let server = TestServer::spawn(&[("alice", "Alice")]).await;
    let config = server.client_config();

    let mut profile = session(&config, "alice");
    profile.load().await.expect("load");

    profile.begin_edit();
    profile.set_handle_username("Telegram", "alice_t").expect("editing");
    profile.mark_verified("Telegram").await.expect("auto-save");

    profile.begin_edit();
    profile.set_name("Discarded").expect("editing");
    profile.cancel();

    let mut reloaded = session(&server.client_config(), "alice");
    let committed = reloaded.load().await.expect("load");
    let telegram = committed.handle("Telegram").expect("telegram row");
    assert!(telegram.is_verified());
    assert_eq!(committed.name, "Alice");
}

#[tokio::test]
async fn test_rename_keeps_pending_verification() {
    let server = TestServer::spawn(&[("alice", "Alice")]).await;
    let http = reqwest::Client::new();

    let resp = http
        .put(server.url("/api/profile/alice/social/twitter"))
        .json(&serde_json::json!({"username": "alice_w", "verification": "pending"}))
        .send()
        .await
        .expect("Failed to upsert handle");
    assert!(resp.status().is_success());

    let mut profile = session(&server.client_config(), "alice");
    profile.load().await.expect("load");
    profile.begin_edit();
    profile.set_name("Alice W").expect("editing");
    profile.save().await.expect("save");

    let body: serde_json::Value = http
        .get(server.url("/api/profile/alice"))
        .send()
        .await
        .expect("Failed to get profile")
        .json()
        .await
        .expect("Failed to parse profile");
    assert_eq!(body["data"]["user"]["name"], "Alice W");
    assert_eq!(body["data"]["socialHandles"][0]["verification"], "pending");
    assert_eq!(body["data"]["socialHandles"][0]["isVerified"], false);
}

#[tokio::test]
async fn test_unknown_user_load_fails_with_not_found() {
    let server = TestServer::spawn(&[]).await;
    let mut profile = session(&server.client_config(), "nobody");

    let err = profile.load().await.expect_err("unknown user");
    assert!(err.is_not_found());
    assert_eq!(profile.last_error(), Some("User not found"));
}

#[tokio::test]
async fn test_save_timeout_keeps_draft() {
    let server = TestServer::spawn(&[("alice", "Alice")]).await;
    let config = server.client_config();
    let mut profile = session(&config, "alice");
    profile.load().await.expect("load");

    // Same local stores, but a server that never answers.
    let stalled = StalledServer::spawn().await;
    let stalled_config = stalled.client_config().with_data_dir(&config.data_dir);
    let mut profile = session(&stalled_config, "alice");
    assert!(matches!(profile.load().await, Err(ClientError::Timeout)));
    assert_eq!(profile.committed().name, "Alice");

    profile.begin_edit();
    profile.set_name("Alice W").expect("editing");

    let err = profile.save().await.expect_err("stalled server");
    assert!(matches!(err, ClientError::Timeout));
    assert_eq!(profile.mode(), Mode::Editing);
    assert_eq!(profile.draft().expect("draft kept").name, "Alice W");
    assert_eq!(profile.committed().name, "Alice");
}

#[tokio::test]
async fn test_logout_deletes_local_files() {
    let server = TestServer::spawn(&[("alice", "Alice")]).await;
    let config = server.client_config();

    let mut profile = session(&config, "alice");
    profile.load().await.expect("load");
    assert!(config.data_dir.join("profile-storage.json").exists());
    assert!(config.data_dir.join("social-handles-storage.json").exists());

    profile.logout().await.expect("logout");
    assert!(!config.data_dir.join("profile-storage.json").exists());
    assert!(!config.data_dir.join("social-handles-storage.json").exists());

    tokio::fs::remove_dir_all(&config.data_dir)
        .await
        .expect("cleanup");
}
