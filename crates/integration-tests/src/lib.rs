//! Integration tests for Heartline.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process scenarios (no database needed)
//! cargo test -p heartline-integration-tests
//!
//! # Including the live-server test
//! HEARTLINE_BASE_URL=http://localhost:3000 cargo test -p heartline-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `profile_api` - HTTP contract of the profile API
//! - `profile_session` - Client draft store against a real server
//! - `live_server` - Smoke test against an already running server

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

use heartline_client::{ClientConfig, FileStorage, HttpGateway, ProfileSession};
use heartline_core::UserId;
use heartline_server::config::ServerConfig;
use heartline_server::db::{MemoryProfileRepository, ProfileRepository};
use heartline_server::routes;
use heartline_server::state::AppState;

/// A profile server running in-process on a random local port.
pub struct TestServer {
    pub addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server backed by in-memory storage seeded with `users` (id, name).
    pub async fn spawn(users: &[(&str, &str)]) -> Self {
        let repo = Arc::new(MemoryProfileRepository::new());
        for (id, name) in users {
            let id = UserId::parse(id).expect("valid user id");
            repo.create_user(&id, name, None)
                .await
                .expect("Failed to seed user");
        }

        let app = routes::app(AppState::new(ServerConfig::in_memory(), repo));
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local address");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server failed");
        });

        Self { addr, handle }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        client_config(self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A listener that accepts connections and never answers.
pub struct StalledServer {
    pub addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl StalledServer {
    pub async fn spawn() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stalled listener");
        let addr = listener.local_addr().expect("Failed to read local address");

        let handle = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        Self { addr, handle }
    }

    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        client_config(self.addr).with_request_timeout(Duration::from_millis(300))
    }
}

impl Drop for StalledServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn client_config(addr: SocketAddr) -> ClientConfig {
    let api_url = Url::parse(&format!("http://{addr}")).expect("valid server url");
    ClientConfig::new(api_url).with_data_dir(unique_data_dir())
}

/// A fresh directory under the system temp dir for file-backed stores.
#[must_use]
pub fn unique_data_dir() -> PathBuf {
    std::env::temp_dir().join(format!("heartline-it-{}", uuid::Uuid::new_v4()))
}

/// A session for `user_id` using HTTP and file storage from `config`.
#[must_use]
pub fn session(config: &ClientConfig, user_id: &str) -> ProfileSession {
    ProfileSession::new(
        UserId::parse(user_id).expect("valid user id"),
        Arc::new(HttpGateway::new(config)),
        Arc::new(FileStorage::new(&config.data_dir)),
    )
}
