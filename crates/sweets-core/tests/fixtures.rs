//! Shared setup for core integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::{Value, json};
use sweets_core::SessionManager;
use sweets_core::SweetsClient;
use sweets_core::api::ApiClient;
use sweets_core::session::{CredentialStore, FileCredentialStore};
use tempfile::TempDir;
use wiremock::MockServer;

pub fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

/// Returns a base URL on a port nothing listens on.
pub fn unreachable_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}/api")
}

/// A session wired to a mock server and a file store in a temp home.
pub struct Harness {
    pub server: MockServer,
    pub session: Arc<SessionManager>,
    pub client: SweetsClient,
    pub store_path: PathBuf,
    _home: TempDir,
}

impl Harness {
    /// Starts a mock server; pre-stores `credential` when given.
    pub async fn start(credential: Option<&str>) -> Self {
        let server = MockServer::start().await;
        let base_url = format!("{}/api", server.uri());
        Self::with_base_url(server, &base_url, credential)
    }

    /// Points the session at `base_url` instead of the mock server.
    pub async fn unreachable(credential: Option<&str>) -> Self {
        let server = MockServer::start().await;
        Self::with_base_url(server, &unreachable_base_url(), credential)
    }

    fn with_base_url(server: MockServer, base_url: &str, credential: Option<&str>) -> Self {
        let home = TempDir::new().expect("create temp sweets home");
        let store_path = home.path().join("credentials.json");
        let store = FileCredentialStore::at(&store_path);
        if let Some(credential) = credential {
            store.save(credential).unwrap();
        }

        let api = ApiClient::new(base_url, Some(std::time::Duration::from_secs(5))).unwrap();
        let session = Arc::new(SessionManager::restore(api, Box::new(store)));
        let client = SweetsClient::new(Arc::clone(&session));

        Self {
            server,
            session,
            client,
            store_path,
            _home: home,
        }
    }

    pub fn stored_credential(&self) -> Option<String> {
        FileCredentialStore::at(&self.store_path).load().unwrap()
    }
}

pub fn sweet_json(id: u64, name: &str, category: &str, price: &str, quantity: u32) -> Value {
    json!({
        "id": id,
        "name": name,
        "category": category,
        "price": price,
        "quantity": quantity,
    })
}
