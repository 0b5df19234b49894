use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use docai::api::ApiClient;
use docai::auth::{AuthSession, Credential, MemoryCredentialStore};
use docai::config::Config;
use docai::DocaiClient;

/// Token every authenticated helper starts with.
#[allow(dead_code)]
pub const TEST_TOKEN: &str = "test-token";

/// An `ApiClient` against `base_url` holding [`TEST_TOKEN`].
#[allow(dead_code)]
pub fn authed_api(base_url: &str) -> ApiClient {
    let store = MemoryCredentialStore::with_credential(Credential::bearer(TEST_TOKEN));
    ApiClient::new(base_url, AuthSession::new(Arc::new(store)), None)
        .expect("failed to build api client")
}

/// An `ApiClient` against `base_url` with no credential.
#[allow(dead_code)]
pub fn anonymous_api(base_url: &str) -> ApiClient {
    ApiClient::new(
        base_url,
        AuthSession::new(Arc::new(MemoryCredentialStore::new())),
        None,
    )
    .expect("failed to build api client")
}

/// A `DocaiClient` against `base_url`, optionally already logged in.
#[allow(dead_code)]
pub fn client(base_url: &str, authenticated: bool) -> DocaiClient {
    let mut config = Config::default();
    config.server.base_url = base_url.to_string();
    let store = if authenticated {
        MemoryCredentialStore::with_credential(Credential::bearer(TEST_TOKEN))
    } else {
        MemoryCredentialStore::new()
    };
    DocaiClient::with_store(&config, Arc::new(store)).expect("failed to build client")
}

/// One `/my-sessions` entry.
#[allow(dead_code)]
pub fn session_json(id: &str, kind: &str, status: &str) -> Value {
    json!({
        "session_id": id,
        "created_at": "2024-05-01T10:00:00",
        "title": format!("Title of {}", id),
        "type": kind,
        "status": status
    })
}

/// Mounts `GET /load-session/{id}` answering success.
#[allow(dead_code)]
pub async fn mount_load_session(server: &MockServer, id: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/load-session/{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Session loaded",
            "session_id": id
        })))
        .mount(server)
        .await;
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("docai.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}
