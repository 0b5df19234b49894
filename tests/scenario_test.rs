//! End-to-end scenarios through the `DocaiClient` facade

mod common;

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use docai::conversation::{Role, WELCOME_TURN_ID};
use docai::error::{kind_of, ErrorKind};

use common::{client, session_json};

/// Login, submit URLs, select the new session, ask: the transcript is
/// welcome, question, answer.
#[tokio::test]
async fn test_login_submit_select_ask() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "tok"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/process-urls"))
        .and(body_json(json!({"urls": ["https://www.rust-lang.org/"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "session_id": "url_77",
            "message": "URLs processed successfully"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_json(json!({"query": "What is Rust?", "session_id": "url_77"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answer": "A language.",
            "sources": [{"index": 1, "preview": "Rust is a language"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server.uri(), false);
    client.login("ada", "pw").await.unwrap();
    let id = client
        .submit_urls(&["https://www.rust-lang.org/".to_string()])
        .await
        .unwrap();
    client.select_session(&id).unwrap();
    client.ask(&id, "What is Rust?").await.unwrap();

    let turns = client.transcript(&id);
    assert_eq!(turns.len(), 3);
    assert_eq!(turns[0].id, WELCOME_TURN_ID);
    assert_eq!(turns[1].role, Role::User);
    assert_eq!(turns[1].text, "What is Rust?");
    assert_eq!(turns[2].role, Role::Assistant);
    assert_eq!(turns[2].text, "A language.");
    assert_eq!(turns[2].citations().len(), 1);
}

/// Without a credential, every session operation fails fast with an
/// authentication failure and no request is made.
#[tokio::test]
async fn test_unauthenticated_operations_fail_fast() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client(&server.uri(), false);

    let listing = client.list_sessions().await;
    assert_eq!(
        kind_of(&listing.error.unwrap()),
        Some(ErrorKind::AuthenticationFailure)
    );
    for err in [
        client.submit_urls(&["https://a.com".to_string()]).await.unwrap_err(),
        client.open_session("s").await.unwrap_err(),
        client.summarize("s").await.unwrap_err(),
        client.ask("s", "q").await.unwrap_err(),
        client.whoami().await.unwrap_err(),
    ] {
        assert_eq!(kind_of(&err), Some(ErrorKind::AuthenticationFailure));
    }
}

/// Logout forgets the listing and active session; logging back in starts
/// from a clean slate.
#[tokio::test]
async fn test_logout_resets_state() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/my-sessions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"sessions": [session_json("pdf_1", "pdf", "complete")]})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "again"})))
        .mount(&server)
        .await;

    let client = client(&server.uri(), true);
    client.list_sessions().await;
    client.select_session("pdf_1").unwrap();
    assert_eq!(client.transcript("pdf_1").len(), 1);

    client.logout().unwrap();
    assert!(!client.is_authenticated());
    assert!(client.registry().sessions().is_empty());
    assert!(client.registry().active_id().is_none());
    assert!(client.transcript("pdf_1").is_empty());

    client.login("ada", "pw").await.unwrap();
    let err = client.select_session("pdf_1").unwrap_err();
    assert_eq!(kind_of(&err), Some(ErrorKind::UnknownSession));
}
