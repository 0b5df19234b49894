//! SummaryCache integration tests
//!
//! At most one summarize request per session, shared by concurrent callers,
//! with failures leaving no entry behind.

mod common;

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use docai::error::{kind_of, ErrorKind};

use common::{client, mount_load_session};

/// Concurrent callers share one request and receive identical summaries.
#[tokio::test]
async fn test_concurrent_generate_issues_one_request() {
    let server = MockServer::start().await;
    mount_load_session(&server, "pdf_1").await;
    Mock::given(method("POST"))
        .and(path("/summarize-pdf"))
        .and(body_json(json!({"session_id": "pdf_1"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"summary": "A short summary."}))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server.uri(), true);
    client.open_session("pdf_1").await.unwrap();

    let (a, b, c) = tokio::join!(
        client.summarize("pdf_1"),
        client.summarize("pdf_1"),
        client.summarize("pdf_1")
    );
    let a = a.unwrap();
    assert_eq!(a, b.unwrap());
    assert_eq!(a, c.unwrap());
    assert_eq!(a.text, "A short summary.");
    assert_eq!(a.session_id, "pdf_1");
}

/// Once cached, later calls make no request.
#[tokio::test]
async fn test_cached_summary_returned_without_request() {
    let server = MockServer::start().await;
    mount_load_session(&server, "pdf_1").await;
    Mock::given(method("POST"))
        .and(path("/summarize-pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"summary": "Once."})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server.uri(), true);
    client.open_session("pdf_1").await.unwrap();
    assert!(client.summaries().summary_for("pdf_1").is_none());

    client.summarize("pdf_1").await.unwrap();
    let again = client.summarize("pdf_1").await.unwrap();
    assert_eq!(again.text, "Once.");
    assert_eq!(client.summaries().summary_for("pdf_1"), Some(again));
}

/// Failure is shared by every waiter and leaves the cache empty, so a later
/// call tries again.
#[tokio::test]
async fn test_failure_leaves_no_entry() {
    let server = MockServer::start().await;
    mount_load_session(&server, "pdf_1").await;
    Mock::given(method("POST"))
        .and(path("/summarize-pdf"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({"detail": "summarizer crashed"}))
                .set_delay(Duration::from_millis(100)),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/summarize-pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"summary": "Recovered."})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server.uri(), true);
    client.open_session("pdf_1").await.unwrap();

    let (a, b) = tokio::join!(client.summarize("pdf_1"), client.summarize("pdf_1"));
    let (a, b) = (a.unwrap_err(), b.unwrap_err());
    assert_eq!(a.to_string(), "summarizer crashed");
    assert_eq!(b.to_string(), "summarizer crashed");
    assert_eq!(kind_of(&a), Some(ErrorKind::ServerError));
    assert!(client.summaries().summary_for("pdf_1").is_none());

    let summary = client.summarize("pdf_1").await.unwrap();
    assert_eq!(summary.text, "Recovered.");
}

/// Logout invalidates cached summaries.
#[tokio::test]
async fn test_logout_clears_summaries() {
    let server = MockServer::start().await;
    mount_load_session(&server, "pdf_1").await;
    Mock::given(method("POST"))
        .and(path("/summarize-pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"summary": "S"})))
        .mount(&server)
        .await;

    let client = client(&server.uri(), true);
    client.open_session("pdf_1").await.unwrap();
    client.summarize("pdf_1").await.unwrap();
    client.logout().unwrap();

    assert!(client.summaries().summary_for("pdf_1").is_none());
    let err = client.summarize("pdf_1").await.unwrap_err();
    assert_eq!(kind_of(&err), Some(ErrorKind::AuthenticationFailure));
}

/// A failed refresh empties the listing but the active session can still be
/// summarized and re-selected.
#[tokio::test]
async fn test_active_session_survives_failed_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/my-sessions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"sessions": [common::session_json("pdf_1", "pdf", "complete")]})),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/my-sessions"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"detail": "down"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/summarize-pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"summary": "Still here."})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server.uri(), true);
    client.list_sessions().await;
    client.select_session("pdf_1").unwrap();

    let refresh = client.list_sessions().await;
    assert!(refresh.error.is_some());
    assert!(client.registry().sessions().is_empty());
    assert_eq!(client.registry().active_id().as_deref(), Some("pdf_1"));

    let summary = client.summarize("pdf_1").await.unwrap();
    assert_eq!(summary.text, "Still here.");
    client.select_session("pdf_1").unwrap();
}
