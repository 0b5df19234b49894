//! SessionIngestion integration tests
//!
//! Local validation must reject bad input before any request leaves the
//! client; accepted submissions announce the new session to subscribers.

mod common;

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use docai::error::{kind_of, ErrorKind};
use docai::sessions::ingestion::PDF_MEDIA_TYPE;
use docai::sessions::{events, PdfUpload, ProcessingState, SessionEvent, SessionIngestion, SourceKind};

use common::{anonymous_api, authed_api, mount_load_session};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn ingestion(base_url: &str) -> SessionIngestion {
    SessionIngestion::new(authed_api(base_url), events::channel().0)
}

fn urls(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("https://example.com/page/{}", i)).collect()
}

/// Any request reaching this mock is a failure.
async fn forbid_all_requests(server: &MockServer) {
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(server)
        .await;
}

// ---------------------------------------------------------------------------
// URL submissions
// ---------------------------------------------------------------------------

/// Zero URLs is invalid and never reaches the network.
#[tokio::test]
async fn test_zero_urls_rejected_without_request() {
    let server = MockServer::start().await;
    forbid_all_requests(&server).await;

    let err = ingestion(&server.uri()).submit_urls(&[]).await.unwrap_err();
    assert_eq!(kind_of(&err), Some(ErrorKind::InvalidInput));
}

/// Six URLs is one too many.
#[tokio::test]
async fn test_six_urls_rejected_without_request() {
    let server = MockServer::start().await;
    forbid_all_requests(&server).await;

    let err = ingestion(&server.uri())
        .submit_urls(&urls(6))
        .await
        .unwrap_err();
    assert_eq!(kind_of(&err), Some(ErrorKind::InvalidInput));
}

/// Malformed URLs are rejected before any request.
#[tokio::test]
async fn test_malformed_url_rejected_without_request() {
    let server = MockServer::start().await;
    forbid_all_requests(&server).await;

    let mut input = urls(2);
    input.push("example.com/no-scheme".to_string());
    let err = ingestion(&server.uri())
        .submit_urls(&input)
        .await
        .unwrap_err();
    assert_eq!(kind_of(&err), Some(ErrorKind::InvalidInput));
    assert!(err.to_string().contains("example.com/no-scheme"));
}

/// Five URLs go out in exactly one request, in input order, and the new id
/// is announced.
#[tokio::test]
async fn test_five_urls_submitted_once_in_order() {
    let server = MockServer::start().await;
    let input = urls(5);
    Mock::given(method("POST"))
        .and(path("/process-urls"))
        .and(body_json(json!({ "urls": input })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "session_id": "url_1",
            "message": "URLs processed successfully"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ingestion = ingestion(&server.uri());
    let mut rx = ingestion.subscribe();
    let id = ingestion.submit_urls(&input).await.unwrap();

    assert_eq!(id, "url_1");
    assert_eq!(
        rx.try_recv().unwrap(),
        SessionEvent::Created {
            id: "url_1".into(),
            source: SourceKind::Url
        }
    );
}

/// Server failures surface unchanged and announce nothing.
#[tokio::test]
async fn test_server_failure_announces_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/process-urls"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"detail": "Error processing URLs"})),
        )
        .mount(&server)
        .await;

    let ingestion = ingestion(&server.uri());
    let mut rx = ingestion.subscribe();
    let err = ingestion.submit_urls(&urls(1)).await.unwrap_err();

    assert_eq!(err.to_string(), "Error processing URLs");
    assert_eq!(kind_of(&err), Some(ErrorKind::ServerError));
    assert!(rx.try_recv().is_err());
}

// ---------------------------------------------------------------------------
// PDF submissions
// ---------------------------------------------------------------------------

/// A non-PDF media type never calls `/process-pdf`.
#[tokio::test]
async fn test_non_pdf_rejected_without_request() {
    let server = MockServer::start().await;
    forbid_all_requests(&server).await;

    let upload = PdfUpload::new(b"hello".to_vec(), "notes.txt", "text/plain");
    let err = ingestion(&server.uri()).submit_pdf(upload).await.unwrap_err();
    assert_eq!(kind_of(&err), Some(ErrorKind::InvalidInput));
}

/// Validation runs before the credential check.
#[tokio::test]
async fn test_invalid_input_reported_before_missing_credential() {
    let server = MockServer::start().await;
    let ingestion = SessionIngestion::new(anonymous_api(&server.uri()), events::channel().0);

    let err = ingestion.submit_urls(&[]).await.unwrap_err();
    assert_eq!(kind_of(&err), Some(ErrorKind::InvalidInput));

    let err = ingestion.submit_urls(&urls(1)).await.unwrap_err();
    assert_eq!(kind_of(&err), Some(ErrorKind::AuthenticationFailure));
}

/// A valid PDF is uploaded and announced as a PDF session.
#[tokio::test]
async fn test_pdf_upload_announces_created_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/process-pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "session_id": "pdf_5",
            "message": "PDF processed successfully"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ingestion = ingestion(&server.uri());
    let mut rx = ingestion.subscribe();
    let upload = PdfUpload::new(b"%PDF-1.7".to_vec(), "a.pdf", PDF_MEDIA_TYPE);
    let id = ingestion.submit_pdf(upload).await.unwrap();

    assert_eq!(id, "pdf_5");
    assert_eq!(rx.try_recv().unwrap().session_id(), "pdf_5");
}

// ---------------------------------------------------------------------------
// Resume and status
// ---------------------------------------------------------------------------

/// Resuming validates server-side and announces the id.
#[tokio::test]
async fn test_resume_announces_session() {
    let server = MockServer::start().await;
    mount_load_session(&server, "pdf_3").await;

    let ingestion = ingestion(&server.uri());
    let mut rx = ingestion.subscribe();
    assert_eq!(ingestion.resume("pdf_3").await.unwrap(), "pdf_3");
    assert_eq!(
        rx.try_recv().unwrap(),
        SessionEvent::Resumed { id: "pdf_3".into() }
    );
}

/// Only `complete` counts as ready.
#[tokio::test]
async fn test_processing_status_mapping() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status/a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "complete"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/status/b"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "not_loaded"})))
        .mount(&server)
        .await;

    let ingestion = ingestion(&server.uri());
    assert_eq!(
        ingestion.processing_status("a").await.unwrap(),
        ProcessingState::Ready
    );
    assert_eq!(
        ingestion.processing_status("b").await.unwrap(),
        ProcessingState::Pending
    );
}
