// HTTP API tests, driven in-process with tower::ServiceExt::oneshot()

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use legal_assistant::config::{Config, MailConfig};
use legal_assistant::locale::Language;
use legal_assistant::mail::{Envelope, MailTransport, Mailer};
use legal_assistant::server::{create_router, AssistantServer};
use legal_assistant::session::SessionManager;
use legal_assistant::AppContext;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt; // provides .oneshot()

const UNREACHABLE: &str = "http://127.0.0.1:1";

#[derive(Default)]
struct RecordingTransport {
    sent: Mutex<Vec<String>>,
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn deliver(&self, envelope: &Envelope, _message: &[u8]) -> Result<()> {
        let mut sent = self.sent.lock().unwrap();
        sent.extend(envelope.to().iter().map(|a| a.to_string()));
        Ok(())
    }
}

fn test_config(host: &str, templates: &Path) -> Config {
    let mut config = Config::default();
    config.inference.host = host.to_string();
    config.templates.dir = templates.to_path_buf();
    config
}

fn router_for(config: Config) -> Router {
    let server_config = config.server.clone();
    let app = Arc::new(AppContext::new(config).unwrap());
    create_router(Arc::new(AssistantServer::new(app, server_config)))
}

fn templates_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("nda_template.pdf"), b"%PDF-1.4 nda").unwrap();
    dir
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> axum::response::Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("failed to build request");

    router.clone().oneshot(request).await.expect("oneshot failed")
}

async fn body_bytes(resp: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(resp.into_body(), 4 * 1024 * 1024)
        .await
        .expect("failed to read body")
        .to_vec()
}

async fn body_json(resp: axum::response::Response) -> Value {
    serde_json::from_slice(&body_bytes(resp).await).expect("response body is not valid JSON")
}

async fn new_session(router: &Router) -> String {
    let resp = send(router, "POST", "/v1/sessions", None).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    body_json(resp).await["session_id"]
        .as_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_session_manager() {
    let manager = SessionManager::new(10, 30);

    // Create a session
    let session1 = manager.create(Language::English).unwrap();
    assert_eq!(manager.active_count(), 1);

    // Retrieve the same session
    let session2 = manager.get(&session1.id).unwrap();
    assert_eq!(session1.id, session2.id);
    assert_eq!(manager.active_count(), 1);

    // Create a new session
    let session3 = manager.create(Language::Hindi).unwrap();
    assert_ne!(session1.id, session3.id);
    assert_eq!(manager.active_count(), 2);

    // Delete a session
    assert!(manager.delete(&session1.id));
    assert!(!manager.delete(&session1.id));
    assert!(manager.get(&session1.id).is_err());
    assert_eq!(manager.active_count(), 1);
}

#[tokio::test]
async fn test_health_reports_llm_readiness() {
    let mut llm = mockito::Server::new_async().await;
    llm.mock("GET", "/api/tags")
        .with_status(200)
        .with_body(r#"{"models":[]}"#)
        .create_async()
        .await;
    let dir = templates_dir();

    let router = router_for(test_config(&llm.url(), dir.path()));
    let resp = send(&router, "GET", "/health", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!({"status": "ok", "llm_ready": true}));

    let router = router_for(test_config(UNREACHABLE, dir.path()));
    let resp = send(&router, "GET", "/health", None).await;
    assert_eq!(body_json(resp).await["llm_ready"], false);
}

#[tokio::test]
async fn test_query_history_and_exports() {
    let mut llm = mockito::Server::new_async().await;
    llm.mock("POST", "/api/chat")
        .with_status(200)
        .with_body(r#"{"message":{"content":"A lease transfers the right to use property."}}"#)
        .expect(1)
        .create_async()
        .await;
    let dir = templates_dir();
    let router = router_for(test_config(&llm.url(), dir.path()));
    let id = new_session(&router).await;

    let resp = send(
        &router,
        "POST",
        &format!("/v1/sessions/{}/query", id),
        Some(json!({"query": "What is a lease?"})),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["response"], "A lease transfers the right to use property.");
    assert_eq!(body["turns"], 1);

    let resp = send(
        &router,
        "POST",
        &format!("/v1/sessions/{}/query", id),
        Some(json!({"query": "Hi"})),
    )
    .await;
    let body = body_json(resp).await;
    assert_eq!(
        body["response"],
        "Sorry, I couldn't find a matching response for your query."
    );
    assert_eq!(body["turns"], 2);

    let resp = send(&router, "GET", &format!("/v1/sessions/{}/history", id), None).await;
    let rows = body_json(resp).await;
    assert_eq!(rows.as_array().unwrap().len(), 2);
    assert_eq!(rows[0]["user_query"], "What is a lease?");
    assert_eq!(rows[1]["user_query"], "Hi");

    let resp = send(&router, "GET", &format!("/v1/sessions/{}/history.csv", id), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "text/csv");
    assert!(resp.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains("interaction_history.csv"));
    let csv = String::from_utf8(body_bytes(resp).await).unwrap();
    assert!(csv.starts_with("user_query,assistant_response\n"));
    assert_eq!(csv.lines().count(), 3);

    let resp = send(&router, "GET", &format!("/v1/sessions/{}/history.pdf", id), None).await;
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/pdf");
    assert!(body_bytes(resp).await.starts_with(b"%PDF-1.4"));

    let resp = send(&router, "DELETE", &format!("/v1/sessions/{}/history", id), None).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let resp = send(&router, "GET", &format!("/v1/sessions/{}/history", id), None).await;
    assert_eq!(body_json(resp).await, json!([]));
}

#[tokio::test]
async fn test_language_selection() {
    let dir = templates_dir();
    let router = router_for(test_config(UNREACHABLE, dir.path()));

    let resp = send(&router, "POST", "/v1/sessions", Some(json!({"language": "ta"}))).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["language"], "Tamil - தமிழ்");
    let id = body["session_id"].as_str().unwrap().to_string();

    let resp = send(
        &router,
        "PUT",
        &format!("/v1/sessions/{}/language", id),
        Some(json!({"language": "Kannada"})),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = send(
        &router,
        "POST",
        &format!("/v1/sessions/{}/query", id),
        Some(json!({"query": "ok"})),
    )
    .await;
    assert_eq!(
        body_json(resp).await["response"],
        "ಕ್ಷಮಿಸಿ, ನಿಮ್ಮ ಪ್ರಶ್ನೆಗೆ ಹೊಂದುವ ಉತ್ತರವನ್ನು ನಾನು ಕಂಡುಹಿಡಿಯಲಿಲ್ಲ."
    );

    let resp = send(&router, "POST", "/v1/sessions", Some(json!({"language": "Klingon"}))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_and_deleted_sessions() {
    let dir = templates_dir();
    let router = router_for(test_config(UNREACHABLE, dir.path()));

    let resp = send(&router, "GET", "/v1/sessions/nope/history", None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(body_json(resp).await["error"].as_str().unwrap().contains("nope"));

    let id = new_session(&router).await;
    let resp = send(&router, "DELETE", &format!("/v1/sessions/{}", id), None).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = send(
        &router,
        "POST",
        &format!("/v1/sessions/{}/query", id),
        Some(json!({"query": "What is a will?"})),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_query_body() {
    let dir = templates_dir();
    let router = router_for(test_config(UNREACHABLE, dir.path()));
    let id = new_session(&router).await;

    let resp = send(
        &router,
        "POST",
        &format!("/v1/sessions/{}/query", id),
        Some(json!({"question": "wrong field"})),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_passcode_gate() {
    let dir = templates_dir();
    let mut config = test_config(UNREACHABLE, dir.path());
    config.access.admin_passcode = Some("letmein".to_string());
    let router = router_for(config);

    let resp = send(&router, "POST", "/v1/sessions", None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .method("POST")
        .uri("/v1/sessions")
        .header("x-access-passcode", "wrong")
        .body(Body::empty())
        .unwrap();
    let resp = router.clone().oneshot(request).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(resp).await["error"], "Incorrect passcode");

    let request = Request::builder()
        .method("POST")
        .uri("/v1/sessions")
        .header("x-access-passcode", "letmein")
        .body(Body::empty())
        .unwrap();
    let resp = router.clone().oneshot(request).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    // Health stays public
    let resp = send(&router, "GET", "/health", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_templates_listing_and_download() {
    let dir = templates_dir();
    let router = router_for(test_config(UNREACHABLE, dir.path()));

    let resp = send(&router, "GET", "/v1/templates", None).await;
    let body = body_json(resp).await;
    let templates = body["templates"].as_array().unwrap();
    assert_eq!(templates.len(), 9);
    let nda = templates
        .iter()
        .find(|t| t["name"] == "Non-Disclosure Agreement")
        .unwrap();
    assert_eq!(nda["available"], true);
    assert_eq!(body["documents"], json!(["nda_template.pdf"]));

    let resp = send(&router, "GET", "/v1/templates/Non-Disclosure%20Agreement", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(body_bytes(resp).await, b"%PDF-1.4 nda");

    let resp = send(&router, "GET", "/v1/templates/Rental%20Agreement", None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(resp).await["error"],
        "Template 'Rental Agreement' is not available."
    );
}

#[tokio::test]
async fn test_mail_requires_configuration() {
    let dir = templates_dir();
    let router = router_for(test_config(UNREACHABLE, dir.path()));

    let resp = send(
        &router,
        "POST",
        "/v1/mail",
        Some(json!({"to": "user@example.com", "document": "nda_template.pdf"})),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        body_json(resp).await["error"],
        "Email not configured. Set SMTP_USERNAME and SMTP_PASSWORD."
    );
}

#[tokio::test]
async fn test_mail_sends_template_document() {
    let dir = templates_dir();
    let mut config = test_config(UNREACHABLE, dir.path());
    config.mail = MailConfig {
        username: Some("clerk@example.com".to_string()),
        password: Some("secret".to_string()),
        ..MailConfig::default()
    };

    let transport = Arc::new(RecordingTransport::default());
    let server_config = config.server.clone();
    let mailer = Mailer::with_transport(config.mail.clone(), transport.clone());
    let app = Arc::new(AppContext::new(config).unwrap().with_mailer(mailer));
    let router = create_router(Arc::new(AssistantServer::new(app, server_config)));

    let resp = send(
        &router,
        "POST",
        "/v1/mail",
        Some(json!({"to": "user@example.com", "document": "nda_template.pdf"})),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(*transport.sent.lock().unwrap(), vec!["user@example.com"]);

    let resp = send(
        &router,
        "POST",
        "/v1/mail",
        Some(json!({"to": "user@example.com", "document": "../secret.pdf"})),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Extra headers smuggled through the recipient never reach the transport
    let resp = send(
        &router,
        "POST",
        "/v1/mail",
        Some(json!({
            "to": "victim@example.com\r\nBcc: attacker@evil.test",
            "document": "nda_template.pdf"
        })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(*transport.sent.lock().unwrap(), vec!["user@example.com"]);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let dir = templates_dir();
    let router = router_for(test_config(UNREACHABLE, dir.path()));
    let id = new_session(&router).await;
    send(
        &router,
        "POST",
        &format!("/v1/sessions/{}/query", id),
        Some(json!({"query": "?"})),
    )
    .await;

    let resp = send(&router, "GET", "/metrics", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let text = String::from_utf8(body_bytes(resp).await).unwrap();
    assert!(text.contains("legal_assistant_queries_total{outcome=\"rejected\"}"));
}
