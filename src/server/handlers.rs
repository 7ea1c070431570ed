// HTTP request handlers

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use super::middleware::access_middleware;
use super::AssistantServer;
use crate::errors::AssistantError;
use crate::export::{render_pdf, to_csv_string, CSV_FILE_NAME, PDF_FILE_NAME};
use crate::locale::Language;
use crate::metrics::METRICS;
use crate::session::{SessionHandle, TableRow};
use crate::templates::TemplateEntry;

/// Build the router: public health/metrics plus the gated `/v1` API
pub fn create_router(server: Arc<AssistantServer>) -> Router {
    let api = Router::new()
        .route("/v1/sessions", post(create_session))
        .route("/v1/sessions/:id", axum::routing::delete(delete_session))
        .route("/v1/sessions/:id/language", put(set_language))
        .route("/v1/sessions/:id/query", post(handle_query))
        .route(
            "/v1/sessions/:id/history",
            get(get_history).delete(clear_history),
        )
        .route("/v1/sessions/:id/history.csv", get(history_csv))
        .route("/v1/sessions/:id/history.pdf", get(history_pdf))
        .route("/v1/templates", get(list_templates))
        .route("/v1/templates/:name", get(download_template))
        .route("/v1/mail", post(send_mail))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&server),
            access_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_endpoint))
        .merge(api)
        .with_state(server)
}

/// Assistant error rendered as `{"error": "..."}` with a matching status
#[derive(Debug)]
pub struct ApiError(pub AssistantError);

impl From<AssistantError> for ApiError {
    fn from(err: AssistantError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AssistantError::InvalidPasscode => StatusCode::UNAUTHORIZED,
            AssistantError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AssistantError::SessionNotFound(_) | AssistantError::TemplateNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            AssistantError::SessionLimit(_) => StatusCode::TOO_MANY_REQUESTS,
            AssistantError::MailNotConfigured | AssistantError::Speech(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AssistantError::MailDelivery(_) => StatusCode::BAD_GATEWAY,
            AssistantError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

fn parse_language(wanted: &str) -> Result<Language, AssistantError> {
    Language::parse(wanted)
        .ok_or_else(|| AssistantError::InvalidRequest(format!("Unknown language '{}'", wanted)))
}

fn parse_json<T: for<'de> Deserialize<'de>>(body: &[u8]) -> Result<T, AssistantError> {
    serde_json::from_slice(body)
        .map_err(|e| AssistantError::InvalidRequest(format!("Invalid request body: {}", e)))
}

fn attachment(content_type: &'static str, file_name: &str, body: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        body,
    )
        .into_response()
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub llm_ready: bool,
}

/// Health check endpoint
pub async fn health_check(State(server): State<Arc<AssistantServer>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        llm_ready: server.app().inference.is_ready().await,
    })
}

/// Prometheus metrics endpoint
pub async fn metrics_endpoint() -> Response {
    match METRICS.render() {
        Ok(text) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to render metrics: {:#}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct CreateSessionRequest {
    language: Option<String>,
}

#[derive(Debug, Serialize)]
struct SessionResponse {
    session_id: String,
    language: &'static str,
}

async fn create_session(
    State(server): State<Arc<AssistantServer>>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<SessionResponse>)> {
    let request: CreateSessionRequest = if body.is_empty() {
        CreateSessionRequest::default()
    } else {
        parse_json(&body)?
    };

    let language = match request.language.as_deref() {
        Some(wanted) => parse_language(wanted)?,
        None => Language::default(),
    };

    let handle = server.session_manager().create(language)?;
    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            session_id: handle.id.clone(),
            language: language.label(),
        }),
    ))
}

async fn delete_session(
    State(server): State<Arc<AssistantServer>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    if server.session_manager().delete(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AssistantError::SessionNotFound(id).into())
    }
}

fn session(server: &AssistantServer, id: &str) -> Result<SessionHandle, AssistantError> {
    server.session_manager().get(id)
}

#[derive(Debug, Deserialize)]
struct LanguageRequest {
    language: String,
}

async fn set_language(
    State(server): State<Arc<AssistantServer>>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<SessionResponse>> {
    let request: LanguageRequest = parse_json(&body)?;
    let language = parse_language(&request.language)?;

    let handle = session(&server, &id)?;
    handle.lock().await.set_language(language);

    Ok(Json(SessionResponse {
        session_id: id,
        language: language.label(),
    }))
}

#[derive(Debug, Deserialize)]
struct QueryRequest {
    query: String,
}

#[derive(Debug, Serialize)]
struct QueryResponse {
    response: String,
    turns: usize,
}

async fn handle_query(
    State(server): State<Arc<AssistantServer>>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<QueryResponse>> {
    let request: QueryRequest = parse_json(&body)?;
    let handle = session(&server, &id)?;

    let mut session = handle.lock().await;
    let response = session.ask(&server.app().policy, &request.query).await;

    Ok(Json(QueryResponse {
        response,
        turns: session.log().len(),
    }))
}

async fn get_history(
    State(server): State<Arc<AssistantServer>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<TableRow>>> {
    let handle = session(&server, &id)?;
    let table = handle.lock().await.log().to_table();
    Ok(Json(table))
}

async fn clear_history(
    State(server): State<Arc<AssistantServer>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let handle = session(&server, &id)?;
    handle.lock().await.clear_history();
    Ok(StatusCode::NO_CONTENT)
}

async fn history_csv(
    State(server): State<Arc<AssistantServer>>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let handle = session(&server, &id)?;
    let csv = to_csv_string(handle.lock().await.log())
        .map_err(|e| AssistantError::Export(format!("{:#}", e)))?;
    Ok(attachment("text/csv", CSV_FILE_NAME, csv.into_bytes()))
}

async fn history_pdf(
    State(server): State<Arc<AssistantServer>>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let handle = session(&server, &id)?;
    let pdf = render_pdf(handle.lock().await.log());
    Ok(attachment("application/pdf", PDF_FILE_NAME, pdf))
}

#[derive(Debug, Serialize)]
struct TemplatesResponse {
    templates: Vec<TemplateEntry>,
    documents: Vec<String>,
}

async fn list_templates(State(server): State<Arc<AssistantServer>>) -> Json<TemplatesResponse> {
    let templates = &server.app().templates;
    Json(TemplatesResponse {
        templates: templates.entries(),
        documents: templates.pdf_documents(),
    })
}

async fn download_template(
    State(server): State<Arc<AssistantServer>>,
    Path(name): Path<String>,
) -> ApiResult<Response> {
    let path = server.app().templates.resolve(&name)?;
    let content = tokio::fs::read(&path).await.map_err(|e| {
        tracing::warn!(path = %path.display(), "failed to read template: {}", e);
        AssistantError::TemplateNotFound(name.clone())
    })?;

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("template.pdf")
        .to_string();
    Ok(attachment("application/pdf", &file_name, content))
}

#[derive(Debug, Deserialize)]
struct MailRequest {
    to: String,
    document: String,
}

async fn send_mail(
    State(server): State<Arc<AssistantServer>>,
    body: Bytes,
) -> ApiResult<Json<serde_json::Value>> {
    let app = server.app();
    if !app.mailer.is_configured() {
        return Err(AssistantError::MailNotConfigured.into());
    }

    let request: MailRequest = parse_json(&body)?;
    let path = app.templates.document_path(&request.document)?;
    app.mailer.send_document(&request.to, &path).await?;

    Ok(Json(json!({ "sent": true, "to": request.to.trim() })))
}
