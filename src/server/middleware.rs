// Middleware for the passcode gate

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::handlers::ApiError;
use super::AssistantServer;
use crate::access::PASSCODE_HEADER;
use crate::errors::AssistantError;

/// Reject requests without the right `x-access-passcode` header.
///
/// A no-op when no passcode is configured.
pub async fn access_middleware(
    State(server): State<Arc<AssistantServer>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let gate = &server.app().access;
    if !gate.is_gated() {
        return Ok(next.run(request).await);
    }

    let entered = request
        .headers()
        .get(PASSCODE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(AssistantError::InvalidPasscode)?;

    gate.check(entered)?;
    Ok(next.run(request).await)
}
