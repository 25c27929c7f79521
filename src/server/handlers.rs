// HTTP request handlers

use axum::{
    extract::{OriginalUri, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::signature::{verify_signature, SIGNATURE_HEADER};
use super::CallboxServer;
use crate::access::CallEvent;
use crate::voice::VoiceResponse;

/// Create the main application router
pub fn create_router(server: Arc<CallboxServer>) -> Router {
    let webhook_path = server.config().webhook_path.clone();

    Router::new()
        .route(&webhook_path, post(handle_call))
        .route("/health", get(health_check))
        .with_state(server)
}

/// Handle POST <webhook_path> - provider call webhook
async fn handle_call(
    State(server): State<Arc<CallboxServer>>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    Form(params): Form<BTreeMap<String, String>>,
) -> Result<VoiceResponse, AppError> {
    authenticate_request(&server, &uri, &headers, &params)?;

    let event = CallEvent::from_params(params);
    let routed = server.router().route(&event).await;

    Ok(routed.response)
}

/// Reject webhooks that did not come from our provider account
fn authenticate_request(
    server: &CallboxServer,
    uri: &axum::http::Uri,
    headers: &HeaderMap,
    params: &BTreeMap<String, String>,
) -> Result<(), AppError> {
    let config = server.config();

    if let (Some(expected), Some(received)) =
        (config.provider.account_sid.as_deref(), params.get("AccountSid"))
    {
        if expected != received {
            tracing::warn!(account_sid = %received, "Webhook from unexpected account");
            return Err(AppError::Forbidden("unknown account"));
        }
    }

    let (Some(auth_token), Some(public_url)) =
        (config.provider.auth_token.as_deref(), config.public_url.as_deref())
    else {
        // Signatures are not validated without both values
        return Ok(());
    };

    let path_and_query = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    let url = format!("{}{}", public_url.trim_end_matches('/'), path_and_query);

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or(AppError::Forbidden("missing signature"))?;

    if !verify_signature(auth_token, &url, params, signature) {
        tracing::warn!(url = %url, "Webhook signature mismatch");
        return Err(AppError::Forbidden("invalid signature"));
    }

    Ok(())
}

impl IntoResponse for VoiceResponse {
    fn into_response(self) -> Response {
        ([(header::CONTENT_TYPE, "text/xml")], self.to_xml()).into_response()
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
}

/// Handle GET /health - Health check endpoint
pub async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Application error wrapper for proper HTTP error responses
#[derive(Debug)]
pub enum AppError {
    /// Webhook did not come from the configured provider account
    Forbidden(&'static str),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Forbidden(reason) => (StatusCode::FORBIDDEN, reason).into_response(),
        }
    }
}
