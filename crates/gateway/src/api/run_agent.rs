//! Run-agent endpoint.
//!
//! - `POST    /api/run-agent` runs an agent to completion (or deadline)
//! - `OPTIONS /api/run-agent` answered by the CORS layer, never routed here
//! - `GET     /healthz`       liveness probe

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

use crate::runtime::{self, require_service_config, RunAgentBody, RunAgentError};
use crate::state::AppState;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /api/run-agent
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Takes the raw body so that missing server configuration is reported
/// before the body is parsed.
pub async fn run_agent(State(state): State<AppState>, body: Bytes) -> Response {
    let default_agent_id = match require_service_config(&state.config) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };

    let body = match RunAgentBody::parse(&body) {
        Ok(b) => b,
        Err(e) => return e.into_response(),
    };

    match runtime::execute(&state, body, &default_agent_id).await {
        Ok(resp) => {
            tracing::info!(
                thread_id = %resp.thread_id,
                run_id = %resp.run.id,
                status = %resp.run.status,
                messages = resp.messages.len(),
                timed_out = resp.warning.is_some(),
                "run-agent request complete"
            );
            Json(resp).into_response()
        }
        Err(e) => e.into_response(),
    }
}

impl IntoResponse for RunAgentError {
    fn into_response(self) -> Response {
        let status = if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let mut body = serde_json::json!({ "error": self.to_string() });
        match self.details() {
            Some(details) => {
                tracing::error!(error = %self, details = %details, "run-agent request failed");
                body["details"] = serde_json::Value::String(details);
            }
            None if self.is_client_error() => {
                tracing::warn!(error = %self, "rejected run-agent request");
            }
            None => tracing::error!(error = %self, "run-agent request failed"),
        }

        (status, Json(body)).into_response()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET /healthz
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn healthz() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
