//! Inbound request shape and the immutable per-request configuration
//! derived from it.

use std::time::Duration;

use ra_domain::config::{Config, PollingConfig};
use serde::Deserialize;

use super::error::RunAgentError;

/// Input used when the caller sends none.
pub const DEFAULT_INPUT: &str = "Hi";

/// JSON body of `POST /api/run-agent`.  Every field is optional.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunAgentBody {
    #[serde(default)]
    pub input: Option<String>,
    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub poll_interval_ms: Option<u64>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl RunAgentBody {
    /// Parse a raw request body.
    ///
    /// Syntax errors, non-object payloads and mistyped fields are all
    /// validation errors.
    pub fn parse(raw: &[u8]) -> Result<Self, RunAgentError> {
        let value: serde_json::Value = serde_json::from_slice(raw)
            .map_err(|_| RunAgentError::Validation("Invalid JSON body.".into()))?;
        if !value.is_object() {
            return Err(RunAgentError::Validation(
                "Invalid request body: expected a JSON object".into(),
            ));
        }
        serde_json::from_value(value)
            .map_err(|e| RunAgentError::Validation(format!("Invalid request body: {e}")))
    }
}

/// Everything one run needs, fixed for the lifetime of the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub input: String,
    pub agent_id: String,
    pub poll_interval: Duration,
    pub timeout: Duration,
    pub cancel_on_timeout: bool,
}

impl RunRequest {
    /// Fill request defaults from the server configuration.
    pub fn resolve(
        body: RunAgentBody,
        default_agent_id: &str,
        polling: &PollingConfig,
    ) -> Result<Self, RunAgentError> {
        let poll_interval_ms = body.poll_interval_ms.unwrap_or(polling.default_interval_ms);
        let timeout_ms = body.timeout_ms.unwrap_or(polling.default_timeout_ms);

        if poll_interval_ms == 0 {
            return Err(RunAgentError::Validation(
                "pollIntervalMs must be greater than 0".into(),
            ));
        }
        if timeout_ms == 0 {
            return Err(RunAgentError::Validation(
                "timeoutMs must be greater than 0".into(),
            ));
        }

        Ok(Self {
            input: body.input.unwrap_or_else(|| DEFAULT_INPUT.to_owned()),
            agent_id: body.agent_id.unwrap_or_else(|| default_agent_id.to_owned()),
            poll_interval: Duration::from_millis(poll_interval_ms),
            timeout: Duration::from_millis(timeout_ms),
            cancel_on_timeout: polling.cancel_on_timeout,
        })
    }

    pub fn timeout_ms(&self) -> u128 {
        self.timeout.as_millis()
    }
}

/// Check the server configuration a run depends on and return the
/// default agent id.
pub fn require_service_config(config: &Config) -> Result<String, RunAgentError> {
    let svc = &config.agent_service;
    if svc.endpoint.as_deref().map_or(true, str::is_empty) {
        return Err(RunAgentError::Configuration(
            "Server missing agent service endpoint".into(),
        ));
    }
    match svc.default_agent_id.as_deref() {
        Some(id) if !id.is_empty() => Ok(id.to_owned()),
        _ => Err(RunAgentError::Configuration(
            "Server missing default agent id".into(),
        )),
    }
}
