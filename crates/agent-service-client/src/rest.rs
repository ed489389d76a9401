//! REST implementation of [`AgentService`].
//!
//! `RestAgentServiceClient` wraps a `reqwest::Client` and translates every
//! trait method into one HTTP call against the agent execution service.
//! Calls are attempted exactly once: a failed call is reported to the
//! caller instead of being retried here.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use ra_domain::config::AgentServiceConfig;
use ra_domain::error::{Error, Result};
use ra_domain::trace::TraceEvent;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::provider::{AgentConnector, AgentService};
use crate::types::{
    CreateMessageRequest, CreateRunRequest, MessagePage, Run, Thread, ThreadMessage,
};

const PAGE_LIMIT: &str = "100";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Connector
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Production [`AgentConnector`].
///
/// Holds one pooled `reqwest::Client` for the process; each `connect`
/// resolves the bearer token afresh so a rotated token is picked up
/// without a restart.
#[derive(Debug, Clone)]
pub struct RestConnector {
    http: Client,
}

impl RestConnector {
    pub fn new(cfg: &AgentServiceConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_millis(cfg.request_timeout_ms))
            .user_agent(concat!("runagent/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        Ok(Self { http })
    }
}

impl AgentConnector for RestConnector {
    fn connect(&self, cfg: &AgentServiceConfig) -> Result<Arc<dyn AgentService>> {
        let token = resolve_token(cfg, |key| std::env::var(key).ok())?;
        let client = RestAgentServiceClient::with_client(self.http.clone(), cfg, token)?;
        Ok(Arc::new(client))
    }
}

/// Resolve the bearer token: static `api_key` first, then the variable
/// named by `api_key_env`.
pub fn resolve_token<F>(cfg: &AgentServiceConfig, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = cfg.api_key.as_deref().filter(|k| !k.is_empty()) {
        return Ok(key.to_owned());
    }
    lookup(&cfg.api_key_env)
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| {
            Error::Auth(format!(
                "no agent service credential: set agent_service.api_key or {}",
                cfg.api_key_env
            ))
        })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Client
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A REST-based client for the agent execution service.
#[derive(Debug, Clone)]
pub struct RestAgentServiceClient {
    http: Client,
    base_url: String,
    api_version: String,
    token: String,
}

impl RestAgentServiceClient {
    /// Build a client sharing an existing connection pool.
    pub fn with_client(http: Client, cfg: &AgentServiceConfig, token: String) -> Result<Self> {
        let base_url = cfg
            .endpoint
            .as_deref()
            .filter(|e| !e.is_empty())
            .ok_or_else(|| Error::Config("agent_service.endpoint is not set".into()))?
            .trim_end_matches('/')
            .to_owned();

        Ok(Self {
            http,
            base_url,
            api_version: cfg.api_version.clone(),
            token,
        })
    }

    // ── request helpers ──────────────────────────────────────────────

    /// Add auth, correlation id and `api-version` to a request.
    fn decorate(&self, rb: RequestBuilder) -> RequestBuilder {
        rb.bearer_auth(&self.token)
            .header("x-ms-client-request-id", Uuid::new_v4().to_string())
            .query(&[("api-version", self.api_version.as_str())])
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request once and classify the outcome.
    ///
    /// * 2xx is returned as-is.
    /// * 401/403 become `Error::Auth`; other statuses `Error::AgentService`.
    /// * Emits a `TraceEvent::AgentServiceCall` for every attempt.
    async fn execute(&self, endpoint: &str, rb: RequestBuilder) -> Result<Response> {
        let start = Instant::now();
        let result = self.decorate(rb).send().await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(resp) => {
                let status = resp.status();

                TraceEvent::AgentServiceCall {
                    endpoint: endpoint.to_owned(),
                    status: status.as_u16(),
                    duration_ms,
                }
                .emit();

                if status.is_success() {
                    return Ok(resp);
                }

                let body = resp.text().await.unwrap_or_default();
                if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                    return Err(Error::Auth(format!(
                        "{endpoint} auth failed ({}): {body}",
                        status.as_u16()
                    )));
                }
                Err(Error::AgentService {
                    endpoint: endpoint.to_owned(),
                    status: status.as_u16(),
                    message: body,
                })
            }
            Err(e) => {
                TraceEvent::AgentServiceCall {
                    endpoint: endpoint.to_owned(),
                    status: e.status().map(|s| s.as_u16()).unwrap_or(0),
                    duration_ms,
                }
                .emit();
                Err(from_reqwest(e))
            }
        }
    }
}

async fn read_json<T: DeserializeOwned>(endpoint: &str, resp: Response) -> Result<T> {
    let body = resp.text().await.map_err(from_reqwest)?;
    serde_json::from_str(&body)
        .map_err(|e| Error::Other(format!("failed to parse {endpoint} response: {e}: {body}")))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait]
impl AgentService for RestAgentServiceClient {
    async fn create_thread(&self) -> Result<Thread> {
        const EP: &str = "POST /threads";
        let rb = self.http.post(self.url("/threads")).json(&serde_json::json!({}));
        let resp = self.execute(EP, rb).await?;
        read_json(EP, resp).await
    }

    async fn create_message(&self, thread_id: &str, content: &str) -> Result<ThreadMessage> {
        const EP: &str = "POST /threads/{thread_id}/messages";
        let rb = self
            .http
            .post(self.url(&format!("/threads/{thread_id}/messages")))
            .json(&CreateMessageRequest::user(content));
        let resp = self.execute(EP, rb).await?;
        read_json(EP, resp).await
    }

    async fn create_run(&self, thread_id: &str, agent_id: &str) -> Result<Run> {
        const EP: &str = "POST /threads/{thread_id}/runs";
        let rb = self
            .http
            .post(self.url(&format!("/threads/{thread_id}/runs")))
            .json(&CreateRunRequest {
                assistant_id: agent_id.to_owned(),
            });
        let resp = self.execute(EP, rb).await?;
        read_json(EP, resp).await
    }

    async fn get_run(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        const EP: &str = "GET /threads/{thread_id}/runs/{run_id}";
        let rb = self
            .http
            .get(self.url(&format!("/threads/{thread_id}/runs/{run_id}")));
        let resp = self.execute(EP, rb).await?;
        read_json(EP, resp).await
    }

    async fn cancel_run(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        const EP: &str = "POST /threads/{thread_id}/runs/{run_id}/cancel";
        let rb = self
            .http
            .post(self.url(&format!("/threads/{thread_id}/runs/{run_id}/cancel")));
        let resp = self.execute(EP, rb).await?;
        read_json(EP, resp).await
    }

    async fn list_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>> {
        const EP: &str = "GET /threads/{thread_id}/messages";
        let url = self.url(&format!("/threads/{thread_id}/messages"));

        let mut messages = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let mut rb = self
                .http
                .get(&url)
                .query(&[("order", "asc"), ("limit", PAGE_LIMIT)]);
            if let Some(cursor) = after.as_deref() {
                rb = rb.query(&[("after", cursor)]);
            }

            let resp = self.execute(EP, rb).await?;
            let page: MessagePage = read_json(EP, resp).await?;
            let fetched = page.data.len();
            messages.extend(page.data);

            // A cursor that does not advance would loop forever.
            match page.last_id {
                Some(last) if page.has_more && fetched > 0 && after.as_deref() != Some(last.as_str()) => {
                    after = Some(last);
                }
                _ => break,
            }
        }

        Ok(messages)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Error conversion helper
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Convert a `reqwest::Error` into a domain `Error`.
///
/// Timeout errors become `Error::Timeout`; everything else becomes
/// `Error::Http`.
pub fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}
