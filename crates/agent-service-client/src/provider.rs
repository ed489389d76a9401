//! The `AgentService` trait defines the interface for all agent execution
//! backends (REST, mock/test), and `AgentConnector` builds one per request.

use std::sync::Arc;

use async_trait::async_trait;
use ra_domain::config::AgentServiceConfig;
use ra_domain::error::Result;

use crate::types::{Run, Thread, ThreadMessage};

/// Abstraction over the agent execution service API surface.
///
/// Every method is a single remote call (or, for `list_messages`, a
/// sequence of page fetches); none of them retry.
#[async_trait]
pub trait AgentService: Send + Sync {
    /// Open a new, empty thread (POST /threads).
    async fn create_thread(&self) -> Result<Thread>;

    /// Append a user message to a thread (POST /threads/{id}/messages).
    async fn create_message(&self, thread_id: &str, content: &str) -> Result<ThreadMessage>;

    /// Start an asynchronous run of `agent_id` (POST /threads/{id}/runs).
    async fn create_run(&self, thread_id: &str, agent_id: &str) -> Result<Run>;

    /// Fetch the current state of a run (GET /threads/{id}/runs/{run_id}).
    async fn get_run(&self, thread_id: &str, run_id: &str) -> Result<Run>;

    /// Request cancellation of a run (POST /threads/{id}/runs/{run_id}/cancel).
    async fn cancel_run(&self, thread_id: &str, run_id: &str) -> Result<Run>;

    /// All messages of a thread, oldest first, across every page.
    async fn list_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>>;
}

/// Builds an [`AgentService`] for one request.
///
/// Credential resolution happens here, so a failure surfaces as an
/// initialization error before any remote call is made.
pub trait AgentConnector: Send + Sync {
    fn connect(&self, cfg: &AgentServiceConfig) -> Result<Arc<dyn AgentService>>;
}
