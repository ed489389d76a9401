//! `ra-agents`: agent execution service client crate for RunAgent.
//!
//! Provides the [`AgentService`] trait that abstracts over the remote
//! thread / message / run API, the [`AgentConnector`] seam that builds a
//! service per request, a production REST implementation
//! ([`RestAgentServiceClient`] behind [`RestConnector`]), and typed DTOs
//! for the wire format.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use ra_domain::config::AgentServiceConfig;
//! use ra_agents::{AgentConnector, RestConnector};
//!
//! # async fn example() -> ra_domain::error::Result<()> {
//! let cfg = AgentServiceConfig {
//!     endpoint: Some("https://agents.example.com/api/projects/demo".into()),
//!     api_key: Some("token".into()),
//!     ..AgentServiceConfig::default()
//! };
//! let service = RestConnector::new(&cfg)?.connect(&cfg)?;
//!
//! let thread = service.create_thread().await?;
//! service.create_message(&thread.id, "Hi").await?;
//! let run = service.create_run(&thread.id, "asst_123").await?;
//! println!("run {} is {}", run.id, run.status);
//! # Ok(())
//! # }
//! ```

pub mod provider;
pub mod rest;
pub mod types;

// ── Re-exports for ergonomic imports ─────────────────────────────────

pub use provider::{AgentConnector, AgentService};
pub use rest::{from_reqwest, resolve_token, RestAgentServiceClient, RestConnector};
pub use types::{
    CreateMessageRequest, CreateRunRequest, MessageContent, MessagePage, Run, RunStatus,
    TextPayload, TextSegment, Thread, ThreadMessage,
};
