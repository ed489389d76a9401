//! Transcript assembly: list the thread and package it with the run.

use ra_agents::{AgentService, MessageContent, Run, TextPayload, ThreadMessage};
use ra_domain::error::Result;
use ra_domain::trace::TraceEvent;
use serde::Serialize;

use super::poller::PollOutcome;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Response shape
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunAgentResponse {
    pub thread_id: String,
    pub run: RunSummary,
    pub messages: Vec<TranscriptMessage>,
    /// Present only when polling hit the deadline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub id: String,
    pub status: String,
    pub last_error: Option<serde_json::Value>,
}

impl From<Run> for RunSummary {
    fn from(run: Run) -> Self {
        Self {
            id: run.id,
            status: run.status.to_string(),
            last_error: run.last_error,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TranscriptMessage {
    pub id: String,
    pub role: String,
    pub text: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Text extraction
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Where a message's display text comes from.
#[derive(Debug)]
enum TurnText<'a> {
    /// Last entry of the pre-parsed `text_messages` list.
    PreResolved(&'a TextPayload),
    /// First `text` item of the raw content.
    Structured(&'a TextPayload),
    Absent,
}

impl<'a> TurnText<'a> {
    fn of(msg: &'a ThreadMessage) -> Self {
        if let Some(segment) = msg.text_messages.last() {
            return TurnText::PreResolved(&segment.text);
        }
        msg.content
            .iter()
            .find_map(|item| match item {
                MessageContent::Text { text: Some(payload) } => Some(TurnText::Structured(payload)),
                MessageContent::Text { text: None } | MessageContent::Other => None,
            })
            .unwrap_or(TurnText::Absent)
    }

    fn into_text(self) -> Option<String> {
        match self {
            TurnText::PreResolved(payload) | TurnText::Structured(payload) => {
                payload.as_text().map(str::to_owned)
            }
            TurnText::Absent => None,
        }
    }
}

/// Display text of a message, or `None` for turns without text
/// (tool calls, images).
pub fn extract_text(msg: &ThreadMessage) -> Option<String> {
    TurnText::of(msg).into_text()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Assembly
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Warning attached to a response whose run was still in flight.
pub fn timeout_warning(timeout_ms: u128, status: &str) -> String {
    format!("Timed out after {timeout_ms} ms; last known status={status}")
}

/// Fetch the whole thread (oldest first) and build the response.
///
/// Runs for both poll outcomes.  A listing failure is returned as an
/// error and no partial transcript is produced.
pub async fn assemble(
    service: &dyn AgentService,
    thread_id: &str,
    outcome: PollOutcome,
    timeout_ms: u128,
) -> Result<RunAgentResponse> {
    let listed = service.list_messages(thread_id).await?;

    let messages: Vec<TranscriptMessage> = listed
        .into_iter()
        .map(|msg| TranscriptMessage {
            text: extract_text(&msg),
            id: msg.id,
            role: msg.role,
        })
        .collect();

    TraceEvent::TranscriptAssembled {
        thread_id: thread_id.to_owned(),
        messages: messages.len(),
        messages_without_text: messages.iter().filter(|m| m.text.is_none()).count(),
    }
    .emit();

    let timed_out = outcome.timed_out();
    let run = RunSummary::from(outcome.into_run());
    let warning = timed_out.then(|| timeout_warning(timeout_ms, &run.status));

    Ok(RunAgentResponse {
        thread_id: thread_id.to_owned(),
        run,
        messages,
        warning,
    })
}
