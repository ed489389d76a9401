//! Data Transfer Objects for the agent execution service REST API.
//!
//! The service speaks the assistants-style wire format: snake_case field
//! names, threads holding messages, and runs that execute an agent
//! (`assistant_id`) against a thread.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Threads
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// POST /threads: response body (only the fields we read).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Messages
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// POST /threads/{thread_id}/messages: request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMessageRequest {
    pub role: String,
    pub content: String,
}

impl CreateMessageRequest {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

/// A single message (turn) in a thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadMessage {
    pub id: String,
    pub role: String,
    /// Raw structured content, in service order.  Items that are not
    /// typed objects are dropped; `null` reads as empty.
    #[serde(default, deserialize_with = "lenient_list")]
    pub content: Vec<MessageContent>,
    /// Pre-parsed text segments, when the service (or a proxy in front of
    /// it) exposes them.  Absent on the plain REST API.
    #[serde(
        default,
        deserialize_with = "lenient_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub text_messages: Vec<TextSegment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
}

/// Read a JSON array item by item, skipping entries that do not match `T`.
/// Anything other than an array (including `null`) yields an empty list.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Array(items) => items,
        _ => return Ok(Vec::new()),
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

/// One item of a message's `content` array.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text {
        #[serde(default)]
        text: Option<TextPayload>,
    },
    /// Image files, tool invocations and anything else without text.
    #[serde(other)]
    Other,
}

/// The `text` field of a text content item.
///
/// The service nests the string one level (`{"value": "...",
/// "annotations": [...]}`); some producers send the bare string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextPayload {
    Annotated { value: String },
    Plain(String),
    Unrecognized(serde_json::Value),
}

impl TextPayload {
    /// The display string, if the payload carries one.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            TextPayload::Annotated { value } => Some(value),
            TextPayload::Plain(s) => Some(s),
            TextPayload::Unrecognized(_) => None,
        }
    }
}

/// One entry of the `text_messages` convenience list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextSegment {
    pub text: TextPayload,
}

/// GET /threads/{thread_id}/messages: one page of results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagePage {
    pub data: Vec<ThreadMessage>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub last_id: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Runs
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// POST /threads/{thread_id}/runs: request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRunRequest {
    pub assistant_id: String,
}

/// A run of an agent against a thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    pub status: RunStatus,
    #[serde(default)]
    pub last_error: Option<serde_json::Value>,
}

/// Run lifecycle status.
///
/// Unknown values are preserved verbatim and treated as non-terminal, so a
/// status added by the service keeps the poller waiting instead of failing
/// the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Expired,
    Incomplete,
    Unknown(String),
}

impl RunStatus {
    /// `completed`, `failed`, `cancelled` and `expired` are final.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Failed | Self::Cancelled | Self::Expired
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Queued => "queued",
            Self::InProgress => "in_progress",
            Self::RequiresAction => "requires_action",
            Self::Cancelling => "cancelling",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
            Self::Completed => "completed",
            Self::Expired => "expired",
            Self::Incomplete => "incomplete",
            Self::Unknown(s) => s,
        }
    }
}

impl From<String> for RunStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "queued" => Self::Queued,
            "in_progress" => Self::InProgress,
            "requires_action" => Self::RequiresAction,
            "cancelling" => Self::Cancelling,
            "cancelled" => Self::Cancelled,
            "failed" => Self::Failed,
            "completed" => Self::Completed,
            "expired" => Self::Expired,
            "incomplete" => Self::Incomplete,
            _ => Self::Unknown(s),
        }
    }
}

impl From<RunStatus> for String {
    fn from(status: RunStatus) -> Self {
        match status {
            RunStatus::Unknown(s) => s,
            other => other.as_str().to_owned(),
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn terminal_set_is_exactly_four_statuses() {
        let terminal: Vec<_> = [
            "queued",
            "in_progress",
            "requires_action",
            "cancelling",
            "cancelled",
            "failed",
            "completed",
            "expired",
            "incomplete",
        ]
        .into_iter()
        .map(|s| RunStatus::from(s.to_owned()))
        .filter(RunStatus::is_terminal)
        .map(|s| s.to_string())
        .collect();
        assert_eq!(terminal, vec!["cancelled", "failed", "completed", "expired"]);
    }

    #[test]
    fn unknown_status_is_preserved_and_non_terminal() {
        let run: Run = serde_json::from_value(json!({
            "id": "run_1",
            "status": "paused_for_review",
        }))
        .unwrap();
        assert_eq!(run.status, RunStatus::Unknown("paused_for_review".into()));
        assert!(!run.status.is_terminal());
        assert_eq!(serde_json::to_value(&run.status).unwrap(), "paused_for_review");
        assert!(run.last_error.is_none());
    }

    #[test]
    fn run_carries_structured_last_error() {
        let run: Run = serde_json::from_value(json!({
            "id": "run_2",
            "thread_id": "thread_1",
            "status": "failed",
            "last_error": { "code": "rate_limit_exceeded", "message": "slow down" },
        }))
        .unwrap();
        assert_eq!(run.status, RunStatus::Failed);
        assert_eq!(run.last_error.unwrap()["code"], "rate_limit_exceeded");
    }

    #[test]
    fn message_content_variants_deserialize() {
        let msg: ThreadMessage = serde_json::from_value(json!({
            "id": "msg_1",
            "role": "assistant",
            "content": [
                { "type": "image_file", "image_file": { "file_id": "f_1" } },
                { "type": "text", "text": { "value": "hello", "annotations": [] } },
                { "type": "text", "text": "plain" },
                { "type": "text" },
            ],
        }))
        .unwrap();
        assert!(matches!(msg.content[0], MessageContent::Other));
        match &msg.content[1] {
            MessageContent::Text { text: Some(p) } => assert_eq!(p.as_text(), Some("hello")),
            other => panic!("unexpected {other:?}"),
        }
        match &msg.content[2] {
            MessageContent::Text { text: Some(p) } => assert_eq!(p.as_text(), Some("plain")),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(msg.content[3], MessageContent::Text { text: None }));
        assert!(msg.text_messages.is_empty());
    }

    #[test]
    fn malformed_content_items_are_skipped() {
        let msg: ThreadMessage = serde_json::from_value(json!({
            "id": "msg_1",
            "role": "assistant",
            "content": [
                { "tool_call": {} },
                "stray string",
                42,
                { "type": "text", "text": { "value": "kept" } },
            ],
            "text_messages": [{ "no_text": true }],
        }))
        .unwrap();
        assert_eq!(msg.content.len(), 1);
        assert!(matches!(msg.content[0], MessageContent::Text { text: Some(_) }));
        assert!(msg.text_messages.is_empty());
    }

    #[test]
    fn null_or_scalar_content_reads_as_empty() {
        for content in [json!(null), json!("just text"), json!({ "type": "text" })] {
            let msg: ThreadMessage = serde_json::from_value(json!({
                "id": "msg_1",
                "role": "assistant",
                "content": content.clone(),
                "text_messages": null,
            }))
            .unwrap();
            assert!(msg.content.is_empty(), "{content}");
            assert!(msg.text_messages.is_empty());
        }
    }

    #[test]
    fn message_page_defaults_pagination_fields() {
        let page: MessagePage = serde_json::from_value(json!({ "data": [] })).unwrap();
        assert!(!page.has_more);
        assert!(page.last_id.is_none());
    }
}
