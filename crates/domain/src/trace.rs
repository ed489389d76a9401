use serde::Serialize;

/// Structured trace events emitted across all RunAgent crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    AgentServiceCall {
        endpoint: String,
        status: u16,
        duration_ms: u64,
    },
    ThreadOpened {
        thread_id: String,
    },
    RunLaunched {
        thread_id: String,
        run_id: String,
        agent_id: String,
        status: String,
    },
    RunPolled {
        run_id: String,
        status: String,
        sleeps: u32,
        elapsed_ms: u64,
        timed_out: bool,
    },
    TranscriptAssembled {
        thread_id: String,
        messages: usize,
        messages_without_text: usize,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "ra_event");
    }
}
