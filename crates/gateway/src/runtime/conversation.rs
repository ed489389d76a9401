//! Opening the conversation and launching the run.
//!
//! Neither step retries, and neither undoes remote state created by an
//! earlier step when a later one fails.

use ra_agents::{AgentService, Run};
use ra_domain::error::Result;
use ra_domain::trace::TraceEvent;

/// Create a thread and append `input` as its first user message.
/// Returns the thread id.
pub async fn open_conversation(service: &dyn AgentService, input: &str) -> Result<String> {
    let thread = service.create_thread().await?;
    service.create_message(&thread.id, input).await?;

    TraceEvent::ThreadOpened {
        thread_id: thread.id.clone(),
    }
    .emit();

    Ok(thread.id)
}

/// Start an asynchronous run of `agent_id` against the thread.
///
/// The returned run usually reports a non-terminal status, but the
/// poller does not assume so.
pub async fn launch_run(service: &dyn AgentService, thread_id: &str, agent_id: &str) -> Result<Run> {
    let run = service.create_run(thread_id, agent_id).await?;

    TraceEvent::RunLaunched {
        thread_id: thread_id.to_owned(),
        run_id: run.id.clone(),
        agent_id: agent_id.to_owned(),
        status: run.status.to_string(),
    }
    .emit();

    Ok(run)
}
