//! Request-to-completion orchestration.
//!
//! One request runs four steps in strict order, each awaited before the
//! next:
//!
//! 1. [`conversation::open_conversation`] creates a thread holding the input.
//! 2. [`conversation::launch_run`] starts the agent against it.
//! 3. [`poller::poll_run`] waits for a terminal status or the deadline.
//! 4. [`transcript::assemble`] lists the thread and builds the response.
//!
//! Nothing is retried.  A deadline is not a failure: the response carries
//! the last observed status and a warning.

pub mod clock;
pub mod conversation;
pub mod error;
pub mod poller;
pub mod request;
pub mod transcript;

pub use clock::{Clock, SystemClock};
pub use error::RunAgentError;
pub use poller::{next_step, poll_run, PollOutcome, PollReport, PollStep};
pub use request::{require_service_config, RunAgentBody, RunRequest, DEFAULT_INPUT};
pub use transcript::{extract_text, RunAgentResponse, RunSummary, TranscriptMessage};

use ra_agents::AgentService;
use tracing::Instrument;

use crate::state::AppState;

/// Run the full orchestration against an already-connected service.
pub async fn run_agent(
    service: &dyn AgentService,
    clock: &dyn Clock,
    request: &RunRequest,
) -> Result<RunAgentResponse, RunAgentError> {
    let thread_id = conversation::open_conversation(service, &request.input).await?;
    let span = tracing::info_span!("run", thread_id = %thread_id, agent_id = %request.agent_id);

    async {
        let run = conversation::launch_run(service, &thread_id, &request.agent_id).await?;

        let report = poll_run(
            service,
            clock,
            &thread_id,
            run,
            request.poll_interval,
            request.timeout,
        )
        .await?;

        if report.outcome.timed_out() {
            let run = report.outcome.run();
            tracing::warn!(
                run_id = %run.id,
                status = %run.status,
                timeout_ms = request.timeout_ms() as u64,
                "run still in flight at deadline"
            );
            if request.cancel_on_timeout {
                cancel_best_effort(service, &thread_id, &run.id).await;
            }
        }

        let response =
            transcript::assemble(service, &thread_id, report.outcome, request.timeout_ms()).await?;
        Ok::<_, RunAgentError>(response)
    }
    .instrument(span)
    .await
}

/// Ask the service to stop a run that outlived the deadline.  Failures
/// are logged and otherwise ignored.
async fn cancel_best_effort(service: &dyn AgentService, thread_id: &str, run_id: &str) {
    match service.cancel_run(thread_id, run_id).await {
        Ok(run) => tracing::info!(run_id, status = %run.status, "cancel requested"),
        Err(e) => tracing::warn!(run_id, error = %e, "cancel after timeout failed"),
    }
}

/// Resolve `body`, connect to the agent service and run the
/// orchestration.
///
/// Callers check [`require_service_config`] first, so a configuration
/// error is reported before the body is looked at.
pub async fn execute(
    state: &AppState,
    body: RunAgentBody,
    default_agent_id: &str,
) -> Result<RunAgentResponse, RunAgentError> {
    let request = RunRequest::resolve(body, default_agent_id, &state.config.polling)?;

    let service = state
        .connector
        .connect(&state.config.agent_service)
        .map_err(RunAgentError::Initialization)?;

    tracing::info!(
        agent_id = %request.agent_id,
        poll_interval_ms = request.poll_interval.as_millis() as u64,
        timeout_ms = request.timeout_ms() as u64,
        "starting agent run"
    );

    run_agent(service.as_ref(), state.clock.as_ref(), &request).await
}
