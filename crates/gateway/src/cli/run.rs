//! `runagent run`: one-shot execution command.
//!
//! Runs the same orchestration as `POST /api/run-agent` in-process and
//! prints the response JSON to stdout.  Useful for scripting and for
//! checking credentials against a real agent service.

use std::sync::Arc;

use ra_domain::config::Config;

use crate::bootstrap;
use crate::runtime::{self, require_service_config, RunAgentBody};

/// Execute a single run and print the response.
///
/// Failures go to stderr and exit with code 1.  A poll timeout is not a
/// failure: the response is printed and the warning repeated on stderr.
pub async fn run(
    config: Arc<Config>,
    input: String,
    agent: Option<String>,
    poll_interval_ms: Option<u64>,
    timeout_ms: Option<u64>,
) -> anyhow::Result<()> {
    let state = bootstrap::build_app_state(config)?;

    let body = RunAgentBody {
        input: Some(input),
        agent_id: agent,
        poll_interval_ms,
        timeout_ms,
    };

    let result = match require_service_config(&state.config) {
        Ok(default_agent_id) => runtime::execute(&state, body, &default_agent_id).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(resp) => {
            let json = serde_json::to_string_pretty(&resp)
                .map_err(|e| anyhow::anyhow!("serializing response: {e}"))?;
            println!("{json}");
            if let Some(warning) = &resp.warning {
                eprintln!("warning: {warning}");
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("error: {e}");
            if let Some(details) = e.details() {
                eprintln!("  {details}");
            }
            std::process::exit(1);
        }
    }
}
