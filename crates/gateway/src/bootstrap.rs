//! AppState construction shared by `serve` and `run`.

use std::sync::Arc;

use anyhow::Context;

use ra_agents::RestConnector;
use ra_domain::config::{Config, ConfigSeverity};

use crate::runtime::SystemClock;
use crate::state::AppState;

/// Validate config and return a fully-wired [`AppState`].
///
/// Validation errors abort startup.  Warnings (such as a missing agent
/// service endpoint) are logged and the server starts anyway; affected
/// requests then fail with a configuration error.
pub fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    // ── Config validation ────────────────────────────────────────────
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    if issues.iter().any(|i| i.severity == ConfigSeverity::Error) {
        anyhow::bail!(
            "config validation failed with {} error(s)",
            issues
                .iter()
                .filter(|i| i.severity == ConfigSeverity::Error)
                .count()
        );
    }

    // ── Agent service connector ──────────────────────────────────────
    let connector =
        RestConnector::new(&config.agent_service).context("building agent service HTTP client")?;
    tracing::info!(
        endpoint = ?config.agent_service.endpoint,
        api_version = %config.agent_service.api_version,
        default_agent_id = ?config.agent_service.default_agent_id,
        "agent service connector ready"
    );

    Ok(AppState {
        config,
        connector: Arc::new(connector),
        clock: Arc::new(SystemClock::new()),
    })
}
