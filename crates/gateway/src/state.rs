use std::sync::Arc;

use ra_agents::AgentConnector;
use ra_domain::config::Config;

use crate::runtime::Clock;

/// Shared application state passed to all API handlers.
///
/// Everything here is immutable after startup; requests share no mutable
/// state with each other.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Builds an agent service client per request.
    pub connector: Arc<dyn AgentConnector>,
    /// Time source for the run poller.
    pub clock: Arc<dyn Clock>,
}
