use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Run polling defaults
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Defaults applied when a request omits `pollIntervalMs` / `timeoutMs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "d_1000")]
    pub default_interval_ms: u64,
    #[serde(default = "d_60000")]
    pub default_timeout_ms: u64,
    /// Issue one best-effort cancel call when a run is still in flight at
    /// the deadline.  The response still reports the last observed status.
    #[serde(default)]
    pub cancel_on_timeout: bool,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            default_interval_ms: d_1000(),
            default_timeout_ms: d_60000(),
            cancel_on_timeout: false,
        }
    }
}

fn d_1000() -> u64 {
    1000
}
fn d_60000() -> u64 {
    60_000
}
