use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Agent execution service connection
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentServiceConfig {
    /// Base URL of the agent service project, e.g.
    /// `https://<resource>.services.ai.azure.com/api/projects/<project>`.
    /// Requests are rejected with a configuration error while unset.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Agent used when a request does not name one.
    #[serde(default)]
    pub default_agent_id: Option<String>,
    /// Value of the `api-version` query parameter sent on every call.
    #[serde(default = "d_api_version")]
    pub api_version: String,
    /// Static bearer token.  Takes precedence over `api_key_env`.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Environment variable holding the bearer token.
    #[serde(default = "d_api_key_env")]
    pub api_key_env: String,
    /// Per-call HTTP timeout.
    #[serde(default = "d_30000")]
    pub request_timeout_ms: u64,
}

impl Default for AgentServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            default_agent_id: None,
            api_version: d_api_version(),
            api_key: None,
            api_key_env: d_api_key_env(),
            request_timeout_ms: d_30000(),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_api_version() -> String {
    "v1".into()
}
fn d_api_key_env() -> String {
    "AGENT_SERVICE_TOKEN".into()
}
fn d_30000() -> u64 {
    30_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_leaves_endpoint_and_agent_unset() {
        let cfg: AgentServiceConfig = toml::from_str("").unwrap();
        assert!(cfg.endpoint.is_none());
        assert!(cfg.default_agent_id.is_none());
        assert_eq!(cfg.api_version, "v1");
        assert_eq!(cfg.api_key_env, "AGENT_SERVICE_TOKEN");
        assert_eq!(cfg.request_timeout_ms, 30_000);
    }

    #[test]
    fn parses_full_section() {
        let toml_str = r#"
            endpoint = "https://example.services.ai.azure.com/api/projects/demo"
            default_agent_id = "asst_123"
            api_version = "2025-05-01"
            api_key_env = "MY_TOKEN"
            request_timeout_ms = 5000
        "#;
        let cfg: AgentServiceConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            cfg.endpoint.as_deref(),
            Some("https://example.services.ai.azure.com/api/projects/demo")
        );
        assert_eq!(cfg.default_agent_id.as_deref(), Some("asst_123"));
        assert_eq!(cfg.api_version, "2025-05-01");
        assert_eq!(cfg.api_key_env, "MY_TOKEN");
        assert_eq!(cfg.request_timeout_ms, 5000);
    }
}
