mod agent_service;
mod observability;
mod polling;
mod server;

pub use agent_service::*;
pub use observability::*;
pub use polling::*;
pub use server::*;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Environment variable overriding `agent_service.endpoint`.
pub const ENV_ENDPOINT: &str = "AGENT_SERVICE_ENDPOINT";
/// Environment variable overriding `agent_service.default_agent_id`.
pub const ENV_AGENT_ID: &str = "AGENT_SERVICE_AGENT_ID";
/// Environment variable overriding `server.cors.allowed_origins`
/// (comma separated).
pub const ENV_ALLOWED_ORIGINS: &str = "ALLOWED_ORIGINS";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub agent_service: AgentServiceConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// A missing endpoint or default agent is only a warning: the server
    /// still starts and answers each request with a configuration error.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.server.port == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "server.port".into(),
                message: "port must be greater than 0".into(),
            });
        }

        if self.server.host.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "server.host".into(),
                message: "host must not be empty".into(),
            });
        }

        if self.server.max_concurrent_requests == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "server.max_concurrent_requests".into(),
                message: "must be greater than 0".into(),
            });
        }

        match self.agent_service.endpoint.as_deref() {
            None | Some("") => errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "agent_service.endpoint".into(),
                message: format!(
                    "not set (set it in config or via {ENV_ENDPOINT}); requests will fail"
                ),
            }),
            Some(url) if !(url.starts_with("http://") || url.starts_with("https://")) => {
                errors.push(ConfigError {
                    severity: ConfigSeverity::Error,
                    field: "agent_service.endpoint".into(),
                    message: format!("must be an http(s) URL, got {url:?}"),
                });
            }
            Some(_) => {}
        }

        if self
            .agent_service
            .default_agent_id
            .as_deref()
            .map_or(true, str::is_empty)
        {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "agent_service.default_agent_id".into(),
                message: format!(
                    "not set (set it in config or via {ENV_AGENT_ID}); requests will fail"
                ),
            });
        }

        if self.polling.default_interval_ms == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "polling.default_interval_ms".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.polling.default_timeout_ms == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "polling.default_timeout_ms".into(),
                message: "must be greater than 0".into(),
            });
        }

        if self.server.cors.is_wildcard() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "server.cors.allowed_origins".into(),
                message: "wildcard \"*\" allows all origins".into(),
            });
        }

        errors
    }

    /// Apply environment overrides on top of file values.
    ///
    /// `lookup` is `std::env::var` in production; tests pass a map.
    /// Empty values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(endpoint) = get(ENV_ENDPOINT) {
            self.agent_service.endpoint = Some(endpoint.trim().to_owned());
        }
        if let Some(agent_id) = get(ENV_AGENT_ID) {
            self.agent_service.default_agent_id = Some(agent_id.trim().to_owned());
        }
        if let Some(origins) = get(ENV_ALLOWED_ORIGINS) {
            let parsed: Vec<String> = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_owned)
                .collect();
            if !parsed.is_empty() {
                self.server.cors.allowed_origins = parsed;
            }
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
