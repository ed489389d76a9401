pub mod config;
pub mod run;

use clap::{Parser, Subcommand};

use ra_domain::config::Config;

/// runagent: run a hosted agent over one HTTP request.
#[derive(Debug, Parser)]
#[command(name = "runagent", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the HTTP server (default when no subcommand is given).
    Serve,
    /// Run the agent once and print the response JSON.
    Run {
        /// User message to send.
        input: String,
        /// Agent id (defaults to the configured default agent).
        #[arg(long)]
        agent: Option<String>,
        /// Milliseconds between status checks.
        #[arg(long)]
        poll_interval_ms: Option<u64>,
        /// Give up polling after this many milliseconds.
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any issues.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Environment variable naming the config file.
pub const ENV_CONFIG_PATH: &str = "RUNAGENT_CONFIG";

/// Load the configuration from `$RUNAGENT_CONFIG` (or `config.toml`),
/// then apply environment overrides.  A missing file yields defaults.
///
/// Returns the resolved [`Config`] and the path that was used.
pub fn load_config() -> anyhow::Result<(Config, String)> {
    let config_path = std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| "config.toml".into());

    let mut config = if std::path::Path::new(&config_path).exists() {
        let raw = std::fs::read_to_string(&config_path)
            .map_err(|e| anyhow::anyhow!("reading {config_path}: {e}"))?;
        toml::from_str(&raw).map_err(|e| anyhow::anyhow!("parsing {config_path}: {e}"))?
    } else {
        Config::default()
    };

    config.apply_env_overrides(|key| std::env::var(key).ok());

    Ok((config, config_path))
}
