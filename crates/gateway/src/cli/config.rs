use ra_domain::config::{Config, ConfigError, ConfigSeverity};

/// Print validation issues for `config` and a one-line verdict.
///
/// Returns `false` when any issue is an error.  Warnings (such as a
/// missing endpoint, which only fails requests) leave the config valid.
pub fn validate(config: &Config, config_path: &str) -> bool {
    let issues = config.validate();
    print!("{}", render_report(&issues, config_path));
    !issues.iter().any(|i| i.severity == ConfigSeverity::Error)
}

fn render_report(issues: &[ConfigError], config_path: &str) -> String {
    if issues.is_empty() {
        return format!("Config OK ({config_path})\n");
    }

    let errors = issues
        .iter()
        .filter(|i| i.severity == ConfigSeverity::Error)
        .count();
    let mut out: String = issues.iter().map(|i| format!("{i}\n")).collect();
    out.push_str(&format!(
        "\n{errors} error(s), {} warning(s) in {config_path}\n",
        issues.len() - errors
    ));
    out
}

/// Dump the resolved config (defaults and environment overrides applied)
/// as TOML, with the API key masked.
pub fn show(config: &Config) {
    match render_masked(config) {
        Ok(output) => print!("{output}"),
        Err(e) => {
            eprintln!("Failed to serialize config: {e}");
            std::process::exit(1);
        }
    }
}

fn render_masked(config: &Config) -> Result<String, toml::ser::Error> {
    let mut masked = config.clone();
    if masked.agent_service.api_key.is_some() {
        masked.agent_service.api_key = Some("********".into());
    }
    toml::to_string_pretty(&masked)
}
