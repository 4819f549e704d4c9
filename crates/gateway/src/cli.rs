use clap::{Parser, Subcommand};

use ik_domain::config::{Config, ConfigSeverity};

/// Innkeeper — a guest-messaging concierge for short-term rentals.
#[derive(Debug, Parser)]
#[command(name = "innkeeper", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the webhook server (default when no subcommand is given).
    Serve,
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

/// Load the configuration file.
///
/// The path comes from `INNKEEPER_CONFIG` when set, otherwise
/// `./innkeeper.toml`. A missing file yields the built-in defaults;
/// a present-but-broken file is an error.
pub fn load_config() -> anyhow::Result<(Config, String)> {
    let path = std::env::var("INNKEEPER_CONFIG").unwrap_or_else(|_| "innkeeper.toml".into());

    let config = match std::fs::read_to_string(&path) {
        Ok(raw) => toml::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("parsing {path}: {e}"))?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path = %path, "no config file found, using defaults");
            Config::default()
        }
        Err(e) => return Err(anyhow::anyhow!("reading {path}: {e}")),
    };

    Ok((config, path))
}

/// Parse and validate the config, printing any issues.
///
/// Returns `true` when no errors (warnings allowed) were found.
pub fn validate(config: &Config, config_path: &str) -> bool {
    let issues = config.validate();

    if issues.is_empty() {
        println!("Config OK ({config_path})");
        return true;
    }

    let error_count = issues
        .iter()
        .filter(|e| e.severity == ConfigSeverity::Error)
        .count();
    let warning_count = issues.len() - error_count;

    for issue in &issues {
        println!("{issue}");
    }

    println!("\n{error_count} error(s), {warning_count} warning(s) in {config_path}");

    error_count == 0
}

/// Dump the resolved config (with all defaults filled in) as TOML.
pub fn show(config: &Config) {
    match toml::to_string_pretty(config) {
        Ok(output) => print!("{output}"),
        Err(e) => {
            eprintln!("Failed to serialize config: {e}");
            std::process::exit(1);
        }
    }
}
