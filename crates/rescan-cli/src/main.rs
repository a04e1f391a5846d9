//! CLI entry point for rescan.
//!
//! Finds media files on disk that Plex has not indexed yet, asks Plex to
//! re-scan their folders, and reports each run to Discord.
//!
//! # Usage
//!
//! ```bash
//! rescan [OPTIONS] [COMMAND]
//!
//! # Run now, then every `run_interval_hours` (default command)
//! rescan run --config /app/config/config.json
//!
//! # Single run without touching Plex's library
//! rescan once --dry-run --no-notify
//!
//! # Validate the configuration and show what would be used
//! rescan check-config
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod app;
mod logging;

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use color_eyre::eyre::WrapErr;
use rescan_core::Config;
use tracing::info;

use crate::app::{App, shutdown_signal};

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Detects media files missing from Plex and triggers targeted re-scans.
#[derive(Debug, Parser)]
#[command(name = "rescan", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Command to execute (defaults to `run`).
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to the JSON configuration file.
    #[arg(
        short,
        long,
        global = true,
        env = "RESCAN_CONFIG",
        default_value = "/app/config/config.json"
    )]
    config: Utf8PathBuf,

    /// Plex server URL (overrides `plex.server`).
    #[arg(long, global = true, env = "RESCAN_PLEX_URL")]
    plex_url: Option<String>,

    /// Plex token (overrides `plex.token`).
    #[arg(long, global = true, env = "RESCAN_PLEX_TOKEN", hide_env_values = true)]
    plex_token: Option<String>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,

    /// Report missing files without asking Plex to re-scan.
    #[arg(long, global = true)]
    dry_run: bool,

    /// Do not send Discord notifications.
    #[arg(long, global = true)]
    no_notify: bool,
}

/// Available subcommands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
enum Commands {
    /// Run immediately, then on the configured interval until stopped.
    Run,

    /// Perform a single run and exit.
    Once,

    /// Load and validate the configuration, then print a summary of it.
    CheckConfig,
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Loads the configuration file and applies command-line overrides.
fn load_config(cli: &Cli) -> color_eyre::Result<Config> {
    let mut config = Config::load(&cli.config)?;

    if let Some(url) = &cli.plex_url {
        config.plex.server.clone_from(url);
    }
    if let Some(token) = &cli.plex_token {
        config.plex.token.clone_from(token);
    }

    Ok(config)
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

/// Prints the effective configuration, with the secrets masked.
fn check_config(config: &Config, path: &Utf8Path) -> color_eyre::Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    writeln!(handle, "Configuration OK: {path}")?;
    writeln!(handle)?;
    writeln!(handle, "Plex server:        {}", config.plex.server)?;
    writeln!(handle, "Plex token:         {}", mask(&config.plex.token))?;
    writeln!(handle, "Scan directories:   {}", config.scan.directories.len())?;
    for directory in &config.scan.directories {
        let marker = if directory.is_dir() {
            ""
        } else {
            "  (not found)"
        };
        writeln!(handle, "  {directory}{marker}")?;
    }
    writeln!(handle, "Media extensions:   {}", config.scan.media_extensions.join(", "))?;
    writeln!(
        handle,
        "Required libraries: {}",
        config.scan.required_library_types.join(", ")
    )?;
    writeln!(handle, "Scan interval:      {}s", config.behaviour.scan_interval_secs)?;
    writeln!(handle, "Run interval:       {}h", config.behaviour.run_interval_hours)?;
    writeln!(handle, "Symlink check:      {}", config.behaviour.symlink_check)?;

    let webhook = if config.notifications.discord_webhook_url.is_empty() {
        "not configured"
    } else {
        "configured"
    };
    let notifications = if config.notifications.enabled {
        "enabled"
    } else {
        "disabled"
    };
    writeln!(handle, "Notifications:      {notifications} (webhook {webhook})")?;
    writeln!(handle, "Log level:          {}", config.logs.log_level)?;
    if let Some(file) = &config.logs.log_file {
        writeln!(handle, "Log file:           {file}")?;
    }

    Ok(())
}

/// Hides all but the last four characters of a secret.
fn mask(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= 4 {
        return "*".repeat(count);
    }
    let visible: String = secret.chars().skip(count - 4).collect();
    format!("{}{visible}", "*".repeat(count - 4))
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    // 1. Install color-eyre FIRST (before any potential panics)
    color_eyre::install()?;

    // 2. Parse CLI arguments
    let cli = Cli::parse();

    // 3. Load configuration (needed for the log level and log file)
    let config = load_config(&cli)?;

    // 4. Initialize tracing
    let _logging = logging::init(&config.logs, cli.verbose, cli.no_color);

    // 5. Validate and route to the command
    config
        .validate()
        .wrap_err_with(|| format!("invalid configuration in {}", cli.config))?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::CheckConfig => check_config(&config, &cli.config),
        Commands::Once => {
            let app = App::new(config, cli.dry_run, !cli.no_notify);
            app.connect().await?;
            app.run_once().await?;
            Ok(())
        }
        Commands::Run => {
            info!("Starting Plex missing files scanner");
            let shutdown = shutdown_signal()?;
            let app = App::new(config, cli.dry_run, !cli.no_notify);
            app.connect().await?;
            app.run_forever(shutdown).await;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_command_is_none() {
        let cli = Cli::try_parse_from(["rescan", "--config", "/tmp/c.json"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config, Utf8PathBuf::from("/tmp/c.json"));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["rescan", "once", "--dry-run", "--no-notify", "-v"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Once));
        assert!(cli.dry_run);
        assert!(cli.no_notify);
        assert!(cli.verbose);
    }

    #[test]
    fn test_check_config_subcommand() {
        let cli = Cli::try_parse_from(["rescan", "check-config"]).unwrap();
        assert_eq!(cli.command, Some(Commands::CheckConfig));
    }

    #[test]
    fn test_load_config_applies_overrides() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("config.json")).unwrap();
        std::fs::write(
            &path,
            r#"{"plex": {"server": "http://plex:32400", "token": "from-file"},
                "scan": {"directories": ["/media/movies"]}}"#,
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "rescan",
            "--config",
            path.as_str(),
            "--plex-token",
            "from-cli",
        ])
        .unwrap();
        let config = load_config(&cli).unwrap();

        assert_eq!(config.plex.token, "from-cli");
        assert_eq!(config.plex.server, "http://plex:32400");
    }

    #[test]
    fn test_mask() {
        assert_eq!(mask("abcdefgh"), "****efgh");
        assert_eq!(mask("abc"), "***");
        assert_eq!(mask(""), "");
    }
}
