//! Tracing subscriber setup.
//!
//! Console output always; a plain-text copy in `logs.log_file` when one is
//! configured.

use std::fs::{self, OpenOptions};

use camino::Utf8Path;
use rescan_core::LogConfig;
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Crates that log too much at `info`/`debug`.
const QUIET_CRATES: &str = "hyper=warn,hyper_util=warn,reqwest=warn,rustls=warn";

/// Keeps the log file writer alive; dropping it flushes the file.
#[derive(Debug)]
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

/// Picks the base level: `--verbose`, else the configured level.
fn base_level<'a>(config: &'a LogConfig, verbose: bool) -> &'a str {
    if verbose {
        "debug"
    } else if config.log_level.trim().is_empty() {
        "info"
    } else {
        config.log_level.trim()
    }
}

/// Builds the filter: `RUST_LOG` wins, otherwise [`base_level`].
fn build_filter(config: &LogConfig, verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = base_level(config, verbose).to_lowercase();
        EnvFilter::try_new(format!("{level},{QUIET_CRATES}"))
            .unwrap_or_else(|_| EnvFilter::new(format!("info,{QUIET_CRATES}")))
    })
}

/// Creates the log file (and its directory) if needed.
fn prepare_log_file(path: &Utf8Path) -> std::io::Result<()> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    OpenOptions::new().create(true).append(true).open(path).map(drop)
}

/// Initializes the global tracing subscriber.
///
/// A log file that cannot be created is reported once logging is up, and
/// the process continues with console output only.
pub fn init(config: &LogConfig, verbose: bool, no_color: bool) -> LoggingGuard {
    let use_ansi = !no_color && std::env::var_os("NO_COLOR").is_none();

    let mut file_error = None;
    let mut file_guard = None;
    let file_layer = config.log_file.as_deref().and_then(|path| {
        let file_name = path.file_name()?;
        if let Err(err) = prepare_log_file(path) {
            file_error = Some(format!("{path}: {err}"));
            return None;
        }

        let dir = path
            .parent()
            .filter(|dir| !dir.as_str().is_empty())
            .unwrap_or(Utf8Path::new("."));
        let (writer, guard) = tracing_appender::non_blocking(rolling::never(dir, file_name));
        file_guard = Some(guard);
        Some(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer),
        )
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_ansi(use_ansi))
        .with(file_layer)
        .with(build_filter(config, verbose))
        .init();

    if let Some(error) = file_error {
        tracing::warn!(%error, "Could not create log file, logging to console only");
    }

    LoggingGuard { _file: file_guard }
}
