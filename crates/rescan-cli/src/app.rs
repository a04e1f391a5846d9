//! Run orchestration: connectivity check, single runs, and the schedule.

use std::sync::Arc;

use color_eyre::eyre::{WrapErr, eyre};
use rescan_core::Config;
use rescan_notify::DiscordNotifier;
use rescan_plex::{PlexClient, ServerIdentity};
use rescan_scanner::{RunSummary, ScanOptions, Scanner};
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Everything a run needs, shared across scheduled runs.
#[derive(Debug, Clone)]
pub struct App {
    config: Arc<Config>,
    options: ScanOptions,
    notify: bool,
}

impl App {
    /// Creates the application from a validated configuration.
    pub fn new(config: Config, dry_run: bool, notify: bool) -> Self {
        let options = ScanOptions::from_config(&config).with_dry_run(dry_run);
        Self {
            config: Arc::new(config),
            options,
            notify,
        }
    }

    /// Checks that the media server is reachable and the token accepted.
    pub async fn connect(&self) -> color_eyre::Result<ServerIdentity> {
        let plex = self.config.plex.clone();
        let identity = tokio::task::spawn_blocking(move || PlexClient::new(&plex)?.identity())
            .await
            .wrap_err("connectivity check panicked")?
            .wrap_err_with(|| {
                format!("Failed to connect to Plex server at {}", self.config.plex.server)
            })?;

        info!(
            server = %identity.display_name(),
            version = %identity.version,
            "Connected to Plex server"
        );
        Ok(identity)
    }

    /// Performs one scan run and sends its notification.
    pub async fn run_once(&self) -> color_eyre::Result<RunSummary> {
        let config = Arc::clone(&self.config);
        let options = self.options.clone();

        let summary = tokio::task::spawn_blocking(move || {
            let client = PlexClient::new(&config.plex)?;
            Ok::<_, rescan_plex::PlexError>(
                Scanner::new(client, options).run(&config.scan.directories),
            )
        })
        .await
        .wrap_err("scan run panicked")??;

        if self.notify {
            self.send_notification(&summary).await;
        }
        Ok(summary)
    }

    /// Runs immediately, then every `run_interval` until `shutdown` fires.
    ///
    /// A shutdown request never interrupts a run in progress.
    pub async fn run_forever(&self, mut shutdown: watch::Receiver<bool>) {
        let interval = self.config.behaviour.run_interval();
        info!(hours = self.config.behaviour.run_interval_hours, "Will run on a schedule");

        loop {
            if let Err(err) = self.run_once().await {
                error!(error = %err, "Scan run failed");
            }

            if *shutdown.borrow() {
                break;
            }

            info!(hours = self.config.behaviour.run_interval_hours, "Next run scheduled");
            tokio::select! {
                () = tokio::time::sleep(interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        warn!("Shutdown channel closed");
                    }
                    break;
                }
            }
        }
    }

    async fn send_notification(&self, summary: &RunSummary) {
        match DiscordNotifier::new(&self.config.notifications) {
            Ok(notifier) => notifier.notify(summary).await,
            Err(err) if err.is_disabled() && self.config.notifications.enabled => {
                warn!(reason = %err, "Discord webhook URL not configured, skipping notification");
            }
            Err(err) if err.is_disabled() => info!("Notifications are disabled"),
            Err(err) => error!(error = %err, "Failed to set up Discord notifier"),
        }
    }
}

/// Spawns a task that flips the returned receiver on SIGINT or SIGTERM.
pub fn shutdown_signal() -> color_eyre::Result<watch::Receiver<bool>> {
    let (tx, rx) = watch::channel(false);

    #[cfg(unix)]
    let mut sigterm = {
        use tokio::signal::unix::{SignalKind, signal};
        signal(SignalKind::terminate()).map_err(|err| eyre!("cannot listen for SIGTERM: {err}"))?
    };

    tokio::spawn(async move {
        #[cfg(unix)]
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }

        #[cfg(not(unix))]
        let _ = tokio::signal::ctrl_c().await;

        info!("Shutting down gracefully");
        let _ = tx.send(true);
    });

    Ok(rx)
}
