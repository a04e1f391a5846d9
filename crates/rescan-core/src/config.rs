//! Configuration structures for rescan.
//!
//! The configuration file is JSON with one object per concern:
//!
//! - [`PlexConfig`] - Media server endpoint and token
//! - [`ScanConfig`] - Directories to scan, media extensions, required libraries
//! - [`BehaviourConfig`] - Refresh throttle, run interval, symlink checking
//! - [`NotificationConfig`] - Discord webhook settings
//! - [`LogConfig`] - Log level and optional log file
//!
//! Every field has a default, so a file only needs the values that differ:
//!
//! ```
//! use rescan_core::Config;
//!
//! let json = r#"{
//!     "plex": {"server": "http://plex:32400", "token": "abc"},
//!     "scan": {"directories": "/media/movies, /media/tv"}
//! }"#;
//!
//! let config: Config = serde_json::from_str(json).unwrap();
//! assert_eq!(config.scan.directories.len(), 2);
//! assert_eq!(config.behaviour.scan_interval_secs, 5);
//! assert!(config.validate().is_ok());
//! ```

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::error::ConfigError;

/// Default media server URL.
pub const DEFAULT_PLEX_URL: &str = "http://localhost:32400";

/// Longest accepted run interval: one year.
pub const MAX_RUN_INTERVAL_HOURS: u64 = 24 * 365;

/// Token value shipped in the example configuration.
const PLACEHOLDER_TOKEN: &str = "your_plex_token_here";

/// File extensions treated as media, lower-case without the leading dot.
pub const DEFAULT_MEDIA_EXTENSIONS: &[&str] = &[
    "mp4", "mkv", "avi", "mov", "wmv", "flv", "webm", "m4v", "m4p", "m4b", "m4r", "3gp", "mpg",
    "mpeg", "m2v", "m2ts", "ts", "vob", "iso",
];

/// Media server connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlexConfig {
    /// Base URL of the media server.
    pub server: String,
    /// Authentication token sent with every request.
    pub token: String,
}

impl Default for PlexConfig {
    fn default() -> Self {
        Self {
            server: DEFAULT_PLEX_URL.to_owned(),
            token: String::new(),
        }
    }
}

/// What to scan and how to classify it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Root directories to walk.
    ///
    /// Accepts a JSON list or a single comma/newline separated string.
    #[serde(deserialize_with = "deserialize_directories")]
    pub directories: Vec<Utf8PathBuf>,

    /// Recognised media extensions (case-insensitive, with or without dot).
    pub media_extensions: Vec<String>,

    /// Library types that must exist in the index for a run to proceed.
    pub required_library_types: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            directories: Vec::new(),
            media_extensions: DEFAULT_MEDIA_EXTENSIONS
                .iter()
                .map(|ext| (*ext).to_owned())
                .collect(),
            required_library_types: vec!["movie".to_owned(), "show".to_owned()],
        }
    }
}

/// Timing and filtering behaviour of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviourConfig {
    /// Seconds to wait after each folder refresh request.
    pub scan_interval_secs: u64,
    /// Hours between two runs.
    pub run_interval_hours: u64,
    /// Skip (and count) symlinks whose target no longer exists.
    pub symlink_check: bool,
}

impl Default for BehaviourConfig {
    fn default() -> Self {
        Self {
            scan_interval_secs: 5,
            run_interval_hours: 24,
            symlink_check: false,
        }
    }
}

impl BehaviourConfig {
    /// Delay between two folder refresh requests.
    #[inline]
    #[must_use]
    pub const fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs)
    }

    /// Delay between the end of one run and the start of the next.
    #[inline]
    #[must_use]
    pub const fn run_interval(&self) -> Duration {
        Duration::from_secs(self.run_interval_hours.saturating_mul(60 * 60))
    }
}

/// Discord webhook notification settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Whether a summary is sent at the end of each run.
    pub enabled: bool,
    /// Webhook URL. Empty means "not configured".
    pub discord_webhook_url: String,
    /// Display name of the webhook author.
    pub username: String,
    /// Avatar of the webhook author.
    pub avatar_url: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            discord_webhook_url: String::new(),
            username: "Rescan".to_owned(),
            avatar_url: "https://raw.githubusercontent.com/secunit404/rescan/master/assets/logo.png"
                .to_owned(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default level when `RUST_LOG` is not set.
    pub log_level: String,
    /// Optional file receiving a copy of the log.
    pub log_file: Option<Utf8PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_file: None,
        }
    }
}

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Media server settings.
    pub plex: PlexConfig,
    /// Scan settings.
    pub scan: ScanConfig,
    /// Run behaviour.
    pub behaviour: BehaviourConfig,
    /// Notification settings.
    pub notifications: NotificationConfig,
    /// Logging settings.
    pub logs: LogConfig,
}

impl Config {
    /// Reads and parses a JSON configuration file.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;

        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    /// Checks the values a run cannot do without.
    ///
    /// Logs a warning (but succeeds) when the server URL is still the
    /// default.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.plex.token.trim().is_empty() || self.plex.token == PLACEHOLDER_TOKEN {
            return Err(ConfigError::MissingToken);
        }

        if self.scan.directories.is_empty() {
            return Err(ConfigError::NoScanDirectories);
        }

        if self.behaviour.run_interval_hours == 0 {
            return Err(ConfigError::invalid_option(
                "behaviour.run_interval_hours",
                "must be at least 1",
            ));
        }

        if self.behaviour.run_interval_hours > MAX_RUN_INTERVAL_HOURS {
            return Err(ConfigError::invalid_option(
                "behaviour.run_interval_hours",
                format!("must be at most {MAX_RUN_INTERVAL_HOURS}"),
            ));
        }

        if self.scan.media_extensions.is_empty() {
            return Err(ConfigError::invalid_option(
                "scan.media_extensions",
                "at least one extension is required",
            ));
        }

        if self.plex.server == DEFAULT_PLEX_URL {
            warn!(server = %self.plex.server, "Using default Plex URL, make sure this is correct");
        }

        Ok(())
    }
}

/// Splits a comma and/or newline separated directory list.
fn split_directory_list(raw: &str) -> Vec<Utf8PathBuf> {
    raw.split([',', '\n'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(Utf8PathBuf::from)
        .collect()
}

fn deserialize_directories<'de, D>(deserializer: D) -> Result<Vec<Utf8PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Directories {
        List(Vec<String>),
        Joined(String),
    }

    Ok(match Directories::deserialize(deserializer)? {
        Directories::List(list) => list.iter().flat_map(|raw| split_directory_list(raw)).collect(),
        Directories::Joined(raw) => split_directory_list(&raw),
    })
}
