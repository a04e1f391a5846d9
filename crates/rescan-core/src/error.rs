//! Error types for the rescan-core crate.
//!
//! This module provides [`ConfigError`], raised while loading and validating
//! the configuration. Every variant is fatal at startup.

use camino::Utf8PathBuf;

/// Errors that can occur during configuration loading and validation.
///
/// # Examples
///
/// ```
/// use rescan_core::ConfigError;
///
/// let error = ConfigError::NoScanDirectories;
/// assert!(error.to_string().contains("directories"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No scan directories were configured.
    #[error("no scan directories configured; set `scan.directories`")]
    NoScanDirectories,

    /// The media server token is empty or still the placeholder.
    #[error("Plex token not configured; set `plex.token`")]
    MissingToken,

    /// A configuration option has an invalid value.
    #[error("invalid configuration option '{option}': {reason}")]
    InvalidOption {
        /// The name of the invalid option.
        option: String,
        /// Explanation of why the option is invalid.
        reason: String,
    },

    /// An I/O error occurred while reading configuration.
    #[error("failed to read configuration from {path}: {source}")]
    Io {
        /// The configuration file path.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the configuration file.
    #[error("failed to parse configuration from {path}: {source}")]
    Parse {
        /// The configuration file path.
        path: Utf8PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

impl ConfigError {
    /// Creates a new [`ConfigError::InvalidOption`] error.
    pub fn invalid_option(option: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            option: option.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_option_display() {
        let error = ConfigError::invalid_option("behaviour.run_interval_hours", "must be positive");
        let msg = error.to_string();
        assert!(msg.contains("run_interval_hours"));
        assert!(msg.contains("must be positive"));
    }

    #[test]
    fn test_io_error_mentions_path() {
        let error = ConfigError::Io {
            path: Utf8PathBuf::from("/app/config/config.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(error.to_string().contains("/app/config/config.json"));
    }

    #[test]
    fn test_missing_token_display() {
        assert!(ConfigError::MissingToken.to_string().contains("plex.token"));
    }
}
