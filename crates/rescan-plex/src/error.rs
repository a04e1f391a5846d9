//! Error types for the rescan-plex crate.

use rescan_core::IndexError;

/// Errors returned by [`PlexClient`](crate::PlexClient).
///
/// URLs carried by these errors never contain the token; it travels in a
/// header.
#[derive(Debug, thiserror::Error)]
pub enum PlexError {
    /// The configured server URL is unusable.
    #[error("invalid Plex server URL '{url}': {reason}")]
    InvalidUrl {
        /// The configured URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The request could not be sent or the body could not be read.
    #[error("request to {url} failed: {source}")]
    Http {
        /// The request URL.
        url: String,
        /// The transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status {
        /// The request URL.
        url: String,
        /// The HTTP status.
        status: reqwest::StatusCode,
    },

    /// The response body was not the expected JSON.
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        /// The request URL.
        url: String,
        /// The JSON error.
        #[source]
        source: serde_json::Error,
    },
}

impl PlexError {
    /// Creates a new [`PlexError::InvalidUrl`] error.
    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Returns `true` for authentication failures (401/403).
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Self::Status { status, .. }
                if *status == reqwest::StatusCode::UNAUTHORIZED
                    || *status == reqwest::StatusCode::FORBIDDEN
        )
    }

    /// Wraps this error for the media index interface.
    pub fn into_index_error(self, context: impl Into<String>) -> IndexError {
        IndexError::backend(context, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        let err = PlexError::Status {
            url: "http://plex:32400/library/sections".to_owned(),
            status: reqwest::StatusCode::UNAUTHORIZED,
        };
        assert_eq!(
            err.to_string(),
            "http://plex:32400/library/sections returned HTTP 401 Unauthorized"
        );
        assert!(err.is_unauthorized());
    }

    #[test]
    fn test_into_index_error_keeps_context() {
        let err = PlexError::invalid_url("ftp://plex", "unsupported scheme")
            .into_index_error("listing library sections");
        let msg = err.to_string();
        assert!(msg.starts_with("listing library sections: "));
        assert!(msg.contains("unsupported scheme"));
    }

    #[test]
    fn test_decode_display() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = PlexError::Decode {
            url: "http://plex/identity".to_owned(),
            source,
        };
        assert!(err.to_string().starts_with("failed to decode response from http://plex/identity"));
        assert!(!err.is_unauthorized());
    }
}
