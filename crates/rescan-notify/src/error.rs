//! Error types for the rescan-notify crate.

/// Errors raised while delivering a notification.
///
/// None of these ever abort a run; the caller logs them.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// Notifications are switched off or no webhook URL is configured.
    #[error("Discord notifications are disabled: {0}")]
    Disabled(&'static str),

    /// The request could not be sent.
    #[error("failed to reach Discord webhook: {0}")]
    Http(#[from] reqwest::Error),

    /// Discord rejected the message.
    #[error("Discord webhook returned HTTP {status}: {body}")]
    Status {
        /// The HTTP status.
        status: reqwest::StatusCode,
        /// The response body, as returned by Discord.
        body: String,
    },
}

impl NotifyError {
    /// Returns `true` if the error only means notifications are switched off.
    #[inline]
    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        matches!(self, Self::Disabled(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display_includes_body() {
        let err = NotifyError::Status {
            status: reqwest::StatusCode::BAD_REQUEST,
            body: r#"{"embeds": ["0"]}"#.to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("400"));
        assert!(msg.contains("embeds"));
        assert!(!err.is_disabled());
    }

    #[test]
    fn test_disabled() {
        let err = NotifyError::Disabled("no webhook URL configured");
        assert!(err.is_disabled());
        assert!(err.to_string().ends_with("no webhook URL configured"));
    }
}
