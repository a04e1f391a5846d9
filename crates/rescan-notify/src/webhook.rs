//! Discord webhook delivery.

use std::time::Duration;

use reqwest::Client;
use rescan_core::NotificationConfig;
use rescan_scanner::RunSummary;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::embed::Embed;
use crate::error::NotifyError;
use crate::packer::{EmbedLimits, build_messages};

/// Upper bound for one webhook call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// JSON body of a webhook execution.
#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    username: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    avatar_url: &'a str,
    embeds: &'a [Embed],
}

/// Sends run summaries to a Discord webhook.
#[derive(Debug, Clone)]
pub struct DiscordNotifier {
    http: Client,
    webhook_url: String,
    username: String,
    avatar_url: String,
    limits: EmbedLimits,
}

impl DiscordNotifier {
    /// Creates a notifier from the notification settings.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Disabled`] if notifications are off or the
    /// webhook URL is empty, and [`NotifyError::Http`] if the HTTP client
    /// cannot be built.
    pub fn new(config: &NotificationConfig) -> Result<Self, NotifyError> {
        if !config.enabled {
            return Err(NotifyError::Disabled("switched off in the configuration"));
        }
        if config.discord_webhook_url.trim().is_empty() {
            return Err(NotifyError::Disabled("no webhook URL configured"));
        }

        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            http,
            webhook_url: config.discord_webhook_url.trim().to_owned(),
            username: config.username.clone(),
            avatar_url: config.avatar_url.clone(),
            limits: EmbedLimits::default(),
        })
    }

    /// Overrides the packing limits.
    #[must_use]
    pub const fn with_limits(mut self, limits: EmbedLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Packs `summary` and sends every resulting message, in order.
    ///
    /// Stops at the first failed message. Returns the number of messages
    /// delivered.
    pub async fn send_summary(&self, summary: &RunSummary) -> Result<usize, NotifyError> {
        let messages = build_messages(summary, &self.limits);
        debug!(messages = messages.len(), "Packed run summary");

        for (sent, embed) in messages.iter().enumerate() {
            if let Err(err) = self.send(embed).await {
                warn!(sent, total = messages.len(), "Stopping notification after failed message");
                return Err(err);
            }
        }

        Ok(messages.len())
    }

    /// Sends `summary` and logs the outcome. Never fails.
    pub async fn notify(&self, summary: &RunSummary) {
        match self.send_summary(summary).await {
            Ok(messages) => info!(messages, "Discord notification sent"),
            Err(err) => error!(error = %err, "Failed to send Discord notification"),
        }
    }

    /// Executes the webhook with a single embed and waits for Discord to
    /// confirm it.
    pub async fn send(&self, embed: &Embed) -> Result<(), NotifyError> {
        let response = self
            .http
            .post(&self.webhook_url)
            .query(&[("wait", "true")])
            .json(&self.payload(embed))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Status { status, body });
        }

        debug!(title = %embed.title, fields = embed.field_count(), "Webhook message delivered");
        Ok(())
    }

    fn payload<'a>(&'a self, embed: &'a Embed) -> WebhookPayload<'a> {
        WebhookPayload {
            username: &self.username,
            avatar_url: &self.avatar_url,
            embeds: std::slice::from_ref(embed),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::embed::{COLOR_BLUE, EmbedField};

    use super::*;

    fn config(url: &str) -> NotificationConfig {
        NotificationConfig {
            enabled: true,
            discord_webhook_url: url.to_owned(),
            ..NotificationConfig::default()
        }
    }

    #[test]
    fn test_disabled_when_switched_off() {
        let mut config = config("https://discord.com/api/webhooks/1/abc");
        config.enabled = false;
        assert!(DiscordNotifier::new(&config).unwrap_err().is_disabled());
    }

    #[test]
    fn test_disabled_without_url() {
        assert!(DiscordNotifier::new(&config("  ")).unwrap_err().is_disabled());
    }

    #[test]
    fn test_payload_shape() {
        let notifier =
            DiscordNotifier::new(&config("https://discord.com/api/webhooks/1/abc")).unwrap();
        let mut embed = Embed::new("Rescan Summary", COLOR_BLUE);
        embed.push_field(EmbedField::new("📊 Overview", "Found **0** items", false));

        let json = serde_json::to_value(notifier.payload(&embed)).unwrap();
        assert_eq!(json["username"], "Rescan");
        assert_eq!(json["embeds"].as_array().unwrap().len(), 1);
        assert_eq!(json["embeds"][0]["fields"][0]["name"], "📊 Overview");
    }

    #[test]
    fn test_payload_omits_empty_avatar() {
        let mut config = config("https://discord.com/api/webhooks/1/abc");
        config.avatar_url = String::new();
        let notifier = DiscordNotifier::new(&config).unwrap();
        let embed = Embed::new("t", COLOR_BLUE);

        let json = serde_json::to_value(notifier.payload(&embed)).unwrap();
        assert!(json.get("avatar_url").is_none());
    }

    #[tokio::test]
    async fn test_malformed_webhook_url_is_http_error() {
        let notifier = DiscordNotifier::new(&config("discord-webhook")).unwrap();
        let summary = rescan_scanner::RunStats::new().snapshot();

        let err = notifier.send_summary(&summary).await.unwrap_err();
        assert!(matches!(err, NotifyError::Http(_)));
    }
}
