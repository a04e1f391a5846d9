//! Discord embed model.
//!
//! Plain serde structs mirroring the subset of Discord's embed object the
//! notifier uses, plus the size accounting Discord applies to them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Discord's blue (`#3498db`).
pub const COLOR_BLUE: u32 = 0x0034_98db;

/// Discord's red (`#e74c3c`).
pub const COLOR_RED: u32 = 0x00e7_4c3c;

/// Maximum characters in a field name.
pub const MAX_FIELD_NAME: usize = 256;

/// Maximum characters in a field value.
pub const MAX_FIELD_VALUE: usize = 1024;

/// Appended to values cut at their limit.
const ELLIPSIS: char = '…';

/// One name/value pair of an embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    /// Field heading.
    pub name: String,
    /// Field body (Discord markdown).
    pub value: String,
    /// Render side by side with neighbouring inline fields.
    pub inline: bool,
}

impl EmbedField {
    /// Creates a field, truncating name and value to Discord's limits.
    ///
    /// # Examples
    ///
    /// ```
    /// use rescan_notify::EmbedField;
    ///
    /// let field = EmbedField::new("📁 Movies", "x".repeat(2000), true);
    /// assert_eq!(field.value.chars().count(), 1024);
    /// assert!(field.value.ends_with('…'));
    /// ```
    pub fn new(name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        Self {
            name: truncate(name.into(), MAX_FIELD_NAME),
            value: truncate(value.into(), MAX_FIELD_VALUE),
            inline,
        }
    }

    /// Characters this field contributes to the embed size.
    #[must_use]
    pub fn size(&self) -> usize {
        self.name.chars().count() + self.value.chars().count()
    }
}

/// Embed footer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedFooter {
    /// Footer text.
    pub text: String,
}

/// A single Discord embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    /// Embed title.
    pub title: String,
    /// Sidebar colour as `0xRRGGBB`.
    pub color: u32,
    /// Timestamp shown next to the footer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Ordered fields.
    #[serde(default)]
    pub fields: Vec<EmbedField>,
    /// Optional footer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
}

impl Embed {
    /// Creates an empty embed.
    pub fn new(title: impl Into<String>, color: u32) -> Self {
        Self {
            title: title.into(),
            color,
            timestamp: None,
            fields: Vec::new(),
            footer: None,
        }
    }

    /// Sets the timestamp.
    #[must_use]
    pub const fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Sets the footer text.
    #[must_use]
    pub fn with_footer(mut self, text: impl Into<String>) -> Self {
        self.footer = Some(EmbedFooter { text: text.into() });
        self
    }

    /// Appends a field.
    pub fn push_field(&mut self, field: EmbedField) {
        self.fields.push(field);
    }

    /// Size as Discord counts it: title, footer, and every field name and
    /// value, in characters.
    ///
    /// # Examples
    ///
    /// ```
    /// use rescan_notify::{Embed, EmbedField, COLOR_BLUE};
    ///
    /// let mut embed = Embed::new("Title", COLOR_BLUE).with_footer("Foot");
    /// embed.push_field(EmbedField::new("ab", "cde", false));
    /// assert_eq!(embed.size(), 5 + 4 + 2 + 3);
    /// ```
    #[must_use]
    pub fn size(&self) -> usize {
        self.title.chars().count()
            + self
                .footer
                .as_ref()
                .map_or(0, |footer| footer.text.chars().count())
            + self.fields.iter().map(EmbedField::size).sum::<usize>()
    }

    /// Number of fields.
    #[inline]
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}

/// Cuts `text` to at most `max` characters, ending in an ellipsis if cut.
fn truncate(text: String, max: usize) -> String {
    if text.chars().count() <= max {
        return text;
    }

    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push(ELLIPSIS);
    cut
}
