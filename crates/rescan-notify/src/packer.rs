//! Turns a run summary into Discord embeds that respect Discord's limits.
//!
//! The summary is first laid out as one logical embed:
//!
//! 1. `📊 Overview`
//! 2. `⚠️ Issues` (broken symlinks, when any)
//! 3. one inline `📁 <library>` field per library with missing items
//! 4. `⚠️ Other Issues` (errors and warnings, when any), spread over as many
//!    fields as needed to keep every line
//!
//! If that embed is within the size and field-count limits it is sent as is.
//! Otherwise it is split: the first message keeps the title, overview and
//! footer; the library fields and other issues are packed greedily into
//! "Library Details" messages; an issues field that did not fit the first
//! message goes into a final red "Issues" message.

use chrono::TimeDelta;
use rescan_scanner::RunSummary;

use crate::embed::{COLOR_BLUE, COLOR_RED, Embed, EmbedField, MAX_FIELD_NAME, MAX_FIELD_VALUE};

/// Title of the summary embed.
pub const SUMMARY_TITLE: &str = "Rescan Summary";

const OVERVIEW_NAME: &str = "📊 Overview";
const ISSUES_NAME: &str = "⚠️ Issues";
const OTHER_ISSUES_NAME: &str = "⚠️ Other Issues";
const OTHER_ISSUES_CONTINUED_NAME: &str = "⚠️ Other Issues (continued)";
const DETAILS_TITLE: &str = "📁 Library Details";
const DETAILS_CONTINUED_TITLE: &str = "📁 Library Details (continued)";
const ISSUES_TITLE: &str = "⚠️ Issues";

/// Smallest accepted embed size: any title plus one field at its name and
/// value limits.
pub const MIN_EMBED_SIZE: usize = 64 + MAX_FIELD_NAME + MAX_FIELD_VALUE;

/// Per-message limits.
///
/// A single field always fits an otherwise empty message, so packing never
/// produces a message over the limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbedLimits {
    /// Maximum embed size in characters (see [`Embed::size`]).
    max_size: usize,
    /// Maximum fields per embed.
    max_fields: usize,
}

impl Default for EmbedLimits {
    /// Discord's limits: 6000 characters and 25 fields.
    fn default() -> Self {
        Self {
            max_size: 6000,
            max_fields: 25,
        }
    }
}

impl EmbedLimits {
    /// Creates limits, raising `max_size` to at least [`MIN_EMBED_SIZE`] and
    /// `max_fields` to at least one.
    ///
    /// # Examples
    ///
    /// ```
    /// use rescan_notify::{EmbedLimits, MIN_EMBED_SIZE};
    ///
    /// let limits = EmbedLimits::new(100, 0);
    /// assert_eq!(limits.max_size(), MIN_EMBED_SIZE);
    /// assert_eq!(limits.max_fields(), 1);
    /// ```
    #[must_use]
    pub const fn new(max_size: usize, max_fields: usize) -> Self {
        Self {
            max_size: if max_size < MIN_EMBED_SIZE {
                MIN_EMBED_SIZE
            } else {
                max_size
            },
            max_fields: if max_fields == 0 { 1 } else { max_fields },
        }
    }

    /// Maximum embed size in characters.
    #[inline]
    #[must_use]
    pub const fn max_size(&self) -> usize {
        self.max_size
    }

    /// Maximum fields per embed.
    #[inline]
    #[must_use]
    pub const fn max_fields(&self) -> usize {
        self.max_fields
    }

    /// Returns `true` if `embed` plus `field` stays within the limits.
    fn fits(&self, embed: &Embed, field: &EmbedField) -> bool {
        embed.size() + field.size() <= self.max_size && embed.field_count() < self.max_fields
    }

    /// Returns `true` if `embed` is within the limits.
    fn admits(&self, embed: &Embed) -> bool {
        embed.size() <= self.max_size && embed.field_count() <= self.max_fields
    }
}

/// The fields of the logical summary, grouped by role.
struct SummaryFields {
    overview: EmbedField,
    issues: Option<EmbedField>,
    libraries: Vec<EmbedField>,
    other_issues: Vec<EmbedField>,
}

impl SummaryFields {
    fn from_summary(summary: &RunSummary) -> Self {
        let overview = EmbedField::new(
            OVERVIEW_NAME,
            format!(
                "Found **{}** items from **{}** scanned files",
                summary.total_missing, summary.total_scanned
            ),
            false,
        );

        let issues = (summary.broken_symlinks > 0).then(|| {
            EmbedField::new(
                ISSUES_NAME,
                format!("Broken Symlinks Skipped: **{}**", summary.broken_symlinks),
                false,
            )
        });

        let libraries = summary
            .missing_items
            .iter()
            .map(|missing| {
                EmbedField::new(
                    format!("📁 {}", missing.library),
                    format!("Found: **{}** items", missing.items.len()),
                    true,
                )
            })
            .collect();

        let lines: Vec<String> = summary
            .errors
            .iter()
            .map(|error| format!("❌ {error}"))
            .chain(summary.warnings.iter().map(|warning| format!("⚠️ {warning}")))
            .collect();
        let other_issues = chunk_lines(&lines, MAX_FIELD_VALUE)
            .into_iter()
            .enumerate()
            .map(|(i, chunk)| {
                let name = if i == 0 {
                    OTHER_ISSUES_NAME
                } else {
                    OTHER_ISSUES_CONTINUED_NAME
                };
                EmbedField::new(name, chunk, false)
            })
            .collect();

        Self {
            overview,
            issues,
            libraries,
            other_issues,
        }
    }
}

/// Joins `lines` with newlines into chunks of at most `max` characters.
///
/// A line longer than `max` gets a chunk of its own and is truncated when
/// the field is built.
fn chunk_lines(lines: &[String], max: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in lines {
        let len = line.chars().count();
        if !current.is_empty() && current_len + 1 + len > max {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push('\n');
            current_len += 1;
        }
        current.push_str(line);
        current_len += len;
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Builds the embeds announcing `summary`, in sending order.
///
/// Every embed respects `limits`; every field appears exactly once.
///
/// # Examples
///
/// ```
/// use rescan_notify::{EmbedLimits, build_messages};
/// use rescan_scanner::RunStats;
///
/// let mut stats = RunStats::new();
/// stats.increment_scanned();
/// stats.add_missing_item("Movies", "/media/movies/b.mkv");
///
/// let embeds = build_messages(&stats.snapshot(), &EmbedLimits::default());
/// assert_eq!(embeds.len(), 1);
/// assert_eq!(embeds[0].title, "Rescan Summary");
/// assert_eq!(embeds[0].fields[0].value, "Found **1** items from **1** scanned files");
/// assert_eq!(embeds[0].fields[1].name, "📁 Movies");
/// ```
#[must_use]
pub fn build_messages(summary: &RunSummary, limits: &EmbedLimits) -> Vec<Embed> {
    let fields = SummaryFields::from_summary(summary);
    let timestamp = TimeDelta::from_std(summary.run_time)
        .ok()
        .and_then(|elapsed| summary.started_at.checked_add_signed(elapsed))
        .unwrap_or(summary.started_at);
    let footer = format!("Run Time: {}", summary.format_run_time());

    let mut head = Embed::new(SUMMARY_TITLE, COLOR_BLUE)
        .with_timestamp(timestamp)
        .with_footer(footer);
    head.push_field(fields.overview);

    // Single message when everything fits.
    let mut whole = head.clone();
    whole.fields.extend(fields.issues.iter().cloned());
    whole.fields.extend(fields.libraries.iter().cloned());
    whole.fields.extend(fields.other_issues.iter().cloned());
    if limits.admits(&whole) {
        return vec![whole];
    }

    let mut pending_issues = Vec::new();
    if let Some(issues) = fields.issues {
        if limits.fits(&head, &issues) {
            head.push_field(issues);
        } else {
            pending_issues.push(issues);
        }
    }

    let mut messages = vec![head];

    let mut current = Embed::new(DETAILS_TITLE, COLOR_BLUE).with_timestamp(timestamp);
    for field in fields.libraries.into_iter().chain(fields.other_issues) {
        if current.field_count() > 0 && !limits.fits(&current, &field) {
            messages.push(current);
            current = Embed::new(DETAILS_CONTINUED_TITLE, COLOR_BLUE).with_timestamp(timestamp);
        }
        current.push_field(field);
    }
    if current.field_count() > 0 {
        messages.push(current);
    }

    if !pending_issues.is_empty() {
        let mut issues = Embed::new(ISSUES_TITLE, COLOR_RED).with_timestamp(timestamp);
        issues.fields = pending_issues;
        messages.push(issues);
    }

    messages
}
