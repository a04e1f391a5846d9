//! Plex JSON response shapes.
//!
//! Every Plex endpoint wraps its payload in a `MediaContainer` object. Only
//! the fields the scanner uses are modelled; everything else is ignored.

use rescan_core::{LibraryDescriptor, LibraryKind, MediaItem};
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// The outer `{"MediaContainer": ...}` wrapper.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(rename = "MediaContainer")]
    media_container: T,
}

/// Payload of `/library/sections`.
#[derive(Debug, Default, Deserialize)]
struct SectionsContainer {
    #[serde(default, rename = "Directory")]
    directories: Vec<Section>,
}

#[derive(Debug, Deserialize)]
struct Section {
    key: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    title: String,
    #[serde(default, rename = "Location")]
    locations: Vec<Location>,
}

#[derive(Debug, Deserialize)]
struct Location {
    path: String,
}

/// Payload of item listings (`/all`, `/allLeaves`).
#[derive(Debug, Default, Deserialize)]
struct MetadataContainer {
    #[serde(default, rename = "Metadata")]
    metadata: Vec<MediaItem>,
}

/// Server details from `/identity`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerIdentity {
    /// Unique server identifier.
    #[serde(default, rename = "machineIdentifier")]
    pub machine_identifier: String,
    /// Server version string.
    #[serde(default)]
    pub version: String,
    /// Human-readable server name, when reported.
    #[serde(default, rename = "friendlyName")]
    pub friendly_name: Option<String>,
}

impl ServerIdentity {
    /// The best available display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.friendly_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.machine_identifier)
    }
}

fn unwrap_container<T: DeserializeOwned>(body: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str::<Envelope<T>>(body).map(|envelope| envelope.media_container)
}

/// Decodes a `/library/sections` body into library descriptors.
pub(crate) fn decode_sections(body: &str) -> Result<Vec<LibraryDescriptor>, serde_json::Error> {
    let container: SectionsContainer = unwrap_container(body)?;

    Ok(container
        .directories
        .into_iter()
        .map(|section| {
            section.locations.into_iter().fold(
                LibraryDescriptor::new(
                    section.key,
                    LibraryKind::from_type(&section.kind),
                    section.title,
                ),
                |library, location| library.with_location(location.path),
            )
        })
        .collect())
}

/// Decodes an item listing body.
pub(crate) fn decode_items(body: &str) -> Result<Vec<MediaItem>, serde_json::Error> {
    unwrap_container::<MetadataContainer>(body).map(|container| container.metadata)
}

/// Decodes an `/identity` body.
pub(crate) fn decode_identity(body: &str) -> Result<ServerIdentity, serde_json::Error> {
    unwrap_container(body)
}
