//! Media item types returned by the index.
//!
//! The index models a file on disk as `item → media → part → file`. Movies
//! are items directly; for TV libraries the items are shows and the files
//! hang off their episodes.

use serde::{Deserialize, Serialize};

/// A single file-backed part of a media version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaPart {
    /// Absolute path of the file, when the index knows one.
    #[serde(default)]
    pub file: Option<String>,
}

/// One version of an item (an item may have several, e.g. 1080p and 4K).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    /// The parts making up this version.
    #[serde(default, rename = "Part")]
    pub parts: Vec<MediaPart>,
}

/// A movie, show, or episode.
///
/// # Examples
///
/// ```
/// use rescan_core::{Media, MediaItem, MediaPart};
///
/// let item = MediaItem {
///     rating_key: "10".to_owned(),
///     title: "Heat".to_owned(),
///     media: vec![Media {
///         parts: vec![
///             MediaPart { file: Some("/media/movies/Heat.mkv".to_owned()) },
///             MediaPart { file: None },
///         ],
///     }],
/// };
///
/// let files: Vec<_> = item.file_paths().collect();
/// assert_eq!(files, ["/media/movies/Heat.mkv"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    /// Index key used to fetch children (episodes of a show).
    #[serde(default, rename = "ratingKey")]
    pub rating_key: String,
    /// Display title.
    #[serde(default)]
    pub title: String,
    /// Media versions of this item.
    #[serde(default, rename = "Media")]
    pub media: Vec<Media>,
}

impl MediaItem {
    /// Iterates over every resolvable file path of every part.
    ///
    /// Parts without a file are skipped.
    pub fn file_paths(&self) -> impl Iterator<Item = &str> {
        self.media
            .iter()
            .flat_map(|media| media.parts.iter())
            .filter_map(|part| part.file.as_deref())
    }
}
