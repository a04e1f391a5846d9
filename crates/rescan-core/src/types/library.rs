//! Library section types.
//!
//! A library is a named, typed collection in the media index (a Plex
//! "section"), backed by one or more root storage locations on disk.

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Opaque identifier of a library section (the Plex section key).
///
/// # Examples
///
/// ```
/// use rescan_core::LibraryId;
///
/// let id = LibraryId::new("2");
/// assert_eq!(id.as_str(), "2");
/// assert_eq!(id.to_string(), "2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LibraryId(String);

impl LibraryId {
    /// Creates a library identifier from its raw key.
    #[inline]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the raw key.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LibraryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LibraryId {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// The content type of a library section.
///
/// Only the distinction between episodic (`show`) and flat libraries matters
/// for file listing; everything that is neither a movie nor a show library
/// is kept verbatim in [`LibraryKind::Other`].
///
/// # Examples
///
/// ```
/// use rescan_core::LibraryKind;
///
/// assert_eq!(LibraryKind::from_type("show"), LibraryKind::Show);
/// assert!(LibraryKind::Show.is_episodic());
/// assert_eq!(LibraryKind::from_type("artist").as_str(), "artist");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LibraryKind {
    /// A movie library (flat items).
    Movie,
    /// A TV library (shows containing episodes).
    Show,
    /// Any other section type (music, photos, ...), listed as flat items.
    Other(String),
}

impl LibraryKind {
    /// Parses the index's section type string.
    pub fn from_type(raw: &str) -> Self {
        match raw {
            "movie" => Self::Movie,
            "show" => Self::Show,
            other => Self::Other(other.to_owned()),
        }
    }

    /// Returns the section type string as the index reports it.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Movie => "movie",
            Self::Show => "show",
            Self::Other(raw) => raw,
        }
    }

    /// Returns `true` for libraries whose files hang off episodes of shows.
    #[inline]
    #[must_use]
    pub const fn is_episodic(&self) -> bool {
        matches!(self, Self::Show)
    }
}

impl fmt::Display for LibraryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for LibraryKind {
    fn from(raw: String) -> Self {
        Self::from_type(&raw)
    }
}

impl From<LibraryKind> for String {
    fn from(kind: LibraryKind) -> Self {
        kind.as_str().to_owned()
    }
}

/// A library section as reported by the media index at run start.
///
/// Immutable for the duration of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryDescriptor {
    /// Section identifier.
    pub id: LibraryId,
    /// Section content type.
    pub kind: LibraryKind,
    /// Display title, used to group missing items in reports.
    pub title: String,
    /// Root storage locations (absolute paths). Most sections have one or two.
    pub locations: SmallVec<[Utf8PathBuf; 2]>,
}

impl LibraryDescriptor {
    /// Creates a descriptor without locations.
    pub fn new(id: impl Into<String>, kind: LibraryKind, title: impl Into<String>) -> Self {
        Self {
            id: LibraryId::new(id),
            kind,
            title: title.into(),
            locations: SmallVec::new(),
        }
    }

    /// Adds a root storage location.
    #[must_use]
    pub fn with_location(mut self, location: impl AsRef<Utf8Path>) -> Self {
        self.locations.push(location.as_ref().to_owned());
        self
    }
}

/// The owner of a path as resolved by the library registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryMatch {
    /// Owning library identifier.
    pub id: LibraryId,
    /// Owning library title.
    pub title: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_kind_roundtrip_strings() {
        assert_eq!(LibraryKind::from_type("movie"), LibraryKind::Movie);
        assert_eq!(LibraryKind::from_type("show"), LibraryKind::Show);
        assert_eq!(
            LibraryKind::from_type("photo"),
            LibraryKind::Other("photo".to_owned())
        );
        assert_eq!(LibraryKind::Other("photo".to_owned()).to_string(), "photo");
    }

    #[test]
    fn test_library_kind_is_episodic() {
        assert!(LibraryKind::Show.is_episodic());
        assert!(!LibraryKind::Movie.is_episodic());
        assert!(!LibraryKind::Other("artist".to_owned()).is_episodic());
    }

    #[test]
    fn test_library_kind_serde_as_plain_string() {
        let json = serde_json::to_string(&LibraryKind::Show).unwrap();
        assert_eq!(json, r#""show""#);
        let parsed: LibraryKind = serde_json::from_str(r#""artist""#).unwrap();
        assert_eq!(parsed, LibraryKind::Other("artist".to_owned()));
    }

    #[test]
    fn test_descriptor_builder() {
        let lib = LibraryDescriptor::new("1", LibraryKind::Movie, "Movies")
            .with_location("/media/movies")
            .with_location("/mnt/more-movies");

        assert_eq!(lib.id.as_str(), "1");
        assert_eq!(lib.title, "Movies");
        assert_eq!(lib.locations.len(), 2);
        assert_eq!(lib.locations[1], Utf8PathBuf::from("/mnt/more-movies"));
    }
}
