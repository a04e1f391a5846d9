//! Domain types shared across the rescan workspace.
//!
//! - [`library`] - Library sections, identifiers and ownership matches
//! - [`media`] - Items, media versions and parts as listed by the index
//!
//! All public types are re-exported at the crate root:
//!
//! ```
//! use rescan_core::{LibraryDescriptor, LibraryKind, MediaItem};
//! ```

mod library;
mod media;

pub use library::{LibraryDescriptor, LibraryId, LibraryKind, LibraryMatch};
pub use media::{Media, MediaItem, MediaPart};
