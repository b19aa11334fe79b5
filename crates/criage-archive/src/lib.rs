//! Package archive handling for the criage package manager.
//!
//! `criage-archive` packs a package source directory into a compressed
//! archive with an embedded metadata record, extracts archives safely into a
//! destination directory, and reads the metadata back out. Five formats are
//! supported: `tar.zst` (the default), `tar.lz4`, `tar.xz`, `tar.gz` and
//! `zip`.
//!
//! Every entry name read from an archive is sanitized before anything is
//! written for it; an entry that would land outside the destination aborts
//! the extraction with [`ArchiveError::PathTraversal`].
//!
//! # Examples
//!
//! ```no_run
//! use criage_archive::ArchiveFormat;
//! use criage_archive::ArchiveManager;
//! use criage_archive::ManagerConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ArchiveManager::new(ManagerConfig::new("1.0.0"))?;
//! let format = manager.detect_format("pkg-1.0.0.tar.zst");
//! let metadata = manager.extract_metadata_from_archive("pkg-1.0.0.tar.zst", format)?;
//! println!("built by {} {}", metadata.created_by, metadata.version);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod creation;
pub mod error;
mod extraction;
pub mod formats;
pub mod manager;
pub mod metadata;
pub mod report;
#[doc(hidden)]
pub mod test_utils;
pub mod types;

pub use config::CompressionLevel;
pub use config::ManagerConfig;
pub use creation::InclusionFilter;
pub use error::ArchiveError;
pub use error::Result;
pub use formats::ArchiveFormat;
pub use formats::Detection;
pub use manager::ArchiveManager;
pub use manager::MetadataSource;
pub use metadata::BuildManifest;
pub use metadata::BuildTarget;
pub use metadata::CompressionSettings;
pub use metadata::MANIFEST_FILE_NAME;
pub use metadata::METADATA_ENTRY_NAME;
pub use metadata::PackageHooks;
pub use metadata::PackageManifest;
pub use metadata::PackageMetadata;
pub use report::CreationReport;
pub use report::ExtractionReport;
pub use types::DestDir;
pub use types::SafePath;
