//! Archive creation from a source directory.
//!
//! Both container families share the same entry order: the metadata entry
//! first, then the filtered depth-first walk of the source tree.

pub mod filters;
pub(crate) mod tar;
pub mod walker;
pub(crate) mod zip;

use std::fs;
use std::path::Path;
use std::time::UNIX_EPOCH;

use log::debug;
use log::warn;

use crate::CreationReport;
use crate::metadata::METADATA_ENTRY_NAME;
pub use filters::InclusionFilter;
use walker::EntryKind;
use walker::WalkEntry;

/// Copy buffer size for streaming file bodies.
pub(crate) const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Mode recorded for the metadata entry.
pub(crate) const METADATA_MODE: u32 = 0o644;

/// Inputs shared by the tar and zip writers.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CreateRequest<'a> {
    pub source: &'a Path,
    pub output: &'a Path,
    /// Absolute location of the output, kept out of its own archive when it
    /// lies inside the source tree.
    pub output_abs: Option<&'a Path>,
    pub filter: &'a InclusionFilter,
    pub metadata_json: &'a [u8],
    pub level: u8,
}

/// Permission bits to record for an entry.
#[cfg(unix)]
pub(crate) fn entry_mode(metadata: &fs::Metadata, _kind: EntryKind) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o7777
}

/// Permission bits to record for an entry.
#[cfg(not(unix))]
pub(crate) fn entry_mode(metadata: &fs::Metadata, kind: EntryKind) -> u32 {
    match (kind, metadata.permissions().readonly()) {
        (EntryKind::Directory, _) => 0o755,
        (_, true) => 0o444,
        (_, false) => 0o644,
    }
}

/// Modification time in whole seconds since the epoch, `0` if unknown.
pub(crate) fn entry_mtime(metadata: &fs::Metadata) -> u64 {
    metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map_or(0, |d| d.as_secs())
}

/// Decides whether a walked entry is written. Updates `report` for entries
/// that are passed over.
pub(crate) fn admit(
    entry: &WalkEntry,
    request: &CreateRequest<'_>,
    report: &mut CreationReport,
) -> bool {
    if request.output_abs == Some(entry.path.as_path()) {
        debug!("skipping the archive being written, {}", entry.relative);
        return false;
    }
    if entry.kind == EntryKind::Other {
        debug!("skipping special file {}", entry.relative);
        report.entries_skipped += 1;
        return false;
    }
    if entry.relative == METADATA_ENTRY_NAME {
        warn!(
            "source file {} collides with the reserved metadata entry, skipping it",
            entry.path.display()
        );
        report.entries_skipped += 1;
        report.add_warning(format!("skipped {METADATA_ENTRY_NAME} from source tree"));
        return false;
    }
    true
}
