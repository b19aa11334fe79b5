//! Subcommand implementations.

pub mod completion;
pub mod detect;
pub mod metadata;
pub mod pack;
pub mod unpack;

use criage_archive::ArchiveFormat;
use criage_archive::formats::detect_format;
use std::path::Path;

/// Format named on the command line, or detected from the archive itself.
fn resolve_format(explicit: Option<ArchiveFormat>, archive: &Path) -> ArchiveFormat {
    explicit.unwrap_or_else(|| detect_format(archive))
}
