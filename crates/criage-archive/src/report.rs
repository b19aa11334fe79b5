//! Operation reports.

use std::time::Duration;

use crate::ArchiveFormat;

/// Summary of an archive creation.
#[derive(Debug, Clone, Default)]
pub struct CreationReport {
    /// Format that was written.
    pub format: ArchiveFormat,
    /// Regular files added, the metadata entry excluded.
    pub files_added: usize,
    /// Directory entries added.
    pub directories_added: usize,
    /// Entries dropped by the inclusion filter. A pruned directory counts once.
    pub entries_excluded: usize,
    /// Symlinks, special files and reserved-name collisions left out.
    pub entries_skipped: usize,
    /// Uncompressed bytes of file content read from the source tree.
    pub bytes_read: u64,
    /// Size of the finished archive on disk.
    pub archive_size: u64,
    /// Wall-clock time spent.
    pub duration: Duration,
    /// Non-fatal problems worth showing to a user.
    pub warnings: Vec<String>,
}

impl CreationReport {
    /// Creates an empty report for `format`.
    #[must_use]
    pub fn new(format: ArchiveFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    /// Records a warning.
    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    /// Uncompressed to compressed size ratio, `0.0` when either is zero.
    #[must_use]
    pub fn compression_ratio(&self) -> f64 {
        if self.bytes_read == 0 || self.archive_size == 0 {
            return 0.0;
        }
        self.bytes_read as f64 / self.archive_size as f64
    }

    /// Files plus directories written.
    #[must_use]
    pub fn total_items(&self) -> usize {
        self.files_added + self.directories_added
    }
}

/// Summary of an archive extraction.
#[derive(Debug, Clone, Default)]
pub struct ExtractionReport {
    /// Regular files written.
    pub files_extracted: usize,
    /// Directory entries materialized.
    pub directories_created: usize,
    /// Entries of unsupported kinds that were ignored.
    pub entries_skipped: usize,
    /// Bytes of file content written.
    pub bytes_written: u64,
    /// Wall-clock time spent.
    pub duration: Duration,
}

impl ExtractionReport {
    /// Files plus directories materialized.
    #[must_use]
    pub fn total_items(&self) -> usize {
        self.files_extracted + self.directories_created
    }
}
