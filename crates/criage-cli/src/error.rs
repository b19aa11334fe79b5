//! Error conversion utilities for CLI.
//!
//! Converts criage-archive's typed errors (thiserror) into user-facing
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use criage_archive::ArchiveError;
use criage_archive::ArchiveFormat;
use std::path::Path;

/// Converts `ArchiveError` to a user-facing anyhow error mentioning `subject`
pub fn convert_archive_error(err: ArchiveError, subject: &Path) -> anyhow::Error {
    match err {
        ArchiveError::PathTraversal { path } => {
            anyhow!(
                "Security violation: Archive '{}' attempted path traversal with '{}'\n\
                 HINT: This archive may be malicious. Do not unpack it from untrusted sources.",
                subject.display(),
                path.display()
            )
        }
        ArchiveError::MalformedContainer { reason } => {
            anyhow!(
                "Invalid archive '{}': {}\n\
                 HINT: The archive may be corrupted, truncated, or in a different format. \
                 Try --format.",
                subject.display(),
                reason
            )
        }
        ArchiveError::UnsupportedFormat { format } => {
            let known: Vec<&str> = ArchiveFormat::all().map(ArchiveFormat::label).collect();
            anyhow!(
                "Archive format not supported: {format}\n\
                 HINT: Supported formats: {}",
                known.join(", ")
            )
        }
        ArchiveError::MetadataMissing => {
            anyhow!(
                "No package metadata in '{}'\n\
                 HINT: The archive was not packed by criage and has no criage.yaml at its root.",
                subject.display()
            )
        }
        ArchiveError::MetadataCorrupt { source } => {
            anyhow!(
                "Corrupt package metadata in '{}': {}",
                subject.display(),
                source
            )
        }
        ArchiveError::InvalidPattern { pattern, reason } => {
            anyhow!(
                "Invalid pattern '{pattern}': {reason}\n\
                 HINT: Patterns use shell glob syntax (*, ?, [abc]) against the path \
                 relative to the source directory."
            )
        }
        ArchiveError::UnreadableSource { path, source } => {
            anyhow!("Cannot read '{}': {}", path.display(), source)
        }
        ArchiveError::WriteFailure { path, source } => {
            anyhow!("Cannot write '{}': {}", path.display(), source)
        }
        _ => anyhow::Error::from(err).context(format!("Error processing '{}'", subject.display())),
    }
}

/// Adds context to a library result about `subject`
pub fn add_archive_context<T>(
    result: Result<T, ArchiveError>,
    subject: &Path,
) -> anyhow::Result<T> {
    result.map_err(|e| convert_archive_error(e, subject))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn test_convert_path_traversal_error() {
        let err = ArchiveError::PathTraversal {
            path: PathBuf::from("../../../etc/passwd"),
        };
        let converted = convert_archive_error(err, Path::new("malicious.tar.gz"));
        let msg = format!("{converted:?}");
        assert!(msg.contains("path traversal"));
        assert!(msg.contains("malicious.tar.gz"));
        assert!(msg.contains("HINT"));
    }

    #[test]
    fn test_convert_metadata_missing() {
        let converted = convert_archive_error(ArchiveError::MetadataMissing, Path::new("a.zip"));
        let msg = format!("{converted:?}");
        assert!(msg.contains("No package metadata"));
        assert!(msg.contains("criage.yaml"));
    }

    #[test]
    fn test_convert_unsupported_format_lists_labels() {
        let err = ArchiveError::UnsupportedFormat {
            format: "rar".into(),
        };
        let msg = format!("{:?}", convert_archive_error(err, Path::new("x.rar")));
        assert!(msg.contains("tar.zst"));
        assert!(msg.contains("zip"));
    }

    #[test]
    fn test_convert_io_error_keeps_context() {
        let err = ArchiveError::Io(io::Error::new(io::ErrorKind::NotFound, "gone"));
        let msg = format!("{:?}", convert_archive_error(err, Path::new("pkg.tar.xz")));
        assert!(msg.contains("pkg.tar.xz"));
        assert!(msg.contains("gone"));
    }
}
