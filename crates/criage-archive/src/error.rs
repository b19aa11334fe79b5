//! Error types for archive operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `ArchiveError`.
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Errors that can occur while creating, extracting or inspecting archives.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// A source file or archive could not be opened or read.
    #[error("cannot read {path}: {source}")]
    UnreadableSource {
        /// The path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An output file or directory could not be created or written.
    #[error("cannot write {path}: {source}")]
    WriteFailure {
        /// The path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The requested format tag is not one of the supported formats.
    #[error("unsupported archive format: {format}")]
    UnsupportedFormat {
        /// The rejected format label.
        format: String,
    },

    /// An entry name would resolve outside the destination directory.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The offending entry name.
        path: PathBuf,
    },

    /// The archive or its compression stream is malformed.
    #[error("malformed archive: {reason}")]
    MalformedContainer {
        /// What went wrong while decoding.
        reason: String,
    },

    /// Neither the metadata entry nor the package manifest was found.
    #[error("archive contains no package metadata")]
    MetadataMissing,

    /// The metadata entry exists but is not a valid metadata document.
    #[error("corrupt package metadata: {source}")]
    MetadataCorrupt {
        /// Underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// An inclusion or exclusion pattern could not be compiled.
    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern {
        /// The pattern as supplied.
        pattern: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Compression level outside the 1-9 scale.
    #[error("invalid compression level {level}, must be 1-9")]
    InvalidCompressionLevel {
        /// The rejected level.
        level: u8,
    },

    /// I/O failure not tied to a particular source or destination.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ArchiveError {
    pub(crate) fn unreadable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::UnreadableSource {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write_failure(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::WriteFailure {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedContainer {
            reason: reason.into(),
        }
    }

    /// Returns `true` if this error represents a security violation.
    ///
    /// Only path traversal counts: an archive that tries to write outside
    /// its destination is hostile rather than merely broken.
    ///
    /// # Examples
    ///
    /// ```
    /// use criage_archive::ArchiveError;
    /// use std::path::PathBuf;
    ///
    /// let err = ArchiveError::PathTraversal {
    ///     path: PathBuf::from("../etc/passwd"),
    /// };
    /// assert!(err.is_security_violation());
    ///
    /// let err = ArchiveError::MetadataMissing;
    /// assert!(!err.is_security_violation());
    /// ```
    #[must_use]
    pub const fn is_security_violation(&self) -> bool {
        matches!(self, Self::PathTraversal { .. })
    }

    /// Returns `true` if the error was caused by the archive contents rather
    /// than by the local filesystem.
    #[must_use]
    pub const fn is_corrupt_input(&self) -> bool {
        matches!(
            self,
            Self::MalformedContainer { .. } | Self::MetadataCorrupt { .. } | Self::PathTraversal { .. }
        )
    }

    /// Returns a context string for this error, if available.
    ///
    /// # Examples
    ///
    /// ```
    /// use criage_archive::ArchiveError;
    ///
    /// let err = ArchiveError::MalformedContainer {
    ///     reason: "truncated header".to_string(),
    /// };
    /// assert_eq!(err.context(), Some("truncated header"));
    ///
    /// assert_eq!(ArchiveError::MetadataMissing.context(), None);
    /// ```
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        match self {
            Self::MalformedContainer { reason } | Self::InvalidPattern { reason, .. } => {
                Some(reason)
            }
            Self::UnsupportedFormat { format } => Some(format),
            _ => None,
        }
    }

    /// Returns the filesystem path this error refers to, if any.
    #[must_use]
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::UnreadableSource { path, .. }
            | Self::WriteFailure { path, .. }
            | Self::PathTraversal { path } => Some(path),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let err = ArchiveError::MetadataMissing;
        assert_eq!(err.to_string(), "archive contains no package metadata");

        let err = ArchiveError::UnsupportedFormat {
            format: "rar".into(),
        };
        assert_eq!(err.to_string(), "unsupported archive format: rar");
    }

    #[test]
    fn test_path_traversal_error() {
        let err = ArchiveError::PathTraversal {
            path: PathBuf::from("../etc/passwd"),
        };
        assert!(err.to_string().contains("path traversal"));
        assert!(err.to_string().contains("../etc/passwd"));
        assert!(err.is_security_violation());
        assert!(err.is_corrupt_input());
        assert_eq!(err.path(), Some(std::path::Path::new("../etc/passwd")));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ArchiveError = io_err.into();
        assert!(matches!(err, ArchiveError::Io(_)));
        assert!(!err.is_security_violation());
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: ArchiveError = json_err.into();
        assert!(matches!(err, ArchiveError::MetadataCorrupt { .. }));
        assert!(err.is_corrupt_input());
        assert!(err.source().is_some());
    }

    #[test]
    fn test_unreadable_source_keeps_chain() {
        let err = ArchiveError::unreadable(
            "pkg/a.txt",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("pkg/a.txt"));
        assert!(err.source().is_some());
        assert!(!err.is_corrupt_input());
    }

    #[test]
    fn test_context() {
        let err = ArchiveError::malformed("bad frame");
        assert_eq!(err.context(), Some("bad frame"));

        let err = ArchiveError::InvalidPattern {
            pattern: "[".into(),
            reason: "unclosed bracket".into(),
        };
        assert_eq!(err.context(), Some("unclosed bracket"));

        let err = ArchiveError::write_failure(
            "/out",
            std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        );
        assert_eq!(err.context(), None);
        assert_eq!(err.path(), Some(std::path::Path::new("/out")));
    }

    #[test]
    fn test_invalid_compression_level_display() {
        let err = ArchiveError::InvalidCompressionLevel { level: 12 };
        assert!(err.to_string().contains("12"));
        assert!(err.to_string().contains("1-9"));
    }
}
