//! Destination root for extraction.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use crate::ArchiveError;
use crate::Result;

/// An existing, canonicalized extraction root.
///
/// Every [`SafePath`](super::SafePath) is resolved against a `DestDir`, so
/// containment checks compare against a path with no `.`, `..` or symlink
/// components of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestDir(PathBuf);

impl DestDir {
    /// Creates `path` and any missing ancestors, then canonicalizes it.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use criage_archive::DestDir;
    ///
    /// let dest = DestDir::create("/tmp/criage-out")?;
    /// assert!(dest.as_path().is_absolute());
    /// # Ok::<(), criage_archive::ArchiveError>(())
    /// ```
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        fs::create_dir_all(path).map_err(|e| ArchiveError::write_failure(path, e))?;
        let canonical = path
            .canonicalize()
            .map_err(|e| ArchiveError::write_failure(path, e))?;
        Ok(Self(canonical))
    }

    /// Returns the canonical root.
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl AsRef<Path> for DestDir {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}
