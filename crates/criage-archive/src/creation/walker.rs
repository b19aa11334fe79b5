//! Filtered source tree traversal.

use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use log::trace;
use walkdir::WalkDir;

use crate::ArchiveError;
use crate::Result;
use crate::creation::filters::InclusionFilter;

/// Kind of a visited filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symlink, socket, device or FIFO. Never archived.
    Other,
}

/// A surviving entry of the source tree.
#[derive(Debug, Clone)]
pub struct WalkEntry {
    /// Location on disk.
    pub path: PathBuf,
    /// Exact path relative to the walk root.
    pub relative_path: PathBuf,
    /// `relative_path` with `/` separators, lossily converted to UTF-8.
    /// Used for pattern matching and logging.
    pub relative: String,
    /// Entry kind, symlinks not followed.
    pub kind: EntryKind,
    /// Metadata of the entry itself.
    pub metadata: fs::Metadata,
}

/// Depth-first walk in lexical order that applies an [`InclusionFilter`].
///
/// The root itself is never yielded. An excluded directory is pruned
/// without descending into it.
pub struct FilteredWalker<'a> {
    root: PathBuf,
    inner: walkdir::IntoIter,
    filter: &'a InclusionFilter,
    excluded: usize,
}

impl<'a> FilteredWalker<'a> {
    /// Prepares a walk of `root`.
    pub fn new(root: &Path, filter: &'a InclusionFilter) -> Self {
        let inner = WalkDir::new(root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();
        Self {
            root: root.to_path_buf(),
            inner,
            filter,
            excluded: 0,
        }
    }

    /// Number of entries dropped by the filter so far. A pruned directory
    /// counts once.
    pub fn excluded(&self) -> usize {
        self.excluded
    }
}

impl Iterator for FilteredWalker<'_> {
    type Item = Result<WalkEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().unwrap_or(&self.root).to_path_buf();
                    return Some(Err(ArchiveError::unreadable(path, e.into())));
                }
            };

            let exact = entry
                .path()
                .strip_prefix(&self.root)
                .unwrap_or_else(|_| entry.path())
                .to_path_buf();
            let relative = relative_path(&self.root, entry.path());
            let file_type = entry.file_type();

            if self.filter.should_exclude(&relative) {
                trace!("excluded {relative}");
                self.excluded += 1;
                if file_type.is_dir() {
                    self.inner.skip_current_dir();
                }
                continue;
            }

            let kind = if file_type.is_dir() {
                EntryKind::Directory
            } else if file_type.is_file() {
                EntryKind::File
            } else {
                EntryKind::Other
            };

            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(e) => return Some(Err(ArchiveError::unreadable(entry.path(), e.into()))),
            };

            return Some(Ok(WalkEntry {
                path: entry.into_path(),
                relative_path: exact,
                relative,
                kind,
                metadata,
            }));
        }
    }
}

impl WalkEntry {
    /// The relative name as UTF-8 with `/` separators.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::UnreadableSource`] when the name is not valid
    /// UTF-8 and so cannot be stored without renaming it.
    pub fn utf8_name(&self) -> Result<&str> {
        if self.relative_path.to_str().is_some() {
            Ok(&self.relative)
        } else {
            Err(ArchiveError::unreadable(
                &self.path,
                io::Error::new(io::ErrorKind::InvalidData, "file name is not valid UTF-8"),
            ))
        }
    }
}

/// Joins the components of `path` below `root` with `/`.
pub(crate) fn relative_path(root: &Path, path: &Path) -> String {
    let stripped = path.strip_prefix(root).unwrap_or(path);
    stripped
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
