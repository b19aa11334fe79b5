//! Archive extraction into a destination directory.
//!
//! Every entry name goes through [`SafePath::resolve`] before anything is
//! created for it. The first rejected name aborts the whole extraction;
//! entries written before it stay on disk.

pub(crate) mod tar;
pub(crate) mod zip;

use std::fs;
use std::fs::File;
use std::io;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;
use std::time::UNIX_EPOCH;

use log::debug;
use log::trace;

use crate::ArchiveError;
use crate::DestDir;
use crate::ExtractionReport;
use crate::Result;
use crate::SafePath;
use crate::creation::COPY_BUFFER_SIZE;

const DEFAULT_DIR_MODE: u32 = 0o755;
const DEFAULT_FILE_MODE: u32 = 0o644;

/// Whether stored directory modes are put back once extraction finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DirModes {
    /// Apply each directory entry's mode, deepest first.
    Restore,
    /// Leave directories owner-writable so the tree can be removed again.
    Skip,
}

/// Per-operation extraction state shared by the tar and zip readers.
pub(crate) struct Extractor<'a> {
    dest: &'a DestDir,
    dir_modes: DirModes,
    report: ExtractionReport,
    pending_dir_modes: Vec<(PathBuf, u32)>,
    buffer: Vec<u8>,
}

impl<'a> Extractor<'a> {
    pub(crate) fn new(dest: &'a DestDir, dir_modes: DirModes) -> Self {
        Self {
            dest,
            dir_modes,
            report: ExtractionReport::default(),
            pending_dir_modes: Vec::new(),
            buffer: vec![0u8; COPY_BUFFER_SIZE],
        }
    }

    /// Sanitizes an entry name. Must run before any side effect for it.
    pub(crate) fn resolve(&self, raw: &Path) -> Result<SafePath> {
        SafePath::resolve(raw, self.dest)
    }

    /// Materializes a directory entry. The stored mode is applied once all
    /// entries are written so a read-only directory cannot block its own
    /// children.
    pub(crate) fn directory(&mut self, target: &SafePath, mode: Option<u32>) -> Result<()> {
        if target.is_root() {
            trace!("directory entry for the destination root, nothing to do");
            return Ok(());
        }
        let path = target.as_path();
        fs::create_dir_all(path).map_err(|e| ArchiveError::write_failure(path, e))?;
        if self.dir_modes == DirModes::Restore {
            self.pending_dir_modes
                .push((path.to_path_buf(), mode.unwrap_or(DEFAULT_DIR_MODE)));
        }
        self.report.directories_created += 1;
        trace!("created {}", target.relative().display());
        Ok(())
    }

    /// Materializes a regular file entry from `reader`.
    pub(crate) fn file(
        &mut self,
        target: &SafePath,
        reader: &mut dyn Read,
        mode: Option<u32>,
        mtime: Option<u64>,
    ) -> Result<()> {
        if target.is_root() {
            return Err(ArchiveError::malformed(
                "regular file entry resolves to the destination root",
            ));
        }
        let path = target.as_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ArchiveError::write_failure(parent, e))?;
        }

        let mut file = File::create(path).map_err(|e| ArchiveError::write_failure(path, e))?;
        let written = self.copy(reader, &mut file, path)?;
        apply_file_attributes(&file, mode.unwrap_or(DEFAULT_FILE_MODE), mtime)
            .map_err(|e| ArchiveError::write_failure(path, e))?;

        self.report.files_extracted += 1;
        self.report.bytes_written += written;
        trace!("extracted {} ({written} bytes)", target.relative().display());
        Ok(())
    }

    /// Records an entry of a kind that is never materialized.
    pub(crate) fn skip(&mut self, raw: &Path, kind: &str) {
        debug!("skipping {kind} entry {}", raw.display());
        self.report.entries_skipped += 1;
    }

    /// Applies deferred directory modes, deepest first.
    pub(crate) fn finish(mut self) -> Result<ExtractionReport> {
        self.pending_dir_modes
            .sort_by_key(|(path, _)| std::cmp::Reverse(path.components().count()));
        for (path, mode) in &self.pending_dir_modes {
            set_dir_mode(path, *mode).map_err(|e| ArchiveError::write_failure(path, e))?;
        }
        Ok(self.report)
    }

    fn copy(&mut self, reader: &mut dyn Read, file: &mut File, path: &Path) -> Result<u64> {
        let mut copied = 0u64;
        loop {
            let n = match reader.read(&mut self.buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(ArchiveError::malformed(format!(
                        "cannot decode {}: {e}",
                        path.display()
                    )));
                }
            };
            file.write_all(&self.buffer[..n])
                .map_err(|e| ArchiveError::write_failure(path, e))?;
            copied += n as u64;
        }
        Ok(copied)
    }
}

#[cfg(unix)]
fn apply_file_attributes(file: &File, mode: u32, mtime: Option<u64>) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(mode & 0o7777))?;
    if let Some(secs) = mtime {
        file.set_modified(UNIX_EPOCH + Duration::from_secs(secs))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn apply_file_attributes(file: &File, mode: u32, mtime: Option<u64>) -> io::Result<()> {
    if mode & 0o200 == 0 {
        let mut permissions = file.metadata()?.permissions();
        permissions.set_readonly(true);
        file.set_permissions(permissions)?;
    }
    if let Some(secs) = mtime {
        file.set_modified(UNIX_EPOCH + Duration::from_secs(secs))?;
    }
    Ok(())
}

#[cfg(unix)]
fn set_dir_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode & 0o7777))
}

#[cfg(not(unix))]
fn set_dir_mode(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}

pub(crate) fn malformed_io(e: io::Error) -> ArchiveError {
    ArchiveError::malformed(e.to_string())
}

#[cfg(all(test, unix))]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn mode_of(path: &Path) -> u32 {
        fs::metadata(path).unwrap().permissions().mode() & 0o777
    }

    fn extract_read_only_tree(dest: &DestDir, dir_modes: DirModes) -> ExtractionReport {
        let mut extractor = Extractor::new(dest, dir_modes);
        let dir = extractor.resolve(Path::new("ro")).unwrap();
        extractor.directory(&dir, Some(0o555)).unwrap();
        let file = extractor.resolve(Path::new("ro/f.txt")).unwrap();
        extractor
            .file(&file, &mut &b"data"[..], Some(0o444), None)
            .unwrap();
        extractor.finish().unwrap()
    }

    #[test]
    fn test_restore_applies_directory_mode_after_children() {
        let temp = TempDir::new().unwrap();
        let dest = DestDir::create(temp.path().join("out")).unwrap();

        let report = extract_read_only_tree(&dest, DirModes::Restore);

        assert_eq!(report.files_extracted, 1);
        assert_eq!(report.directories_created, 1);
        let ro = dest.as_path().join("ro");
        assert_eq!(fs::read(ro.join("f.txt")).unwrap(), b"data");
        assert_eq!(mode_of(&ro), 0o555);

        fs::set_permissions(&ro, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    fn test_skip_keeps_directories_owner_writable() {
        let temp = TempDir::new().unwrap();
        let dest = DestDir::create(temp.path().join("scratch")).unwrap();

        let report = extract_read_only_tree(&dest, DirModes::Skip);

        assert_eq!(report.directories_created, 1);
        let ro = dest.as_path().join("ro");
        assert_eq!(mode_of(&ro) & 0o700, 0o700);
        fs::remove_dir_all(dest.as_path()).unwrap();
        assert!(!dest.as_path().exists());
    }
}
