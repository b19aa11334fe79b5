//! ZIP container reader.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::path::PathBuf;

use zip::ZipArchive;
use zip::result::ZipError;

use super::DirModes;
use super::Extractor;
use crate::ArchiveError;
use crate::DestDir;
use crate::ExtractionReport;
use crate::Result;

/// Enumerates the ZIP archive at `archive_path` into `dest`.
pub(crate) fn extract_zip(
    archive_path: &Path,
    dest: &DestDir,
    dir_modes: DirModes,
) -> Result<ExtractionReport> {
    let zip_error = |e: ZipError| match e {
        ZipError::Io(io) => ArchiveError::unreadable(archive_path, io),
        other => ArchiveError::malformed(other.to_string()),
    };

    let file =
        File::open(archive_path).map_err(|e| ArchiveError::unreadable(archive_path, e))?;
    let mut archive = ZipArchive::new(BufReader::new(file)).map_err(zip_error)?;
    let mut extractor = Extractor::new(dest, dir_modes);

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(zip_error)?;
        let raw = PathBuf::from(entry.name());
        let target = extractor.resolve(&raw)?;
        let mode = entry.unix_mode();

        if entry.is_dir() {
            extractor.directory(&target, mode)?;
        } else if entry.is_file() {
            extractor.file(&target, &mut entry, mode, None)?;
        } else {
            extractor.skip(&raw, "symlink");
        }
    }

    extractor.finish()
}
