//! Tar stream reader for the compressed tar formats.

use std::fs::File;
use std::io::BufReader;

use tar::Archive;

use super::DirModes;
use super::Extractor;
use super::malformed_io;
use crate::ArchiveError;
use crate::ArchiveFormat;
use crate::DestDir;
use crate::ExtractionReport;
use crate::Result;
use crate::formats::compression::CodecPool;

/// Decodes the tar archive at `archive_path` into `dest`.
pub(crate) fn extract_tar(
    pool: &CodecPool,
    format: ArchiveFormat,
    archive_path: &std::path::Path,
    dest: &DestDir,
    dir_modes: DirModes,
) -> Result<ExtractionReport> {
    let file =
        File::open(archive_path).map_err(|e| ArchiveError::unreadable(archive_path, e))?;

    pool.decode(format.codec(), BufReader::new(file), |stream| {
        let mut archive = Archive::new(stream);
        let mut extractor = Extractor::new(dest, dir_modes);

        for entry in archive.entries().map_err(malformed_io)? {
            let mut entry = entry.map_err(malformed_io)?;
            let raw = entry.path().map_err(malformed_io)?.into_owned();
            let target = extractor.resolve(&raw)?;

            let header = entry.header();
            let entry_type = header.entry_type();
            let mode = header.mode().ok();
            let mtime = header.mtime().ok();

            if entry_type.is_dir() {
                extractor.directory(&target, mode)?;
            } else if entry_type.is_file() {
                extractor.file(&target, &mut entry, mode, mtime)?;
            } else {
                extractor.skip(&raw, &format!("{entry_type:?}"));
            }
        }

        extractor.finish()
    })
}
