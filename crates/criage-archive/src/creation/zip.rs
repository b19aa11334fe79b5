//! ZIP container writer.

use std::fs::File;
use std::io;
use std::io::BufWriter;
use std::io::Read;
use std::io::Seek;
use std::io::Write;

use log::trace;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;

use super::COPY_BUFFER_SIZE;
use super::CreateRequest;
use super::METADATA_MODE;
use super::admit;
use super::entry_mode;
use super::walker::EntryKind;
use super::walker::FilteredWalker;
use super::walker::WalkEntry;
use crate::ArchiveError;
use crate::ArchiveFormat;
use crate::CreationReport;
use crate::Result;
use crate::formats::compression::level_to_deflate;
use crate::metadata::METADATA_ENTRY_NAME;

/// Writes `request.source` as a ZIP archive with deflated entries.
pub(crate) fn create_zip(request: &CreateRequest<'_>) -> Result<CreationReport> {
    let output = request.output;
    let write_failure = |e: ZipError| ArchiveError::write_failure(output, zip_io_error(e));

    let file = File::create(output).map_err(|e| ArchiveError::write_failure(output, e))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(level_to_deflate(request.level)));

    let mut report = CreationReport::new(ArchiveFormat::Zip);

    zip.start_file(METADATA_ENTRY_NAME, options.unix_permissions(METADATA_MODE))
        .map_err(write_failure)?;
    zip.write_all(request.metadata_json)
        .map_err(|e| ArchiveError::write_failure(output, e))?;

    let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
    let mut walker = FilteredWalker::new(request.source, request.filter);
    for entry in walker.by_ref() {
        let entry = entry?;
        if !admit(&entry, request, &mut report) {
            continue;
        }
        let name = entry.utf8_name()?;
        let entry_options = options.unix_permissions(entry_mode(&entry.metadata, entry.kind));
        match entry.kind {
            EntryKind::Directory => {
                zip.add_directory(format!("{name}/"), entry_options)
                    .map_err(write_failure)?;
                report.directories_added += 1;
            }
            EntryKind::File => {
                zip.start_file(name, entry_options)
                    .map_err(write_failure)?;
                report.bytes_read += copy_file(&mut zip, &entry, &mut buffer, request)?;
                report.files_added += 1;
            }
            EntryKind::Other => {}
        }
        trace!("added {}", entry.relative);
    }
    report.entries_excluded = walker.excluded();

    zip.finish()
        .map_err(write_failure)?
        .into_inner()
        .map_err(|e| ArchiveError::write_failure(output, e.into_error()))?;
    Ok(report)
}

fn copy_file<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    entry: &WalkEntry,
    buffer: &mut [u8],
    request: &CreateRequest<'_>,
) -> Result<u64> {
    let mut file =
        File::open(&entry.path).map_err(|e| ArchiveError::unreadable(&entry.path, e))?;
    let mut copied = 0u64;
    loop {
        let n = match file.read(buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(ArchiveError::unreadable(&entry.path, e)),
        };
        zip.write_all(&buffer[..n])
            .map_err(|e| ArchiveError::write_failure(request.output, e))?;
        copied += n as u64;
    }
    Ok(copied)
}

pub(crate) fn zip_io_error(e: ZipError) -> io::Error {
    match e {
        ZipError::Io(io) => io,
        other => io::Error::other(other),
    }
}
