//! Tar stream writer for the compressed tar formats.

use std::fs::File;
use std::io;
use std::io::BufWriter;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use log::trace;
use tar::Builder;
use tar::EntryType;
use tar::Header;

use super::CreateRequest;
use super::METADATA_MODE;
use super::admit;
use super::entry_mode;
use super::entry_mtime;
use super::walker::EntryKind;
use super::walker::FilteredWalker;
use super::walker::WalkEntry;
use crate::ArchiveError;
use crate::ArchiveFormat;
use crate::CreationReport;
use crate::Result;
use crate::formats::compression::CodecPool;
use crate::metadata::METADATA_ENTRY_NAME;

/// Writes `request.source` as a tar stream compressed with `format`'s codec.
pub(crate) fn create_tar(
    pool: &CodecPool,
    format: ArchiveFormat,
    request: &CreateRequest<'_>,
) -> Result<CreationReport> {
    let output = request.output;
    let file = File::create(output).map_err(|e| ArchiveError::write_failure(output, e))?;

    let (report, writer) = pool.encode(
        format.codec(),
        request.level,
        output,
        BufWriter::new(file),
        |stream| {
            let mut builder = Builder::new(stream);
            let report = append_all(&mut builder, format, request)?;
            builder
                .finish()
                .map_err(|e| ArchiveError::write_failure(output, e))?;
            Ok(report)
        },
    )?;

    writer
        .into_inner()
        .map_err(|e| ArchiveError::write_failure(output, e.into_error()))?;
    Ok(report)
}

fn append_all<W: Write>(
    builder: &mut Builder<W>,
    format: ArchiveFormat,
    request: &CreateRequest<'_>,
) -> Result<CreationReport> {
    let output = request.output;
    let mut report = CreationReport::new(format);

    append_metadata(builder, request.metadata_json)
        .map_err(|e| ArchiveError::write_failure(output, e))?;

    let mut walker = FilteredWalker::new(request.source, request.filter);
    for entry in walker.by_ref() {
        let entry = entry?;
        if !admit(&entry, request, &mut report) {
            continue;
        }
        match entry.kind {
            EntryKind::Directory => {
                append_directory(builder, &entry)
                    .map_err(|e| ArchiveError::write_failure(output, e))?;
                report.directories_added += 1;
            }
            EntryKind::File => {
                report.bytes_read += append_file(builder, &entry, request)?;
                report.files_added += 1;
            }
            EntryKind::Other => {}
        }
        trace!("added {}", entry.relative);
    }
    report.entries_excluded = walker.excluded();
    Ok(report)
}

fn append_metadata<W: Write>(builder: &mut Builder<W>, json: &[u8]) -> io::Result<()> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs());

    let mut header = Header::new_gnu();
    header.set_entry_type(EntryType::Regular);
    header.set_size(json.len() as u64);
    header.set_mode(METADATA_MODE);
    header.set_mtime(now);
    builder.append_data(&mut header, METADATA_ENTRY_NAME, json)
}

fn append_directory<W: Write>(builder: &mut Builder<W>, entry: &WalkEntry) -> io::Result<()> {
    let mut header = Header::new_gnu();
    header.set_entry_type(EntryType::Directory);
    header.set_size(0);
    header.set_mode(entry_mode(&entry.metadata, entry.kind));
    header.set_mtime(entry_mtime(&entry.metadata));
    builder.append_data(&mut header, &entry.relative_path, io::empty())
}

fn append_file<W: Write>(
    builder: &mut Builder<W>,
    entry: &WalkEntry,
    request: &CreateRequest<'_>,
) -> Result<u64> {
    let file = File::open(&entry.path).map_err(|e| ArchiveError::unreadable(&entry.path, e))?;
    let size = entry.metadata.len();

    let mut header = Header::new_gnu();
    header.set_entry_type(EntryType::Regular);
    header.set_size(size);
    header.set_mode(entry_mode(&entry.metadata, entry.kind));
    header.set_mtime(entry_mtime(&entry.metadata));

    let mut source = SourceReader::new(file, size);
    let appended = builder.append_data(&mut header, &entry.relative_path, &mut source);
    source.read_failure(&entry.path)?;
    appended.map_err(|e| ArchiveError::write_failure(request.output, e))?;
    source.ensure_complete(&entry.path)?;
    Ok(size)
}

/// Reads at most `expected` bytes of a source file and remembers why a read
/// stopped, so a failing or shrinking source is not reported as an output
/// write failure.
struct SourceReader<R> {
    inner: io::Take<R>,
    expected: u64,
    read: u64,
    error: Option<io::Error>,
}

impl<R: Read> SourceReader<R> {
    fn new(inner: R, expected: u64) -> Self {
        Self {
            inner: inner.take(expected),
            expected,
            read: 0,
            error: None,
        }
    }

    /// Fails with `UnreadableSource` if a read of the source failed.
    fn read_failure(&mut self, path: &Path) -> Result<()> {
        match self.error.take() {
            Some(e) => Err(ArchiveError::unreadable(path, e)),
            None => Ok(()),
        }
    }

    /// Fails with `UnreadableSource` if fewer bytes than recorded in the
    /// header were available.
    fn ensure_complete(&self, path: &Path) -> Result<()> {
        if self.read < self.expected {
            return Err(ArchiveError::unreadable(
                path,
                io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("file shrank to {} of {} bytes while packing", self.read, self.expected),
                ),
            ));
        }
        Ok(())
    }
}

impl<R: Read> Read for SourceReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.inner.read(buf) {
            Ok(n) => {
                self.read += n as u64;
                Ok(n)
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Err(e),
            Err(e) => {
                let reported = io::Error::new(e.kind(), e.to_string());
                self.error = Some(e);
                Err(reported)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        }
    }

    fn regular_header(size: u64) -> Header {
        let mut header = Header::new_gnu();
        header.set_entry_type(EntryType::Regular);
        header.set_size(size);
        header.set_mode(0o644);
        header
    }

    #[test]
    fn test_source_read_error_is_unreadable_source() {
        let mut builder = Builder::new(Vec::new());
        let mut source = SourceReader::new(FailingReader, 10);
        let appended = builder.append_data(&mut regular_header(10), "f.txt", &mut source);

        assert!(appended.is_err());
        let err = source.read_failure(Path::new("/src/f.txt")).unwrap_err();
        match err {
            ArchiveError::UnreadableSource { path, source: cause } => {
                assert_eq!(path, Path::new("/src/f.txt"));
                assert_eq!(cause.kind(), io::ErrorKind::PermissionDenied);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_shrunk_source_is_unreadable_source() {
        let mut builder = Builder::new(Vec::new());
        let mut source = SourceReader::new(&b"abc"[..], 10);
        let _ = builder.append_data(&mut regular_header(10), "f.txt", &mut source);

        assert!(source.read_failure(Path::new("f.txt")).is_ok());
        let err = source.ensure_complete(Path::new("f.txt")).unwrap_err();
        assert!(matches!(err, ArchiveError::UnreadableSource { .. }));
    }

    #[test]
    fn test_complete_source_passes_check() {
        let mut builder = Builder::new(Vec::new());
        let mut source = SourceReader::new(&b"0123456789extra"[..], 10);
        builder
            .append_data(&mut regular_header(10), "f.txt", &mut source)
            .unwrap();
        assert!(source.read_failure(Path::new("f.txt")).is_ok());
        assert!(source.ensure_complete(Path::new("f.txt")).is_ok());
        assert_eq!(source.read, 10);
    }
}
