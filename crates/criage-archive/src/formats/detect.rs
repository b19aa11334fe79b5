//! Archive format detection.
//!
//! Detection is advisory: an unknown name or unreadable header yields the
//! default format instead of an error, and the subsequent decode step reports
//! the mismatch if the guess was wrong.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::debug;
use log::warn;

use super::registry::ArchiveFormat;
use super::registry::FORMATS;
use super::registry::GENERIC_EXTENSION;
use super::registry::HEADER_WINDOW;

/// How a format was determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detection {
    /// Matched a canonical suffix; the file was not opened.
    Extension,
    /// Matched a magic signature in the leading bytes.
    Signature,
    /// Nothing matched; the default format was returned.
    Fallback,
}

/// Detects the archive format of `path`.
///
/// # Examples
///
/// ```
/// use criage_archive::ArchiveFormat;
/// use criage_archive::formats::detect_format;
///
/// assert_eq!(detect_format("pkg-1.0.TAR.GZ"), ArchiveFormat::TarGz);
/// assert_eq!(detect_format("unknown.bin"), ArchiveFormat::TarZst);
/// ```
pub fn detect_format<P: AsRef<Path>>(path: P) -> ArchiveFormat {
    detect_format_with_source(path).0
}

/// Detects the archive format of `path` and reports which rule matched.
pub fn detect_format_with_source<P: AsRef<Path>>(path: P) -> (ArchiveFormat, Detection) {
    let path = path.as_ref();

    if let Some(format) = format_from_extension(path) {
        return (format, Detection::Extension);
    }

    if path.to_string_lossy().to_ascii_lowercase().ends_with(GENERIC_EXTENSION)
        && let Some(format) = sniff_file(path)
    {
        debug!("sniffed {} as {format}", path.display());
        return (format, Detection::Signature);
    }

    let fallback = ArchiveFormat::default();
    warn!(
        "could not determine format of {}, assuming {fallback}",
        path.display()
    );
    (fallback, Detection::Fallback)
}

/// Looks up `path` by canonical suffix only. Never opens the file and never
/// logs.
///
/// # Examples
///
/// ```
/// use criage_archive::ArchiveFormat;
/// use criage_archive::formats::format_from_extension;
///
/// assert_eq!(format_from_extension("out/pkg.Zip"), Some(ArchiveFormat::Zip));
/// assert_eq!(format_from_extension("pkg.criage"), None);
/// ```
pub fn format_from_extension<P: AsRef<Path>>(path: P) -> Option<ArchiveFormat> {
    match_extension(&path.as_ref().to_string_lossy().to_ascii_lowercase())
}

/// Returns the format whose canonical suffix is the longest match for the
/// lowercased `name`.
fn match_extension(name: &str) -> Option<ArchiveFormat> {
    FORMATS
        .iter()
        .filter(|spec| name.ends_with(spec.extension))
        .max_by_key(|spec| spec.extension.len())
        .map(|spec| spec.format)
}

/// Matches `header` against the registered signatures in priority order.
///
/// # Examples
///
/// ```
/// use criage_archive::ArchiveFormat;
/// use criage_archive::formats::detect::detect_from_header;
///
/// assert_eq!(detect_from_header(&[0x1F, 0x8B, 0x08, 0x00]), Some(ArchiveFormat::TarGz));
/// assert_eq!(detect_from_header(b"plain text"), None);
/// ```
#[must_use]
pub fn detect_from_header(header: &[u8]) -> Option<ArchiveFormat> {
    FORMATS
        .iter()
        .find(|spec| spec.format.matches_header(header))
        .map(|spec| spec.format)
}

/// Reads at most [`HEADER_WINDOW`] bytes of `path` and matches them.
///
/// The file handle is dropped before this returns. Open or read failures
/// yield `None`.
pub fn sniff_file(path: &Path) -> Option<ArchiveFormat> {
    let mut header = Vec::with_capacity(HEADER_WINDOW);
    let read = File::open(path).and_then(|file| {
        file.take(HEADER_WINDOW as u64).read_to_end(&mut header)
    });

    match read {
        Ok(_) => detect_from_header(&header),
        Err(e) => {
            debug!("cannot sniff {}: {e}", path.display());
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn sample_headers() -> Vec<(ArchiveFormat, Vec<u8>)> {
        vec![
            (ArchiveFormat::TarZst, vec![0x28, 0xB5, 0x2F, 0xFD, 0x04, 0x58]),
            (ArchiveFormat::TarLz4, vec![0x04, 0x22, 0x4D, 0x18, 0x64, 0x40]),
            (
                ArchiveFormat::TarXz,
                vec![0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00, 0x00, 0x04],
            ),
            (ArchiveFormat::TarGz, vec![0x1F, 0x8B, 0x08, 0x00]),
            (ArchiveFormat::Zip, vec![0x50, 0x4B, 0x03, 0x04, 0x14, 0x00]),
        ]
    }

    #[test]
    fn test_detect_canonical_extensions_without_reading() {
        // None of these files exist, so success proves nothing was opened.
        let cases = [
            ("pkg.tar.zst", ArchiveFormat::TarZst),
            ("pkg.tar.lz4", ArchiveFormat::TarLz4),
            ("pkg.tar.xz", ArchiveFormat::TarXz),
            ("pkg.tar.gz", ArchiveFormat::TarGz),
            ("pkg.zip", ArchiveFormat::Zip),
        ];
        for (name, expected) in cases {
            assert_eq!(
                detect_format_with_source(format!("/nonexistent/{name}")),
                (expected, Detection::Extension),
                "{name}"
            );
        }
    }

    #[test]
    fn test_detect_is_case_insensitive() {
        assert_eq!(detect_format("Release.ZIP"), ArchiveFormat::Zip);
        assert_eq!(detect_format("a.Tar.Xz"), ArchiveFormat::TarXz);
    }

    #[test]
    fn test_detect_generic_extension_sniffs_header() {
        let temp = TempDir::new().unwrap();
        for (expected, header) in sample_headers() {
            let path = temp.path().join(format!("{expected:?}.criage"));
            let mut file = File::create(&path).unwrap();
            file.write_all(&header).unwrap();
            file.write_all(&[0u8; 64]).unwrap();
            drop(file);

            assert_eq!(
                detect_format_with_source(&path),
                (expected, Detection::Signature)
            );
        }
    }

    #[test]
    fn test_detect_generic_extension_unknown_content_falls_back() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("mystery.criage");
        std::fs::write(&path, b"just some text").unwrap();

        assert_eq!(
            detect_format_with_source(&path),
            (ArchiveFormat::TarZst, Detection::Fallback)
        );
    }

    #[test]
    fn test_detect_generic_extension_missing_file_falls_back() {
        assert_eq!(
            detect_format_with_source("/nonexistent/pkg.criage"),
            (ArchiveFormat::TarZst, Detection::Fallback)
        );
    }

    #[test]
    fn test_detect_unknown_extension_falls_back_without_sniffing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("package.bin");
        std::fs::write(&path, [0x1F, 0x8B, 0x08]).unwrap();

        // Only the generic suffix triggers sniffing.
        assert_eq!(
            detect_format_with_source(&path),
            (ArchiveFormat::TarZst, Detection::Fallback)
        );
    }

    #[test]
    fn test_format_from_extension_never_sniffs() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pkg.criage");
        std::fs::write(&path, [0x50, 0x4B, 0x03, 0x04]).unwrap();

        assert_eq!(format_from_extension(&path), None);
        assert_eq!(format_from_extension("x.bin"), None);
        assert_eq!(
            format_from_extension("/nonexistent/pkg.TAR.LZ4"),
            Some(ArchiveFormat::TarLz4)
        );
    }

    #[test]
    fn test_detect_from_short_header() {
        assert_eq!(detect_from_header(&[]), None);
        assert_eq!(detect_from_header(&[0x50, 0x4B]), None);
        assert_eq!(detect_from_header(&[0x1F, 0x8B]), Some(ArchiveFormat::TarGz));
    }

    #[test]
    fn test_sniff_file_empty() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("empty.criage");
        std::fs::write(&path, b"").unwrap();
        assert_eq!(sniff_file(&path), None);
    }
}
