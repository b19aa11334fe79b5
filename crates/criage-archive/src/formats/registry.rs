//! Static table of supported archive formats.
//!
//! Every format the manager understands is described by one [`FormatSpec`]
//! row: its canonical file suffix, the label used in configuration and
//! metadata, the codec that drives it, and the magic bytes that identify a
//! stream of that format. The row order is the sniffing priority order.

use std::fmt;
use std::str::FromStr;

use crate::ArchiveError;

/// Generic package-archive suffix. Files carrying it may hold any format and
/// are identified by their leading bytes.
pub const GENERIC_EXTENSION: &str = ".criage";

/// Number of leading bytes inspected when sniffing a file.
pub const HEADER_WINDOW: usize = 16;

/// Supported archive formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ArchiveFormat {
    /// Zstandard-compressed tar archive.
    #[default]
    TarZst,
    /// LZ4-frame-compressed tar archive.
    TarLz4,
    /// XZ-compressed tar archive.
    TarXz,
    /// Gzip-compressed tar archive.
    TarGz,
    /// ZIP archive with deflated entries.
    Zip,
}

/// Compression codec behind a format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Codec {
    /// Zstandard (shared, long-lived contexts).
    Zstd,
    /// LZ4 frame format.
    Lz4,
    /// XZ / LZMA2.
    Xz,
    /// Gzip.
    Gzip,
    /// Per-entry deflate inside a ZIP container.
    Deflate,
}

/// Registry row describing one archive format.
#[derive(Debug)]
pub struct FormatSpec {
    /// Format tag.
    pub format: ArchiveFormat,
    /// Label used in configuration and metadata (`tar.zst`, `zip`, ...).
    pub label: &'static str,
    /// Canonical file suffix including the leading dot.
    pub extension: &'static str,
    /// Codec that encodes and decodes the stream.
    pub codec: Codec,
    /// Magic byte sequences; any one of them identifies the format.
    pub signatures: &'static [&'static [u8]],
}

/// All formats in sniffing priority order.
pub static FORMATS: [FormatSpec; 5] = [
    FormatSpec {
        format: ArchiveFormat::TarZst,
        label: "tar.zst",
        extension: ".tar.zst",
        codec: Codec::Zstd,
        signatures: &[&[0x28, 0xB5, 0x2F, 0xFD]],
    },
    FormatSpec {
        format: ArchiveFormat::TarLz4,
        label: "tar.lz4",
        extension: ".tar.lz4",
        codec: Codec::Lz4,
        signatures: &[&[0x04, 0x22, 0x4D, 0x18]],
    },
    FormatSpec {
        format: ArchiveFormat::TarXz,
        label: "tar.xz",
        extension: ".tar.xz",
        codec: Codec::Xz,
        signatures: &[&[0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00]],
    },
    FormatSpec {
        format: ArchiveFormat::TarGz,
        label: "tar.gz",
        extension: ".tar.gz",
        codec: Codec::Gzip,
        signatures: &[&[0x1F, 0x8B]],
    },
    FormatSpec {
        format: ArchiveFormat::Zip,
        label: "zip",
        extension: ".zip",
        codec: Codec::Deflate,
        signatures: &[&[0x50, 0x4B, 0x03, 0x04], &[0x50, 0x4B, 0x05, 0x06]],
    },
];

impl ArchiveFormat {
    /// Returns every supported format in sniffing priority order.
    #[must_use]
    pub fn all() -> impl Iterator<Item = Self> {
        FORMATS.iter().map(|spec| spec.format)
    }

    /// Returns the registry row for this format.
    #[must_use]
    pub fn spec(self) -> &'static FormatSpec {
        match self {
            Self::TarZst => &FORMATS[0],
            Self::TarLz4 => &FORMATS[1],
            Self::TarXz => &FORMATS[2],
            Self::TarGz => &FORMATS[3],
            Self::Zip => &FORMATS[4],
        }
    }

    /// Canonical suffix, e.g. `.tar.zst`.
    ///
    /// # Examples
    ///
    /// ```
    /// use criage_archive::ArchiveFormat;
    ///
    /// assert_eq!(ArchiveFormat::TarGz.extension(), ".tar.gz");
    /// assert_eq!(ArchiveFormat::Zip.extension(), ".zip");
    /// ```
    #[must_use]
    pub fn extension(self) -> &'static str {
        self.spec().extension
    }

    /// Configuration label, e.g. `tar.zst`.
    #[must_use]
    pub fn label(self) -> &'static str {
        self.spec().label
    }

    /// Codec driving this format.
    #[must_use]
    pub fn codec(self) -> Codec {
        self.spec().codec
    }

    /// Returns `true` for the tar-based formats.
    #[must_use]
    pub const fn is_tar(self) -> bool {
        !matches!(self, Self::Zip)
    }

    /// Returns `true` if `header` starts with one of this format's magic
    /// signatures.
    #[must_use]
    pub fn matches_header(self, header: &[u8]) -> bool {
        self.spec()
            .signatures
            .iter()
            .any(|magic| header.starts_with(magic))
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ArchiveFormat {
    type Err = ArchiveError;

    /// Parses a format label. Accepts the canonical labels, the `tar+codec`
    /// spelling and the single-suffix abbreviations.
    ///
    /// # Examples
    ///
    /// ```
    /// use criage_archive::ArchiveFormat;
    ///
    /// assert_eq!("tar.zst".parse::<ArchiveFormat>().unwrap(), ArchiveFormat::TarZst);
    /// assert_eq!("tar+gzip".parse::<ArchiveFormat>().unwrap(), ArchiveFormat::TarGz);
    /// assert!("rar".parse::<ArchiveFormat>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().trim_start_matches('.').to_ascii_lowercase();
        match normalized.as_str() {
            "tar.zst" | "tar+zstd" | "tar.zstd" | "tzst" => Ok(Self::TarZst),
            "tar.lz4" | "tar+lz4" | "tlz4" => Ok(Self::TarLz4),
            "tar.xz" | "tar+xz" | "txz" => Ok(Self::TarXz),
            "tar.gz" | "tar+gzip" | "tar.gzip" | "tgz" => Ok(Self::TarGz),
            "zip" => Ok(Self::Zip),
            _ => Err(ArchiveError::UnsupportedFormat {
                format: s.to_string(),
            }),
        }
    }
}
