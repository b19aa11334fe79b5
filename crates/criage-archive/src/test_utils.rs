//! Helpers for building archives in tests, including hostile ones that the
//! writers in this crate would never produce.
//!
//! # Panics
//!
//! All functions in this module may panic on I/O errors since they are
//! designed for test use only where panics are acceptable.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::io::Cursor;
use std::io::Write;

use crate::ArchiveFormat;
use crate::formats::compression::level_to_flate2;
use crate::formats::compression::level_to_xz;
use crate::formats::compression::level_to_zstd;

/// Builder for uncompressed tar streams.
///
/// # Examples
///
/// ```
/// use criage_archive::test_utils::TarTestBuilder;
///
/// let tar_data = TarTestBuilder::new()
///     .add_file("file.txt", b"content")
///     .add_directory("dir/")
///     .add_raw_file("../escape.txt", b"evil")
///     .build();
/// ```
pub struct TarTestBuilder {
    builder: tar::Builder<Vec<u8>>,
}

impl TarTestBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            builder: tar::Builder::new(Vec::new()),
        }
    }

    /// Adds a regular file with mode 0o644.
    #[must_use]
    pub fn add_file(self, path: &str, data: &[u8]) -> Self {
        self.add_file_with_mode(path, data, 0o644)
    }

    /// Adds a regular file with a custom mode.
    #[must_use]
    pub fn add_file_with_mode(mut self, path: &str, data: &[u8], mode: u32) -> Self {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(mode);
        header.set_cksum();
        self.builder.append_data(&mut header, path, data).unwrap();
        self
    }

    /// Adds a directory with mode 0o755.
    #[must_use]
    pub fn add_directory(self, path: &str) -> Self {
        self.add_directory_with_mode(path, 0o755)
    }

    /// Adds a directory with a custom mode.
    #[must_use]
    pub fn add_directory_with_mode(mut self, path: &str, mode: u32) -> Self {
        let mut header = tar::Header::new_gnu();
        header.set_size(0);
        header.set_mode(mode);
        header.set_entry_type(tar::EntryType::Directory);
        header.set_cksum();
        self.builder
            .append_data(&mut header, path, std::io::empty())
            .unwrap();
        self
    }

    /// Adds a symlink.
    #[must_use]
    pub fn add_symlink(mut self, path: &str, target: &str) -> Self {
        let mut header = tar::Header::new_gnu();
        header.set_size(0);
        header.set_mode(0o777);
        header.set_entry_type(tar::EntryType::Symlink);
        header.set_link_name(target).unwrap();
        header.set_cksum();
        self.builder
            .append_data(&mut header, path, std::io::empty())
            .unwrap();
        self
    }

    /// Adds a regular file whose name is written into the header verbatim.
    ///
    /// `tar::Builder` refuses names with `..` or a leading `/`; this bypasses
    /// that check so extraction can be tested against such entries. The name
    /// must fit the 100-byte legacy field.
    #[must_use]
    pub fn add_raw_file(self, name: &str, data: &[u8]) -> Self {
        self.add_raw(name, data, tar::EntryType::Regular, 0o644)
    }

    /// Adds a directory whose name is written into the header verbatim.
    #[must_use]
    pub fn add_raw_directory(self, name: &str) -> Self {
        self.add_raw(name, &[], tar::EntryType::Directory, 0o755)
    }

    fn add_raw(mut self, name: &str, data: &[u8], kind: tar::EntryType, mode: u32) -> Self {
        let mut header = tar::Header::new_old();
        let field = &mut header.as_old_mut().name;
        assert!(name.len() < field.len(), "raw name too long");
        field[..name.len()].copy_from_slice(name.as_bytes());
        header.set_size(data.len() as u64);
        header.set_mode(mode);
        header.set_entry_type(kind);
        header.set_cksum();
        self.builder.append(&header, data).unwrap();
        self
    }

    /// Returns the finished tar stream.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        self.builder.into_inner().unwrap()
    }
}

impl Default for TarTestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for ZIP archives. Entries are stored uncompressed.
///
/// # Examples
///
/// ```
/// use criage_archive::test_utils::ZipTestBuilder;
///
/// let zip_data = ZipTestBuilder::new()
///     .add_file("file.txt", b"content")
///     .add_directory("dir/")
///     .build();
/// ```
pub struct ZipTestBuilder {
    zip: zip::ZipWriter<Cursor<Vec<u8>>>,
}

impl ZipTestBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            zip: zip::ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    /// Adds a regular file. The name is stored verbatim.
    #[must_use]
    pub fn add_file(self, path: &str, data: &[u8]) -> Self {
        self.add_file_with_mode(path, data, 0o644)
    }

    /// Adds a regular file with a custom mode.
    #[must_use]
    pub fn add_file_with_mode(mut self, path: &str, data: &[u8], mode: u32) -> Self {
        use zip::write::SimpleFileOptions;

        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored)
            .unix_permissions(mode);

        self.zip.start_file(path, options).unwrap();
        self.zip.write_all(data).unwrap();
        self
    }

    /// Adds a directory.
    #[must_use]
    pub fn add_directory(mut self, path: &str) -> Self {
        use zip::write::SimpleFileOptions;

        let options = SimpleFileOptions::default().unix_permissions(0o755);
        self.zip.add_directory(path, options).unwrap();
        self
    }

    /// Adds a symlink entry.
    #[must_use]
    pub fn add_symlink(mut self, path: &str, target: &str) -> Self {
        use zip::write::SimpleFileOptions;

        let options = SimpleFileOptions::default().unix_permissions(0o777);
        self.zip.add_symlink(path, target, options).unwrap();
        self
    }

    /// Returns the finished archive.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        self.zip.finish().unwrap().into_inner()
    }
}

impl Default for ZipTestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wraps an uncompressed tar stream in `format`'s codec at level 5.
///
/// `Zip` has no outer stream; the bytes are returned unchanged.
#[must_use]
pub fn compress(format: ArchiveFormat, tar: &[u8]) -> Vec<u8> {
    match format {
        ArchiveFormat::TarZst => zstd::stream::encode_all(tar, level_to_zstd(5)).unwrap(),
        ArchiveFormat::TarLz4 => {
            let mut encoder = lz4_flex::frame::FrameEncoder::new(Vec::new());
            encoder.write_all(tar).unwrap();
            encoder.finish().unwrap()
        }
        ArchiveFormat::TarXz => {
            let mut encoder = xz2::write::XzEncoder::new(Vec::new(), level_to_xz(5));
            encoder.write_all(tar).unwrap();
            encoder.finish().unwrap()
        }
        ArchiveFormat::TarGz => {
            let mut encoder = flate2::write::GzEncoder::new(Vec::new(), level_to_flate2(5));
            encoder.write_all(tar).unwrap();
            encoder.finish().unwrap()
        }
        ArchiveFormat::Zip => tar.to_vec(),
    }
}
