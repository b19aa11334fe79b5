//! The archive manager: the entry point for creating, extracting and
//! inspecting package archives.

use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;

use chrono::Utc;
use log::debug;
use log::info;
use log::warn;

use crate::ArchiveError;
use crate::ArchiveFormat;
use crate::CreationReport;
use crate::DestDir;
use crate::ExtractionReport;
use crate::ManagerConfig;
use crate::Result;
use crate::creation;
use crate::creation::CreateRequest;
use crate::creation::InclusionFilter;
use crate::extraction;
use crate::extraction::DirModes;
use crate::formats;
use crate::formats::compression::CodecPool;
use crate::metadata::MANIFEST_FILE_NAME;
use crate::metadata::METADATA_ENTRY_NAME;
use crate::metadata::PackageMetadata;

/// Prefix of the scratch directories used for metadata extraction.
pub const SCRATCH_PREFIX: &str = "criage-metadata-";

/// Where a metadata record returned by
/// [`ArchiveManager::extract_metadata_with_source`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataSource {
    /// The reserved `.criage-metadata.json` entry.
    Embedded,
    /// A `criage.yaml` manifest at the archive root; only the creator and
    /// version fields are filled in.
    Manifest,
}

/// Creates, extracts and inspects package archives.
///
/// A manager owns the long-lived zstd contexts. It is `Send + Sync`; share
/// it behind an `Arc` to run operations from several threads. Operations on
/// distinct paths may run concurrently, with `tar.zst` sessions taking turns
/// on the shared contexts.
///
/// # Examples
///
/// ```no_run
/// use criage_archive::ArchiveFormat;
/// use criage_archive::ArchiveManager;
/// use criage_archive::ManagerConfig;
///
/// let manager = ArchiveManager::new(ManagerConfig::new("1.0.0"))?;
/// let metadata = manager.new_metadata(ArchiveFormat::TarZst);
/// let none: &[&str] = &[];
/// manager.create_archive_with_metadata(
///     "pkg/",
///     "pkg-1.0.0.tar.zst",
///     ArchiveFormat::TarZst,
///     none,
///     &["*.tmp"],
///     &metadata,
/// )?;
/// manager.extract_archive("pkg-1.0.0.tar.zst", "out/", ArchiveFormat::TarZst)?;
/// manager.close();
/// # Ok::<(), criage_archive::ArchiveError>(())
/// ```
#[derive(Debug)]
pub struct ArchiveManager {
    config: ManagerConfig,
    codecs: CodecPool,
}

impl ArchiveManager {
    /// Validates `config` and acquires the shared zstd contexts.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::InvalidCompressionLevel`] for a level outside
    /// 1-9, or an I/O error if the contexts cannot be allocated.
    pub fn new(config: ManagerConfig) -> Result<Self> {
        config.validate()?;
        let codecs = CodecPool::new()?;
        debug!(
            "archive manager ready: level {}, preferred format {}",
            config.compression_level, config.preferred_format
        );
        Ok(Self { config, codecs })
    }

    /// Returns the configuration this manager was built with.
    #[must_use]
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Detects the format of `path`, by suffix first and by leading bytes
    /// for `.criage` files. Never fails; see [`formats::detect`].
    pub fn detect_format<P: AsRef<Path>>(&self, path: P) -> ArchiveFormat {
        formats::detect_format(path)
    }

    /// Builds a metadata record stamped with this manager's creator,
    /// version, the format label and the current time.
    #[must_use]
    pub fn new_metadata(&self, format: ArchiveFormat) -> PackageMetadata {
        PackageMetadata {
            compression_type: format.label().to_string(),
            created_at: Utc::now(),
            created_by: self.config.creator.clone(),
            version: self.config.version.clone(),
            ..PackageMetadata::default()
        }
    }

    /// Extracts `archive` into `dest`, creating `dest` if needed.
    ///
    /// # Errors
    ///
    /// - [`ArchiveError::PathTraversal`] for the first entry that would land
    ///   outside `dest`; nothing is written for it or any later entry.
    /// - [`ArchiveError::MalformedContainer`] if the stream cannot be decoded.
    /// - [`ArchiveError::UnreadableSource`] / [`ArchiveError::WriteFailure`]
    ///   for I/O failures on either side.
    pub fn extract_archive<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        archive: P,
        dest: Q,
        format: ArchiveFormat,
    ) -> Result<ExtractionReport> {
        self.extract_into(archive.as_ref(), dest.as_ref(), format, DirModes::Restore)
    }

    fn extract_into(
        &self,
        archive: &Path,
        dest: &Path,
        format: ArchiveFormat,
        dir_modes: DirModes,
    ) -> Result<ExtractionReport> {
        let started = Instant::now();
        debug!("extracting {} as {format}", archive.display());

        let dest = DestDir::create(dest)?;
        let mut report = if format.is_tar() {
            extraction::tar::extract_tar(&self.codecs, format, archive, &dest, dir_modes)?
        } else {
            extraction::zip::extract_zip(archive, &dest, dir_modes)?
        };
        report.duration = started.elapsed();

        debug!(
            "extracted {} files, {} directories from {}",
            report.files_extracted,
            report.directories_created,
            archive.display()
        );
        Ok(report)
    }

    /// Reads the metadata record of `archive`.
    ///
    /// The archive is extracted into a scratch directory that is removed
    /// before this returns, whatever the outcome. Stored directory modes are
    /// not applied there, so a read-only directory in the archive cannot
    /// block the removal. When the reserved metadata entry is absent but a
    /// `criage.yaml` manifest is present, a minimal record carrying only this
    /// manager's creator and version is returned; the manifest contents are
    /// not parsed.
    ///
    /// # Errors
    ///
    /// - [`ArchiveError::MetadataMissing`] if neither file is present.
    /// - [`ArchiveError::MetadataCorrupt`] if the metadata entry is not a
    ///   valid document.
    /// - Any error of [`extract_archive`](Self::extract_archive).
    pub fn extract_metadata_from_archive<P: AsRef<Path>>(
        &self,
        archive: P,
        format: ArchiveFormat,
    ) -> Result<PackageMetadata> {
        self.extract_metadata_with_source(archive, format)
            .map(|(metadata, _)| metadata)
    }

    /// Like [`extract_metadata_from_archive`](Self::extract_metadata_from_archive),
    /// and also reports which file the record came from.
    pub fn extract_metadata_with_source<P: AsRef<Path>>(
        &self,
        archive: P,
        format: ArchiveFormat,
    ) -> Result<(PackageMetadata, MetadataSource)> {
        let archive = archive.as_ref();
        let mut builder = tempfile::Builder::new();
        builder.prefix(SCRATCH_PREFIX);
        let scratch = match &self.config.scratch_dir {
            Some(dir) => builder.tempdir_in(dir),
            None => builder.tempdir(),
        }?;
        debug!("metadata scratch directory {}", scratch.path().display());

        let result = self.read_metadata(archive, scratch.path(), format);

        if let Err(e) = scratch.close() {
            warn!("cannot remove metadata scratch directory: {e}");
            if result.is_ok() {
                return Err(e.into());
            }
        }
        result
    }

    fn read_metadata(
        &self,
        archive: &Path,
        scratch: &Path,
        format: ArchiveFormat,
    ) -> Result<(PackageMetadata, MetadataSource)> {
        self.extract_into(archive, scratch, format, DirModes::Skip)?;

        let metadata_path = scratch.join(METADATA_ENTRY_NAME);
        match fs::read(&metadata_path) {
            Ok(bytes) => {
                return Ok((PackageMetadata::from_json(&bytes)?, MetadataSource::Embedded));
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(ArchiveError::unreadable(metadata_path, e)),
        }

        if scratch.join(MANIFEST_FILE_NAME).is_file() {
            info!(
                "{} has no {METADATA_ENTRY_NAME}, deriving metadata from {MANIFEST_FILE_NAME}",
                archive.display()
            );
            let metadata = PackageMetadata {
                created_by: self.config.creator.clone(),
                version: self.config.version.clone(),
                ..PackageMetadata::default()
            };
            return Ok((metadata, MetadataSource::Manifest));
        }

        Err(ArchiveError::MetadataMissing)
    }

    /// Packs `source` into `output` with `metadata` as the first entry.
    ///
    /// Entries are visited depth-first in lexical order. Paths relative to
    /// `source` are checked against `include` and `exclude` (see
    /// [`InclusionFilter`]); an excluded directory is not descended into.
    /// Symlinks and special files are skipped.
    ///
    /// On error the output file may be left partially written; callers
    /// should treat it as invalid and remove it.
    ///
    /// # Errors
    ///
    /// - [`ArchiveError::InvalidPattern`] if a pattern does not compile.
    /// - [`ArchiveError::UnreadableSource`] if `source` is not a readable
    ///   directory or a file in it cannot be read.
    /// - [`ArchiveError::WriteFailure`] if the output cannot be written.
    pub fn create_archive_with_metadata<P, Q, S>(
        &self,
        source: P,
        output: Q,
        format: ArchiveFormat,
        include: &[S],
        exclude: &[S],
        metadata: &PackageMetadata,
    ) -> Result<CreationReport>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
        S: AsRef<str>,
    {
        let source = source.as_ref();
        let output = output.as_ref();
        let started = Instant::now();
        debug!(
            "packing {} into {} as {format}",
            source.display(),
            output.display()
        );

        let filter = InclusionFilter::new(include, exclude)?;
        let source_meta =
            fs::metadata(source).map_err(|e| ArchiveError::unreadable(source, e))?;
        if !source_meta.is_dir() {
            return Err(ArchiveError::unreadable(
                source,
                io::Error::new(io::ErrorKind::NotADirectory, "source is not a directory"),
            ));
        }
        let source = source
            .canonicalize()
            .map_err(|e| ArchiveError::unreadable(source, e))?;
        let output_abs = absolute_output(output);
        let metadata_json = metadata.to_json()?;

        let request = CreateRequest {
            source: &source,
            output,
            output_abs: output_abs.as_deref(),
            filter: &filter,
            metadata_json: &metadata_json,
            level: self.config.compression_level,
        };
        let mut report = if format.is_tar() {
            creation::tar::create_tar(&self.codecs, format, &request)?
        } else {
            creation::zip::create_zip(&request)?
        };

        report.archive_size = fs::metadata(output).map(|m| m.len()).unwrap_or(0);
        report.duration = started.elapsed();
        debug!(
            "packed {} files, {} directories into {} ({} bytes)",
            report.files_added,
            report.directories_added,
            output.display(),
            report.archive_size
        );
        Ok(report)
    }

    /// Releases the shared codec contexts.
    ///
    /// Dropping the manager has the same effect; this makes the release
    /// point explicit.
    pub fn close(self) {
        debug!("archive manager closed");
        drop(self);
    }
}

/// Absolute path the output will have, resolved through its parent
/// directory. `None` if the parent does not exist yet.
fn absolute_output(output: &Path) -> Option<PathBuf> {
    let name = output.file_name()?;
    let parent = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    parent.canonicalize().ok().map(|p| p.join(name))
}
