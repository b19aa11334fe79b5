//! Metadata command implementation.

use super::resolve_format;
use crate::cli::MetadataArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use criage_archive::ArchiveManager;
use criage_archive::ManagerConfig;
use criage_archive::MetadataSource;

pub fn execute(args: &MetadataArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let format = resolve_format(args.format, &args.archive);
    let manager = add_archive_context(
        ArchiveManager::new(ManagerConfig::new(env!("CARGO_PKG_VERSION"))),
        &args.archive,
    )?;
    let (metadata, source) = add_archive_context(
        manager.extract_metadata_with_source(&args.archive, format),
        &args.archive,
    )?;
    manager.close();

    if source == MetadataSource::Manifest {
        formatter.format_warning("metadata was derived from criage.yaml; package fields are empty");
    }
    formatter.format_metadata(&args.archive, &metadata)
}
