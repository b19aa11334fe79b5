//! Pack command implementation.

use crate::cli::PackArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use anyhow::bail;
use criage_archive::ArchiveFormat;
use criage_archive::ArchiveManager;
use criage_archive::ManagerConfig;
use criage_archive::PackageManifest;
use criage_archive::formats::format_from_extension;
use criage_archive::formats::registry::GENERIC_EXTENSION;
use std::fs;

pub fn execute(args: &PackArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    if args.output.exists() && !args.force {
        bail!(
            "Output file '{}' already exists\n\
             HINT: Use --force to overwrite it.",
            args.output.display()
        );
    }

    let mut config = ManagerConfig::new(env!("CARGO_PKG_VERSION"));
    if let Some(level) = args.level {
        config = config.with_compression_level(level);
    }
    let format = args.format.unwrap_or_else(|| output_format(args, &config));
    let name = args.output.to_string_lossy().to_ascii_lowercase();
    if !name.ends_with(format.extension()) && !name.ends_with(GENERIC_EXTENSION) {
        formatter.format_warning(&format!(
            "'{}' does not end in {}; pass --format when unpacking it",
            args.output.display(),
            format.extension()
        ));
    }

    let manager = add_archive_context(ArchiveManager::new(config), &args.output)?;
    let mut metadata = manager.new_metadata(format);
    if let Some(name) = &args.name {
        metadata.package = Some(PackageManifest {
            name: name.clone(),
            version: args.package_version.clone().unwrap_or_default(),
            ..PackageManifest::default()
        });
    }

    let result = manager.create_archive_with_metadata(
        &args.source,
        &args.output,
        format,
        args.include.as_slice(),
        args.exclude.as_slice(),
        &metadata,
    );
    if result.is_err() && args.output.is_file() {
        // A partially written archive is never valid.
        let _ = fs::remove_file(&args.output);
    }
    let report = add_archive_context(result, &args.source)?;
    manager.close();

    formatter.format_pack_result(&args.output, &report)
}

/// The output name decides the format when it carries a known suffix; an
/// existing file is never sniffed since it is about to be replaced.
fn output_format(args: &PackArgs, config: &ManagerConfig) -> ArchiveFormat {
    format_from_extension(&args.output).unwrap_or(config.preferred_format)
}
