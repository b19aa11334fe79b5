//! Unpack command implementation.

use super::resolve_format;
use crate::cli::UnpackArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use anyhow::Context;
use anyhow::Result;
use criage_archive::ArchiveManager;
use criage_archive::ManagerConfig;
use std::env;

pub fn execute(args: &UnpackArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let dest = match &args.dest {
        Some(dir) => dir.clone(),
        None => env::current_dir().context("failed to get current directory")?,
    };

    let format = resolve_format(args.format, &args.archive);
    let manager = add_archive_context(
        ArchiveManager::new(ManagerConfig::new(env!("CARGO_PKG_VERSION"))),
        &args.archive,
    )?;
    let report = add_archive_context(
        manager.extract_archive(&args.archive, &dest, format),
        &args.archive,
    )?;
    manager.close();

    formatter.format_unpack_result(&dest, &report)
}
