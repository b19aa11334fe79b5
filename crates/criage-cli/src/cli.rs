//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;
use criage_archive::ArchiveFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "criage-pkg")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pack a package directory into an archive
    Pack(PackArgs),
    /// Unpack an archive into a directory
    Unpack(UnpackArgs),
    /// Print the metadata embedded in an archive
    Metadata(MetadataArgs),
    /// Detect the format of an archive
    Detect(DetectArgs),
    /// Generate shell completions
    Completion(CompletionArgs),
}

#[derive(clap::Args)]
pub struct PackArgs {
    /// Package source directory
    #[arg(value_name = "SOURCE_DIR")]
    pub source: PathBuf,

    /// Output archive file path
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Archive format (default: detected from the output name)
    #[arg(short = 'F', long, value_parser = parse_format)]
    pub format: Option<ArchiveFormat>,

    /// Include pattern (glob, can be repeated)
    #[arg(long = "include", short = 'i', value_name = "PATTERN")]
    pub include: Vec<String>,

    /// Exclude pattern (glob, can be repeated)
    #[arg(long = "exclude", short = 'x', value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Compression level (1-9)
    #[arg(short = 'l', long, value_parser = clap::value_parser!(u8).range(1..=9))]
    pub level: Option<u8>,

    /// Package name recorded in the metadata
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// Package version recorded in the metadata
    #[arg(long, value_name = "VERSION", requires = "name")]
    pub package_version: Option<String>,

    /// Overwrite output file if exists
    #[arg(short = 'f', long)]
    pub force: bool,
}

#[derive(clap::Args)]
pub struct UnpackArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Destination directory (default: current directory)
    #[arg(value_name = "DEST")]
    pub dest: Option<PathBuf>,

    /// Archive format (default: detected)
    #[arg(short = 'F', long, value_parser = parse_format)]
    pub format: Option<ArchiveFormat>,
}

#[derive(clap::Args)]
pub struct MetadataArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Archive format (default: detected)
    #[arg(short = 'F', long, value_parser = parse_format)]
    pub format: Option<ArchiveFormat>,
}

#[derive(clap::Args)]
pub struct DetectArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,
}

#[derive(clap::Args)]
pub struct CompletionArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}

fn parse_format(s: &str) -> Result<ArchiveFormat, String> {
    s.parse().map_err(|_| {
        let known: Vec<&str> = ArchiveFormat::all().map(ArchiveFormat::label).collect();
        format!("unknown format '{s}' (expected one of: {})", known.join(", "))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_format() {
        assert_eq!(parse_format("tar+gzip").unwrap(), ArchiveFormat::TarGz);
        assert_eq!(parse_format("zip").unwrap(), ArchiveFormat::Zip);
        let err = parse_format("rar").unwrap_err();
        assert!(err.contains("tar.zst"));
    }

    #[test]
    fn test_pack_args() {
        let cli = Cli::try_parse_from([
            "criage-pkg", "pack", "src", "out.tar.gz", "-x", "*.tmp", "-x", "build/*", "-l", "9",
        ])
        .unwrap();
        let Commands::Pack(args) = cli.command else {
            panic!("expected pack");
        };
        assert_eq!(args.exclude, vec!["*.tmp", "build/*"]);
        assert_eq!(args.level, Some(9));
        assert!(args.format.is_none());
    }

    #[test]
    fn test_level_out_of_range() {
        assert!(Cli::try_parse_from(["criage-pkg", "pack", "src", "out.zip", "-l", "0"]).is_err());
    }
}
