//! criage-pkg - Command-line front end for criage package archives.

mod cli;
mod commands;
mod error;
mod logger;
mod output;

use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    logger::init(cli.verbose, cli.quiet);

    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet);

    let result = match &cli.command {
        cli::Commands::Pack(args) => commands::pack::execute(args, &*formatter),
        cli::Commands::Unpack(args) => commands::unpack::execute(args, &*formatter),
        cli::Commands::Metadata(args) => commands::metadata::execute(args, &*formatter),
        cli::Commands::Detect(args) => commands::detect::execute(args, &*formatter),
        cli::Commands::Completion(args) => {
            commands::completion::execute(args.shell);
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            formatter.format_error(&e);
            ExitCode::FAILURE
        }
    }
}
