//! Stderr backend for the `log` records emitted by criage-archive.
//!
//! `tracing-subscriber` bridges `log` records through its `tracing-log`
//! integration, so the library keeps using the plain `log` facade.

use std::io;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Level shown for the given flags: everything down to `debug` when
/// verbose, errors only when quiet, warnings otherwise.
pub const fn level_for(verbose: bool, quiet: bool) -> LevelFilter {
    if verbose {
        LevelFilter::DEBUG
    } else if quiet {
        LevelFilter::ERROR
    } else {
        LevelFilter::WARN
    }
}

/// Installs the stderr subscriber. `RUST_LOG` directives refine the level
/// picked from the flags. A second call keeps the first subscriber.
pub fn init(verbose: bool, quiet: bool) {
    let filter = EnvFilter::builder()
        .with_default_directive(level_for(verbose, quiet).into())
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(console::colors_enabled_stderr())
        .with_target(false)
        .without_time()
        .try_init();
}
