// Entrypoint for the blitz CLI.
// - Keeps `main` small: set up logging, parse flags, hand off to `ui::run`.
// - Errors are printed with their full cause chain and exit non-zero.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use blitz::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = cli.check_search_flags() {
        e.exit();
    }

    // RUST_LOG wins over --verbose.
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    match blitz::ui::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
