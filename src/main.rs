//! winget-bootstrap - package manager bootstrapper
//!
//! Brings a host to a ready state for the WinGet package manager: the package provider is
//! installed, the WinGet client module is installed (from the gallery channel or by direct
//! download) and imported, and the package manager is repaired for all users.

use clap::Parser;

mod bootstrap;
mod cli;
mod commands;
mod config;
mod engine;
mod error;
mod fallback;
mod gallery;
mod host;
mod logging;
mod temp;
mod ui;

#[cfg(test)]
mod test_fixtures;

use cli::{Cli, Commands};
use commands::Context;
use error::Result;

fn dispatch(mut cli: Cli) -> Result<()> {
    logging::init_tracing(&cli.output_options());

    // Commands that never touch the host run without loading configuration
    match cli.command.take().unwrap_or(Commands::Ensure) {
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(&args),
        Commands::Provider => commands::provider::run(&Context::load(&cli)?),
        Commands::InstallPackage(args) => {
            commands::install_package::run(&Context::load(&cli)?, args)
        }
        Commands::Ensure => commands::ensure::run(&Context::load(&cli)?),
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = dispatch(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
