//! Command implementations for winget-bootstrap CLI

pub mod completions;
pub mod ensure;
pub mod install_package;
pub mod provider;
pub mod version;

use crate::cli::Cli;
use crate::config::BootstrapConfig;
use crate::error::Result;
use crate::ui::{ConsoleReporter, OutputOptions};

/// Settings shared by the commands that touch the host
#[derive(Debug, Clone)]
pub struct Context {
    pub config: BootstrapConfig,
    pub output: OutputOptions,
}

impl Context {
    /// Load the configuration named on the command line (or the default lookup)
    pub fn load(cli: &Cli) -> Result<Self> {
        let explicit = cli.module_path.as_deref().map(dunce::simplified);
        Ok(Self {
            config: BootstrapConfig::load(explicit)?,
            output: cli.output_options(),
        })
    }

    pub fn reporter(&self) -> ConsoleReporter {
        ConsoleReporter::new(self.output)
    }
}
