//! CLI definitions using clap derive API

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::engine::{InstallMode, PackageScope};
use crate::ui::{OutputOptions, ProgressPreference};

/// winget-bootstrap - package manager bootstrapper
///
/// Makes the NuGet package provider and the WinGet client module ready, then repairs the package manager.
#[derive(Parser, Debug)]
#[command(
    name = "winget-bootstrap",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Bootstrap the package provider and WinGet client module, then repair WinGet",
    long_about = "winget-bootstrap makes sure the package provider is installed, registers and trusts \
                  the module gallery, installs the WinGet client module (downloading it directly when \
                  the gallery channel cannot be used), imports it and repairs the package manager for \
                  all users.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n    \
                  winget-bootstrap\n    \
                  winget-bootstrap ensure --progress silent\n    \
                  winget-bootstrap --module-path ./winget-bootstrap.yaml ensure -v\n    \
                  winget-bootstrap provider\n    \
                  winget-bootstrap install-package --id Git.Git --mode silent"
)]
pub struct Cli {
    /// Configuration file (defaults to winget-bootstrap.yaml in the user config directory)
    #[arg(
        long = "module-path",
        visible_alias = "config",
        value_name = "PATH",
        env = "WINGET_BOOTSTRAP_CONFIG",
        global = true
    )]
    pub module_path: Option<PathBuf>,

    /// How steps that report progress behave
    #[arg(long, value_enum, default_value_t = ProgressPreference::Continue, global = true)]
    pub progress: ProgressPreference,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Command to run (defaults to `ensure`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    pub fn output_options(&self) -> OutputOptions {
        OutputOptions {
            verbose: self.verbose,
            progress: self.progress,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ensure provider and module, import the module and repair the package manager
    Ensure,

    /// Ensure the package provider only
    Provider,

    /// Install a single package through the package manager
    InstallPackage(InstallPackageArgs),

    /// Show version information
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the install-package command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Install by package id:\n    winget-bootstrap install-package --id Git.Git\n\n\
                  Install by name, silently, machine-wide:\n    winget-bootstrap install-package --name 7zip --mode silent --scope system\n\n\
                  Pass installer arguments:\n    winget-bootstrap install-package --id Contoso.App --override \"/quiet /norestart\"")]
pub struct InstallPackageArgs {
    /// Package identifier (mutually exclusive with --name)
    #[arg(long)]
    pub id: Option<String>,

    /// Package name (mutually exclusive with --id)
    #[arg(long)]
    pub name: Option<String>,

    /// Arguments passed to the installer instead of the defaults
    #[arg(long = "override", value_name = "ARGS", allow_hyphen_values = true)]
    pub override_args: Option<String>,

    /// Installer scope
    #[arg(long, value_enum, default_value_t = PackageScope::Any)]
    pub scope: PackageScope,

    /// Installer UI mode
    #[arg(long, value_enum, default_value_t = InstallMode::Default)]
    pub mode: InstallMode,

    /// Install even when checks would refuse
    #[arg(long)]
    pub force: bool,

    /// Continue when the installer hash does not match the manifest
    #[arg(long)]
    pub allow_hash_mismatch: bool,

    /// Package source to install from
    #[arg(long)]
    pub source: Option<String>,
}

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    winget-bootstrap completions --shell bash > ~/.bash_completion.d/winget-bootstrap\n\n\
                  Generate PowerShell completions:\n    winget-bootstrap completions --shell powershell")]
pub struct CompletionsArgs {
    /// Shell type
    #[arg(long, value_enum, ignore_case = true)]
    pub shell: clap_complete::Shell,
}
