//! Error types and handling for winget-bootstrap
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! The error types follow the phases of the bootstrap workflow:
//! - [`HostError`]: a collaborator call (shell, registry, engine) failed
//! - [`FallbackError`]: a step of the direct-download acquisition path failed
//! - [`ProviderError`]: the package provider could not be made ready
//! - [`ModuleError`]: the client module could not be made ready or repaired
//! - [`BootstrapError`]: everything the command line surfaces to the user

use miette::Diagnostic;
use thiserror::Error;

/// Failure of a call into the host (shell process, registries, engine)
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("Failed to start '{program}': {reason}")]
    #[diagnostic(
        code(winget_bootstrap::host::spawn_failed),
        help("Check that the configured shell is installed and on PATH")
    )]
    SpawnFailed { program: String, reason: String },

    #[error("{operation} failed with exit code {code}: {stderr}")]
    #[diagnostic(code(winget_bootstrap::host::command_failed))]
    CommandFailed {
        operation: String,
        code: i32,
        stderr: String,
    },

    #[error("Unexpected output from {operation}: '{output}'")]
    #[diagnostic(code(winget_bootstrap::host::unexpected_output))]
    UnexpectedOutput { operation: String, output: String },
}

/// Refusal to run a step that reports progress
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum ProgressGateError {
    #[error("{step} stopped: progress preference is 'stop'")]
    #[diagnostic(
        code(winget_bootstrap::progress::stopped),
        help("Use --progress continue or --progress silent to let the step run")
    )]
    Stopped { step: String },

    #[error("{step} declined by user")]
    #[diagnostic(code(winget_bootstrap::progress::declined))]
    Declined { step: String },

    #[error("Confirmation prompt for {step} failed: {reason}")]
    #[diagnostic(code(winget_bootstrap::progress::prompt_failed))]
    Prompt { step: String, reason: String },
}

/// Failure of one step of the fallback acquisition path
#[derive(Error, Diagnostic, Debug)]
pub enum FallbackError {
    #[error("Failed to query gallery metadata at {url}: {reason}")]
    #[diagnostic(code(winget_bootstrap::fallback::metadata_failed))]
    Metadata { url: String, reason: String },

    #[error("Gallery returned no version for module '{module}'")]
    #[diagnostic(
        code(winget_bootstrap::fallback::no_version),
        help("Check the module name and the gallery API base URL in the configuration")
    )]
    NoVersionFound { module: String },

    #[error("Failed to download {url}: {reason}")]
    #[diagnostic(code(winget_bootstrap::fallback::download_failed))]
    Download { url: String, reason: String },

    #[error("Timed out after {seconds}s talking to {url}")]
    #[diagnostic(
        code(winget_bootstrap::fallback::timeout),
        help("Raise gallery.timeout_secs in the configuration on slow networks")
    )]
    Timeout { url: String, seconds: u64 },

    #[error("Failed to extract {archive}: {reason}")]
    #[diagnostic(code(winget_bootstrap::fallback::extract_failed))]
    Extract { archive: String, reason: String },

    #[error("Failed to place module files at {path}: {reason}")]
    #[diagnostic(code(winget_bootstrap::fallback::install_failed))]
    Install { path: String, reason: String },

    #[error("Failed to create staging directory under {root}: {reason}")]
    #[diagnostic(code(winget_bootstrap::fallback::staging_failed))]
    Staging { root: String, reason: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Progress(#[from] ProgressGateError),
}

/// The package provider could not be made ready
#[derive(Error, Diagnostic, Debug)]
pub enum ProviderError {
    #[error("Installing package provider '{provider}' failed after remediation: {source}")]
    #[diagnostic(
        code(winget_bootstrap::provider::install_failed),
        help("Run the command from an elevated shell; machine-wide installs need administrator rights")
    )]
    InstallFailedAfterRemediation {
        provider: String,
        #[source]
        source: HostError,
    },

    #[error("Importing package provider '{provider}' failed: {source}")]
    #[diagnostic(code(winget_bootstrap::provider::import_failed))]
    ImportFailed {
        provider: String,
        #[source]
        source: HostError,
    },
}

/// The client module could not be made ready, or the engine repair failed
#[derive(Error, Diagnostic, Debug)]
pub enum ModuleError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Provider(#[from] ProviderError),

    #[error("Fallback installation of module '{module}' failed: {source}")]
    #[diagnostic(code(winget_bootstrap::module::fallback_failed))]
    FallbackInstallFailed {
        module: String,
        #[source]
        source: FallbackError,
    },

    #[error("Importing module '{module}' failed: {source}")]
    #[diagnostic(code(winget_bootstrap::module::import_failed))]
    ImportFailed {
        module: String,
        #[source]
        source: HostError,
    },

    #[error("Repairing the package manager failed: {source}")]
    #[diagnostic(
        code(winget_bootstrap::module::repair_failed),
        help("Set repair_policy: warn in the configuration to continue past repair failures")
    )]
    RepairFailed {
        #[source]
        source: HostError,
    },
}

/// Main error type for winget-bootstrap commands
#[derive(Error, Diagnostic, Debug)]
pub enum BootstrapError {
    #[error("Configuration file not found: {path}")]
    #[diagnostic(
        code(winget_bootstrap::config::not_found),
        help("Pass an existing file with --module-path or omit the flag to use defaults")
    )]
    ConfigNotFound { path: String },

    #[error("Failed to read configuration file {path}: {reason}")]
    #[diagnostic(code(winget_bootstrap::config::read_failed))]
    ConfigReadFailed { path: String, reason: String },

    #[error("Failed to parse configuration file {path}: {reason}")]
    #[diagnostic(code(winget_bootstrap::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("Invalid package install request: {message}")]
    #[diagnostic(code(winget_bootstrap::request::invalid))]
    InvalidRequest { message: String },

    #[error("Installing package failed: {source}")]
    #[diagnostic(code(winget_bootstrap::request::install_failed))]
    PackageInstallFailed {
        #[source]
        source: HostError,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Module(#[from] ModuleError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Fallback(#[from] FallbackError),
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, BootstrapError>;
