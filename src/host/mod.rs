//! Host capabilities consumed by the bootstrap workflow
//!
//! The provider registry, module registry, distribution channel registry and the
//! package-manager engine are external to this tool. They are reached through the
//! traits below; [`PowerShellHost`] implements all of them by running the configured
//! shell, and tests substitute recording fakes.

mod powershell;
pub mod script;

pub use powershell::PowerShellHost;

use crate::engine::{PackageInstallRequest, RepairRequest};
use crate::error::HostError;

/// Result of asking a registry whether something is installed
///
/// `QueryFailed` is kept apart from `Absent` so callers decide explicitly how to treat
/// "we don't know".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presence {
    Present(String),
    Absent,
    QueryFailed(String),
}

impl Presence {
    /// Interpret raw query output: trimmed non-empty output is the installed version
    pub fn from_query(result: Result<String, HostError>) -> Self {
        match result {
            Ok(output) => {
                let version = output.trim();
                if version.is_empty() {
                    Presence::Absent
                } else {
                    Presence::Present(version.to_string())
                }
            }
            Err(e) => Presence::QueryFailed(e.to_string()),
        }
    }
}

/// Install scope for providers, modules and the engine repair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    AllUsers,
}

impl Scope {
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::AllUsers => "AllUsers",
        }
    }
}

/// Options for provider and module installs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallOptions {
    pub scope: Scope,
    pub force: bool,
    pub allow_clobber: bool,
}

impl InstallOptions {
    /// Machine-wide, overwrite without confirmation
    pub fn machine_wide() -> Self {
        Self {
            scope: Scope::AllUsers,
            force: true,
            allow_clobber: false,
        }
    }

    /// Machine-wide, forced, and allowed to overwrite commands of other modules
    pub fn machine_wide_clobber() -> Self {
        Self {
            allow_clobber: true,
            ..Self::machine_wide()
        }
    }
}

/// Registration and trust status of a distribution channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Unconfigured,
    Untrusted,
    Trusted,
}

/// Forces outbound TLS for the host session
pub trait TlsPolicy {
    /// Require TLS 1.2 or newer for every later host call
    fn require_tls12(&self) -> Result<(), HostError>;
}

/// Package provider registry
pub trait ProviderRegistry {
    fn installed(&self, name: &str) -> Presence;

    /// Install the provider and return the installed version
    fn install(
        &self,
        name: &str,
        minimum_version: Option<&str>,
        options: InstallOptions,
    ) -> Result<String, HostError>;

    fn import(&self, name: &str, force: bool) -> Result<(), HostError>;
}

/// Module registry
pub trait ModuleRegistry {
    fn installed(&self, name: &str) -> Presence;

    /// Install the module from the primary channel and return the installed version
    fn install(&self, name: &str, options: InstallOptions) -> Result<String, HostError>;

    fn import(&self, name: &str, force: bool) -> Result<(), HostError>;
}

/// Distribution channel registry
pub trait ChannelRegistry {
    fn state(&self, name: &str) -> Result<ChannelState, HostError>;

    /// Register the channel as trusted; without a source location the host default is registered
    fn register_trusted(&self, name: &str, source_location: Option<&str>)
    -> Result<(), HostError>;

    fn set_trusted(&self, name: &str) -> Result<(), HostError>;
}

/// The package-manager engine
pub trait PackageEngine {
    fn repair(&self, request: &RepairRequest) -> Result<(), HostError>;

    fn install_package(&self, request: &PackageInstallRequest) -> Result<(), HostError>;
}
