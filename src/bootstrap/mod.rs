//! The bootstrap workflow
//!
//! Two dependency-ordered phases, run strictly in sequence:
//! 1. [`ProviderBootstrapper`]: make the package provider present and usable,
//!    remediating once before giving up
//! 2. [`ModuleInstaller`]: make the client module present (primary channel or
//!    direct-download fallback), import it, then repair the package-manager engine
//!
//! Both phases talk to the host only through the traits in [`crate::host`], bundled
//! here as [`Collaborators`].

mod module;
mod provider;

pub use module::{Acquisition, ModuleInstaller, ModuleReport, RepairOutcome};
pub use provider::{ProviderBootstrapper, ProviderReadiness};

use crate::host::{ChannelRegistry, ModuleRegistry, PackageEngine, ProviderRegistry, TlsPolicy};

/// Host capabilities used by the workflow
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub tls: &'a dyn TlsPolicy,
    pub providers: &'a dyn ProviderRegistry,
    pub modules: &'a dyn ModuleRegistry,
    pub channels: &'a dyn ChannelRegistry,
    pub engine: &'a dyn PackageEngine,
}

impl<'a> Collaborators<'a> {
    /// Use one host for every capability
    pub fn from_host<H>(host: &'a H) -> Self
    where
        H: TlsPolicy + ProviderRegistry + ModuleRegistry + ChannelRegistry + PackageEngine,
    {
        Self {
            tls: host,
            providers: host,
            modules: host,
            channels: host,
            engine: host,
        }
    }
}
