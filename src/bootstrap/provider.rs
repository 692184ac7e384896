//! Package provider bootstrap

use super::Collaborators;
use crate::config::BootstrapConfig;
use crate::error::ProviderError;
use crate::host::{InstallOptions, Presence};
use crate::ui::Reporter;

/// How the provider became ready
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderReadiness {
    /// Found installed; nothing was changed
    AlreadyPresent { version: String },
    /// Installed by this run; `remediated` is set when the first attempt failed
    Installed { version: String, remediated: bool },
}

impl ProviderReadiness {
    pub fn version(&self) -> &str {
        match self {
            ProviderReadiness::AlreadyPresent { version }
            | ProviderReadiness::Installed { version, .. } => version,
        }
    }
}

/// Ensures the configured package provider is installed and usable
pub struct ProviderBootstrapper<'a> {
    host: Collaborators<'a>,
    config: &'a BootstrapConfig,
    reporter: &'a dyn Reporter,
}

impl<'a> ProviderBootstrapper<'a> {
    pub fn new(
        host: Collaborators<'a>,
        config: &'a BootstrapConfig,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Self {
            host,
            config,
            reporter,
        }
    }

    /// Make the provider ready.
    ///
    /// A present provider is left alone. An absent one is installed machine-wide; if that
    /// fails, the infrastructure modules are refreshed and the install is retried once.
    /// Only the remediated install is followed by a forced import.
    pub fn ensure(&self) -> Result<ProviderReadiness, ProviderError> {
        let name = self.config.provider.name.as_str();
        self.reporter
            .step(&format!("Ensuring package provider {name}"));

        if let Err(e) = self.host.tls.require_tls12() {
            tracing::warn!(error = %e, "TLS 1.2 enforcement failed");
            self.reporter.warn(&format!(
                "Could not enforce TLS 1.2 ({e}); continuing with the host default"
            ));
        }

        match self.host.providers.installed(name) {
            Presence::Present(version) => {
                self.reporter
                    .success(&format!("{name} {version} is already installed"));
                return Ok(ProviderReadiness::AlreadyPresent { version });
            }
            Presence::Absent => {
                self.reporter.info(&format!("{name} is not installed"));
            }
            // Unknown state is handled exactly like absence
            Presence::QueryFailed(reason) => {
                self.reporter.warn(&format!(
                    "Could not query package provider {name} ({reason}); treating it as not installed"
                ));
            }
        }

        let minimum_version = self.config.provider.minimum_version.as_deref();
        match self
            .host
            .providers
            .install(name, minimum_version, InstallOptions::machine_wide())
        {
            Ok(version) => {
                self.reporter.success(&format!("Installed {name} {version}"));
                return Ok(ProviderReadiness::Installed {
                    version,
                    remediated: false,
                });
            }
            Err(e) => {
                tracing::debug!(error = %e, "first provider install failed");
                self.reporter.warn(&format!(
                    "Installing {name} failed ({e}); updating packaging modules and retrying"
                ));
            }
        }

        self.remediate();

        let version = self
            .host
            .providers
            .install(name, minimum_version, InstallOptions::machine_wide())
            .map_err(|source| ProviderError::InstallFailedAfterRemediation {
                provider: name.to_string(),
                source,
            })?;

        self.host
            .providers
            .import(name, true)
            .map_err(|source| ProviderError::ImportFailed {
                provider: name.to_string(),
                source,
            })?;

        self.reporter
            .success(&format!("Installed {name} {version} after remediation"));
        Ok(ProviderReadiness::Installed {
            version,
            remediated: true,
        })
    }

    /// Refresh the packaging infrastructure modules; failures only warn since the retry decides
    fn remediate(&self) {
        for module in &self.config.infrastructure_modules {
            match self
                .host
                .modules
                .install(module, InstallOptions::machine_wide_clobber())
            {
                Ok(version) => self.reporter.detail(&format!("Updated {module} to {version}")),
                Err(e) => self
                    .reporter
                    .warn(&format!("Updating {module} failed: {e}")),
            }
        }
    }
}
