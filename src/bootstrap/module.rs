//! Client module install, import and engine repair

use super::{Collaborators, ProviderBootstrapper, ProviderReadiness};
use crate::config::BootstrapConfig;
use crate::engine::{RepairPolicy, RepairRequest};
use crate::error::ModuleError;
use crate::fallback::{FallbackInstaller, PlacementReport};
use crate::gallery::Gallery;
use crate::host::{ChannelState, InstallOptions, Presence};
use crate::ui::Reporter;

/// Whether the primary distribution channel may be used this run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelUsability {
    Usable,
    Unusable(String),
}

/// How the module became present
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acquisition {
    AlreadyPresent { version: String },
    Primary { version: String },
    Fallback(PlacementReport),
}

/// Result of the final engine repair
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepairOutcome {
    Repaired,
    /// Failed under [`RepairPolicy::Warn`]
    FailedWithWarning(String),
}

/// Summary of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleReport {
    pub provider: ProviderReadiness,
    pub acquisition: Acquisition,
    pub repair: RepairOutcome,
}

/// Ensures the client module is installed and imported, then repairs the engine
pub struct ModuleInstaller<'a> {
    host: Collaborators<'a>,
    gallery: &'a dyn Gallery,
    config: &'a BootstrapConfig,
    reporter: &'a dyn Reporter,
}

impl<'a> ModuleInstaller<'a> {
    pub fn new(
        host: Collaborators<'a>,
        gallery: &'a dyn Gallery,
        config: &'a BootstrapConfig,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Self {
            host,
            gallery,
            config,
            reporter,
        }
    }

    /// Run the whole workflow: provider, channel, module, import, repair
    pub fn ensure_and_repair(&self) -> Result<ModuleReport, ModuleError> {
        let provider = ProviderBootstrapper::new(self.host, self.config, self.reporter).ensure()?;

        let channel = self.prepare_channel();
        let acquisition = self.ensure_module(&channel)?;
        self.import_module()?;
        let repair = self.repair()?;

        Ok(ModuleReport {
            provider,
            acquisition,
            repair,
        })
    }

    /// Register or trust the primary channel. Never fails; errors make the channel unusable.
    pub fn prepare_channel(&self) -> ChannelUsability {
        let name = self.config.channel.name.as_str();
        self.reporter
            .step(&format!("Preparing distribution channel {name}"));

        let prepared = self.host.channels.state(name).and_then(|state| match state {
            ChannelState::Trusted => {
                self.reporter.detail(&format!("{name} is already trusted"));
                Ok(())
            }
            ChannelState::Untrusted => {
                self.reporter.info(&format!("Marking {name} as trusted"));
                self.host.channels.set_trusted(name)
            }
            ChannelState::Unconfigured => {
                self.reporter
                    .info(&format!("Registering {name} as a trusted channel"));
                self.host
                    .channels
                    .register_trusted(name, self.config.channel.source_location.as_deref())
            }
        });

        match prepared {
            Ok(()) => ChannelUsability::Usable,
            Err(e) => {
                tracing::debug!(channel = name, error = %e, "channel preparation failed");
                self.reporter.warn(&format!(
                    "Channel {name} cannot be used this run ({e}); the module will be downloaded directly if needed"
                ));
                ChannelUsability::Unusable(e.to_string())
            }
        }
    }

    fn ensure_module(&self, channel: &ChannelUsability) -> Result<Acquisition, ModuleError> {
        let name = self.config.module.name.as_str();
        self.reporter.step(&format!("Ensuring module {name}"));

        match self.host.modules.installed(name) {
            Presence::Present(version) => {
                self.reporter
                    .success(&format!("{name} {version} is already installed"));
                return Ok(Acquisition::AlreadyPresent { version });
            }
            Presence::Absent => self.reporter.info(&format!("{name} is not installed")),
            // Unknown state is handled exactly like absence
            Presence::QueryFailed(reason) => self.reporter.warn(&format!(
                "Could not query module {name} ({reason}); treating it as not installed"
            )),
        }

        if let ChannelUsability::Unusable(reason) = channel {
            self.reporter
                .detail(&format!("Skipping {}: {reason}", self.config.channel.name));
        } else {
            match self
                .host
                .modules
                .install(name, InstallOptions::machine_wide_clobber())
            {
                Ok(version) => {
                    self.reporter.success(&format!("Installed {name} {version}"));
                    return Ok(Acquisition::Primary { version });
                }
                Err(e) => self.reporter.warn(&format!(
                    "Installing {name} from {} failed ({e}); falling back to direct download",
                    self.config.channel.name
                )),
            }
        }

        let report = FallbackInstaller::new(
            self.gallery,
            &self.config.module_root,
            &self.config.staging_root,
            self.reporter,
        )
        .install(name)
        .map_err(|source| ModuleError::FallbackInstallFailed {
            module: name.to_string(),
            source,
        })?;

        self.reporter.success(&format!(
            "Installed {name} {} to {}",
            report.version,
            report.destination.display()
        ));
        Ok(Acquisition::Fallback(report))
    }

    fn import_module(&self) -> Result<(), ModuleError> {
        let name = self.config.module.name.as_str();
        self.host
            .modules
            .import(name, true)
            .map_err(|source| ModuleError::ImportFailed {
                module: name.to_string(),
                source,
            })?;
        self.reporter.detail(&format!("Imported {name}"));
        Ok(())
    }

    fn repair(&self) -> Result<RepairOutcome, ModuleError> {
        self.reporter.step("Repairing the package manager");

        match self.host.engine.repair(&RepairRequest::all_users_latest()) {
            Ok(()) => {
                self.reporter.success("Package manager repaired");
                Ok(RepairOutcome::Repaired)
            }
            Err(source) => match self.config.repair_policy {
                RepairPolicy::Fatal => Err(ModuleError::RepairFailed { source }),
                RepairPolicy::Warn => {
                    self.reporter
                        .warn(&format!("Repairing the package manager failed: {source}"));
                    Ok(RepairOutcome::FailedWithWarning(source.to_string()))
                }
            },
        }
    }
}
