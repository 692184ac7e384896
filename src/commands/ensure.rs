//! Ensure command implementation
//!
//! The full workflow:
//! 1. Ensure the package provider (remediating once if needed)
//! 2. Prepare the distribution channel
//! 3. Install the client module from the channel, or download it directly
//! 4. Import the module
//! 5. Repair the package manager for all users

use crate::bootstrap::{Acquisition, Collaborators, ModuleInstaller, ModuleReport, RepairOutcome};
use crate::commands::Context;
use crate::config::BootstrapConfig;
use crate::error::Result;
use crate::gallery::{Gallery, HttpGallery};
use crate::host::PowerShellHost;
use crate::ui::Reporter;

/// Run ensure command
pub fn run(ctx: &Context) -> Result<()> {
    let reporter = ctx.reporter();
    let host = PowerShellHost::new(ctx.config.shell.as_str());
    let gallery = HttpGallery::new(&ctx.config.gallery, &reporter)?;

    let report = execute(Collaborators::from_host(&host), &gallery, &ctx.config, &reporter)?;
    print_summary(&report, &ctx.config, &reporter);
    Ok(())
}

/// Run the workflow against the given collaborators
pub fn execute(
    host: Collaborators<'_>,
    gallery: &dyn Gallery,
    config: &BootstrapConfig,
    reporter: &dyn Reporter,
) -> Result<ModuleReport> {
    tracing::debug!(
        provider = %config.provider.name,
        module = %config.module.name,
        channel = %config.channel.name,
        "starting bootstrap"
    );
    let report = ModuleInstaller::new(host, gallery, config, reporter).ensure_and_repair()?;
    Ok(report)
}

fn print_summary(report: &ModuleReport, config: &BootstrapConfig, reporter: &dyn Reporter) {
    let module = &config.module.name;
    let how = match &report.acquisition {
        Acquisition::AlreadyPresent { version } => {
            format!("{module} {version} (already installed)")
        }
        Acquisition::Primary { version } => {
            format!("{module} {version} (installed from {})", config.channel.name)
        }
        Acquisition::Fallback(placement) => format!(
            "{module} {} (downloaded to {}, {} files)",
            placement.version,
            placement.destination.display(),
            placement.files_copied
        ),
    };

    reporter.step("Summary");
    reporter.info(&format!(
        "Provider: {} {}",
        config.provider.name,
        report.provider.version()
    ));
    reporter.info(&format!("Module:   {how}"));
    match &report.repair {
        RepairOutcome::Repaired => reporter.success("Package manager is ready"),
        RepairOutcome::FailedWithWarning(reason) => {
            reporter.warn(&format!("Package manager repair did not complete: {reason}"));
        }
    }
}
