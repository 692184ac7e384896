//! Provider command implementation

use crate::bootstrap::{Collaborators, ProviderBootstrapper, ProviderReadiness};
use crate::commands::Context;
use crate::config::BootstrapConfig;
use crate::error::Result;
use crate::host::PowerShellHost;
use crate::ui::Reporter;

/// Run provider command
pub fn run(ctx: &Context) -> Result<()> {
    let reporter = ctx.reporter();
    let host = PowerShellHost::new(ctx.config.shell.as_str());
    execute(Collaborators::from_host(&host), &ctx.config, &reporter)?;
    Ok(())
}

pub fn execute(
    host: Collaborators<'_>,
    config: &BootstrapConfig,
    reporter: &dyn Reporter,
) -> Result<ProviderReadiness> {
    let readiness = ProviderBootstrapper::new(host, config, reporter).ensure()?;
    reporter.success(&format!(
        "Package provider {} {} is ready",
        config.provider.name,
        readiness.version()
    ));
    Ok(readiness)
}
