//! Install-package command implementation
//!
//! Installs one package through the package manager. The request is validated before
//! the host is touched, so an invalid combination of flags never starts a shell.

use crate::cli::InstallPackageArgs;
use crate::commands::Context;
use crate::engine::{PackageInstallRequest, PackageSelector};
use crate::error::{BootstrapError, Result};
use crate::host::{PackageEngine, PowerShellHost};
use crate::ui::Reporter;

impl TryFrom<InstallPackageArgs> for PackageInstallRequest {
    type Error = BootstrapError;

    fn try_from(args: InstallPackageArgs) -> Result<Self> {
        let mut builder = PackageInstallRequest::builder()
            .override_args(args.override_args)
            .scope(args.scope)
            .mode(args.mode)
            .force(args.force)
            .allow_hash_mismatch(args.allow_hash_mismatch)
            .source(args.source);
        if let Some(id) = args.id {
            builder = builder.id(id);
        }
        if let Some(name) = args.name {
            builder = builder.name(name);
        }
        builder.build()
    }
}

/// Run install-package command
pub fn run(ctx: &Context, args: InstallPackageArgs) -> Result<()> {
    let request = PackageInstallRequest::try_from(args)?;
    let reporter = ctx.reporter();
    let host = PowerShellHost::new(ctx.config.shell.as_str());
    execute(&host, &request, &reporter)
}

pub fn execute(
    engine: &dyn PackageEngine,
    request: &PackageInstallRequest,
    reporter: &dyn Reporter,
) -> Result<()> {
    let label = match &request.selector {
        PackageSelector::Id(id) => id.as_str(),
        PackageSelector::Name(name) => name.as_str(),
    };
    reporter.step(&format!("Installing {label}"));

    engine
        .install_package(request)
        .map_err(|source| BootstrapError::PackageInstallFailed { source })?;

    reporter.success(&format!("Installed {label}"));
    Ok(())
}
