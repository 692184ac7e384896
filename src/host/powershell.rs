//! Host capabilities backed by a PowerShell process
//!
//! Each call runs `<shell> -NoProfile -NonInteractive -Command <script>` and reads stdout.
//! A non-zero exit status is a failure; stderr becomes the reported cause.

use std::cell::Cell;
use std::process::Command;

use super::script;
use super::{
    ChannelRegistry, ChannelState, InstallOptions, ModuleRegistry, PackageEngine, Presence,
    ProviderRegistry, TlsPolicy,
};
use crate::engine::{PackageInstallRequest, RepairRequest};
use crate::error::HostError;

/// Runs host operations through a PowerShell executable
#[derive(Debug)]
pub struct PowerShellHost {
    /// Shell executable (`powershell.exe`, `pwsh`, or a full path)
    shell: String,

    /// Set once TLS 1.2 has been enforced; every later script re-applies it
    tls12: Cell<bool>,
}

impl PowerShellHost {
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
            tls12: Cell::new(false),
        }
    }

    /// The script actually sent to the shell
    fn compose(&self, body: &str) -> String {
        if self.tls12.get() {
            format!("{}; {body}", script::TLS12)
        } else {
            body.to_string()
        }
    }

    fn run(&self, operation: &str, body: &str) -> Result<String, HostError> {
        let command = self.compose(body);
        tracing::debug!(shell = %self.shell, operation, script = %command, "running host command");

        let output = Command::new(&self.shell)
            .args(["-NoProfile", "-NonInteractive", "-Command", &command])
            .output()
            .map_err(|e| HostError::SpawnFailed {
                program: self.shell.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(HostError::CommandFailed {
                operation: operation.to_string(),
                code: output.status.code().unwrap_or(-1),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn run_version(&self, operation: &str, body: &str) -> Result<String, HostError> {
        let output = self.run(operation, body)?;
        // Cmdlets may emit informational lines first; the version is printed last
        match output.lines().last().map(str::trim) {
            Some(version) if !version.is_empty() => Ok(version.to_string()),
            _ => Err(HostError::UnexpectedOutput {
                operation: operation.to_string(),
                output,
            }),
        }
    }
}

impl TlsPolicy for PowerShellHost {
    fn require_tls12(&self) -> Result<(), HostError> {
        self.run("SecurityProtocol", script::TLS12)?;
        self.tls12.set(true);
        Ok(())
    }
}

impl ProviderRegistry for PowerShellHost {
    fn installed(&self, name: &str) -> Presence {
        Presence::from_query(self.run("Get-PackageProvider", &script::provider_query(name)))
    }

    fn install(
        &self,
        name: &str,
        minimum_version: Option<&str>,
        options: InstallOptions,
    ) -> Result<String, HostError> {
        self.run_version(
            "Install-PackageProvider",
            &script::provider_install(name, minimum_version, options),
        )
    }

    fn import(&self, name: &str, force: bool) -> Result<(), HostError> {
        self.run("Import-PackageProvider", &script::provider_import(name, force))
            .map(|_| ())
    }
}

impl ModuleRegistry for PowerShellHost {
    fn installed(&self, name: &str) -> Presence {
        Presence::from_query(self.run("Get-Module", &script::module_query(name)))
    }

    fn install(&self, name: &str, options: InstallOptions) -> Result<String, HostError> {
        self.run_version("Install-Module", &script::module_install(name, options))
    }

    fn import(&self, name: &str, force: bool) -> Result<(), HostError> {
        self.run("Import-Module", &script::module_import(name, force))
            .map(|_| ())
    }
}

impl ChannelRegistry for PowerShellHost {
    fn state(&self, name: &str) -> Result<ChannelState, HostError> {
        let output = self.run("Get-PSRepository", &script::channel_state(name))?;
        match output.lines().last().map(str::trim) {
            Some(script::CHANNEL_UNCONFIGURED) => Ok(ChannelState::Unconfigured),
            Some(script::CHANNEL_UNTRUSTED) => Ok(ChannelState::Untrusted),
            Some(script::CHANNEL_TRUSTED) => Ok(ChannelState::Trusted),
            _ => Err(HostError::UnexpectedOutput {
                operation: "Get-PSRepository".to_string(),
                output,
            }),
        }
    }

    fn register_trusted(
        &self,
        name: &str,
        source_location: Option<&str>,
    ) -> Result<(), HostError> {
        self.run(
            "Register-PSRepository",
            &script::channel_register_trusted(name, source_location),
        )
        .map(|_| ())
    }

    fn set_trusted(&self, name: &str) -> Result<(), HostError> {
        self.run("Set-PSRepository", &script::channel_set_trusted(name))
            .map(|_| ())
    }
}

impl PackageEngine for PowerShellHost {
    fn repair(&self, request: &RepairRequest) -> Result<(), HostError> {
        self.run("Repair-WinGetPackageManager", &script::engine_repair(request))
            .map(|_| ())
    }

    fn install_package(&self, request: &PackageInstallRequest) -> Result<(), HostError> {
        self.run("Install-WinGetPackage", &script::package_install(request))
            .map(|_| ())
    }
}
