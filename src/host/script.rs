//! PowerShell script builders
//!
//! Pure functions so the generated commands can be checked without a shell. Every
//! caller-supplied value goes through [`quote`].

use crate::engine::{PackageInstallRequest, PackageSelector, RepairRequest, RepairTarget};
use crate::host::{InstallOptions, Scope};

/// Adds TLS 1.2 to the session's allowed protocols
pub const TLS12: &str = "[Net.ServicePointManager]::SecurityProtocol = \
     [Net.ServicePointManager]::SecurityProtocol -bor [Net.SecurityProtocolType]::Tls12";

/// Marker lines printed by the channel state query
pub const CHANNEL_UNCONFIGURED: &str = "Unconfigured";
pub const CHANNEL_UNTRUSTED: &str = "Untrusted";
pub const CHANNEL_TRUSTED: &str = "Trusted";

/// Single-quoted PowerShell string literal
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn install_switches(options: InstallOptions) -> String {
    let mut switches = format!(" -Scope {}", options.scope.as_str());
    if options.force {
        switches.push_str(" -Force");
    }
    if options.allow_clobber {
        switches.push_str(" -AllowClobber");
    }
    switches
}

fn newest_module_version(name: &str) -> String {
    format!(
        "$m = Get-Module -ListAvailable -Name {} -ErrorAction Stop | \
         Sort-Object Version -Descending | Select-Object -First 1; \
         if ($m) {{ $m.Version.ToString() }}",
        quote(name)
    )
}

pub fn provider_query(name: &str) -> String {
    format!(
        "$p = Get-PackageProvider -ListAvailable -Name {} -ErrorAction SilentlyContinue | \
         Sort-Object Version -Descending | Select-Object -First 1; \
         if ($p) {{ $p.Version.ToString() }}",
        quote(name)
    )
}

pub fn provider_install(
    name: &str,
    minimum_version: Option<&str>,
    options: InstallOptions,
) -> String {
    let minimum = minimum_version
        .map(|v| format!(" -MinimumVersion {}", quote(v)))
        .unwrap_or_default();
    format!(
        "$p = Install-PackageProvider -Name {}{}{} -ErrorAction Stop; $p.Version.ToString()",
        quote(name),
        minimum,
        install_switches(InstallOptions {
            allow_clobber: false,
            ..options
        })
    )
}

pub fn provider_import(name: &str, force: bool) -> String {
    format!(
        "Import-PackageProvider -Name {}{} -ErrorAction Stop | Out-Null",
        quote(name),
        if force { " -Force" } else { "" }
    )
}

pub fn module_query(name: &str) -> String {
    newest_module_version(name)
}

pub fn module_install(name: &str, options: InstallOptions) -> String {
    format!(
        "Install-Module -Name {}{} -ErrorAction Stop; {}",
        quote(name),
        install_switches(options),
        newest_module_version(name)
    )
}

pub fn module_import(name: &str, force: bool) -> String {
    format!(
        "Import-Module -Name {}{} -ErrorAction Stop",
        quote(name),
        if force { " -Force" } else { "" }
    )
}

pub fn channel_state(name: &str) -> String {
    format!(
        "$r = Get-PSRepository -Name {} -ErrorAction SilentlyContinue; \
         if (-not $r) {{ '{CHANNEL_UNCONFIGURED}' }} \
         elseif ($r.InstallationPolicy -eq 'Trusted') {{ '{CHANNEL_TRUSTED}' }} \
         else {{ '{CHANNEL_UNTRUSTED}' }}",
        quote(name)
    )
}

pub fn channel_register_trusted(name: &str, source_location: Option<&str>) -> String {
    match source_location {
        Some(location) => format!(
            "Register-PSRepository -Name {} -SourceLocation {} -InstallationPolicy Trusted -ErrorAction Stop",
            quote(name),
            quote(location)
        ),
        None => "Register-PSRepository -Default -InstallationPolicy Trusted -ErrorAction Stop"
            .to_string(),
    }
}

pub fn channel_set_trusted(name: &str) -> String {
    format!(
        "Set-PSRepository -Name {} -InstallationPolicy Trusted -ErrorAction Stop",
        quote(name)
    )
}

pub fn engine_repair(request: &RepairRequest) -> String {
    let mut script = String::from("Repair-WinGetPackageManager");
    if request.scope == Scope::AllUsers {
        script.push_str(" -AllUsers");
    }
    if request.force {
        script.push_str(" -Force");
    }
    match request.target {
        RepairTarget::Latest => script.push_str(" -Latest"),
    }
    script.push_str(" -ErrorAction Stop");
    script
}

pub fn package_install(request: &PackageInstallRequest) -> String {
    let mut script = String::from("Install-WinGetPackage");
    match &request.selector {
        PackageSelector::Id(id) => script.push_str(&format!(" -Id {}", quote(id))),
        PackageSelector::Name(name) => script.push_str(&format!(" -Name {}", quote(name))),
    }
    if let Some(args) = &request.override_args {
        script.push_str(&format!(" -Override {}", quote(args)));
    }
    script.push_str(&format!(" -Scope {}", request.scope.as_str()));
    script.push_str(&format!(" -Mode {}", request.mode.as_str()));
    if request.force {
        script.push_str(" -Force");
    }
    if request.allow_hash_mismatch {
        script.push_str(" -AllowHashMismatch");
    }
    if let Some(source) = &request.source {
        script.push_str(&format!(" -Source {}", quote(source)));
    }
    script.push_str(" -ErrorAction Stop");
    script
}
