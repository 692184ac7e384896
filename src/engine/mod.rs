//! Requests sent to the package-manager engine
//!
//! The engine itself is opaque; this module only describes what is asked of it:
//! - [`RepairRequest`]: the final repair step of the bootstrap workflow
//! - [`PackageInstallRequest`]: a single package install, with every optional
//!   parameter spelled out and validated when the request is built

use serde::{Deserialize, Serialize};

use crate::error::BootstrapError;
use crate::host::Scope;

/// What a failed repair does to the overall run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepairPolicy {
    /// The repair failure is returned as an error
    #[default]
    Fatal,
    /// The repair failure is reported as a warning and the run succeeds
    Warn,
}

/// Engine version the repair should converge on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepairTarget {
    Latest,
}

/// Parameters of the engine's repair operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairRequest {
    pub scope: Scope,
    pub force: bool,
    pub target: RepairTarget,
}

impl RepairRequest {
    /// All users, forced, latest available version
    pub fn all_users_latest() -> Self {
        Self {
            scope: Scope::AllUsers,
            force: true,
            target: RepairTarget::Latest,
        }
    }
}

/// How a package is identified to the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageSelector {
    Id(String),
    Name(String),
}

/// Installer scope understood by the engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum PackageScope {
    #[default]
    Any,
    User,
    System,
    UserOrUnknown,
    SystemOrUnknown,
}

impl PackageScope {
    pub fn as_str(self) -> &'static str {
        match self {
            PackageScope::Any => "Any",
            PackageScope::User => "User",
            PackageScope::System => "System",
            PackageScope::UserOrUnknown => "UserOrUnknown",
            PackageScope::SystemOrUnknown => "SystemOrUnknown",
        }
    }
}

/// Installer UI mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum InstallMode {
    #[default]
    Default,
    Silent,
    Interactive,
}

impl InstallMode {
    pub fn as_str(self) -> &'static str {
        match self {
            InstallMode::Default => "Default",
            InstallMode::Silent => "Silent",
            InstallMode::Interactive => "Interactive",
        }
    }
}

/// A validated single-package install request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInstallRequest {
    pub selector: PackageSelector,
    pub override_args: Option<String>,
    pub scope: PackageScope,
    pub mode: InstallMode,
    pub force: bool,
    pub allow_hash_mismatch: bool,
    pub source: Option<String>,
}

impl PackageInstallRequest {
    pub fn builder() -> PackageInstallRequestBuilder {
        PackageInstallRequestBuilder::default()
    }
}

/// Builder for [`PackageInstallRequest`]
#[derive(Debug, Clone, Default)]
pub struct PackageInstallRequestBuilder {
    id: Option<String>,
    name: Option<String>,
    override_args: Option<String>,
    scope: PackageScope,
    mode: InstallMode,
    force: bool,
    allow_hash_mismatch: bool,
    source: Option<String>,
}

impl PackageInstallRequestBuilder {
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn override_args(mut self, args: Option<String>) -> Self {
        self.override_args = args;
        self
    }

    #[must_use]
    pub fn scope(mut self, scope: PackageScope) -> Self {
        self.scope = scope;
        self
    }

    #[must_use]
    pub fn mode(mut self, mode: InstallMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    #[must_use]
    pub fn allow_hash_mismatch(mut self, allow: bool) -> Self {
        self.allow_hash_mismatch = allow;
        self
    }

    #[must_use]
    pub fn source(mut self, source: Option<String>) -> Self {
        self.source = source;
        self
    }

    /// Validate and build the request. Exactly one of id and name must be set.
    pub fn build(self) -> Result<PackageInstallRequest, BootstrapError> {
        let selector = match (non_blank(self.id), non_blank(self.name)) {
            (Some(id), None) => PackageSelector::Id(id),
            (None, Some(name)) => PackageSelector::Name(name),
            (Some(_), Some(_)) => {
                return Err(BootstrapError::InvalidRequest {
                    message: "specify either a package id or a package name, not both".to_string(),
                });
            }
            (None, None) => {
                return Err(BootstrapError::InvalidRequest {
                    message: "a package id or a package name is required".to_string(),
                });
            }
        };

        Ok(PackageInstallRequest {
            selector,
            override_args: non_blank(self.override_args),
            scope: self.scope,
            mode: self.mode,
            force: self.force,
            allow_hash_mismatch: self.allow_hash_mismatch,
            source: non_blank(self.source),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repair_request_all_users_latest() {
        let request = RepairRequest::all_users_latest();
        assert_eq!(request.scope, Scope::AllUsers);
        assert!(request.force);
        assert_eq!(request.target, RepairTarget::Latest);
    }

    #[test]
    fn test_build_with_id() {
        let request = PackageInstallRequest::builder()
            .id("Git.Git")
            .scope(PackageScope::System)
            .mode(InstallMode::Silent)
            .force(true)
            .build()
            .unwrap();

        assert_eq!(request.selector, PackageSelector::Id("Git.Git".to_string()));
        assert_eq!(request.scope, PackageScope::System);
        assert_eq!(request.mode, InstallMode::Silent);
        assert!(request.force);
        assert!(!request.allow_hash_mismatch);
        assert_eq!(request.source, None);
    }

    #[test]
    fn test_build_rejects_id_and_name_together() {
        let err = PackageInstallRequest::builder()
            .id("Git.Git")
            .name("Git")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("not both"));
    }

    #[test]
    fn test_build_requires_id_or_name() {
        let err = PackageInstallRequest::builder().build().unwrap_err();
        assert!(matches!(err, BootstrapError::InvalidRequest { .. }));
    }

    #[test]
    fn test_blank_values_are_treated_as_unset() {
        let request = PackageInstallRequest::builder()
            .id("  ")
            .name("7zip")
            .override_args(Some(String::new()))
            .source(Some(" ".to_string()))
            .build()
            .unwrap();
        assert_eq!(request.selector, PackageSelector::Name("7zip".to_string()));
        assert_eq!(request.override_args, None);
        assert_eq!(request.source, None);
    }

    #[test]
    fn test_repair_policy_deserializes_lowercase() {
        let policy: RepairPolicy = serde_yaml::from_str("warn").unwrap();
        assert_eq!(policy, RepairPolicy::Warn);
    }
}
