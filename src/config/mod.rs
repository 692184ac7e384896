//! Bootstrap configuration (winget-bootstrap.yaml)
//!
//! Every field is optional; anything left out falls back to the defaults for the
//! NuGet provider, the PSGallery channel and the `Microsoft.WinGet.Client` module.
//!
//! Lookup order:
//! 1. An explicit path (`--module-path` / `WINGET_BOOTSTRAP_CONFIG`); it must exist
//! 2. `winget-bootstrap.yaml` in the user configuration directory
//! 3. Built-in defaults

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::engine::RepairPolicy;
use crate::error::{BootstrapError, Result};

/// File name looked up in the user configuration directory
pub const CONFIG_FILE_NAME: &str = "winget-bootstrap.yaml";

/// Full bootstrap configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BootstrapConfig {
    /// Package provider that must be present before any module work
    pub provider: ProviderConfig,

    /// Packaging modules refreshed when the provider install fails the first time
    pub infrastructure_modules: Vec<String>,

    /// Client module to install and import
    pub module: ModuleConfig,

    /// Primary distribution channel
    pub channel: ChannelConfig,

    /// Gallery API used by the fallback path
    pub gallery: GalleryConfig,

    /// Machine-wide module root; the fallback places files under `<root>/<module>/<version>`
    pub module_root: PathBuf,

    /// Directory under which fallback staging directories are created
    pub staging_root: PathBuf,

    /// Shell executable used to talk to the host registries
    pub shell: String,

    /// Whether a failed engine repair fails the run
    pub repair_policy: RepairPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    pub name: String,
    pub minimum_version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ModuleConfig {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ChannelConfig {
    pub name: String,

    /// Source location used when registering; `None` registers the host's default channel
    pub source_location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// OData API base, e.g. `https://www.powershellgallery.com/api/v2`
    pub api_base: String,

    /// Per-request timeout for metadata queries and archive downloads
    pub timeout_secs: u64,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            infrastructure_modules: vec![
                "PackageManagement".to_string(),
                "PowerShellGet".to_string(),
            ],
            module: ModuleConfig::default(),
            channel: ChannelConfig::default(),
            gallery: GalleryConfig::default(),
            module_root: default_module_root(),
            staging_root: crate::temp::temp_dir_base(),
            shell: default_shell().to_string(),
            repair_policy: RepairPolicy::default(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: "NuGet".to_string(),
            minimum_version: Some("2.8.5.201".to_string()),
        }
    }
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            name: "Microsoft.WinGet.Client".to_string(),
        }
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            name: "PSGallery".to_string(),
            source_location: None,
        }
    }
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            api_base: "https://www.powershellgallery.com/api/v2".to_string(),
            timeout_secs: 120,
        }
    }
}

impl GalleryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl BootstrapConfig {
    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> std::result::Result<Self, serde_yaml::Error> {
        // An empty document means "all defaults"
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml)
    }

    /// Load configuration from an explicit path, the user config directory, or defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_file(path),
            None => match user_config_path() {
                Some(path) if path.is_file() => Self::load_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Load configuration from a file that must exist
    pub fn load_file(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(BootstrapError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let yaml = std::fs::read_to_string(path).map_err(|e| BootstrapError::ConfigReadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let config = Self::from_yaml(&yaml).map_err(|e| BootstrapError::ConfigParseFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }
}

/// `winget-bootstrap.yaml` in the user configuration directory, if one exists on this platform
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("winget-bootstrap").join(CONFIG_FILE_NAME))
}

fn default_shell() -> &'static str {
    if cfg!(windows) { "powershell.exe" } else { "pwsh" }
}

fn default_module_root() -> PathBuf {
    #[cfg(windows)]
    {
        let program_files = std::env::var("ProgramFiles")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Program Files"));
        program_files.join("WindowsPowerShell").join("Modules")
    }
    #[cfg(not(windows))]
    {
        PathBuf::from("/usr/local/share/powershell/Modules")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::create_temp_dir;

    #[test]
    fn test_empty_yaml_gives_defaults() {
        let config = BootstrapConfig::from_yaml("").unwrap();
        assert_eq!(config, BootstrapConfig::default());
        assert_eq!(config.provider.name, "NuGet");
        assert_eq!(config.module.name, "Microsoft.WinGet.Client");
        assert_eq!(config.channel.name, "PSGallery");
        assert_eq!(config.repair_policy, RepairPolicy::Fatal);
        assert!(config.staging_root.is_absolute());
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let yaml = r"
module:
  name: Contoso.Tools
gallery:
  api_base: https://gallery.test/api/v2
repair_policy: warn
";
        let config = BootstrapConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.module.name, "Contoso.Tools");
        assert_eq!(config.gallery.api_base, "https://gallery.test/api/v2");
        assert_eq!(config.gallery.timeout_secs, 120);
        assert_eq!(config.repair_policy, RepairPolicy::Warn);
        assert_eq!(config.provider.name, "NuGet");
        assert_eq!(
            config.infrastructure_modules,
            vec!["PackageManagement".to_string(), "PowerShellGet".to_string()]
        );
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert!(BootstrapConfig::from_yaml("modul:\n  name: typo\n").is_err());
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let temp = create_temp_dir();
        let missing = temp.path().join("absent.yaml");
        let err = BootstrapConfig::load(Some(&missing)).unwrap_err();
        assert!(matches!(err, BootstrapError::ConfigNotFound { .. }));
    }

    #[test]
    fn test_load_explicit_file() {
        let temp = create_temp_dir();
        let path = temp.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "shell: /opt/pwsh/pwsh\n").unwrap();

        let config = BootstrapConfig::load(Some(&path)).unwrap();
        assert_eq!(config.shell, "/opt/pwsh/pwsh");
    }

    #[test]
    #[serial_test::serial]
    #[cfg(target_os = "linux")]
    fn test_load_without_path_uses_user_config_dir() {
        let temp = create_temp_dir();
        let dir = temp.path().join("winget-bootstrap");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(CONFIG_FILE_NAME), "repair_policy: warn\n").unwrap();

        let original = std::env::var("XDG_CONFIG_HOME").ok();
        unsafe {
            std::env::set_var("XDG_CONFIG_HOME", temp.path());
        }

        let config = BootstrapConfig::load(None);

        unsafe {
            if let Some(o) = original {
                std::env::set_var("XDG_CONFIG_HOME", o);
            } else {
                std::env::remove_var("XDG_CONFIG_HOME");
            }
        }

        assert_eq!(config.unwrap().repair_policy, RepairPolicy::Warn);
    }

    #[test]
    fn test_load_reports_parse_errors_with_path() {
        let temp = create_temp_dir();
        let path = temp.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "gallery: [not, a, map]\n").unwrap();

        let err = BootstrapConfig::load(Some(&path)).unwrap_err();
        match err {
            BootstrapError::ConfigParseFailed { path: p, .. } => {
                assert!(p.ends_with(CONFIG_FILE_NAME));
            }
            other => panic!("Expected ConfigParseFailed, got {other:?}"),
        }
    }
}
