//! Test fixtures and recording fakes for the host and gallery collaborators.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_fixtures::{FakeHost, FakeGallery, RecordingReporter};
//!
//! #[test]
//! fn my_test() {
//!     let mut host = FakeHost::default();
//!     host.provider_presence = Presence::Absent;
//!     // ... run the workflow ...
//!     assert_eq!(host.count("provider.install"), 1);
//! }
//! ```

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use indicatif::ProgressBar;
use tempfile::TempDir;

use crate::engine::{PackageInstallRequest, RepairRequest};
use crate::error::{FallbackError, HostError, ProgressGateError};
use crate::gallery::{self, Gallery};
use crate::host::{
    ChannelRegistry, ChannelState, InstallOptions, ModuleRegistry, PackageEngine, Presence,
    ProviderRegistry, TlsPolicy,
};
use crate::ui::{ProgressKind, Reporter};

/// Create a temp directory in the system temp location.
///
/// # Panics
///
/// Panics if the temp directory cannot be created.
#[must_use]
pub fn create_temp_dir() -> TempDir {
    TempDir::new_in(crate::temp::temp_dir_base()).expect("Failed to create temp directory")
}

/// Whether `path` is an existing directory with no entries
pub fn dir_is_empty(path: &Path) -> bool {
    std::fs::read_dir(path)
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(false)
}

/// Build a zip container in memory
pub fn zip_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);
    for (name, content) in entries {
        writer.start_file(*name, options).expect("start zip entry");
        writer.write_all(content.as_bytes()).expect("write zip entry");
    }
    writer.finish().expect("finish zip").into_inner()
}

/// Write a zip container to `path`
pub fn write_zip(path: &Path, entries: &[(&str, &str)]) {
    std::fs::write(path, zip_bytes(entries)).expect("write zip file");
}

/// A package archive with one module file and the usual packaging artifacts
pub fn sample_module_archive() -> Vec<u8> {
    zip_bytes(&[
        ("lib/Module.psm1", "function Get-Thing { 'thing' }"),
        ("package/services/metadata.xml", "<coreProperties/>"),
        ("_rels/.rels", "<Relationships/>"),
        ("Module.nuspec", "<package/>"),
    ])
}

pub const FAKE_GALLERY_BASE: &str = "https://gallery.test/api/v2";

/// In-memory gallery serving one version and one archive
pub struct FakeGallery {
    version: Result<String, String>,
    archive: Vec<u8>,
    /// URLs of every archive download, in order
    pub download_urls: RefCell<Vec<String>>,
    /// Directories the archives were downloaded into
    pub download_dirs: RefCell<Vec<PathBuf>>,
}

impl FakeGallery {
    pub fn serving(version: &str, archive: Vec<u8>) -> Self {
        Self {
            version: Ok(version.to_string()),
            archive,
            download_urls: RefCell::new(Vec::new()),
            download_dirs: RefCell::new(Vec::new()),
        }
    }

    pub fn failing_metadata(reason: &str) -> Self {
        Self {
            version: Err(reason.to_string()),
            ..Self::serving("0.0.0", Vec::new())
        }
    }
}

impl Gallery for FakeGallery {
    fn latest_version(&self, module: &str) -> Result<String, FallbackError> {
        self.version.clone().map_err(|reason| FallbackError::Metadata {
            url: gallery::metadata_url(FAKE_GALLERY_BASE, module)
                .map(|u| u.to_string())
                .unwrap_or_default(),
            reason,
        })
    }

    fn download(
        &self,
        module: &str,
        version: &str,
        dest_dir: &Path,
        _reporter: &dyn Reporter,
    ) -> Result<PathBuf, FallbackError> {
        self.download_urls
            .borrow_mut()
            .push(gallery::archive_url(FAKE_GALLERY_BASE, module, version));
        self.download_dirs.borrow_mut().push(dest_dir.to_path_buf());

        let path = dest_dir.join(gallery::archive_file_name(module, version));
        std::fs::write(&path, &self.archive).map_err(|e| FallbackError::Download {
            url: gallery::archive_url(FAKE_GALLERY_BASE, module, version),
            reason: e.to_string(),
        })?;
        Ok(path)
    }
}

pub fn host_failure(operation: &str) -> HostError {
    HostError::CommandFailed {
        operation: operation.to_string(),
        code: 1,
        stderr: format!("{operation} refused"),
    }
}

/// Scriptable stand-in for every host capability; records each call in order
pub struct FakeHost {
    pub calls: RefCell<Vec<String>>,

    pub tls_result: Result<(), HostError>,

    pub provider_presence: Presence,
    /// Results of successive provider installs; once drained, installs succeed
    pub provider_installs: RefCell<VecDeque<Result<String, HostError>>>,
    pub provider_import_result: Result<(), HostError>,

    pub module_presence: Presence,
    /// Install result per module name; unlisted modules install as 1.0.0
    pub module_installs: HashMap<String, Result<String, HostError>>,
    pub module_import_result: Result<(), HostError>,

    pub channel_state: Result<ChannelState, HostError>,
    pub channel_register_result: Result<(), HostError>,
    pub channel_trust_result: Result<(), HostError>,

    pub repair_result: Result<(), HostError>,
    pub repair_requests: RefCell<Vec<RepairRequest>>,
    pub package_requests: RefCell<Vec<PackageInstallRequest>>,
}

impl Default for FakeHost {
    fn default() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            tls_result: Ok(()),
            provider_presence: Presence::Present("2.8.5.208".to_string()),
            provider_installs: RefCell::new(VecDeque::new()),
            provider_import_result: Ok(()),
            module_presence: Presence::Present("1.5.2".to_string()),
            module_installs: HashMap::new(),
            module_import_result: Ok(()),
            channel_state: Ok(ChannelState::Trusted),
            channel_register_result: Ok(()),
            channel_trust_result: Ok(()),
            repair_result: Ok(()),
            repair_requests: RefCell::new(Vec::new()),
            package_requests: RefCell::new(Vec::new()),
        }
    }
}

impl FakeHost {
    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    /// Number of recorded calls starting with `prefix`
    pub fn count(&self, prefix: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    /// Recorded calls starting with `prefix`, in order
    pub fn calls_matching(&self, prefix: &str) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .cloned()
            .collect()
    }

    /// Queue results for successive provider installs
    pub fn queue_provider_installs(&self, results: Vec<Result<String, HostError>>) {
        self.provider_installs.borrow_mut().extend(results);
    }
}

impl TlsPolicy for FakeHost {
    fn require_tls12(&self) -> Result<(), HostError> {
        self.record("tls.require12".to_string());
        self.tls_result.clone()
    }
}

impl ProviderRegistry for FakeHost {
    fn installed(&self, name: &str) -> Presence {
        self.record(format!("provider.query {name}"));
        self.provider_presence.clone()
    }

    fn install(
        &self,
        name: &str,
        _minimum_version: Option<&str>,
        options: InstallOptions,
    ) -> Result<String, HostError> {
        self.record(format!(
            "provider.install {name} scope={} force={}",
            options.scope.as_str(),
            options.force
        ));
        self.provider_installs
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok("2.8.5.208".to_string()))
    }

    fn import(&self, name: &str, force: bool) -> Result<(), HostError> {
        self.record(format!("provider.import {name} force={force}"));
        self.provider_import_result.clone()
    }
}

impl ModuleRegistry for FakeHost {
    fn installed(&self, name: &str) -> Presence {
        self.record(format!("module.query {name}"));
        self.module_presence.clone()
    }

    fn install(&self, name: &str, options: InstallOptions) -> Result<String, HostError> {
        self.record(format!(
            "module.install {name} scope={} force={} clobber={}",
            options.scope.as_str(),
            options.force,
            options.allow_clobber
        ));
        self.module_installs
            .get(name)
            .cloned()
            .unwrap_or_else(|| Ok("1.0.0".to_string()))
    }

    fn import(&self, name: &str, force: bool) -> Result<(), HostError> {
        self.record(format!("module.import {name} force={force}"));
        self.module_import_result.clone()
    }
}

impl ChannelRegistry for FakeHost {
    fn state(&self, name: &str) -> Result<ChannelState, HostError> {
        self.record(format!("channel.state {name}"));
        self.channel_state.clone()
    }

    fn register_trusted(
        &self,
        name: &str,
        source_location: Option<&str>,
    ) -> Result<(), HostError> {
        self.record(format!(
            "channel.register {name} source={}",
            source_location.unwrap_or("default")
        ));
        self.channel_register_result.clone()
    }

    fn set_trusted(&self, name: &str) -> Result<(), HostError> {
        self.record(format!("channel.trust {name}"));
        self.channel_trust_result.clone()
    }
}

impl PackageEngine for FakeHost {
    fn repair(&self, request: &RepairRequest) -> Result<(), HostError> {
        self.record("engine.repair".to_string());
        self.repair_requests.borrow_mut().push(request.clone());
        self.repair_result.clone()
    }

    fn install_package(&self, request: &PackageInstallRequest) -> Result<(), HostError> {
        self.record("engine.install_package".to_string());
        self.package_requests.borrow_mut().push(request.clone());
        Ok(())
    }
}

/// Reporter that prints nothing and lets every step run
#[derive(Default)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn step(&self, _message: &str) {}

    fn info(&self, _message: &str) {}

    fn success(&self, _message: &str) {}

    fn warn(&self, _message: &str) {}

    fn detail(&self, _message: &str) {}

    fn progress_bar(&self, _kind: ProgressKind, _len: Option<u64>, _message: &str) -> ProgressBar {
        ProgressBar::hidden()
    }

    fn gate_progress_step(&self, _step: &str) -> Result<(), ProgressGateError> {
        Ok(())
    }
}

/// Reporter that keeps every message for assertions
#[derive(Default)]
pub struct RecordingReporter {
    pub warnings: RefCell<Vec<String>>,
    pub messages: RefCell<Vec<String>>,
    pub gate_error: Option<ProgressGateError>,
}

impl RecordingReporter {
    pub fn warned_about(&self, needle: &str) -> bool {
        self.warnings.borrow().iter().any(|w| w.contains(needle))
    }
}

impl Reporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }

    fn info(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }

    fn success(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }

    fn warn(&self, message: &str) {
        self.warnings.borrow_mut().push(message.to_string());
    }

    fn detail(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }

    fn progress_bar(&self, _kind: ProgressKind, _len: Option<u64>, _message: &str) -> ProgressBar {
        ProgressBar::hidden()
    }

    fn gate_progress_step(&self, _step: &str) -> Result<(), ProgressGateError> {
        match &self.gate_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}
