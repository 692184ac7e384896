//! Direct-download acquisition of a module
//!
//! Used when the primary channel cannot be used or its install failed:
//! 1. Ask the gallery for the newest version
//! 2. Download the versioned archive into a fresh staging directory
//! 3. Extract it into `<staging>/extracted`
//! 4. Replace `<module root>/<module>/<version>` with the module content
//!
//! The staging directory is removed afterwards whatever the outcome.

mod archive;

pub use archive::{extract_archive, place_module};

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::FallbackError;
use crate::gallery::Gallery;
use crate::temp::STAGING_PREFIX;
use crate::ui::Reporter;

/// Uniquely named scratch directory, removed on release or drop
///
/// Removal errors are ignored.
#[derive(Debug)]
pub struct StagingArea {
    dir: TempDir,
}

impl StagingArea {
    /// Create a new staging directory under `root` (created if missing)
    pub fn create(root: &Path) -> Result<Self, FallbackError> {
        let staging_error = |e: std::io::Error| FallbackError::Staging {
            root: root.display().to_string(),
            reason: e.to_string(),
        };

        fs::create_dir_all(root).map_err(staging_error)?;
        let dir = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(root)
            .map_err(staging_error)?;

        tracing::debug!(path = %dir.path().display(), "created staging directory");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Where the archive is unpacked
    pub fn extracted_dir(&self) -> PathBuf {
        self.dir.path().join("extracted")
    }

    /// Remove the staging directory now
    pub fn release(self) {
        let path = self.dir.path().to_path_buf();
        if let Err(e) = self.dir.close() {
            tracing::debug!(path = %path.display(), error = %e, "ignoring staging cleanup failure");
        }
    }
}

/// Where a module version lives under the machine-wide module root
pub fn module_install_path(module_root: &Path, module: &str, version: &str) -> PathBuf {
    module_root.join(module).join(version)
}

/// Outcome of a successful fallback install
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementReport {
    pub version: String,
    pub destination: PathBuf,
    pub files_copied: usize,
}

/// Fallback installer over a gallery
pub struct FallbackInstaller<'a> {
    gallery: &'a dyn Gallery,
    module_root: &'a Path,
    staging_root: &'a Path,
    reporter: &'a dyn Reporter,
}

impl<'a> FallbackInstaller<'a> {
    pub fn new(
        gallery: &'a dyn Gallery,
        module_root: &'a Path,
        staging_root: &'a Path,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Self {
            gallery,
            module_root,
            staging_root,
            reporter,
        }
    }

    /// Install the newest version of `module` by direct download
    pub fn install(&self, module: &str) -> Result<PlacementReport, FallbackError> {
        let version = self.gallery.latest_version(module)?;
        self.reporter
            .info(&format!("Newest {module} in the gallery: {version}"));

        let staging = StagingArea::create(self.staging_root)?;
        let result = self.install_staged(module, &version, &staging);
        staging.release();
        result
    }

    fn install_staged(
        &self,
        module: &str,
        version: &str,
        staging: &StagingArea,
    ) -> Result<PlacementReport, FallbackError> {
        self.reporter
            .gate_progress_step(&format!("download of {module} {version}"))?;
        let archive = self
            .gallery
            .download(module, version, staging.path(), self.reporter)?;
        self.reporter
            .detail(&format!("Downloaded {}", archive.display()));

        let extracted = staging.extracted_dir();
        extract_archive(&archive, &extracted)?;

        let destination = module_install_path(self.module_root, module, version);
        let files_copied = place_module(&extracted, &destination, self.reporter)?;
        self.reporter.detail(&format!(
            "Copied {files_copied} files to {}",
            destination.display()
        ));

        Ok(PlacementReport {
            version: version.to_string(),
            destination,
            files_copied,
        })
    }
}
