//! Archive extraction and module placement

use std::fs::{self, File};
use std::io;
use std::path::{Component, Path};

use walkdir::WalkDir;

use crate::error::FallbackError;
use crate::ui::{ProgressKind, Reporter};

/// Path segments that only exist to package the archive
const PACKAGING_DIRS: &[&str] = &["_rels", "package"];

/// Extensions of package manifests
const MANIFEST_EXTENSIONS: &[&str] = &["nuspec"];

/// Open Packaging Conventions content-type manifest at the archive root
const CONTENT_TYPES_FILE: &str = "[Content_Types].xml";

/// Whether a path relative to the extracted archive is packaging metadata rather than module content
pub fn is_packaging_artifact(relative: &Path) -> bool {
    let in_packaging_dir = relative.components().any(|component| {
        matches!(component, Component::Normal(segment)
            if PACKAGING_DIRS.iter().any(|dir| segment == *dir))
    });
    if in_packaging_dir {
        return true;
    }

    let is_manifest = relative
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            MANIFEST_EXTENSIONS
                .iter()
                .any(|m| ext.eq_ignore_ascii_case(m))
        });

    is_manifest || relative.file_name().is_some_and(|name| name == CONTENT_TYPES_FILE)
}

/// Extract a zip container into `dest`; returns the number of files written
///
/// Entries that would land outside `dest` are rejected.
pub fn extract_archive(archive_path: &Path, dest: &Path) -> Result<usize, FallbackError> {
    let extract_error = |reason: String| FallbackError::Extract {
        archive: archive_path.display().to_string(),
        reason,
    };

    let file = File::open(archive_path).map_err(|e| extract_error(e.to_string()))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| extract_error(e.to_string()))?;
    fs::create_dir_all(dest).map_err(|e| extract_error(e.to_string()))?;

    let mut written = 0;
    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| extract_error(e.to_string()))?;
        let Some(relative) = entry.enclosed_name() else {
            return Err(extract_error(format!(
                "unsupported or malicious path in archive: {}",
                entry.name()
            )));
        };

        let out_path = dest.join(&relative);
        if entry.is_dir() {
            fs::create_dir_all(&out_path).map_err(|e| extract_error(e.to_string()))?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(|e| extract_error(e.to_string()))?;
        }

        let mut out = File::create(&out_path)
            .map_err(|e| extract_error(format!("create {}: {e}", out_path.display())))?;
        io::copy(&mut entry, &mut out)
            .map_err(|e| extract_error(format!("extract {}: {e}", relative.display())))?;
        written += 1;
    }

    tracing::debug!(files = written, dest = %dest.display(), "archive extracted");
    Ok(written)
}

/// Replace `destination` with the module content of `extracted`; returns the number of files copied
///
/// An existing destination is replaced, so files from an earlier install never survive. It is
/// left untouched when the extracted tree holds nothing but packaging artifacts.
/// Packaging artifacts are skipped and the relative layout is preserved.
pub fn place_module(
    extracted: &Path,
    destination: &Path,
    reporter: &dyn Reporter,
) -> Result<usize, FallbackError> {
    let install_error = |reason: String| FallbackError::Install {
        path: destination.display().to_string(),
        reason,
    };

    let mut files = Vec::new();
    for entry in WalkDir::new(extracted).min_depth(1) {
        let entry = entry.map_err(|e| install_error(e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(extracted)
            .map_err(|e| install_error(e.to_string()))?
            .to_path_buf();
        if is_packaging_artifact(&relative) {
            tracing::debug!(path = %relative.display(), "skipping packaging artifact");
            continue;
        }
        files.push((entry.path().to_path_buf(), relative));
    }

    if files.is_empty() {
        return Err(install_error(format!("{} holds no module files", extracted.display())));
    }

    if destination.exists() {
        reporter.detail(&format!("Removing existing {}", destination.display()));
        fs::remove_dir_all(destination).map_err(|e| install_error(e.to_string()))?;
    }
    fs::create_dir_all(destination).map_err(|e| install_error(e.to_string()))?;

    let pb = reporter.progress_bar(ProgressKind::Items, Some(files.len() as u64), "files");
    for (source, relative) in &files {
        let target = destination.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| install_error(e.to_string()))?;
        }
        fs::copy(source, &target)
            .map_err(|e| install_error(format!("copy {}: {e}", relative.display())))?;
        pb.inc(1);
    }
    pb.finish_and_clear();

    Ok(files.len())
}
