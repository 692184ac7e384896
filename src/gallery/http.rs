//! Blocking HTTP client for the gallery

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::ACCEPT;

use super::{Gallery, archive_file_name, archive_url, latest_from_listing, metadata_url};
use crate::config::GalleryConfig;
use crate::error::FallbackError;
use crate::ui::{ProgressKind, Reporter};

/// Gallery reached over HTTPS with TLS 1.2 or newer
#[derive(Debug, Clone)]
pub struct HttpGallery {
    api_base: String,
    client: Client,
    timeout: Duration,
}

impl HttpGallery {
    /// Build the client with a TLS 1.2 floor and the configured timeout.
    ///
    /// If the TLS backend rejects the floor, a warning is reported and the backend default is used.
    pub fn new(config: &GalleryConfig, reporter: &dyn Reporter) -> Result<Self, FallbackError> {
        let timeout = config.timeout();
        let builder = || {
            Client::builder()
                .timeout(timeout)
                .user_agent(concat!("winget-bootstrap/", env!("CARGO_PKG_VERSION")))
        };

        let client = match builder()
            .min_tls_version(reqwest::tls::Version::TLS_1_2)
            .build()
        {
            Ok(client) => client,
            Err(e) => {
                reporter.warn(&format!(
                    "Could not require TLS 1.2 for gallery requests ({e}); using the default"
                ));
                builder().build().map_err(|e| FallbackError::Metadata {
                    url: config.api_base.clone(),
                    reason: e.to_string(),
                })?
            }
        };

        Ok(Self {
            api_base: config.api_base.clone(),
            client,
            timeout,
        })
    }

    fn timeout_error(&self, url: &str) -> FallbackError {
        FallbackError::Timeout {
            url: url.to_string(),
            seconds: self.timeout.as_secs(),
        }
    }
}

impl Gallery for HttpGallery {
    fn latest_version(&self, module: &str) -> Result<String, FallbackError> {
        let url = metadata_url(&self.api_base, module)?;
        let url_text = url.to_string();
        tracing::debug!(url = %url_text, "querying gallery metadata");

        let metadata_error = |e: reqwest::Error| {
            if is_timeout(&e) {
                self.timeout_error(&url_text)
            } else {
                FallbackError::Metadata {
                    url: url_text.clone(),
                    reason: e.to_string(),
                }
            }
        };

        let body = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .and_then(reqwest::blocking::Response::text)
            .map_err(metadata_error)?;

        let version = latest_from_listing(&body, module).map_err(|e| FallbackError::Metadata {
            url: url_text.clone(),
            reason: format!("unreadable listing: {e}"),
        })?;

        version.ok_or_else(|| FallbackError::NoVersionFound {
            module: module.to_string(),
        })
    }

    fn download(
        &self,
        module: &str,
        version: &str,
        dest_dir: &Path,
        reporter: &dyn Reporter,
    ) -> Result<PathBuf, FallbackError> {
        let url = archive_url(&self.api_base, module, version);
        tracing::debug!(url = %url, dest = %dest_dir.display(), "downloading archive");

        let download_error = |reason: String| FallbackError::Download {
            url: url.clone(),
            reason,
        };

        let response = self
            .client
            .get(&url)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|e| {
                if is_timeout(&e) {
                    self.timeout_error(&url)
                } else {
                    download_error(e.to_string())
                }
            })?;

        let path = dest_dir.join(archive_file_name(module, version));
        let mut file = File::create(&path)
            .map_err(|e| download_error(format!("cannot create {}: {e}", path.display())))?;

        let pb = reporter.progress_bar(
            ProgressKind::Bytes,
            response.content_length(),
            &format!("{module} {version}"),
        );
        let copied = io::copy(&mut pb.wrap_read(response), &mut file);
        pb.finish_and_clear();

        match copied {
            Ok(bytes) => {
                tracing::debug!(bytes, path = %path.display(), "archive downloaded");
                Ok(path)
            }
            Err(e) if is_timeout(&e) => Err(self.timeout_error(&url)),
            Err(e) => Err(download_error(e.to_string())),
        }
    }
}

/// Whether `err` or anything in its source chain is a request timeout.
///
/// Body reads surface the timeout as an `io::Error` wrapping a `reqwest::Error`, and
/// `io::Error::source` skips the wrapped error, so the payload is inspected directly.
fn is_timeout(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if e
            .downcast_ref::<reqwest::Error>()
            .is_some_and(reqwest::Error::is_timeout)
        {
            return true;
        }
        if let Some(io_err) = e.downcast_ref::<io::Error>() {
            if io_err.kind() == io::ErrorKind::TimedOut {
                return true;
            }
            if let Some(inner) = io_err.get_ref() {
                current = Some(inner as &(dyn std::error::Error + 'static));
                continue;
            }
        }
        current = e.source();
    }
    false
}
