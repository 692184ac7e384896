//! Distribution gallery: version metadata and versioned package archives
//!
//! The gallery speaks NuGet v2 OData. Only two requests are needed by the fallback path:
//! - the newest version of a package, by exact id
//! - the package archive (a zip container) for that version

mod http;

pub use http::HttpGallery;

use std::path::{Path, PathBuf};

use reqwest::Url;
use serde::Deserialize;

use crate::error::FallbackError;
use crate::ui::Reporter;

/// Read access to the distribution gallery
pub trait Gallery {
    /// Newest published version of `module`
    fn latest_version(&self, module: &str) -> Result<String, FallbackError>;

    /// Download the archive for `module` at `version` into `dest_dir`; returns the file path
    fn download(
        &self,
        module: &str,
        version: &str,
        dest_dir: &Path,
        reporter: &dyn Reporter,
    ) -> Result<PathBuf, FallbackError>;
}

/// A package entry of a metadata listing
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PackageDescriptor {
    #[serde(rename = "Id", alias = "id")]
    pub id: String,

    #[serde(rename = "Version", alias = "version")]
    pub version: String,
}

/// JSON envelopes a v2 feed may wrap the listing in
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Listing {
    Verbose { d: VerboseBody },
    Light { value: Vec<PackageDescriptor> },
    Bare(Vec<PackageDescriptor>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum VerboseBody {
    Results { results: Vec<PackageDescriptor> },
    List(Vec<PackageDescriptor>),
}

impl Listing {
    fn into_descriptors(self) -> Vec<PackageDescriptor> {
        match self {
            Listing::Verbose {
                d: VerboseBody::Results { results },
            } => results,
            Listing::Verbose {
                d: VerboseBody::List(list),
            }
            | Listing::Light { value: list }
            | Listing::Bare(list) => list,
        }
    }
}

/// First listed version whose id matches `module` exactly (case-insensitive, as ids are)
///
/// The query asks the gallery for descending version order, so the first match is the newest.
pub fn latest_from_listing(json: &str, module: &str) -> Result<Option<String>, serde_json::Error> {
    let listing: Listing = serde_json::from_str(json)?;
    Ok(listing
        .into_descriptors()
        .into_iter()
        .find(|d| d.id.eq_ignore_ascii_case(module))
        .map(|d| d.version))
}

fn trimmed_base(api_base: &str) -> &str {
    api_base.trim_end_matches('/')
}

/// `<base>/Packages()?$filter=Id eq '<module>'&$orderby=Version desc&$top=1`
pub fn metadata_url(api_base: &str, module: &str) -> Result<Url, FallbackError> {
    let raw = format!("{}/Packages()", trimmed_base(api_base));
    let mut url = Url::parse(&raw).map_err(|e| FallbackError::Metadata {
        url: raw.clone(),
        reason: e.to_string(),
    })?;
    url.query_pairs_mut()
        .append_pair("$filter", &format!("Id eq '{}'", module.replace('\'', "''")))
        .append_pair("$orderby", "Version desc")
        .append_pair("$top", "1");
    Ok(url)
}

/// `<base>/package/<module>/<version>`
pub fn archive_url(api_base: &str, module: &str, version: &str) -> String {
    format!("{}/package/{module}/{version}", trimmed_base(api_base))
}

/// File name the downloaded archive is stored under
pub fn archive_file_name(module: &str, version: &str) -> String {
    format!("{module}.{version}.nupkg")
}
