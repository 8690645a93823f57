//! Latest-version lookup through the Nexus search API.
//!
//! ## API Strategy
//! - `GET {search_url}?repository={repo}&group={group}&name={artifact}&sort=version`
//! - Only the first item is considered; Nexus returns the newest version first
//!   for `sort=version`.
//! - The item's assets are scanned once for the `dist` jar and the
//!   `libraries` JSON manifest.

use crate::NexusError;
use crate::http::{Fetch, get_json};
use serde::Deserialize;

/// Asset attributes marking the application jar.
const DIST: (&str, &str) = ("dist", "jar");
/// Asset attributes marking the libraries manifest.
const LIBRARIES: (&str, &str) = ("libraries", "json");

/// Which artifact to look up, and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub repository: String,
    pub group: String,
    pub artifact: String,
}

impl SearchQuery {
    pub fn new(
        repository: impl Into<String>,
        group: impl Into<String>,
        artifact: impl Into<String>,
    ) -> Self {
        Self {
            repository: repository.into(),
            group: group.into(),
            artifact: artifact.into(),
        }
    }

    /// Full search URL for this query against `search_url`.
    pub fn url(&self, search_url: &str) -> String {
        format!(
            "{}?repository={}&group={}&name={}&sort=version",
            search_url,
            urlencoding::encode(&self.repository),
            urlencoding::encode(&self.group),
            urlencoding::encode(&self.artifact)
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
pub struct SearchItem {
    pub version: String,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    #[serde(default)]
    pub download_url: String,
    #[serde(default)]
    pub last_modified: Option<String>,
    #[serde(default)]
    pub maven2: Maven2Attributes,
}

impl Asset {
    fn is(&self, (classifier, extension): (&str, &str)) -> bool {
        self.maven2.classifier.as_deref() == Some(classifier)
            && self.maven2.extension.as_deref() == Some(extension)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Maven2Attributes {
    #[serde(default)]
    pub classifier: Option<String>,
    #[serde(default)]
    pub extension: Option<String>,
}

/// Newest published build of an artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersion {
    pub version: String,
    /// Download URL of the `dist` jar, as reported by the repository.
    pub distributable_url: String,
    /// Download URL of the `libraries` manifest, if one was published.
    pub manifest_url: Option<String>,
    /// Last-modified timestamp of the `dist` jar.
    pub published: Option<String>,
}

/// Look up the newest version of `query` and locate its assets.
pub fn resolve_latest(
    fetch: &dyn Fetch,
    search_url: &str,
    query: &SearchQuery,
) -> Result<ResolvedVersion, NexusError> {
    let response: SearchResponse = get_json(fetch, &query.url(search_url))?;

    let item = response
        .items
        .into_iter()
        .next()
        .ok_or_else(|| NexusError::EmptySearchResult {
            repository: query.repository.clone(),
            group: query.group.clone(),
            artifact: query.artifact.clone(),
        })?;

    let mut distributable = None;
    let mut manifest_url = None;
    // Duplicates are not expected; when they occur the last asset wins.
    for asset in item.assets {
        if asset.is(DIST) {
            distributable = Some(asset);
        } else if asset.is(LIBRARIES) {
            manifest_url = Some(asset.download_url);
        }
    }

    // An asset without a download URL is as good as no asset.
    let manifest_url = manifest_url.filter(|url| !url.is_empty());
    let Some(distributable) = distributable.filter(|asset| !asset.download_url.is_empty()) else {
        return Err(NexusError::MissingDistributable {
            version: item.version,
        });
    };

    tracing::debug!(
        repository = %query.repository,
        version = %item.version,
        "resolved latest version"
    );

    Ok(ResolvedVersion {
        version: item.version,
        distributable_url: distributable.download_url,
        manifest_url,
        published: distributable.last_modified.filter(|date| !date.is_empty()),
    })
}
