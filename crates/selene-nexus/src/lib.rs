//! Nexus repository queries for the Selene updater.
//!
//! Resolves the newest published build of an artifact through the Nexus
//! search API, rewrites internal repository URLs into public ones and expands
//! the companion `libraries.json` manifest into downloadable files.
//!
//! # Example
//!
//! ```ignore
//! use selene_nexus::{DEFAULT_SEARCH_URL, SearchQuery, UreqFetch, UrlRewriter, resolve_latest};
//!
//! let fetch = UreqFetch::new(None);
//! let query = SearchQuery::new("maven-snapshots", "world.selene", "selene-client");
//! let resolved = resolve_latest(&fetch, DEFAULT_SEARCH_URL, &query)?;
//! println!("{} -> {}", resolved.version, UrlRewriter::default().to_public(&resolved.distributable_url));
//! ```

pub mod http;
pub mod libraries;
pub mod search;
pub mod url;

pub use http::{Fetch, UreqFetch};
#[cfg(any(test, feature = "test-support"))]
pub use http::StubFetch;
pub use libraries::{LibrariesManifest, LibraryEntry, resolve_libraries};
pub use search::{ResolvedVersion, SearchQuery, resolve_latest};
pub use url::{UrlRewriter, extract_file_name};

use thiserror::Error;

/// Nexus search endpoint used when nothing else is configured.
pub const DEFAULT_SEARCH_URL: &str = "https://maven.twelveiterations.com/service/rest/v1/search";

/// Public repository root that library downloads are served from.
pub const DEFAULT_PUBLIC_BASE: &str = "https://maven.twelveiterations.com/repository/selene-public";

/// Errors raised while talking to the repository.
#[derive(Debug, Error)]
pub enum NexusError {
    /// The request could not be sent or the body could not be read.
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
    /// The repository answered with a non-success status.
    #[error("{url} returned HTTP {status} {status_text}")]
    Status {
        url: String,
        status: u16,
        status_text: String,
    },
    /// The body was not the JSON document we expected.
    #[error("failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },
    /// The search matched nothing.
    #[error("no items found for {group}:{artifact} in {repository}")]
    EmptySearchResult {
        repository: String,
        group: String,
        artifact: String,
    },
    /// The newest item has no `dist` jar attached.
    #[error("no dist jar asset found for version {version}")]
    MissingDistributable { version: String },
}
