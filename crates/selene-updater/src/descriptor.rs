//! Assembly of the update descriptor served to clients.

use crate::channel::Channel;
use crate::config::{ChannelsConfig, UpdaterConfig, UpstreamConfig};
use selene_nexus::{
    Fetch, NexusError, SearchQuery, UreqFetch, UrlRewriter, extract_file_name, resolve_latest,
    resolve_libraries,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// JSON document consumed by the client's updater.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateDescriptor {
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pub_date: Option<String>,
    /// Public download URL of the application jar.
    pub url: String,
    #[serde(rename = "fileName")]
    pub file_name: String,
    /// Library file name to public download URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub libraries: Option<BTreeMap<String, String>>,
}

/// Resolves descriptors for each channel against one upstream.
pub struct Updater {
    fetch: Arc<dyn Fetch>,
    upstream: UpstreamConfig,
    channels: ChannelsConfig,
    rewriter: UrlRewriter,
}

impl Updater {
    pub fn new(fetch: Arc<dyn Fetch>, config: &UpdaterConfig) -> Self {
        Self {
            fetch,
            rewriter: config.upstream.rewriter(),
            upstream: config.upstream.clone(),
            channels: config.channels.clone(),
        }
    }

    /// Updater talking to the real repository over HTTP.
    pub fn from_config(config: &UpdaterConfig) -> Self {
        Self::new(Arc::new(UreqFetch::new(config.upstream.timeout())), config)
    }

    /// Upstream repository backing `channel`.
    pub fn repository(&self, channel: Channel) -> &str {
        self.channels.repository(channel)
    }

    /// Build the descriptor for the newest build on `channel`.
    ///
    /// Fails only if the version lookup fails. A missing or broken libraries
    /// manifest is logged and leaves `libraries` unset.
    pub fn latest(&self, channel: Channel) -> Result<UpdateDescriptor, NexusError> {
        let query = SearchQuery::new(
            self.repository(channel),
            self.upstream.group(),
            self.upstream.artifact(),
        );
        let resolved = resolve_latest(self.fetch.as_ref(), self.upstream.search_url(), &query)?;

        let libraries = match resolved.manifest_url.as_deref() {
            Some(manifest_url) => {
                let manifest_url = self.rewriter.to_public(manifest_url);
                match resolve_libraries(
                    self.fetch.as_ref(),
                    &manifest_url,
                    self.upstream.public_base(),
                ) {
                    Ok(libraries) => Some(libraries),
                    Err(e) => {
                        tracing::warn!(%channel, error = %e, "failed to resolve libraries manifest");
                        None
                    }
                }
            }
            None => {
                tracing::info!(%channel, version = %resolved.version, "no libraries manifest published");
                None
            }
        };

        let url = self.rewriter.to_public(&resolved.distributable_url);
        let file_name = extract_file_name(&url).to_string();

        Ok(UpdateDescriptor {
            version: resolved.version,
            pub_date: resolved.published,
            url,
            file_name,
            libraries,
        })
    }
}
