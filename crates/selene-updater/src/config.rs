//! Configuration for the updater endpoint.
//!
//! Loads config from:
//! 1. An explicit `--config <path>`, or
//! 2. Global: ~/.config/selene-updater/config.toml
//!
//! Missing files fall back to built-in defaults. Every value is optional.
//!
//! Example config.toml:
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//! prefix = "selene-client"     # requests go to /<prefix>/<channel>/latest.json
//!
//! [upstream]
//! search_url = "https://maven.twelveiterations.com/service/rest/v1/search"
//! public_base = "https://maven.twelveiterations.com/repository/selene-public"
//! group = "world.selene"
//! artifact = "selene-client"
//! internal_repositories = ["maven-releases", "maven-snapshots"]
//! public_repository = "selene-public"
//! timeout_secs = 30            # default: no timeout beyond the client's own
//!
//! [channels]
//! stable = "maven-snapshots"   # no stable releases yet
//! experimental = "maven-snapshots"
//!
//! [log]
//! filter = "info"              # RUST_LOG takes precedence
//! ```

use crate::channel::Channel;
use selene_nexus::{DEFAULT_PUBLIC_BASE, DEFAULT_SEARCH_URL, UrlRewriter};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    /// First path segment of the descriptor route.
    pub prefix: Option<String>,
}

impl ServerConfig {
    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or("0.0.0.0")
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(8080)
    }

    pub fn prefix(&self) -> &str {
        self.prefix
            .as_deref()
            .map(|prefix| prefix.trim_matches('/'))
            .unwrap_or("selene-client")
    }
}

/// Where builds are looked up and how their URLs are made public.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct UpstreamConfig {
    pub search_url: Option<String>,
    pub public_base: Option<String>,
    pub group: Option<String>,
    pub artifact: Option<String>,
    pub internal_repositories: Option<Vec<String>>,
    pub public_repository: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl UpstreamConfig {
    pub fn search_url(&self) -> &str {
        self.search_url.as_deref().unwrap_or(DEFAULT_SEARCH_URL)
    }

    pub fn public_base(&self) -> &str {
        self.public_base.as_deref().unwrap_or(DEFAULT_PUBLIC_BASE)
    }

    pub fn group(&self) -> &str {
        self.group.as_deref().unwrap_or("world.selene")
    }

    pub fn artifact(&self) -> &str {
        self.artifact.as_deref().unwrap_or("selene-client")
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn rewriter(&self) -> UrlRewriter {
        let defaults = UrlRewriter::default();
        UrlRewriter::new(
            self.internal_repositories
                .clone()
                .unwrap_or_else(|| defaults.internal_repositories().to_vec()),
            self.public_repository
                .clone()
                .unwrap_or_else(|| defaults.public_repository().to_string()),
        )
    }
}

/// Upstream repository each channel reads from.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ChannelsConfig {
    pub stable: Option<String>,
    pub experimental: Option<String>,
}

impl ChannelsConfig {
    pub fn repository(&self, channel: Channel) -> &str {
        let configured = match channel {
            Channel::Stable => self.stable.as_deref(),
            Channel::Experimental => self.experimental.as_deref(),
        };
        // TODO: point stable at maven-releases once the first stable build ships.
        configured.unwrap_or("maven-snapshots")
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LogConfig {
    pub filter: Option<String>,
}

impl LogConfig {
    pub fn filter(&self) -> &str {
        self.filter.as_deref().unwrap_or("info")
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct UpdaterConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub channels: ChannelsConfig,
    pub log: LogConfig,
}

impl UpdaterConfig {
    /// Load the explicit config file if given, else the global one.
    ///
    /// An explicit path must exist; a missing global file means defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_file(path);
        }
        match Self::global_config_path() {
            Some(path) if path.exists() => Self::load_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Get the global config path.
    fn global_config_path() -> Option<PathBuf> {
        let config_home = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .ok()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))?;
        Some(config_home.join("selene-updater").join("config.toml"))
    }

    /// Load config from a file path.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = UpdaterConfig::default();
        assert_eq!(config.server.port(), 8080);
        assert_eq!(config.server.host(), "0.0.0.0");
        assert_eq!(config.server.prefix(), "selene-client");
        assert_eq!(config.upstream.search_url(), DEFAULT_SEARCH_URL);
        assert_eq!(config.upstream.group(), "world.selene");
        assert_eq!(config.upstream.artifact(), "selene-client");
        assert_eq!(config.upstream.timeout(), None);
        assert_eq!(config.upstream.rewriter(), UrlRewriter::default());
        assert_eq!(config.log.filter(), "info");
    }

    #[test]
    fn test_both_channels_default_to_snapshots() {
        let channels = ChannelsConfig::default();
        assert_eq!(channels.repository(Channel::Stable), "maven-snapshots");
        assert_eq!(channels.repository(Channel::Experimental), "maven-snapshots");
    }

    #[test]
    fn test_load_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9000
prefix = "/game-client/"

[upstream]
search_url = "http://localhost:8081/service/rest/v1/search"
internal_repositories = ["hosted"]
public_repository = "public"
timeout_secs = 5

[channels]
stable = "maven-releases"
"#
        )
        .unwrap();

        let config = UpdaterConfig::load(Some(&path)).unwrap();
        assert_eq!(config.server.port(), 9000);
        assert_eq!(config.server.host(), "0.0.0.0");
        assert_eq!(config.server.prefix(), "game-client");
        assert_eq!(
            config.upstream.search_url(),
            "http://localhost:8081/service/rest/v1/search"
        );
        assert_eq!(config.upstream.timeout(), Some(Duration::from_secs(5)));
        assert_eq!(
            config.upstream.rewriter().to_public("http://r/hosted/a.jar"),
            "http://r/public/a.jar"
        );
        assert_eq!(config.channels.repository(Channel::Stable), "maven-releases");
        assert_eq!(
            config.channels.repository(Channel::Experimental),
            "maven-snapshots"
        );
    }

    #[test]
    fn test_public_repository_only() {
        let config: UpdaterConfig = toml::from_str(
            r#"
[upstream]
public_repository = "mirror"
"#,
        )
        .unwrap();
        assert_eq!(
            config.upstream.rewriter().to_public("https://r/maven-releases/a.jar"),
            "https://r/mirror/a.jar"
        );
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = UpdaterConfig::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = \"eighty\"\n").unwrap();
        let err = UpdaterConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().starts_with("invalid config"));
    }
}
