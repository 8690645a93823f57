//! Update-descriptor endpoint for the Selene client.
//!
//! Answers `GET /<prefix>/<channel>/latest.json` with the newest build
//! published to the channel's Nexus repository, rewritten to public download
//! URLs, plus the libraries that build needs.

pub mod channel;
pub mod config;
pub mod descriptor;
pub mod logging;
pub mod serve;

pub use channel::Channel;
pub use config::UpdaterConfig;
pub use descriptor::{UpdateDescriptor, Updater};
