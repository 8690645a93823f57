//! HTTP server answering `GET /<prefix>/<channel>/latest.json`.
//!
//! Everything else, including other methods on the same path, is a 404.
//! Upstream failures become a bare 500; details only go to the log.

use crate::channel::Channel;
use crate::config::UpdaterConfig;
use crate::descriptor::Updater;
use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
};
use std::sync::Arc;
use thiserror::Error;

/// Last path segment of the descriptor route.
const LATEST: &str = "latest.json";

const NOT_FOUND: (StatusCode, &str) = (StatusCode::NOT_FOUND, "Not found");
const UPSTREAM_FAILED: (StatusCode, &str) = (
    StatusCode::INTERNAL_SERVER_ERROR,
    "Failed to fetch latest version",
);

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Shared server state.
pub struct AppState {
    prefix: String,
    updater: Updater,
}

impl AppState {
    pub fn new(prefix: impl Into<String>, updater: Updater) -> Self {
        Self {
            prefix: prefix.into(),
            updater,
        }
    }
}

/// Build the routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/{*path}", get(latest).fallback(not_found))
        .fallback(not_found)
        .with_state(state)
}

/// Start the HTTP server and run until it fails.
pub async fn run(config: &UpdaterConfig) -> Result<(), ServeError> {
    let prefix = config.server.prefix();
    let state = Arc::new(AppState::new(prefix, Updater::from_config(config)));

    let addr = format!("{}:{}", config.server.host(), config.server.port());
    let listener = tokio::net::TcpListener::bind(addr.as_str())
        .await
        .map_err(|source| ServeError::Bind {
            addr: addr.clone(),
            source,
        })?;

    tracing::info!("serving update descriptors at http://{addr}/{prefix}/{{channel}}/{LATEST}");

    axum::serve(listener, router(state))
        .await
        .map_err(ServeError::Serve)
}

/// Channel named by `/<prefix>/<channel>/latest.json`, if `path` has exactly
/// that shape. Leading and trailing slashes are ignored.
pub fn parse_latest_path(path: &str, prefix: &str) -> Option<Channel> {
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    let [first, channel, last] = segments.as_slice() else {
        return None;
    };
    if first.is_empty() || *first != prefix || *last != LATEST {
        return None;
    }
    channel.parse().ok()
}

async fn not_found() -> (StatusCode, &'static str) {
    NOT_FOUND
}

async fn latest(State(state): State<Arc<AppState>>, uri: Uri) -> Response {
    let Ok(path) = urlencoding::decode(uri.path()) else {
        return NOT_FOUND.into_response();
    };
    let Some(channel) = parse_latest_path(&path, &state.prefix) else {
        return NOT_FOUND.into_response();
    };

    let task_state = state.clone();
    let result = tokio::task::spawn_blocking(move || task_state.updater.latest(channel)).await;

    match result {
        Ok(Ok(descriptor)) => {
            tracing::info!(%channel, version = %descriptor.version, "served latest version");
            Json(descriptor).into_response()
        }
        Ok(Err(e)) => {
            tracing::warn!(%channel, error = %e, "failed to fetch latest version");
            UPSTREAM_FAILED.into_response()
        }
        Err(e) => {
            tracing::error!(%channel, error = %e, "version lookup task failed");
            UPSTREAM_FAILED.into_response()
        }
    }
}
