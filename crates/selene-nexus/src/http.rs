//! Blocking HTTP client for repository queries.

use crate::NexusError;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Source of response bodies for a URL.
///
/// Resolvers only ever issue plain GETs, so this is the whole surface they
/// need. Implementations map failures onto [`NexusError::Transport`] and
/// [`NexusError::Status`].
pub trait Fetch: Send + Sync {
    /// Perform a GET request and return the response body as a string.
    fn get(&self, url: &str) -> Result<String, NexusError>;
}

/// [`Fetch`] backed by a shared `ureq` agent.
pub struct UreqFetch {
    agent: ureq::Agent,
}

impl UreqFetch {
    /// Create a client. `timeout` bounds each whole request; `None` keeps
    /// ureq's defaults.
    pub fn new(timeout: Option<Duration>) -> Self {
        let mut builder = ureq::AgentBuilder::new()
            .user_agent(concat!("selene-updater/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Self {
            agent: builder.build(),
        }
    }
}

impl Default for UreqFetch {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Fetch for UreqFetch {
    fn get(&self, url: &str) -> Result<String, NexusError> {
        let response = self.agent.get(url).call().map_err(|e| match e {
            ureq::Error::Status(status, response) => NexusError::Status {
                url: url.to_string(),
                status,
                status_text: response.status_text().to_string(),
            },
            ureq::Error::Transport(t) => NexusError::Transport {
                url: url.to_string(),
                message: t.to_string(),
            },
        })?;

        response.into_string().map_err(|e| NexusError::Transport {
            url: url.to_string(),
            message: format!("failed to read response: {}", e),
        })
    }
}

/// Fetch `url` and decode the body as JSON.
pub fn get_json<T: DeserializeOwned>(fetch: &dyn Fetch, url: &str) -> Result<T, NexusError> {
    let body = fetch.get(url)?;
    serde_json::from_str(&body).map_err(|e| NexusError::Decode {
        url: url.to_string(),
        message: e.to_string(),
    })
}

#[cfg(any(test, feature = "test-support"))]
pub use stub::StubFetch;

#[cfg(any(test, feature = "test-support"))]
mod stub {
    use super::Fetch;
    use crate::NexusError;
    use std::collections::HashMap;
    use std::sync::Mutex;

    enum Reply {
        Body(String),
        Status(u16, String),
        Transport(String),
    }

    /// In-memory [`Fetch`] keyed by exact URL.
    ///
    /// Unknown URLs answer `404 Not Found`. Every requested URL is recorded
    /// so tests can check which outbound calls were made.
    #[derive(Default)]
    pub struct StubFetch {
        replies: HashMap<String, Reply>,
        requests: Mutex<Vec<String>>,
    }

    impl StubFetch {
        pub fn new() -> Self {
            Self::default()
        }

        /// Answer `url` with a 200 and `body`.
        pub fn with_body(mut self, url: &str, body: impl Into<String>) -> Self {
            self.replies.insert(url.to_string(), Reply::Body(body.into()));
            self
        }

        /// Answer `url` with a non-success status.
        pub fn with_status(mut self, url: &str, status: u16, status_text: &str) -> Self {
            self.replies
                .insert(url.to_string(), Reply::Status(status, status_text.to_string()));
            self
        }

        /// Fail `url` as if the connection could not be made.
        pub fn with_transport_error(mut self, url: &str, message: &str) -> Self {
            self.replies
                .insert(url.to_string(), Reply::Transport(message.to_string()));
            self
        }

        /// URLs requested so far, in order.
        pub fn requests(&self) -> Vec<String> {
            self.requests
                .lock()
                .map(|requests| requests.clone())
                .unwrap_or_default()
        }
    }

    impl Fetch for StubFetch {
        fn get(&self, url: &str) -> Result<String, NexusError> {
            if let Ok(mut requests) = self.requests.lock() {
                requests.push(url.to_string());
            }
            match self.replies.get(url) {
                Some(Reply::Body(body)) => Ok(body.clone()),
                Some(Reply::Status(status, text)) => Err(NexusError::Status {
                    url: url.to_string(),
                    status: *status,
                    status_text: text.clone(),
                }),
                Some(Reply::Transport(message)) => Err(NexusError::Transport {
                    url: url.to_string(),
                    message: message.clone(),
                }),
                None => Err(NexusError::Status {
                    url: url.to_string(),
                    status: 404,
                    status_text: "Not Found".to_string(),
                }),
            }
        }
    }
}
