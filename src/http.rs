//! Page fetching
//!
//! All retrieval goes through the [`PageSource`] trait. [`HttpSource`] is the
//! reqwest-backed implementation used against the live sites;
//! [`FixtureSource`] serves canned HTML from memory so the pipelines can be
//! exercised without network access.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;

use reqwest::Client;
use thiserror::Error;

use crate::config::ScraperConfig;

/// Errors that can occur while fetching a page
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, timeout or body decoding failure
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    /// A URL could not be built or resolved
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// A fetched HTML page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Final URL after redirects
    pub url: String,
    /// Response body
    pub body: String,
}

/// Something that can turn a URL into a page
pub trait PageSource {
    /// Fetches `url`, following redirects. Non-success statuses are errors.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Page, FetchError>> + Send;
}

/// Fetches pages over HTTP with reqwest
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    /// Creates a source whose client carries the configured timeout and user agent
    pub fn new(config: &ScraperConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client })
    }

    /// Creates a source around an existing HTTP client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl PageSource for HttpSource {
    async fn fetch(&self, url: &str) -> Result<Page, FetchError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().to_string();
        let body = response.text().await?;

        Ok(Page {
            url: final_url,
            body,
        })
    }
}

/// In-memory page source keyed by exact URL
///
/// Unknown URLs answer with a 404 status error. Redirects are applied once
/// before the lookup, and every requested URL is recorded in request order.
#[derive(Debug, Default)]
pub struct FixtureSource {
    pages: HashMap<String, String>,
    redirects: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl FixtureSource {
    /// Creates an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `body` for `url`
    pub fn with_page(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.pages.insert(url.into(), body.into());
        self
    }

    /// Redirects requests for `from` to `to`
    pub fn with_redirect(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.redirects.insert(from.into(), to.into());
        self
    }

    /// URLs requested so far
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

impl PageSource for FixtureSource {
    async fn fetch(&self, url: &str) -> Result<Page, FetchError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.to_string());
        }

        let target = self.redirects.get(url).map(String::as_str).unwrap_or(url);

        match self.pages.get(target) {
            Some(body) => Ok(Page {
                url: target.to_string(),
                body: body.clone(),
            }),
            None => Err(FetchError::Status {
                url: target.to_string(),
                status: 404,
            }),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixture {
    //! Page sources that answer out of order, for concurrency tests

    use std::time::Duration;

    use super::{FetchError, FixtureSource, Page, PageSource};

    /// Wraps a [`FixtureSource`] and holds each answer for a per-URL delay
    #[derive(Debug)]
    pub struct DelayedSource {
        pub inner: FixtureSource,
        pub delay: fn(&str) -> Duration,
    }

    impl PageSource for DelayedSource {
        async fn fetch(&self, url: &str) -> Result<Page, FetchError> {
            tokio::time::sleep((self.delay)(url)).await;
            self.inner.fetch(url).await
        }
    }
}
