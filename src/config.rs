//! Scraper configuration
//!
//! Every URL, the target year and the request limits are carried in a
//! `ScraperConfig` that is handed to each client, so tests can point the
//! clients at fixture pages instead of the live sites.

use std::time::Duration;

/// Search endpoint of the sun/solar-time site
pub const DEFAULT_SUN_BASE_URL: &str = "https://www.timeanddate.com/sun/";

/// Listing page enumerating all California state parks
pub const DEFAULT_LISTING_URL: &str =
    "https://en.wikipedia.org/wiki/List_of_California_state_parks#List_of_parks";

/// Base that relative detail-page links are resolved against
pub const DEFAULT_WIKI_BASE_URL: &str = "https://en.wikipedia.org";

/// Year used when the caller does not name one
pub const DEFAULT_YEAR: i32 = 2024;

/// Configuration shared by all retrieval clients
#[derive(Debug, Clone, PartialEq)]
pub struct ScraperConfig {
    /// Search endpoint that resolves a location name to its sun page
    pub sun_base_url: String,
    /// Listing page holding the park table
    pub listing_url: String,
    /// Base URL for resolving detail-page links
    pub wiki_base_url: String,
    /// Target year for the astronomical pipeline
    pub year: i32,
    /// Maximum number of requests in flight per batch
    pub concurrency: usize,
    /// Per-request timeout
    pub timeout: Duration,
    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            sun_base_url: DEFAULT_SUN_BASE_URL.to_string(),
            listing_url: DEFAULT_LISTING_URL.to_string(),
            wiki_base_url: DEFAULT_WIKI_BASE_URL.to_string(),
            year: DEFAULT_YEAR,
            concurrency: 4,
            timeout: Duration::from_secs(30),
            user_agent: concat!("parkscout/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ScraperConfig {
    /// Sets the target year
    pub fn with_year(mut self, year: i32) -> Self {
        self.year = year;
        self
    }

    /// Sets the number of concurrent requests (values below 1 act as 1)
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Sets the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Points the sun pipeline at a different search endpoint
    pub fn with_sun_base_url(mut self, url: impl Into<String>) -> Self {
        self.sun_base_url = url.into();
        self
    }

    /// Points the metadata pipeline at a different listing page and link base
    pub fn with_listing(mut self, listing_url: impl Into<String>, wiki_base_url: impl Into<String>) -> Self {
        self.listing_url = listing_url.into();
        self.wiki_base_url = wiki_base_url.into();
        self
    }

    /// Concurrency limit as used by the fetch loops
    pub(crate) fn effective_concurrency(&self) -> usize {
        self.concurrency.max(1)
    }
}
