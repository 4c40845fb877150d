//! Page fetching: URL in, fully rendered HTML out.
//!
//! Two interchangeable implementations of [`PageFetcher`]:
//! - [`BrowserFetcher`]: drives headless Chrome and waits for
//!   `document.readyState == "complete"` (feature `browser`, on by default)
//! - [`HttpFetcher`]: a plain HTTP GET for pages that need no script execution
//!
//! [`Fetcher`] picks one from configuration.

#[cfg(feature = "browser")]
mod browser;
mod http;

use std::future::Future;

use url::Url;

use navtree_shared::{FetchConfig, FetcherKind, NavTreeError, Result};

#[cfg(feature = "browser")]
pub use browser::BrowserFetcher;
pub use http::HttpFetcher;

/// User-Agent string for fetch requests.
pub(crate) const USER_AGENT: &str = concat!("navtree/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Something that can turn a URL into the page's final HTML.
pub trait PageFetcher {
    /// Fetch `url` and return the document HTML once it is ready.
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<String>> + Send;

    /// Human-readable fetcher name for tracing.
    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Config-selected fetcher
// ---------------------------------------------------------------------------

/// The fetcher chosen by `defaults.fetcher`.
pub enum Fetcher {
    #[cfg(feature = "browser")]
    Browser(BrowserFetcher),
    Http(HttpFetcher),
}

impl Fetcher {
    /// Build the fetcher of the given kind from the `[fetch]` config section.
    pub fn from_config(kind: FetcherKind, config: &FetchConfig) -> Result<Self> {
        match kind {
            #[cfg(feature = "browser")]
            FetcherKind::Browser => Ok(Self::Browser(BrowserFetcher::new(config))),
            #[cfg(not(feature = "browser"))]
            FetcherKind::Browser => Err(NavTreeError::config(
                "browser fetcher unavailable: navtree-fetcher was built without the `browser` feature",
            )),
            FetcherKind::Http => Ok(Self::Http(HttpFetcher::new(config)?)),
        }
    }
}

impl PageFetcher for Fetcher {
    async fn fetch(&self, url: &Url) -> Result<String> {
        match self {
            #[cfg(feature = "browser")]
            Self::Browser(fetcher) => fetcher.fetch(url).await,
            Self::Http(fetcher) => fetcher.fetch(url).await,
        }
    }

    fn name(&self) -> &str {
        match self {
            #[cfg(feature = "browser")]
            Self::Browser(fetcher) => fetcher.name(),
            Self::Http(fetcher) => fetcher.name(),
        }
    }
}

/// Reject URLs the fetchers cannot load.
pub(crate) fn ensure_http(url: &Url) -> Result<()> {
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(NavTreeError::validation(format!(
            "unsupported URL scheme '{other}' in {url}: expected http or https"
        ))),
    }
}
