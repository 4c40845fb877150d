//! Plain HTTP fetcher.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use navtree_shared::{FetchConfig, NavTreeError, Result};

use crate::{PageFetcher, USER_AGENT, ensure_http};

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 5;

/// Maximum response size we accept (20 MB).
const MAX_RESPONSE_SIZE: u64 = 20 * 1024 * 1024;

/// Fetches the server-rendered HTML with a single GET.
pub struct HttpFetcher {
    client: Client,
    timeout_secs: u64,
}

impl HttpFetcher {
    /// Build a client with the configured request timeout.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| NavTreeError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            timeout_secs: config.request_timeout_secs,
        })
    }
}

impl PageFetcher for HttpFetcher {
    #[instrument(skip_all, fields(url = %url))]
    async fn fetch(&self, url: &Url) -> Result<String> {
        ensure_http(url)?;
        debug!("fetching page over HTTP");

        let response = self.client.get(url.as_str()).send().await.map_err(|e| {
            if e.is_timeout() {
                NavTreeError::FetchTimeout {
                    url: url.to_string(),
                    waited_secs: self.timeout_secs,
                }
            } else {
                NavTreeError::Network(format!("{url}: {e}"))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(NavTreeError::Network(format!("{url}: HTTP {status}")));
        }

        if let Some(len) = response.content_length() {
            if len > MAX_RESPONSE_SIZE {
                return Err(NavTreeError::validation(format!(
                    "{url}: response too large ({len} bytes, max {MAX_RESPONSE_SIZE})"
                )));
            }
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                NavTreeError::FetchTimeout {
                    url: url.to_string(),
                    waited_secs: self.timeout_secs,
                }
            } else {
                NavTreeError::Network(format!("{url}: failed to read body: {e}"))
            }
        })?;

        // Chunked responses carry no length header.
        if body.len() as u64 > MAX_RESPONSE_SIZE {
            return Err(NavTreeError::validation(format!(
                "{url}: response too large ({} bytes, max {MAX_RESPONSE_SIZE})",
                body.len()
            )));
        }

        debug!(bytes = body.len(), %status, "page fetched");
        Ok(body)
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher(timeout_secs: u64) -> HttpFetcher {
        let config = FetchConfig {
            request_timeout_secs: timeout_secs,
            ..FetchConfig::default()
        };
        HttpFetcher::new(&config).unwrap()
    }

    #[tokio::test]
    async fn fetches_page_body() {
        let server = wiremock::MockServer::start().await;
        let page = r#"<html><body><ul class="nav"><li>Functions</li></ul></body></html>"#;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/lambda/latest/dg/welcome.html"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(page))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/lambda/latest/dg/welcome.html", server.uri())).unwrap();
        let html = fetcher(5).fetch(&url).await.unwrap();

        assert_eq!(html, page);
    }

    #[tokio::test]
    async fn http_error_status_is_network_error() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/missing.html"))
            .respond_with(wiremock::ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/missing.html", server.uri())).unwrap();
        let err = fetcher(5).fetch(&url).await.unwrap_err();

        assert!(matches!(err, NavTreeError::Network(_)));
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn slow_response_times_out() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .set_body_string("<html></html>")
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let url = Url::parse(&server.uri()).unwrap();
        let err = fetcher(1).fetch(&url).await.unwrap_err();

        assert!(matches!(
            err,
            NavTreeError::FetchTimeout { waited_secs: 1, .. }
        ));
    }

    #[tokio::test]
    async fn oversized_response_is_rejected() {
        let server = wiremock::MockServer::start().await;
        let body = "x".repeat(MAX_RESPONSE_SIZE as usize + 1);

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let url = Url::parse(&server.uri()).unwrap();
        let err = fetcher(30).fetch(&url).await.unwrap_err();

        assert!(matches!(err, NavTreeError::Validation { .. }));
        assert!(err.to_string().contains("too large"));
    }

    #[tokio::test]
    async fn rejects_non_http_url() {
        let url = Url::parse("ftp://docs.example.com/welcome.html").unwrap();
        let err = fetcher(5).fetch(&url).await.unwrap_err();
        assert!(matches!(err, NavTreeError::Validation { .. }));
    }
}
