//! Headless Chrome fetcher.
//!
//! Each fetch launches its own browser, navigates one tab, polls
//! `document.readyState` until it reports `complete`, and captures the
//! rendered document. The browser is owned by the fetch call, so the Chrome
//! process is torn down on every exit path, including errors.

use std::ffi::OsStr;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use headless_chrome::{Browser, Tab};
use tracing::{debug, info, instrument, warn};
use url::Url;

use navtree_shared::{FetchConfig, NavTreeError, Result};

use crate::{PageFetcher, ensure_http};

/// Script evaluated to read the document's load state.
const READY_STATE_JS: &str = "document.readyState";

/// Launch and wait settings for one browser session.
#[derive(Debug, Clone)]
struct BrowserOptions {
    headless: bool,
    sandbox: bool,
    chrome_path: Option<PathBuf>,
    ready_timeout: Duration,
    poll_interval: Duration,
}

/// Renders pages in headless Chrome before capturing their HTML.
pub struct BrowserFetcher {
    options: BrowserOptions,
}

impl BrowserFetcher {
    /// Build a fetcher from the `[fetch]` config section.
    pub fn new(config: &FetchConfig) -> Self {
        Self {
            options: BrowserOptions {
                headless: config.headless,
                sandbox: config.sandbox,
                chrome_path: config.chrome_path.clone(),
                ready_timeout: Duration::from_secs(config.ready_timeout_secs),
                poll_interval: Duration::from_millis(config.poll_interval_ms.max(10)),
            },
        }
    }
}

impl PageFetcher for BrowserFetcher {
    #[instrument(skip_all, fields(url = %url))]
    async fn fetch(&self, url: &Url) -> Result<String> {
        ensure_http(url)?;

        let options = self.options.clone();
        let target = url.to_string();

        // CDP calls block; keep them off the async workers.
        tokio::task::spawn_blocking(move || render_page(&options, &target))
            .await
            .map_err(|e| NavTreeError::Browser(format!("browser task failed: {e}")))?
    }

    fn name(&self) -> &str {
        "browser"
    }
}

/// Launch Chrome, load `url`, and return its HTML once ready.
fn render_page(options: &BrowserOptions, url: &str) -> Result<String> {
    let browser = launch(options)?;
    info!(url, "fetching HTML");

    let tab = browser
        .new_tab()
        .map_err(|e| NavTreeError::Browser(format!("failed to create tab: {e}")))?;
    // Navigation and the ready-state wait share one bound.
    let started = Instant::now();
    tab.set_default_timeout(options.ready_timeout);

    tab.navigate_to(url)
        .map_err(|e| NavTreeError::Browser(format!("failed to navigate to {url}: {e}")))?;

    wait_until_ready(&tab, url, options, started)?;

    // The wait shrank the tab timeout to whatever budget was left.
    tab.set_default_timeout(options.ready_timeout);
    let html = tab
        .get_content()
        .map_err(|e| NavTreeError::Browser(format!("failed to read page content: {e}")))?;

    debug!(bytes = html.len(), "page rendered");
    Ok(html)
}

fn launch(options: &BrowserOptions) -> Result<Browser> {
    let mut launch_opts = headless_chrome::LaunchOptions::default();
    launch_opts.headless = options.headless;
    launch_opts.sandbox = options.sandbox;
    launch_opts.args.push(OsStr::new("--disable-dev-shm-usage"));

    if let Some(path) = &options.chrome_path {
        launch_opts.path = Some(path.clone());
    }

    debug!(
        headless = options.headless,
        sandbox = options.sandbox,
        "launching Chrome"
    );

    Browser::new(launch_opts)
        .map_err(|e| NavTreeError::Browser(format!("failed to launch Chrome: {e}")))
}

/// Poll `document.readyState` until it is `complete` or the bound, counted
/// from `started`, elapses.
fn wait_until_ready(
    tab: &Tab,
    url: &str,
    options: &BrowserOptions,
    started: Instant,
) -> Result<()> {
    loop {
        let Some(remaining) = remaining_budget(started.elapsed(), options.ready_timeout) else {
            warn!(url, "page never reached ready state");
            return Err(NavTreeError::FetchTimeout {
                url: url.to_string(),
                waited_secs: options.ready_timeout.as_secs(),
            });
        };

        // A stalled evaluate may not outlast the overall bound.
        tab.set_default_timeout(remaining);
        match tab.evaluate(READY_STATE_JS, false) {
            Ok(result) => {
                let state = result.value.as_ref().and_then(|v| v.as_str());
                if state == Some("complete") {
                    debug!(elapsed_ms = started.elapsed().as_millis(), "document ready");
                    return Ok(());
                }
            }
            // The execution context is replaced mid-navigation; retry.
            Err(e) => debug!(error = %e, "ready-state check failed"),
        }

        if let Some(remaining) = remaining_budget(started.elapsed(), options.ready_timeout) {
            std::thread::sleep(options.poll_interval.min(remaining));
        }
    }
}

/// Time left before `limit`, or `None` once it has passed.
fn remaining_budget(elapsed: Duration, limit: Duration) -> Option<Duration> {
    limit.checked_sub(elapsed).filter(|left| !left.is_zero())
}
