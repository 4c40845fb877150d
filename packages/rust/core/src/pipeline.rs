//! End-to-end capture pipeline: URL → fetch → extract → `documentation.json`.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{info, instrument};
use url::Url;

use navtree_extractor::{Diagnostics, Extractor};
use navtree_fetcher::PageFetcher;
use navtree_shared::{AppConfig, Documentation, MalformedItemPolicy, NavSelectors, Result};

use crate::writer;

/// Configuration for one capture run.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Page to capture; also recorded as the tree's source URL.
    pub url: Url,
    /// Output JSON file.
    pub output: PathBuf,
    /// Structural selectors for the navigation markup.
    pub selectors: NavSelectors,
    /// Policy for links missing their label.
    pub malformed: MalformedItemPolicy,
}

impl CaptureConfig {
    /// Merge the loaded app config with the resolved URL and output path.
    pub fn from_app(config: &AppConfig, url: Url, output: PathBuf) -> Self {
        Self {
            url,
            output,
            selectors: config.selectors.clone(),
            malformed: config.extract.malformed_item,
        }
    }
}

/// Result of a capture run.
#[derive(Debug)]
pub struct CaptureResult {
    /// The extracted tree, as written.
    pub documentation: Documentation,
    /// Conditions recorded during extraction.
    pub diagnostics: Diagnostics,
    /// Where the tree was written.
    pub output: PathBuf,
    /// Fetcher that produced the HTML (`"file"` for offline input).
    pub fetcher: String,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when the pipeline completes.
    fn done(&self, result: &CaptureResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn done(&self, _result: &CaptureResult) {}
}

/// Fetch the page, extract its navigation tree, and write it out.
///
/// Nothing is written unless every step succeeds.
#[instrument(skip_all, fields(url = %config.url, fetcher = fetcher.name()))]
pub async fn capture<F: PageFetcher>(
    config: &CaptureConfig,
    fetcher: &F,
    progress: &dyn ProgressReporter,
) -> Result<CaptureResult> {
    let start = Instant::now();
    // Compile selectors before launching anything, so bad config fails fast.
    let extractor = Extractor::new(&config.selectors, config.malformed)?;

    progress.phase("Fetching page");
    info!("fetching page");
    let html = fetcher.fetch(&config.url).await?;

    finish(config, &extractor, &html, fetcher.name(), start, progress)
}

/// Extract and write from HTML already on hand (e.g. a saved page).
#[instrument(skip_all, fields(url = %config.url, html_len = html.len()))]
pub fn capture_html(
    config: &CaptureConfig,
    html: &str,
    progress: &dyn ProgressReporter,
) -> Result<CaptureResult> {
    let start = Instant::now();
    let extractor = Extractor::new(&config.selectors, config.malformed)?;
    finish(config, &extractor, html, "file", start, progress)
}

fn finish(
    config: &CaptureConfig,
    extractor: &Extractor,
    html: &str,
    fetcher: &str,
    start: Instant,
    progress: &dyn ProgressReporter,
) -> Result<CaptureResult> {
    progress.phase("Extracting navigation");
    let extraction = extractor.extract(config.url.as_str(), html)?;

    progress.phase("Writing output");
    writer::write_documentation(&config.output, &extraction.documentation)?;

    let result = CaptureResult {
        documentation: extraction.documentation,
        diagnostics: extraction.diagnostics,
        output: config.output.clone(),
        fetcher: fetcher.to_string(),
        elapsed: start.elapsed(),
    };

    info!(
        sections = result.documentation.section_count(),
        nodes = result.documentation.node_count(),
        diagnostics = result.diagnostics.len(),
        output = %result.output.display(),
        elapsed_ms = result.elapsed.as_millis(),
        "documentation saved"
    );
    progress.done(&result);

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use navtree_extractor::DiagnosticKind;
    use navtree_fetcher::HttpFetcher;
    use navtree_shared::{FetchConfig, NavTreeError};

    fn temp_dir(label: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "navtree-pipeline-{label}-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn load_fixture(name: &str) -> String {
        let path = format!("../../../fixtures/html/{name}");
        std::fs::read_to_string(&path).unwrap_or_else(|_| panic!("missing fixture: {path}"))
    }

    fn config_for(url: Url, output: PathBuf) -> CaptureConfig {
        CaptureConfig::from_app(&AppConfig::default(), url, output)
    }

    fn http_fetcher() -> HttpFetcher {
        HttpFetcher::new(&FetchConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn capture_writes_extracted_tree() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/lambda/latest/dg/welcome.html"))
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .set_body_string(load_fixture("aws-lambda-nav.html")),
            )
            .mount(&server)
            .await;

        let dir = temp_dir("capture");
        let output = dir.join("documentation.json");
        let url = Url::parse(&format!("{}/lambda/latest/dg/welcome.html", server.uri())).unwrap();
        let config = config_for(url.clone(), output.clone());

        let result = capture(&config, &http_fetcher(), &SilentProgress).await.unwrap();

        assert_eq!(result.fetcher, "http");
        assert_eq!(result.documentation.section_count(), 5);
        assert_eq!(result.documentation.source_url, url.as_str());

        let written = writer::read_documentation(&output).unwrap();
        assert!(written.same_shape(&result.documentation));
        assert_eq!(written.sections[2].children[0].children[0].name, "Memory");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn failed_fetch_writes_nothing() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let dir = temp_dir("failed");
        let output = dir.join("documentation.json");
        let config = config_for(Url::parse(&server.uri()).unwrap(), output.clone());

        let err = capture(&config, &http_fetcher(), &SilentProgress).await.unwrap_err();

        assert!(matches!(err, NavTreeError::Network(_)));
        assert!(!output.exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn malformed_item_under_fail_policy_writes_nothing() {
        let server = wiremock::MockServer::start().await;
        let page = r#"<ul class="awsui_list_l0dv0_n545v_224 awsui_list-variant-root_l0dv0_n545v_245">
            <li class="awsui_list-item_l0dv0_n545v_260"><a class="awsui_link_x" href="orphan.html">Orphan</a></li>
        </ul>"#;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(page))
            .mount(&server)
            .await;

        let dir = temp_dir("malformed");
        let output = dir.join("documentation.json");
        let mut config = config_for(Url::parse(&server.uri()).unwrap(), output.clone());
        config.malformed = MalformedItemPolicy::Fail;

        let err = capture(&config, &http_fetcher(), &SilentProgress).await.unwrap_err();

        assert!(matches!(err, NavTreeError::MalformedItem { .. }));
        assert!(!output.exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn capture_html_without_navigation_writes_empty_tree() {
        let dir = temp_dir("empty");
        let output = dir.join("documentation.json");
        let url = Url::parse("https://docs.example.com/guide/").unwrap();
        let config = config_for(url, output.clone());

        let result = capture_html(
            &config,
            "<html><body><p>No sidebar here.</p></body></html>",
            &SilentProgress,
        )
        .unwrap();

        assert_eq!(result.fetcher, "file");
        assert!(result.documentation.sections.is_empty());
        assert!(result.diagnostics.has(DiagnosticKind::NoItemsFound));

        let written = writer::read_documentation(&output).unwrap();
        assert!(written.sections.is_empty());
        assert_eq!(written.source_url, "https://docs.example.com/guide/");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn invalid_selectors_fail_before_writing() {
        let dir = temp_dir("selectors");
        let output = dir.join("documentation.json");
        let mut config = config_for(Url::parse("https://docs.example.com/").unwrap(), output.clone());
        config.selectors.root_list_classes.clear();

        let err = capture_html(&config, "<html></html>", &SilentProgress).unwrap_err();

        assert!(matches!(err, NavTreeError::Config { .. }));
        assert!(!output.exists());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
