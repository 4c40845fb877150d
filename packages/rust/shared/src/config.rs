//! Application configuration for navtree.
//!
//! User config lives at `~/.navtree/navtree.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{NavTreeError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "navtree.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".navtree";

/// Page captured when no URL is given.
pub const DEFAULT_URL: &str = "https://docs.aws.amazon.com/lambda/latest/dg/welcome.html";

/// Output file written when no path is given.
pub const DEFAULT_OUTPUT: &str = "documentation.json";

// ---------------------------------------------------------------------------
// Config structs (matching navtree.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Page fetching settings.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Structural selectors for the navigation markup.
    #[serde(default)]
    pub selectors: NavSelectors,

    /// Extraction policies.
    #[serde(default)]
    pub extract: ExtractConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Page to capture.
    #[serde(default = "default_url")]
    pub url: String,

    /// Output JSON file.
    #[serde(default = "default_output")]
    pub output: String,

    /// Which fetcher drives the page load.
    #[serde(default)]
    pub fetcher: FetcherKind,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            output: default_output(),
            fetcher: FetcherKind::default(),
        }
    }
}

fn default_url() -> String {
    DEFAULT_URL.into()
}
fn default_output() -> String {
    DEFAULT_OUTPUT.into()
}

/// How the page HTML is obtained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetcherKind {
    /// Headless Chrome; renders JavaScript before capturing.
    #[default]
    Browser,
    /// Plain HTTP GET; for pages that need no script execution.
    Http,
}

impl std::fmt::Display for FetcherKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Browser => f.write_str("browser"),
            Self::Http => f.write_str("http"),
        }
    }
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Maximum seconds to wait for `document.readyState == "complete"`.
    #[serde(default = "default_ready_timeout")]
    pub ready_timeout_secs: u64,

    /// HTTP request timeout for the plain fetcher.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Interval between ready-state checks.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Run Chrome without a window.
    #[serde(default = "default_true")]
    pub headless: bool,

    /// Keep Chrome's sandbox enabled.
    #[serde(default)]
    pub sandbox: bool,

    /// Explicit Chrome/Chromium binary; auto-detected when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chrome_path: Option<PathBuf>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            ready_timeout_secs: default_ready_timeout(),
            request_timeout_secs: default_request_timeout(),
            poll_interval_ms: default_poll_interval(),
            headless: true,
            sandbox: false,
            chrome_path: None,
        }
    }
}

fn default_ready_timeout() -> u64 {
    10
}
fn default_request_timeout() -> u64 {
    30
}
fn default_poll_interval() -> u64 {
    100
}
fn default_true() -> bool {
    true
}

/// `[selectors]` section: the class markers that identify the navigation tree.
///
/// Every marker except `item_class` is matched as a substring of the element's
/// `class` attribute, which tolerates the hashed suffixes the target site
/// appends to its class names. `item_class` must equal the whole attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavSelectors {
    /// Markers that must all appear on the root `<ul>`.
    #[serde(default = "default_root_list_classes")]
    pub root_list_classes: Vec<String>,

    /// Exact class attribute of a top-level `<li>`.
    #[serde(default = "default_item_class")]
    pub item_class: String,

    /// Marker on the `<a>` that carries a section's link.
    #[serde(default = "default_link_class")]
    pub link_class: String,

    /// Marker on the `<span>` holding a link's label.
    #[serde(default = "default_label_class")]
    pub label_class: String,

    /// Marker on the parent list of an expandable group's members.
    #[serde(default = "default_group_class")]
    pub group_class: String,

    /// Marker on the `<ul>` holding an item's nested children.
    #[serde(default = "default_group_list_class")]
    pub group_list_class: String,

    /// Deepest nesting accepted before the run fails.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for NavSelectors {
    fn default() -> Self {
        Self {
            root_list_classes: default_root_list_classes(),
            item_class: default_item_class(),
            link_class: default_link_class(),
            label_class: default_label_class(),
            group_class: default_group_class(),
            group_list_class: default_group_list_class(),
            max_depth: default_max_depth(),
        }
    }
}

fn default_root_list_classes() -> Vec<String> {
    vec![
        "awsui_list_l0dv0_n545v_224".into(),
        "awsui_list-variant-root_l0dv0_n545v_245".into(),
    ]
}
fn default_item_class() -> String {
    "awsui_list-item_l0dv0_n545v_260".into()
}
fn default_link_class() -> String {
    "awsui_link".into()
}
fn default_label_class() -> String {
    "awsui_link-text".into()
}
fn default_group_class() -> String {
    "expandable-link-group".into()
}
fn default_group_list_class() -> String {
    "awsui_list-variant-expandable-link-group".into()
}
fn default_max_depth() -> usize {
    100
}

impl NavSelectors {
    /// Reject values that cannot be embedded in a CSS attribute selector.
    pub fn validate(&self) -> Result<()> {
        if self.root_list_classes.is_empty() {
            return Err(NavTreeError::config(
                "selectors.root_list_classes must name at least one class",
            ));
        }
        if self.max_depth == 0 {
            return Err(NavTreeError::config("selectors.max_depth must be at least 1"));
        }

        let named = self
            .root_list_classes
            .iter()
            .map(|c| ("root_list_classes", c.as_str()))
            .chain([
                ("item_class", self.item_class.as_str()),
                ("link_class", self.link_class.as_str()),
                ("label_class", self.label_class.as_str()),
                ("group_class", self.group_class.as_str()),
                ("group_list_class", self.group_list_class.as_str()),
            ]);

        for (field, value) in named {
            if value.trim().is_empty() {
                return Err(NavTreeError::config(format!("selectors.{field} is empty")));
            }
            if value.contains(['"', '\\']) {
                return Err(NavTreeError::config(format!(
                    "selectors.{field} contains a quote or backslash: {value:?}"
                )));
            }
        }

        Ok(())
    }
}

/// What to do with an item whose link has no label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedItemPolicy {
    /// Emit an "Unknown Section" node and record a diagnostic.
    #[default]
    Placeholder,
    /// Abort the run with [`NavTreeError::MalformedItem`].
    Fail,
}

/// `[extract]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Policy for links missing their label span.
    #[serde(default)]
    pub malformed_item: MalformedItemPolicy,
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.navtree/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| NavTreeError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.navtree/navtree.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| NavTreeError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content)
        .map_err(|e| NavTreeError::config(format!("failed to parse {}: {e}", path.display())))?;

    config.selectors.validate()?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| NavTreeError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| NavTreeError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| NavTreeError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("root_list_classes"));
        assert!(toml_str.contains("awsui_link-text"));
        assert!(!toml_str.contains("chrome_path"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.fetch.ready_timeout_secs, 10);
        assert_eq!(parsed.defaults.fetcher, FetcherKind::Browser);
        assert_eq!(parsed.selectors, NavSelectors::default());
    }

    #[test]
    fn partial_selector_override() {
        let toml_str = r#"
[defaults]
fetcher = "http"

[selectors]
link_class = "sidebar-link"

[extract]
malformed_item = "fail"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.defaults.fetcher, FetcherKind::Http);
        assert_eq!(config.defaults.url, DEFAULT_URL);
        assert_eq!(config.selectors.link_class, "sidebar-link");
        assert_eq!(config.selectors.label_class, "awsui_link-text");
        assert_eq!(config.extract.malformed_item, MalformedItemPolicy::Fail);
    }

    #[test]
    fn load_config_from_file() {
        let dir = std::env::temp_dir().join(format!("navtree-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("navtree.toml");
        std::fs::write(&path, "[fetch]\nready_timeout_secs = 3\n").unwrap();

        let config = load_config_from(&path).expect("load");
        assert_eq!(config.fetch.ready_timeout_secs, 3);
        assert!(config.fetch.headless);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn validate_rejects_bad_markers() {
        let mut selectors = NavSelectors::default();
        assert!(selectors.validate().is_ok());

        selectors.link_class = "a\"b".into();
        assert!(selectors.validate().is_err());

        let mut selectors = NavSelectors::default();
        selectors.root_list_classes.clear();
        assert!(selectors.validate().is_err());

        let mut selectors = NavSelectors::default();
        selectors.group_class = "  ".into();
        let err = selectors.validate().unwrap_err();
        assert!(err.to_string().contains("group_class"));
    }

    #[test]
    fn enums_use_lowercase_names() {
        let config: AppConfig = toml::from_str(
            "[defaults]\nfetcher = \"http\"\n\n[extract]\nmalformed_item = \"fail\"\n",
        )
        .expect("parse");
        assert_eq!(config.defaults.fetcher, FetcherKind::Http);
        assert_eq!(config.extract.malformed_item, MalformedItemPolicy::Fail);
        assert!(toml::from_str::<AppConfig>("[defaults]\nfetcher = \"lynx\"\n").is_err());
        assert_eq!(FetcherKind::Browser.to_string(), "browser");
    }

    #[test]
    fn group_markers_are_separate_values() {
        let selectors = NavSelectors::default();
        assert_eq!(selectors.group_class, "expandable-link-group");
        assert_eq!(
            selectors.group_list_class,
            "awsui_list-variant-expandable-link-group"
        );

        let mut selectors = NavSelectors::default();
        selectors.group_list_class = String::new();
        let err = selectors.validate().unwrap_err();
        assert!(err.to_string().contains("group_list_class"));
    }
}
