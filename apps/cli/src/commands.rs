//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use navtree_core::{CaptureConfig, CaptureResult, ProgressReporter};
use navtree_extractor::DiagnosticKind;
use navtree_fetcher::Fetcher;
use navtree_shared::{
    AppConfig, Documentation, FetcherKind, MalformedItemPolicy, Section, init_config, load_config,
    load_config_from,
};
use tracing::info;
use url::Url;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Extract a documentation page's navigation tree.
#[derive(Parser)]
#[command(
    name = "navtree",
    version,
    about = "Capture a documentation site's left-hand navigation as a JSON section tree.",
    long_about = None,
    args_conflicts_with_subcommands = true,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.navtree/navtree.toml.
    #[arg(long = "config", value_name = "FILE", global = true)]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub capture: CaptureArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Fetcher selection on the command line.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum FetcherArg {
    Browser,
    Http,
}

impl From<FetcherArg> for FetcherKind {
    fn from(arg: FetcherArg) -> Self {
        match arg {
            FetcherArg::Browser => FetcherKind::Browser,
            FetcherArg::Http => FetcherKind::Http,
        }
    }
}

/// Capture options, used when no subcommand is given.
#[derive(Args)]
pub(crate) struct CaptureArgs {
    /// Page URL (defaults to the configured URL).
    pub url: Option<String>,

    /// Output JSON file (defaults to documentation.json).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// How to load the page: browser or http.
    #[arg(short, long)]
    pub fetcher: Option<FetcherArg>,

    /// Read HTML from a saved file instead of fetching.
    #[arg(long, value_name = "FILE")]
    pub html: Option<PathBuf>,

    /// Seconds to wait for the page to become ready.
    #[arg(long, value_name = "SECS")]
    pub ready_timeout: Option<u64>,

    /// Fail the run when a link has no label.
    #[arg(long)]
    pub strict: bool,
}

/// CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Print the tree stored in a documentation file as an outline.
    Show {
        /// Documentation JSON file.
        #[arg(default_value = navtree_shared::DEFAULT_OUTPUT)]
        file: PathBuf,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "navtree=info",
        1 => "navtree=debug",
        _ => "navtree=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config_file;
    match cli.command {
        None => cmd_capture(config_path.as_deref(), cli.capture).await,
        Some(Command::Show { file }) => cmd_show(&file),
        Some(Command::Config { action }) => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(config_path.as_deref()),
        },
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    Ok(match path {
        Some(p) => load_config_from(p)?,
        None => load_config()?,
    })
}

async fn cmd_capture(config_path: Option<&Path>, args: CaptureArgs) -> Result<()> {
    let mut config = resolve_config(config_path)?;

    // CLI flags override config file values.
    if let Some(fetcher) = args.fetcher {
        config.defaults.fetcher = fetcher.into();
    }
    if let Some(secs) = args.ready_timeout {
        config.fetch.ready_timeout_secs = secs;
    }
    if args.strict {
        config.extract.malformed_item = MalformedItemPolicy::Fail;
    }

    let url_str = args.url.unwrap_or_else(|| config.defaults.url.clone());
    let url = Url::parse(&url_str).map_err(|e| eyre!("invalid URL '{url_str}': {e}"))?;
    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(&config.defaults.output));

    let capture_config = CaptureConfig::from_app(&config, url, output);
    let reporter = CliProgress::new();

    let result = match args.html {
        Some(path) => {
            info!(file = %path.display(), url = %url_str, "extracting from saved HTML");
            let html = std::fs::read_to_string(&path)
                .map_err(|e| eyre!("cannot read HTML file '{}': {e}", path.display()))?;
            navtree_core::capture_html(&capture_config, &html, &reporter)?
        }
        None => {
            info!(url = %url_str, fetcher = %config.defaults.fetcher, "capturing navigation");
            let fetcher = Fetcher::from_config(config.defaults.fetcher, &config.fetch)?;
            navtree_core::capture(&capture_config, &fetcher, &reporter).await?
        }
    };

    print_summary(&result);
    Ok(())
}

fn print_summary(result: &CaptureResult) {
    let doc = &result.documentation;
    let diags = &result.diagnostics;

    println!();
    if doc.sections.is_empty() {
        println!("  No navigation items found; wrote an empty tree.");
    } else {
        println!("  Navigation captured!");
    }
    println!("  Source:    {}", doc.source_url);
    println!("  Sections:  {}", doc.section_count());
    println!("  Nodes:     {}", doc.node_count());
    println!(
        "  Unlabeled: {}",
        diags.count(DiagnosticKind::MalformedItem)
    );
    println!("  Fetcher:   {}", result.fetcher);
    println!("  Output:    {}", result.output.display());
    println!("  Time:      {:.1}s", result.elapsed.as_secs_f64());
    println!();

    for diag in diags.iter().filter(|d| d.kind == DiagnosticKind::MalformedItem) {
        println!("  warning: {}", diag.message);
    }
}

fn cmd_show(file: &Path) -> Result<()> {
    let doc = navtree_core::read_documentation(file)?;
    print!("{}", render_outline(&doc));
    Ok(())
}

/// Render a documentation tree as an indented outline.
fn render_outline(doc: &Documentation) -> String {
    fn walk(out: &mut String, sections: &[Section], depth: usize) {
        for section in sections {
            let indent = "  ".repeat(depth);
            if section.path.is_empty() {
                out.push_str(&format!("{indent}- {}\n", section.name));
            } else {
                out.push_str(&format!("{indent}- {} ({})\n", section.name, section.path));
            }
            walk(out, &section.children, depth + 1);
        }
    }

    let mut out = format!(
        "{} ({} sections, captured {})\n",
        doc.source_url,
        doc.section_count(),
        doc.captured_at.to_rfc3339()
    );
    walk(&mut out, &doc.sections, 0);
    out
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn done(&self, _result: &CaptureResult) {
        self.spinner.finish_and_clear();
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        // Failed runs never reach `done`.
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}

// ---------------------------------------------------------------------------
// Config commands
// ---------------------------------------------------------------------------

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
