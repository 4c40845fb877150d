//! Shared types, error model, and configuration for navtree.
//!
//! This crate is the foundation depended on by all other navtree crates.
//! It provides:
//! - [`NavTreeError`]: the unified error type
//! - Domain types ([`Documentation`], [`Section`])
//! - Configuration ([`AppConfig`], [`NavSelectors`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DEFAULT_OUTPUT, DEFAULT_URL, DefaultsConfig, ExtractConfig, FetchConfig,
    FetcherKind, MalformedItemPolicy, NavSelectors, config_dir, config_file_path, init_config,
    load_config, load_config_from,
};
pub use error::{NavTreeError, Result};
pub use types::{Documentation, Section, UNKNOWN_SECTION};
