//! Capture pipeline and output writer for navtree.
//!
//! This crate ties the fetcher and the extractor together into one run
//! (`pipeline::capture`) and owns the `documentation.json` format on disk.

pub mod pipeline;
pub mod writer;

pub use pipeline::{
    CaptureConfig, CaptureResult, ProgressReporter, SilentProgress, capture, capture_html,
};
pub use writer::{read_documentation, write_documentation};
