//! Conditions recorded during an extraction run.
//!
//! None of these abort the run; they travel back to the caller alongside the
//! extracted tree so the outcome can be inspected without scraping logs.

use serde::Serialize;

/// Category of a recorded condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// The root selector matched nothing; the tree is empty.
    NoItemsFound,
    /// A top-level match belonged to an expandable link group and was skipped.
    SkippedGroupMember,
    /// A link had no label; a placeholder node was emitted instead.
    MalformedItem,
    /// The HTML parser recovered from errors in the input.
    ParserRecovered,
}

/// One recorded condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

/// Ordered list of conditions from one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a condition.
    pub fn record(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        self.entries.push(Diagnostic {
            kind,
            message: message.into(),
        });
    }

    /// Whether any condition of `kind` was recorded.
    pub fn has(&self, kind: DiagnosticKind) -> bool {
        self.entries.iter().any(|d| d.kind == kind)
    }

    /// Number of conditions of `kind`.
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
