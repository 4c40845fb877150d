//! Core domain types: the extracted navigation tree.

use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// Name given to items whose link could not be resolved.
pub const UNKNOWN_SECTION: &str = "Unknown Section";

// ---------------------------------------------------------------------------
// Section
// ---------------------------------------------------------------------------

/// One node of the navigation tree: a topic link plus its sub-topics.
///
/// Serialized with a `text` field duplicating `name`, and the timestamp under
/// `last_updated`, matching the `documentation.json` format.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Section {
    /// Display text of the section's link.
    pub name: String,
    /// Link target, verbatim (may be relative or empty).
    pub path: String,
    /// Nested sections in document order.
    #[serde(default)]
    pub children: Vec<Section>,
    /// When this node was extracted.
    #[serde(rename = "last_updated", alias = "captured_at")]
    pub captured_at: DateTime<Utc>,
}

impl Section {
    /// Build a section stamped with the current time.
    pub fn new(name: impl Into<String>, path: impl Into<String>, children: Vec<Section>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            children,
            captured_at: Utc::now(),
        }
    }

    /// Placeholder node for an item whose link could not be resolved.
    pub fn unknown(children: Vec<Section>) -> Self {
        Self::new(UNKNOWN_SECTION, "", children)
    }

    /// Whether this node is an "Unknown Section" placeholder.
    pub fn is_placeholder(&self) -> bool {
        self.name == UNKNOWN_SECTION && self.path.is_empty()
    }

    /// Iterate over this node and all descendants, depth-first, in document order.
    pub fn walk(&self) -> impl Iterator<Item = &Section> + '_ {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.children.iter().rev());
            Some(next)
        })
    }

    /// Compare name, path, and children, ignoring timestamps.
    pub fn same_shape(&self, other: &Section) -> bool {
        self.name == other.name
            && self.path == other.path
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(&other.children)
                .all(|(a, b)| a.same_shape(b))
    }
}

impl Serialize for Section {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Section", 5)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("text", &self.name)?;
        state.serialize_field("path", &self.path)?;
        state.serialize_field("children", &self.children)?;
        state.serialize_field("last_updated", &self.captured_at)?;
        state.end()
    }
}

// ---------------------------------------------------------------------------
// Documentation
// ---------------------------------------------------------------------------

/// The full extracted navigation tree for one page, plus source metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Documentation {
    /// Top-level sections in document order.
    pub sections: Vec<Section>,
    /// Page the tree was extracted from.
    #[serde(rename = "url", alias = "source_url")]
    pub source_url: String,
    /// When the extraction ran.
    #[serde(rename = "last_updated", alias = "captured_at")]
    pub captured_at: DateTime<Utc>,
}

impl Documentation {
    /// Build a documentation tree stamped with the current time.
    pub fn new(source_url: impl Into<String>, sections: Vec<Section>) -> Self {
        Self {
            sections,
            source_url: source_url.into(),
            captured_at: Utc::now(),
        }
    }

    /// Number of top-level sections.
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Number of sections at every depth.
    pub fn node_count(&self) -> usize {
        self.sections.iter().map(|s| s.walk().count()).sum()
    }

    /// Compare two trees ignoring every timestamp.
    pub fn same_shape(&self, other: &Documentation) -> bool {
        self.source_url == other.source_url
            && self.sections.len() == other.sections.len()
            && self
                .sections
                .iter()
                .zip(&other.sections)
                .all(|(a, b)| a.same_shape(b))
    }
}
