//! Navigation tree extraction.
//!
//! Turns the rendered HTML of a documentation page into a [`Documentation`]
//! tree by walking its left-hand navigation list:
//! - [`NavRules`]: compiled structural selectors and policies
//! - [`Extractor`]: locates the top-level items and assembles the tree
//! - [`to_section`]: recursive conversion of one `<li>` into a [`Section`]
//! - [`Diagnostics`]: conditions recorded during a run

mod diagnostics;
mod rules;

use scraper::{ElementRef, Html};
use tracing::{debug, info, instrument, warn};

use navtree_shared::{
    Documentation, MalformedItemPolicy, NavSelectors, NavTreeError, Result, Section,
};

pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use rules::NavRules;

// ---------------------------------------------------------------------------
// Extraction result
// ---------------------------------------------------------------------------

/// Output of one extraction run.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// The extracted navigation tree.
    pub documentation: Documentation,
    /// Conditions recorded while building it.
    pub diagnostics: Diagnostics,
}

// ---------------------------------------------------------------------------
// Extractor
// ---------------------------------------------------------------------------

/// Extracts navigation trees using one set of compiled rules.
#[derive(Debug, Clone)]
pub struct Extractor {
    rules: NavRules,
}

impl Extractor {
    /// Create an extractor from configured selectors and a malformed-item policy.
    pub fn new(selectors: &NavSelectors, malformed: MalformedItemPolicy) -> Result<Self> {
        Ok(Self {
            rules: NavRules::compile(selectors, malformed)?,
        })
    }

    /// Create an extractor for the default AWS documentation markup.
    pub fn aws() -> Result<Self> {
        Ok(Self {
            rules: NavRules::aws()?,
        })
    }

    /// Extract the navigation tree from `html`, tagging it with `source_url`.
    ///
    /// An HTML page without the root navigation list is not an error: the
    /// result has no sections and records [`DiagnosticKind::NoItemsFound`].
    #[instrument(skip_all, fields(source_url = %source_url, html_len = html.len()))]
    pub fn extract(&self, source_url: &str, html: &str) -> Result<Extraction> {
        let doc = Html::parse_document(html);
        let mut diagnostics = Diagnostics::new();

        if !doc.errors.is_empty() {
            debug!(errors = doc.errors.len(), "HTML parser recovered from errors");
            diagnostics.record(
                DiagnosticKind::ParserRecovered,
                format!("parser recovered from {} error(s)", doc.errors.len()),
            );
        }

        let items: Vec<ElementRef<'_>> = doc.select(&self.rules.root_items).collect();

        if items.is_empty() {
            warn!("no navigation items found");
            diagnostics.record(
                DiagnosticKind::NoItemsFound,
                "root selector matched no list items",
            );
            return Ok(Extraction {
                documentation: Documentation::new(source_url, Vec::new()),
                diagnostics,
            });
        }

        info!(count = items.len(), "found navigation items");

        let mut sections = Vec::new();
        for (index, item) in items.into_iter().enumerate() {
            // Group members surface as children of their owning item instead.
            if self.rules.in_expandable_group(item) {
                debug!(index, "skipping expandable link group member");
                diagnostics.record(
                    DiagnosticKind::SkippedGroupMember,
                    format!("top-level match #{index} belongs to an expandable link group"),
                );
                continue;
            }
            sections.push(to_section(item, &self.rules, 0, &mut diagnostics)?);
        }

        let documentation = Documentation::new(source_url, sections);
        info!(
            sections = documentation.section_count(),
            nodes = documentation.node_count(),
            "navigation tree extracted"
        );

        Ok(Extraction {
            documentation,
            diagnostics,
        })
    }
}

/// Extract with the default AWS documentation rules.
pub fn extract(source_url: &str, html: &str) -> Result<Extraction> {
    Extractor::aws()?.extract(source_url, html)
}

// ---------------------------------------------------------------------------
// Node conversion
// ---------------------------------------------------------------------------

/// Convert one navigation `<li>` (and its expandable sub-list) into a [`Section`].
///
/// `depth` is the nesting level of `item`; top-level items are depth 0.
pub fn to_section(
    item: ElementRef<'_>,
    rules: &NavRules,
    depth: usize,
    diagnostics: &mut Diagnostics,
) -> Result<Section> {
    if depth > rules.max_depth {
        return Err(NavTreeError::DepthExceeded {
            limit: rules.max_depth,
        });
    }

    let link = link_info(item, rules, diagnostics)?;

    let children = match item.select(&rules.group_list).next() {
        Some(list) => list
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|child| child.value().name() == "li")
            .map(|child| to_section(child, rules, depth + 1, diagnostics))
            .collect::<Result<Vec<_>>>()?,
        None => Vec::new(),
    };

    Ok(match link {
        Some((name, path)) => Section::new(name, path, children),
        None => Section::unknown(children),
    })
}

/// Resolve an item's display name and link target.
///
/// `None` means the item gets the placeholder name. A label span that is
/// present but blank yields an empty name; only a missing span is malformed.
fn link_info(
    item: ElementRef<'_>,
    rules: &NavRules,
    diagnostics: &mut Diagnostics,
) -> Result<Option<(String, String)>> {
    let Some(link) = item.select(&rules.link).next() else {
        return Ok(None);
    };

    let path = link.value().attr("href").unwrap_or_default().to_string();
    let label = link
        .select(&rules.label)
        .next()
        .map(|span| span.text().collect::<String>().trim().to_string());

    match (label, rules.malformed) {
        (Some(name), _) => Ok(Some((name, path))),
        (None, MalformedItemPolicy::Placeholder) => {
            warn!(href = %path, "navigation link has no label, using placeholder");
            diagnostics.record(
                DiagnosticKind::MalformedItem,
                format!("link to {path:?} has no label"),
            );
            Ok(None)
        }
        (None, MalformedItemPolicy::Fail) => Err(NavTreeError::malformed(format!(
            "link to {path:?} has no label"
        ))),
    }
}
