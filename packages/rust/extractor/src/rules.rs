//! Compiled structural selectors.
//!
//! [`NavSelectors`] holds the class markers as plain strings so they can live
//! in `navtree.toml`; [`NavRules`] turns them into CSS selectors once per
//! extractor and carries the policies the node conversion needs.

use scraper::{ElementRef, Selector};

use navtree_shared::{MalformedItemPolicy, NavSelectors, NavTreeError, Result};

/// Selectors and policies applied while walking the navigation tree.
#[derive(Debug, Clone)]
pub struct NavRules {
    /// Top-level `<li>` items under the root list.
    pub(crate) root_items: Selector,
    /// The `<a>` carrying a section's link.
    pub(crate) link: Selector,
    /// The label `<span>` inside a link.
    pub(crate) label: Selector,
    /// The `<ul>` holding an item's nested children.
    pub(crate) group_list: Selector,
    /// Raw group marker, for the parent-list membership check.
    pub(crate) group_class: String,
    /// Deepest nesting accepted.
    pub(crate) max_depth: usize,
    /// What to do with a link missing its label.
    pub(crate) malformed: MalformedItemPolicy,
}

impl NavRules {
    /// Validate and compile the configured markers.
    pub fn compile(selectors: &NavSelectors, malformed: MalformedItemPolicy) -> Result<Self> {
        selectors.validate()?;

        let root_list = selectors
            .root_list_classes
            .iter()
            .map(|class| format!(r#"[class*="{class}"]"#))
            .collect::<String>();

        Ok(Self {
            root_items: parse_selector(&format!(
                r#"ul{root_list} li[class="{}"]"#,
                selectors.item_class
            ))?,
            link: parse_selector(&format!(r#"a[class*="{}"]"#, selectors.link_class))?,
            label: parse_selector(&format!(r#"span[class*="{}"]"#, selectors.label_class))?,
            group_list: parse_selector(&format!(
                r#"ul[class*="{}"]"#,
                selectors.group_list_class
            ))?,
            group_class: selectors.group_class.clone(),
            max_depth: selectors.max_depth,
            malformed,
        })
    }

    /// Rules for the default (AWS documentation) markup.
    pub fn aws() -> Result<Self> {
        Self::compile(&NavSelectors::default(), MalformedItemPolicy::default())
    }

    /// Whether `item`'s immediate parent list is an expandable link group.
    pub fn in_expandable_group(&self, item: ElementRef<'_>) -> bool {
        item.parent()
            .and_then(ElementRef::wrap)
            .and_then(|parent| parent.value().attr("class"))
            .is_some_and(|class| class.contains(self.group_class.as_str()))
    }
}

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| NavTreeError::parse(format!("invalid selector `{css}`: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn default_rules_compile() {
        let rules = NavRules::aws().expect("default selectors compile");
        assert_eq!(rules.max_depth, 100);
        assert_eq!(rules.malformed, MalformedItemPolicy::Placeholder);
    }

    #[test]
    fn root_selector_requires_every_marker() {
        let selectors = NavSelectors {
            root_list_classes: vec!["nav-root".into(), "level-0".into()],
            item_class: "nav-item".into(),
            ..NavSelectors::default()
        };
        let rules = NavRules::compile(&selectors, MalformedItemPolicy::Placeholder).unwrap();

        let doc = Html::parse_document(
            r#"<ul class="nav-root_x level-0_y"><li class="nav-item">a</li></ul>
               <ul class="nav-root_x"><li class="nav-item">b</li></ul>
               <ul class="nav-root_x level-0_y"><li class="nav-item extra">c</li></ul>"#,
        );
        let texts: Vec<String> = doc
            .select(&rules.root_items)
            .map(|li| li.text().collect())
            .collect();
        assert_eq!(texts, ["a"]);
    }

    #[test]
    fn invalid_markers_are_rejected() {
        let selectors = NavSelectors {
            label_class: "bad\"marker".into(),
            ..NavSelectors::default()
        };
        let err = NavRules::compile(&selectors, MalformedItemPolicy::Fail).unwrap_err();
        assert!(matches!(err, NavTreeError::Config { .. }));
    }

    #[test]
    fn group_membership_checks_immediate_parent() {
        let rules = NavRules::aws().unwrap();
        let doc = Html::parse_document(
            r#"<ul class="x-expandable-link-group-y"><li id="member">m</li></ul>
               <div class="expandable-link-group"><ul><li id="outside">o</li></ul></div>"#,
        );
        let li = Selector::parse("li").unwrap();
        let flags: Vec<bool> = doc
            .select(&li)
            .map(|item| rules.in_expandable_group(item))
            .collect();
        assert_eq!(flags, [true, false]);
    }

    #[test]
    fn child_list_uses_its_own_marker() {
        let rules = NavRules::aws().unwrap();
        let doc = Html::parse_document(
            r#"<div class="awsui_expandable-link-group_x"><ul id="wrapper"></ul></div>
               <ul id="children" class="awsui_list_x awsui_list-variant-expandable-link-group_y"></ul>"#,
        );
        let ids: Vec<&str> = doc
            .select(&rules.group_list)
            .filter_map(|ul| ul.value().attr("id"))
            .collect();
        assert_eq!(ids, ["children"]);
    }
}
