//! Filterable list: markup plus the client-side filter semantics.

use generational_arena::Index;

use super::list::render_list;
use super::{count_suffix, escape_html, FILTER_LABEL, FILTER_PLACEHOLDER};
use crate::domain::{BlockAttributes, Term, TermForest};

pub fn render_filterable(
    forest: &TermForest,
    attrs: &BlockAttributes,
    link: &dyn Fn(&Term) -> String,
) -> String {
    let list = render_list(forest, "ul", attrs.show_count, link);
    let input = if attrs.enable_filter {
        format!(
            r#"<label class="screen-reader-text">{}</label><input type="text" class="taxnav-filter" placeholder="{}" />"#,
            escape_html(FILTER_LABEL),
            escape_html(FILTER_PLACEHOLDER)
        )
    } else {
        String::new()
    };
    format!(r#"<div class="taxnav-filterable">{input}<div class="taxnav-list">{list}</div></div>"#)
}

/// One list item as seen by the filter, in document (pre-)order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterEntry {
    pub label: String,
    pub depth: usize,
    /// Visible text of the item including all nested items
    pub text: String,
}

pub fn filter_entries(forest: &TermForest, show_count: bool) -> Vec<FilterEntry> {
    fn text_of(forest: &TermForest, idx: Index, show_count: bool) -> String {
        let Some(node) = forest.get_node(idx) else {
            return String::new();
        };
        let mut text = format!("{}{}", node.term.name, count_suffix(&node.term, show_count));
        for &child in &node.children {
            text.push_str(&text_of(forest, child, show_count));
        }
        text
    }

    forest
        .iter()
        .map(|(idx, node)| FilterEntry {
            label: node.term.name.clone(),
            depth: node.depth,
            text: text_of(forest, idx, show_count),
        })
        .collect()
}

/// Visibility of each entry for `query`: case-insensitive substring match.
///
/// Filtering only hides entries; an empty query shows everything.
pub fn visibility(entries: &[FilterEntry], query: &str) -> Vec<bool> {
    let query = query.to_lowercase();
    entries
        .iter()
        .map(|e| e.text.to_lowercase().contains(&query))
        .collect()
}
