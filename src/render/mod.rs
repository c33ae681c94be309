//! Render policies: term list, dropdown, filterable list and navigation markup
//!
//! Every renderer is a pure function of a forest (or block entries) and the
//! resolved block attributes. An empty forest renders to the empty string.

pub mod dropdown;
pub mod filter;
pub mod list;
pub mod navigation;

use tracing::{debug, instrument};

use crate::domain::{BlockAttributes, RenderStyle, Term, TermForest};

pub use dropdown::{DropdownController, DropdownEvent, DropdownState};
pub use filter::{filter_entries, visibility, FilterEntry};

pub const DEFAULT_DROPDOWN_TITLE: &str = "Select a term";
pub const SHOW_SELECTION_LABEL: &str = "Show selection";
pub const FILTER_LABEL: &str = "Filter terms";
pub const FILTER_PLACEHOLDER: &str = "Type to filter terms...";

pub const TERM_LIST_CLASS: &str = "wp-block-taxnav-term-list";

/// Escape text and attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape a URL for an `href`/`value` attribute; script URLs become empty.
pub fn escape_url(url: &str) -> String {
    let trimmed = url.trim();
    let scheme = trimmed
        .split_once(':')
        .map(|(scheme, _)| scheme.to_ascii_lowercase())
        .filter(|s| s.chars().all(|c| c.is_ascii_alphanumeric() || "+-.".contains(c)));
    match scheme.as_deref() {
        None | Some("http") | Some("https") | Some("mailto") => escape_html(trimmed),
        Some(_) => String::new(),
    }
}

/// ` (N)` annotation when counts are shown.
pub fn count_suffix(term: &Term, show_count: bool) -> String {
    if show_count {
        format!(" ({})", term.count)
    } else {
        String::new()
    }
}

/// Renders the term list block for one set of resolved attributes.
///
/// `link` yields the canonical address of a term, empty when unresolvable.
pub struct TermListRenderer<'a> {
    attrs: &'a BlockAttributes,
    /// Hierarchy requested and supported by the taxonomy
    hierarchical: bool,
    link: &'a dyn Fn(&Term) -> String,
}

impl<'a> TermListRenderer<'a> {
    pub fn new(
        attrs: &'a BlockAttributes,
        hierarchical: bool,
        link: &'a dyn Fn(&Term) -> String,
    ) -> Self {
        Self {
            attrs,
            hierarchical,
            link,
        }
    }

    /// Inner markup for the configured display style.
    #[instrument(level = "debug", skip(self, forest), fields(style = ?self.attrs.display_style, nodes = forest.len()))]
    pub fn render(&self, forest: &TermForest) -> String {
        if forest.is_empty() {
            debug!("empty forest, nothing to render");
            return String::new();
        }
        match self.attrs.display_style.render_style() {
            RenderStyle::List => list::render_list(
                forest,
                self.attrs.display_style.list_tag(),
                self.attrs.show_count,
                self.link,
            ),
            RenderStyle::Dropdown => {
                dropdown::render_dropdown(forest, self.attrs, self.hierarchical, self.link)
            }
            RenderStyle::Filterable => filter::render_filterable(forest, self.attrs, self.link),
        }
    }

    /// Full block markup including the wrapper element.
    pub fn render_block(&self, forest: &TermForest) -> String {
        let inner = self.render(forest);
        if inner.is_empty() {
            return inner;
        }
        format!(
            r#"<div class="{}" data-taxonomy="{}">{}</div>"#,
            TERM_LIST_CLASS,
            escape_html(&self.attrs.taxonomy),
            inner
        )
    }
}
