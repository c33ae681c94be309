use generational_arena::Index;

use super::{count_suffix, escape_html, escape_url};
use crate::domain::{Term, TermForest};

/// Nested (or flat, for a flat forest) list of term links.
///
/// Children sit in a nested list of the same tag with class `children`.
pub fn render_list(
    forest: &TermForest,
    tag: &str,
    show_count: bool,
    link: &dyn Fn(&Term) -> String,
) -> String {
    let mut out = format!("<{tag}>");
    for &root in forest.roots() {
        render_item(forest, root, tag, show_count, link, &mut out);
    }
    out.push_str(&format!("</{tag}>"));
    out
}

fn render_item(
    forest: &TermForest,
    idx: Index,
    tag: &str,
    show_count: bool,
    link: &dyn Fn(&Term) -> String,
    out: &mut String,
) {
    let Some(node) = forest.get_node(idx) else {
        return;
    };
    out.push_str(&format!(
        r#"<li><a href="{}">{}{}</a>"#,
        escape_url(&link(&node.term)),
        escape_html(&node.term.name),
        count_suffix(&node.term, show_count)
    ));
    if !node.children.is_empty() {
        out.push_str(&format!(r#"<{tag} class="children">"#));
        for &child in &node.children {
            render_item(forest, child, tag, show_count, link, out);
        }
        out.push_str(&format!("</{tag}>"));
    }
    out.push_str("</li>");
}
