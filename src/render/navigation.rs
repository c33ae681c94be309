//! Render-time markup of taxonomy navigation blocks.

use std::sync::OnceLock;

use itertools::Itertools;
use regex::Regex;
use serde_json::{Map, Value};

use super::{escape_html, escape_url};
use crate::domain::block::{NAVIGATION_LINK_BLOCK, NAVIGATION_SUBMENU_BLOCK};
use crate::domain::Block;

pub const NAVIGATION_WRAPPER_CLASS: &str = "wp-block-taxnav-taxonomy-navigation";

const SIDES: [&str; 4] = ["top", "right", "bottom", "left"];

struct PresetPatterns {
    spacing: Regex,
    font_size: Regex,
    legacy_spacing: Regex,
}

fn presets() -> &'static PresetPatterns {
    static PATTERNS: OnceLock<PresetPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| PresetPatterns {
        spacing: Regex::new(r"^var:preset\|spacing\|(.+)$").expect("valid regex"),
        font_size: Regex::new(r"^var:preset\|font-size\|(.+)$").expect("valid regex"),
        legacy_spacing: Regex::new(r"var\(preset\|spacing\|([^)]+)\)").expect("valid regex"),
    })
}

/// Convert editor preset references to CSS custom properties.
pub fn convert_preset(value: &str) -> String {
    let p = presets();
    if let Some(c) = p.spacing.captures(value) {
        return format!("var(--wp--preset--spacing--{})", &c[1]);
    }
    if let Some(c) = p.font_size.captures(value) {
        return format!("var(--wp--preset--font-size--{})", &c[1]);
    }
    if let Some(c) = p.legacy_spacing.captures(value) {
        return format!("var(--wp--preset--spacing--{})", &c[1]);
    }
    value.to_string()
}

/// Classes and inline styles of the navigation wrapper element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapperStyle {
    pub classes: Vec<String>,
    pub styles: Vec<String>,
}

impl WrapperStyle {
    pub fn from_attrs(attrs: &Map<String, Value>) -> Self {
        let mut classes = vec![NAVIGATION_WRAPPER_CLASS.to_string()];
        let mut styles = Vec::new();

        if let Some(align) = non_empty_str(attrs.get("align")) {
            classes.push(format!("align{align}"));
        }
        if let Some(bg) = non_empty_str(attrs.get("backgroundColor")) {
            classes.push(format!("has-{bg}-background-color"));
            classes.push("has-background".to_string());
        }

        let style = attrs.get("style");
        if let Some(bg) = non_empty_str(lookup(style, &["color", "background"])) {
            styles.push(format!("background-color:{bg}"));
        }
        for property in ["padding", "margin"] {
            match lookup(style, &["spacing", property]) {
                Some(Value::String(s)) if !s.is_empty() => {
                    styles.push(format!("{property}:{}", convert_preset(s)));
                }
                Some(Value::Object(sides)) => {
                    for side in SIDES {
                        if let Some(v) = non_empty_str(sides.get(side)) {
                            styles.push(format!("{property}-{side}:{}", convert_preset(v)));
                        }
                    }
                }
                _ => {}
            }
        }

        styles.push("margin-block-start:0!important".to_string());
        styles.push("margin-block-end:0!important".to_string());
        styles.push("box-sizing:border-box".to_string());

        if let Some(class_name) = non_empty_str(attrs.get("className")) {
            classes.push(class_name.to_string());
        }

        Self { classes, styles }
    }

    pub fn class_attr(&self) -> String {
        escape_html(&self.classes.iter().join(" "))
    }

    pub fn style_attr(&self) -> String {
        escape_html(&self.styles.iter().join(";"))
    }
}

fn lookup<'a>(root: Option<&'a Value>, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(root?, |v, key| v.get(*key))
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Wrapper plus `<nav>` markup for a navigation container's entries.
pub fn render_navigation(
    wrapper_attrs: &Map<String, Value>,
    container: &Block,
    entries: &[Block],
) -> String {
    let wrapper = WrapperStyle::from_attrs(wrapper_attrs);
    let nav_class = match container.attr_str("className").filter(|c| !c.is_empty()) {
        Some(extra) => format!("wp-block-navigation {}", escape_html(extra)),
        None => "wp-block-navigation".to_string(),
    };
    let items: String = entries.iter().map(render_entry).collect();

    format!(
        r#"<div class="{}" style="{}"><nav class="{}"><ul class="wp-block-navigation__container">{}</ul></nav></div>"#,
        wrapper.class_attr(),
        wrapper.style_attr(),
        nav_class,
        items
    )
}

fn render_entry(block: &Block) -> String {
    let is_submenu = block.is(NAVIGATION_SUBMENU_BLOCK);
    if !is_submenu && !block.is(NAVIGATION_LINK_BLOCK) {
        let html = block.inner_html();
        if html.trim().is_empty() {
            return String::new();
        }
        return format!(r#"<li class="wp-block-navigation-item">{html}</li>"#);
    }

    let anchor = format!(
        r#"<a class="wp-block-navigation-item__content" href="{}"><span class="wp-block-navigation-item__label">{}</span></a>"#,
        escape_url(block.attr_str("url").unwrap_or_default()),
        escape_html(block.attr_str("label").unwrap_or_default())
    );
    let children = block.children();
    if children.is_empty() {
        return format!(r#"<li class="wp-block-navigation-item wp-block-navigation-link">{anchor}</li>"#);
    }
    let inner: String = children.iter().map(render_entry).collect();
    format!(
        r#"<li class="wp-block-navigation-item has-child wp-block-navigation-submenu">{anchor}<ul class="wp-block-navigation__submenu-container">{inner}</ul></li>"#
    )
}
