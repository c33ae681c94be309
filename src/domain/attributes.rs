//! Persisted per-block configuration
//!
//! Blocks store their options as a loosely typed attribute object. `RawBlockAttributes`
//! accepts anything the editor may have written; `BlockAttributes` is the normalized,
//! fully defaulted form every other component works with.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::entities::{sanitize_key, OrderBy, SortOrder, TermQuery};

/// Default taxonomy when a block does not name one.
pub const DEFAULT_TAXONOMY: &str = "category";

/// How a term list block presents its terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayStyle {
    #[default]
    Ul,
    Ol,
    Dropdown,
    Filterable,
}

impl DisplayStyle {
    /// Unknown styles render as an unordered list.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "ol" => DisplayStyle::Ol,
            "dropdown" => DisplayStyle::Dropdown,
            "filterable" => DisplayStyle::Filterable,
            _ => DisplayStyle::Ul,
        }
    }

    pub fn render_style(&self) -> RenderStyle {
        match self {
            DisplayStyle::Ul | DisplayStyle::Ol => RenderStyle::List,
            DisplayStyle::Dropdown => RenderStyle::Dropdown,
            DisplayStyle::Filterable => RenderStyle::Filterable,
        }
    }

    /// List element used by list-based styles.
    pub fn list_tag(&self) -> &'static str {
        match self {
            DisplayStyle::Ol => "ol",
            _ => "ul",
        }
    }
}

/// Render policy selected by a display style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStyle {
    List,
    Dropdown,
    Filterable,
}

/// Normalized block configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockAttributes {
    pub taxonomy: String,
    pub display_style: DisplayStyle,
    pub order_by: OrderBy,
    pub order: SortOrder,
    pub include_empty: bool,
    pub show_count: bool,
    pub show_hierarchy: bool,
    /// 0 means unlimited
    pub max_depth: u32,
    pub dropdown_title: String,
    pub dropdown_link: String,
    pub show_dropdown_button: bool,
    pub enable_filter: bool,
}

impl Default for BlockAttributes {
    fn default() -> Self {
        Self {
            taxonomy: DEFAULT_TAXONOMY.to_string(),
            display_style: DisplayStyle::Ul,
            order_by: OrderBy::Name,
            order: SortOrder::Asc,
            include_empty: false,
            show_count: false,
            show_hierarchy: true,
            max_depth: 0,
            dropdown_title: String::new(),
            dropdown_link: String::new(),
            show_dropdown_button: true,
            enable_filter: false,
        }
    }
}

impl BlockAttributes {
    /// Defaults of the navigation block, which lists empty terms too.
    pub fn navigation_defaults() -> Self {
        Self {
            include_empty: true,
            ..Self::default()
        }
    }

    /// Parse and normalize a block attribute object against `defaults`.
    pub fn from_attrs(attrs: &Map<String, Value>, defaults: &BlockAttributes) -> Self {
        RawBlockAttributes::from_attrs(attrs).resolve(defaults)
    }

    /// Query for the full, sorted term set of this block.
    pub fn term_query(&self) -> TermQuery {
        TermQuery::new(self.taxonomy.clone())
            .include_empty(self.include_empty)
            .ordered(self.order_by, self.order)
    }
}

/// Loosely typed attributes as stored by the editor.
///
/// `None` means "not specified, use the default". Values of the wrong type are
/// coerced the way the editor would: booleans from `"1"`/`"0"`/numbers, depths
/// from numeric strings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawBlockAttributes {
    pub taxonomy: Option<Value>,
    pub display_style: Option<Value>,
    pub order_by: Option<Value>,
    pub order: Option<Value>,
    pub include_empty: Option<Value>,
    pub show_count: Option<Value>,
    pub show_hierarchy: Option<Value>,
    pub max_depth: Option<Value>,
    pub dropdown_title: Option<Value>,
    pub dropdown_link: Option<Value>,
    pub show_dropdown_button: Option<Value>,
    pub enable_filter: Option<Value>,
}

impl RawBlockAttributes {
    pub fn from_attrs(attrs: &Map<String, Value>) -> Self {
        // Every field is an optional Value, so this cannot fail on shape.
        serde_json::from_value(Value::Object(attrs.clone())).unwrap_or_default()
    }

    pub fn resolve(&self, defaults: &BlockAttributes) -> BlockAttributes {
        BlockAttributes {
            taxonomy: self
                .taxonomy
                .as_ref()
                .map(|v| sanitize_key(&value_to_string(v)))
                .unwrap_or_else(|| defaults.taxonomy.clone()),
            display_style: self
                .display_style
                .as_ref()
                .map(|v| DisplayStyle::parse_lenient(&value_to_string(v)))
                .unwrap_or(defaults.display_style),
            order_by: self
                .order_by
                .as_ref()
                .map(|v| OrderBy::parse_lenient(&value_to_string(v)))
                .unwrap_or(defaults.order_by),
            order: self
                .order
                .as_ref()
                .map(|v| SortOrder::parse_lenient(&value_to_string(v)))
                .unwrap_or(defaults.order),
            include_empty: flag(&self.include_empty, defaults.include_empty),
            show_count: flag(&self.show_count, defaults.show_count),
            show_hierarchy: flag(&self.show_hierarchy, defaults.show_hierarchy),
            max_depth: self
                .max_depth
                .as_ref()
                .map(clamp_depth)
                .unwrap_or(defaults.max_depth),
            dropdown_title: self
                .dropdown_title
                .as_ref()
                .map(value_to_string)
                .unwrap_or_else(|| defaults.dropdown_title.clone()),
            dropdown_link: self
                .dropdown_link
                .as_ref()
                .map(value_to_string)
                .unwrap_or_else(|| defaults.dropdown_link.clone()),
            show_dropdown_button: flag(&self.show_dropdown_button, defaults.show_dropdown_button),
            enable_filter: flag(&self.enable_filter, defaults.enable_filter),
        }
    }
}

fn flag(value: &Option<Value>, default: bool) -> bool {
    value.as_ref().map(truthy).unwrap_or(default)
}

/// Editor-style truthiness: `false`, `0`, `""`, `"0"` and `null` are false.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Clamp a depth value to a non-negative integer; anything non-numeric is 0.
pub fn clamp_depth(value: &Value) -> u32 {
    let parsed = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(|f| f.trunc() as i64),
        _ => None,
    };
    parsed
        .map(|d| d.clamp(0, i64::from(u32::MAX)) as u32)
        .unwrap_or(0)
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn attrs(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn given_empty_attrs_when_resolving_then_uses_defaults() {
        let resolved = BlockAttributes::from_attrs(&Map::new(), &BlockAttributes::default());
        assert_eq!(resolved, BlockAttributes::default());
    }

    #[test]
    fn given_navigation_defaults_when_resolving_empty_attrs_then_includes_empty_terms() {
        let resolved =
            BlockAttributes::from_attrs(&Map::new(), &BlockAttributes::navigation_defaults());
        assert!(resolved.include_empty);
        assert!(resolved.show_hierarchy);
    }

    #[test]
    fn given_invalid_sort_values_when_resolving_then_normalizes_to_name_asc() {
        let raw = attrs(json!({"orderBy": "random()", "order": "sideways"}));
        let resolved = BlockAttributes::from_attrs(&raw, &BlockAttributes::default());
        assert_eq!(resolved.order_by, OrderBy::Name);
        assert_eq!(resolved.order, SortOrder::Asc);
    }

    #[rstest]
    #[case(json!(3), 3)]
    #[case(json!(-2), 0)]
    #[case(json!("4"), 4)]
    #[case(json!("deep"), 0)]
    #[case(json!("2.5"), 2)]
    #[case(json!(" 3 "), 3)]
    #[case(json!("-1.5"), 0)]
    #[case(json!(2.7), 2)]
    #[case(json!(null), 0)]
    fn given_raw_depth_when_clamping_then_is_non_negative(#[case] raw: Value, #[case] expected: u32) {
        assert_eq!(clamp_depth(&raw), expected);
    }

    #[test]
    fn given_string_flags_when_resolving_then_coerces_like_editor() {
        let raw = attrs(json!({
            "includeEmpty": "1",
            "showCount": "0",
            "showHierarchy": 0,
            "enableFilter": true,
            "displayStyle": "Dropdown",
            "taxonomy": "Post_Tag",
        }));
        let resolved = BlockAttributes::from_attrs(&raw, &BlockAttributes::default());
        assert!(resolved.include_empty);
        assert!(!resolved.show_count);
        assert!(!resolved.show_hierarchy);
        assert!(resolved.enable_filter);
        assert_eq!(resolved.display_style, DisplayStyle::Dropdown);
        assert_eq!(resolved.taxonomy, "post_tag");
    }

    #[test]
    fn given_display_styles_when_mapping_then_selects_render_policy() {
        assert_eq!(DisplayStyle::Ol.render_style(), RenderStyle::List);
        assert_eq!(DisplayStyle::Ol.list_tag(), "ol");
        assert_eq!(DisplayStyle::Filterable.list_tag(), "ul");
        assert_eq!(DisplayStyle::parse_lenient("grid"), DisplayStyle::Ul);
    }
}
