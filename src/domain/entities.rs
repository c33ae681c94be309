//! Domain entities: terms, taxonomies and term queries

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Identifier of a term, unique within its taxonomy. `0` means "no parent".
pub type TermId = u64;

/// Immutable snapshot of one taxonomy term as delivered by the term source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub id: TermId,
    pub taxonomy: String,
    pub name: String,
    pub slug: String,
    /// Parent term id, 0 for root terms
    #[serde(default)]
    pub parent: TermId,
    /// Number of content items tagged with this term
    #[serde(default)]
    pub count: u64,
    /// Manual ordering key used by `OrderBy::TermOrder`
    #[serde(default)]
    pub term_order: i64,
}

impl Term {
    pub fn is_root(&self) -> bool {
        self.parent == 0
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.id)
    }
}

/// A named classification scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxonomy {
    pub name: String,
    #[serde(default)]
    pub hierarchical: bool,
    /// URL path segment for term archives; the taxonomy name when unset
    #[serde(default)]
    pub rewrite_base: Option<String>,
}

impl Taxonomy {
    pub fn rewrite_base(&self) -> &str {
        self.rewrite_base.as_deref().unwrap_or(&self.name)
    }
}

/// Sort field understood by the term source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderBy {
    #[default]
    Name,
    Slug,
    Id,
    Count,
    TermOrder,
}

impl OrderBy {
    /// Normalize a user-supplied sort field; unknown values fall back to `Name`.
    pub fn parse_lenient(raw: &str) -> Self {
        match sanitize_key(raw).as_str() {
            "slug" => OrderBy::Slug,
            "id" | "term_id" => OrderBy::Id,
            "count" => OrderBy::Count,
            "term_order" => OrderBy::TermOrder,
            _ => OrderBy::Name,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderBy::Name => "name",
            OrderBy::Slug => "slug",
            OrderBy::Id => "id",
            OrderBy::Count => "count",
            OrderBy::TermOrder => "term_order",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    #[serde(rename = "ASC")]
    Asc,
    #[serde(rename = "DESC")]
    Desc,
}

impl SortOrder {
    /// Only a case-insensitive `DESC` selects descending order.
    pub fn parse_lenient(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("desc") {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Filter and sort options for one `list_terms` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermQuery {
    pub taxonomy: String,
    pub include_empty: bool,
    pub order_by: OrderBy,
    pub order: SortOrder,
    /// Restrict to direct children of this term (0 selects root terms)
    pub parent: Option<TermId>,
}

impl TermQuery {
    pub fn new(taxonomy: impl Into<String>) -> Self {
        Self {
            taxonomy: taxonomy.into(),
            include_empty: false,
            order_by: OrderBy::default(),
            order: SortOrder::default(),
            parent: None,
        }
    }

    pub fn include_empty(mut self, include_empty: bool) -> Self {
        self.include_empty = include_empty;
        self
    }

    pub fn ordered(mut self, order_by: OrderBy, order: SortOrder) -> Self {
        self.order_by = order_by;
        self.order = order;
        self
    }

    pub fn children_of(mut self, parent: TermId) -> Self {
        self.parent = Some(parent);
        self
    }
}

/// Reduce a key to lowercase `[a-z0-9_-]`.
pub fn sanitize_key(raw: &str) -> String {
    static DISALLOWED: OnceLock<Regex> = OnceLock::new();
    let re = DISALLOWED.get_or_init(|| Regex::new(r"[^a-z0-9_\-]").expect("valid regex"));
    re.replace_all(&raw.to_lowercase(), "").into_owned()
}
