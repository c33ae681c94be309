//! Block documents and the menu merge engine.
//!
//! A block is the editor's unit of persisted content. Only the fields this system
//! reads are typed; everything else rides along in `extra` and is written back
//! exactly as it was read.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::domain::navigation::NavigationItem;

pub const NAVIGATION_BLOCK: &str = "core/navigation";
pub const NAVIGATION_LINK_BLOCK: &str = "core/navigation-link";
pub const NAVIGATION_SUBMENU_BLOCK: &str = "core/navigation-submenu";
pub const TAXONOMY_NAVIGATION_BLOCK: &str = "taxnav/taxonomy-navigation";

pub const GENERATED_LINK_CLASS: &str = "taxnav-generated-link";
pub const GENERATED_SUBMENU_CLASS: &str = "taxnav-generated-submenu";
pub const PROVENANCE_ATTR: &str = "provenance";
pub const PROVENANCE_GENERATED: &str = "generated";

/// One block of a block document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// `None` for freeform content
    #[serde(rename = "blockName", default)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<Value>,
    #[serde(
        rename = "innerBlocks",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub inner_blocks: Option<Vec<Block>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Block {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            attrs: Some(Value::Object(Map::new())),
            inner_blocks: Some(Vec::new()),
            extra: Map::new(),
        }
    }

    pub fn is(&self, name: &str) -> bool {
        self.name.as_deref() == Some(name)
    }

    /// Attribute object; empty when absent or not an object.
    pub fn attrs(&self) -> Map<String, Value> {
        match &self.attrs {
            Some(Value::Object(map)) => map.clone(),
            _ => Map::new(),
        }
    }

    pub fn attr(&self, key: &str) -> Option<&Value> {
        match &self.attrs {
            Some(Value::Object(map)) => map.get(key),
            _ => None,
        }
    }

    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attr(key).and_then(Value::as_str)
    }

    pub fn children(&self) -> &[Block] {
        self.inner_blocks.as_deref().unwrap_or(&[])
    }

    /// Remove the `ref` attribute pointing at a separately stored menu.
    ///
    /// Returns true when a reference was present.
    pub fn clear_ref(&mut self) -> bool {
        match &mut self.attrs {
            Some(Value::Object(map)) => map.shift_remove("ref").is_some(),
            _ => false,
        }
    }

    /// Saved markup of an opaque block.
    pub fn inner_html(&self) -> &str {
        self.extra
            .get("innerHTML")
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    /// Rebuild `innerContent` with one `null` slot per inner block.
    pub fn sync_inner_content(&mut self) {
        let slots = self.children().len();
        self.set_inner_content_slots(slots);
    }

    /// Rewrite `innerContent` to hold exactly `slots` placeholders.
    ///
    /// Markup before the first and after the last placeholder is kept; chunks
    /// between placeholders are dropped. Without placeholders every chunk is
    /// treated as leading markup.
    pub fn set_inner_content_slots(&mut self, slots: usize) {
        let chunks = match self.extra.get("innerContent") {
            Some(Value::Array(chunks)) => chunks.clone(),
            _ => Vec::new(),
        };
        let (leading, trailing) = match chunks.iter().position(Value::is_null) {
            Some(first) => {
                let last = chunks.iter().rposition(Value::is_null).unwrap_or(first);
                (chunks[..first].to_vec(), chunks[last + 1..].to_vec())
            }
            None => (chunks, Vec::new()),
        };

        let mut content = leading;
        content.extend(std::iter::repeat(Value::Null).take(slots));
        content.extend(trailing);
        self.extra
            .insert("innerContent".into(), Value::Array(content));
    }
}

impl From<&NavigationItem> for Block {
    /// Serialize an item as a link block, or a submenu block when it has children.
    fn from(item: &NavigationItem) -> Self {
        let (name, marker) = if item.has_children() {
            (NAVIGATION_SUBMENU_BLOCK, GENERATED_SUBMENU_CLASS)
        } else {
            (NAVIGATION_LINK_BLOCK, GENERATED_LINK_CLASS)
        };

        let mut attrs = Map::new();
        attrs.insert("label".into(), json!(item.label));
        attrs.insert("url".into(), json!(item.url));
        attrs.insert("kind".into(), json!("taxonomy"));
        attrs.insert("type".into(), json!(item.taxonomy));
        attrs.insert("id".into(), json!(item.term_id));
        if item.generated {
            attrs.insert("className".into(), json!(marker));
            attrs.insert(PROVENANCE_ATTR.into(), json!(PROVENANCE_GENERATED));
        }

        let children: Vec<Block> = item.children.iter().map(Block::from).collect();
        let mut extra = Map::new();
        extra.insert("innerHTML".into(), json!(""));
        extra.insert(
            "innerContent".into(),
            Value::Array(vec![Value::Null; children.len()]),
        );

        Block {
            name: Some(name.to_string()),
            attrs: Some(Value::Object(attrs)),
            inner_blocks: Some(children),
            extra,
        }
    }
}

/// Whether a menu entry was produced by this system or authored by a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Generated,
    User,
}

impl Provenance {
    /// Classify an entry. Malformed or unknown entries are user entries.
    pub fn of(block: &Block) -> Self {
        if block.attr_str(PROVENANCE_ATTR) == Some(PROVENANCE_GENERATED) {
            return Provenance::Generated;
        }
        let legacy_marker = block
            .attr_str("className")
            .map(|classes| {
                classes
                    .split_whitespace()
                    .any(|c| c == GENERATED_LINK_CLASS || c == GENERATED_SUBMENU_CLASS)
            })
            .unwrap_or(false);
        if legacy_marker {
            Provenance::Generated
        } else {
            Provenance::User
        }
    }
}

/// Merge fresh generated items into existing menu entries.
///
/// Existing generated entries are dropped; the result is the fresh items in
/// order followed by the user entries in their original relative order.
pub fn merge_entries(existing: &[Block], fresh: &[NavigationItem]) -> Vec<Block> {
    let user_entries: Vec<&Block> = existing
        .iter()
        .filter(|b| Provenance::of(b) == Provenance::User)
        .collect();
    debug!(
        dropped = existing.len() - user_entries.len(),
        kept = user_entries.len(),
        fresh = fresh.len(),
        "merging menu entries"
    );

    fresh
        .iter()
        .map(Block::from)
        .chain(user_entries.into_iter().cloned())
        .collect()
}

/// Apply a merge to a navigation container in place and clear its `ref`.
pub fn merge_into_container(container: &mut Block, fresh: &[NavigationItem]) {
    if container.clear_ref() {
        debug!("cleared synced menu reference");
    }
    let merged = merge_entries(container.children(), fresh);
    container.inner_blocks = Some(merged);
    container.sync_inner_content();
}
