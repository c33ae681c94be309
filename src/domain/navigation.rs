//! Navigation items materialized from a term forest.

use generational_arena::Index;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::entities::{Term, TermId};
use crate::domain::error::DomainResult;
use crate::domain::forest::TermForest;

/// One entry of a generated navigation menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationItem {
    pub label: String,
    /// Canonical term address, empty when it could not be resolved
    pub url: String,
    pub taxonomy: String,
    pub term_id: TermId,
    /// Produced by this system (as opposed to authored by a user)
    #[serde(default)]
    pub generated: bool,
    #[serde(default)]
    pub children: Vec<NavigationItem>,
}

impl NavigationItem {
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Converts forest nodes into generated navigation items.
///
/// Link resolution is delegated to `resolve`; a failed resolution yields an empty
/// URL for that item and never aborts the batch.
pub struct LinkMaterializer<F>
where
    F: Fn(&Term) -> DomainResult<String>,
{
    resolve: F,
}

impl<F> LinkMaterializer<F>
where
    F: Fn(&Term) -> DomainResult<String>,
{
    pub fn new(resolve: F) -> Self {
        Self { resolve }
    }

    pub fn materialize(&self, forest: &TermForest) -> Vec<NavigationItem> {
        let items: Vec<_> = forest
            .roots()
            .iter()
            .filter_map(|&root| self.materialize_node(forest, root))
            .collect();
        debug!(roots = items.len(), "materialized navigation items");
        items
    }

    fn materialize_node(&self, forest: &TermForest, idx: Index) -> Option<NavigationItem> {
        let node = forest.get_node(idx)?;
        let url = match (self.resolve)(&node.term) {
            Ok(url) => url,
            Err(e) => {
                warn!("link resolution failed, emitting empty url: {}", e);
                String::new()
            }
        };
        let children = node
            .children
            .iter()
            .filter_map(|&child| self.materialize_node(forest, child))
            .collect();

        Some(NavigationItem {
            label: node.term.name.clone(),
            url,
            taxonomy: node.term.taxonomy.clone(),
            term_id: node.term.id,
            generated: true,
            children,
        })
    }
}
