//! Shared term loading: query the source and build the forest for a block.

use tracing::{debug, instrument};

use crate::application::ApplicationResult;
use crate::domain::{BlockAttributes, ForestBuilder, Taxonomy, TermForest};
use crate::infrastructure::traits::TermSource;

/// A forest together with the taxonomy it was built from.
#[derive(Debug)]
pub struct LoadedForest {
    pub taxonomy: Taxonomy,
    pub forest: TermForest,
    /// Hierarchy requested by the block and supported by the taxonomy
    pub hierarchical: bool,
}

/// Fetch and build the term forest for `attrs`.
///
/// Every lookup is answered from one store snapshot. Returns `Ok(None)` when
/// the taxonomy does not exist.
#[instrument(level = "debug", skip(terms, attrs), fields(taxonomy = %attrs.taxonomy))]
pub fn load_forest(
    terms: &dyn TermSource,
    attrs: &BlockAttributes,
) -> ApplicationResult<Option<LoadedForest>> {
    let catalog = terms.snapshot()?;
    let Some(taxonomy) = catalog.taxonomy(&attrs.taxonomy).cloned() else {
        debug!("taxonomy does not exist");
        return Ok(None);
    };

    let hierarchical = attrs.show_hierarchy && taxonomy.hierarchical;
    let listed = catalog.query(&attrs.term_query())?;
    let builder = ForestBuilder::new(attrs.max_depth);

    let forest = if hierarchical {
        builder.build(&listed)
    } else if attrs.max_depth == 0 {
        builder.build_flat(&listed, |_| 0)
    } else {
        let index = catalog.ancestor_index(&taxonomy.name);
        builder.build_flat(&listed, |term| index.ancestor_count(term.id))
    };

    debug!(listed = listed.len(), nodes = forest.len(), hierarchical, "loaded forest");
    Ok(Some(LoadedForest {
        taxonomy,
        forest,
        hierarchical,
    }))
}
