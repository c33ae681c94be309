//! Forest builder: flat term lists to depth-bounded term forests.

use std::collections::{HashMap, HashSet};

use tracing::{debug, instrument};

use crate::domain::entities::{Term, TermId};
use crate::domain::forest::TermForest;

/// True when a node at `depth` falls outside a `max_depth` limit (0 = unlimited).
pub fn exceeds_max_depth(max_depth: u32, depth: usize) -> bool {
    max_depth != 0 && depth >= max_depth as usize
}

/// Constructs term forests from the ordered term sequence of a term source.
///
/// The builder never re-sorts: roots and siblings appear in input order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForestBuilder {
    max_depth: u32,
}

impl ForestBuilder {
    pub fn new(max_depth: u32) -> Self {
        Self { max_depth }
    }

    /// Build the parent-indexed forest.
    ///
    /// A term is a root when its parent is 0 or not among `terms`. Nodes at or below
    /// `max_depth` are excluded together with their whole subtree.
    #[instrument(level = "debug", skip(terms), fields(terms = terms.len()))]
    pub fn build(&self, terms: &[Term]) -> TermForest {
        let mut forest = TermForest::new();
        if terms.is_empty() {
            return forest;
        }

        let known: HashSet<TermId> = terms.iter().map(|t| t.id).collect();
        let mut children_of: HashMap<TermId, Vec<&Term>> = HashMap::new();
        let mut roots: Vec<&Term> = Vec::new();
        for term in terms {
            if term.is_root() || !known.contains(&term.parent) {
                roots.push(term);
            } else {
                children_of.entry(term.parent).or_default().push(term);
            }
        }

        let mut visited: HashSet<TermId> = HashSet::new();
        // Reverse pushes keep input order when popping
        let mut stack: Vec<(&Term, usize, Option<_>)> =
            roots.iter().rev().map(|&t| (t, 0, None)).collect();

        while let Some((term, depth, parent_idx)) = stack.pop() {
            if exceeds_max_depth(self.max_depth, depth) {
                continue;
            }
            if !visited.insert(term.id) {
                debug!(term_id = term.id, "duplicate term skipped");
                continue;
            }

            let idx = forest.insert_node(term.clone(), depth, parent_idx);

            if let Some(children) = children_of.get(&term.id) {
                for &child in children.iter().rev() {
                    stack.push((child, depth + 1, Some(idx)));
                }
            }
        }

        let dropped = terms.len() - forest.len();
        debug!(
            kept = forest.len(),
            dropped, "built hierarchical forest (max_depth={})", self.max_depth
        );
        forest
    }

    /// Build a single-level forest.
    ///
    /// Every term becomes a root; its depth is its ancestor count in the true
    /// hierarchy as reported by `ancestor_count`, and the same exclusion rule applies.
    #[instrument(level = "debug", skip(terms, ancestor_count), fields(terms = terms.len()))]
    pub fn build_flat<F>(&self, terms: &[Term], mut ancestor_count: F) -> TermForest
    where
        F: FnMut(&Term) -> usize,
    {
        let mut forest = TermForest::new();
        let mut seen: HashSet<TermId> = HashSet::new();
        for term in terms {
            if !seen.insert(term.id) {
                continue;
            }
            let depth = ancestor_count(term);
            if exceeds_max_depth(self.max_depth, depth) {
                continue;
            }
            forest.insert_node(term.clone(), depth, None);
        }
        debug!(kept = forest.len(), "built flat forest (max_depth={})", self.max_depth);
        forest
    }
}

/// Ancestor lookup over a complete term set, for flat-mode depth.
#[derive(Debug, Clone, Default)]
pub struct AncestorIndex {
    parents: HashMap<TermId, TermId>,
}

impl AncestorIndex {
    pub fn new(terms: &[Term]) -> Self {
        Self {
            parents: terms.iter().map(|t| (t.id, t.parent)).collect(),
        }
    }

    /// Ancestor ids of `id`, nearest first. Stops at cycles and unknown parents.
    pub fn ancestors(&self, id: TermId) -> Vec<TermId> {
        let mut result = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut current = id;
        while let Some(&parent) = self.parents.get(&current) {
            if parent == 0 || !seen.insert(parent) {
                break;
            }
            result.push(parent);
            current = parent;
        }
        result
    }

    pub fn ancestor_count(&self, id: TermId) -> usize {
        self.ancestors(id).len()
    }
}
