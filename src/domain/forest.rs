use generational_arena::{Arena, Index};
use std::fmt;
use termtree::Tree;
use tracing::instrument;

use crate::domain::entities::Term;

/// Forest node wrapping one term.
#[derive(Debug)]
pub struct TermNode {
    pub term: Term,
    /// Level in the forest (roots are 0); in flat forests the ancestor count
    pub depth: usize,
    /// Index of parent node in the arena, None for roots
    pub parent: Option<Index>,
    /// Indices of child nodes in the arena, in input order
    pub children: Vec<Index>,
}

impl fmt::Display for TermNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.term)
    }
}

/// Arena-based forest of terms.
///
/// Uses generational arena for memory-safe node references and O(1) lookups.
/// Roots and children keep the order in which the term source delivered them.
#[derive(Debug, Default)]
pub struct TermForest {
    arena: Arena<TermNode>,
    roots: Vec<Index>,
}

impl TermForest {
    pub fn new() -> Self {
        Self::default()
    }

    #[instrument(level = "trace", skip(self, term), fields(term_id = term.id))]
    pub fn insert_node(&mut self, term: Term, depth: usize, parent: Option<Index>) -> Index {
        let node = TermNode {
            term,
            depth,
            parent,
            children: Vec::new(),
        };
        let node_idx = self.arena.insert(node);

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.push(node_idx);
            }
        } else {
            self.roots.push(node_idx);
        }

        node_idx
    }

    pub fn get_node(&self, idx: Index) -> Option<&TermNode> {
        self.arena.get(idx)
    }

    pub fn roots(&self) -> &[Index] {
        &self.roots
    }

    /// Child nodes of `idx` in order.
    pub fn children(&self, idx: Index) -> impl Iterator<Item = (Index, &TermNode)> + '_ {
        self.arena
            .get(idx)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
            .iter()
            .filter_map(move |&child| self.arena.get(child).map(|n| (child, n)))
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Pre-order traversal over all trees, roots left to right.
    pub fn iter(&self) -> ForestIterator<'_> {
        ForestIterator::new(self)
    }

    /// Number of levels in the deepest tree (0 for an empty forest).
    #[instrument(level = "debug", skip(self))]
    pub fn height(&self) -> usize {
        self.roots
            .iter()
            .map(|&root| self.calculate_height(root))
            .max()
            .unwrap_or(0)
    }

    fn calculate_height(&self, node_idx: Index) -> usize {
        if let Some(node) = self.get_node(node_idx) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_height(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// Term names in pre-order, handy for assertions and debugging.
    pub fn names(&self) -> Vec<String> {
        self.iter().map(|(_, node)| node.term.name.clone()).collect()
    }

    /// Render every tree under a synthetic root labelled `label`.
    pub fn to_tree_string(&self, label: &str) -> Tree<String> {
        fn build(forest: &TermForest, idx: Index) -> Tree<String> {
            let label = forest
                .get_node(idx)
                .map(|n| n.to_string())
                .unwrap_or_default();
            let leaves: Vec<_> = forest.children(idx).map(|(c, _)| build(forest, c)).collect();
            Tree::new(label).with_leaves(leaves)
        }

        let leaves: Vec<_> = self.roots.iter().map(|&root| build(self, root)).collect();
        Tree::new(label.to_string()).with_leaves(leaves)
    }
}

pub struct ForestIterator<'a> {
    forest: &'a TermForest,
    stack: Vec<Index>,
}

impl<'a> ForestIterator<'a> {
    fn new(forest: &'a TermForest) -> Self {
        // Reverse so the first root is popped first
        let stack = forest.roots.iter().rev().copied().collect();
        Self { forest, stack }
    }
}

impl<'a> Iterator for ForestIterator<'a> {
    type Item = (Index, &'a TermNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.forest.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}
