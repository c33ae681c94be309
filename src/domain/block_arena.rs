use generational_arena::{Arena, Index};
use tracing::{debug, instrument};

use crate::domain::attributes::BlockAttributes;
use crate::domain::block::{Block, Provenance, NAVIGATION_BLOCK, TAXONOMY_NAVIGATION_BLOCK};
use crate::domain::navigation::NavigationItem;

/// Block stored in the arena without its inner blocks.
#[derive(Debug)]
pub struct BlockNode {
    /// `inner_blocks` is `Some(empty)` when the block had an inner block list
    pub block: Block,
    pub parent: Option<Index>,
    pub children: Vec<Index>,
}

/// Flat table of a block document, nodes linked by arena index.
///
/// Containers get new child index lists instead of being mutated through nested
/// references; `into_document` rebuilds the nested form.
#[derive(Debug, Default)]
pub struct BlockArena {
    arena: Arena<BlockNode>,
    roots: Vec<Index>,
}

impl BlockArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_document(document: Vec<Block>) -> Self {
        let mut arena = Self::new();
        for block in document {
            arena.insert_subtree(block, None);
        }
        arena
    }

    /// Insert `block` and all its inner blocks below `parent` (or as a root).
    pub fn insert_subtree(&mut self, mut block: Block, parent: Option<Index>) -> Index {
        let inner = block.inner_blocks.as_mut().map(std::mem::take);
        let top = self.insert_node(block, parent);

        // Reverse so the first child is popped and linked first
        let mut stack: Vec<(Block, Index)> = inner
            .unwrap_or_default()
            .into_iter()
            .rev()
            .map(|child| (child, top))
            .collect();
        while let Some((mut block, parent)) = stack.pop() {
            let inner = block.inner_blocks.as_mut().map(std::mem::take);
            let idx = self.insert_node(block, Some(parent));
            for child in inner.unwrap_or_default().into_iter().rev() {
                stack.push((child, idx));
            }
        }
        top
    }

    fn insert_node(&mut self, block: Block, parent: Option<Index>) -> Index {
        let idx = self.arena.insert(BlockNode {
            block,
            parent,
            children: Vec::new(),
        });
        match parent.and_then(|p| self.arena.get_mut(p)) {
            Some(parent_node) => parent_node.children.push(idx),
            None => self.roots.push(idx),
        }
        idx
    }

    /// Drop a node and all of its descendants from the table.
    ///
    /// Parent links are left to the caller, which replaces child lists wholesale.
    pub fn remove_subtree(&mut self, idx: Index) {
        let mut stack = vec![idx];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.arena.remove(current) {
                stack.extend(node.children);
            }
        }
    }

    pub fn get(&self, idx: Index) -> Option<&BlockNode> {
        self.arena.get(idx)
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Indices of all blocks named `name`, in document pre-order.
    pub fn find(&self, name: &str) -> Vec<Index> {
        let mut found = Vec::new();
        let mut stack: Vec<Index> = self.roots.iter().rev().copied().collect();
        while let Some(idx) = stack.pop() {
            if let Some(node) = self.arena.get(idx) {
                if node.block.is(name) {
                    found.push(idx);
                }
                stack.extend(node.children.iter().rev());
            }
        }
        found
    }

    /// First direct child of `idx` named `name`.
    pub fn child_named(&self, idx: Index, name: &str) -> Option<Index> {
        self.arena.get(idx)?.children.iter().copied().find(|&c| {
            self.arena
                .get(c)
                .map(|n| n.block.is(name))
                .unwrap_or(false)
        })
    }

    /// Replace the generated children of `container` with `fresh`, keeping user
    /// children after them in their original order.
    #[instrument(level = "debug", skip(self, fresh), fields(fresh = fresh.len()))]
    pub fn merge_container(&mut self, container: Index, fresh: &[NavigationItem]) {
        let existing = match self.arena.get_mut(container) {
            Some(node) => {
                node.block.clear_ref();
                std::mem::take(&mut node.children)
            }
            None => return,
        };

        let (user, generated): (Vec<Index>, Vec<Index>) =
            existing.into_iter().partition(|&c| {
                self.arena
                    .get(c)
                    .map(|n| Provenance::of(&n.block) == Provenance::User)
                    .unwrap_or(false)
            });
        debug!(dropped = generated.len(), kept = user.len(), "merging container");
        for idx in generated {
            self.remove_subtree(idx);
        }

        // Fresh subtrees link themselves to the (now empty) child list
        for item in fresh {
            self.insert_subtree(Block::from(item), Some(container));
        }
        if let Some(node) = self.arena.get_mut(container) {
            node.children.extend(user);
            node.block.inner_blocks.get_or_insert_with(Vec::new);
            let slots = node.children.len();
            node.block.set_inner_content_slots(slots);
        }
    }

    /// Rebuild the nested document, consuming the table.
    pub fn into_document(mut self) -> Vec<Block> {
        let roots = std::mem::take(&mut self.roots);
        roots
            .into_iter()
            .filter_map(|idx| self.take_subtree(idx))
            .collect()
    }

    fn take_subtree(&mut self, idx: Index) -> Option<Block> {
        let node = self.arena.remove(idx)?;
        let mut block = node.block;
        let children: Vec<Block> = node
            .children
            .into_iter()
            .filter_map(|c| self.take_subtree(c))
            .collect();
        if let Some(inner) = block.inner_blocks.as_mut() {
            *inner = children;
        }
        Some(block)
    }
}

/// Regenerate every taxonomy navigation block of `document`.
///
/// `links_for` computes the fresh items for a block's resolved attributes.
/// Returns the new document and the number of containers updated.
#[instrument(level = "debug", skip(document, links_for), fields(roots = document.len()))]
pub fn synchronize<F>(document: Vec<Block>, mut links_for: F) -> (Vec<Block>, usize)
where
    F: FnMut(&BlockAttributes) -> Vec<NavigationItem>,
{
    let mut arena = BlockArena::from_document(document);
    let mut updated = 0;

    for nav_block in arena.find(TAXONOMY_NAVIGATION_BLOCK) {
        let attrs = match arena.get(nav_block) {
            Some(node) => BlockAttributes::from_attrs(
                &node.block.attrs(),
                &BlockAttributes::navigation_defaults(),
            ),
            None => continue,
        };
        let Some(container) = arena.child_named(nav_block, NAVIGATION_BLOCK) else {
            debug!("taxonomy navigation block without navigation container");
            continue;
        };
        let fresh = links_for(&attrs);
        arena.merge_container(container, &fresh);
        updated += 1;
    }

    debug!(updated, "synchronized block document");
    (arena.into_document(), updated)
}
