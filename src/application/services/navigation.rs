//! Navigation service
//!
//! Builds navigation items from the term source, renders navigation blocks and
//! synchronizes the navigation containers of stored block documents.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt, JsonResultExt};
use crate::domain::block::{NAVIGATION_BLOCK, TAXONOMY_NAVIGATION_BLOCK};
use crate::domain::{
    merge_entries, synchronize, Block, BlockAttributes, DomainError, LinkMaterializer,
    NavigationItem,
};
use crate::infrastructure::traits::{FileSystem, LinkResolver, TermSource};
use crate::render::navigation::render_navigation;

use super::forest::load_forest;

/// Result of synchronizing one block document file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    /// Navigation containers regenerated
    pub containers: usize,
    /// Whether the document content changed
    pub changed: bool,
}

pub struct NavigationService {
    terms: Arc<dyn TermSource>,
    links: Arc<dyn LinkResolver>,
    fs: Arc<dyn FileSystem>,
}

impl NavigationService {
    pub fn new(
        terms: Arc<dyn TermSource>,
        links: Arc<dyn LinkResolver>,
        fs: Arc<dyn FileSystem>,
    ) -> Self {
        Self { terms, links, fs }
    }

    /// Fresh navigation items for `attrs`: query, build, materialize.
    ///
    /// A nonexistent taxonomy yields no items.
    #[instrument(level = "debug", skip(self, attrs), fields(taxonomy = %attrs.taxonomy))]
    pub fn build_links(&self, attrs: &BlockAttributes) -> ApplicationResult<Vec<NavigationItem>> {
        let Some(loaded) = load_forest(self.terms.as_ref(), attrs)? else {
            return Ok(Vec::new());
        };
        let taxonomy = &loaded.taxonomy;
        let materializer = LinkMaterializer::new(|term| self.links.term_link(taxonomy, term));
        Ok(materializer.materialize(&loaded.forest))
    }

    /// Like [`Self::build_links`], collapsing failures into no items.
    pub fn links_or_empty(&self, attrs: &BlockAttributes) -> Vec<NavigationItem> {
        self.build_links(attrs).unwrap_or_else(|e| {
            warn!("building navigation links failed: {}", e);
            Vec::new()
        })
    }

    /// Render-time markup of a taxonomy navigation block.
    ///
    /// Fresh links are merged with the user entries of the stored container;
    /// the stored document itself is left unchanged.
    #[instrument(level = "debug", skip(self, block))]
    pub fn render_navigation_block(&self, block: &Block) -> String {
        let Some(container) = block.children().iter().find(|b| b.is(NAVIGATION_BLOCK)) else {
            debug!("no navigation container, rendering nothing");
            return String::new();
        };
        let wrapper_attrs = block.attrs();
        let attrs =
            BlockAttributes::from_attrs(&wrapper_attrs, &BlockAttributes::navigation_defaults());
        let fresh = self.links_or_empty(&attrs);
        let entries = merge_entries(container.children(), &fresh);
        render_navigation(&wrapper_attrs, container, &entries)
    }

    /// Markup of every taxonomy navigation block in `document`, in document order.
    pub fn render_document_navigation(&self, document: &[Block]) -> Vec<String> {
        let mut rendered = Vec::new();
        let mut stack: Vec<&Block> = document.iter().rev().collect();
        while let Some(block) = stack.pop() {
            if block.is(TAXONOMY_NAVIGATION_BLOCK) {
                rendered.push(self.render_navigation_block(block));
            }
            stack.extend(block.children().iter().rev());
        }
        rendered
    }

    /// Regenerate the navigation containers of a block document.
    pub fn synchronize_document(&self, document: Vec<Block>) -> (Vec<Block>, usize) {
        synchronize(document, |attrs| self.links_or_empty(attrs))
    }

    /// Synchronize a block document file in place.
    ///
    /// With `check` set nothing is written. The file is replaced atomically and
    /// only when its content changes.
    #[instrument(level = "debug", skip(self))]
    pub fn sync_file(&self, path: &Path, check: bool) -> ApplicationResult<SyncReport> {
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read block document", path)?;
        let document = parse_document(&content, path)?;

        let (synced, containers) = self.synchronize_document(document.clone());
        let changed = synced != document;
        debug!(containers, changed, check, "synchronized document");

        if changed && !check {
            let mut output = serde_json::to_string_pretty(&synced)
                .with_json_context("serialize block document", path)?;
            output.push('\n');
            self.fs
                .write_atomic(path, &output)
                .with_path_context("write block document", path)?;
        }
        Ok(SyncReport { containers, changed })
    }

    /// Read and parse a block document file.
    pub fn read_document(&self, path: &Path) -> ApplicationResult<Vec<Block>> {
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read block document", path)?;
        parse_document(&content, path)
    }
}

/// A block document is a JSON array of root blocks.
fn parse_document(content: &str, path: &Path) -> ApplicationResult<Vec<Block>> {
    if content.trim().is_empty() {
        return Err(ApplicationError::Domain(DomainError::InvalidDocument {
            message: format!("empty block document: {}", path.display()),
        }));
    }
    serde_json::from_str(content).with_json_context("parse block document", path)
}
