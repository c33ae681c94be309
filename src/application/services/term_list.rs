//! Term list block rendering.

use std::sync::Arc;

use tracing::{instrument, warn};

use crate::application::ApplicationResult;
use crate::domain::{BlockAttributes, Term, TermForest};
use crate::infrastructure::traits::{LinkResolver, TermSource};
use crate::render::TermListRenderer;

use super::forest::load_forest;

pub struct TermListService {
    terms: Arc<dyn TermSource>,
    links: Arc<dyn LinkResolver>,
}

impl TermListService {
    pub fn new(terms: Arc<dyn TermSource>, links: Arc<dyn LinkResolver>) -> Self {
        Self { terms, links }
    }

    /// Block markup for `attrs`; empty when the taxonomy is unknown or has no terms.
    #[instrument(level = "debug", skip(self, attrs), fields(taxonomy = %attrs.taxonomy))]
    pub fn try_render(&self, attrs: &BlockAttributes) -> ApplicationResult<String> {
        let Some(loaded) = load_forest(self.terms.as_ref(), attrs)? else {
            return Ok(String::new());
        };
        let taxonomy = &loaded.taxonomy;
        let link = |term: &Term| {
            self.links.term_link(taxonomy, term).unwrap_or_else(|e| {
                warn!("link resolution failed: {}", e);
                String::new()
            })
        };
        let renderer = TermListRenderer::new(attrs, loaded.hierarchical, &link);
        Ok(renderer.render_block(&loaded.forest))
    }

    /// Viewer-facing render: failures collapse into empty output.
    pub fn render(&self, attrs: &BlockAttributes) -> String {
        self.try_render(attrs).unwrap_or_else(|e| {
            warn!("rendering term list failed: {}", e);
            String::new()
        })
    }

    /// The forest a term list would show, for inspection.
    pub fn forest(&self, attrs: &BlockAttributes) -> ApplicationResult<TermForest> {
        Ok(load_forest(self.terms.as_ref(), attrs)?
            .map(|loaded| loaded.forest)
            .unwrap_or_default())
    }
}
