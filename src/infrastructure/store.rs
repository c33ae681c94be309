//! Term stores backed by a JSON catalog
//!
//! Catalog format:
//!
//! ```json
//! {
//!   "taxonomies": [{"name": "category", "hierarchical": true, "rewrite_base": "topics"}],
//!   "terms": [{"id": 1, "taxonomy": "category", "name": "News", "slug": "news", "parent": 0, "count": 3}]
//! }
//! ```

use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::application::{ApplicationResult, IoResultExt, JsonResultExt};
use crate::domain::{
    AncestorIndex, DomainError, OrderBy, SortOrder, Taxonomy, Term, TermId, TermQuery,
};
use crate::infrastructure::traits::{FileSystem, TermSource};
use crate::infrastructure::{InfraError, InfraResult};

/// Complete store content: taxonomies and their terms in catalog order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermCatalog {
    #[serde(default)]
    pub taxonomies: Vec<Taxonomy>,
    #[serde(default)]
    pub terms: Vec<Term>,
}

impl TermCatalog {
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    pub fn taxonomy(&self, name: &str) -> Option<&Taxonomy> {
        self.taxonomies.iter().find(|t| t.name == name)
    }

    /// Filter and sort terms. Sorting is stable: ties keep catalog order.
    pub fn query(&self, query: &TermQuery) -> Result<Vec<Term>, DomainError> {
        if self.taxonomy(&query.taxonomy).is_none() {
            return Err(DomainError::UnknownTaxonomy(query.taxonomy.clone()));
        }
        let mut terms: Vec<Term> = self
            .terms
            .iter()
            .filter(|t| t.taxonomy == query.taxonomy)
            .filter(|t| query.include_empty || t.count > 0)
            .filter(|t| query.parent.map_or(true, |p| t.parent == p))
            .cloned()
            .collect();

        let order_by = query.order_by;
        match query.order {
            SortOrder::Asc => terms.sort_by(|a, b| compare(order_by, a, b)),
            SortOrder::Desc => terms.sort_by(|a, b| compare(order_by, b, a)),
        }
        Ok(terms)
    }

    /// Parent links of every term in `taxonomy`, empty ones included.
    pub fn ancestor_index(&self, taxonomy: &str) -> AncestorIndex {
        let terms: Vec<Term> = self
            .terms
            .iter()
            .filter(|t| t.taxonomy == taxonomy)
            .cloned()
            .collect();
        AncestorIndex::new(&terms)
    }
}

fn compare(order_by: OrderBy, a: &Term, b: &Term) -> Ordering {
    match order_by {
        OrderBy::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        OrderBy::Slug => a.slug.cmp(&b.slug),
        OrderBy::Id => a.id.cmp(&b.id),
        OrderBy::Count => a.count.cmp(&b.count),
        OrderBy::TermOrder => a.term_order.cmp(&b.term_order),
    }
}

/// Term store held in memory; mutations are serialized by a lock.
#[derive(Debug, Default)]
pub struct InMemoryTermStore {
    catalog: RwLock<TermCatalog>,
}

impl InMemoryTermStore {
    pub fn new(catalog: TermCatalog) -> Self {
        Self {
            catalog: RwLock::new(catalog),
        }
    }

    /// Insert a term or replace the term with the same taxonomy and id.
    pub fn upsert_term(&self, term: Term) {
        let mut catalog = self
            .catalog
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match catalog
            .terms
            .iter_mut()
            .find(|t| t.taxonomy == term.taxonomy && t.id == term.id)
        {
            Some(existing) => *existing = term,
            None => catalog.terms.push(term),
        }
    }

    /// Delete a term; its children move up to the deleted term's parent.
    pub fn remove_term(&self, taxonomy: &str, id: TermId) -> bool {
        let mut catalog = self
            .catalog
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let Some(pos) = catalog
            .terms
            .iter()
            .position(|t| t.taxonomy == taxonomy && t.id == id)
        else {
            return false;
        };
        let removed = catalog.terms.remove(pos);
        for term in catalog
            .terms
            .iter_mut()
            .filter(|t| t.taxonomy == taxonomy && t.parent == id)
        {
            term.parent = removed.parent;
        }
        true
    }
}

impl TermSource for InMemoryTermStore {
    fn snapshot(&self) -> ApplicationResult<TermCatalog> {
        Ok(self
            .catalog
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone())
    }
}

/// Term store reading a JSON catalog file on every query.
pub struct FileTermStore {
    path: PathBuf,
    fs: Arc<dyn FileSystem>,
}

impl FileTermStore {
    /// Open a catalog file; it must exist.
    pub fn open(path: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> InfraResult<Self> {
        let path = path.into();
        if !fs.is_file(&path) {
            return Err(InfraError::Store {
                message: format!("catalog not found: {}", path.display()),
            });
        }
        Ok(Self { path, fs })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[instrument(level = "trace", skip(self))]
    pub fn load(&self) -> ApplicationResult<TermCatalog> {
        let content = self
            .fs
            .read_to_string(&self.path)
            .with_path_context("read term catalog", &self.path)?;
        let catalog = TermCatalog::from_json(&content)
            .with_json_context("parse term catalog", &self.path)?;
        debug!(
            taxonomies = catalog.taxonomies.len(),
            terms = catalog.terms.len(),
            "loaded term catalog"
        );
        Ok(catalog)
    }
}

impl TermSource for FileTermStore {
    fn snapshot(&self) -> ApplicationResult<TermCatalog> {
        self.load()
    }
}
