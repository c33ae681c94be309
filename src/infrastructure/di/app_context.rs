//! Application context for dependency injection
//!
//! Built once at start-up and passed explicitly to every entry point.

use std::sync::Arc;

use tracing::debug;

use crate::application::services::{NavigationService, TermListService};
use crate::config::Settings;
use crate::infrastructure::links::PermalinkResolver;
use crate::infrastructure::store::FileTermStore;
use crate::infrastructure::traits::{FileSystem, LinkResolver, RealFileSystem, TermSource};
use crate::infrastructure::InfraResult;

/// Settings plus the I/O implementations the services run against.
pub struct AppContext {
    pub settings: Arc<Settings>,
    pub fs: Arc<dyn FileSystem>,
    pub terms: Arc<dyn TermSource>,
    pub links: Arc<dyn LinkResolver>,
}

impl AppContext {
    /// Context with the file-backed term store and permalink resolver.
    pub fn new(settings: Settings) -> InfraResult<Self> {
        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
        let store = FileTermStore::open(settings.store_path.clone(), Arc::clone(&fs))?;
        debug!(store = %store.path().display(), "opened term store");
        let links = PermalinkResolver::new(
            settings.site_url.clone(),
            settings.permalink_bases.clone(),
        );
        Ok(Self::with_deps(settings, fs, Arc::new(store), Arc::new(links)))
    }

    /// Context with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        terms: Arc<dyn TermSource>,
        links: Arc<dyn LinkResolver>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            fs,
            terms,
            links,
        }
    }

    pub fn navigation(&self) -> NavigationService {
        NavigationService::new(
            Arc::clone(&self.terms),
            Arc::clone(&self.links),
            Arc::clone(&self.fs),
        )
    }

    pub fn term_list(&self) -> TermListService {
        TermListService::new(Arc::clone(&self.terms), Arc::clone(&self.links))
    }
}
