//! Editor session: asynchronous term fetches applied to one menu container.
//!
//! Fetches may complete in any order. Only the result of the most recently
//! issued fetch is merged; older results arriving later are discarded. While a
//! fetch is in flight the container keeps its previous merged state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{merge_into_container, Block, BlockAttributes, NavigationItem};

use super::navigation::NavigationService;

/// Issuance number of one fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

/// Hands out tickets in issuance order and knows which one is current.
#[derive(Debug, Default)]
pub struct FetchSequencer {
    latest: AtomicU64,
}

impl FetchSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> FetchTicket {
        FetchTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// True when no fetch was issued after `ticket`.
    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Merged into the container; carries the number of fresh root items
    Applied(usize),
    /// A newer fetch was issued meanwhile
    Discarded,
}

pub struct EditorSession {
    navigation: Arc<NavigationService>,
    sequencer: FetchSequencer,
    container: Mutex<Block>,
}

impl EditorSession {
    pub fn new(navigation: Arc<NavigationService>, container: Block) -> Self {
        Self {
            navigation,
            sequencer: FetchSequencer::new(),
            container: Mutex::new(container),
        }
    }

    /// Start a fetch; pair the ticket with [`Self::apply`].
    pub fn begin_fetch(&self) -> FetchTicket {
        self.sequencer.issue()
    }

    /// Merge a fetch result unless a newer fetch was issued.
    #[instrument(level = "debug", skip(self, items), fields(items = items.len()))]
    pub async fn apply(&self, ticket: FetchTicket, items: Vec<NavigationItem>) -> FetchOutcome {
        let mut container = self.container.lock().await;
        if !self.sequencer.is_current(ticket) {
            debug!(?ticket, "stale fetch result discarded");
            return FetchOutcome::Discarded;
        }
        merge_into_container(&mut container, &items);
        FetchOutcome::Applied(items.len())
    }

    /// Fetch fresh items for `attrs` off the async runtime and merge them.
    ///
    /// A failing term source yields no fresh items, leaving only user entries.
    pub async fn refresh(&self, attrs: BlockAttributes) -> ApplicationResult<FetchOutcome> {
        let ticket = self.begin_fetch();
        let navigation = Arc::clone(&self.navigation);
        let items = tokio::task::spawn_blocking(move || navigation.links_or_empty(&attrs))
            .await
            .map_err(|e| ApplicationError::OperationFailed {
                context: "fetch navigation items".into(),
                source: Box::new(e),
            })?;
        Ok(self.apply(ticket, items).await)
    }

    /// Snapshot of the current container.
    pub async fn container(&self) -> Block {
        self.container.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Provenance, Taxonomy, Term};
    use crate::infrastructure::links::PermalinkResolver;
    use crate::infrastructure::store::{InMemoryTermStore, TermCatalog};
    use crate::infrastructure::traits::RealFileSystem;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn item(label: &str) -> NavigationItem {
        NavigationItem {
            label: label.into(),
            url: format!("/category/{}/", label.to_lowercase()),
            taxonomy: "category".into(),
            term_id: 1,
            generated: true,
            children: Vec::new(),
        }
    }

    fn session(terms: Vec<Term>) -> EditorSession {
        let store = InMemoryTermStore::new(TermCatalog {
            taxonomies: vec![Taxonomy {
                name: "category".into(),
                hierarchical: true,
                rewrite_base: None,
            }],
            terms,
        });
        let navigation = NavigationService::new(
            Arc::new(store),
            Arc::new(PermalinkResolver::new("http://localhost", BTreeMap::new())),
            Arc::new(RealFileSystem),
        );
        let container: Block = serde_json::from_value(json!({
            "blockName": "core/navigation",
            "attrs": {"ref": 3},
            "innerBlocks": [{"blockName": "core/navigation-link", "attrs": {"label": "Contact"}}]
        }))
        .unwrap();
        EditorSession::new(Arc::new(navigation), container)
    }

    fn labels(block: &Block) -> Vec<String> {
        block
            .children()
            .iter()
            .filter_map(|b| b.attr_str("label").map(str::to_string))
            .collect()
    }

    #[test]
    fn given_two_tickets_when_checking_then_only_latest_is_current() {
        let sequencer = FetchSequencer::new();
        let first = sequencer.issue();
        let second = sequencer.issue();

        assert!(!sequencer.is_current(first));
        assert!(sequencer.is_current(second));
        assert!(first < second);
    }

    #[tokio::test]
    async fn given_stale_result_arriving_last_when_applying_then_discarded() {
        let session = session(Vec::new());
        let older = session.begin_fetch();
        let newer = session.begin_fetch();

        let applied = session.apply(newer, vec![item("New")]).await;
        let stale = session.apply(older, vec![item("Old")]).await;

        assert_eq!(applied, FetchOutcome::Applied(1));
        assert_eq!(stale, FetchOutcome::Discarded);
        assert_eq!(labels(&session.container().await), vec!["New", "Contact"]);
    }

    #[tokio::test]
    async fn given_in_flight_fetch_when_reading_then_previous_state_kept() {
        let session = session(Vec::new());
        let first = session.begin_fetch();
        session.apply(first, vec![item("Kept")]).await;

        let _pending = session.begin_fetch();

        assert_eq!(labels(&session.container().await), vec!["Kept", "Contact"]);
    }

    #[tokio::test]
    async fn given_empty_source_when_refreshing_then_only_user_entries_remain() {
        let session = session(Vec::new());

        let outcome = session
            .refresh(BlockAttributes::navigation_defaults())
            .await
            .unwrap();

        let container = session.container().await;
        assert_eq!(outcome, FetchOutcome::Applied(0));
        assert_eq!(labels(&container), vec!["Contact"]);
        assert!(container.attr("ref").is_none());
        assert!(container
            .children()
            .iter()
            .all(|b| Provenance::of(b) == Provenance::User));
    }

    #[tokio::test]
    async fn given_terms_when_refreshing_then_generated_links_precede_user_entries() {
        let term = Term {
            id: 7,
            taxonomy: "category".into(),
            name: "News".into(),
            slug: "news".into(),
            parent: 0,
            count: 0,
            term_order: 0,
        };
        let session = session(vec![term]);

        session
            .refresh(BlockAttributes::navigation_defaults())
            .await
            .unwrap();

        let container = session.container().await;
        assert_eq!(labels(&container), vec!["News", "Contact"]);
        assert_eq!(
            container.children()[0].attr_str("url"),
            Some("http://localhost/category/news/")
        );
    }
}
