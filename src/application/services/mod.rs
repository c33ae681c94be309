//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (TermSource, LinkResolver, FileSystem)
//! but are themselves concrete structs, not traits.

mod editor;
mod forest;
mod navigation;
mod term_list;

pub use editor::{EditorSession, FetchOutcome, FetchSequencer, FetchTicket};
pub use forest::{load_forest, LoadedForest};
pub use navigation::{NavigationService, SyncReport};
pub use term_list::TermListService;
