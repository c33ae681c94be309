//! Domain layer: entities and business logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod attributes;
pub mod block;
pub mod block_arena;
pub mod builder;
pub mod entities;
pub mod error;
pub mod forest;
pub mod navigation;

pub use attributes::{BlockAttributes, DisplayStyle, RawBlockAttributes, RenderStyle};
pub use block::{merge_entries, merge_into_container, Block, Provenance};
pub use block_arena::{synchronize, BlockArena};
pub use builder::{AncestorIndex, ForestBuilder};
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use forest::{TermForest, TermNode};
pub use navigation::{LinkMaterializer, NavigationItem};
