//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::TermId;

/// Domain errors represent violations inside the term/menu model.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("unknown taxonomy: {0}")]
    UnknownTaxonomy(String),

    #[error("cannot resolve link for term {term_id} in {taxonomy}: {reason}")]
    UnresolvableLink {
        taxonomy: String,
        term_id: TermId,
        reason: String,
    },

    #[error("invalid block document: {message}")]
    InvalidDocument { message: String },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
