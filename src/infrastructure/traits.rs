//! I/O boundary traits for testability
//!
//! These traits abstract the term store, link resolution and filesystem access,
//! allowing services to be tested with in-memory implementations.

use std::io::{self, Write};
use std::path::Path;

use crate::application::ApplicationResult;
use crate::domain::{DomainResult, Taxonomy, Term, TermQuery};
use crate::infrastructure::store::TermCatalog;

/// Source of taxonomy terms.
pub trait TermSource: Send + Sync {
    /// One consistent view of the whole store.
    ///
    /// Callers that need several lookups for one request take a single snapshot
    /// and answer all of them from it.
    fn snapshot(&self) -> ApplicationResult<TermCatalog>;

    /// Terms of `query.taxonomy`, filtered and sorted as requested.
    fn list_terms(&self, query: &TermQuery) -> ApplicationResult<Vec<Term>> {
        Ok(self.snapshot()?.query(query)?)
    }
}

/// Canonical address of a term.
pub trait LinkResolver: Send + Sync {
    fn term_link(&self, taxonomy: &Taxonomy, term: &Term) -> DomainResult<String>;
}

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Replace a file's content via a temp file in the same directory and a rename.
    ///
    /// Readers see either the old or the new content, never a partial write.
    fn write_atomic(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path is a file.
    fn is_file(&self, path: &Path) -> bool;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write_atomic(&self, path: &Path, content: &str) -> io::Result<()> {
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }
}
