use std::collections::BTreeMap;

use crate::domain::{DomainError, DomainResult, Taxonomy, Term};
use crate::infrastructure::traits::LinkResolver;

/// Pretty-permalink addresses: `{site_url}/{base}/{slug}/`.
///
/// The base comes from the configured per-taxonomy bases, then the taxonomy's
/// own rewrite base.
#[derive(Debug, Clone)]
pub struct PermalinkResolver {
    site_url: String,
    bases: BTreeMap<String, String>,
}

impl PermalinkResolver {
    pub fn new(site_url: impl Into<String>, bases: BTreeMap<String, String>) -> Self {
        Self {
            site_url: site_url.into().trim_end_matches('/').to_string(),
            bases,
        }
    }

    fn base<'a>(&'a self, taxonomy: &'a Taxonomy) -> &'a str {
        self.bases
            .get(&taxonomy.name)
            .map(String::as_str)
            .unwrap_or_else(|| taxonomy.rewrite_base())
            .trim_matches('/')
    }
}

impl LinkResolver for PermalinkResolver {
    fn term_link(&self, taxonomy: &Taxonomy, term: &Term) -> DomainResult<String> {
        let unresolvable = |reason: &str| DomainError::UnresolvableLink {
            taxonomy: term.taxonomy.clone(),
            term_id: term.id,
            reason: reason.to_string(),
        };
        if term.taxonomy != taxonomy.name {
            return Err(unresolvable("term belongs to another taxonomy"));
        }
        let slug = term.slug.trim_matches('/');
        if slug.is_empty() {
            return Err(unresolvable("empty slug"));
        }

        let base = self.base(taxonomy);
        if base.is_empty() {
            Ok(format!("{}/{}/", self.site_url, slug))
        } else {
            Ok(format!("{}/{}/{}/", self.site_url, base, slug))
        }
    }
}
