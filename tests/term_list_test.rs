//! Tests for TermListService over file-backed and in-memory term stores

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rstest::{fixture, rstest};
use tempfile::TempDir;

use taxnav::application::services::TermListService;
use taxnav::domain::{BlockAttributes, DisplayStyle, Term, TermQuery};
use taxnav::infrastructure::links::PermalinkResolver;
use taxnav::infrastructure::store::{FileTermStore, InMemoryTermStore, TermCatalog};
use taxnav::infrastructure::traits::{RealFileSystem, TermSource};
use taxnav::infrastructure::InfraError;
use taxnav::util::testing::init_test_setup;

const CATALOG: &str = r#"{
  "taxonomies": [
    {"name": "category", "hierarchical": true},
    {"name": "post_tag", "hierarchical": false, "rewrite_base": "tag"}
  ],
  "terms": [
    {"id": 1, "taxonomy": "category", "name": "A", "slug": "a", "parent": 0, "count": 2},
    {"id": 2, "taxonomy": "category", "name": "B", "slug": "b", "parent": 1, "count": 1},
    {"id": 3, "taxonomy": "category", "name": "C", "slug": "c", "parent": 0, "count": 0},
    {"id": 10, "taxonomy": "post_tag", "name": "Rust & Go", "slug": "rust-go", "parent": 0, "count": 5}
  ]
}"#;

fn write_catalog(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("terms.json");
    std::fs::write(&path, content).expect("write catalog");
    path
}

fn service(source: Arc<dyn TermSource>) -> TermListService {
    let resolver = PermalinkResolver::new(
        "https://example.com",
        BTreeMap::from([("category".to_string(), "topics".to_string())]),
    );
    TermListService::new(source, Arc::new(resolver))
}

#[fixture]
fn catalog_dir() -> (TempDir, PathBuf) {
    init_test_setup();
    let dir = TempDir::new().unwrap();
    let path = write_catalog(&dir, CATALOG);
    (dir, path)
}

fn file_service(path: &Path) -> TermListService {
    let store = FileTermStore::open(path, Arc::new(RealFileSystem)).unwrap();
    service(Arc::new(store))
}

#[rstest]
#[case(DisplayStyle::Ul)]
#[case(DisplayStyle::Dropdown)]
fn given_flat_render_without_empty_terms_when_rendering_then_empty_term_absent(
    catalog_dir: (TempDir, PathBuf),
    #[case] style: DisplayStyle,
) {
    // Arrange
    let (_dir, path) = catalog_dir;
    let attrs = BlockAttributes {
        display_style: style,
        show_hierarchy: false,
        include_empty: false,
        ..BlockAttributes::default()
    };

    // Act
    let html = file_service(&path).render(&attrs);

    // Assert
    assert!(html.contains(">A<"));
    assert!(html.contains("https://example.com/topics/b/"));
    assert!(!html.contains("/topics/c/"), "empty term C must be hidden: {html}");
}

#[rstest]
fn given_hierarchical_render_when_rendering_then_nested_children_list(
    catalog_dir: (TempDir, PathBuf),
) {
    // Arrange
    let (_dir, path) = catalog_dir;
    let attrs = BlockAttributes {
        show_count: true,
        ..BlockAttributes::default()
    };

    // Act
    let html = file_service(&path).render(&attrs);

    // Assert
    assert_eq!(
        html,
        concat!(
            r#"<div class="wp-block-taxnav-term-list" data-taxonomy="category"><ul>"#,
            r#"<li><a href="https://example.com/topics/a/">A (2)</a>"#,
            r#"<ul class="children"><li><a href="https://example.com/topics/b/">B (1)</a></li></ul>"#,
            r#"</li></ul></div>"#
        )
    );
}

#[rstest]
fn given_term_name_with_markup_when_rendering_then_escaped(catalog_dir: (TempDir, PathBuf)) {
    let (_dir, path) = catalog_dir;
    let attrs = BlockAttributes {
        taxonomy: "post_tag".into(),
        ..BlockAttributes::default()
    };

    let html = file_service(&path).render(&attrs);

    assert!(html.contains("Rust &amp; Go"));
    assert!(html.contains("https://example.com/tag/rust-go/"));
}

#[rstest]
fn given_unknown_taxonomy_when_rendering_then_empty(catalog_dir: (TempDir, PathBuf)) {
    let (_dir, path) = catalog_dir;
    let attrs = BlockAttributes {
        taxonomy: "genre".into(),
        ..BlockAttributes::default()
    };
    assert_eq!(file_service(&path).render(&attrs), "");
}

#[rstest]
fn given_catalog_edited_between_renders_when_rendering_then_fresh_terms_seen(
    catalog_dir: (TempDir, PathBuf),
) {
    // Arrange
    let (dir, path) = catalog_dir;
    let svc = file_service(&path);
    let before = svc.render(&BlockAttributes::default());

    // Act
    write_catalog(&dir, &CATALOG.replace(r#""name": "A""#, r#""name": "Alpha""#));
    let after = svc.render(&BlockAttributes::default());

    // Assert
    assert!(before.contains(">A<"));
    assert!(after.contains(">Alpha<"));
}

#[rstest]
fn given_corrupt_catalog_when_rendering_then_empty_and_error_reported(
    catalog_dir: (TempDir, PathBuf),
) {
    let (dir, path) = catalog_dir;
    write_catalog(&dir, "{ not json");
    let svc = file_service(&path);

    assert_eq!(svc.render(&BlockAttributes::default()), "");
    assert!(svc.try_render(&BlockAttributes::default()).is_err());
}

#[test]
fn given_missing_catalog_when_opening_then_store_error() {
    let dir = TempDir::new().unwrap();
    let result = FileTermStore::open(dir.path().join("nope.json"), Arc::new(RealFileSystem));
    assert!(matches!(result, Err(InfraError::Store { .. })));
}

#[test]
fn given_in_memory_store_when_term_reparented_then_next_render_reflects_it() {
    // Arrange
    let catalog = TermCatalog::from_json(CATALOG).unwrap();
    let store = Arc::new(InMemoryTermStore::new(catalog));
    let svc = service(store.clone());
    let moved = Term {
        parent: 0,
        ..store
            .list_terms(&TermQuery::new("category").include_empty(true))
            .unwrap()
            .into_iter()
            .find(|t| t.id == 2)
            .unwrap()
    };

    // Act
    store.upsert_term(moved);
    let html = svc.render(&BlockAttributes::default());

    // Assert
    assert!(!html.contains(r#"class="children""#));
    assert!(html.contains(">B<"));
}
