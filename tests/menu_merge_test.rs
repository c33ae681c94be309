//! Tests for the menu merge engine and block document synchronization

use rstest::{fixture, rstest};
use serde_json::json;

use taxnav::domain::{
    merge_entries, merge_into_container, synchronize, Block, BlockAttributes, NavigationItem,
    Provenance,
};

fn gen(label: &str, id: u64) -> NavigationItem {
    NavigationItem {
        label: label.into(),
        url: format!("/category/{}/", label.to_lowercase()),
        taxonomy: "category".into(),
        term_id: id,
        generated: true,
        children: Vec::new(),
    }
}

fn user(label: &str) -> Block {
    serde_json::from_value(json!({
        "blockName": "core/navigation-link",
        "attrs": {"label": label, "url": format!("/{}", label.to_lowercase())},
        "innerBlocks": [],
        "innerHTML": "",
        "innerContent": []
    }))
    .unwrap()
}

fn labels(blocks: &[Block]) -> Vec<&str> {
    blocks.iter().filter_map(|b| b.attr_str("label")).collect()
}

fn user_entries(blocks: &[Block]) -> Vec<&Block> {
    blocks
        .iter()
        .filter(|b| Provenance::of(b) == Provenance::User)
        .collect()
}

/// User entries interleaved with entries generated by an earlier run.
#[fixture]
fn edited_container() -> Vec<Block> {
    let previous = merge_entries(&[], &[gen("Old", 1), gen("Older", 2)]);
    vec![
        user("Home"),
        previous[0].clone(),
        user("Contact"),
        previous[1].clone(),
        serde_json::from_value(json!({"blockName": null, "innerHTML": "<hr/>"})).unwrap(),
        user("About"),
    ]
}

#[test]
fn given_old_generated_and_user_entry_when_merging_then_new_first_user_kept() {
    // Arrange
    let existing = vec![Block::from(&gen("Old", 1)), user("Contact")];

    // Act
    let merged = merge_entries(&existing, &[gen("New", 2)]);

    // Assert
    assert_eq!(labels(&merged), vec!["New", "Contact"]);
    assert_eq!(Provenance::of(&merged[0]), Provenance::Generated);
    assert_eq!(merged[1], user("Contact"));
}

#[rstest]
#[case(vec![])]
#[case(vec![gen("A", 1)])]
#[case(vec![gen("A", 1), gen("B", 2), gen("C", 3)])]
fn given_any_fresh_items_when_merging_twice_then_idempotent(
    edited_container: Vec<Block>,
    #[case] fresh: Vec<NavigationItem>,
) {
    // Act
    let once = merge_entries(&edited_container, &fresh);
    let twice = merge_entries(&once, &fresh);

    // Assert
    assert_eq!(once, twice);
}

#[rstest]
#[case(vec![])]
#[case(vec![gen("A", 1), gen("B", 2)])]
fn given_any_fresh_items_when_merging_then_user_entries_preserved_in_order(
    edited_container: Vec<Block>,
    #[case] fresh: Vec<NavigationItem>,
) {
    // Act
    let merged = merge_entries(&edited_container, &fresh);

    // Assert
    assert_eq!(user_entries(&merged), user_entries(&edited_container));
    assert_eq!(merged.len(), fresh.len() + user_entries(&edited_container).len());
}

#[rstest]
fn given_empty_fresh_items_when_merging_then_only_user_entries(edited_container: Vec<Block>) {
    let merged = merge_entries(&edited_container, &[]);
    assert_eq!(labels(&merged), vec!["Home", "Contact", "About"]);
    assert_eq!(merged.len(), 4);
}

#[test]
fn given_nested_items_when_merging_then_submenu_blocks_mirror_tree() {
    // Arrange
    let mut parent = gen("Parent", 1);
    parent.children = vec![gen("Child", 2)];

    // Act
    let merged = merge_entries(&[], &[parent]);

    // Assert
    assert!(merged[0].is("core/navigation-submenu"));
    assert!(merged[0].children()[0].is("core/navigation-link"));
    assert_eq!(Provenance::of(&merged[0].children()[0]), Provenance::Generated);
}

#[test]
fn given_container_with_ref_when_merging_then_ref_cleared_and_other_attrs_kept() {
    // Arrange
    let mut container: Block = serde_json::from_value(json!({
        "blockName": "core/navigation",
        "attrs": {"ref": 99, "className": "menu"},
        "innerBlocks": [user("Contact")]
    }))
    .unwrap();

    // Act
    merge_into_container(&mut container, &[gen("News", 4)]);

    // Assert
    assert!(container.attr("ref").is_none());
    assert_eq!(container.attr_str("className"), Some("menu"));
    assert_eq!(labels(container.children()), vec!["News", "Contact"]);
}

#[test]
fn given_document_with_nested_navigation_blocks_when_synchronizing_then_all_updated() {
    // Arrange
    let document: Vec<Block> = serde_json::from_value(json!([
        {"blockName": "core/paragraph", "innerHTML": "<p>intro</p>"},
        {
            "blockName": "core/group",
            "innerBlocks": [{
                "blockName": "taxnav/taxonomy-navigation",
                "attrs": {"taxonomy": "post_tag"},
                "innerBlocks": [{
                    "blockName": "core/navigation",
                    "innerBlocks": [user("Contact")]
                }]
            }]
        },
        {
            "blockName": "taxnav/taxonomy-navigation",
            "innerBlocks": [{"blockName": "core/navigation", "innerBlocks": []}]
        }
    ]))
    .unwrap();
    let mut seen = Vec::new();

    // Act
    let (synced, updated) = synchronize(document, |attrs: &BlockAttributes| {
        seen.push(attrs.taxonomy.clone());
        vec![gen(&format!("{} term", attrs.taxonomy), 1)]
    });

    // Assert
    assert_eq!(updated, 2);
    assert_eq!(seen, vec!["post_tag", "category"]);
    assert_eq!(synced.len(), 3);
    let nested = &synced[1].children()[0].children()[0];
    assert_eq!(labels(nested.children()), vec!["post_tag term", "Contact"]);
    assert_eq!(synced[0].inner_html(), "<p>intro</p>");
}

#[test]
fn given_synchronized_document_when_synchronizing_again_then_unchanged() {
    // Arrange
    let document: Vec<Block> = serde_json::from_value(json!([{
        "blockName": "taxnav/taxonomy-navigation",
        "innerBlocks": [{"blockName": "core/navigation", "attrs": {"ref": 5}, "innerBlocks": [user("Shop")]}]
    }]))
    .unwrap();
    let links = |_: &BlockAttributes| vec![gen("News", 1), gen("Sport", 2)];

    // Act
    let (first, _) = synchronize(document, links);
    let (second, _) = synchronize(first.clone(), links);

    // Assert
    assert_eq!(first, second);
}

#[test]
fn given_container_with_placeholders_when_synchronizing_then_one_placeholder_per_entry() {
    // Arrange
    let old = merge_entries(&[], &[gen("Old", 1)]).remove(0);
    let document: Vec<Block> = serde_json::from_value(json!([{
        "blockName": "taxnav/taxonomy-navigation",
        "innerBlocks": [{
            "blockName": "core/navigation",
            "innerBlocks": [old, user("Contact")],
            "innerHTML": "",
            "innerContent": [null, null]
        }]
    }]))
    .unwrap();
    let fresh = |_: &BlockAttributes| vec![gen("A", 1), gen("B", 2), gen("C", 3)];

    // Act
    let (synced, _) = synchronize(document, fresh);

    // Assert
    let container = &synced[0].children()[0];
    let slots = container.extra["innerContent"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|chunk| chunk.is_null())
        .count();
    assert_eq!(container.children().len(), 4);
    assert_eq!(slots, container.children().len());
}
