//! Tests for ForestBuilder and LinkMaterializer

use rstest::rstest;

use taxnav::domain::{
    AncestorIndex, DomainError, ForestBuilder, LinkMaterializer, NavigationItem, Term,
};

fn term(id: u64, parent: u64, name: &str) -> Term {
    Term {
        id,
        taxonomy: "category".into(),
        name: name.into(),
        slug: name.to_lowercase(),
        parent,
        count: 1,
        term_order: 0,
    }
}

fn labels(items: &[NavigationItem]) -> Vec<&str> {
    items.iter().map(|i| i.label.as_str()).collect()
}

fn materialize(terms: &[Term], max_depth: u32) -> Vec<NavigationItem> {
    let forest = ForestBuilder::new(max_depth).build(terms);
    LinkMaterializer::new(|t: &Term| Ok(format!("/category/{}/", t.slug))).materialize(&forest)
}

#[test]
fn given_depth_limit_one_when_building_then_only_roots_without_children() {
    // Arrange
    let terms = vec![term(1, 0, "A"), term(2, 1, "B"), term(3, 0, "C")];

    // Act
    let items = materialize(&terms, 1);

    // Assert
    assert_eq!(labels(&items), vec!["A", "C"]);
    assert!(items.iter().all(|i| i.children.is_empty()));
}

#[rstest]
#[case(0, 5)]
#[case(1, 2)]
#[case(2, 4)]
#[case(3, 5)]
fn given_depth_limit_when_building_then_exclusion_is_subtree_closed(
    #[case] max_depth: u32,
    #[case] expected_nodes: usize,
) {
    // Arrange: A > B > D, A > E, C
    let terms = vec![
        term(1, 0, "A"),
        term(2, 1, "B"),
        term(3, 0, "C"),
        term(4, 2, "D"),
        term(5, 1, "E"),
    ];

    // Act
    let forest = ForestBuilder::new(max_depth).build(&terms);

    // Assert
    assert_eq!(forest.len(), expected_nodes);
    assert!(forest.iter().all(|(_, n)| max_depth == 0 || n.depth < max_depth as usize));
}

#[test]
fn given_unsorted_input_when_building_then_sibling_order_kept() {
    // Arrange
    let terms = vec![
        term(9, 0, "Zeta"),
        term(4, 9, "beta"),
        term(1, 0, "Alpha"),
        term(7, 9, "Alpha child"),
    ];

    // Act
    let items = materialize(&terms, 0);

    // Assert
    assert_eq!(labels(&items), vec!["Zeta", "Alpha"]);
    assert_eq!(labels(&items[0].children), vec!["beta", "Alpha child"]);
}

#[test]
fn given_missing_parent_when_building_then_term_becomes_root() {
    // Arrange: parent 42 was filtered out by the query
    let terms = vec![term(1, 42, "Orphan"), term(2, 0, "Root")];

    // Act
    let items = materialize(&terms, 0);

    // Assert
    assert_eq!(labels(&items), vec!["Orphan", "Root"]);
}

#[test]
fn given_parent_cycle_when_building_then_cycle_dropped() {
    // Arrange
    let terms = vec![term(1, 2, "X"), term(2, 1, "Y"), term(3, 0, "Z")];

    // Act
    let forest = ForestBuilder::new(0).build(&terms);

    // Assert
    assert_eq!(forest.names(), vec!["Z"]);
}

#[test]
fn given_flat_mode_when_building_then_depth_from_true_hierarchy() {
    // Arrange: B is hidden from the listing but still counts as an ancestor
    let all = vec![term(1, 0, "A"), term(2, 1, "B"), term(3, 2, "D")];
    let listed = vec![all[0].clone(), all[2].clone()];
    let index = AncestorIndex::new(&all);

    // Act
    let shallow = ForestBuilder::new(2).build_flat(&listed, |t| index.ancestor_count(t.id));
    let unlimited = ForestBuilder::new(0).build_flat(&listed, |t| index.ancestor_count(t.id));

    // Assert
    assert_eq!(shallow.names(), vec!["A"]);
    assert_eq!(unlimited.roots().len(), 2);
    assert_eq!(index.ancestors(3), vec![2, 1]);
}

#[test]
fn given_unresolvable_link_when_materializing_then_empty_url_and_batch_continues() {
    // Arrange
    let terms = vec![term(1, 0, "Good"), term(2, 0, "Bad"), term(3, 2, "Child")];
    let forest = ForestBuilder::new(0).build(&terms);
    let materializer = LinkMaterializer::new(|t: &Term| {
        if t.id == 2 {
            Err(DomainError::UnresolvableLink {
                taxonomy: t.taxonomy.clone(),
                term_id: t.id,
                reason: "no slug".into(),
            })
        } else {
            Ok(format!("/category/{}/", t.slug))
        }
    });

    // Act
    let items = materializer.materialize(&forest);

    // Assert
    assert_eq!(items.len(), 2);
    assert_eq!(items[1].url, "");
    assert_eq!(items[1].children[0].url, "/category/child/");
    assert!(items.iter().all(|i| i.generated));
}

#[test]
fn given_empty_input_when_building_then_empty_forest() {
    let forest = ForestBuilder::new(0).build(&[]);
    assert!(forest.is_empty());
    assert_eq!(forest.height(), 0);
}
