//! Property-based tests for diffing and reconciling children.

use std::collections::HashSet;

use proptest::prelude::*;
use proptest::sample::Index;
use tui_tree_list::{apply, diff_by, Change, Node, SimpleRow, TreeHost};

type TestNode = Node<SimpleRow<'static, u8>>;

/// Shape of a generated tree. Sibling identifiers may repeat here, they are skipped when building nodes.
#[derive(Clone, Debug)]
struct Shape {
    identifier: u8,
    label: u8,
    expanded: bool,
    children: Vec<Shape>,
}

fn shapes() -> impl Strategy<Value = Vec<Shape>> {
    let leaf = (0..8u8, 0..3u8, any::<bool>()).prop_map(|(identifier, label, expanded)| Shape {
        identifier,
        label,
        expanded,
        children: Vec::new(),
    });
    let tree = leaf.prop_recursive(3, 48, 4, |inner| {
        (
            0..8u8,
            0..3u8,
            any::<bool>(),
            prop::collection::vec(inner, 0..4),
        )
            .prop_map(|(identifier, label, expanded, children)| Shape {
                identifier,
                label,
                expanded,
                children,
            })
    });
    prop::collection::vec(tree, 0..6)
}

fn build(shapes: &[Shape]) -> Vec<TestNode> {
    let mut seen = HashSet::new();
    shapes
        .iter()
        .filter(|shape| seen.insert(shape.identifier))
        .map(|shape| {
            let row = SimpleRow::section(shape.identifier, shape.label.to_string());
            Node::with_children(row, build(&shape.children))
                .unwrap()
                .expanded(shape.expanded)
        })
        .collect()
}

fn keys() -> impl Strategy<Value = Vec<u8>> {
    prop::sample::subsequence((0..12u8).collect::<Vec<_>>(), 0..12).prop_shuffle()
}

fn layout(host: &TreeHost<SimpleRow<'static, u8>>) -> Vec<Vec<u8>> {
    host.flatten()
        .into_iter()
        .map(|flattened| flattened.identifier)
        .collect()
}

// =============================================================================
// Diff properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every new index is reported once, deletions are exactly the vanished keys
    #[test]
    fn diff_is_complete(old in keys(), new in keys()) {
        let changes = diff_by(&old, &new, |key| key);

        let mut reported = changes
            .iter()
            .filter_map(|change| match *change {
                Change::Delete { .. } => None,
                Change::Insert { new } | Change::Move { new, .. } | Change::Update { new, .. } => Some(new),
            })
            .collect::<Vec<_>>();
        reported.sort_unstable();
        prop_assert_eq!(reported, (0..new.len()).collect::<Vec<_>>());

        let deleted = changes
            .iter()
            .filter_map(|change| match *change {
                Change::Delete { old: index } => Some(old[index]),
                _ => None,
            })
            .collect::<HashSet<_>>();
        let vanished = old.iter().copied().filter(|key| !new.contains(key)).collect::<HashSet<_>>();
        prop_assert_eq!(deleted, vanished);

        prop_assert_eq!(apply(&old, &new, &changes), new);
    }

    /// Items present on both sides are never deleted and inserted
    #[test]
    fn diff_is_minimal(old in keys(), new in keys()) {
        let changes = diff_by(&old, &new, |key| key);
        for change in changes {
            match change {
                Change::Delete { old: index } => prop_assert!(!new.contains(&old[index])),
                Change::Insert { new: index } => prop_assert!(!old.contains(&new[index])),
                Change::Move { old: old_index, new: new_index }
                | Change::Update { old: old_index, new: new_index } => {
                    prop_assert_eq!(old[old_index], new[new_index]);
                }
            }
        }
    }
}

// =============================================================================
// Host properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The row count equals the number of rows a full traversal shows
    #[test]
    fn row_count_matches_traversal(shapes in shapes()) {
        let host = TreeHost::new(build(&shapes)).unwrap();
        prop_assert_eq!(host.row_count(), host.flatten().len());
    }

    /// Resolving a row and asking for its row again ends at the same row
    #[test]
    fn resolver_round_trips(shapes in shapes()) {
        let host = TreeHost::new(build(&shapes)).unwrap();
        for row in 0..host.row_count() {
            let path = host.path_at(row).unwrap();
            prop_assert_eq!(host.row_index(&path), Some(row));
        }
        prop_assert_eq!(host.path_at(host.row_count()), None);
    }

    /// Setting the same children again does not change any row
    #[test]
    fn reconciliation_is_idempotent(shapes in shapes()) {
        let mut host = TreeHost::new(build(&shapes)).unwrap();
        let before = layout(&host);
        let updates = host.set_items(build(&shapes)).unwrap();
        prop_assert!(updates.is_empty(), "{:?}", updates.commands());
        prop_assert_eq!(layout(&host), before);
    }

    /// Toggling a node twice restores the rows
    #[test]
    fn collapse_and_expand_are_inverse(shapes in shapes(), pick in any::<Index>()) {
        let mut host = TreeHost::new(build(&shapes)).unwrap();
        prop_assume!(host.row_count() > 0);
        let before = layout(&host);
        let path = host.path_at(pick.index(host.row_count())).unwrap();

        let mut mirror = before.clone();
        let first = host.toggle(&path).unwrap();
        first.apply_to(&mut mirror, |row| host.path_at(row).unwrap());
        prop_assert_eq!(&mirror, &layout(&host));

        let second = host.toggle(&path).unwrap();
        second.apply_to(&mut mirror, |row| host.path_at(row).unwrap());
        prop_assert_eq!(&mirror, &before);
        prop_assert_eq!(layout(&host), before);
    }

    /// Applying the returned batch to the old rows gives the new rows
    #[test]
    fn updates_reproduce_new_layout(old in shapes(), new in shapes()) {
        let mut host = TreeHost::new(build(&old)).unwrap();
        let mut mirror = layout(&host);
        let updates = host.set_items(build(&new)).unwrap();
        updates.apply_to(&mut mirror, |row| host.path_at(row).unwrap());
        prop_assert_eq!(mirror, layout(&host));
        prop_assert_eq!(host.row_count(), host.flatten().len());
    }
}
