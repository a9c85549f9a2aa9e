use std::collections::HashMap;

use crate::{Node, Row};

/// How one position changed between two snapshots of the same siblings.
///
/// `old` indices always refer to the old sequence as it was given, `new` indices to the new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Change {
    /// The old item has no counterpart in the new sequence.
    Delete { old: usize },
    /// The new item has no counterpart in the old sequence.
    Insert { new: usize },
    /// The same item ended up at another position relative to its remaining siblings.
    Move { old: usize, new: usize },
    /// The same item stayed in place. Its attributes may have changed.
    Update { old: usize, new: usize },
}

/// Compare two sibling sequences of nodes by their [`Row::identifier`].
///
/// See [`diff_by`] for the order of the returned changes.
#[must_use]
pub fn diff<R: Row>(old: &[Node<R>], new: &[Node<R>]) -> Vec<Change> {
    diff_by(old, new, Node::identifier)
}

/// Compare two sequences whose items are identified by `key`.
///
/// The first pass walks `old` backwards and reports every item missing from `new` as [`Change::Delete`].
/// The second pass walks `new` forwards and reports each item as
/// [`Change::Insert`], [`Change::Move`] or [`Change::Update`] depending on where it is found in the
/// remaining old items, which are rearranged as they are visited.
///
/// Every new index is reported exactly once, every old index at most once.
/// Keys need to be unique within each sequence, otherwise it is unspecified which duplicate is matched.
///
/// # Example
///
/// ```
/// # use tui_tree_list::{diff_by, Change};
/// let changes = diff_by(&["a", "b", "c"], &["b", "a", "d"], |item| item);
/// assert_eq!(
///     changes,
///     [
///         Change::Delete { old: 2 },
///         Change::Move { old: 1, new: 0 },
///         Change::Update { old: 0, new: 1 },
///         Change::Insert { new: 2 },
///     ]
/// );
/// ```
#[must_use]
pub fn diff_by<T, K, F>(old: &[T], new: &[T], key: F) -> Vec<Change>
where
    K: Eq + core::hash::Hash + ?Sized,
    F: Fn(&T) -> &K,
{
    let new_keys = new.iter().map(&key).collect::<std::collections::HashSet<_>>();
    let old_indices = old
        .iter()
        .enumerate()
        .map(|(index, item)| (key(item), index))
        .collect::<HashMap<_, _>>();

    let mut changes = Vec::with_capacity(old.len().max(new.len()));

    // Old indices of the remaining items. `None` for inserted ones.
    let mut working = (0..old.len()).map(Some).collect::<Vec<_>>();
    for index in (0..old.len()).rev() {
        if !new_keys.contains(key(&old[index])) {
            changes.push(Change::Delete { old: index });
            working.remove(index);
        }
    }

    for (index, item) in new.iter().enumerate() {
        // working[..index] mirrors new[..index]
        let position = old_indices.get(key(item)).and_then(|&old_index| {
            working[index..]
                .iter()
                .position(|entry| *entry == Some(old_index))
                .map(|offset| (old_index, index + offset))
        });
        match position {
            None => {
                changes.push(Change::Insert { new: index });
                working.insert(index, None);
            }
            Some((old_index, position)) if position == index => {
                changes.push(Change::Update {
                    old: old_index,
                    new: index,
                });
            }
            Some((old_index, position)) => {
                changes.push(Change::Move {
                    old: old_index,
                    new: index,
                });
                let entry = working.remove(position);
                working.insert(index, entry);
            }
        }
    }

    changes
}

/// Apply `changes` computed by [`diff_by`] to `old`.
///
/// Deletions are applied by descending old index, everything else by ascending new index.
/// The result equals `new` when the changes were computed from `old` and `new`.
#[must_use]
pub fn apply<T: Clone>(old: &[T], new: &[T], changes: &[Change]) -> Vec<T> {
    let mut working = old
        .iter()
        .cloned()
        .enumerate()
        .map(|(index, item)| (Some(index), item))
        .collect::<Vec<_>>();

    let mut deletions = changes
        .iter()
        .filter_map(|change| match change {
            Change::Delete { old } => Some(*old),
            _ => None,
        })
        .collect::<Vec<_>>();
    deletions.sort_unstable_by(|a, b| b.cmp(a));
    for old_index in deletions {
        if let Some(position) = position_of(&working, old_index) {
            working.remove(position);
        }
    }

    let mut rest = changes
        .iter()
        .filter_map(|change| match *change {
            Change::Delete { .. } => None,
            Change::Insert { new } => Some((new, None)),
            Change::Move { old, new } | Change::Update { old, new } => Some((new, Some(old))),
        })
        .collect::<Vec<_>>();
    rest.sort_unstable_by_key(|(new, _)| *new);
    for (new_index, old_index) in rest {
        let item = new[new_index].clone();
        match old_index.and_then(|old_index| position_of(&working, old_index)) {
            Some(position) => {
                working.remove(position);
                working.insert(new_index, (old_index, item));
            }
            None => working.insert(new_index, (None, item)),
        }
    }

    working.into_iter().map(|(_, item)| item).collect()
}

fn position_of<T>(working: &[(Option<usize>, T)], old_index: usize) -> Option<usize> {
    working
        .iter()
        .position(|(index, _)| *index == Some(old_index))
}

#[cfg(test)]
fn keyed(old: &[&'static str], new: &[&'static str]) -> Vec<Change> {
    diff_by(old, new, |item| item)
}

#[test]
fn empty_old_is_all_inserts() {
    assert_eq!(
        keyed(&[], &["a", "b"]),
        [Change::Insert { new: 0 }, Change::Insert { new: 1 }]
    );
}

#[test]
fn empty_new_is_all_deletes_descending() {
    assert_eq!(
        keyed(&["a", "b"], &[]),
        [Change::Delete { old: 1 }, Change::Delete { old: 0 }]
    );
}

#[test]
fn identical_is_all_updates() {
    assert_eq!(
        keyed(&["a", "b", "c"], &["a", "b", "c"]),
        [
            Change::Update { old: 0, new: 0 },
            Change::Update { old: 1, new: 1 },
            Change::Update { old: 2, new: 2 },
        ]
    );
}

#[test]
fn deletion_shifts_following_items_without_moving_them() {
    assert_eq!(
        keyed(&["a", "b", "c"], &["a", "c"]),
        [
            Change::Delete { old: 1 },
            Change::Update { old: 0, new: 0 },
            Change::Update { old: 2, new: 1 },
        ]
    );
}

#[test]
fn insertion_shifts_following_items_without_moving_them() {
    assert_eq!(
        keyed(&["a", "c"], &["a", "b", "c"]),
        [
            Change::Update { old: 0, new: 0 },
            Change::Insert { new: 1 },
            Change::Update { old: 1, new: 2 },
        ]
    );
}

#[test]
fn moving_last_to_front_moves_only_one() {
    assert_eq!(
        keyed(&["a", "b", "c"], &["c", "a", "b"]),
        [
            Change::Move { old: 2, new: 0 },
            Change::Update { old: 0, new: 1 },
            Change::Update { old: 1, new: 2 },
        ]
    );
}

#[test]
fn moving_first_to_back_moves_the_others() {
    assert_eq!(
        keyed(&["a", "b", "c"], &["b", "c", "a"]),
        [
            Change::Move { old: 1, new: 0 },
            Change::Move { old: 2, new: 1 },
            Change::Update { old: 0, new: 2 },
        ]
    );
}

#[test]
fn apply_reproduces_new() {
    let old = ["a", "b", "c", "d", "e"];
    let new = ["e", "x", "c", "a", "y"];
    let changes = keyed(&old, &new);
    assert_eq!(apply(&old, &new, &changes), new);
}

#[test]
fn diff_nodes_by_identifier() {
    use crate::SimpleRow;
    let old = vec![
        Node::new(SimpleRow::row("a", "Alfa")),
        Node::new(SimpleRow::row("b", "Bravo")),
    ];
    let new = vec![
        Node::new(SimpleRow::row("b", "Bravo, renamed")),
        Node::new(SimpleRow::row("a", "Alfa")),
    ];
    assert_eq!(
        diff(&old, &new),
        [
            Change::Move { old: 1, new: 0 },
            Change::Update { old: 0, new: 1 },
        ]
    );
}
