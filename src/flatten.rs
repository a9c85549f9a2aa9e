use crate::node::visible_count;
use crate::{Node, Row};

/// A visible [`Node`] with its identifier path.
#[must_use]
pub struct Flattened<'a, R: Row> {
    pub identifier: Vec<R::Identifier>,
    pub node: &'a Node<R>,
}

impl<R: Row> Flattened<'_, R> {
    /// Zero based depth. Depth 0 means top level with 0 indentation.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.identifier.len() - 1
    }
}

/// Get a flat list of all visible (= below expanded) [`Node`]s.
///
/// `current` starts empty: `&[]`
#[must_use]
pub fn flatten<'a, R: Row>(
    items: &'a [Node<R>],
    current: &[R::Identifier],
) -> Vec<Flattened<'a, R>> {
    let mut result = Vec::new();
    for node in items {
        let mut child_identifier = current.to_vec();
        child_identifier.push(node.identifier().clone());

        let child_result = node
            .children()
            .filter(|_| node.is_expanded())
            .map(|children| flatten(children, &child_identifier));

        result.push(Flattened {
            identifier: child_identifier,
            node,
        });

        if let Some(mut child_result) = child_result {
            result.append(&mut child_result);
        }
    }
    result
}

/// Index path (sibling indices from the top level down) of the node shown at `row`.
///
/// Returns `None` when `row` is not below the visible row count.
/// Only the spans of the visited siblings are looked at, nothing gets materialized.
#[must_use]
pub fn index_path_at<R: Row>(items: &[Node<R>], row: usize) -> Option<Vec<usize>> {
    let mut path = Vec::new();
    let mut remaining = row;
    let mut current = items;
    'levels: loop {
        for (index, node) in current.iter().enumerate() {
            if remaining == 0 {
                path.push(index);
                return Some(path);
            }
            remaining -= 1;
            if node.is_expanded() {
                if remaining < node.descendant_count() {
                    path.push(index);
                    current = node.children()?;
                    continue 'levels;
                }
                remaining -= node.descendant_count();
            }
        }
        return None;
    }
}

/// Get the node at the given index path.
#[must_use]
pub fn node_at<'a, R: Row>(items: &'a [Node<R>], path: &[usize]) -> Option<&'a Node<R>> {
    let (first, rest) = path.split_first()?;
    let mut current = items.get(*first)?;
    for index in rest {
        current = current.child(*index)?;
    }
    Some(current)
}

/// Translate an identifier path into an index path.
#[must_use]
pub fn index_path<R: Row>(items: &[Node<R>], identifier: &[R::Identifier]) -> Option<Vec<usize>> {
    let (first, rest) = identifier.split_first()?;
    let mut index = items.iter().position(|node| node.identifier() == first)?;
    let mut current = &items[index];
    let mut path = vec![index];
    for identifier in rest {
        index = current.child_direct_index(identifier)?;
        current = current.child(index)?;
        path.push(index);
    }
    Some(path)
}

/// Translate an index path into an identifier path.
#[must_use]
pub fn identifier_path<R: Row>(items: &[Node<R>], path: &[usize]) -> Option<Vec<R::Identifier>> {
    let (first, rest) = path.split_first()?;
    let mut current = items.get(*first)?;
    let mut identifier = vec![current.identifier().clone()];
    for index in rest {
        current = current.child(*index)?;
        identifier.push(current.identifier().clone());
    }
    Some(identifier)
}

/// Rows taken by the siblings in front of `index`, or `None` when `index` is out of range.
#[must_use]
pub fn offset_of<R: Row>(siblings: &[Node<R>], index: usize) -> Option<usize> {
    (index < siblings.len()).then(|| visible_count(&siblings[..index]))
}

/// Visible row of the node at the given index path.
///
/// Each level adds the row of its parent, one for the parent itself and the spans of the preceding siblings.
/// Returns `None` when the path does not exist or any ancestor is collapsed.
#[must_use]
pub fn row_index<R: Row>(items: &[Node<R>], path: &[usize]) -> Option<usize> {
    let (first, rest) = path.split_first()?;
    let mut row = offset_of(items, *first)?;
    let mut current = &items[*first];
    for &index in rest {
        if !current.is_expanded() {
            return None;
        }
        let siblings = current.children()?;
        row += 1 + offset_of(siblings, index)?;
        current = &siblings[index];
    }
    Some(row)
}

/// Row the first child of the node at `path` would be shown at.
///
/// The top level (empty `path`) is always visible and starts at row 0.
/// Returns `None` when the node itself or any of its ancestors is collapsed.
#[must_use]
pub fn first_child_row<R: Row>(items: &[Node<R>], path: &[usize]) -> Option<usize> {
    if path.is_empty() {
        return Some(0);
    }
    let node = node_at(items, path)?;
    if node.is_expanded() {
        row_index(items, path).map(|row| row + 1)
    } else {
        None
    }
}

#[cfg(test)]
use crate::SimpleRow;

/// The example with `b` collapsed when `b` is missing in `expanded`, same for `d`.
#[cfg(test)]
fn example_with(expanded: &[&str]) -> Vec<Node<SimpleRow<'static, &'static str>>> {
    let mut items = SimpleRow::example();
    let bravo = &mut items[1];
    let delta = &mut bravo.children_mut().unwrap()[1];
    delta.set_expanded(expanded.contains(&"d"));
    bravo.recount();
    bravo.set_expanded(expanded.contains(&"b"));
    items
}

#[test]
fn depth_works() {
    let items = example_with(&["b", "d"]);
    let depths = flatten(&items, &[])
        .into_iter()
        .map(|flattened| flattened.depth())
        .collect::<Vec<_>>();
    assert_eq!(depths, [0, 0, 1, 1, 2, 2, 1, 0]);
}

#[cfg(test)]
fn flatten_works(expanded: &[&str], expected: &[&str]) {
    let items = example_with(expanded);
    let result = flatten(&items, &[]);
    let actual = result
        .into_iter()
        .map(|flattened| flattened.identifier.into_iter().last().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(actual, expected);
    assert_eq!(visible_count(&items), expected.len());
}

#[test]
fn flatten_nothing_expanded_is_top_level() {
    flatten_works(&[], &["a", "b", "h"]);
}

#[test]
fn flatten_inner_expanded_is_only_top_level() {
    flatten_works(&["d"], &["a", "b", "h"]);
}

#[test]
fn flatten_one_is_expanded() {
    flatten_works(&["b"], &["a", "b", "c", "d", "g", "h"]);
}

#[test]
fn flatten_all_expanded() {
    flatten_works(&["b", "d"], &["a", "b", "c", "d", "e", "f", "g", "h"]);
}

#[test]
fn index_path_at_walks_spans() {
    let items = example_with(&["b", "d"]);
    assert_eq!(index_path_at(&items, 0), Some(vec![0]));
    assert_eq!(index_path_at(&items, 3), Some(vec![1, 1]));
    assert_eq!(index_path_at(&items, 5), Some(vec![1, 1, 1]));
    assert_eq!(index_path_at(&items, 7), Some(vec![2]));
    assert_eq!(index_path_at(&items, 8), None);

    let items = example_with(&["b"]);
    assert_eq!(index_path_at(&items, 4), Some(vec![1, 2]));
    assert_eq!(index_path_at(&items, 5), Some(vec![2]));
    assert_eq!(index_path_at(&items, 6), None);
}

#[test]
fn row_index_round_trips() {
    let items = example_with(&["b", "d"]);
    for row in 0..visible_count(&items) {
        let path = index_path_at(&items, row).unwrap();
        assert_eq!(row_index(&items, &path), Some(row));
    }
}

#[test]
fn row_index_of_hidden_node_is_none() {
    let items = example_with(&["d"]);
    // e is below the expanded d but b is collapsed
    assert_eq!(row_index(&items, &[1, 1, 0]), None);
    assert_eq!(row_index(&items, &[1, 1]), None);
    assert_eq!(row_index(&items, &[2]), Some(2));
    assert_eq!(row_index(&items, &[3]), None);
}

#[test]
fn first_child_row_of_top_level_is_zero() {
    let items = example_with(&["b"]);
    assert_eq!(first_child_row(&items, &[]), Some(0));
    assert_eq!(first_child_row(&items, &[1]), Some(2));
    assert_eq!(first_child_row(&items, &[1, 1]), None);
}

#[test]
fn identifier_and_index_paths_translate() {
    let items = SimpleRow::example();
    assert_eq!(index_path(&items, &["b", "d", "f"]), Some(vec![1, 1, 1]));
    assert_eq!(index_path(&items, &["b", "x"]), None);
    assert_eq!(index_path(&items, &[]), None);
    assert_eq!(identifier_path(&items, &[1, 2]), Some(vec!["b", "g"]));
}
