use crate::command::{ListCommand, Updates};
use crate::diff::{diff, Change};
use crate::{Node, Row};

/// Rows at which the old and the new siblings start, or `None` when they are not visible.
type Base = Option<(usize, usize)>;

/// Rows taken by the siblings in front of each index.
fn offsets<R: Row>(siblings: &[Node<R>]) -> Vec<usize> {
    siblings
        .iter()
        .scan(0, |offset, node| {
            let current = *offset;
            *offset += node.span();
            Some(current)
        })
        .collect()
}

/// Diff `old` against `new` and record the row changes in `updates`.
///
/// `new` is expected to be adopted already (indices assigned, descendant counts consistent).
/// Cached heights of matched nodes are carried over even when nothing is visible.
pub(crate) fn reconcile<R: Row>(
    old: &[Node<R>],
    new: &mut [Node<R>],
    base: Base,
    updates: &mut Updates<R::Identifier>,
) {
    let changes = diff(old, new);
    let old_offsets = offsets(old);
    let new_offsets = offsets(new);
    tracing::trace!(
        old = old.len(),
        new = new.len(),
        changes = changes.len(),
        visible = base.is_some(),
        "reconcile siblings"
    );

    for change in changes {
        match change {
            Change::Delete { old: index } => {
                if let Some((old_base, _)) = base {
                    let start = old_base + old_offsets[index];
                    updates.push(ListCommand::DeleteRows(start..start + old[index].span()));
                }
            }
            Change::Insert { new: index } => {
                if let Some((_, new_base)) = base {
                    let start = new_base + new_offsets[index];
                    updates.push(ListCommand::InsertRows(start..start + new[index].span()));
                }
            }
            Change::Move {
                old: old_index,
                new: new_index,
            } => {
                update(&old[old_index], &mut new[new_index], None, updates);
                if let Some((old_base, new_base)) = base {
                    let start = old_base + old_offsets[old_index];
                    updates.push(ListCommand::DeleteRows(start..start + old[old_index].span()));
                    let start = new_base + new_offsets[new_index];
                    updates.push(ListCommand::InsertRows(start..start + new[new_index].span()));
                }
            }
            Change::Update {
                old: old_index,
                new: new_index,
            } => {
                let rows = base.map(|(old_base, new_base)| {
                    (
                        old_base + old_offsets[old_index],
                        new_base + new_offsets[new_index],
                    )
                });
                update(&old[old_index], &mut new[new_index], rows, updates);
            }
        }
    }
}

/// `old` and `new` have the same identity. `rows` are their own rows when visible.
fn update<R: Row>(
    old: &Node<R>,
    new: &mut Node<R>,
    rows: Base,
    updates: &mut Updates<R::Identifier>,
) {
    new.estimated_height = new.estimated_height.or(old.estimated_height);
    if new.children.is_none() {
        // a pending load is still pending for the replacement
        new.loading = old.loading;
    }

    let mut child_base = None;
    if let Some((old_row, new_row)) = rows {
        match (old.expanded, new.expanded) {
            (true, true) => child_base = Some((old_row + 1, new_row + 1)),
            (true, false) => {
                let start = old_row + 1;
                updates.push(ListCommand::DeleteRows(start..start + old.descendant_count));
            }
            (false, true) => {
                let start = new_row + 1;
                updates.push(ListCommand::InsertRows(start..start + new.descendant_count));
            }
            (false, false) => {}
        }
    }

    let old_children = old.children().unwrap_or_default();
    let new_children = new.children.as_deref_mut().unwrap_or_default();
    reconcile(old_children, new_children, child_base, updates);

    if let Some((_, new_row)) = rows {
        if new.row.changed(&old.row) {
            updates.push(ListCommand::RefreshRow(new_row));
        }
    }
}

/// Run `f` on the node at the index `path` and recount every ancestor afterwards, deepest first.
pub(crate) fn with_node_mut<R, O, F>(items: &mut [Node<R>], path: &[usize], f: F) -> Option<O>
where
    R: Row,
    F: FnOnce(&mut Node<R>) -> O,
{
    let (first, rest) = path.split_first()?;
    let node = items.get_mut(*first)?;
    if rest.is_empty() {
        return Some(f(node));
    }
    let out = with_node_mut(node.children.as_deref_mut()?, rest, f)?;
    node.recount();
    Some(out)
}

#[cfg(test)]
use crate::SimpleRow;

#[cfg(test)]
type TestNode = Node<SimpleRow<'static, &'static str>>;

#[cfg(test)]
fn leaf(identifier: &'static str) -> TestNode {
    Node::new(SimpleRow::row(identifier, identifier))
}

#[cfg(test)]
fn section(identifier: &'static str, children: Vec<TestNode>) -> TestNode {
    Node::with_children(SimpleRow::section(identifier, identifier), children).unwrap()
}

#[cfg(test)]
fn run(old: &[TestNode], mut new: Vec<TestNode>) -> (Vec<ListCommand>, Vec<TestNode>) {
    crate::node::adopt(&mut new);
    let mut updates = Updates::default();
    reconcile(old, &mut new, Some((0, 0)), &mut updates);
    (updates.commands, new)
}

#[test]
fn worked_example() {
    // A, B (B1, B2), C -> B (B1, B2), A, D
    let old = vec![
        leaf("A"),
        section("B", vec![leaf("B1"), leaf("B2")]),
        leaf("C"),
    ];
    let new = vec![
        section("B", vec![leaf("B1"), leaf("B2")]),
        leaf("A"),
        leaf("D"),
    ];
    let (commands, _) = run(&old, new);
    assert_eq!(
        commands,
        [
            ListCommand::DeleteRows(4..5),
            ListCommand::DeleteRows(1..4),
            ListCommand::InsertRows(0..3),
            ListCommand::InsertRows(4..5),
        ]
    );
}

#[test]
fn identical_children_emit_nothing() {
    let old = SimpleRow::example();
    let (commands, _) = run(&old, SimpleRow::example());
    assert!(commands.is_empty());
}

#[test]
fn changed_row_is_refreshed_at_its_new_row() {
    let old = vec![leaf("a"), leaf("b")];
    let new = vec![
        leaf("x"),
        leaf("a"),
        Node::new(SimpleRow::row("b", "Bravo")),
    ];
    let (commands, _) = run(&old, new);
    assert_eq!(
        commands,
        [ListCommand::InsertRows(0..1), ListCommand::RefreshRow(2)]
    );
}

#[test]
fn nested_changes_use_old_and_new_layout() {
    // the first section grows, so the second one is at another row afterwards
    let old = vec![
        section("a", vec![leaf("a1")]),
        section("b", vec![leaf("b1"), leaf("b2")]),
    ];
    let new = vec![
        section("a", vec![leaf("a1"), leaf("a2"), leaf("a3")]),
        section("b", vec![leaf("b2")]),
    ];
    let (commands, _) = run(&old, new);
    assert_eq!(
        commands,
        [
            ListCommand::InsertRows(2..3),
            ListCommand::InsertRows(3..4),
            ListCommand::DeleteRows(3..4),
        ]
    );
}

#[test]
fn collapsed_replacement_deletes_old_subtree() {
    let old = vec![section("a", vec![leaf("a1"), leaf("a2")]), leaf("b")];
    let new = vec![section("a", vec![leaf("a1"), leaf("a2")]).expanded(false), leaf("b")];
    let (commands, _) = run(&old, new);
    assert_eq!(commands, [ListCommand::DeleteRows(1..3)]);
}

#[test]
fn expanded_replacement_inserts_new_subtree() {
    let old = vec![section("a", vec![leaf("a1")]).expanded(false)];
    let new = vec![section("a", vec![leaf("a1"), leaf("a2")])];
    let (commands, _) = run(&old, new);
    assert_eq!(commands, [ListCommand::InsertRows(1..3)]);
}

#[test]
fn heights_are_carried_over() {
    let mut old = vec![section("a", vec![leaf("a1")]), leaf("b")];
    old[0].estimated_height = Some(3);
    old[0].children_mut().unwrap()[0].estimated_height = Some(2);
    old[1].estimated_height = Some(4);
    let new = vec![leaf("b"), section("a", vec![leaf("a1")])];
    let (_, new) = run(&old, new);
    assert_eq!(new[0].estimated_height(), Some(4));
    assert_eq!(new[1].estimated_height(), Some(3));
    assert_eq!(new[1].child(0).unwrap().estimated_height(), Some(2));
}

#[test]
fn invisible_siblings_emit_nothing() {
    let old = vec![leaf("a")];
    let mut new = vec![leaf("b")];
    let mut updates = Updates::<&str>::default();
    reconcile(&old, &mut new, None, &mut updates);
    assert!(updates.is_empty());
}
