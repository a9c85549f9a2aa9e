use crate::command::{ListCommand, LoadRequest, TreeEvent, Updates};
use crate::error::{Error, Result};
use crate::flatten::{self, Flattened};
use crate::node::{adopt, visible_count};
use crate::reconcile::{reconcile, with_node_mut};
use crate::{Node, Row};

/// Owns the tree behind a list and keeps what the list shows in sync with it.
///
/// Every mutation returns the [`Updates`] the hosting view needs to apply to stay consistent with [`row_count`](Self::row_count).
/// Nodes are addressed by their identifier path, see [`Row`].
///
/// Besides the tree it keeps the user interaction state: the current selection and the scroll offset.
///
/// # Example
///
/// ```
/// # use tui_tree_list::{Node, SimpleRow, TreeHost, ListCommand};
/// let mut host = TreeHost::new(vec![
///     Node::new(SimpleRow::row("a", "Alfa")),
///     Node::with_children(
///         SimpleRow::section("b", "Bravo"),
///         vec![Node::new(SimpleRow::row("c", "Charlie"))],
///     )?,
/// ])?;
/// assert_eq!(host.row_count(), 3);
///
/// let updates = host.collapse(&["b"])?;
/// assert_eq!(updates.commands(), [ListCommand::DeleteRows(2..3)]);
/// assert_eq!(host.row_count(), 2);
/// # Ok::<(), tui_tree_list::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct TreeHost<R: Row> {
    items: Vec<Node<R>>,
    row_count: usize,
    default_row_height: u16,
    pub(super) offset: usize,
    pub(super) selected: Vec<R::Identifier>,
    pub(super) ensure_selected_in_view_on_next_render: bool,
}

impl<R: Row> TreeHost<R> {
    /// Create a new `TreeHost` showing `items` at the top level.
    ///
    /// # Errors
    ///
    /// Errors when there are duplicate identifiers in the items.
    #[track_caller]
    pub fn new(mut items: Vec<Node<R>>) -> Result<Self> {
        crate::unique_identifiers::children(&items)?;
        adopt(&mut items);
        let row_count = visible_count(&items);
        Ok(Self {
            items,
            row_count,
            default_row_height: 1,
            offset: 0,
            selected: Vec::new(),
            ensure_selected_in_view_on_next_render: false,
        })
    }

    /// Height assumed for rows which were not displayed yet.
    #[must_use]
    pub const fn default_row_height(mut self, height: u16) -> Self {
        self.default_row_height = height;
        self
    }

    #[must_use]
    pub fn items(&self) -> &[Node<R>] {
        &self.items
    }

    /// Number of visible rows.
    #[must_use]
    pub const fn row_count(&self) -> usize {
        self.row_count
    }

    /// The node shown at `row`.
    #[must_use]
    pub fn row(&self, row: usize) -> Option<&Node<R>> {
        if row >= self.row_count {
            return None;
        }
        let path = flatten::index_path_at(&self.items, row)?;
        flatten::node_at(&self.items, &path)
    }

    /// Identifier path of the node shown at `row`.
    #[must_use]
    pub fn path_at(&self, row: usize) -> Option<Vec<R::Identifier>> {
        if row >= self.row_count {
            return None;
        }
        let path = flatten::index_path_at(&self.items, row)?;
        flatten::identifier_path(&self.items, &path)
    }

    /// Zero based depth of the node shown at `row`.
    #[must_use]
    pub fn depth(&self, row: usize) -> Option<usize> {
        if row >= self.row_count {
            return None;
        }
        flatten::index_path_at(&self.items, row).map(|path| path.len() - 1)
    }

    #[must_use]
    pub fn row_kind(&self, row: usize) -> Option<R::Kind> {
        self.row(row).map(|node| node.row().kind())
    }

    /// Row the node is currently shown at.
    ///
    /// Returns `None` when there is no such node or it is hidden below a collapsed ancestor.
    #[must_use]
    pub fn row_index(&self, identifier: &[R::Identifier]) -> Option<usize> {
        let path = flatten::index_path(&self.items, identifier)?;
        flatten::row_index(&self.items, &path)
    }

    #[must_use]
    pub fn node(&self, identifier: &[R::Identifier]) -> Option<&Node<R>> {
        let (first, rest) = identifier.split_first()?;
        self.items
            .iter()
            .find(|node| node.identifier() == first)?
            .child_deep(rest)
    }

    /// Get a flat list of all visible nodes.
    #[must_use]
    pub fn flatten(&self) -> Vec<Flattened<'_, R>> {
        flatten::flatten(&self.items, &[])
    }

    /// Height to assume for `row`: the measured one or the default.
    #[must_use]
    pub fn estimated_height(&self, row: usize) -> u16 {
        self.row(row)
            .and_then(Node::estimated_height)
            .unwrap_or(self.default_row_height)
    }

    /// The row is about to be displayed with the given `height`.
    pub fn will_display(&mut self, row: usize, height: u16) {
        if row >= self.row_count {
            return;
        }
        if let Some(path) = flatten::index_path_at(&self.items, row) {
            with_node_mut(&mut self.items, &path, |node| {
                node.estimated_height = Some(height);
            });
        }
    }

    /// Replace the top level items.
    ///
    /// # Errors
    ///
    /// Errors when there are duplicate identifiers in the items.
    pub fn set_items(&mut self, items: Vec<Node<R>>) -> Result<Updates<R::Identifier>> {
        self.set_children(&[], items)
    }

    /// Replace the children of the node at `identifier`. An empty `identifier` replaces the top level items.
    ///
    /// When the children are visible the returned [`Updates`] describe which rows changed.
    /// Nodes with an identifier already present in the old children are updated in place.
    ///
    /// # Errors
    ///
    /// Errors when there are duplicate identifiers in the children or no node exists at `identifier`.
    pub fn set_children(
        &mut self,
        identifier: &[R::Identifier],
        mut children: Vec<Node<R>>,
    ) -> Result<Updates<R::Identifier>> {
        crate::unique_identifiers::children(&children)?;
        adopt(&mut children);
        let mut updates = Updates::default();

        if identifier.is_empty() {
            let old = std::mem::replace(&mut self.items, children);
            reconcile(&old, &mut self.items, Some((0, 0)), &mut updates);
            request_loads(&mut self.items, &mut Vec::new(), &mut updates);
        } else {
            let path = self.index_path(identifier)?;
            let base = flatten::first_child_row(&self.items, &path).map(|row| (row, row));
            with_node_mut(&mut self.items, &path, |node| {
                let old = node.children.take().unwrap_or_default();
                reconcile(&old, &mut children, base, &mut updates);
                if base.is_some() {
                    request_loads(&mut children, &mut identifier.to_vec(), &mut updates);
                }
                node.children = Some(children);
                node.loading = false;
                node.recount();
            })
            .ok_or(Error::NotFound)?;
        }

        self.finish(&updates);
        Ok(updates)
    }

    /// Expand or collapse the node at `identifier`.
    ///
    /// Expanding a node whose children are not loaded yet adds a [`LoadRequest`] to the returned [`Updates`],
    /// but only once until the load is completed.
    /// This includes nodes which are already expanded but not loaded,
    /// and expanded unloaded descendants which become visible.
    ///
    /// # Errors
    ///
    /// Errors when no node exists at `identifier`.
    pub fn set_expanded(
        &mut self,
        identifier: &[R::Identifier],
        expanded: bool,
    ) -> Result<Updates<R::Identifier>> {
        let path = self.index_path(identifier)?;
        let row = flatten::row_index(&self.items, &path);
        let mut updates = Updates::default();

        with_node_mut(&mut self.items, &path, |node| {
            let changed = node.set_expanded(expanded);
            let mut identifier = identifier.to_vec();
            if !expanded {
                if changed {
                    updates.events.push(TreeEvent::Collapsed(identifier));
                    if let Some(row) = row {
                        let start = row + 1;
                        updates.push(ListCommand::DeleteRows(start..start + node.descendant_count));
                    }
                }
                return;
            }
            if changed {
                updates.events.push(TreeEvent::Expanded(identifier.clone()));
            }
            match node.children.as_deref_mut() {
                None => request_load(node, identifier, &mut updates),
                Some(children) => {
                    if changed && row.is_some() {
                        request_loads(children, &mut identifier, &mut updates);
                    }
                }
            }
            if let (true, Some(row)) = (changed, row) {
                let start = row + 1;
                updates.push(ListCommand::InsertRows(start..start + node.descendant_count));
            }
        })
        .ok_or(Error::NotFound)?;

        self.finish(&updates);
        Ok(updates)
    }

    /// Expand the node at `identifier`. See [`set_expanded`](Self::set_expanded).
    ///
    /// # Errors
    ///
    /// Errors when no node exists at `identifier`.
    pub fn expand(&mut self, identifier: &[R::Identifier]) -> Result<Updates<R::Identifier>> {
        self.set_expanded(identifier, true)
    }

    /// Collapse the node at `identifier`. See [`set_expanded`](Self::set_expanded).
    ///
    /// # Errors
    ///
    /// Errors when no node exists at `identifier`.
    pub fn collapse(&mut self, identifier: &[R::Identifier]) -> Result<Updates<R::Identifier>> {
        self.set_expanded(identifier, false)
    }

    /// Toggles the node at `identifier`.
    ///
    /// # Errors
    ///
    /// Errors when no node exists at `identifier`.
    pub fn toggle(&mut self, identifier: &[R::Identifier]) -> Result<Updates<R::Identifier>> {
        let expanded = self.node(identifier).ok_or(Error::NotFound)?.is_expanded();
        self.set_expanded(identifier, !expanded)
    }

    /// Toggles the node shown at `row` when it [is expandable](Row::is_expandable).
    ///
    /// # Errors
    ///
    /// Errors when there is no such row.
    pub fn toggle_row(&mut self, row: usize) -> Result<Updates<R::Identifier>> {
        let identifier = self.path_at(row).ok_or(Error::NotFound)?;
        self.toggle_expandable(&identifier)
    }

    /// Request the children of every visible node which is expanded but not loaded yet.
    ///
    /// [`set_children`](Self::set_children) and [`set_expanded`](Self::set_expanded) do this on their own.
    /// Call it once after [`new`](Self::new) when the initial items contain such nodes.
    pub fn request_pending_loads(&mut self) -> Updates<R::Identifier> {
        let mut updates = Updates::default();
        request_loads(&mut self.items, &mut Vec::new(), &mut updates);
        updates
    }

    /// Hand the result of a [`LoadRequest`] back.
    ///
    /// The children are reconciled against whatever the node has now,
    /// so a late result of an outdated request still applies cleanly.
    ///
    /// # Errors
    ///
    /// Errors with [`Error::LoadFailed`] when the loader failed, in which case the node stays unloaded and a later expand requests again.
    /// This error wins even when the node does not exist anymore.
    /// Errors with [`Error::NotFound`] when successfully loaded children have no node to go to anymore.
    pub fn complete_load<E>(
        &mut self,
        request: &LoadRequest<R::Identifier>,
        result: std::result::Result<Vec<Node<R>>, E>,
    ) -> Result<Updates<R::Identifier>>
    where
        E: core::fmt::Display,
    {
        match result {
            Ok(children) => {
                let identifier = &request.identifier;
                tracing::debug!(
                    ?identifier,
                    children = children.len(),
                    "lazy load completed"
                );
                self.set_children(identifier, children).inspect_err(|err| {
                    tracing::debug!(?identifier, %err, "dropped lazy load result");
                })
            }
            Err(err) => {
                tracing::warn!(identifier = ?request.identifier, %err, "lazy load failed");
                if let Ok(path) = self.index_path(&request.identifier) {
                    with_node_mut(&mut self.items, &path, |node| node.loading = false);
                }
                Err(Error::LoadFailed(err.to_string()))
            }
        }
    }

    fn index_path(&self, identifier: &[R::Identifier]) -> Result<Vec<usize>> {
        flatten::index_path(&self.items, identifier).ok_or(Error::NotFound)
    }

    fn toggle_expandable(&mut self, identifier: &[R::Identifier]) -> Result<Updates<R::Identifier>> {
        let node = self.node(identifier).ok_or(Error::NotFound)?;
        if node.row().is_expandable() {
            self.toggle(identifier)
        } else {
            Ok(Updates::default())
        }
    }

    /// End of every mutation: keep the row count, the offset and the selection consistent with the tree.
    fn finish(&mut self, updates: &Updates<R::Identifier>) {
        self.row_count = visible_count(&self.items);
        if !updates.is_empty() {
            tracing::trace!(commands = ?updates.commands(), rows = self.row_count, "updates");
            self.offset = updates.map_row(self.offset).unwrap_or(self.offset);
        }
        self.offset = self.offset.min(self.row_count.saturating_sub(1));
        if !self.selected.is_empty() && flatten::index_path(&self.items, &self.selected).is_none() {
            self.selected.clear();
        }
    }
}

impl<R: Row> TreeHost<R> {
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Identifier path of the selected node. Empty when nothing is selected.
    #[must_use]
    pub fn selected(&self) -> &[R::Identifier] {
        &self.selected
    }

    /// Row of the selected node when it is visible.
    #[must_use]
    pub fn selected_row(&self) -> Option<usize> {
        self.row_index(&self.selected)
    }

    /// Selects the given identifier.
    ///
    /// Returns `true` when the selection changed.
    ///
    /// Clear the selection by passing an empty identifier vector:
    ///
    /// ```rust
    /// # use tui_tree_list::{SimpleRow, TreeHost};
    /// # let mut host = TreeHost::<SimpleRow<&str>>::new(Vec::new()).unwrap();
    /// host.select(Vec::new());
    /// ```
    pub fn select(&mut self, identifier: Vec<R::Identifier>) -> bool {
        self.ensure_selected_in_view_on_next_render = true;
        let changed = self.selected != identifier;
        self.selected = identifier;
        changed
    }

    /// Select the node shown at the given row. Rows beyond the last select the last one.
    ///
    /// Returns `true` when the selection changed.
    ///
    /// This can be useful for mouse clicks.
    pub fn select_row(&mut self, row: usize) -> bool {
        let row = row.min(self.row_count.saturating_sub(1));
        let identifier = self.path_at(row).unwrap_or_default();
        self.select(identifier)
    }

    /// Select the first node.
    ///
    /// Returns `true` when the selection changed.
    pub fn select_first(&mut self) -> bool {
        self.select_row(0)
    }

    /// Select the last visible node.
    ///
    /// Returns `true` when the selection changed.
    pub fn select_last(&mut self) -> bool {
        self.select_row(usize::MAX)
    }

    /// Move the current selection with the direction/amount by the given function.
    ///
    /// Returns `true` when the selection changed.
    ///
    /// # Example
    ///
    /// ```
    /// # use tui_tree_list::{SimpleRow, TreeHost};
    /// # let mut host = TreeHost::<SimpleRow<&str>>::new(Vec::new()).unwrap();
    /// // Move the selection one down
    /// host.select_relative(|current| {
    ///     current.map_or(0, |current| current.saturating_add(1))
    /// });
    /// ```
    ///
    /// For more examples take a look into the source code of [`key_up`](Self::key_up) or [`key_down`](Self::key_down).
    /// They are implemented with this method.
    pub fn select_relative<F>(&mut self, change_function: F) -> bool
    where
        F: FnOnce(Option<usize>) -> usize,
    {
        let current = self.selected_row();
        self.select_row(change_function(current))
    }

    /// Ensure the selected node is visible on next render
    pub fn scroll_selected_into_view(&mut self) {
        self.ensure_selected_in_view_on_next_render = true;
    }

    /// Scroll the specified amount of rows up
    ///
    /// Returns `true` when the scroll position changed.
    /// Returns `false` when the scrolling has reached the top.
    pub fn scroll_up(&mut self, rows: usize) -> bool {
        let before = self.offset;
        self.offset = self.offset.saturating_sub(rows);
        before != self.offset
    }

    /// Scroll the specified amount of rows down
    ///
    /// Returns `true` when the scroll position changed.
    /// Returns `false` when the last row is already at the top.
    pub fn scroll_down(&mut self, rows: usize) -> bool {
        let before = self.offset;
        self.offset = self
            .offset
            .saturating_add(rows)
            .min(self.row_count.saturating_sub(1));
        before != self.offset
    }

    /// Handles the up arrow key.
    /// Moves up in the current depth or to its parent.
    ///
    /// Returns `true` when the selection changed.
    pub fn key_up(&mut self) -> bool {
        self.select_relative(|current| {
            current.map_or(usize::MAX, |current| current.saturating_sub(1))
        })
    }

    /// Handles the down arrow key.
    /// Moves down in the current depth or into a child node.
    ///
    /// Returns `true` when the selection changed.
    pub fn key_down(&mut self) -> bool {
        self.select_relative(|current| current.map_or(0, |current| current.saturating_add(1)))
    }

    /// Handles the left arrow key.
    /// Collapses the currently selected node or moves to its parent.
    pub fn key_left(&mut self) -> Updates<R::Identifier> {
        self.ensure_selected_in_view_on_next_render = true;
        let selected = self.selected.clone();
        let expanded = self
            .node(&selected)
            .is_some_and(|node| node.is_expanded() && node.row().is_expandable());
        if expanded {
            self.collapse(&selected).unwrap_or_default()
        } else {
            // Select the parent by removing the leaf from selection
            self.selected.pop();
            Updates::default()
        }
    }

    /// Handles the right arrow key.
    /// Expands the currently selected node.
    pub fn key_right(&mut self) -> Updates<R::Identifier> {
        self.ensure_selected_in_view_on_next_render = true;
        let selected = self.selected.clone();
        let expandable = self
            .node(&selected)
            .is_some_and(|node| node.row().is_expandable());
        if expandable {
            self.expand(&selected).unwrap_or_default()
        } else {
            Updates::default()
        }
    }

    /// Toggles the currently selected node when it [is expandable](Row::is_expandable).
    pub fn toggle_selected(&mut self) -> Updates<R::Identifier> {
        self.ensure_selected_in_view_on_next_render = true;
        let selected = self.selected.clone();
        self.toggle_expandable(&selected).unwrap_or_default()
    }
}

/// Mark `node` as loading and request its children unless that already happened.
fn request_load<R: Row>(
    node: &mut Node<R>,
    identifier: Vec<R::Identifier>,
    updates: &mut Updates<R::Identifier>,
) {
    if node.children.is_some() || node.loading {
        return;
    }
    node.loading = true;
    tracing::debug!(?identifier, "request lazy load");
    updates
        .events
        .push(TreeEvent::LoadRequested(LoadRequest { identifier }));
}

/// [`request_load`] for every expanded unloaded node reachable through expanded nodes.
///
/// `current` is the identifier path of the parent of `items`.
fn request_loads<R: Row>(
    items: &mut [Node<R>],
    current: &mut Vec<R::Identifier>,
    updates: &mut Updates<R::Identifier>,
) {
    for node in items.iter_mut().filter(|node| node.expanded) {
        current.push(node.identifier().clone());
        match node.children.as_deref_mut() {
            Some(children) => request_loads(children, current, updates),
            None => request_load(node, current.clone(), updates),
        }
        current.pop();
    }
}

#[cfg(test)]
use crate::SimpleRow;

#[cfg(test)]
type TestHost = TreeHost<SimpleRow<'static, &'static str>>;

/// A, B (B1, B2), C
#[cfg(test)]
fn worked_example() -> TestHost {
    TreeHost::new(vec![
        Node::new(SimpleRow::row("A", "A")),
        Node::with_children(
            SimpleRow::section("B", "B"),
            vec![
                Node::new(SimpleRow::row("B1", "B1")),
                Node::new(SimpleRow::row("B2", "B2")),
            ],
        )
        .unwrap(),
        Node::new(SimpleRow::row("C", "C")),
    ])
    .unwrap()
}

#[cfg(test)]
fn visible(host: &TestHost) -> Vec<&'static str> {
    (0..host.row_count())
        .map(|row| *host.row(row).unwrap().identifier())
        .collect()
}

#[test]
fn worked_example_row_counts() {
    let mut host = worked_example();
    assert_eq!(host.row_count(), 5);
    assert_eq!(visible(&host), ["A", "B", "B1", "B2", "C"]);

    let updates = host.collapse(&["B"]).unwrap();
    assert_eq!(updates.commands(), [ListCommand::DeleteRows(2..4)]);
    assert_eq!(updates.events(), [TreeEvent::Collapsed(vec!["B"])]);
    assert_eq!(host.row_count(), 3);
    assert_eq!(visible(&host), ["A", "B", "C"]);
}

#[test]
fn worked_example_replacement() {
    let mut host = worked_example();
    let updates = host
        .set_items(vec![
            Node::with_children(
                SimpleRow::section("B", "B"),
                vec![
                    Node::new(SimpleRow::row("B1", "B1")),
                    Node::new(SimpleRow::row("B2", "B2")),
                ],
            )
            .unwrap(),
            Node::new(SimpleRow::row("A", "A")),
            Node::new(SimpleRow::row("D", "D")),
        ])
        .unwrap();
    assert_eq!(
        updates.commands(),
        [
            ListCommand::DeleteRows(4..5),
            ListCommand::DeleteRows(1..4),
            ListCommand::InsertRows(0..3),
            ListCommand::InsertRows(4..5),
        ]
    );
    assert_eq!(visible(&host), ["B", "B1", "B2", "A", "D"]);
}

#[test]
fn setting_same_children_twice_emits_nothing() {
    let mut host = worked_example();
    let children = || {
        vec![
            Node::new(SimpleRow::row("B2", "B2")),
            Node::new(SimpleRow::row("B3", "B3")),
        ]
    };
    let first = host.set_children(&["B"], children()).unwrap();
    assert_eq!(
        first.commands(),
        [
            ListCommand::DeleteRows(2..3),
            ListCommand::InsertRows(3..4),
        ]
    );
    let second = host.set_children(&["B"], children()).unwrap();
    assert!(second.is_empty());
    assert_eq!(host.row_count(), 5);
}

#[test]
fn set_children_of_collapsed_node_emits_nothing_but_counts() {
    let mut host = worked_example();
    host.collapse(&["B"]).unwrap();
    let updates = host
        .set_children(&["B"], vec![Node::new(SimpleRow::row("X", "X"))])
        .unwrap();
    assert!(updates.is_empty());
    assert_eq!(host.node(&["B"]).unwrap().descendant_count(), 1);
    assert_eq!(host.row_count(), 3);

    let updates = host.expand(&["B"]).unwrap();
    assert_eq!(updates.commands(), [ListCommand::InsertRows(2..3)]);
    assert_eq!(visible(&host), ["A", "B", "X", "C"]);
}

#[test]
fn nested_collapse_adjusts_every_ancestor() {
    let mut host = TestHost::new(SimpleRow::example()).unwrap();
    assert_eq!(host.row_count(), 8);
    let updates = host.collapse(&["b", "d"]).unwrap();
    assert_eq!(updates.commands(), [ListCommand::DeleteRows(4..6)]);
    assert_eq!(host.node(&["b"]).unwrap().descendant_count(), 3);
    assert_eq!(host.row_count(), 6);
}

#[test]
fn collapse_below_collapsed_ancestor_emits_nothing() {
    let mut host = TestHost::new(SimpleRow::example()).unwrap();
    host.collapse(&["b"]).unwrap();
    let updates = host.collapse(&["b", "d"]).unwrap();
    assert!(updates.is_empty());
    assert_eq!(host.row_count(), 3);
    let updates = host.expand(&["b"]).unwrap();
    assert_eq!(updates.commands(), [ListCommand::InsertRows(2..5)]);
}

#[test]
fn lazy_load_is_requested_once() {
    let mut host = TestHost::new(vec![Node::lazy(SimpleRow::section("l", "Lazy"))]).unwrap();
    let updates = host.expand(&["l"]).unwrap();
    assert!(updates.is_empty());
    let request = updates.load_requests().next().unwrap().clone();
    assert_eq!(request.identifier(), ["l"]);
    assert!(host.node(&["l"]).unwrap().is_loading());

    host.collapse(&["l"]).unwrap();
    let again = host.expand(&["l"]).unwrap();
    assert_eq!(again.load_requests().count(), 0);

    let loaded = host
        .complete_load::<Error>(
            &request,
            Ok(vec![
                Node::new(SimpleRow::row("x", "x")),
                Node::new(SimpleRow::row("y", "y")),
            ]),
        )
        .unwrap();
    assert_eq!(
        loaded.commands(),
        [ListCommand::InsertRows(1..2), ListCommand::InsertRows(2..3)]
    );
    assert_eq!(host.row_count(), 3);
    assert!(!host.node(&["l"]).unwrap().is_loading());
}

#[test]
fn failed_lazy_load_keeps_node_unloaded() {
    let mut host = TestHost::new(vec![Node::lazy(SimpleRow::section("l", "Lazy"))]).unwrap();
    let updates = host.expand(&["l"]).unwrap();
    let request = updates.load_requests().next().unwrap().clone();

    let result = host.complete_load(&request, Err("offline"));
    assert!(matches!(result, Err(Error::LoadFailed(message)) if message == "offline"));
    let node = host.node(&["l"]).unwrap();
    assert!(!node.is_loaded());
    assert!(!node.is_loading());
    assert_eq!(node.descendant_count(), 0);
    assert_eq!(host.row_count(), 1);

    host.collapse(&["l"]).unwrap();
    let retry = host.expand(&["l"]).unwrap();
    assert_eq!(retry.load_requests().count(), 1);
}

#[test]
fn stale_load_result_is_diffed_against_current_children() {
    let mut host = TestHost::new(vec![Node::lazy(SimpleRow::section("l", "Lazy"))]).unwrap();
    let request = host
        .expand(&["l"])
        .unwrap()
        .load_requests()
        .next()
        .unwrap()
        .clone();
    host.set_children(&["l"], vec![Node::new(SimpleRow::row("new", "new"))])
        .unwrap();

    let updates = host
        .complete_load::<Error>(&request, Ok(vec![Node::new(SimpleRow::row("old", "old"))]))
        .unwrap();
    assert_eq!(
        updates.commands(),
        [
            ListCommand::DeleteRows(1..2),
            ListCommand::InsertRows(1..2),
        ]
    );
    assert_eq!(host.path_at(1), Some(vec!["l", "old"]));
}

#[test]
fn load_result_for_removed_node_is_not_found() {
    let mut host = TestHost::new(vec![Node::lazy(SimpleRow::section("l", "Lazy"))]).unwrap();
    let request = host
        .expand(&["l"])
        .unwrap()
        .load_requests()
        .next()
        .unwrap()
        .clone();
    host.set_items(Vec::new()).unwrap();
    let result = host.complete_load::<Error>(&request, Ok(Vec::new()));
    assert!(matches!(result, Err(Error::NotFound)));
}

#[test]
fn failed_load_for_removed_node_keeps_the_loader_error() {
    let mut host = TestHost::new(vec![Node::lazy(SimpleRow::section("l", "Lazy"))]).unwrap();
    let updates = host.expand(&["l"]).unwrap();
    let request = updates.load_requests().next().unwrap().clone();
    host.set_items(Vec::new()).unwrap();
    let result = host.complete_load(&request, Err("offline"));
    assert!(matches!(result, Err(Error::LoadFailed(message)) if message == "offline"));
}

#[test]
fn expanded_lazy_node_is_requested_on_expand() {
    let mut host = TestHost::new(vec![
        Node::lazy(SimpleRow::section("l", "Lazy")).expanded(true)
    ])
    .unwrap();
    let updates = host.expand(&["l"]).unwrap();
    assert_eq!(updates.load_requests().count(), 1);
    assert!(updates.events().iter().all(|event| !matches!(event, TreeEvent::Expanded(_))));
    assert!(host.node(&["l"]).unwrap().is_loading());

    let again = host.expand(&["l"]).unwrap();
    assert_eq!(again.load_requests().count(), 0);
}

#[test]
fn pending_loads_of_initial_items_are_requested_once() {
    let mut host = TestHost::new(vec![
        Node::lazy(SimpleRow::section("l", "Lazy")).expanded(true),
        Node::lazy(SimpleRow::section("c", "Collapsed")),
    ])
    .unwrap();
    let updates = host.request_pending_loads();
    let requests = updates.load_requests().collect::<Vec<_>>();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].identifier(), ["l"]);
    assert_eq!(host.request_pending_loads().load_requests().count(), 0);
}

#[test]
fn set_items_requests_expanded_lazy_nodes_once() {
    let lazy = || vec![Node::lazy(SimpleRow::section("m", "Lazy")).expanded(true)];
    let mut host = worked_example();
    let updates = host.set_items(lazy()).unwrap();
    let request = updates.load_requests().next().unwrap().clone();
    assert_eq!(request.identifier(), ["m"]);
    assert_eq!(updates.load_requests().count(), 1);

    let again = host.set_items(lazy()).unwrap();
    assert_eq!(again.load_requests().count(), 0);

    let loaded = host
        .complete_load::<Error>(&request, Ok(vec![Node::new(SimpleRow::row("x", "x"))]))
        .unwrap();
    assert_eq!(loaded.commands(), [ListCommand::InsertRows(1..2)]);
    assert!(host.node(&["m"]).unwrap().is_loaded());
}

#[test]
fn revealed_lazy_descendant_is_requested() {
    let mut host = worked_example();
    host.collapse(&["B"]).unwrap();
    let hidden = host
        .set_children(
            &["B"],
            vec![Node::lazy(SimpleRow::section("L", "Lazy")).expanded(true)],
        )
        .unwrap();
    assert_eq!(hidden.load_requests().count(), 0);

    let updates = host.expand(&["B"]).unwrap();
    let requests = updates.load_requests().collect::<Vec<_>>();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].identifier(), ["B", "L"]);
}

#[test]
fn out_of_range_rows_are_none() {
    let host = worked_example();
    assert!(host.row(5).is_none());
    assert!(host.path_at(100).is_none());
    assert!(host.depth(5).is_none());
    assert_eq!(host.estimated_height(5), 1);
}

#[test]
fn measured_height_is_cached_and_carried() {
    let mut host = worked_example().default_row_height(2);
    assert_eq!(host.estimated_height(2), 2);
    host.will_display(2, 3);
    assert_eq!(host.estimated_height(2), 3);

    host.set_children(
        &["B"],
        vec![
            Node::new(SimpleRow::row("B0", "B0")),
            Node::new(SimpleRow::row("B1", "B1")),
        ],
    )
    .unwrap();
    assert_eq!(host.estimated_height(3), 3);
    assert_eq!(host.estimated_height(2), 2);
}

#[test]
fn toggle_row_only_toggles_expandable_rows() {
    let mut host = worked_example();
    assert!(host.toggle_row(0).unwrap().is_empty());
    let updates = host.toggle_row(1).unwrap();
    assert_eq!(updates.commands(), [ListCommand::DeleteRows(2..4)]);
    assert!(matches!(host.toggle_row(3), Err(Error::NotFound)));
}

#[test]
fn selection_follows_updates() {
    let mut host = worked_example();
    assert!(host.select(vec!["C"]));
    assert_eq!(host.selected_row(), Some(4));
    host.collapse(&["B"]).unwrap();
    assert_eq!(host.selected_row(), Some(2));

    host.set_items(vec![Node::new(SimpleRow::row("A", "A"))])
        .unwrap();
    assert!(host.selected().is_empty());
}

#[test]
fn keys_move_and_toggle() {
    let mut host = worked_example();
    assert!(host.key_down());
    assert_eq!(host.selected(), ["A"]);
    host.key_down();
    assert_eq!(host.selected(), ["B"]);
    host.key_right();
    host.key_down();
    assert_eq!(host.selected(), ["B", "B1"]);
    let updates = host.key_left();
    assert!(updates.is_empty());
    assert_eq!(host.selected(), ["B"]);
    let updates = host.key_left();
    assert_eq!(updates.commands(), [ListCommand::DeleteRows(2..4)]);
    assert!(host.key_up());
    assert_eq!(host.selected(), ["A"]);
    host.select_last();
    assert_eq!(host.selected(), ["C"]);
}

#[test]
fn offset_follows_rows_and_stays_in_range() {
    let mut host = worked_example();
    assert!(host.scroll_down(4));
    assert_eq!(host.offset(), 4);
    assert!(!host.scroll_down(1));
    host.collapse(&["B"]).unwrap();
    assert_eq!(host.offset(), 2);
    assert!(host.scroll_up(5));
    assert_eq!(host.offset(), 0);
}

#[test]
fn unknown_identifier_is_not_found() {
    let mut host = worked_example();
    assert!(matches!(host.toggle(&["Z"]), Err(Error::NotFound)));
    assert!(matches!(
        host.set_children(&["B", "Z"], Vec::new()),
        Err(Error::NotFound)
    ));
    assert!(matches!(
        TestHost::new(vec![
            Node::new(SimpleRow::row("A", "A")),
            Node::new(SimpleRow::row("A", "A")),
        ]),
        Err(Error::DuplicateIdentifier)
    ));
}
