use crate::error::Result;
use crate::Row;

/// One node of the tree, corresponding to one potential visible row.
///
/// Can have zero or more `children`, or no children at all yet (lazy, see [`Node::lazy`]).
/// The payload `row` carries the identity and everything needed to render it, see [`Row`].
///
/// A node owns its children.
/// Upward traversal works with the identifier path the caller holds, there is no parent pointer.
///
/// # Example
///
/// ```
/// # use tui_tree_list::{Node, SimpleRow};
/// let a = Node::new(SimpleRow::row("l", "Leaf"));
/// let b = Node::with_children(SimpleRow::section("r", "Root"), vec![a])?;
/// assert_eq!(b.descendant_count(), 1);
/// # Ok::<(), tui_tree_list::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Node<R: Row> {
    pub(super) row: R,
    pub(super) children: Option<Vec<Node<R>>>,
    pub(super) expanded: bool,
    pub(super) index: usize,
    pub(super) descendant_count: usize,
    pub(super) estimated_height: Option<u16>,
    pub(super) loading: bool,
}

impl<R: Row> Node<R> {
    /// Create a new loaded `Node` without children.
    #[must_use]
    pub const fn new(row: R) -> Self {
        Self {
            row,
            children: Some(Vec::new()),
            expanded: true,
            index: 0,
            descendant_count: 0,
            estimated_height: None,
            loading: false,
        }
    }

    /// Create a new `Node` with children.
    ///
    /// # Errors
    ///
    /// Errors when there are duplicate identifiers in the children.
    #[track_caller]
    pub fn with_children(row: R, children: Vec<Self>) -> Result<Self> {
        let mut node = Self::new(row);
        node.set_children(children)?;
        Ok(node)
    }

    /// Create a new `Node` whose children are not loaded yet.
    ///
    /// It starts collapsed. Expanding it via the [`TreeHost`](crate::TreeHost) requests the children with a [`LoadRequest`](crate::LoadRequest).
    #[must_use]
    pub const fn lazy(row: R) -> Self {
        Self {
            row,
            children: None,
            expanded: false,
            index: 0,
            descendant_count: 0,
            estimated_height: None,
            loading: false,
        }
    }

    #[must_use]
    pub const fn expanded(mut self, expanded: bool) -> Self {
        self.expanded = expanded;
        self
    }

    #[must_use]
    pub const fn row(&self) -> &R {
        &self.row
    }

    #[must_use]
    pub fn identifier(&self) -> &R::Identifier {
        self.row.identifier()
    }

    #[must_use]
    pub const fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// `false` until the children are known.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.children.is_some()
    }

    /// `true` while a [`LoadRequest`](crate::LoadRequest) for this node is not completed.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Position among its siblings.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Number of currently visible rows below this node when it is expanded.
    ///
    /// Collapsed children count as one row regardless of their own subtree.
    #[must_use]
    pub const fn descendant_count(&self) -> usize {
        self.descendant_count
    }

    /// Height measured the last time the row was displayed.
    #[must_use]
    pub const fn estimated_height(&self) -> Option<u16> {
        self.estimated_height
    }

    /// Rows this node occupies in the visible list of its parent: itself and its visible descendants.
    #[must_use]
    pub const fn span(&self) -> usize {
        if self.expanded {
            1 + self.descendant_count
        } else {
            1
        }
    }

    /// Children of this node or `None` when they are not loaded yet.
    #[must_use]
    pub fn children(&self) -> Option<&[Self]> {
        self.children.as_deref()
    }

    /// Get a reference to a child by index.
    #[must_use]
    pub fn child(&self, index: usize) -> Option<&Self> {
        self.children.as_ref()?.get(index)
    }

    /// Get a reference to a child by its identifier.
    #[must_use]
    pub fn child_direct(&self, identifier: &R::Identifier) -> Option<&Self> {
        self.children
            .as_ref()?
            .iter()
            .find(|child| child.identifier() == identifier)
    }

    /// Get a reference to a descendant by its identifier path relative to this node.
    #[must_use]
    pub fn child_deep(&self, identifier: &[R::Identifier]) -> Option<&Self> {
        let mut current = self;
        for identifier in identifier {
            current = current.child_direct(identifier)?;
        }
        Some(current)
    }

    /// Replace the children of a free-standing node.
    ///
    /// Updates the cached indices and descendant count but emits nothing.
    /// To replace children of a node owned by a [`TreeHost`](crate::TreeHost) use [`TreeHost::set_children`](crate::TreeHost::set_children)
    /// which also reports the rows that changed.
    ///
    /// Returns the previous children.
    ///
    /// # Errors
    ///
    /// Errors when there are duplicate identifiers in the children.
    #[track_caller]
    pub fn set_children(&mut self, mut children: Vec<Self>) -> Result<Option<Vec<Self>>> {
        crate::unique_identifiers::children(&children)?;
        adopt(&mut children);
        let previous = self.children.replace(children);
        self.loading = false;
        self.recount();
        Ok(previous)
    }

    /// Add a child to a free-standing node.
    ///
    /// Marks the node as loaded when it was not.
    ///
    /// # Errors
    ///
    /// Errors when the `identifier` of the `child` already exists in the children.
    #[track_caller]
    pub fn add_child(&mut self, mut child: Self) -> Result<()> {
        let children = self.children.get_or_insert_with(Vec::new);
        crate::unique_identifiers::add_child(children, &child)?;
        child.index = children.len();
        children.push(child);
        self.recount();
        Ok(())
    }

    /// Expand or collapse a free-standing node.
    ///
    /// Returns `true` when the state changed.
    pub fn set_expanded(&mut self, expanded: bool) -> bool {
        let changed = self.expanded != expanded;
        self.expanded = expanded;
        changed
    }

    #[cfg(test)]
    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<Self>> {
        self.children.as_mut()
    }

    pub(crate) fn child_direct_index(&self, identifier: &R::Identifier) -> Option<usize> {
        self.children
            .as_ref()?
            .iter()
            .position(|child| child.identifier() == identifier)
    }

    /// Recompute the descendant count from the direct children.
    pub(crate) fn recount(&mut self) {
        self.descendant_count = self.children.as_deref().map_or(0, visible_count);
    }
}

/// Number of visible rows the given siblings contribute.
#[must_use]
pub fn visible_count<R: Row>(children: &[Node<R>]) -> usize {
    children.iter().map(Node::span).sum()
}

/// Take ownership of `children` as siblings: their index is their position.
pub(crate) fn adopt<R: Row>(children: &mut [Node<R>]) {
    for (index, child) in children.iter_mut().enumerate() {
        child.index = index;
    }
}

#[cfg(test)]
use crate::SimpleRow;

#[test]
fn descendant_count_skips_collapsed_subtrees() {
    let items = SimpleRow::example();
    // a, b (c, d (e, f), g), h with everything expanded
    assert_eq!(visible_count(&items), 8);
    assert_eq!(items[1].descendant_count(), 5);
    assert_eq!(items[1].child(1).unwrap().descendant_count(), 2);

    let mut collapsed = SimpleRow::example();
    collapsed[1] = Node::with_children(
        SimpleRow::section("b", "Bravo"),
        vec![
            Node::new(SimpleRow::row("c", "Charlie")),
            Node::with_children(
                SimpleRow::section("d", "Delta"),
                vec![
                    Node::new(SimpleRow::row("e", "Echo")),
                    Node::new(SimpleRow::row("f", "Foxtrot")),
                ],
            )
            .unwrap()
            .expanded(false),
            Node::new(SimpleRow::row("g", "Golf")),
        ],
    )
    .unwrap();
    assert_eq!(collapsed[1].descendant_count(), 3);
}

#[test]
fn indices_are_contiguous() {
    let items = SimpleRow::example();
    let bravo = &items[1];
    let indices = bravo
        .children()
        .unwrap()
        .iter()
        .map(Node::index)
        .collect::<Vec<_>>();
    assert_eq!(indices, [0, 1, 2]);
}

#[test]
fn lazy_node_counts_nothing() {
    let node = Node::lazy(SimpleRow::section("l", "Lazy"));
    assert!(!node.is_loaded());
    assert!(!node.is_expanded());
    assert_eq!(node.descendant_count(), 0);
    assert_eq!(node.span(), 1);
}

#[test]
fn set_children_returns_previous_and_recounts() {
    let mut node = Node::with_children(
        SimpleRow::section("r", "Root"),
        vec![Node::new(SimpleRow::row("a", "Alfa"))],
    )
    .unwrap();
    let previous = node
        .set_children(vec![
            Node::new(SimpleRow::row("x", "X-ray")),
            Node::new(SimpleRow::row("y", "Yankee")),
        ])
        .unwrap()
        .unwrap();
    assert_eq!(previous.len(), 1);
    assert_eq!(node.descendant_count(), 2);
    assert_eq!(node.child(1).unwrap().index(), 1);
}

#[test]
fn child_deep_follows_identifiers() {
    let root = Node::with_children(SimpleRow::section("root", "Root"), SimpleRow::example()).unwrap();
    let found = root.child_deep(&["b", "d", "f"]).unwrap();
    assert_eq!(found.identifier(), &"f");
    assert!(root.child_deep(&["b", "x"]).is_none());
}

#[test]
#[should_panic = "DuplicateIdentifier"]
fn node_with_children_errors_with_duplicate_identifiers() {
    let item = Node::new(SimpleRow::row("same", "text"));
    let another = item.clone();
    Node::with_children(SimpleRow::section("root", "Root"), vec![item, another]).unwrap();
}

#[test]
#[should_panic = "DuplicateIdentifier"]
fn node_add_child_errors_with_duplicate_identifiers() {
    let item = Node::new(SimpleRow::row("same", "text"));
    let another = item.clone();
    let mut root = Node::with_children(SimpleRow::section("root", "Root"), vec![item]).unwrap();
    root.add_child(another).unwrap();
}
