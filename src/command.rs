use std::ops::Range;

/// Structural change of the visible rows for the hosting view.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ListCommand {
    /// Rows appeared at these rows of the layout after the batch.
    InsertRows(Range<usize>),
    /// Rows disappeared from these rows of the layout before the batch.
    DeleteRows(Range<usize>),
    /// The row stayed but looks different. Row of the layout after the batch.
    RefreshRow(usize),
}

/// Children of a lazy [`Node`](crate::Node) are needed.
///
/// Load them wherever it fits (another thread, an async task, …) and hand the result back
/// with [`TreeHost::complete_load`](crate::TreeHost::complete_load) on the thread owning the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoadRequest<Identifier> {
    pub(crate) identifier: Vec<Identifier>,
}

impl<Identifier> LoadRequest<Identifier> {
    /// Identifier path of the node whose children are requested.
    #[must_use]
    pub fn identifier(&self) -> &[Identifier] {
        &self.identifier
    }
}

/// Notifications about what happened besides the row changes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TreeEvent<Identifier> {
    Expanded(Vec<Identifier>),
    Collapsed(Vec<Identifier>),
    LoadRequested(LoadRequest<Identifier>),
}

/// One batch of [`ListCommand`]s resulting from a single mutation of a [`TreeHost`](crate::TreeHost).
///
/// The batch has to be applied as a whole:
/// [`ListCommand::DeleteRows`] refer to the rows as they were before the batch,
/// [`ListCommand::InsertRows`] and [`ListCommand::RefreshRow`] to the rows after it.
/// Apply all deletions first (highest row first), then the insertions (lowest row first).
///
/// A view drawing every frame straight from the [`TreeHost`](crate::TreeHost), like [`TreeList`](crate::TreeList), can ignore them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Updates<Identifier> {
    pub(crate) commands: Vec<ListCommand>,
    pub(crate) events: Vec<TreeEvent<Identifier>>,
}

impl<Identifier> Default for Updates<Identifier> {
    fn default() -> Self {
        Self {
            commands: Vec::new(),
            events: Vec::new(),
        }
    }
}

impl<Identifier> Updates<Identifier> {
    #[must_use]
    pub fn commands(&self) -> &[ListCommand] {
        &self.commands
    }

    #[must_use]
    pub fn events(&self) -> &[TreeEvent<Identifier>] {
        &self.events
    }

    /// `true` when no row changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Lazy loads requested by this batch.
    pub fn load_requests(&self) -> impl Iterator<Item = &LoadRequest<Identifier>> {
        self.events.iter().filter_map(|event| match event {
            TreeEvent::LoadRequested(request) => Some(request),
            _ => None,
        })
    }

    pub(crate) fn push(&mut self, command: ListCommand) {
        let empty = match &command {
            ListCommand::InsertRows(range) | ListCommand::DeleteRows(range) => range.is_empty(),
            ListCommand::RefreshRow(_) => false,
        };
        if !empty {
            self.commands.push(command);
        }
    }

    fn deleted_rows(&self) -> Vec<usize> {
        let mut rows = self
            .commands
            .iter()
            .filter_map(|command| match command {
                ListCommand::DeleteRows(range) => Some(range.clone()),
                _ => None,
            })
            .flatten()
            .collect::<Vec<_>>();
        rows.sort_unstable();
        rows.dedup();
        rows
    }

    fn inserted_ranges(&self) -> Vec<Range<usize>> {
        let mut ranges = self
            .commands
            .iter()
            .filter_map(|command| match command {
                ListCommand::InsertRows(range) => Some(range.clone()),
                _ => None,
            })
            .collect::<Vec<_>>();
        ranges.sort_unstable_by_key(|range| range.start);
        ranges
    }

    /// Where a row from before the batch ends up after it.
    ///
    /// Returns `None` when the row was deleted.
    #[must_use]
    pub fn map_row(&self, row: usize) -> Option<usize> {
        let deleted = self.deleted_rows();
        if deleted.binary_search(&row).is_ok() {
            return None;
        }
        let mut row = row - deleted.partition_point(|deleted| *deleted < row);
        for range in self.inserted_ranges() {
            if range.start <= row {
                row += range.len();
            }
        }
        Some(row)
    }

    /// Apply the batch to a mirror of the visible rows.
    ///
    /// `make` creates the value of an inserted or refreshed row given its row after the batch.
    /// Commands outside of `rows` are skipped.
    pub fn apply_to<T, F>(&self, rows: &mut Vec<T>, mut make: F)
    where
        F: FnMut(usize) -> T,
    {
        for row in self.deleted_rows().into_iter().rev() {
            if row < rows.len() {
                rows.remove(row);
            }
        }
        for range in self.inserted_ranges() {
            for row in range {
                if row <= rows.len() {
                    rows.insert(row, make(row));
                }
            }
        }
        for command in &self.commands {
            if let ListCommand::RefreshRow(row) = command {
                if let Some(slot) = rows.get_mut(*row) {
                    *slot = make(*row);
                }
            }
        }
    }
}

#[test]
fn empty_ranges_are_not_pushed() {
    let mut updates = Updates::<()>::default();
    updates.push(ListCommand::InsertRows(3..3));
    updates.push(ListCommand::DeleteRows(1..2));
    assert_eq!(updates.commands(), [ListCommand::DeleteRows(1..2)]);
}

#[test]
fn map_row_follows_deletions_and_insertions() {
    let mut updates = Updates::<()>::default();
    updates.push(ListCommand::DeleteRows(1..3));
    updates.push(ListCommand::InsertRows(0..1));
    assert_eq!(updates.map_row(0), Some(1));
    assert_eq!(updates.map_row(1), None);
    assert_eq!(updates.map_row(2), None);
    assert_eq!(updates.map_row(3), Some(2));
    assert_eq!(updates.map_row(5), Some(4));
}

#[test]
fn apply_to_mirror() {
    let mut rows = vec!["a", "b", "c", "d"];
    let mut updates = Updates::<()>::default();
    // move b behind d, refresh c
    updates.push(ListCommand::DeleteRows(1..2));
    updates.push(ListCommand::InsertRows(3..4));
    updates.push(ListCommand::RefreshRow(1));
    updates.apply_to(&mut rows, |row| ["a", "C", "d", "b"][row]);
    assert_eq!(rows, ["a", "C", "d", "b"]);
}
