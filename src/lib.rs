#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]

/*!
Collapsible tree list for ratatui which keeps the visible rows in sync with a changing tree.

The tree is made of [`Node`]s carrying a [`Row`] payload.
A [`TreeHost`] owns the tree: when children are replaced it diffs them by identifier against the previous ones
and returns the resulting row changes as a batch of [`ListCommand`]s ([`Updates`]) instead of rebuilding the list.
Collapsing, expanding and lazily loading children work the same way.

The [`TreeList`] widget renders the visible rows of a [`TreeHost`] with one [`Template`] per [`Row::Kind`].
*/

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, StatefulWidget, Widget};
use unicode_width::UnicodeWidthStr;

mod command;
mod diff;
mod error;
mod flatten;
#[cfg(feature = "json")]
pub mod json;
mod node;
mod reconcile;
mod row;
mod simple_row;
mod template;
mod tree_host;
mod unique_identifiers;

pub use crate::command::{ListCommand, LoadRequest, TreeEvent, Updates};
pub use crate::diff::{apply, diff, diff_by, Change};
pub use crate::error::{Error, Result};
pub use crate::flatten::Flattened;
pub use crate::node::{visible_count, Node};
pub use crate::row::Row;
pub use crate::simple_row::{RowKind, SimpleRow};
pub use crate::template::{Template, Templates};
pub use crate::tree_host::TreeHost;

/// A `TreeList` which can be rendered.
///
/// It shows the visible rows of the [`TreeHost`] it is rendered with.
/// The content of every row is drawn by the [`Template`] registered for its [`Row::Kind`].
///
/// # Example
///
/// ```
/// # use tui_tree_list::{Node, SimpleRow, TreeHost, TreeList};
/// # use ratatui::backend::TestBackend;
/// # use ratatui::Terminal;
/// # use ratatui::widgets::Block;
/// # let mut terminal = Terminal::new(TestBackend::new(32, 32)).unwrap();
/// let mut host = TreeHost::new(vec![Node::new(SimpleRow::row("l", "leaf"))])
///     .expect("all item identifiers are unique");
///
/// terminal.draw(|frame| {
///     let area = frame.size();
///
///     let tree_widget = TreeList::new(SimpleRow::templates())
///         .block(Block::bordered().title("Tree List"));
///
///     frame.render_stateful_widget(tree_widget, area, &mut host);
/// })?;
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct TreeList<'a, R: Row> {
    templates: Templates<R>,

    block: Option<Block<'a>>,
    /// Style used as a base style for the widget
    style: Style,

    /// Style used to render selected row
    highlight_style: Style,
    /// Symbol in front of the selected row (Shift all rows to the right)
    highlight_symbol: &'a str,

    /// Symbol displayed in front of a collapsed node (As in the children are currently not visible)
    node_closed_symbol: &'a str,
    /// Symbol displayed in front of an expanded node. (As in the children are currently visible)
    node_open_symbol: &'a str,
    /// Symbol displayed in front of a node which can not be expanded.
    node_no_children_symbol: &'a str,
    /// Columns per depth level.
    indent_width: u16,
}

impl<'a, R: Row> TreeList<'a, R> {
    /// Create a new `TreeList` rendering rows with the given `templates`.
    #[must_use]
    pub fn new(templates: Templates<R>) -> Self {
        Self {
            templates,
            block: None,
            style: Style::new(),
            highlight_style: Style::new(),
            highlight_symbol: "",
            node_closed_symbol: "\u{25b6} ", // Arrow to right
            node_open_symbol: "\u{25bc} ",   // Arrow down
            node_no_children_symbol: "  ",
            indent_width: 2,
        }
    }

    #[allow(clippy::missing_const_for_fn)]
    #[must_use]
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    #[must_use]
    pub const fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    #[must_use]
    pub const fn highlight_style(mut self, style: Style) -> Self {
        self.highlight_style = style;
        self
    }

    #[must_use]
    pub const fn highlight_symbol(mut self, highlight_symbol: &'a str) -> Self {
        self.highlight_symbol = highlight_symbol;
        self
    }

    #[must_use]
    pub const fn node_closed_symbol(mut self, symbol: &'a str) -> Self {
        self.node_closed_symbol = symbol;
        self
    }

    #[must_use]
    pub const fn node_open_symbol(mut self, symbol: &'a str) -> Self {
        self.node_open_symbol = symbol;
        self
    }

    #[must_use]
    pub const fn node_no_children_symbol(mut self, symbol: &'a str) -> Self {
        self.node_no_children_symbol = symbol;
        self
    }

    #[must_use]
    pub const fn indent_width(mut self, width: u16) -> Self {
        self.indent_width = width;
        self
    }

    fn symbol(&self, node: &Node<R>) -> &'a str {
        if !node.row().is_expandable() {
            self.node_no_children_symbol
        } else if node.is_expanded() {
            self.node_open_symbol
        } else {
            self.node_closed_symbol
        }
    }
}

impl<R: Row> StatefulWidget for TreeList<'_, R> {
    type State = TreeHost<R>;

    #[allow(clippy::too_many_lines)]
    fn render(mut self, full_area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        buf.set_style(full_area, self.style);

        // Get the inner area inside a possible block, otherwise use the full area
        let area = self.block.take().map_or(full_area, |block| {
            let inner_area = block.inner(full_area);
            block.render(full_area, buf);
            inner_area
        });

        if area.width < 1 || area.height < 1 {
            return;
        }

        let visible = state.flatten();
        if visible.is_empty() {
            return;
        }
        let heights = visible
            .iter()
            .map(|flattened| usize::from(self.templates.height(flattened.node.row())))
            .collect::<Vec<_>>();
        let available_height = area.height as usize;

        let ensure_index_in_view =
            if state.ensure_selected_in_view_on_next_render && !state.selected.is_empty() {
                visible
                    .iter()
                    .position(|flattened| flattened.identifier == state.selected)
            } else {
                None
            };

        // Ensure last line is still visible
        let mut start = state.offset.min(visible.len().saturating_sub(1));

        if let Some(ensure_index_in_view) = ensure_index_in_view {
            start = start.min(ensure_index_in_view);
        }

        let mut end = start;
        let mut height = 0;
        for row_height in heights.iter().skip(start) {
            if height + row_height > available_height {
                break;
            }
            height += row_height;
            end += 1;
        }

        if let Some(ensure_index_in_view) = ensure_index_in_view {
            while ensure_index_in_view >= end {
                height += heights[end];
                end += 1;
                while height > available_height {
                    height = height.saturating_sub(heights[start]);
                    start += 1;
                }
            }
        }

        let blank_symbol = " ".repeat(self.highlight_symbol.width());

        let mut current_height = 0;
        let mut displayed = Vec::with_capacity(end - start);
        let has_selection = !state.selected.is_empty();
        #[allow(clippy::cast_possible_truncation)]
        for (row, flattened) in visible.iter().enumerate().skip(start).take(end - start) {
            let x = area.x;
            let y = area.y + current_height;
            let height = heights[row] as u16;
            current_height += height;

            let area = Rect {
                x,
                y,
                width: area.width,
                height,
            };
            buf.set_style(area, self.style);

            let is_selected = state.selected == flattened.identifier;
            let after_highlight_symbol_x = if has_selection {
                let symbol = if is_selected {
                    self.highlight_symbol
                } else {
                    &blank_symbol
                };
                let (x, _) = buf.set_stringn(x, y, symbol, area.width as usize, self.style);
                x
            } else {
                x
            };

            let after_depth_x = {
                let indent_width = flattened.depth() * self.indent_width as usize;
                let (after_indent_x, _) = buf.set_stringn(
                    after_highlight_symbol_x,
                    y,
                    " ".repeat(indent_width),
                    indent_width,
                    self.style,
                );
                let max_width = area.width.saturating_sub(after_indent_x - x);
                let (x, _) = buf.set_stringn(
                    after_indent_x,
                    y,
                    self.symbol(flattened.node),
                    max_width as usize,
                    self.style,
                );
                x
            };

            let content = Rect {
                x: after_depth_x,
                width: area.width.saturating_sub(after_depth_x - x),
                ..area
            };
            self.templates
                .configure(flattened.node.row(), content, buf);
            if is_selected {
                buf.set_style(area, self.highlight_style);
            }
            displayed.push((row, height));
        }

        state.offset = start;
        state.ensure_selected_in_view_on_next_render = false;
        for (row, height) in displayed {
            state.will_display(row, height);
        }
    }
}

#[cfg(test)]
mod render_tests {
    use super::*;

    #[must_use]
    #[track_caller]
    fn render(
        width: u16,
        height: u16,
        host: &mut TreeHost<SimpleRow<'static, &'static str>>,
    ) -> Buffer {
        let tree = TreeList::new(SimpleRow::templates());
        let area = Rect::new(0, 0, width, height);
        let mut buffer = Buffer::empty(area);
        StatefulWidget::render(tree, area, &mut buffer, host);
        buffer
    }

    #[test]
    fn does_not_panic() {
        let mut host = TreeHost::new(SimpleRow::example()).unwrap();
        _ = render(0, 0, &mut host);
        _ = render(10, 0, &mut host);
        _ = render(0, 10, &mut host);
        _ = render(10, 10, &mut host);
    }

    #[test]
    fn nothing_open() {
        let mut host = TreeHost::new(SimpleRow::example()).unwrap();
        host.collapse(&["b"]).unwrap();
        let buffer = render(10, 4, &mut host);
        let expected = Buffer::with_lines([
            "  Alfa    ",
            "▶ Bravo   ",
            "  Hotel   ",
            "          ",
        ]);
        assert_eq!(buffer, expected);
    }

    #[test]
    fn depth_one() {
        let mut host = TreeHost::new(SimpleRow::example()).unwrap();
        host.collapse(&["b", "d"]).unwrap();
        let buffer = render(13, 7, &mut host);
        let expected = Buffer::with_lines([
            "  Alfa       ",
            "▼ Bravo      ",
            "    Charlie  ",
            "  ▶ Delta    ",
            "    Golf     ",
            "  Hotel      ",
            "             ",
        ]);
        assert_eq!(buffer, expected);
    }

    #[test]
    fn depth_two() {
        let mut host = TreeHost::new(SimpleRow::example()).unwrap();
        let buffer = render(15, 9, &mut host);
        let expected = Buffer::with_lines([
            "  Alfa         ",
            "▼ Bravo        ",
            "    Charlie    ",
            "  ▼ Delta      ",
            "      Echo     ",
            "      Foxtrot  ",
            "    Golf       ",
            "  Hotel        ",
            "               ",
        ]);
        assert_eq!(buffer, expected);
    }

    #[test]
    fn selected_row_is_scrolled_into_view() {
        let mut host = TreeHost::new(SimpleRow::example()).unwrap();
        host.select(vec!["h"]);
        let buffer = render(10, 2, &mut host);
        let expected = Buffer::with_lines(["    Golf  ", "  Hotel   "]);
        assert_eq!(buffer, expected);
        assert_eq!(host.offset(), 6);
    }

    #[test]
    fn rendered_rows_report_their_height() {
        let mut host = TreeHost::new(vec![
            Node::new(SimpleRow::row("m", "first\nsecond")),
            Node::new(SimpleRow::row("o", "one")),
        ])
        .unwrap()
        .default_row_height(5);
        assert_eq!(host.estimated_height(0), 5);
        _ = render(10, 4, &mut host);
        assert_eq!(host.estimated_height(0), 2);
        assert_eq!(host.estimated_height(1), 1);
    }
}
