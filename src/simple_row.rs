use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Text;
use ratatui::widgets::{Paragraph, Widget};

use crate::{Row, Template, Templates};

/// Kinds of a [`SimpleRow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowKind {
    /// A plain row. Selecting it does not toggle it.
    Row,
    /// A header of a section which collapses and expands when selected.
    Section,
}

/// Represents a very simple [`Row`] implementation: an identifier and some [`Text`].
///
/// # Example
///
/// ```
/// # use tui_tree_list::{Node, SimpleRow};
/// let items = vec![
///     Node::new(SimpleRow::row("a", "Alfa")),
///     Node::with_children(
///         SimpleRow::section("b", "Bravo"),
///         vec![Node::new(SimpleRow::row("c", "Charlie"))],
///     )?,
/// ];
/// # Ok::<(), tui_tree_list::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleRow<'text, Identifier> {
    identifier: Identifier,
    kind: RowKind,
    text: Text<'text>,
    style: Style,
}

impl<'text, Identifier> SimpleRow<'text, Identifier> {
    #[must_use]
    pub fn row<T>(identifier: Identifier, text: T) -> Self
    where
        T: Into<Text<'text>>,
    {
        Self {
            identifier,
            kind: RowKind::Row,
            text: text.into(),
            style: Style::new(),
        }
    }

    #[must_use]
    pub fn section<T>(identifier: Identifier, text: T) -> Self
    where
        T: Into<Text<'text>>,
    {
        Self {
            identifier,
            kind: RowKind::Section,
            text: text.into(),
            style: Style::new(),
        }
    }

    #[must_use]
    pub const fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    #[must_use]
    pub const fn text(&self) -> &Text<'text> {
        &self.text
    }

    fn configure(&self, area: Rect, buffer: &mut Buffer) {
        Paragraph::new(self.text.clone())
            .style(self.style)
            .render(area, buffer);
    }

    #[allow(clippy::cast_possible_truncation)]
    fn height(&self) -> u16 {
        self.text.height().max(1) as u16
    }
}

impl<'text, Identifier> SimpleRow<'text, Identifier>
where
    Identifier: Clone + PartialEq + Eq + core::hash::Hash + core::fmt::Debug,
{
    /// The [`Templates`] rendering both [`RowKind`]s.
    #[must_use]
    pub fn templates() -> Templates<Self> {
        let template = Template::new(Self::configure, Self::height);
        Templates::new()
            .with(RowKind::Row, template)
            .with(RowKind::Section, template)
    }
}

impl<Identifier> Row for SimpleRow<'_, Identifier>
where
    Identifier: Clone + PartialEq + Eq + core::hash::Hash + core::fmt::Debug,
{
    type Identifier = Identifier;
    type Kind = RowKind;

    fn identifier(&self) -> &Self::Identifier {
        &self.identifier
    }

    fn kind(&self) -> Self::Kind {
        self.kind
    }

    fn changed(&self, from: &Self) -> bool {
        self.kind != from.kind || self.style != from.style || self.text != from.text
    }

    fn is_expandable(&self) -> bool {
        self.kind == RowKind::Section
    }
}

#[cfg(test)]
use crate::Node;

#[cfg(test)]
impl SimpleRow<'static, &'static str> {
    /// `a`, `b` (`c`, `d` (`e`, `f`), `g`), `h`, everything expanded.
    pub(crate) fn example() -> Vec<Node<Self>> {
        vec![
            Node::new(Self::row("a", "Alfa")),
            Node::with_children(
                Self::section("b", "Bravo"),
                vec![
                    Node::new(Self::row("c", "Charlie")),
                    Node::with_children(
                        Self::section("d", "Delta"),
                        vec![
                            Node::new(Self::row("e", "Echo")),
                            Node::new(Self::row("f", "Foxtrot")),
                        ],
                    )
                    .expect("all item identifiers are unique"),
                    Node::new(Self::row("g", "Golf")),
                ],
            )
            .expect("all item identifiers are unique"),
            Node::new(Self::row("h", "Hotel")),
        ]
    }
}

#[test]
fn changed_compares_visible_attributes() {
    let before = SimpleRow::row("a", "Alfa");
    assert!(!SimpleRow::row("a", "Alfa").changed(&before));
    assert!(SimpleRow::row("a", "Alpha").changed(&before));
    assert!(SimpleRow::section("a", "Alfa").changed(&before));
    assert!(SimpleRow::row("a", "Alfa")
        .style(Style::new().add_modifier(ratatui::style::Modifier::BOLD))
        .changed(&before));
}

#[test]
fn only_sections_are_expandable() {
    assert!(!SimpleRow::row("a", "Alfa").is_expandable());
    assert!(SimpleRow::section("b", "Bravo").is_expandable());
}

#[test]
fn multiline_text_measures_its_lines() {
    let row = SimpleRow::row("m", "first\nsecond");
    assert_eq!(row.height(), 2);
    assert_eq!(SimpleRow::row("e", "").height(), 1);
}
