//! Browse a [JSON](Value) document as a tree list.
//!
//! Objects and arrays become expandable sections, everything else plain rows.

use std::borrow::Cow;

use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use serde_json::Value;

use crate::node::adopt;
use crate::{Node, SimpleRow};

/// Identifies a [`Node`] created from a JSON document within its siblings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    Key(String),
    Index(usize),
    /// The document itself when it is neither an object nor an array.
    Root,
}

/// Select a part of the input [JSON](Value) by an identifier path of a [`TreeHost`](crate::TreeHost).
#[must_use]
pub fn select<'value>(root: &'value Value, selector: &[Selector]) -> Option<&'value Value> {
    let mut current = root;
    for select in selector {
        current = match (current, select) {
            (Value::Object(object), Selector::Key(key)) => object.get(key)?,
            (Value::Array(array), Selector::Index(index)) => array.get(*index)?,
            (_, Selector::Root) => current,
            _ => return None,
        };
    }
    Some(current)
}

/// Create [`Node`]s from a [JSON](Value).
///
/// Nodes keep the identity of their [`Selector`],
/// so handing a changed document to [`TreeHost::set_items`](crate::TreeHost::set_items) only updates what changed.
#[must_use]
pub fn nodes(root: &Value) -> Vec<Node<SimpleRow<'_, Selector>>> {
    match root {
        Value::Object(object) => from_object(object),
        Value::Array(array) => from_array(array),
        _ => vec![Node::new(SimpleRow::row(
            Selector::Root,
            value_span(root),
        ))],
    }
}

fn value_span(value: &Value) -> Span {
    const BOOL: Style = Style::new().fg(Color::Magenta);
    const NULL: Style = Style::new().fg(Color::DarkGray);
    const NUMBER: Style = Style::new().fg(Color::LightBlue);
    const STRING: Style = Style::new().fg(Color::Green);

    let (content, style) = match value {
        Value::Array(array) if array.is_empty() => (Cow::Borrowed("[]"), Style::new()),
        Value::Array(_) => (Cow::Borrowed("["), Style::new()),
        Value::Object(object) if object.is_empty() => (Cow::Borrowed("{}"), Style::new()),
        Value::Object(_) => (Cow::Borrowed("{"), Style::new()),
        Value::Null => (Cow::Borrowed("null"), NULL),
        Value::Bool(true) => (Cow::Borrowed("true"), BOOL),
        Value::Bool(false) => (Cow::Borrowed("false"), BOOL),
        Value::Number(number) => (Cow::Owned(number.to_string()), NUMBER),
        Value::String(string) => (Cow::Borrowed(string.as_str()), STRING),
    };
    Span { content, style }
}

fn recurse(selector: Selector, value: &Value) -> Node<SimpleRow<'_, Selector>> {
    const KEY: Style = Style::new().fg(Color::Blue);
    const INDEX: Style = Style::new().fg(Color::Cyan);
    const NAME_SEPARATOR: Style = Style::new().fg(Color::DarkGray);

    let name = match &selector {
        Selector::Key(key) => Span::styled(key.clone(), KEY),
        Selector::Index(index) => Span::styled(index.to_string(), INDEX),
        Selector::Root => Span::raw(""),
    };
    let text = Line::from(vec![
        name,
        Span::styled(": ", NAME_SEPARATOR),
        value_span(value),
    ]);

    let children = match value {
        Value::Array(array) if !array.is_empty() => from_array(array),
        Value::Object(object) if !object.is_empty() => from_object(object),
        _ => return Node::new(SimpleRow::row(selector, text)),
    };
    section(SimpleRow::section(selector, text), children)
}

/// Keys of an object and indices of an array are unique, no need to check them again.
fn section<'value>(
    row: SimpleRow<'value, Selector>,
    mut children: Vec<Node<SimpleRow<'value, Selector>>>,
) -> Node<SimpleRow<'value, Selector>> {
    adopt(&mut children);
    let mut node = Node::new(row);
    node.children = Some(children);
    node.recount();
    node
}

fn from_object(object: &serde_json::Map<String, Value>) -> Vec<Node<SimpleRow<'_, Selector>>> {
    object
        .iter()
        .map(|(key, value)| recurse(Selector::Key(key.clone()), value))
        .collect()
}

fn from_array(array: &[Value]) -> Vec<Node<SimpleRow<'_, Selector>>> {
    array
        .iter()
        .enumerate()
        .map(|(index, value)| recurse(Selector::Index(index), value))
        .collect()
}

#[cfg(test)]
use crate::Row;

#[cfg(test)]
fn key(key: &str) -> Selector {
    Selector::Key(key.to_owned())
}

#[test]
fn empty_creates_empty_tree() {
    let json = serde_json::json!({});
    assert!(nodes(&json).is_empty());
}

#[test]
fn can_get_selected_value() {
    let root = serde_json::json!([false, {"bla": false, "blubb": true}, false]);
    let result = select(&root, &[Selector::Index(1), key("blubb")]);
    assert_eq!(result, Some(&Value::Bool(true)));
    assert_eq!(select(&root, &[key("bla")]), None);
    assert_eq!(select(&root, &[Selector::Index(42)]), None);
}

#[test]
fn containers_count_their_descendants() {
    let json = serde_json::json!({"foo": {"bar": [13, 37]}, "test": true});
    let nodes = nodes(&json);
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0].descendant_count(), 3);
    assert!(nodes[0].row().is_expandable());
    assert!(!nodes[1].row().is_expandable());
    let bar = nodes[0].child_deep(&[key("bar")]).unwrap();
    assert_eq!(bar.child(1).unwrap().index(), 1);
}

#[test]
fn changed_value_refreshes_only_its_row() {
    use crate::{ListCommand, TreeHost};

    let before = serde_json::json!({"foo": {"bar": [13, 37]}, "test": true});
    let after = serde_json::json!({"foo": {"bar": [13, 42]}, "test": true});
    let mut host = TreeHost::new(nodes(&before)).unwrap();
    let updates = host.set_items(nodes(&after)).unwrap();
    assert_eq!(updates.commands(), [ListCommand::RefreshRow(3)]);
}

#[cfg(test)]
mod render_tests {
    use ratatui::buffer::Buffer;
    use ratatui::layout::Rect;

    use super::*;
    use crate::{TreeHost, TreeList};

    /// Strips colors after render
    #[must_use]
    #[track_caller]
    fn render(width: u16, height: u16, json: &str, select: Vec<Selector>) -> Buffer {
        let json: Value = serde_json::from_str(json).expect("invalid test JSON");
        let mut host = TreeHost::new(nodes(&json)).unwrap();
        host.select(select);
        let tree = TreeList::new(SimpleRow::templates()).highlight_symbol(">> ");
        let area = Rect::new(0, 0, width, height);
        let mut buffer = Buffer::empty(area);
        ratatui::widgets::StatefulWidget::render(tree, area, &mut buffer, &mut host);
        buffer.set_style(area, Style::reset());
        buffer
    }

    #[test]
    fn empty_array_renders_nothing() {
        let buffer = render(5, 2, "[]", Vec::new());
        let expected = Buffer::with_lines(["     ", "     "]);
        assert_eq!(buffer, expected);
    }

    #[test]
    fn number() {
        let buffer = render(5, 2, "42", Vec::new());
        let expected = Buffer::with_lines(["  42 ", "     "]);
        assert_eq!(buffer, expected);
    }

    #[test]
    fn all_simple_in_array() {
        let json = r#"[null, true, false, [], {}, 42, "lalala"]"#;
        let buffer = render(12, 8, json, Vec::new());
        let expected = Buffer::with_lines([
            "  0: null   ",
            "  1: true   ",
            "  2: false  ",
            "  3: []     ",
            "  4: {}     ",
            "  5: 42     ",
            "  6: lalala ",
            "            ",
        ]);
        assert_eq!(buffer, expected);
    }

    #[test]
    fn bigger_example_selection() {
        let json = r#"{"foo": {"bar": [13, 37]}, "test": true}"#;
        let selected = vec![key("foo"), key("bar"), Selector::Index(1)];
        let buffer = render(17, 6, json, selected);
        let expected = Buffer::with_lines([
            "   ▼ foo: {      ",
            "     ▼ bar: [    ",
            "         0: 13   ",
            ">>       1: 37   ",
            "     test: true  ",
            "                 ",
        ]);
        assert_eq!(buffer, expected);
    }
}
