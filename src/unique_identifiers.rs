use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::{Node, Row};

/// Ensures that all identifiers in the children are unique.
///
/// When you mark the calling function with `#[track_caller]` it gets easier to find the misbehaving caller.
///
/// # Errors
///
/// Errors when there are duplicate identifiers in the children.
#[track_caller]
pub fn children<R: Row>(children: &[Node<R>]) -> Result<()> {
    let identifiers = children
        .iter()
        .map(Node::identifier)
        .collect::<HashSet<_>>();
    if identifiers.len() == children.len() {
        Ok(())
    } else {
        Err(Error::DuplicateIdentifier)
    }
}

/// Ensures that the to be added child identifier does not exist in the already existing children.
///
/// # Errors
///
/// Errors when the new child would duplicate an existing identifier in the children.
#[track_caller]
pub fn add_child<R: Row>(existing_children: &[Node<R>], add: &Node<R>) -> Result<()> {
    let add_identifier = add.identifier();
    let identifier_exists_already = existing_children
        .iter()
        .map(Node::identifier)
        .any(|identifier| identifier == add_identifier);
    if identifier_exists_already {
        Err(Error::DuplicateIdentifier)
    } else {
        Ok(())
    }
}
