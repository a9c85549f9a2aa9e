/// Payload of a [`Node`](crate::Node) which knows its identity and how it is rendered.
///
/// # Identifier
///
/// The identifier decides whether two rows are "the same entity".
/// A row whose attributes changed but whose identifier stayed the same is updated in place
/// instead of being deleted and inserted again.
///
/// It needs to be unique among its siblings but can be used again on parent or child nodes.
/// A common example would be a filename which has to be unique in its directory while it can exist in another.
/// Just like every file in a file system can be uniquely identified with its file and directory names
/// each node in a [`TreeHost`](crate::TreeHost) can be with these identifiers:
/// `vec!["src", "main.rs"]` describes the main file in a Rust cargo project.
///
/// # Kind
///
/// The kind is a tag out of a closed set (usually a small `enum`) which selects the
/// [`Template`](crate::Template) used to render the row.
pub trait Row {
    type Identifier: Clone + PartialEq + Eq + core::hash::Hash + core::fmt::Debug;
    type Kind: Copy + PartialEq + Eq + core::hash::Hash + core::fmt::Debug;

    #[must_use]
    fn identifier(&self) -> &Self::Identifier;

    #[must_use]
    fn kind(&self) -> Self::Kind;

    /// Returns `true` when `self` looks different from `from` which has the same identifier.
    ///
    /// Only visible changes matter here: a `true` results in a refresh of the row.
    #[must_use]
    fn changed(&self, from: &Self) -> bool {
        let _ = from;
        false
    }

    /// Whether selecting the row toggles its expand state.
    #[must_use]
    fn is_expandable(&self) -> bool {
        true
    }
}
