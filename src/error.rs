/// Errors returned by the mutating operations of a [`TreeHost`](crate::TreeHost) and the [`Node`](crate::Node) constructors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Two siblings share the same [`Row::identifier`](crate::Row::identifier).
    #[error("the children contain duplicate identifiers")]
    DuplicateIdentifier,

    /// No node is reachable with the given identifier path.
    #[error("no node found at the given identifier path")]
    NotFound,

    /// The external loader failed to produce children for a lazy node.
    #[error("lazy load failed: {0}")]
    LoadFailed(String),
}

pub type Result<T> = std::result::Result<T, Error>;
