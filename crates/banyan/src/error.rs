use crate::tree::NodeKey;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("duplicate node id: {id}")]
    DuplicateId { id: NodeKey },

    /// The records must describe exactly one root with every node reachable from it.
    #[error("malformed tree: {roots} root(s), {unreachable} node(s) unreachable from the root")]
    MalformedTree { roots: usize, unreachable: usize },

    #[error("node {id} references a missing parent: {parent}")]
    DanglingReference { id: NodeKey, parent: NodeKey },

    #[error("nodes {node} and {other} occupy the same position")]
    DegenerateState { node: NodeKey, other: NodeKey },

    #[error("invalid layout option `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
