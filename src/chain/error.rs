use thiserror::Error;

use super::NodeId;

/// Errors produced while wiring or evaluating a [`super::Chain`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// The id was not issued by this chain.
    #[error("unknown node id {0}")]
    UnknownNode(NodeId),

    #[error("node {0} cannot be linked to itself")]
    SelfLink(String),

    /// Linking would close a loop. `path` starts and ends at the same label.
    #[error("cycle detected: {}", .path.join(" -> "))]
    Cycle { path: Vec<String> },
}
