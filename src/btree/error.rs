use thiserror::Error;

use super::node::NodeId;

/// Errors that can occur during B-tree operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BTreeError {
    #[error("Invalid minimum degree: {0} (must be between 2 and usize::MAX / 2)")]
    InvalidDegree(usize),

    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Precondition violated: {0}")]
    Precondition(String),

    #[error("Invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Invalid tree state: {0}")]
    InvalidState(String),
}

pub type BTreeResult<T> = Result<T, BTreeError>;
