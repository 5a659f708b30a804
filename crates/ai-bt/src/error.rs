use thiserror::Error;

use crate::bt::NodeId;

/// Structural and clone-time errors.
///
/// These are programmer/configuration errors. A leaf's failure is a `BtStatus::Failure`, never an
/// error.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BtError {
    #[error("tree has no root node")]
    MissingRoot,

    #[error("tree has no blackboard")]
    MissingBlackboard,

    #[error("tree already has a root node")]
    RootAlreadySet,

    #[error("no node {0} in this tree")]
    UnknownNode(NodeId),

    #[error("{label} node {node} accepts at most {max} children")]
    ChildLimit {
        node: NodeId,
        label: String,
        max: usize,
    },

    #[error("node {node} has no child at index {index}")]
    ChildIndex { node: NodeId, index: usize },

    #[error("{label} node {node} has no child to run")]
    MissingChild { node: NodeId, label: String },

    #[error("cannot clone {label} node: {reason}")]
    CloneFailed { label: String, reason: String },

    #[error("include cycle: {0}")]
    IncludeCycle(String),

    #[error("no tree named `{0}` in the library")]
    UnknownTree(String),

    #[error("include of `{0}` is a reference that must be resolved by cloning before it runs")]
    UnresolvedInclude(String),

    #[error("lazy include of `{0}` has no tree library to resolve against")]
    NoLibrary(String),

    #[cfg(feature = "serde")]
    #[error("invalid tree config: {0}")]
    Config(#[from] serde_yaml::Error),
}

impl BtError {
    pub fn clone_failed(label: impl Into<String>, reason: impl Into<String>) -> Self {
        BtError::CloneFailed {
            label: label.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BtError>;
