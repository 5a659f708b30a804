use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Outcome a leaf reports for one execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BtStatus {
    Running,
    Success,
    Failure,
}

impl BtStatus {
    pub fn from_bool(ok: bool) -> Self {
        if ok {
            BtStatus::Success
        } else {
            BtStatus::Failure
        }
    }

    pub fn is_terminal(self) -> bool {
        self != BtStatus::Running
    }

    /// Success <-> Failure; Running stays Running.
    pub fn invert(self) -> Self {
        match self {
            BtStatus::Running => BtStatus::Running,
            BtStatus::Success => BtStatus::Failure,
            BtStatus::Failure => BtStatus::Success,
        }
    }
}

/// Lifecycle status of a node.
///
/// A node is `Running` iff it has neither reported a terminal outcome nor been cancelled since it
/// was last started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Status {
    /// Never started, or reset.
    #[default]
    Fresh,
    Running,
    Succeeded,
    Failed,
    /// Abandoned by its owner while running.
    Cancelled,
}

impl Status {
    pub fn is_running(self) -> bool {
        self == Status::Running
    }

    /// `Succeeded` or `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Succeeded | Status::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Fresh => "fresh",
            Status::Running => "running",
            Status::Succeeded => "succeeded",
            Status::Failed => "failed",
            Status::Cancelled => "cancelled",
        }
    }
}

impl From<BtStatus> for Status {
    fn from(value: BtStatus) -> Self {
        match value {
            BtStatus::Running => Status::Running,
            BtStatus::Success => Status::Succeeded,
            BtStatus::Failure => Status::Failed,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle of a node inside one [`Tree`](crate::Tree). Ids are not meaningful across trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Domain logic of a leaf node.
///
/// `execute` is called once per run of the leaf; the engine turns the returned outcome into the
/// leaf's self-report, so the parent is notified exactly once per run.
pub trait Task<B>: 'static {
    fn label(&self) -> &str {
        "task"
    }

    /// Called before the first `execute` of each activation.
    fn start(&mut self, _blackboard: &mut B) {}

    fn execute(&mut self, blackboard: &mut B) -> BtStatus;

    /// Called when the leaf reports a terminal outcome or is cancelled while running.
    fn end(&mut self, _blackboard: &mut B) {}

    /// Drop any per-activation memory; called when the owning tree is reset.
    fn reset(&mut self) {}

    /// A fresh copy of this task for another tree instance.
    fn clone_task(&self) -> Result<Box<dyn Task<B>>>;
}
