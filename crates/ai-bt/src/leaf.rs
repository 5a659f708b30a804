//! Built-in leaf tasks and the leaf side of the status protocol.

use std::fmt;

use crate::bt::{BtStatus, NodeId, Task};
use crate::error::{BtError, Result};
use crate::node::NodeKind;
use crate::tree::Tree;

/// Leaf running a closure against the blackboard.
#[derive(Clone)]
pub struct Action<F> {
    label: String,
    action: F,
}

impl<F> Action<F> {
    pub fn new(label: impl Into<String>, action: F) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }
}

impl<F> fmt::Debug for Action<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action").field("label", &self.label).finish()
    }
}

impl<B, F> Task<B> for Action<F>
where
    B: 'static,
    F: FnMut(&mut B) -> BtStatus + Clone + 'static,
{
    fn label(&self) -> &str {
        &self.label
    }

    fn execute(&mut self, blackboard: &mut B) -> BtStatus {
        (self.action)(blackboard)
    }

    fn clone_task(&self) -> Result<Box<dyn Task<B>>> {
        Ok(Box::new(self.clone()))
    }
}

/// Leaf that succeeds when a predicate over the blackboard holds, fails otherwise.
#[derive(Clone)]
pub struct Condition<F> {
    label: String,
    predicate: F,
}

impl<F> Condition<F> {
    pub fn new(label: impl Into<String>, predicate: F) -> Self {
        Self {
            label: label.into(),
            predicate,
        }
    }
}

impl<F> fmt::Debug for Condition<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Condition").field("label", &self.label).finish()
    }
}

impl<B, F> Task<B> for Condition<F>
where
    B: 'static,
    F: Fn(&B) -> bool + Clone + 'static,
{
    fn label(&self) -> &str {
        &self.label
    }

    fn execute(&mut self, blackboard: &mut B) -> BtStatus {
        BtStatus::from_bool((self.predicate)(blackboard))
    }

    fn clone_task(&self) -> Result<Box<dyn Task<B>>> {
        Ok(Box::new(self.clone()))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Succeed;

impl<B: 'static> Task<B> for Succeed {
    fn label(&self) -> &str {
        "success"
    }

    fn execute(&mut self, _blackboard: &mut B) -> BtStatus {
        BtStatus::Success
    }

    fn clone_task(&self) -> Result<Box<dyn Task<B>>> {
        Ok(Box::new(*self))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Fail;

impl<B: 'static> Task<B> for Fail {
    fn label(&self) -> &str {
        "failure"
    }

    fn execute(&mut self, _blackboard: &mut B) -> BtStatus {
        BtStatus::Failure
    }

    fn clone_task(&self) -> Result<Box<dyn Task<B>>> {
        Ok(Box::new(*self))
    }
}

/// Reports running for `steps` executions, then succeeds.
#[derive(Debug, Clone, Copy)]
pub struct Wait {
    steps: u32,
    elapsed: u32,
}

impl Wait {
    pub fn new(steps: u32) -> Self {
        Self { steps, elapsed: 0 }
    }

    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }
}

impl<B: 'static> Task<B> for Wait {
    fn label(&self) -> &str {
        "wait"
    }

    fn start(&mut self, _blackboard: &mut B) {
        self.elapsed = 0;
    }

    fn execute(&mut self, _blackboard: &mut B) -> BtStatus {
        if self.elapsed < self.steps {
            self.elapsed += 1;
            BtStatus::Running
        } else {
            BtStatus::Success
        }
    }

    fn reset(&mut self) {
        self.elapsed = 0;
    }

    fn clone_task(&self) -> Result<Box<dyn Task<B>>> {
        Ok(Box::new(Self::new(self.steps)))
    }
}

impl<B: 'static> Tree<B> {
    fn leaf_parts(&mut self, id: NodeId) -> Result<(&mut Box<dyn Task<B>>, &mut B)> {
        let Tree {
            nodes, blackboard, ..
        } = self;
        let blackboard = blackboard.as_mut().ok_or(BtError::MissingBlackboard)?;
        match &mut nodes[id.index()].kind {
            NodeKind::Leaf(task) => Ok((task, blackboard)),
            _ => unreachable!("node {id} is not a leaf"),
        }
    }

    pub(crate) fn start_leaf(&mut self, id: NodeId) -> Result<()> {
        let (task, blackboard) = self.leaf_parts(id)?;
        task.start(blackboard);
        Ok(())
    }

    /// Executes the task once and turns its outcome into the leaf's single report.
    pub(crate) fn run_leaf(&mut self, id: NodeId) -> Result<()> {
        let (task, blackboard) = self.leaf_parts(id)?;
        let outcome = task.execute(blackboard);
        self.report(id, outcome)
    }

    pub(crate) fn end_leaf(&mut self, id: NodeId) -> Result<()> {
        let (task, blackboard) = self.leaf_parts(id)?;
        task.end(blackboard);
        Ok(())
    }

    pub(crate) fn reset_leaf(&mut self, id: NodeId) {
        if let NodeKind::Leaf(task) = &mut self.nodes[id.index()].kind {
            task.reset();
        }
    }
}
