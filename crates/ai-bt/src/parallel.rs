#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bt::{BtStatus, NodeId, Status};
use crate::error::Result;
use crate::node::NodeKind;
use crate::tree::Tree;

/// How children outcomes combine into the parallel's outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "snake_case"))]
pub enum Policy {
    /// Any failure fails the parallel; success needs every child.
    Sequence,
    /// Any success succeeds the parallel; failure needs every child.
    Selector,
}

impl Policy {
    /// Child outcome that resolves the parallel as soon as it is reported.
    pub fn decisive(self) -> BtStatus {
        match self {
            Policy::Sequence => BtStatus::Failure,
            Policy::Selector => BtStatus::Success,
        }
    }

    /// Outcome of a parallel without children.
    pub fn exhausted(self) -> BtStatus {
        self.decisive().invert()
    }
}

/// Which children a parallel runs on each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "snake_case"))]
pub enum Orchestrator {
    /// Every child runs on every tick, finished ones are restarted.
    Resume,
    /// Finished children are frozen until the parallel resolves; then all are reset for the next
    /// round.
    Join,
}

#[derive(Debug, Clone)]
pub(crate) struct Parallel {
    policy: Policy,
    orchestrator: Orchestrator,
    no_running: bool,
    verdict: Option<BtStatus>,
    current: usize,
}

impl Parallel {
    pub(crate) fn new(policy: Policy, orchestrator: Orchestrator) -> Self {
        Self {
            policy,
            orchestrator,
            no_running: true,
            verdict: None,
            current: 0,
        }
    }

    pub(crate) fn fresh(&self) -> Self {
        Self::new(self.policy, self.orchestrator)
    }

    pub(crate) fn clear(&mut self) {
        self.no_running = true;
        self.verdict = None;
        self.current = 0;
    }
}

impl<B: 'static> Tree<B> {
    pub(crate) fn parallel_mut(&mut self, id: NodeId) -> &mut Parallel {
        match &mut self.nodes[id.index()].kind {
            NodeKind::Parallel(parallel) => parallel,
            _ => unreachable!("node {id} is not a parallel"),
        }
    }

    /// A new activation opens a new round: under Join, children finished in an abandoned round
    /// are returned to `Fresh` so they run again.
    pub(crate) fn start_parallel(&mut self, id: NodeId) -> Result<()> {
        let parallel = self.parallel_mut(id);
        parallel.clear();
        if parallel.orchestrator == Orchestrator::Join {
            for index in 0..self.nodes[id.index()].children.len() {
                let child = self.nodes[id.index()].children[index];
                if self.nodes[child.index()].status != Status::Fresh {
                    self.reset_node(child)?;
                }
            }
        }
        Ok(())
    }

    pub(crate) fn run_parallel(&mut self, id: NodeId) -> Result<()> {
        let len = self.nodes[id.index()].children.len();
        let parallel = self.parallel_mut(id);
        let (policy, orchestrator) = (parallel.policy, parallel.orchestrator);
        if len == 0 {
            return self.report(id, policy.exhausted());
        }
        parallel.no_running = true;
        parallel.verdict = None;

        for index in 0..len {
            self.parallel_mut(id).current = index;
            let child = self.nodes[id.index()].children[index];
            match (self.nodes[child.index()].status, orchestrator) {
                (Status::Running, _) => self.run(child)?,
                (Status::Succeeded | Status::Failed, Orchestrator::Join) => {}
                _ => {
                    self.start(child)?;
                    self.run(child)?;
                }
            }

            if let Some(verdict) = self.parallel_mut(id).verdict.take() {
                tracing::trace!(node = %id, ?verdict, "parallel resolved");
                match orchestrator {
                    Orchestrator::Resume => self.cancel_children(id)?,
                    Orchestrator::Join => self.reset_children(id)?,
                }
                return self.report(id, verdict);
            }
        }

        self.report(id, BtStatus::Running)
    }

    pub(crate) fn parallel_child_running(&mut self, id: NodeId) {
        self.parallel_mut(id).no_running = false;
    }

    pub(crate) fn parallel_child_done(&mut self, id: NodeId, outcome: BtStatus) {
        let node = &self.nodes[id.index()];
        let NodeKind::Parallel(parallel) = &node.kind else {
            unreachable!("node {id} is not a parallel");
        };

        let verdict = if outcome == parallel.policy.decisive() {
            Some(outcome)
        } else {
            let complete = match parallel.orchestrator {
                Orchestrator::Resume => {
                    parallel.no_running && parallel.current + 1 == node.children.len()
                }
                Orchestrator::Join => node
                    .children
                    .iter()
                    .all(|child| self.nodes[child.index()].status == Status::from(outcome)),
            };
            complete.then_some(outcome)
        };
        if verdict.is_some() {
            self.parallel_mut(id).verdict = verdict;
        }
    }
}
