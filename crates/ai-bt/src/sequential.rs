use ai_core::DeterministicRng;

use crate::bt::{BtStatus, NodeId};
use crate::error::Result;
use crate::node::NodeKind;
use crate::tree::Tree;

/// Which outcome short-circuits a sequential composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequentialKind {
    /// Fails on the first failing child; succeeds when all children succeed.
    Sequence,
    /// Succeeds on the first succeeding child; fails when all children fail.
    Selector,
}

impl SequentialKind {
    /// Child outcome that resolves the composite at once.
    pub fn short_circuit(self) -> BtStatus {
        match self {
            SequentialKind::Sequence => BtStatus::Failure,
            SequentialKind::Selector => BtStatus::Success,
        }
    }

    /// Outcome once every child has been tried without short-circuiting.
    pub fn exhausted(self) -> BtStatus {
        self.short_circuit().invert()
    }
}

/// Runs children one at a time, in declaration order or in a per-activation random order.
#[derive(Debug, Clone)]
pub(crate) struct Sequential {
    kind: SequentialKind,
    deterministic: bool,
    current: usize,
    running_child: Option<NodeId>,
    order: Vec<NodeId>,
}

impl Sequential {
    pub(crate) fn new(kind: SequentialKind, deterministic: bool) -> Self {
        Self {
            kind,
            deterministic,
            current: 0,
            running_child: None,
            order: Vec::new(),
        }
    }

    pub(crate) fn label(&self) -> &'static str {
        match (self.kind, self.deterministic) {
            (SequentialKind::Sequence, true) => "sequence",
            (SequentialKind::Selector, true) => "selector",
            (SequentialKind::Sequence, false) => "random_sequence",
            (SequentialKind::Selector, false) => "random_selector",
        }
    }

    pub(crate) fn fresh(&self) -> Self {
        Self::new(self.kind, self.deterministic)
    }

    fn restart(&mut self, children: Vec<NodeId>) {
        self.current = 0;
        self.running_child = None;
        self.order = children;
    }

    /// Child added while the composite is running.
    pub(crate) fn append(&mut self, child: NodeId) {
        self.order.push(child);
    }

    pub(crate) fn clear(&mut self) {
        self.current = 0;
        self.running_child = None;
        self.order.clear();
    }
}

impl<B: 'static> Tree<B> {
    pub(crate) fn sequential_mut(&mut self, id: NodeId) -> &mut Sequential {
        match &mut self.nodes[id.index()].kind {
            NodeKind::Sequential(seq) => seq,
            _ => unreachable!("node {id} is not a sequential composite"),
        }
    }

    pub(crate) fn start_sequential(&mut self, id: NodeId) {
        let children = self.nodes[id.index()].children.clone();
        self.sequential_mut(id).restart(children);
    }

    pub(crate) fn run_sequential(&mut self, id: NodeId) -> Result<()> {
        let Tree { nodes, rng, .. } = self;
        let seq = match &mut nodes[id.index()].kind {
            NodeKind::Sequential(seq) => seq,
            _ => unreachable!("node {id} is not a sequential composite"),
        };

        if let Some(child) = seq.running_child {
            return self.run(child);
        }

        let len = seq.order.len();
        if seq.current >= len {
            let outcome = seq.kind.exhausted();
            return self.report(id, outcome);
        }

        if !seq.deterministic && seq.current + 1 < len {
            let pick = rng.next_index_in(seq.current, len - 1);
            seq.order.swap(seq.current, pick);
        }
        let child = seq.order[seq.current];
        seq.running_child = Some(child);

        self.start(child)?;
        self.run(child)
    }

    pub(crate) fn sequential_child_running(&mut self, id: NodeId, child: NodeId) -> Result<()> {
        self.sequential_mut(id).running_child = Some(child);
        self.report(id, BtStatus::Running)
    }

    pub(crate) fn sequential_child_done(&mut self, id: NodeId, outcome: BtStatus) -> Result<()> {
        let seq = self.sequential_mut(id);
        seq.running_child = None;
        if outcome == seq.kind.short_circuit() {
            return self.report(id, outcome);
        }
        seq.current += 1;
        self.run(id)
    }
}
