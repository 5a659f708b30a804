use crate::bt::{BtStatus, NodeId, Status};
use crate::error::{BtError, Result};
use crate::node::NodeKind;
use crate::tree::Tree;

/// Outcome rewriting applied by the transforming decorators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Transform {
    Invert,
    AlwaysSucceed,
    AlwaysFail,
}

impl Transform {
    fn apply(self, outcome: BtStatus) -> BtStatus {
        match (self, outcome) {
            (_, BtStatus::Running) => BtStatus::Running,
            (Transform::Invert, outcome) => outcome.invert(),
            (Transform::AlwaysSucceed, _) => BtStatus::Success,
            (Transform::AlwaysFail, _) => BtStatus::Failure,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Transform::Invert => "invert",
            Transform::AlwaysSucceed => "always_succeed",
            Transform::AlwaysFail => "always_fail",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopMode {
    /// `None` repeats forever.
    Repeat(Option<u32>),
    UntilSuccess,
    UntilFailure,
}

/// Re-enters its child within one tick until the child reports running or the mode is satisfied.
#[derive(Debug, Clone)]
pub(crate) struct Loop {
    mode: LoopMode,
    remaining: Option<u32>,
    looping: bool,
}

impl Loop {
    fn new(mode: LoopMode) -> Self {
        let remaining = match mode {
            LoopMode::Repeat(times) => times,
            _ => None,
        };
        Self {
            mode,
            remaining,
            looping: false,
        }
    }

    /// Records one child completion; true once the loop is satisfied.
    fn complete(&mut self, outcome: BtStatus) -> bool {
        match self.mode {
            LoopMode::Repeat(_) => match self.remaining.as_mut() {
                Some(remaining) => {
                    *remaining = remaining.saturating_sub(1);
                    *remaining == 0
                }
                None => false,
            },
            LoopMode::UntilSuccess => outcome == BtStatus::Success,
            LoopMode::UntilFailure => outcome == BtStatus::Failure,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Decorator {
    Transform(Transform),
    Loop(Loop),
    SemaphoreGuard { name: String, acquired: bool },
    Include { subtree: String, lazy: bool },
}

/// Copyable view of a decorator used for dispatch.
#[derive(Debug, Clone, Copy)]
enum Op {
    Transform,
    Loop,
    Guard,
    Include,
}

impl Decorator {
    pub(crate) fn repeat(times: Option<u32>) -> Self {
        Decorator::Loop(Loop::new(LoopMode::Repeat(times)))
    }

    pub(crate) fn until_success() -> Self {
        Decorator::Loop(Loop::new(LoopMode::UntilSuccess))
    }

    pub(crate) fn until_failure() -> Self {
        Decorator::Loop(Loop::new(LoopMode::UntilFailure))
    }

    pub(crate) fn semaphore_guard(name: impl Into<String>) -> Self {
        Decorator::SemaphoreGuard {
            name: name.into(),
            acquired: false,
        }
    }

    pub(crate) fn include(subtree: impl Into<String>, lazy: bool) -> Self {
        Decorator::Include {
            subtree: subtree.into(),
            lazy,
        }
    }

    pub(crate) fn label(&self) -> &'static str {
        match self {
            Decorator::Transform(transform) => transform.label(),
            Decorator::Loop(looped) => match looped.mode {
                LoopMode::Repeat(Some(_)) => "repeat",
                LoopMode::Repeat(None) => "repeat_forever",
                LoopMode::UntilSuccess => "until_success",
                LoopMode::UntilFailure => "until_failure",
            },
            Decorator::SemaphoreGuard { .. } => "semaphore_guard",
            Decorator::Include { .. } => "include",
        }
    }

    pub(crate) fn fresh(&self) -> Self {
        match self {
            Decorator::Transform(transform) => Decorator::Transform(*transform),
            Decorator::Loop(looped) => Decorator::Loop(Loop::new(looped.mode)),
            Decorator::SemaphoreGuard { name, .. } => Decorator::semaphore_guard(name.clone()),
            Decorator::Include { subtree, lazy } => Decorator::include(subtree.clone(), *lazy),
        }
    }

    /// Drops runtime state. A held permit is released by the end hook, not here.
    pub(crate) fn clear(&mut self) {
        if let Decorator::Loop(looped) = self {
            *looped = Loop::new(looped.mode);
        }
    }

    /// Name of the library tree this node refers to, if it is an include.
    pub(crate) fn included(&self) -> Option<(&str, bool)> {
        match self {
            Decorator::Include { subtree, lazy } => Some((subtree, *lazy)),
            _ => None,
        }
    }

    fn op(&self) -> Op {
        match self {
            Decorator::Transform(_) => Op::Transform,
            Decorator::Loop(_) => Op::Loop,
            Decorator::SemaphoreGuard { .. } => Op::Guard,
            Decorator::Include { .. } => Op::Include,
        }
    }
}

impl<B: 'static> Tree<B> {
    pub(crate) fn decorator_mut(&mut self, id: NodeId) -> &mut Decorator {
        match &mut self.nodes[id.index()].kind {
            NodeKind::Decorator(decorator) => decorator,
            _ => unreachable!("node {id} is not a decorator"),
        }
    }

    fn loop_mut(&mut self, id: NodeId) -> &mut Loop {
        match self.decorator_mut(id) {
            Decorator::Loop(looped) => looped,
            _ => unreachable!("node {id} is not a loop decorator"),
        }
    }

    fn op(&mut self, id: NodeId) -> Op {
        self.decorator_mut(id).op()
    }

    pub(crate) fn start_decorator(&mut self, id: NodeId) -> Result<()> {
        match self.op(id) {
            Op::Transform => {
                let child = self.only_child(id)?;
                self.start(child)
            }
            Op::Loop => {
                self.decorator_mut(id).clear();
                Ok(())
            }
            Op::Guard => Ok(()),
            Op::Include => {
                let child = self.resolve_include(id)?;
                self.start(child)
            }
        }
    }

    pub(crate) fn run_decorator(&mut self, id: NodeId) -> Result<()> {
        match self.op(id) {
            Op::Transform => {
                let child = self.only_child(id)?;
                self.run(child)
            }
            Op::Loop => self.run_loop(id),
            Op::Guard => self.run_guard(id),
            Op::Include => {
                let child = self.resolve_include(id)?;
                self.run(child)
            }
        }
    }

    pub(crate) fn end_decorator(&mut self, id: NodeId) {
        let Tree {
            nodes, semaphores, ..
        } = self;
        if let NodeKind::Decorator(Decorator::SemaphoreGuard { name, acquired }) =
            &mut nodes[id.index()].kind
        {
            if *acquired {
                semaphores.release(name.as_str());
                *acquired = false;
                tracing::trace!(node = %id, semaphore = %name, "semaphore released");
            }
        }
    }

    pub(crate) fn decorator_child_running(&mut self, id: NodeId) -> Result<()> {
        if let Decorator::Loop(looped) = self.decorator_mut(id) {
            looped.looping = false;
        }
        self.report(id, BtStatus::Running)
    }

    pub(crate) fn decorator_child_done(&mut self, id: NodeId, outcome: BtStatus) -> Result<()> {
        match self.decorator_mut(id) {
            Decorator::Transform(transform) => {
                let outcome = transform.apply(outcome);
                self.report(id, outcome)
            }
            Decorator::Loop(looped) => {
                if looped.complete(outcome) {
                    looped.looping = false;
                    self.report(id, BtStatus::Success)
                } else {
                    looped.looping = true;
                    Ok(())
                }
            }
            Decorator::SemaphoreGuard { .. } | Decorator::Include { .. } => {
                self.report(id, outcome)
            }
        }
    }

    /// Re-enters the child until it reports running or the loop is satisfied. A child that always
    /// completes immediately under an unsatisfiable mode keeps this call from returning.
    fn run_loop(&mut self, id: NodeId) -> Result<()> {
        let looped = self.loop_mut(id);
        if looped.remaining == Some(0) {
            return self.report(id, BtStatus::Success);
        }
        looped.looping = true;

        let child = self.only_child(id)?;
        while self.loop_mut(id).looping {
            if self.nodes[child.index()].status != Status::Running {
                self.start(child)?;
            }
            self.run(child)?;
        }
        Ok(())
    }

    fn run_guard(&mut self, id: NodeId) -> Result<()> {
        let Tree {
            nodes, semaphores, ..
        } = self;
        let NodeKind::Decorator(Decorator::SemaphoreGuard { name, acquired }) =
            &mut nodes[id.index()].kind
        else {
            unreachable!("node {id} is not a semaphore guard");
        };
        if !*acquired {
            if !semaphores.try_acquire(name.as_str()) {
                tracing::debug!(node = %id, semaphore = %name, "semaphore unavailable");
                return self.report(id, BtStatus::Failure);
            }
            *acquired = true;
            tracing::trace!(node = %id, semaphore = %name, "semaphore acquired");
        }

        let child = self.only_child(id)?;
        if self.nodes[child.index()].status != Status::Running {
            self.start(child)?;
        }
        self.run(child)
    }

    /// Child of an include, cloning it from the library first if the include is lazy.
    fn resolve_include(&mut self, id: NodeId) -> Result<NodeId> {
        if let Some(&child) = self.nodes[id.index()].children.first() {
            return Ok(child);
        }
        let Some((subtree, lazy)) = self.decorator_mut(id).included() else {
            unreachable!("node {id} is not an include");
        };
        let subtree = subtree.to_owned();
        if !lazy {
            return Err(BtError::UnresolvedInclude(subtree));
        }
        let library = self
            .library
            .clone()
            .ok_or_else(|| BtError::NoLibrary(subtree.clone()))?;
        let instance = library.clone_archetype(&subtree)?;
        tracing::debug!(node = %id, subtree = %subtree, nodes = instance.len(), "lazy include resolved");
        self.adopt(id, instance)
    }
}
