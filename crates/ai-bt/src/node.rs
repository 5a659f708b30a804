use crate::bt::{BtStatus, NodeId, Status, Task};
use crate::decorator::{Decorator, Transform};
use crate::error::Result;
use crate::leaf::{Action, Condition, Fail, Succeed, Wait};
use crate::parallel::{Orchestrator, Parallel, Policy};
use crate::sequential::{Sequential, SequentialKind};

pub(crate) struct Node<B> {
    pub(crate) status: Status,
    /// Parent back-reference; `None` for the root.
    pub(crate) control: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) kind: NodeKind<B>,
}

pub(crate) enum NodeKind<B> {
    Leaf(Box<dyn Task<B>>),
    Sequential(Sequential),
    Parallel(Parallel),
    Decorator(Decorator),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeClass {
    Leaf,
    Sequential,
    Parallel,
    Decorator,
}

impl<B: 'static> NodeKind<B> {
    pub(crate) fn class(&self) -> NodeClass {
        match self {
            NodeKind::Leaf(_) => NodeClass::Leaf,
            NodeKind::Sequential(_) => NodeClass::Sequential,
            NodeKind::Parallel(_) => NodeClass::Parallel,
            NodeKind::Decorator(_) => NodeClass::Decorator,
        }
    }

    pub(crate) fn label(&self) -> &str {
        match self {
            NodeKind::Leaf(task) => task.label(),
            NodeKind::Sequential(seq) => seq.label(),
            NodeKind::Parallel(_) => "parallel",
            NodeKind::Decorator(decorator) => decorator.label(),
        }
    }

    /// Upper bound on children added through the tree API. `None` means unbounded.
    pub(crate) fn max_children(&self) -> Option<usize> {
        match self {
            NodeKind::Leaf(_) => Some(0),
            NodeKind::Decorator(Decorator::Include { .. }) => Some(0),
            NodeKind::Decorator(_) => Some(1),
            NodeKind::Sequential(_) | NodeKind::Parallel(_) => None,
        }
    }

    /// Same configuration, no runtime state.
    pub(crate) fn clone_fresh(&self) -> Result<Self> {
        Ok(match self {
            NodeKind::Leaf(task) => NodeKind::Leaf(task.clone_task()?),
            NodeKind::Sequential(seq) => NodeKind::Sequential(seq.fresh()),
            NodeKind::Parallel(parallel) => NodeKind::Parallel(parallel.fresh()),
            NodeKind::Decorator(decorator) => NodeKind::Decorator(decorator.fresh()),
        })
    }
}

/// Read-only view of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeRef<'a> {
    pub id: NodeId,
    pub status: Status,
    pub label: &'a str,
    pub parent: Option<NodeId>,
    pub children: &'a [NodeId],
}

/// Owned description of a subtree, flattened into a [`Tree`](crate::Tree) on insertion.
///
/// Constructors encode the child-count rules: leaves take no children, decorators exactly one.
pub struct NodeDef<B> {
    pub(crate) kind: NodeKind<B>,
    pub(crate) children: Vec<NodeDef<B>>,
}

impl<B: 'static> NodeDef<B> {
    fn with_children(kind: NodeKind<B>, children: impl IntoIterator<Item = NodeDef<B>>) -> Self {
        Self {
            kind,
            children: children.into_iter().collect(),
        }
    }

    fn decorate(decorator: Decorator, child: NodeDef<B>) -> Self {
        Self {
            kind: NodeKind::Decorator(decorator),
            children: vec![child],
        }
    }

    pub fn label(&self) -> &str {
        self.kind.label()
    }

    pub fn leaf(task: impl Task<B>) -> Self {
        Self {
            kind: NodeKind::Leaf(Box::new(task)),
            children: Vec::new(),
        }
    }

    pub fn action<F>(label: impl Into<String>, action: F) -> Self
    where
        F: FnMut(&mut B) -> BtStatus + Clone + 'static,
    {
        Self::leaf(Action::new(label, action))
    }

    pub fn condition<F>(label: impl Into<String>, condition: F) -> Self
    where
        F: Fn(&B) -> bool + Clone + 'static,
    {
        Self::leaf(Condition::new(label, condition))
    }

    pub fn success() -> Self {
        Self::leaf(Succeed)
    }

    pub fn failure() -> Self {
        Self::leaf(Fail)
    }

    pub fn wait(steps: u32) -> Self {
        Self::leaf(Wait::new(steps))
    }

    pub fn sequence(children: impl IntoIterator<Item = NodeDef<B>>) -> Self {
        let seq = Sequential::new(SequentialKind::Sequence, true);
        Self::with_children(NodeKind::Sequential(seq), children)
    }

    pub fn selector(children: impl IntoIterator<Item = NodeDef<B>>) -> Self {
        let seq = Sequential::new(SequentialKind::Selector, true);
        Self::with_children(NodeKind::Sequential(seq), children)
    }

    /// Sequence that tries its children in a random order.
    pub fn random_sequence(children: impl IntoIterator<Item = NodeDef<B>>) -> Self {
        let seq = Sequential::new(SequentialKind::Sequence, false);
        Self::with_children(NodeKind::Sequential(seq), children)
    }

    /// Selector that tries its children in a random order.
    pub fn random_selector(children: impl IntoIterator<Item = NodeDef<B>>) -> Self {
        let seq = Sequential::new(SequentialKind::Selector, false);
        Self::with_children(NodeKind::Sequential(seq), children)
    }

    pub fn parallel(
        policy: Policy,
        orchestrator: Orchestrator,
        children: impl IntoIterator<Item = NodeDef<B>>,
    ) -> Self {
        let parallel = Parallel::new(policy, orchestrator);
        Self::with_children(NodeKind::Parallel(parallel), children)
    }

    pub fn invert(child: NodeDef<B>) -> Self {
        Self::decorate(Decorator::Transform(Transform::Invert), child)
    }

    pub fn always_succeed(child: NodeDef<B>) -> Self {
        Self::decorate(Decorator::Transform(Transform::AlwaysSucceed), child)
    }

    pub fn always_fail(child: NodeDef<B>) -> Self {
        Self::decorate(Decorator::Transform(Transform::AlwaysFail), child)
    }

    /// Re-runs `child` until it has completed `times` times, then succeeds.
    pub fn repeat(times: u32, child: NodeDef<B>) -> Self {
        Self::decorate(Decorator::repeat(Some(times)), child)
    }

    pub fn repeat_forever(child: NodeDef<B>) -> Self {
        Self::decorate(Decorator::repeat(None), child)
    }

    /// Re-runs `child` until it succeeds, then succeeds.
    pub fn until_success(child: NodeDef<B>) -> Self {
        Self::decorate(Decorator::until_success(), child)
    }

    /// Re-runs `child` until it fails, then succeeds.
    pub fn until_failure(child: NodeDef<B>) -> Self {
        Self::decorate(Decorator::until_failure(), child)
    }

    /// Runs `child` only while holding a permit of the named semaphore.
    pub fn semaphore_guard(name: impl Into<String>, child: NodeDef<B>) -> Self {
        Self::decorate(Decorator::semaphore_guard(name), child)
    }

    /// Reference to a library tree, replaced by a clone of it when the enclosing tree is cloned.
    pub fn include(subtree: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Decorator(Decorator::include(subtree, false)),
            children: Vec::new(),
        }
    }

    /// Reference to a library tree, resolved the first time the include is started.
    pub fn include_lazy(subtree: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Decorator(Decorator::include(subtree, true)),
            children: Vec::new(),
        }
    }
}
