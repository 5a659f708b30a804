use std::fmt;

use ai_core::{Semaphores, SplitMix64};

use crate::bt::{BtStatus, NodeId, Status};
use crate::config::TreeConfig;
use crate::error::{BtError, Result};
use crate::library::TreeLibrary;
use crate::listener::{ListenerId, Listeners, StatusUpdate, TreeListener};
use crate::node::{Node, NodeClass, NodeDef, NodeRef};

/// A behavior tree instance: node arena, root, blackboard and listeners.
///
/// A tree without a blackboard is an archetype: it can be cloned (see
/// [`instantiate`](Tree::instantiate)) but not stepped.
pub struct Tree<B> {
    pub(crate) nodes: Vec<Node<B>>,
    pub(crate) root: Option<NodeId>,
    pub(crate) blackboard: Option<B>,
    pub(crate) listeners: Listeners,
    pub(crate) config: TreeConfig,
    pub(crate) rng: SplitMix64,
    pub(crate) semaphores: Semaphores,
    pub(crate) library: Option<TreeLibrary<B>>,
    pub(crate) steps: u64,
}

impl<B> fmt::Debug for Tree<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("root", &self.root)
            .field("nodes", &self.nodes.len())
            .field("status", &self.status())
            .field("steps", &self.steps)
            .field("has_blackboard", &self.blackboard.is_some())
            .finish()
    }
}

impl<B> Tree<B> {
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Status of the root node (`Fresh` for a tree without root).
    pub fn status(&self) -> Status {
        self.root
            .map(|root| self.nodes[root.index()].status)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of completed calls to [`step`](Tree::step).
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub fn semaphores(&self) -> &Semaphores {
        &self.semaphores
    }

    pub fn library(&self) -> Option<&TreeLibrary<B>> {
        self.library.as_ref()
    }

    pub fn blackboard(&self) -> Option<&B> {
        self.blackboard.as_ref()
    }

    pub fn blackboard_mut(&mut self) -> Option<&mut B> {
        self.blackboard.as_mut()
    }

    /// Installs `blackboard`, returning the previous one.
    pub fn set_blackboard(&mut self, blackboard: B) -> Option<B> {
        self.blackboard.replace(blackboard)
    }

    pub fn take_blackboard(&mut self) -> Option<B> {
        self.blackboard.take()
    }

    pub fn status_of(&self, id: NodeId) -> Option<Status> {
        self.nodes.get(id.index()).map(|node| node.status)
    }

    pub fn add_listener(&mut self, listener: impl TreeListener) -> ListenerId {
        self.listeners.add(Box::new(listener))
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    pub fn remove_listeners(&mut self) {
        self.listeners.clear();
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub(crate) fn check(&self, id: NodeId) -> Result<()> {
        if id.index() < self.nodes.len() {
            Ok(())
        } else {
            Err(BtError::UnknownNode(id))
        }
    }
}

impl<B: 'static> Tree<B> {
    pub fn empty() -> Self {
        let config = TreeConfig::default();
        Self {
            nodes: Vec::new(),
            root: None,
            blackboard: None,
            listeners: Listeners::default(),
            rng: SplitMix64::new(config.seed),
            config,
            semaphores: Semaphores::new(),
            library: None,
            steps: 0,
        }
    }

    /// Archetype tree (no blackboard) rooted at `root`.
    pub fn new(root: NodeDef<B>) -> Self {
        let mut tree = Self::empty();
        let id = tree.insert(root, None);
        tree.root = Some(id);
        tree
    }

    pub fn with_blackboard(root: NodeDef<B>, blackboard: B) -> Self {
        let mut tree = Self::new(root);
        tree.blackboard = Some(blackboard);
        tree
    }

    /// Replaces the config and reseeds the RNG from it.
    pub fn with_config(mut self, config: TreeConfig) -> Self {
        self.rng = SplitMix64::new(config.seed);
        self.config = config;
        self
    }

    pub fn with_semaphores(mut self, semaphores: Semaphores) -> Self {
        self.semaphores = semaphores;
        self
    }

    /// Library used to resolve lazy includes at run time.
    pub fn with_library(mut self, library: TreeLibrary<B>) -> Self {
        self.library = Some(library);
        self
    }

    pub fn set_root(&mut self, root: NodeDef<B>) -> Result<NodeId> {
        if self.root.is_some() {
            return Err(BtError::RootAlreadySet);
        }
        let id = self.insert(root, None);
        self.root = Some(id);
        Ok(id)
    }

    /// Appends `child` under `parent` and notifies listeners.
    ///
    /// A running sequential composite tries the new child after its current ones, within the same
    /// activation.
    pub fn add_child(&mut self, parent: NodeId, child: NodeDef<B>) -> Result<NodeId> {
        self.check(parent)?;
        let node = &self.nodes[parent.index()];
        if let Some(max) = node.kind.max_children() {
            if node.children.len() >= max {
                return Err(BtError::ChildLimit {
                    node: parent,
                    label: node.kind.label().to_owned(),
                    max,
                });
            }
        }
        let id = self.insert(child, Some(parent));
        let children = &mut self.nodes[parent.index()].children;
        children.push(id);
        let index = children.len() - 1;
        let running = self.nodes[parent.index()].status.is_running();
        if running && self.class(parent) == NodeClass::Sequential {
            self.sequential_mut(parent).append(id);
        }
        self.listeners.child_added(parent, index);
        Ok(id)
    }

    pub fn child(&self, node: NodeId, index: usize) -> Result<NodeId> {
        self.check(node)?;
        self.nodes[node.index()]
            .children
            .get(index)
            .copied()
            .ok_or(BtError::ChildIndex { node, index })
    }

    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_>> {
        let node = self.nodes.get(id.index())?;
        Some(NodeRef {
            id,
            status: node.status,
            label: node.kind.label(),
            parent: node.control,
            children: &node.children,
        })
    }

    /// Every node id, in arena order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    /// First node labelled `label`, depth-first from the root.
    pub fn find(&self, label: &str) -> Option<NodeId> {
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.index()];
            if node.kind.label() == label {
                return Some(id);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        None
    }

    /// Advances the tree by one tick: starts the root unless it is already running, then runs it.
    pub fn step(&mut self) -> Result<Status> {
        let root = self.root.ok_or(BtError::MissingRoot)?;
        if self.blackboard.is_none() {
            return Err(BtError::MissingBlackboard);
        }
        let step = self.steps + 1;
        let _span = tracing::trace_span!("bt.step", step).entered();
        self.listeners.step_started(step);

        if self.nodes[root.index()].status != Status::Running {
            self.start(root)?;
        }
        self.run(root)?;
        self.steps = step;
        Ok(self.nodes[root.index()].status)
    }

    /// Abandons the active path: every running node gets its end hook and ends up `Cancelled`.
    ///
    /// End hooks need the blackboard, so a running tree without one is left untouched.
    pub fn cancel(&mut self) -> Result<()> {
        match self.root {
            Some(root) if self.nodes[root.index()].status == Status::Running => {
                if self.blackboard.is_none() {
                    return Err(BtError::MissingBlackboard);
                }
                tracing::debug!(node = %root, "cancelling running tree");
                self.cancel_node(root)
            }
            _ => Ok(()),
        }
    }

    /// Cancels the active path, then returns every node to `Fresh`.
    pub fn reset(&mut self) -> Result<()> {
        let Some(root) = self.root else {
            return Ok(());
        };
        if self.nodes[root.index()].status == Status::Running && self.blackboard.is_none() {
            return Err(BtError::MissingBlackboard);
        }
        self.reset_node(root)
    }

    pub(crate) fn insert(&mut self, def: NodeDef<B>, parent: Option<NodeId>) -> NodeId {
        let NodeDef { kind, children } = def;
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            status: Status::Fresh,
            control: parent,
            children: Vec::with_capacity(children.len()),
            kind,
        });
        for child in children {
            let child = self.insert(child, Some(id));
            self.nodes[id.index()].children.push(child);
        }
        id
    }

    /// Moves the nodes of a freshly cloned `subtree` under `parent`.
    pub(crate) fn adopt(&mut self, parent: NodeId, subtree: Tree<B>) -> Result<NodeId> {
        let sub_root = subtree.root.ok_or(BtError::MissingRoot)?;
        let offset = self.nodes.len() as u32;
        let shift = |id: NodeId| NodeId(id.0 + offset);
        for mut node in subtree.nodes {
            node.control = Some(node.control.map_or(parent, shift));
            for child in node.children.iter_mut() {
                *child = shift(*child);
            }
            self.nodes.push(node);
        }
        let root = shift(sub_root);
        let children = &mut self.nodes[parent.index()].children;
        children.push(root);
        let index = children.len() - 1;
        self.listeners.child_added(parent, index);
        Ok(root)
    }

    pub(crate) fn class(&self, id: NodeId) -> NodeClass {
        self.nodes[id.index()].kind.class()
    }

    pub(crate) fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].control
    }

    pub(crate) fn only_child(&self, id: NodeId) -> Result<NodeId> {
        let node = &self.nodes[id.index()];
        node.children
            .first()
            .copied()
            .ok_or_else(|| BtError::MissingChild {
                node: id,
                label: node.kind.label().to_owned(),
            })
    }

    pub(crate) fn set_status(&mut self, id: NodeId, status: Status) {
        let Tree {
            nodes,
            listeners,
            config,
            ..
        } = self;
        let node = &mut nodes[id.index()];
        let previous = std::mem::replace(&mut node.status, status);
        let label = node.kind.label();
        if config.log_status_updates {
            tracing::trace!(node = %id, label, %previous, current = %status, "status updated");
        }
        if !listeners.is_empty() {
            listeners.status_updated(&StatusUpdate {
                node: id,
                label,
                previous,
                current: status,
            });
        }
    }

    // --- status protocol ------------------------------------------------------------------------

    /// Resets node-local bookkeeping before a node's first run of an activation.
    pub(crate) fn start(&mut self, id: NodeId) -> Result<()> {
        match self.class(id) {
            NodeClass::Leaf => self.start_leaf(id),
            NodeClass::Sequential => {
                self.start_sequential(id);
                Ok(())
            }
            NodeClass::Parallel => self.start_parallel(id),
            NodeClass::Decorator => self.start_decorator(id),
        }
    }

    pub(crate) fn run(&mut self, id: NodeId) -> Result<()> {
        match self.class(id) {
            NodeClass::Leaf => self.run_leaf(id),
            NodeClass::Sequential => self.run_sequential(id),
            NodeClass::Parallel => self.run_parallel(id),
            NodeClass::Decorator => self.run_decorator(id),
        }
    }

    /// Counterpart of `start`, called on terminal reports and on cancellation.
    pub(crate) fn end(&mut self, id: NodeId) -> Result<()> {
        match self.class(id) {
            NodeClass::Leaf => self.end_leaf(id),
            NodeClass::Decorator => {
                self.end_decorator(id);
                Ok(())
            }
            NodeClass::Sequential | NodeClass::Parallel => Ok(()),
        }
    }

    /// Self-report. Running: assign, then tell the parent. Terminal: end hook, assign, then tell
    /// the parent. The parent reacts within the same call stack.
    pub(crate) fn report(&mut self, id: NodeId, outcome: BtStatus) -> Result<()> {
        if outcome == BtStatus::Running {
            self.set_status(id, Status::Running);
            return match self.parent(id) {
                Some(parent) => self.child_running(parent, id),
                None => Ok(()),
            };
        }
        self.end(id)?;
        self.set_status(id, outcome.into());
        match self.parent(id) {
            Some(parent) => self.child_done(parent, outcome),
            None => Ok(()),
        }
    }

    fn child_running(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        match self.class(parent) {
            NodeClass::Sequential => self.sequential_child_running(parent, child),
            NodeClass::Parallel => {
                self.parallel_child_running(parent);
                Ok(())
            }
            NodeClass::Decorator => self.decorator_child_running(parent),
            NodeClass::Leaf => Ok(()),
        }
    }

    fn child_done(&mut self, parent: NodeId, outcome: BtStatus) -> Result<()> {
        match self.class(parent) {
            NodeClass::Sequential => self.sequential_child_done(parent, outcome),
            NodeClass::Parallel => {
                self.parallel_child_done(parent, outcome);
                Ok(())
            }
            NodeClass::Decorator => self.decorator_child_done(parent, outcome),
            NodeClass::Leaf => Ok(()),
        }
    }

    // --- cancellation / reset -------------------------------------------------------------------

    pub(crate) fn cancel_node(&mut self, id: NodeId) -> Result<()> {
        if self.nodes[id.index()].status != Status::Running {
            return Ok(());
        }
        self.cancel_children(id)?;
        self.end(id)?;
        self.clear_state(id);
        self.set_status(id, Status::Cancelled);
        Ok(())
    }

    pub(crate) fn cancel_children(&mut self, id: NodeId) -> Result<()> {
        for index in 0..self.nodes[id.index()].children.len() {
            let child = self.nodes[id.index()].children[index];
            self.cancel_node(child)?;
        }
        Ok(())
    }

    pub(crate) fn reset_node(&mut self, id: NodeId) -> Result<()> {
        self.cancel_node(id)?;
        self.reset_children(id)?;
        self.clear_state(id);
        if self.class(id) == NodeClass::Leaf {
            self.reset_leaf(id);
        }
        self.set_status(id, Status::Fresh);
        Ok(())
    }

    pub(crate) fn reset_children(&mut self, id: NodeId) -> Result<()> {
        for index in 0..self.nodes[id.index()].children.len() {
            let child = self.nodes[id.index()].children[index];
            self.reset_node(child)?;
        }
        Ok(())
    }

    fn clear_state(&mut self, id: NodeId) {
        match self.class(id) {
            NodeClass::Leaf => {}
            NodeClass::Sequential => self.sequential_mut(id).clear(),
            NodeClass::Parallel => self.parallel_mut(id).clear(),
            NodeClass::Decorator => self.decorator_mut(id).clear(),
        }
    }
}
