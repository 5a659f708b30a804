use crate::bt::{NodeId, Status};

/// One status assignment, as seen by listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusUpdate<'a> {
    pub node: NodeId,
    pub label: &'a str,
    pub previous: Status,
    pub current: Status,
}

/// External observer of a tree (visualisation, debugging, persistence). Never consulted by the
/// engine's own decisions.
pub trait TreeListener: 'static {
    fn step_started(&mut self, _step: u64) {}

    /// Fires on every status assignment, including re-assignment of the same value.
    fn status_updated(&mut self, update: &StatusUpdate<'_>);

    /// `node` gained a child at `index` after the tree was built.
    fn child_added(&mut self, _node: NodeId, _index: usize) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

/// Listeners in registration order.
#[derive(Default)]
pub(crate) struct Listeners {
    next: u64,
    entries: Vec<(ListenerId, Box<dyn TreeListener>)>,
}

impl Listeners {
    pub(crate) fn add(&mut self, listener: Box<dyn TreeListener>) -> ListenerId {
        let id = ListenerId(self.next);
        self.next += 1;
        self.entries.push((id, listener));
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn step_started(&mut self, step: u64) {
        for (_, listener) in self.entries.iter_mut() {
            listener.step_started(step);
        }
    }

    pub(crate) fn status_updated(&mut self, update: &StatusUpdate<'_>) {
        for (_, listener) in self.entries.iter_mut() {
            listener.status_updated(update);
        }
    }

    pub(crate) fn child_added(&mut self, node: NodeId, index: usize) {
        for (_, listener) in self.entries.iter_mut() {
            listener.child_added(node, index);
        }
    }
}
