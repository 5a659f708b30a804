use ai_bt::{NodeId, Status, StatusUpdate, TreeListener};

use crate::trace::{TraceEvent, TraceSink};

pub const TAG_STEP: &str = "bt.step";
pub const TAG_STATUS: &str = "bt.status";
pub const TAG_CHILD_ADDED: &str = "bt.child_added";

/// Numeric form of a status, as stored in [`TraceEvent::a`]/[`TraceEvent::b`].
pub fn status_code(status: Status) -> u64 {
    match status {
        Status::Fresh => 0,
        Status::Running => 1,
        Status::Succeeded => 2,
        Status::Failed => 3,
        Status::Cancelled => 4,
    }
}

pub fn status_from_code(code: u64) -> Option<Status> {
    Some(match code {
        0 => Status::Fresh,
        1 => Status::Running,
        2 => Status::Succeeded,
        3 => Status::Failed,
        4 => Status::Cancelled,
        _ => return None,
    })
}

/// Tree listener that writes every callback into a [`TraceSink`].
///
/// Status events carry the node id, the previous status in `a` and the new one in `b`; child
/// additions carry the parent id and the child index in `a`.
#[derive(Debug)]
pub struct TraceListener<S> {
    sink: S,
    step: u64,
    changes_only: bool,
}

impl<S: TraceSink> TraceListener<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            step: 0,
            changes_only: false,
        }
    }

    /// Skip status assignments that do not change the status (a running node re-reporting).
    pub fn changes_only(mut self) -> Self {
        self.changes_only = true;
        self
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

fn node_index(node: NodeId) -> u32 {
    node.index() as u32
}

impl<S: TraceSink + 'static> TreeListener for TraceListener<S> {
    fn step_started(&mut self, step: u64) {
        self.step = step;
        self.sink.emit(TraceEvent::new(step, TAG_STEP));
    }

    fn status_updated(&mut self, update: &StatusUpdate<'_>) {
        if self.changes_only && update.previous == update.current {
            return;
        }
        self.sink.emit(
            TraceEvent::new(self.step, TAG_STATUS)
                .with_node(node_index(update.node))
                .with_a(status_code(update.previous))
                .with_b(status_code(update.current)),
        );
    }

    fn child_added(&mut self, node: NodeId, index: usize) {
        self.sink.emit(
            TraceEvent::new(self.step, TAG_CHILD_ADDED)
                .with_node(node_index(node))
                .with_a(index as u64),
        );
    }
}
