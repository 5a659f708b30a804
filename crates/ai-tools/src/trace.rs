#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::cell::RefCell;
use std::rc::Rc;

use ai_core::{BbKey, Blackboard};

/// A small, allocation-friendly trace event.
///
/// This is intentionally "dumb data" so it can be recorded while trees run and later rendered by
/// tooling. The meaning of `a` and `b` depends on the tag.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceEvent {
    pub step: u64,
    pub tag: Cow<'static, str>,
    pub node: Option<u32>,
    pub a: u64,
    pub b: u64,
}

impl TraceEvent {
    pub fn new(step: u64, tag: impl Into<Cow<'static, str>>) -> Self {
        Self {
            step,
            tag: tag.into(),
            node: None,
            a: 0,
            b: 0,
        }
    }

    pub fn with_node(mut self, node: u32) -> Self {
        self.node = Some(node);
        self
    }

    pub fn with_a(mut self, a: u64) -> Self {
        self.a = a;
        self
    }

    pub fn with_b(mut self, b: u64) -> Self {
        self.b = b;
        self
    }
}

pub trait TraceSink {
    fn emit(&mut self, event: TraceEvent);
}

#[derive(Debug, Default)]
pub struct NullTraceSink;

impl TraceSink for NullTraceSink {
    fn emit(&mut self, _event: TraceEvent) {}
}

#[derive(Debug, Default)]
pub struct VecTraceSink {
    pub events: Vec<TraceEvent>,
}

impl TraceSink for VecTraceSink {
    fn emit(&mut self, event: TraceEvent) {
        self.events.push(event);
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceLog {
    pub events: Vec<TraceEvent>,
}

impl TraceLog {
    pub fn push(&mut self, event: TraceEvent) {
        self.events.push(event);
    }

    pub fn with_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a TraceEvent> + 'a {
        self.events.iter().filter(move |event| event.tag == tag)
    }
}

/// Log shared between a sink owned by a listener and the code inspecting it.
#[derive(Debug, Default, Clone)]
pub struct SharedTraceLog(Rc<RefCell<TraceLog>>);

impl SharedTraceLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().events.is_empty()
    }

    /// Copy of the events recorded so far.
    pub fn snapshot(&self) -> TraceLog {
        self.0.borrow().clone()
    }

    pub fn take(&self) -> TraceLog {
        std::mem::take(&mut *self.0.borrow_mut())
    }
}

impl TraceSink for SharedTraceLog {
    fn emit(&mut self, event: TraceEvent) {
        self.0.borrow_mut().push(event);
    }
}

/// Blackboard key for collecting events in-memory.
pub const TRACE_LOG: BbKey<TraceLog> = BbKey::new("ai_tools.trace_log");
/// Blackboard key for streaming events into a user-provided sink.
pub const TRACE_SINK: BbKey<Box<dyn TraceSink>> = BbKey::new("ai_tools.trace_sink");

/// Records `event` into whichever of [`TRACE_LOG`] and [`TRACE_SINK`] the blackboard holds.
///
/// Leaf tasks use this to leave domain breadcrumbs next to the tree's own events.
pub fn emit(blackboard: &mut Blackboard, event: TraceEvent) {
    if let Some(log) = blackboard.get_mut(TRACE_LOG) {
        log.push(event.clone());
    }
    if let Some(sink) = blackboard.get_mut(TRACE_SINK) {
        sink.emit(event);
    }
}
