//! Tracing and debugging tools for behavior trees.
//!
//! This crate is intentionally lightweight: it turns tree activity into plain [`TraceEvent`]s that
//! tooling can record, stream or render later.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod listener;
pub mod trace;

pub use listener::{
    status_code, status_from_code, TraceListener, TAG_CHILD_ADDED, TAG_STATUS, TAG_STEP,
};
pub use trace::{
    emit, NullTraceSink, SharedTraceLog, TraceEvent, TraceLog, TraceSink, VecTraceSink, TRACE_LOG,
    TRACE_SINK,
};
