//! Behavior-tree execution engine built on `ai-core`.
//!
//! A [`Tree`] owns its nodes in an arena and is advanced one tick at a time with
//! [`Tree::step`]. Nodes report their outcome to their parent synchronously, so by the time `step`
//! returns the whole active path has settled. Trees are single-threaded; run many instances by
//! cloning an archetype, usually through a [`TreeLibrary`].

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod bt;
pub mod config;
mod decorator;
pub mod error;
mod instantiate;
pub mod leaf;
pub mod library;
pub mod listener;
pub mod node;
pub mod parallel;
pub mod sequential;
pub mod tree;

pub use bt::{BtStatus, NodeId, Status, Task};
pub use config::TreeConfig;
pub use error::{BtError, Result};
pub use leaf::{Action, Condition, Fail, Succeed, Wait};
pub use library::TreeLibrary;
pub use listener::{ListenerId, StatusUpdate, TreeListener};
pub use node::{NodeDef, NodeRef};
pub use parallel::{Orchestrator, Policy};
pub use sequential::SequentialKind;
pub use tree::Tree;
