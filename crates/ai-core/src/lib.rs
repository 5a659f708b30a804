//! Deterministic, engine-agnostic primitives shared by behavior trees.
//!
//! Everything here is single-threaded: handles such as [`Semaphores`] are `Rc`-backed and meant to be
//! shared between tree instances living on the same thread.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod blackboard;
pub mod rng;
pub mod semaphore;

pub use blackboard::{BbKey, Blackboard, BlackboardError};
pub use rng::{derive_seed, mix64, DeterministicRng, SplitMix64};
pub use semaphore::Semaphores;
