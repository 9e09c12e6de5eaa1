//! Execution contexts for the Weft leaf-node runtime.
//!
//! A [`Context`] is the complete instantiated data needed to evaluate a
//! node: time, state, parameters, fixed input values, plus the
//! context-scoped dependency-tracking substrate (a tracker graph and a
//! cache value store). Contexts are manufactured by a node's allocator
//! and exclusively owned by their caller.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cache;
pub mod context;
pub mod graph;
pub mod parameters;
pub mod state;

pub use cache::{Cache, CacheValue};
pub use context::Context;
pub use graph::DependencyGraph;
pub use parameters::Parameters;
pub use state::{AbstractState, ContinuousState, DiscreteState, State};
