//! The Weft leaf node: the atomic runtime unit of a block-diagram
//! framework for hybrid dynamical systems.
//!
//! A [`LeafNode`] is declared once — state, parameters, ports, cached
//! output computations, events, constraints — and thereafter read-only.
//! It manufactures independent [`Context`](weft_context::Context)s,
//! schedules periodic and forced events, dispatches update handlers with
//! kind-specific failure semantics, and statically determines which
//! outputs are causally reachable from which inputs.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod allocate;
pub mod cache_entry;
pub mod constraint;
pub mod dispatch;
pub mod eval;
pub mod feedthrough;
pub mod model;
pub mod node;
pub mod port;
pub mod schedule;
pub mod symbolic;
pub mod witness;

pub use cache_entry::CacheEntry;
pub use constraint::{Constraint, ConstraintBounds, ConstraintIndex};
pub use feedthrough::FeedthroughPairs;
pub use model::ModelRegistry;
pub use node::LeafNode;
pub use port::{InputPort, OutputPort, PortDataType};
pub use symbolic::{InspectorFactory, SymbolicInspector};
pub use witness::{WitnessDirection, WitnessFunction};
