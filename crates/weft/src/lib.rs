//! Weft: the leaf-node runtime of a block-diagram framework for hybrid
//! (continuous- and discrete-time) dynamical systems.
//!
//! This is the top-level facade crate that re-exports the public API
//! from all Weft sub-crates. For most users, adding `weft` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use weft::prelude::*;
//!
//! // A sampled accumulator: one discrete state, one input, one output,
//! // updated every 100 ms.
//! let mut node = LeafNode::<f64>::new("accumulator");
//! let group = node.declare_discrete_state(DenseVector::from_vec(vec![0.0]));
//! let u = node.declare_vector_input_port("u", DenseVector::zeros(1));
//! node.declare_discrete_state_output_port("sum", group).unwrap();
//!
//! let timing = PeriodicTiming::new(0.0, 0.1).unwrap();
//! node.declare_periodic_discrete_update(timing, move |context, discrete| {
//!     let increment = context
//!         .input_value(u)
//!         .and_then(|v| v.downcast_ref::<DenseVector<f64>>())
//!         .map(|v| v.get(0))
//!         .unwrap_or(0.0);
//!     let sum = discrete.group(0).get(0);
//!     discrete.group_mut(0).set(0, sum + increment);
//!     EventStatus::succeeded()
//! });
//!
//! let mut context = node.allocate_context().unwrap();
//! context.fix_input_port(u, Value::boxed(DenseVector::from_vec(vec![2.5])));
//!
//! // Next sample, and the events due there.
//! let (t, due) = node.compute_next_update_time(&context);
//! assert_eq!(t, 0.1);
//!
//! // Dispatch and commit.
//! let mut buffer = node.allocate_discrete_state();
//! let status = node
//!     .dispatch_discrete_update(&context, due.discrete_update_events(), &mut buffer)
//!     .unwrap();
//! assert_eq!(status, EventStatus::succeeded());
//! node.apply_discrete_update(&buffer, &mut context).unwrap();
//!
//! let sum = node.eval_vector_output_port(&mut context, OutputPortIndex(0)).unwrap();
//! assert_eq!(sum.values(), &[2.5]);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the
//! prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `weft-core` | Indices, tickets, status, scalars, values, vectors, errors |
//! | [`context`] | `weft-context` | Contexts, state, parameters, the tracking substrate |
//! | [`events`] | `weft-events` | Event records, collections, periodic scheduling |
//! | [`node`] | `weft-node` | The leaf node: declaration, allocation, dispatch, feedthrough |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Indices, tickets, status, scalars, values, vectors, and error types
/// (`weft-core`).
pub use weft_core as types;

/// Execution contexts and the dependency-tracking substrate
/// (`weft-context`).
pub use weft_context as context;

/// Event records, collections, and periodic scheduling (`weft-events`).
pub use weft_events as events;

/// The leaf node: declaration API, context allocation, update dispatch,
/// and feedthrough analysis (`weft-node`).
pub use weft_node as node;

/// Common imports for typical Weft usage.
///
/// ```rust
/// use weft::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use weft_core::{
        AbstractStateIndex, AbstractValue, CacheIndex, ContinuousStateIndex, DenseVector,
        DiscreteStateIndex, EventStatus, InputPortIndex, OutputPortIndex, Scalar, Severity,
        Ticket, TicketSet, Value, VectorBase,
    };

    // Errors
    pub use weft_core::{AllocationError, ComputeError, DeclarationError, TimingError};

    // Context
    pub use weft_context::{AbstractState, Context, ContinuousState, DiscreteState, Parameters, State};

    // Events
    pub use weft_events::{
        CompositeEventCollection, Event, EventAction, EventCollection, EventKind, PeriodicTiming,
        TriggerType,
    };

    // Node
    pub use weft_node::{
        ConstraintBounds, LeafNode, SymbolicInspector, WitnessDirection, WitnessFunction,
    };
}
