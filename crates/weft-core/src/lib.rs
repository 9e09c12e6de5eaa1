//! Core types and traits for the Weft leaf-node runtime.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the Weft workspace:
//! typed indices, dependency tickets, event status, the scalar and
//! vector contracts, type-erased values, and error types.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod scalar;
pub mod status;
pub mod ticket;
pub mod value;
pub mod vector;

pub use error::{AllocationError, ComputeError, DeclarationError, TimingError};
pub use id::{
    AbstractParameterIndex, AbstractStateIndex, CacheIndex, ChangeEventId, ContinuousStateIndex,
    DiscreteStateIndex, InputPortIndex, NumericParameterIndex, OutputPortIndex,
};
pub use scalar::Scalar;
pub use status::{EventStatus, Severity};
pub use ticket::{Ticket, TicketSet};
pub use value::{AbstractValue, Value};
pub use vector::{DenseVector, VectorBase};
