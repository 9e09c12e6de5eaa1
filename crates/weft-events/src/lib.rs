//! Events and scheduling for the Weft leaf-node runtime.
//!
//! An [`Event`] is an immutable record of a trigger condition plus a
//! handler, in one of three disjoint kinds: publish, discrete update,
//! unrestricted update. Events are registered on a node at declaration
//! time and grouped into kind-homogeneous [`EventCollection`]s; a
//! [`CompositeEventCollection`] carries the three kinds together in
//! dispatch sub-order. [`schedule`] implements the periodic
//! next-sample-time arithmetic.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod collection;
pub mod event;
pub mod schedule;

pub use collection::{CompositeEventCollection, EventCollection};
pub use event::{
    DiscreteUpdateFn, Event, EventAction, EventKind, PeriodicTiming, PublishFn, TriggerType,
    UnrestrictedUpdateFn,
};
pub use schedule::{map_periodic_events_by_timing, next_sample_time, next_update_time};
