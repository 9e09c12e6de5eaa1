//! Node-level scheduling queries over the declared event collections.

use indexmap::IndexMap;
use std::rc::Rc;

use weft_context::Context;
use weft_core::{Scalar, TimingError};
use weft_events::{
    map_periodic_events_by_timing, next_update_time, CompositeEventCollection, Event,
    EventCollection, EventKind, PeriodicTiming,
};

use crate::node::LeafNode;

impl<T: Scalar> LeafNode<T> {
    /// The next time any declared periodic event comes due after the
    /// context's current time, with the transient collection of events
    /// due at that time.
    ///
    /// With no periodic events the time is +infinity and the collection
    /// is empty.
    pub fn compute_next_update_time(
        &self,
        context: &Context<T>,
    ) -> (T, CompositeEventCollection<T>) {
        next_update_time(&self.periodic_events, context.time())
    }

    /// The node's unique periodic discrete-update timing, with the
    /// events sharing it.
    ///
    /// The timing of the first periodic discrete-update event found
    /// establishes the required timing; every subsequent one must match
    /// exactly or the query fails naming both timings. A node with no
    /// periodic discrete updates returns `None`. A composing layer asks
    /// this when a caller requests "the" update rate of a subtree, so a
    /// node may not mix independent discrete-update rates here.
    pub fn find_unique_periodic_discrete_updates(
        &self,
    ) -> Result<Option<(PeriodicTiming, EventCollection<T>)>, TimingError> {
        let mut required: Option<PeriodicTiming> = None;
        let mut events = EventCollection::new(EventKind::DiscreteUpdate);
        for event in self.periodic_events.discrete_update_events().iter() {
            let timing = event
                .trigger()
                .periodic_timing()
                .expect("periodic collection events carry periodic timing");
            match required {
                None => required = Some(*timing),
                Some(first) if *timing != first => {
                    return Err(TimingError::ConflictingPeriodicTimings {
                        first_offset_sec: first.offset_sec(),
                        first_period_sec: first.period_sec(),
                        second_offset_sec: timing.offset_sec(),
                        second_period_sec: timing.period_sec(),
                    });
                }
                Some(_) => {}
            }
            events
                .add(Rc::clone(event))
                .expect("discrete-update event kind matches collection");
        }
        Ok(required.map(|timing| (timing, events)))
    }

    /// Group every declared periodic event by its exact (offset, period)
    /// timing.
    pub fn map_periodic_events_by_timing(&self) -> IndexMap<PeriodicTiming, Vec<Rc<Event<T>>>> {
        map_periodic_events_by_timing(&self.periodic_events)
    }
}
