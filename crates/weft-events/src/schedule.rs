//! Periodic-event scheduling arithmetic.
//!
//! [`next_sample_time`] computes the next firing time of one periodic
//! timing; [`next_update_time`] scans a composite collection for the
//! minimum next time and the set of events due at it.

use indexmap::IndexMap;
use smallvec::SmallVec;
use std::rc::Rc;

use weft_core::Scalar;

use crate::collection::{CompositeEventCollection, EventCollection};
use crate::event::{Event, PeriodicTiming};

/// The next sample time strictly after `current_time_sec` for a
/// periodic timing, in seconds.
///
/// Before the first sample the answer is the offset itself. Afterwards
/// the candidate is `offset + ceil((now - offset) / period) * period`;
/// floating rounding can land that candidate at or before `now`, in
/// which case it is bumped by one period.
pub fn next_sample_time(timing: &PeriodicTiming, current_time_sec: f64) -> f64 {
    let period = timing.period_sec();
    let offset = timing.offset_sec();

    // If the first sample time hasn't arrived yet, that is the next one.
    if current_time_sec < offset {
        return offset;
    }

    let next_k = ((current_time_sec - offset) / period).ceil();
    let mut next_t = offset + next_k * period;
    if next_t <= current_time_sec {
        next_t = offset + (next_k + 1.0) * period;
    }
    next_t
}

/// The minimum next sample time over every periodic event in
/// `periodic`, with the events due at that time.
///
/// With no periodic events the time is +infinity and the due collection
/// is empty. The three kinds are scanned together (publish, then
/// discrete update, then unrestricted update); an event whose candidate
/// equals the running minimum joins the due set, and a strictly smaller
/// candidate replaces it. The due events are assembled into a composite
/// collection, which preserves the per-kind sub-order.
pub fn next_update_time<T: Scalar>(
    periodic: &CompositeEventCollection<T>,
    current_time: T,
) -> (T, CompositeEventCollection<T>) {
    let now = current_time.to_f64();
    let mut min_time = f64::INFINITY;
    // Inline storage so small event counts schedule without allocating.
    let mut due: SmallVec<[Rc<Event<T>>; 8]> = SmallVec::new();

    let mut scan = |collection: &EventCollection<T>| {
        for event in collection.iter() {
            let timing = event
                .trigger()
                .periodic_timing()
                .expect("periodic collection events carry periodic timing");
            let t = next_sample_time(timing, now);
            if t < min_time {
                min_time = t;
                due.clear();
                due.push(Rc::clone(event));
            } else if t == min_time {
                due.push(Rc::clone(event));
            }
        }
    };
    scan(periodic.publish_events());
    scan(periodic.discrete_update_events());
    scan(periodic.unrestricted_update_events());

    let mut composite = CompositeEventCollection::new();
    for event in due {
        composite.add_event(event);
    }
    (T::from_f64(min_time), composite)
}

/// Group every periodic event in `periodic` by its exact (offset,
/// period) timing, preserving scan order within each group.
pub fn map_periodic_events_by_timing<T: Scalar>(
    periodic: &CompositeEventCollection<T>,
) -> IndexMap<PeriodicTiming, Vec<Rc<Event<T>>>> {
    let mut map: IndexMap<PeriodicTiming, Vec<Rc<Event<T>>>> = IndexMap::new();
    let mut collect = |collection: &EventCollection<T>| {
        for event in collection.iter() {
            let timing = event
                .trigger()
                .periodic_timing()
                .expect("periodic collection events carry periodic timing");
            map.entry(*timing).or_default().push(Rc::clone(event));
        }
    };
    collect(periodic.publish_events());
    collect(periodic.discrete_update_events());
    collect(periodic.unrestricted_update_events());
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventAction, EventKind, TriggerType};
    use proptest::prelude::*;
    use weft_core::EventStatus;

    fn timing(offset: f64, period: f64) -> PeriodicTiming {
        PeriodicTiming::new(offset, period).unwrap()
    }

    fn periodic_publish(offset: f64, period: f64) -> Rc<Event<f64>> {
        Rc::new(Event::new(
            TriggerType::Periodic(timing(offset, period)),
            EventAction::Publish(Box::new(|_| EventStatus::succeeded())),
        ))
    }

    fn periodic_discrete(offset: f64, period: f64) -> Rc<Event<f64>> {
        Rc::new(Event::new(
            TriggerType::Periodic(timing(offset, period)),
            EventAction::DiscreteUpdate(Box::new(|_, _| EventStatus::succeeded())),
        ))
    }

    // ── next_sample_time ─────────────────────────────────────────

    #[test]
    fn before_offset_fires_at_offset() {
        assert_eq!(next_sample_time(&timing(2.0, 0.5), 0.0), 2.0);
        assert_eq!(next_sample_time(&timing(2.0, 0.5), 1.999), 2.0);
    }

    #[test]
    fn exactly_on_a_sample_advances_one_period() {
        assert_eq!(next_sample_time(&timing(0.0, 0.5), 0.0), 0.5);
        assert_eq!(next_sample_time(&timing(0.0, 0.5), 1.0), 1.5);
        assert_eq!(next_sample_time(&timing(1.0, 0.25), 1.25), 1.5);
    }

    #[test]
    fn between_samples_rounds_up() {
        assert_eq!(next_sample_time(&timing(0.0, 0.5), 0.3), 0.5);
        assert_eq!(next_sample_time(&timing(1.0, 0.25), 1.1), 1.25);
    }

    proptest! {
        #[test]
        fn next_is_offset_before_first_sample(
            offset in 0.0..100.0f64,
            period in 1e-6..50.0f64,
            frac in 0.0..1.0f64,
        ) {
            prop_assume!(offset > 0.0);
            let now = offset * frac - 1e-9;
            prop_assume!(now < offset);
            prop_assert_eq!(next_sample_time(&timing(offset, period), now), offset);
        }

        #[test]
        fn next_is_strictly_future_and_on_grid(
            offset in 0.0..100.0f64,
            period in 1e-3..50.0f64,
            delta in 0.0..1000.0f64,
        ) {
            let now = offset + delta;
            let next = next_sample_time(&timing(offset, period), now);

            // Strictly in the future.
            prop_assert!(next > now);

            // On the sample grid, within floating tolerance.
            let k = ((next - offset) / period).round();
            let on_grid = offset + k * period;
            prop_assert!((next - on_grid).abs() <= 1e-9 * period.max(1.0));

            // No earlier multiple also exceeds now.
            prop_assert!(next - period <= now + 1e-9 * period.max(1.0));
        }
    }

    // ── next_update_time ─────────────────────────────────────────

    #[test]
    fn no_periodic_events_means_infinity() {
        let composite = CompositeEventCollection::<f64>::new();
        let (t, due) = next_update_time(&composite, 0.0);
        assert_eq!(t, f64::INFINITY);
        assert!(!due.has_events());
    }

    #[test]
    fn minimum_wins_and_ties_join() {
        let mut composite = CompositeEventCollection::<f64>::new();
        // Both 0.5-period events tie at t = 0.5; the 0.7-offset one loses.
        composite.add_event(periodic_publish(0.0, 0.5));
        composite.add_event(periodic_publish(0.7, 1.0));
        composite.add_event(periodic_discrete(0.5, 0.5));

        let (t, due) = next_update_time(&composite, 0.0);
        assert_eq!(t, 0.5);
        assert_eq!(due.num_events(), 2);
        assert_eq!(due.publish_events().len(), 1);
        assert_eq!(due.discrete_update_events().len(), 1);
    }

    #[test]
    fn strictly_smaller_candidate_replaces_due_set() {
        let mut composite = CompositeEventCollection::<f64>::new();
        composite.add_event(periodic_publish(0.0, 1.0)); // next at 1.0
        composite.add_event(periodic_discrete(0.25, 1.0)); // next at 0.25

        let (t, due) = next_update_time(&composite, 0.0);
        assert_eq!(t, 0.25);
        assert_eq!(due.num_events(), 1);
        assert!(due.publish_events().is_empty());
        assert_eq!(due.discrete_update_events().len(), 1);
    }

    #[test]
    fn n_way_tie_returns_exactly_those_events() {
        let mut composite = CompositeEventCollection::<f64>::new();
        for _ in 0..3 {
            composite.add_event(periodic_publish(0.0, 0.25));
        }
        composite.add_event(periodic_publish(0.0, 0.75));

        // At t = 0.5 the three 0.25-period events tie at 0.75 along with
        // the 0.75-period event.
        let (t, due) = next_update_time(&composite, 0.5);
        assert_eq!(t, 0.75);
        assert_eq!(due.num_events(), 4);

        // At t = 0.8 only the fast events remain due at 1.0 ... and the
        // slow one at 1.5.
        let (t, due) = next_update_time(&composite, 0.8);
        assert_eq!(t, 1.0);
        assert_eq!(due.num_events(), 3);
    }

    // ── map_periodic_events_by_timing ────────────────────────────

    #[test]
    fn grouping_is_by_exact_timing() {
        let mut composite = CompositeEventCollection::<f64>::new();
        composite.add_event(periodic_publish(0.0, 0.5));
        composite.add_event(periodic_discrete(0.0, 0.5));
        composite.add_event(periodic_publish(0.0, 0.25));

        let map = map_periodic_events_by_timing(&composite);
        assert_eq!(map.len(), 2);
        assert_eq!(map[&timing(0.0, 0.5)].len(), 2);
        assert_eq!(map[&timing(0.0, 0.25)].len(), 1);
    }

    #[test]
    fn mixed_kinds_share_a_group() {
        let mut composite = CompositeEventCollection::<f64>::new();
        composite.add_event(periodic_discrete(1.0, 2.0));
        composite.add_event(periodic_publish(1.0, 2.0));

        let map = map_periodic_events_by_timing(&composite);
        let group = &map[&timing(1.0, 2.0)];
        assert_eq!(group.len(), 2);
        // Scan order is publish first.
        assert_eq!(group[0].kind(), EventKind::Publish);
        assert_eq!(group[1].kind(), EventKind::DiscreteUpdate);
    }
}
