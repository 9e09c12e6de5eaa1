//! Kind-homogeneous event collections and the three-kind composite.

use std::rc::Rc;

use weft_core::{DeclarationError, Scalar};

use crate::event::{Event, EventKind};

/// An ordered collection of events of one kind.
///
/// Kind homogeneity is checked at insertion, so iteration code can rely
/// on every event's action matching the collection's kind.
#[derive(Clone, Debug)]
pub struct EventCollection<T: Scalar> {
    kind: EventKind,
    events: Vec<Rc<Event<T>>>,
}

impl<T: Scalar> EventCollection<T> {
    /// An empty collection of the given kind.
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            events: Vec::new(),
        }
    }

    /// The kind every event in this collection has.
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Append an event. Fails when the event's kind does not match.
    pub fn add(&mut self, event: Rc<Event<T>>) -> Result<(), DeclarationError> {
        if event.kind() != self.kind {
            return Err(DeclarationError::EventKindMismatch {
                expected: self.kind.name(),
                actual: event.kind().name(),
            });
        }
        self.events.push(event);
        Ok(())
    }

    /// Whether the collection holds at least one event.
    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Iterate over the events in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Rc<Event<T>>> {
        self.events.iter()
    }

    /// Drop all events, keeping the kind.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Replace this collection's events with clones of another's.
    ///
    /// Kinds must match.
    pub fn set_from(&mut self, other: &EventCollection<T>) -> Result<(), DeclarationError> {
        if other.kind != self.kind {
            return Err(DeclarationError::EventKindMismatch {
                expected: self.kind.name(),
                actual: other.kind.name(),
            });
        }
        self.events = other.events.clone();
        Ok(())
    }
}

/// The three per-kind event lists a node or a scheduling query carries,
/// in publish / discrete-update / unrestricted-update sub-order.
#[derive(Clone, Debug)]
pub struct CompositeEventCollection<T: Scalar> {
    publish: EventCollection<T>,
    discrete_update: EventCollection<T>,
    unrestricted_update: EventCollection<T>,
}

impl<T: Scalar> CompositeEventCollection<T> {
    /// An empty composite.
    pub fn new() -> Self {
        Self {
            publish: EventCollection::new(EventKind::Publish),
            discrete_update: EventCollection::new(EventKind::DiscreteUpdate),
            unrestricted_update: EventCollection::new(EventKind::UnrestrictedUpdate),
        }
    }

    /// Route an event into the list matching its kind.
    pub fn add_event(&mut self, event: Rc<Event<T>>) {
        let list = match event.kind() {
            EventKind::Publish => &mut self.publish,
            EventKind::DiscreteUpdate => &mut self.discrete_update,
            EventKind::UnrestrictedUpdate => &mut self.unrestricted_update,
        };
        // Routed by kind, so the homogeneity check cannot fail.
        list.add(event).expect("event routed to matching kind");
    }

    /// The publish events.
    pub fn publish_events(&self) -> &EventCollection<T> {
        &self.publish
    }

    /// The discrete-update events.
    pub fn discrete_update_events(&self) -> &EventCollection<T> {
        &self.discrete_update
    }

    /// The unrestricted-update events.
    pub fn unrestricted_update_events(&self) -> &EventCollection<T> {
        &self.unrestricted_update
    }

    /// Whether any of the three lists holds an event.
    pub fn has_events(&self) -> bool {
        self.publish.has_events()
            || self.discrete_update.has_events()
            || self.unrestricted_update.has_events()
    }

    /// Total number of events across the three lists.
    pub fn num_events(&self) -> usize {
        self.publish.len() + self.discrete_update.len() + self.unrestricted_update.len()
    }

    /// Drop all events from all three lists.
    pub fn clear(&mut self) {
        self.publish.clear();
        self.discrete_update.clear();
        self.unrestricted_update.clear();
    }

    /// Replace all three lists with clones of another composite's.
    pub fn set_from(&mut self, other: &CompositeEventCollection<T>) {
        // Per-kind copies between composites always have matching kinds.
        self.publish
            .set_from(&other.publish)
            .expect("publish kinds match");
        self.discrete_update
            .set_from(&other.discrete_update)
            .expect("discrete-update kinds match");
        self.unrestricted_update
            .set_from(&other.unrestricted_update)
            .expect("unrestricted-update kinds match");
    }
}

impl<T: Scalar> Default for CompositeEventCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventAction, TriggerType};
    use weft_core::EventStatus;

    fn publish_event() -> Rc<Event<f64>> {
        Rc::new(Event::new(
            TriggerType::Forced,
            EventAction::Publish(Box::new(|_| EventStatus::succeeded())),
        ))
    }

    fn discrete_event() -> Rc<Event<f64>> {
        Rc::new(Event::new(
            TriggerType::Forced,
            EventAction::DiscreteUpdate(Box::new(|_, _| EventStatus::succeeded())),
        ))
    }

    #[test]
    fn collection_rejects_mismatched_kind() {
        let mut publishes = EventCollection::<f64>::new(EventKind::Publish);
        publishes.add(publish_event()).unwrap();
        let err = publishes.add(discrete_event()).unwrap_err();
        assert!(matches!(err, DeclarationError::EventKindMismatch { .. }));
        assert_eq!(publishes.len(), 1);
    }

    #[test]
    fn composite_routes_by_kind() {
        let mut composite = CompositeEventCollection::<f64>::new();
        composite.add_event(publish_event());
        composite.add_event(discrete_event());
        composite.add_event(publish_event());

        assert_eq!(composite.publish_events().len(), 2);
        assert_eq!(composite.discrete_update_events().len(), 1);
        assert!(composite.unrestricted_update_events().is_empty());
        assert_eq!(composite.num_events(), 3);
        assert!(composite.has_events());

        composite.clear();
        assert!(!composite.has_events());
    }

    #[test]
    fn set_from_copies_all_lists() {
        let mut source = CompositeEventCollection::<f64>::new();
        source.add_event(publish_event());
        source.add_event(discrete_event());

        let mut dest = CompositeEventCollection::<f64>::new();
        dest.set_from(&source);
        assert_eq!(dest.num_events(), 2);
    }
}
