//! Event records: timing, trigger, and the tagged-union action.

use std::fmt;
use std::hash::{Hash, Hasher};

use weft_context::{Context, DiscreteState, State};
use weft_core::{DeclarationError, EventStatus, Scalar};

/// The (offset, period) timing of a periodic event, in seconds.
///
/// Offset is non-negative and period strictly positive, both finite;
/// [`PeriodicTiming::new`] rejects anything else. Distinct events may
/// share a timing, and events are grouped by exact timing for both
/// next-time computation and timing-uniqueness queries, so the type is
/// usable as a map key.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PeriodicTiming {
    offset_sec: f64,
    period_sec: f64,
}

impl PeriodicTiming {
    /// Validate and create a timing.
    pub fn new(offset_sec: f64, period_sec: f64) -> Result<Self, DeclarationError> {
        if !offset_sec.is_finite()
            || offset_sec < 0.0
            || !period_sec.is_finite()
            || period_sec <= 0.0
        {
            return Err(DeclarationError::InvalidPeriodicTiming {
                offset_sec,
                period_sec,
            });
        }
        // Normalize -0.0 so bit-exact grouping treats it as 0.0.
        let offset_sec = if offset_sec == 0.0 { 0.0 } else { offset_sec };
        Ok(Self {
            offset_sec,
            period_sec,
        })
    }

    /// The first sample time, in seconds.
    pub fn offset_sec(&self) -> f64 {
        self.offset_sec
    }

    /// The sampling period, in seconds.
    pub fn period_sec(&self) -> f64 {
        self.period_sec
    }
}

// Validation excludes NaN, so equality is reflexive.
impl Eq for PeriodicTiming {}

impl Hash for PeriodicTiming {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.offset_sec.to_bits().hash(state);
        self.period_sec.to_bits().hash(state);
    }
}

impl fmt::Display for PeriodicTiming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(offset {}, period {})", self.offset_sec, self.period_sec)
    }
}

/// How an event comes due.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TriggerType {
    /// Recurs at a fixed offset and period.
    Periodic(PeriodicTiming),
    /// Due on every simulation step.
    PerStep,
    /// Due once, when the simulation initializes.
    Initialization,
    /// Due only when explicitly forced by the caller.
    Forced,
    /// Due when a witness function's sign change is detected. Detection
    /// itself is an external collaborator; only dispatch plumbing lives
    /// here.
    Witness,
}

impl TriggerType {
    /// The periodic timing, when this trigger is periodic.
    pub fn periodic_timing(&self) -> Option<&PeriodicTiming> {
        match self {
            Self::Periodic(timing) => Some(timing),
            _ => None,
        }
    }
}

/// A publish handler: reads the context, mutates nothing.
pub type PublishFn<T> = Box<dyn Fn(&Context<T>) -> EventStatus>;

/// A discrete-update handler: reads the context, writes the shared
/// discrete-state output buffer in place.
pub type DiscreteUpdateFn<T> = Box<dyn Fn(&Context<T>, &mut DiscreteState<T>) -> EventStatus>;

/// An unrestricted-update handler: reads the context, writes the shared
/// full-state output buffer in place.
pub type UnrestrictedUpdateFn<T> = Box<dyn Fn(&Context<T>, &mut State<T>) -> EventStatus>;

/// The three disjoint event kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Reads the context; may not modify state.
    Publish,
    /// Updates discrete state through an output buffer.
    DiscreteUpdate,
    /// Updates the full state through an output buffer.
    UnrestrictedUpdate,
}

impl EventKind {
    /// Lowercase name for error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Publish => "publish",
            Self::DiscreteUpdate => "discrete-update",
            Self::UnrestrictedUpdate => "unrestricted-update",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The handler of an event, tagged by kind.
///
/// Dispatch is a small match over this union; there is no virtual
/// handler hierarchy.
pub enum EventAction<T: Scalar> {
    /// A publish handler.
    Publish(PublishFn<T>),
    /// A discrete-update handler.
    DiscreteUpdate(DiscreteUpdateFn<T>),
    /// An unrestricted-update handler.
    UnrestrictedUpdate(UnrestrictedUpdateFn<T>),
}

impl<T: Scalar> EventAction<T> {
    /// The kind this action belongs to.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Publish(_) => EventKind::Publish,
            Self::DiscreteUpdate(_) => EventKind::DiscreteUpdate,
            Self::UnrestrictedUpdate(_) => EventKind::UnrestrictedUpdate,
        }
    }
}

impl<T: Scalar> fmt::Debug for EventAction<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventAction::{:?}", self.kind())
    }
}

/// An immutable trigger-plus-handler record.
///
/// Registered on a node at declaration time and shared (via `Rc`) into
/// the transient composite collections a scheduling query produces.
#[derive(Debug)]
pub struct Event<T: Scalar> {
    trigger: TriggerType,
    action: EventAction<T>,
}

impl<T: Scalar> Event<T> {
    /// Create an event.
    pub fn new(trigger: TriggerType, action: EventAction<T>) -> Self {
        Self { trigger, action }
    }

    /// The trigger condition.
    pub fn trigger(&self) -> &TriggerType {
        &self.trigger
    }

    /// The handler, tagged by kind.
    pub fn action(&self) -> &EventAction<T> {
        &self.action
    }

    /// The event's kind.
    pub fn kind(&self) -> EventKind {
        self.action.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timing_validation() {
        assert!(PeriodicTiming::new(0.0, 0.1).is_ok());
        assert!(PeriodicTiming::new(2.5, 1.0).is_ok());
        assert!(PeriodicTiming::new(-0.1, 1.0).is_err());
        assert!(PeriodicTiming::new(0.0, 0.0).is_err());
        assert!(PeriodicTiming::new(0.0, -1.0).is_err());
        assert!(PeriodicTiming::new(f64::NAN, 1.0).is_err());
        assert!(PeriodicTiming::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn negative_zero_offset_groups_with_zero() {
        let a = PeriodicTiming::new(0.0, 1.0).unwrap();
        let b = PeriodicTiming::new(-0.0, 1.0).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.offset_sec().to_bits(), b.offset_sec().to_bits());
    }

    #[test]
    fn action_kind_tags() {
        let action: EventAction<f64> = EventAction::Publish(Box::new(|_| EventStatus::succeeded()));
        assert_eq!(action.kind(), EventKind::Publish);
        let event = Event::new(TriggerType::Forced, action);
        assert_eq!(event.kind(), EventKind::Publish);
        assert!(event.trigger().periodic_timing().is_none());
    }
}
