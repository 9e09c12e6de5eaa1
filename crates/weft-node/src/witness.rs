//! Witness functions: dispatch plumbing for sign-change triggers.
//!
//! A witness function is a scalar function of the context whose sign
//! change marks an event trigger. Detection (root isolation during
//! integration) is an external collaborator; this module carries the
//! declaration record and the plumbing that routes a triggered witness's
//! attached event into a composite collection.

use std::rc::Rc;

use weft_context::Context;
use weft_core::Scalar;
use weft_events::{CompositeEventCollection, Event};

/// Which sign change of the witness value constitutes a trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WitnessDirection {
    /// Trigger when the value goes from positive to non-positive.
    PositiveThenNonPositive,
    /// Trigger when the value goes from negative to non-negative.
    NegativeThenNonNegative,
    /// Trigger on any zero crossing.
    CrossesZero,
}

/// Evaluates the witness value from a context.
pub type WitnessCalcFn<T> = Box<dyn Fn(&Context<T>) -> T>;

/// A declared witness function with an optional attached event.
///
/// When the detector reports a trigger, the attached event (if any) is
/// routed into the step's composite collection for ordinary dispatch.
pub struct WitnessFunction<T: Scalar> {
    description: String,
    direction: WitnessDirection,
    calc: WitnessCalcFn<T>,
    event: Option<Rc<Event<T>>>,
}

impl<T: Scalar> WitnessFunction<T> {
    pub(crate) fn new(
        description: String,
        direction: WitnessDirection,
        calc: WitnessCalcFn<T>,
        event: Option<Rc<Event<T>>>,
    ) -> Self {
        Self {
            description,
            direction,
            calc,
            event,
        }
    }

    /// The witness's description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The trigger direction.
    pub fn direction(&self) -> WitnessDirection {
        self.direction
    }

    /// Evaluate the witness value.
    pub fn calc_value(&self, context: &Context<T>) -> T {
        (self.calc)(context)
    }

    /// The attached event, if any.
    pub fn event(&self) -> Option<&Rc<Event<T>>> {
        self.event.as_ref()
    }

    /// Route the attached event into `events` for dispatch.
    ///
    /// A witness without an attached event routes nothing; the detector
    /// then only reports the crossing.
    pub fn add_triggered_event_to(&self, events: &mut CompositeEventCollection<T>) {
        if let Some(event) = &self.event {
            events.add_event(Rc::clone(event));
        }
    }
}

impl<T: Scalar> std::fmt::Debug for WitnessFunction<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WitnessFunction")
            .field("description", &self.description)
            .field("direction", &self.direction)
            .field("has_event", &self.event.is_some())
            .finish_non_exhaustive()
    }
}
