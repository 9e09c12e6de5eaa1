//! Update-event dispatch: publish, discrete update, unrestricted update.
//!
//! Each dispatcher runs the handlers of one due-event collection against
//! a context and combines the per-handler statuses by severity. The
//! short-circuit rules differ by kind and the asymmetry is intentional:
//! publish handlers all run regardless of earlier failures, while
//! discrete and unrestricted updates stop at the first failure because
//! later handlers would observe a half-written output buffer. Commits
//! are separate calls so a caller can inspect the combined status before
//! overwriting the context.

use weft_context::{Context, DiscreteState, State};
use weft_core::{DeclarationError, EventStatus, Scalar};
use weft_events::{EventAction, EventCollection, EventKind};

use crate::node::LeafNode;

impl<T: Scalar> LeafNode<T> {
    /// Run every publish handler in `events` against the unmodified
    /// context.
    ///
    /// All handlers run; the combined status reports the most severe
    /// outcome, with the first failure's message winning ties.
    pub fn dispatch_publish(&self, context: &Context<T>, events: &EventCollection<T>) -> EventStatus {
        debug_assert_eq!(events.kind(), EventKind::Publish);
        let mut overall = EventStatus::did_nothing();
        for event in events.iter() {
            match event.action() {
                EventAction::Publish(handler) => overall.keep_more_severe(handler(context)),
                _ => unreachable!("kind checked at insertion"),
            }
        }
        overall
    }

    /// Run the discrete-update handlers in `events`, mutating `discrete`
    /// in place.
    ///
    /// The buffer is seeded from the context's current discrete state,
    /// then each handler is applied in order to the shared buffer.
    /// Iteration stops as soon as the combined status reaches failed;
    /// subsequent handlers are skipped.
    pub fn dispatch_discrete_update(
        &self,
        context: &Context<T>,
        events: &EventCollection<T>,
        discrete: &mut DiscreteState<T>,
    ) -> Result<EventStatus, DeclarationError> {
        debug_assert_eq!(events.kind(), EventKind::DiscreteUpdate);
        discrete.set_from(context.state().discrete())?;

        let mut overall = EventStatus::did_nothing();
        for event in events.iter() {
            match event.action() {
                EventAction::DiscreteUpdate(handler) => {
                    overall.keep_more_severe(handler(context, discrete));
                }
                _ => unreachable!("kind checked at insertion"),
            }
            if overall.is_failed() {
                break;
            }
        }
        Ok(overall)
    }

    /// Commit a discrete-update output buffer into the context.
    pub fn apply_discrete_update(
        &self,
        discrete: &DiscreteState<T>,
        context: &mut Context<T>,
    ) -> Result<(), DeclarationError> {
        context.discrete_state_mut().set_from(discrete)
    }

    /// Run the unrestricted-update handlers in `events`, mutating
    /// `state` in place.
    ///
    /// Identical discipline to the discrete update, over the full state
    /// (continuous, discrete, and abstract), seeded from the context's
    /// current complete state.
    pub fn dispatch_unrestricted_update(
        &self,
        context: &Context<T>,
        events: &EventCollection<T>,
        state: &mut State<T>,
    ) -> Result<EventStatus, DeclarationError> {
        debug_assert_eq!(events.kind(), EventKind::UnrestrictedUpdate);
        state.set_from(context.state())?;

        let mut overall = EventStatus::did_nothing();
        for event in events.iter() {
            match event.action() {
                EventAction::UnrestrictedUpdate(handler) => {
                    overall.keep_more_severe(handler(context, state));
                }
                _ => unreachable!("kind checked at insertion"),
            }
            if overall.is_failed() {
                break;
            }
        }
        Ok(overall)
    }

    /// Commit an unrestricted-update output buffer into the context.
    pub fn apply_unrestricted_update(
        &self,
        state: &State<T>,
        context: &mut Context<T>,
    ) -> Result<(), DeclarationError> {
        context.state_mut().set_from(state)
    }
}
