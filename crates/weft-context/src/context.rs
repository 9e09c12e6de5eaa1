//! The [`Context`] bundle.
//!
//! A context owns everything needed to evaluate one node instance:
//! time, optional accuracy, state, parameters, fixed input values, the
//! dependency graph, and the cache value store. Mutating accessors
//! notify the corresponding trackers *before* handing out the mutable
//! borrow, so dependent cache values are stale by the time new data can
//! be observed.
//!
//! Contexts are exclusively owned and not safe for concurrent mutation;
//! distinct contexts manufactured from the same node are fully
//! independent.

use weft_core::{AbstractValue, ChangeEventId, InputPortIndex, Scalar, Ticket};

use crate::cache::Cache;
use crate::graph::DependencyGraph;
use crate::parameters::Parameters;
use crate::state::{ContinuousState, DiscreteState, State};

/// The complete instantiated data needed to evaluate a node.
#[derive(Debug)]
pub struct Context<T: Scalar> {
    time: T,
    accuracy: Option<f64>,
    state: State<T>,
    parameters: Parameters<T>,
    input_values: Vec<Option<Box<dyn AbstractValue>>>,
    graph: DependencyGraph,
    cache: Cache,
}

impl<T: Scalar> Context<T> {
    /// Assemble a context. Time starts at zero; no inputs are fixed.
    ///
    /// Called by a node's allocator, which wires the graph and sizes the
    /// cache to the declared schema before handing both in.
    pub fn new(
        state: State<T>,
        parameters: Parameters<T>,
        num_input_ports: usize,
        graph: DependencyGraph,
        cache: Cache,
    ) -> Self {
        Self {
            time: T::ZERO,
            accuracy: None,
            state,
            parameters,
            input_values: (0..num_input_ports).map(|_| None).collect(),
            graph,
            cache,
        }
    }

    /// The current time.
    pub fn time(&self) -> T {
        self.time
    }

    /// Set the time, invalidating time-dependent cache values.
    pub fn set_time(&mut self, time: T) {
        self.note_change(Ticket::Time);
        self.time = time;
    }

    /// The accuracy setting, if one has been supplied.
    pub fn accuracy(&self) -> Option<f64> {
        self.accuracy
    }

    /// Set or clear the accuracy setting.
    pub fn set_accuracy(&mut self, accuracy: Option<f64>) {
        self.note_change(Ticket::Accuracy);
        self.accuracy = accuracy;
    }

    /// The complete state.
    pub fn state(&self) -> &State<T> {
        &self.state
    }

    /// The parameters.
    pub fn parameters(&self) -> &Parameters<T> {
        &self.parameters
    }

    /// Mutable continuous state; dependents are invalidated.
    pub fn continuous_state_mut(&mut self) -> &mut ContinuousState<T> {
        self.note_change(Ticket::ContinuousState);
        self.state.continuous_mut()
    }

    /// Mutable discrete state; every group's dependents are invalidated.
    pub fn discrete_state_mut(&mut self) -> &mut DiscreteState<T> {
        let tickets: Vec<Ticket> = (0..self.state.discrete().num_groups())
            .map(|i| Ticket::DiscreteState((i as u32).into()))
            .collect();
        self.note_changes(tickets);
        self.state.discrete_mut()
    }

    /// Mutable complete state; every state dependent is invalidated.
    pub fn state_mut(&mut self) -> &mut State<T> {
        let mut tickets = vec![Ticket::ContinuousState];
        tickets.extend(
            (0..self.state.discrete().num_groups())
                .map(|i| Ticket::DiscreteState((i as u32).into())),
        );
        tickets.extend(
            (0..self.state.abstract_state().len())
                .map(|i| Ticket::AbstractState((i as u32).into())),
        );
        self.note_changes(tickets);
        &mut self.state
    }

    /// Mutable parameters; every parameter dependent is invalidated.
    pub fn parameters_mut(&mut self) -> &mut Parameters<T> {
        let mut tickets: Vec<Ticket> = (0..self.parameters.num_numeric_groups())
            .map(|i| Ticket::NumericParameter((i as u32).into()))
            .collect();
        tickets.extend(
            (0..self.parameters.num_abstract())
                .map(|i| Ticket::AbstractParameter((i as u32).into())),
        );
        self.note_changes(tickets);
        &mut self.parameters
    }

    /// Number of input ports the owning node declares.
    pub fn num_input_ports(&self) -> usize {
        self.input_values.len()
    }

    /// Fix an input port to a concrete value, invalidating dependents.
    ///
    /// Panics if `port` is out of range for the owning node.
    pub fn fix_input_port(&mut self, port: InputPortIndex, value: Box<dyn AbstractValue>) {
        self.note_change(Ticket::InputPort(port));
        self.input_values[port.0 as usize] = Some(value);
    }

    /// The fixed value of an input port, if one has been supplied.
    pub fn input_value(&self, port: InputPortIndex) -> Option<&dyn AbstractValue> {
        self.input_values
            .get(port.0 as usize)
            .and_then(|v| v.as_deref())
    }

    /// The cache value store.
    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Mutable cache value store.
    ///
    /// Cache flags *are* the tracking substrate, so no notification
    /// happens here.
    pub fn cache_mut(&mut self) -> &mut Cache {
        &mut self.cache
    }

    /// Allocate a fresh change-event number.
    pub fn start_new_change_event(&mut self) -> ChangeEventId {
        self.graph.start_new_change_event()
    }

    /// Propagate a value-change notification for `ticket` under an
    /// existing change event, marking every downstream cache value out
    /// of date.
    pub fn note_value_change(&mut self, ticket: Ticket, event: ChangeEventId) {
        for index in self.graph.note_value_change(ticket, event) {
            self.cache.entry_mut(index).mark_out_of_date();
        }
    }

    /// Start a change event and notify one ticket under it.
    pub fn note_change(&mut self, ticket: Ticket) {
        let event = self.start_new_change_event();
        self.note_value_change(ticket, event);
    }

    fn note_changes(&mut self, tickets: impl IntoIterator<Item = Ticket>) {
        let event = self.start_new_change_event();
        for ticket in tickets {
            self.note_value_change(ticket, event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AbstractState;
    use weft_core::{CacheIndex, DenseVector, Value, VectorBase};

    fn test_context() -> Context<f64> {
        // One cache entry subscribed to time, one to input port 0.
        let mut graph = DependencyGraph::new();
        graph.subscribe(Ticket::Cache(CacheIndex(0)), Ticket::Time);
        graph.subscribe(Ticket::Cache(CacheIndex(1)), Ticket::InputPort(InputPortIndex(0)));
        graph.set_cache_index(Ticket::Cache(CacheIndex(0)), CacheIndex(0));
        graph.set_cache_index(Ticket::Cache(CacheIndex(1)), CacheIndex(1));

        let state = State::new(
            ContinuousState::new(Box::new(DenseVector::from_vec(vec![1.0, 2.0]))),
            DiscreteState::new(vec![Box::new(DenseVector::zeros(2)) as _]),
            AbstractState::empty(),
        );
        Context::new(state, Parameters::empty(), 1, graph, Cache::new(2))
    }

    #[test]
    fn set_time_invalidates_time_dependent_cache() {
        let mut ctx = test_context();
        ctx.cache_mut().entry_mut(CacheIndex(0)).mark_up_to_date();
        ctx.cache_mut().entry_mut(CacheIndex(1)).mark_up_to_date();

        ctx.set_time(3.5);
        assert_eq!(ctx.time(), 3.5);
        assert!(ctx.cache().entry(CacheIndex(0)).is_out_of_date());
        assert!(!ctx.cache().entry(CacheIndex(1)).is_out_of_date());
    }

    #[test]
    fn fix_input_invalidates_input_dependent_cache() {
        let mut ctx = test_context();
        ctx.cache_mut().entry_mut(CacheIndex(1)).mark_up_to_date();

        ctx.fix_input_port(InputPortIndex(0), Value::boxed(DenseVector::from_vec(vec![9.0])));
        assert!(ctx.cache().entry(CacheIndex(1)).is_out_of_date());
        assert!(ctx.input_value(InputPortIndex(0)).is_some());
    }

    #[test]
    fn unfixed_input_reads_none() {
        let ctx = test_context();
        assert!(ctx.input_value(InputPortIndex(0)).is_none());
    }

    #[test]
    fn mutable_state_access_is_observable() {
        let mut ctx = test_context();
        ctx.continuous_state_mut().vector_mut().set(0, 5.0);
        assert_eq!(ctx.state().continuous().vector().get(0), 5.0);
        ctx.discrete_state_mut().group_mut(0).fill(4.0);
        assert_eq!(ctx.state().discrete().group(0).as_slice().unwrap(), &[4.0, 4.0]);
    }
}
