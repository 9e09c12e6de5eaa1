//! The [`LeafNode`] type and its declaration API.
//!
//! A node is declared imperatively — parameters, state, ports, events,
//! constraints — and is read-only afterwards. Declaration order assigns
//! every index. The runtime surfaces (allocation, dispatch, scheduling,
//! feedthrough) live in the sibling modules as further `impl` blocks.

use std::rc::Rc;

use weft_context::Context;
use weft_core::{
    AbstractParameterIndex, AbstractStateIndex, AbstractValue, CacheIndex, ComputeError,
    ContinuousStateIndex, DeclarationError, DenseVector, DiscreteStateIndex, EventStatus,
    InputPortIndex, NumericParameterIndex, OutputPortIndex, Scalar, Ticket, TicketSet, Value,
    VectorBase,
};
use weft_context::{DiscreteState, State};
use weft_events::{
    CompositeEventCollection, Event, EventAction, EventCollection, EventKind, PeriodicTiming,
    TriggerType,
};

use crate::cache_entry::{AllocateFn, CacheEntry, CalcFn};
use crate::constraint::{Constraint, ConstraintBounds, ConstraintIndex};
use crate::model::ModelRegistry;
use crate::port::{InputPort, OutputPort, PortDataType};
use crate::symbolic::InspectorFactory;
use crate::witness::{WitnessCalcFn, WitnessDirection, WitnessFunction};

/// Validates an allocated context; returns a violation description on
/// failure.
pub type ContextValidatorFn<T> = Box<dyn Fn(&Context<T>) -> Result<(), String>>;

/// An atomic node of a block-diagram model: its own state, parameters,
/// and ports, with dependency-tracked output caching and event
/// scheduling.
pub struct LeafNode<T: Scalar> {
    pub(crate) name: String,
    pub(crate) models: ModelRegistry<T>,
    pub(crate) input_ports: Vec<InputPort>,
    pub(crate) output_ports: Vec<OutputPort>,
    pub(crate) cache_entries: Vec<CacheEntry<T>>,
    pub(crate) periodic_events: CompositeEventCollection<T>,
    pub(crate) per_step_events: CompositeEventCollection<T>,
    pub(crate) initialization_events: CompositeEventCollection<T>,
    pub(crate) forced_publish_events: EventCollection<T>,
    pub(crate) forced_discrete_update_events: EventCollection<T>,
    pub(crate) forced_unrestricted_update_events: EventCollection<T>,
    pub(crate) constraints: Vec<Constraint<T>>,
    pub(crate) context_validator: Option<ContextValidatorFn<T>>,
    pub(crate) inspector_factory: Option<InspectorFactory<T>>,
}

impl<T: Scalar> LeafNode<T> {
    /// Create a node with an empty schema.
    ///
    /// The three forced event collections are seeded empty and can be
    /// extended (`declare_forced_*`) or replaced (`set_forced_*_events`).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            models: ModelRegistry::new(),
            input_ports: Vec::new(),
            output_ports: Vec::new(),
            cache_entries: Vec::new(),
            periodic_events: CompositeEventCollection::new(),
            per_step_events: CompositeEventCollection::new(),
            initialization_events: CompositeEventCollection::new(),
            forced_publish_events: EventCollection::new(EventKind::Publish),
            forced_discrete_update_events: EventCollection::new(EventKind::DiscreteUpdate),
            forced_unrestricted_update_events: EventCollection::new(EventKind::UnrestrictedUpdate),
            constraints: Vec::new(),
            context_validator: None,
            inspector_factory: None,
        }
    }

    /// The node's name, used in diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The node's model registry.
    pub fn models(&self) -> &ModelRegistry<T> {
        &self.models
    }

    /// Number of declared input ports.
    pub fn num_input_ports(&self) -> usize {
        self.input_ports.len()
    }

    /// Number of declared output ports.
    pub fn num_output_ports(&self) -> usize {
        self.output_ports.len()
    }

    /// The input port at `index`, if declared.
    pub fn input_port(&self, index: InputPortIndex) -> Option<&InputPort> {
        self.input_ports.get(index.0 as usize)
    }

    /// The output port at `index`, if declared.
    pub fn output_port(&self, index: OutputPortIndex) -> Option<&OutputPort> {
        self.output_ports.get(index.0 as usize)
    }

    /// The cache entry at `index`, if declared.
    pub fn cache_entry(&self, index: CacheIndex) -> Option<&CacheEntry<T>> {
        self.cache_entries.get(index.0 as usize)
    }

    // ── Parameters and state ───────────────────────────────────────

    /// Declare a numeric parameter group from a model vector.
    ///
    /// Finite element bounds on the model auto-derive an inequality
    /// constraint over the bounded elements.
    pub fn declare_numeric_parameter(
        &mut self,
        model: impl VectorBase<T> + 'static,
    ) -> NumericParameterIndex {
        let index = NumericParameterIndex(self.models.num_numeric_parameters() as u32);
        let group = index.0 as usize;
        self.maybe_declare_vector_bounds_constraint(
            format!("parameter {index}"),
            &model,
            move |context, i| context.parameters().numeric(group).get(i),
        );
        self.models.add_numeric_parameter_model(Box::new(model))
    }

    /// Declare an abstract parameter from a model value.
    pub fn declare_abstract_parameter(
        &mut self,
        model: Box<dyn AbstractValue>,
    ) -> AbstractParameterIndex {
        self.models.add_abstract_parameter_model(model)
    }

    /// Declare `num_state_variables` continuous-state variables,
    /// zero-initialized.
    pub fn declare_continuous_state(&mut self, num_state_variables: usize) -> ContinuousStateIndex {
        self.declare_continuous_state_model(DenseVector::zeros(num_state_variables))
    }

    /// Declare continuous state from a model vector.
    ///
    /// Only the last declaration takes effect; continuous state is a
    /// single partition and does not accumulate.
    pub fn declare_continuous_state_model(
        &mut self,
        model: impl VectorBase<T> + 'static,
    ) -> ContinuousStateIndex {
        self.maybe_declare_vector_bounds_constraint(
            "continuous state".to_string(),
            &model,
            |context, i| context.state().continuous().vector().get(i),
        );
        self.models.set_continuous_state_model(Box::new(model));
        ContinuousStateIndex(0)
    }

    /// Declare a discrete-state group from a model vector.
    pub fn declare_discrete_state(
        &mut self,
        model: impl VectorBase<T> + 'static,
    ) -> DiscreteStateIndex {
        let index = DiscreteStateIndex(self.models.num_discrete_groups() as u32);
        let group = index.0 as usize;
        self.maybe_declare_vector_bounds_constraint(
            format!("discrete state group {index}"),
            &model,
            move |context, i| context.state().discrete().group(group).get(i),
        );
        self.models.add_discrete_state_model(Box::new(model))
    }

    /// Declare a discrete-state group of `num_state_variables` zeros.
    pub fn declare_discrete_state_sized(&mut self, num_state_variables: usize) -> DiscreteStateIndex {
        self.declare_discrete_state(DenseVector::zeros(num_state_variables))
    }

    /// Declare an abstract-state slot from a model value.
    pub fn declare_abstract_state(&mut self, model: Box<dyn AbstractValue>) -> AbstractStateIndex {
        self.models.add_abstract_state_model(model)
    }

    // ── Input ports ────────────────────────────────────────────────

    /// Declare a vector input port with a model value used to
    /// default-fill the port when unconnected.
    pub fn declare_vector_input_port(
        &mut self,
        name: impl Into<String>,
        model: impl VectorBase<T> + 'static,
    ) -> InputPortIndex {
        let name = name.into();
        let index = InputPortIndex(self.input_ports.len() as u32);
        let size = model.len();
        let dense = model.to_dense();
        let fallback = dense.clone();
        self.maybe_declare_vector_bounds_constraint(
            format!("input {index} ({name})"),
            &model,
            move |context, i| {
                context
                    .input_value(index)
                    .and_then(|value| value.downcast_ref::<DenseVector<T>>())
                    .map(|vector| vector.get(i))
                    .unwrap_or_else(|| fallback.get(i))
            },
        );
        self.models.add_input_port_model(Some(Value::boxed(dense)));
        self.input_ports
            .push(InputPort::new(index, name, PortDataType::Vector { size }));
        index
    }

    /// Declare a vector input port by size only; the default fill is a
    /// zero vector of that size.
    pub fn declare_vector_input_port_sized(
        &mut self,
        name: impl Into<String>,
        size: usize,
    ) -> InputPortIndex {
        let index = InputPortIndex(self.input_ports.len() as u32);
        self.models.add_input_port_model(None);
        self.input_ports
            .push(InputPort::new(index, name.into(), PortDataType::Vector { size }));
        index
    }

    /// Declare an abstract input port.
    ///
    /// The model is optional at declaration, but allocating a value for
    /// a model-less abstract port is a declaration error — there is no
    /// analogous default to a zero vector.
    pub fn declare_abstract_input_port(
        &mut self,
        name: impl Into<String>,
        model: Option<Box<dyn AbstractValue>>,
    ) -> InputPortIndex {
        let index = InputPortIndex(self.input_ports.len() as u32);
        self.models.add_input_port_model(model);
        self.input_ports
            .push(InputPort::new(index, name.into(), PortDataType::Abstract));
        index
    }

    // ── Output ports ───────────────────────────────────────────────

    /// Declare a vector output port with an explicit, non-empty
    /// prerequisite set.
    pub fn declare_vector_output_port(
        &mut self,
        name: impl Into<String>,
        model: DenseVector<T>,
        calc: impl Fn(&Context<T>, &mut DenseVector<T>) -> Result<(), ComputeError> + 'static,
        prerequisites: TicketSet,
    ) -> Result<OutputPortIndex, DeclarationError> {
        self.create_vector_output_port(name.into(), model, Box::new(calc), prerequisites, false)
    }

    /// Declare a vector output port with the library-default
    /// prerequisite set `{AllSources}`.
    ///
    /// The default carries no dependency information: feedthrough
    /// analysis cannot use graph probing for such a port and falls back
    /// to symbolic analysis or a conservative answer.
    pub fn declare_vector_output_port_with_default_prerequisites(
        &mut self,
        name: impl Into<String>,
        model: DenseVector<T>,
        calc: impl Fn(&Context<T>, &mut DenseVector<T>) -> Result<(), ComputeError> + 'static,
    ) -> Result<OutputPortIndex, DeclarationError> {
        self.create_vector_output_port(
            name.into(),
            model,
            Box::new(calc),
            TicketSet::single(Ticket::AllSources),
            true,
        )
    }

    /// Declare an abstract output port with an explicit, non-empty
    /// prerequisite set.
    pub fn declare_abstract_output_port(
        &mut self,
        name: impl Into<String>,
        alloc: impl Fn() -> Box<dyn AbstractValue> + 'static,
        calc: impl Fn(&Context<T>, &mut dyn AbstractValue) -> Result<(), ComputeError> + 'static,
        prerequisites: TicketSet,
    ) -> Result<OutputPortIndex, DeclarationError> {
        self.create_cached_output_port(
            name.into(),
            PortDataType::Abstract,
            Box::new(alloc),
            Box::new(calc),
            prerequisites,
            false,
        )
    }

    /// Declare an abstract output port with the library-default
    /// prerequisite set `{AllSources}`.
    pub fn declare_abstract_output_port_with_default_prerequisites(
        &mut self,
        name: impl Into<String>,
        alloc: impl Fn() -> Box<dyn AbstractValue> + 'static,
        calc: impl Fn(&Context<T>, &mut dyn AbstractValue) -> Result<(), ComputeError> + 'static,
    ) -> Result<OutputPortIndex, DeclarationError> {
        self.create_cached_output_port(
            name.into(),
            PortDataType::Abstract,
            Box::new(alloc),
            Box::new(calc),
            TicketSet::single(Ticket::AllSources),
            true,
        )
    }

    /// Declare an output port that copies the continuous-state vector.
    ///
    /// The only allowed index is 0; the prerequisite set is exactly the
    /// continuous-state ticket.
    pub fn declare_continuous_state_output_port(
        &mut self,
        name: impl Into<String>,
        state_index: ContinuousStateIndex,
    ) -> Result<OutputPortIndex, DeclarationError> {
        if state_index != ContinuousStateIndex(0) {
            return Err(DeclarationError::InvalidContinuousStateIndex { index: state_index });
        }
        let model = self.models.continuous_state_model().to_dense();
        self.declare_vector_output_port(
            name,
            model,
            |context, output| {
                output
                    .set_from(context.state().continuous().vector())
                    .expect("continuous state size fixed at declaration");
                Ok(())
            },
            TicketSet::single(Ticket::ContinuousState),
        )
    }

    /// Declare an output port that copies one discrete-state group.
    pub fn declare_discrete_state_output_port(
        &mut self,
        name: impl Into<String>,
        state_index: DiscreteStateIndex,
    ) -> Result<OutputPortIndex, DeclarationError> {
        let count = self.models.num_discrete_groups();
        let model = self
            .models
            .discrete_state_model(state_index)
            .ok_or(DeclarationError::InvalidDiscreteStateIndex {
                index: state_index,
                count,
            })?
            .to_dense();
        let group = state_index.0 as usize;
        self.declare_vector_output_port(
            name,
            model,
            move |context, output| {
                output
                    .set_from(context.state().discrete().group(group))
                    .expect("discrete group size fixed at declaration");
                Ok(())
            },
            TicketSet::single(Ticket::DiscreteState(state_index)),
        )
    }

    /// Declare an output port that copies one abstract-state slot.
    pub fn declare_abstract_state_output_port(
        &mut self,
        name: impl Into<String>,
        state_index: AbstractStateIndex,
    ) -> Result<OutputPortIndex, DeclarationError> {
        let count = self.models.num_abstract_states();
        let model = self.models.clone_abstract_state_model(state_index).ok_or(
            DeclarationError::InvalidAbstractStateIndex {
                index: state_index,
                count,
            },
        )?;
        let slot = state_index.0 as usize;
        self.declare_abstract_output_port(
            name,
            move || model.clone(),
            move |context, output| output.set_from(context.state().abstract_state().value(slot)),
            TicketSet::single(Ticket::AbstractState(state_index)),
        )
    }

    fn create_vector_output_port(
        &mut self,
        name: String,
        model: DenseVector<T>,
        calc: Box<dyn Fn(&Context<T>, &mut DenseVector<T>) -> Result<(), ComputeError>>,
        prerequisites: TicketSet,
        default_prerequisites: bool,
    ) -> Result<OutputPortIndex, DeclarationError> {
        let size = model.len();
        let index = OutputPortIndex(self.output_ports.len() as u32);
        let node_name = self.name.clone();
        let cache_calc: CalcFn<T> = Box::new(move |context, holder| {
            let actual = holder.type_name();
            match holder.downcast_mut::<DenseVector<T>>() {
                Some(vector) => calc(context, vector),
                None => Err(ComputeError::VectorTypeMismatch {
                    node: node_name.clone(),
                    output: index,
                    expected: std::any::type_name::<DenseVector<T>>(),
                    actual,
                }),
            }
        });
        let allocate: AllocateFn = Box::new(move || Value::boxed(model.clone()));
        self.create_cached_output_port(
            name,
            PortDataType::Vector { size },
            allocate,
            cache_calc,
            prerequisites,
            default_prerequisites,
        )
    }

    fn create_cached_output_port(
        &mut self,
        name: String,
        data_type: PortDataType,
        allocate: AllocateFn,
        calc: CalcFn<T>,
        prerequisites: TicketSet,
        default_prerequisites: bool,
    ) -> Result<OutputPortIndex, DeclarationError> {
        if prerequisites.is_empty() {
            return Err(DeclarationError::EmptyPrerequisites {
                node: self.name.clone(),
                output: name,
            });
        }
        let port_index = OutputPortIndex(self.output_ports.len() as u32);
        let cache_index = CacheIndex(self.cache_entries.len() as u32);
        let description = format!("output port {port_index} ({name}) cache");
        self.cache_entries.push(CacheEntry::new(
            cache_index,
            description,
            allocate,
            calc,
            prerequisites,
            default_prerequisites,
        ));
        self.output_ports
            .push(OutputPort::new(port_index, name, data_type, cache_index));
        Ok(port_index)
    }

    // ── Events ─────────────────────────────────────────────────────

    /// Declare a periodic publish event.
    pub fn declare_periodic_publish(
        &mut self,
        timing: PeriodicTiming,
        handler: impl Fn(&Context<T>) -> EventStatus + 'static,
    ) {
        self.periodic_events.add_event(Rc::new(Event::new(
            TriggerType::Periodic(timing),
            EventAction::Publish(Box::new(handler)),
        )));
    }

    /// Declare a periodic discrete-update event.
    pub fn declare_periodic_discrete_update(
        &mut self,
        timing: PeriodicTiming,
        handler: impl Fn(&Context<T>, &mut DiscreteState<T>) -> EventStatus + 'static,
    ) {
        self.periodic_events.add_event(Rc::new(Event::new(
            TriggerType::Periodic(timing),
            EventAction::DiscreteUpdate(Box::new(handler)),
        )));
    }

    /// Declare a periodic unrestricted-update event.
    pub fn declare_periodic_unrestricted_update(
        &mut self,
        timing: PeriodicTiming,
        handler: impl Fn(&Context<T>, &mut State<T>) -> EventStatus + 'static,
    ) {
        self.periodic_events.add_event(Rc::new(Event::new(
            TriggerType::Periodic(timing),
            EventAction::UnrestrictedUpdate(Box::new(handler)),
        )));
    }

    /// Declare a publish event due on every step.
    pub fn declare_per_step_publish(
        &mut self,
        handler: impl Fn(&Context<T>) -> EventStatus + 'static,
    ) {
        self.per_step_events.add_event(Rc::new(Event::new(
            TriggerType::PerStep,
            EventAction::Publish(Box::new(handler)),
        )));
    }

    /// Declare a discrete-update event due on every step.
    pub fn declare_per_step_discrete_update(
        &mut self,
        handler: impl Fn(&Context<T>, &mut DiscreteState<T>) -> EventStatus + 'static,
    ) {
        self.per_step_events.add_event(Rc::new(Event::new(
            TriggerType::PerStep,
            EventAction::DiscreteUpdate(Box::new(handler)),
        )));
    }

    /// Declare an unrestricted-update event due on every step.
    pub fn declare_per_step_unrestricted_update(
        &mut self,
        handler: impl Fn(&Context<T>, &mut State<T>) -> EventStatus + 'static,
    ) {
        self.per_step_events.add_event(Rc::new(Event::new(
            TriggerType::PerStep,
            EventAction::UnrestrictedUpdate(Box::new(handler)),
        )));
    }

    /// Declare a publish event due at initialization.
    pub fn declare_initialization_publish(
        &mut self,
        handler: impl Fn(&Context<T>) -> EventStatus + 'static,
    ) {
        self.initialization_events.add_event(Rc::new(Event::new(
            TriggerType::Initialization,
            EventAction::Publish(Box::new(handler)),
        )));
    }

    /// Declare a discrete-update event due at initialization.
    pub fn declare_initialization_discrete_update(
        &mut self,
        handler: impl Fn(&Context<T>, &mut DiscreteState<T>) -> EventStatus + 'static,
    ) {
        self.initialization_events.add_event(Rc::new(Event::new(
            TriggerType::Initialization,
            EventAction::DiscreteUpdate(Box::new(handler)),
        )));
    }

    /// Declare an unrestricted-update event due at initialization.
    pub fn declare_initialization_unrestricted_update(
        &mut self,
        handler: impl Fn(&Context<T>, &mut State<T>) -> EventStatus + 'static,
    ) {
        self.initialization_events.add_event(Rc::new(Event::new(
            TriggerType::Initialization,
            EventAction::UnrestrictedUpdate(Box::new(handler)),
        )));
    }

    /// Declare a publish event that fires only when explicitly forced.
    pub fn declare_forced_publish(
        &mut self,
        handler: impl Fn(&Context<T>) -> EventStatus + 'static,
    ) {
        self.forced_publish_events
            .add(Rc::new(Event::new(
                TriggerType::Forced,
                EventAction::Publish(Box::new(handler)),
            )))
            .expect("publish event kind matches collection");
    }

    /// Declare a discrete-update event that fires only when forced.
    pub fn declare_forced_discrete_update(
        &mut self,
        handler: impl Fn(&Context<T>, &mut DiscreteState<T>) -> EventStatus + 'static,
    ) {
        self.forced_discrete_update_events
            .add(Rc::new(Event::new(
                TriggerType::Forced,
                EventAction::DiscreteUpdate(Box::new(handler)),
            )))
            .expect("discrete-update event kind matches collection");
    }

    /// Declare an unrestricted-update event that fires only when forced.
    pub fn declare_forced_unrestricted_update(
        &mut self,
        handler: impl Fn(&Context<T>, &mut State<T>) -> EventStatus + 'static,
    ) {
        self.forced_unrestricted_update_events
            .add(Rc::new(Event::new(
                TriggerType::Forced,
                EventAction::UnrestrictedUpdate(Box::new(handler)),
            )))
            .expect("unrestricted-update event kind matches collection");
    }

    /// Replace the forced publish collection.
    pub fn set_forced_publish_events(
        &mut self,
        events: EventCollection<T>,
    ) -> Result<(), DeclarationError> {
        self.forced_publish_events.set_from(&events)
    }

    /// Replace the forced discrete-update collection.
    pub fn set_forced_discrete_update_events(
        &mut self,
        events: EventCollection<T>,
    ) -> Result<(), DeclarationError> {
        self.forced_discrete_update_events.set_from(&events)
    }

    /// Replace the forced unrestricted-update collection.
    pub fn set_forced_unrestricted_update_events(
        &mut self,
        events: EventCollection<T>,
    ) -> Result<(), DeclarationError> {
        self.forced_unrestricted_update_events.set_from(&events)
    }

    /// The node's periodic events, all three kinds.
    pub fn periodic_events(&self) -> &CompositeEventCollection<T> {
        &self.periodic_events
    }

    /// The node's per-step events.
    pub fn per_step_events(&self) -> &CompositeEventCollection<T> {
        &self.per_step_events
    }

    /// The node's initialization events.
    pub fn initialization_events(&self) -> &CompositeEventCollection<T> {
        &self.initialization_events
    }

    /// The node's forced publish events.
    pub fn forced_publish_events(&self) -> &EventCollection<T> {
        &self.forced_publish_events
    }

    /// The node's forced discrete-update events.
    pub fn forced_discrete_update_events(&self) -> &EventCollection<T> {
        &self.forced_discrete_update_events
    }

    /// The node's forced unrestricted-update events.
    pub fn forced_unrestricted_update_events(&self) -> &EventCollection<T> {
        &self.forced_unrestricted_update_events
    }

    /// A fresh collection seeded from the node's forced publish events.
    pub fn allocate_forced_publish_collection(&self) -> EventCollection<T> {
        self.forced_publish_events.clone()
    }

    /// A fresh collection seeded from the node's forced discrete-update
    /// events.
    pub fn allocate_forced_discrete_update_collection(&self) -> EventCollection<T> {
        self.forced_discrete_update_events.clone()
    }

    /// A fresh collection seeded from the node's forced
    /// unrestricted-update events.
    pub fn allocate_forced_unrestricted_update_collection(&self) -> EventCollection<T> {
        self.forced_unrestricted_update_events.clone()
    }

    // ── Constraints ────────────────────────────────────────────────

    /// Declare an inequality constraint.
    pub fn declare_inequality_constraint(
        &mut self,
        calc: impl Fn(&Context<T>, &mut Vec<T>) + 'static,
        bounds: ConstraintBounds,
        description: impl Into<String>,
    ) -> ConstraintIndex {
        let index = ConstraintIndex(self.constraints.len() as u32);
        self.constraints
            .push(Constraint::new(Box::new(calc), bounds, description.into()));
        index
    }

    /// Declare an equality constraint (`value == 0` elementwise).
    pub fn declare_equality_constraint(
        &mut self,
        calc: impl Fn(&Context<T>, &mut Vec<T>) + 'static,
        count: usize,
        description: impl Into<String>,
    ) -> ConstraintIndex {
        self.declare_inequality_constraint(calc, ConstraintBounds::equality(count), description)
    }

    /// Number of declared constraints.
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// The constraint at `index`, if declared.
    pub fn constraint(&self, index: ConstraintIndex) -> Option<&Constraint<T>> {
        self.constraints.get(index.0 as usize)
    }

    /// Auto-derive an inequality constraint from a model vector's
    /// element bounds. All-infinite (or absent) bounds declare nothing.
    fn maybe_declare_vector_bounds_constraint(
        &mut self,
        kind: String,
        model: &dyn VectorBase<T>,
        get_element: impl Fn(&Context<T>, usize) -> T + 'static,
    ) {
        let Some((lower, upper)) = model.element_bounds() else {
            return;
        };
        if lower.len() != model.len() || upper.len() != model.len() {
            return;
        }
        let indices: Vec<usize> = (0..model.len())
            .filter(|&i| lower[i].is_finite() || upper[i].is_finite())
            .collect();
        if indices.is_empty() {
            return;
        }
        let constrained_lower: Vec<f64> = indices.iter().map(|&i| lower[i]).collect();
        let constrained_upper: Vec<f64> = indices.iter().map(|&i| upper[i]).collect();
        let bounds = ConstraintBounds::inequality(constrained_lower, constrained_upper)
            .expect("bound vectors built with equal lengths");
        self.declare_inequality_constraint(
            move |context, value| {
                value.clear();
                for &i in &indices {
                    value.push(get_element(context, i));
                }
            },
            bounds,
            format!("{kind} bounds"),
        );
    }

    // ── Witness functions ──────────────────────────────────────────

    /// Create a witness function with no attached event.
    pub fn make_witness_function(
        &self,
        description: impl Into<String>,
        direction: WitnessDirection,
        calc: impl Fn(&Context<T>) -> T + 'static,
    ) -> WitnessFunction<T> {
        WitnessFunction::new(description.into(), direction, Box::new(calc), None)
    }

    /// Create a witness function whose trigger dispatches `action`.
    pub fn make_witness_function_with_event(
        &self,
        description: impl Into<String>,
        direction: WitnessDirection,
        calc: impl Fn(&Context<T>) -> T + 'static,
        action: EventAction<T>,
    ) -> WitnessFunction<T> {
        let calc: WitnessCalcFn<T> = Box::new(calc);
        let event = Rc::new(Event::new(TriggerType::Witness, action));
        WitnessFunction::new(description.into(), direction, calc, Some(event))
    }

    /// Evaluate a witness function against a context.
    pub fn calc_witness_value(&self, context: &Context<T>, witness: &WitnessFunction<T>) -> T {
        witness.calc_value(context)
    }

    // ── Hooks ──────────────────────────────────────────────────────

    /// Install a hook that validates every allocated context.
    ///
    /// The hook runs after the built-in contiguity checks; a returned
    /// description fails allocation with
    /// [`AllocationError::InvalidContext`](weft_core::AllocationError).
    pub fn set_context_validator(
        &mut self,
        validator: impl Fn(&Context<T>) -> Result<(), String> + 'static,
    ) {
        self.context_validator = Some(Box::new(validator));
    }

    /// Install the symbolic-inspector factory used as the feedthrough
    /// fallback. The factory may return `None` (silent failure).
    pub fn set_symbolic_inspector_factory(
        &mut self,
        factory: impl Fn(&LeafNode<T>) -> Option<Box<dyn crate::symbolic::SymbolicInspector>> + 'static,
    ) {
        self.inspector_factory = Some(Box::new(factory));
    }
}

impl<T: Scalar> std::fmt::Debug for LeafNode<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeafNode")
            .field("name", &self.name)
            .field("num_input_ports", &self.input_ports.len())
            .field("num_output_ports", &self.output_ports.len())
            .field("num_cache_entries", &self.cache_entries.len())
            .field("num_constraints", &self.constraints.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_prerequisites_rejected_singleton_accepted() {
        let mut node = LeafNode::<f64>::new("gain");
        let err = node
            .declare_vector_output_port(
                "y0",
                DenseVector::zeros(1),
                |_, _| Ok(()),
                TicketSet::empty(),
            )
            .unwrap_err();
        assert!(matches!(err, DeclarationError::EmptyPrerequisites { .. }));

        let port = node
            .declare_vector_output_port(
                "y0",
                DenseVector::zeros(1),
                |_, _| Ok(()),
                TicketSet::single(Ticket::Time),
            )
            .unwrap();
        assert_eq!(port, OutputPortIndex(0));
        assert_eq!(node.num_output_ports(), 1);
    }

    #[test]
    fn continuous_state_output_port_index_must_be_zero() {
        let mut node = LeafNode::<f64>::new("plant");
        node.declare_continuous_state(2);
        let err = node
            .declare_continuous_state_output_port("xc", ContinuousStateIndex(1))
            .unwrap_err();
        assert!(matches!(
            err,
            DeclarationError::InvalidContinuousStateIndex { .. }
        ));
        assert!(node
            .declare_continuous_state_output_port("xc", ContinuousStateIndex(0))
            .is_ok());
    }

    #[test]
    fn discrete_state_output_port_checks_range() {
        let mut node = LeafNode::<f64>::new("counter");
        node.declare_discrete_state_sized(1);
        let err = node
            .declare_discrete_state_output_port("xd", DiscreteStateIndex(1))
            .unwrap_err();
        assert!(matches!(
            err,
            DeclarationError::InvalidDiscreteStateIndex { count: 1, .. }
        ));
    }

    #[test]
    fn port_and_cache_share_declaration_order_indices() {
        let mut node = LeafNode::<f64>::new("mixer");
        node.declare_vector_input_port("u0", DenseVector::zeros(1));
        let y0 = node
            .declare_vector_output_port(
                "y0",
                DenseVector::zeros(1),
                |_, _| Ok(()),
                TicketSet::single(Ticket::AllInputPorts),
            )
            .unwrap();
        let port = node.output_port(y0).unwrap();
        assert_eq!(port.cache_index(), CacheIndex(0));
        let entry = node.cache_entry(port.cache_index()).unwrap();
        assert!(entry.prerequisites().contains(Ticket::AllInputPorts));
        assert!(!entry.has_default_prerequisites());
    }

    #[test]
    fn default_prerequisites_are_flagged() {
        let mut node = LeafNode::<f64>::new("blur");
        let y0 = node
            .declare_vector_output_port_with_default_prerequisites(
                "y0",
                DenseVector::zeros(1),
                |_, _| Ok(()),
            )
            .unwrap();
        let entry = node
            .cache_entry(node.output_port(y0).unwrap().cache_index())
            .unwrap();
        assert!(entry.has_default_prerequisites());
        assert!(entry.prerequisites().contains(Ticket::AllSources));
    }

    #[test]
    fn bounded_parameter_auto_derives_constraint() {
        let mut node = LeafNode::<f64>::new("limiter");
        let model = DenseVector::with_bounds(
            vec![0.5_f64, 0.0, 0.0],
            vec![0.0, f64::NEG_INFINITY, f64::NEG_INFINITY],
            vec![1.0, f64::INFINITY, f64::INFINITY],
        )
        .unwrap();
        node.declare_numeric_parameter(model);
        assert_eq!(node.num_constraints(), 1);
        let constraint = node.constraint(ConstraintIndex(0)).unwrap();
        // Only element 0 is bounded.
        assert_eq!(constraint.bounds().count(), 1);
        assert_eq!(constraint.bounds().lower(), &[0.0]);
        assert_eq!(constraint.bounds().upper(), &[1.0]);
    }

    #[test]
    fn unbounded_models_declare_no_constraint() {
        let mut node = LeafNode::<f64>::new("free");
        node.declare_numeric_parameter(DenseVector::zeros(3));
        node.declare_continuous_state(2);
        assert_eq!(node.num_constraints(), 0);
    }

    #[test]
    fn forced_collections_are_seeded_and_replaceable() {
        let mut node = LeafNode::<f64>::new("pulse");
        assert!(!node.forced_publish_events().has_events());
        node.declare_forced_publish(|_| EventStatus::succeeded());
        assert_eq!(node.forced_publish_events().len(), 1);

        let replacement = EventCollection::new(EventKind::Publish);
        node.set_forced_publish_events(replacement).unwrap();
        assert!(!node.forced_publish_events().has_events());

        let wrong_kind = EventCollection::new(EventKind::DiscreteUpdate);
        assert!(node.set_forced_publish_events(wrong_kind).is_err());
    }
}
