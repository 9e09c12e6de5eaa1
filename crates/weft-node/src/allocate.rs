//! Context allocation and registry-default resets.
//!
//! Allocation populates a fresh [`Context`] from the model registry,
//! wires its dependency graph (aggregate subscriptions, cache-entry
//! prerequisites, output-port observers), then verifies the structural
//! invariant that every numeric state and parameter group is backed by
//! contiguous storage. A violation is a declaration/implementation bug,
//! so allocation fails fast rather than degrading.

use weft_context::{
    AbstractState, Cache, Context, ContinuousState, DependencyGraph, DiscreteState, Parameters,
    State,
};
use weft_core::{
    AbstractParameterIndex, AbstractStateIndex, AbstractValue, AllocationError, DeclarationError,
    DenseVector, DiscreteStateIndex, InputPortIndex, NumericParameterIndex, Scalar, Ticket, Value,
    VectorBase,
};

use crate::node::LeafNode;
use crate::port::PortDataType;

impl<T: Scalar> LeafNode<T> {
    /// Manufacture a complete, validated context.
    ///
    /// Steps: populate state and parameters from the registry; wire the
    /// dependency graph; size the cache; check the contiguous-storage
    /// invariant for continuous state, every discrete group, and every
    /// numeric parameter group; run the node's validation hook.
    pub fn allocate_context(&self) -> Result<Context<T>, AllocationError> {
        let context = Context::new(
            self.allocate_state(),
            self.allocate_parameters(),
            self.input_ports.len(),
            self.build_dependency_graph(),
            Cache::new(self.cache_entries.len()),
        );

        self.check_contiguous_storage(&context)?;

        if let Some(validator) = &self.context_validator {
            validator(&context).map_err(|reason| AllocationError::InvalidContext {
                node: self.name.clone(),
                reason,
            })?;
        }
        Ok(context)
    }

    /// A freshly owned continuous state cloned from the model.
    pub fn allocate_continuous_state(&self) -> ContinuousState<T> {
        ContinuousState::new(self.models.clone_continuous_state_model())
    }

    /// A freshly owned continuous state sized for time derivatives.
    ///
    /// Derivatives share the continuous state's shape.
    pub fn allocate_time_derivatives(&self) -> ContinuousState<T> {
        self.allocate_continuous_state()
    }

    /// Freshly owned discrete state cloned from the group models.
    pub fn allocate_discrete_state(&self) -> DiscreteState<T> {
        DiscreteState::new(self.models.clone_all_discrete_state_models())
    }

    /// Freshly owned abstract state cloned from the models.
    pub fn allocate_abstract_state(&self) -> AbstractState {
        AbstractState::new(self.models.clone_all_abstract_state_models())
    }

    /// The complete state, freshly owned.
    pub fn allocate_state(&self) -> State<T> {
        State::new(
            self.allocate_continuous_state(),
            self.allocate_discrete_state(),
            self.allocate_abstract_state(),
        )
    }

    /// Freshly owned parameters cloned from the models.
    pub fn allocate_parameters(&self) -> Parameters<T> {
        Parameters::new(
            self.models.clone_all_numeric_parameter_models(),
            self.models.clone_all_abstract_parameter_models(),
        )
    }

    /// A freshly owned default value for an input port.
    ///
    /// A registered model is cloned; a model-less vector port falls back
    /// to a zero vector of the declared size; a model-less abstract port
    /// is a declaration error naming the port and the node.
    ///
    /// Panics if `port` is not a declared input port.
    pub fn allocate_input_value(
        &self,
        port: InputPortIndex,
    ) -> Result<Box<dyn AbstractValue>, DeclarationError> {
        let descriptor = &self.input_ports[port.0 as usize];
        if let Some(model) = self.models.clone_input_port_model(port) {
            return Ok(model);
        }
        match descriptor.data_type() {
            PortDataType::Vector { size } => Ok(Value::boxed(DenseVector::<T>::zeros(size))),
            PortDataType::Abstract => Err(DeclarationError::MissingAbstractInputModel {
                node: self.name.clone(),
                port,
                name: descriptor.name().to_string(),
            }),
        }
    }

    // ── Registry defaults ──────────────────────────────────────────

    /// Reset `parameters` to registry defaults.
    ///
    /// Numeric groups with no registered model are filled with 1.0; an
    /// abstract parameter with no model is a declaration error.
    pub fn set_default_parameters(
        &self,
        parameters: &mut Parameters<T>,
    ) -> Result<(), DeclarationError> {
        for i in 0..parameters.num_numeric_groups() {
            match self
                .models
                .clone_numeric_parameter_model(NumericParameterIndex(i as u32))
            {
                Some(model) => parameters.numeric_mut(i).set_from(&*model)?,
                None => parameters.numeric_mut(i).fill(T::ONE),
            }
        }
        for i in 0..parameters.num_abstract() {
            let index = AbstractParameterIndex(i as u32);
            let model = self
                .models
                .clone_abstract_parameter_model(index)
                .ok_or(DeclarationError::MissingAbstractParameterModel { index })?;
            let expected = parameters.abstract_value(i).type_name();
            let actual = model.type_name();
            parameters
                .abstract_value_mut(i)
                .set_from(&*model)
                .map_err(|_| DeclarationError::AbstractTypeMismatch {
                    index: i,
                    expected,
                    actual,
                })?;
        }
        Ok(())
    }

    /// Reset `state` to registry defaults.
    ///
    /// Discrete-state rule: when the registry has zero groups, every
    /// group of the target is zeroed elementwise — this supports nodes
    /// that were given only a group count, not a model. Otherwise the
    /// group counts must match exactly and all groups are copied
    /// wholesale.
    pub fn set_default_state(&self, state: &mut State<T>) -> Result<(), DeclarationError> {
        state
            .continuous_mut()
            .vector_mut()
            .set_from(self.models.continuous_state_model())?;

        let registry_groups = self.models.num_discrete_groups();
        let discrete = state.discrete_mut();
        if registry_groups == 0 {
            discrete.zero_all();
        } else {
            if registry_groups != discrete.num_groups() {
                return Err(DeclarationError::DiscreteGroupCountMismatch {
                    registry: registry_groups,
                    context: discrete.num_groups(),
                });
            }
            for i in 0..registry_groups {
                let model = self
                    .models
                    .discrete_state_model(DiscreteStateIndex(i as u32))
                    .expect("group index checked in range");
                discrete.group_mut(i).set_from(model)?;
            }
        }

        let abstract_state = state.abstract_state_mut();
        for i in 0..abstract_state.len() {
            let index = AbstractStateIndex(i as u32);
            let model = self
                .models
                .clone_abstract_state_model(index)
                .ok_or(DeclarationError::MissingAbstractStateModel { index })?;
            let expected = abstract_state.value(i).type_name();
            let actual = model.type_name();
            abstract_state
                .value_mut(i)
                .set_from(&*model)
                .map_err(|_| DeclarationError::AbstractTypeMismatch {
                    index: i,
                    expected,
                    actual,
                })?;
        }
        Ok(())
    }

    /// Reset a context's parameters and state to registry defaults.
    pub fn set_default_context(&self, context: &mut Context<T>) -> Result<(), DeclarationError> {
        self.set_default_parameters(context.parameters_mut())?;
        self.set_default_state(context.state_mut())
    }

    // ── Graph wiring and invariants ────────────────────────────────

    fn build_dependency_graph(&self) -> DependencyGraph {
        let mut graph = DependencyGraph::new();

        for i in 0..self.models.num_discrete_groups() {
            graph.subscribe(
                Ticket::AllDiscreteState,
                Ticket::DiscreteState(DiscreteStateIndex(i as u32)),
            );
        }
        for i in 0..self.models.num_abstract_states() {
            graph.subscribe(
                Ticket::AllAbstractState,
                Ticket::AbstractState(AbstractStateIndex(i as u32)),
            );
        }
        for i in 0..self.models.num_numeric_parameters() {
            graph.subscribe(
                Ticket::AllParameters,
                Ticket::NumericParameter(NumericParameterIndex(i as u32)),
            );
        }
        for i in 0..self.models.num_abstract_parameters() {
            graph.subscribe(
                Ticket::AllParameters,
                Ticket::AbstractParameter(AbstractParameterIndex(i as u32)),
            );
        }
        for port in &self.input_ports {
            graph.subscribe(Ticket::AllInputPorts, port.ticket());
        }

        for entry in &self.cache_entries {
            graph.set_cache_index(entry.ticket(), entry.index());
            for prerequisite in entry.prerequisites() {
                graph.subscribe(entry.ticket(), prerequisite);
            }
        }

        // The port tracker observes the backing cache entry's tracker;
        // the two have distinct tickets.
        for port in &self.output_ports {
            graph.subscribe(port.ticket(), Ticket::Cache(port.cache_index()));
        }
        graph
    }

    fn check_contiguous_storage(&self, context: &Context<T>) -> Result<(), AllocationError> {
        if context.state().continuous().vector().as_slice().is_none() {
            return Err(AllocationError::NonContiguousStorage {
                node: self.name.clone(),
                what: "continuous state".to_string(),
            });
        }
        let discrete = context.state().discrete();
        for i in 0..discrete.num_groups() {
            if discrete.group(i).as_slice().is_none() {
                return Err(AllocationError::NonContiguousStorage {
                    node: self.name.clone(),
                    what: format!("discrete state group {i}"),
                });
            }
        }
        let parameters = context.parameters();
        for i in 0..parameters.num_numeric_groups() {
            if parameters.numeric(i).as_slice().is_none() {
                return Err(AllocationError::NonContiguousStorage {
                    node: self.name.clone(),
                    what: format!("numeric parameter group {i}"),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::LeafNode;
    use weft_core::VectorBase;

    fn plant() -> LeafNode<f64> {
        let mut node = LeafNode::new("plant");
        node.declare_continuous_state_model(DenseVector::from_vec(vec![1.0, 2.0]));
        node.declare_discrete_state(DenseVector::from_vec(vec![3.0]));
        node.declare_numeric_parameter(DenseVector::from_vec(vec![0.5, 0.5]));
        node.declare_abstract_state(Value::boxed(7_u32));
        node.declare_abstract_parameter(Value::boxed("mode".to_string()));
        node
    }

    #[test]
    fn allocation_populates_from_models() {
        let node = plant();
        let context = node.allocate_context().unwrap();
        assert_eq!(context.time(), 0.0);
        assert_eq!(
            context.state().continuous().vector().as_slice().unwrap(),
            &[1.0, 2.0]
        );
        assert_eq!(
            context.state().discrete().group(0).as_slice().unwrap(),
            &[3.0]
        );
        assert_eq!(context.parameters().numeric(0).as_slice().unwrap(), &[0.5, 0.5]);
        assert_eq!(
            context.state().abstract_state().value(0).downcast_ref::<u32>(),
            Some(&7)
        );
    }

    #[test]
    fn contexts_are_independent() {
        let node = plant();
        let mut a = node.allocate_context().unwrap();
        let b = node.allocate_context().unwrap();
        a.continuous_state_mut().vector_mut().set(0, 99.0);
        assert_eq!(b.state().continuous().vector().get(0), 1.0);
    }

    #[test]
    fn independent_allocators_return_fresh_structures() {
        let node = plant();
        let xc = node.allocate_continuous_state();
        assert_eq!(xc.len(), 2);
        let derivatives = node.allocate_time_derivatives();
        assert_eq!(derivatives.len(), 2);
        let xd = node.allocate_discrete_state();
        assert_eq!(xd.num_groups(), 1);
        let params = node.allocate_parameters();
        assert_eq!(params.num_numeric_groups(), 1);
        assert_eq!(params.num_abstract(), 1);
    }

    #[test]
    fn validation_hook_can_reject() {
        let mut node = plant();
        node.set_context_validator(|_| Err("needs exactly three wheels".to_string()));
        let err = node.allocate_context().unwrap_err();
        assert!(matches!(err, AllocationError::InvalidContext { .. }));
        assert!(err.to_string().contains("three wheels"));
    }

    #[test]
    fn vector_input_without_model_allocates_zeros() {
        let mut node = LeafNode::<f64>::new("sink");
        let port = node.declare_vector_input_port_sized("u0", 3);
        let value = node.allocate_input_value(port).unwrap();
        let vector = value.downcast_ref::<DenseVector<f64>>().unwrap();
        assert_eq!(vector.values(), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn abstract_input_without_model_is_a_declaration_error() {
        let mut node = LeafNode::<f64>::new("sink");
        let port = node.declare_abstract_input_port("cmd", None);
        let err = node.allocate_input_value(port).unwrap_err();
        assert!(matches!(
            err,
            DeclarationError::MissingAbstractInputModel { .. }
        ));
        assert!(err.to_string().contains("sink"));
        assert!(err.to_string().contains("cmd"));
    }

    #[test]
    fn default_parameters_fill_unmodeled_groups_with_ones() {
        let node = LeafNode::<f64>::new("bare");
        // A parameters object with more groups than the registry knows.
        let mut params = Parameters::new(
            vec![Box::new(DenseVector::from_vec(vec![5.0, 5.0])) as _],
            vec![],
        );
        node.set_default_parameters(&mut params).unwrap();
        assert_eq!(params.numeric(0).as_slice().unwrap(), &[1.0, 1.0]);
    }

    #[test]
    fn default_state_zero_group_registry_zeroes_existing_groups() {
        let node = LeafNode::<f64>::new("counted");
        let mut state = State::new(
            ContinuousState::new(Box::new(DenseVector::zeros(0))),
            DiscreteState::new(vec![
                Box::new(DenseVector::from_vec(vec![4.0, 5.0])) as _,
                Box::new(DenseVector::from_vec(vec![6.0])) as _,
            ]),
            AbstractState::empty(),
        );
        node.set_default_state(&mut state).unwrap();
        assert_eq!(state.discrete().group(0).as_slice().unwrap(), &[0.0, 0.0]);
        assert_eq!(state.discrete().group(1).as_slice().unwrap(), &[0.0]);
    }

    #[test]
    fn default_state_group_count_mismatch_is_fatal() {
        let mut node = LeafNode::<f64>::new("strict");
        node.declare_discrete_state(DenseVector::from_vec(vec![1.0]));
        let mut state = State::new(
            ContinuousState::new(Box::new(DenseVector::zeros(0))),
            DiscreteState::new(vec![
                Box::new(DenseVector::zeros(1)) as _,
                Box::new(DenseVector::zeros(1)) as _,
            ]),
            AbstractState::empty(),
        );
        assert!(matches!(
            node.set_default_state(&mut state),
            Err(DeclarationError::DiscreteGroupCountMismatch {
                registry: 1,
                context: 2
            })
        ));
    }

    #[test]
    fn default_context_restores_models_after_mutation() {
        let node = plant();
        let mut context = node.allocate_context().unwrap();
        context.continuous_state_mut().vector_mut().fill(42.0);
        context.parameters_mut().numeric_mut(0).fill(42.0);
        node.set_default_context(&mut context).unwrap();
        assert_eq!(
            context.state().continuous().vector().as_slice().unwrap(),
            &[1.0, 2.0]
        );
        assert_eq!(context.parameters().numeric(0).as_slice().unwrap(), &[0.5, 0.5]);
    }
}
