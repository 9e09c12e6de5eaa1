//! The model registry: prototype values for everything a context holds.
//!
//! Models are registered at declaration time under dense indices
//! assigned in registration order, never mutated afterwards, and cloned
//! to manufacture fresh, independently-owned instance data for every new
//! context. A clone request for an unregistered index returns `None`;
//! callers substitute a 1.0-fill (numeric parameters) or zero-fill
//! (discrete state) where the schema permits, and report a declaration
//! error where it does not (abstract values).

use weft_core::{
    AbstractParameterIndex, AbstractStateIndex, AbstractValue, DiscreteStateIndex, InputPortIndex,
    NumericParameterIndex, Scalar, VectorBase,
};

/// Prototype storage for one node's declared schema.
#[derive(Clone, Debug)]
pub struct ModelRegistry<T: Scalar> {
    numeric_parameters: Vec<Box<dyn VectorBase<T>>>,
    abstract_parameters: Vec<Box<dyn AbstractValue>>,
    continuous_state: Box<dyn VectorBase<T>>,
    discrete_state: Vec<Box<dyn VectorBase<T>>>,
    abstract_state: Vec<Box<dyn AbstractValue>>,
    input_ports: Vec<Option<Box<dyn AbstractValue>>>,
}

impl<T: Scalar> ModelRegistry<T> {
    /// An empty registry: no parameters, no discrete or abstract state,
    /// and a zero-length continuous state.
    pub fn new() -> Self {
        Self {
            numeric_parameters: Vec::new(),
            abstract_parameters: Vec::new(),
            continuous_state: Box::new(weft_core::DenseVector::zeros(0)),
            discrete_state: Vec::new(),
            abstract_state: Vec::new(),
            input_ports: Vec::new(),
        }
    }

    // ── Registration ───────────────────────────────────────────────

    /// Append a numeric parameter model; the return value is its index.
    pub fn add_numeric_parameter_model(
        &mut self,
        model: Box<dyn VectorBase<T>>,
    ) -> NumericParameterIndex {
        let index = NumericParameterIndex(self.numeric_parameters.len() as u32);
        self.numeric_parameters.push(model);
        index
    }

    /// Append an abstract parameter model.
    pub fn add_abstract_parameter_model(
        &mut self,
        model: Box<dyn AbstractValue>,
    ) -> AbstractParameterIndex {
        let index = AbstractParameterIndex(self.abstract_parameters.len() as u32);
        self.abstract_parameters.push(model);
        index
    }

    /// Set the continuous-state model. A later call supersedes an
    /// earlier one; continuous state does not accumulate.
    pub fn set_continuous_state_model(&mut self, model: Box<dyn VectorBase<T>>) {
        self.continuous_state = model;
    }

    /// Append a discrete-state group model.
    pub fn add_discrete_state_model(&mut self, model: Box<dyn VectorBase<T>>) -> DiscreteStateIndex {
        let index = DiscreteStateIndex(self.discrete_state.len() as u32);
        self.discrete_state.push(model);
        index
    }

    /// Append an abstract-state model.
    pub fn add_abstract_state_model(&mut self, model: Box<dyn AbstractValue>) -> AbstractStateIndex {
        let index = AbstractStateIndex(self.abstract_state.len() as u32);
        self.abstract_state.push(model);
        index
    }

    /// Append an input-port model slot, possibly empty. Slots line up
    /// with input-port declaration order.
    pub fn add_input_port_model(&mut self, model: Option<Box<dyn AbstractValue>>) {
        self.input_ports.push(model);
    }

    // ── Counts and borrows ─────────────────────────────────────────

    /// Number of registered numeric parameter models.
    pub fn num_numeric_parameters(&self) -> usize {
        self.numeric_parameters.len()
    }

    /// Number of registered abstract parameter models.
    pub fn num_abstract_parameters(&self) -> usize {
        self.abstract_parameters.len()
    }

    /// Size of the continuous-state model.
    pub fn continuous_state_size(&self) -> usize {
        self.continuous_state.len()
    }

    /// Borrow the continuous-state model.
    pub fn continuous_state_model(&self) -> &dyn VectorBase<T> {
        &*self.continuous_state
    }

    /// Number of registered discrete-state groups.
    pub fn num_discrete_groups(&self) -> usize {
        self.discrete_state.len()
    }

    /// Borrow a discrete-state group model, when registered.
    pub fn discrete_state_model(&self, index: DiscreteStateIndex) -> Option<&dyn VectorBase<T>> {
        self.discrete_state.get(index.0 as usize).map(|m| &**m)
    }

    /// Number of registered abstract-state models.
    pub fn num_abstract_states(&self) -> usize {
        self.abstract_state.len()
    }

    /// Number of input-port model slots.
    pub fn num_input_port_models(&self) -> usize {
        self.input_ports.len()
    }

    // ── Cloning ────────────────────────────────────────────────────

    /// Clone the numeric parameter model at `index`, if registered.
    pub fn clone_numeric_parameter_model(
        &self,
        index: NumericParameterIndex,
    ) -> Option<Box<dyn VectorBase<T>>> {
        self.numeric_parameters.get(index.0 as usize).cloned()
    }

    /// Clone every numeric parameter model, in index order.
    pub fn clone_all_numeric_parameter_models(&self) -> Vec<Box<dyn VectorBase<T>>> {
        self.numeric_parameters.clone()
    }

    /// Clone the abstract parameter model at `index`, if registered.
    pub fn clone_abstract_parameter_model(
        &self,
        index: AbstractParameterIndex,
    ) -> Option<Box<dyn AbstractValue>> {
        self.abstract_parameters.get(index.0 as usize).cloned()
    }

    /// Clone every abstract parameter model, in index order.
    pub fn clone_all_abstract_parameter_models(&self) -> Vec<Box<dyn AbstractValue>> {
        self.abstract_parameters.clone()
    }

    /// Clone the continuous-state model.
    pub fn clone_continuous_state_model(&self) -> Box<dyn VectorBase<T>> {
        self.continuous_state.clone()
    }

    /// Clone the discrete-state group model at `index`, if registered.
    pub fn clone_discrete_state_model(
        &self,
        index: DiscreteStateIndex,
    ) -> Option<Box<dyn VectorBase<T>>> {
        self.discrete_state.get(index.0 as usize).cloned()
    }

    /// Clone every discrete-state group model, in index order.
    pub fn clone_all_discrete_state_models(&self) -> Vec<Box<dyn VectorBase<T>>> {
        self.discrete_state.clone()
    }

    /// Clone the abstract-state model at `index`, if registered.
    pub fn clone_abstract_state_model(
        &self,
        index: AbstractStateIndex,
    ) -> Option<Box<dyn AbstractValue>> {
        self.abstract_state.get(index.0 as usize).cloned()
    }

    /// Clone every abstract-state model, in index order.
    pub fn clone_all_abstract_state_models(&self) -> Vec<Box<dyn AbstractValue>> {
        self.abstract_state.clone()
    }

    /// Clone the input-port model at `port`, if one was registered.
    pub fn clone_input_port_model(&self, port: InputPortIndex) -> Option<Box<dyn AbstractValue>> {
        self.input_ports.get(port.0 as usize).and_then(|m| m.clone())
    }
}

impl<T: Scalar> Default for ModelRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_core::{DenseVector, Value};

    #[test]
    fn registration_order_defines_indices() {
        let mut registry = ModelRegistry::<f64>::new();
        let p0 = registry.add_numeric_parameter_model(Box::new(DenseVector::zeros(1)));
        let p1 = registry.add_numeric_parameter_model(Box::new(DenseVector::zeros(2)));
        assert_eq!(p0, NumericParameterIndex(0));
        assert_eq!(p1, NumericParameterIndex(1));
        assert_eq!(registry.num_numeric_parameters(), 2);
    }

    #[test]
    fn clone_is_independent() {
        let mut registry = ModelRegistry::<f64>::new();
        let index =
            registry.add_numeric_parameter_model(Box::new(DenseVector::from_vec(vec![1.0])));
        let mut clone = registry.clone_numeric_parameter_model(index).unwrap();
        clone.set(0, 9.0);
        assert_eq!(
            registry.clone_numeric_parameter_model(index).unwrap().get(0),
            1.0
        );
    }

    #[test]
    fn unregistered_index_clones_to_none() {
        let registry = ModelRegistry::<f64>::new();
        assert!(registry
            .clone_numeric_parameter_model(NumericParameterIndex(0))
            .is_none());
        assert!(registry
            .clone_discrete_state_model(DiscreteStateIndex(5))
            .is_none());
        assert!(registry
            .clone_abstract_parameter_model(AbstractParameterIndex(0))
            .is_none());
    }

    #[test]
    fn continuous_state_model_is_superseded_not_accumulated() {
        let mut registry = ModelRegistry::<f64>::new();
        registry.set_continuous_state_model(Box::new(DenseVector::zeros(2)));
        registry.set_continuous_state_model(Box::new(DenseVector::zeros(5)));
        assert_eq!(registry.continuous_state_size(), 5);
    }

    #[test]
    fn input_port_models_may_be_absent() {
        let mut registry = ModelRegistry::<f64>::new();
        registry.add_input_port_model(Some(Value::boxed(3_u8)));
        registry.add_input_port_model(None);
        assert!(registry.clone_input_port_model(InputPortIndex(0)).is_some());
        assert!(registry.clone_input_port_model(InputPortIndex(1)).is_none());
    }
}
