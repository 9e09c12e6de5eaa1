//! State partitions: continuous, discrete, and abstract.
//!
//! Continuous state is a single numeric vector. Discrete state is a
//! sequence of independently-sized numeric groups. Abstract state is a
//! sequence of type-erased values. [`State`] bundles the three; the
//! unrestricted-update dispatcher operates on the whole bundle.

use weft_core::{AbstractValue, DeclarationError, Scalar, VectorBase};

/// The continuous-state vector of a context.
#[derive(Clone, Debug)]
pub struct ContinuousState<T: Scalar> {
    vector: Box<dyn VectorBase<T>>,
}

impl<T: Scalar> ContinuousState<T> {
    /// Wrap a vector as continuous state.
    pub fn new(vector: Box<dyn VectorBase<T>>) -> Self {
        Self { vector }
    }

    /// Number of continuous-state variables.
    pub fn len(&self) -> usize {
        self.vector.len()
    }

    /// Whether there are zero continuous-state variables.
    pub fn is_empty(&self) -> bool {
        self.vector.is_empty()
    }

    /// Borrow the backing vector.
    pub fn vector(&self) -> &dyn VectorBase<T> {
        &*self.vector
    }

    /// Mutably borrow the backing vector.
    pub fn vector_mut(&mut self) -> &mut dyn VectorBase<T> {
        &mut *self.vector
    }

    /// Overwrite from another continuous state of the same size.
    pub fn set_from(&mut self, other: &ContinuousState<T>) -> Result<(), DeclarationError> {
        self.vector.set_from(other.vector())
    }
}

/// The discrete-state groups of a context.
///
/// Groups are independently sized and addressed by declaration order.
#[derive(Clone, Debug)]
pub struct DiscreteState<T: Scalar> {
    groups: Vec<Box<dyn VectorBase<T>>>,
}

impl<T: Scalar> Default for DiscreteState<T> {
    fn default() -> Self {
        Self { groups: Vec::new() }
    }
}

impl<T: Scalar> DiscreteState<T> {
    /// Wrap a sequence of group vectors.
    pub fn new(groups: Vec<Box<dyn VectorBase<T>>>) -> Self {
        Self { groups }
    }

    /// A discrete state with zero groups.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of groups.
    pub fn num_groups(&self) -> usize {
        self.groups.len()
    }

    /// Borrow group `i`. Panics if out of range; group indices come from
    /// declaration-time counts.
    pub fn group(&self, i: usize) -> &dyn VectorBase<T> {
        &*self.groups[i]
    }

    /// Mutably borrow group `i`. Panics if out of range.
    pub fn group_mut(&mut self, i: usize) -> &mut dyn VectorBase<T> {
        &mut *self.groups[i]
    }

    /// Set every element of every group to zero.
    pub fn zero_all(&mut self) {
        for group in &mut self.groups {
            group.fill(T::ZERO);
        }
    }

    /// Overwrite all groups wholesale from another discrete state.
    ///
    /// Group counts and per-group sizes must match exactly.
    pub fn set_from(&mut self, other: &DiscreteState<T>) -> Result<(), DeclarationError> {
        if self.num_groups() != other.num_groups() {
            return Err(DeclarationError::DiscreteGroupCountMismatch {
                registry: other.num_groups(),
                context: self.num_groups(),
            });
        }
        for (group, source) in self.groups.iter_mut().zip(&other.groups) {
            group.set_from(&**source)?;
        }
        Ok(())
    }
}

/// The abstract-state slots of a context.
#[derive(Clone, Debug, Default)]
pub struct AbstractState {
    values: Vec<Box<dyn AbstractValue>>,
}

impl AbstractState {
    /// Wrap a sequence of type-erased values.
    pub fn new(values: Vec<Box<dyn AbstractValue>>) -> Self {
        Self { values }
    }

    /// An abstract state with zero slots.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are zero slots.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Borrow slot `i`. Panics if out of range.
    pub fn value(&self, i: usize) -> &dyn AbstractValue {
        &*self.values[i]
    }

    /// Mutably borrow slot `i`. Panics if out of range.
    pub fn value_mut(&mut self, i: usize) -> &mut dyn AbstractValue {
        &mut *self.values[i]
    }

    /// Overwrite all slots wholesale from another abstract state.
    ///
    /// Slot counts and per-slot concrete types must match exactly.
    pub fn set_from(&mut self, other: &AbstractState) -> Result<(), DeclarationError> {
        if self.len() != other.len() {
            return Err(DeclarationError::AbstractCountMismatch {
                expected: self.len(),
                actual: other.len(),
            });
        }
        for (i, (value, source)) in self.values.iter_mut().zip(&other.values).enumerate() {
            value
                .set_from(&**source)
                .map_err(|_| DeclarationError::AbstractTypeMismatch {
                    index: i,
                    expected: value.type_name(),
                    actual: source.type_name(),
                })?;
        }
        Ok(())
    }
}

/// The complete state of a context: continuous, discrete, and abstract.
#[derive(Clone, Debug)]
pub struct State<T: Scalar> {
    continuous: ContinuousState<T>,
    discrete: DiscreteState<T>,
    abstract_state: AbstractState,
}

impl<T: Scalar> State<T> {
    /// Bundle the three partitions.
    pub fn new(
        continuous: ContinuousState<T>,
        discrete: DiscreteState<T>,
        abstract_state: AbstractState,
    ) -> Self {
        Self {
            continuous,
            discrete,
            abstract_state,
        }
    }

    /// The continuous-state partition.
    pub fn continuous(&self) -> &ContinuousState<T> {
        &self.continuous
    }

    /// Mutable continuous-state partition.
    pub fn continuous_mut(&mut self) -> &mut ContinuousState<T> {
        &mut self.continuous
    }

    /// The discrete-state partition.
    pub fn discrete(&self) -> &DiscreteState<T> {
        &self.discrete
    }

    /// Mutable discrete-state partition.
    pub fn discrete_mut(&mut self) -> &mut DiscreteState<T> {
        &mut self.discrete
    }

    /// The abstract-state partition.
    pub fn abstract_state(&self) -> &AbstractState {
        &self.abstract_state
    }

    /// Mutable abstract-state partition.
    pub fn abstract_state_mut(&mut self) -> &mut AbstractState {
        &mut self.abstract_state
    }

    /// Overwrite all three partitions wholesale.
    pub fn set_from(&mut self, other: &State<T>) -> Result<(), DeclarationError> {
        self.continuous.set_from(&other.continuous)?;
        self.discrete.set_from(&other.discrete)?;
        self.abstract_state.set_from(&other.abstract_state)
    }
}
