//! Declared constraints on a context's numeric quantities.
//!
//! Constraints are declaration-time records consumed by a composing
//! layer (e.g. handed to an optimizer or monitored during simulation);
//! the runtime only stores and evaluates them. Inequality constraints
//! are also auto-derived from the element bounds of declared model
//! vectors.

use std::fmt;

use weft_context::Context;
use weft_core::{DeclarationError, Scalar};

/// Index of a declared constraint, in declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstraintIndex(pub u32);

impl fmt::Display for ConstraintIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Evaluates a constraint's value vector from a context.
pub type ConstraintCalcFn<T> = Box<dyn Fn(&Context<T>, &mut Vec<T>)>;

/// Elementwise inclusive bounds on a constraint's value vector.
///
/// An equality constraint is the special case `lower == upper == 0`.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstraintBounds {
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl ConstraintBounds {
    /// Inequality bounds `lower <= value <= upper`, elementwise.
    ///
    /// The two vectors must have equal length; entries may be ±infinity.
    pub fn inequality(lower: Vec<f64>, upper: Vec<f64>) -> Result<Self, DeclarationError> {
        if lower.len() != upper.len() {
            return Err(DeclarationError::VectorSizeMismatch {
                expected: lower.len(),
                actual: upper.len(),
            });
        }
        Ok(Self { lower, upper })
    }

    /// Equality bounds: `value == 0`, elementwise, for `count` elements.
    pub fn equality(count: usize) -> Self {
        Self {
            lower: vec![0.0; count],
            upper: vec![0.0; count],
        }
    }

    /// Number of constrained elements.
    pub fn count(&self) -> usize {
        self.lower.len()
    }

    /// The lower bounds.
    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    /// The upper bounds.
    pub fn upper(&self) -> &[f64] {
        &self.upper
    }

    /// Whether every element is pinned to zero (an equality constraint).
    pub fn is_equality(&self) -> bool {
        self.lower.iter().all(|&v| v == 0.0) && self.upper.iter().all(|&v| v == 0.0)
    }
}

/// One declared constraint: a calc function, its bounds, and a
/// description for diagnostics.
pub struct Constraint<T: Scalar> {
    calc: ConstraintCalcFn<T>,
    bounds: ConstraintBounds,
    description: String,
}

impl<T: Scalar> Constraint<T> {
    pub(crate) fn new(
        calc: ConstraintCalcFn<T>,
        bounds: ConstraintBounds,
        description: String,
    ) -> Self {
        Self {
            calc,
            bounds,
            description,
        }
    }

    /// Evaluate the constraint's value vector into `value`.
    pub fn calc(&self, context: &Context<T>, value: &mut Vec<T>) {
        (self.calc)(context, value);
    }

    /// The constraint's bounds.
    pub fn bounds(&self) -> &ConstraintBounds {
        &self.bounds
    }

    /// The constraint's description.
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl<T: Scalar> fmt::Debug for Constraint<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constraint")
            .field("bounds", &self.bounds)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}
