//! Error types for the Weft leaf-node runtime.
//!
//! Organized by the stage that detects them: declaration-time schema
//! errors, context-allocation invariant violations, compute-time type
//! mismatches, and timing-consistency conflicts. Handler failures are
//! not errors — they travel as [`EventStatus`](crate::EventStatus) data.

use std::error::Error;
use std::fmt;

use crate::id::{
    AbstractParameterIndex, AbstractStateIndex, ContinuousStateIndex, DiscreteStateIndex,
    InputPortIndex, OutputPortIndex,
};

/// Errors detected while declaring a node's schema, or while applying
/// registry defaults to an existing context.
///
/// These indicate a programming defect in the node's declaration, not a
/// runtime condition; no partial state is left observable.
#[derive(Clone, Debug, PartialEq)]
pub enum DeclarationError {
    /// An output port was declared with an empty prerequisite set.
    ///
    /// An output with no declared dependency can never be recomputed
    /// correctly, so this is rejected at declaration.
    EmptyPrerequisites {
        /// Name of the declaring node.
        node: String,
        /// Name of the offending output port.
        output: String,
    },
    /// A continuous-state output port was declared against an index
    /// other than the sole allowed index 0.
    InvalidContinuousStateIndex {
        /// The invalid index.
        index: ContinuousStateIndex,
    },
    /// A discrete-state index is out of range.
    InvalidDiscreteStateIndex {
        /// The invalid index.
        index: DiscreteStateIndex,
        /// Number of declared discrete-state groups.
        count: usize,
    },
    /// An abstract-state index is out of range.
    InvalidAbstractStateIndex {
        /// The invalid index.
        index: AbstractStateIndex,
        /// Number of declared abstract-state slots.
        count: usize,
    },
    /// A periodic timing has a non-finite or non-positive period, or a
    /// non-finite or negative offset.
    InvalidPeriodicTiming {
        /// The offending offset in seconds.
        offset_sec: f64,
        /// The offending period in seconds.
        period_sec: f64,
    },
    /// An abstract input port has no model value to clone.
    ///
    /// Vector ports fall back to a zero vector of the declared size;
    /// abstract ports have no analogous default.
    MissingAbstractInputModel {
        /// Name of the declaring node.
        node: String,
        /// The port missing its model.
        port: InputPortIndex,
        /// The port's declared name.
        name: String,
    },
    /// No model value is registered for an abstract parameter.
    MissingAbstractParameterModel {
        /// The parameter missing its model.
        index: AbstractParameterIndex,
    },
    /// No model value is registered for an abstract-state slot.
    MissingAbstractStateModel {
        /// The slot missing its model.
        index: AbstractStateIndex,
    },
    /// The registry's discrete-state group count does not match the
    /// target context's during a default-state reset.
    ///
    /// A zero-group registry is the one permitted mismatch (the target's
    /// groups are zero-filled instead).
    DiscreteGroupCountMismatch {
        /// Groups registered in the model registry.
        registry: usize,
        /// Groups present in the target.
        context: usize,
    },
    /// A wholesale abstract-value copy was attempted between containers
    /// of different lengths.
    AbstractCountMismatch {
        /// Slots in the destination.
        expected: usize,
        /// Slots in the source.
        actual: usize,
    },
    /// A wholesale abstract-value copy found mismatched concrete types
    /// in corresponding slots.
    AbstractTypeMismatch {
        /// The slot at which the mismatch occurred.
        index: usize,
        /// Type the destination slot holds.
        expected: &'static str,
        /// Type the source slot holds.
        actual: &'static str,
    },
    /// A wholesale vector copy was attempted between vectors of
    /// different lengths.
    VectorSizeMismatch {
        /// Elements in the destination.
        expected: usize,
        /// Elements in the source.
        actual: usize,
    },
    /// An event was inserted into a collection of a different kind.
    EventKindMismatch {
        /// Kind the collection holds.
        expected: &'static str,
        /// Kind of the inserted event.
        actual: &'static str,
    },
}

impl fmt::Display for DeclarationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPrerequisites { node, output } => {
                write!(
                    f,
                    "output port '{output}' on node '{node}' declared with an \
                     empty prerequisite set"
                )
            }
            Self::InvalidContinuousStateIndex { index } => {
                write!(
                    f,
                    "continuous-state index {index} is invalid; the only \
                     continuous-state partition is index 0"
                )
            }
            Self::InvalidDiscreteStateIndex { index, count } => {
                write!(
                    f,
                    "discrete-state index {index} out of range (node declares \
                     {count} groups)"
                )
            }
            Self::InvalidAbstractStateIndex { index, count } => {
                write!(
                    f,
                    "abstract-state index {index} out of range (node declares \
                     {count} slots)"
                )
            }
            Self::InvalidPeriodicTiming {
                offset_sec,
                period_sec,
            } => {
                write!(
                    f,
                    "periodic timing (offset {offset_sec}, period {period_sec}) \
                     requires a finite offset >= 0 and a finite period > 0"
                )
            }
            Self::MissingAbstractInputModel { node, port, name } => {
                write!(
                    f,
                    "abstract input port {port} ('{name}') on node '{node}' was \
                     declared without a model value"
                )
            }
            Self::MissingAbstractParameterModel { index } => {
                write!(f, "abstract parameter {index} has no registered model")
            }
            Self::MissingAbstractStateModel { index } => {
                write!(f, "abstract state {index} has no registered model")
            }
            Self::DiscreteGroupCountMismatch { registry, context } => {
                write!(
                    f,
                    "registry declares {registry} discrete-state groups but the \
                     context has {context}"
                )
            }
            Self::AbstractCountMismatch { expected, actual } => {
                write!(
                    f,
                    "abstract value count mismatch: destination has {expected} \
                     slots, source has {actual}"
                )
            }
            Self::AbstractTypeMismatch {
                index,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "abstract value copy at slot {index}: destination holds a \
                     {expected}, source holds a {actual}"
                )
            }
            Self::VectorSizeMismatch { expected, actual } => {
                write!(
                    f,
                    "vector size mismatch: destination has {expected} elements, \
                     source has {actual}"
                )
            }
            Self::EventKindMismatch { expected, actual } => {
                write!(
                    f,
                    "cannot add a {actual} event to a {expected} event collection"
                )
            }
        }
    }
}

impl Error for DeclarationError {}

/// Errors detected while allocating a context.
///
/// These are fail-fast: a non-contiguous vector or a rejected validation
/// hook indicates a declaration/implementation bug, not a runtime
/// condition.
#[derive(Clone, Debug, PartialEq)]
pub enum AllocationError {
    /// A numeric state or parameter group is not backed by contiguous
    /// storage.
    NonContiguousStorage {
        /// Name of the node whose context failed the check.
        node: String,
        /// Which piece failed (e.g. "continuous state",
        /// "discrete state group 2").
        what: String,
    },
    /// The node's validate-allocated-context hook rejected the context.
    InvalidContext {
        /// Name of the node.
        node: String,
        /// The hook's description of the violation.
        reason: String,
    },
    /// Populating the context from the model registry failed.
    Declaration(DeclarationError),
}

impl fmt::Display for AllocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonContiguousStorage { node, what } => {
                write!(
                    f,
                    "node '{node}': {what} is not backed by contiguous storage"
                )
            }
            Self::InvalidContext { node, reason } => {
                write!(f, "node '{node}': allocated context invalid: {reason}")
            }
            Self::Declaration(e) => write!(f, "declaration: {e}"),
        }
    }
}

impl Error for AllocationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Declaration(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DeclarationError> for AllocationError {
    fn from(e: DeclarationError) -> Self {
        Self::Declaration(e)
    }
}

/// Errors detected while computing a cached output value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ComputeError {
    /// The cache's abstract holder could not be downcast to the output
    /// port's declared vector type.
    VectorTypeMismatch {
        /// Name of the node.
        node: String,
        /// The offending output port.
        output: OutputPortIndex,
        /// Type the calculation required.
        expected: &'static str,
        /// Type the holder actually contained.
        actual: &'static str,
    },
    /// An abstract value copy or downcast found a different concrete
    /// type than expected.
    ValueTypeMismatch {
        /// Type the operation required.
        expected: &'static str,
        /// Type actually found.
        actual: &'static str,
    },
}

impl fmt::Display for ComputeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VectorTypeMismatch {
                node,
                output,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "output port {output} on node '{node}' required a {expected} \
                     result but its cache holds a {actual}"
                )
            }
            Self::ValueTypeMismatch { expected, actual } => {
                write!(f, "expected a {expected} value but found a {actual}")
            }
        }
    }
}

impl Error for ComputeError {}

/// Timing-consistency errors, reported to the caller rather than
/// treated as process-fatal.
#[derive(Clone, Debug, PartialEq)]
pub enum TimingError {
    /// A unique periodic discrete-update rate was requested but the node
    /// declares more than one distinct timing.
    ConflictingPeriodicTimings {
        /// Offset of the timing that established the requirement.
        first_offset_sec: f64,
        /// Period of the timing that established the requirement.
        first_period_sec: f64,
        /// Offset of the conflicting timing.
        second_offset_sec: f64,
        /// Period of the conflicting timing.
        second_period_sec: f64,
    },
}

impl fmt::Display for TimingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConflictingPeriodicTimings {
                first_offset_sec,
                first_period_sec,
                second_offset_sec,
                second_period_sec,
            } => {
                write!(
                    f,
                    "found more than one periodic timing that triggers discrete \
                     update events; timings were (offset, period) = \
                     ({first_offset_sec}, {first_period_sec}) and \
                     ({second_offset_sec}, {second_period_sec})"
                )
            }
        }
    }
}

impl Error for TimingError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_offenders() {
        let e = DeclarationError::EmptyPrerequisites {
            node: "plant".into(),
            output: "y0".into(),
        };
        let text = e.to_string();
        assert!(text.contains("plant"));
        assert!(text.contains("y0"));

        let t = TimingError::ConflictingPeriodicTimings {
            first_offset_sec: 0.0,
            first_period_sec: 0.5,
            second_offset_sec: 0.1,
            second_period_sec: 0.25,
        };
        let text = t.to_string();
        assert!(text.contains("(0, 0.5)"));
        assert!(text.contains("(0.1, 0.25)"));
    }

    #[test]
    fn allocation_error_wraps_declaration_error() {
        let inner = DeclarationError::MissingAbstractParameterModel {
            index: AbstractParameterIndex(3),
        };
        let outer = AllocationError::from(inner.clone());
        assert_eq!(outer, AllocationError::Declaration(inner));
        assert!(Error::source(&outer).is_some());
    }
}
