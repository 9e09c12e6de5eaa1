//! Strongly-typed indices for declared node entities.
//!
//! Every entity a leaf node declares — ports, state partitions, parameter
//! groups, cache entries — is addressed by a dense index assigned in
//! declaration order. The newtypes here keep those index spaces from
//! being mixed up at compile time.

use std::fmt;

macro_rules! declare_index {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(v: u32) -> Self {
                Self(v)
            }
        }
    };
}

declare_index! {
    /// Identifies an input port, in declaration order.
    InputPortIndex
}

declare_index! {
    /// Identifies an output port, in declaration order.
    OutputPortIndex
}

declare_index! {
    /// Identifies the continuous-state partition.
    ///
    /// A leaf node has at most one continuous-state vector, so the only
    /// valid value is 0. The type exists so that state-output-port
    /// declarations name which kind of partition they copy.
    ContinuousStateIndex
}

declare_index! {
    /// Identifies one discrete-state group, in declaration order.
    DiscreteStateIndex
}

declare_index! {
    /// Identifies one abstract-state slot, in declaration order.
    AbstractStateIndex
}

declare_index! {
    /// Identifies one numeric (vector-valued) parameter group.
    NumericParameterIndex
}

declare_index! {
    /// Identifies one abstract (type-erased) parameter.
    AbstractParameterIndex
}

declare_index! {
    /// Identifies one cache entry, in declaration order.
    ///
    /// Output ports hold a `CacheIndex` into the node's cache-entry list;
    /// the entry and the port have distinct dependency tickets.
    CacheIndex
}

/// Identifies one logical "a value changed" notification wave within a
/// context.
///
/// Allocated monotonically by the context's dependency graph. Trackers
/// stamp the last change event they saw, which both deduplicates diamond
/// propagation and terminates traversal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChangeEventId(pub u64);

impl fmt::Display for ChangeEventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_are_ordered_and_displayable() {
        assert!(InputPortIndex(0) < InputPortIndex(3));
        assert_eq!(OutputPortIndex::from(7).to_string(), "7");
        assert_eq!(CacheIndex(2), CacheIndex(2));
    }
}
