//! Dependency tickets and the [`TicketSet`] ordered set.
//!
//! A ticket names one trackable quantity in a context's dependency graph:
//! a state partition, a parameter group, an input port, or one of the
//! built-in aggregates. Cache entries declare the tickets they depend on;
//! the feedthrough analyzer classifies tickets by whether they can carry
//! input influence.

use smallvec::SmallVec;
use std::fmt;

use crate::id::{
    AbstractParameterIndex, AbstractStateIndex, CacheIndex, DiscreteStateIndex, InputPortIndex,
    NumericParameterIndex, OutputPortIndex,
};

/// An opaque identifier for a trackable quantity in the dependency graph.
///
/// The aggregate variants (`AllDiscreteState`, `AllParameters`,
/// `AllInputPorts`, `AllState`, `AllSources`) subscribe to their
/// constituents when a context is built, so a change to any constituent
/// reaches subscribers of the aggregate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Ticket {
    /// The context's time value.
    Time,
    /// The context's accuracy setting.
    Accuracy,
    /// The continuous-state vector.
    ContinuousState,
    /// One discrete-state group.
    DiscreteState(DiscreteStateIndex),
    /// Every discrete-state group.
    AllDiscreteState,
    /// One abstract-state slot.
    AbstractState(AbstractStateIndex),
    /// Every abstract-state slot.
    AllAbstractState,
    /// One numeric parameter group.
    NumericParameter(NumericParameterIndex),
    /// One abstract parameter.
    AbstractParameter(AbstractParameterIndex),
    /// Every parameter, numeric and abstract.
    AllParameters,
    /// The complete state: continuous, discrete, and abstract.
    AllState,
    /// Everything a computation could read: time, accuracy, state,
    /// parameters, and all input ports.
    AllSources,
    /// One input port's value.
    InputPort(InputPortIndex),
    /// Every input port. The "all inputs" sentinel of feedthrough
    /// analysis.
    AllInputPorts,
    /// One cache entry's value.
    Cache(CacheIndex),
    /// One output port. Distinct from the backing cache entry's ticket;
    /// the port tracker observes the cache tracker per context.
    OutputPort(OutputPortIndex),
}

impl Ticket {
    /// Whether this ticket provably cannot carry input-port influence.
    ///
    /// Time, accuracy, state, and parameters are set directly on the
    /// context, never computed from inputs, so an output whose
    /// prerequisites are all input-independent is feedthrough-free
    /// without further analysis. Aggregates that include inputs
    /// (`AllSources`, `AllInputPorts`), input ports themselves, and
    /// computed quantities (cache entries, output ports) are not.
    pub fn is_input_independent(&self) -> bool {
        match self {
            Self::Time
            | Self::Accuracy
            | Self::ContinuousState
            | Self::DiscreteState(_)
            | Self::AllDiscreteState
            | Self::AbstractState(_)
            | Self::AllAbstractState
            | Self::NumericParameter(_)
            | Self::AbstractParameter(_)
            | Self::AllParameters
            | Self::AllState => true,
            Self::AllSources
            | Self::InputPort(_)
            | Self::AllInputPorts
            | Self::Cache(_)
            | Self::OutputPort(_) => false,
        }
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Time => write!(f, "time"),
            Self::Accuracy => write!(f, "accuracy"),
            Self::ContinuousState => write!(f, "xc"),
            Self::DiscreteState(i) => write!(f, "xd[{i}]"),
            Self::AllDiscreteState => write!(f, "xd"),
            Self::AbstractState(i) => write!(f, "xa[{i}]"),
            Self::AllAbstractState => write!(f, "xa"),
            Self::NumericParameter(i) => write!(f, "pn[{i}]"),
            Self::AbstractParameter(i) => write!(f, "pa[{i}]"),
            Self::AllParameters => write!(f, "p"),
            Self::AllState => write!(f, "x"),
            Self::AllSources => write!(f, "all_sources"),
            Self::InputPort(i) => write!(f, "u[{i}]"),
            Self::AllInputPorts => write!(f, "u"),
            Self::Cache(i) => write!(f, "cache[{i}]"),
            Self::OutputPort(i) => write!(f, "y[{i}]"),
        }
    }
}

/// An ordered set of [`Ticket`]s.
///
/// Used for cache-entry prerequisite sets, which are small (usually one
/// to a handful of tickets), so the representation is a sorted inline
/// vector rather than a hash set. Iteration order is ascending and
/// deterministic.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TicketSet {
    tickets: SmallVec<[Ticket; 8]>,
}

impl TicketSet {
    /// Create an empty ticket set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a set containing exactly one ticket.
    pub fn single(ticket: Ticket) -> Self {
        let mut set = Self::empty();
        set.insert(ticket);
        set
    }

    /// Insert a ticket. Inserting a ticket already present is a no-op.
    pub fn insert(&mut self, ticket: Ticket) {
        if let Err(pos) = self.tickets.binary_search(&ticket) {
            self.tickets.insert(pos, ticket);
        }
    }

    /// Whether the set contains a ticket.
    pub fn contains(&self, ticket: Ticket) -> bool {
        self.tickets.binary_search(&ticket).is_ok()
    }

    /// Return the union of two sets (`self | other`).
    pub fn union(&self, other: &Self) -> Self {
        let mut result = self.clone();
        for &t in &other.tickets {
            result.insert(t);
        }
        result
    }

    /// Return the intersection of two sets (`self & other`).
    pub fn intersection(&self, other: &Self) -> Self {
        Self {
            tickets: self
                .tickets
                .iter()
                .copied()
                .filter(|&t| other.contains(t))
                .collect(),
        }
    }

    /// Return the set difference (`self - other`).
    pub fn difference(&self, other: &Self) -> Self {
        Self {
            tickets: self
                .tickets
                .iter()
                .copied()
                .filter(|&t| !other.contains(t))
                .collect(),
        }
    }

    /// Whether every ticket in `self` is also in `other`.
    pub fn is_subset(&self, other: &Self) -> bool {
        self.tickets.iter().all(|&t| other.contains(t))
    }

    /// Returns `true` if the set contains no tickets.
    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    /// Returns the number of tickets in the set.
    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    /// Iterate over the tickets in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = Ticket> + '_ {
        self.tickets.iter().copied()
    }
}

impl FromIterator<Ticket> for TicketSet {
    fn from_iter<I: IntoIterator<Item = Ticket>>(iter: I) -> Self {
        let mut set = Self::empty();
        for ticket in iter {
            set.insert(ticket);
        }
        set
    }
}

impl<'a> IntoIterator for &'a TicketSet {
    type Item = Ticket;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, Ticket>>;

    fn into_iter(self) -> Self::IntoIter {
        self.tickets.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_ticket() -> impl Strategy<Value = Ticket> {
        prop_oneof![
            Just(Ticket::Time),
            Just(Ticket::Accuracy),
            Just(Ticket::ContinuousState),
            (0u32..16).prop_map(|i| Ticket::DiscreteState(DiscreteStateIndex(i))),
            (0u32..16).prop_map(|i| Ticket::AbstractState(AbstractStateIndex(i))),
            (0u32..16).prop_map(|i| Ticket::NumericParameter(NumericParameterIndex(i))),
            (0u32..16).prop_map(|i| Ticket::InputPort(InputPortIndex(i))),
            (0u32..16).prop_map(|i| Ticket::Cache(CacheIndex(i))),
            Just(Ticket::AllInputPorts),
            Just(Ticket::AllSources),
        ]
    }

    fn arb_ticket_set() -> impl Strategy<Value = TicketSet> {
        prop::collection::vec(arb_ticket(), 0..24).prop_map(TicketSet::from_iter)
    }

    #[test]
    fn input_independence_classification() {
        assert!(Ticket::Time.is_input_independent());
        assert!(Ticket::ContinuousState.is_input_independent());
        assert!(Ticket::NumericParameter(NumericParameterIndex(0)).is_input_independent());
        assert!(Ticket::AllState.is_input_independent());
        assert!(!Ticket::InputPort(InputPortIndex(0)).is_input_independent());
        assert!(!Ticket::AllInputPorts.is_input_independent());
        assert!(!Ticket::AllSources.is_input_independent());
        assert!(!Ticket::Cache(CacheIndex(0)).is_input_independent());
        assert!(!Ticket::OutputPort(OutputPortIndex(0)).is_input_independent());
    }

    #[test]
    fn insert_is_idempotent_and_sorted() {
        let mut set = TicketSet::empty();
        set.insert(Ticket::AllInputPorts);
        set.insert(Ticket::Time);
        set.insert(Ticket::Time);
        assert_eq!(set.len(), 2);
        let collected: Vec<_> = set.iter().collect();
        assert_eq!(collected, vec![Ticket::Time, Ticket::AllInputPorts]);
    }

    proptest! {
        #[test]
        fn union_commutative(a in arb_ticket_set(), b in arb_ticket_set()) {
            prop_assert_eq!(a.union(&b), b.union(&a));
        }

        #[test]
        fn union_associative(
            a in arb_ticket_set(),
            b in arb_ticket_set(),
            c in arb_ticket_set(),
        ) {
            prop_assert_eq!(a.union(&b).union(&c), a.union(&b.union(&c)));
        }

        #[test]
        fn union_idempotent(a in arb_ticket_set()) {
            prop_assert_eq!(a.union(&a), a.clone());
        }

        #[test]
        fn intersection_commutative(a in arb_ticket_set(), b in arb_ticket_set()) {
            prop_assert_eq!(a.intersection(&b), b.intersection(&a));
        }

        #[test]
        fn intersection_with_empty(a in arb_ticket_set()) {
            prop_assert_eq!(a.intersection(&TicketSet::empty()), TicketSet::empty());
        }

        #[test]
        fn difference_removes_common(a in arb_ticket_set(), b in arb_ticket_set()) {
            let diff = a.difference(&b);
            for t in diff.iter() {
                prop_assert!(a.contains(t));
                prop_assert!(!b.contains(t));
            }
        }

        #[test]
        fn subset_reflexive(a in arb_ticket_set()) {
            prop_assert!(a.is_subset(&a));
        }

        #[test]
        fn empty_is_subset(a in arb_ticket_set()) {
            prop_assert!(TicketSet::empty().is_subset(&a));
        }

        #[test]
        fn len_matches_iter_count(a in arb_ticket_set()) {
            prop_assert_eq!(a.len(), a.iter().count());
        }

        #[test]
        fn iter_is_sorted(a in arb_ticket_set()) {
            let collected: Vec<_> = a.iter().collect();
            let mut sorted = collected.clone();
            sorted.sort();
            prop_assert_eq!(collected, sorted);
        }
    }
}
