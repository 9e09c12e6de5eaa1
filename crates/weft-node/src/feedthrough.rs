//! Three-phase feedthrough analysis.
//!
//! For every (input, output) pair, decide whether the output can be
//! causally affected by the input. The phases fall back in order of
//! increasing cost:
//!
//! 1. Declared-dependency inspection of each output's prerequisite set.
//! 2. Dependency-graph probing on a throwaway scratch context.
//! 3. The symbolic inspector, degrading to a conservative
//!    all-feedthrough answer when no inspector can be built.
//!
//! The result is a relation, not a matrix: absence of a pair means the
//! output is provably independent of the input.

use indexmap::IndexSet;

use weft_core::{AllocationError, InputPortIndex, OutputPortIndex, Scalar, Ticket};

use crate::node::LeafNode;
use crate::symbolic::SymbolicInspector;

/// The input→output feedthrough relation.
pub type FeedthroughPairs = IndexSet<(InputPortIndex, OutputPortIndex)>;

impl<T: Scalar> LeafNode<T> {
    /// Compute the full input→output feedthrough relation.
    ///
    /// The only failure mode is scratch-context allocation for phase 2;
    /// symbolic-inspector failure is silent and conservative by design.
    pub fn direct_feedthroughs(&self) -> Result<FeedthroughPairs, AllocationError> {
        let mut feedthrough = FeedthroughPairs::new();
        // Pairs the declared prerequisites could not decide.
        let mut unknown: Vec<(InputPortIndex, OutputPortIndex)> = Vec::new();

        // Phase 1: the prerequisite set alone often decides an output
        // without touching the dependency graph.
        for output in &self.output_ports {
            let o = output.index();
            let prerequisites = self.cache_entries[output.cache_index().0 as usize].prerequisites();

            // The "all inputs" sentinel decides the whole row at once.
            if prerequisites.contains(Ticket::AllInputPorts) {
                for input in &self.input_ports {
                    feedthrough.insert((input.index(), o));
                }
                continue;
            }

            // Prerequisites that provably carry no input influence
            // (time, state, parameters, ...) decide the row the other
            // way: nothing to report, nothing left unknown.
            if prerequisites.iter().all(|t| t.is_input_independent()) {
                continue;
            }

            for input in &self.input_ports {
                if prerequisites.contains(input.ticket()) {
                    feedthrough.insert((input.index(), o));
                } else {
                    unknown.push((input.index(), o));
                }
            }
        }

        if unknown.is_empty() {
            return Ok(feedthrough);
        }

        // Phase 2: probe the dependency graph on a throwaway context.
        // Entries left at the library-default prerequisites carry no
        // information and are skipped here, staying unknown. The scratch
        // context never escapes this analysis.
        let mut scratch = self.allocate_context()?;
        unknown.retain(|&(i, o)| {
            let cache_index = self.output_ports[o.0 as usize].cache_index();
            if self.cache_entries[cache_index.0 as usize].has_default_prerequisites() {
                return true;
            }

            // Force a clean baseline, poke the input's tracker, and
            // believe the staleness answer.
            scratch.cache_mut().entry_mut(cache_index).mark_up_to_date();
            let change_event = scratch.start_new_change_event();
            scratch.note_value_change(Ticket::InputPort(i), change_event);
            if scratch.cache().entry(cache_index).is_out_of_date() {
                feedthrough.insert((i, o));
            }
            // Undo the forced-valid mark so no garbage value is left
            // looking current.
            scratch.cache_mut().entry_mut(cache_index).mark_out_of_date();

            // Probed pairs are decided either way.
            false
        });
        drop(scratch);

        if unknown.is_empty() {
            return Ok(feedthrough);
        }

        // Phase 3: symbolic fallback. Without an inspector, every
        // remaining pair is conservatively feedthrough — over-reporting
        // is always safe.
        let inspector = self.make_symbolic_inspector();
        for (i, o) in unknown {
            let connected = match &inspector {
                Some(inspector) => inspector.is_connected_input_to_output(i, o),
                None => true,
            };
            if connected {
                feedthrough.insert((i, o));
            }
        }
        Ok(feedthrough)
    }

    /// Build the symbolic inspector, or `None` when the node has no
    /// factory or the factory cannot convert this node.
    pub fn make_symbolic_inspector(&self) -> Option<Box<dyn SymbolicInspector>> {
        self.inspector_factory.as_ref().and_then(|factory| factory(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_core::{DenseVector, TicketSet};

    fn pair(i: u32, o: u32) -> (InputPortIndex, OutputPortIndex) {
        (InputPortIndex(i), OutputPortIndex(o))
    }

    /// Two inputs, no outputs yet.
    fn two_input_node() -> LeafNode<f64> {
        let mut node = LeafNode::new("probe");
        node.declare_vector_input_port("u0", DenseVector::zeros(1));
        node.declare_vector_input_port("u1", DenseVector::zeros(1));
        node
    }

    #[test]
    fn all_inputs_sentinel_marks_the_whole_row() {
        let mut node = two_input_node();
        node.declare_vector_output_port(
            "y0",
            DenseVector::zeros(1),
            |_, _| Ok(()),
            TicketSet::single(Ticket::AllInputPorts),
        )
        .unwrap();

        let result = node.direct_feedthroughs().unwrap();
        assert!(result.contains(&pair(0, 0)));
        assert!(result.contains(&pair(1, 0)));
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn state_only_prerequisites_mark_nothing() {
        let mut node = two_input_node();
        node.declare_continuous_state(1);
        node.declare_vector_output_port(
            "y0",
            DenseVector::zeros(1),
            |_, _| Ok(()),
            TicketSet::single(Ticket::ContinuousState),
        )
        .unwrap();

        let result = node.direct_feedthroughs().unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn direct_input_ticket_marks_exactly_that_pair() {
        let mut node = two_input_node();
        // y0 depends on u1 plus time: u1 is decided directly, u0 goes to
        // graph probing and is proven independent there.
        node.declare_vector_output_port(
            "y0",
            DenseVector::zeros(1),
            |_, _| Ok(()),
            TicketSet::from_iter([Ticket::InputPort(InputPortIndex(1)), Ticket::Time]),
        )
        .unwrap();

        let result = node.direct_feedthroughs().unwrap();
        assert!(result.contains(&pair(1, 0)));
        assert!(!result.contains(&pair(0, 0)));
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn mixed_rows_combine_phase_one_and_two() {
        let mut node = two_input_node();
        node.declare_continuous_state(1);
        // y0 fed by u0 directly; y1 state-only; y2 fed by both inputs.
        node.declare_vector_output_port(
            "y0",
            DenseVector::zeros(1),
            |_, _| Ok(()),
            TicketSet::from_iter([
                Ticket::InputPort(InputPortIndex(0)),
                Ticket::ContinuousState,
            ]),
        )
        .unwrap();
        node.declare_vector_output_port(
            "y1",
            DenseVector::zeros(1),
            |_, _| Ok(()),
            TicketSet::single(Ticket::ContinuousState),
        )
        .unwrap();
        node.declare_vector_output_port(
            "y2",
            DenseVector::zeros(1),
            |_, _| Ok(()),
            TicketSet::single(Ticket::AllInputPorts),
        )
        .unwrap();

        let result = node.direct_feedthroughs().unwrap();
        let expected: FeedthroughPairs =
            [pair(0, 0), pair(0, 2), pair(1, 2)].into_iter().collect();
        assert_eq!(result, expected);
    }

    #[test]
    fn default_prerequisites_without_inspector_are_conservative() {
        let mut node = two_input_node();
        node.declare_vector_output_port_with_default_prerequisites(
            "y0",
            DenseVector::zeros(1),
            |_, _| Ok(()),
        )
        .unwrap();

        // No inspector factory: phase 2 skips the default-prerequisite
        // entry and phase 3 marks everything feedthrough.
        let result = node.direct_feedthroughs().unwrap();
        assert!(result.contains(&pair(0, 0)));
        assert!(result.contains(&pair(1, 0)));
    }

    #[test]
    fn inspector_answers_are_believed() {
        struct OnlyFirstInput;
        impl SymbolicInspector for OnlyFirstInput {
            fn is_connected_input_to_output(
                &self,
                input: InputPortIndex,
                _output: OutputPortIndex,
            ) -> bool {
                input == InputPortIndex(0)
            }
        }

        let mut node = two_input_node();
        node.declare_vector_output_port_with_default_prerequisites(
            "y0",
            DenseVector::zeros(1),
            |_, _| Ok(()),
        )
        .unwrap();
        node.set_symbolic_inspector_factory(|_| Some(Box::new(OnlyFirstInput)));

        let result = node.direct_feedthroughs().unwrap();
        assert!(result.contains(&pair(0, 0)));
        assert!(!result.contains(&pair(1, 0)));
    }

    #[test]
    fn factory_returning_none_degrades_conservatively() {
        let mut node = two_input_node();
        node.declare_vector_output_port_with_default_prerequisites(
            "y0",
            DenseVector::zeros(1),
            |_, _| Ok(()),
        )
        .unwrap();
        node.set_symbolic_inspector_factory(|_| None);

        let result = node.direct_feedthroughs().unwrap();
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn no_ports_means_empty_relation() {
        let node = LeafNode::<f64>::new("empty");
        assert!(node.direct_feedthroughs().unwrap().is_empty());

        // Inputs without outputs decide nothing either.
        let node = two_input_node();
        assert!(node.direct_feedthroughs().unwrap().is_empty());
    }
}
