//! The symbolic inspector seam.
//!
//! The feedthrough analyzer's last resort is a symbolic model of the
//! node that can answer input→output connectivity exactly. Building one
//! is the job of an external symbolic-expression engine; this module
//! only defines the contract. Construction may fail (unsupported scalar
//! type, unconvertible structure), in which case the analyzer falls back
//! to conservatively marking the remaining pairs as feedthrough.

use weft_core::{InputPortIndex, OutputPortIndex};

use crate::node::LeafNode;

/// Answers input→output connectivity queries for one node.
pub trait SymbolicInspector {
    /// Whether input `input` is structurally connected to output
    /// `output` — i.e. whether the output's expression mentions the
    /// input.
    fn is_connected_input_to_output(&self, input: InputPortIndex, output: OutputPortIndex) -> bool;
}

/// Builds a [`SymbolicInspector`] for a node, or `None` when the node
/// cannot be converted to symbolic form. Failure is silent by design;
/// over-reporting feedthrough is always safe.
pub type InspectorFactory<T> = Box<dyn Fn(&LeafNode<T>) -> Option<Box<dyn SymbolicInspector>>>;
