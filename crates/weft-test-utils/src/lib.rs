//! Test utilities and mock collaborators for Weft development.
//!
//! Provides a deliberately non-contiguous [`ScatterVector`] for
//! exercising the allocator's storage invariant, a canned
//! [`FixedInspector`] for feedthrough fallback tests, and a small
//! [`CallRecorder`] for asserting handler invocation order.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use weft_core::{InputPortIndex, OutputPortIndex, Scalar, VectorBase};
use weft_node::SymbolicInspector;

/// A numeric vector stored in two separate allocations.
///
/// Implements the full [`VectorBase`] contract but returns `None` from
/// the contiguity probes, simulating a scatter-gather view. Registering
/// one as a state or parameter model makes context allocation fail the
/// contiguous-storage invariant.
#[derive(Clone, Debug)]
pub struct ScatterVector<T: Scalar> {
    head: Vec<T>,
    tail: Vec<T>,
}

impl<T: Scalar> ScatterVector<T> {
    /// Split `values` into two backing allocations at `at`.
    pub fn split(values: Vec<T>, at: usize) -> Self {
        let mut head = values;
        let tail = head.split_off(at.min(head.len()));
        Self { head, tail }
    }
}

impl<T: Scalar> VectorBase<T> for ScatterVector<T> {
    fn len(&self) -> usize {
        self.head.len() + self.tail.len()
    }

    fn get(&self, i: usize) -> T {
        if i < self.head.len() {
            self.head[i]
        } else {
            self.tail[i - self.head.len()]
        }
    }

    fn set(&mut self, i: usize, v: T) {
        if i < self.head.len() {
            self.head[i] = v;
        } else {
            let offset = self.head.len();
            self.tail[i - offset] = v;
        }
    }

    fn as_slice(&self) -> Option<&[T]> {
        None
    }

    fn as_mut_slice(&mut self) -> Option<&mut [T]> {
        None
    }
}

/// A [`SymbolicInspector`] answering from a fixed set of connected
/// pairs.
#[derive(Clone, Debug, Default)]
pub struct FixedInspector {
    connected: HashSet<(InputPortIndex, OutputPortIndex)>,
}

impl FixedInspector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `input` connected to `output`.
    pub fn connect(mut self, input: InputPortIndex, output: OutputPortIndex) -> Self {
        self.connected.insert((input, output));
        self
    }
}

impl SymbolicInspector for FixedInspector {
    fn is_connected_input_to_output(&self, input: InputPortIndex, output: OutputPortIndex) -> bool {
        self.connected.contains(&(input, output))
    }
}

/// Shared, clonable log of named calls for asserting handler order.
#[derive(Clone, Debug, Default)]
pub struct CallRecorder {
    calls: Rc<RefCell<Vec<&'static str>>>,
}

impl CallRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one call.
    pub fn record(&self, name: &'static str) {
        self.calls.borrow_mut().push(name);
    }

    /// The calls recorded so far, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }
}
