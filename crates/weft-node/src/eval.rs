//! Output-port and cache-entry evaluation.
//!
//! Evaluation follows the recompute-only-if-stale discipline: a cache
//! value is recomputed exactly when its slot is out of date, then served
//! from the cache. Staleness bookkeeping itself belongs to the
//! dependency-tracking substrate; this module only supplies the compute
//! calls and the downcast to the declared vector type.

use weft_context::Context;
use weft_core::{AbstractValue, CacheIndex, ComputeError, DenseVector, OutputPortIndex, Scalar};

use crate::node::LeafNode;

impl<T: Scalar> LeafNode<T> {
    /// Evaluate an output port, recomputing only if its cache value is
    /// out of date.
    ///
    /// Panics if `port` is not a declared output port.
    pub fn eval_output_port<'a>(
        &self,
        context: &'a mut Context<T>,
        port: OutputPortIndex,
    ) -> Result<&'a dyn AbstractValue, ComputeError> {
        let cache_index = self.output_ports[port.0 as usize].cache_index();
        self.eval_cache_entry(context, cache_index)
    }

    /// Evaluate an output port and downcast the result to the declared
    /// vector type.
    ///
    /// A holder of any other type is a [`ComputeError::VectorTypeMismatch`]
    /// naming the output port and the node — a programming error, not a
    /// user error.
    pub fn eval_vector_output_port<'a>(
        &self,
        context: &'a mut Context<T>,
        port: OutputPortIndex,
    ) -> Result<&'a DenseVector<T>, ComputeError> {
        let value = self.eval_output_port(context, port)?;
        let actual = value.type_name();
        value
            .downcast_ref::<DenseVector<T>>()
            .ok_or(ComputeError::VectorTypeMismatch {
                node: self.name.clone(),
                output: port,
                expected: std::any::type_name::<DenseVector<T>>(),
                actual,
            })
    }

    /// Compute an output port's value unconditionally into a
    /// caller-provided holder, bypassing the cache.
    ///
    /// Panics if `port` is not a declared output port.
    pub fn calc_output_port(
        &self,
        context: &Context<T>,
        port: OutputPortIndex,
        holder: &mut dyn AbstractValue,
    ) -> Result<(), ComputeError> {
        let cache_index = self.output_ports[port.0 as usize].cache_index();
        self.cache_entries[cache_index.0 as usize].calc(context, holder)
    }

    /// Evaluate a cache entry, recomputing only if its slot is out of
    /// date.
    ///
    /// Panics if `index` is not a declared cache entry.
    pub fn eval_cache_entry<'a>(
        &self,
        context: &'a mut Context<T>,
        index: CacheIndex,
    ) -> Result<&'a dyn AbstractValue, ComputeError> {
        let entry = &self.cache_entries[index.0 as usize];
        if context.cache().entry(index).is_out_of_date() {
            // Take the holder out so the compute call can borrow the
            // context freely, then put it back before reporting.
            let mut holder = context
                .cache_mut()
                .entry_mut(index)
                .take_value()
                .unwrap_or_else(|| entry.allocate());
            let result = entry.calc(context, &mut *holder);
            context.cache_mut().entry_mut(index).put_value(holder);
            result?;
            context.cache_mut().entry_mut(index).mark_up_to_date();
        }
        Ok(context
            .cache()
            .entry(index)
            .value()
            .expect("evaluation stores a value before serving"))
    }
}
