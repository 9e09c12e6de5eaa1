//! Per-context cache value storage.
//!
//! One [`CacheValue`] slot exists per cache entry the node declares. A
//! slot holds the computed value (lazily allocated) and an out-of-date
//! flag. The flag discipline belongs to the dependency-tracking
//! substrate: the runtime recomputes only when a slot is stale, and the
//! graph marks slots stale when an upstream value changes.

use weft_core::{AbstractValue, CacheIndex};

/// One cache slot: an optional computed value plus a staleness flag.
///
/// Slots start out of date with no value; the first evaluation allocates
/// the value via the entry's allocator and computes it.
#[derive(Clone, Debug, Default)]
pub struct CacheValue {
    value: Option<Box<dyn AbstractValue>>,
    up_to_date: bool,
}

impl CacheValue {
    /// Whether the slot must be recomputed before being served.
    pub fn is_out_of_date(&self) -> bool {
        !self.up_to_date
    }

    /// Mark the slot current. Used by the evaluation path after a
    /// successful compute, and by the feedthrough prober to force a
    /// known-clean baseline.
    pub fn mark_up_to_date(&mut self) {
        self.up_to_date = true;
    }

    /// Mark the slot stale.
    pub fn mark_out_of_date(&mut self) {
        self.up_to_date = false;
    }

    /// Whether a value has ever been stored.
    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    /// Borrow the stored value, if any.
    ///
    /// The value may be stale; check [`is_out_of_date`](Self::is_out_of_date)
    /// first when freshness matters.
    pub fn value(&self) -> Option<&dyn AbstractValue> {
        self.value.as_deref()
    }

    /// Remove and return the stored value, leaving the slot empty.
    ///
    /// The evaluation path takes the value out, computes into it, and
    /// puts it back, so the computation can borrow the context freely.
    pub fn take_value(&mut self) -> Option<Box<dyn AbstractValue>> {
        self.value.take()
    }

    /// Store a value. Does not change the staleness flag.
    pub fn put_value(&mut self, value: Box<dyn AbstractValue>) {
        self.value = Some(value);
    }
}

/// The cache slots of one context, addressed by [`CacheIndex`].
#[derive(Clone, Debug, Default)]
pub struct Cache {
    entries: Vec<CacheValue>,
}

impl Cache {
    /// A cache with `n` empty, out-of-date slots.
    pub fn new(n: usize) -> Self {
        Self {
            entries: (0..n).map(|_| CacheValue::default()).collect(),
        }
    }

    /// Number of slots.
    pub fn num_entries(&self) -> usize {
        self.entries.len()
    }

    /// Borrow slot `index`. Panics if out of range; cache indices come
    /// from declaration order and the cache is sized to match.
    pub fn entry(&self, index: CacheIndex) -> &CacheValue {
        &self.entries[index.0 as usize]
    }

    /// Mutably borrow slot `index`. Panics if out of range.
    pub fn entry_mut(&mut self, index: CacheIndex) -> &mut CacheValue {
        &mut self.entries[index.0 as usize]
    }
}
