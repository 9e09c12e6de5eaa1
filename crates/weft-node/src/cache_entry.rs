//! Cache entry declarations.
//!
//! A cache entry associates an output port's computation with the
//! tickets it depends on: an allocator producing a default-valued result
//! holder, a side-effect-free compute function, and a non-empty
//! prerequisite set. The entry itself is declaration-time data; the
//! computed value lives in each context's cache store.

use weft_context::Context;
use weft_core::{AbstractValue, CacheIndex, ComputeError, Scalar, Ticket, TicketSet};

/// Allocates a default-valued result holder for a cache entry.
pub type AllocateFn = Box<dyn Fn() -> Box<dyn AbstractValue>>;

/// Computes a cache entry's value from a context.
///
/// Must be side-effect-free with respect to the context; staleness
/// bookkeeping belongs to the dependency-tracking substrate.
pub type CalcFn<T> = Box<dyn Fn(&Context<T>, &mut dyn AbstractValue) -> Result<(), ComputeError>>;

/// One declared cache entry.
pub struct CacheEntry<T: Scalar> {
    index: CacheIndex,
    description: String,
    allocate: AllocateFn,
    calc: CalcFn<T>,
    prerequisites: TicketSet,
    default_prerequisites: bool,
}

impl<T: Scalar> CacheEntry<T> {
    pub(crate) fn new(
        index: CacheIndex,
        description: String,
        allocate: AllocateFn,
        calc: CalcFn<T>,
        prerequisites: TicketSet,
        default_prerequisites: bool,
    ) -> Self {
        Self {
            index,
            description,
            allocate,
            calc,
            prerequisites,
            default_prerequisites,
        }
    }

    /// The entry's index.
    pub fn index(&self) -> CacheIndex {
        self.index
    }

    /// Human-readable description, used in diagnostics.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The entry's dependency ticket.
    pub fn ticket(&self) -> Ticket {
        Ticket::Cache(self.index)
    }

    /// The declared prerequisite tickets. Never empty.
    pub fn prerequisites(&self) -> &TicketSet {
        &self.prerequisites
    }

    /// Whether the prerequisites were left at the library default
    /// (`{AllSources}`) rather than declared explicitly.
    ///
    /// A default set carries no dependency information, so feedthrough
    /// graph probing skips such entries.
    pub fn has_default_prerequisites(&self) -> bool {
        self.default_prerequisites
    }

    /// Allocate a fresh default-valued result holder.
    pub fn allocate(&self) -> Box<dyn AbstractValue> {
        (self.allocate)()
    }

    /// Compute the value from `context` into `holder`.
    pub fn calc(
        &self,
        context: &Context<T>,
        holder: &mut dyn AbstractValue,
    ) -> Result<(), ComputeError> {
        (self.calc)(context, holder)
    }
}

impl<T: Scalar> std::fmt::Debug for CacheEntry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheEntry")
            .field("index", &self.index)
            .field("description", &self.description)
            .field("prerequisites", &self.prerequisites)
            .field("default_prerequisites", &self.default_prerequisites)
            .finish_non_exhaustive()
    }
}
