//! The context-scoped dependency-tracking substrate.
//!
//! Every trackable quantity has a tracker addressed by its
//! [`Ticket`]. Trackers hold subscriber edges: when a value changes, the
//! change propagates downstream through subscribers, and every cache
//! entry reached is reported so the owning context can mark it out of
//! date. Change events are numbered; trackers stamp the last event they
//! saw, which both deduplicates diamond-shaped propagation and
//! terminates traversal.
//!
//! The graph stores no values and computes nothing. It answers exactly
//! one question — "which cache entries are downstream of this ticket?" —
//! which is also the question the feedthrough analyzer probes.

use indexmap::IndexMap;
use smallvec::SmallVec;

use weft_core::{CacheIndex, ChangeEventId, Ticket};

/// Cache entries reached by one change-propagation wave.
pub type AffectedCaches = SmallVec<[CacheIndex; 8]>;

#[derive(Debug, Default)]
struct Tracker {
    subscribers: Vec<Ticket>,
    last_change_event: Option<ChangeEventId>,
    cache_index: Option<CacheIndex>,
}

/// Tracker table plus change-event counter for one context.
#[derive(Debug)]
pub struct DependencyGraph {
    trackers: IndexMap<Ticket, Tracker>,
    next_change_event: u64,
}

impl DependencyGraph {
    /// Create a graph with the built-in tickets and their aggregate
    /// subscriptions wired.
    ///
    /// The aggregates mirror the data model: `AllState` covers the three
    /// state partitions, `AllSources` covers time, accuracy, state,
    /// parameters, and inputs. Per-entity tickets (discrete groups,
    /// parameter groups, ports, cache entries) are registered by the
    /// node's allocator, which knows the declared counts.
    pub fn new() -> Self {
        let mut graph = Self {
            trackers: IndexMap::new(),
            next_change_event: 0,
        };
        for ticket in [
            Ticket::Time,
            Ticket::Accuracy,
            Ticket::ContinuousState,
            Ticket::AllDiscreteState,
            Ticket::AllAbstractState,
            Ticket::AllParameters,
            Ticket::AllState,
            Ticket::AllInputPorts,
            Ticket::AllSources,
        ] {
            graph.register(ticket);
        }
        graph.subscribe(Ticket::AllState, Ticket::ContinuousState);
        graph.subscribe(Ticket::AllState, Ticket::AllDiscreteState);
        graph.subscribe(Ticket::AllState, Ticket::AllAbstractState);
        graph.subscribe(Ticket::AllSources, Ticket::Time);
        graph.subscribe(Ticket::AllSources, Ticket::Accuracy);
        graph.subscribe(Ticket::AllSources, Ticket::AllState);
        graph.subscribe(Ticket::AllSources, Ticket::AllParameters);
        graph.subscribe(Ticket::AllSources, Ticket::AllInputPorts);
        graph
    }

    /// Ensure a tracker exists for `ticket`. Idempotent.
    pub fn register(&mut self, ticket: Ticket) {
        self.trackers.entry(ticket).or_default();
    }

    /// Make `subscriber` receive change notifications from `upstream`.
    ///
    /// Both trackers are registered if absent. Duplicate edges are
    /// ignored.
    pub fn subscribe(&mut self, subscriber: Ticket, upstream: Ticket) {
        self.register(subscriber);
        let tracker = self.trackers.entry(upstream).or_default();
        if !tracker.subscribers.contains(&subscriber) {
            tracker.subscribers.push(subscriber);
        }
    }

    /// Associate a ticket with the cache entry whose staleness it
    /// governs.
    pub fn set_cache_index(&mut self, ticket: Ticket, cache: CacheIndex) {
        self.trackers.entry(ticket).or_default().cache_index = Some(cache);
    }

    /// Allocate a fresh change-event number.
    pub fn start_new_change_event(&mut self) -> ChangeEventId {
        self.next_change_event += 1;
        ChangeEventId(self.next_change_event)
    }

    /// Propagate "the value behind `ticket` changed" downstream.
    ///
    /// Returns every cache entry reached. Trackers already stamped with
    /// `event` are skipped, so repeated notifications within one change
    /// event are free and cycles terminate.
    pub fn note_value_change(&mut self, ticket: Ticket, event: ChangeEventId) -> AffectedCaches {
        let mut affected = AffectedCaches::new();
        let mut worklist: SmallVec<[Ticket; 16]> = SmallVec::new();
        worklist.push(ticket);
        while let Some(current) = worklist.pop() {
            let tracker = self.trackers.entry(current).or_default();
            if tracker.last_change_event == Some(event) {
                continue;
            }
            tracker.last_change_event = Some(event);
            if let Some(cache) = tracker.cache_index {
                affected.push(cache);
            }
            worklist.extend(tracker.subscribers.iter().copied());
        }
        affected
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}
