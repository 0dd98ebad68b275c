//! Bounded network discovery.
//!
//! A [`NetworkCache`] is one node's snapshot of everything reachable through
//! a chain of conduits: every endpoint that could give energy (a source) and
//! every endpoint that could take it (a sink), each with its hop distance.
//! Caches store positions, never live handles, and are rebuilt wholesale.

use std::collections::{BTreeSet, VecDeque};

use resonance_core::energy::{EnergyEndpoint, is_valid_sink, is_valid_source};
use resonance_core::grid::GridAccessor;
use resonance_core::pos::CellPos;

/// An endpoint found during discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CachedEndpoint {
    pub pos: CellPos,
    /// Hops from the discovering node: its adjacent endpoints are at 1.
    pub distance: u32,
}

/// Sources and sinks reachable from one conduit node at build time.
///
/// Both lists are in discovery order, which is also routing order. An
/// endpoint appears at most once per list, at its shortest distance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkCache {
    sources: Vec<CachedEndpoint>,
    sinks: Vec<CachedEndpoint>,
    conduit_count: usize,
    truncated: bool,
}

impl NetworkCache {
    /// Breadth-first search from `origin` through adjacent conduits.
    ///
    /// Conduits further than `max_network_size` hops are not expanded; the
    /// cache is then marked truncated. Each conduit is visited once, so
    /// loops terminate.
    pub fn discover<G: GridAccessor + ?Sized>(
        origin: CellPos,
        grid: &G,
        max_network_size: u32,
    ) -> Self {
        let mut cache = NetworkCache::default();
        let mut visited = BTreeSet::from([origin]);
        let mut queue = VecDeque::from([(origin, 0u32)]);

        while let Some((at, distance)) = queue.pop_front() {
            cache.conduit_count += 1;
            let next_distance = distance + 1;

            for (dir, next) in at.neighbors() {
                if visited.contains(&next) {
                    continue;
                }
                if grid.is_conduit(next) {
                    if next_distance > max_network_size {
                        cache.truncated = true;
                        continue;
                    }
                    visited.insert(next);
                    queue.push_back((next, next_distance));
                } else if let Some(endpoint) = grid.endpoint_facing(next, dir.opposite()) {
                    cache.record(next, endpoint, next_distance);
                }
            }
        }

        cache
    }

    /// Record `endpoint` as a source and/or sink unless already present.
    /// BFS visits conduits in distance order, so the first record is the
    /// shortest.
    fn record(&mut self, pos: CellPos, endpoint: &dyn EnergyEndpoint, distance: u32) {
        let role = endpoint.role();
        let entry = CachedEndpoint { pos, distance };

        if is_valid_source(endpoint)
            && role.is_none_or(|r| r.can_generate())
            && !self.sources.iter().any(|e| e.pos == pos)
        {
            self.sources.push(entry);
        }
        if is_valid_sink(endpoint)
            && role.is_none_or(|r| r.can_consume())
            && !self.sinks.iter().any(|e| e.pos == pos)
        {
            self.sinks.push(entry);
        }
    }

    pub fn sources(&self) -> &[CachedEndpoint] {
        &self.sources
    }

    pub fn sinks(&self) -> &[CachedEndpoint] {
        &self.sinks
    }

    pub fn source_distance(&self, pos: CellPos) -> Option<u32> {
        self.sources.iter().find(|e| e.pos == pos).map(|e| e.distance)
    }

    pub fn sink_distance(&self, pos: CellPos) -> Option<u32> {
        self.sinks.iter().find(|e| e.pos == pos).map(|e| e.distance)
    }

    /// Conduit nodes reached, including the origin.
    pub fn conduit_count(&self) -> usize {
        self.conduit_count
    }

    /// Discovery stopped at the distance bound.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// At least one source and one sink.
    pub fn is_routable(&self) -> bool {
        !self.sources.is_empty() && !self.sinks.is_empty()
    }
}
