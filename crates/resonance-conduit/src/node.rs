//! A single conduit cell: adjacency flags plus the cache/route cycle.

use resonance_core::fixed::Ticks;
use resonance_core::grid::GridAccessor;
use resonance_core::pos::{CellPos, Direction, SideMask};

use crate::cache::NetworkCache;
use crate::config::ConduitConfig;
use crate::router::{self, Transfer};

/// What one node did during one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeTick {
    /// The cache was rebuilt before routing.
    pub rebuilt: bool,
    pub transfers: Vec<Transfer>,
}

/// Routing state for the conduit at `pos`.
///
/// Nodes never point at each other or at endpoints; everything is looked up
/// through the grid by coordinate. The cache starts invalid and is rebuilt
/// on the first tick.
#[derive(Debug, Clone)]
pub struct ConduitNode {
    pos: CellPos,
    connections: SideMask,
    cache: Option<NetworkCache>,
    cache_valid: bool,
    update_counter: Ticks,
    scan_counter: Ticks,
}

impl ConduitNode {
    pub fn new(pos: CellPos) -> Self {
        Self::with_connections(pos, SideMask::NONE)
    }

    /// Restore a node from persisted adjacency flags. The cache is never
    /// persisted, so it starts invalid.
    pub fn with_connections(pos: CellPos, connections: SideMask) -> Self {
        Self {
            pos,
            connections,
            cache: None,
            cache_valid: false,
            update_counter: 0,
            scan_counter: 0,
        }
    }

    pub fn pos(&self) -> CellPos {
        self.pos
    }

    pub fn connections(&self) -> SideMask {
        self.connections
    }

    pub fn is_connected(&self, dir: Direction) -> bool {
        self.connections.contains(dir)
    }

    pub fn connection_count(&self) -> u32 {
        self.connections.count()
    }

    pub fn cache(&self) -> Option<&NetworkCache> {
        self.cache.as_ref()
    }

    pub fn is_cache_valid(&self) -> bool {
        self.cache_valid
    }

    /// Force a rebuild on the next tick.
    pub fn invalidate(&mut self) {
        self.cache_valid = false;
    }

    /// Rescan the six neighbours. A side is connected when the neighbour is
    /// a conduit or an endpoint exposing the face that touches this node.
    pub fn update_connections<G: GridAccessor + ?Sized>(&mut self, grid: &G) {
        let mut connections = SideMask::NONE;
        for (dir, neighbor) in self.pos.neighbors() {
            let connected = grid.is_conduit(neighbor)
                || grid.endpoint_facing(neighbor, dir.opposite()).is_some();
            connections.set(dir, connected);
        }
        self.connections = connections;
        self.scan_counter = 0;
    }

    /// A neighbouring cell changed identity.
    pub fn on_neighbor_changed<G: GridAccessor + ?Sized>(&mut self, grid: &G) {
        self.invalidate();
        self.update_connections(grid);
    }

    /// Rebuild the cache now, regardless of the counters.
    pub fn rebuild_cache<G: GridAccessor + ?Sized>(&mut self, grid: &G, config: &ConduitConfig) {
        let cache = NetworkCache::discover(self.pos, grid, config.max_network_size);
        if cache.is_truncated() {
            tracing::debug!(
                node = %self.pos,
                max_network_size = config.max_network_size,
                "discovery truncated at distance bound"
            );
        }
        tracing::debug!(
            node = %self.pos,
            conduits = cache.conduit_count(),
            sources = cache.sources().len(),
            sinks = cache.sinks().len(),
            "network cache rebuilt"
        );
        self.cache = Some(cache);
        self.cache_valid = true;
        self.update_counter = 0;
    }

    /// Advance one simulation step: count, refresh what is due, then route.
    ///
    /// A node whose own cell is no longer a conduit does nothing.
    pub fn tick<G: GridAccessor + ?Sized>(&mut self, grid: &mut G, config: &ConduitConfig) -> NodeTick {
        if !grid.is_conduit(self.pos) {
            return NodeTick::default();
        }

        self.update_counter += 1;
        self.scan_counter += 1;

        let rebuilt = !self.cache_valid || self.update_counter >= config.refresh_interval;
        if rebuilt {
            self.rebuild_cache(&*grid, config);
        }
        if self.scan_counter >= config.connection_refresh_interval {
            self.update_connections(&*grid);
        }

        let transfers = match &self.cache {
            Some(cache) if self.cache_valid => router::route(cache, grid, config),
            _ => Vec::new(),
        };

        NodeTick { rebuilt, transfers }
    }
}
