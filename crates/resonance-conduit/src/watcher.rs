//! Conduit module: owns every node, reacts to topology edits, drives ticks.
//!
//! # Design
//!
//! - Nodes are keyed by position and ticked in coordinate order.
//! - Each node discovers and caches its own view of the network. Overlapping
//!   views are not merged; endpoints enforce their own capacity.
//! - Any edit to a cell invalidates the caches of the conduits next to it
//!   and rescans their adjacency.
//! - Events are returned from [`ConduitModule::tick`], not buffered.

use std::collections::BTreeMap;

use resonance_core::fixed::Ticks;
use resonance_core::grid::{CellGrid, GridAccessor};
use resonance_core::pos::CellPos;

use crate::config::ConduitConfig;
use crate::node::ConduitNode;

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Events emitted by the conduit module during a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConduitEvent {
    /// A node rebuilt its network cache.
    CacheRebuilt {
        node: CellPos,
        sources: usize,
        sinks: usize,
        truncated: bool,
        tick: Ticks,
    },
    /// A node moved energy from a source to a sink.
    EnergyTransferred {
        node: CellPos,
        source: CellPos,
        sink: CellPos,
        amount: u32,
        tick: Ticks,
    },
}

// ---------------------------------------------------------------------------
// Module
// ---------------------------------------------------------------------------

/// Every conduit node on a grid plus the shared configuration.
#[derive(Debug, Clone, Default)]
pub struct ConduitModule {
    config: ConduitConfig,
    nodes: BTreeMap<CellPos, ConduitNode>,
    current_tick: Ticks,
}

impl ConduitModule {
    pub fn new(config: ConduitConfig) -> Self {
        Self {
            config,
            nodes: BTreeMap::new(),
            current_tick: 0,
        }
    }

    /// Rebuild a module from persisted nodes. Used by snapshot loading.
    pub(crate) fn from_parts(
        config: ConduitConfig,
        nodes: impl IntoIterator<Item = ConduitNode>,
        current_tick: Ticks,
    ) -> Self {
        Self {
            config,
            nodes: nodes.into_iter().map(|n| (n.pos(), n)).collect(),
            current_tick,
        }
    }

    pub fn config(&self) -> &ConduitConfig {
        &self.config
    }

    /// Replace the configuration. Every cache is invalidated.
    pub fn set_config(&mut self, config: ConduitConfig) {
        self.config = config;
        self.invalidate_all();
    }

    pub fn current_tick(&self) -> Ticks {
        self.current_tick
    }

    pub fn node(&self, pos: CellPos) -> Option<&ConduitNode> {
        self.nodes.get(&pos)
    }

    /// All nodes in coordinate order.
    pub fn nodes(&self) -> impl Iterator<Item = &ConduitNode> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn invalidate_all(&mut self) {
        for node in self.nodes.values_mut() {
            node.invalidate();
        }
    }

    // -- Topology --

    /// Start tracking the conduit at `pos`. Returns `false` if the grid has no
    /// conduit there or it is already tracked.
    pub fn add_conduit<G: GridAccessor + ?Sized>(&mut self, pos: CellPos, grid: &G) -> bool {
        if !self.insert_node(pos, grid) {
            return false;
        }
        self.notify_neighbors(pos, grid);
        true
    }

    /// Stop tracking the conduit at `pos` and tell its neighbours.
    pub fn remove_conduit<G: GridAccessor + ?Sized>(
        &mut self,
        pos: CellPos,
        grid: &G,
    ) -> Option<ConduitNode> {
        let node = self.nodes.remove(&pos)?;
        tracing::debug!(%pos, "conduit node removed");
        self.notify_neighbors(pos, grid);
        Some(node)
    }

    /// Topology watcher entry point for one node: a cell next to `pos` changed.
    pub fn on_neighbor_changed<G: GridAccessor + ?Sized>(&mut self, pos: CellPos, grid: &G) {
        if let Some(node) = self.nodes.get_mut(&pos) {
            node.on_neighbor_changed(grid);
        }
    }

    /// The cell at `changed` was placed, removed, or replaced.
    ///
    /// Brings the node set in line with the grid at `changed`, then notifies
    /// every neighbouring node.
    pub fn on_cell_changed<G: GridAccessor + ?Sized>(&mut self, changed: CellPos, grid: &G) {
        let is_conduit = grid.is_conduit(changed);
        if is_conduit {
            self.insert_node(changed, grid);
        } else if self.nodes.remove(&changed).is_some() {
            tracing::debug!(pos = %changed, "conduit node removed");
        }
        self.notify_neighbors(changed, grid);
    }

    /// Drain the grid's change log through [`on_cell_changed`](Self::on_cell_changed).
    /// Returns how many changes were applied.
    pub fn sync_changes(&mut self, grid: &mut CellGrid) -> usize {
        let changes = grid.take_changes();
        for pos in &changes {
            self.on_cell_changed(*pos, &*grid);
        }
        changes.len()
    }

    fn insert_node<G: GridAccessor + ?Sized>(&mut self, pos: CellPos, grid: &G) -> bool {
        if !grid.is_conduit(pos) || self.nodes.contains_key(&pos) {
            return false;
        }
        let mut node = ConduitNode::new(pos);
        node.update_connections(grid);
        tracing::debug!(%pos, connections = node.connection_count(), "conduit node added");
        self.nodes.insert(pos, node);
        true
    }

    fn notify_neighbors<G: GridAccessor + ?Sized>(&mut self, pos: CellPos, grid: &G) {
        for (_, neighbor) in pos.neighbors() {
            self.on_neighbor_changed(neighbor, grid);
        }
    }

    // -- Simulation --

    /// Advance every node by one tick, in coordinate order.
    pub fn tick<G: GridAccessor + ?Sized>(&mut self, grid: &mut G) -> Vec<ConduitEvent> {
        self.current_tick += 1;
        let tick = self.current_tick;
        let mut events = Vec::new();

        for node in self.nodes.values_mut() {
            let report = node.tick(&mut *grid, &self.config);
            let at = node.pos();

            if report.rebuilt {
                if let Some(cache) = node.cache() {
                    events.push(ConduitEvent::CacheRebuilt {
                        node: at,
                        sources: cache.sources().len(),
                        sinks: cache.sinks().len(),
                        truncated: cache.is_truncated(),
                        tick,
                    });
                }
            }
            events.extend(report.transfers.into_iter().map(|t| {
                ConduitEvent::EnergyTransferred {
                    node: at,
                    source: t.source,
                    sink: t.sink,
                    amount: t.amount,
                    tick,
                }
            }));
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resonance_core::pos::Direction;
    use resonance_core::test_utils::*;

    fn transferred(events: &[ConduitEvent]) -> u32 {
        events
            .iter()
            .map(|e| match e {
                ConduitEvent::EnergyTransferred { amount, .. } => *amount,
                _ => 0,
            })
            .sum()
    }

    #[test]
    fn sync_tracks_placed_conduits() {
        let mut grid = CellGrid::new();
        conduit_line(&mut grid, origin(), Direction::East, 3);
        let mut module = ConduitModule::default();

        assert_eq!(module.sync_changes(&mut grid), 3);
        assert_eq!(module.len(), 3);
        let middle = module.node(pos(1, 0, 0)).unwrap();
        assert!(middle.is_connected(Direction::East));
        assert!(middle.is_connected(Direction::West));
    }

    #[test]
    fn add_conduit_updates_neighbor_flags() {
        let mut grid = CellGrid::new();
        grid.place_conduit(origin()).unwrap();
        let mut module = ConduitModule::default();
        assert!(module.add_conduit(origin(), &grid));
        assert!(!module.node(origin()).unwrap().is_connected(Direction::East));

        grid.place_conduit(pos(1, 0, 0)).unwrap();
        assert!(module.add_conduit(pos(1, 0, 0), &grid));
        assert!(module.node(origin()).unwrap().is_connected(Direction::East));
        assert!(!module.node(origin()).unwrap().is_cache_valid());

        // Already tracked, and nothing at (5,0,0).
        assert!(!module.add_conduit(pos(1, 0, 0), &grid));
        assert!(!module.add_conduit(pos(5, 0, 0), &grid));
    }

    #[test]
    fn removing_a_cell_drops_node_and_notifies_neighbors() {
        let mut grid = CellGrid::new();
        conduit_line(&mut grid, origin(), Direction::East, 2);
        let mut module = ConduitModule::default();
        module.sync_changes(&mut grid);
        module.tick(&mut grid);
        assert!(module.node(origin()).unwrap().is_cache_valid());

        grid.remove(pos(1, 0, 0)).unwrap();
        module.sync_changes(&mut grid);

        assert!(module.node(pos(1, 0, 0)).is_none());
        let remaining = module.node(origin()).unwrap();
        assert!(!remaining.is_cache_valid());
        assert!(!remaining.is_connected(Direction::East));
    }

    #[test]
    fn tick_reports_rebuilds_then_transfers() {
        let mut grid = CellGrid::new();
        let (src, conduits, sink) =
            straight_link(&mut grid, full_generator(1000), empty_consumer(500), 1);
        let mut module = ConduitModule::new(ConduitConfig {
            base_transfer_rate: 40,
            ..ConduitConfig::default()
        });
        module.sync_changes(&mut grid);

        let events = module.tick(&mut grid);
        assert_eq!(
            events,
            vec![
                ConduitEvent::CacheRebuilt {
                    node: conduits[0],
                    sources: 1,
                    sinks: 1,
                    truncated: false,
                    tick: 1,
                },
                ConduitEvent::EnergyTransferred {
                    node: conduits[0],
                    source: src,
                    sink,
                    amount: 36,
                    tick: 1,
                },
            ]
        );

        let events = module.tick(&mut grid);
        assert_eq!(events.len(), 1);
        assert_eq!(module.current_tick(), 2);
    }

    #[test]
    fn overlapping_nodes_each_route() {
        // Two conduits between the same pair: both see both endpoints.
        let mut grid = CellGrid::new();
        let (src, _, sink) =
            straight_link(&mut grid, full_generator(1000), empty_consumer(500), 2);
        let mut module = ConduitModule::new(ConduitConfig {
            base_transfer_rate: 40,
            ..ConduitConfig::default()
        });
        module.sync_changes(&mut grid);

        let events = module.tick(&mut grid);
        // Each node sees the pair at total distance 3: 40 * 0.85 = 34.
        assert_eq!(transferred(&events), 68);
        assert_eq!(stored(&grid, sink), 68);
        assert_eq!(stored(&grid, src), 932);
    }

    #[test]
    fn set_config_invalidates_every_cache() {
        let mut grid = CellGrid::new();
        conduit_line(&mut grid, origin(), Direction::East, 2);
        let mut module = ConduitModule::default();
        module.sync_changes(&mut grid);
        module.tick(&mut grid);
        assert!(module.nodes().all(|n| n.is_cache_valid()));

        module.set_config(ConduitConfig {
            max_network_size: 8,
            ..ConduitConfig::default()
        });
        assert!(module.nodes().all(|n| !n.is_cache_valid()));
        assert_eq!(module.config().max_network_size, 8);
    }

    #[test]
    fn endpoint_change_invalidates_adjacent_node_only() {
        let mut grid = CellGrid::new();
        conduit_line(&mut grid, origin(), Direction::East, 3);
        let mut module = ConduitModule::default();
        module.sync_changes(&mut grid);
        module.tick(&mut grid);

        grid.place_storage(pos(0, 1, 0), empty_consumer(10)).unwrap();
        module.sync_changes(&mut grid);

        assert!(!module.node(origin()).unwrap().is_cache_valid());
        assert!(module.node(origin()).unwrap().is_connected(Direction::Up));
        assert!(module.node(pos(1, 0, 0)).unwrap().is_cache_valid());
        assert!(module.node(pos(2, 0, 0)).unwrap().is_cache_valid());
    }

    #[test]
    fn conduit_on_the_coordinate_edge_routes() {
        let edge = pos(i32::MAX, 0, i32::MIN);
        let mut grid = CellGrid::new();
        grid.place_storage(pos(i32::MAX - 1, 0, i32::MIN), full_generator(1000))
            .unwrap();
        grid.place_conduit(edge).unwrap();
        grid.place_storage(pos(i32::MAX, 1, i32::MIN), empty_consumer(500))
            .unwrap();
        // Far side of the world along X: must never look adjacent.
        grid.place_storage(pos(i32::MIN, 0, i32::MIN), empty_consumer(500))
            .unwrap();

        let mut module = ConduitModule::default();
        module.sync_changes(&mut grid);
        let node = module.node(edge).unwrap();
        assert!(node.is_connected(Direction::West));
        assert!(node.is_connected(Direction::Up));
        assert!(!node.is_connected(Direction::East));
        assert!(!node.is_connected(Direction::North));

        assert!(transferred(&module.tick(&mut grid)) > 0);
        assert_eq!(grid.storage(pos(i32::MIN, 0, i32::MIN)).unwrap().energy(), 0);

        grid.remove(edge).unwrap();
        module.sync_changes(&mut grid);
        assert!(module.is_empty());
    }
}
