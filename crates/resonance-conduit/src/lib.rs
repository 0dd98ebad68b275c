//! Resonance Conduit -- distance-aware energy routing over a conduit grid.
//!
//! Conduit cells form a network. Each conduit node discovers, with a bounded
//! breadth-first search, every energy endpoint reachable through adjacent
//! conduits and caches their positions and hop distances. Every tick it
//! moves energy from each cached source to each cached sink at a rate that
//! shrinks with the total distance between them.
//!
//! # Architecture
//!
//! - [`cache::NetworkCache`] -- bounded discovery of sources and sinks.
//! - [`router`] -- transfer-rate math and per-tick routing.
//! - [`node::ConduitNode`] -- adjacency flags and the refresh/route cycle.
//! - [`ConduitModule`] -- owns every node, reacts to grid edits and drives
//!   ticks, returning [`ConduitEvent`]s.
//! - [`snapshot`] -- versioned binary persistence of node adjacency.
//!
//! The host world is reached only through
//! [`GridAccessor`](resonance_core::grid::GridAccessor), by coordinate.
//!
//! # Example
//!
//! ```
//! use resonance_conduit::{ConduitConfig, ConduitModule};
//! use resonance_core::grid::CellGrid;
//! use resonance_core::pos::CellPos;
//! use resonance_core::storage::EnergyStorage;
//!
//! let mut grid = CellGrid::new();
//! grid.place_storage(
//!     CellPos::new(0, 0, 0),
//!     EnergyStorage::generator(1000, 100).with_energy(1000),
//! ).unwrap();
//! grid.place_conduit(CellPos::new(1, 0, 0)).unwrap();
//! grid.place_storage(CellPos::new(2, 0, 0), EnergyStorage::consumer(500, 100)).unwrap();
//!
//! let mut module = ConduitModule::new(ConduitConfig {
//!     base_transfer_rate: 40,
//!     ..ConduitConfig::default()
//! });
//! module.sync_changes(&mut grid);
//! module.tick(&mut grid);
//!
//! // 40 * (1 - 2 * 0.05) = 36
//! assert_eq!(grid.storage(CellPos::new(2, 0, 0)).unwrap().energy(), 36);
//! ```

pub mod cache;
pub mod config;
pub mod node;
pub mod router;
pub mod snapshot;
pub mod watcher;

pub use cache::{CachedEndpoint, NetworkCache};
pub use config::{ConduitConfig, ConfigError};
pub use node::{ConduitNode, NodeTick};
pub use router::Transfer;
pub use snapshot::{DeserializeError, SerializeError};
pub use watcher::{ConduitEvent, ConduitModule};
