//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::grid::CellGrid;
use crate::pos::{CellPos, Direction};
use crate::storage::EnergyStorage;

// ===========================================================================
// Positions
// ===========================================================================

pub fn pos(x: i32, y: i32, z: i32) -> CellPos {
    CellPos::new(x, y, z)
}

pub fn origin() -> CellPos {
    CellPos::new(0, 0, 0)
}

// ===========================================================================
// Endpoint constructors
// ===========================================================================

/// A full generator with no per-call extract limit.
pub fn full_generator(capacity: u32) -> EnergyStorage {
    EnergyStorage::generator(capacity, u32::MAX).with_energy(capacity)
}

/// An empty consumer with no per-call receive limit.
pub fn empty_consumer(capacity: u32) -> EnergyStorage {
    EnergyStorage::consumer(capacity, u32::MAX)
}

/// An untagged battery with no per-call limits.
pub fn open_battery(capacity: u32, energy: u32) -> EnergyStorage {
    EnergyStorage::battery(capacity, u32::MAX).with_energy(energy)
}

// ===========================================================================
// Grid builders
// ===========================================================================

/// Lay `len` conduits starting at `start` and walking toward `dir`.
/// Returns their positions in walk order.
pub fn conduit_line(grid: &mut CellGrid, start: CellPos, dir: Direction, len: usize) -> Vec<CellPos> {
    let placed: Vec<CellPos> = std::iter::successors(Some(start), |at| at.offset(dir))
        .take(len)
        .collect();
    assert_eq!(placed.len(), len, "conduit line runs off the coordinate range");
    for &at in &placed {
        grid.place_conduit(at).expect("conduit line overlaps an occupied cell");
    }
    placed
}

/// `source -- conduit x len -- sink` along +X starting at the origin.
/// Returns `(source_pos, conduit_positions, sink_pos)`.
pub fn straight_link(
    grid: &mut CellGrid,
    source: EnergyStorage,
    sink: EnergyStorage,
    len: usize,
) -> (CellPos, Vec<CellPos>, CellPos) {
    let source_pos = origin();
    grid.place_storage(source_pos, source)
        .expect("source cell occupied");
    let conduits = conduit_line(grid, pos(1, 0, 0), Direction::East, len);
    let sink_pos = pos(len as i32 + 1, 0, 0);
    grid.place_storage(sink_pos, sink).expect("sink cell occupied");
    (source_pos, conduits, sink_pos)
}

/// Energy held by the storage at `pos`, or zero when absent.
pub fn stored(grid: &CellGrid, pos: CellPos) -> u32 {
    grid.storage(pos).map(|s| s.energy()).unwrap_or(0)
}
