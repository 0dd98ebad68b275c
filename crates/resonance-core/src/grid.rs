//! The host grid boundary.
//!
//! Routing code never holds live handles to cells. It asks a
//! [`GridAccessor`] for whatever occupies a coordinate, every time.
//! [`CellGrid`] is the in-memory implementation used by tests, benches, and
//! headless hosts.

use std::collections::BTreeMap;

use crate::energy::EnergyEndpoint;
use crate::pos::{CellPos, Direction};
use crate::storage::EnergyStorage;

// ---------------------------------------------------------------------------
// GridAccessor
// ---------------------------------------------------------------------------

/// Coordinate-keyed view of the host world.
pub trait GridAccessor {
    /// A conduit occupies `pos`.
    fn is_conduit(&self, pos: CellPos) -> bool;

    /// The energy capability at `pos`, if any. Conduits expose none.
    fn endpoint(&self, pos: CellPos) -> Option<&dyn EnergyEndpoint>;

    fn endpoint_mut(&mut self, pos: CellPos) -> Option<&mut dyn EnergyEndpoint>;

    /// The endpoint at `pos`, only if its face `face` is exposed.
    fn endpoint_facing(&self, pos: CellPos, face: Direction) -> Option<&dyn EnergyEndpoint> {
        self.endpoint(pos).filter(|e| e.connects_on(face))
    }
}

// ---------------------------------------------------------------------------
// CellGrid
// ---------------------------------------------------------------------------

/// What occupies a grid cell.
#[derive(Debug)]
pub enum Cell {
    /// Routing fabric. Stores nothing.
    Conduit,
    /// The reference storage endpoint.
    Storage(EnergyStorage),
    /// Any other endpoint supplied by the host.
    Endpoint(Box<dyn EnergyEndpoint>),
}

/// Errors from grid edits.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    #[error("cell {0} is occupied")]
    Occupied(CellPos),
    #[error("cell {0} is empty")]
    Empty(CellPos),
}

/// In-memory sparse grid.
///
/// Every edit is appended to a change log so the topology watcher can find
/// out which coordinates changed identity since it last looked.
#[derive(Debug, Default)]
pub struct CellGrid {
    cells: BTreeMap<CellPos, Cell>,
    changes: Vec<CellPos>,
}

impl CellGrid {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Edits --

    pub fn place(&mut self, pos: CellPos, cell: Cell) -> Result<(), GridError> {
        if self.cells.contains_key(&pos) {
            return Err(GridError::Occupied(pos));
        }
        tracing::trace!(%pos, "cell placed");
        self.cells.insert(pos, cell);
        self.changes.push(pos);
        Ok(())
    }

    pub fn place_conduit(&mut self, pos: CellPos) -> Result<(), GridError> {
        self.place(pos, Cell::Conduit)
    }

    pub fn place_storage(&mut self, pos: CellPos, storage: EnergyStorage) -> Result<(), GridError> {
        self.place(pos, Cell::Storage(storage))
    }

    pub fn place_endpoint(
        &mut self,
        pos: CellPos,
        endpoint: Box<dyn EnergyEndpoint>,
    ) -> Result<(), GridError> {
        self.place(pos, Cell::Endpoint(endpoint))
    }

    /// Remove whatever occupies `pos` and return it.
    pub fn remove(&mut self, pos: CellPos) -> Result<Cell, GridError> {
        let cell = self.cells.remove(&pos).ok_or(GridError::Empty(pos))?;
        tracing::trace!(%pos, "cell removed");
        self.changes.push(pos);
        Ok(cell)
    }

    /// Record a change at `pos` that did not go through `place`/`remove`
    /// (e.g. a machine reconfigured its sides).
    pub fn mark_changed(&mut self, pos: CellPos) {
        self.changes.push(pos);
    }

    /// Drain the change log, oldest first.
    pub fn take_changes(&mut self) -> Vec<CellPos> {
        std::mem::take(&mut self.changes)
    }

    // -- Queries --

    pub fn get(&self, pos: CellPos) -> Option<&Cell> {
        self.cells.get(&pos)
    }

    pub fn is_occupied(&self, pos: CellPos) -> bool {
        self.cells.contains_key(&pos)
    }

    pub fn storage(&self, pos: CellPos) -> Option<&EnergyStorage> {
        match self.cells.get(&pos)? {
            Cell::Storage(s) => Some(s),
            _ => None,
        }
    }

    pub fn storage_mut(&mut self, pos: CellPos) -> Option<&mut EnergyStorage> {
        match self.cells.get_mut(&pos)? {
            Cell::Storage(s) => Some(s),
            _ => None,
        }
    }

    /// Positions of every conduit, in coordinate order.
    pub fn conduits(&self) -> impl Iterator<Item = CellPos> + '_ {
        self.cells
            .iter()
            .filter(|(_, cell)| matches!(cell, Cell::Conduit))
            .map(|(pos, _)| *pos)
    }

    /// Total energy held by every endpoint on the grid.
    pub fn total_energy(&self) -> u64 {
        self.cells
            .keys()
            .filter_map(|pos| self.endpoint(*pos))
            .map(|e| u64::from(e.energy_stored()))
            .sum()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl GridAccessor for CellGrid {
    fn is_conduit(&self, pos: CellPos) -> bool {
        matches!(self.cells.get(&pos), Some(Cell::Conduit))
    }

    fn endpoint(&self, pos: CellPos) -> Option<&dyn EnergyEndpoint> {
        let endpoint: &dyn EnergyEndpoint = match self.cells.get(&pos)? {
            Cell::Conduit => return None,
            Cell::Storage(s) => s,
            Cell::Endpoint(e) => e.as_ref(),
        };
        Some(endpoint)
    }

    fn endpoint_mut(&mut self, pos: CellPos) -> Option<&mut dyn EnergyEndpoint> {
        let endpoint: &mut dyn EnergyEndpoint = match self.cells.get_mut(&pos)? {
            Cell::Conduit => return None,
            Cell::Storage(s) => s,
            Cell::Endpoint(e) => e.as_mut(),
        };
        Some(endpoint)
    }
}
