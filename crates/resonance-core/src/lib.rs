//! Resonance Core -- shared primitives for the resonant energy network.
//!
//! This crate defines the vocabulary every other Resonance crate speaks:
//!
//! - [`pos::CellPos`] / [`pos::Direction`] -- 3D grid coordinates and the six
//!   face directions, plus [`pos::SideMask`] for per-side flags.
//! - [`energy::EnergyEndpoint`] -- the capability any producing or consuming
//!   cell exposes, with optional [`energy::EnergyRole`] tags.
//! - [`storage::EnergyStorage`] -- the reference endpoint for machines and
//!   batteries.
//! - [`grid::GridAccessor`] -- the host grid boundary; [`grid::CellGrid`] is
//!   an in-memory implementation.
//! - [`fixed`] -- tick counter, basis-point ratios and Fixed64 helpers.

pub mod energy;
pub mod fixed;
pub mod grid;
pub mod pos;
pub mod storage;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
