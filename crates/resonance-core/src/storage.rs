//! Reference [`EnergyEndpoint`] implementation for machines and batteries.
//!
//! [`EnergyStorage`] is a bounded buffer with per-call receive/extract rate
//! limits, an optional role tag, and a [`SideConfig`] that decides which
//! faces a conduit may connect to.

use serde::{Deserialize, Serialize};

use crate::energy::{EnergyEndpoint, EnergyRole};
use crate::fixed::{Fixed64, ratio};
use crate::pos::{Direction, SideMask};

// ---------------------------------------------------------------------------
// Side configuration
// ---------------------------------------------------------------------------

/// Which faces of a machine accept energy and which emit it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SideConfig {
    pub input: SideMask,
    pub output: SideMask,
}

impl Default for SideConfig {
    fn default() -> Self {
        Self::all()
    }
}

impl SideConfig {
    /// Every face both accepts and emits.
    pub fn all() -> Self {
        Self {
            input: SideMask::ALL,
            output: SideMask::ALL,
        }
    }

    /// No face is exposed.
    pub fn none() -> Self {
        Self {
            input: SideMask::NONE,
            output: SideMask::NONE,
        }
    }

    pub fn set_side(&mut self, face: Direction, input: bool, output: bool) {
        self.input.set(face, input);
        self.output.set(face, output);
    }

    pub fn accepts_from(&self, face: Direction) -> bool {
        self.input.contains(face)
    }

    pub fn outputs_to(&self, face: Direction) -> bool {
        self.output.contains(face)
    }

    /// The face takes part in any energy exchange.
    pub fn is_enabled(&self, face: Direction) -> bool {
        self.accepts_from(face) || self.outputs_to(face)
    }
}

// ---------------------------------------------------------------------------
// EnergyStorage
// ---------------------------------------------------------------------------

/// A bounded energy buffer.
///
/// Deserializing clamps the stored charge to the capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StorageFields")]
pub struct EnergyStorage {
    /// Maximum stored energy. Changed through [`EnergyStorage::set_capacity`].
    capacity: u32,
    /// Most energy accepted by a single `receive_energy` call.
    pub max_receive: u32,
    /// Most energy released by a single `extract_energy` call.
    pub max_extract: u32,
    /// Current charge. Always in `0..=capacity`.
    energy: u32,
    pub role: Option<EnergyRole>,
    pub sides: SideConfig,
}

/// Serialized form of [`EnergyStorage`], checked on the way in.
#[derive(Deserialize)]
struct StorageFields {
    capacity: u32,
    max_receive: u32,
    max_extract: u32,
    energy: u32,
    role: Option<EnergyRole>,
    sides: SideConfig,
}

impl From<StorageFields> for EnergyStorage {
    fn from(f: StorageFields) -> Self {
        let mut storage = EnergyStorage::new(f.capacity, f.max_receive, f.max_extract)
            .with_energy(f.energy)
            .with_sides(f.sides);
        storage.role = f.role;
        storage
    }
}

impl EnergyStorage {
    /// Empty, untagged storage exposed on every face.
    pub fn new(capacity: u32, max_receive: u32, max_extract: u32) -> Self {
        Self {
            capacity,
            max_receive,
            max_extract,
            energy: 0,
            role: None,
            sides: SideConfig::all(),
        }
    }

    /// A generator: releases energy, never accepts it.
    pub fn generator(capacity: u32, max_extract: u32) -> Self {
        Self::new(capacity, 0, max_extract).with_role(EnergyRole::Generator)
    }

    /// A consumer: accepts energy, never releases it.
    pub fn consumer(capacity: u32, max_receive: u32) -> Self {
        Self::new(capacity, max_receive, 0).with_role(EnergyRole::Consumer)
    }

    /// An untagged battery that both accepts and releases.
    pub fn battery(capacity: u32, max_transfer: u32) -> Self {
        Self::new(capacity, max_transfer, max_transfer)
    }

    pub fn with_energy(mut self, energy: u32) -> Self {
        self.set_energy(energy);
        self
    }

    pub fn with_role(mut self, role: EnergyRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_sides(mut self, sides: SideConfig) -> Self {
        self.sides = sides;
        self
    }

    pub fn energy(&self) -> u32 {
        self.energy
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Set the charge directly, clamped to capacity.
    pub fn set_energy(&mut self, energy: u32) {
        self.energy = energy.min(self.capacity);
    }

    /// Change the capacity, discarding any charge above it.
    pub fn set_capacity(&mut self, capacity: u32) {
        self.capacity = capacity;
        self.energy = self.energy.min(capacity);
    }

    pub fn is_full(&self) -> bool {
        self.energy >= self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.energy == 0
    }

    /// Charge as a fraction of capacity, 0..=1.
    pub fn fill_ratio(&self) -> Fixed64 {
        ratio(self.energy, self.capacity)
    }

    /// Charge as a whole percentage, rounded to nearest.
    pub fn fill_percent(&self) -> u32 {
        (self.fill_ratio() * Fixed64::from_num(100))
            .round()
            .to_num::<u32>()
    }
}

impl EnergyEndpoint for EnergyStorage {
    fn can_extract(&self) -> bool {
        self.max_extract > 0 && self.energy > 0
    }

    fn can_receive(&self) -> bool {
        self.max_receive > 0 && self.energy < self.capacity
    }

    fn energy_stored(&self) -> u32 {
        self.energy
    }

    fn max_energy_stored(&self) -> u32 {
        self.capacity
    }

    fn extract_energy(&mut self, requested: u32, simulate: bool) -> u32 {
        let extracted = requested.min(self.max_extract).min(self.energy);
        if !simulate {
            self.energy -= extracted;
        }
        extracted
    }

    fn receive_energy(&mut self, offered: u32, simulate: bool) -> u32 {
        let headroom = self.capacity.saturating_sub(self.energy);
        let received = offered.min(self.max_receive).min(headroom);
        if !simulate {
            self.energy += received;
        }
        received
    }

    fn role(&self) -> Option<EnergyRole> {
        self.role
    }

    fn connects_on(&self, face: Direction) -> bool {
        self.sides.is_enabled(face)
    }
}
