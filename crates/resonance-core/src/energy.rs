//! The energy capability exposed by grid cells, and endpoint roles.
//!
//! Anything that can hold, produce, or consume energy implements
//! [`EnergyEndpoint`]. The routing network never owns endpoints; it resolves
//! them by position through a [`GridAccessor`](crate::grid::GridAccessor)
//! every time it needs one.

use serde::{Deserialize, Serialize};

use crate::pos::Direction;

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

/// Optional tag restricting which way energy may flow through an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnergyRole {
    /// Produces energy. Never a valid sink for tagged sources.
    Generator,
    /// Uses energy. Never a valid source for tagged sinks.
    Consumer,
    /// Both produces and uses energy. Pairs with untagged cells only.
    Both,
}

impl EnergyRole {
    pub fn can_generate(self) -> bool {
        matches!(self, EnergyRole::Generator | EnergyRole::Both)
    }

    pub fn can_consume(self) -> bool {
        matches!(self, EnergyRole::Consumer | EnergyRole::Both)
    }
}

/// Whether energy may move from an endpoint tagged `source` to one tagged
/// `sink`.
///
/// Untagged endpoints are compatible with everything. When both sides carry
/// a role, only a generator feeding a consumer is allowed; a `Both` machine
/// trades only with untagged cells.
pub fn is_role_compatible(source: Option<EnergyRole>, sink: Option<EnergyRole>) -> bool {
    match (source, sink) {
        (Some(source), Some(sink)) => {
            matches!((source, sink), (EnergyRole::Generator, EnergyRole::Consumer))
        }
        _ => true,
    }
}

// ---------------------------------------------------------------------------
// EnergyEndpoint
// ---------------------------------------------------------------------------

/// A cell that can produce and/or consume energy.
///
/// `extract_energy` and `receive_energy` return the amount actually moved and
/// perform their own capacity checks; with `simulate = true` they report what
/// would move without mutating anything.
pub trait EnergyEndpoint: std::fmt::Debug {
    fn can_extract(&self) -> bool;

    fn can_receive(&self) -> bool;

    fn energy_stored(&self) -> u32;

    fn max_energy_stored(&self) -> u32;

    /// Remove up to `requested` units. Returns the amount removed.
    fn extract_energy(&mut self, requested: u32, simulate: bool) -> u32;

    /// Accept up to `offered` units. Returns the amount accepted.
    fn receive_energy(&mut self, offered: u32, simulate: bool) -> u32;

    /// Role tag. `None` means unrestricted.
    fn role(&self) -> Option<EnergyRole> {
        None
    }

    /// Whether the face `face` of this cell exposes the capability.
    fn connects_on(&self, face: Direction) -> bool {
        let _ = face;
        true
    }
}

/// Still able to give energy right now.
pub fn is_valid_source(endpoint: &dyn EnergyEndpoint) -> bool {
    endpoint.can_extract() && endpoint.energy_stored() > 0
}

/// Still able to take energy right now.
pub fn is_valid_sink(endpoint: &dyn EnergyEndpoint) -> bool {
    endpoint.can_receive() && endpoint.energy_stored() < endpoint.max_energy_stored()
}

/// Room left before the endpoint is full.
pub fn headroom(endpoint: &dyn EnergyEndpoint) -> u32 {
    endpoint
        .max_energy_stored()
        .saturating_sub(endpoint.energy_stored())
}
