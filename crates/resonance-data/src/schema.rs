//! Serde data file structs.
//!
//! These define the on-disk format. Ratios are written as plain decimals
//! (`0.05`) and converted to basis points during resolution.

use serde::Deserialize;

// ===========================================================================
// Conduit tuning
// ===========================================================================

/// `conduit.{ron,toml,json}`. Every field is optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConduitConfigData {
    pub transfer_rate: u32,
    pub network_update_interval: u64,
    pub connection_refresh_interval: u64,
    pub max_network_size: u32,
    pub distance_penalty: f64,
    pub min_multiplier: f64,
}

impl Default for ConduitConfigData {
    fn default() -> Self {
        Self {
            transfer_rate: 500,
            network_update_interval: 20,
            connection_refresh_interval: 20,
            max_network_size: 64,
            distance_penalty: 0.05,
            min_multiplier: 0.1,
        }
    }
}

// ===========================================================================
// Machines
// ===========================================================================

/// One named energy storage template.
#[derive(Debug, Clone, Deserialize)]
pub struct MachineData {
    pub name: String,
    pub capacity: u32,
    #[serde(default)]
    pub max_receive: u32,
    #[serde(default)]
    pub max_extract: u32,
    #[serde(default)]
    pub role: Option<RoleData>,
    /// Charge a freshly placed machine starts with.
    #[serde(default)]
    pub initial_energy: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleData {
    Generator,
    Consumer,
    Both,
}

/// Wrapper for a list of machines in TOML format.
#[derive(Debug, Clone, Deserialize)]
pub struct TomlMachines {
    pub machines: Vec<MachineData>,
}
