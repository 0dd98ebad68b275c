//! Tuning knobs for conduit networks.

use resonance_core::fixed::{BPS_SCALE, Bps, Ticks};
use serde::{Deserialize, Serialize};

/// Configuration shared by every conduit node in a [`ConduitModule`](crate::ConduitModule).
///
/// Ratios are basis points (10 000 = 1.0) so the rate formula is exact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConduitConfig {
    /// Energy per tick moved between a source/sink pair at zero distance.
    pub base_transfer_rate: u32,
    /// Ticks between forced cache rebuilds.
    pub refresh_interval: Ticks,
    /// Ticks between forced adjacency rescans.
    pub connection_refresh_interval: Ticks,
    /// Furthest conduit hop discovery will expand.
    pub max_network_size: u32,
    /// Rate lost per hop of total source+sink distance.
    pub distance_penalty: Bps,
    /// Floor for the distance multiplier.
    pub min_multiplier: Bps,
}

impl Default for ConduitConfig {
    fn default() -> Self {
        Self {
            base_transfer_rate: 500,
            refresh_interval: 20,
            connection_refresh_interval: 20,
            max_network_size: 64,
            distance_penalty: 500,
            min_multiplier: 1_000,
        }
    }
}

/// A configuration value outside its accepted range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field} = {value} is outside {min}..={max}")]
pub struct ConfigError {
    pub field: &'static str,
    pub value: u64,
    pub min: u64,
    pub max: u64,
}

fn check(field: &'static str, value: u64, min: u64, max: u64) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError {
            field,
            value,
            min,
            max,
        })
    }
}

impl ConduitConfig {
    /// Reject values outside the supported ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scale = u64::from(BPS_SCALE);
        check("base_transfer_rate", self.base_transfer_rate.into(), 1, 100_000)?;
        check("refresh_interval", self.refresh_interval, 1, 600)?;
        check(
            "connection_refresh_interval",
            self.connection_refresh_interval,
            1,
            600,
        )?;
        check("max_network_size", self.max_network_size.into(), 4, 1_000)?;
        check("distance_penalty", self.distance_penalty.into(), 0, scale)?;
        check("min_multiplier", self.min_multiplier.into(), 0, scale)?;
        Ok(())
    }
}
