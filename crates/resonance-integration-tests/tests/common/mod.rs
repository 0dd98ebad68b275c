//! Helpers shared by the integration test binaries.

#![allow(dead_code)]

use resonance_conduit::{ConduitConfig, ConduitEvent, ConduitModule};
use resonance_core::grid::CellGrid;

/// Route `tracing` output through the test harness. Honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// `base_transfer_rate = 40`, everything else default (penalty 0.05).
pub fn rate_40() -> ConduitConfig {
    ConduitConfig {
        base_transfer_rate: 40,
        ..ConduitConfig::default()
    }
}

/// A module tracking every conduit already placed on `grid`.
pub fn module_for(grid: &mut CellGrid, config: ConduitConfig) -> ConduitModule {
    let mut module = ConduitModule::new(config);
    module.sync_changes(grid);
    module
}

/// Sum of every `EnergyTransferred` amount.
pub fn transferred(events: &[ConduitEvent]) -> u64 {
    events
        .iter()
        .map(|e| match e {
            ConduitEvent::EnergyTransferred { amount, .. } => u64::from(*amount),
            ConduitEvent::CacheRebuilt { .. } => 0,
        })
        .sum()
}

pub fn rebuilds(events: &[ConduitEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, ConduitEvent::CacheRebuilt { .. }))
        .count()
}
