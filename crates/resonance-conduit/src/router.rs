//! Per-tick energy routing from cached sources to cached sinks.
//!
//! Every source/sink pair moves at most one distance-scaled rate per tick.
//! Endpoints are re-resolved through the grid for every pair. The offer is
//! capped by what the source could release (a simulated extraction), the
//! sink's `receive_energy` decides how much actually moves, and the source
//! is then asked for exactly that amount.

use resonance_core::energy::{headroom, is_role_compatible, is_valid_sink, is_valid_source};
use resonance_core::fixed::{BPS_SCALE, Bps};
use resonance_core::grid::GridAccessor;
use resonance_core::pos::CellPos;

use crate::cache::NetworkCache;
use crate::config::ConduitConfig;

/// Energy moved from one source to one sink during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Transfer {
    pub source: CellPos,
    pub sink: CellPos,
    /// Amount the sink accepted.
    pub amount: u32,
}

/// `max(min_multiplier, 1 - total_distance * distance_penalty)` in basis points.
pub fn distance_multiplier(config: &ConduitConfig, total_distance: u32) -> Bps {
    let loss = u64::from(total_distance) * u64::from(config.distance_penalty);
    let remaining = u64::from(BPS_SCALE).saturating_sub(loss);
    // remaining <= BPS_SCALE, so the cast is lossless.
    (remaining as Bps).max(config.min_multiplier)
}

/// `max(1, floor(base_transfer_rate * multiplier))` for a pair whose
/// distances sum to `total_distance`.
pub fn transfer_rate(config: &ConduitConfig, total_distance: u32) -> u32 {
    let multiplier = distance_multiplier(config, total_distance);
    let scaled =
        u64::from(config.base_transfer_rate) * u64::from(multiplier) / u64::from(BPS_SCALE);
    u32::try_from(scaled).unwrap_or(u32::MAX).max(1)
}

/// Move energy for every cached source x sink pair.
///
/// Stale entries (endpoint gone, drained, or full) are skipped for this
/// tick. A source cached as its own sink is never paired with itself.
pub fn route<G: GridAccessor + ?Sized>(
    cache: &NetworkCache,
    grid: &mut G,
    config: &ConduitConfig,
) -> Vec<Transfer> {
    let mut transfers = Vec::new();
    if !cache.is_routable() {
        return transfers;
    }

    for source in cache.sources() {
        for sink in cache.sinks() {
            if sink.pos == source.pos {
                continue;
            }

            // The source drains as pairs are served; stop once it cannot give.
            let Some(src) = grid.endpoint(source.pos) else {
                break;
            };
            if !is_valid_source(src) {
                break;
            }
            let source_role = src.role();
            let available = src.energy_stored();

            let Some(dst) = grid.endpoint(sink.pos) else {
                continue;
            };
            if !is_valid_sink(dst) || !is_role_compatible(source_role, dst.role()) {
                continue;
            }
            let room = headroom(dst);

            let rate = transfer_rate(config, source.distance + sink.distance);
            let wanted = rate.min(available).min(room);
            if wanted == 0 {
                continue;
            }
            // Per-call extract limits can hold the source below its charge.
            let amount = grid
                .endpoint_mut(source.pos)
                .map_or(0, |src| src.extract_energy(wanted, true));
            if amount == 0 {
                continue;
            }

            let Some(dst) = grid.endpoint_mut(sink.pos) else {
                continue;
            };
            let received = dst.receive_energy(amount, false);
            if received == 0 {
                continue;
            }

            let extracted = grid
                .endpoint_mut(source.pos)
                .map_or(0, |src| src.extract_energy(received, false));
            if extracted != received {
                tracing::warn!(
                    source = %source.pos,
                    sink = %sink.pos,
                    received,
                    extracted,
                    "source released a different amount than the sink accepted"
                );
            }

            tracing::trace!(source = %source.pos, sink = %sink.pos, amount = received, "transfer");
            transfers.push(Transfer {
                source: source.pos,
                sink: sink.pos,
                amount: received,
            });
        }
    }

    transfers
}
