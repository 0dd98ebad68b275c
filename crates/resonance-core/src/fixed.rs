//! Fixed-point and integer ratio helpers shared by every Resonance crate.

use fixed::types::I32F32;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits.
pub type Fixed64 = I32F32;

/// Ticks are the atomic unit of simulation time.
pub type Ticks = u64;

/// Ratios in the routing formula are integer basis points: 10 000 = 1.0.
pub type Bps = u32;

/// One whole, in basis points.
pub const BPS_SCALE: Bps = 10_000;

/// Convert basis points to Fixed64. Use for reporting, not in the rate formula.
#[inline]
pub fn bps_to_fixed64(bps: Bps) -> Fixed64 {
    Fixed64::from_num(bps) / Fixed64::from_num(BPS_SCALE)
}

/// Convert a fractional value (e.g. `0.05`) to basis points, rounding to the
/// nearest point. Returns `None` for negative, non-finite, or overflowing input.
/// Use only for initialization, never in the sim loop.
pub fn f64_to_bps(v: f64) -> Option<Bps> {
    if !v.is_finite() || v < 0.0 {
        return None;
    }
    let scaled = (v * f64::from(BPS_SCALE)).round();
    if scaled > f64::from(u32::MAX) {
        return None;
    }
    Some(scaled as Bps)
}

/// Convert basis points back to f64. Use only for display.
#[inline]
pub fn bps_to_f64(bps: Bps) -> f64 {
    f64::from(bps) / f64::from(BPS_SCALE)
}

/// Convert Fixed64 to f64. Use only for display, never in sim loop.
#[inline]
pub fn fixed64_to_f64(v: Fixed64) -> f64 {
    v.to_num::<f64>()
}

/// `num / den` as Fixed64, rounded down. Zero when `den` is zero, and
/// saturates at `Fixed64::MAX`.
#[inline]
pub fn ratio(num: u32, den: u32) -> Fixed64 {
    if den == 0 {
        return Fixed64::ZERO;
    }
    // Both operands can exceed the 32-bit signed integer part, so divide in
    // raw bits instead of converting first.
    let bits = (u64::from(num) << 32) / u64::from(den);
    i64::try_from(bits).map_or(Fixed64::MAX, Fixed64::from_bits)
}
