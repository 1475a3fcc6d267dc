//! Repair of solver numerical noise.
//!
//! Two passes run on every window. The binary pass snaps nominally binary
//! unit variables to exactly 0 or 1 when they sit within tolerance of either
//! bound. The zero pass runs on all families after the hour shift and only
//! ever moves values to 0. Values outside tolerance pass through untouched.

use serde::Deserialize;

/// Default absolute tolerance of the binary pass.
pub const BINARY_TOLERANCE: f64 = 1e-4;
/// Default absolute tolerance of the zero pass.
pub const ZERO_TOLERANCE: f64 = 1e-4;

/// Snaps `value` to 0 or 1 when it lies within `tolerance` of that bound.
///
/// Idempotent: a snapped value is exactly on a bound and stays there.
///
/// ```
/// use horizon_sim::record::noise::snap_binary;
///
/// assert_eq!(snap_binary(0.99995, 1e-4), 1.0);
/// assert_eq!(snap_binary(-0.00003, 1e-4), 0.0);
/// assert_eq!(snap_binary(0.5, 1e-4), 0.5);
/// ```
pub fn snap_binary(value: f64, tolerance: f64) -> f64 {
    if value.abs() <= tolerance {
        0.0
    } else if (value - 1.0).abs() <= tolerance {
        1.0
    } else {
        value
    }
}

/// Snaps `value` to 0 when it lies within `tolerance` of zero.
pub fn snap_zero(value: f64, tolerance: f64) -> f64 {
    if value.abs() <= tolerance { 0.0 } else { value }
}

/// Tolerances of both repair passes.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NoiseFilter {
    /// Absolute tolerance for snapping binary kinds to 0 or 1.
    pub binary_tolerance: f64,
    /// Absolute tolerance for snapping any value to 0.
    pub zero_tolerance: f64,
}

impl Default for NoiseFilter {
    fn default() -> Self {
        Self {
            binary_tolerance: BINARY_TOLERANCE,
            zero_tolerance: ZERO_TOLERANCE,
        }
    }
}

impl NoiseFilter {
    pub fn binary(&self, value: f64) -> f64 {
        snap_binary(value, self.binary_tolerance)
    }

    pub fn zero(&self, value: f64) -> f64 {
        snap_zero(value, self.zero_tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn binary_snap_is_idempotent() {
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..10_000 {
            let base = if rng.random::<bool>() { 0.0 } else { 1.0 };
            let value = base + rng.random_range(-3e-4..3e-4);
            let once = snap_binary(value, BINARY_TOLERANCE);
            assert_eq!(snap_binary(once, BINARY_TOLERANCE), once, "value {value}");
        }
    }

    #[test]
    fn binary_snap_converges_within_tolerance() {
        assert_eq!(snap_binary(1e-4, BINARY_TOLERANCE), 0.0);
        assert_eq!(snap_binary(1.0 - 5e-5, BINARY_TOLERANCE), 1.0);
        assert_eq!(snap_binary(1.0 + 5e-5, BINARY_TOLERANCE), 1.0);
    }

    #[test]
    fn binary_snap_leaves_out_of_tolerance_values() {
        assert_eq!(snap_binary(0.0002, BINARY_TOLERANCE), 0.0002);
        assert_eq!(snap_binary(0.9990, BINARY_TOLERANCE), 0.9990);
        assert_eq!(snap_binary(0.6, BINARY_TOLERANCE), 0.6);
    }

    #[test]
    fn bounds_are_fixed_points() {
        assert_eq!(snap_binary(0.0, BINARY_TOLERANCE), 0.0);
        assert_eq!(snap_binary(1.0, BINARY_TOLERANCE), 1.0);
        assert_eq!(snap_zero(0.0, ZERO_TOLERANCE), 0.0);
    }

    #[test]
    fn zero_snap_never_moves_toward_one() {
        let filter = NoiseFilter::default();
        assert_eq!(filter.zero(0.00005), 0.0);
        assert_eq!(filter.zero(-0.00005), 0.0);
        assert_eq!(filter.zero(0.6), 0.6);
        assert_eq!(filter.zero(0.99995), 0.99995);
    }
}
