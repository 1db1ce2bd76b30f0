//! Precomputed (cos, sin) table for the PPHT analyzer.
//!
//! θ buckets cover `[0, π)` in `MAX_THETA` steps; bucket `k` maps to angle
//! `πk / (MAX_THETA / 2)`. Built once behind a `OnceLock` and shared
//! read-only afterward — the analyzer's hot loop queries this per θ per
//! edge pixel, so it is never recomputed per call.

use std::sync::OnceLock;

/// Number of θ buckets covering `[0, π)`.
pub const MAX_THETA: usize = 1024;

static TABLE: OnceLock<[(f64, f64); MAX_THETA]> = OnceLock::new();

fn build_table() -> [(f64, f64); MAX_THETA] {
    let mut table = [(0.0, 0.0); MAX_THETA];
    for (k, entry) in table.iter_mut().enumerate() {
        let angle = std::f64::consts::PI * (k as f64) / (MAX_THETA as f64 / 2.0);
        *entry = (angle.cos(), angle.sin());
    }
    table
}

/// The shared trig table, initializing it on first call.
pub fn trig_table() -> &'static [(f64, f64); MAX_THETA] {
    TABLE.get_or_init(build_table)
}

/// `(cos, sin)` for θ bucket `k mod MAX_THETA`.
#[inline]
pub fn trig_at(k: usize) -> (f64, f64) {
    trig_table()[k % MAX_THETA]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_zero_is_unit_x() {
        let (c, s) = trig_at(0);
        assert!((c - 1.0).abs() < 1e-12);
        assert!(s.abs() < 1e-12);
    }

    #[test]
    fn quarter_turn_is_unit_y() {
        let (c, s) = trig_at(MAX_THETA / 4);
        assert!(c.abs() < 1e-9);
        assert!((s - 1.0).abs() < 1e-9);
    }

    #[test]
    fn wraps_modulo_max_theta() {
        assert_eq!(trig_at(0), trig_at(MAX_THETA));
        assert_eq!(trig_at(5), trig_at(5 + 3 * MAX_THETA));
    }

    #[test]
    fn table_is_shared_across_calls() {
        let a = trig_table() as *const _;
        let b = trig_table() as *const _;
        assert_eq!(a, b);
    }
}
