//! Float comparison and clamping for flow and metric arithmetic.

/// Below this, two power values are the same.
pub const ABS_TOL: f64 = 1e-12;
/// Relative slack against the larger magnitude.
pub const REL_TOL: f64 = 1e-9;

/// Equal within [`ABS_TOL`], or within [`REL_TOL`] of the larger magnitude.
pub fn nearly_equal(a: f64, b: f64) -> bool {
    let diff = (a - b).abs();
    diff <= ABS_TOL || diff <= REL_TOL * a.abs().max(b.abs())
}

/// Clamp approximation artifacts (NaN, tiny negatives) to zero.
pub fn clamp_non_negative(v: f64) -> f64 {
    if v.is_nan() || v < 0.0 { 0.0 } else { v }
}

/// `num / den`, or 0 when the denominator is zero or the result is not finite.
pub fn ratio_or_zero(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        return 0.0;
    }
    let r = num / den;
    if r.is_finite() { r } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortfall_below_tolerance_is_equal() {
        assert!(nearly_equal(1.0, 1.0 + 1e-12));
        assert!(nearly_equal(0.0, 1e-13));
        assert!(nearly_equal(5e4, 5e4 + 1e-6));
        assert!(!nearly_equal(1.0, 1.0 + 1e-6));
    }

    #[test]
    fn clamps_artifacts() {
        assert_eq!(clamp_non_negative(-1e-15), 0.0);
        assert_eq!(clamp_non_negative(f64::NAN), 0.0);
        assert_eq!(clamp_non_negative(2.5), 2.5);
        assert_eq!(ratio_or_zero(1.0, 0.0), 0.0);
        assert_eq!(ratio_or_zero(f64::INFINITY, 2.0), 0.0);
        assert_eq!(ratio_or_zero(3.0, 2.0), 1.5);
    }
}
