//! Thresholds shared by every geometric predicate.
//!
//! Predicates take an explicit threshold where the caller cares; everything
//! else reads from here so that the binding border and the on-curve and
//! on-ellipse tests stay consistent at small and large shape scales.

/// Default distance under which a point counts as lying on a line, curve or
/// ellipse outline.
pub const DEFAULT_THRESHOLD: f64 = 1e-4;

/// Absolute guard for zero lengths and zero denominators.
pub const EPSILON: f64 = 1e-10;

/// Relative tolerance applied against the magnitude of the inputs.
pub const RELATIVE_EPSILON: f64 = 1e-12;

/// Number of chords used to approximate a cubic curve.
pub const CURVE_SEGMENTS: usize = 64;

/// Iterations of the nearest-point search on an ellipse outline.
pub const ELLIPSE_ITERATIONS: usize = 4;

/// Tolerance scaled to the magnitude of the values being compared, never
/// smaller than [`EPSILON`].
#[inline]
pub fn relative_epsilon(magnitude: f64) -> f64 {
    (magnitude.abs() * RELATIVE_EPSILON).max(EPSILON)
}

/// Whether `value` is zero relative to `magnitude`.
#[inline]
pub fn near_zero(value: f64, magnitude: f64) -> bool {
    value.abs() <= relative_epsilon(magnitude)
}
