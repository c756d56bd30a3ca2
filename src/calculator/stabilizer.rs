//! Zero-snapping of floating point noise.
//!
//! `sin(pi)` gives `1.2e-16` in floating point; after stabilization it is exactly `0`.
//! A component is snapped when its magnitude is below the tolerance, everything else passes
//! through untouched, so applying the operation twice changes nothing.
use num_complex::Complex64;

/// tolerance used unless the caller configures another one
pub const DEFAULT_ZERO_TOLERANCE: f64 = 1e-10;

pub trait Stabilize: Sized {
    fn stabilize(self, tolerance: f64) -> Self;
}

#[inline]
fn snap(component: f64, tolerance: f64) -> f64 {
    // also turns -0.0 into 0.0
    if component.abs() < tolerance { 0.0 } else { component }
}

impl Stabilize for f64 {
    fn stabilize(self, tolerance: f64) -> Self {
        snap(self, tolerance)
    }
}

impl Stabilize for Complex64 {
    fn stabilize(self, tolerance: f64) -> Self {
        Complex64::new(snap(self.re, tolerance), snap(self.im, tolerance))
    }
}

pub fn stabilize<T: Stabilize>(value: T, tolerance: f64) -> T {
    value.stabilize(tolerance)
}
