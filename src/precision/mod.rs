//! This module contains the accuracy controls shared by the summation engine and the kernel.
//!
//! It includes the user-facing `Tolerance` settings and the closed-form tail bounds that turn a
//! requested accuracy into a provably sufficient truncation radius for each lattice sum.

mod bounds;
mod tolerance;

pub use bounds::{PointCountBound, kernel_majorant, unit_ball_volume};
pub use tolerance::Tolerance;

use num_complex::Complex64;

/// Relative accuracy of a single kernel evaluation, in units of machine epsilon.
///
/// The per-term rounding budget of a sum is this constant plus the square root of the number of
/// terms, multiplied by the accumulated magnitude.
pub const KERNEL_ACCURACY_ULPS: f64 = 16.0;

/// Bound on the rounding error of a sum of `terms` values with total magnitude `magnitude`.
#[inline]
pub fn rounding_bound(terms: u64, magnitude: f64) -> f64 {
    (KERNEL_ACCURACY_ULPS + (terms as f64).sqrt()) * f64::EPSILON * magnitude
}

/// Growth factor of the rounding error of kernel terms with the imaginary part of the exponent.
///
/// Incomplete Gamma functions of order `a` with large `|Im a|` are computed from terms that
/// cancel to a relative accuracy of roughly `|Im a|` ulps, and so is the prefactor `π^{ν/2}/Γ(ν/2)`.
#[inline]
pub fn order_conditioning(nu: Complex64) -> f64 {
    2.0 * (1.0 + nu.im.abs())
}
