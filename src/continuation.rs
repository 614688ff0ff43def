//! Classification of singular orders and exponents, and the closed forms used at them.
//!
//! The incomplete Gamma functions behind the Ewald split are analytic in their order except at
//! the non-positive integers, where the textbook formula `Γ(a) - γ(a, x)` degenerates to `0/0`.
//! This module decides once per evaluation whether an order sits on such a point and provides
//! the limiting expressions that replace the generic formula there. It also recognizes the
//! exponents at which the Epstein zeta function collapses to a closed form, and the exponents at
//! which the regularized variant needs its logarithmic remainder.

use crate::error::EpsteinError;
use crate::math::constants::{EULER_GAMMA, MAX_SERIES_ITERATIONS, POLE_SNAP_ULPS};
use crate::math::incomplete_gamma::exponential_integral_e1;
use num_complex::Complex64;

/// The order `a` of an incomplete Gamma function, tagged by whether it is a pole of `Γ(a)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Order {
    /// A generic complex order, at least a few ulps away from every non-positive integer.
    Regular(Complex64),
    /// The order `-k` for a non-negative integer `k`.
    NonPositiveInteger(u32),
}

impl Order {
    /// Classifies an order, snapping it to `-k` when it lies within a few ulps of it.
    pub fn classify(a: Complex64) -> Self {
        match nearest_non_positive_integer(a) {
            Some(k) => Order::NonPositiveInteger(k),
            None => Order::Regular(a),
        }
    }

    /// The numeric value of the order.
    pub fn value(self) -> Complex64 {
        match self {
            Order::Regular(a) => a,
            Order::NonPositiveInteger(k) => Complex64::new(-(k as f64), 0.0),
        }
    }
}

/// Returns `k` when `a` is within the snapping tolerance of `-k`.
pub fn nearest_non_positive_integer(a: Complex64) -> Option<u32> {
    if a.re > 0.5 || !a.re.is_finite() {
        return None;
    }
    let k = (-a.re).round().max(0.0);
    if k > u32::MAX as f64 {
        return None;
    }
    let tolerance = POLE_SNAP_ULPS * f64::EPSILON * a.norm().max(1.0);
    if (a + k).norm() <= tolerance {
        Some(k as u32)
    } else {
        None
    }
}

/// Exponents of the Epstein zeta function that admit a closed form or need special care.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Exponent {
    /// `ν = -2k` with `k >= 1`: the function vanishes identically.
    NegativeEvenInteger(u32),
    /// `ν = 0`: only the coincident lattice point contributes.
    Zero,
    /// `ν = d + 2k`: the reciprocal order `(d - ν)/2` is the non-positive integer `-k`.
    ReciprocalSingular(u32),
    /// Any other exponent.
    Regular,
}

impl Exponent {
    /// Classifies `ν` for a lattice of dimension `dim`.
    pub fn classify(nu: Complex64, dim: usize) -> Self {
        match nearest_non_positive_integer(nu / 2.0) {
            Some(0) => return Exponent::Zero,
            Some(k) => return Exponent::NegativeEvenInteger(k),
            None => {}
        }
        match nearest_non_positive_integer((dim as f64 - nu) / 2.0) {
            Some(k) => Exponent::ReciprocalSingular(k),
            None => Exponent::Regular,
        }
    }
}

/// Computes `E1(x) + ln x` for `x >= 0`, the analytic part of the exponential integral.
///
/// The value at `x = 0` is `-γ`.
pub fn e1_plus_ln(x: f64) -> Result<f64, EpsteinError> {
    if x > 2.0 {
        return Ok(exponential_integral_e1(x)? + x.ln());
    }
    let mut term = 1.0;
    let mut sum = 0.0;
    for m in 1..MAX_SERIES_ITERATIONS {
        term *= -x / m as f64;
        let contribution = term / m as f64;
        sum += contribution;
        if contribution.abs() <= f64::EPSILON * sum.abs().max(f64::MIN_POSITIVE) {
            return Ok(-EULER_GAMMA - sum);
        }
    }
    Err(EpsteinError::SeriesNotConverged {
        function: "E1(x) + ln x",
        iterations: MAX_SERIES_ITERATIONS,
    })
}

/// Computes the regular remainder of `Γ(-k, x) x^k` after removing its logarithmic part.
///
/// The scaled upper incomplete Gamma function at the order `-k` splits as
/// `(-1)^{k+1}/k! · x^k ln x` plus an entire function of `x`; this returns the entire part
///
/// ```text
/// (-1)^k/k! · [ x^k (E1(x) + ln x) - e^{-x} Σ_{j<k} (-1)^j j! x^{k-j-1} ]
/// ```
///
/// which equals `-γ` at `x = 0` for `k = 0` and `1/k` for `k >= 1`.
pub fn singular_upper_remainder(k: u32, x: f64) -> Result<f64, EpsteinError> {
    let head = if k == 0 {
        e1_plus_ln(x)?
    } else if x == 0.0 {
        0.0
    } else {
        x.powi(k as i32) * e1_plus_ln(x)?
    };

    let mut polynomial = 0.0;
    let mut factorial = 1.0;
    for j in 0..k {
        if j > 0 {
            factorial *= j as f64;
        }
        let sign = if j % 2 == 0 { 1.0 } else { -1.0 };
        polynomial += sign * factorial * x.powi((k - j - 1) as i32);
    }

    let k_factorial: f64 = (1..=k).map(|i| i as f64).product();
    let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
    Ok(sign / k_factorial * (head - (-x).exp() * polynomial))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::incomplete_gamma::upper_gamma_scaled;
    use approx::assert_relative_eq;

    #[test]
    fn classify_snaps_only_within_a_few_ulps() {
        assert_eq!(
            Order::classify(Complex64::new(-3.0, 0.0)),
            Order::NonPositiveInteger(3)
        );
        assert_eq!(
            Order::classify(Complex64::new(-3.0 + 1e-15, 0.0)),
            Order::NonPositiveInteger(3)
        );
        assert_eq!(
            Order::classify(Complex64::new(0.0, 0.0)),
            Order::NonPositiveInteger(0)
        );
        assert!(matches!(
            Order::classify(Complex64::new(-3.0 + 1e-10, 0.0)),
            Order::Regular(_)
        ));
        assert!(matches!(
            Order::classify(Complex64::new(-3.0, 1e-10)),
            Order::Regular(_)
        ));
        assert!(matches!(
            Order::classify(Complex64::new(2.0, 0.0)),
            Order::Regular(_)
        ));
    }

    #[test]
    fn exponent_classification_covers_all_special_cases() {
        assert_eq!(Exponent::classify(Complex64::new(0.0, 0.0), 3), Exponent::Zero);
        assert_eq!(
            Exponent::classify(Complex64::new(-4.0, 0.0), 2),
            Exponent::NegativeEvenInteger(2)
        );
        assert_eq!(
            Exponent::classify(Complex64::new(1.0, 0.0), 1),
            Exponent::ReciprocalSingular(0)
        );
        assert_eq!(
            Exponent::classify(Complex64::new(7.0, 0.0), 3),
            Exponent::ReciprocalSingular(2)
        );
        assert_eq!(Exponent::classify(Complex64::new(2.0, 0.0), 3), Exponent::Regular);
        assert_eq!(Exponent::classify(Complex64::new(6.0, 0.0), 3), Exponent::Regular);
    }

    #[test]
    fn e1_plus_ln_is_continuous_across_branch_switch() {
        assert_relative_eq!(e1_plus_ln(0.0).unwrap(), -EULER_GAMMA, epsilon = 1e-16);
        let below = e1_plus_ln(2.0).unwrap();
        let above = exponential_integral_e1(2.0).unwrap() + 2.0f64.ln();
        assert_relative_eq!(below, above, epsilon = 1e-14);
        assert_relative_eq!(
            e1_plus_ln(0.5).unwrap(),
            0.559_773_594_776_160_811_75 + 0.5f64.ln(),
            epsilon = 1e-15
        );
    }

    #[test]
    fn singular_remainder_has_documented_limits_at_zero() {
        assert_relative_eq!(
            singular_upper_remainder(0, 0.0).unwrap(),
            -EULER_GAMMA,
            epsilon = 1e-16
        );
        for k in 1..5 {
            assert_relative_eq!(
                singular_upper_remainder(k, 0.0).unwrap(),
                1.0 / k as f64,
                epsilon = 1e-15
            );
        }
    }

    #[test]
    fn singular_remainder_plus_log_part_reproduces_upper_gamma() {
        for k in 0..4u32 {
            for &x in &[0.05, 0.7, 3.0] {
                let remainder = singular_upper_remainder(k, x).unwrap();
                let sign = if k % 2 == 0 { -1.0 } else { 1.0 };
                let k_factorial: f64 = (1..=k).map(|i| i as f64).product();
                let log_part = sign / k_factorial * x.powi(k as i32) * x.ln();
                let full = upper_gamma_scaled(Order::NonPositiveInteger(k), x).unwrap();
                assert_relative_eq!(remainder + log_part, full.re, max_relative = 1e-10);
            }
        }
    }
}
