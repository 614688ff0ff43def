//! The incomplete Bessel function `G_ν(k, r)`.
//!
//! For `k, r ∈ R^d` and complex `ν`,
//!
//! ```text
//! G_ν(k, r) = ∫_0^1 t^{-ν/2-1} exp(-π|k|²/t - π|r|²t) dt.
//! ```
//!
//! With `r = 0` it is the scaled upper incomplete Gamma function `Γ(ν/2, π|k|²)(π|k|²)^{-ν/2}`,
//! the weight of every term of the Ewald sums; with `k = 0` it is the analytically continued
//! scaled lower incomplete Gamma function. In the general case the integral is computed by
//! adaptive Gauss–Kronrod quadrature after the substitution `t = e^{-w}`, which turns it into
//! `∫_0^∞ exp(s w - a e^w - b e^{-w}) dw` with `s = ν/2`, `a = π|k|²`, `b = π|r|²` and a concave
//! exponent.

use crate::continuation::Order;
use crate::error::EpsteinError;
use crate::math::incomplete_gamma::{lower_gamma_scaled, upper_gamma_scaled};
use crate::math::quadrature::integrate_adaptive;
use crate::precision::Tolerance;
use crate::types::Evaluation;
use num_complex::Complex64;
use std::f64::consts::PI;
use tracing::trace;

/// Extra decay, beyond `ln(1/ε)`, required of the integrand before the domain is cut off.
const CUTOFF_MARGIN: f64 = 10.0;

/// Evaluates the incomplete Bessel function `G_ν(k, r)`.
///
/// # Arguments
///
/// * `nu` - The complex order `ν`.
/// * `k` - The first argument; enters through `|k|²`.
/// * `r` - The second argument; enters through `|r|²`.
/// * `tolerance` - The accuracy and work settings; only `relative`, `absolute` and
///   `max_subintervals` are used.
///
/// # Returns
///
/// An [`Evaluation`] carrying the value and an error estimate. The term counters are zero.
///
/// # Errors
///
/// * `EpsteinError::InvalidArgument` if an input is not finite, the vectors differ in length,
///   or the tolerance is invalid.
/// * `EpsteinError::Pole` at `k = 0` when `ν ∈ 2N_0`.
/// * `EpsteinError::SeriesNotConverged` if the quadrature exceeds its subinterval budget.
/// * `EpsteinError::NumericOverflow` if the value is not representable.
pub fn incomplete_bessel(
    nu: Complex64,
    k: &[f64],
    r: &[f64],
    tolerance: &Tolerance,
) -> Result<Evaluation, EpsteinError> {
    tolerance.validate()?;
    if !(nu.re.is_finite() && nu.im.is_finite()) {
        return Err(EpsteinError::InvalidArgument(format!(
            "order nu must be finite, got {nu}"
        )));
    }
    if k.len() != r.len() {
        return Err(EpsteinError::InvalidArgument(format!(
            "arguments have different lengths: {} and {}",
            k.len(),
            r.len()
        )));
    }
    if k.iter().chain(r).any(|v| !v.is_finite()) {
        return Err(EpsteinError::InvalidArgument(
            "arguments must be finite".to_string(),
        ));
    }

    let a = PI * k.iter().map(|v| v * v).sum::<f64>();
    let b = PI * r.iter().map(|v| v * v).sum::<f64>();
    let s = nu / 2.0;
    let pole = |error: EpsteinError| match error {
        EpsteinError::Pole { .. } => EpsteinError::Pole { nu },
        other => other,
    };

    let (value, error_estimate) = if a == 0.0 && b == 0.0 {
        let value = upper_gamma_scaled(Order::classify(s), 0.0).map_err(pole)?;
        (value, 0.0)
    } else if a == 0.0 {
        let value = lower_gamma_scaled(Order::classify(-s), b).map_err(pole)?;
        (value, exact_branch_error(value))
    } else if b == 0.0 {
        let value = upper_gamma_scaled(Order::classify(s), a)?;
        (value, exact_branch_error(value))
    } else {
        integrate(s, a, b, tolerance)?
    };

    if !(value.re.is_finite() && value.im.is_finite()) {
        return Err(EpsteinError::NumericOverflow("incomplete Bessel function"));
    }
    Ok(Evaluation {
        value,
        error_estimate,
        direct_terms: 0,
        reciprocal_terms: 0,
    })
}

fn exact_branch_error(value: Complex64) -> f64 {
    crate::precision::rounding_bound(1, value.norm())
}

/// Quadrature of `∫_0^∞ exp(s w - a e^w - b e^{-w}) dw` for `a, b > 0`.
fn integrate(
    s: Complex64,
    a: f64,
    b: f64,
    tolerance: &Tolerance,
) -> Result<(Complex64, f64), EpsteinError> {
    let sigma = s.re;
    let exponent = |w: f64| sigma * w - a * w.exp() - b * (-w).exp();

    // Stationary point of the concave exponent: a e^{2w} - σ e^w - b = 0.
    let root = (sigma * sigma + 4.0 * a * b).sqrt();
    let e_peak = if sigma >= 0.0 {
        (sigma + root) / (2.0 * a)
    } else {
        2.0 * b / (root - sigma)
    };
    let peak = e_peak.ln().max(0.0);
    let maximum = exponent(peak);

    let drop = (1.0 / tolerance.relative).ln() + CUTOFF_MARGIN;
    let mut step = 1.0;
    while exponent(peak + step) > maximum - drop {
        step *= 2.0;
        if !step.is_finite() {
            return Err(EpsteinError::NumericOverflow(
                "incomplete Bessel integration range",
            ));
        }
    }
    let cutoff = peak + step;

    let integrand = |w: f64| (s * w - a * w.exp() - b * (-w).exp() - maximum).exp();
    let absolute = if tolerance.absolute > 0.0 {
        tolerance.absolute * (-maximum).exp()
    } else {
        0.0
    };

    let mut value = Complex64::new(0.0, 0.0);
    let mut error = 0.0;
    let mut subintervals = 0;
    for (lower, upper) in [(0.0, peak), (peak, cutoff)] {
        if upper <= lower {
            continue;
        }
        let part = integrate_adaptive(
            integrand,
            lower,
            upper,
            tolerance.relative,
            absolute,
            tolerance.max_subintervals,
        )?;
        value += part.value;
        error += part.error_estimate;
        subintervals += part.subintervals;
    }
    trace!(peak, cutoff, subintervals, "incomplete Bessel quadrature");

    let scale = maximum.exp();
    Ok((value * scale, error * scale))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn bessel(nu: Complex64, k: f64, r: f64) -> Complex64 {
        incomplete_bessel(nu, &[k], &[r], &Tolerance::default())
            .unwrap()
            .value
    }

    fn real(nu: f64) -> Complex64 {
        Complex64::new(nu, 0.0)
    }

    #[test]
    fn reproduces_reference_values() {
        assert_relative_eq!(
            bessel(real(2.1), 1.2, 1.3).re,
            3.616_792_891_719_726e-5,
            max_relative = 1e-14
        );
        assert_relative_eq!(
            bessel(real(2.1), 1.3, 1.2).re,
            2.250_004_599_575_783_6e-5,
            max_relative = 1e-14
        );
        assert_relative_eq!(
            bessel(real(-4.0), 0.1, 0.1).re,
            0.460_876_358_532_594_554_02,
            max_relative = 1e-13
        );
        assert_relative_eq!(
            bessel(real(-4.0), 1.1, 1.1).re,
            0.000_137_333_349_463_385_011_74,
            max_relative = 1e-13
        );
        assert_relative_eq!(
            bessel(real(-4.0), 0.1, 1.1).re,
            0.054_993_574_112_453_217_357,
            max_relative = 1e-13
        );
        assert_relative_eq!(
            bessel(real(-4.0), 1.1, 0.1).re,
            0.003_383_527_491_749_369_024,
            max_relative = 1e-13
        );
    }

    #[test]
    fn complex_order_matches_reference() {
        let value = bessel(Complex64::new(1.0, 3.0), 0.6, 1.1);
        assert_relative_eq!(value.re, 0.008_242_294_447_395_115_211_2, max_relative = 1e-12);
        assert_relative_eq!(value.im, 0.018_601_246_056_110_368_681, max_relative = 1e-12);
    }

    #[test]
    fn degenerate_arguments_use_closed_forms() {
        assert_relative_eq!(
            bessel(real(2.1), 0.8, 0.0).re,
            0.067_815_205_112_991_097_308,
            max_relative = 1e-13
        );
        assert_relative_eq!(
            bessel(real(-3.0), 0.0, 0.8).re,
            0.230_283_569_050_149_798_51,
            max_relative = 1e-13
        );
        assert_relative_eq!(
            bessel(real(2.1), 0.0, 0.8).re,
            40.869_381_483_089_951_57,
            max_relative = 1e-13
        );
        assert_relative_eq!(bessel(real(-3.0), 0.0, 0.0).re, 2.0 / 3.0, epsilon = 1e-15);
    }

    #[test]
    fn swapped_arguments_satisfy_the_bessel_identity() {
        // G_ν(k, r) + G_{-ν}(r, k) = 2 (|r|/|k|)^{ν/2} K_{ν/2}(2π|k||r|)
        let forward = bessel(real(2.1), 1.2, 1.3).re + bessel(real(-2.1), 1.3, 1.2).re;
        assert_relative_eq!(forward, 5.024_369_495_386_568_3e-5, max_relative = 1e-12);
        let backward = bessel(real(2.1), 1.3, 1.2).re + bessel(real(-2.1), 1.2, 1.3).re;
        assert_relative_eq!(backward, 4.246_989_106_765_611_6e-5, max_relative = 1e-12);
    }

    #[test]
    fn poles_and_invalid_input_are_reported() {
        for nu in [0.0, 2.0, 4.0] {
            let result = incomplete_bessel(real(nu), &[0.0], &[0.5], &Tolerance::default());
            assert!(matches!(result, Err(EpsteinError::Pole { nu: p }) if p.re == nu));
        }
        let result = incomplete_bessel(real(0.0), &[0.0], &[0.0], &Tolerance::default());
        assert!(matches!(result, Err(EpsteinError::Pole { .. })));

        let result = incomplete_bessel(real(1.0), &[0.0, 1.0], &[0.5], &Tolerance::default());
        assert!(matches!(result, Err(EpsteinError::InvalidArgument(_))));
        let result = incomplete_bessel(real(f64::NAN), &[1.0], &[0.5], &Tolerance::default());
        assert!(matches!(result, Err(EpsteinError::InvalidArgument(_))));
    }

    #[test]
    fn quadrature_agrees_with_closed_form_as_one_argument_vanishes() {
        let closed = bessel(real(2.1), 0.8, 0.0).re;
        let nearby = bessel(real(2.1), 0.8, 1e-7).re;
        assert_relative_eq!(nearby, closed, max_relative = 1e-9);
    }

    #[test]
    fn benchmark_grid_is_finite_everywhere() {
        let tolerance = Tolerance::default();
        for i in 0..11 {
            for j in 0..11 {
                let k = 0.1 + 0.1 * i as f64;
                let r = 0.1 + 0.1 * j as f64;
                let evaluation = incomplete_bessel(real(-4.0), &[k], &[r], &tolerance).unwrap();
                assert!(evaluation.value.re.is_finite());
                assert!(evaluation.value.re > 0.0);
                assert!(evaluation.error_estimate <= 1e-12 * evaluation.value.norm());
            }
        }
    }
}
