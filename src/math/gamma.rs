use super::constants::{HALF_LN_TWO_PI, LANCZOS_COEFFS, LANCZOS_G, RGAMMA_TAYLOR};
use num_complex::Complex64;
use std::f64::consts::PI;

/// Computes `sin(πz)` with exact zeros at the integers.
///
/// The real part is reduced to `[-1/2, 1/2]` before multiplying by π, so integer arguments give
/// an exact zero instead of a rounding residue.
#[inline]
pub fn sin_pi(z: Complex64) -> Complex64 {
    let n = z.re.round();
    let r = z.re - n;
    let sign = if n.rem_euclid(2.0) == 0.0 { 1.0 } else { -1.0 };
    let (s, c) = (PI * r).sin_cos();
    let y = PI * z.im;
    Complex64::new(sign * s * y.cosh(), sign * c * y.sinh())
}

#[inline]
fn lanczos_ln_gamma(z: Complex64) -> Complex64 {
    let z = z - 1.0;
    let mut series = Complex64::new(LANCZOS_COEFFS[0], 0.0);
    for (i, &c) in LANCZOS_COEFFS.iter().enumerate().skip(1) {
        series += c / (z + i as f64);
    }
    let t = z + LANCZOS_G + 0.5;
    HALF_LN_TWO_PI + (z + 0.5) * t.ln() - t + series.ln()
}

/// Computes a logarithm of the Gamma function for complex arguments.
///
/// The imaginary part is only determined modulo `2π`; the result is intended to be fed to
/// `exp` together with other logarithms, not to be compared against the principal branch.
pub fn ln_gamma(z: Complex64) -> Complex64 {
    if z.re >= 0.5 {
        lanczos_ln_gamma(z)
    } else {
        Complex64::new(PI.ln(), 0.0) - sin_pi(z).ln() - lanczos_ln_gamma(1.0 - z)
    }
}

/// Computes the Gamma function for complex arguments.
///
/// Uses the Lanczos approximation for `Re z >= 1/2` and the reflection formula otherwise. At the
/// poles `z = 0, -1, -2, ...` the result is not finite; callers that may hit a pole should use
/// [`rgamma`] instead.
pub fn gamma(z: Complex64) -> Complex64 {
    if z.re >= 0.5 {
        lanczos_ln_gamma(z).exp()
    } else {
        PI / (sin_pi(z) * lanczos_ln_gamma(1.0 - z).exp())
    }
}

/// Computes the reciprocal Gamma function `1/Γ(z)`, an entire function.
///
/// Returns an exact zero at the non-positive integers.
pub fn rgamma(z: Complex64) -> Complex64 {
    if z.re >= 0.5 {
        (-lanczos_ln_gamma(z)).exp()
    } else {
        sin_pi(z) * lanczos_ln_gamma(1.0 - z).exp() / PI
    }
}

/// Evaluates the Taylor series of `1/Γ(1 + a)` for `|a| <= 1`.
///
/// Returns the pair `(r, q)` with `r = 1/Γ(1 + a)` and `q` such that `r = 1 + a q`. The second
/// value gives `(Γ(1 + a) - 1)/a = -q/r` without cancellation for small `a`.
pub fn rgamma1p_taylor(a: Complex64) -> (Complex64, Complex64) {
    let mut q = Complex64::new(0.0, 0.0);
    for &c in RGAMMA_TAYLOR[1..].iter().rev() {
        q = q * a + c;
    }
    (1.0 + a * q, q)
}

/// Computes `(e^z - 1)/z` without cancellation near `z = 0`.
pub fn exprel(z: Complex64) -> Complex64 {
    if z.norm() < 0.5 {
        let mut term = Complex64::new(1.0, 0.0);
        let mut sum = term;
        for n in 2..40 {
            term *= z / n as f64;
            sum += term;
            if term.norm() <= f64::EPSILON * sum.norm() {
                break;
            }
        }
        sum
    } else {
        (z.exp() - 1.0) / z
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sin_pi_is_exactly_zero_at_integers() {
        for n in -5..=5 {
            let value = sin_pi(Complex64::new(n as f64, 0.0));
            assert_eq!(value.re, 0.0);
            assert_eq!(value.im, 0.0);
        }
        assert_relative_eq!(sin_pi(Complex64::new(0.5, 0.0)).re, 1.0, epsilon = 1e-15);
        assert_relative_eq!(sin_pi(Complex64::new(-1.5, 0.0)).re, 1.0, epsilon = 1e-15);
    }

    #[test]
    fn gamma_matches_reference_values() {
        assert_relative_eq!(gamma(Complex64::new(7.0, 0.0)).re, 720.0, max_relative = 1e-13);
        assert_relative_eq!(
            gamma(Complex64::new(0.5, 0.0)).re,
            PI.sqrt(),
            max_relative = 1e-14
        );
        assert_relative_eq!(
            gamma(Complex64::new(-2.5, 0.0)).re,
            -0.945_308_720_482_941_881_23,
            max_relative = 1e-13
        );

        let z = gamma(Complex64::new(0.3, 2.0));
        assert_relative_eq!(z.re, 0.057_465_337_569_588_033_46, max_relative = 1e-12);
        assert_relative_eq!(z.im, -0.074_984_912_582_646_138_176, max_relative = 1e-12);
    }

    #[test]
    fn rgamma_vanishes_at_poles_and_inverts_gamma_elsewhere() {
        for k in 0..6 {
            let value = rgamma(Complex64::new(-(k as f64), 0.0));
            assert_eq!(value.norm(), 0.0);
        }
        let z = Complex64::new(1.7, -0.4);
        let product = rgamma(z) * gamma(z);
        assert_relative_eq!(product.re, 1.0, epsilon = 1e-13);
        assert_relative_eq!(product.im, 0.0, epsilon = 1e-13);
    }

    #[test]
    fn ln_gamma_exponentiates_to_gamma() {
        for &z in &[
            Complex64::new(25.0, 0.0),
            Complex64::new(0.2, 3.0),
            Complex64::new(-3.7, 0.5),
        ] {
            let direct = gamma(z);
            let via_log = ln_gamma(z).exp();
            assert_relative_eq!(via_log.re, direct.re, max_relative = 1e-11);
            assert_relative_eq!(via_log.im, direct.im, max_relative = 1e-11, epsilon = 1e-300);
        }
    }

    #[test]
    fn rgamma1p_taylor_agrees_with_lanczos() {
        for &a in &[
            Complex64::new(0.3, 0.0),
            Complex64::new(-0.45, 0.2),
            Complex64::new(0.0, 0.9),
        ] {
            let (r, q) = rgamma1p_taylor(a);
            let expected = rgamma(1.0 + a);
            assert_relative_eq!(r.re, expected.re, epsilon = 1e-14);
            assert_relative_eq!(r.im, expected.im, epsilon = 1e-14);
            let back = 1.0 + a * q;
            assert_relative_eq!(back.re, r.re, epsilon = 1e-15);
        }
        let (_, q) = rgamma1p_taylor(Complex64::new(0.0, 0.0));
        assert_relative_eq!(q.re, RGAMMA_TAYLOR[1], epsilon = 1e-16);
    }

    #[test]
    fn exprel_is_smooth_through_zero() {
        assert_relative_eq!(exprel(Complex64::new(0.0, 0.0)).re, 1.0, epsilon = 1e-16);
        assert_relative_eq!(exprel(Complex64::new(1e-9, 0.0)).re, 1.0 + 0.5e-9, epsilon = 1e-16);
        let z = Complex64::new(2.0, 0.0);
        assert_relative_eq!(exprel(z).re, (2.0f64.exp() - 1.0) / 2.0, max_relative = 1e-15);
    }
}
