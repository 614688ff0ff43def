use super::constants::{EULER_GAMMA, LENTZ_TINY, MAX_SERIES_ITERATIONS};
use super::gamma::{exprel, ln_gamma, rgamma1p_taylor};
use crate::continuation::Order;
use crate::error::EpsteinError;
use num_complex::Complex64;

/// Computes the exponential integral `E1(x)` for `x > 0`.
///
/// Uses the power series for `x <= 1` and the Legendre continued fraction beyond.
pub fn exponential_integral_e1(x: f64) -> Result<f64, EpsteinError> {
    if x <= 1.0 {
        let mut term = 1.0;
        let mut sum = 0.0;
        for m in 1..MAX_SERIES_ITERATIONS {
            term *= -x / m as f64;
            let contribution = term / m as f64;
            sum += contribution;
            if contribution.abs() <= f64::EPSILON * sum.abs().max(f64::MIN_POSITIVE) {
                return Ok(-EULER_GAMMA - x.ln() - sum);
            }
        }
        return Err(EpsteinError::SeriesNotConverged {
            function: "exponential integral series",
            iterations: MAX_SERIES_ITERATIONS,
        });
    }

    let mut b = x + 1.0;
    let mut c = 1.0 / LENTZ_TINY;
    let mut d = 1.0 / b;
    let mut h = d;
    for i in 1..MAX_SERIES_ITERATIONS {
        let an = -((i * i) as f64);
        b += 2.0;
        d = 1.0 / (an * d + b);
        c = b + an / c;
        let delta = c * d;
        h *= delta;
        if (delta - 1.0).abs() <= 2.0 * f64::EPSILON {
            return Ok(h * (-x).exp());
        }
    }
    Err(EpsteinError::SeriesNotConverged {
        function: "exponential integral continued fraction",
        iterations: MAX_SERIES_ITERATIONS,
    })
}

/// Computes the scaled upper incomplete Gamma function `g(a, x) = Γ(a, x) x^{-a}`.
///
/// Equivalently `g(a, x) = ∫_1^∞ t^{a-1} e^{-xt} dt`, which is the weight of every term of the
/// Ewald sums. The function is entire in `a` for `x > 0`. At `x = 0` it is continued as `-1/a`,
/// with a pole at `a = 0` reported as [`EpsteinError::Pole`] carrying the order.
///
/// # Arguments
///
/// * `order` - The classified order `a`.
/// * `x` - The non-negative argument.
///
/// # Returns
///
/// The complex value of `g(a, x)`.
///
/// # Errors
///
/// Returns [`EpsteinError::SeriesNotConverged`] if an inner expansion exceeds its iteration
/// budget, and [`EpsteinError::Pole`] for `a = 0, x = 0`.
pub fn upper_gamma_scaled(order: Order, x: f64) -> Result<Complex64, EpsteinError> {
    if x == 0.0 {
        return match order {
            Order::NonPositiveInteger(0) => Err(EpsteinError::Pole {
                nu: Complex64::new(0.0, 0.0),
            }),
            other => Ok(-1.0 / other.value()),
        };
    }

    let a = order.value();
    if x >= 1.0 && x >= a.re {
        return upper_continued_fraction(a, x);
    }

    match order {
        Order::NonPositiveInteger(k) => {
            let mut g = Complex64::new(exponential_integral_e1(x)?, 0.0);
            let decay = (-x).exp();
            for j in 0..k {
                g = (x * g - decay) / -((j + 1) as f64);
            }
            Ok(g)
        }
        Order::Regular(a) => {
            let shift = if a.re >= 0.5 { 0 } else { (-a.re).round() as u32 };
            let shifted = a + shift as f64;
            let mut g = if shifted.norm() <= 1.0 {
                upper_temme(shifted, x)?
            } else {
                (ln_gamma(shifted) - shifted * x.ln()).exp() - lower_series(shifted, x)?
            };
            let decay = (-x).exp();
            let mut current = shifted;
            for _ in 0..shift {
                current -= 1.0;
                g = (x * g - decay) / current;
            }
            Ok(g)
        }
    }
}

/// Computes the scaled lower incomplete Gamma function `γ(a, x) x^{-a}`.
///
/// Equivalently `∫_0^1 t^{a-1} e^{-xt} dt`, continued analytically in `a`. It equals `1/a` at
/// `x = 0` and has poles at the non-positive integers for `x > 0`.
///
/// # Errors
///
/// Returns [`EpsteinError::Pole`] (carrying the order) when `a` is a non-positive integer and
/// `x > 0`, or `a = 0`.
pub fn lower_gamma_scaled(order: Order, x: f64) -> Result<Complex64, EpsteinError> {
    let a = match order {
        Order::NonPositiveInteger(k) if x > 0.0 || k == 0 => {
            return Err(EpsteinError::Pole { nu: order.value() });
        }
        other => other.value(),
    };
    if x == 0.0 {
        return Ok(1.0 / a);
    }
    if (a.re > 0.0 && x < 50.0) || x < 1.5 {
        lower_series(a, x)
    } else {
        Ok((ln_gamma(a) - a * x.ln()).exp() - upper_gamma_scaled(order, x)?)
    }
}

/// Kummer series `e^{-x} Σ_n x^n / (a)_{n+1}` of the scaled lower incomplete Gamma function.
fn lower_series(a: Complex64, x: f64) -> Result<Complex64, EpsteinError> {
    let mut term = 1.0 / a;
    let mut sum = term;
    for n in 1..MAX_SERIES_ITERATIONS {
        term *= x / (a + n as f64);
        sum += term;
        if term.norm() <= f64::EPSILON * sum.norm() && (n as f64) > x - a.re {
            return Ok(sum * (-x).exp());
        }
    }
    Err(EpsteinError::SeriesNotConverged {
        function: "lower incomplete gamma series",
        iterations: MAX_SERIES_ITERATIONS,
    })
}

/// Temme-type splitting for `|a| <= 1`, `x < 1`, stable across `a = 0`.
fn upper_temme(a: Complex64, x: f64) -> Result<Complex64, EpsteinError> {
    let ln_x = x.ln();
    let (r, q) = rgamma1p_taylor(a);
    let gamma_part = -q / r;
    let power_part = ln_x * exprel(a * ln_x);
    let x_pow_a = (a * ln_x).exp();

    let mut term = Complex64::new(1.0, 0.0);
    let mut sum = Complex64::new(0.0, 0.0);
    let mut converged = false;
    for n in 1..MAX_SERIES_ITERATIONS {
        term *= -x / n as f64;
        let contribution = term / (a + n as f64);
        sum += contribution;
        if contribution.norm() <= f64::EPSILON * sum.norm().max(f64::MIN_POSITIVE) {
            converged = true;
            break;
        }
    }
    if !converged {
        return Err(EpsteinError::SeriesNotConverged {
            function: "upper incomplete gamma series",
            iterations: MAX_SERIES_ITERATIONS,
        });
    }

    let upper = gamma_part - power_part - x_pow_a * sum;
    Ok(upper / x_pow_a)
}

/// Legendre continued fraction for `x >= max(1, Re a)`, evaluated with the modified Lentz method.
fn upper_continued_fraction(a: Complex64, x: f64) -> Result<Complex64, EpsteinError> {
    let tiny = Complex64::new(LENTZ_TINY, 0.0);
    let mut b = x + 1.0 - a;
    let mut c = Complex64::new(1.0 / LENTZ_TINY, 0.0);
    let mut d = 1.0 / b;
    let mut h = d;
    for i in 1..MAX_SERIES_ITERATIONS {
        let an = -(i as f64) * (i as f64 - a);
        b += 2.0;
        d = an * d + b;
        if d.norm() < LENTZ_TINY {
            d = tiny;
        }
        c = b + an / c;
        if c.norm() < LENTZ_TINY {
            c = tiny;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;
        if (delta - 1.0).norm() <= 4.0 * f64::EPSILON {
            return Ok(h * (-x).exp());
        }
    }
    Err(EpsteinError::SeriesNotConverged {
        function: "upper incomplete gamma continued fraction",
        iterations: MAX_SERIES_ITERATIONS,
    })
}
