use super::constants::{GK15_GAUSS_WEIGHTS, GK15_KRONROD_WEIGHTS, GK15_NODES};
use crate::error::EpsteinError;
use num_complex::Complex64;

/// The outcome of an adaptive quadrature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadratureResult {
    /// The integral estimate.
    pub value: Complex64,
    /// The summed Kronrod-minus-Gauss error estimate.
    pub error_estimate: f64,
    /// The number of subintervals in the final partition.
    pub subintervals: usize,
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    lower: f64,
    upper: f64,
    value: Complex64,
    error: f64,
}

#[inline]
fn gauss_kronrod_15<F>(f: &F, lower: f64, upper: f64) -> Segment
where
    F: Fn(f64) -> Complex64,
{
    let center = 0.5 * (lower + upper);
    let half = 0.5 * (upper - lower);

    let f_center = f(center);
    let mut kronrod = f_center * GK15_KRONROD_WEIGHTS[7];
    let mut gauss = f_center * GK15_GAUSS_WEIGHTS[3];

    for (j, &node) in GK15_NODES[..7].iter().enumerate() {
        let offset = half * node;
        let pair = f(center - offset) + f(center + offset);
        kronrod += pair * GK15_KRONROD_WEIGHTS[j];
        if j % 2 == 1 {
            gauss += pair * GK15_GAUSS_WEIGHTS[j / 2];
        }
    }

    Segment {
        lower,
        upper,
        value: kronrod * half,
        error: ((kronrod - gauss) * half).norm(),
    }
}

/// Integrates a smooth complex-valued function over a finite interval.
///
/// The interval is bisected adaptively, always splitting the subinterval with the largest
/// error estimate, until the total estimate drops below `relative * |I|` or the absolute floor.
///
/// # Arguments
///
/// * `f` - The integrand.
/// * `lower`, `upper` - The integration limits.
/// * `relative` - The requested relative accuracy; values below `50 ε` are raised to it.
/// * `absolute` - An absolute accuracy floor.
/// * `max_subintervals` - The maximum number of subintervals before giving up.
///
/// # Errors
///
/// Returns [`EpsteinError::SeriesNotConverged`] if the partition reaches `max_subintervals`
/// without meeting the accuracy target.
pub fn integrate_adaptive<F>(
    f: F,
    lower: f64,
    upper: f64,
    relative: f64,
    absolute: f64,
    max_subintervals: usize,
) -> Result<QuadratureResult, EpsteinError>
where
    F: Fn(f64) -> Complex64,
{
    let relative = relative.max(50.0 * f64::EPSILON);
    let mut segments = vec![gauss_kronrod_15(&f, lower, upper)];

    loop {
        let value: Complex64 = segments.iter().map(|s| s.value).sum();
        let error: f64 = segments.iter().map(|s| s.error).sum();
        if error <= (relative * value.norm()).max(absolute) {
            return Ok(QuadratureResult {
                value,
                error_estimate: error,
                subintervals: segments.len(),
            });
        }
        if segments.len() >= max_subintervals {
            return Err(EpsteinError::SeriesNotConverged {
                function: "incomplete Bessel quadrature",
                iterations: segments.len(),
            });
        }

        let worst = segments
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.error.total_cmp(&b.error))
            .map(|(i, _)| i)
            .unwrap_or(0);
        let segment = segments.swap_remove(worst);
        let middle = 0.5 * (segment.lower + segment.upper);
        if middle <= segment.lower || middle >= segment.upper {
            return Err(EpsteinError::SeriesNotConverged {
                function: "incomplete Bessel quadrature",
                iterations: segments.len() + 1,
            });
        }
        segments.push(gauss_kronrod_15(&f, segment.lower, middle));
        segments.push(gauss_kronrod_15(&f, middle, segment.upper));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn integrates_polynomials_exactly_in_one_step() {
        let result = integrate_adaptive(
            |t| Complex64::new(t.powi(6) - 3.0 * t, 0.0),
            -1.0,
            2.0,
            1e-14,
            0.0,
            10,
        )
        .unwrap();
        let expected = (2.0f64.powi(7) + 1.0) / 7.0 - 1.5 * (4.0 - 1.0);
        assert_relative_eq!(result.value.re, expected, max_relative = 1e-14);
        assert_eq!(result.subintervals, 1);
    }

    #[test]
    fn integrates_oscillatory_complex_function() {
        let result = integrate_adaptive(
            |t| Complex64::new(0.0, 20.0 * t).exp(),
            0.0,
            PI,
            1e-13,
            1e-13,
            500,
        )
        .unwrap();
        assert_relative_eq!(result.value.re, 0.0, epsilon = 1e-13);
        assert_relative_eq!(result.value.im, 0.0, epsilon = 1e-13);

        let result = integrate_adaptive(
            |t| Complex64::new(-t * t, 0.0).exp(),
            0.0,
            10.0,
            1e-14,
            0.0,
            500,
        )
        .unwrap();
        assert_relative_eq!(result.value.re, 0.5 * PI.sqrt(), max_relative = 1e-14);
    }

    #[test]
    fn reports_failure_when_budget_is_too_small() {
        let result = integrate_adaptive(|t| Complex64::new(t.sqrt(), 0.0), 0.0, 1.0, 1e-15, 0.0, 3);
        assert!(matches!(
            result,
            Err(EpsteinError::SeriesNotConverged { .. })
        ));
    }
}
