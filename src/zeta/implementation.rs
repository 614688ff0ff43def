//! This module implements the `EpsteinZeta` engine for evaluating Epstein zeta functions.
//!
//! An evaluation proceeds through four stages. Initialization validates the inputs, recognizes
//! exponents with a closed form, and rescales the lattice to unit covolume, which fixes the
//! Ewald splitting so that both sums decay like `e^{-πr²}`. The direct sum then walks the shells
//! of the rescaled lattice around `x`, the reciprocal sum walks the shells of its dual around
//! `-y`, and each stops at the first shell whose provable tail bound falls below the tolerance.
//! Finally the two partial sums are combined with the closed-form boundary terms and scaled back.

use crate::continuation::{Exponent, Order, singular_upper_remainder};
use crate::error::EpsteinError;
use crate::lattice::enumeration::{LatticePoint, ShellIter};
use crate::lattice::{Lattice, QuadraticForm};
use crate::math::constants::COINCIDENCE_ULPS;
use crate::math::gamma::rgamma;
use crate::math::incomplete_gamma::{lower_gamma_scaled, upper_gamma_scaled};
use crate::precision::{Tolerance, order_conditioning, rounding_bound};
use crate::types::{Evaluation, PartialSum};
use num_complex::Complex64;
use std::f64::consts::PI;
use tracing::{debug, trace, warn};

/// Which of the two functions an evaluation computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Variant {
    Plain,
    Regularized,
}

/// How a lattice point enters a sum.
enum Visit {
    /// The point is counted but contributes nothing.
    Skip,
    /// The point contributes `phase * g(a, π|w|²)`; coincident points use `w = 0` exactly.
    Term { phase: Complex64, coincident: bool },
}

/// The outcome of one truncated lattice sum.
struct SumOutcome {
    sum: PartialSum,
    radius: f64,
    converged: bool,
}

/// The engine evaluating Epstein zeta functions of one quadratic form.
///
/// It borrows the validated form and owns the tolerance settings; evaluations hold no state
/// between calls and may run concurrently on a shared engine.
#[derive(Debug, Clone)]
pub struct EpsteinZeta<'f> {
    form: &'f QuadraticForm,
    tolerance: Tolerance,
}

impl<'f> EpsteinZeta<'f> {
    /// Creates a new engine with default tolerance settings.
    ///
    /// # Arguments
    ///
    /// * `form` - The lattice whose Epstein zeta function is evaluated.
    ///
    /// # Examples
    ///
    /// ```
    /// use epstein::{EpsteinZeta, QuadraticForm};
    ///
    /// let form = QuadraticForm::from_basis(&[vec![1.0]]).unwrap();
    /// let zeta = EpsteinZeta::new(&form);
    /// ```
    pub fn new(form: &'f QuadraticForm) -> Self {
        Self {
            form,
            tolerance: Tolerance::default(),
        }
    }

    /// Configures the engine with custom tolerance settings.
    ///
    /// # Arguments
    ///
    /// * `tolerance` - The accuracy and work settings applied to every evaluation.
    ///
    /// # Examples
    ///
    /// ```
    /// use epstein::{EpsteinZeta, QuadraticForm, Tolerance};
    ///
    /// let form = QuadraticForm::from_basis(&[vec![1.0]]).unwrap();
    /// let tolerance = Tolerance {
    ///     relative: 1e-10,
    ///     ..Default::default()
    /// };
    /// let zeta = EpsteinZeta::new(&form).with_tolerance(tolerance);
    /// ```
    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// The tolerance settings in use.
    pub fn tolerance(&self) -> &Tolerance {
        &self.tolerance
    }

    /// Evaluates `Z_{Λ,ν}(x, y) = Σ'_{z∈Λ} e^{-2πi y·z} |z - x|^{-ν}`.
    ///
    /// The sum excludes `z = x` and is continued analytically to all complex `ν`. It is
    /// evaluated by the Ewald split into a direct-lattice and a reciprocal-lattice sum, each
    /// truncated adaptively at a provably sufficient radius.
    ///
    /// # Arguments
    ///
    /// * `nu` - The exponent of the distance.
    /// * `x` - The Cartesian shift of the lattice points.
    /// * `y` - The Cartesian wave vector of the phase factor.
    ///
    /// # Returns
    ///
    /// An [`Evaluation`] with the value, an error bound and the number of terms of each sum.
    ///
    /// # Errors
    ///
    /// * `EpsteinError::InvalidLattice` if `x` or `y` does not match the lattice dimension.
    /// * `EpsteinError::InvalidArgument` for non-finite inputs or invalid tolerance settings.
    /// * `EpsteinError::Pole` at `ν = d` when `y` is a reciprocal lattice vector.
    /// * `EpsteinError::NotConverged` if a sum exceeds its radius or point budget.
    /// * `EpsteinError::PrecisionLoss` if cancellation leaves the error bound above
    ///   [`Tolerance::admissible_error`], typically for large `|Im ν|`.
    ///
    /// # Examples
    ///
    /// ```
    /// use epstein::{Complex64, EpsteinZeta, QuadraticForm};
    ///
    /// // Z for the integers with x = y = 0 is 2ζ(ν).
    /// let form = QuadraticForm::from_basis(&[vec![1.0]]).unwrap();
    /// let result = EpsteinZeta::new(&form)
    ///     .evaluate(Complex64::new(2.0, 0.0), &[0.0], &[0.0])
    ///     .unwrap();
    /// let expected = std::f64::consts::PI.powi(2) / 3.0;
    /// assert!((result.value.re - expected).abs() < 1e-13);
    /// ```
    pub fn evaluate(&self, nu: Complex64, x: &[f64], y: &[f64]) -> Result<Evaluation, EpsteinError> {
        self.run(nu, x, y, Variant::Plain)
    }

    /// Evaluates the regularized function `Z^reg_{Λ,ν}(x, y) = e^{2πi x·y} Z_{Λ,ν}(x, y) - ŝ_ν(y)/V`.
    ///
    /// The subtracted term is the singularity of the Fourier transform of `|z|^{-ν}`,
    /// `ŝ_ν(y) = π^{ν-d/2} Γ((d-ν)/2)/Γ(ν/2) |y|^{ν-d}`, replaced at `ν = d + 2k` by
    /// `π^{ν-d/2} (-1)^{k+1}/(k! Γ(ν/2)) |y|^{2k} ln(π|y|²)`. The result is analytic in `y`
    /// around the origin, including `y = 0`.
    ///
    /// # Errors
    ///
    /// The same as [`EpsteinZeta::evaluate`]; the pole at `ν = d` only remains for `y` in the
    /// reciprocal lattice other than the origin.
    pub fn evaluate_regularized(
        &self,
        nu: Complex64,
        x: &[f64],
        y: &[f64],
    ) -> Result<Evaluation, EpsteinError> {
        self.run(nu, x, y, Variant::Regularized)
    }

    fn run(
        &self,
        nu: Complex64,
        x: &[f64],
        y: &[f64],
        variant: Variant,
    ) -> Result<Evaluation, EpsteinError> {
        self.tolerance.validate()?;
        if !(nu.re.is_finite() && nu.im.is_finite()) {
            return Err(EpsteinError::InvalidArgument(format!(
                "exponent nu must be finite, got {nu}"
            )));
        }
        self.form.check_vector("x", x)?;
        self.form.check_vector("y", y)?;

        let dim = self.form.dim();
        let exponent = Exponent::classify(nu, dim);
        match exponent {
            Exponent::NegativeEvenInteger(_) => {
                debug!(%nu, "exponent is a negative even integer, value vanishes");
                return Ok(Evaluation::exact(Complex64::new(0.0, 0.0)));
            }
            Exponent::Zero => {
                let lattice = self.form.lattice();
                let value = match coincident_point(lattice, x) {
                    Some(z) => match variant {
                        Variant::Plain => -Complex64::cis(-2.0 * PI * dot(y, &z)),
                        Variant::Regularized => {
                            -Complex64::cis(2.0 * PI * (dot(x, y) - dot(y, &z)))
                        }
                    },
                    None => Complex64::new(0.0, 0.0),
                };
                debug!(%nu, "exponent is zero, only the coincident point contributes");
                return Ok(Evaluation::exact(value));
            }
            _ => {}
        }

        let (normalized, scale) = self.form.normalized();
        let x_scaled: Vec<f64> = x.iter().map(|v| v / scale).collect();
        let y_scaled: Vec<f64> = y.iter().map(|v| v * scale).collect();

        let prefactor = (nu / 2.0 * PI.ln()).exp() * rgamma(nu / 2.0);
        let rescale = (-nu * scale.ln()).exp();
        let absolute_floor = if self.tolerance.absolute > 0.0 {
            self.tolerance.absolute / (rescale * prefactor).norm()
        } else {
            0.0
        };

        let direct_order = Order::classify(nu / 2.0);
        let reciprocal_order = Order::classify((dim as f64 - nu) / 2.0);

        let mut coincident_phase = None;
        let x_norm = norm(&x_scaled);
        let direct = self.lattice_sum(
            nu,
            normalized.lattice(),
            &x_scaled,
            direct_order,
            absolute_floor,
            |point| {
                let phase = Complex64::cis(-2.0 * PI * dot(&y_scaled, &point.vector));
                if is_coincident(point, x_norm) {
                    coincident_phase = Some(phase);
                    Visit::Skip
                } else {
                    Visit::Term {
                        phase,
                        coincident: false,
                    }
                }
            },
        )?;

        let y_norm = norm(&y_scaled);
        let minus_y: Vec<f64> = y_scaled.iter().map(|v| -v).collect();
        let reciprocal = self.lattice_sum(
            nu,
            normalized.dual_lattice(),
            &minus_y,
            reciprocal_order,
            absolute_floor,
            |point| {
                if variant == Variant::Regularized && point.index.iter().all(|&m| m == 0) {
                    return Visit::Skip;
                }
                Visit::Term {
                    phase: Complex64::cis(-2.0 * PI * dot(&x_scaled, &point.offset)),
                    coincident: is_coincident(point, y_norm),
                }
            },
        )?;

        let coincident_term = match coincident_phase {
            Some(phase) => phase * (nu / 2.0 * PI.ln()).exp() * rgamma(1.0 + nu / 2.0),
            None => Complex64::new(0.0, 0.0),
        };
        let sums = prefactor * (direct.sum.value + reciprocal.sum.value) - coincident_term;

        let (normalized_value, boundary) = match variant {
            Variant::Plain => (sums, Complex64::new(0.0, 0.0)),
            Variant::Regularized => {
                let phase = Complex64::cis(2.0 * PI * dot(&x_scaled, &y_scaled));
                let boundary = regularized_boundary(
                    nu,
                    dim,
                    exponent,
                    reciprocal_order,
                    prefactor,
                    y_norm,
                    scale,
                )?;
                (phase * sums + boundary, boundary)
            }
        };
        let value = rescale * normalized_value;

        let conditioning = order_conditioning(nu);
        let error_estimate = rescale.norm()
            * (prefactor.norm()
                * (direct.sum.error_bound(conditioning) + reciprocal.sum.error_bound(conditioning))
                + conditioning * rounding_bound(1, coincident_term.norm() + boundary.norm()));

        debug!(
            %nu,
            scale,
            direct_radius = direct.radius,
            reciprocal_radius = reciprocal.radius,
            direct_terms = direct.sum.terms,
            reciprocal_terms = reciprocal.sum.terms,
            error_estimate,
            "evaluated Epstein zeta"
        );

        if !(direct.converged && reciprocal.converged) {
            let (radius, points) = if direct.converged {
                (reciprocal.radius, reciprocal.sum.terms)
            } else {
                (direct.radius, direct.sum.terms)
            };
            return Err(EpsteinError::NotConverged {
                value,
                error_estimate,
                radius,
                points,
            });
        }
        if !(value.re.is_finite() && value.im.is_finite()) {
            return Err(EpsteinError::NumericOverflow("Epstein zeta function"));
        }
        let admissible = self.tolerance.admissible_error(value.norm());
        if error_estimate > admissible {
            warn!(%nu, error_estimate, admissible, "cancellation exceeded the accuracy target");
            return Err(EpsteinError::PrecisionLoss {
                value,
                error_estimate,
                admissible,
            });
        }

        Ok(Evaluation {
            value,
            error_estimate,
            direct_terms: direct.sum.terms,
            reciprocal_terms: reciprocal.sum.terms,
        })
    }

    /// Sums `phase * g(a, π|w|²)` over the shells of `lattice` around `center` until the tail
    /// bound is below the tolerance, or the radius or point budget runs out.
    fn lattice_sum<V>(
        &self,
        nu: Complex64,
        lattice: &Lattice,
        center: &[f64],
        order: Order,
        absolute_floor: f64,
        mut visit: V,
    ) -> Result<SumOutcome, EpsteinError>
    where
        V: FnMut(&LatticePoint) -> Visit,
    {
        let tolerance = &self.tolerance;
        let bound = lattice.point_count_bound();
        let sigma = order.value().re;
        let kernel = |argument: f64| {
            upper_gamma_scaled(order, argument).map_err(|error| match error {
                EpsteinError::Pole { .. } => EpsteinError::Pole { nu },
                other => other,
            })
        };

        let mut sum = PartialSum::new();
        let mut cached: Option<(u64, Complex64)> = None;
        let mut radius = 0.0;

        for shell in ShellIter::new(lattice, center, tolerance.shell_width) {
            if shell.outer_radius > tolerance.max_radius || sum.terms > tolerance.max_points {
                return Ok(SumOutcome {
                    sum,
                    radius,
                    converged: false,
                });
            }

            for point in &shell.points {
                match visit(point) {
                    Visit::Skip => sum.skip(),
                    Visit::Term {
                        phase,
                        coincident: true,
                    } => sum.add(phase * kernel(0.0)?),
                    Visit::Term {
                        phase,
                        coincident: false,
                    } => {
                        let key = point.norm_sq.to_bits();
                        let weight = match cached {
                            Some((bits, value)) if bits == key => value,
                            _ => {
                                let value = kernel(PI * point.norm_sq)?;
                                cached = Some((key, value));
                                value
                            }
                        };
                        sum.add(phase * weight);
                    }
                }
            }

            radius = shell.outer_radius;
            sum.tail_bound = bound.tail(sigma, radius, tolerance.shell_width);
            trace!(
                shell = shell.index,
                radius,
                points = shell.points.len(),
                tail = sum.tail_bound,
                magnitude = sum.magnitude,
                "lattice shell summed"
            );

            let target =
                tolerance.safety_margin * tolerance.relative * sum.magnitude + absolute_floor;
            if sum.tail_bound <= target {
                return Ok(SumOutcome {
                    sum,
                    radius,
                    converged: true,
                });
            }
        }

        Ok(SumOutcome {
            sum,
            radius,
            converged: false,
        })
    }
}

/// The origin term of the reciprocal sum after removing the singularity `ŝ_ν(y)`,
/// in units of the normalized lattice.
fn regularized_boundary(
    nu: Complex64,
    dim: usize,
    exponent: Exponent,
    reciprocal_order: Order,
    prefactor: Complex64,
    y_norm: f64,
    scale: f64,
) -> Result<Complex64, EpsteinError> {
    let argument = PI * y_norm * y_norm;
    match exponent {
        Exponent::ReciprocalSingular(k) => {
            let remainder = singular_upper_remainder(k, argument)?;
            let k_factorial: f64 = (1..=k).map(|i| i as f64).product();
            let sign = if k % 2 == 0 { -1.0 } else { 1.0 };
            let log_coefficient = (nu - dim as f64 / 2.0) * PI.ln();
            let coefficient = log_coefficient.exp() * rgamma(nu / 2.0) * sign / k_factorial;
            let log_scaling =
                2.0 * coefficient * scale.ln() * y_norm.powi(2 * k as i32);
            Ok(prefactor * remainder + log_scaling)
        }
        _ => {
            let lower = lower_gamma_scaled(reciprocal_order, argument).map_err(|error| {
                match error {
                    EpsteinError::Pole { .. } => EpsteinError::Pole { nu },
                    other => other,
                }
            })?;
            Ok(-prefactor * lower)
        }
    }
}

/// Returns the lattice point equal to `x` within rounding, if any.
fn coincident_point(lattice: &Lattice, x: &[f64]) -> Option<Vec<f64>> {
    let nearest: Vec<f64> = lattice
        .to_lattice_coordinates(x)
        .iter()
        .map(|c| c.round())
        .collect();
    let z = lattice.to_cartesian(&nearest);
    let distance = z
        .iter()
        .zip(x)
        .map(|(a, b)| (a - b).powi(2))
        .sum::<f64>()
        .sqrt();
    if distance <= COINCIDENCE_ULPS * f64::EPSILON * norm(x).max(1.0) {
        Some(z)
    } else {
        None
    }
}

#[inline]
fn is_coincident(point: &LatticePoint, center_norm: f64) -> bool {
    point.norm_sq.sqrt() <= COINCIDENCE_ULPS * f64::EPSILON * center_norm.max(1.0)
}

#[inline]
fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(u, v)| u * v).sum()
}

#[inline]
fn norm(v: &[f64]) -> f64 {
    dot(v, v).sqrt()
}
