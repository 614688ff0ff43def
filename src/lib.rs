pub mod continuation;
pub mod error;
pub mod kernel;
pub mod lattice;
pub mod math;
pub mod precision;
pub mod types;
pub mod zeta;

pub use continuation::{Exponent, Order};
pub use error::EpsteinError;
pub use lattice::QuadraticForm;
pub use num_complex::Complex64;
pub use precision::Tolerance;
pub use types::{Evaluation, PartialSum};
pub use zeta::EpsteinZeta;

/// Evaluates the incomplete Bessel function `G_ν(k, r)` with default tolerance settings.
///
/// # Arguments
///
/// * `nu` - The order, real or complex.
/// * `k` - The first vector argument.
/// * `r` - The second vector argument, of the same length as `k`.
///
/// # Errors
///
/// See [`kernel::incomplete_bessel`].
///
/// # Examples
///
/// ```
/// // G_ν(0, 0) = -2/ν for every ν outside 2N_0.
/// let value = epstein::incomplete_bessel_g(-3.0, &[0.0], &[0.0]).unwrap();
/// assert!((value.re - 2.0 / 3.0).abs() < 1e-15);
/// ```
pub fn incomplete_bessel_g(
    nu: impl Into<Complex64>,
    k: &[f64],
    r: &[f64],
) -> Result<Complex64, EpsteinError> {
    incomplete_bessel_g_with(nu, k, r, &Tolerance::default()).map(|evaluation| evaluation.value)
}

/// Evaluates `G_ν(k, r)` under explicit tolerance settings, returning the error estimate.
pub fn incomplete_bessel_g_with(
    nu: impl Into<Complex64>,
    k: &[f64],
    r: &[f64],
    tolerance: &Tolerance,
) -> Result<Evaluation, EpsteinError> {
    kernel::incomplete_bessel(nu.into(), k, r, tolerance)
}

/// Evaluates the Epstein zeta function `Z_{Λ,ν}(x, y)` with default tolerance settings.
///
/// # Arguments
///
/// * `nu` - The exponent, real or complex.
/// * `basis` - The lattice basis as a square row-major matrix whose columns are the basis vectors.
/// * `x` - The Cartesian shift.
/// * `y` - The Cartesian wave vector.
///
/// # Errors
///
/// Returns `EpsteinError::InvalidLattice` for an unusable basis, and otherwise the errors of
/// [`EpsteinZeta::evaluate`].
///
/// # Examples
///
/// ```
/// // The Madelung constant of rock salt.
/// let identity = vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0], vec![0.0, 0.0, 1.0]];
/// let value = epstein::epstein_zeta(1.0, &identity, &[0.0; 3], &[0.5; 3]).unwrap();
/// assert!((value.re + 1.747_564_594_633_182).abs() < 1e-13);
/// ```
pub fn epstein_zeta(
    nu: impl Into<Complex64>,
    basis: &[Vec<f64>],
    x: &[f64],
    y: &[f64],
) -> Result<Complex64, EpsteinError> {
    let form = QuadraticForm::from_basis(basis)?;
    EpsteinZeta::new(&form)
        .evaluate(nu.into(), x, y)
        .map(|evaluation| evaluation.value)
}

/// Evaluates the regularized Epstein zeta function `Z^reg_{Λ,ν}(x, y)` with default tolerance
/// settings.
///
/// The arguments and errors are those of [`epstein_zeta`]; see
/// [`EpsteinZeta::evaluate_regularized`] for the definition.
pub fn epstein_zeta_reg(
    nu: impl Into<Complex64>,
    basis: &[Vec<f64>],
    x: &[f64],
    y: &[f64],
) -> Result<Complex64, EpsteinError> {
    let form = QuadraticForm::from_basis(basis)?;
    EpsteinZeta::new(&form)
        .evaluate_regularized(nu.into(), x, y)
        .map(|evaluation| evaluation.value)
}
