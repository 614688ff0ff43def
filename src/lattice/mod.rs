//! This module represents lattices and their quadratic forms.
//!
//! A lattice `Λ = A Z^d` is described by a basis matrix `A` whose columns are the basis vectors,
//! or equivalently by its Gram matrix `G = AᵀA`, the quadratic form `Q(m) = mᵀGm`. The
//! `QuadraticForm` type validates the input once, precomputes the Cholesky factor used for
//! enumeration, the determinant, and the dual lattice `Λ* = A^{-T} Z^d`, and is immutable
//! afterwards. The `enumeration` submodule walks lattice points shell by shell.

pub mod enumeration;

use crate::error::EpsteinError;
use crate::precision::PointCountBound;
use faer::{Mat, Side, prelude::*};

/// Precomputed geometry of one lattice: its basis, inverse basis and Gram factor.
#[derive(Debug, Clone)]
pub struct Lattice {
    basis: Mat<f64>,
    inverse: Mat<f64>,
    cholesky: Mat<f64>,
    covolume: f64,
    cell_diameter: f64,
}

impl Lattice {
    fn from_parts(basis: Mat<f64>, inverse: Mat<f64>) -> Result<Self, EpsteinError> {
        let dim = basis.nrows();
        let gram = basis.transpose() * basis.as_ref();
        let cholesky = cholesky_lower(&gram)?;
        let covolume = (0..dim).map(|i| cholesky[(i, i)]).product();
        let cell_diameter = (0..dim)
            .map(|j| (0..dim).map(|i| basis[(i, j)].powi(2)).sum::<f64>().sqrt())
            .sum();
        Ok(Self {
            basis,
            inverse,
            cholesky,
            covolume,
            cell_diameter,
        })
    }

    /// The dimension of the lattice.
    pub fn dim(&self) -> usize {
        self.basis.nrows()
    }

    /// The basis matrix, one basis vector per column.
    pub fn basis(&self) -> &Mat<f64> {
        &self.basis
    }

    /// The lower Cholesky factor `L` of the Gram matrix, `G = L Lᵀ`.
    pub fn cholesky(&self) -> &Mat<f64> {
        &self.cholesky
    }

    /// The volume of a fundamental cell, `|det A|`.
    pub fn covolume(&self) -> f64 {
        self.covolume
    }

    /// Returns the point counting geometry used by the tail bounds.
    pub fn point_count_bound(&self) -> PointCountBound {
        PointCountBound {
            dim: self.dim(),
            covolume: self.covolume,
            cell_diameter: self.cell_diameter,
        }
    }

    /// Maps a Cartesian vector to lattice coordinates, `A^{-1} v`.
    pub fn to_lattice_coordinates(&self, v: &[f64]) -> Vec<f64> {
        apply(&self.inverse, v)
    }

    /// Maps lattice coordinates to a Cartesian vector, `A m`.
    pub fn to_cartesian(&self, m: &[f64]) -> Vec<f64> {
        apply(&self.basis, m)
    }

    fn scaled(&self, factor: f64) -> Self {
        let dim = self.dim();
        Self {
            basis: Mat::from_fn(dim, dim, |i, j| self.basis[(i, j)] * factor),
            inverse: Mat::from_fn(dim, dim, |i, j| self.inverse[(i, j)] / factor),
            cholesky: Mat::from_fn(dim, dim, |i, j| self.cholesky[(i, j)] * factor),
            covolume: self.covolume * factor.powi(dim as i32),
            cell_diameter: self.cell_diameter * factor,
        }
    }
}

/// A validated positive-definite quadratic form together with its dual.
///
/// Construct it with [`QuadraticForm::from_basis`] when the Cartesian geometry matters (shifts
/// `x`, `y` are Cartesian vectors), or with [`QuadraticForm::from_gram`] when only the form is
/// known; in the latter case the upper Cholesky factor serves as the basis.
#[derive(Debug, Clone)]
pub struct QuadraticForm {
    direct: Lattice,
    dual: Lattice,
}

impl QuadraticForm {
    /// Creates a quadratic form from a lattice basis.
    ///
    /// # Arguments
    ///
    /// * `rows` - The basis matrix in row-major order; column `j` is the `j`-th basis vector.
    ///
    /// # Returns
    ///
    /// The validated quadratic form `Q(m) = |A m|²` and its dual.
    ///
    /// # Errors
    ///
    /// Returns `EpsteinError::InvalidLattice` if the matrix is empty, not square, contains
    /// non-finite entries, or is singular.
    ///
    /// # Examples
    ///
    /// ```
    /// use epstein::QuadraticForm;
    ///
    /// let hexagonal = QuadraticForm::from_basis(&[
    ///     vec![1.0, 0.5],
    ///     vec![0.0, 3f64.sqrt() / 2.0],
    /// ])
    /// .unwrap();
    /// assert!((hexagonal.determinant() - 3f64.sqrt() / 2.0).abs() < 1e-15);
    /// ```
    pub fn from_basis(rows: &[Vec<f64>]) -> Result<Self, EpsteinError> {
        let dim = check_square(rows)?;
        let basis = Mat::from_fn(dim, dim, |i, j| rows[i][j]);
        Self::from_basis_matrix(basis)
    }

    /// Creates a quadratic form from its symmetric positive-definite Gram matrix.
    ///
    /// # Errors
    ///
    /// Returns `EpsteinError::InvalidLattice` if the matrix is not square, not symmetric,
    /// contains non-finite entries, or is not positive-definite.
    ///
    /// # Examples
    ///
    /// ```
    /// use epstein::QuadraticForm;
    ///
    /// let form = QuadraticForm::from_gram(&[vec![2.0, 1.0], vec![1.0, 2.0]]).unwrap();
    /// assert!((form.determinant() - 3f64.sqrt()).abs() < 1e-14);
    ///
    /// let indefinite = QuadraticForm::from_gram(&[vec![1.0, 2.0], vec![2.0, 1.0]]);
    /// assert!(indefinite.is_err());
    /// ```
    pub fn from_gram(rows: &[Vec<f64>]) -> Result<Self, EpsteinError> {
        let dim = check_square(rows)?;
        for i in 0..dim {
            for j in 0..i {
                let (a, b) = (rows[i][j], rows[j][i]);
                if (a - b).abs() > 8.0 * f64::EPSILON * a.abs().max(b.abs()) {
                    return Err(EpsteinError::InvalidLattice(format!(
                        "Gram matrix is not symmetric: entry ({i}, {j}) = {a} but ({j}, {i}) = {b}"
                    )));
                }
            }
        }
        let gram = Mat::from_fn(dim, dim, |i, j| rows[i][j]);
        let lower = cholesky_lower(&gram)?;
        let basis = Mat::from_fn(dim, dim, |i, j| lower[(j, i)]);
        Self::from_basis_matrix(basis)
    }

    fn from_basis_matrix(basis: Mat<f64>) -> Result<Self, EpsteinError> {
        let dim = basis.nrows();
        let gram = basis.transpose() * basis.as_ref();
        cholesky_lower(&gram)?;

        let identity = Mat::<f64>::identity(dim, dim);
        let inverse = basis.partial_piv_lu().solve(&identity);
        if (0..dim).any(|i| (0..dim).any(|j| !inverse[(i, j)].is_finite())) {
            return Err(EpsteinError::InvalidLattice(
                "basis matrix is singular".to_string(),
            ));
        }

        let dual_basis = inverse.transpose().to_owned();
        let dual_inverse = basis.transpose().to_owned();
        Ok(Self {
            direct: Lattice::from_parts(basis, inverse)?,
            dual: Lattice::from_parts(dual_basis, dual_inverse)?,
        })
    }

    /// The dimension `d`.
    pub fn dim(&self) -> usize {
        self.direct.dim()
    }

    /// The covolume `|det A|`, which is `sqrt(det G)`.
    pub fn determinant(&self) -> f64 {
        self.direct.covolume
    }

    /// The Gram matrix `G = AᵀA` in row-major order.
    pub fn gram(&self) -> Vec<Vec<f64>> {
        let l = &self.direct.cholesky;
        let dim = self.dim();
        (0..dim)
            .map(|i| {
                (0..dim)
                    .map(|j| (0..dim).map(|k| l[(i, k)] * l[(j, k)]).sum())
                    .collect()
            })
            .collect()
    }

    /// The direct lattice.
    pub fn lattice(&self) -> &Lattice {
        &self.direct
    }

    /// The dual lattice `A^{-T} Z^d`.
    pub fn dual_lattice(&self) -> &Lattice {
        &self.dual
    }

    /// The dual quadratic form `G^{-1}`, whose lattice is the reciprocal lattice.
    pub fn dual(&self) -> QuadraticForm {
        QuadraticForm {
            direct: self.dual.clone(),
            dual: self.direct.clone(),
        }
    }

    /// The form rescaled to unit covolume, together with the scale `λ = V^{1/d}` removed.
    pub fn normalized(&self) -> (QuadraticForm, f64) {
        let scale = self.determinant().powf(1.0 / self.dim() as f64);
        let normalized = QuadraticForm {
            direct: self.direct.scaled(1.0 / scale),
            dual: self.dual.scaled(scale),
        };
        (normalized, scale)
    }

    /// Converts a shift `ξ` of the quadratic form argument, `Q(m + ξ)`, to the Cartesian `x = -Aξ`.
    ///
    /// # Errors
    ///
    /// Returns `EpsteinError::InvalidLattice` on a dimension mismatch.
    pub fn cartesian_offset(&self, xi: &[f64]) -> Result<Vec<f64>, EpsteinError> {
        self.check_vector("xi", xi)?;
        Ok(self.direct.to_cartesian(xi).into_iter().map(|v| -v).collect())
    }

    /// Converts a phase `e^{2πi m·η}` to the Cartesian `y = -A^{-T}η` of `e^{-2πi y·z}`.
    ///
    /// # Errors
    ///
    /// Returns `EpsteinError::InvalidLattice` on a dimension mismatch.
    pub fn cartesian_phase(&self, eta: &[f64]) -> Result<Vec<f64>, EpsteinError> {
        self.check_vector("eta", eta)?;
        Ok(self.dual.to_cartesian(eta).into_iter().map(|v| -v).collect())
    }

    /// Verifies that a vector has the lattice dimension and finite entries.
    pub(crate) fn check_vector(&self, name: &str, v: &[f64]) -> Result<(), EpsteinError> {
        if v.len() != self.dim() {
            return Err(EpsteinError::InvalidLattice(format!(
                "vector `{name}` has length {} but the lattice has dimension {}",
                v.len(),
                self.dim()
            )));
        }
        if v.iter().any(|c| !c.is_finite()) {
            return Err(EpsteinError::InvalidArgument(format!(
                "vector `{name}` has non-finite entries: {v:?}"
            )));
        }
        Ok(())
    }
}

fn check_square(rows: &[Vec<f64>]) -> Result<usize, EpsteinError> {
    let dim = rows.len();
    if dim == 0 {
        return Err(EpsteinError::InvalidLattice(
            "matrix has no rows".to_string(),
        ));
    }
    if let Some((i, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != dim) {
        return Err(EpsteinError::InvalidLattice(format!(
            "matrix is not square: row {i} has {} entries, expected {dim}",
            row.len()
        )));
    }
    if rows.iter().flatten().any(|v| !v.is_finite()) {
        return Err(EpsteinError::InvalidLattice(
            "matrix has non-finite entries".to_string(),
        ));
    }
    Ok(dim)
}

/// Lower Cholesky factor of a symmetric matrix, rejecting non-positive and negligible pivots.
fn cholesky_lower(gram: &Mat<f64>) -> Result<Mat<f64>, EpsteinError> {
    let dim = gram.nrows();
    let llt = gram.llt(Side::Lower).map_err(|_| {
        EpsteinError::InvalidLattice("matrix is not positive-definite".to_string())
    })?;
    let lower = llt.L().to_owned();

    // Each pivot is measured against its own column norm.
    for i in 0..dim {
        let pivot = lower[(i, i)];
        if !(pivot * pivot > 64.0 * f64::EPSILON * gram[(i, i)]) {
            return Err(EpsteinError::InvalidLattice(format!(
                "matrix is singular or not positive-definite (pivot {i} is {pivot:e})"
            )));
        }
    }
    Ok(lower)
}

fn apply(matrix: &Mat<f64>, v: &[f64]) -> Vec<f64> {
    let dim = matrix.nrows();
    (0..dim)
        .map(|i| (0..dim).map(|j| matrix[(i, j)] * v[j]).sum())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn hexagonal() -> QuadraticForm {
        QuadraticForm::from_basis(&[vec![1.0, 0.5], vec![0.0, 3f64.sqrt() / 2.0]]).unwrap()
    }

    #[test]
    fn from_basis_computes_gram_and_determinant() {
        let form = hexagonal();
        let gram = form.gram();
        assert_relative_eq!(gram[0][0], 1.0, epsilon = 1e-15);
        assert_relative_eq!(gram[0][1], 0.5, epsilon = 1e-15);
        assert_relative_eq!(gram[1][0], 0.5, epsilon = 1e-15);
        assert_relative_eq!(gram[1][1], 1.0, epsilon = 1e-15);
        assert_relative_eq!(form.determinant(), 3f64.sqrt() / 2.0, epsilon = 1e-15);
    }

    #[test]
    fn dual_lattice_pairs_to_integers() {
        let form = QuadraticForm::from_basis(&[
            vec![1.0, 0.3, -0.2],
            vec![0.1, 1.4, 0.5],
            vec![0.0, 0.2, 0.9],
        ])
        .unwrap();
        let direct = form.lattice();
        let dual = form.dual_lattice();
        for i in 0..3 {
            for j in 0..3 {
                let dot: f64 = (0..3)
                    .map(|k| direct.basis()[(k, i)] * dual.basis()[(k, j)])
                    .sum();
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(dot, expected, epsilon = 1e-14);
            }
        }
        assert_relative_eq!(
            dual.covolume() * direct.covolume(),
            1.0,
            epsilon = 1e-14
        );
    }

    #[test]
    fn from_gram_reproduces_the_form() {
        let rows = vec![vec![2.0, 0.3], vec![0.3, 1.5]];
        let form = QuadraticForm::from_gram(&rows).unwrap();
        let gram = form.gram();
        for i in 0..2 {
            for j in 0..2 {
                assert_relative_eq!(gram[i][j], rows[i][j], epsilon = 1e-14);
            }
        }
    }

    #[test]
    fn normalized_form_has_unit_covolume() {
        let form = QuadraticForm::from_basis(&[vec![2.0, 0.0], vec![0.0, 8.0]]).unwrap();
        let (normalized, scale) = form.normalized();
        assert_relative_eq!(scale, 4.0, epsilon = 1e-14);
        assert_relative_eq!(normalized.determinant(), 1.0, epsilon = 1e-14);
        assert_relative_eq!(normalized.dual_lattice().covolume(), 1.0, epsilon = 1e-14);
    }

    #[test]
    fn invalid_matrices_are_rejected() {
        let cases: Vec<Vec<Vec<f64>>> = vec![
            vec![],
            vec![vec![0.0, 0.0], vec![0.0, 0.0]],
            vec![vec![1.0, 2.0], vec![2.0, 4.0]],
            vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0]],
            vec![vec![1.0, f64::NAN], vec![0.0, 1.0]],
        ];
        for rows in &cases {
            assert!(
                matches!(
                    QuadraticForm::from_basis(rows),
                    Err(EpsteinError::InvalidLattice(_))
                ),
                "{rows:?} should be rejected"
            );
        }
        for rows in [
            vec![vec![1.0, 2.0], vec![2.0, 1.0]],
            vec![vec![1.0, 0.2], vec![0.3, 1.0]],
            vec![vec![-1.0, 0.0], vec![0.0, 1.0]],
        ] {
            assert!(matches!(
                QuadraticForm::from_gram(&rows),
                Err(EpsteinError::InvalidLattice(_))
            ));
        }
    }

    #[test]
    fn lattice_coordinate_helpers_follow_sign_conventions() {
        let form = hexagonal();
        let x = form.cartesian_offset(&[0.5, 0.0]).unwrap();
        assert_relative_eq!(x[0], -0.5, epsilon = 1e-15);
        assert_relative_eq!(x[1], 0.0, epsilon = 1e-15);

        let y = form.cartesian_phase(&[0.25, 0.25]).unwrap();
        let direct = form.lattice().basis();
        // e^{-2πi y·(A m)} must equal e^{2πi m·η}.
        for j in 0..2 {
            let dot: f64 = (0..2).map(|k| y[k] * direct[(k, j)]).sum();
            assert_relative_eq!(dot, -0.25, epsilon = 1e-15);
        }
        assert!(matches!(
            form.cartesian_offset(&[1.0]),
            Err(EpsteinError::InvalidLattice(_))
        ));
    }

    #[test]
    fn dual_form_inverts_the_gram_matrix() {
        let form = QuadraticForm::from_gram(&[vec![2.0, 0.3], vec![0.3, 1.5]]).unwrap();
        let dual = form.dual();
        assert_relative_eq!(dual.determinant() * form.determinant(), 1.0, epsilon = 1e-14);

        let gram = form.gram();
        let inverse = dual.gram();
        for i in 0..2 {
            for j in 0..2 {
                let product: f64 = (0..2).map(|k| gram[i][k] * inverse[k][j]).sum();
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(product, expected, epsilon = 1e-14);
            }
        }

        let twice = dual.dual().gram();
        for i in 0..2 {
            for j in 0..2 {
                assert_relative_eq!(twice[i][j], gram[i][j], epsilon = 1e-14);
            }
        }
    }

    #[test]
    fn widely_scaled_axes_are_not_singular() {
        let stretched = QuadraticForm::from_basis(&[vec![1e4, 0.0], vec![0.0, 1e-4]]).unwrap();
        assert_relative_eq!(stretched.determinant(), 1.0, max_relative = 1e-14);
        let dual_gram = stretched.dual().gram();
        assert_relative_eq!(dual_gram[0][0], 1e-8, max_relative = 1e-14);
        assert_relative_eq!(dual_gram[1][1], 1e8, max_relative = 1e-14);

        let thin = QuadraticForm::from_gram(&[vec![1.0, 0.0], vec![0.0, 1e-16]]).unwrap();
        assert_relative_eq!(thin.determinant(), 1e-8, max_relative = 1e-14);

        assert!(matches!(
            QuadraticForm::from_basis(&[vec![1e4, 2e4], vec![1e-4, 2e-4]]),
            Err(EpsteinError::InvalidLattice(_))
        ));
    }
}
