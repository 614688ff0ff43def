use std::f64::consts::PI;

/// Upper bound of `|Γ(a, πr²) (πr²)^{-a}|` in terms of `σ = Re a`.
///
/// Valid, and decreasing in `r`, once `πr² > max(σ - 1, 0)`; returns infinity before that.
#[inline]
pub fn kernel_majorant(sigma: f64, r: f64) -> f64 {
    let x = PI * r * r;
    let excess = x - (sigma - 1.0).max(0.0);
    if excess <= 0.0 {
        f64::INFINITY
    } else {
        (-x).exp() / excess
    }
}

/// Volume of the unit ball in `dim` dimensions.
#[inline]
pub fn unit_ball_volume(dim: usize) -> f64 {
    let half = dim as f64 / 2.0;
    PI.powf(half) / libm::tgamma(half + 1.0)
}

/// Geometry of a lattice needed to count its points in a ball.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointCountBound {
    /// The dimension.
    pub dim: usize,
    /// The covolume of the lattice.
    pub covolume: f64,
    /// The sum of the basis vector lengths, bounding the diameter of a fundamental cell.
    pub cell_diameter: f64,
}

impl PointCountBound {
    /// An upper bound on the number of lattice points in any ball of the given radius.
    #[inline]
    pub fn points_within(&self, radius: f64) -> f64 {
        unit_ball_volume(self.dim) * (radius + self.cell_diameter).powi(self.dim as i32)
            / self.covolume
    }

    /// Bounds the sum of `|g(a, π|w|²)|` over all lattice points with `|w| > radius`.
    ///
    /// The exterior is split into shells of width `shell_width`; each shell contributes at most
    /// its point count times the majorant at its inner radius. Returns infinity when the
    /// majorant is not yet valid at `radius`.
    pub fn tail(&self, sigma: f64, radius: f64, shell_width: f64) -> f64 {
        let mut total = 0.0;
        for i in 0..100_000 {
            let inner = radius + i as f64 * shell_width;
            let majorant = kernel_majorant(sigma, inner);
            if !majorant.is_finite() {
                return f64::INFINITY;
            }
            let term = self.points_within(inner + shell_width) * majorant;
            total += term;
            if term <= f64::EPSILON * total || term == 0.0 {
                break;
            }
        }
        total
    }
}
