//! Lazy shell-by-shell enumeration of lattice points around a center.
//!
//! Shell `j` holds the points `m` whose Cartesian offset `w = A m - c` satisfies
//! `j h < |w| <= (j + 1) h` (the first shell also holds `|w| = 0`). Each shell is produced on
//! demand by a Fincke–Pohst search over the Cholesky factor of the Gram matrix, so memory stays
//! proportional to one shell, and the iterator can be restarted or resumed at any shell.
//! Within a shell, points are ordered by `|w|²` with ties broken lexicographically on `m`,
//! which makes every sum over the enumeration bit-reproducible.

use super::Lattice;
use std::cmp::Ordering;

/// Relative slack added to the search radius so that rounding never loses a boundary point.
const SEARCH_SLACK: f64 = 1e-10;

/// One enumerated lattice point.
#[derive(Debug, Clone, PartialEq)]
pub struct LatticePoint {
    /// The integer coordinates `m`.
    pub index: Vec<i64>,
    /// The lattice vector `A m`.
    pub vector: Vec<f64>,
    /// The offset `A m - c` from the center.
    pub offset: Vec<f64>,
    /// The squared length of `offset`.
    pub norm_sq: f64,
}

/// The points of one shell, in deterministic order.
#[derive(Debug, Clone, PartialEq)]
pub struct Shell {
    /// The shell number `j`.
    pub index: usize,
    /// The inner radius `j h`.
    pub inner_radius: f64,
    /// The outer radius `(j + 1) h`.
    pub outer_radius: f64,
    /// The points of the shell.
    pub points: Vec<LatticePoint>,
}

/// A restartable iterator over the shells of a lattice around a fixed center.
#[derive(Debug, Clone)]
pub struct ShellIter<'a> {
    lattice: &'a Lattice,
    center: Vec<f64>,
    center_coordinates: Vec<f64>,
    shell_width: f64,
    next_shell: usize,
}

impl<'a> ShellIter<'a> {
    /// Creates an iterator over the shells of `lattice` around the Cartesian point `center`.
    pub fn new(lattice: &'a Lattice, center: &[f64], shell_width: f64) -> Self {
        Self {
            lattice,
            center: center.to_vec(),
            center_coordinates: lattice.to_lattice_coordinates(center),
            shell_width,
            next_shell: 0,
        }
    }

    /// Rewinds the iterator to the first shell.
    pub fn restart(&mut self) {
        self.next_shell = 0;
    }

    /// Positions the iterator so that the next shell produced is `index`.
    pub fn seek(&mut self, index: usize) {
        self.next_shell = index;
    }

    /// Computes shell `index` without moving the iterator.
    pub fn shell(&self, index: usize) -> Shell {
        let inner_radius = index as f64 * self.shell_width;
        let outer_radius = (index + 1) as f64 * self.shell_width;
        let inner_sq = inner_radius * inner_radius;
        let outer_sq = outer_radius * outer_radius;

        let mut points = Vec::new();
        let dim = self.lattice.dim();
        let mut index_buffer = vec![0i64; dim];
        let hole = if index == 0 {
            0.0
        } else {
            inner_sq * (1.0 - SEARCH_SLACK)
        };
        self.search(
            dim,
            0.0,
            (hole, outer_sq * (1.0 + SEARCH_SLACK)),
            &mut index_buffer,
            &mut |m| {
                let m_real: Vec<f64> = m.iter().map(|&v| v as f64).collect();
                let vector = self.lattice.to_cartesian(&m_real);
                let offset: Vec<f64> = vector
                    .iter()
                    .zip(&self.center)
                    .map(|(v, c)| v - c)
                    .collect();
                let norm_sq: f64 = offset.iter().map(|v| v * v).sum();
                let inside = norm_sq <= outer_sq && (norm_sq > inner_sq || index == 0);
                if inside {
                    points.push(LatticePoint {
                        index: m.to_vec(),
                        vector,
                        offset,
                        norm_sq,
                    });
                }
            },
        );

        points.sort_by(compare_points);
        Shell {
            index,
            inner_radius,
            outer_radius,
            points,
        }
    }

    /// Fincke–Pohst search over the coordinates `level - 1, ..., 0`.
    ///
    /// `partial` is the part of the squared length already fixed by the coordinates above
    /// `level`. Only points with squared length in `[hole, bound]` are visited; the hole is
    /// cut out at the last coordinate, where it is a single interval.
    fn search<F>(
        &self,
        level: usize,
        partial: f64,
        (hole, bound): (f64, f64),
        m: &mut [i64],
        visit: &mut F,
    ) where
        F: FnMut(&[i64]),
    {
        if level == 0 {
            visit(m);
            return;
        }
        let i = level - 1;
        let l = self.lattice.cholesky();
        let dim = self.lattice.dim();
        let pivot = l[(i, i)];

        let mut shift = 0.0;
        for j in (i + 1)..dim {
            shift += l[(j, i)] * (m[j] as f64 - self.center_coordinates[j]);
        }
        let target = self.center_coordinates[i] - shift / pivot;
        let remaining = bound - partial;
        if remaining < 0.0 {
            return;
        }
        let half_width = remaining.sqrt() / pivot;
        let lowest = (target - half_width).ceil() as i64;
        let highest = (target + half_width).floor() as i64;

        let (hole_low, hole_high) = if i == 0 && hole > partial {
            let hole_width = (hole - partial).sqrt() / pivot;
            (
                (target - hole_width).ceil() as i64,
                (target + hole_width).floor() as i64,
            )
        } else {
            (highest + 1, highest)
        };
        let below = lowest..=highest.min(hole_low - 1);
        let above = lowest.max(hole_high + 1)..=highest;

        for value in below.chain(above) {
            m[i] = value;
            let component = pivot * (value as f64 - target);
            let next = partial + component * component;
            if next <= bound {
                self.search(i, next, (hole, bound), m, visit);
            }
        }
        m[i] = 0;
    }
}

impl Iterator for ShellIter<'_> {
    type Item = Shell;

    fn next(&mut self) -> Option<Shell> {
        let shell = self.shell(self.next_shell);
        self.next_shell += 1;
        Some(shell)
    }
}

fn compare_points(a: &LatticePoint, b: &LatticePoint) -> Ordering {
    a.norm_sq
        .total_cmp(&b.norm_sq)
        .then_with(|| a.index.cmp(&b.index))
}
