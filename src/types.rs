//! This module defines the result and accumulator types of the epstein library.
//!
//! It includes the `Evaluation` struct returned by every public entry point, pairing a value with
//! its error bound and diagnostic term counts, and the `PartialSum` accumulator that the summation
//! engine fills term by term for each of the two lattice sums.

use crate::precision::rounding_bound;
use num_complex::Complex64;

/// The result of an evaluation.
///
/// Besides the value, it reports a bound on the absolute error and how many lattice points each
/// of the two sums needed, which is useful for diagnosing slowly converging inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    /// The computed value.
    pub value: Complex64,
    /// An upper bound on the absolute error of `value`.
    ///
    /// It combines the provable tail bounds of the truncated sums with a rounding budget
    /// proportional to the accumulated magnitude of the terms.
    pub error_estimate: f64,
    /// The number of direct-lattice points summed.
    pub direct_terms: u64,
    /// The number of reciprocal-lattice points summed.
    pub reciprocal_terms: u64,
}

impl Evaluation {
    /// An exact value that needed no summation.
    pub fn exact(value: Complex64) -> Self {
        Self {
            value,
            error_estimate: 0.0,
            direct_terms: 0,
            reciprocal_terms: 0,
        }
    }
}

/// A running complex sum with the bookkeeping needed for its error bound.
///
/// A fresh accumulator is created for each sum of each evaluation and discarded after the sums
/// are combined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartialSum {
    /// The accumulated value.
    pub value: Complex64,
    /// The sum of the magnitudes of all added terms.
    pub magnitude: f64,
    /// The number of lattice points visited.
    pub terms: u64,
    /// The bound on the omitted tail, as of the last completed shell.
    pub tail_bound: f64,
}

impl Default for PartialSum {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialSum {
    /// Creates an empty sum with an unbounded tail.
    pub fn new() -> Self {
        Self {
            value: Complex64::new(0.0, 0.0),
            magnitude: 0.0,
            terms: 0,
            tail_bound: f64::INFINITY,
        }
    }

    /// Adds one term.
    #[inline]
    pub fn add(&mut self, term: Complex64) {
        self.value += term;
        self.magnitude += term.norm();
        self.terms += 1;
    }

    /// Counts a visited point that contributes no term.
    #[inline]
    pub fn skip(&mut self) {
        self.terms += 1;
    }

    /// The total error bound: omitted tail plus rounding.
    ///
    /// `conditioning` multiplies the per-term rounding budget; it is `1` for real orders.
    pub fn error_bound(&self, conditioning: f64) -> f64 {
        self.tail_bound + conditioning * rounding_bound(self.terms, self.magnitude)
    }
}
