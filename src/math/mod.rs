//! This module provides the special functions and numerical building blocks of the epstein library.
//!
//! It contains the complex Gamma function and its reciprocal, the scaled incomplete Gamma
//! functions that weight every lattice term, and an adaptive Gauss–Kronrod integrator used by the
//! incomplete Bessel kernel. All functions accept complex orders and report failures through
//! `EpsteinError` instead of returning non-finite values.

/// Numerical constants shared by the special functions.
///
/// This module holds the Lanczos and Taylor coefficients of the Gamma function, the Gauss–Kronrod
/// nodes and weights, and the thresholds that decide when a parameter is treated as an integer.
pub mod constants;

/// The complex Gamma function, its logarithm and its reciprocal.
pub mod gamma;

/// Scaled upper and lower incomplete Gamma functions of complex order.
///
/// Both are analytically continued in the order, so the negative and half-integer orders that
/// arise from the Ewald split are handled without special casing by the caller.
pub mod incomplete_gamma;

/// Adaptive Gauss–Kronrod quadrature of complex-valued integrands.
pub mod quadrature;
