//! This module contains the summation engine for Epstein zeta functions.
//!
//! It provides `EpsteinZeta`, which evaluates both the Epstein zeta function and its regularized
//! variant for a fixed quadratic form under explicit `Tolerance` settings.

mod implementation;

pub use implementation::EpsteinZeta;
