//! This module defines the accuracy and resource settings of an evaluation.
//!
//! It provides the `Tolerance` struct, which is passed explicitly to every evaluation and controls
//! when the adaptive truncation of the lattice sums stops, how much work it may spend before
//! reporting non-convergence, and how finely the incomplete Bessel quadrature is refined. Settings
//! can be built in code or loaded from a TOML document.

use crate::error::EpsteinError;
use serde::Deserialize;
use std::path::Path;

/// Accuracy targets and work limits for one evaluation.
///
/// All radii are measured in units of the lattice normalized to unit covolume, so the same
/// settings behave identically for a lattice and any rescaled copy of it.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Tolerance {
    /// The requested relative accuracy ε.
    ///
    /// A lattice sum stops once its provable tail bound is below `safety_margin * ε` times the
    /// accumulated magnitude of its terms. The incomplete Bessel quadrature is refined until its
    /// error estimate is below `ε` times the integral.
    pub relative: f64,
    /// An absolute accuracy floor, in the units of the returned value.
    ///
    /// Useful when the result is expected to be close to zero through cancellation.
    pub absolute: f64,
    /// The fraction of the tolerance that may be spent on the truncated tail.
    ///
    /// The remainder is reserved for rounding in the summation and in the kernel.
    pub safety_margin: f64,
    /// The width of one enumeration shell.
    pub shell_width: f64,
    /// The largest enumeration radius before the sum is declared non-convergent.
    pub max_radius: f64,
    /// The largest number of lattice points per sum before it is declared non-convergent.
    pub max_points: u64,
    /// The largest number of subintervals of the incomplete Bessel quadrature.
    pub max_subintervals: usize,
    /// How far the final error bound may exceed the accuracy target before an evaluation fails.
    ///
    /// Truncation is driven by `relative` and `absolute`, but rounding in the combination of the
    /// two sums is amplified by cancellation. An evaluation whose error bound exceeds
    /// `loss_allowance * (relative * |value| + absolute)` fails with
    /// `EpsteinError::PrecisionLoss` instead of returning an inaccurate value.
    pub loss_allowance: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            relative: 1.0e-14,
            absolute: 0.0,
            safety_margin: 0.01,
            shell_width: 0.5,
            max_radius: 32.0,
            max_points: 50_000_000,
            max_subintervals: 2_000,
            loss_allowance: 1_000.0,
        }
    }
}

impl Tolerance {
    /// Creates the default settings with a different relative accuracy.
    ///
    /// # Examples
    ///
    /// ```
    /// use epstein::Tolerance;
    ///
    /// let tolerance = Tolerance::with_relative(1e-10);
    /// assert_eq!(tolerance.relative, 1e-10);
    /// assert_eq!(tolerance.shell_width, Tolerance::default().shell_width);
    /// ```
    pub fn with_relative(relative: f64) -> Self {
        Self {
            relative,
            ..Self::default()
        }
    }

    /// Checks that every setting is finite and inside its admissible range.
    ///
    /// # Errors
    ///
    /// Returns an `EpsteinError::InvalidArgument` naming the first offending field.
    pub fn validate(&self) -> Result<(), EpsteinError> {
        let invalid = |field: &str, value: String| {
            Err(EpsteinError::InvalidArgument(format!(
                "tolerance field `{field}` is out of range: {value}"
            )))
        };

        if !(self.relative.is_finite() && self.relative > 0.0 && self.relative < 1.0) {
            return invalid("relative", self.relative.to_string());
        }
        if !(self.absolute.is_finite() && self.absolute >= 0.0) {
            return invalid("absolute", self.absolute.to_string());
        }
        if !(self.safety_margin.is_finite() && self.safety_margin > 0.0 && self.safety_margin <= 1.0)
        {
            return invalid("safety_margin", self.safety_margin.to_string());
        }
        if !(self.shell_width.is_finite() && self.shell_width > 0.0) {
            return invalid("shell_width", self.shell_width.to_string());
        }
        if !(self.max_radius.is_finite() && self.max_radius > 0.0) {
            return invalid("max_radius", self.max_radius.to_string());
        }
        if self.max_points == 0 {
            return invalid("max_points", self.max_points.to_string());
        }
        if self.max_subintervals == 0 {
            return invalid("max_subintervals", self.max_subintervals.to_string());
        }
        if !(self.loss_allowance.is_finite() && self.loss_allowance >= 1.0) {
            return invalid("loss_allowance", self.loss_allowance.to_string());
        }
        Ok(())
    }

    /// The largest error bound an evaluation with magnitude `magnitude` may return.
    pub fn admissible_error(&self, magnitude: f64) -> f64 {
        self.loss_allowance * (self.relative * magnitude + self.absolute)
    }

    /// Loads tolerance settings from a TOML file.
    ///
    /// Missing fields take their default values; unknown fields are rejected.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the TOML file.
    ///
    /// # Returns
    ///
    /// The validated settings.
    ///
    /// # Errors
    ///
    /// Returns `EpsteinError::IoError` if the file cannot be read,
    /// `EpsteinError::DeserializationError` if its content is not a valid settings table, and
    /// `EpsteinError::InvalidArgument` if a value is out of range.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use epstein::Tolerance;
    /// use std::path::Path;
    ///
    /// let tolerance = Tolerance::load_from_file(Path::new("tolerance.toml")).unwrap();
    /// ```
    pub fn load_from_file(path: &Path) -> Result<Self, EpsteinError> {
        let content = std::fs::read_to_string(path).map_err(|io_error| EpsteinError::IoError {
            path: path.to_path_buf(),
            source: io_error,
        })?;

        Self::load_from_str(&content)
    }

    /// Parses tolerance settings from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `EpsteinError::DeserializationError` for malformed TOML or unknown fields and
    /// `EpsteinError::InvalidArgument` for out-of-range values.
    ///
    /// # Examples
    ///
    /// ```
    /// use epstein::Tolerance;
    ///
    /// let toml_data = r#"
    /// relative = 1e-12
    /// max_radius = 16.0
    /// "#;
    ///
    /// let tolerance = Tolerance::load_from_str(toml_data).unwrap();
    /// assert_eq!(tolerance.relative, 1e-12);
    /// assert_eq!(tolerance.max_radius, 16.0);
    /// assert_eq!(tolerance.safety_margin, 0.01);
    /// ```
    pub fn load_from_str(toml_str: &str) -> Result<Self, EpsteinError> {
        let tolerance: Self = toml::from_str(toml_str)?;
        tolerance.validate()?;
        Ok(tolerance)
    }
}
