use num_complex::Complex64;
use std::path::PathBuf;
use thiserror::Error;

/// The primary error type for all fallible operations in the `epstein` library.
///
/// Every evaluation entry point returns this error instead of a silently inaccurate
/// number. Failures are local to a single call: nothing is retried and no global
/// state is touched, so the caller decides how to report them.
#[derive(Error, Debug)]
pub enum EpsteinError {
    /// The lattice description is unusable: the matrix is not square, not symmetric
    /// (for Gram input), singular or not positive-definite, or a shift vector does not
    /// match the lattice dimension.
    #[error("Invalid lattice: {0}")]
    InvalidLattice(String),

    /// A scalar or vector argument is not finite, or a tolerance setting is out of range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The adaptive truncation of a lattice sum exhausted its radius or point budget
    /// before the tail bound dropped below the requested tolerance.
    ///
    /// The best available partial result and a bound on its error are returned for
    /// diagnostic purposes.
    #[error(
        "Lattice sum did not converge within radius {radius:.3} ({points} points). Partial value: {value}, error bound: {error_estimate:.2e}"
    )]
    NotConverged {
        /// The partial value accumulated so far (already combined and rescaled).
        value: Complex64,
        /// A bound on the error of `value`; infinite when the tail is unbounded.
        error_estimate: f64,
        /// The normalized radius at which enumeration stopped.
        radius: f64,
        /// The number of lattice points summed before giving up.
        points: u64,
    },

    /// The sums converged, but cancellation in their combination left an error bound far
    /// above the requested accuracy.
    ///
    /// This happens for exponents with a large imaginary part, where the prefactor of the
    /// Ewald split grows like `e^{π|Im ν|/4}` while the value stays of order one.
    #[error(
        "Precision lost in cancellation: value {value} has error bound {error_estimate:.2e}, above the admissible {admissible:.2e}"
    )]
    PrecisionLoss {
        /// The combined and rescaled value.
        value: Complex64,
        /// A bound on the error of `value`.
        error_estimate: f64,
        /// The largest error bound the tolerance settings admit for this value.
        admissible: f64,
    },

    /// An inner series, continued fraction or quadrature of the kernel exceeded its
    /// iteration budget.
    #[error("{function} did not converge after {iterations} iterations")]
    SeriesNotConverged {
        /// The special function or integral that failed.
        function: &'static str,
        /// The number of iterations performed.
        iterations: usize,
    },

    /// The result is not representable as a finite double-precision value.
    #[error("Numeric overflow while evaluating {0}")]
    NumericOverflow(&'static str),

    /// The requested value sits on a genuine pole of the function in `nu`.
    #[error("The function has a pole at nu = {nu}")]
    Pole {
        /// The exponent at which the pole was hit.
        nu: Complex64,
    },

    /// An I/O error that occurred while attempting to read a tolerance file.
    #[error("I/O error at path '{path}': {source}")]
    IoError {
        /// The path of the file that caused the I/O error.
        path: PathBuf,
        /// The underlying `std::io::Error`.
        #[source]
        source: std::io::Error,
    },

    /// A tolerance file contained invalid TOML or unknown fields.
    #[error("Failed to deserialize TOML tolerance settings: {0}")]
    DeserializationError(#[from] toml::de::Error),
}
