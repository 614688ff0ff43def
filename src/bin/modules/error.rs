use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    /// Errors originating from the core epstein library evaluations.
    #[error("Evaluation error: {0}")]
    Evaluation(#[from] epstein::EpsteinError),

    /// I/O errors associated with a specific file path.
    #[error("I/O error for '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// General I/O errors not tied to a specific file.
    #[error("I/O error: {0}")]
    GenericIo(#[from] std::io::Error),

    /// Errors parsing a matrix given on the command line.
    #[error("Failed to parse matrix '{input}': {details}")]
    MatrixParse { input: String, details: String },
}
