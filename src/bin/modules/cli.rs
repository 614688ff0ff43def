use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

const ABOUT: &str = "A command-line tool for evaluating Epstein zeta functions, their regularization and the incomplete Bessel function.";
const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser)]
#[command(version, about = ABOUT, help_template = HELP_TEMPLATE)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub output: OutputOptions,

    #[command(flatten)]
    pub tolerance: ToleranceOptions,

    /// Increase logging verbosity (-v for debug, -vv for every lattice shell).
    ///
    /// Log events are written to standard error; `RUST_LOG` refines the filter further.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Command {
    /// Evaluate the Epstein zeta function Z(ν; x, y).
    Zeta(ZetaArgs),
    /// Evaluate the regularized Epstein zeta function.
    ZetaReg(ZetaArgs),
    /// Evaluate the incomplete Bessel function G_ν(k, r).
    Bessel(BesselArgs),
}

/// Arguments shared by both Epstein zeta subcommands.
#[derive(Args)]
pub struct ZetaArgs {
    #[command(flatten)]
    pub order: OrderArgs,

    #[command(flatten)]
    pub lattice: LatticeArgs,

    /// The Cartesian shift x, as comma-separated components.
    #[arg(short, long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
    pub x: Vec<f64>,

    /// The Cartesian wave vector y, as comma-separated components.
    #[arg(short, long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
    pub y: Vec<f64>,
}

/// The lattice, given either by a basis or by a Gram matrix.
#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct LatticeArgs {
    /// The basis matrix, rows separated by ';' and entries by ','.
    ///
    /// The columns of the matrix are the basis vectors, e.g. "1,0.5;0,0.866" for the
    /// hexagonal lattice.
    #[arg(short, long, value_name = "MATRIX", allow_hyphen_values = true)]
    pub basis: Option<String>,

    /// The Gram matrix of the quadratic form, in the same notation as --basis.
    #[arg(short, long, value_name = "MATRIX", allow_hyphen_values = true)]
    pub gram: Option<String>,
}

/// The complex order ν.
#[derive(Args)]
pub struct OrderArgs {
    /// Real part of the order ν.
    #[arg(short, long, allow_hyphen_values = true)]
    pub nu: f64,

    /// Imaginary part of the order ν.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub nu_imag: f64,
}

#[derive(Args)]
pub struct BesselArgs {
    #[command(flatten)]
    pub order: OrderArgs,

    /// The first argument k, as comma-separated components.
    #[arg(short, long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
    pub k: Vec<f64>,

    /// The second argument r, as comma-separated components.
    #[arg(short, long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
    pub r: Vec<f64>,
}

/// Options for controlling the output format and destination.
#[derive(Args)]
#[command(next_help_heading = "Output Options")]
pub struct OutputOptions {
    /// Output file path.
    ///
    /// If not specified, results are written to standard output.
    #[arg(short, long, value_name = "FILE", global = true)]
    pub output: Option<PathBuf>,

    /// Output format for the results.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty, global = true)]
    pub format: OutputFormat,

    /// Number of significant digits to display for floating-point values.
    #[arg(short, long, default_value_t = 16, global = true)]
    pub precision: usize,
}

/// Options for controlling accuracy and work limits.
#[derive(Args)]
#[command(next_help_heading = "Tolerance Options")]
pub struct ToleranceOptions {
    /// Tolerance settings file in TOML format.
    ///
    /// If not specified, built-in defaults are used. The flags below override the file.
    #[arg(short = 'T', long, value_name = "FILE", global = true)]
    pub tolerance_file: Option<PathBuf>,

    /// Requested relative accuracy.
    #[arg(long, global = true)]
    pub relative: Option<f64>,

    /// Absolute accuracy floor.
    #[arg(long, global = true)]
    pub absolute: Option<f64>,

    /// Largest enumeration radius, in units of the lattice scaled to unit covolume.
    #[arg(long, global = true)]
    pub max_radius: Option<f64>,
}

/// Output format for the evaluation results.
#[derive(Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed table with the inputs, the value and the error bound.
    Pretty,
    /// Comma-separated values; for bessel the columns are k, r, re, im, error.
    Csv,
    /// JSON object containing the inputs and the result.
    Json,
}
