use super::cli::{Cli, Command, LatticeArgs, ToleranceOptions, ZetaArgs};
use super::error::CliError;
use super::io::{self, Report};
use epstein::{Complex64, EpsteinZeta, QuadraticForm, Tolerance, kernel};
use tracing::info;

pub fn run(args: Cli) -> Result<(), CliError> {
    let tolerance = build_tolerance(&args.tolerance)?;

    let report = match &args.command {
        Command::Zeta(zeta) => evaluate_zeta(zeta, &tolerance, false)?,
        Command::ZetaReg(zeta) => evaluate_zeta(zeta, &tolerance, true)?,
        Command::Bessel(bessel) => {
            let nu = Complex64::new(bessel.order.nu, bessel.order.nu_imag);
            let evaluation = kernel::incomplete_bessel(nu, &bessel.k, &bessel.r, &tolerance)?;
            Report::Bessel {
                nu,
                k: bessel.k.clone(),
                r: bessel.r.clone(),
                evaluation,
            }
        }
    };

    let writer = io::get_writer(&args.output.output)?;
    io::write_report(writer, &report, &args.output.format, args.output.precision)?;

    Ok(())
}

fn build_tolerance(options: &ToleranceOptions) -> Result<Tolerance, CliError> {
    let mut tolerance = match &options.tolerance_file {
        Some(path) => Tolerance::load_from_file(path)?,
        None => Tolerance::default(),
    };
    if let Some(relative) = options.relative {
        tolerance.relative = relative;
    }
    if let Some(absolute) = options.absolute {
        tolerance.absolute = absolute;
    }
    if let Some(max_radius) = options.max_radius {
        tolerance.max_radius = max_radius;
    }
    tolerance.validate()?;
    Ok(tolerance)
}

fn build_form(lattice: &LatticeArgs) -> Result<QuadraticForm, CliError> {
    match (&lattice.basis, &lattice.gram) {
        (Some(basis), _) => Ok(QuadraticForm::from_basis(&io::parse_matrix(basis)?)?),
        (None, Some(gram)) => Ok(QuadraticForm::from_gram(&io::parse_matrix(gram)?)?),
        (None, None) => Err(CliError::MatrixParse {
            input: String::new(),
            details: "either --basis or --gram is required".to_string(),
        }),
    }
}

fn evaluate_zeta(
    args: &ZetaArgs,
    tolerance: &Tolerance,
    regularized: bool,
) -> Result<Report, CliError> {
    let form = build_form(&args.lattice)?;
    let nu = Complex64::new(args.order.nu, args.order.nu_imag);
    let zeta = EpsteinZeta::new(&form).with_tolerance(*tolerance);
    let evaluation = if regularized {
        zeta.evaluate_regularized(nu, &args.x, &args.y)?
    } else {
        zeta.evaluate(nu, &args.x, &args.y)?
    };
    info!(
        direct_terms = evaluation.direct_terms,
        reciprocal_terms = evaluation.reciprocal_terms,
        "evaluation finished"
    );

    Ok(Report::Zeta {
        regularized,
        nu,
        dim: form.dim(),
        determinant: form.determinant(),
        x: args.x.clone(),
        y: args.y.clone(),
        evaluation,
    })
}
