use super::cli::OutputFormat;
use super::error::CliError;
use epstein::{Complex64, Evaluation};
use prettytable::*;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

/// One evaluation together with the inputs that produced it.
pub enum Report {
    Zeta {
        regularized: bool,
        nu: Complex64,
        dim: usize,
        determinant: f64,
        x: Vec<f64>,
        y: Vec<f64>,
        evaluation: Evaluation,
    },
    Bessel {
        nu: Complex64,
        k: Vec<f64>,
        r: Vec<f64>,
        evaluation: Evaluation,
    },
}

impl Report {
    fn evaluation(&self) -> &Evaluation {
        match self {
            Report::Zeta { evaluation, .. } | Report::Bessel { evaluation, .. } => evaluation,
        }
    }

    fn function_name(&self) -> &'static str {
        match self {
            Report::Zeta {
                regularized: false, ..
            } => "Epstein zeta",
            Report::Zeta {
                regularized: true, ..
            } => "Regularized Epstein zeta",
            Report::Bessel { .. } => "Incomplete Bessel G",
        }
    }
}

/// Parses a matrix written as rows separated by ';' and entries separated by ','.
pub fn parse_matrix(input: &str) -> Result<Vec<Vec<f64>>, CliError> {
    input
        .split(';')
        .map(|row| {
            row.split(',')
                .map(|entry| {
                    entry.trim().parse::<f64>().map_err(|_| CliError::MatrixParse {
                        input: input.to_string(),
                        details: format!("invalid entry '{}'", entry.trim()),
                    })
                })
                .collect()
        })
        .collect()
}

pub fn get_writer(output_path: &Option<PathBuf>) -> Result<Box<dyn Write>, CliError> {
    match output_path {
        Some(path) => {
            let file = std::fs::File::create(path).map_err(|e| CliError::Io {
                path: path.clone(),
                source: e,
            })?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout())),
    }
}

pub fn write_report(
    mut writer: Box<dyn Write>,
    report: &Report,
    format: &OutputFormat,
    precision: usize,
) -> Result<(), CliError> {
    let digits = precision.max(1) - 1;
    match format {
        OutputFormat::Pretty => write_pretty_table(&mut writer, report, digits)?,
        OutputFormat::Csv => write_csv(&mut writer, report, digits)?,
        OutputFormat::Json => write_json(&mut writer, report, digits)?,
    }
    writer.flush()?;
    Ok(())
}

fn format_real(value: f64, digits: usize) -> String {
    format!("{:.*e}", digits, value)
}

fn format_complex(value: Complex64, digits: usize) -> String {
    let sign = if value.im.is_sign_negative() { '-' } else { '+' };
    format!(
        "{} {} {}i",
        format_real(value.re, digits),
        sign,
        format_real(value.im.abs(), digits)
    )
}

fn join_reals(values: &[f64], digits: usize, separator: &str) -> String {
    values
        .iter()
        .map(|v| format_real(*v, digits))
        .collect::<Vec<_>>()
        .join(separator)
}

fn format_vector(values: &[f64]) -> String {
    let entries: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    format!("({})", entries.join(", "))
}

fn write_pretty_table(
    writer: &mut dyn Write,
    report: &Report,
    digits: usize,
) -> Result<(), CliError> {
    let box_format = format::FormatBuilder::new()
        .column_separator('│')
        .borders('│')
        .separators(
            &[format::LinePosition::Top],
            format::LineSeparator::new('─', '┬', '╭', '╮'),
        )
        .separators(
            &[format::LinePosition::Title],
            format::LineSeparator::new('═', '╪', '╞', '╡'),
        )
        .separators(
            &[format::LinePosition::Intern],
            format::LineSeparator::new('─', '┼', '├', '┤'),
        )
        .separators(
            &[format::LinePosition::Bottom],
            format::LineSeparator::new('─', '┴', '╰', '╯'),
        )
        .padding(1, 1)
        .build();

    let no_intern_format = format::FormatBuilder::new()
        .column_separator('│')
        .borders('│')
        .separators(
            &[format::LinePosition::Top],
            format::LineSeparator::new('─', '┬', '╭', '╮'),
        )
        .separators(
            &[format::LinePosition::Bottom],
            format::LineSeparator::new('─', '┴', '╰', '╯'),
        )
        .padding(1, 1)
        .build();

    let mut title_table = Table::new();
    title_table.set_format(box_format);
    title_table.add_row(row![bc->format!("{} Evaluation", report.function_name())]);
    title_table.print(writer)?;
    writeln!(writer)?;

    let mut input_table = Table::new();
    input_table.set_format(no_intern_format);
    match report {
        Report::Zeta {
            nu,
            dim,
            determinant,
            x,
            y,
            ..
        } => {
            input_table.add_row(row![b->"Order ν:", nu.to_string()]);
            input_table.add_row(row![b->"Dimension:", dim]);
            input_table.add_row(row![b->"Gram Determinant:", format_real(*determinant, digits)]);
            input_table.add_row(row![b->"Shift x:", format_vector(x)]);
            input_table.add_row(row![b->"Wave Vector y:", format_vector(y)]);
        }
        Report::Bessel { nu, k, r, .. } => {
            input_table.add_row(row![b->"Order ν:", nu.to_string()]);
            input_table.add_row(row![b->"Argument k:", format_vector(k)]);
            input_table.add_row(row![b->"Argument r:", format_vector(r)]);
        }
    }
    input_table.print(writer)?;
    writeln!(writer)?;

    let evaluation = report.evaluation();
    let mut data_table = Table::new();
    data_table.set_format(box_format);
    data_table.set_titles(row![bc->"Quantity", bc->"Value"]);
    data_table.add_row(row![l->"Value", r->format_complex(evaluation.value, digits)]);
    data_table.add_row(row![l->"Error Bound", r->format_real(evaluation.error_estimate, 2)]);
    if let Report::Zeta { .. } = report {
        data_table.add_row(row![l->"Direct Terms", r->evaluation.direct_terms]);
        data_table.add_row(row![l->"Reciprocal Terms", r->evaluation.reciprocal_terms]);
    }
    data_table.print(writer)?;

    Ok(())
}

fn write_csv(writer: &mut dyn Write, report: &Report, digits: usize) -> Result<(), CliError> {
    let evaluation = report.evaluation();
    match report {
        Report::Bessel { k, r, .. } => {
            writeln!(writer, "k,r,re,im,error")?;
            writeln!(
                writer,
                "{},{},{},{},{}",
                join_reals(k, digits, " "),
                join_reals(r, digits, " "),
                format_real(evaluation.value.re, digits),
                format_real(evaluation.value.im, digits),
                format_real(evaluation.error_estimate, digits)
            )?;
        }
        Report::Zeta { nu, x, y, .. } => {
            writeln!(
                writer,
                "nu_re,nu_im,x,y,re,im,error,direct_terms,reciprocal_terms"
            )?;
            writeln!(
                writer,
                "{},{},{},{},{},{},{},{},{}",
                nu.re,
                nu.im,
                join_reals(x, digits, " "),
                join_reals(y, digits, " "),
                format_real(evaluation.value.re, digits),
                format_real(evaluation.value.im, digits),
                format_real(evaluation.error_estimate, digits),
                evaluation.direct_terms,
                evaluation.reciprocal_terms
            )?;
        }
    }
    Ok(())
}

fn write_json(writer: &mut dyn Write, report: &Report, digits: usize) -> Result<(), CliError> {
    let evaluation = report.evaluation();
    writeln!(writer, "{{")?;
    writeln!(writer, "  \"function\": \"{}\",", report.function_name())?;
    match report {
        Report::Zeta {
            nu,
            dim,
            determinant,
            x,
            y,
            ..
        } => {
            writeln!(writer, "  \"nu\": [{}, {}],", nu.re, nu.im)?;
            writeln!(writer, "  \"dimension\": {},", dim)?;
            writeln!(
                writer,
                "  \"determinant\": {},",
                format_real(*determinant, digits)
            )?;
            writeln!(writer, "  \"x\": [{}],", join_reals(x, digits, ", "))?;
            writeln!(writer, "  \"y\": [{}],", join_reals(y, digits, ", "))?;
        }
        Report::Bessel { nu, k, r, .. } => {
            writeln!(writer, "  \"nu\": [{}, {}],", nu.re, nu.im)?;
            writeln!(writer, "  \"k\": [{}],", join_reals(k, digits, ", "))?;
            writeln!(writer, "  \"r\": [{}],", join_reals(r, digits, ", "))?;
        }
    }
    writeln!(writer, "  \"result\": {{")?;
    writeln!(
        writer,
        "    \"value\": [{}, {}],",
        format_real(evaluation.value.re, digits),
        format_real(evaluation.value.im, digits)
    )?;
    writeln!(
        writer,
        "    \"error_estimate\": {},",
        format_real(evaluation.error_estimate, digits)
    )?;
    writeln!(writer, "    \"direct_terms\": {},", evaluation.direct_terms)?;
    writeln!(writer, "    \"reciprocal_terms\": {}", evaluation.reciprocal_terms)?;
    writeln!(writer, "  }}")?;
    writeln!(writer, "}}")?;
    Ok(())
}
