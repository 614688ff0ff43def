#![allow(dead_code)]

use epstein::{Complex64, EpsteinZeta, QuadraticForm};

#[derive(Clone, Copy, PartialEq)]
pub enum Function {
    Plain,
    Regularized,
}

pub struct TestCase<'a> {
    pub name: &'a str,
    pub nu: Complex64,
    pub basis: Vec<Vec<f64>>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub expected: Complex64,
}

pub fn real(nu: f64) -> Complex64 {
    Complex64::new(nu, 0.0)
}

pub fn identity(dim: usize) -> Vec<Vec<f64>> {
    (0..dim)
        .map(|i| (0..dim).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect()
}

pub fn hexagonal() -> Vec<Vec<f64>> {
    vec![vec![1.0, 0.5], vec![0.0, 3.0f64.sqrt() / 2.0]]
}

/// Evaluates every case and checks the relative error against the reference, and that the
/// reported error bound covers the actual error.
pub fn run_group_test(group_name: &str, cases: Vec<TestCase>, function: Function, limit: f64) {
    let mut group_max_error: f64 = 0.0;

    println!("\nRunning Group Test: {}", group_name);
    println!("{:-<100}", "");
    println!(
        "{:<28} | {:<30} | {:<30} | {:<8}",
        "Case", "Expected", "Calculated", "Rel. Err"
    );

    for case in cases {
        let form = QuadraticForm::from_basis(&case.basis).expect("Invalid test lattice");
        let zeta = EpsteinZeta::new(&form);
        let evaluation = match function {
            Function::Plain => zeta.evaluate(case.nu, &case.x, &case.y),
            Function::Regularized => zeta.evaluate_regularized(case.nu, &case.x, &case.y),
        }
        .expect("Evaluation failed");

        let error = (evaluation.value - case.expected).norm();
        let relative = error / case.expected.norm();

        println!(
            "{:<28} | {:<30} | {:<30} | {:.1e}",
            case.name,
            case.expected.to_string(),
            evaluation.value.to_string(),
            relative
        );

        assert!(
            error <= evaluation.error_estimate + 1e-14 * case.expected.norm(),
            "{}: actual error {:.2e} exceeds reported bound {:.2e}",
            case.name,
            error,
            evaluation.error_estimate
        );
        group_max_error = group_max_error.max(relative);
    }

    println!("{:-<100}", "");
    println!(
        "  Group Max Rel. Error: {:.2e} (Limit: {:.2e})",
        group_max_error, limit
    );
    println!("{:-<100}\n", "");

    assert!(
        group_max_error <= limit,
        "Group maximum relative error {:.2e} exceeds limit {:.2e}",
        group_max_error,
        limit
    );
}
