mod common;

use common::{Function, TestCase, identity, real, run_group_test};
use epstein::{Complex64, EpsteinError, EpsteinZeta, QuadraticForm};

#[test]
fn regularized_reference_values() {
    let case = |name, nu: f64, basis: f64, x: f64, y: f64, expected: Complex64| TestCase {
        name,
        nu: real(nu),
        basis: vec![vec![basis]],
        x: vec![x],
        y: vec![y],
        expected,
    };

    let cases = vec![
        case(
            "nu = 2.1",
            2.1,
            1.0,
            0.3,
            0.2,
            Complex64::new(16.439_655_190_106_878_908, 3.330_316_788_134_319_125_1),
        ),
        case(
            "nu = 0.7",
            0.7,
            1.0,
            0.25,
            0.4,
            Complex64::new(-2.852_786_057_289_880_728_9, 0.681_897_190_365_289_297_46),
        ),
        case(
            "nu = d, logarithmic",
            1.0,
            1.0,
            0.3,
            0.2,
            Complex64::new(1.002_304_137_553_930_417_4, 0.512_160_876_176_364_444_99),
        ),
        case(
            "nu = d + 2, logarithmic",
            3.0,
            1.0,
            0.3,
            0.2,
            Complex64::new(37.670_736_796_750_705_307, 11.693_573_967_831_633_89),
        ),
        case(
            "nu = d + 2, scaled lattice",
            3.0,
            2.0,
            0.6,
            0.1,
            Complex64::new(4.845_663_868_870_979_997_5, 1.461_696_745_978_954_084_1),
        ),
    ];

    run_group_test("Regularized Sums", cases, Function::Regularized, 1e-12);
}

#[test]
fn regularization_is_invisible_at_the_origin_below_the_dimension() {
    let form = QuadraticForm::from_basis(&identity(2)).unwrap();
    let zeta = EpsteinZeta::new(&form);
    let x = [0.13, -0.27];
    for nu in [0.5, 1.3, -0.7] {
        let plain = zeta.evaluate(real(nu), &x, &[0.0, 0.0]).unwrap();
        let regularized = zeta
            .evaluate_regularized(real(nu), &x, &[0.0, 0.0])
            .unwrap();
        let difference = (plain.value - regularized.value).norm();
        assert!(
            difference <= 1e-13 * plain.value.norm().max(1.0),
            "nu = {nu}: {} vs {}",
            plain.value,
            regularized.value
        );
    }
}

#[test]
fn regularized_function_is_finite_where_the_plain_one_has_a_pole() {
    let form = QuadraticForm::from_basis(&identity(2)).unwrap();
    let zeta = EpsteinZeta::new(&form);
    let x = [0.13, -0.27];

    assert!(matches!(
        zeta.evaluate(real(2.0), &x, &[0.0, 0.0]),
        Err(EpsteinError::Pole { .. })
    ));
    let regularized = zeta.evaluate_regularized(real(2.0), &x, &[0.0, 0.0]).unwrap();
    assert!(regularized.value.re.is_finite() && regularized.value.im.is_finite());

    // The pole at nonzero reciprocal lattice vectors is not removed.
    assert!(matches!(
        zeta.evaluate_regularized(real(2.0), &x, &[1.0, 0.0]),
        Err(EpsteinError::Pole { .. })
    ));
}

#[test]
fn regularized_function_is_continuous_in_y_at_the_origin() {
    let form = QuadraticForm::from_basis(&identity(2)).unwrap();
    let zeta = EpsteinZeta::new(&form);
    let x = [0.13, -0.27];
    for nu in [2.0, 2.6, 4.0] {
        let at_origin = zeta
            .evaluate_regularized(real(nu), &x, &[0.0, 0.0])
            .unwrap()
            .value;
        let nearby = zeta
            .evaluate_regularized(real(nu), &x, &[1e-7, -1e-7])
            .unwrap()
            .value;
        assert!(
            (at_origin - nearby).norm() <= 1e-5 * at_origin.norm().max(1.0),
            "nu = {nu}: {at_origin} vs {nearby}"
        );
    }
}
