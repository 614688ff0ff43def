//! This module defines the numerical constants shared by the special-function and quadrature routines.
//!
//! It holds the Lanczos coefficients for the complex Gamma function, the Taylor coefficients of the
//! reciprocal Gamma function used near the poles of the incomplete Gamma function, the Gauss–Kronrod
//! (7, 15) nodes and weights, and the thresholds that decide when an argument is treated as exactly
//! singular or exactly coincident with a lattice point.

/// The Euler–Mascheroni constant γ.
pub const EULER_GAMMA: f64 = 0.577_215_664_901_532_860_606_512_090_082_402_431;

/// Half of the natural logarithm of 2π, the constant term of Stirling-type expansions.
pub const HALF_LN_TWO_PI: f64 = 0.918_938_533_204_672_741_780_329_736_405_617_639;

/// Shift parameter `g` of the Lanczos approximation.
pub const LANCZOS_G: f64 = 7.0;

/// Coefficients of the Lanczos approximation with `g = 7` and nine terms.
///
/// Together with [`LANCZOS_G`] these give the Gamma function to about fifteen significant digits
/// for complex arguments with non-negative real part.
pub const LANCZOS_COEFFS: [f64; 9] = [
    0.999_999_999_999_809_93,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_13,
    -176.615_029_162_140_59,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_571_6e-6,
    1.505_632_735_149_311_6e-7,
];

/// Taylor coefficients `c_k` of `1/Γ(z) = Σ c_k z^k`, starting at `k = 1`.
///
/// Truncated after 29 terms, which is enough for double precision on the unit disc. The
/// series of `1/Γ(1 + a)` is the same list shifted by one power of `a`.
pub const RGAMMA_TAYLOR: [f64; 29] = [
    1.0,
    0.577_215_664_901_532_860_61,
    -0.655_878_071_520_253_881_08,
    -0.042_002_635_034_095_235_529,
    0.166_538_611_382_291_489_5,
    -0.042_197_734_555_544_336_748,
    -0.009_621_971_527_876_973_562_1,
    0.007_218_943_246_663_099_542_4,
    -0.001_165_167_591_859_065_112_1,
    -0.000_215_241_674_114_950_972_82,
    0.000_128_050_282_388_116_186_15,
    -0.000_020_134_854_780_788_238_656,
    -1.250_493_482_142_670_657_3e-6,
    1.133_027_231_981_695_882_4e-6,
    -2.056_338_416_977_607_103_5e-7,
    6.116_095_104_481_415_817_9e-9,
    5.002_007_644_469_222_930_1e-9,
    -1.181_274_570_487_020_144_6e-9,
    1.043_426_711_691_100_510_5e-10,
    7.782_263_439_905_071_254e-12,
    -3.696_805_618_642_205_708_2e-12,
    5.100_370_287_454_475_979e-13,
    -2.058_326_053_566_506_783_2e-14,
    -5.348_122_539_423_017_982_4e-15,
    1.226_778_628_238_260_790_2e-15,
    -1.181_259_301_697_458_769_5e-16,
    1.186_692_254_751_600_332_6e-18,
    1.412_380_655_318_031_781_6e-18,
    -2.298_745_684_435_370_206_6e-19,
];

/// Kronrod nodes of the 15-point rule on `[-1, 1]`, non-negative half, outermost first.
///
/// Odd indices are the nodes of the embedded 7-point Gauss rule.
pub const GK15_NODES: [f64; 8] = [
    0.991_455_371_120_812_639_206_854_697_526_329,
    0.949_107_912_342_758_524_526_189_684_047_851,
    0.864_864_423_359_769_072_789_712_788_640_926,
    0.741_531_185_599_394_439_863_864_773_280_788,
    0.586_087_235_467_691_130_294_144_845_693_013,
    0.405_845_151_377_397_166_906_606_412_076_961,
    0.207_784_955_007_898_467_600_689_403_773_245,
    0.0,
];

/// Kronrod weights matching [`GK15_NODES`].
pub const GK15_KRONROD_WEIGHTS: [f64; 8] = [
    0.022_935_322_010_529_224_963_732_008_058_970,
    0.063_092_092_629_978_553_290_700_663_189_204,
    0.104_790_010_322_250_183_839_876_322_541_518,
    0.140_653_259_715_525_918_745_189_590_510_238,
    0.169_004_726_639_267_902_826_583_426_598_550,
    0.190_350_578_064_785_409_913_256_402_421_014,
    0.204_432_940_075_298_892_414_161_999_234_649,
    0.209_482_141_084_727_828_012_999_174_891_714,
];

/// Weights of the embedded 7-point Gauss rule, for the nodes `GK15_NODES[1]`, `[3]`, `[5]`, `[7]`.
pub const GK15_GAUSS_WEIGHTS: [f64; 4] = [
    0.129_484_966_168_869_693_270_611_432_679_082,
    0.279_705_391_489_276_667_901_467_771_423_780,
    0.381_830_050_505_118_944_950_369_775_488_975,
    0.417_959_183_673_469_387_755_102_040_816_327,
];

/// Relative distance, in units of machine epsilon, within which an order is snapped to a
/// non-positive integer.
///
/// An order `a` is treated as the integer `-k` when `|a + k| <= POLE_SNAP_ULPS * ε * max(1, |a|)`.
pub const POLE_SNAP_ULPS: f64 = 8.0;

/// Relative distance, in units of machine epsilon, within which a lattice point is considered to
/// coincide with the evaluation point.
pub const COINCIDENCE_ULPS: f64 = 64.0;

/// Maximum number of iterations of any inner series or continued fraction.
pub const MAX_SERIES_ITERATIONS: usize = 10_000;

/// Smallest magnitude allowed in the denominators of the modified Lentz algorithm.
///
/// Its square must stay representable, since complex division divides by the squared norm.
pub const LENTZ_TINY: f64 = 1e-150;
