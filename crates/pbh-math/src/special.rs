//! Special functions used by the background and spectrum models.

use std::f64::consts::PI;

/// ln(1 + eˣ) without overflow.
#[inline]
pub fn softplus(x: f64) -> f64 {
    if x > 0.0 {
        x + (-x).exp().ln_1p()
    } else {
        x.exp().ln_1p()
    }
}

/// 1 / (1 + e⁻ˣ) without overflow.
#[inline]
pub fn logistic(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Fraction of black-body energy carried by photons with `E/T > x`:
/// `1 − (15/π⁴) ∫₀ˣ u³/(eᵘ − 1) du`.
///
/// Small `x` uses the Bernoulli expansion of the integrand, larger `x` the
/// exponentially convergent tail sum.
pub fn planck_energy_fraction_above(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if x <= 0.0 {
        return 1.0;
    }
    let norm = 15.0 / PI.powi(4);
    if x < 1.0 {
        let x2 = x * x;
        let x3 = x2 * x;
        let x4 = x2 * x2;
        let series = x3 / 3.0 - x3 * x / 8.0 + x3 * x2 / 60.0 - x3 * x4 / 5040.0
            + x3 * x4 * x2 / 272_160.0
            - x3 * x4 * x4 / 13_305_600.0
            + x3 * x4 * x4 * x2 / 622_702_080.0;
        return 1.0 - norm * series;
    }

    let mut sum = 0.0;
    for k in 1..=400 {
        let kf = k as f64;
        let decay = (-kf * x).exp();
        let term =
            decay * (x * x * x / kf + 3.0 * x * x / (kf * kf) + 6.0 * x / kf.powi(3) + 6.0 / kf.powi(4));
        sum += term;
        if term <= 1e-17 * sum {
            break;
        }
    }
    (norm * sum).clamp(0.0, 1.0)
}
