// ─────────────────────────────────────────────────────────────────────
// SCPN Beta-PBH — Adaptive Quadrature
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Globally adaptive Gauss–Kronrod (7, 15) quadrature.
//!
//! The interval with the largest error estimate is bisected until the summed
//! estimate meets `max(abs_tolerance, rel_tolerance · |I|)` or the
//! subdivision cap is reached.

use pbh_types::error::{PbhError, PbhResult};

// ───────────────────────────── configuration ─────────────────────────

/// Configuration for an adaptive quadrature.
#[derive(Debug, Clone, Copy)]
pub struct QuadConfig {
    /// Relative tolerance on the integral (default: 1e-8).
    pub rel_tolerance: f64,
    /// Absolute tolerance on the integral (default: 0).
    pub abs_tolerance: f64,
    /// Maximum number of bisections (default: 200).
    pub max_subdivisions: usize,
}

impl Default for QuadConfig {
    fn default() -> Self {
        QuadConfig {
            rel_tolerance: 1e-8,
            abs_tolerance: 0.0,
            max_subdivisions: 200,
        }
    }
}

/// Result of an adaptive quadrature.
#[derive(Debug, Clone, Copy)]
pub struct QuadResult {
    pub value: f64,
    pub error_estimate: f64,
    pub subdivisions: usize,
}

// ───────────────────────────── rule ──────────────────────────────────

/// Kronrod abscissae; odd indices are the embedded Gauss nodes.
const XGK: [f64; 8] = [
    0.991_455_371_120_812_6,
    0.949_107_912_342_758_5,
    0.864_864_423_359_769_1,
    0.741_531_185_599_394_4,
    0.586_087_235_467_691_1,
    0.405_845_151_377_397_2,
    0.207_784_955_007_898_5,
    0.0,
];

const WGK: [f64; 8] = [
    0.022_935_322_010_529_22,
    0.063_092_092_629_978_55,
    0.104_790_010_322_250_18,
    0.140_653_259_715_525_92,
    0.169_004_726_639_267_9,
    0.190_350_578_064_785_4,
    0.204_432_940_075_298_9,
    0.209_482_141_084_727_83,
];

const WG: [f64; 4] = [
    0.129_484_966_168_869_7,
    0.279_705_391_489_276_7,
    0.381_830_050_505_118_9,
    0.417_959_183_673_469_4,
];

#[derive(Debug, Clone, Copy)]
struct Segment {
    a: f64,
    b: f64,
    value: f64,
    error: f64,
}

fn gauss_kronrod_15<F>(f: &mut F, a: f64, b: f64) -> PbhResult<Segment>
where
    F: FnMut(f64) -> PbhResult<f64>,
{
    let center = 0.5 * (a + b);
    let half = 0.5 * (b - a);

    let f_center = f(center)?;
    let mut kronrod = WGK[7] * f_center;
    let mut gauss = WG[3] * f_center;

    for j in 0..7 {
        let dx = half * XGK[j];
        let f1 = f(center - dx)?;
        let f2 = f(center + dx)?;
        kronrod += WGK[j] * (f1 + f2);
        if j % 2 == 1 {
            gauss += WG[j / 2] * (f1 + f2);
        }
    }

    let value = kronrod * half;
    let error = ((kronrod - gauss) * half).abs();
    if !value.is_finite() || !error.is_finite() {
        return Err(PbhError::NonConvergence {
            iterations: 0,
            message: format!("non-finite integrand on [{a}, {b}]"),
        });
    }
    Ok(Segment { a, b, value, error })
}

// ───────────────────────────── drivers ───────────────────────────────

/// Integrate a fallible integrand over `[a, b]`. Integrand errors propagate.
pub fn try_integrate<F>(mut f: F, a: f64, b: f64, config: QuadConfig) -> PbhResult<QuadResult>
where
    F: FnMut(f64) -> PbhResult<f64>,
{
    if !a.is_finite() || !b.is_finite() {
        return Err(PbhError::InvalidParameter(format!(
            "integration limits must be finite, got [{a}, {b}]"
        )));
    }
    if a == b {
        return Ok(QuadResult {
            value: 0.0,
            error_estimate: 0.0,
            subdivisions: 0,
        });
    }
    if a > b {
        let flipped = try_integrate(f, b, a, config)?;
        return Ok(QuadResult {
            value: -flipped.value,
            ..flipped
        });
    }

    let mut segments = vec![gauss_kronrod_15(&mut f, a, b)?];
    for subdivisions in 0..=config.max_subdivisions {
        let total: f64 = segments.iter().map(|s| s.value).sum();
        let error: f64 = segments.iter().map(|s| s.error).sum();
        if error <= config.abs_tolerance.max(config.rel_tolerance * total.abs()) {
            return Ok(QuadResult {
                value: total,
                error_estimate: error,
                subdivisions,
            });
        }
        if subdivisions == config.max_subdivisions {
            break;
        }

        let worst = segments
            .iter()
            .enumerate()
            .max_by(|x, y| x.1.error.total_cmp(&y.1.error))
            .map(|(i, _)| i)
            .unwrap_or(0);
        let seg = segments.swap_remove(worst);
        let mid = 0.5 * (seg.a + seg.b);
        if mid <= seg.a || mid >= seg.b {
            // Interval no longer representable; accept what we have.
            segments.push(seg);
            break;
        }
        segments.push(gauss_kronrod_15(&mut f, seg.a, mid)?);
        segments.push(gauss_kronrod_15(&mut f, mid, seg.b)?);
    }

    let total: f64 = segments.iter().map(|s| s.value).sum();
    let error: f64 = segments.iter().map(|s| s.error).sum();
    Err(PbhError::NonConvergence {
        iterations: config.max_subdivisions,
        message: format!(
            "quadrature on [{a}, {b}]: value {total:e}, error estimate {error:e}"
        ),
    })
}

/// Integrate an infallible integrand over `[a, b]`.
pub fn integrate<F>(f: F, a: f64, b: f64, config: QuadConfig) -> PbhResult<QuadResult>
where
    F: Fn(f64) -> f64,
{
    try_integrate(|x| Ok(f(x)), a, b, config)
}
