// ─────────────────────────────────────────────────────────────────────
// SCPN Beta-PBH — Root Finding
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Bracketed scalar root finding.
//!
//! Both solvers require a sign change on `[lo, hi]` and stop after a fixed
//! number of iterations. The safeguarded Newton iteration falls back to
//! bisection whenever the Newton step would leave the current bracket or
//! fails to halve it, so it never diverges.

use pbh_types::error::{PbhError, PbhResult};

/// Tolerance and iteration cap of a root solve.
#[derive(Debug, Clone, Copy)]
pub struct RootConfig {
    /// Stop when the step is below `tolerance · (1 + |x|)` (default: 1e-12).
    pub tolerance: f64,
    /// Iteration cap (default: 200).
    pub max_iterations: usize,
}

impl Default for RootConfig {
    fn default() -> Self {
        RootConfig {
            tolerance: 1e-12,
            max_iterations: 200,
        }
    }
}

fn check_bracket(lo: f64, hi: f64, f_lo: f64, f_hi: f64) -> PbhResult<()> {
    if !(lo.is_finite() && hi.is_finite()) || !(f_lo.is_finite() && f_hi.is_finite()) {
        return Err(PbhError::NotBracketed { lo, hi });
    }
    if f_lo * f_hi > 0.0 {
        return Err(PbhError::NotBracketed { lo, hi });
    }
    Ok(())
}

/// Plain bisection.
pub fn bisect<F>(f: F, lo: f64, hi: f64, config: RootConfig) -> PbhResult<f64>
where
    F: Fn(f64) -> f64,
{
    let f_lo = f(lo);
    let f_hi = f(hi);
    check_bracket(lo, hi, f_lo, f_hi)?;
    if f_lo == 0.0 {
        return Ok(lo);
    }
    if f_hi == 0.0 {
        return Ok(hi);
    }

    // Orient so that f(neg) < 0 < f(pos).
    let (mut neg, mut pos) = if f_lo < 0.0 { (lo, hi) } else { (hi, lo) };
    for _ in 0..config.max_iterations {
        let mid = 0.5 * (neg + pos);
        if (pos - neg).abs() <= config.tolerance * (1.0 + mid.abs()) {
            return Ok(mid);
        }
        let f_mid = f(mid);
        if f_mid == 0.0 {
            return Ok(mid);
        }
        if f_mid < 0.0 {
            neg = mid;
        } else {
            pos = mid;
        }
    }
    Err(PbhError::NonConvergence {
        iterations: config.max_iterations,
        message: format!("bisection on [{lo}, {hi}]"),
    })
}

/// Newton iteration safeguarded by bisection.
///
/// `f` returns the function value and its derivative.
pub fn newton_safeguarded<F>(f: F, lo: f64, hi: f64, config: RootConfig) -> PbhResult<f64>
where
    F: Fn(f64) -> (f64, f64),
{
    let (f_lo, _) = f(lo);
    let (f_hi, _) = f(hi);
    check_bracket(lo, hi, f_lo, f_hi)?;
    if f_lo == 0.0 {
        return Ok(lo);
    }
    if f_hi == 0.0 {
        return Ok(hi);
    }

    let (mut neg, mut pos) = if f_lo < 0.0 { (lo, hi) } else { (hi, lo) };
    let mut x = 0.5 * (lo + hi);
    let mut dx_old = (hi - lo).abs();
    let mut dx = dx_old;
    let (mut fx, mut dfx) = f(x);

    for _ in 0..config.max_iterations {
        let newton_ok = dfx.is_finite()
            && dfx != 0.0
            && ((x - pos) * dfx - fx) * ((x - neg) * dfx - fx) < 0.0
            && (2.0 * fx).abs() <= (dx_old * dfx).abs();

        dx_old = dx;
        if newton_ok {
            dx = fx / dfx;
            x -= dx;
        } else {
            dx = 0.5 * (pos - neg);
            x = neg + dx;
        }
        if dx.abs() <= config.tolerance * (1.0 + x.abs()) {
            return Ok(x);
        }

        (fx, dfx) = f(x);
        if fx == 0.0 {
            return Ok(x);
        }
        if !fx.is_finite() {
            return Err(PbhError::NonConvergence {
                iterations: 0,
                message: format!("non-finite residual at x = {x}"),
            });
        }
        if fx < 0.0 {
            neg = x;
        } else {
            pos = x;
        }
    }
    Err(PbhError::NonConvergence {
        iterations: config.max_iterations,
        message: format!("safeguarded Newton on [{lo}, {hi}]"),
    })
}
