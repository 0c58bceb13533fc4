// ─────────────────────────────────────────────────────────────────────
// SCPN Beta-PBH — ODE Integration
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Adaptive Dormand–Prince 5(4) integration of small fixed-size systems.
//!
//! The independent variable may run in either direction. An optional event
//! function stops the integration at its first crossing from positive to
//! non-positive; the crossing is located by bisecting the step length.

use pbh_types::error::{PbhError, PbhResult};

/// Configuration for an adaptive ODE integration.
#[derive(Debug, Clone, Copy)]
pub struct OdeConfig {
    /// Relative tolerance per component (default: 1e-8).
    pub rel_tolerance: f64,
    /// Absolute tolerance per component (default: 1e-12).
    pub abs_tolerance: f64,
    /// Maximum number of attempted steps (default: 100000).
    pub max_steps: usize,
    /// First trial step as a fraction of the span (default: 1e-3).
    pub initial_step_fraction: f64,
}

impl Default for OdeConfig {
    fn default() -> Self {
        OdeConfig {
            rel_tolerance: 1e-8,
            abs_tolerance: 1e-12,
            max_steps: 100_000,
            initial_step_fraction: 1e-3,
        }
    }
}

/// End state of an integration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OdeSolution<const N: usize> {
    pub t: f64,
    pub y: [f64; N],
    pub steps: usize,
    /// The event fired before `t_end`.
    pub event: bool,
}

const C2: f64 = 1.0 / 5.0;
const C3: f64 = 3.0 / 10.0;
const C4: f64 = 4.0 / 5.0;
const C5: f64 = 8.0 / 9.0;

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;

/// Fifth-order weights.
const B1: f64 = 35.0 / 384.0;
const B3: f64 = 500.0 / 1113.0;
const B4: f64 = 125.0 / 192.0;
const B5: f64 = -2187.0 / 6784.0;
const B6: f64 = 11.0 / 84.0;

/// Fifth minus fourth order weights.
const E1: f64 = 71.0 / 57600.0;
const E3: f64 = -71.0 / 16695.0;
const E4: f64 = 71.0 / 1920.0;
const E5: f64 = -17253.0 / 339200.0;
const E6: f64 = 22.0 / 525.0;
const E7: f64 = -1.0 / 40.0;

fn combine<const N: usize>(y: &[f64; N], h: f64, terms: &[(f64, &[f64; N])]) -> [f64; N] {
    let mut out = *y;
    for (i, slot) in out.iter_mut().enumerate() {
        let mut acc = 0.0;
        for (coef, k) in terms {
            acc += coef * k[i];
        }
        *slot += h * acc;
    }
    out
}

/// One Dormand–Prince step. Returns the fifth-order state and the local
/// error vector.
fn dopri_step<const N: usize, F>(rhs: &F, t: f64, y: &[f64; N], h: f64) -> ([f64; N], [f64; N])
where
    F: Fn(f64, &[f64; N]) -> [f64; N],
{
    let k1 = rhs(t, y);
    let k2 = rhs(t + C2 * h, &combine(y, h, &[(A21, &k1)]));
    let k3 = rhs(t + C3 * h, &combine(y, h, &[(A31, &k1), (A32, &k2)]));
    let k4 = rhs(
        t + C4 * h,
        &combine(y, h, &[(A41, &k1), (A42, &k2), (A43, &k3)]),
    );
    let k5 = rhs(
        t + C5 * h,
        &combine(y, h, &[(A51, &k1), (A52, &k2), (A53, &k3), (A54, &k4)]),
    );
    let k6 = rhs(
        t + h,
        &combine(
            y,
            h,
            &[(A61, &k1), (A62, &k2), (A63, &k3), (A64, &k4), (A65, &k5)],
        ),
    );
    let y5 = combine(
        y,
        h,
        &[(B1, &k1), (B3, &k3), (B4, &k4), (B5, &k5), (B6, &k6)],
    );
    let k7 = rhs(t + h, &y5);

    let mut err = [0.0; N];
    for (i, e) in err.iter_mut().enumerate() {
        *e = h
            * (E1 * k1[i] + E3 * k3[i] + E4 * k4[i] + E5 * k5[i] + E6 * k6[i] + E7 * k7[i]);
    }
    (y5, err)
}

fn error_norm<const N: usize>(y: &[f64; N], y_new: &[f64; N], err: &[f64; N], cfg: &OdeConfig) -> f64 {
    let mut sum = 0.0;
    for i in 0..N {
        let scale = cfg.abs_tolerance + cfg.rel_tolerance * y[i].abs().max(y_new[i].abs());
        let r = err[i] / scale;
        sum += r * r;
    }
    let norm = (sum / N.max(1) as f64).sqrt();
    if norm.is_finite() && y_new.iter().all(|v| v.is_finite()) {
        norm
    } else {
        f64::INFINITY
    }
}

/// Integrate from `t0` to `t_end` without an event.
pub fn dopri5<const N: usize, F>(
    rhs: F,
    t0: f64,
    y0: [f64; N],
    t_end: f64,
    config: OdeConfig,
) -> PbhResult<OdeSolution<N>>
where
    F: Fn(f64, &[f64; N]) -> [f64; N],
{
    dopri5_with_event(rhs, |_, _| 1.0, t0, y0, t_end, config)
}

/// Integrate from `t0` to `t_end`, stopping early where `event` first
/// becomes non-positive.
pub fn dopri5_with_event<const N: usize, F, G>(
    rhs: F,
    event: G,
    t0: f64,
    y0: [f64; N],
    t_end: f64,
    config: OdeConfig,
) -> PbhResult<OdeSolution<N>>
where
    F: Fn(f64, &[f64; N]) -> [f64; N],
    G: Fn(f64, &[f64; N]) -> f64,
{
    if !t0.is_finite() || !t_end.is_finite() || y0.iter().any(|v| !v.is_finite()) {
        return Err(PbhError::InvalidParameter(format!(
            "ODE start must be finite: t0 = {t0}, t_end = {t_end}"
        )));
    }
    if event(t0, &y0) <= 0.0 {
        return Ok(OdeSolution {
            t: t0,
            y: y0,
            steps: 0,
            event: true,
        });
    }
    let span = t_end - t0;
    if span == 0.0 {
        return Ok(OdeSolution {
            t: t0,
            y: y0,
            steps: 0,
            event: false,
        });
    }

    let direction = span.signum();
    let mut h = span * config.initial_step_fraction;
    let mut t = t0;
    let mut y = y0;

    for step in 0..config.max_steps {
        let remaining = t_end - t;
        if remaining * direction <= 0.0 {
            return Ok(OdeSolution {
                t,
                y,
                steps: step,
                event: false,
            });
        }
        let last = h.abs() >= remaining.abs();
        if last {
            h = remaining;
        }
        if h.abs() <= 1e-14 * t.abs().max(span.abs()) {
            return Err(PbhError::NonConvergence {
                iterations: step,
                message: format!("ODE step size underflow at t = {t}"),
            });
        }

        let (y_new, err) = dopri_step(&rhs, t, &y, h);
        let norm = error_norm(&y, &y_new, &err, &config);

        if norm <= 1.0 {
            let t_new = if last { t_end } else { t + h };
            if event(t_new, &y_new) <= 0.0 {
                let (t_ev, y_ev) = locate_event(&rhs, &event, t, &y, h);
                return Ok(OdeSolution {
                    t: t_ev,
                    y: y_ev,
                    steps: step + 1,
                    event: true,
                });
            }
            t = t_new;
            y = y_new;
            let factor = if norm == 0.0 {
                5.0
            } else {
                (0.9 * norm.powf(-0.2)).clamp(0.2, 5.0)
            };
            h *= factor;
        } else {
            let factor = if norm.is_finite() {
                (0.9 * norm.powf(-0.2)).clamp(0.1, 0.9)
            } else {
                0.1
            };
            h *= factor;
        }
    }

    Err(PbhError::NonConvergence {
        iterations: config.max_steps,
        message: format!("ODE step cap reached at t = {t} (target {t_end})"),
    })
}

/// Bisect the step length until the event crossing is pinned down.
fn locate_event<const N: usize, F, G>(
    rhs: &F,
    event: &G,
    t: f64,
    y: &[f64; N],
    h: f64,
) -> (f64, [f64; N])
where
    F: Fn(f64, &[f64; N]) -> [f64; N],
    G: Fn(f64, &[f64; N]) -> f64,
{
    let mut h_lo = 0.0;
    let mut h_hi = h;
    let (mut y_hi, _) = dopri_step(rhs, t, y, h);
    for _ in 0..60 {
        if (h_hi - h_lo).abs() <= 1e-12 * h.abs() {
            break;
        }
        let h_mid = 0.5 * (h_lo + h_hi);
        let (y_mid, _) = dopri_step(rhs, t, y, h_mid);
        if event(t + h_mid, &y_mid) <= 0.0 {
            h_hi = h_mid;
            y_hi = y_mid;
        } else {
            h_lo = h_mid;
        }
    }
    (t + h_hi, y_hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_decay() {
        let sol = dopri5(|_, y: &[f64; 1]| [-y[0]], 0.0, [1.0], 5.0, OdeConfig::default()).unwrap();
        assert!(!sol.event);
        assert_eq!(sol.t, 5.0);
        assert!((sol.y[0] - (-5.0f64).exp()).abs() < 1e-9, "y = {}", sol.y[0]);
    }

    #[test]
    fn test_backward_integration() {
        // y' = y from t = 2 down to t = 0.
        let sol = dopri5(|_, y: &[f64; 1]| [y[0]], 2.0, [2f64.exp()], 0.0, OdeConfig::default())
            .unwrap();
        assert!((sol.y[0] - 1.0).abs() < 1e-7, "y = {}", sol.y[0]);
    }

    #[test]
    fn test_harmonic_oscillator_phase() {
        let sol = dopri5(
            |_, y: &[f64; 2]| [y[1], -y[0]],
            0.0,
            [1.0, 0.0],
            std::f64::consts::PI,
            OdeConfig::default(),
        )
        .unwrap();
        assert!((sol.y[0] + 1.0).abs() < 1e-7);
        assert!(sol.y[1].abs() < 1e-7);
    }

    #[test]
    fn test_event_stops_integration() {
        // Free fall from height 10: event at y = 0, t = sqrt(2).
        let sol = dopri5_with_event(
            |_, y: &[f64; 2]| [y[1], -10.0],
            |_, y: &[f64; 2]| y[0],
            0.0,
            [10.0, 0.0],
            100.0,
            OdeConfig::default(),
        )
        .unwrap();
        assert!(sol.event);
        assert!((sol.t - 2f64.sqrt()).abs() < 1e-9, "t = {}", sol.t);
        assert!(sol.y[0].abs() < 1e-8);
    }

    #[test]
    fn test_step_cap() {
        let cfg = OdeConfig {
            max_steps: 3,
            ..OdeConfig::default()
        };
        let err = dopri5(|_, y: &[f64; 1]| [-y[0]], 0.0, [1.0], 100.0, cfg).unwrap_err();
        assert!(matches!(err, PbhError::NonConvergence { iterations: 3, .. }));
    }

    #[test]
    fn test_zero_span_is_identity() {
        let sol = dopri5(|_, y: &[f64; 1]| [y[0]], 1.0, [3.0], 1.0, OdeConfig::default()).unwrap();
        assert_eq!(sol.y, [3.0]);
        assert_eq!(sol.steps, 0);
    }
}
