//! Energy injected by evaporation inside a time window.
//!
//! Per unit beta, relative to the background density:
//!
//!   I = ∫ Ω(t) · W(t, m) · (−d(m/M)/dt) dt
//!
//! with m/M = (1 − t/τ)^{1/3}. Before τ/2 the integral runs over ln t; after
//! τ/2 it runs over the remaining mass fraction s directly, which removes
//! the (1 − t/τ)^{−2/3} end-point singularity.

use crate::evolution::EvolutionModel;
use pbh_math::quadrature::try_integrate;
use pbh_types::error::{PbhError, PbhResult};
use pbh_types::state::EvolutionRecord;

/// Cosmic-time interval [s] an observable is sensitive to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InjectionWindow {
    pub start_s: f64,
    pub stop_s: f64,
}

impl InjectionWindow {
    pub fn between_redshifts(model: &EvolutionModel<'_>, z_high: f64, z_low: f64) -> Self {
        InjectionWindow {
            start_s: model.late().time_at_redshift(z_high),
            stop_s: model.late().time_at_redshift(z_low),
        }
    }
}

/// Evaporation times [s] a channel's observable can constrain. Outside it the
/// channel has no bound, whatever the injection integral says.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LifetimeRange {
    pub min_s: f64,
    pub max_s: f64,
}

impl LifetimeRange {
    pub fn contains(&self, tau_s: f64) -> bool {
        tau_s >= self.min_s && tau_s <= self.max_s
    }
}

/// Point handed to a channel weight.
#[derive(Debug, Clone, Copy)]
pub struct InjectionPoint {
    pub time_s: f64,
    /// a / a_eq
    pub y: f64,
    pub redshift: f64,
    /// Remaining mass fraction m/M.
    pub mass_fraction: f64,
}

/// Evaluate `I` for one mass. Returns 0 when the population has no mass
/// left to lose inside the window.
pub fn injection_integral<W>(
    model: &EvolutionModel<'_>,
    record: &EvolutionRecord,
    window: InjectionWindow,
    weight: W,
) -> PbhResult<f64>
where
    W: Fn(&InjectionPoint) -> f64,
{
    let tau = record.evaporation_time_s;
    let late = model.late();
    let root = model.root_config();
    let quad = model.quad_config();

    let t_lo = window.start_s.max(late.time_end());
    let t_hi = window.stop_s.min(tau);
    if t_hi <= t_lo {
        return Ok(0.0);
    }
    let s_floor = (model.constants().planck_mass_g / record.mass_g).min(1.0);

    let integrand_at = |t: f64, s: f64| -> PbhResult<(f64, f64)> {
        let y = late.y_at_time(t, root)?;
        let point = InjectionPoint {
            time_s: t,
            y,
            redshift: late.redshift_at(y),
            mass_fraction: s,
        };
        Ok((model.ln_fraction_at_y(record, y), weight(&point)))
    };

    let t_split = 0.5 * tau;
    let mut total = 0.0;

    // ln t piece, away from τ.
    if t_lo < t_split {
        let upper = t_hi.min(t_split);
        let part = try_integrate(
            |u| {
                let t = u.exp();
                let left = 1.0 - t / tau;
                let rate = left.powf(-2.0 / 3.0) / (3.0 * tau);
                let (ln_omega, w) = integrand_at(t, left.cbrt())?;
                Ok(t * rate * ln_omega.exp() * w)
            },
            t_lo.ln(),
            upper.ln(),
            quad,
        )?;
        total += part.value;
    }

    // Remaining-mass piece up to τ.
    if t_hi > t_split {
        let lower = t_lo.max(t_split);
        let s_start = (1.0 - lower / tau).max(0.0).cbrt();
        let s_stop = (1.0 - t_hi / tau).max(0.0).cbrt().max(s_floor);
        if s_start > s_stop {
            let part = try_integrate(
                |s| {
                    let t = tau * (1.0 - s * s * s);
                    let (ln_omega, w) = integrand_at(t.max(lower), s)?;
                    Ok(ln_omega.exp() * w)
                },
                s_stop,
                s_start,
                quad,
            )?;
            total += part.value;
        }
    }

    if !total.is_finite() {
        return Err(PbhError::NonConvergence {
            iterations: 0,
            message: format!("non-finite injection integral at {:e} g", record.mass_g),
        });
    }
    Ok(total)
}

/// `epsilon / I`, or `None` when τ falls outside `lifetime`. No injection
/// inside the window is outside the domain.
pub fn injection_beta_max<W>(
    model: &EvolutionModel<'_>,
    mass_g: f64,
    epsilon: f64,
    window: InjectionWindow,
    lifetime: LifetimeRange,
    weight: W,
) -> PbhResult<Option<f64>>
where
    W: Fn(&InjectionPoint) -> f64,
{
    let record = model.record(mass_g)?;
    if !lifetime.contains(record.evaporation_time_s) {
        return Ok(None);
    }
    let injected = injection_integral(model, &record, window, weight)?;
    if injected <= 0.0 {
        return Err(PbhError::OutsideDomain(format!(
            "{mass_g:e} g injects nothing in [{:e}, {:e}] s",
            window.start_s, window.stop_s
        )));
    }
    Ok(Some(epsilon / injected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::tests::rd_model;

    #[test]
    fn test_full_evaporation_releases_whole_mass() {
        // Unit weight and constant Ω would give exactly 1 − s_floor; the
        // growth of Ω makes it larger.
        let model = rd_model();
        let mass = 1e10;
        let rec = model.record(mass).unwrap();
        let window = InjectionWindow {
            start_s: 1e-2,
            stop_s: 1e20,
        };
        let unit = injection_integral(&model, &rec, window, |_| 1.0).unwrap();
        let omega_start = model.ln_fraction_at_time(&rec, 1e-2).unwrap().exp();
        let omega_tau = model
            .ln_fraction_at_time(&rec, rec.evaporation_time_s)
            .unwrap()
            .exp();
        assert!(unit > omega_start && unit < omega_tau, "I = {unit}");
    }

    #[test]
    fn test_window_after_evaporation_is_empty() {
        let model = rd_model();
        let rec = model.record(1e9).unwrap();
        let window = InjectionWindow {
            start_s: rec.evaporation_time_s * 2.0,
            stop_s: rec.evaporation_time_s * 10.0,
        };
        assert_eq!(injection_integral(&model, &rec, window, |_| 1.0).unwrap(), 0.0);
        let any = LifetimeRange {
            min_s: 0.0,
            max_s: f64::INFINITY,
        };
        let err = injection_beta_max(&model, 1e9, 1.0, window, any, |_| 1.0).unwrap_err();
        assert!(matches!(err, PbhError::OutsideDomain(_)));
    }

    #[test]
    fn test_lifetime_outside_range_has_no_bound() {
        let model = rd_model();
        let tau = model.record(1e10).unwrap().evaporation_time_s;
        let window = InjectionWindow {
            start_s: 1e-2,
            stop_s: 1e20,
        };
        let around = |lo: f64, hi: f64| LifetimeRange {
            min_s: tau * lo,
            max_s: tau * hi,
        };
        assert!(injection_beta_max(&model, 1e10, 1.0, window, around(0.5, 2.0), |_| 1.0)
            .unwrap()
            .is_some());
        assert_eq!(
            injection_beta_max(&model, 1e10, 1.0, window, around(2.0, 4.0), |_| 1.0).unwrap(),
            None
        );
        assert_eq!(
            injection_beta_max(&model, 1e10, 1.0, window, around(0.1, 0.5), |_| 1.0).unwrap(),
            None
        );
    }

    #[test]
    fn test_long_lived_matches_slow_loss_limit() {
        // τ ≫ window: −d(m/M)/dt ≈ 1/(3τ) and Ω ∝ y/(1+y).
        let model = rd_model();
        let mass = 1e17;
        let rec = model.record(mass).unwrap();
        let window = InjectionWindow {
            start_s: 1.0,
            stop_s: 10.0,
        };
        let i = injection_integral(&model, &rec, window, |_| 1.0).unwrap();
        let omega_1 = model.ln_fraction_at_time(&rec, 1.0).unwrap().exp();
        // Radiation era: Ω ∝ √t, so ∫₁¹⁰ Ω dt = Ω(1)·(2/3)(10^{3/2} − 1).
        let approx = omega_1 * (2.0 / 3.0) * (10f64.powf(1.5) - 1.0) / (3.0 * rec.evaporation_time_s);
        assert!((i / approx - 1.0).abs() < 1e-3, "I = {i}, approx = {approx}");
    }

    #[test]
    fn test_weight_sees_mass_fraction() {
        let model = rd_model();
        let rec = model.record(1e10).unwrap();
        let window = InjectionWindow {
            start_s: 1e-2,
            stop_s: 1e20,
        };
        let full = injection_integral(&model, &rec, window, |_| 1.0).unwrap();
        let late_only = injection_integral(&model, &rec, window, |p| {
            if p.mass_fraction < 0.5 {
                1.0
            } else {
                0.0
            }
        })
        .unwrap();
        assert!(late_only > 0.0 && late_only < full);
    }
}
