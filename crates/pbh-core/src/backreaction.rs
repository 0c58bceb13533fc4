// ─────────────────────────────────────────────────────────────────────
// SCPN Beta-PBH — Back-Reaction
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! PBH density fraction with back-reaction on the expansion.
//!
//! With Ω = ρ_PBH / ρ_total and u = ln ρ_total, a pressureless component in
//! a radiation background obeys
//!
//!   d ln b / du = −(Ω − 1) / (Ω − 4)
//!   dt / du     = √3 M_P / ((Ω − 4) √ρ)
//!
//! where Ω = β·b·(1 − t/τ)^{1/3}. The system is integrated from formation
//! (or from the end of the reheating era for PBHs formed inside it) down to
//! the end of the evolution window, stopping early if the PBH reaches the
//! Planck mass. State is `[ln b, ln t]`.

use crate::evolution::EvolutionModel;
use pbh_math::ode::dopri5_with_event;
use pbh_types::error::{PbhError, PbhResult};
use serde::{Deserialize, Serialize};

/// Outcome of a back-reaction integration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BackReaction {
    /// Ω at the stop point.
    pub omega: f64,
    /// The PBH reached the Planck mass before the window closed.
    pub evaporated: bool,
    /// ln ρ_total at the stop point.
    pub ln_density_stop: f64,
    /// Cosmic time at the stop point [s].
    pub time_stop_s: f64,
}

/// Integrate the coupled density fraction for a population of `mass_g`
/// PBHs with initial abundance `beta`.
pub fn backreaction_fraction(
    model: &EvolutionModel<'_>,
    mass_g: f64,
    beta: f64,
) -> PbhResult<BackReaction> {
    if !beta.is_finite() || beta <= 0.0 || beta > 1.0 {
        return Err(PbhError::InvalidParameter(format!(
            "beta must lie in (0, 1], got {beta}"
        )));
    }
    let c = model.constants();
    let rec = model.record(mass_g)?;
    let m_p = c.reduced_planck_mass_gev;
    let hbar = c.seconds_per_inverse_gev;

    // Start of the radiation-dominated stretch.
    let (u_start, ln_b0) = if rec.formed_in_reheating {
        let early = model.early();
        let root = model.root_config();
        let ln_rho_rh = early.ln_density_reheating();
        let x_f = early.efolds_at_density(rec.ln_density_formation, root)?;
        let x_rh = early.efolds_at_density(ln_rho_rh, root)?;
        let ln_b = rec.ln_density_formation - ln_rho_rh - 3.0 * (x_rh - x_f);
        (ln_rho_rh, ln_b)
    } else {
        (rec.ln_density_formation, 0.0)
    };
    let u_end = model.ln_density_end();
    // Radiation-era estimate t = 1/(2H).
    let ln_t0 = (3f64.sqrt() * m_p / (2.0 * (0.5 * u_start).exp()) * hbar).ln();

    let tau = rec.evaporation_time_s;
    let planck_mass = c.planck_mass_g;
    let s_of = |ln_t: f64| (1.0 - ln_t.exp() / tau).max(0.0).cbrt();
    let omega_of = |y: &[f64; 2]| {
        let s = s_of(y[1]).max((planck_mass / mass_g).min(1.0));
        (beta * y[0].exp() * s).min(1.0)
    };

    let rhs = |u: f64, y: &[f64; 2]| {
        let omega = omega_of(y);
        let dlnb = -(omega - 1.0) / (omega - 4.0);
        let dt = 3f64.sqrt() * m_p / ((omega - 4.0) * (0.5 * u).exp()) * hbar;
        [dlnb, dt / y[1].exp()]
    };
    let event = |_u: f64, y: &[f64; 2]| mass_g * s_of(y[1]) - planck_mass;

    let sol = dopri5_with_event(
        rhs,
        event,
        u_start,
        [ln_b0, ln_t0],
        u_end,
        model.ode_config(),
    )?;

    Ok(BackReaction {
        omega: omega_of(&sol.y),
        evaporated: sol.event,
        ln_density_stop: sol.t,
        time_stop_s: sol.y[1].exp(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pbh_types::config::{MatchingStrategy, NumericsConfig};
    use pbh_types::constants::PhysicalConstants;
    use pbh_types::state::ReheatingScenario;

    fn model(scenario: ReheatingScenario) -> EvolutionModel<'static> {
        EvolutionModel::new(
            PhysicalConstants::standard(),
            scenario,
            MatchingStrategy::default(),
            NumericsConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_small_beta_matches_linear_growth() {
        let m = model(ReheatingScenario::instantaneous());
        let mass = 1e17;
        let beta = 1e-30;
        let br = backreaction_fraction(&m, mass, beta).unwrap();
        assert!(!br.evaporated);
        let linear = beta * m.record(mass).unwrap().ln_fraction_end.exp();
        assert!((br.omega / linear - 1.0).abs() < 1e-4, "{} vs {}", br.omega, linear);
        assert!((br.ln_density_stop - m.ln_density_end()).abs() < 1e-9);
    }

    #[test]
    fn test_light_pbh_evaporates_in_window() {
        let m = model(ReheatingScenario::instantaneous());
        let br = backreaction_fraction(&m, 1e5, 1e-10).unwrap();
        assert!(br.evaporated);
        assert!(br.ln_density_stop > m.ln_density_end());
        let tau = m.evaporation_time(1e5);
        assert!((br.time_stop_s / tau - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_large_beta_saturates() {
        let m = model(ReheatingScenario::instantaneous());
        let br = backreaction_fraction(&m, 1e17, 0.5).unwrap();
        assert!(br.omega > 0.99 && br.omega <= 1.0, "omega = {}", br.omega);
    }

    #[test]
    fn test_invalid_beta() {
        let m = model(ReheatingScenario::instantaneous());
        assert!(backreaction_fraction(&m, 1e17, 0.0).is_err());
        assert!(backreaction_fraction(&m, 1e17, 2.0).is_err());
    }

    #[test]
    fn test_formed_in_reheating_starts_at_reheating() {
        let m = model(ReheatingScenario::with_efolds(20.0).unwrap());
        let rec = m.record(1e3).unwrap();
        assert!(rec.formed_in_reheating);
        // τ(1e3 g) ends long before the evolution window closes.
        let br = backreaction_fraction(&m, 1e3, 1e-30).unwrap();
        assert!(br.evaporated);
        assert!(br.ln_density_stop < m.early().ln_density_reheating());
    }
}
