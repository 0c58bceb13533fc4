// ─────────────────────────────────────────────────────────────────────
// SCPN Beta-PBH — Gamma-Ray Background Channel
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Extragalactic gamma-ray background from photons emitted after
//! recombination that are still above the detector threshold today.

use super::injection::{injection_beta_max, InjectionWindow, LifetimeRange};
use super::ConstraintChannel;
use crate::evolution::{evaporation_time, EvolutionModel, REIONIZATION_REDSHIFT};
use pbh_math::special::planck_energy_fraction_above;
use pbh_types::error::PbhResult;
use pbh_types::state::ChannelKind;

/// Detector threshold today, 100 keV [GeV].
const THRESHOLD_ENERGY_GEV: f64 = 1.0e-4;

const WINDOW_START_REDSHIFT: f64 = 1100.0;

/// Bound on the redshifted photon energy fraction from the observed
/// background.
const GRB_ENERGY_BOUND: f64 = 2.4e-11;

#[derive(Debug, Clone, Copy, Default)]
pub struct GammaRayChannel;

impl GammaRayChannel {
    /// Populations still evaporating after reionization whose initial
    /// Hawking temperature reaches the detector threshold.
    pub fn lifetime_range(&self, model: &EvolutionModel<'_>) -> LifetimeRange {
        let c = model.constants();
        let coldest_mass_g = c.hawking_temperature_gev_g / THRESHOLD_ENERGY_GEV;
        LifetimeRange {
            min_s: model.late().time_at_redshift(REIONIZATION_REDSHIFT),
            max_s: evaporation_time(coldest_mass_g, c),
        }
    }
}

/// Share of the emitted energy observable today: photons above the
/// blueshifted threshold, diluted by one factor of (1 + z).
pub fn observable_fraction(redshift: f64, hawking_temperature_gev: f64) -> f64 {
    let x = THRESHOLD_ENERGY_GEV * (1.0 + redshift) / hawking_temperature_gev;
    planck_energy_fraction_above(x) / (1.0 + redshift)
}

impl ConstraintChannel for GammaRayChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Grb
    }

    fn beta_max(&self, mass_g: f64, model: &EvolutionModel<'_>) -> PbhResult<Option<f64>> {
        let kappa = model.constants().hawking_temperature_gev_g;
        let window = InjectionWindow::between_redshifts(model, WINDOW_START_REDSHIFT, 0.0);
        let lifetime = self.lifetime_range(model);
        injection_beta_max(model, mass_g, GRB_ENERGY_BOUND, window, lifetime, |p| {
            let temperature = kappa / (mass_g * p.mass_fraction);
            observable_fraction(p.redshift, temperature)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::tests::{assert_lifetime_edges, rd_model};
    use pbh_types::state::BetaBound;

    #[test]
    fn test_observable_fraction_limits() {
        // Hot hole today: everything above threshold.
        assert!((observable_fraction(0.0, 1e3) - 1.0).abs() < 1e-6);
        // Cold hole: nothing.
        assert!(observable_fraction(0.0, 1e-7) < 1e-100);
        // Redshift dilution.
        assert!((observable_fraction(9.0, 1e3) - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_defined_for_late_evaporators() {
        let model = rd_model();
        assert!(GammaRayChannel.evaluate(1e16, &model).unwrap().is_defined());
        assert!(!GammaRayChannel.evaluate(1e12, &model).unwrap().is_defined());
        // τ(1.6e14 g) ≈ 2e13 s, gone around recombination.
        assert_eq!(GammaRayChannel.evaluate(1.6e14, &model).unwrap(), BetaBound::OutsideDomain);
        assert_eq!(GammaRayChannel.evaluate(1e15, &model).unwrap(), BetaBound::OutsideDomain);
    }

    #[test]
    fn test_heavy_holes_too_cold() {
        // T_H(1e18 g) ≈ 1e-5 GeV, a decade below threshold.
        let model = rd_model();
        let light = GammaRayChannel.beta_max(1e16, &model).unwrap().unwrap();
        let heavy = GammaRayChannel.beta_max(5e16, &model).unwrap().unwrap();
        assert!(heavy > light);
        assert_eq!(GammaRayChannel.evaluate(1e18, &model).unwrap(), BetaBound::OutsideDomain);
    }

    #[test]
    fn test_lifetime_edges() {
        let model = rd_model();
        let ch = GammaRayChannel;
        assert_lifetime_edges(&ch, ch.lifetime_range(&model), &model);
    }
}
