// ─────────────────────────────────────────────────────────────────────
// SCPN Beta-PBH — Spectral Distortion Channel
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! CMB spectral distortions from energy injected after photon-number
//! changing processes freeze out.

use super::injection::{injection_beta_max, InjectionWindow, LifetimeRange};
use super::ConstraintChannel;
use crate::evolution::EvolutionModel;
use pbh_types::error::PbhResult;
use pbh_types::state::ChannelKind;

/// Thermalization redshift of double Compton scattering.
const THERMALIZATION_REDSHIFT: f64 = 1.98e6;

/// The window opens at this multiple of the thermalization redshift, where
/// the visibility exp(−(z/z_th)^{5/2}) is already negligible.
const WINDOW_START_FACTOR: f64 = 5.0;

/// FIRAS-level bound on the injected energy fraction.
const SD_ENERGY_BOUND: f64 = 6.0e-5;

#[derive(Debug, Clone, Copy, Default)]
pub struct SpectralDistortionChannel;

impl SpectralDistortionChannel {
    /// Populations that evaporate inside the distortion window.
    pub fn lifetime_range(&self, model: &EvolutionModel<'_>) -> LifetimeRange {
        let late = model.late();
        LifetimeRange {
            min_s: late.time_at_redshift(WINDOW_START_FACTOR * THERMALIZATION_REDSHIFT),
            max_s: late.time_at_redshift(model.constants().redshift_recombination),
        }
    }
}

/// Fraction of injected energy that survives as a distortion.
pub fn distortion_visibility(redshift: f64) -> f64 {
    (-(redshift / THERMALIZATION_REDSHIFT).powf(2.5)).exp()
}

impl ConstraintChannel for SpectralDistortionChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Sd
    }

    fn beta_max(&self, mass_g: f64, model: &EvolutionModel<'_>) -> PbhResult<Option<f64>> {
        let window = InjectionWindow::between_redshifts(
            model,
            WINDOW_START_FACTOR * THERMALIZATION_REDSHIFT,
            model.constants().redshift_recombination,
        );
        let lifetime = self.lifetime_range(model);
        injection_beta_max(model, mass_g, SD_ENERGY_BOUND, window, lifetime, |p| {
            distortion_visibility(p.redshift)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::tests::{assert_lifetime_edges, rd_model};
    use pbh_types::state::BetaBound;

    #[test]
    fn test_visibility_limits() {
        assert!((distortion_visibility(0.0) - 1.0).abs() < 1e-15);
        assert!((distortion_visibility(THERMALIZATION_REDSHIFT) - (-1f64).exp()).abs() < 1e-12);
        assert!(distortion_visibility(WINDOW_START_FACTOR * THERMALIZATION_REDSHIFT) < 1e-20);
    }

    #[test]
    fn test_defined_for_window_lifetimes() {
        // τ(1e12 g) ≈ 5e6 s, after thermalization.
        let model = rd_model();
        assert!(SpectralDistortionChannel.evaluate(1e12, &model).unwrap().is_defined());
        assert_eq!(
            SpectralDistortionChannel.evaluate(1e9, &model).unwrap(),
            BetaBound::OutsideDomain
        );
    }

    #[test]
    fn test_lifetime_edges() {
        let model = rd_model();
        let ch = SpectralDistortionChannel;
        assert_lifetime_edges(&ch, ch.lifetime_range(&model), &model);
        // Still around at recombination.
        assert_eq!(ch.evaluate(1e15, &model).unwrap(), BetaBound::OutsideDomain);
        assert_eq!(ch.evaluate(1e20, &model).unwrap(), BetaBound::OutsideDomain);
    }
}
