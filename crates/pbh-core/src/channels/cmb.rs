// ─────────────────────────────────────────────────────────────────────
// SCPN Beta-PBH — CMB Anisotropy Channel
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! CMB anisotropies: energy deposited around recombination alters the
//! ionization history.

use super::injection::{injection_beta_max, InjectionWindow, LifetimeRange};
use super::ConstraintChannel;
use crate::evolution::EvolutionModel;
use pbh_types::error::PbhResult;
use pbh_types::state::ChannelKind;

const WINDOW_START_REDSHIFT: f64 = 2500.0;
const WINDOW_END_REDSHIFT: f64 = 200.0;

/// Planck-level bound on the injected energy fraction.
const CMB_ENERGY_BOUND: f64 = 5.0e-9;

#[derive(Debug, Clone, Copy, Default)]
pub struct CmbAnisotropyChannel;

impl CmbAnisotropyChannel {
    /// Populations that evaporate around recombination.
    pub fn lifetime_range(&self, model: &EvolutionModel<'_>) -> LifetimeRange {
        let late = model.late();
        LifetimeRange {
            min_s: late.time_at_redshift(WINDOW_START_REDSHIFT),
            max_s: late.time_at_redshift(WINDOW_END_REDSHIFT),
        }
    }
}

impl ConstraintChannel for CmbAnisotropyChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::CmbAnisotropy
    }

    fn beta_max(&self, mass_g: f64, model: &EvolutionModel<'_>) -> PbhResult<Option<f64>> {
        let window =
            InjectionWindow::between_redshifts(model, WINDOW_START_REDSHIFT, WINDOW_END_REDSHIFT);
        let lifetime = self.lifetime_range(model);
        injection_beta_max(model, mass_g, CMB_ENERGY_BOUND, window, lifetime, |_| 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::tests::{assert_lifetime_edges, rd_model};
    use pbh_types::state::BetaBound;

    #[test]
    fn test_window_selects_masses() {
        let model = rd_model();
        // τ(1e13 g) ≈ 5e9 s, long before z = 2500.
        assert_eq!(
            CmbAnisotropyChannel.evaluate(1e13, &model).unwrap(),
            BetaBound::OutsideDomain
        );
        assert!(CmbAnisotropyChannel.evaluate(1e14, &model).unwrap().is_defined());
        // τ(1e16 g) ≈ 5e18 s, long after z = 200.
        assert_eq!(
            CmbAnisotropyChannel.evaluate(1e16, &model).unwrap(),
            BetaBound::OutsideDomain
        );
    }

    #[test]
    fn test_lifetime_edges() {
        let model = rd_model();
        let ch = CmbAnisotropyChannel;
        assert_lifetime_edges(&ch, ch.lifetime_range(&model), &model);
    }
}
