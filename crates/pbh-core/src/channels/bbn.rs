// ─────────────────────────────────────────────────────────────────────
// SCPN Beta-PBH — BBN Channel
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Big Bang Nucleosynthesis: energy injected between the onset of BBN and
//! the end of its sensitivity to hadronic and electromagnetic cascades.

use super::injection::{injection_beta_max, InjectionWindow, LifetimeRange};
use super::ConstraintChannel;
use crate::evolution::EvolutionModel;
use pbh_types::error::PbhResult;
use pbh_types::state::ChannelKind;

/// End of the BBN sensitivity window [s].
const BBN_WINDOW_END_S: f64 = 1.0e12;

/// Largest injected energy fraction compatible with light-element
/// abundances.
const BBN_ENERGY_BOUND: f64 = 1.0e-8;

#[derive(Debug, Clone, Copy, Default)]
pub struct BbnChannel;

impl BbnChannel {
    /// From the onset of nucleosynthesis to today. Longer-lived populations
    /// still release most of their mass after the BBN window closes.
    pub fn lifetime_range(&self, model: &EvolutionModel<'_>) -> LifetimeRange {
        let c = model.constants();
        LifetimeRange {
            min_s: c.bbn_onset_s,
            max_s: c.age_of_universe_s,
        }
    }
}

impl ConstraintChannel for BbnChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Bbn
    }

    fn beta_max(&self, mass_g: f64, model: &EvolutionModel<'_>) -> PbhResult<Option<f64>> {
        let window = InjectionWindow {
            start_s: model.constants().bbn_onset_s,
            stop_s: BBN_WINDOW_END_S,
        };
        let lifetime = self.lifetime_range(model);
        injection_beta_max(model, mass_g, BBN_ENERGY_BOUND, window, lifetime, |_| 1.0)
    }
}
