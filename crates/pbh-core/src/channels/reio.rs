// ─────────────────────────────────────────────────────────────────────
// SCPN Beta-PBH — Reionization Channel
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Reionization: energy injected during the dark ages and reionization
//! must not ionize the intergalactic medium early.

use super::injection::{injection_beta_max, InjectionWindow, LifetimeRange};
use super::ConstraintChannel;
use crate::evolution::{evaporation_time, EvolutionModel, REIONIZATION_REDSHIFT};
use pbh_types::error::PbhResult;
use pbh_types::state::ChannelKind;

const WINDOW_START_REDSHIFT: f64 = 30.0;

/// Bound on the injected energy fraction from the optical depth.
const REIO_ENERGY_BOUND: f64 = 2.0e-7;

/// Heaviest PBH whose emission during the dark ages still heats and
/// ionizes the medium measurably [g].
const HEAVIEST_MASS_G: f64 = 1.0e17;

#[derive(Debug, Clone, Copy, Default)]
pub struct ReionizationChannel;

impl ReionizationChannel {
    /// From the start of the window up to the lifetime of the heaviest
    /// constrained mass.
    pub fn lifetime_range(&self, model: &EvolutionModel<'_>) -> LifetimeRange {
        LifetimeRange {
            min_s: model.late().time_at_redshift(WINDOW_START_REDSHIFT),
            max_s: evaporation_time(HEAVIEST_MASS_G, model.constants()),
        }
    }
}

impl ConstraintChannel for ReionizationChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Reionization
    }

    fn beta_max(&self, mass_g: f64, model: &EvolutionModel<'_>) -> PbhResult<Option<f64>> {
        let window =
            InjectionWindow::between_redshifts(model, WINDOW_START_REDSHIFT, REIONIZATION_REDSHIFT);
        let lifetime = self.lifetime_range(model);
        injection_beta_max(model, mass_g, REIO_ENERGY_BOUND, window, lifetime, |_| 1.0)
    }
}
