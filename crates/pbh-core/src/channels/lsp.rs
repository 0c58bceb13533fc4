// ─────────────────────────────────────────────────────────────────────
// SCPN Beta-PBH — LSP Channel
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Evaporation relics: Planck-mass remnants plus stable heavy particles
//! (lightest supersymmetric particles) emitted once T_H exceeds their mass.
//! Both must not overclose the dark-matter density.

use super::ConstraintChannel;
use crate::evolution::EvolutionModel;
use pbh_math::quadrature::integrate;
use pbh_types::error::PbhResult;
use pbh_types::state::ChannelKind;

#[derive(Debug, Clone, Copy)]
pub struct LspChannel {
    /// m_χ [GeV] (default: 100)
    pub lsp_mass_gev: f64,
    /// Fraction of emitted quanta that are LSPs (default: 0.03)
    pub emission_fraction: f64,
}

impl Default for LspChannel {
    fn default() -> Self {
        LspChannel {
            lsp_mass_gev: 100.0,
            emission_fraction: 0.03,
        }
    }
}

impl LspChannel {
    /// Mass below which T_H > m_χ [g].
    pub fn emission_mass_g(&self, model: &EvolutionModel<'_>) -> f64 {
        model.constants().hawking_temperature_gev_g / self.lsp_mass_gev
    }

    /// LSP mass left behind by one PBH of `mass_g` [g]:
    /// `∫₀^{min(M, M_χ)} f_χ m_χ m / (3κ) dm`.
    pub fn relic_yield_g(&self, mass_g: f64, model: &EvolutionModel<'_>) -> PbhResult<f64> {
        let kappa = model.constants().hawking_temperature_gev_g;
        let upper = mass_g.min(self.emission_mass_g(model));
        let coef = self.emission_fraction * self.lsp_mass_gev / (3.0 * kappa);
        let r = integrate(|m| coef * m, 0.0, upper, model.quad_config())?;
        Ok(r.value)
    }
}

impl ConstraintChannel for LspChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Lsp
    }

    fn beta_max(&self, mass_g: f64, model: &EvolutionModel<'_>) -> PbhResult<Option<f64>> {
        let c = model.constants();
        let rec = model.record(mass_g)?;
        if rec.evaporation_time_s > c.age_of_universe_s {
            return Ok(None);
        }
        let relic_fraction = (c.planck_mass_g + self.relic_yield_g(mass_g, model)?) / mass_g;
        let ln_today = model.ln_fraction_at_y(&rec, model.late().y_today());
        Ok(Some(c.dark_matter_share_today() / (ln_today.exp() * relic_fraction)))
    }
}
