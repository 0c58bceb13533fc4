// ─────────────────────────────────────────────────────────────────────
// SCPN Beta-PBH — Dark Matter Channel
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! PBHs that survive to today may not exceed the dark-matter density.

use super::ConstraintChannel;
use crate::evolution::{EvolutionModel, Epoch};
use pbh_types::error::PbhResult;
use pbh_types::state::ChannelKind;

#[derive(Debug, Clone, Copy, Default)]
pub struct DarkMatterChannel;

impl ConstraintChannel for DarkMatterChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Dm
    }

    fn beta_max(&self, mass_g: f64, model: &EvolutionModel<'_>) -> PbhResult<Option<f64>> {
        let c = model.constants();
        let rec = model.record(mass_g)?;
        if rec.evaporation_time_s <= c.age_of_universe_s {
            return Ok(None);
        }
        let fraction = model.density_fraction_at_epoch(mass_g, Epoch::Today)?;
        Ok(Some(c.dark_matter_share_today() / fraction))
    }
}
