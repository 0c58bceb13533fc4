// ─────────────────────────────────────────────────────────────────────
// SCPN Beta-PBH — Constraint Channels
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Observational constraints turned into upper bounds on beta.
//!
//! Each channel maps a PBH mass to the largest initial abundance compatible
//! with its observable. Channels share only the Evolution Model and can be
//! evaluated in any order or in parallel.

mod bbn;
mod cmb;
mod dm;
mod grb;
pub mod injection;
mod lsp;
mod reio;
mod sd;

pub use bbn::BbnChannel;
pub use cmb::CmbAnisotropyChannel;
pub use dm::DarkMatterChannel;
pub use grb::GammaRayChannel;
pub use lsp::LspChannel;
pub use reio::ReionizationChannel;
pub use sd::SpectralDistortionChannel;

use crate::evolution::EvolutionModel;
use pbh_types::error::{PbhError, PbhResult};
use pbh_types::state::{BetaBound, ChannelKind};

pub trait ConstraintChannel: Send + Sync {
    fn kind(&self) -> ChannelKind;

    /// Upper bound on beta at `mass_g`, or `None` where the constraint does
    /// not apply.
    fn beta_max(&self, mass_g: f64, model: &EvolutionModel<'_>) -> PbhResult<Option<f64>>;

    /// `beta_max` with per-point failures folded into the bound.
    fn evaluate(&self, mass_g: f64, model: &EvolutionModel<'_>) -> PbhResult<BetaBound> {
        match self.beta_max(mass_g, model) {
            Ok(Some(beta)) if beta.is_finite() && beta >= 0.0 => Ok(BetaBound::Defined(beta)),
            Ok(_) => Ok(BetaBound::OutsideDomain),
            Err(PbhError::OutsideDomain(_)) => Ok(BetaBound::OutsideDomain),
            Err(PbhError::NonConvergence { .. }) | Err(PbhError::NotBracketed { .. }) => {
                Ok(BetaBound::NotConverged)
            }
            Err(e) => Err(e),
        }
    }
}

/// The channel implementing `kind`.
pub fn channel_for(kind: ChannelKind) -> Box<dyn ConstraintChannel> {
    match kind {
        ChannelKind::Dm => Box::new(DarkMatterChannel),
        ChannelKind::Bbn => Box::new(BbnChannel),
        ChannelKind::Sd => Box::new(SpectralDistortionChannel),
        ChannelKind::CmbAnisotropy => Box::new(CmbAnisotropyChannel),
        ChannelKind::Grb => Box::new(GammaRayChannel),
        ChannelKind::Reionization => Box::new(ReionizationChannel),
        ChannelKind::Lsp => Box::new(LspChannel::default()),
    }
}

/// All seven channels in `ChannelKind::ALL` order.
pub fn all_channels() -> Vec<Box<dyn ConstraintChannel>> {
    ChannelKind::ALL.iter().map(|&k| channel_for(k)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evolution::mass_with_lifetime;
    use pbh_types::config::{MatchingStrategy, NumericsConfig};
    use pbh_types::constants::PhysicalConstants;
    use pbh_types::state::ReheatingScenario;

    pub(crate) fn rd_model() -> EvolutionModel<'static> {
        EvolutionModel::new(
            PhysicalConstants::standard(),
            ReheatingScenario::instantaneous(),
            MatchingStrategy::default(),
            NumericsConfig::default(),
        )
        .unwrap()
    }

    /// Masses just inside either end of `range` are bounded, masses just
    /// outside are not.
    pub(crate) fn assert_lifetime_edges(
        channel: &dyn ConstraintChannel,
        range: injection::LifetimeRange,
        model: &EvolutionModel<'_>,
    ) {
        let c = model.constants();
        let lightest = mass_with_lifetime(range.min_s, c);
        let heaviest = mass_with_lifetime(range.max_s, c);
        let kind = channel.kind();
        for (mass, inside) in [
            (0.9 * lightest, false),
            (1.5 * lightest, true),
            (0.8 * heaviest, true),
            (1.1 * heaviest, false),
        ] {
            let bound = channel.evaluate(mass, model).unwrap();
            if inside {
                assert!(bound.is_defined(), "{kind} at {mass:e} g: {bound:?}");
            } else {
                assert_eq!(bound, BetaBound::OutsideDomain, "{kind} at {mass:e} g");
            }
        }
    }

    #[test]
    fn test_all_channels_in_order() {
        let kinds: Vec<ChannelKind> = all_channels().iter().map(|c| c.kind()).collect();
        assert_eq!(kinds, ChannelKind::ALL.to_vec());
    }

    #[test]
    fn test_tiny_mass_classification() {
        let model = rd_model();
        for ch in all_channels() {
            let bound = ch.evaluate(1.0, &model).unwrap();
            match ch.kind() {
                ChannelKind::Lsp => assert!(bound.is_defined(), "LSP undefined at 1 g"),
                _ => assert_eq!(bound, BetaBound::OutsideDomain, "{} at 1 g", ch.kind()),
            }
        }
    }

    #[test]
    fn test_sub_horizon_mass_is_outside_domain() {
        let model = rd_model();
        for ch in all_channels() {
            assert_eq!(ch.evaluate(1e-3, &model).unwrap(), BetaBound::OutsideDomain);
        }
    }

    #[test]
    fn test_invalid_mass_propagates() {
        let model = rd_model();
        for ch in all_channels() {
            assert!(ch.evaluate(-1.0, &model).is_err());
        }
    }
}
