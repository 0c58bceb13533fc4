// ─────────────────────────────────────────────────────────────────────
// SCPN Beta-PBH — Session
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Session: the public entry points.
//!
//! A session owns the mass grid and the configuration. Each call builds a
//! fresh `EvolutionModel` for the requested scenario, so record caches are
//! never shared between scenarios.

use crate::aggregate::combine;
use crate::backreaction::{backreaction_fraction, BackReaction};
use crate::channels::{all_channels, channel_for, ConstraintChannel};
use crate::evolution::EvolutionModel;
use crate::grid::build_mass_grid;
use pbh_types::config::SessionConfig;
use pbh_types::constants::PhysicalConstants;
use pbh_types::error::PbhResult;
use pbh_types::state::{
    AggregateEnvelope, BetaBound, BetaCurve, ChannelKind, MassGrid, ReheatingScenario, SweepEntry,
};
use rayon::prelude::*;
use tracing::{debug, info, warn};

pub struct Session<'a> {
    config: SessionConfig,
    constants: &'a PhysicalConstants,
    grid: MassGrid,
}

impl Session<'static> {
    /// Session on the standard constant set.
    pub fn new(config: SessionConfig) -> PbhResult<Self> {
        Self::with_constants(config, PhysicalConstants::standard())
    }

    /// Load the configuration from a JSON file.
    pub fn from_file(path: &str) -> PbhResult<Self> {
        Self::new(SessionConfig::from_file(path)?)
    }
}

impl<'a> Session<'a> {
    pub fn with_constants(config: SessionConfig, constants: &'a PhysicalConstants) -> PbhResult<Self> {
        config.validate()?;
        constants.validate()?;
        let grid = build_mass_grid(
            config.grid.delta_log10,
            config.grid.mass_min_g,
            config.grid.mass_max_g,
        )?;
        info!(
            points = grid.len(),
            delta_log10 = grid.delta_log10(),
            parallel = config.parallel,
            "session ready"
        );
        Ok(Session {
            config,
            constants,
            grid,
        })
    }

    pub fn grid(&self) -> &MassGrid {
        &self.grid
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn constants(&self) -> &'a PhysicalConstants {
        self.constants
    }

    /// Rebuild the grid at a new resolution over the configured range.
    ///
    /// On error the previous grid is kept.
    pub fn put_m_array(&mut self, delta_log10: f64) -> PbhResult<&MassGrid> {
        self.grid = build_mass_grid(
            delta_log10,
            self.config.grid.mass_min_g,
            self.config.grid.mass_max_g,
        )?;
        self.config.grid.delta_log10 = delta_log10;
        debug!(points = self.grid.len(), delta_log10, "grid rebuilt");
        Ok(&self.grid)
    }

    /// Evolution model for one scenario with the session's numerics.
    pub fn model(&self, scenario: ReheatingScenario) -> PbhResult<EvolutionModel<'a>> {
        EvolutionModel::new(
            self.constants,
            scenario,
            self.config.matching,
            self.config.numerics.clone(),
        )
    }

    pub fn betas_dm(&self, scenario: ReheatingScenario) -> PbhResult<BetaCurve> {
        self.channel_curve(ChannelKind::Dm, scenario)
    }

    pub fn betas_bbn(&self, scenario: ReheatingScenario) -> PbhResult<BetaCurve> {
        self.channel_curve(ChannelKind::Bbn, scenario)
    }

    pub fn betas_sd(&self, scenario: ReheatingScenario) -> PbhResult<BetaCurve> {
        self.channel_curve(ChannelKind::Sd, scenario)
    }

    pub fn betas_cmb_an(&self, scenario: ReheatingScenario) -> PbhResult<BetaCurve> {
        self.channel_curve(ChannelKind::CmbAnisotropy, scenario)
    }

    pub fn betas_grb(&self, scenario: ReheatingScenario) -> PbhResult<BetaCurve> {
        self.channel_curve(ChannelKind::Grb, scenario)
    }

    pub fn betas_reio(&self, scenario: ReheatingScenario) -> PbhResult<BetaCurve> {
        self.channel_curve(ChannelKind::Reionization, scenario)
    }

    pub fn betas_lsp(&self, scenario: ReheatingScenario) -> PbhResult<BetaCurve> {
        self.channel_curve(ChannelKind::Lsp, scenario)
    }

    /// One channel over the whole grid.
    pub fn channel_curve(&self, kind: ChannelKind, scenario: ReheatingScenario) -> PbhResult<BetaCurve> {
        let model = self.model(scenario)?;
        self.curve_with(channel_for(kind).as_ref(), &model)
    }

    /// All seven channels and their envelope.
    pub fn get_betas_full(&self, scenario: ReheatingScenario) -> PbhResult<AggregateEnvelope> {
        let model = self.model(scenario)?;
        self.envelope_with(&model)
    }

    /// Envelopes for several scenarios, in input order.
    pub fn sweep(&self, scenarios: &[ReheatingScenario]) -> PbhResult<Vec<SweepEntry>> {
        info!(scenarios = scenarios.len(), points = self.grid.len(), "sweep started");
        let mut entries = Vec::with_capacity(scenarios.len());
        for &scenario in scenarios {
            let model = self.model(scenario)?;
            let envelope = self.envelope_with(&model)?;
            info!(
                %scenario,
                defined = envelope.bounds.iter().filter(|b| b.is_defined()).count(),
                cached = model.cached_records(),
                "scenario done"
            );
            entries.push(SweepEntry { scenario, envelope });
        }
        info!(scenarios = entries.len(), "sweep finished");
        Ok(entries)
    }

    /// Sweep over reheating duration at fixed equation of state.
    pub fn sweep_efolds(&self, efolds: &[f64], eos: f64) -> PbhResult<Vec<SweepEntry>> {
        let scenarios = efolds
            .iter()
            .map(|&n| ReheatingScenario::new(n, eos))
            .collect::<PbhResult<Vec<_>>>()?;
        self.sweep(&scenarios)
    }

    /// Sweep over reheating temperature [GeV] at fixed equation of state.
    pub fn sweep_reheating_temperature(&self, temperatures_gev: &[f64], eos: f64) -> PbhResult<Vec<SweepEntry>> {
        let scenarios = temperatures_gev
            .iter()
            .map(|&t| ReheatingScenario::from_reheating_temperature(t, eos, self.constants))
            .collect::<PbhResult<Vec<_>>>()?;
        self.sweep(&scenarios)
    }

    /// Sweep over the equation of state at fixed duration.
    pub fn sweep_eos(&self, eos_values: &[f64], efolds: f64) -> PbhResult<Vec<SweepEntry>> {
        let scenarios = eos_values
            .iter()
            .map(|&w| ReheatingScenario::new(efolds, w))
            .collect::<PbhResult<Vec<_>>>()?;
        self.sweep(&scenarios)
    }

    /// Sweep the scenarios listed in the configuration, or the
    /// instantaneous one if none are listed.
    pub fn run(&self) -> PbhResult<Vec<SweepEntry>> {
        if self.config.scenarios.is_empty() {
            self.sweep(&[ReheatingScenario::instantaneous()])
        } else {
            self.sweep(&self.config.scenarios)
        }
    }

    /// Back-reaction density fraction at the end of the evolution window
    /// for each defined point of `curve`. Bounds above 1 are capped at 1.
    pub fn relic_fractions(
        &self,
        curve: &BetaCurve,
        scenario: ReheatingScenario,
    ) -> PbhResult<Vec<Option<BackReaction>>> {
        let model = self.model(scenario)?;
        let point = |(&mass, bound): (&f64, &BetaBound)| -> PbhResult<Option<BackReaction>> {
            let Some(beta) = bound.value() else {
                return Ok(None);
            };
            if beta <= 0.0 {
                return Ok(None);
            }
            match backreaction_fraction(&model, mass, beta.min(1.0)) {
                Ok(br) => Ok(Some(br)),
                Err(e) if e.is_recoverable() => {
                    warn!(mass_g = mass, error = %e, "back-reaction failed");
                    Ok(None)
                }
                Err(e) => Err(e),
            }
        };
        if self.config.parallel {
            curve
                .masses
                .par_iter()
                .zip(curve.bounds.par_iter())
                .map(point)
                .collect()
        } else {
            curve.masses.iter().zip(curve.bounds.iter()).map(point).collect()
        }
    }

    fn envelope_with(&self, model: &EvolutionModel<'_>) -> PbhResult<AggregateEnvelope> {
        let curves = all_channels()
            .iter()
            .map(|ch| self.curve_with(ch.as_ref(), model))
            .collect::<PbhResult<Vec<_>>>()?;
        combine(curves)
    }

    fn curve_with(&self, channel: &dyn ConstraintChannel, model: &EvolutionModel<'_>) -> PbhResult<BetaCurve> {
        let masses = self.grid.to_vec();
        let bounds: Vec<BetaBound> = if self.config.parallel {
            masses
                .par_iter()
                .map(|&m| channel.evaluate(m, model))
                .collect::<PbhResult<_>>()?
        } else {
            masses
                .iter()
                .map(|&m| channel.evaluate(m, model))
                .collect::<PbhResult<_>>()?
        };

        let failed = bounds.iter().filter(|b| **b == BetaBound::NotConverged).count();
        if failed > 0 {
            warn!(channel = %channel.kind(), points = failed, "no convergence at some masses");
        }
        let curve = BetaCurve::new(channel.kind(), masses, bounds)?;
        debug!(
            channel = %channel.kind(),
            scenario = %model.scenario(),
            defined = curve.defined_count(),
            "curve done"
        );
        Ok(curve)
    }
}
