// ─────────────────────────────────────────────────────────────────────
// SCPN Beta-PBH — Evolution Model
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! PBH formation, dilution and evaporation for one reheating scenario.
//!
//! A PBH of mass M forms when the horizon mass is M/γ, i.e. at
//! `H_f = γ·4π M_P² / M` and `ρ_f = 3 M_P² H_f²`. Its share of the total
//! density per unit beta is then carried through the early history to the
//! end of the evolution window and through the late universe to today.
//! All amplification factors are kept as logarithms.
//!
//! Records are cached per mass. The cache is write-once: concurrent first
//! evaluations of the same mass compute identical values and the first
//! insert wins.

use crate::cosmology::{EarlyHistory, LateUniverse};
use pbh_math::ode::OdeConfig;
use pbh_math::quadrature::QuadConfig;
use pbh_math::roots::RootConfig;
use pbh_types::config::{MatchingStrategy, NumericsConfig};
use pbh_types::constants::PhysicalConstants;
use pbh_types::error::{PbhError, PbhResult};
use pbh_types::state::{EvolutionRecord, ReheatingScenario};
use std::collections::HashMap;
use std::f64::consts::PI;
use std::sync::RwLock;

/// Redshift at which reionization completes.
pub const REIONIZATION_REDSHIFT: f64 = 6.0;

/// Reference epochs for density fractions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Epoch {
    EvolutionEnd,
    Bbn,
    Recombination,
    Reionization,
    Today,
}

/// t_pl (M / M_pl)³ [s].
pub fn evaporation_time(mass_g: f64, constants: &PhysicalConstants) -> f64 {
    constants.planck_time_s * (mass_g / constants.planck_mass_g).powi(3)
}

/// Initial mass [g] whose evaporation time is `tau_s`.
pub fn mass_with_lifetime(tau_s: f64, constants: &PhysicalConstants) -> f64 {
    constants.planck_mass_g * (tau_s / constants.planck_time_s).cbrt()
}

/// Remaining mass fraction `(1 − t/τ)^{1/3}`, never below one Planck mass.
pub fn remaining_mass_fraction(mass_g: f64, time_s: f64, tau_s: f64, planck_mass_g: f64) -> f64 {
    let floor = (planck_mass_g / mass_g).min(1.0);
    let left = (1.0 - time_s / tau_s).max(0.0);
    left.cbrt().max(floor)
}

pub struct EvolutionModel<'a> {
    constants: &'a PhysicalConstants,
    scenario: ReheatingScenario,
    numerics: NumericsConfig,
    early: EarlyHistory,
    late: LateUniverse,
    ln_density_end: f64,
    cache: RwLock<HashMap<u64, EvolutionRecord>>,
}

impl<'a> EvolutionModel<'a> {
    pub fn new(
        constants: &'a PhysicalConstants,
        scenario: ReheatingScenario,
        matching: MatchingStrategy,
        numerics: NumericsConfig,
    ) -> PbhResult<Self> {
        numerics.validate()?;
        let early = EarlyHistory::new(constants, &scenario, matching)?;
        let ln_density_end = constants.density_evolution_end_gev4().ln();
        // The late universe is pure radiation from the window's end onward.
        if early.ln_density_radiation_onset() <= ln_density_end {
            return Err(PbhError::InvalidParameter(format!(
                "scenario {scenario} is not radiation dominated by the end of the evolution window"
            )));
        }
        Ok(EvolutionModel {
            constants,
            scenario,
            numerics,
            early,
            late: LateUniverse::new(constants),
            ln_density_end,
            cache: RwLock::new(HashMap::new()),
        })
    }

    pub fn constants(&self) -> &'a PhysicalConstants {
        self.constants
    }

    pub fn scenario(&self) -> &ReheatingScenario {
        &self.scenario
    }

    pub fn early(&self) -> &EarlyHistory {
        &self.early
    }

    pub fn late(&self) -> &LateUniverse {
        &self.late
    }

    pub fn ln_density_end(&self) -> f64 {
        self.ln_density_end
    }

    pub fn root_config(&self) -> RootConfig {
        RootConfig {
            tolerance: self.numerics.root_tolerance,
            max_iterations: self.numerics.root_max_iterations,
        }
    }

    pub fn quad_config(&self) -> QuadConfig {
        QuadConfig {
            rel_tolerance: self.numerics.quad_rel_tolerance,
            abs_tolerance: 0.0,
            max_subdivisions: self.numerics.quad_max_subdivisions,
        }
    }

    pub fn ode_config(&self) -> OdeConfig {
        OdeConfig {
            rel_tolerance: self.numerics.ode_rel_tolerance,
            max_steps: self.numerics.ode_max_steps,
            ..OdeConfig::default()
        }
    }

    fn check_mass(mass_g: f64) -> PbhResult<()> {
        if !mass_g.is_finite() || mass_g <= 0.0 {
            return Err(PbhError::InvalidParameter(format!(
                "mass must be finite and > 0, got {mass_g}"
            )));
        }
        Ok(())
    }

    /// ln ρ_f [ln GeV⁴] for a PBH of `mass_g` grams.
    pub fn ln_density_at_formation(&self, mass_g: f64) -> PbhResult<f64> {
        Self::check_mass(mass_g)?;
        let c = self.constants;
        let m_p = c.reduced_planck_mass_gev;
        let mass_gev = mass_g * c.gev_per_gram;
        let ln_hubble = (c.collapse_efficiency * 4.0 * PI * m_p * m_p).ln() - mass_gev.ln();
        Ok(3f64.ln() + 2.0 * m_p.ln() + 2.0 * ln_hubble)
    }

    /// Total energy density at formation [GeV⁴].
    pub fn density_at_formation(&self, mass_g: f64) -> PbhResult<f64> {
        Ok(self.ln_density_at_formation(mass_g)?.exp())
    }

    /// ln(a_end / a_f).
    pub fn ln_scale_factor_ratio(&self, mass_g: f64) -> PbhResult<f64> {
        let ln_rho_f = self.ln_density_at_formation(mass_g)?;
        if ln_rho_f > self.early.ln_density_inflation() {
            return Err(PbhError::OutsideDomain(format!(
                "{mass_g:e} g forms before the end of inflation"
            )));
        }
        if ln_rho_f <= self.ln_density_end {
            return Err(PbhError::OutsideDomain(format!(
                "{mass_g:e} g forms after the evolution window closes"
            )));
        }
        if self.scenario.is_instantaneous() {
            return Ok((ln_rho_f - self.ln_density_end) / 4.0);
        }
        let root = self.root_config();
        let x_f = self.early.efolds_at_density(ln_rho_f, root)?;
        let x_end = self.early.efolds_at_density(self.ln_density_end, root)?;
        Ok(x_end - x_f)
    }

    /// a_end / a_f.
    pub fn scale_factor_ratio(&self, mass_g: f64) -> PbhResult<f64> {
        Ok(self.ln_scale_factor_ratio(mass_g)?.exp())
    }

    /// Evaporation time [s].
    pub fn evaporation_time(&self, mass_g: f64) -> f64 {
        evaporation_time(mass_g, self.constants)
    }

    pub fn remaining_mass_fraction(&self, mass_g: f64, time_s: f64) -> f64 {
        remaining_mass_fraction(
            mass_g,
            time_s,
            self.evaporation_time(mass_g),
            self.constants.planck_mass_g,
        )
    }

    /// Cached background record for `mass_g`.
    pub fn record(&self, mass_g: f64) -> PbhResult<EvolutionRecord> {
        let key = mass_g.to_bits();
        {
            let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
            if let Some(rec) = cache.get(&key) {
                return Ok(*rec);
            }
        }
        let rec = self.compute_record(mass_g)?;
        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        Ok(*cache.entry(key).or_insert(rec))
    }

    pub fn cached_records(&self) -> usize {
        self.cache.read().map(|c| c.len()).unwrap_or(0)
    }

    fn compute_record(&self, mass_g: f64) -> PbhResult<EvolutionRecord> {
        let ln_rho_f = self.ln_density_at_formation(mass_g)?;
        let ln_ratio = self.ln_scale_factor_ratio(mass_g)?;
        Ok(EvolutionRecord {
            mass_g,
            ln_density_formation: ln_rho_f,
            ln_scale_factor_ratio: ln_ratio,
            evaporation_time_s: self.evaporation_time(mass_g),
            ln_fraction_end: ln_rho_f - self.ln_density_end - 3.0 * ln_ratio,
            formed_in_reheating: !self.scenario.is_instantaneous()
                && ln_rho_f > self.early.ln_density_reheating(),
        })
    }

    /// ln of the PBH density fraction per unit beta at a late time `t`,
    /// without mass loss.
    pub fn ln_fraction_at_time(&self, record: &EvolutionRecord, time_s: f64) -> PbhResult<f64> {
        let t_end = self.late.time_end();
        if time_s < t_end * (1.0 - 1e-12) {
            return Err(PbhError::OutsideDomain(format!(
                "t = {time_s:e} s precedes the end of the evolution window ({t_end:e} s)"
            )));
        }
        let y = self.late.y_at_time(time_s.max(t_end), self.root_config())?;
        Ok(self.ln_fraction_at_y(record, y))
    }

    /// Same as `ln_fraction_at_time` with a/a_eq given directly.
    pub fn ln_fraction_at_y(&self, record: &EvolutionRecord, y: f64) -> f64 {
        record.ln_fraction_end + self.late.ln_fraction_growth(y)
    }

    pub fn epoch_time(&self, epoch: Epoch) -> f64 {
        match epoch {
            Epoch::EvolutionEnd => self.late.time_end(),
            Epoch::Bbn => self.constants.bbn_onset_s,
            Epoch::Recombination => self
                .late
                .time_at_redshift(self.constants.redshift_recombination),
            Epoch::Reionization => self.late.time_at_redshift(REIONIZATION_REDSHIFT),
            Epoch::Today => self.constants.age_of_universe_s,
        }
    }

    /// PBH fraction of the total density per unit beta at `epoch`,
    /// including mass loss.
    pub fn density_fraction_at_epoch(&self, mass_g: f64, epoch: Epoch) -> PbhResult<f64> {
        let rec = self.record(mass_g)?;
        let ln_frac = match epoch {
            Epoch::EvolutionEnd => rec.ln_fraction_end,
            Epoch::Today => self.ln_fraction_at_y(&rec, self.late.y_today()),
            other => self.ln_fraction_at_time(&rec, self.epoch_time(other))?,
        };
        let s = self.remaining_mass_fraction(mass_g, self.epoch_time(epoch));
        Ok(ln_frac.exp() * s)
    }
}
