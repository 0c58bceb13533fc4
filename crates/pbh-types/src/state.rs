// ─────────────────────────────────────────────────────────────────────
// SCPN Beta-PBH — State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::constants::{radiation_density, PhysicalConstants, EOS_RADIATION};
use crate::error::{PbhError, PbhResult};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Logarithmically spaced PBH masses [g].
/// Strictly increasing, positive, duplicate-free.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MassGrid {
    masses: Array1<f64>,
    delta_log10: f64,
}

impl MassGrid {
    /// Wrap precomputed masses, checking ordering and positivity.
    pub fn try_new(masses: Array1<f64>, delta_log10: f64) -> PbhResult<Self> {
        if masses.is_empty() {
            return Err(PbhError::InvalidParameter("mass grid is empty".to_string()));
        }
        if let Some(bad) = masses.iter().find(|m| !m.is_finite() || **m <= 0.0) {
            return Err(PbhError::InvalidParameter(format!(
                "mass grid entries must be finite and > 0, got {bad}"
            )));
        }
        for (i, pair) in masses.windows(2).into_iter().enumerate() {
            if pair[1] <= pair[0] {
                return Err(PbhError::InvalidParameter(format!(
                    "mass grid not strictly increasing at index {}: {} -> {}",
                    i + 1,
                    pair[0],
                    pair[1]
                )));
            }
        }
        Ok(MassGrid {
            masses,
            delta_log10,
        })
    }

    pub fn masses(&self) -> &Array1<f64> {
        &self.masses
    }

    pub fn delta_log10(&self) -> f64 {
        self.delta_log10
    }

    pub fn len(&self) -> usize {
        self.masses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masses.is_empty()
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.masses.to_vec()
    }

    /// Index of the grid point closest to `mass` in log space.
    pub fn nearest_index(&self, mass: f64) -> usize {
        let target = mass.log10();
        let mut best = 0;
        let mut best_dist = f64::INFINITY;
        for (i, m) in self.masses.iter().enumerate() {
            let dist = (m.log10() - target).abs();
            if dist < best_dist {
                best = i;
                best_dist = dist;
            }
        }
        best
    }
}

/// Post-inflationary history: `efolds` of expansion with equation of state
/// `eos` before radiation domination. `efolds = 0` is instantaneous reheating.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ScenarioParams", into = "ScenarioParams")]
pub struct ReheatingScenario {
    efolds: f64,
    eos: f64,
}

#[derive(Serialize, Deserialize)]
struct ScenarioParams {
    efolds: f64,
    eos: f64,
}

impl TryFrom<ScenarioParams> for ReheatingScenario {
    type Error = PbhError;

    fn try_from(p: ScenarioParams) -> PbhResult<Self> {
        ReheatingScenario::new(p.efolds, p.eos)
    }
}

impl From<ReheatingScenario> for ScenarioParams {
    fn from(s: ReheatingScenario) -> Self {
        ScenarioParams {
            efolds: s.efolds,
            eos: s.eos,
        }
    }
}

impl ReheatingScenario {
    pub fn new(efolds: f64, eos: f64) -> PbhResult<Self> {
        if !efolds.is_finite() || efolds < 0.0 {
            return Err(PbhError::InvalidParameter(format!(
                "efolds must be finite and >= 0, got {efolds}"
            )));
        }
        if !eos.is_finite() {
            return Err(PbhError::InvalidParameter(format!(
                "eos must be finite, got {eos}"
            )));
        }
        if efolds > 0.0 {
            if eos <= -1.0 || eos > 1.0 {
                return Err(PbhError::InvalidParameter(format!(
                    "eos must lie in (-1, 1], got {eos}"
                )));
            }
            if (eos - EOS_RADIATION).abs() < 1e-12 {
                return Err(PbhError::InvalidParameter(
                    "eos = 1/3 with efolds > 0 is indistinguishable from radiation".to_string(),
                ));
            }
        }
        Ok(ReheatingScenario { efolds, eos })
    }

    /// Instantaneous reheating: pure radiation domination.
    pub fn instantaneous() -> Self {
        ReheatingScenario {
            efolds: 0.0,
            eos: 0.0,
        }
    }

    /// Early matter domination (w = 0) lasting `efolds` e-folds.
    pub fn with_efolds(efolds: f64) -> PbhResult<Self> {
        Self::new(efolds, 0.0)
    }

    /// Duration fixed by the reheating temperature:
    /// ρ_inf e^{-3(1+w)N} = (π²/30) g* T_rh⁴.
    pub fn from_reheating_temperature(
        temperature_gev: f64,
        eos: f64,
        constants: &PhysicalConstants,
    ) -> PbhResult<Self> {
        if !temperature_gev.is_finite() || temperature_gev <= 0.0 {
            return Err(PbhError::InvalidParameter(format!(
                "reheating temperature must be finite and > 0, got {temperature_gev}"
            )));
        }
        if !eos.is_finite() || eos <= -1.0 || eos > 1.0 {
            return Err(PbhError::InvalidParameter(format!(
                "eos must lie in (-1, 1], got {eos}"
            )));
        }
        let ln_rho_inf = constants.density_end_of_inflation_gev4().ln();
        let ln_rho_rh = radiation_density(constants.g_star_reheating, temperature_gev).ln();
        if ln_rho_rh > ln_rho_inf {
            return Err(PbhError::InvalidParameter(format!(
                "reheating temperature {temperature_gev:e} GeV exceeds the inflation scale"
            )));
        }
        let efolds = (ln_rho_inf - ln_rho_rh) / (3.0 * (1.0 + eos));
        Self::new(efolds, eos)
    }

    pub fn efolds(&self) -> f64 {
        self.efolds
    }

    pub fn eos(&self) -> f64 {
        self.eos
    }

    pub fn is_instantaneous(&self) -> bool {
        self.efolds == 0.0
    }
}

impl fmt::Display for ReheatingScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_instantaneous() {
            write!(f, "instantaneous")
        } else {
            write!(f, "N={} w={}", self.efolds, self.eos)
        }
    }
}

/// Observational constraint families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ChannelKind {
    #[serde(rename = "DM")]
    Dm,
    #[serde(rename = "BBN")]
    Bbn,
    #[serde(rename = "SD")]
    Sd,
    #[serde(rename = "CMB_AN")]
    CmbAnisotropy,
    #[serde(rename = "GRB")]
    Grb,
    #[serde(rename = "Reio")]
    Reionization,
    #[serde(rename = "LSP")]
    Lsp,
}

impl ChannelKind {
    pub const ALL: [ChannelKind; 7] = [
        ChannelKind::Dm,
        ChannelKind::Bbn,
        ChannelKind::Sd,
        ChannelKind::CmbAnisotropy,
        ChannelKind::Grb,
        ChannelKind::Reionization,
        ChannelKind::Lsp,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ChannelKind::Dm => "DM",
            ChannelKind::Bbn => "BBN",
            ChannelKind::Sd => "SD",
            ChannelKind::CmbAnisotropy => "CMB_AN",
            ChannelKind::Grb => "GRB",
            ChannelKind::Reionization => "Reio",
            ChannelKind::Lsp => "LSP",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Upper bound on beta at one mass. Undefined values stay in place so
/// curves remain aligned with the grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "beta", rename_all = "snake_case")]
pub enum BetaBound {
    Defined(f64),
    OutsideDomain,
    NotConverged,
}

impl BetaBound {
    pub fn value(&self) -> Option<f64> {
        match *self {
            BetaBound::Defined(beta) => Some(beta),
            _ => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, BetaBound::Defined(_))
    }

    /// Dense representation: NaN for undefined points.
    pub fn to_f64(&self) -> f64 {
        self.value().unwrap_or(f64::NAN)
    }
}

/// Beta bound of one channel over the mass grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetaCurve {
    pub channel: ChannelKind,
    pub masses: Vec<f64>,
    pub bounds: Vec<BetaBound>,
}

impl BetaCurve {
    pub fn new(channel: ChannelKind, masses: Vec<f64>, bounds: Vec<BetaBound>) -> PbhResult<Self> {
        if masses.len() != bounds.len() {
            return Err(PbhError::InvalidParameter(format!(
                "{channel} curve: {} masses but {} bounds",
                masses.len(),
                bounds.len()
            )));
        }
        Ok(BetaCurve {
            channel,
            masses,
            bounds,
        })
    }

    pub fn len(&self) -> usize {
        self.masses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masses.is_empty()
    }

    pub fn defined_count(&self) -> usize {
        self.bounds.iter().filter(|b| b.is_defined()).count()
    }

    /// (mass, beta) pairs of the defined points only.
    pub fn defined_points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.masses
            .iter()
            .zip(&self.bounds)
            .filter_map(|(&m, b)| b.value().map(|beta| (m, beta)))
    }
}

/// Per-mass minimum over all channels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateEnvelope {
    pub masses: Vec<f64>,
    pub bounds: Vec<BetaBound>,
    pub dominant: Vec<Option<ChannelKind>>,
    pub channels: Vec<BetaCurve>,
}

impl AggregateEnvelope {
    pub fn len(&self) -> usize {
        self.masses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masses.is_empty()
    }

    pub fn curve(&self, kind: ChannelKind) -> Option<&BetaCurve> {
        self.channels.iter().find(|c| c.channel == kind)
    }
}

/// One scenario of a sweep and its envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepEntry {
    pub scenario: ReheatingScenario,
    pub envelope: AggregateEnvelope,
}

/// Background quantities for one (mass, scenario) pair, up to the end of the
/// early evolution window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvolutionRecord {
    pub mass_g: f64,
    /// ln ρ at formation [ln GeV⁴].
    pub ln_density_formation: f64,
    /// ln(a_end / a_formation).
    pub ln_scale_factor_ratio: f64,
    pub evaporation_time_s: f64,
    /// ln of the PBH density fraction per unit beta at the window end,
    /// without mass loss.
    pub ln_fraction_end: f64,
    /// Formed while the non-radiation era was still running.
    pub formed_in_reheating: bool,
}
