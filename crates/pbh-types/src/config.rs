// ─────────────────────────────────────────────────────────────────────
// SCPN Beta-PBH — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::constants::{DEFAULT_MASS_MAX_G, DEFAULT_MASS_MIN_G};
use crate::error::{PbhError, PbhResult};
use crate::state::ReheatingScenario;
use serde::{Deserialize, Serialize};

/// Top-level session configuration.
/// Every section is optional in JSON and falls back to its default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub grid: GridConfig,
    /// Scenarios evaluated by a configuration-driven sweep.
    #[serde(default)]
    pub scenarios: Vec<ReheatingScenario>,
    #[serde(default)]
    pub matching: MatchingStrategy,
    #[serde(default)]
    pub numerics: NumericsConfig,
    /// Map grid points with rayon instead of serially.
    #[serde(default)]
    pub parallel: bool,
}

/// Logarithmic mass grid parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Step in log10(mass) (default: 0.1)
    #[serde(default = "default_delta_log10")]
    pub delta_log10: f64,
    /// Lower edge [g] (default: 1)
    #[serde(default = "default_mass_min")]
    pub mass_min_g: f64,
    /// Upper edge [g] (default: 1e20)
    #[serde(default = "default_mass_max")]
    pub mass_max_g: f64,
}

fn default_delta_log10() -> f64 {
    0.1
}
fn default_mass_min() -> f64 {
    DEFAULT_MASS_MIN_G
}
fn default_mass_max() -> f64 {
    DEFAULT_MASS_MAX_G
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            delta_log10: default_delta_log10(),
            mass_min_g: default_mass_min(),
            mass_max_g: default_mass_max(),
        }
    }
}

/// Tolerances and iteration caps shared by every bounded numerical loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericsConfig {
    #[serde(default = "default_root_tolerance")]
    pub root_tolerance: f64,
    #[serde(default = "default_root_max_iterations")]
    pub root_max_iterations: usize,
    #[serde(default = "default_quad_rel_tolerance")]
    pub quad_rel_tolerance: f64,
    #[serde(default = "default_quad_max_subdivisions")]
    pub quad_max_subdivisions: usize,
    #[serde(default = "default_ode_rel_tolerance")]
    pub ode_rel_tolerance: f64,
    #[serde(default = "default_ode_max_steps")]
    pub ode_max_steps: usize,
}

fn default_root_tolerance() -> f64 {
    1e-12
}
fn default_root_max_iterations() -> usize {
    200
}
fn default_quad_rel_tolerance() -> f64 {
    1e-8
}
fn default_quad_max_subdivisions() -> usize {
    200
}
fn default_ode_rel_tolerance() -> f64 {
    1e-8
}
fn default_ode_max_steps() -> usize {
    100_000
}

impl Default for NumericsConfig {
    fn default() -> Self {
        NumericsConfig {
            root_tolerance: default_root_tolerance(),
            root_max_iterations: default_root_max_iterations(),
            quad_rel_tolerance: default_quad_rel_tolerance(),
            quad_max_subdivisions: default_quad_max_subdivisions(),
            ode_rel_tolerance: default_ode_rel_tolerance(),
            ode_max_steps: default_ode_max_steps(),
        }
    }
}

impl NumericsConfig {
    pub fn validate(&self) -> PbhResult<()> {
        let tolerances = [
            ("root_tolerance", self.root_tolerance),
            ("quad_rel_tolerance", self.quad_rel_tolerance),
            ("ode_rel_tolerance", self.ode_rel_tolerance),
        ];
        for (name, tol) in tolerances {
            if !tol.is_finite() || tol <= 0.0 || tol >= 1.0 {
                return Err(PbhError::ConfigError(format!(
                    "numerics.{name} must be finite and in (0, 1), got {tol}"
                )));
            }
        }
        let caps = [
            ("root_max_iterations", self.root_max_iterations),
            ("quad_max_subdivisions", self.quad_max_subdivisions),
            ("ode_max_steps", self.ode_max_steps),
        ];
        for (name, cap) in caps {
            if cap == 0 {
                return Err(PbhError::ConfigError(format!("numerics.{name} must be >= 1")));
            }
        }
        Ok(())
    }
}

/// How an extended reheating era with equation of state `w` hands over to
/// radiation domination after `N` e-folds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchingStrategy {
    /// Piecewise equation of state, instantaneous switch at x = N.
    Sudden,
    /// Logistic blend of `w` into 1/3 centred on x = N.
    Smooth { width_efolds: f64 },
}

impl Default for MatchingStrategy {
    fn default() -> Self {
        MatchingStrategy::Smooth { width_efolds: 0.5 }
    }
}

impl MatchingStrategy {
    pub fn validate(&self) -> PbhResult<()> {
        match *self {
            MatchingStrategy::Sudden => Ok(()),
            MatchingStrategy::Smooth { width_efolds } => {
                if !width_efolds.is_finite() || width_efolds <= 0.0 {
                    return Err(PbhError::ConfigError(format!(
                        "matching.width_efolds must be finite and > 0, got {width_efolds}"
                    )));
                }
                Ok(())
            }
        }
    }
}

impl SessionConfig {
    /// Load from JSON file and validate every section.
    pub fn from_file(path: &str) -> PbhResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> PbhResult<()> {
        let g = &self.grid;
        if !g.delta_log10.is_finite() || g.delta_log10 <= 0.0 {
            return Err(PbhError::ConfigError(format!(
                "grid.delta_log10 must be finite and > 0, got {}",
                g.delta_log10
            )));
        }
        if !(g.mass_min_g.is_finite() && g.mass_max_g.is_finite())
            || g.mass_min_g <= 0.0
            || g.mass_min_g >= g.mass_max_g
        {
            return Err(PbhError::ConfigError(format!(
                "grid mass range must satisfy 0 < min < max, got [{}, {}]",
                g.mass_min_g, g.mass_max_g
            )));
        }
        self.matching.validate()?;
        self.numerics.validate()
    }
}
