// ─────────────────────────────────────────────────────────────────────
// SCPN Beta-PBH — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Physical and cosmological constants.
//!
//! Natural units (GeV) for densities and rates, grams for PBH masses,
//! seconds for cosmic time. The `PhysicalConstants` set is loaded once and
//! shared read-only; the `pub const` items are fixed conversion factors that
//! are never overridden.

use crate::error::{PbhError, PbhResult};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::sync::OnceLock;

/// H_0 / h in GeV (100 km/s/Mpc × ħ).
pub const HUBBLE_100_GEV: f64 = 2.1332e-42;

/// Default lower edge of the mass grid [g].
pub const DEFAULT_MASS_MIN_G: f64 = 1.0;

/// Default upper edge of the mass grid [g].
pub const DEFAULT_MASS_MAX_G: f64 = 1.0e20;

/// Radiation density prefactor π²/30 in ρ = (π²/30) g* T⁴.
pub const RADIATION_DENSITY_PREFACTOR: f64 = PI * PI / 30.0;

/// Equation of state of a relativistic fluid.
pub const EOS_RADIATION: f64 = 1.0 / 3.0;

/// Named cosmological inputs. Immutable after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalConstants {
    pub planck_mass_g: f64,
    pub planck_time_s: f64,
    pub reduced_planck_mass_gev: f64,
    pub gev_per_gram: f64,
    pub seconds_per_inverse_gev: f64,
    /// γ: fraction of the horizon mass that collapses into the PBH.
    pub collapse_efficiency: f64,
    pub hubble_end_of_inflation_gev: f64,
    pub hubble_parameter_h: f64,
    pub omega_radiation: f64,
    pub omega_matter: f64,
    pub omega_dark_matter: f64,
    pub age_of_universe_s: f64,
    pub redshift_recombination: f64,
    pub g_star_reheating: f64,
    pub g_star_evolution_end: f64,
    /// Temperature at which the early evolution window closes [GeV].
    pub temperature_evolution_end_gev: f64,
    /// Hawking temperature times mass, T_H·M [GeV·g].
    pub hawking_temperature_gev_g: f64,
    pub bbn_onset_s: f64,
}

static STANDARD: OnceLock<PhysicalConstants> = OnceLock::new();

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            planck_mass_g: 2.176434e-5,
            planck_time_s: 5.391247e-44,
            reduced_planck_mass_gev: 2.435e18,
            gev_per_gram: 5.60959e23,
            seconds_per_inverse_gev: 6.582120e-25,
            collapse_efficiency: 0.2,
            hubble_end_of_inflation_gev: 5.0e13,
            hubble_parameter_h: 0.674,
            omega_radiation: 9.14e-5,
            omega_matter: 0.315,
            omega_dark_matter: 0.264,
            age_of_universe_s: 4.35e17,
            redshift_recombination: 1090.0,
            g_star_reheating: 106.75,
            g_star_evolution_end: 10.75,
            temperature_evolution_end_gev: 0.01,
            hawking_temperature_gev_g: 1.058e13,
            bbn_onset_s: 1.0,
        }
    }
}

impl PhysicalConstants {
    /// Process-wide standard set, built on first use.
    pub fn standard() -> &'static PhysicalConstants {
        STANDARD.get_or_init(PhysicalConstants::default)
    }

    /// Load a full constant set from JSON. Corrupt values are fatal.
    pub fn from_file(path: &str) -> PbhResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let constants: Self = serde_json::from_str(&contents)?;
        constants.validate()?;
        Ok(constants)
    }

    /// Full name → value mapping.
    pub fn entries(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("planck_mass_g", self.planck_mass_g),
            ("planck_time_s", self.planck_time_s),
            ("reduced_planck_mass_gev", self.reduced_planck_mass_gev),
            ("gev_per_gram", self.gev_per_gram),
            ("seconds_per_inverse_gev", self.seconds_per_inverse_gev),
            ("collapse_efficiency", self.collapse_efficiency),
            (
                "hubble_end_of_inflation_gev",
                self.hubble_end_of_inflation_gev,
            ),
            ("hubble_parameter_h", self.hubble_parameter_h),
            ("omega_radiation", self.omega_radiation),
            ("omega_matter", self.omega_matter),
            ("omega_dark_matter", self.omega_dark_matter),
            ("age_of_universe_s", self.age_of_universe_s),
            ("redshift_recombination", self.redshift_recombination),
            ("g_star_reheating", self.g_star_reheating),
            ("g_star_evolution_end", self.g_star_evolution_end),
            (
                "temperature_evolution_end_gev",
                self.temperature_evolution_end_gev,
            ),
            ("hawking_temperature_gev_g", self.hawking_temperature_gev_g),
            ("bbn_onset_s", self.bbn_onset_s),
        ]
    }

    /// Look up a constant by name.
    pub fn get(&self, name: &str) -> PbhResult<f64> {
        self.entries()
            .into_iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
            .ok_or_else(|| PbhError::ConfigError(format!("unknown constant '{name}'")))
    }

    /// Every entry must be finite and strictly positive.
    pub fn validate(&self) -> PbhResult<()> {
        for (name, value) in self.entries() {
            if !value.is_finite() || value <= 0.0 {
                return Err(PbhError::CorruptConstant {
                    name: name.to_string(),
                    value,
                });
            }
        }
        if self.omega_dark_matter > self.omega_matter {
            return Err(PbhError::CorruptConstant {
                name: "omega_dark_matter".to_string(),
                value: self.omega_dark_matter,
            });
        }
        Ok(())
    }

    /// Hubble rate today [GeV].
    pub fn hubble_today_gev(&self) -> f64 {
        self.hubble_parameter_h * HUBBLE_100_GEV
    }

    /// ρ_c = 3 M_P² H_0² [GeV⁴].
    pub fn critical_density_gev4(&self) -> f64 {
        let h0 = self.hubble_today_gev();
        3.0 * self.reduced_planck_mass_gev.powi(2) * h0 * h0
    }

    pub fn radiation_density_today_gev4(&self) -> f64 {
        self.omega_radiation * self.critical_density_gev4()
    }

    /// z_eq from Ω_m / Ω_r.
    pub fn redshift_equality(&self) -> f64 {
        self.omega_matter / self.omega_radiation - 1.0
    }

    /// Radiation density at matter-radiation equality [GeV⁴].
    pub fn radiation_density_equality_gev4(&self) -> f64 {
        self.radiation_density_today_gev4() * (1.0 + self.redshift_equality()).powi(4)
    }

    /// ρ_inf = 3 M_P² H_end² [GeV⁴].
    pub fn density_end_of_inflation_gev4(&self) -> f64 {
        3.0 * self.reduced_planck_mass_gev.powi(2) * self.hubble_end_of_inflation_gev.powi(2)
    }

    /// Density at which the early evolution window closes [GeV⁴].
    pub fn density_evolution_end_gev4(&self) -> f64 {
        radiation_density(
            self.g_star_evolution_end,
            self.temperature_evolution_end_gev,
        )
    }

    /// Present dark-matter share of the total (matter + radiation) density.
    pub fn dark_matter_share_today(&self) -> f64 {
        self.omega_dark_matter / (self.omega_matter + self.omega_radiation)
    }
}

/// ρ = (π²/30) g* T⁴ [GeV⁴].
pub fn radiation_density(g_star: f64, temperature_gev: f64) -> f64 {
    RADIATION_DENSITY_PREFACTOR * g_star * temperature_gev.powi(4)
}
