// ─────────────────────────────────────────────────────────────────────
// SCPN Beta-PBH — Cosmological Background
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Background expansion history.
//!
//! `EarlyHistory` covers the end of inflation through reheating in e-folds
//! `x = ln(a / a_inf)`. `LateUniverse` covers radiation + matter from the end
//! of the early evolution window to today in `y = a / a_eq`.

use pbh_math::roots::{newton_safeguarded, RootConfig};
use pbh_math::special::{logistic, softplus};
use pbh_types::config::MatchingStrategy;
use pbh_types::constants::{PhysicalConstants, EOS_RADIATION};
use pbh_types::error::{PbhError, PbhResult};
use pbh_types::state::ReheatingScenario;

/// Slope of ln ρ per e-fold in radiation domination.
const RADIATION_SLOPE: f64 = 3.0 * (1.0 + EOS_RADIATION);

/// Widths past N after which the logistic blend is within 0.25% of
/// radiation.
const RADIATION_ONSET_WIDTHS: f64 = 6.0;

/// ln ρ(x) for a given reheating scenario, starting from ρ_inf at x = 0.
#[derive(Debug, Clone, Copy)]
pub struct EarlyHistory {
    ln_density_inflation: f64,
    efolds: f64,
    eos: f64,
    matching: MatchingStrategy,
}

impl EarlyHistory {
    pub fn new(
        constants: &PhysicalConstants,
        scenario: &ReheatingScenario,
        matching: MatchingStrategy,
    ) -> PbhResult<Self> {
        matching.validate()?;
        Ok(EarlyHistory {
            ln_density_inflation: constants.density_end_of_inflation_gev4().ln(),
            efolds: scenario.efolds(),
            eos: scenario.eos(),
            matching,
        })
    }

    pub fn ln_density_inflation(&self) -> f64 {
        self.ln_density_inflation
    }

    fn early_slope(&self) -> f64 {
        3.0 * (1.0 + self.eos)
    }

    fn is_radiation_only(&self) -> bool {
        self.efolds == 0.0
    }

    /// ln ρ after `x` e-folds.
    pub fn ln_density(&self, x: f64) -> f64 {
        let l0 = self.ln_density_inflation;
        if self.is_radiation_only() {
            return l0 - RADIATION_SLOPE * x;
        }
        let n = self.efolds;
        let s = self.early_slope();
        match self.matching {
            MatchingStrategy::Sudden => {
                if x <= n {
                    l0 - s * x
                } else {
                    l0 - s * n - RADIATION_SLOPE * (x - n)
                }
            }
            MatchingStrategy::Smooth { width_efolds: d } => {
                let k = 1.0 - 3.0 * self.eos;
                l0 - s * x - k * d * (softplus((x - n) / d) - softplus(-n / d))
            }
        }
    }

    /// d ln ρ / dx = −3(1 + w_eff(x)).
    pub fn d_ln_density(&self, x: f64) -> f64 {
        if self.is_radiation_only() {
            return -RADIATION_SLOPE;
        }
        let n = self.efolds;
        let s = self.early_slope();
        match self.matching {
            MatchingStrategy::Sudden => {
                if x <= n {
                    -s
                } else {
                    -RADIATION_SLOPE
                }
            }
            MatchingStrategy::Smooth { width_efolds: d } => {
                let sigma = logistic((x - n) / d);
                -(s * (1.0 - sigma) + RADIATION_SLOPE * sigma)
            }
        }
    }

    /// ln ρ where the early era hands over to radiation domination.
    pub fn ln_density_reheating(&self) -> f64 {
        self.ln_density(self.efolds)
    }

    /// ln ρ from which the expansion is radiation-like: at N for sudden
    /// matching, a few widths later for smooth matching.
    pub fn ln_density_radiation_onset(&self) -> f64 {
        match self.matching {
            MatchingStrategy::Smooth { width_efolds } if !self.is_radiation_only() => {
                self.ln_density(self.efolds + RADIATION_ONSET_WIDTHS * width_efolds)
            }
            _ => self.ln_density_reheating(),
        }
    }

    /// Inverse of `ln_density`: the e-fold count at which ln ρ equals
    /// `ln_rho`. Closed form except for smooth matching.
    pub fn efolds_at_density(&self, ln_rho: f64, root: RootConfig) -> PbhResult<f64> {
        let l0 = self.ln_density_inflation;
        if !ln_rho.is_finite() {
            return Err(PbhError::InvalidParameter(format!(
                "ln density must be finite, got {ln_rho}"
            )));
        }
        if ln_rho > l0 {
            return Err(PbhError::OutsideDomain(format!(
                "density e^{ln_rho:.3} above the end-of-inflation value e^{l0:.3}"
            )));
        }
        if self.is_radiation_only() {
            return Ok((l0 - ln_rho) / RADIATION_SLOPE);
        }
        let n = self.efolds;
        let s = self.early_slope();
        match self.matching {
            MatchingStrategy::Sudden => {
                let l_rh = l0 - s * n;
                if ln_rho >= l_rh {
                    Ok((l0 - ln_rho) / s)
                } else {
                    Ok(n + (l_rh - ln_rho) / RADIATION_SLOPE)
                }
            }
            MatchingStrategy::Smooth { .. } => {
                let hi = (l0 - ln_rho) / s.min(RADIATION_SLOPE) + 1.0;
                newton_safeguarded(
                    |x| (self.ln_density(x) - ln_rho, self.d_ln_density(x)),
                    0.0,
                    hi,
                    root,
                )
            }
        }
    }
}

/// Radiation + matter universe after the early evolution window.
#[derive(Debug, Clone, Copy)]
pub struct LateUniverse {
    /// √2 / H_eq in seconds.
    time_scale_s: f64,
    y_today: f64,
    y_end: f64,
}

impl LateUniverse {
    pub fn new(constants: &PhysicalConstants) -> Self {
        let rho_r_eq = constants.radiation_density_equality_gev4();
        let hubble_eq = (2.0 * rho_r_eq / 3.0).sqrt() / constants.reduced_planck_mass_gev;
        let time_scale_s = 2f64.sqrt() / hubble_eq * constants.seconds_per_inverse_gev;
        let y_end = (rho_r_eq / constants.density_evolution_end_gev4()).powf(0.25);
        LateUniverse {
            time_scale_s,
            y_today: 1.0 + constants.redshift_equality(),
            y_end,
        }
    }

    /// a/a_eq today.
    pub fn y_today(&self) -> f64 {
        self.y_today
    }

    /// a/a_eq where the early evolution window closes.
    pub fn y_end(&self) -> f64 {
        self.y_end
    }

    /// Cosmic time [s] at a/a_eq = y:
    /// `t = C·(2/3)(y/(√(1+y)+1))²(√(1+y)+2)`.
    pub fn time_at(&self, y: f64) -> f64 {
        let s = (1.0 + y).sqrt();
        let r = y / (s + 1.0);
        self.time_scale_s * (2.0 / 3.0) * r * r * (s + 2.0)
    }

    /// dt/dy [s].
    pub fn dtime_dy(&self, y: f64) -> f64 {
        self.time_scale_s * y / (1.0 + y).sqrt()
    }

    pub fn time_at_redshift(&self, z: f64) -> f64 {
        self.time_at(self.y_today / (1.0 + z))
    }

    pub fn redshift_at(&self, y: f64) -> f64 {
        self.y_today / y - 1.0
    }

    /// Time at which the early evolution window closes [s].
    pub fn time_end(&self) -> f64 {
        self.time_at(self.y_end)
    }

    /// Inverse of `time_at`, solved in ln y.
    pub fn y_at_time(&self, t: f64, root: RootConfig) -> PbhResult<f64> {
        if !t.is_finite() || t <= 0.0 {
            return Err(PbhError::InvalidParameter(format!(
                "time must be finite and > 0, got {t}"
            )));
        }
        // t(y) < C y²/2 for every y > 0.
        let y_lo = (2.0 * t / self.time_scale_s).sqrt();
        let mut y_hi = 2.0 * y_lo.max((1.5 * t / self.time_scale_s).powf(2.0 / 3.0));
        let mut expansions = 0;
        while self.time_at(y_hi) < t {
            y_hi *= 2.0;
            expansions += 1;
            if expansions > 200 {
                return Err(PbhError::NotBracketed { lo: y_lo, hi: y_hi });
            }
        }
        let ln_t = t.ln();
        let ln_y = newton_safeguarded(
            |l| {
                let y = l.exp();
                let ty = self.time_at(y);
                (ty.ln() - ln_t, y * self.dtime_dy(y) / ty)
            },
            y_lo.ln(),
            y_hi.ln(),
            root,
        )?;
        Ok(ln_y.exp())
    }

    /// ln of the growth of a pressureless fraction of the total density
    /// between the window end and `y`.
    pub fn ln_fraction_growth(&self, y: f64) -> f64 {
        (y / (1.0 + y)).ln() - (self.y_end / (1.0 + self.y_end)).ln()
    }
}
