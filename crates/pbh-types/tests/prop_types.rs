// ─────────────────────────────────────────────────────────────────────
// SCPN Beta-PBH — Property-Based Tests (proptest) for pbh-types
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Property-based tests for pbh-types using proptest.
//!
//! Covers: scenario validation, reheating-temperature inversion,
//! beta-bound serialization roundtrip.

use pbh_types::constants::{radiation_density, PhysicalConstants};
use pbh_types::state::{BetaBound, ReheatingScenario};
use proptest::prelude::*;

// ── Scenario Validation ──────────────────────────────────────────────

proptest! {
    /// Any finite eos is accepted for instantaneous reheating.
    #[test]
    fn instantaneous_accepts_any_eos(eos in -10.0f64..10.0) {
        prop_assert!(ReheatingScenario::new(0.0, eos).is_ok());
    }

    /// Extended reheating accepts exactly (-1, 1] minus radiation.
    #[test]
    fn extended_eos_range(
        efolds in 0.01f64..60.0,
        eos in -2.0f64..2.0,
    ) {
        let result = ReheatingScenario::new(efolds, eos);
        let expected = eos > -1.0 && eos <= 1.0 && (eos - 1.0 / 3.0).abs() >= 1e-12;
        prop_assert_eq!(result.is_ok(), expected);
    }

    /// Negative e-fold counts are always rejected.
    #[test]
    fn negative_efolds_rejected(efolds in -100.0f64..-1e-9, eos in -0.9f64..0.9) {
        prop_assert!(ReheatingScenario::new(efolds, eos).is_err());
    }
}

// ── Reheating Temperature Inversion ──────────────────────────────────

proptest! {
    /// The derived e-fold count reproduces ρ_rh.
    #[test]
    fn reheating_temperature_consistent(
        log10_t in -1.0f64..12.0,
        eos in prop::sample::select(vec![-0.5, 0.0, 0.2, 0.5, 1.0]),
    ) {
        let c = PhysicalConstants::standard();
        let t_rh = 10f64.powf(log10_t);
        let s = ReheatingScenario::from_reheating_temperature(t_rh, eos, c).unwrap();
        let ln_rho = c.density_end_of_inflation_gev4().ln()
            - 3.0 * (1.0 + eos) * s.efolds();
        let expected = radiation_density(c.g_star_reheating, t_rh).ln();
        prop_assert!((ln_rho - expected).abs() < 1e-8 * expected.abs().max(1.0));
    }

    /// Lower reheating temperature means a longer early era.
    #[test]
    fn efolds_decrease_with_temperature(
        log10_t in 0.0f64..10.0,
        step in 0.1f64..2.0,
    ) {
        let c = PhysicalConstants::standard();
        let low = ReheatingScenario::from_reheating_temperature(10f64.powf(log10_t), 0.0, c).unwrap();
        let high = ReheatingScenario::from_reheating_temperature(10f64.powf(log10_t + step), 0.0, c).unwrap();
        prop_assert!(low.efolds() > high.efolds());
    }
}

// ── Serialization Roundtrip ──────────────────────────────────────────

proptest! {
    /// Beta bounds survive JSON bit for bit.
    #[test]
    fn beta_bound_json_roundtrip(log10_beta in -40.0f64..5.0) {
        let b = BetaBound::Defined(10f64.powf(log10_beta));
        let json = serde_json::to_string(&b).unwrap();
        let back: BetaBound = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(b, back);
    }
}
