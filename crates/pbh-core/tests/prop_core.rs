// ─────────────────────────────────────────────────────────────────────
// SCPN Beta-PBH — Property-Based Tests (proptest) for pbh-core
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Property-based tests for pbh-core using proptest.
//!
//! Covers: mass grid shape, radiation-era closed form, evaporation scaling,
//! matching convergence, envelope minimality.

use pbh_core::aggregate::combine;
use pbh_core::evolution::{evaporation_time, remaining_mass_fraction, EvolutionModel};
use pbh_core::grid::build_mass_grid;
use pbh_types::config::{MatchingStrategy, NumericsConfig};
use pbh_types::constants::PhysicalConstants;
use pbh_types::state::{BetaBound, BetaCurve, ChannelKind, ReheatingScenario};
use proptest::prelude::*;

fn model(scenario: ReheatingScenario, matching: MatchingStrategy) -> EvolutionModel<'static> {
    EvolutionModel::new(
        PhysicalConstants::standard(),
        scenario,
        matching,
        NumericsConfig::default(),
    )
    .unwrap()
}

// ── Mass Grid ────────────────────────────────────────────────────────

proptest! {
    /// Points strictly increase and the count matches the requested step.
    #[test]
    fn grid_strictly_increasing(
        delta in 0.01f64..2.0,
        log_min in -2.0f64..10.0,
        span in 0.5f64..12.0,
    ) {
        let min = 10f64.powf(log_min);
        let max = 10f64.powf(log_min + span);
        let grid = build_mass_grid(delta, min, max).unwrap();
        let m = grid.masses();
        for i in 1..m.len() {
            prop_assert!(m[i] > m[i - 1]);
        }
        let expected = ((max.log10() - min.log10()) / delta + 1e-9).floor() as usize + 1;
        prop_assert_eq!(grid.len(), expected);
        prop_assert!((m[0] / min - 1.0).abs() < 1e-12);
        prop_assert!(m[m.len() - 1] <= max * (1.0 + 1e-12));
    }

    /// Building twice gives identical grids.
    #[test]
    fn grid_idempotent(delta in 0.01f64..1.0, span in 1.0f64..20.0) {
        let a = build_mass_grid(delta, 1.0, 10f64.powf(span)).unwrap();
        let b = build_mass_grid(delta, 1.0, 10f64.powf(span)).unwrap();
        prop_assert_eq!(a, b);
    }
}

// ── Radiation-Era Closed Form ────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Instantaneous reheating: a_end/a_f = (ρ_f/ρ_end)^{1/4}.
    #[test]
    fn instantaneous_scale_factor_closed_form(log_m in 0.0f64..20.0) {
        let m = model(ReheatingScenario::instantaneous(), MatchingStrategy::default());
        let mass = 10f64.powf(log_m);
        let rho_f = m.density_at_formation(mass).unwrap();
        let rho_end = PhysicalConstants::standard().density_evolution_end_gev4();
        let expected = (rho_f / rho_end).powf(0.25);
        let ratio = m.scale_factor_ratio(mass).unwrap();
        prop_assert!((ratio / expected - 1.0).abs() < 1e-10);
    }

    /// Sudden and narrow smooth matching agree to O(width).
    #[test]
    fn narrow_smooth_matches_sudden(
        log_m in 0.0f64..12.0,
        efolds in 1.0f64..20.0,
        eos in prop::sample::select(vec![-0.2, 0.0, 0.5, 1.0]),
    ) {
        let scenario = ReheatingScenario::new(efolds, eos).unwrap();
        let sudden = model(scenario, MatchingStrategy::Sudden);
        let smooth = model(scenario, MatchingStrategy::Smooth { width_efolds: 1e-3 });
        let mass = 10f64.powf(log_m);
        let a = sudden.ln_scale_factor_ratio(mass).unwrap();
        let b = smooth.ln_scale_factor_ratio(mass).unwrap();
        prop_assert!((a - b).abs() < 5e-3, "sudden {} vs smooth {}", a, b);
    }
}

// ── Evaporation ──────────────────────────────────────────────────────

proptest! {
    /// τ ∝ M³ and strictly increasing.
    #[test]
    fn evaporation_time_cubic(log_m in 0.0f64..20.0, factor in 1.01f64..100.0) {
        let c = PhysicalConstants::standard();
        let m = 10f64.powf(log_m);
        let t1 = evaporation_time(m, c);
        let t2 = evaporation_time(m * factor, c);
        prop_assert!(t2 > t1);
        prop_assert!((t2 / t1 / factor.powi(3) - 1.0).abs() < 1e-10);
    }

    /// Remaining mass fraction is in [M_pl/M, 1] and non-increasing in t.
    #[test]
    fn remaining_mass_monotone(
        log_m in 0.0f64..20.0,
        f1 in 0.0f64..2.0,
        f2 in 0.0f64..2.0,
    ) {
        let c = PhysicalConstants::standard();
        let m = 10f64.powf(log_m);
        let tau = evaporation_time(m, c);
        let (early, late) = if f1 <= f2 { (f1, f2) } else { (f2, f1) };
        let s1 = remaining_mass_fraction(m, early * tau, tau, c.planck_mass_g);
        let s2 = remaining_mass_fraction(m, late * tau, tau, c.planck_mass_g);
        prop_assert!(s1 >= s2);
        prop_assert!(s1 <= 1.0);
        prop_assert!(s2 >= (c.planck_mass_g / m).min(1.0) * (1.0 - 1e-12));
    }
}

// ── Envelope ─────────────────────────────────────────────────────────

fn bound_strategy() -> impl Strategy<Value = BetaBound> {
    prop_oneof![
        6 => (-40.0f64..2.0).prop_map(|e| BetaBound::Defined(10f64.powf(e))),
        3 => Just(BetaBound::OutsideDomain),
        1 => Just(BetaBound::NotConverged),
    ]
}

proptest! {
    /// The envelope is the minimum of the defined channel values.
    #[test]
    fn envelope_is_pointwise_minimum(
        columns in prop::collection::vec(prop::collection::vec(bound_strategy(), 8), 1..7),
    ) {
        let masses: Vec<f64> = (0..8).map(|i| 10f64.powi(i)).collect();
        let curves: Vec<BetaCurve> = columns
            .into_iter()
            .zip(ChannelKind::ALL)
            .map(|(bounds, kind)| BetaCurve::new(kind, masses.clone(), bounds).unwrap())
            .collect();
        let env = combine(curves.clone()).unwrap();
        for i in 0..masses.len() {
            let defined: Vec<f64> = curves.iter().filter_map(|c| c.bounds[i].value()).collect();
            match env.bounds[i] {
                BetaBound::Defined(beta) => {
                    let min = defined.iter().cloned().fold(f64::INFINITY, f64::min);
                    prop_assert_eq!(beta, min);
                    for v in &defined {
                        prop_assert!(beta <= *v);
                    }
                    let kind = env.dominant[i].unwrap();
                    let winner = curves.iter().find(|c| c.channel == kind).unwrap();
                    prop_assert_eq!(winner.bounds[i], BetaBound::Defined(beta));
                }
                BetaBound::NotConverged => {
                    prop_assert!(defined.is_empty());
                    prop_assert!(curves.iter().any(|c| c.bounds[i] == BetaBound::NotConverged));
                }
                BetaBound::OutsideDomain => {
                    prop_assert!(defined.is_empty());
                    prop_assert!(curves.iter().all(|c| c.bounds[i] == BetaBound::OutsideDomain));
                }
            }
        }
    }
}
