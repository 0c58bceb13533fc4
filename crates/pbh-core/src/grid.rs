// ─────────────────────────────────────────────────────────────────────
// SCPN Beta-PBH — Mass Grid
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Logarithmic PBH mass grid.

use ndarray::Array1;
use pbh_types::constants::{DEFAULT_MASS_MAX_G, DEFAULT_MASS_MIN_G};
use pbh_types::error::{PbhError, PbhResult};
use pbh_types::state::MassGrid;

/// Hard cap on grid size.
pub const MAX_GRID_POINTS: usize = 10_000_000;

/// Slack so that a range that is an exact multiple of the step keeps its
/// upper endpoint despite rounding in the division.
const ENDPOINT_SLACK: f64 = 1e-9;

/// Build `m_i = 10^(log10 mass_min + i·delta_log10)` for `i = 0..=n`,
/// `n = floor(log10(mass_max/mass_min)/delta_log10)`.
///
/// Every point is computed from its index, so no drift accumulates.
pub fn build_mass_grid(delta_log10: f64, mass_min: f64, mass_max: f64) -> PbhResult<MassGrid> {
    if !delta_log10.is_finite() || delta_log10 <= 0.0 {
        return Err(PbhError::InvalidParameter(format!(
            "delta_log10 must be finite and > 0, got {delta_log10}"
        )));
    }
    if !mass_min.is_finite() || !mass_max.is_finite() || mass_min <= 0.0 || mass_min >= mass_max {
        return Err(PbhError::InvalidParameter(format!(
            "mass range must satisfy 0 < min < max, got [{mass_min}, {mass_max}]"
        )));
    }

    let log_min = mass_min.log10();
    let span = mass_max.log10() - log_min;
    let steps = (span / delta_log10 + ENDPOINT_SLACK).floor();
    if !steps.is_finite() || steps + 1.0 > MAX_GRID_POINTS as f64 {
        return Err(PbhError::InvalidParameter(format!(
            "grid would need {} points (limit {MAX_GRID_POINTS})",
            steps + 1.0
        )));
    }
    let n = steps as usize;

    let masses = Array1::from_shape_fn(n + 1, |i| 10f64.powf(log_min + i as f64 * delta_log10));
    for i in 1..masses.len() {
        if masses[i] <= masses[i - 1] {
            return Err(PbhError::InvalidParameter(format!(
                "delta_log10 = {delta_log10} too small: points {} and {i} coincide at {} g",
                i - 1,
                masses[i]
            )));
        }
    }
    MassGrid::try_new(masses, delta_log10)
}

/// Default-range grid, 1 g … 1e20 g.
pub fn put_m_array(delta_log10: f64) -> PbhResult<MassGrid> {
    build_mass_grid(delta_log10, DEFAULT_MASS_MIN_G, DEFAULT_MASS_MAX_G)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_grid_length() {
        let grid = put_m_array(0.1).unwrap();
        assert_eq!(grid.len(), 201);
        assert_eq!(grid.masses()[0], 1.0);
        assert!((grid.masses()[200] / 1e20 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_non_multiple_range_drops_endpoint() {
        let grid = build_mass_grid(0.3, 1.0, 10.0).unwrap();
        assert_eq!(grid.len(), 4);
        assert!(grid.masses()[3] < 10.0);
    }

    #[test]
    fn test_idempotent() {
        let a = build_mass_grid(0.05, 3.0, 7e9).unwrap();
        let b = build_mass_grid(0.05, 3.0, 7e9).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(
            put_m_array(0.0),
            Err(PbhError::InvalidParameter(_))
        ));
        assert!(put_m_array(-0.1).is_err());
        assert!(put_m_array(f64::NAN).is_err());
        assert!(build_mass_grid(0.1, 10.0, 1.0).is_err());
        assert!(build_mass_grid(0.1, 0.0, 1.0).is_err());
        assert!(build_mass_grid(0.1, 1.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_too_many_points_rejected() {
        let err = put_m_array(1e-7).unwrap_err();
        assert!(err.to_string().contains("limit"));
    }

    #[test]
    fn test_collapsing_points_rejected() {
        // Within the point cap, but adjacent values round to the same float.
        let err = build_mass_grid(1e-17, 1.0, 1.0 + 1e-11).unwrap_err();
        assert!(matches!(err, PbhError::InvalidParameter(_)));
    }
}
