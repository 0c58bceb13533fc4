// ─────────────────────────────────────────────────────────────────────
// SCPN Beta-PBH — Envelope Aggregation
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Pointwise minimum over channel curves.

use pbh_types::error::{PbhError, PbhResult};
use pbh_types::state::{AggregateEnvelope, BetaBound, BetaCurve, ChannelKind};

/// Combine aligned channel curves into the tightest envelope.
///
/// At each mass the envelope is the smallest defined bound. A point where no
/// channel is defined is `NotConverged` if any channel failed to converge
/// there, else `OutsideDomain`. Ties keep the first channel in input order.
pub fn combine(curves: Vec<BetaCurve>) -> PbhResult<AggregateEnvelope> {
    let Some(first) = curves.first() else {
        return Err(PbhError::InvalidParameter(
            "cannot combine an empty set of curves".into(),
        ));
    };
    let masses = first.masses.clone();
    for curve in &curves[1..] {
        if curve.masses != masses {
            return Err(PbhError::InvalidParameter(format!(
                "{} curve is not aligned with {} curve",
                curve.channel, first.channel
            )));
        }
    }

    let mut bounds = Vec::with_capacity(masses.len());
    let mut dominant = Vec::with_capacity(masses.len());
    for i in 0..masses.len() {
        let (bound, kind) = tightest(&curves, i);
        bounds.push(bound);
        dominant.push(kind);
    }

    Ok(AggregateEnvelope {
        masses,
        bounds,
        dominant,
        channels: curves,
    })
}

fn tightest(curves: &[BetaCurve], i: usize) -> (BetaBound, Option<ChannelKind>) {
    let mut best: Option<(f64, ChannelKind)> = None;
    let mut failed = false;
    for curve in curves {
        match curve.bounds[i] {
            BetaBound::Defined(beta) => {
                if best.map_or(true, |(b, _)| beta < b) {
                    best = Some((beta, curve.channel));
                }
            }
            BetaBound::NotConverged => failed = true,
            BetaBound::OutsideDomain => {}
        }
    }
    match best {
        Some((beta, kind)) => (BetaBound::Defined(beta), Some(kind)),
        None if failed => (BetaBound::NotConverged, None),
        None => (BetaBound::OutsideDomain, None),
    }
}
