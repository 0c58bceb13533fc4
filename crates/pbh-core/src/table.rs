// ─────────────────────────────────────────────────────────────────────
// SCPN Beta-PBH — Result Tables
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Reading and writing beta curves.
//!
//! * JSON for curves, envelopes and sweeps (lossless, statuses kept).
//! * `.npy` two-column `(mass, beta)` tables, NaN where undefined. Reading
//!   maps NaN back to `OutsideDomain`.
//! * `.npz` archives for a whole envelope: `mass`, `envelope`, `dominant`,
//!   and per channel `<label>` plus `<label>_status`.

use ndarray::{Array1, Array2, Ix1, OwnedRepr};
use ndarray_npy::{read_npy, write_npy, NpzReader, NpzWriter};
use pbh_types::error::{PbhError, PbhResult};
use pbh_types::state::{AggregateEnvelope, BetaBound, BetaCurve, ChannelKind, SweepEntry};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::path::Path;

const STATUS_DEFINED: i32 = 0;
const STATUS_OUTSIDE_DOMAIN: i32 = 1;
const STATUS_NOT_CONVERGED: i32 = 2;

/// `dominant` entry for points without a defined bound.
const NO_DOMINANT: i32 = -1;

fn write_json<T: Serialize, P: AsRef<Path>>(value: &T, path: P) -> PbhResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    Ok(())
}

fn read_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> PbhResult<T> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

pub fn write_curve_json<P: AsRef<Path>>(curve: &BetaCurve, path: P) -> PbhResult<()> {
    write_json(curve, path)
}

pub fn read_curve_json<P: AsRef<Path>>(path: P) -> PbhResult<BetaCurve> {
    let curve: BetaCurve = read_json(path)?;
    // Re-check alignment.
    BetaCurve::new(curve.channel, curve.masses, curve.bounds)
}

pub fn write_envelope_json<P: AsRef<Path>>(envelope: &AggregateEnvelope, path: P) -> PbhResult<()> {
    write_json(envelope, path)
}

pub fn read_envelope_json<P: AsRef<Path>>(path: P) -> PbhResult<AggregateEnvelope> {
    read_json(path)
}

pub fn write_sweep_json<P: AsRef<Path>>(entries: &[SweepEntry], path: P) -> PbhResult<()> {
    write_json(&entries, path)
}

pub fn read_sweep_json<P: AsRef<Path>>(path: P) -> PbhResult<Vec<SweepEntry>> {
    read_json(path)
}

/// Dense `(n, 2)` table: mass, beta (NaN where undefined).
pub fn beta_table(masses: &[f64], bounds: &[BetaBound]) -> PbhResult<Array2<f64>> {
    if masses.len() != bounds.len() {
        return Err(PbhError::InvalidParameter(format!(
            "{} masses but {} bounds",
            masses.len(),
            bounds.len()
        )));
    }
    Ok(Array2::from_shape_fn((masses.len(), 2), |(i, j)| {
        if j == 0 {
            masses[i]
        } else {
            bounds[i].to_f64()
        }
    }))
}

fn bound_from_f64(value: f64) -> BetaBound {
    if value.is_nan() {
        BetaBound::OutsideDomain
    } else {
        BetaBound::Defined(value)
    }
}

pub fn write_curve_npy<P: AsRef<Path>>(curve: &BetaCurve, path: P) -> PbhResult<()> {
    let table = beta_table(&curve.masses, &curve.bounds)?;
    write_npy(path, &table).map_err(|e| PbhError::Npy(e.to_string()))
}

pub fn write_envelope_npy<P: AsRef<Path>>(envelope: &AggregateEnvelope, path: P) -> PbhResult<()> {
    let table = beta_table(&envelope.masses, &envelope.bounds)?;
    write_npy(path, &table).map_err(|e| PbhError::Npy(e.to_string()))
}

/// Read a two-column table back into masses and bounds.
pub fn read_table_npy<P: AsRef<Path>>(path: P) -> PbhResult<(Vec<f64>, Vec<BetaBound>)> {
    let table: Array2<f64> = read_npy(path).map_err(|e| PbhError::Npy(e.to_string()))?;
    if table.ncols() != 2 {
        return Err(PbhError::Npy(format!(
            "expected 2 columns (mass, beta), found {}",
            table.ncols()
        )));
    }
    let masses = table.column(0).to_vec();
    let bounds = table.column(1).iter().map(|&b| bound_from_f64(b)).collect();
    Ok((masses, bounds))
}

pub fn read_curve_npy<P: AsRef<Path>>(path: P, channel: ChannelKind) -> PbhResult<BetaCurve> {
    let (masses, bounds) = read_table_npy(path)?;
    BetaCurve::new(channel, masses, bounds)
}

fn status_of(bound: &BetaBound) -> i32 {
    match bound {
        BetaBound::Defined(_) => STATUS_DEFINED,
        BetaBound::OutsideDomain => STATUS_OUTSIDE_DOMAIN,
        BetaBound::NotConverged => STATUS_NOT_CONVERGED,
    }
}

fn bound_from_status(value: f64, status: i32) -> PbhResult<BetaBound> {
    match status {
        STATUS_DEFINED => Ok(BetaBound::Defined(value)),
        STATUS_OUTSIDE_DOMAIN => Ok(BetaBound::OutsideDomain),
        STATUS_NOT_CONVERGED => Ok(BetaBound::NotConverged),
        other => Err(PbhError::Npy(format!("unknown bound status {other}"))),
    }
}

fn add_bounds(writer: &mut NpzWriter<File>, key: &str, bounds: &[BetaBound]) -> PbhResult<()> {
    let values: Array1<f64> = bounds.iter().map(BetaBound::to_f64).collect();
    let status: Array1<i32> = bounds.iter().map(status_of).collect();
    writer
        .add_array(key, &values)
        .map_err(|e| PbhError::Npy(format!("failed to write '{key}': {e}")))?;
    writer
        .add_array(format!("{key}_status"), &status)
        .map_err(|e| PbhError::Npy(format!("failed to write '{key}_status': {e}")))?;
    Ok(())
}

/// Whole envelope, every status preserved.
pub fn write_envelope_npz<P: AsRef<Path>>(envelope: &AggregateEnvelope, path: P) -> PbhResult<()> {
    let file = File::create(path)?;
    let mut writer = NpzWriter::new(file);
    let masses = Array1::from_vec(envelope.masses.clone());
    writer
        .add_array("mass", &masses)
        .map_err(|e| PbhError::Npy(format!("failed to write 'mass': {e}")))?;
    add_bounds(&mut writer, "envelope", &envelope.bounds)?;

    let dominant: Array1<i32> = envelope
        .dominant
        .iter()
        .map(|d| match d {
            Some(kind) => ChannelKind::ALL
                .iter()
                .position(|k| k == kind)
                .map_or(NO_DOMINANT, |i| i as i32),
            None => NO_DOMINANT,
        })
        .collect();
    writer
        .add_array("dominant", &dominant)
        .map_err(|e| PbhError::Npy(format!("failed to write 'dominant': {e}")))?;

    for curve in &envelope.channels {
        add_bounds(&mut writer, curve.channel.label(), &curve.bounds)?;
    }
    writer
        .finish()
        .map_err(|e| PbhError::Npy(format!("failed to finish archive: {e}")))?;
    Ok(())
}

fn read_f64(npz: &mut NpzReader<File>, key: &str) -> PbhResult<Array1<f64>> {
    npz.by_name::<OwnedRepr<f64>, Ix1>(&format!("{key}.npy"))
        .or_else(|_| npz.by_name::<OwnedRepr<f64>, Ix1>(key))
        .map_err(|e| PbhError::Npy(format!("failed to read '{key}': {e}")))
}

fn read_i32(npz: &mut NpzReader<File>, key: &str) -> PbhResult<Array1<i32>> {
    npz.by_name::<OwnedRepr<i32>, Ix1>(&format!("{key}.npy"))
        .or_else(|_| npz.by_name::<OwnedRepr<i32>, Ix1>(key))
        .map_err(|e| PbhError::Npy(format!("failed to read '{key}': {e}")))
}

fn read_bounds(npz: &mut NpzReader<File>, key: &str, len: usize) -> PbhResult<Vec<BetaBound>> {
    let values = read_f64(npz, key)?;
    let status = read_i32(npz, &format!("{key}_status"))?;
    if values.len() != len || status.len() != len {
        return Err(PbhError::Npy(format!(
            "'{key}' has {} values and {} statuses, expected {len}",
            values.len(),
            status.len()
        )));
    }
    values
        .iter()
        .zip(status.iter())
        .map(|(&v, &s)| bound_from_status(v, s))
        .collect()
}

fn has_entry(npz: &mut NpzReader<File>, key: &str) -> PbhResult<bool> {
    let names = npz
        .names()
        .map_err(|e| PbhError::Npy(format!("failed to list archive: {e}")))?;
    let with_ext = format!("{key}.npy");
    Ok(names.iter().any(|n| n == key || *n == with_ext))
}

pub fn read_envelope_npz<P: AsRef<Path>>(path: P) -> PbhResult<AggregateEnvelope> {
    let file = File::open(path)?;
    let mut npz = NpzReader::new(file).map_err(|e| PbhError::Npy(format!("failed to open archive: {e}")))?;

    let masses = read_f64(&mut npz, "mass")?.to_vec();
    let n = masses.len();
    let bounds = read_bounds(&mut npz, "envelope", n)?;
    let dominant_idx = read_i32(&mut npz, "dominant")?;
    if dominant_idx.len() != n {
        return Err(PbhError::Npy(format!(
            "'dominant' has {} entries, expected {n}",
            dominant_idx.len()
        )));
    }
    let dominant = dominant_idx
        .iter()
        .map(|&i| match i {
            NO_DOMINANT => Ok(None),
            i => usize::try_from(i)
                .ok()
                .and_then(|i| ChannelKind::ALL.get(i).copied())
                .map(Some)
                .ok_or_else(|| PbhError::Npy(format!("unknown channel index {i}"))),
        })
        .collect::<PbhResult<Vec<_>>>()?;

    let mut channels = Vec::new();
    for kind in ChannelKind::ALL {
        if has_entry(&mut npz, kind.label())? {
            let channel_bounds = read_bounds(&mut npz, kind.label(), n)?;
            channels.push(BetaCurve::new(kind, masses.clone(), channel_bounds)?);
        }
    }

    Ok(AggregateEnvelope {
        masses,
        bounds,
        dominant,
        channels,
    })
}
