//! Row-pairwise kinematics: distance, elapsed time, speed and bearing.
//!
//! Every transform comes in two explicitly named forms: one over plain
//! equal-length sequences (`*_series`) and one over a [`PointTable`] with
//! named columns (`calculate_*`). The "previous row" transforms leave the
//! first value as NaN and the bearing leaves the last value as NaN, since
//! there is no neighbour to pair with.

use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SegmentationError};
use crate::geo_utils::{haversine_km, initial_bearing};
use crate::table::{Column, ColumnNames, PointTable};

pub const DISTANCE_DIFF_COLUMN: &str = "dis_diff";
pub const TIME_DIFF_COLUMN: &str = "time_diff";
pub const SPEED_COLUMN: &str = "speed";
pub const BEARING_COLUMN: &str = "bearing";

/// Unit of a derived speed, given distances in km and times in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedUnit {
    /// Raw distance over time
    #[default]
    KilometersPerSecond,
    KilometersPerHour,
    Knots,
}

impl SpeedUnit {
    /// Multiplier applied to km/s.
    pub fn factor(self) -> f64 {
        match self {
            SpeedUnit::KilometersPerSecond => 1.0,
            SpeedUnit::KilometersPerHour => 3600.0,
            SpeedUnit::Knots => 3600.0 / 1.852,
        }
    }
}

fn check_lengths(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(SegmentationError::LengthMismatch { expected, actual });
    }
    Ok(())
}

// ============================================================================
// Sequence forms
// ============================================================================

/// Great-circle distance (km) from each point to the one before it.
pub fn distance_diff_series(lons: &[f64], lats: &[f64]) -> Result<Vec<f64>> {
    check_lengths(lons.len(), lats.len())?;
    Ok((0..lons.len())
        .map(|i| {
            if i == 0 {
                f64::NAN
            } else {
                haversine_km(lons[i], lats[i], lons[i - 1], lats[i - 1])
            }
        })
        .collect())
}

/// Absolute elapsed time from each timestamp to the one before it.
pub fn time_diff_series(timestamps: &[f64]) -> Vec<f64> {
    (0..timestamps.len())
        .map(|i| {
            if i == 0 {
                f64::NAN
            } else {
                (timestamps[i] - timestamps[i - 1]).abs()
            }
        })
        .collect()
}

/// Elementwise distance over time.
///
/// A zero duration yields infinity (or NaN for zero distance) rather than an error.
pub fn speed_series(distances: &[f64], durations: &[f64]) -> Result<Vec<f64>> {
    check_lengths(distances.len(), durations.len())?;
    Ok(distances
        .iter()
        .zip(durations)
        .map(|(d, t)| d / t)
        .collect())
}

/// Initial bearing (degrees) from each point to the one after it.
pub fn bearing_series(lons: &[f64], lats: &[f64]) -> Result<Vec<f64>> {
    check_lengths(lons.len(), lats.len())?;
    Ok((0..lons.len())
        .map(|i| {
            if i + 1 < lons.len() {
                initial_bearing(lons[i], lats[i], lons[i + 1], lats[i + 1])
            } else {
                f64::NAN
            }
        })
        .collect())
}

// ============================================================================
// Table forms
// ============================================================================

/// Add a `dis_diff` column computed from the named coordinate columns.
pub fn calculate_distance(table: &mut PointTable, lon: &str, lat: &str) -> Result<()> {
    let values = distance_diff_series(table.numeric(lon)?, table.numeric(lat)?)?;
    table.insert_column(DISTANCE_DIFF_COLUMN, Column::Numeric(values))
}

/// Add a `time_diff` column computed from the named timestamp column.
pub fn calculate_time_difference(table: &mut PointTable, timestamp: &str) -> Result<()> {
    let values = time_diff_series(table.numeric(timestamp)?);
    table.insert_column(TIME_DIFF_COLUMN, Column::Numeric(values))
}

/// Add a `speed` column as `dis_diff / time_diff` from the named columns.
pub fn calculate_speed(table: &mut PointTable, dis_diff: &str, time_diff: &str) -> Result<()> {
    let values = speed_series(table.numeric(dis_diff)?, table.numeric(time_diff)?)?;
    table.insert_column(SPEED_COLUMN, Column::Numeric(values))
}

/// Add a `bearing` column computed from the named coordinate columns.
pub fn calculate_bearing(table: &mut PointTable, lon: &str, lat: &str) -> Result<()> {
    let values = bearing_series(table.numeric(lon)?, table.numeric(lat)?)?;
    table.insert_column(BEARING_COLUMN, Column::Numeric(values))
}

/// Compute `dis_diff`, `time_diff`, the speed column and `bearing` per object.
///
/// Rows are paired with their predecessor in time within the same object, so
/// interleaved or unsorted input is handled. Row order of the table is preserved.
pub fn annotate_kinematics(table: &mut PointTable, names: &ColumnNames, unit: SpeedUnit) -> Result<()> {
    let lon = table.numeric(&names.lon)?.to_vec();
    let lat = table.numeric(&names.lat)?.to_vec();
    let timestamp = table.numeric(&names.timestamp)?.to_vec();
    let ids = table.keys(&names.identifier)?;

    let mut groups: HashMap<&str, Vec<usize>> = HashMap::new();
    for (row, id) in ids.iter().enumerate() {
        groups.entry(id.as_str()).or_default().push(row);
    }

    let rows = ids.len();
    let mut dis_diff = vec![f64::NAN; rows];
    let mut time_diff = vec![f64::NAN; rows];
    let mut speed = vec![f64::NAN; rows];
    let mut bearing = vec![f64::NAN; rows];

    for rows_of_object in groups.values_mut() {
        rows_of_object.sort_by(|&a, &b| timestamp[a].total_cmp(&timestamp[b]));

        let g_lon: Vec<f64> = rows_of_object.iter().map(|&r| lon[r]).collect();
        let g_lat: Vec<f64> = rows_of_object.iter().map(|&r| lat[r]).collect();
        let g_time: Vec<f64> = rows_of_object.iter().map(|&r| timestamp[r]).collect();

        let d = distance_diff_series(&g_lon, &g_lat)?;
        let t = time_diff_series(&g_time);
        let s = speed_series(&d, &t)?;
        let b = bearing_series(&g_lon, &g_lat)?;

        for (k, &row) in rows_of_object.iter().enumerate() {
            dis_diff[row] = d[k];
            time_diff[row] = t[k];
            speed[row] = s[k] * unit.factor();
            bearing[row] = b[k];
        }
    }

    debug!(
        "[Kinematics] Annotated {} rows across {} objects",
        rows,
        groups.len()
    );

    table.insert_column(DISTANCE_DIFF_COLUMN, Column::Numeric(dis_diff))?;
    table.insert_column(TIME_DIFF_COLUMN, Column::Numeric(time_diff))?;
    table.insert_column(&names.speed, Column::Numeric(speed))?;
    table.insert_column(BEARING_COLUMN, Column::Numeric(bearing))
}
