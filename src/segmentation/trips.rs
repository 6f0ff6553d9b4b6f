//! Slicing a trajectory into trips at its stop points.

use std::ops::Range;

use crate::PositionRecord;

use super::config::SegmentationConfig;
use super::stops::first_moving_from;

/// Turn stop indices into trip index ranges (end-exclusive).
///
/// - The first trip starts at the first moving point before the first stop,
///   or at index 0 when everything before it is slow.
/// - Every trip ends at a stop point, inclusive.
/// - The next trip starts at the first moving point after that stop.
/// - When the object moves again after the last stop, the rest of the
///   trajectory is a final trip. A slow remainder is dropped unless
///   [`SegmentationConfig::keep_slow_remainder`] is set.
///
/// Empty ranges are never returned.
pub fn slice_trips(
    points: &[PositionRecord],
    stops: &[usize],
    config: &SegmentationConfig,
) -> Vec<Range<usize>> {
    let Some(&first_stop) = stops.first() else {
        return Vec::new();
    };

    let mut start = points[..first_stop.min(points.len())]
        .iter()
        .position(|p| config.is_moving(p.speed))
        .unwrap_or(0);

    let mut slices = Vec::with_capacity(stops.len() + 1);
    let mut resumed = false;

    for &stop in stops {
        if start <= stop {
            slices.push(start..stop + 1);
        }
        match first_moving_from(points, stop + 1, config) {
            Some(next) => {
                start = next;
                resumed = true;
            }
            None => {
                start = stop + 1;
                resumed = false;
            }
        }
    }

    if (resumed || config.keep_slow_remainder) && start < points.len() {
        slices.push(start..points.len());
    }

    slices.retain(|r| !r.is_empty());
    slices
}
