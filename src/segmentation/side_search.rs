//! Bounded neighbourhood search on one side of an anchor point.

use std::ops::Range;

use crate::geo_utils::{distances_to_anchor, elapsed_times_to_anchor};
use crate::PositionRecord;

use super::config::MAX_NEIGHBOR_TIME_GAP_SECS;

/// Find the outermost neighbour of `points[anchor]` inside `side`.
///
/// Among the points in `side` that lie within `distance_threshold` of the
/// anchor and within [`MAX_NEIGHBOR_TIME_GAP_SECS`] of it in time, returns the
/// index (into `points`) of the one farthest away. Ties go to the earliest
/// index. Returns `None` when no point qualifies, including for an empty range.
///
/// `side` is clamped to `points`, so out-of-range bounds act as an empty side.
pub fn side_search(
    points: &[PositionRecord],
    side: Range<usize>,
    anchor: usize,
    distance_threshold: f64,
) -> Option<usize> {
    let anchor_point = points.get(anchor)?;
    let end = side.end.min(points.len());
    let start = side.start.min(end);
    let slice = &points[start..end];

    let distances = distances_to_anchor(slice, anchor_point);
    let times = elapsed_times_to_anchor(slice, anchor_point);

    let mut best: Option<(usize, f64)> = None;
    for (offset, (&distance, &time)) in distances.iter().zip(&times).enumerate() {
        if distance <= distance_threshold && time <= MAX_NEIGHBOR_TIME_GAP_SECS {
            match best {
                Some((_, best_distance)) if distance <= best_distance => {}
                _ => best = Some((start + offset, distance)),
            }
        }
    }

    best.map(|(index, _)| index)
}
