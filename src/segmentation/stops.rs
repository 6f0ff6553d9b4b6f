//! Stop-point detection.
//!
//! Slow points are visited through a [`CandidateScan`]: a cursor over a
//! candidate list that is rebuilt, never edited, each time a stop is accepted.
//! Rebuilding starts at the first point that moves again after the accepted
//! stop's right limit, so the scan only ever moves forward.

use log::trace;

use crate::PositionRecord;

use super::config::SegmentationConfig;
use super::side_search::side_search;

/// Cursor over the slow points at or after some starting index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CandidateScan {
    candidates: Vec<usize>,
    cursor: usize,
}

impl CandidateScan {
    /// Collect every slow point with index `>= start`.
    pub(crate) fn starting_at(points: &[PositionRecord], start: usize, config: &SegmentationConfig) -> Self {
        let candidates = points
            .iter()
            .enumerate()
            .skip(start)
            .filter(|(_, p)| config.is_slow(p.speed))
            .map(|(i, _)| i)
            .collect();
        Self {
            candidates,
            cursor: 0,
        }
    }

    pub(crate) fn current(&self) -> Option<usize> {
        self.candidates.get(self.cursor).copied()
    }

    pub(crate) fn advance(&mut self) {
        self.cursor += 1;
    }
}

/// First index `>= from` whose speed is above the threshold.
pub(crate) fn first_moving_from(
    points: &[PositionRecord],
    from: usize,
    config: &SegmentationConfig,
) -> Option<usize> {
    points
        .iter()
        .enumerate()
        .skip(from)
        .find(|(_, p)| config.is_moving(p.speed))
        .map(|(i, _)| i)
}

/// Detect stop points in a time-sorted trajectory.
///
/// For each slow candidate, the left limit is searched between the previous
/// stop (the trajectory start before the first stop) and the candidate, and
/// the right limit everywhere after it. The candidate is a stop when both
/// limits exist and the time between them is at least `time_threshold`.
///
/// Returns indices in strictly increasing order. Trajectories with fewer than
/// two points or without slow points yield no stops.
pub fn detect_stop_points(points: &[PositionRecord], config: &SegmentationConfig) -> Vec<usize> {
    let mut stops = Vec::new();
    if points.len() < 2 {
        return stops;
    }

    let mut last_stop = 0;
    let mut scan = CandidateScan::starting_at(points, 0, config);

    while let Some(anchor) = scan.current() {
        let left = side_search(points, last_stop..anchor, anchor, config.distance_threshold);
        let right = side_search(points, anchor + 1..points.len(), anchor, config.distance_threshold);

        let (Some(left), Some(right)) = (left, right) else {
            scan.advance();
            continue;
        };

        let span = points[right].timestamp - points[left].timestamp;
        if span < config.time_threshold {
            scan.advance();
            continue;
        }

        trace!(
            "[Stops] Accepted {} (limits {}..={}, {:.0}s)",
            anchor,
            left,
            right,
            span
        );
        stops.push(anchor);
        last_stop = anchor;

        match first_moving_from(points, right + 1, config) {
            Some(next) => scan = CandidateScan::starting_at(points, next, config),
            // Still slow at the end of the trajectory
            None => break,
        }
    }

    stops
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(lon: f64, timestamp: f64, speed: f64) -> PositionRecord {
        PositionRecord::new("a", lon, 0.0, timestamp, speed)
    }

    #[test]
    fn test_candidate_scan_rebuilds_from_start() {
        let points = vec![
            point(0.0, 0.0, 0.0),
            point(0.0, 60.0, 5.0),
            point(0.0, 120.0, 1.0),
            point(0.0, 180.0, 2.0),
        ];
        let config = SegmentationConfig::default();

        let mut scan = CandidateScan::starting_at(&points, 0, &config);
        assert_eq!(scan.current(), Some(0));
        scan.advance();
        assert_eq!(scan.current(), Some(2));

        let scan = CandidateScan::starting_at(&points, 3, &config);
        assert_eq!(scan.current(), Some(3));
    }

    #[test]
    fn test_first_moving_from() {
        let points = vec![point(0.0, 0.0, 0.0), point(0.0, 60.0, 5.0), point(0.0, 120.0, f64::NAN)];
        let config = SegmentationConfig::default();
        assert_eq!(first_moving_from(&points, 0, &config), Some(1));
        assert_eq!(first_moving_from(&points, 2, &config), None);
        assert_eq!(first_moving_from(&points, 10, &config), None);
    }

    #[test]
    fn test_rejected_candidate_does_not_discard_later_ones() {
        // The first slow point has nothing to its left; the second one is a stop.
        let points = vec![
            point(0.000, 0.0, 0.0),
            point(0.000, 600.0, 0.0),
            point(0.000, 1200.0, 0.0),
            point(0.010, 1260.0, 10.0),
        ];
        let stops = detect_stop_points(&points, &SegmentationConfig::default());
        assert_eq!(stops, vec![1]);
    }
}
