//! Segmentation thresholds.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SegmentationError};

/// Largest elapsed time (seconds) between an anchor and a neighbour found by
/// the side search. Independent of [`SegmentationConfig::time_threshold`].
pub const MAX_NEIGHBOR_TIME_GAP_SECS: f64 = 3600.0;

/// Configuration for stop-point detection and trip slicing.
///
/// Speed and distance thresholds are in the caller's units and must match the
/// `speed` column and the distance primitive (kilometers) respectively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Speed at or below which a point is a stop candidate.
    /// Default: 2.0
    pub speed_threshold: f64,

    /// Neighbourhood radius searched on each side of a candidate.
    /// Default: 5.0 (km)
    pub distance_threshold: f64,

    /// Minimum time (seconds) spent crossing the neighbourhood to confirm a stop.
    /// Default: 300
    pub time_threshold: f64,

    /// Emit the slow stretch after the last stop as a trip when the object never
    /// moves again. Default: false (the remainder is dropped)
    pub keep_slow_remainder: bool,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            speed_threshold: 2.0,
            distance_threshold: 5.0,
            time_threshold: 300.0,
            keep_slow_remainder: false,
        }
    }
}

impl SegmentationConfig {
    /// Reject thresholds that are negative or not finite.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("speed_threshold", self.speed_threshold),
            ("distance_threshold", self.distance_threshold),
            ("time_threshold", self.time_threshold),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SegmentationError::InvalidThreshold { name, value });
            }
        }
        Ok(())
    }

    /// A point is a stop candidate.
    pub(crate) fn is_slow(&self, speed: f64) -> bool {
        speed <= self.speed_threshold
    }

    /// A point is moving. NaN speeds are neither slow nor moving.
    pub(crate) fn is_moving(&self, speed: f64) -> bool {
        speed > self.speed_threshold
    }
}
