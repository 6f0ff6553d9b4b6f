//! # Trip Split
//!
//! Stop-point based trip segmentation for vessel and vehicle trajectories.
//!
//! This library provides:
//! - Great-circle distance, elapsed time and bearing primitives
//! - Row-pairwise kinematics (distance, time, speed, bearing) over tables or sequences
//! - Stop-point detection with bounded left/right neighbourhood search
//! - Trip slicing with batch-wide trip identifiers
//! - Parallel processing across objects
//!
//! ## Features
//!
//! - **`parallel`** - Segment independent objects in parallel with rayon
//! - **`synthetic`** - Seeded voyage generator for tests and benchmarks
//! - **`cli`** - Build the `tripsplit-cli` binary
//!
//! ## Quick Start
//!
//! ```rust
//! use tripsplit::{PositionRecord, SegmentationConfig, segment_records};
//!
//! let mut records = Vec::new();
//! // Ten minutes under way, twenty minutes moored, ten minutes under way.
//! for i in 0..40 {
//!     let (lon, speed) = match i {
//!         0..=9 => (23.0 + i as f64 * 0.01, 10.0),
//!         10..=29 => (23.1, 0.0),
//!         _ => (23.1 + (i - 29) as f64 * 0.01, 10.0),
//!     };
//!     records.push(PositionRecord::new("237000001", lon, 37.9, i as f64 * 60.0, speed));
//! }
//!
//! let result = segment_records(&records, &SegmentationConfig::default()).unwrap();
//! assert_eq!(result.trips.len(), 2);
//! assert_eq!(result.trips[0].trip_id, 1);
//! ```

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{OptionExt, Result, SegmentationError};

// Geographic utilities (distance, elapsed time, bearing)
pub mod geo_utils;

// Columnar point tables with named columns
pub mod table;
pub use table::{Column, ColumnNames, PointTable};

// Row-pairwise distance/time/speed/bearing transforms
pub mod kinematics;

// Stop-point detection and trip slicing
pub mod segmentation;
#[cfg(feature = "parallel")]
pub use segmentation::segment_records_parallel;
pub use segmentation::{
    analyze_trajectory, detect_stop_points, group_trajectories, segment_records,
    segment_records_with_progress, segment_table, segment_trajectory, side_search, slice_trips,
    trip_table, AtomicProgressTracker, NoopProgress, SegmentationConfig, SegmentationPhase,
    SegmentationProgressCallback, TrajectoryOutcome, TripIdCounter, MAX_NEIGHBOR_TIME_GAP_SECS,
    STOP_COLUMN, TRIP_ID_COLUMN,
};

// Synthetic voyage generator for tests and benchmarks
#[cfg(feature = "synthetic")]
pub mod synthetic;

// ============================================================================
// Core Types
// ============================================================================

/// One observation of a moving object.
///
/// Coordinates are decimal degrees, `timestamp` is seconds since the epoch and
/// `speed` is in whatever unit the caller's thresholds use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub object_id: String,
    pub lon: f64,
    pub lat: f64,
    pub timestamp: f64,
    pub speed: f64,
}

impl PositionRecord {
    pub fn new(object_id: impl Into<String>, lon: f64, lat: f64, timestamp: f64, speed: f64) -> Self {
        Self {
            object_id: object_id.into(),
            lon,
            lat,
            timestamp,
            speed,
        }
    }
}

/// The time-ordered position history of one object.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    pub object_id: String,
    /// Points sorted ascending by timestamp
    pub points: Vec<PositionRecord>,
}

impl Trajectory {
    /// Build a trajectory, sorting points by timestamp.
    ///
    /// The sort is stable: points sharing a timestamp keep their input order.
    pub fn new(object_id: impl Into<String>, mut points: Vec<PositionRecord>) -> Self {
        points.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        Self {
            object_id: object_id.into(),
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// A point as emitted inside a trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentedPoint {
    #[serde(flatten)]
    pub record: PositionRecord,
    /// Position within the time-sorted trajectory
    pub index: usize,
    /// Whether this point is a confirmed stop point
    pub is_stop: bool,
}

/// A contiguous run of one trajectory between stops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripSegment {
    /// Batch-wide identifier, strictly increasing in emission order
    pub trip_id: u64,
    pub object_id: String,
    pub points: Vec<SegmentedPoint>,
}

impl TripSegment {
    /// Index of the first point in the sorted trajectory.
    pub fn start_index(&self) -> Option<usize> {
        self.points.first().map(|p| p.index)
    }

    /// Index of the last point in the sorted trajectory (inclusive).
    pub fn end_index(&self) -> Option<usize> {
        self.points.last().map(|p| p.index)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The stop point closing this trip, if it ends at one.
    pub fn stop_point(&self) -> Option<&SegmentedPoint> {
        self.points.last().filter(|p| p.is_stop)
    }
}

/// One row of the flat output table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRow {
    pub trip_id: u64,
    pub object_id: String,
    pub lon: f64,
    pub lat: f64,
    pub timestamp: f64,
    pub speed: f64,
    pub stop: bool,
}

/// Counters gathered over a segmentation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentationStats {
    pub trajectories: usize,
    pub trajectories_with_stops: usize,
    pub stop_points: usize,
    pub trips: usize,
    pub rows: usize,
}

/// Trips produced by one segmentation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentationResult {
    /// Trips in trajectory order, chronological within a trajectory
    pub trips: Vec<TripSegment>,
    pub stats: SegmentationStats,
}

impl SegmentationResult {
    /// Flatten trips into output rows.
    pub fn rows(&self) -> impl Iterator<Item = TripRow> + '_ {
        self.trips.iter().flat_map(|trip| {
            trip.points.iter().map(move |p| TripRow {
                trip_id: trip.trip_id,
                object_id: trip.object_id.clone(),
                lon: p.record.lon,
                lat: p.record.lat,
                timestamp: p.record.timestamp,
                speed: p.record.speed,
                stop: p.is_stop,
            })
        })
    }

    /// Trips belonging to one object.
    pub fn trips_for<'a>(&'a self, object_id: &'a str) -> impl Iterator<Item = &'a TripSegment> + 'a {
        self.trips.iter().filter(move |t| t.object_id == object_id)
    }
}
