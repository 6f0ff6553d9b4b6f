//! # Stop-Point Segmentation
//!
//! Splits each object's trajectory into trips at detected stop points.
//!
//! ## Algorithm
//! 1. Group rows by object id and sort each group by timestamp
//! 2. For every slow point (speed at or below the threshold), search left and
//!    right for the farthest neighbour within the distance threshold and one hour
//! 3. Accept the point as a stop when the time between the two neighbours is at
//!    least the time threshold, then restart from the next moving point
//! 4. Slice the trajectory into trips ending at each stop and number the trips
//!    across the whole batch
//!
//! Objects are independent. The only state shared between them is the
//! [`TripIdCounter`], which is applied after per-object analysis so that the
//! sequential and parallel drivers number trips identically.

mod config;
mod ids;
mod progress;
mod side_search;
mod stops;
mod trips;

pub use config::{SegmentationConfig, MAX_NEIGHBOR_TIME_GAP_SECS};
pub use ids::TripIdCounter;
pub use progress::{
    AtomicProgressTracker, NoopProgress, SegmentationPhase, SegmentationProgressCallback,
};
pub use side_search::side_search;
pub use stops::detect_stop_points;
pub use trips::slice_trips;

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::ops::Range;
use std::sync::Arc;

use log::{debug, info};

use crate::error::{Result, SegmentationError};
use crate::table::{Column, ColumnNames, PointTable};
use crate::{
    PositionRecord, SegmentationResult, SegmentationStats, SegmentedPoint, Trajectory, TripSegment,
};

/// Stops and trip ranges found in one trajectory, before trip ids are assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrajectoryOutcome {
    pub object_id: String,
    /// Stop point indices, strictly increasing
    pub stop_indices: Vec<usize>,
    /// Trip index ranges (end-exclusive), chronological and non-overlapping
    pub slices: Vec<Range<usize>>,
}

/// Detect stops and slice trips for one sorted trajectory.
pub fn analyze_trajectory(trajectory: &Trajectory, config: &SegmentationConfig) -> TrajectoryOutcome {
    let stop_indices = detect_stop_points(&trajectory.points, config);
    let slices = slice_trips(&trajectory.points, &stop_indices, config);

    debug!(
        "[Segmentation] {}: {} points, {} stops, {} trips",
        trajectory.object_id,
        trajectory.len(),
        stop_indices.len(),
        slices.len()
    );

    TrajectoryOutcome {
        object_id: trajectory.object_id.clone(),
        stop_indices,
        slices,
    }
}

/// Materialise trips for an analysed trajectory, drawing ids from `counter`.
fn build_trips(
    trajectory: &Trajectory,
    outcome: &TrajectoryOutcome,
    counter: &mut TripIdCounter,
) -> Vec<TripSegment> {
    outcome
        .slices
        .iter()
        .map(|range| TripSegment {
            trip_id: counter.next_id(),
            object_id: trajectory.object_id.clone(),
            points: range
                .clone()
                .map(|index| SegmentedPoint {
                    record: trajectory.points[index].clone(),
                    index,
                    is_stop: outcome.stop_indices.binary_search(&index).is_ok(),
                })
                .collect(),
        })
        .collect()
}

/// Segment one trajectory into trips.
///
/// Trip ids are drawn from `counter`, so callers segmenting several objects
/// pass the same counter to keep ids unique across the batch.
pub fn segment_trajectory(
    trajectory: &Trajectory,
    config: &SegmentationConfig,
    counter: &mut TripIdCounter,
) -> Vec<TripSegment> {
    let outcome = analyze_trajectory(trajectory, config);
    build_trips(trajectory, &outcome, counter)
}

/// Column holding the trip identifier in [`trip_table`] output.
pub const TRIP_ID_COLUMN: &str = "trip_id";
/// Column marking stop rows in [`trip_table`] output.
pub const STOP_COLUMN: &str = "stop";

/// Sort key for object ids. Ids that parse as numbers order by value and come
/// before all other ids, which order as strings.
#[derive(Debug, Clone, Copy)]
enum ObjectKey<'a> {
    Numeric(f64, &'a str),
    Text(&'a str),
}

impl<'a> ObjectKey<'a> {
    fn new(id: &'a str) -> Self {
        match id.parse::<f64>() {
            Ok(value) => ObjectKey::Numeric(value, id),
            Err(_) => ObjectKey::Text(id),
        }
    }

    fn id(&self) -> &'a str {
        match *self {
            ObjectKey::Numeric(_, id) | ObjectKey::Text(id) => id,
        }
    }
}

impl Ord for ObjectKey<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (ObjectKey::Numeric(a, a_id), ObjectKey::Numeric(b, b_id)) => {
                a.total_cmp(b).then_with(|| a_id.cmp(b_id))
            }
            (ObjectKey::Numeric(..), ObjectKey::Text(_)) => Ordering::Less,
            (ObjectKey::Text(_), ObjectKey::Numeric(..)) => Ordering::Greater,
            (ObjectKey::Text(a), ObjectKey::Text(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for ObjectKey<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ObjectKey<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ObjectKey<'_> {}

/// Row indices of each object, objects in key order, rows stably sorted by time.
fn group_rows(records: &[PositionRecord]) -> Vec<(&str, Vec<usize>)> {
    let mut groups: BTreeMap<ObjectKey<'_>, Vec<usize>> = BTreeMap::new();
    for (row, record) in records.iter().enumerate() {
        groups.entry(ObjectKey::new(&record.object_id)).or_default().push(row);
    }

    groups
        .into_iter()
        .map(|(key, mut rows)| {
            rows.sort_by(|&a, &b| records[a].timestamp.total_cmp(&records[b].timestamp));
            (key.id(), rows)
        })
        .collect()
}

/// Partition records into trajectories.
///
/// Numeric ids are ordered by value (`9` before `10`), other ids as strings.
pub fn group_trajectories(records: &[PositionRecord]) -> Vec<Trajectory> {
    group_rows(records)
        .into_iter()
        .map(|(object_id, rows)| Trajectory {
            object_id: object_id.to_string(),
            points: rows.iter().map(|&row| records[row].clone()).collect(),
        })
        .collect()
}

/// Number trips and collect statistics, in trajectory order.
fn assemble(
    trajectories: &[Trajectory],
    outcomes: &[TrajectoryOutcome],
    progress: &dyn SegmentationProgressCallback,
) -> SegmentationResult {
    progress.on_phase(SegmentationPhase::AssigningTrips, outcomes.len() as u32);

    let mut counter = TripIdCounter::new();
    let mut trips = Vec::new();
    let mut stats = SegmentationStats {
        trajectories: trajectories.len(),
        ..SegmentationStats::default()
    };

    for (trajectory, outcome) in trajectories.iter().zip(outcomes) {
        if !outcome.stop_indices.is_empty() {
            stats.trajectories_with_stops += 1;
            stats.stop_points += outcome.stop_indices.len();
        }
        trips.extend(build_trips(trajectory, outcome, &mut counter));
        progress.on_progress();
    }

    stats.trips = trips.len();
    stats.rows = trips.iter().map(TripSegment::len).sum();

    info!(
        "[Segmentation] {} trajectories, {} with stops, {} stop points, {} trips",
        stats.trajectories, stats.trajectories_with_stops, stats.stop_points, stats.trips
    );

    SegmentationResult { trips, stats }
}

fn prepare(
    records: &[PositionRecord],
    config: &SegmentationConfig,
    progress: &dyn SegmentationProgressCallback,
) -> Result<Vec<Trajectory>> {
    config.validate()?;

    progress.on_phase(SegmentationPhase::Grouping, records.len() as u32);
    let trajectories = group_trajectories(records);

    info!(
        "[Segmentation] Segmenting {} rows across {} objects",
        records.len(),
        trajectories.len()
    );
    Ok(trajectories)
}

/// Segment a batch of records from any number of objects.
///
/// Rows need not be sorted. Objects are processed in [`group_trajectories`] order and
/// trip ids start at 1. Objects without stops contribute no trips.
pub fn segment_records(records: &[PositionRecord], config: &SegmentationConfig) -> Result<SegmentationResult> {
    segment_records_with_progress(records, config, Arc::new(NoopProgress))
}

/// [`segment_records`] with progress reporting.
pub fn segment_records_with_progress(
    records: &[PositionRecord],
    config: &SegmentationConfig,
    progress: Arc<dyn SegmentationProgressCallback>,
) -> Result<SegmentationResult> {
    let trajectories = prepare(records, config, progress.as_ref())?;

    progress.on_phase(SegmentationPhase::DetectingStops, trajectories.len() as u32);
    let outcomes: Vec<TrajectoryOutcome> = trajectories
        .iter()
        .map(|trajectory| {
            let outcome = analyze_trajectory(trajectory, config);
            progress.on_progress();
            outcome
        })
        .collect();

    Ok(assemble(&trajectories, &outcomes, progress.as_ref()))
}

/// Segment a batch with objects analysed in parallel.
///
/// Output, including trip ids, is identical to [`segment_records`].
#[cfg(feature = "parallel")]
pub fn segment_records_parallel(
    records: &[PositionRecord],
    config: &SegmentationConfig,
    progress: Arc<dyn SegmentationProgressCallback>,
) -> Result<SegmentationResult> {
    use rayon::prelude::*;

    let trajectories = prepare(records, config, progress.as_ref())?;

    progress.on_phase(SegmentationPhase::DetectingStops, trajectories.len() as u32);
    let outcomes: Vec<TrajectoryOutcome> = trajectories
        .par_iter()
        .map(|trajectory| {
            let outcome = analyze_trajectory(trajectory, config);
            progress.on_progress();
            outcome
        })
        .collect();

    Ok(assemble(&trajectories, &outcomes, progress.as_ref()))
}

/// Segment a table, reading the columns named in `columns`.
///
/// Fails with [`crate::SegmentationError::MissingColumn`] before any scan when a
/// required column is absent.
pub fn segment_table(
    table: &PointTable,
    columns: &ColumnNames,
    config: &SegmentationConfig,
) -> Result<SegmentationResult> {
    config.validate()?;
    let records = table.to_records(columns)?;

    #[cfg(feature = "parallel")]
    {
        segment_records_parallel(&records, config, Arc::new(NoopProgress))
    }
    #[cfg(not(feature = "parallel"))]
    {
        segment_records(&records, config)
    }
}

/// Map a result back onto the rows of the table it was computed from.
///
/// Returns the source rows of every trip, in trip order, with all of their
/// columns plus [`TRIP_ID_COLUMN`] and [`STOP_COLUMN`] (`true` on stop rows).
/// `result` must come from segmenting `table` with the same `columns`.
pub fn trip_table(
    table: &PointTable,
    columns: &ColumnNames,
    result: &SegmentationResult,
) -> Result<PointTable> {
    let records = table.to_records(columns)?;
    let groups: HashMap<&str, Vec<usize>> = group_rows(&records).into_iter().collect();

    let mut rows = Vec::with_capacity(result.stats.rows);
    let mut trip_ids = Vec::with_capacity(result.stats.rows);
    let mut stops = Vec::with_capacity(result.stats.rows);

    for trip in &result.trips {
        let unmapped = || SegmentationError::UnmappedTrip {
            trip_id: trip.trip_id,
            object_id: trip.object_id.clone(),
        };
        let order = groups.get(trip.object_id.as_str()).ok_or_else(unmapped)?;

        for point in &trip.points {
            rows.push(order.get(point.index).copied().ok_or_else(unmapped)?);
            trip_ids.push(trip.trip_id as f64);
            stops.push(point.is_stop.to_string());
        }
    }

    let mut output = table.select_rows(&rows);
    output.insert_column(TRIP_ID_COLUMN, Column::Numeric(trip_ids))?;
    output.insert_column(STOP_COLUMN, Column::Text(stops))?;
    Ok(output)
}
