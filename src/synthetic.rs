//! Synthetic vessel voyages for tests and benchmarks.
//!
//! Generates AIS-like position reports for vessels that alternate between
//! steaming legs and moorings, with the mooring windows recorded as ground
//! truth for validating stop detection.
//!
//! Feature-gated behind `synthetic`.
//!
//! # Example
//!
//! ```rust
//! use tripsplit::synthetic::{Leg, VoyageScenario};
//!
//! let scenario = VoyageScenario {
//!     object_id: "237000001".to_string(),
//!     origin: (23.60, 37.90),
//!     heading_deg: 90.0,
//!     start_timestamp: 1_600_000_000.0,
//!     sample_interval_secs: 60.0,
//!     legs: vec![Leg::underway(600.0, 12.0), Leg::moored(1800.0), Leg::underway(600.0, 12.0)],
//!     position_noise_meters: 5.0,
//!     seed: 7,
//! };
//!
//! let voyage = scenario.generate();
//! assert_eq!(voyage.expected_stops.len(), 1);
//! ```

use std::ops::RangeInclusive;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::PositionRecord;

// ============================================================================
// Types
// ============================================================================

/// One phase of a voyage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Leg {
    /// Steaming on the current heading.
    Underway { duration_secs: f64, speed_knots: f64 },
    /// Alongside, drifting only by position noise.
    Moored { duration_secs: f64 },
}

impl Leg {
    pub fn underway(duration_secs: f64, speed_knots: f64) -> Self {
        Leg::Underway {
            duration_secs,
            speed_knots,
        }
    }

    pub fn moored(duration_secs: f64) -> Self {
        Leg::Moored { duration_secs }
    }

    fn duration(&self) -> f64 {
        match *self {
            Leg::Underway { duration_secs, .. } | Leg::Moored { duration_secs } => duration_secs,
        }
    }
}

/// A mooring window in the generated records (indices are time-sorted positions).
#[derive(Debug, Clone, PartialEq)]
pub struct ExpectedStop {
    pub indices: RangeInclusive<usize>,
    pub start_timestamp: f64,
    pub end_timestamp: f64,
}

/// Records and ground truth for one vessel.
#[derive(Debug, Clone)]
pub struct SyntheticVoyage {
    pub object_id: String,
    /// Records in time order; speed is in knots
    pub records: Vec<PositionRecord>,
    pub expected_stops: Vec<ExpectedStop>,
}

/// Configuration for a single voyage.
#[derive(Debug, Clone)]
pub struct VoyageScenario {
    pub object_id: String,
    /// Starting `(lon, lat)` in degrees.
    pub origin: (f64, f64),
    /// Course in degrees, clockwise from north.
    pub heading_deg: f64,
    pub start_timestamp: f64,
    pub sample_interval_secs: f64,
    pub legs: Vec<Leg>,
    /// Standard deviation of position noise in meters.
    pub position_noise_meters: f64,
    /// RNG seed for deterministic reproduction.
    pub seed: u64,
}

/// Several vessels with interleaved reports.
#[derive(Debug, Clone)]
pub struct SyntheticFleet {
    pub voyages: Vec<SyntheticVoyage>,
}

impl SyntheticFleet {
    /// All records, interleaved by timestamp across vessels.
    pub fn records(&self) -> Vec<PositionRecord> {
        let mut all: Vec<PositionRecord> = self
            .voyages
            .iter()
            .flat_map(|v| v.records.iter().cloned())
            .collect();
        all.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        all
    }

    pub fn total_expected_stops(&self) -> usize {
        self.voyages.iter().map(|v| v.expected_stops.len()).sum()
    }
}

// ============================================================================
// Coordinate Helpers
// ============================================================================

/// Meters per degree of latitude (approximately constant).
const METERS_PER_DEG_LAT: f64 = 111_320.0;

const METERS_PER_NAUTICAL_MILE: f64 = 1852.0;

fn meters_to_deg_lat(meters: f64) -> f64 {
    meters / METERS_PER_DEG_LAT
}

fn meters_to_deg_lon(meters: f64, latitude: f64) -> f64 {
    let meters_per_deg_lon = METERS_PER_DEG_LAT * latitude.to_radians().cos();
    if meters_per_deg_lon.abs() < 1e-10 {
        return 0.0;
    }
    meters / meters_per_deg_lon
}

/// Move `(lon, lat)` by `meters` along `heading_deg`.
fn advance(position: (f64, f64), heading_deg: f64, meters: f64) -> (f64, f64) {
    let heading = heading_deg.to_radians();
    let (lon, lat) = position;
    let dlat = meters_to_deg_lat(meters * heading.cos());
    let dlon = meters_to_deg_lon(meters * heading.sin(), lat);
    (lon + dlon, lat + dlat)
}

/// Gaussian sample via Box-Muller.
fn gaussian(rng: &mut StdRng, sigma: f64) -> f64 {
    if sigma <= 0.0 {
        return 0.0;
    }
    let u1: f64 = rng.gen_range(0.0001..1.0);
    let u2: f64 = rng.gen_range(0.0..1.0);
    sigma * (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

// ============================================================================
// Generation
// ============================================================================

impl VoyageScenario {
    /// Generate the voyage.
    ///
    /// One report is emitted every `sample_interval_secs`, starting with the
    /// first instant of each leg. Moored reports carry a speed below 0.5 knots.
    pub fn generate(&self) -> SyntheticVoyage {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut records = Vec::new();
        let mut expected_stops = Vec::new();

        let mut position = self.origin;
        let mut timestamp = self.start_timestamp;
        let interval = self.sample_interval_secs.max(1.0);

        for leg in &self.legs {
            let samples = (leg.duration() / interval).round().max(1.0) as usize;
            let first_index = records.len();

            for _ in 0..samples {
                let (reported, speed) = match *leg {
                    Leg::Underway { speed_knots, .. } => {
                        let meters = speed_knots * METERS_PER_NAUTICAL_MILE * interval / 3600.0;
                        position = advance(position, self.heading_deg, meters);
                        (position, speed_knots + gaussian(&mut rng, 0.3).abs())
                    }
                    Leg::Moored { .. } => (position, rng.gen_range(0.0..0.5)),
                };

                let noise_north = gaussian(&mut rng, self.position_noise_meters);
                let noise_east = gaussian(&mut rng, self.position_noise_meters);
                let (lon, lat) = advance(advance(reported, 0.0, noise_north), 90.0, noise_east);

                records.push(PositionRecord::new(self.object_id.clone(), lon, lat, timestamp, speed));
                timestamp += interval;
            }

            if let Leg::Moored { .. } = leg {
                let last_index = records.len() - 1;
                expected_stops.push(ExpectedStop {
                    indices: first_index..=last_index,
                    start_timestamp: records[first_index].timestamp,
                    end_timestamp: records[last_index].timestamp,
                });
            }
        }

        SyntheticVoyage {
            object_id: self.object_id.clone(),
            records,
            expected_stops,
        }
    }
}

// ============================================================================
// Preset Scenarios
// ============================================================================

impl VoyageScenario {
    /// A ferry doing `calls` port calls of 40 minutes between 30-minute crossings.
    pub fn coastal_ferry(object_id: &str, calls: usize, seed: u64) -> Self {
        let mut legs = vec![Leg::underway(1800.0, 14.0)];
        for _ in 0..calls {
            legs.push(Leg::moored(2400.0));
            legs.push(Leg::underway(1800.0, 14.0));
        }

        Self {
            object_id: object_id.to_string(),
            origin: (23.60, 37.90),
            heading_deg: 120.0,
            start_timestamp: 1_600_000_000.0,
            sample_interval_secs: 60.0,
            legs,
            position_noise_meters: 8.0,
            seed,
        }
    }

    /// A vessel that never slows down.
    pub fn transit_only(object_id: &str, duration_secs: f64, seed: u64) -> Self {
        Self {
            legs: vec![Leg::underway(duration_secs, 12.0)],
            ..Self::coastal_ferry(object_id, 0, seed)
        }
    }
}

/// A fleet of coastal ferries with distinct ids, courses and seeds.
pub fn ferry_fleet(vessel_count: usize, calls: usize, seed: u64) -> SyntheticFleet {
    let voyages = (0..vessel_count)
        .map(|i| {
            let mut scenario =
                VoyageScenario::coastal_ferry(&format!("2370{:05}", i), calls, seed.wrapping_add(i as u64));
            scenario.heading_deg = (i as f64 * 37.0) % 360.0;
            scenario.origin.1 += i as f64 * 0.05;
            scenario.generate()
        })
        .collect();

    SyntheticFleet { voyages }
}
