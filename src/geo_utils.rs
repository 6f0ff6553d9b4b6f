//! Geo-temporal primitives: great-circle distance, elapsed time and bearing.
//!
//! All functions are pure and total. Coincident points give a distance of
//! exactly zero and equal timestamps an elapsed time of zero.

use crate::PositionRecord;

/// Mean earth radius used by the haversine, in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6367.0;

/// Great-circle distance in kilometers between two `(lon, lat)` pairs in decimal degrees.
pub fn haversine_km(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1_rad.cos() * lat2_rad.cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push `a` just above 1 for antipodal points.
    let c = 2.0 * a.clamp(0.0, 1.0).sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Great-circle distance in kilometers between two position records.
///
/// # Example
/// ```
/// use tripsplit::PositionRecord;
/// use tripsplit::geo_utils::haversine_distance;
///
/// let a = PositionRecord::new("1", 23.64, 37.94, 0.0, 0.0);
/// assert_eq!(haversine_distance(&a, &a), 0.0);
/// ```
pub fn haversine_distance(a: &PositionRecord, b: &PositionRecord) -> f64 {
    haversine_km(a.lon, a.lat, b.lon, b.lat)
}

/// Distance from every point in `points` to `anchor`, elementwise.
pub fn distances_to_anchor(points: &[PositionRecord], anchor: &PositionRecord) -> Vec<f64> {
    points
        .iter()
        .map(|p| haversine_distance(p, anchor))
        .collect()
}

/// Absolute time between two records, in the timestamp unit (seconds).
pub fn elapsed_time(a: &PositionRecord, b: &PositionRecord) -> f64 {
    (b.timestamp - a.timestamp).abs()
}

/// Elapsed time from every point in `points` to `anchor`, elementwise.
pub fn elapsed_times_to_anchor(points: &[PositionRecord], anchor: &PositionRecord) -> Vec<f64> {
    points.iter().map(|p| elapsed_time(p, anchor)).collect()
}

/// Initial bearing in degrees `[0, 360)` when travelling from the first point to the second.
///
/// Returns NaN when either coordinate is NaN.
pub fn initial_bearing(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let y = d_lon.sin() * lat2_rad.cos();
    let x = lat1_rad.cos() * lat2_rad.sin() - lat1_rad.sin() * lat2_rad.cos() * d_lon.cos();

    (y.atan2(x).to_degrees() + 360.0) % 360.0
}
