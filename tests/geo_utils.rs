//! Tests for geo_utils module

use tripsplit::geo_utils::*;
use tripsplit::PositionRecord;

fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

fn at(lon: f64, lat: f64, timestamp: f64) -> PositionRecord {
    PositionRecord::new("a", lon, lat, timestamp, 0.0)
}

#[test]
fn test_haversine_distance_same_point() {
    let p = at(23.6403, 37.9420, 0.0);
    assert_eq!(haversine_distance(&p, &p), 0.0);
}

#[test]
fn test_haversine_distance_known_value() {
    // Piraeus to Heraklion is roughly 318 km great-circle
    let piraeus = at(23.6403, 37.9420, 0.0);
    let heraklion = at(25.1442, 35.3387, 0.0);
    let dist = haversine_distance(&piraeus, &heraklion);
    assert!(approx_eq(dist, 318.0, 5.0), "got {dist}");
}

#[test]
fn test_haversine_symmetric() {
    let a = at(-5.35, 36.14, 0.0);
    let b = at(-6.29, 36.53, 0.0);
    assert_eq!(haversine_distance(&a, &b), haversine_distance(&b, &a));
}

#[test]
fn test_haversine_antipodal() {
    let d = haversine_km(10.0, 20.0, -170.0, -20.0);
    assert!(approx_eq(d, std::f64::consts::PI * EARTH_RADIUS_KM, 1e-2));
}

#[test]
fn test_haversine_monotonic_in_separation() {
    let mut last = 0.0;
    for step in 1..=18 {
        let d = haversine_km(0.0, 0.0, step as f64 * 10.0, 0.0);
        assert!(d > last);
        last = d;
    }
}

#[test]
fn test_distances_to_anchor() {
    let anchor = at(0.0, 0.0, 0.0);
    let points = vec![at(0.0, 0.0, 0.0), at(0.01, 0.0, 0.0), at(0.02, 0.0, 0.0)];
    let d = distances_to_anchor(&points, &anchor);
    assert_eq!(d.len(), 3);
    assert_eq!(d[0], 0.0);
    assert!(approx_eq(d[1], 1.111, 0.01));
    assert!(approx_eq(d[2], 2.0 * d[1], 1e-9));
}

#[test]
fn test_elapsed_time_non_negative() {
    let a = at(0.0, 0.0, 1_600_000_000.0);
    let b = at(0.0, 0.0, 1_600_000_600.0);
    assert_eq!(elapsed_time(&a, &b), 600.0);
    assert_eq!(elapsed_time(&b, &a), 600.0);
    assert_eq!(elapsed_time(&a, &a), 0.0);

    let times = elapsed_times_to_anchor(&[a.clone(), b.clone()], &b);
    assert_eq!(times, vec![600.0, 0.0]);
}

#[test]
fn test_initial_bearing_range() {
    let b = initial_bearing(23.64, 37.94, 25.14, 35.34);
    // Heraklion lies south-east of Piraeus
    assert!(b > 90.0 && b < 180.0, "got {b}");
    assert!(initial_bearing(0.0, 0.0, f64::NAN, 0.0).is_nan());
}
