//! Tests for row-pairwise kinematics

use tripsplit::kinematics::*;
use tripsplit::{Column, ColumnNames, PointTable, SegmentationError};

fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

#[test]
fn test_distance_series_first_is_nan() {
    let d = distance_diff_series(&[0.0, 0.01, 0.03], &[0.0, 0.0, 0.0]).unwrap();
    assert!(d[0].is_nan());
    assert!(approx_eq(d[1], 1.111, 0.01));
    assert!(approx_eq(d[2], 2.222, 0.01));
}

#[test]
fn test_time_series() {
    let t = time_diff_series(&[0.0, 60.0, 60.0, 200.0]);
    assert!(t[0].is_nan());
    assert_eq!(&t[1..], &[60.0, 0.0, 140.0]);
}

#[test]
fn test_speed_series() {
    let s = speed_series(&[f64::NAN, 1.0, 0.0, 1.0], &[f64::NAN, 100.0, 0.0, 0.0]).unwrap();
    assert!(s[0].is_nan());
    assert_eq!(s[1], 0.01);
    assert!(s[2].is_nan());
    assert!(s[3].is_infinite());
}

#[test]
fn test_bearing_series_last_is_nan() {
    let b = bearing_series(&[0.0, 0.0, 1.0], &[0.0, 1.0, 1.0]).unwrap();
    assert!(approx_eq(b[0], 0.0, 1e-9));
    assert!(approx_eq(b[1], 90.0, 0.05));
    assert!(b[2].is_nan());
}

#[test]
fn test_sequence_length_mismatch() {
    let err = distance_diff_series(&[0.0, 1.0], &[0.0]).unwrap_err();
    assert!(matches!(
        err,
        SegmentationError::LengthMismatch {
            expected: 2,
            actual: 1
        }
    ));
    assert!(speed_series(&[1.0], &[]).is_err());
    assert!(bearing_series(&[], &[1.0]).is_err());
}

#[test]
fn test_table_transforms_add_columns() {
    let mut table = PointTable::new()
        .with_column("x", Column::Numeric(vec![0.0, 0.01, 0.02]))
        .unwrap()
        .with_column("y", Column::Numeric(vec![0.0, 0.0, 0.0]))
        .unwrap()
        .with_column("t", Column::Numeric(vec![0.0, 60.0, 120.0]))
        .unwrap();

    calculate_distance(&mut table, "x", "y").unwrap();
    calculate_time_difference(&mut table, "t").unwrap();
    calculate_speed(&mut table, DISTANCE_DIFF_COLUMN, TIME_DIFF_COLUMN).unwrap();
    calculate_bearing(&mut table, "x", "y").unwrap();

    let speed = table.numeric(SPEED_COLUMN).unwrap();
    assert!(speed[0].is_nan());
    assert!(approx_eq(speed[1], 1.111 / 60.0, 1e-4));

    let bearing = table.numeric(BEARING_COLUMN).unwrap();
    assert!(approx_eq(bearing[0], 90.0, 1e-6));
    assert!(bearing[2].is_nan());
}

#[test]
fn test_table_transform_missing_column() {
    let mut table = PointTable::new()
        .with_column("lon", Column::Numeric(vec![0.0]))
        .unwrap();
    let err = calculate_distance(&mut table, "lon", "lat").unwrap_err();
    assert!(matches!(err, SegmentationError::MissingColumn { .. }));
    assert!(!table.has_column(DISTANCE_DIFF_COLUMN));
}

#[test]
fn test_annotate_kinematics_per_object() {
    // Two objects interleaved, the second one listed out of time order
    let mut table = PointTable::new()
        .with_column(
            "id",
            Column::Text(vec!["a".into(), "b".into(), "a".into(), "b".into()]),
        )
        .unwrap()
        .with_column("lon", Column::Numeric(vec![0.0, 5.01, 0.01, 5.0]))
        .unwrap()
        .with_column("lat", Column::Numeric(vec![0.0; 4]))
        .unwrap()
        .with_column("timestamp", Column::Numeric(vec![0.0, 3600.0, 3600.0, 0.0]))
        .unwrap();

    annotate_kinematics(&mut table, &ColumnNames::default(), SpeedUnit::KilometersPerHour).unwrap();

    let speed = table.numeric("speed").unwrap();
    // a: first row has no predecessor
    assert!(speed[0].is_nan());
    // b: row 3 is earlier, so row 1 pairs with it
    assert!(speed[3].is_nan());
    assert!(approx_eq(speed[1], 1.111, 0.01));
    assert!(approx_eq(speed[2], 1.111, 0.01));

    let bearing = table.numeric(BEARING_COLUMN).unwrap();
    assert!(approx_eq(bearing[0], 90.0, 1e-6));
    assert!(bearing[1].is_nan());
}

#[test]
fn test_speed_units() {
    assert_eq!(SpeedUnit::KilometersPerSecond.factor(), 1.0);
    assert_eq!(SpeedUnit::KilometersPerHour.factor(), 3600.0);
    assert!(approx_eq(SpeedUnit::Knots.factor() / 3600.0, 1.0 / 1.852, 1e-12));
}
