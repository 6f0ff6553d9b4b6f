//! Tests for point tables and table-level segmentation

use tripsplit::{
    segment_table, trip_table, Column, ColumnNames, PointTable, SegmentationConfig,
    SegmentationError, STOP_COLUMN, TRIP_ID_COLUMN,
};

const CSV: &str = "\
mmsi,lon,lat,timestamp,speed,name
244010000,0.00,0.0,0,10,ALPHA
244010000,0.01,0.0,60,10,ALPHA
244010000,0.02,0.0,120,0,ALPHA
";

/// CSV rows for one object: under way, stopped for twenty minutes, under way.
/// The last column labels each row with its time-order position.
fn stop_and_go_rows(id: &str) -> Vec<String> {
    (0..40)
        .map(|i| {
            let (lon, speed) = match i {
                0..=9 => (i as f64 * 0.01, 10.0),
                10..=29 => (0.10, 0.0),
                _ => (0.10 + (i - 29) as f64 * 0.01, 10.0),
            };
            format!("{id},{lon},0.0,{},{speed},r{i}\n", i * 60)
        })
        .collect()
}

fn mmsi_columns() -> ColumnNames {
    ColumnNames {
        identifier: "mmsi".to_string(),
        ..ColumnNames::default()
    }
}

#[test]
fn test_load_csv() {
    let table = PointTable::from_csv_reader(CSV.as_bytes()).unwrap();
    assert_eq!(table.len(), 3);
    assert_eq!(
        table.column_names().collect::<Vec<_>>(),
        vec!["mmsi", "lon", "lat", "timestamp", "speed", "name"]
    );
    assert_eq!(table.numeric("lon").unwrap(), &[0.0, 0.01, 0.02]);
    assert!(matches!(table.column("name"), Some(Column::Text(_))));
}

#[test]
fn test_numeric_ids_render_as_integers() {
    let table = PointTable::from_csv_reader(CSV.as_bytes()).unwrap();
    let records = table.to_records(&mmsi_columns()).unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].object_id, "244010000");
    assert_eq!(records[2].speed, 0.0);
}

#[test]
fn test_missing_grouping_column_rejected() {
    let table = PointTable::from_csv_reader(CSV.as_bytes()).unwrap();
    let err = segment_table(&table, &ColumnNames::default(), &SegmentationConfig::default())
        .unwrap_err();
    assert!(matches!(
        err,
        SegmentationError::MissingColumn { ref column } if column == "id"
    ));
}

#[test]
fn test_missing_coordinate_column_rejected() {
    let table = PointTable::new()
        .with_column("id", Column::Text(vec!["a".into()]))
        .unwrap()
        .with_column("lat", Column::Numeric(vec![0.0]))
        .unwrap();
    let err = table.to_records(&ColumnNames::default()).unwrap_err();
    assert!(matches!(
        err,
        SegmentationError::MissingColumn { ref column } if column == "lon"
    ));
}

#[test]
fn test_text_column_where_numeric_expected() {
    let table = PointTable::from_csv_reader(CSV.as_bytes()).unwrap();
    let columns = ColumnNames {
        speed: "name".to_string(),
        ..mmsi_columns()
    };
    let err = table.to_records(&columns).unwrap_err();
    assert!(matches!(err, SegmentationError::ColumnType { .. }));
}

#[test]
fn test_insert_column_length_checked() {
    let mut table = PointTable::new()
        .with_column("a", Column::Numeric(vec![1.0, 2.0]))
        .unwrap();
    let err = table
        .insert_column("b", Column::Numeric(vec![1.0]))
        .unwrap_err();
    assert!(matches!(
        err,
        SegmentationError::LengthMismatch {
            expected: 2,
            actual: 1
        }
    ));

    // Replacing the only column may change the row count
    table.insert_column("a", Column::Numeric(vec![5.0])).unwrap();
    assert_eq!(table.len(), 1);
}

#[test]
fn test_write_csv_round_trip() {
    let table = PointTable::from_csv_reader(CSV.as_bytes()).unwrap();
    let mut out = Vec::new();
    table.write_csv(&mut out).unwrap();

    let reloaded = PointTable::from_csv_reader(out.as_slice()).unwrap();
    assert_eq!(reloaded, table);
}

#[test]
fn test_segment_table_end_to_end() {
    let mut csv = String::from("id,lon,lat,timestamp,speed,label\n");
    csv.extend(stop_and_go_rows("7"));

    let table = PointTable::from_csv_reader(csv.as_bytes()).unwrap();
    let result = segment_table(&table, &ColumnNames::default(), &SegmentationConfig::default())
        .unwrap();

    assert_eq!(result.trips.len(), 2);
    assert!(result.trips.iter().all(|t| t.object_id == "7"));
    assert_eq!(result.stats.rows, 11 + 10);
}

#[test]
fn test_header_only_csv_is_empty_input() {
    let table = PointTable::from_csv_reader("id,lon,lat,timestamp,speed\n".as_bytes()).unwrap();
    assert!(table.is_empty());
    assert_eq!(table.numeric("lon").unwrap(), &[] as &[f64]);

    let result = segment_table(&table, &ColumnNames::default(), &SegmentationConfig::default())
        .unwrap();
    assert!(result.trips.is_empty());
    assert_eq!(result.stats.trajectories, 0);
}

#[test]
fn test_blank_speed_column_loads_as_numeric() {
    let csv = "id,lon,lat,timestamp,speed\na,0.0,0.0,0,\na,0.0,0.0,60,\n";
    let table = PointTable::from_csv_reader(csv.as_bytes()).unwrap();
    assert!(table.numeric("speed").unwrap().iter().all(|s| s.is_nan()));

    let result = segment_table(&table, &ColumnNames::default(), &SegmentationConfig::default())
        .unwrap();
    assert!(result.trips.is_empty());
}

#[test]
fn test_numeric_csv_ids_numbered_by_value() {
    let mut csv = String::from("mmsi,lon,lat,timestamp,speed,label\n");
    csv.extend(stop_and_go_rows("10"));
    csv.extend(stop_and_go_rows("9"));

    let table = PointTable::from_csv_reader(csv.as_bytes()).unwrap();
    let result = segment_table(&table, &mmsi_columns(), &SegmentationConfig::default()).unwrap();

    let order: Vec<(u64, &str)> = result
        .trips
        .iter()
        .map(|t| (t.trip_id, t.object_id.as_str()))
        .collect();
    assert_eq!(order, vec![(1, "9"), (2, "9"), (3, "10"), (4, "10")]);
}

#[test]
fn test_trip_table_keeps_source_columns() {
    // Rows arrive newest first; output follows trip order.
    let mut rows = stop_and_go_rows("7");
    rows.reverse();
    let mut csv = String::from("id,lon,lat,timestamp,speed,label\n");
    csv.extend(rows);

    let table = PointTable::from_csv_reader(csv.as_bytes()).unwrap();
    let columns = ColumnNames::default();
    let result = segment_table(&table, &columns, &SegmentationConfig::default()).unwrap();
    let output = trip_table(&table, &columns, &result).unwrap();

    assert_eq!(
        output.column_names().collect::<Vec<_>>(),
        vec!["id", "lon", "lat", "timestamp", "speed", "label", TRIP_ID_COLUMN, STOP_COLUMN]
    );
    assert_eq!(output.len(), 21);

    let labels = output.keys("label").unwrap();
    let trip_ids = output.numeric(TRIP_ID_COLUMN).unwrap();
    let stops = output.keys(STOP_COLUMN).unwrap();

    assert_eq!(labels[0], "r0");
    assert_eq!(labels[10], "r10");
    assert_eq!(stops[10], "true");
    assert_eq!(trip_ids[10], 1.0);
    assert_eq!(labels[11], "r30");
    assert_eq!(trip_ids[11], 2.0);
    assert_eq!(stops.iter().filter(|s| *s == "true").count(), 1);
}

#[test]
fn test_trip_table_rejects_foreign_result() {
    let mut csv = String::from("id,lon,lat,timestamp,speed,label\n");
    csv.extend(stop_and_go_rows("7"));
    let table = PointTable::from_csv_reader(csv.as_bytes()).unwrap();
    let columns = ColumnNames::default();
    let result = segment_table(&table, &columns, &SegmentationConfig::default()).unwrap();

    let mut other = String::from("id,lon,lat,timestamp,speed,label\n");
    other.extend(stop_and_go_rows("8"));
    let other = PointTable::from_csv_reader(other.as_bytes()).unwrap();

    let err = trip_table(&other, &columns, &result).unwrap_err();
    assert!(matches!(err, SegmentationError::UnmappedTrip { trip_id: 1, .. }));
}
