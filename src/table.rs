//! Columnar point tables with named columns.
//!
//! A [`PointTable`] is the tabular input surface: columns are looked up by
//! name, so a table missing `lon`, `lat` or the grouping column is rejected
//! with [`SegmentationError::MissingColumn`] before any scan begins.

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{OptionExt, Result, SegmentationError};
use crate::PositionRecord;

/// Values of a single column.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Numeric(Vec<f64>),
    Text(Vec<String>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(v) => v.len(),
            Column::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cell(&self, row: usize) -> String {
        match self {
            Column::Numeric(v) => format_number(v[row]),
            Column::Text(v) => v[row].clone(),
        }
    }
}

/// Names of the columns the segmentation engine reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub lon: String,
    pub lat: String,
    pub timestamp: String,
    pub speed: String,
    /// Grouping key, e.g. a vessel MMSI
    pub identifier: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            lon: "lon".to_string(),
            lat: "lat".to_string(),
            timestamp: "timestamp".to_string(),
            speed: "speed".to_string(),
            identifier: "id".to_string(),
        }
    }
}

/// A table of equal-length named columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointTable {
    columns: Vec<(String, Column)>,
}

impl PointTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows (zero for a table without columns).
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, |(_, c)| c.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Column names in insertion order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, c)| c)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Borrow a numeric column.
    pub fn numeric(&self, name: &str) -> Result<&[f64]> {
        match self.column(name).ok_or_missing_column(name)? {
            Column::Numeric(values) => Ok(values),
            Column::Text(_) => Err(SegmentationError::ColumnType {
                column: name.to_string(),
                expected: "numeric",
            }),
        }
    }

    /// Read a column as text keys. Integral numbers are rendered without a fraction.
    pub fn keys(&self, name: &str) -> Result<Vec<String>> {
        let column = self.column(name).ok_or_missing_column(name)?;
        Ok((0..column.len()).map(|row| column.cell(row)).collect())
    }

    /// Insert or replace a column. Its length must match the existing rows.
    pub fn insert_column(&mut self, name: &str, column: Column) -> Result<()> {
        let others = self.columns.iter().find(|(n, _)| n != name);
        if let Some((_, existing)) = others {
            if existing.len() != column.len() {
                return Err(SegmentationError::LengthMismatch {
                    expected: existing.len(),
                    actual: column.len(),
                });
            }
        }

        match self.columns.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => *slot = column,
            None => self.columns.push((name.to_string(), column)),
        }
        Ok(())
    }

    /// Builder form of [`PointTable::insert_column`].
    pub fn with_column(mut self, name: &str, column: Column) -> Result<Self> {
        self.insert_column(name, column)?;
        Ok(self)
    }

    /// Convert rows into records, failing fast on missing columns.
    pub fn to_records(&self, names: &ColumnNames) -> Result<Vec<PositionRecord>> {
        let lon = self.numeric(&names.lon)?;
        let lat = self.numeric(&names.lat)?;
        let timestamp = self.numeric(&names.timestamp)?;
        let speed = self.numeric(&names.speed)?;
        let ids = self.keys(&names.identifier)?;

        Ok(ids
            .into_iter()
            .enumerate()
            .map(|(row, object_id)| PositionRecord {
                object_id,
                lon: lon[row],
                lat: lat[row],
                timestamp: timestamp[row],
                speed: speed[row],
            })
            .collect())
    }

    /// Copy `rows`, in the order given, into a table with the same columns.
    ///
    /// Panics if a row index is out of range.
    pub fn select_rows(&self, rows: &[usize]) -> PointTable {
        let columns = self
            .columns
            .iter()
            .map(|(name, column)| {
                let picked = match column {
                    Column::Numeric(v) => Column::Numeric(rows.iter().map(|&r| v[r]).collect()),
                    Column::Text(v) => Column::Text(rows.iter().map(|&r| v[r].clone()).collect()),
                };
                (name.clone(), picked)
            })
            .collect();
        PointTable { columns }
    }

    /// Load a table from CSV with a header row.
    ///
    /// A column is numeric when every non-empty cell parses as a float; empty
    /// cells become NaN, so a header-only file or an all-blank column loads as
    /// numeric. Anything else is kept as text.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(reader);
        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
        for record in reader.records() {
            let record = record?;
            for (i, column) in cells.iter_mut().enumerate() {
                column.push(record.get(i).unwrap_or_default().trim().to_string());
            }
        }

        let mut table = PointTable::new();
        for (name, raw) in headers.iter().zip(cells) {
            table.insert_column(name, parse_column(raw))?;
        }

        debug!(
            "[Table] Loaded {} rows x {} columns",
            table.len(),
            table.columns.len()
        );
        Ok(table)
    }

    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_csv_reader(BufReader::new(file))
    }

    /// Write the table as CSV with a header row.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(self.column_names())?;
        for row in 0..self.len() {
            writer.write_record(self.columns.iter().map(|(_, c)| c.cell(row)))?;
        }
        writer.flush()?;
        Ok(())
    }
}

fn parse_column(raw: Vec<String>) -> Column {
    let parsed: Option<Vec<f64>> = raw
        .iter()
        .map(|cell| {
            if cell.is_empty() {
                Some(f64::NAN)
            } else {
                cell.parse::<f64>().ok()
            }
        })
        .collect();

    match parsed {
        Some(values) => Column::Numeric(values),
        None => Column::Text(raw),
    }
}

fn format_number(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
