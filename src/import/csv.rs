use csv::{ReaderBuilder, StringRecord};
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use crate::error::{ImportError, Result};
use crate::import::{has_extension, TrackImporter};
use crate::models::TrackPoint;

/// CSV importer with flexible column mapping
///
/// Expects a header row naming latitude and longitude columns. Elevation is
/// optional and defaults to 0 m.
pub struct CsvImporter {
    column_mapping: HashMap<String, String>,
}

impl CsvImporter {
    pub fn new() -> Self {
        let mut column_mapping = HashMap::new();

        // Common column name variations
        Self::add_mapping(
            &mut column_mapping,
            "latitude",
            &["latitude", "lat", "position_lat"],
        );
        Self::add_mapping(
            &mut column_mapping,
            "longitude",
            &["longitude", "lon", "lng", "long", "position_long"],
        );
        Self::add_mapping(
            &mut column_mapping,
            "elevation",
            &["elevation", "ele", "altitude", "alt"],
        );

        Self { column_mapping }
    }

    fn add_mapping(mapping: &mut HashMap<String, String>, standard: &str, variations: &[&str]) {
        for variation in variations {
            mapping.insert(variation.to_string(), standard.to_string());
        }
    }

    /// Column index of each recognized field
    fn map_headers(&self, headers: &StringRecord) -> HashMap<String, usize> {
        let mut columns = HashMap::new();
        for (index, header) in headers.iter().enumerate() {
            let normalized = header.trim().to_lowercase();
            if let Some(standard) = self.column_mapping.get(&normalized) {
                columns.entry(standard.clone()).or_insert(index);
            }
        }
        columns
    }

    fn parse_field(record: &StringRecord, index: usize, field: &str, line: usize) -> Result<f64> {
        let raw = record.get(index).map(str::trim).unwrap_or("");
        raw.parse::<f64>().map_err(|_| {
            ImportError::ParseError {
                format: "CSV".to_string(),
                reason: format!("line {}: invalid {} value '{}'", line, field, raw),
            }
            .into()
        })
    }

    /// Parse CSV from any reader
    pub fn read_points<R: std::io::Read>(&self, reader: R) -> Result<Vec<TrackPoint>> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let csv_error = |e: csv::Error| ImportError::ParseError {
            format: "CSV".to_string(),
            reason: e.to_string(),
        };

        let headers = csv_reader.headers().map_err(csv_error)?.clone();
        let columns = self.map_headers(&headers);

        let latitude_col = *columns.get("latitude").ok_or_else(|| ImportError::MissingData {
            field: "latitude".to_string(),
        })?;
        let longitude_col = *columns.get("longitude").ok_or_else(|| ImportError::MissingData {
            field: "longitude".to_string(),
        })?;
        let elevation_col = columns.get("elevation").copied();

        let mut points = Vec::new();
        for (row, record) in csv_reader.records().enumerate() {
            let record = record.map_err(csv_error)?;
            // header is line 1
            let line = row + 2;

            let latitude = Self::parse_field(&record, latitude_col, "latitude", line)?;
            let longitude = Self::parse_field(&record, longitude_col, "longitude", line)?;
            let elevation = match elevation_col {
                Some(index) if record.get(index).map_or(false, |v| !v.trim().is_empty()) => {
                    Self::parse_field(&record, index, "elevation", line)?
                }
                _ => 0.0,
            };

            points.push(TrackPoint::new(latitude, longitude, elevation));
        }

        Ok(points)
    }
}

impl Default for CsvImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackImporter for CsvImporter {
    fn can_import(&self, file_path: &Path) -> bool {
        has_extension(file_path, "csv")
    }

    fn import_file(&self, file_path: &Path) -> Result<Vec<TrackPoint>> {
        let file = File::open(file_path)?;
        self.read_points(file)
    }

    fn format_name(&self) -> &'static str {
        "CSV"
    }
}
