use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::{ImportError, Result};
use crate::import::{has_extension, TrackImporter};
use crate::models::TrackPoint;

/// GPX importer for GPS track data
///
/// Reads every track segment in document order. Files without tracks fall
/// back to their routes. Points without elevation sit at 0 m.
pub struct GpxImporter;

impl GpxImporter {
    pub fn new() -> Self {
        Self
    }

    fn to_track_point(waypoint: &gpx::Waypoint) -> TrackPoint {
        let point = waypoint.point();
        TrackPoint::new(point.y(), point.x(), waypoint.elevation.unwrap_or(0.0))
    }

    /// Parse GPX from any reader
    pub fn read_points<R: std::io::Read>(reader: R) -> Result<Vec<TrackPoint>> {
        let document = gpx::read(reader).map_err(|e| ImportError::ParseError {
            format: "GPX".to_string(),
            reason: e.to_string(),
        })?;

        let track_points: Vec<TrackPoint> = document
            .tracks
            .iter()
            .flat_map(|track| track.segments.iter())
            .flat_map(|segment| segment.points.iter())
            .map(Self::to_track_point)
            .collect();

        if !track_points.is_empty() {
            return Ok(track_points);
        }

        let route_points: Vec<TrackPoint> = document
            .routes
            .iter()
            .flat_map(|route| route.points.iter())
            .map(Self::to_track_point)
            .collect();

        if route_points.is_empty() {
            return Err(ImportError::MissingData {
                field: "trkpt or rtept".to_string(),
            }
            .into());
        }

        Ok(route_points)
    }
}

impl Default for GpxImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackImporter for GpxImporter {
    fn can_import(&self, file_path: &Path) -> bool {
        has_extension(file_path, "gpx")
    }

    fn import_file(&self, file_path: &Path) -> Result<Vec<TrackPoint>> {
        let file = File::open(file_path)?;
        Self::read_points(BufReader::new(file))
    }

    fn format_name(&self) -> &'static str {
        "GPX"
    }
}
