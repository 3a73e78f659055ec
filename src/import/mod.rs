//! Track file import
//!
//! Importers turn a track file into ordered [`TrackPoint`]s; the pacing core
//! never sees file formats.

use std::path::Path;
use tracing::info;

use crate::error::{ImportError, Result};
use crate::models::TrackPoint;
use crate::validation::InputValidator;

pub mod csv;
pub mod gpx;

/// Trait for importing track points from different file formats
pub trait TrackImporter {
    /// Check if this importer can handle the given file
    fn can_import(&self, file_path: &Path) -> bool;

    /// Read the track points from the file, in ride order
    fn import_file(&self, file_path: &Path) -> Result<Vec<TrackPoint>>;

    /// Get the format name for this importer
    fn format_name(&self) -> &'static str;
}

/// Dispatches to the importer matching a file's extension
pub struct ImportManager {
    importers: Vec<Box<dyn TrackImporter>>,
}

impl Default for ImportManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportManager {
    /// Create a new import manager with all available importers
    pub fn new() -> Self {
        let importers: Vec<Box<dyn TrackImporter>> = vec![
            Box::new(gpx::GpxImporter::new()),
            Box::new(csv::CsvImporter::new()),
        ];

        Self { importers }
    }

    /// Import a track file, auto-detecting the format, and drop unusable points
    pub fn import_file(&self, file_path: &Path) -> Result<Vec<TrackPoint>> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound {
                path: file_path.to_path_buf(),
            }
            .into());
        }

        let importer = self
            .importers
            .iter()
            .find(|importer| importer.can_import(file_path))
            .ok_or_else(|| ImportError::UnsupportedFormat {
                extension: file_path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .unwrap_or("")
                    .to_string(),
            })?;

        let points = InputValidator::clean_track_points(importer.import_file(file_path)?);
        info!(
            file = %file_path.display(),
            format = importer.format_name(),
            points = points.len(),
            "Track imported"
        );

        Ok(points)
    }
}

pub(crate) fn has_extension(file_path: &Path, expected: &str) -> bool {
    file_path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(expected))
        .unwrap_or(false)
}
