use tracing::warn;

use crate::error::{Result, RoutePaceError};
use crate::models::{RiderEnvironmentParams, RouteSegment, TrackPoint};

/// Boundary checks for track points, segments and rider parameters
pub struct InputValidator;

impl InputValidator {
    /// Reject parameters that would make the power model meaningless
    pub fn validate_params(params: &RiderEnvironmentParams) -> Result<()> {
        Self::require_positive("ftp", params.ftp)?;
        Self::require_positive("w_prime", params.w_prime)?;
        Self::require_positive("total_mass", params.total_mass)?;
        Self::require_positive("cda", params.cda)?;
        Self::require_non_negative("crr", params.crr)?;
        Self::require_non_negative("wind_speed", params.wind_speed)?;

        if !params.wind_direction.is_finite() {
            return Err(RoutePaceError::non_physical(
                "wind_direction",
                params.wind_direction,
                "must be a finite compass direction",
            ));
        }

        if !(params.target_intensity > 0.0 && params.target_intensity <= 200.0) {
            return Err(RoutePaceError::non_physical(
                "target_intensity",
                params.target_intensity,
                "must be in (0, 200] percent of FTP",
            ));
        }

        Ok(())
    }

    /// Reject an empty route and segments with unusable lengths
    pub fn validate_segments(segments: &[RouteSegment]) -> Result<()> {
        if segments.is_empty() {
            return Err(RoutePaceError::input_too_short("segment sequence", 0, 1));
        }

        for segment in segments {
            if !(segment.distance.is_finite() && segment.distance >= 0.0) {
                return Err(RoutePaceError::non_physical(
                    "distance",
                    segment.distance,
                    "segment length must be finite and non-negative",
                ));
            }
            if !segment.gradient.is_finite() {
                return Err(RoutePaceError::non_physical(
                    "gradient",
                    segment.gradient,
                    "segment gradient must be finite",
                ));
            }
        }

        let total_distance: f64 = segments.iter().map(|s| s.distance).sum();
        if total_distance <= 0.0 {
            return Err(RoutePaceError::non_physical(
                "distance",
                total_distance,
                "route has no length",
            ));
        }

        Ok(())
    }

    /// Drop track points that cannot be placed on the globe
    pub fn clean_track_points(points: Vec<TrackPoint>) -> Vec<TrackPoint> {
        let total = points.len();
        let cleaned: Vec<TrackPoint> = points.into_iter().filter(Self::is_valid_point).collect();

        let dropped = total - cleaned.len();
        if dropped > 0 {
            warn!(dropped, total, "Discarded invalid track points");
        }

        cleaned
    }

    fn is_valid_point(point: &TrackPoint) -> bool {
        point.latitude.is_finite()
            && point.longitude.is_finite()
            && point.elevation.is_finite()
            && (-90.0..=90.0).contains(&point.latitude)
            && (-180.0..=180.0).contains(&point.longitude)
    }

    fn require_positive(parameter: &str, value: f64) -> Result<()> {
        if value.is_finite() && value > 0.0 {
            Ok(())
        } else {
            Err(RoutePaceError::non_physical(parameter, value, "must be positive"))
        }
    }

    fn require_non_negative(parameter: &str, value: f64) -> Result<()> {
        if value.is_finite() && value >= 0.0 {
            Ok(())
        } else {
            Err(RoutePaceError::non_physical(parameter, value, "must not be negative"))
        }
    }
}
