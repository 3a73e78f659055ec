use serde::Serialize;
use std::path::Path;

use super::ExportError;
use crate::models::OptimizedSegment;

/// One CSV row per planned segment
#[derive(Debug, Serialize)]
struct SegmentRow {
    segment: usize,
    start_latitude: f64,
    start_longitude: f64,
    end_latitude: f64,
    end_longitude: f64,
    distance_m: f64,
    cumulative_distance_m: f64,
    elevation_m: f64,
    gradient_percent: f64,
    bearing_deg: f64,
    headwind_ms: f64,
    target_power_w: f64,
    optimized_power_w: f64,
    overridden: bool,
    w_balance_j: f64,
    speed_kmh: f64,
    time_s: f64,
    elapsed_time_s: f64,
}

impl SegmentRow {
    fn from_segment(index: usize, planned: &OptimizedSegment) -> Self {
        let segment = &planned.segment;
        SegmentRow {
            segment: index + 1,
            start_latitude: segment.start_latitude,
            start_longitude: segment.start_longitude,
            end_latitude: segment.end_latitude,
            end_longitude: segment.end_longitude,
            distance_m: segment.distance,
            cumulative_distance_m: segment.cumulative_distance,
            elevation_m: segment.elevation,
            gradient_percent: segment.gradient_percent(),
            bearing_deg: segment.bearing,
            headwind_ms: planned.headwind,
            target_power_w: planned.target_power,
            optimized_power_w: planned.optimized_power,
            overridden: planned.overridden,
            w_balance_j: planned.w_balance,
            speed_kmh: planned.speed * 3.6,
            time_s: planned.time,
            elapsed_time_s: planned.elapsed_time,
        }
    }
}

/// Export planned segments to CSV (suitable for spreadsheet plotting)
pub fn export_segments<P: AsRef<Path>>(
    segments: &[OptimizedSegment],
    output_path: P,
) -> Result<(), ExportError> {
    let mut writer = ::csv::Writer::from_path(output_path)?;

    for (index, planned) in segments.iter().enumerate() {
        writer.serialize(SegmentRow::from_segment(index, planned))?;
    }

    writer.flush()?;
    Ok(())
}
