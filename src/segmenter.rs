//! Route segmentation
//!
//! Track points are first paired into raw segments (dropping GPS jitter below
//! [`MIN_RAW_SEGMENT_M`]), then coalesced into segments of roughly uniform
//! length so that gradient noise between consecutive fixes averages out.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, RoutePaceError};
use crate::geodesy;
use crate::models::{RouteSegment, TrackPoint};

/// Default coalesced segment length in meters
pub const DEFAULT_SEGMENT_LENGTH_M: f64 = 100.0;

/// Raw point pairs closer than this are treated as GPS jitter
pub const MIN_RAW_SEGMENT_M: f64 = 1.0;

/// Build the coalesced segment sequence for a track.
///
/// Rejects tracks that do not yield at least one segment.
pub fn build_route(points: &[TrackPoint], target_segment_length: f64) -> Result<Vec<RouteSegment>> {
    if points.len() < 2 {
        return Err(RoutePaceError::input_too_short("track", points.len(), 2));
    }
    if !(target_segment_length.is_finite() && target_segment_length > 0.0) {
        return Err(RoutePaceError::non_physical(
            "target_segment_length",
            target_segment_length,
            "must be a positive length in meters",
        ));
    }

    let raw = raw_segments(points);
    if raw.is_empty() {
        // every pair fell under the jitter floor
        return Err(RoutePaceError::input_too_short("track", 1, 2));
    }

    let segments = coalesce(&raw, points[0].elevation, target_segment_length);
    debug!(
        points = points.len(),
        raw_segments = raw.len(),
        segments = segments.len(),
        target_segment_length,
        "Route segmented"
    );

    Ok(segments)
}

/// Pair consecutive points into raw segments, skipping pairs under the jitter floor
pub fn raw_segments(points: &[TrackPoint]) -> Vec<RouteSegment> {
    let mut cumulative_distance = 0.0;

    points
        .windows(2)
        .filter_map(|pair| {
            let (start, end) = (&pair[0], &pair[1]);
            let distance = geodesy::distance(start, end);
            if distance < MIN_RAW_SEGMENT_M {
                return None;
            }
            cumulative_distance += distance;

            Some(RouteSegment {
                start_latitude: start.latitude,
                start_longitude: start.longitude,
                end_latitude: end.latitude,
                end_longitude: end.longitude,
                distance,
                cumulative_distance,
                elevation: end.elevation,
                gradient: geodesy::gradient(end.elevation - start.elevation, distance),
                bearing: geodesy::bearing(start, end),
            })
        })
        .collect()
}

/// Running totals for the span currently being coalesced
#[derive(Debug, Clone, Copy)]
struct SpanAccumulator {
    start_latitude: f64,
    start_longitude: f64,
    start_elevation: f64,
    distance: f64,
    weighted_elevation: f64,
    bearing_x: f64,
    bearing_y: f64,
    end_latitude: f64,
    end_longitude: f64,
    cumulative_distance: f64,
}

impl SpanAccumulator {
    fn starting_at(latitude: f64, longitude: f64, elevation: f64) -> Self {
        Self {
            start_latitude: latitude,
            start_longitude: longitude,
            start_elevation: elevation,
            distance: 0.0,
            weighted_elevation: 0.0,
            bearing_x: 0.0,
            bearing_y: 0.0,
            end_latitude: latitude,
            end_longitude: longitude,
            cumulative_distance: 0.0,
        }
    }

    fn add(mut self, raw: &RouteSegment) -> Self {
        let heading = raw.bearing.to_radians();
        self.distance += raw.distance;
        self.weighted_elevation += raw.elevation * raw.distance;
        self.bearing_x += heading.cos() * raw.distance;
        self.bearing_y += heading.sin() * raw.distance;
        self.end_latitude = raw.end_latitude;
        self.end_longitude = raw.end_longitude;
        self.cumulative_distance = raw.cumulative_distance;
        self
    }

    fn flush(&self) -> RouteSegment {
        let elevation = self.weighted_elevation / self.distance;
        RouteSegment {
            start_latitude: self.start_latitude,
            start_longitude: self.start_longitude,
            end_latitude: self.end_latitude,
            end_longitude: self.end_longitude,
            distance: self.distance,
            cumulative_distance: self.cumulative_distance,
            elevation,
            gradient: geodesy::gradient(elevation - self.start_elevation, self.distance),
            bearing: geodesy::normalize_bearing(self.bearing_y.atan2(self.bearing_x).to_degrees()),
        }
    }
}

/// Merge raw segments into spans of at least `target_length` meters.
///
/// `start_elevation` anchors the first span's gradient; each later span is
/// anchored on the averaged elevation of the span before it. The trailing
/// partial span is always emitted.
pub fn coalesce(raw: &[RouteSegment], start_elevation: f64, target_length: f64) -> Vec<RouteSegment> {
    let Some(first) = raw.first() else {
        return Vec::new();
    };

    let initial = SpanAccumulator::starting_at(first.start_latitude, first.start_longitude, start_elevation);
    let (mut segments, pending) = raw.iter().fold(
        (Vec::new(), initial),
        |(mut segments, span), segment| {
            let span = span.add(segment);
            if span.distance < target_length {
                return (segments, span);
            }
            let emitted = span.flush();
            let next = SpanAccumulator::starting_at(emitted.end_latitude, emitted.end_longitude, emitted.elevation);
            segments.push(emitted);
            (segments, next)
        },
    );

    if pending.distance > 0.0 {
        segments.push(pending.flush());
    }

    segments
}

/// Shape of a segmented route, for previews and reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSummary {
    pub segment_count: usize,
    pub total_distance_m: f64,
    /// Sum of positive elevation changes between consecutive segments
    pub total_ascent_m: f64,
    pub total_descent_m: f64,
    pub max_gradient: f64,
    pub min_gradient: f64,
}

/// Summarize a segment sequence. Ascent and descent use the smoothed segment elevations.
pub fn summarize(segments: &[RouteSegment]) -> RouteSummary {
    let total_distance_m = segments.iter().map(|s| s.distance).sum();

    let (total_ascent_m, total_descent_m) = segments
        .windows(2)
        .map(|pair| pair[1].elevation - pair[0].elevation)
        .fold((0.0, 0.0), |(up, down), delta| {
            if delta > 0.0 {
                (up + delta, down)
            } else {
                (up, down - delta)
            }
        });

    let max_gradient = segments
        .iter()
        .map(|s| s.gradient)
        .fold(f64::NEG_INFINITY, f64::max);
    let min_gradient = segments
        .iter()
        .map(|s| s.gradient)
        .fold(f64::INFINITY, f64::min);

    RouteSummary {
        segment_count: segments.len(),
        total_distance_m,
        total_ascent_m,
        total_descent_m,
        max_gradient: if segments.is_empty() { 0.0 } else { max_gradient },
        min_gradient: if segments.is_empty() { 0.0 } else { min_gradient },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Points heading due north from the equator, `step_m` apart, climbing `rise_m` per step
    fn northbound_track(count: usize, step_m: f64, rise_m: f64) -> Vec<TrackPoint> {
        let step_deg = (step_m / geodesy::EARTH_RADIUS_M).to_degrees();
        (0..count)
            .map(|i| TrackPoint::new(i as f64 * step_deg, 0.0, 100.0 + i as f64 * rise_m))
            .collect()
    }

    #[test]
    fn test_raw_segments_accumulate_distance() {
        let points = northbound_track(5, 25.0, 1.0);
        let raw = raw_segments(&points);

        assert_eq!(raw.len(), 4);
        for (i, segment) in raw.iter().enumerate() {
            assert!((segment.distance - 25.0).abs() < 1e-6);
            assert!((segment.cumulative_distance - 25.0 * (i + 1) as f64).abs() < 1e-6);
            assert!((segment.gradient - 0.04).abs() < 1e-6);
            assert!(segment.bearing.abs() < 1e-9);
        }
        assert_eq!(raw[0].elevation, 101.0);
    }

    #[test]
    fn test_raw_segments_drop_jitter() {
        let mut points = northbound_track(3, 50.0, 0.0);
        // a duplicate fix half a meter away
        let jitter = TrackPoint::new(points[1].latitude + (0.5 / geodesy::EARTH_RADIUS_M).to_degrees(), 0.0, 100.0);
        points.insert(2, jitter);

        let raw = raw_segments(&points);
        assert_eq!(raw.len(), 2);
        assert!(raw.iter().all(|s| s.distance >= MIN_RAW_SEGMENT_M));
    }

    #[test]
    fn test_build_route_rejects_short_input() {
        let single = vec![TrackPoint::new(0.0, 0.0, 0.0)];
        assert!(matches!(
            build_route(&single, 100.0),
            Err(RoutePaceError::InputTooShort { count: 1, .. })
        ));
        assert!(matches!(
            build_route(&[], 100.0),
            Err(RoutePaceError::InputTooShort { count: 0, .. })
        ));

        let stationary = vec![TrackPoint::new(1.0, 1.0, 0.0); 10];
        assert!(matches!(
            build_route(&stationary, 100.0),
            Err(RoutePaceError::InputTooShort { .. })
        ));
    }

    #[test]
    fn test_build_route_rejects_bad_length() {
        let points = northbound_track(3, 50.0, 0.0);
        assert!(matches!(
            build_route(&points, 0.0),
            Err(RoutePaceError::NonPhysicalParameter { .. })
        ));
    }

    #[test]
    fn test_coalesce_to_target_length() {
        // 1 km in 10 m steps, constant 5% climb
        let points = northbound_track(101, 10.0, 0.5);
        // slightly under 100 so float error in the 10 m steps cannot defer a flush
        let segments = build_route(&points, 95.0).unwrap();

        assert_eq!(segments.len(), 10);
        for segment in &segments {
            assert!((segment.distance - 100.0).abs() < 1e-6);
        }
        // first span is anchored on the first point, later spans on the previous average
        assert!((segments[0].gradient - 0.0275).abs() < 1e-6);
        for segment in &segments[1..] {
            assert!((segment.gradient - 0.05).abs() < 1e-6);
        }
        assert!((segments.last().unwrap().cumulative_distance - 1000.0).abs() < 1e-6);
        assert_eq!(segments[0].start_latitude, points[0].latitude);
        assert_eq!(segments[9].end_latitude, points[100].latitude);
    }

    #[test]
    fn test_coalesce_uses_average_elevation() {
        // raw endpoints at 101..=110 m, first point at 100 m
        let points = northbound_track(11, 10.0, 1.0);
        let segments = build_route(&points, 95.0).unwrap();

        assert_eq!(segments.len(), 1);
        assert!((segments[0].elevation - 105.5).abs() < 1e-6);
        assert!((segments[0].gradient - 0.055).abs() < 1e-6);
    }

    #[test]
    fn test_coalesce_flushes_partial_tail() {
        let points = northbound_track(26, 10.0, 0.0);
        let segments = build_route(&points, 95.0).unwrap();

        assert_eq!(segments.len(), 3);
        assert!((segments[2].distance - 50.0).abs() < 1e-6);
    }

    #[test]
    fn test_coalesce_bearing_wraps_around_north() {
        let raw: Vec<RouteSegment> = [350.0, 10.0, 350.0, 10.0]
            .iter()
            .enumerate()
            .map(|(i, &bearing)| RouteSegment {
                start_latitude: 0.0,
                start_longitude: 0.0,
                end_latitude: 0.0,
                end_longitude: 0.0,
                distance: 30.0,
                cumulative_distance: 30.0 * (i + 1) as f64,
                elevation: 0.0,
                gradient: 0.0,
                bearing,
            })
            .collect();

        let segments = coalesce(&raw, 0.0, 1000.0);
        assert_eq!(segments.len(), 1);
        let b = segments[0].bearing;
        assert!(b < 1e-6 || b > 360.0 - 1e-6, "bearing {} should be north", b);
    }

    #[test]
    fn test_summarize() {
        let points = northbound_track(31, 10.0, 1.0);
        let segments = build_route(&points, 95.0).unwrap();
        let summary = summarize(&segments);

        assert_eq!(summary.segment_count, 3);
        assert!((summary.total_distance_m - 300.0).abs() < 1e-6);
        assert!((summary.total_ascent_m - 20.0).abs() < 1e-6);
        assert_eq!(summary.total_descent_m, 0.0);
        assert!(summary.max_gradient >= summary.min_gradient);
    }

    proptest! {
        #[test]
        fn test_coalesce_conserves_distance(
            steps in proptest::collection::vec((0.5f64..60.0, -3.0f64..3.0), 2..200),
            target in 20.0f64..400.0,
        ) {
            let mut lat = 0.0;
            let mut elevation = 200.0;
            let mut points = vec![TrackPoint::new(lat, 0.0, elevation)];
            for (step, rise) in steps {
                lat += (step / geodesy::EARTH_RADIUS_M).to_degrees();
                elevation += rise;
                points.push(TrackPoint::new(lat, 0.0, elevation));
            }

            let raw = raw_segments(&points);
            let coalesced = coalesce(&raw, points[0].elevation, target);
            let raw_total: f64 = raw.iter().map(|s| s.distance).sum();
            let coalesced_total: f64 = coalesced.iter().map(|s| s.distance).sum();

            prop_assert!((raw_total - coalesced_total).abs() < 1e-6);
            if let Some(last) = coalesced.last() {
                prop_assert!((last.cumulative_distance - raw_total).abs() < 1e-6);
            }
            for pair in coalesced.windows(2) {
                prop_assert!(pair[1].cumulative_distance >= pair[0].cumulative_distance);
            }
        }
    }
}
