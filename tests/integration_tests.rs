use routepace::{build_route, export_result, optimize, ExportFormat, ImportManager};
use std::io::Write;

/// Integration tests that run the complete planning workflow

#[cfg(test)]
mod integration_tests {
    use super::*;
    use routepace::models::{RiderEnvironmentParams, RouteSegment, TrackPoint};

    fn create_test_rider(target_intensity: f64) -> RiderEnvironmentParams {
        RiderEnvironmentParams {
            ftp: 250.0,
            total_mass: 80.0,
            cda: 0.3,
            crr: 0.004,
            w_prime: 20000.0,
            wind_speed: 0.0,
            wind_direction: 0.0,
            target_intensity,
        }
    }

    /// Northbound segments of equal length and gradient
    fn create_uniform_route(count: usize, distance: f64, gradient: f64) -> Vec<RouteSegment> {
        (0..count)
            .map(|i| RouteSegment {
                start_latitude: 45.0 + i as f64 * 0.0009,
                start_longitude: 7.0,
                end_latitude: 45.0 + (i + 1) as f64 * 0.0009,
                end_longitude: 7.0,
                distance,
                cumulative_distance: distance * (i + 1) as f64,
                elevation: 200.0 + distance * gradient * i as f64,
                gradient,
                bearing: 0.0,
            })
            .collect()
    }

    /// Points 0.0009° of latitude apart (about 100 m) climbing 4 m each
    fn create_climbing_track(count: usize) -> Vec<TrackPoint> {
        (0..count)
            .map(|i| TrackPoint::new(45.0 + i as f64 * 0.0009, 7.0, 300.0 + i as f64 * 4.0))
            .collect()
    }

    /// A flat 10 km ridden at 100% holds FTP the whole way
    #[test]
    fn test_flat_route_at_threshold() {
        let route = create_uniform_route(100, 100.0, 0.0);
        let rider = create_test_rider(100.0);

        let result = optimize(&route, &rider).unwrap();
        let metrics = &result.metrics;

        assert_eq!(result.segments.len(), 100);
        assert!(result.segments.iter().all(|s| s.optimized_power == 250.0));
        assert!((metrics.avg_power - 250.0).abs() < 1e-9);
        assert!((metrics.normalized_power - 250.0).abs() < 1e-9);
        assert!((metrics.intensity_factor - 1.0).abs() < 1e-9);
        assert!((metrics.variability_index - 1.0).abs() < 1e-9);
        assert!((metrics.total_distance_km - 10.0).abs() < 1e-9);
        assert_eq!(metrics.min_w_balance, 20000.0);
        assert_eq!(metrics.overridden_segments, 0);

        // about 38 km/h for this rider on the flat
        assert!(metrics.avg_speed > 30.0 && metrics.avg_speed < 45.0);

        let hours = metrics.total_time / 3600.0;
        assert!((metrics.training_stress_score - hours * 100.0).abs() < 1e-6);
        assert!((metrics.total_work_kj - 250.0 * metrics.total_time / 1000.0).abs() < 1e-6);
    }

    /// A single long climb at 90% is pushed above base power but stays under the cap
    #[test]
    fn test_single_climb_at_tempo() {
        let route = create_uniform_route(1, 1000.0, 0.08);
        let rider = create_test_rider(90.0);

        let result = optimize(&route, &rider).unwrap();
        let climb = &result.segments[0];

        assert!(climb.target_power > 225.0 && climb.target_power <= 300.0);
        assert_eq!(climb.optimized_power, climb.target_power);
        assert!(!climb.overridden);
        assert!(climb.w_balance < 20000.0);
        assert!(climb.w_balance >= 3000.0);
        assert!(climb.speed > 1.0 && climb.speed < 8.0);
        assert!((climb.elapsed_time - climb.time).abs() < 1e-12);
    }

    /// A small W′ on a sustained climb forces segments back to FTP-level base power
    #[test]
    fn test_small_reserve_overrides_climb() {
        let route = create_uniform_route(20, 100.0, 0.08);
        let mut rider = create_test_rider(100.0);
        rider.w_prime = 5000.0;

        let result = optimize(&route, &rider).unwrap();
        let metrics = &result.metrics;

        assert!(metrics.overridden_segments > 0);
        for segment in result.segments.iter().filter(|s| s.overridden) {
            assert_eq!(segment.optimized_power, 250.0);
            assert_eq!(segment.target_power, 300.0);
        }
        assert!(metrics.min_w_balance >= 750.0);
        assert!(result.segments.iter().all(|s| s.w_balance >= 750.0 && s.w_balance <= 5000.0));

        // the early segments spend the reserve before any override kicks in
        assert!(!result.segments[0].overridden);
        assert_eq!(result.segments[0].optimized_power, 300.0);
    }

    #[test]
    fn test_wind_changes_ride_time() {
        let route = create_uniform_route(50, 100.0, 0.0);

        let mut into_wind = create_test_rider(85.0);
        into_wind.wind_speed = 5.0;
        into_wind.wind_direction = 0.0;

        let mut with_wind = into_wind.clone();
        with_wind.wind_direction = 180.0;

        let slow = optimize(&route, &into_wind).unwrap();
        let fast = optimize(&route, &with_wind).unwrap();

        assert!(slow.segments[0].headwind > 4.99);
        assert!(fast.segments[0].headwind < -4.99);
        assert!(slow.metrics.total_time > fast.metrics.total_time);
    }

    #[test]
    fn test_build_route_then_optimize() {
        let points = create_climbing_track(51);
        let route = build_route(&points, 500.0).unwrap();

        assert!(route.len() >= 9 && route.len() <= 11);

        let total: f64 = route.iter().map(|s| s.distance).sum();
        let last = route.last().unwrap();
        assert!((last.cumulative_distance - total).abs() < 1e-6);
        assert!(route.iter().all(|s| s.bearing.abs() < 1e-6 || (s.bearing - 360.0).abs() < 1e-6));
        // 4 m per ~100 m
        assert!(route.iter().skip(1).all(|s| (s.gradient - 0.04).abs() < 0.002));

        let result = optimize(&route, &create_test_rider(80.0)).unwrap();
        assert_eq!(result.segments.len(), route.len());
        assert!(result.metrics.total_time > 0.0);
        assert!(result.segments.windows(2).all(|w| w[1].elapsed_time > w[0].elapsed_time));
    }

    #[test]
    fn test_gpx_file_to_exported_plan() {
        let dir = tempfile::tempdir().unwrap();
        let gpx_path = dir.path().join("ride.gpx");

        let mut gpx = std::fs::File::create(&gpx_path).unwrap();
        writeln!(
            gpx,
            r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="routepace-tests" xmlns="http://www.topografix.com/GPX/1/1">
  <trk><trkseg>"#
        )
        .unwrap();
        for point in create_climbing_track(21) {
            writeln!(
                gpx,
                r#"    <trkpt lat="{}" lon="{}"><ele>{}</ele></trkpt>"#,
                point.latitude, point.longitude, point.elevation
            )
            .unwrap();
        }
        writeln!(gpx, "  </trkseg></trk>\n</gpx>").unwrap();
        drop(gpx);

        let points = ImportManager::new().import_file(&gpx_path).unwrap();
        assert_eq!(points.len(), 21);

        let route = build_route(&points, 100.0).unwrap();
        let result = optimize(&route, &create_test_rider(85.0)).unwrap();

        let json_path = dir.path().join("plan.json");
        export_result(&result, ExportFormat::Json, &json_path).unwrap();

        let content = std::fs::read_to_string(&json_path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(
            value["segments"].as_array().unwrap().len(),
            result.segments.len()
        );
        assert!(value["metrics"]["normalized_power"].as_f64().unwrap() > 0.0);
    }
}
