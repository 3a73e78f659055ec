use serde::{Deserialize, Serialize};

/// A single GPS fix along the route, in ride order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    /// Latitude in degrees
    pub latitude: f64,

    /// Longitude in degrees
    pub longitude: f64,

    /// Elevation in meters above sea level
    pub elevation: f64,
}

impl TrackPoint {
    pub fn new(latitude: f64, longitude: f64, elevation: f64) -> Self {
        Self {
            latitude,
            longitude,
            elevation,
        }
    }
}

/// Directional, graded piece of the route; the unit of all pacing computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSegment {
    pub start_latitude: f64,
    pub start_longitude: f64,
    pub end_latitude: f64,
    pub end_longitude: f64,

    /// Segment length in meters
    pub distance: f64,

    /// Distance from the route start through the end of this segment, in meters
    pub cumulative_distance: f64,

    /// Endpoint elevation for raw segments, distance-weighted mean for coalesced ones
    pub elevation: f64,

    /// Rise over run across the segment span
    pub gradient: f64,

    /// Direction of travel in degrees, [0, 360)
    pub bearing: f64,
}

impl RouteSegment {
    pub fn gradient_percent(&self) -> f64 {
        self.gradient * 100.0
    }
}

/// Rider, equipment and weather inputs for one optimization run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiderEnvironmentParams {
    /// Functional Threshold Power in watts
    pub ftp: f64,

    /// Rider plus bike mass in kilograms
    pub total_mass: f64,

    /// Drag area in square meters
    pub cda: f64,

    /// Rolling resistance coefficient
    pub crr: f64,

    /// Anaerobic work capacity above FTP, in joules
    pub w_prime: f64,

    /// Wind speed in m/s
    pub wind_speed: f64,

    /// Compass direction the wind is blowing from, in degrees
    pub wind_direction: f64,

    /// Baseline target as a percentage of FTP
    pub target_intensity: f64,
}

impl Default for RiderEnvironmentParams {
    fn default() -> Self {
        Self {
            ftp: 250.0,
            total_mass: 80.0,
            cda: 0.32,
            crr: 0.004,
            w_prime: 20000.0,
            wind_speed: 0.0,
            wind_direction: 0.0,
            target_intensity: 80.0,
        }
    }
}

impl RiderEnvironmentParams {
    /// Sustainable baseline power for this run
    pub fn base_power(&self) -> f64 {
        self.ftp * self.target_intensity / 100.0
    }
}

/// A route segment augmented with its planned power and the resulting ride state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizedSegment {
    #[serde(flatten)]
    pub segment: RouteSegment,

    /// Signed wind component along the travel bearing, m/s
    pub headwind: f64,

    /// Terrain and wind aware target before the reserve check, watts
    pub target_power: f64,

    /// Final planned power, watts
    pub optimized_power: f64,

    /// Whether the reserve check reverted this segment to base power
    pub overridden: bool,

    /// W′ balance after riding this segment, joules
    pub w_balance: f64,

    /// Ground speed in m/s
    pub speed: f64,

    /// Time to ride the segment in seconds
    pub time: f64,

    /// Ride time from the start through this segment, seconds
    pub elapsed_time: f64,
}

/// Whole-ride summary of an optimization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateMetrics {
    /// Total ride time in seconds
    pub total_time: f64,

    /// Total route distance in kilometers
    pub total_distance_km: f64,

    /// Time-weighted average power
    pub avg_power: f64,

    /// Fourth root of the time-weighted mean fourth power
    pub normalized_power: f64,

    /// Normalized power over FTP
    pub intensity_factor: f64,

    /// Normalized power over average power
    pub variability_index: f64,

    pub training_stress_score: f64,

    /// Average speed in km/h
    pub avg_speed: f64,

    /// Mechanical work in kilojoules
    pub total_work_kj: f64,

    /// Lowest W′ balance reached, joules
    pub min_w_balance: f64,

    /// Lowest W′ balance as a percentage of W′
    pub w_prime_percent: f64,

    /// Segments reverted to base power by the reserve check
    pub overridden_segments: usize,
}

/// Output of [`crate::allocator::optimize`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub segments: Vec<OptimizedSegment>,
    pub metrics: AggregateMetrics,
}
