//! Cycling power model
//!
//! Forward model: the power needed to hold a ground speed against gravity,
//! aerodynamic drag and rolling resistance. Inverse model: the ground speed a
//! given power sustains, found numerically.

use tracing::trace;

use crate::geodesy;
use crate::models::RiderEnvironmentParams;

/// Air density at sea level, kg/m³
pub const AIR_DENSITY: f64 = 1.225;

/// Gravitational acceleration, m/s²
pub const GRAVITY: f64 = 9.81;

/// Fraction of crank power lost in the drivetrain
pub const DRIVETRAIN_LOSS: f64 = 0.03;

/// Reported power never drops below this (coasting and recovery)
pub const MIN_POWER_W: f64 = 50.0;

/// Speed bounds enforced by the inverse model, m/s
pub const MIN_SPEED_MS: f64 = 1.0;
pub const MAX_SPEED_MS: f64 = 30.0;

const MAX_ITERATIONS: usize = 20;
const POWER_TOLERANCE_W: f64 = 0.1;
const SPEED_STEP_MS: f64 = 0.1;
const MIN_DERIVATIVE: f64 = 0.001;

/// Crank power in watts needed to hold `speed` on `gradient` with the given signed wind component.
///
/// `headwind` is added to ground speed to obtain the air speed.
pub fn power_required(speed: f64, gradient: f64, headwind: f64, params: &RiderEnvironmentParams) -> f64 {
    let air_speed = speed + headwind;
    let aero = 0.5 * AIR_DENSITY * params.cda * air_speed * air_speed * speed;
    let gravity = params.total_mass * GRAVITY * gradient * speed;
    let rolling = params.crr * params.total_mass * GRAVITY * gradient.atan().cos() * speed;

    let total = (aero + gravity + rolling) / (1.0 - DRIVETRAIN_LOSS);
    total.max(MIN_POWER_W)
}

/// Ground speed in m/s sustained by `power`, clamped to [1, 30] m/s.
///
/// Newton–Raphson on [`power_required`] with a forward-difference derivative.
/// Never fails: a flat derivative ends the search early and the current
/// estimate is returned, and unreachable targets saturate at the speed bounds.
pub fn speed_at_power(power: f64, gradient: f64, headwind: f64, params: &RiderEnvironmentParams) -> f64 {
    let mut speed = (power / (0.5 * AIR_DENSITY * params.cda)).cbrt();

    for iteration in 0..MAX_ITERATIONS {
        let current = power_required(speed, gradient, headwind, params);
        let residual = current - power;
        if residual.abs() <= POWER_TOLERANCE_W {
            break;
        }

        let derivative = (power_required(speed + SPEED_STEP_MS, gradient, headwind, params) - current) / SPEED_STEP_MS;
        if derivative.abs() < MIN_DERIVATIVE {
            trace!(iteration, speed, residual, "Flat power curve, keeping current speed estimate");
            break;
        }

        speed = (speed - residual / derivative).clamp(MIN_SPEED_MS, MAX_SPEED_MS);
    }

    // the cube-root seed is not clamped, so a run that stops on the first check can still exceed the bounds
    speed.clamp(MIN_SPEED_MS, MAX_SPEED_MS)
}

/// Signed wind component along the direction of travel, m/s.
///
/// `wind_direction` is where the wind blows from. The result is
/// `-wind_speed * cos(d)` where `d` is the angle between where the wind blows
/// to and the travel bearing.
pub fn headwind(wind_speed: f64, wind_direction: f64, travel_bearing: f64) -> f64 {
    let wind_to = geodesy::normalize_bearing(wind_direction + 180.0);
    let angle = (wind_to - travel_bearing).to_radians();
    -wind_speed * angle.cos()
}
