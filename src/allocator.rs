//! Segment power allocation under a finite W′ reserve
//!
//! Three passes, always in this order:
//!
//! 1. **Target power** per segment from gradient and wind, independent of
//!    every other segment.
//! 2. **Reserve check**, a fold over the route carrying a [`ReserveState`].
//!    A segment whose above-FTP target would pull W′ under the floor is
//!    reverted to base power outright.
//! 3. **Realization** of speed and time at the final power, and the
//!    whole-ride metrics.
//!
//! This is a greedy heuristic; no pass looks ahead.

use rayon::prelude::*;
use tracing::{debug, info, trace};

use crate::error::{Result, RoutePaceError};
use crate::models::{AggregateMetrics, OptimizationResult, OptimizedSegment, RiderEnvironmentParams, RouteSegment};
use crate::physics;
use crate::validation::InputValidator;

/// W′ may not be planned below this fraction of capacity
pub const RESERVE_FLOOR_FRACTION: f64 = 0.15;

/// Recovery below FTP runs at this fraction of the depletion rate
pub const RECOVERY_RATE: f64 = 0.30;

/// Upper clamp on any target, as a multiple of FTP
pub const MAX_FTP_MULTIPLE: f64 = 1.20;

/// Lower clamp on any target, as a fraction of base power
pub const MIN_BASE_FRACTION: f64 = 0.5;

/// Plan power for every segment of a route.
///
/// Rejects an empty route and non-physical parameters before any computation.
pub fn optimize(segments: &[RouteSegment], params: &RiderEnvironmentParams) -> Result<OptimizationResult> {
    if segments.is_empty() {
        return Err(RoutePaceError::input_too_short("segment sequence", 0, 1));
    }
    InputValidator::validate_params(params)?;
    InputValidator::validate_segments(segments)?;

    let targets = target_powers(segments, params);
    let (steps, reserve) = constrain_to_reserve(segments, &targets, params);
    let result = realize(segments, &targets, &steps, params);

    info!(
        segments = segments.len(),
        total_time = result.metrics.total_time,
        normalized_power = result.metrics.normalized_power,
        min_w_balance = reserve.min_w_balance,
        overridden = result.metrics.overridden_segments,
        "Route optimized"
    );

    Ok(result)
}

/// Pass 1 output for one segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentTarget {
    pub headwind: f64,
    pub target_power: f64,
}

/// How far above FTP the plan may push on climbs, from 0 at 65% intensity to 1 at 100%
pub fn aggressiveness(target_intensity: f64) -> f64 {
    ((target_intensity - 65.0) / 35.0).clamp(0.0, 1.0)
}

/// Terrain-only target for a gradient, before wind and clamping.
///
/// Band edges: above 2% is a steep climb, (0.5%, 2%] a moderate climb,
/// below -2% a steep descent, [-2%, 0%) a gentle descent and [0%, 0.5%] flat.
pub fn terrain_power(gradient: f64, params: &RiderEnvironmentParams) -> f64 {
    let base = params.base_power();
    let ftp = params.ftp;
    let aggr = aggressiveness(params.target_intensity);
    let g = gradient * 100.0;

    if g > 2.0 {
        let boost = ((g - 2.0) * 0.10).min(0.10 + aggr * 0.20) * aggr;
        base.max(ftp * (1.0 + boost))
    } else if g > 0.5 {
        base + ((g - 0.5) / 1.5) * (ftp - base) * aggr
    } else if g < -2.0 {
        base * (1.0 - (g.abs() * 0.12).min(0.40))
    } else if g < 0.0 {
        base * (1.0 - g.abs() * 0.05)
    } else {
        base
    }
}

/// Multiplier applied to the terrain target for the signed wind component
pub fn wind_factor(headwind: f64) -> f64 {
    if headwind < 0.0 {
        1.0 + (headwind.abs() * 0.02).min(0.10)
    } else if headwind > 0.0 {
        1.0 - (headwind * 0.015).min(0.08)
    } else {
        1.0
    }
}

/// Full Pass 1 target for one segment
pub fn target_power(segment: &RouteSegment, params: &RiderEnvironmentParams) -> SegmentTarget {
    let headwind = physics::headwind(params.wind_speed, params.wind_direction, segment.bearing);
    let base = params.base_power();

    let target = terrain_power(segment.gradient, params) * wind_factor(headwind);
    let target_power = target.clamp(base * MIN_BASE_FRACTION, params.ftp * MAX_FTP_MULTIPLE);

    SegmentTarget { headwind, target_power }
}

/// Pass 1 over the whole route
pub fn target_powers(segments: &[RouteSegment], params: &RiderEnvironmentParams) -> Vec<SegmentTarget> {
    segments.par_iter().map(|segment| target_power(segment, params)).collect()
}

/// W′ state threaded through the reserve check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReserveState {
    pub w_balance: f64,
    pub min_w_balance: f64,
}

/// Pass 2 decision for one segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReserveStep {
    /// Final power for the segment
    pub power: f64,
    pub overridden: bool,
    /// Balance after the segment
    pub w_balance: f64,
}

impl ReserveState {
    pub fn full(w_prime: f64) -> Self {
        Self {
            w_balance: w_prime,
            min_w_balance: w_prime,
        }
    }

    /// Ride one segment at `power` for `time` seconds.
    ///
    /// Above FTP the reserve depletes unless that would cross the floor, in
    /// which case the segment reverts to base power and the balance is left
    /// as it was. At or below FTP the reserve recovers, capped at W′.
    pub fn advance(self, power: f64, time: f64, params: &RiderEnvironmentParams) -> (Self, ReserveStep) {
        let floor = params.w_prime * RESERVE_FLOOR_FRACTION;

        let (w_balance, power, overridden) = if power > params.ftp {
            let depletion = (power - params.ftp) * time;
            if self.w_balance - depletion < floor {
                (self.w_balance, params.base_power(), true)
            } else {
                (self.w_balance - depletion, power, false)
            }
        } else {
            let recovery = (params.ftp - power) * time * RECOVERY_RATE;
            ((self.w_balance + recovery).min(params.w_prime), power, false)
        };

        let state = Self {
            w_balance,
            min_w_balance: self.min_w_balance.min(w_balance),
        };
        (
            state,
            ReserveStep {
                power,
                overridden,
                w_balance,
            },
        )
    }
}

/// Pass 2 over the whole route, in order. Returns per-segment decisions and the final state.
pub fn constrain_to_reserve(
    segments: &[RouteSegment],
    targets: &[SegmentTarget],
    params: &RiderEnvironmentParams,
) -> (Vec<ReserveStep>, ReserveState) {
    let (steps, state) = segments.iter().zip(targets).enumerate().fold(
        (Vec::with_capacity(segments.len()), ReserveState::full(params.w_prime)),
        |(mut steps, state), (index, (segment, target))| {
            let speed = physics::speed_at_power(target.target_power, segment.gradient, target.headwind, params);
            let time = segment.distance / speed;
            let (state, step) = state.advance(target.target_power, time, params);
            if step.overridden {
                trace!(
                    index,
                    target_power = target.target_power,
                    w_balance = state.w_balance,
                    "Reserve floor reached, reverting segment to base power"
                );
            }
            steps.push(step);
            (steps, state)
        },
    );

    debug!(
        min_w_balance = state.min_w_balance,
        final_w_balance = state.w_balance,
        overridden = steps.iter().filter(|s| s.overridden).count(),
        "Reserve check complete"
    );

    (steps, state)
}

/// Pass 3: speed and time at final power, plus whole-ride metrics
pub fn realize(
    segments: &[RouteSegment],
    targets: &[SegmentTarget],
    steps: &[ReserveStep],
    params: &RiderEnvironmentParams,
) -> OptimizationResult {
    let ridden: Vec<(f64, f64)> = segments
        .par_iter()
        .zip(targets.par_iter())
        .zip(steps.par_iter())
        .map(|((segment, target), step)| {
            let speed = physics::speed_at_power(step.power, segment.gradient, target.headwind, params);
            (speed, segment.distance / speed)
        })
        .collect();

    let mut optimized = Vec::with_capacity(segments.len());
    let mut total_time = 0.0;
    let mut total_distance = 0.0;
    let mut power_sum = 0.0;
    let mut power4_sum = 0.0;
    let mut min_w_balance = params.w_prime;

    for (((segment, target), step), (speed, time)) in segments.iter().zip(targets).zip(steps).zip(ridden) {
        total_time += time;
        total_distance += segment.distance;
        power_sum += step.power * time;
        power4_sum += step.power.powi(4) * time;
        min_w_balance = min_w_balance.min(step.w_balance);

        optimized.push(OptimizedSegment {
            segment: segment.clone(),
            headwind: target.headwind,
            target_power: target.target_power,
            optimized_power: step.power,
            overridden: step.overridden,
            w_balance: step.w_balance,
            speed,
            time,
            elapsed_time: total_time,
        });
    }

    let avg_power = power_sum / total_time;
    let normalized_power = (power4_sum / total_time).powf(0.25);
    let intensity_factor = normalized_power / params.ftp;

    let metrics = AggregateMetrics {
        total_time,
        total_distance_km: total_distance / 1000.0,
        avg_power,
        normalized_power,
        intensity_factor,
        variability_index: normalized_power / avg_power,
        training_stress_score: (total_time / 3600.0) * intensity_factor * intensity_factor * 100.0,
        avg_speed: (total_distance / 1000.0) / (total_time / 3600.0),
        total_work_kj: power_sum / 1000.0,
        min_w_balance,
        w_prime_percent: min_w_balance / params.w_prime * 100.0,
        overridden_segments: steps.iter().filter(|s| s.overridden).count(),
    };

    OptimizationResult {
        segments: optimized,
        metrics,
    }
}
