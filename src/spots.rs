//! Cheer-spot selection.
//!
//! Two strategies pick a subset of candidate positions past a skip threshold:
//!
//! - [`SelectionStrategy::MaxSpread`] spreads picks evenly over the remaining
//!   candidates, always reaching the furthest one.
//! - [`SelectionStrategy::MinTravel`] walks forward greedily from the first
//!   candidate, each time taking the closest spot (straight-line) that the
//!   spectator can still reach before the runner. The walk stops early when
//!   nothing is reachable, so it may return fewer spots than asked for.
//!
//! The greedy walk is not globally optimal: an early nearby pick can strand
//! the spectator where a different pick would have allowed more spots.

use log::{debug, info};

use crate::course::{CandidatePosition, CourseIndex};
use crate::crossing::detect_crossing;
use crate::error::{PlannerError, Result};
use crate::geo_utils::haversine_distance;
use crate::{PlannerConfig, SelectionStrategy, TravelProfile};

/// Inputs for one selection run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct SuggestionRequest {
    /// How many spots to suggest
    pub num_spots: u32,
    pub strategy: SelectionStrategy,
    /// Runner pace in seconds per meter (required for MinTravel)
    pub pace_seconds_per_meter: Option<f64>,
    pub profile: TravelProfile,
    /// Candidates before this many kilometers are ignored
    pub skip_first_km: f64,
}

/// Feasibility of the spectator moving between two spots before the runner does.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct LegAssessment {
    /// Straight-line distance between the spots, in meters
    pub straight_line_m: f64,
    /// Course distance the runner covers between the spots, in meters
    pub course_distance_m: f64,
    pub runner_seconds: f64,
    /// `None` when the profile has no constant-speed heuristic (transit)
    pub spectator_seconds: Option<f64>,
    /// Whether the straight path crosses the course away from both spots
    pub crosses_course: bool,
    pub feasible: bool,
}

/// Assess moving from one candidate to a later one with the constant-speed
/// heuristic.
///
/// A leg is feasible when the runner's time strictly exceeds the spectator's
/// travel time plus the fixed buffer plus, if the path crosses the course, the
/// crossing penalty. Transit is never feasible here.
pub fn assess_leg(
    from: &CandidatePosition,
    to: &CandidatePosition,
    pace_seconds_per_meter: f64,
    profile: TravelProfile,
    index: &CourseIndex,
    config: &PlannerConfig,
) -> LegAssessment {
    let straight_line_m = haversine_distance(&from.point, &to.point);
    let course_distance_m = to.distance - from.distance;
    let runner_seconds = course_distance_m * pace_seconds_per_meter;
    let spectator_seconds = profile.speed_mps(config).map(|speed| straight_line_m / speed);

    let (crosses_course, feasible) = match spectator_seconds {
        Some(travel) => {
            let crosses =
                detect_crossing(index, &from.point, &to.point, config.crossing_tolerance_m);
            let penalty = if crosses { config.crossing_penalty_s } else { 0.0 };
            (crosses, runner_seconds > travel + penalty + config.spectator_buffer_s)
        }
        None => (false, false),
    };

    LegAssessment {
        straight_line_m,
        course_distance_m,
        runner_seconds,
        spectator_seconds,
        crosses_course,
        feasible,
    }
}

/// Suggest cheer spots, returning their along-course distances in ascending order.
///
/// Candidates before `skip_first_km` are dropped first. An empty pool or a
/// zero spot count gives an empty result. `MinTravel` fails with
/// [`PlannerError::InvalidPace`] when no positive pace is supplied; that check
/// happens before anything else so callers never act on a partial result.
///
/// # Example
///
/// ```rust
/// use cheer_planner::{
///     GpsPoint, PlannerConfig, SelectionStrategy, SuggestionRequest, TravelProfile,
///     build_course_index, suggest_spots,
/// };
///
/// let course: Vec<GpsPoint> = (0..=10)
///     .map(|i| GpsPoint::new(51.50 + i as f64 * 0.001, -0.13))
///     .collect();
/// let index = build_course_index(&course, 50.0);
///
/// let request = SuggestionRequest {
///     num_spots: 3,
///     strategy: SelectionStrategy::MaxSpread,
///     pace_seconds_per_meter: None,
///     profile: TravelProfile::Walking,
///     skip_first_km: 0.0,
/// };
/// let spots = suggest_spots(&index, &request, &PlannerConfig::default()).unwrap();
/// assert_eq!(spots.len(), 3);
/// assert_eq!(spots[2], index.total_distance());
/// ```
pub fn suggest_spots(
    index: &CourseIndex,
    request: &SuggestionRequest,
    config: &PlannerConfig,
) -> Result<Vec<f64>> {
    let pace = match request.strategy {
        SelectionStrategy::MinTravel => Some(validated_pace(request.pace_seconds_per_meter)?),
        SelectionStrategy::MaxSpread => None,
    };

    let skip_m = request.skip_first_km * 1000.0;
    let pool: Vec<CandidatePosition> = index
        .candidates()
        .iter()
        .filter(|c| c.distance >= skip_m)
        .copied()
        .collect();

    if pool.is_empty() || request.num_spots == 0 {
        debug!(
            "suggest_spots: nothing to select ({} candidates after {:.0}m, {} requested)",
            pool.len(),
            skip_m,
            request.num_spots
        );
        return Ok(Vec::new());
    }

    let num_to_select = (request.num_spots as usize).min(pool.len());

    let selected = match (request.strategy, pace) {
        (SelectionStrategy::MinTravel, Some(pace)) => {
            min_travel(&pool, num_to_select, pace, request.profile, index, config)
        }
        _ => max_spread(&pool, num_to_select),
    };

    info!(
        "suggest_spots: {:?} selected {}/{} spots from {} candidates",
        request.strategy,
        selected.len(),
        num_to_select,
        pool.len()
    );

    Ok(selected)
}

fn validated_pace(pace: Option<f64>) -> Result<f64> {
    match pace {
        Some(p) if p.is_finite() && p > 0.0 => Ok(p),
        Some(p) => Err(PlannerError::invalid_pace(
            &p.to_string(),
            "pace must be a positive number of seconds per meter",
        )),
        None => Err(PlannerError::invalid_pace("", "a pace is required for min-travel")),
    }
}

/// Evenly spaced picks over the pool's index range, rounding to the nearest index.
fn max_spread(pool: &[CandidatePosition], num_to_select: usize) -> Vec<f64> {
    let last = pool.len() - 1;
    if num_to_select == 1 {
        return vec![pool[last].distance];
    }

    let step = last as f64 / (num_to_select - 1) as f64;
    (0..num_to_select)
        .map(|i| {
            let idx = ((i as f64 * step).round() as usize).min(last);
            pool[idx].distance
        })
        .collect()
}

/// Greedy nearest-feasible walk seeded with the first pool candidate.
fn min_travel(
    pool: &[CandidatePosition],
    num_to_select: usize,
    pace: f64,
    profile: TravelProfile,
    index: &CourseIndex,
    config: &PlannerConfig,
) -> Vec<f64> {
    let mut used = vec![false; pool.len()];
    let mut current = 0;
    used[current] = true;
    let mut selected = vec![pool[current].distance];

    while selected.len() < num_to_select {
        let from = &pool[current];
        let reachable = |i: usize| -> Option<(usize, f64)> {
            if used[i] {
                return None;
            }
            let leg = assess_leg(from, &pool[i], pace, profile, index, config);
            leg.feasible.then_some((i, leg.straight_line_m))
        };
        let closest = |a: &(usize, f64), b: &(usize, f64)| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0));

        #[cfg(feature = "parallel")]
        let next = {
            use rayon::prelude::*;
            (0..pool.len()).into_par_iter().filter_map(reachable).min_by(closest)
        };

        #[cfg(not(feature = "parallel"))]
        let next = (0..pool.len()).filter_map(reachable).min_by(closest);

        match next {
            Some((i, straight_line)) => {
                debug!(
                    "min_travel: {:.0}m -> {:.0}m ({:.0}m straight line)",
                    from.distance, pool[i].distance, straight_line
                );
                used[i] = true;
                current = i;
                selected.push(pool[i].distance);
            }
            None => {
                info!(
                    "min_travel: no reachable spot after {:.0}m, stopping at {} of {}",
                    from.distance,
                    selected.len(),
                    num_to_select
                );
                break;
            }
        }
    }

    selected
}
