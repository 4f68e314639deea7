//! Post-hoc check of a chosen set of spots against per-leg travel durations.
//!
//! Durations come either from an external routing service (see the `http`
//! feature) or from the same constant-speed heuristic the greedy selector
//! uses. Crossing penalties are not added here: routed durations already
//! follow real paths across the course.

use log::debug;

use crate::course::CandidatePosition;
use crate::error::{PlannerError, Result};
use crate::geo_utils::haversine_distance;
use crate::{GpsPoint, PlannerConfig, TravelProfile};

/// Timing of one move between consecutive spots.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct LegReport {
    pub from_distance: f64,
    pub to_distance: f64,
    /// Time the runner needs between the two spots
    pub runner_seconds: f64,
    /// Spectator travel time for the leg
    pub spectator_seconds: f64,
    /// Runner time minus spectator time minus the fixed buffer
    pub slack_seconds: f64,
    pub feasible: bool,
}

/// Seconds after the start at which the runner passes `distance_m`.
#[inline]
pub fn runner_arrival_seconds(distance_m: f64, pace_seconds_per_meter: f64) -> f64 {
    distance_m * pace_seconds_per_meter
}

/// Straight-line, constant-speed duration for each leg between consecutive
/// points. `None` for profiles without a heuristic speed.
pub fn heuristic_leg_durations(
    points: &[GpsPoint],
    profile: TravelProfile,
    config: &PlannerConfig,
) -> Option<Vec<f64>> {
    let speed = profile.speed_mps(config)?;
    Some(
        points
            .windows(2)
            .map(|w| haversine_distance(&w[0], &w[1]) / speed)
            .collect(),
    )
}

/// Compare runner and spectator timing for each leg of an itinerary.
///
/// `spots` are sorted by distance first; `leg_durations[i]` is the
/// spectator's travel time from sorted spot `i` to spot `i + 1`.
pub fn evaluate_itinerary(
    spots: &[CandidatePosition],
    pace_seconds_per_meter: f64,
    leg_durations: &[f64],
    config: &PlannerConfig,
) -> Result<Vec<LegReport>> {
    if !(pace_seconds_per_meter.is_finite() && pace_seconds_per_meter > 0.0) {
        return Err(PlannerError::invalid_pace(
            &pace_seconds_per_meter.to_string(),
            "pace must be a positive number of seconds per meter",
        ));
    }

    let mut ordered = spots.to_vec();
    ordered.sort_by(|a, b| a.distance.total_cmp(&b.distance));

    let expected = ordered.len().saturating_sub(1);
    if leg_durations.len() != expected {
        return Err(PlannerError::routing(format!(
            "expected {} leg durations for {} spots, got {}",
            expected,
            ordered.len(),
            leg_durations.len()
        )));
    }

    let reports: Vec<LegReport> = ordered
        .windows(2)
        .zip(leg_durations)
        .map(|(w, &spectator_seconds)| {
            let runner_seconds = runner_arrival_seconds(w[1].distance, pace_seconds_per_meter)
                - runner_arrival_seconds(w[0].distance, pace_seconds_per_meter);
            let slack_seconds = runner_seconds - spectator_seconds - config.spectator_buffer_s;
            LegReport {
                from_distance: w[0].distance,
                to_distance: w[1].distance,
                runner_seconds,
                spectator_seconds,
                slack_seconds,
                feasible: slack_seconds > 0.0,
            }
        })
        .collect();

    debug!(
        "evaluate_itinerary: {}/{} legs feasible",
        reports.iter().filter(|r| r.feasible).count(),
        reports.len()
    );

    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn spot(distance: f64, lat: f64) -> CandidatePosition {
        CandidatePosition {
            distance,
            point: GpsPoint::new(lat, 7.0),
        }
    }

    #[test]
    fn test_evaluate_itinerary_slack() {
        let spots = vec![spot(5000.0, 45.01), spot(1000.0, 45.0), spot(9000.0, 45.02)];
        let reports =
            evaluate_itinerary(&spots, 0.3, &[500.0, 700.0], &PlannerConfig::default()).unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].from_distance, 1000.0);
        assert_eq!(reports[0].to_distance, 5000.0);
        assert!(approx_eq(reports[0].runner_seconds, 1200.0, 1e-9));
        assert!(approx_eq(reports[0].slack_seconds, 100.0, 1e-9));
        assert!(reports[0].feasible);

        assert!(approx_eq(reports[1].slack_seconds, -100.0, 1e-9));
        assert!(!reports[1].feasible);
    }

    #[test]
    fn test_evaluate_itinerary_rejects_mismatched_legs() {
        let spots = vec![spot(1000.0, 45.0), spot(5000.0, 45.01)];
        let result = evaluate_itinerary(&spots, 0.3, &[], &PlannerConfig::default());
        assert!(matches!(result, Err(PlannerError::Routing { .. })));

        let result = evaluate_itinerary(&spots, 0.0, &[10.0], &PlannerConfig::default());
        assert!(matches!(result, Err(PlannerError::InvalidPace { .. })));
    }

    #[test]
    fn test_evaluate_single_spot_has_no_legs() {
        let reports =
            evaluate_itinerary(&[spot(1000.0, 45.0)], 0.3, &[], &PlannerConfig::default()).unwrap();
        assert!(reports.is_empty());
    }

    #[test]
    fn test_heuristic_leg_durations() {
        let config = PlannerConfig::default();
        let points = vec![GpsPoint::new(45.0, 7.0), GpsPoint::new(45.01, 7.0)];
        let walking = heuristic_leg_durations(&points, TravelProfile::Walking, &config).unwrap();
        let cycling = heuristic_leg_durations(&points, TravelProfile::Cycling, &config).unwrap();

        assert_eq!(walking.len(), 1);
        assert!(approx_eq(walking[0] * 1.4, cycling[0] * 5.5, 1e-6));
        assert!(heuristic_leg_durations(&points, TravelProfile::Transit, &config).is_none());
    }

    #[test]
    fn test_runner_arrival() {
        assert_eq!(runner_arrival_seconds(10_000.0, 0.3), 3000.0);
    }
}
