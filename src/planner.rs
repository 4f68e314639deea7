//! Stateful planning session: one course, its index, and the current selection.
//!
//! Every input change recomputes the derived structures in full. A failed
//! suggestion run leaves the previous selection untouched.

use log::{debug, info};

use crate::course::{build_course_index, CandidatePosition, CourseIndex};
use crate::error::{PlannerError, Result};
use crate::itinerary::{evaluate_itinerary, heuristic_leg_durations, LegReport};
use crate::pace::parse_pace;
use crate::projection::{project_onto_course, CourseProjection};
use crate::spots::{suggest_spots, SuggestionRequest};
use crate::{GpsPoint, PlannerConfig, SelectionStrategy, TravelProfile};

/// Along-course distances the user has chosen, kept sorted and unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectedSpots {
    distances: Vec<f64>,
}

impl SelectedSpots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.distances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    pub fn contains(&self, distance: f64) -> bool {
        self.position(distance).is_ok()
    }

    /// Distances in ascending order.
    pub fn sorted(&self) -> Vec<f64> {
        self.distances.clone()
    }

    /// Replace the whole selection.
    pub fn replace(&mut self, distances: &[f64]) {
        self.distances = distances.to_vec();
        self.distances.sort_by(f64::total_cmp);
        self.distances.dedup();
    }

    /// Insert `distance` if absent, remove it if present. Returns whether it
    /// is selected afterwards. Only candidate keys of `index` are accepted.
    pub fn toggle(&mut self, distance: f64, index: &CourseIndex) -> Result<bool> {
        if index.candidate_at(distance).is_none() {
            return Err(PlannerError::UnknownCandidate { distance });
        }

        match self.position(distance) {
            Ok(i) => {
                self.distances.remove(i);
                Ok(false)
            }
            Err(i) => {
                self.distances.insert(i, distance);
                Ok(true)
            }
        }
    }

    /// Drop any distance that is no longer a candidate key.
    pub fn retain_candidates(&mut self, index: &CourseIndex) {
        self.distances.retain(|d| index.candidate_at(*d).is_some());
    }

    fn position(&self, distance: f64) -> std::result::Result<usize, usize> {
        self.distances.binary_search_by(|d| d.total_cmp(&distance))
    }
}

/// A suggestion run as entered by the user, with the pace still a string.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionInput {
    pub num_spots: u32,
    pub strategy: SelectionStrategy,
    /// "MM:SS" per km; only parsed for MinTravel
    pub pace: String,
    pub profile: TravelProfile,
    pub skip_first_km: f64,
}

/// Planning session over one course.
///
/// # Example
///
/// ```rust
/// use cheer_planner::{
///     GpsPoint, PlannerConfig, SelectionStrategy, SpotPlanner, SuggestionInput, TravelProfile,
/// };
///
/// let mut planner = SpotPlanner::new(PlannerConfig::default()).unwrap();
/// let course: Vec<GpsPoint> = (0..=10)
///     .map(|i| GpsPoint::new(51.50 + i as f64 * 0.002, -0.13))
///     .collect();
/// planner.load_course(&course);
///
/// let input = SuggestionInput {
///     num_spots: 3,
///     strategy: SelectionStrategy::MaxSpread,
///     pace: String::new(),
///     profile: TravelProfile::Walking,
///     skip_first_km: 0.0,
/// };
/// assert_eq!(planner.suggest(&input).unwrap(), 3);
/// assert_eq!(planner.selected().len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct SpotPlanner {
    config: PlannerConfig,
    index: CourseIndex,
    selected: SelectedSpots,
}

impl SpotPlanner {
    /// Create a planner with no course loaded.
    pub fn new(config: PlannerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            index: CourseIndex::empty(config.candidate_interval_m),
            config,
            selected: SelectedSpots::new(),
        })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn index(&self) -> &CourseIndex {
        &self.index
    }

    pub fn selected(&self) -> &SelectedSpots {
        &self.selected
    }

    pub fn has_course(&self) -> bool {
        !self.index.is_empty()
    }

    /// Load a new course, rebuilding the index and clearing the selection.
    pub fn load_course(&mut self, points: &[GpsPoint]) {
        self.index = build_course_index(points, self.config.candidate_interval_m);
        self.selected = SelectedSpots::new();
        info!(
            "load_course: {} points, {:.0}m, {} candidates",
            points.len(),
            self.index.total_distance(),
            self.index.candidates().len()
        );
    }

    /// Change the candidate interval. Selected spots that are no longer
    /// candidates are dropped.
    pub fn set_interval(&mut self, interval_m: f64) -> Result<()> {
        let mut config = self.config.clone();
        config.candidate_interval_m = interval_m;
        config.validate()?;

        self.config = config;
        self.index = self.index.with_interval(interval_m);
        let before = self.selected.len();
        self.selected.retain_candidates(&self.index);
        debug!(
            "set_interval: {}m, kept {}/{} selected spots",
            interval_m,
            self.selected.len(),
            before
        );
        Ok(())
    }

    /// Run a suggestion and replace the selection with its result.
    ///
    /// Returns how many spots were selected, which can be fewer than asked
    /// for. An unparseable pace for MinTravel is an error and the current
    /// selection is kept.
    pub fn suggest(&mut self, input: &SuggestionInput) -> Result<usize> {
        let pace_seconds_per_meter = match input.strategy {
            SelectionStrategy::MinTravel => Some(parse_pace(&input.pace)?),
            SelectionStrategy::MaxSpread => parse_pace(&input.pace).ok(),
        };

        let request = SuggestionRequest {
            num_spots: input.num_spots,
            strategy: input.strategy,
            pace_seconds_per_meter,
            profile: input.profile,
            skip_first_km: input.skip_first_km,
        };

        let spots = suggest_spots(&self.index, &request, &self.config)?;
        if spots.len() < input.num_spots as usize {
            info!(
                "suggest: {} of {} requested spots available",
                spots.len(),
                input.num_spots
            );
        }
        self.selected.replace(&spots);
        Ok(spots.len())
    }

    /// Toggle a single candidate in or out of the selection.
    pub fn toggle(&mut self, distance: f64) -> Result<bool> {
        self.selected.toggle(distance, &self.index)
    }

    /// Project a point onto the course, surfaced only when it is within the
    /// configured probe threshold.
    pub fn probe(&self, point: &GpsPoint) -> Option<CourseProjection> {
        project_onto_course(point, &self.index)
            .filter(|hit| hit.distance <= self.config.probe_threshold_m)
    }

    /// Selected spots with their locations, in course order.
    pub fn selected_positions(&self) -> Vec<CandidatePosition> {
        self.selected
            .distances
            .iter()
            .filter_map(|d| self.index.candidate_at(*d).copied())
            .collect()
    }

    /// Check the current selection leg by leg.
    ///
    /// Uses `leg_durations` when supplied (e.g. from a routing service),
    /// otherwise the constant-speed heuristic for `profile`.
    pub fn itinerary(
        &self,
        pace_seconds_per_meter: f64,
        profile: TravelProfile,
        leg_durations: Option<&[f64]>,
    ) -> Result<Vec<LegReport>> {
        let spots = self.selected_positions();
        let durations = match leg_durations {
            Some(durations) => durations.to_vec(),
            None => {
                let points: Vec<GpsPoint> = spots.iter().map(|s| s.point).collect();
                heuristic_leg_durations(&points, profile, &self.config).ok_or_else(|| {
                    PlannerError::UnsupportedProfile {
                        profile: profile.as_str().to_string(),
                    }
                })?
            }
        };
        evaluate_itinerary(&spots, pace_seconds_per_meter, &durations, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course::tests::{lat_step, straight_course};

    fn planner_with_course() -> SpotPlanner {
        let mut planner = SpotPlanner::new(PlannerConfig::default()).unwrap();
        planner.load_course(&straight_course(10, 500.0));
        planner
    }

    fn input(strategy: SelectionStrategy, pace: &str) -> SuggestionInput {
        SuggestionInput {
            num_spots: 3,
            strategy,
            pace: pace.to_string(),
            profile: TravelProfile::Walking,
            skip_first_km: 0.0,
        }
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = PlannerConfig {
            cycling_speed_mps: -1.0,
            ..PlannerConfig::default()
        };
        assert!(matches!(SpotPlanner::new(config), Err(PlannerError::Config { .. })));
    }

    #[test]
    fn test_no_course_loaded() {
        let mut planner = SpotPlanner::new(PlannerConfig::default()).unwrap();
        planner.load_course(&[GpsPoint::new(45.0, 7.0)]);
        assert!(!planner.has_course());
        assert_eq!(planner.suggest(&input(SelectionStrategy::MaxSpread, "")).unwrap(), 0);
        assert!(planner.probe(&GpsPoint::new(45.0, 7.0)).is_none());
    }

    #[test]
    fn test_suggest_replaces_selection() {
        let mut planner = planner_with_course();
        assert_eq!(planner.suggest(&input(SelectionStrategy::MaxSpread, "")).unwrap(), 3);
        let first = planner.selected().sorted();
        assert_eq!(first.len(), 3);
        assert_eq!(first[0], 50.0);

        let mut later = input(SelectionStrategy::MaxSpread, "");
        later.skip_first_km = 1.0;
        planner.suggest(&later).unwrap();
        assert!(planner.selected().sorted().iter().all(|d| *d >= 1000.0));
    }

    #[test]
    fn test_invalid_pace_keeps_selection() {
        let mut planner = planner_with_course();
        planner.suggest(&input(SelectionStrategy::MaxSpread, "")).unwrap();
        let before = planner.selected().clone();

        let result = planner.suggest(&input(SelectionStrategy::MinTravel, "abc"));
        assert!(matches!(result, Err(PlannerError::InvalidPace { .. })));
        assert_eq!(planner.selected(), &before);
    }

    #[test]
    fn test_min_travel_partial_result() {
        let mut planner = planner_with_course();
        // 5:00/km walking on a straight course never catches up
        let selected = planner.suggest(&input(SelectionStrategy::MinTravel, "5:00")).unwrap();
        assert_eq!(selected, 1);
        assert_eq!(planner.selected().sorted(), vec![50.0]);
    }

    #[test]
    fn test_toggle() {
        let mut planner = planner_with_course();
        assert!(planner.toggle(150.0).unwrap());
        assert!(planner.selected().contains(150.0));
        assert!(!planner.toggle(150.0).unwrap());
        assert!(planner.selected().is_empty());

        assert!(matches!(
            planner.toggle(151.0),
            Err(PlannerError::UnknownCandidate { .. })
        ));
    }

    #[test]
    fn test_set_interval_retains_valid_spots() {
        let mut planner = planner_with_course();
        planner.toggle(100.0).unwrap();
        planner.toggle(150.0).unwrap();

        planner.set_interval(100.0).unwrap();
        assert_eq!(planner.selected().sorted(), vec![100.0]);
        assert_eq!(planner.index().interval(), 100.0);

        assert!(planner.set_interval(0.0).is_err());
        assert_eq!(planner.config().candidate_interval_m, 100.0);
    }

    #[test]
    fn test_probe_threshold() {
        let planner = planner_with_course();
        let near = GpsPoint::new(45.0 + lat_step(1234.0), 7.0002); // ~16m east
        let hit = planner.probe(&near).unwrap();
        assert!((hit.along_course_distance - 1234.0).abs() < 1e-3);

        let far = GpsPoint::new(45.0 + lat_step(1234.0), 7.001); // ~79m east
        assert!(planner.probe(&far).is_none());
    }

    #[test]
    fn test_itinerary_heuristic_and_supplied() {
        let mut planner = planner_with_course();
        planner.toggle(500.0).unwrap();
        planner.toggle(4000.0).unwrap();

        // 3500m of course at 1 s/m against 2500s walking + 600s buffer
        let reports = planner.itinerary(1.0, TravelProfile::Walking, None).unwrap();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].feasible);

        let reports = planner.itinerary(1.0, TravelProfile::Walking, Some(&[3200.0])).unwrap();
        assert!(!reports[0].feasible);

        assert!(matches!(
            planner.itinerary(1.0, TravelProfile::Transit, None),
            Err(PlannerError::UnsupportedProfile { .. })
        ));
    }
}
