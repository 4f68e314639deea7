//! # Cheer Planner
//!
//! Plans where a spectator can stand along a point-to-point race course to see
//! a runner several times.
//!
//! This library provides:
//! - Course indexing into fixed-interval candidate positions
//! - Projection of arbitrary points onto the course
//! - Detection of spectator paths that cross the course
//! - Spot suggestion by even spread or by a greedy reachability walk
//!
//! ## Features
//!
//! - **`parallel`** - Evaluate candidate reachability in parallel with rayon
//! - **`http`** - Enable the routing client for per-leg travel durations
//! - **`ffi`** - Enable FFI bindings for mobile platforms (iOS/Android)
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use cheer_planner::{
//!     GpsPoint, PlannerConfig, SelectionStrategy, SuggestionRequest, TravelProfile,
//!     build_course_index, parse_pace, suggest_spots,
//! };
//!
//! let course: Vec<GpsPoint> = (0..=20)
//!     .map(|i| GpsPoint::new(51.50 + i as f64 * 0.005, -0.13))
//!     .collect();
//!
//! let config = PlannerConfig::default();
//! let index = build_course_index(&course, config.candidate_interval_m);
//!
//! let request = SuggestionRequest {
//!     num_spots: 4,
//!     strategy: SelectionStrategy::MinTravel,
//!     pace_seconds_per_meter: Some(parse_pace("5:30").unwrap()),
//!     profile: TravelProfile::Cycling,
//!     skip_first_km: 1.0,
//! };
//!
//! let spots = suggest_spots(&index, &request, &config).unwrap();
//! assert!(!spots.is_empty());
//! assert!(spots.iter().all(|d| *d >= 1000.0));
//! ```

use serde::{Deserialize, Serialize};

pub mod error;
pub use error::{PlannerError, Result};

pub mod geo_utils;

pub mod course;
pub use course::{build_course_index, CandidatePosition, CourseIndex};

pub mod projection;
pub use projection::{project_onto_course, CourseProjection};

pub mod crossing;
pub use crossing::detect_crossing;

pub mod spots;
pub use spots::{assess_leg, suggest_spots, LegAssessment, SuggestionRequest};

pub mod pace;
pub use pace::{format_pace, parse_pace};

pub mod itinerary;
pub use itinerary::{evaluate_itinerary, heuristic_leg_durations, LegReport};

pub mod planner;
pub use planner::{SelectedSpots, SpotPlanner, SuggestionInput};

// HTTP module for routing durations
#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::RoutingClient;

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!();

/// Initialize logging for Android (only used in FFI)
#[cfg(all(feature = "ffi", target_os = "android"))]
fn init_logging() {
    use android_logger::Config;
    use log::LevelFilter;

    android_logger::init_once(
        Config::default()
            .with_max_level(LevelFilter::Debug)
            .with_tag("CheerPlannerRust"),
    );
}

#[cfg(all(feature = "ffi", not(target_os = "android")))]
fn init_logging() {
    // No-op on non-Android platforms
}

// ============================================================================
// Core Types
// ============================================================================

/// A GPS coordinate with latitude and longitude in degrees.
///
/// Equality is exact coordinate equality.
///
/// # Example
/// ```
/// use cheer_planner::GpsPoint;
/// let point = GpsPoint::new(51.5074, -0.1278); // London
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsPoint {
    /// Create a new GPS point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// How the spectator moves between cheer spots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
#[serde(rename_all = "lowercase")]
pub enum TravelProfile {
    Walking,
    Cycling,
    /// No constant-speed heuristic; never feasible for the greedy walk
    Transit,
}

impl TravelProfile {
    /// Constant travel speed for the straight-line heuristic, `None` for transit.
    pub fn speed_mps(self, config: &PlannerConfig) -> Option<f64> {
        match self {
            TravelProfile::Walking => Some(config.walking_speed_mps),
            TravelProfile::Cycling => Some(config.cycling_speed_mps),
            TravelProfile::Transit => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TravelProfile::Walking => "walking",
            TravelProfile::Cycling => "cycling",
            TravelProfile::Transit => "transit",
        }
    }
}

/// Which algorithm picks the cheer spots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
#[serde(rename_all = "camelCase")]
pub enum SelectionStrategy {
    /// Spread picks evenly along the course
    MaxSpread,
    /// Greedy walk favoring the shortest spectator moves
    MinTravel,
}

/// Tunable constants for indexing and feasibility checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[serde(default)]
pub struct PlannerConfig {
    /// Spacing of candidate positions along the course.
    /// Default: 50.0 meters
    pub candidate_interval_m: f64,

    /// Walking speed for the straight-line heuristic.
    /// Default: 1.4 m/s
    pub walking_speed_mps: f64,

    /// Cycling speed for the straight-line heuristic.
    /// Default: 5.5 m/s
    pub cycling_speed_mps: f64,

    /// Fixed margin for parking, crowds and finding a spot.
    /// Default: 600 seconds
    pub spectator_buffer_s: f64,

    /// Extra time when the spectator's path crosses the course.
    /// Default: 300 seconds
    pub crossing_penalty_s: f64,

    /// Intersections this close to either end of a path are not crossings.
    /// Default: 10.0 meters
    pub crossing_tolerance_m: f64,

    /// Maximum distance from the course for a probe to report a projection.
    /// Default: 40.0 meters
    pub probe_threshold_m: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            candidate_interval_m: 50.0,
            walking_speed_mps: 1.4,
            cycling_speed_mps: 5.5,
            spectator_buffer_s: 600.0,
            crossing_penalty_s: 300.0,
            crossing_tolerance_m: 10.0,
            probe_threshold_m: 40.0,
        }
    }
}

impl PlannerConfig {
    /// Parse a (possibly partial) JSON config; missing fields keep their defaults.
    ///
    /// # Example
    /// ```
    /// use cheer_planner::PlannerConfig;
    ///
    /// let config = PlannerConfig::from_json(r#"{ "walking_speed_mps": 1.2 }"#).unwrap();
    /// assert_eq!(config.walking_speed_mps, 1.2);
    /// assert_eq!(config.candidate_interval_m, 50.0);
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let config: PlannerConfig = serde_json::from_str(json).map_err(|e| PlannerError::Config {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is finite and positive.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("candidate_interval_m", self.candidate_interval_m),
            ("walking_speed_mps", self.walking_speed_mps),
            ("cycling_speed_mps", self.cycling_speed_mps),
            ("spectator_buffer_s", self.spectator_buffer_s),
            ("crossing_penalty_s", self.crossing_penalty_s),
            ("crossing_tolerance_m", self.crossing_tolerance_m),
            ("probe_threshold_m", self.probe_threshold_m),
        ];

        for (name, value) in fields {
            if !(value.is_finite() && value > 0.0) {
                return Err(PlannerError::Config {
                    message: format!("{} must be a positive number, got {}", name, value),
                });
            }
        }
        Ok(())
    }
}

// ============================================================================
// FFI Exports (only when feature enabled)
// ============================================================================

#[cfg(feature = "ffi")]
mod ffi {
    use super::*;
    use log::info;

    /// Convert a flat `[lat1, lng1, lat2, lng2, ...]` buffer into points.
    fn points_from_flat(coords: &[f64]) -> Vec<GpsPoint> {
        coords
            .chunks_exact(2)
            .map(|chunk| GpsPoint::new(chunk[0], chunk[1]))
            .collect()
    }

    /// Candidate positions for a course given as a flat coordinate buffer.
    #[uniffi::export]
    pub fn ffi_build_course_index(coords: Vec<f64>, interval_m: f64) -> Vec<CandidatePosition> {
        init_logging();
        let points = points_from_flat(&coords);
        let start = std::time::Instant::now();
        let index = build_course_index(&points, interval_m);
        info!(
            "[CheerPlannerRust] Indexed {} points into {} candidates in {:?}",
            points.len(),
            index.candidates().len(),
            start.elapsed()
        );
        index.candidates().to_vec()
    }

    /// Project a point onto a course given as a flat coordinate buffer.
    #[uniffi::export]
    pub fn ffi_project_onto_course(query: GpsPoint, coords: Vec<f64>) -> Option<CourseProjection> {
        init_logging();
        let points = points_from_flat(&coords);
        let table = geo_utils::cumulative_distances(&points);
        projection::project_onto_polyline(&query, &points, &table)
    }

    /// Check whether the path `a`-`b` crosses the course.
    #[uniffi::export]
    pub fn ffi_detect_crossing(
        coords: Vec<f64>,
        a: GpsPoint,
        b: GpsPoint,
        tolerance_m: f64,
    ) -> bool {
        init_logging();
        crossing::path_crosses_polyline(&points_from_flat(&coords), &a, &b, tolerance_m)
    }

    /// Suggest cheer spots for a course given as a flat coordinate buffer.
    #[uniffi::export]
    pub fn ffi_suggest_spots(
        coords: Vec<f64>,
        request: SuggestionRequest,
        config: PlannerConfig,
    ) -> std::result::Result<Vec<f64>, PlannerError> {
        init_logging();
        let points = points_from_flat(&coords);
        let index = build_course_index(&points, config.candidate_interval_m);
        suggest_spots(&index, &request, &config)
    }

    /// Parse a "MM:SS" per-km pace into seconds per meter.
    #[uniffi::export]
    pub fn ffi_parse_pace(input: String) -> std::result::Result<f64, PlannerError> {
        parse_pace(&input)
    }

    /// Get default configuration.
    #[uniffi::export]
    pub fn default_config() -> PlannerConfig {
        init_logging();
        PlannerConfig::default()
    }
}

// ============================================================================
// Tests
// ============================================================================
