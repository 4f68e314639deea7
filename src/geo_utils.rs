//! # Geographic Utilities
//!
//! Point and polyline primitives the rest of the planner builds on.
//!
//! ## Overview
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`haversine_distance`] | Great-circle distance between two GPS points |
//! | [`polyline_length`] | Total length of a course in meters |
//! | [`cumulative_distances`] | Along-course distance of every course point |
//! | [`interpolate`] | Linear interpolation between two points in lat/lng space |
//!
//! ## Example
//!
//! ```rust
//! use cheer_planner::{GpsPoint, geo_utils};
//!
//! let course = vec![
//!     GpsPoint::new(51.5074, -0.1278),
//!     GpsPoint::new(51.5080, -0.1290),
//!     GpsPoint::new(51.5090, -0.1300),
//! ];
//!
//! let table = geo_utils::cumulative_distances(&course);
//! assert_eq!(table[0], 0.0);
//! assert!((table[2] - geo_utils::polyline_length(&course)).abs() < 1e-9);
//! ```
//!
//! ## Coordinate System
//!
//! All functions expect WGS84 coordinates (latitude/longitude in degrees).
//! Distances are measured on a sphere; interpolation is planar in degrees,
//! which is accurate enough at the scale of a race course.

use geo::{Distance, Haversine, Point};

use crate::GpsPoint;

// =============================================================================
// Distance Functions
// =============================================================================

/// Calculate the great-circle distance between two GPS points using the Haversine formula.
///
/// Returns the distance in meters along the Earth's surface (spherical Earth,
/// mean radius).
///
/// # Example
///
/// ```rust
/// use cheer_planner::{GpsPoint, geo_utils};
///
/// let london = GpsPoint::new(51.5074, -0.1278);
/// let paris = GpsPoint::new(48.8566, 2.3522);
///
/// let distance = geo_utils::haversine_distance(&london, &paris);
/// assert!((distance - 343_560.0).abs() < 1000.0); // ~344 km
/// ```
#[inline]
pub fn haversine_distance(p1: &GpsPoint, p2: &GpsPoint) -> f64 {
    let point1 = Point::new(p1.longitude, p1.latitude);
    let point2 = Point::new(p2.longitude, p2.latitude);
    Haversine::distance(point1, point2)
}

/// Calculate the total length of a polyline in meters.
///
/// Empty or single-point tracks return 0.0.
pub fn polyline_length(points: &[GpsPoint]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    points
        .windows(2)
        .map(|w| haversine_distance(&w[0], &w[1]))
        .sum()
}

/// Along-course distance of every point: `table[0] = 0` and each entry adds
/// the great-circle length of the preceding segment.
///
/// The table has the same length as `points` and is non-decreasing. An empty
/// input gives an empty table.
pub fn cumulative_distances(points: &[GpsPoint]) -> Vec<f64> {
    let mut table = Vec::with_capacity(points.len());
    let mut total = 0.0;

    for (i, point) in points.iter().enumerate() {
        if i > 0 {
            total += haversine_distance(&points[i - 1], point);
        }
        table.push(total);
    }

    table
}

// =============================================================================
// Interpolation
// =============================================================================

/// Interpolate between two points at ratio `t` (0 = `from`, 1 = `to`),
/// treating latitude and longitude as planar coordinates.
#[inline]
pub fn interpolate(from: &GpsPoint, to: &GpsPoint, t: f64) -> GpsPoint {
    GpsPoint::new(
        from.latitude + (to.latitude - from.latitude) * t,
        from.longitude + (to.longitude - from.longitude) * t,
    )
}

// =============================================================================
// Unit Tests
// =============================================================================
