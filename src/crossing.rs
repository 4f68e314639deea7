//! Detection of spectator paths that cross the race course.
//!
//! Two cheer spots on the course always touch it at their own endpoints, so a
//! path only counts as crossing when it meets the course somewhere away from
//! both ends. Collinear overlaps are not treated as crossings.

use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{Coord, Line};
use rstar::AABB;

use crate::course::CourseIndex;
use crate::geo_utils::haversine_distance;
use crate::GpsPoint;

fn to_line(a: &GpsPoint, b: &GpsPoint) -> Line<f64> {
    Line::new(
        Coord {
            x: a.longitude,
            y: a.latitude,
        },
        Coord {
            x: b.longitude,
            y: b.latitude,
        },
    )
}

fn single_point(start: &GpsPoint, end: &GpsPoint, path: Line<f64>) -> Option<GpsPoint> {
    match line_intersection(to_line(start, end), path) {
        Some(LineIntersection::SinglePoint { intersection, .. }) => {
            Some(GpsPoint::new(intersection.y, intersection.x))
        }
        _ => None,
    }
}

fn is_away_from_ends(point: &GpsPoint, a: &GpsPoint, b: &GpsPoint, tolerance_m: f64) -> bool {
    haversine_distance(point, a) > tolerance_m && haversine_distance(point, b) > tolerance_m
}

/// True if the straight path `a`–`b` crosses the polyline more than
/// `tolerance_m` meters away from both `a` and `b`.
///
/// Scans every segment; [`detect_crossing`] gives the same answer using the
/// course index's R-tree.
pub fn path_crosses_polyline(
    points: &[GpsPoint],
    a: &GpsPoint,
    b: &GpsPoint,
    tolerance_m: f64,
) -> bool {
    let path = to_line(a, b);
    points
        .windows(2)
        .filter_map(|w| single_point(&w[0], &w[1], path))
        .any(|p| is_away_from_ends(&p, a, b, tolerance_m))
}

/// True if the straight spectator path `a`–`b` crosses the indexed course
/// somewhere other than within `tolerance_m` of its endpoints.
///
/// # Example
///
/// ```rust
/// use cheer_planner::{GpsPoint, build_course_index, detect_crossing};
///
/// let course = vec![GpsPoint::new(0.0, 0.0), GpsPoint::new(0.01, 0.0)];
/// let index = build_course_index(&course, 50.0);
///
/// // Walking straight across the course
/// let west = GpsPoint::new(0.005, -0.002);
/// let east = GpsPoint::new(0.005, 0.002);
/// assert!(detect_crossing(&index, &west, &east, 10.0));
///
/// // Starting on the course itself is not a crossing
/// let on_course = GpsPoint::new(0.005, 0.0);
/// assert!(!detect_crossing(&index, &on_course, &east, 10.0));
/// ```
pub fn detect_crossing(index: &CourseIndex, a: &GpsPoint, b: &GpsPoint, tolerance_m: f64) -> bool {
    if index.is_empty() {
        return false;
    }

    let path = to_line(a, b);
    let envelope = AABB::from_corners([a.longitude, a.latitude], [b.longitude, b.latitude]);

    index
        .segments_in_envelope(&envelope)
        .filter_map(|segment| single_point(&segment.start, &segment.end, path))
        .any(|p| is_away_from_ends(&p, a, b, tolerance_m))
}
