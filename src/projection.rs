//! Projection of arbitrary points onto the course polyline.
//!
//! The projection ratio is computed treating latitude/longitude degrees as a
//! plane, then the distance from the query to the projected point is measured
//! on the sphere. This is a small-scale approximation, valid at the size of a
//! race course, and it is kept as-is so results stay reproducible.

use crate::course::CourseIndex;
use crate::geo_utils::{haversine_distance, interpolate};
use crate::GpsPoint;

/// Nearest location on the course to a query point.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct CourseProjection {
    /// Great-circle distance from the query point to `point`, in meters
    pub distance: f64,
    /// Projected location on the course
    pub point: GpsPoint,
    /// Index of the course point that starts the matched segment
    pub segment_index: u64,
    /// Position along the matched segment, 0.0 to 1.0
    pub ratio: f64,
    /// Distance along the course from the start to `point`, in meters
    pub along_course_distance: f64,
}

/// Project `query` onto a course given as points plus their cumulative distances.
///
/// Every segment is tested and the nearest projection wins; on exact ties the
/// earliest segment is kept. Zero-length segments are skipped. Returns `None`
/// when the course has fewer than two points, every segment is degenerate, or
/// the distance table does not match the points.
pub fn project_onto_polyline(
    query: &GpsPoint,
    points: &[GpsPoint],
    cumulative: &[f64],
) -> Option<CourseProjection> {
    if points.len() < 2 || cumulative.len() != points.len() {
        return None;
    }

    let mut best: Option<CourseProjection> = None;

    for (i, w) in points.windows(2).enumerate() {
        let (p1, p2) = (&w[0], &w[1]);
        let dx = p2.longitude - p1.longitude;
        let dy = p2.latitude - p1.latitude;
        let length_sq = dx * dx + dy * dy;
        if length_sq == 0.0 {
            continue;
        }

        let t = (((query.longitude - p1.longitude) * dx + (query.latitude - p1.latitude) * dy)
            / length_sq)
            .clamp(0.0, 1.0);
        let projected = interpolate(p1, p2, t);
        let distance = haversine_distance(query, &projected);

        if best.map_or(true, |b| distance < b.distance) {
            best = Some(CourseProjection {
                distance,
                point: projected,
                segment_index: i as u64,
                ratio: t,
                along_course_distance: cumulative[i] + t * haversine_distance(p1, p2),
            });
        }
    }

    best
}

/// Project `query` onto an indexed course.
///
/// # Example
///
/// ```rust
/// use cheer_planner::{GpsPoint, build_course_index, project_onto_course};
///
/// let course = vec![
///     GpsPoint::new(51.5000, -0.1300),
///     GpsPoint::new(51.5010, -0.1300),
/// ];
/// let index = build_course_index(&course, 50.0);
///
/// // A point just east of the course, halfway along
/// let hit = project_onto_course(&GpsPoint::new(51.5005, -0.1299), &index).unwrap();
/// assert!((hit.ratio - 0.5).abs() < 1e-6);
/// assert!(hit.distance < 10.0);
/// ```
pub fn project_onto_course(query: &GpsPoint, index: &CourseIndex) -> Option<CourseProjection> {
    project_onto_polyline(query, index.points(), index.cumulative_distances())
}
