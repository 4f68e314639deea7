//! Course indexing: cumulative distances and fixed-interval candidate positions.
//!
//! A [`CourseIndex`] is built once per loaded course (and again whenever the
//! candidate interval changes). It is immutable afterwards; every consumer
//! (projection, crossing detection, spot selection) reads from the same
//! snapshot so the point list and its distance table always agree.

use std::fmt;

use log::{debug, warn};
use rstar::{RTree, RTreeObject, AABB};

use crate::geo_utils::{cumulative_distances, haversine_distance, interpolate};
use crate::GpsPoint;

/// A finish candidate closer than this to the last regular candidate replaces it.
pub const FINISH_MERGE_TOLERANCE_M: f64 = 0.01;

/// A position along the course where a spectator could stand.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct CandidatePosition {
    /// Along-course distance in meters (unique key)
    pub distance: f64,
    /// Location on the course at that distance
    pub point: GpsPoint,
}

/// One course segment, stored in the R-tree for crossing queries.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CourseSegment {
    pub start: GpsPoint,
    pub end: GpsPoint,
}

impl RTreeObject for CourseSegment {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.start.longitude, self.start.latitude],
            [self.end.longitude, self.end.latitude],
        )
    }
}

/// Derived structures for one course: the point sequence, its cumulative
/// distance table, candidate positions and a segment R-tree.
#[derive(Clone)]
pub struct CourseIndex {
    points: Vec<GpsPoint>,
    cumulative: Vec<f64>,
    candidates: Vec<CandidatePosition>,
    interval: f64,
    segments: RTree<CourseSegment>,
}

impl fmt::Debug for CourseIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CourseIndex")
            .field("points", &self.points.len())
            .field("candidates", &self.candidates.len())
            .field("interval", &self.interval)
            .field("total_distance", &self.total_distance())
            .finish()
    }
}

impl CourseIndex {
    /// An index with no course loaded.
    pub fn empty(interval: f64) -> Self {
        Self {
            points: Vec::new(),
            cumulative: Vec::new(),
            candidates: Vec::new(),
            interval,
            segments: RTree::new(),
        }
    }

    /// The course points this index was built from.
    pub fn points(&self) -> &[GpsPoint] {
        &self.points
    }

    /// Along-course distance of each course point.
    pub fn cumulative_distances(&self) -> &[f64] {
        &self.cumulative
    }

    /// Candidate positions, sorted by distance.
    pub fn candidates(&self) -> &[CandidatePosition] {
        &self.candidates
    }

    pub fn interval(&self) -> f64 {
        self.interval
    }

    /// Total course length in meters (0 when no course is loaded).
    pub fn total_distance(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// True when fewer than two course points were supplied.
    pub fn is_empty(&self) -> bool {
        self.points.len() < 2
    }

    /// Look up the candidate keyed by exactly `distance`.
    pub fn candidate_at(&self, distance: f64) -> Option<&CandidatePosition> {
        self.candidates
            .binary_search_by(|c| c.distance.total_cmp(&distance))
            .ok()
            .map(|i| &self.candidates[i])
    }

    /// Rebuild the candidate table for a new interval, reusing the course.
    pub fn with_interval(&self, interval: f64) -> Self {
        build_course_index(&self.points, interval)
    }

    /// Course segments whose bounding box touches `envelope`.
    pub(crate) fn segments_in_envelope(
        &self,
        envelope: &AABB<[f64; 2]>,
    ) -> impl Iterator<Item = &CourseSegment> {
        self.segments.locate_in_envelope_intersecting(envelope)
    }
}

/// Build the cumulative distance table and candidate positions for a course.
///
/// Candidates are emitted every `interval` meters by interpolating inside the
/// segment that crosses each threshold (one long segment may emit several),
/// followed by one finish candidate keyed by the true total distance. When the
/// total is a whole multiple of the interval the finish replaces the last
/// regular candidate instead of duplicating it.
///
/// Courses with fewer than two points produce an empty index. Zero-length
/// segments contribute no candidates.
///
/// # Example
///
/// ```rust
/// use cheer_planner::{GpsPoint, build_course_index};
///
/// let course = vec![
///     GpsPoint::new(51.5000, -0.1300),
///     GpsPoint::new(51.5020, -0.1300),
/// ];
/// let index = build_course_index(&course, 50.0);
///
/// let finish = index.candidates().last().unwrap();
/// assert_eq!(finish.distance, index.total_distance());
/// assert_eq!(finish.point, course[1]);
/// ```
pub fn build_course_index(points: &[GpsPoint], interval: f64) -> CourseIndex {
    if points.len() < 2 {
        debug!("build_course_index: {} points, no course loaded", points.len());
        return CourseIndex::empty(interval);
    }

    let cumulative = cumulative_distances(points);
    let total = cumulative.last().copied().unwrap_or(0.0);
    let mut candidates = Vec::new();

    if interval.is_finite() && interval > 0.0 {
        let mut emitted: u64 = 0;
        let mut next = interval;

        for (i, w) in points.windows(2).enumerate() {
            let segment_length = haversine_distance(&w[0], &w[1]);
            if segment_length <= 0.0 {
                continue;
            }
            let start = cumulative[i];
            let end = start + segment_length;

            while next <= end {
                let t = (next - start) / segment_length;
                candidates.push(CandidatePosition {
                    distance: next,
                    point: interpolate(&w[0], &w[1], t),
                });
                emitted += 1;
                next = (emitted + 1) as f64 * interval;
            }
        }
    } else {
        warn!("build_course_index: invalid interval {}, finish candidate only", interval);
    }

    if let Some(last) = candidates.last() {
        if (total - last.distance).abs() <= FINISH_MERGE_TOLERANCE_M {
            candidates.pop();
        }
    }
    candidates.push(CandidatePosition {
        distance: total,
        point: points[points.len() - 1],
    });

    let segments = RTree::bulk_load(
        points
            .windows(2)
            .map(|w| CourseSegment {
                start: w[0],
                end: w[1],
            })
            .collect(),
    );

    debug!(
        "build_course_index: {} points, {:.0}m, {} candidates every {}m",
        points.len(),
        total,
        candidates.len(),
        interval
    );

    CourseIndex {
        points: points.to_vec(),
        cumulative,
        candidates,
        interval,
        segments,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    const EARTH_RADIUS_M: f64 = 6_371_008.8;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    /// Latitude delta (degrees) spanning `meters` along a meridian.
    pub(crate) fn lat_step(meters: f64) -> f64 {
        (meters / EARTH_RADIUS_M).to_degrees()
    }

    /// A course running due north with `count` points `spacing` meters apart.
    pub(crate) fn straight_course(count: usize, spacing: f64) -> Vec<GpsPoint> {
        (0..count)
            .map(|i| GpsPoint::new(45.0 + i as f64 * lat_step(spacing), 7.0))
            .collect()
    }

    #[test]
    fn test_straight_course_candidates() {
        let course = straight_course(10, 500.0);
        let index = build_course_index(&course, 50.0);

        assert!(approx_eq(index.total_distance(), 4500.0, 1e-3));
        // Finish coincides with the last regular key: 90, not 91
        assert_eq!(index.candidates().len(), 90);
        assert_eq!(index.candidates()[0].distance, 50.0);
        assert_eq!(index.candidates()[1].distance, 100.0);

        let finish = index.candidates().last().unwrap();
        assert_eq!(finish.distance, index.total_distance());
        assert_eq!(finish.point, course[9]);
    }

    #[test]
    fn test_candidate_coverage_non_multiple() {
        let course = vec![
            GpsPoint::new(51.5000, -0.1300),
            GpsPoint::new(51.5031, -0.1300),
            GpsPoint::new(51.5031, -0.1255),
        ];
        let index = build_course_index(&course, 50.0);
        let total = index.total_distance();
        let regular = (total / 50.0).floor() as usize;
        assert!(total - regular as f64 * 50.0 > 1.0, "fixture must not be a multiple");

        assert_eq!(index.candidates().len(), regular + 1);
        assert_eq!(index.candidates().last().unwrap().distance, total);
        assert!(index
            .candidates()
            .windows(2)
            .all(|w| w[1].distance > w[0].distance));
        assert!(index
            .candidates()
            .iter()
            .all(|c| c.distance >= 0.0 && c.distance <= total));
    }

    #[test]
    fn test_finish_within_tolerance_replaces_last_key() {
        // 5mm past 4500m: the finish takes the place of the 4500m key
        let course = straight_course(2, 4500.005);
        let index = build_course_index(&course, 50.0);
        let total = index.total_distance();
        assert!(approx_eq(total, 4500.005, 1e-4));

        let keys: Vec<f64> = index.candidates().iter().map(|c| c.distance).collect();
        assert_eq!(keys.len(), 90);
        assert_eq!(keys[88], 4450.0);
        assert_eq!(keys[89], total);
        assert!(index.candidate_at(4500.0).is_none());

        // 5cm past is outside the tolerance, so both keys survive
        let index = build_course_index(&straight_course(2, 4500.05), 50.0);
        let keys: Vec<f64> = index.candidates().iter().map(|c| c.distance).collect();
        assert_eq!(keys.len(), 91);
        assert_eq!(keys[89], 4500.0);
        assert!(approx_eq(keys[90], 4500.05, 1e-4));
    }

    #[test]
    fn test_long_segment_emits_multiple_candidates() {
        let course = straight_course(2, 500.0);
        let index = build_course_index(&course, 50.0);
        assert_eq!(index.candidates().len(), 10);

        // Interpolated points sit on the segment at the right latitude
        let fifth = index.candidate_at(250.0).unwrap();
        assert!(approx_eq(fifth.point.latitude, 45.0 + lat_step(250.0), 1e-9));
        assert_eq!(fifth.point.longitude, 7.0);
    }

    #[test]
    fn test_short_courses_are_empty() {
        let empty = build_course_index(&[], 50.0);
        assert!(empty.is_empty());
        assert!(empty.candidates().is_empty());
        assert!(empty.cumulative_distances().is_empty());
        assert_eq!(empty.total_distance(), 0.0);

        let single = build_course_index(&[GpsPoint::new(51.5, -0.1)], 50.0);
        assert!(single.is_empty());
        assert!(single.candidates().is_empty());
    }

    #[test]
    fn test_zero_length_segments_are_skipped() {
        let mut course = straight_course(3, 120.0);
        course.insert(1, course[1]);
        course.push(course[3]);
        let index = build_course_index(&course, 50.0);

        assert_eq!(index.cumulative_distances().len(), course.len());
        assert!(approx_eq(index.total_distance(), 240.0, 1e-3));
        let keys: Vec<f64> = index.candidates().iter().map(|c| c.distance).collect();
        assert_eq!(&keys[..4], &[50.0, 100.0, 150.0, 200.0]);
        assert_eq!(keys.len(), 5);
    }

    #[test]
    fn test_candidate_at_and_rebuild() {
        let course = straight_course(3, 100.0);
        let index = build_course_index(&course, 50.0);
        assert!(index.candidate_at(150.0).is_some());
        assert!(index.candidate_at(149.0).is_none());

        let coarse = index.with_interval(100.0);
        assert_eq!(coarse.interval(), 100.0);
        assert_eq!(coarse.candidates().len(), 2);
        assert!(coarse.candidate_at(150.0).is_none());
    }

    #[test]
    fn test_invalid_interval_keeps_finish_only() {
        let course = straight_course(3, 100.0);
        let index = build_course_index(&course, 0.0);
        assert_eq!(index.candidates().len(), 1);
        assert_eq!(index.candidates()[0].distance, index.total_distance());
    }
}
