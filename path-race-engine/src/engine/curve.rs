//! Centripetal Catmull-Rom curves through user placed control points.
//!
//! A [`Curve`] interpolates every control point exactly and can be sampled
//! either by its raw parameter (`point`) or by normalised arc length
//! (`point_at` / `tangent_at`), which is what the race solver uses to move at a
//! constant speed regardless of control point spacing.

use bevy::prelude::*;
use constants::path::{ARC_LENGTH_DIVISIONS, MIN_PATH_POINTS};

use crate::engine::core::errors::PathError;

/// Finite difference step used for tangents.
const TANGENT_DELTA: f32 = 1e-4;

/// Knot spacing below which a segment is treated as degenerate.
const KNOT_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone)]
pub struct Curve {
    points: Vec<Vec3>,
    closed: bool,
    /// Cumulative length at `i / ARC_LENGTH_DIVISIONS` of the raw parameter.
    arc_lengths: Vec<f32>,
}

impl Curve {
    pub fn build(points: &[Vec3], closed: bool) -> Result<Self, PathError> {
        if points.len() < MIN_PATH_POINTS {
            return Err(PathError::TooFewPoints {
                required: MIN_PATH_POINTS,
                found: points.len(),
            });
        }

        let mut curve = Self {
            points: points.to_vec(),
            closed,
            arc_lengths: Vec::new(),
        };
        curve.arc_lengths = curve.compute_arc_lengths(ARC_LENGTH_DIVISIONS);
        Ok(curve)
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Total arc length, approximated by the lookup table chords.
    pub fn length(&self) -> f32 {
        self.arc_lengths.last().copied().unwrap_or(0.0)
    }

    /// Point at raw parameter `t`. Control point `i` sits at `i / segments`.
    pub fn point(&self, t: f32) -> Vec3 {
        let count = self.points.len();
        let segments = self.segment_count();

        let p = segments as f32 * t.clamp(0.0, 1.0);
        let mut index = p.floor() as usize;
        let mut weight = p - index as f32;

        if self.closed {
            index %= count;
        } else if index >= segments {
            index = segments - 1;
            weight = 1.0;
        }

        let (p0, p1, p2, p3) = self.segment_controls(index);
        centripetal_segment(p0, p1, p2, p3, weight)
    }

    /// Point at normalised arc length `u`.
    pub fn point_at(&self, u: f32) -> Vec3 {
        self.point(self.arc_to_parameter(u))
    }

    /// Unit tangent at normalised arc length `u`.
    pub fn tangent_at(&self, u: f32) -> Vec3 {
        let t = self.arc_to_parameter(u);
        let t1 = (t - TANGENT_DELTA).max(0.0);
        let t2 = (t + TANGENT_DELTA).min(1.0);
        (self.point(t2) - self.point(t1)).normalize_or_zero()
    }

    /// Evenly spaced raw-parameter samples for drawing, `divisions + 1` points.
    pub fn sample_points(&self, divisions: usize) -> Vec<Vec3> {
        let divisions = divisions.max(1);
        (0..=divisions)
            .map(|i| self.point(i as f32 / divisions as f32))
            .collect()
    }

    fn segment_count(&self) -> usize {
        if self.closed {
            self.points.len()
        } else {
            self.points.len() - 1
        }
    }

    fn segment_controls(&self, index: usize) -> (Vec3, Vec3, Vec3, Vec3) {
        let points = &self.points;
        let count = points.len();

        if self.closed {
            return (
                points[(index + count - 1) % count],
                points[index],
                points[(index + 1) % count],
                points[(index + 2) % count],
            );
        }

        // Open ends get a mirrored virtual neighbour.
        let p0 = if index > 0 {
            points[index - 1]
        } else {
            points[0] * 2.0 - points[1]
        };
        let p3 = if index + 2 < count {
            points[index + 2]
        } else {
            points[count - 1] * 2.0 - points[count - 2]
        };
        (p0, points[index], points[index + 1], p3)
    }

    fn compute_arc_lengths(&self, divisions: usize) -> Vec<f32> {
        let mut lengths = Vec::with_capacity(divisions + 1);
        let mut last = self.point(0.0);
        let mut sum = 0.0;
        lengths.push(0.0);

        for i in 1..=divisions {
            let current = self.point(i as f32 / divisions as f32);
            sum += current.distance(last);
            lengths.push(sum);
            last = current;
        }

        lengths
    }

    fn arc_to_parameter(&self, u: f32) -> f32 {
        let lengths = &self.arc_lengths;
        let last = lengths.len() - 1;
        let target = u.clamp(0.0, 1.0) * self.length();

        let index = lengths.partition_point(|&l| l <= target).saturating_sub(1);
        if index >= last {
            return 1.0;
        }

        let before = lengths[index];
        let segment_length = lengths[index + 1] - before;
        if segment_length <= f32::EPSILON {
            return index as f32 / last as f32;
        }

        let fraction = (target - before) / segment_length;
        (index as f32 + fraction) / last as f32
    }
}

fn centripetal_segment(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, weight: f32) -> Vec3 {
    let mut dt0 = p0.distance_squared(p1).powf(0.25);
    let mut dt1 = p1.distance_squared(p2).powf(0.25);
    let mut dt2 = p2.distance_squared(p3).powf(0.25);

    if dt1 < KNOT_EPSILON {
        dt1 = 1.0;
    }
    if dt0 < KNOT_EPSILON {
        dt0 = dt1;
    }
    if dt2 < KNOT_EPSILON {
        dt2 = dt1;
    }

    // Hermite tangents of the non-uniform spline, rescaled to the [0, 1] segment.
    let m1 = ((p1 - p0) / dt0 - (p2 - p0) / (dt0 + dt1) + (p2 - p1) / dt1) * dt1;
    let m2 = ((p2 - p1) / dt1 - (p3 - p1) / (dt1 + dt2) + (p3 - p2) / dt2) * dt1;

    let c0 = p1;
    let c1 = m1;
    let c2 = p1 * -3.0 + p2 * 3.0 - m1 * 2.0 - m2;
    let c3 = p1 * 2.0 - p2 * 2.0 + m1 + m2;

    let t = weight;
    c0 + c1 * t + c2 * (t * t) + c3 * (t * t * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_loop() -> Vec<Vec3> {
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(20.0, 0.0, 0.0),
            Vec3::new(20.0, 2.0, 20.0),
            Vec3::new(0.0, 0.0, 20.0),
        ]
    }

    #[test]
    fn rejects_single_point() {
        let err = Curve::build(&[Vec3::ZERO], false).unwrap_err();
        assert_eq!(err, PathError::TooFewPoints { required: 2, found: 1 });
    }

    #[test]
    fn straight_segment_has_expected_length() {
        let curve = Curve::build(&[Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0)], false).unwrap();
        assert!((curve.length() - 10.0).abs() < 1e-3);
        assert!(curve.point_at(0.5).distance(Vec3::new(5.0, 0.0, 0.0)) < 1e-3);
        assert!(curve.tangent_at(0.3).distance(Vec3::X) < 1e-4);
    }

    #[test]
    fn open_curve_passes_through_control_points() {
        let points = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(5.0, 1.0, 3.0),
            Vec3::new(12.0, 0.0, -4.0),
            Vec3::new(20.0, 2.0, 8.0),
            Vec3::new(25.0, 0.0, 0.0),
        ];
        let curve = Curve::build(&points, false).unwrap();
        let segments = (points.len() - 1) as f32;

        for (i, expected) in points.iter().enumerate() {
            let actual = curve.point(i as f32 / segments);
            assert!(
                actual.distance(*expected) < 1e-4,
                "control point {i}: {actual:?} != {expected:?}"
            );
        }
    }

    #[test]
    fn closed_curve_is_periodic() {
        let curve = Curve::build(&square_loop(), true).unwrap();

        assert_eq!(curve.point_at(0.0), curve.point_at(1.0));
        assert!(curve.point_at(0.0).distance(Vec3::ZERO) < 1e-5);

        let start = curve.tangent_at(0.0);
        let end = curve.tangent_at(1.0);
        assert!(start.distance(end) < 1e-2, "{start:?} vs {end:?}");
    }

    #[test]
    fn closed_curve_visits_control_points() {
        let points = square_loop();
        let curve = Curve::build(&points, true).unwrap();
        for (i, expected) in points.iter().enumerate() {
            let actual = curve.point(i as f32 / points.len() as f32);
            assert!(actual.distance(*expected) < 1e-4);
        }
    }

    #[test]
    fn arc_length_sampling_is_uniform() {
        // Uneven control spacing along a line must still map u linearly onto distance.
        let points = [
            Vec3::ZERO,
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(9.0, 0.0, 0.0),
            Vec3::new(10.0, 0.0, 0.0),
        ];
        let curve = Curve::build(&points, false).unwrap();
        let quarter = curve.point_at(0.25);
        assert!((quarter.x - curve.length() * 0.25).abs() < 0.05, "{quarter:?}");
    }

    #[test]
    fn sample_points_includes_both_ends() {
        let curve = Curve::build(&[Vec3::ZERO, Vec3::new(0.0, 0.0, 4.0)], false).unwrap();
        let samples = curve.sample_points(200);
        assert_eq!(samples.len(), 201);
        assert!(samples[0].distance(Vec3::ZERO) < 1e-5);
        assert!(samples[200].distance(Vec3::new(0.0, 0.0, 4.0)) < 1e-5);
    }

    #[test]
    fn duplicate_points_do_not_produce_nan() {
        let points = [Vec3::ZERO, Vec3::ZERO, Vec3::new(3.0, 0.0, 0.0)];
        let curve = Curve::build(&points, false).unwrap();
        assert!(curve.length().is_finite());
        assert!(curve.point_at(0.5).is_finite());
    }
}
