// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Tolerance policy and geometric predicates for brush construction
//!
//! Every floating point comparison in the kernel goes through [`Tolerance`].
//! Near-zero plane distances are re-evaluated with compensated summation so
//! that classification around the boundary stays stable.

use super::Plane;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Length below which a vector cannot be normalized. This only guards
/// divisions; geometric comparisons use [`Tolerance`].
pub const ZERO_LENGTH: f64 = f64::EPSILON;

/// Classification of a point against a plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaneClassification {
    /// Positive side of the outward normal, outside the half-space
    Front,
    /// Negative side of the outward normal, inside the half-space
    Back,
    /// Within epsilon of the plane
    On,
}

/// The single numerical tolerance used by the kernel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    epsilon: f64,
}

impl Tolerance {
    pub const DEFAULT_EPSILON: f64 = 1e-6;

    /// Create a tolerance. Non-finite or non-positive values fall back to the default.
    pub fn new(epsilon: f64) -> Self {
        if epsilon.is_finite() && epsilon > 0.0 {
            Self { epsilon }
        } else {
            Self::default()
        }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn is_zero(&self, value: f64) -> bool {
        value.abs() <= self.epsilon
    }

    /// Signed distance classification, positive meaning outside
    pub fn classify_distance(&self, distance: f64) -> PlaneClassification {
        if distance > self.epsilon {
            PlaneClassification::Front
        } else if distance < -self.epsilon {
            PlaneClassification::Back
        } else {
            PlaneClassification::On
        }
    }

    /// Two positions closer than epsilon are the same vertex
    pub fn points_coincide(&self, a: &Point3<f64>, b: &Point3<f64>) -> bool {
        (a - b).norm() <= self.epsilon
    }

    /// Two unit vectors pointing the same way within epsilon
    pub fn directions_coincide(&self, a: &Vector3<f64>, b: &Vector3<f64>) -> bool {
        (a - b).norm() <= self.epsilon
    }

    /// A 3x3 determinant below epsilon is treated as singular
    pub fn is_singular(&self, determinant: f64) -> bool {
        determinant.abs() < self.epsilon
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            epsilon: Self::DEFAULT_EPSILON,
        }
    }
}

/// Signed distance from a point to a plane, re-evaluated with compensated
/// summation when the naive result lands inside the tolerance band
pub fn signed_distance(plane: &Plane, point: &Point3<f64>, tolerance: &Tolerance) -> f64 {
    let distance = plane.normal().dot(&point.coords) - plane.offset();
    if tolerance.is_zero(distance) {
        compensated_dot(plane.normal(), &point.coords) - plane.offset()
    } else {
        distance
    }
}

/// Classify a point against a plane
pub fn classify(plane: &Plane, point: &Point3<f64>, tolerance: &Tolerance) -> PlaneClassification {
    tolerance.classify_distance(signed_distance(plane, point, tolerance))
}

/// Intersection point of three planes, `None` when the planes are singular
/// (parallel, or meeting in a line)
pub fn intersect3(
    p1: &Plane,
    p2: &Plane,
    p3: &Plane,
    tolerance: &Tolerance,
) -> Option<Point3<f64>> {
    let n1 = p1.normal();
    let n2 = p2.normal();
    let n3 = p3.normal();

    let n2_x_n3 = n2.cross(n3);
    let determinant = n1.dot(&n2_x_n3);
    if tolerance.is_singular(determinant) {
        return None;
    }

    let n3_x_n1 = n3.cross(n1);
    let n1_x_n2 = n1.cross(n2);
    let numerator = n2_x_n3 * p1.offset() + n3_x_n1 * p2.offset() + n1_x_n2 * p3.offset();
    let point = Point3::from(numerator / determinant);

    if point.coords.iter().all(|c| c.is_finite()) {
        Some(point)
    } else {
        None
    }
}

/// Dot product with Kahan summation of the terms, largest magnitude first
fn compensated_dot(v: &Vector3<f64>, w: &Vector3<f64>) -> f64 {
    let mut terms = [v.x * w.x, v.y * w.y, v.z * w.z];
    terms.sort_by(|a, b| b.abs().total_cmp(&a.abs()));

    let mut sum = 0.0;
    let mut c = 0.0;
    for &term in &terms {
        let y = term - c;
        let t = sum + y;
        c = (t - sum) - y;
        sum = t;
    }

    sum
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn plane(n: [f64; 3], d: f64) -> Plane {
        Plane::new(Vector3::new(n[0], n[1], n[2]), d).unwrap()
    }

    #[test]
    fn test_classify_point_plane() {
        let tol = Tolerance::default();
        let p = plane([0.0, 0.0, 1.0], 0.0);

        assert_eq!(
            classify(&p, &Point3::new(0.0, 0.0, 1.0), &tol),
            PlaneClassification::Front
        );
        assert_eq!(
            classify(&p, &Point3::new(0.0, 0.0, -1.0), &tol),
            PlaneClassification::Back
        );
        assert_eq!(
            classify(&p, &Point3::new(3.0, -2.0, 0.0), &tol),
            PlaneClassification::On
        );
    }

    #[test]
    fn test_classify_within_epsilon_is_on() {
        let tol = Tolerance::new(1e-3);
        let p = plane([1.0, 0.0, 0.0], 2.0);
        assert_eq!(
            classify(&p, &Point3::new(2.0005, 0.0, 0.0), &tol),
            PlaneClassification::On
        );
        assert_eq!(
            classify(&p, &Point3::new(2.002, 0.0, 0.0), &tol),
            PlaneClassification::Front
        );
    }

    #[test]
    fn test_intersect3_axis_planes() {
        let tol = Tolerance::default();
        let point = intersect3(
            &plane([1.0, 0.0, 0.0], 1.0),
            &plane([0.0, 1.0, 0.0], 2.0),
            &plane([0.0, 0.0, -1.0], 3.0),
            &tol,
        )
        .unwrap();

        assert_relative_eq!(point, Point3::new(1.0, 2.0, -3.0), epsilon = 1e-12);
    }

    #[test]
    fn test_intersect3_parallel_planes_is_none() {
        let tol = Tolerance::default();
        let result = intersect3(
            &plane([1.0, 0.0, 0.0], 1.0),
            &plane([-1.0, 0.0, 0.0], 1.0),
            &plane([0.0, 0.0, 1.0], 1.0),
            &tol,
        );
        assert!(result.is_none());
    }

    #[test]
    fn test_intersect3_planes_sharing_a_line_is_none() {
        let tol = Tolerance::default();
        let result = intersect3(
            &plane([1.0, 0.0, 0.0], 0.0),
            &plane([0.0, 1.0, 0.0], 0.0),
            &plane([1.0, 1.0, 0.0], 0.0),
            &tol,
        );
        assert!(result.is_none());
    }

    #[test]
    fn test_invalid_epsilon_falls_back_to_default() {
        assert_eq!(Tolerance::new(-1.0).epsilon(), Tolerance::DEFAULT_EPSILON);
        assert_eq!(Tolerance::new(f64::NAN).epsilon(), Tolerance::DEFAULT_EPSILON);
    }
}
