// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Bounding plane of a brush face

use super::predicates::ZERO_LENGTH;
use super::Tolerance;
use crate::error::{BrushError, BrushResult};
use nalgebra::{Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Plane with a unit outward normal. The brush side is the half-space
/// `{ x : normal · x <= offset }`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PlaneRepr")]
pub struct Plane {
    normal: Vector3<f64>,
    offset: f64,
}

/// Serialized form, normalized through [`Plane::new`] on load
#[derive(Deserialize)]
struct PlaneRepr {
    normal: Vector3<f64>,
    offset: f64,
}

impl TryFrom<PlaneRepr> for Plane {
    type Error = BrushError;

    fn try_from(repr: PlaneRepr) -> BrushResult<Self> {
        Plane::new(repr.normal, repr.offset)
    }
}

impl Plane {
    /// Create a plane, normalizing the normal and scaling the offset with it
    pub fn new(normal: Vector3<f64>, offset: f64) -> BrushResult<Self> {
        let length = normal.norm();
        if !length.is_finite() || !offset.is_finite() || length <= ZERO_LENGTH {
            return Err(BrushError::DegeneratePlane);
        }
        Ok(Self {
            normal: normal / length,
            offset: offset / length,
        })
    }

    /// Plane through three points, wound counter-clockwise when seen from outside
    pub fn from_points(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> BrushResult<Self> {
        let normal = (b - a).cross(&(c - a));
        let length = normal.norm();
        if !length.is_finite() || length <= ZERO_LENGTH {
            return Err(BrushError::DegeneratePlane);
        }
        let normal = normal / length;
        Ok(Self {
            normal,
            offset: normal.dot(&a.coords),
        })
    }

    /// Axis-aligned plane facing `+axis` (or `-axis` when `positive` is false)
    /// passing through `value` on that axis
    pub fn axis(axis: usize, positive: bool, value: f64) -> Self {
        let mut normal = Vector3::zeros();
        let sign = if positive { 1.0 } else { -1.0 };
        normal[axis.min(2)] = sign;
        Self {
            normal,
            offset: sign * value,
        }
    }

    pub fn normal(&self) -> &Vector3<f64> {
        &self.normal
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Point on the plane closest to the origin
    pub fn anchor(&self) -> Point3<f64> {
        Point3::from(self.normal * self.offset)
    }

    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            offset: -self.offset,
        }
    }

    pub fn translated(&self, delta: &Vector3<f64>) -> Self {
        Self {
            normal: self.normal,
            offset: self.offset + self.normal.dot(delta),
        }
    }

    /// Move the plane along its own normal
    pub fn offset_by(&self, distance: f64) -> Self {
        Self {
            normal: self.normal,
            offset: self.offset + distance,
        }
    }

    /// Apply an affine transform. Normals go through the inverse transpose.
    pub fn transformed(&self, matrix: &Matrix4<f64>) -> BrushResult<Self> {
        let inverse = matrix.try_inverse().ok_or(BrushError::SingularTransform)?;
        let normal = inverse.transpose().transform_vector(&self.normal);
        let anchor = matrix.transform_point(&self.anchor());
        let length = normal.norm();
        if !length.is_finite() || length <= ZERO_LENGTH {
            return Err(BrushError::SingularTransform);
        }
        let normal = normal / length;
        Self::new(normal, normal.dot(&anchor.coords))
    }

    pub fn project_point(&self, point: &Point3<f64>) -> Point3<f64> {
        let distance = self.normal.dot(&point.coords) - self.offset;
        point - self.normal * distance
    }

    /// Orthonormal in-plane axes `(u, v)` with `u × v = normal`
    pub fn basis(&self) -> (Vector3<f64>, Vector3<f64>) {
        let helper = if self.normal.x.abs() < 0.9 {
            Vector3::x()
        } else {
            Vector3::y()
        };
        let u = self.normal.cross(&helper).normalize();
        let v = self.normal.cross(&u);
        (u, v)
    }

    pub fn coefficients(&self) -> [f64; 4] {
        [self.normal.x, self.normal.y, self.normal.z, self.offset]
    }

    /// Lexicographic total order on `(nx, ny, nz, offset)`
    pub fn canonical_cmp(&self, other: &Plane) -> Ordering {
        self.coefficients()
            .iter()
            .zip(other.coefficients().iter())
            .map(|(a, b)| a.total_cmp(b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    /// Same plane, same orientation
    pub fn coincides_with(&self, other: &Plane, tolerance: &Tolerance) -> bool {
        tolerance.directions_coincide(&self.normal, &other.normal)
            && tolerance.is_zero(self.offset - other.offset)
    }

    /// Same plane, opposite orientation
    pub fn opposes(&self, other: &Plane, tolerance: &Tolerance) -> bool {
        self.coincides_with(&other.flipped(), tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_normalizes() {
        let plane = Plane::new(Vector3::new(0.0, 0.0, 2.0), 4.0).unwrap();
        assert_relative_eq!(*plane.normal(), Vector3::z());
        assert_relative_eq!(plane.offset(), 2.0);
    }

    #[test]
    fn test_deserialize_normalizes() {
        let plane: Plane = serde_json::from_str(r#"{"normal":[0,0,2],"offset":4}"#).unwrap();
        assert_relative_eq!(*plane.normal(), Vector3::z());
        assert_relative_eq!(plane.offset(), 2.0);

        let json = serde_json::to_string(&plane).unwrap();
        assert_eq!(serde_json::from_str::<Plane>(&json).unwrap(), plane);

        let degenerate = serde_json::from_str::<Plane>(r#"{"normal":[0,0,0],"offset":1}"#);
        assert!(degenerate.is_err());
    }

    #[test]
    fn test_zero_normal_rejected() {
        assert!(matches!(
            Plane::new(Vector3::zeros(), 1.0),
            Err(BrushError::DegeneratePlane)
        ));
    }

    #[test]
    fn test_from_points_winding() {
        // Counter-clockwise seen from +z
        let plane = Plane::from_points(
            &Point3::new(0.0, 0.0, 1.0),
            &Point3::new(1.0, 0.0, 1.0),
            &Point3::new(0.0, 1.0, 1.0),
        )
        .unwrap();
        assert_relative_eq!(*plane.normal(), Vector3::z());
        assert_relative_eq!(plane.offset(), 1.0);

        let collinear = Plane::from_points(
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(2.0, 0.0, 0.0),
        );
        assert!(collinear.is_err());
    }

    #[test]
    fn test_basis_is_right_handed() {
        let plane = Plane::new(Vector3::new(1.0, 2.0, -3.0), 1.0).unwrap();
        let (u, v) = plane.basis();
        assert_relative_eq!(u.dot(&v), 0.0, epsilon = 1e-12);
        assert_relative_eq!(u.cross(&v), *plane.normal(), epsilon = 1e-12);
    }

    #[test]
    fn test_transform_translation() {
        let plane = Plane::axis(0, true, 1.0);
        let moved = plane
            .transformed(&Matrix4::new_translation(&Vector3::new(2.0, 5.0, 0.0)))
            .unwrap();
        assert_relative_eq!(*moved.normal(), Vector3::x(), epsilon = 1e-12);
        assert_relative_eq!(moved.offset(), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_transform_nonuniform_scale_keeps_plane_through_scaled_points() {
        let plane = Plane::from_points(
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(0.0, 1.0, 0.0),
            &Point3::new(0.0, 0.0, 1.0),
        )
        .unwrap();
        let scale = Matrix4::new_nonuniform_scaling(&Vector3::new(2.0, 1.0, 1.0));
        let scaled = plane.transformed(&scale).unwrap();

        let tol = Tolerance::default();
        for p in [
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ] {
            assert!(tol.is_zero(scaled.normal().dot(&p.coords) - scaled.offset()));
        }
    }

    #[test]
    fn test_singular_transform_rejected() {
        let plane = Plane::axis(2, true, 1.0);
        let flatten = Matrix4::new_nonuniform_scaling(&Vector3::new(1.0, 1.0, 0.0));
        assert!(matches!(
            plane.transformed(&flatten),
            Err(BrushError::SingularTransform)
        ));
    }

    #[test]
    fn test_coincide_and_oppose() {
        let tol = Tolerance::default();
        let a = Plane::axis(1, true, 2.0);
        let b = Plane::new(Vector3::new(0.0, 1.0, 0.0), 2.0 + 1e-9).unwrap();
        assert!(a.coincides_with(&b, &tol));
        assert!(a.opposes(&a.flipped(), &tol));
        assert!(!a.coincides_with(&a.flipped(), &tol));
    }

    #[test]
    fn test_canonical_cmp_is_lexicographic() {
        let a = Plane::axis(0, true, 1.0);
        let b = Plane::axis(1, true, 1.0);
        assert_eq!(a.canonical_cmp(&b), Ordering::Greater);
        assert_eq!(a.canonical_cmp(&a), Ordering::Equal);
    }
}
