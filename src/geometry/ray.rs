// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Pick rays

use super::predicates::ZERO_LENGTH;
use super::{Plane, Tolerance};
use nalgebra::{Point3, Unit, Vector3};
use serde::{Deserialize, Serialize};

/// Half-line from an origin along a unit direction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    pub origin: Point3<f64>,
    pub direction: Unit<Vector3<f64>>,
}

/// Closest approach between a ray and a point or segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayDistance {
    /// Ray parameter of the closest point on the ray
    pub ray_param: f64,
    /// Distance between the closest points
    pub distance: f64,
}

impl Ray {
    /// Create a ray; `None` if the direction has no length
    pub fn new(origin: Point3<f64>, direction: Vector3<f64>) -> Option<Self> {
        Unit::try_new(direction, ZERO_LENGTH).map(|direction| Self { origin, direction })
    }

    /// Ray from `origin` passing through `target`
    pub fn through(origin: Point3<f64>, target: Point3<f64>) -> Option<Self> {
        Self::new(origin, target - origin)
    }

    pub fn point_at(&self, t: f64) -> Point3<f64> {
        self.origin + self.direction.into_inner() * t
    }

    /// Ray parameter where the ray crosses the plane, `None` when parallel
    pub fn intersect_plane(&self, plane: &Plane, tolerance: &Tolerance) -> Option<f64> {
        let denom = plane.normal().dot(&self.direction);
        if tolerance.is_zero(denom) {
            return None;
        }
        Some((plane.offset() - plane.normal().dot(&self.origin.coords)) / denom)
    }

    /// Closest approach to a point. Points behind the origin measure from the origin.
    pub fn distance_to_point(&self, point: &Point3<f64>) -> RayDistance {
        let ray_param = (point - self.origin).dot(&self.direction).max(0.0);
        RayDistance {
            ray_param,
            distance: (point - self.point_at(ray_param)).norm(),
        }
    }

    /// Closest approach to the segment `[start, end]`
    pub fn distance_to_segment(&self, start: &Point3<f64>, end: &Point3<f64>) -> RayDistance {
        let d1 = self.direction.into_inner();
        let d2 = end - start;
        let r = self.origin - start;

        let a = d2.dot(&d2);
        if a <= ZERO_LENGTH {
            return self.distance_to_point(start);
        }

        let b = d1.dot(&d2);
        let c = d1.dot(&r);
        let f = d2.dot(&r);
        // |d1| == 1
        let denom = a - b * b;

        let mut s = if denom > ZERO_LENGTH {
            ((b * f - c * a) / denom).max(0.0)
        } else {
            0.0
        };
        let mut u = ((b * s + f) / a).clamp(0.0, 1.0);
        // Re-project onto the ray once the segment parameter was clamped
        s = (u * b - c).max(0.0);
        u = ((b * s + f) / a).clamp(0.0, 1.0);

        let on_ray = self.point_at(s);
        let on_segment = start + d2 * u;
        RayDistance {
            ray_param: s,
            distance: (on_ray - on_segment).norm(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_direction_rejected() {
        assert!(Ray::new(Point3::origin(), Vector3::zeros()).is_none());
    }

    #[test]
    fn test_intersect_plane() {
        let tol = Tolerance::default();
        let ray = Ray::new(Point3::new(0.0, 0.0, 10.0), -Vector3::z()).unwrap();
        let plane = Plane::axis(2, true, 1.0);
        let t = ray.intersect_plane(&plane, &tol).unwrap();
        assert_relative_eq!(t, 9.0);

        let parallel = Ray::new(Point3::new(0.0, 0.0, 10.0), Vector3::x()).unwrap();
        assert!(parallel.intersect_plane(&plane, &tol).is_none());
    }

    #[test]
    fn test_distance_to_point() {
        let ray = Ray::new(Point3::origin(), Vector3::x()).unwrap();
        let d = ray.distance_to_point(&Point3::new(5.0, 3.0, 4.0));
        assert_relative_eq!(d.ray_param, 5.0);
        assert_relative_eq!(d.distance, 5.0);

        let behind = ray.distance_to_point(&Point3::new(-3.0, 4.0, 0.0));
        assert_relative_eq!(behind.ray_param, 0.0);
        assert_relative_eq!(behind.distance, 5.0);
    }

    #[test]
    fn test_distance_to_segment() {
        let ray = Ray::new(Point3::origin(), Vector3::x()).unwrap();
        let d = ray.distance_to_segment(&Point3::new(4.0, 2.0, -1.0), &Point3::new(4.0, 2.0, 1.0));
        assert_relative_eq!(d.ray_param, 4.0, epsilon = 1e-12);
        assert_relative_eq!(d.distance, 2.0, epsilon = 1e-12);

        let parallel =
            ray.distance_to_segment(&Point3::new(2.0, 3.0, 0.0), &Point3::new(6.0, 3.0, 0.0));
        assert_relative_eq!(parallel.distance, 3.0, epsilon = 1e-12);
    }
}
