// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Bounding box utilities

use super::predicates::ZERO_LENGTH;
use super::{Plane, Ray};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl BoundingBox {
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self {
            min: min.inf(&max),
            max: min.sup(&max),
        }
    }

    /// Inverted box that any point expands into
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Zero-size box at a point
    pub fn point(point: Point3<f64>) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Cube of the given half extent centered on the origin
    pub fn cube(half_extent: f64) -> Self {
        let h = half_extent.abs();
        Self {
            min: Point3::new(-h, -h, -h),
            max: Point3::new(h, h, h),
        }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3<f64>>) -> Self {
        let mut bbox = Self::empty();
        for point in points {
            bbox.expand_to_include(point);
        }
        bbox
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn expand_to_include(&mut self, point: &Point3<f64>) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Self {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Grow every side by `margin`
    pub fn expanded(&self, margin: f64) -> BoundingBox {
        if self.is_empty() {
            return *self;
        }
        let m = Vector3::repeat(margin);
        Self {
            min: self.min - m,
            max: self.max + m,
        }
    }

    pub fn translated(&self, delta: &Vector3<f64>) -> BoundingBox {
        if self.is_empty() {
            return *self;
        }
        Self {
            min: self.min + delta,
            max: self.max + delta,
        }
    }

    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    pub fn volume(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let size = self.size();
        size.x * size.y * size.z
    }

    /// The eight corner points
    pub fn corners(&self) -> [Point3<f64>; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Point3::new(lo.x, lo.y, lo.z),
            Point3::new(hi.x, lo.y, lo.z),
            Point3::new(lo.x, hi.y, lo.z),
            Point3::new(hi.x, hi.y, lo.z),
            Point3::new(lo.x, lo.y, hi.z),
            Point3::new(hi.x, lo.y, hi.z),
            Point3::new(lo.x, hi.y, hi.z),
            Point3::new(hi.x, hi.y, hi.z),
        ]
    }

    /// The six outward facing side planes
    pub fn planes(&self) -> [Plane; 6] {
        [
            Plane::axis(0, true, self.max.x),
            Plane::axis(0, false, self.min.x),
            Plane::axis(1, true, self.max.y),
            Plane::axis(1, false, self.min.y),
            Plane::axis(2, true, self.max.z),
            Plane::axis(2, false, self.min.z),
        ]
    }

    /// Overlap test, boxes sharing a side count as intersecting
    pub fn intersects(&self, other: &BoundingBox, epsilon: f64) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.min.x <= other.max.x + epsilon
            && self.max.x >= other.min.x - epsilon
            && self.min.y <= other.max.y + epsilon
            && self.max.y >= other.min.y - epsilon
            && self.min.z <= other.max.z + epsilon
            && self.max.z >= other.min.z - epsilon
    }

    pub fn contains_point(&self, point: &Point3<f64>, epsilon: f64) -> bool {
        point.x >= self.min.x - epsilon
            && point.x <= self.max.x + epsilon
            && point.y >= self.min.y - epsilon
            && point.y <= self.max.y + epsilon
            && point.z >= self.min.z - epsilon
            && point.z <= self.max.z + epsilon
    }

    pub fn contains(&self, other: &BoundingBox, epsilon: f64) -> bool {
        !other.is_empty()
            && self.contains_point(&other.min, epsilon)
            && self.contains_point(&other.max, epsilon)
    }

    /// Slab test, returns the entry distance along the ray (0 when starting inside)
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        let mut t_min = 0.0_f64;
        let mut t_max = f64::INFINITY;
        for axis in 0..3 {
            let origin = ray.origin[axis];
            let dir = ray.direction[axis];
            if dir.abs() <= ZERO_LENGTH {
                if origin < self.min[axis] || origin > self.max[axis] {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / dir;
            let mut t0 = (self.min[axis] - origin) * inv;
            let mut t1 = (self.max[axis] - origin) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }
        Some(t_min)
    }

    /// Check if two bounding boxes are approximately equal within tolerance
    pub fn approx_eq(&self, other: &BoundingBox, tolerance: f64) -> bool {
        (self.min - other.min).abs().max() < tolerance
            && (self.max - other.max).abs().max() < tolerance
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}
