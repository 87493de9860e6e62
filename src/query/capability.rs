// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Capabilities the query engine works against

use super::PickHit;
use crate::brush::Brush;
use crate::geometry::{BoundingBox, Plane, Ray};
use nalgebra::{Point3, Vector3};

/// Anything with logical and physical bounds
pub trait BoundsProvider {
    fn logical_bounds(&self) -> BoundingBox;

    fn physical_bounds(&self) -> BoundingBox {
        self.logical_bounds()
    }
}

/// Anything a ray can hit
pub trait Pickable {
    /// Nearest hit along the ray
    fn pick(&self, ray: &Ray) -> Option<PickHit>;
}

/// Convex point set described by its bounding planes, its corner points and
/// its edge directions
pub trait Intersectable {
    fn bounding_planes(&self) -> Vec<Plane>;

    fn hull_points(&self) -> Vec<Point3<f64>>;

    fn edge_directions(&self) -> Vec<Vector3<f64>>;
}

impl BoundsProvider for BoundingBox {
    fn logical_bounds(&self) -> BoundingBox {
        *self
    }
}

impl Intersectable for BoundingBox {
    fn bounding_planes(&self) -> Vec<Plane> {
        self.planes().to_vec()
    }

    fn hull_points(&self) -> Vec<Point3<f64>> {
        self.corners().to_vec()
    }

    fn edge_directions(&self) -> Vec<Vector3<f64>> {
        vec![Vector3::x(), Vector3::y(), Vector3::z()]
    }
}

impl BoundsProvider for Brush {
    fn logical_bounds(&self) -> BoundingBox {
        Brush::logical_bounds(self)
    }

    fn physical_bounds(&self) -> BoundingBox {
        Brush::physical_bounds(self)
    }
}

impl Intersectable for Brush {
    fn bounding_planes(&self) -> Vec<Plane> {
        self.face_planes()
    }

    fn hull_points(&self) -> Vec<Point3<f64>> {
        self.geometry().positions().copied().collect()
    }

    fn edge_directions(&self) -> Vec<Vector3<f64>> {
        let vertices = self.vertices();
        self.edges()
            .iter()
            .map(|e| vertices[e.end].position - vertices[e.start].position)
            .collect()
    }
}

impl Pickable for Brush {
    fn pick(&self, ray: &Ray) -> Option<PickHit> {
        self.pick_brush(ray).map(PickHit::from)
    }
}
