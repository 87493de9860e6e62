// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Set relations between convex solids
//!
//! Intersection is decided with a separating axis test: the face planes of
//! both solids, then the cross products of their edge directions. Solids that
//! only touch count as intersecting.

use super::{BoundsProvider, Intersectable};
use crate::brush::Brush;
use crate::geometry::{classify, BoundingBox, PlaneClassification, Tolerance};
use nalgebra::{Point3, Vector3};

/// True iff the two convex solids share at least one point
pub fn intersects<A, B>(a: &A, b: &B, tolerance: &Tolerance) -> bool
where
    A: Intersectable + ?Sized,
    B: Intersectable + ?Sized,
{
    let points_a = a.hull_points();
    let points_b = b.hull_points();
    if points_a.is_empty() || points_b.is_empty() {
        return false;
    }

    if separated_by_planes(a, &points_b, tolerance) {
        return false;
    }
    if separated_by_planes(b, &points_a, tolerance) {
        return false;
    }

    let edges_a = a.edge_directions();
    let edges_b = b.edge_directions();
    for ea in &edges_a {
        for eb in &edges_b {
            let Some(axis) = ea.cross(eb).try_normalize(tolerance.epsilon()) else {
                continue;
            };
            let (min_a, max_a) = project(&points_a, &axis);
            let (min_b, max_b) = project(&points_b, &axis);
            if min_b > max_a + tolerance.epsilon() || min_a > max_b + tolerance.epsilon() {
                return false;
            }
        }
    }

    true
}

/// True iff every point of `inner` lies inside or on every plane of `outer`
pub fn contains<A, B>(outer: &A, inner: &B, tolerance: &Tolerance) -> bool
where
    A: Intersectable + ?Sized,
    B: Intersectable + ?Sized,
{
    let points = inner.hull_points();
    if points.is_empty() {
        return false;
    }
    outer.bounding_planes().iter().all(|plane| {
        points
            .iter()
            .all(|p| classify(plane, p, tolerance) != PlaneClassification::Front)
    })
}

/// Some face plane of `solid` has all `points` strictly in front of it
fn separated_by_planes<S>(solid: &S, points: &[Point3<f64>], tolerance: &Tolerance) -> bool
where
    S: Intersectable + ?Sized,
{
    solid.bounding_planes().iter().any(|plane| {
        points
            .iter()
            .all(|p| classify(plane, p, tolerance) == PlaneClassification::Front)
    })
}

fn project(points: &[Point3<f64>], axis: &Vector3<f64>) -> (f64, f64) {
    points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
        let d = axis.dot(&p.coords);
        (lo.min(d), hi.max(d))
    })
}

impl Brush {
    pub fn intersects_brush(&self, other: &Brush) -> bool {
        let eps = self.tolerance().epsilon();
        if !self.physical_bounds().intersects(&other.physical_bounds(), eps) {
            return false;
        }
        intersects(self, other, self.tolerance())
    }

    pub fn contains_brush(&self, other: &Brush) -> bool {
        let eps = self.tolerance().epsilon();
        if !self.logical_bounds().contains(&other.logical_bounds(), eps) {
            return false;
        }
        contains(self, other, self.tolerance())
    }

    /// Overlap with an axis-aligned region
    pub fn intersects_bounds(&self, bounds: &BoundingBox) -> bool {
        let eps = self.tolerance().epsilon();
        if !self.physical_bounds().intersects(bounds, eps) {
            return false;
        }
        intersects(self, bounds, self.tolerance())
    }

    /// The whole region lies inside the brush
    pub fn contains_bounds(&self, bounds: &BoundingBox) -> bool {
        contains(self, bounds, self.tolerance())
    }

    /// The brush lies inside the region
    pub fn is_contained_in(&self, bounds: &BoundingBox) -> bool {
        contains(bounds, self, self.tolerance())
    }

    /// Overlap with an entity, judged by its world bounds
    pub fn intersects_entity<E: BoundsProvider + ?Sized>(&self, entity: &E) -> bool {
        self.intersects_bounds(&entity.logical_bounds())
    }

    /// Every corner of the entity's world bounds lies inside the brush
    pub fn contains_entity<E: BoundsProvider + ?Sized>(&self, entity: &E) -> bool {
        self.contains_bounds(&entity.logical_bounds())
    }
}
