// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Ray picking against brushes, their faces and their vertices

use crate::brush::{Brush, BrushId};
use crate::geometry::Ray;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Ray hit on a brush face
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceHit {
    pub brush: BrushId,
    /// Index into `Brush::faces`
    pub face: usize,
    /// Index of the face's plane in the brush plane set
    pub plane_index: usize,
    pub point: Point3<f64>,
    /// Ray parameter of the hit
    pub distance: f64,
}

/// Ray passing close to a brush vertex
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VertexHit {
    pub brush: BrushId,
    /// Index into `Brush::vertices`
    pub vertex: usize,
    pub position: Point3<f64>,
    /// Ray parameter of the closest approach
    pub distance: f64,
    /// Distance between the ray and the vertex
    pub offset: f64,
}

/// What a generic pick hit refers to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HitTarget {
    Face { brush: BrushId, face: usize },
    Vertex { brush: BrushId, vertex: usize },
    Bounds,
}

/// Generic hit returned through [`super::Pickable`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PickHit {
    pub target: HitTarget,
    pub point: Point3<f64>,
    pub distance: f64,
}

impl From<FaceHit> for PickHit {
    fn from(hit: FaceHit) -> Self {
        Self {
            target: HitTarget::Face {
                brush: hit.brush,
                face: hit.face,
            },
            point: hit.point,
            distance: hit.distance,
        }
    }
}

impl From<VertexHit> for PickHit {
    fn from(hit: VertexHit) -> Self {
        Self {
            target: HitTarget::Vertex {
                brush: hit.brush,
                vertex: hit.vertex,
            },
            point: hit.position,
            distance: hit.distance,
        }
    }
}

fn by_distance(a: f64, b: f64, ia: usize, ib: usize) -> Ordering {
    a.total_cmp(&b).then(ia.cmp(&ib))
}

impl Brush {
    /// Hit the face polygon `face` with the ray, if the ray crosses its plane
    /// in front of the origin inside the polygon
    fn hit_face(&self, ray: &Ray, face: usize) -> Option<FaceHit> {
        let tol = self.tolerance();
        let f = &self.faces()[face];
        let t = ray.intersect_plane(&f.plane, tol)?;
        if t < -tol.epsilon() {
            return None;
        }
        let t = t.max(0.0);
        let point = ray.point_at(t);
        if !self.geometry().face_contains_point(face, &point, tol) {
            return None;
        }
        Some(FaceHit {
            brush: self.id(),
            face,
            plane_index: f.plane_index,
            point,
            distance: t,
        })
    }

    /// Nearest entry point of the ray into the solid
    pub fn pick_brush(&self, ray: &Ray) -> Option<FaceHit> {
        if self.physical_bounds().intersect_ray(ray).is_none() {
            return None;
        }
        let eps = self.tolerance().epsilon();
        (0..self.faces().len())
            .filter(|&i| self.faces()[i].plane.normal().dot(&ray.direction) < -eps)
            .filter_map(|i| self.hit_face(ray, i))
            .min_by(|a, b| by_distance(a.distance, b.distance, a.face, b.face))
    }

    /// Every face the ray passes through, front or back facing, nearest first
    pub fn pick_faces(&self, ray: &Ray) -> Vec<FaceHit> {
        if self.physical_bounds().intersect_ray(ray).is_none() {
            return Vec::new();
        }
        let mut hits: Vec<FaceHit> = (0..self.faces().len())
            .filter_map(|i| self.hit_face(ray, i))
            .collect();
        hits.sort_by(|a, b| by_distance(a.distance, b.distance, a.face, b.face));
        hits
    }

    /// Vertices within `handle_radius` of the ray, nearest first
    pub fn pick_vertices(&self, ray: &Ray, handle_radius: f64) -> Vec<VertexHit> {
        let eps = self.tolerance().epsilon();
        let mut hits: Vec<VertexHit> = self
            .vertices()
            .iter()
            .enumerate()
            .filter(|(_, v)| (v.position - ray.origin).dot(&ray.direction) >= -eps)
            .filter_map(|(i, v)| {
                let closest = ray.distance_to_point(&v.position);
                (closest.distance <= handle_radius).then_some(VertexHit {
                    brush: self.id(),
                    vertex: i,
                    position: v.position,
                    distance: closest.ray_param,
                    offset: closest.distance,
                })
            })
            .collect();
        hits.sort_by(|a, b| by_distance(a.distance, b.distance, a.vertex, b.vertex));
        hits
    }

    /// Face to grab when the ray narrowly misses the brush. If the ray hits,
    /// the entry face is returned. Otherwise the edge closest to the ray is
    /// found and, if it lies ahead of the ray origin within `max_distance`,
    /// its face turned away from the ray is returned with the point of
    /// closest approach on the ray.
    pub fn pick_closest_face(&self, ray: &Ray, max_distance: f64) -> Option<FaceHit> {
        if let Some(hit) = self.pick_brush(ray) {
            return Some(hit);
        }
        if self
            .physical_bounds()
            .expanded(max_distance)
            .intersect_ray(ray)
            .is_none()
        {
            return None;
        }

        let eps = self.tolerance().epsilon();
        let vertices = self.vertices();
        let (edge, closest) = self
            .edges()
            .iter()
            .enumerate()
            .map(|(i, e)| {
                let d = ray.distance_to_segment(&vertices[e.start].position, &vertices[e.end].position);
                (i, d)
            })
            .filter(|(_, d)| d.ray_param > eps && d.distance <= max_distance)
            .min_by(|(ia, a), (ib, b)| by_distance(a.distance, b.distance, *ia, *ib))?;

        let e = &self.edges()[edge];
        let facing = |face: usize| self.faces()[face].plane.normal().dot(&ray.direction);
        let face = if facing(e.left_face) >= facing(e.right_face) {
            e.left_face
        } else {
            e.right_face
        };

        Some(FaceHit {
            brush: self.id(),
            face,
            plane_index: self.faces()[face].plane_index,
            point: ray.point_at(closest.ray_param),
            distance: closest.ray_param,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brush::BrushSettings;
    use crate::geometry::{BoundingBox, Tolerance};
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn cube() -> Brush {
        Brush::cuboid(&BoundingBox::cube(1.0), BrushSettings::default()).unwrap()
    }

    fn ray(origin: [f64; 3], dir: [f64; 3]) -> Ray {
        Ray::new(
            Point3::new(origin[0], origin[1], origin[2]),
            Vector3::new(dir[0], dir[1], dir[2]),
        )
        .unwrap()
    }

    #[test]
    fn test_pick_brush_entry_face() {
        let brush = cube();
        let hit = brush.pick_brush(&ray([-5.0, 0.2, 0.3], [1.0, 0.0, 0.0])).unwrap();

        assert_eq!(hit.brush, brush.id());
        assert_relative_eq!(hit.distance, 4.0, epsilon = 1e-9);
        assert_relative_eq!(hit.point, Point3::new(-1.0, 0.2, 0.3), epsilon = 1e-9);
        assert_relative_eq!(
            *brush.faces()[hit.face].plane.normal(),
            -Vector3::x(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_ray_pointing_away_misses() {
        let brush = cube();
        let away = ray([-5.0, 0.0, 0.0], [-1.0, 0.0, 0.0]);
        assert!(brush.pick_brush(&away).is_none());
        assert!(brush.pick_faces(&away).is_empty());
        assert!(brush.pick_vertices(&away, 10.0).is_empty());
        assert!(brush.pick_closest_face(&away, 10.0).is_none());
    }

    #[test]
    fn test_origin_band_follows_brush_tolerance() {
        let settings = BrushSettings {
            tolerance: Tolerance::new(1e-3),
            ..BrushSettings::default()
        };
        let brush = Brush::cuboid(&BoundingBox::cube(1.0), settings).unwrap();

        // Starts down the edge x = y = 1 just below the corner it leaves
        let along_edge = ray([1.0, 1.0, 1.0 - 5e-4], [0.0, 0.0, -1.0]);
        let hits = brush.pick_vertices(&along_edge, 0.1);
        assert_eq!(hits.len(), 2);
        assert_relative_eq!(hits[0].position, Point3::new(1.0, 1.0, 1.0), epsilon = 1e-9);
        assert_relative_eq!(hits[0].distance, 0.0);

        // Tilted into the top face by less than epsilon: enters through the side
        let skim = ray([-5.0, 0.0, 0.5], [1.0, 0.0, -1e-4]);
        let hit = brush.pick_brush(&skim).unwrap();
        assert_relative_eq!(
            *brush.faces()[hit.face].plane.normal(),
            -Vector3::x(),
            epsilon = 1e-12
        );

        // Nearest edge sits at the origin itself, which is not ahead of the ray
        let leaving = ray([1.0 + 5e-4, 1.0, 0.0], [1.0, 0.0, 0.0]);
        assert!(brush.pick_closest_face(&leaving, 1.0).is_none());
    }

    #[test]
    fn test_pick_faces_ordered() {
        let brush = cube();
        let hits = brush.pick_faces(&ray([0.1, 0.2, 9.0], [0.0, 0.0, -1.0]));

        assert_eq!(hits.len(), 2);
        assert_relative_eq!(hits[0].distance, 8.0, epsilon = 1e-9);
        assert_relative_eq!(hits[1].distance, 10.0, epsilon = 1e-9);
        assert_relative_eq!(
            *brush.faces()[hits[0].face].plane.normal(),
            Vector3::z(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_pick_vertices_within_radius() {
        let brush = cube();
        // Passes through the corner (1, 1, 1) and, further on, (-1, -1, -1)
        let diagonal = ray([5.0, 5.0, 5.0], [-1.0, -1.0, -1.0]);
        let hits = brush.pick_vertices(&diagonal, 0.1);

        assert_eq!(hits.len(), 2);
        assert_relative_eq!(hits[0].position, Point3::new(1.0, 1.0, 1.0), epsilon = 1e-9);
        assert_relative_eq!(hits[1].position, Point3::new(-1.0, -1.0, -1.0), epsilon = 1e-9);
        assert!(hits[0].distance < hits[1].distance);
        assert_relative_eq!(hits[0].offset, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_pick_closest_face_near_miss() {
        let brush = cube();
        // Climbs over the top edge at y = -1 with 0.3 clearance
        let near_miss = ray([0.0, -5.0, 0.5], [0.0, 1.0, 0.2]);
        assert!(brush.pick_brush(&near_miss).is_none());

        let hit = brush.pick_closest_face(&near_miss, 1.0).unwrap();
        let normal = *brush.faces()[hit.face].plane.normal();
        assert_relative_eq!(normal, Vector3::z(), epsilon = 1e-12);
        assert!(brush.pick_closest_face(&near_miss, 0.25).is_none());
    }
}
