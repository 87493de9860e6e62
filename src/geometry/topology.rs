// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Boundary representation of a convex brush
//!
//! Vertices know their incident edges, every edge knows the two faces it
//! separates and every face owns a counter-clockwise (seen from outside)
//! loop of vertex indices. A `BrushGeometry` is only ever constructed through
//! [`BrushGeometry::from_loops`], which rejects open or non-manifold input, so
//! readers can rely on the structure being closed.

use super::predicates::ZERO_LENGTH;
use super::{BoundingBox, Plane, Tolerance};
use crate::error::{BrushError, BrushResult, InvalidReason};
use ahash::AHashMap;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Corner of a brush
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrushVertex {
    pub position: Point3<f64>,
    /// Incident edges, unordered
    pub edges: Vec<usize>,
}

/// Edge between two faces. `left_face` walks `start -> end` in its loop,
/// `right_face` walks `end -> start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrushEdge {
    pub start: usize,
    pub end: usize,
    pub left_face: usize,
    pub right_face: usize,
}

impl BrushEdge {
    pub fn other_vertex(&self, vertex: usize) -> Option<usize> {
        if vertex == self.start {
            Some(self.end)
        } else if vertex == self.end {
            Some(self.start)
        } else {
            None
        }
    }

    pub fn has_face(&self, face: usize) -> bool {
        self.left_face == face || self.right_face == face
    }
}

/// Polygonal side of a brush lying on one bounding plane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrushFace {
    pub plane: Plane,
    /// Index of the plane in the plane set the geometry was built from
    pub plane_index: usize,
    /// Counter-clockwise vertex loop seen from outside
    pub vertices: Vec<usize>,
    /// `edges[i]` joins `vertices[i]` and `vertices[i + 1]`
    pub edges: Vec<usize>,
}

/// Loop handed to [`BrushGeometry::from_loops`]
#[derive(Debug, Clone)]
pub struct FaceLoop {
    pub plane: Plane,
    pub plane_index: usize,
    pub vertices: Vec<usize>,
}

/// Closed convex boundary representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrushGeometry {
    vertices: Vec<BrushVertex>,
    edges: Vec<BrushEdge>,
    faces: Vec<BrushFace>,
}

struct PendingEdge {
    start: usize,
    end: usize,
    left_face: usize,
    right_face: Option<usize>,
}

impl BrushGeometry {
    /// Assemble the edge graph from face loops and verify the result is a
    /// closed 2-manifold
    pub fn from_loops(positions: Vec<Point3<f64>>, loops: Vec<FaceLoop>) -> BrushResult<Self> {
        let mut pending: Vec<PendingEdge> = Vec::new();
        let mut edge_map: AHashMap<(usize, usize), usize> = AHashMap::new();
        let mut faces = Vec::with_capacity(loops.len());

        for (face_idx, face_loop) in loops.into_iter().enumerate() {
            let count = face_loop.vertices.len();
            let mut face_edges = Vec::with_capacity(count);

            for i in 0..count {
                let from = face_loop.vertices[i];
                let to = face_loop.vertices[(i + 1) % count];
                let key = (from.min(to), from.max(to));

                match edge_map.get(&key) {
                    None => {
                        edge_map.insert(key, pending.len());
                        face_edges.push(pending.len());
                        pending.push(PendingEdge {
                            start: from,
                            end: to,
                            left_face: face_idx,
                            right_face: None,
                        });
                    }
                    Some(&edge_idx) => {
                        let edge = &mut pending[edge_idx];
                        if edge.right_face.is_some() {
                            return Err(BrushError::invalid(InvalidReason::NonManifoldEdge {
                                start: edge.start,
                                end: edge.end,
                                faces: 3,
                            }));
                        }
                        if edge.start != to || edge.end != from {
                            return Err(BrushError::invalid(
                                InvalidReason::InconsistentWinding {
                                    start: edge.start,
                                    end: edge.end,
                                },
                            ));
                        }
                        edge.right_face = Some(face_idx);
                        face_edges.push(edge_idx);
                    }
                }
            }

            faces.push(BrushFace {
                plane: face_loop.plane,
                plane_index: face_loop.plane_index,
                vertices: face_loop.vertices,
                edges: face_edges,
            });
        }

        let open = pending.iter().filter(|e| e.right_face.is_none()).count();
        if open > 0 {
            return Err(BrushError::invalid(InvalidReason::OpenBoundary { edges: open }));
        }

        let edges: Vec<BrushEdge> = pending
            .into_iter()
            .filter_map(|e| {
                e.right_face.map(|right_face| BrushEdge {
                    start: e.start,
                    end: e.end,
                    left_face: e.left_face,
                    right_face,
                })
            })
            .collect();

        let mut vertices: Vec<BrushVertex> = positions
            .into_iter()
            .map(|position| BrushVertex {
                position,
                edges: Vec::new(),
            })
            .collect();
        for (edge_idx, edge) in edges.iter().enumerate() {
            vertices[edge.start].edges.push(edge_idx);
            vertices[edge.end].edges.push(edge_idx);
        }

        let geometry = Self {
            vertices,
            edges,
            faces,
        };

        if geometry.euler_characteristic() != 2 {
            return Err(BrushError::invalid(InvalidReason::EulerMismatch {
                vertices: geometry.vertex_count(),
                edges: geometry.edge_count(),
                faces: geometry.face_count(),
            }));
        }

        Ok(geometry)
    }

    pub fn vertices(&self) -> &[BrushVertex] {
        &self.vertices
    }

    pub fn edges(&self) -> &[BrushEdge] {
        &self.edges
    }

    pub fn faces(&self) -> &[BrushFace] {
        &self.faces
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// `V - E + F`
    pub fn euler_characteristic(&self) -> i64 {
        self.vertices.len() as i64 - self.edges.len() as i64 + self.faces.len() as i64
    }

    pub fn positions(&self) -> impl Iterator<Item = &Point3<f64>> + '_ {
        self.vertices.iter().map(|v| &v.position)
    }

    /// Loop positions of a face, empty for an unknown face
    pub fn face_positions(&self, face: usize) -> impl Iterator<Item = &Point3<f64>> + '_ {
        self.faces
            .get(face)
            .into_iter()
            .flat_map(|f| f.vertices.iter())
            .map(move |&v| &self.vertices[v].position)
    }

    /// Tight axis-aligned box of all vertices
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(self.positions())
    }

    /// Faces incident to a vertex
    pub fn vertex_faces(&self, vertex: usize) -> Option<Vec<usize>> {
        let mut faces: Vec<usize> = self
            .vertices
            .get(vertex)?
            .edges
            .iter()
            .flat_map(|&e| [self.edges[e].left_face, self.edges[e].right_face])
            .collect();
        faces.sort_unstable();
        faces.dedup();
        Some(faces)
    }

    /// Face that sits on the given plane index
    pub fn face_for_plane(&self, plane_index: usize) -> Option<usize> {
        self.faces.iter().position(|f| f.plane_index == plane_index)
    }

    pub fn face_centroid(&self, face: usize) -> Option<Point3<f64>> {
        let count = self.faces.get(face)?.vertices.len().max(1) as f64;
        let sum = self
            .face_positions(face)
            .fold(Vector3::zeros(), |acc, p| acc + p.coords);
        Some(Point3::from(sum / count))
    }

    /// Newell normal of the loop, unnormalized length is twice the area
    fn newell(&self, face: &BrushFace) -> Vector3<f64> {
        let loop_vertices = &face.vertices;
        let count = loop_vertices.len();
        let mut normal = Vector3::zeros();
        for i in 0..count {
            let a = &self.vertices[loop_vertices[i]].position;
            let b = &self.vertices[loop_vertices[(i + 1) % count]].position;
            normal += a.coords.cross(&b.coords);
        }
        normal
    }

    pub fn face_area(&self, face: usize) -> Option<f64> {
        self.faces.get(face).map(|f| 0.5 * self.newell(f).norm())
    }

    /// Normal implied by the winding of the face loop
    pub fn face_loop_normal(&self, face: usize) -> Option<Vector3<f64>> {
        self.faces
            .get(face)
            .and_then(|f| self.newell(f).try_normalize(ZERO_LENGTH))
    }

    /// Point-in-convex-polygon test for a point already on the face plane.
    /// An unknown face contains nothing.
    pub fn face_contains_point(&self, face: usize, point: &Point3<f64>, tol: &Tolerance) -> bool {
        let Some(f) = self.faces.get(face) else {
            return false;
        };
        let normal = f.plane.normal();
        let count = f.vertices.len();
        (0..count).all(|i| {
            let a = &self.vertices[f.vertices[i]].position;
            let b = &self.vertices[f.vertices[(i + 1) % count]].position;
            let edge = b - a;
            let side = edge.cross(&(point - a)).dot(normal);
            side >= -tol.epsilon() * edge.norm()
        })
    }

    /// Volume by summing pyramids from the centroid of the vertices
    pub fn volume(&self) -> f64 {
        let count = self.vertices.len().max(1) as f64;
        let center = Point3::from(
            self.positions()
                .fold(Vector3::zeros(), |acc, p| acc + p.coords)
                / count,
        );
        self.faces
            .iter()
            .map(|face| {
                let height = face.plane.offset() - face.plane.normal().dot(&center.coords);
                0.5 * self.newell(face).norm() * height / 3.0
            })
            .sum()
    }
}
