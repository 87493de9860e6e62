// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Brush construction from bounding planes
//!
//! The builder enumerates every plane triple, keeps the intersection points
//! that lie inside-or-on all half-spaces, and merges points closer than
//! epsilon. Each merged vertex remembers the planes whose triples produced
//! it, and a face loop is exactly the vertices its plane produced, sorted
//! counter-clockwise. Planes that end up with fewer than three vertices do
//! not bound the solid and are dropped; the drop is recorded in the
//! [`BuildReport`].

use super::predicates::{self, PlaneClassification};
use super::topology::{BrushGeometry, FaceLoop};
use super::{Plane, Tolerance};
use crate::error::{BrushError, BrushResult, InvalidReason};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Why a plane did not become a face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropReason {
    /// Coincident with another plane of the same orientation that won the tie-break
    Duplicate { of: usize },
    /// No vertex of the solid lies on the plane
    NoVertices,
    /// The plane only touches the solid at a vertex or along an edge
    TooFewVertices(usize),
}

/// A plane that was silently dropped during construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppedPlane {
    pub index: usize,
    pub reason: DropReason,
}

/// Diagnostics of one build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
    pub dropped: Vec<DroppedPlane>,
    /// Plane triples skipped because their determinant was below epsilon
    pub singular_triples: usize,
    /// Accepted intersection points before deduplication
    pub candidate_vertices: usize,
    /// Merged vertices discarded for lying just outside a plane that did not
    /// produce them
    pub clipped_vertices: usize,
}

impl BuildReport {
    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }

    pub fn is_dropped(&self, plane_index: usize) -> bool {
        self.dropped.iter().any(|d| d.index == plane_index)
    }
}

/// Converts a plane set into a [`BrushGeometry`]
#[derive(Debug, Clone, Copy, Default)]
pub struct BrushBuilder {
    tolerance: Tolerance,
}

impl BrushBuilder {
    pub fn new(tolerance: Tolerance) -> Self {
        Self { tolerance }
    }

    pub fn tolerance(&self) -> &Tolerance {
        &self.tolerance
    }

    /// Full rebuild. Either returns a closed convex geometry or an
    /// `InvalidPlaneSet` error; no partial state escapes.
    pub fn build(&self, planes: &[Plane]) -> BrushResult<(BrushGeometry, BuildReport)> {
        if planes.len() < 4 {
            return Err(BrushError::invalid(InvalidReason::TooFewPlanes {
                count: planes.len(),
            }));
        }

        let mut report = BuildReport::default();
        let active = self.resolve_coincident(planes, &mut report)?;
        if active.len() < 4 {
            return Err(BrushError::invalid(InvalidReason::TooFewPlanes {
                count: active.len(),
            }));
        }

        let mut candidates = self.candidate_vertices(planes, &active, &mut report);
        self.clip_stale(planes, &active, &mut candidates, &mut report);
        if candidates.is_empty() {
            return Err(BrushError::invalid(InvalidReason::NoVertices));
        }
        let positions: Vec<Point3<f64>> = candidates.iter().map(|c| c.position).collect();

        let mut loops = Vec::with_capacity(active.len());
        for &plane_index in &active {
            let plane = &planes[plane_index];
            let incident: Vec<usize> = candidates
                .iter()
                .enumerate()
                .filter(|(_, c)| c.planes.contains(&plane_index))
                .map(|(i, _)| i)
                .collect();

            match incident.len() {
                0 => report.dropped.push(DroppedPlane {
                    index: plane_index,
                    reason: DropReason::NoVertices,
                }),
                n if n < 3 => report.dropped.push(DroppedPlane {
                    index: plane_index,
                    reason: DropReason::TooFewVertices(n),
                }),
                _ => loops.push(FaceLoop {
                    plane: *plane,
                    plane_index,
                    vertices: order_loop(plane, &positions, incident),
                }),
            }
        }

        if loops.len() < 4 {
            return Err(BrushError::invalid(InvalidReason::TooFewFaces {
                count: loops.len(),
            }));
        }

        let (positions, loops) = compact(positions, loops);
        let geometry = BrushGeometry::from_loops(positions, loops)?;

        report.dropped.sort_by_key(|d| d.index);
        for dropped in &report.dropped {
            log::debug!(
                "plane {} dropped from brush: {:?}",
                dropped.index,
                dropped.reason
            );
        }
        log::trace!(
            "built brush: {} planes, {} candidates, {} singular triples -> V={} E={} F={}",
            planes.len(),
            report.candidate_vertices,
            report.singular_triples,
            geometry.vertex_count(),
            geometry.edge_count(),
            geometry.face_count()
        );

        Ok((geometry, report))
    }

    /// Drop same-orientation duplicates and reject opposed coincident pairs.
    /// Among duplicates the lexicographically smallest coefficients win,
    /// ties going to the lower index.
    fn resolve_coincident(
        &self,
        planes: &[Plane],
        report: &mut BuildReport,
    ) -> BrushResult<Vec<usize>> {
        let mut dropped = vec![false; planes.len()];

        for i in 0..planes.len() {
            for j in (i + 1)..planes.len() {
                if dropped[i] {
                    break;
                }
                if dropped[j] {
                    continue;
                }
                if planes[i].opposes(&planes[j], &self.tolerance) {
                    return Err(BrushError::invalid(
                        InvalidReason::CoincidentOpposedPlanes {
                            first: i,
                            second: j,
                        },
                    ));
                }
                if planes[i].coincides_with(&planes[j], &self.tolerance) {
                    let (winner, loser) = if planes[j].canonical_cmp(&planes[i]).is_lt() {
                        (j, i)
                    } else {
                        (i, j)
                    };
                    dropped[loser] = true;
                    report.dropped.push(DroppedPlane {
                        index: loser,
                        reason: DropReason::Duplicate { of: winner },
                    });
                }
            }
        }

        Ok((0..planes.len()).filter(|&i| !dropped[i]).collect())
    }

    /// Intersection points of every plane triple that satisfy all half-spaces,
    /// merged within epsilon. A merged vertex keeps every plane that produced it.
    fn candidate_vertices(
        &self,
        planes: &[Plane],
        active: &[usize],
        report: &mut BuildReport,
    ) -> Vec<Candidate> {
        let mut candidates: Vec<Candidate> = Vec::new();
        let count = active.len();

        for a in 0..count {
            for b in (a + 1)..count {
                for c in (b + 1)..count {
                    let triple = [active[a], active[b], active[c]];
                    let point = match predicates::intersect3(
                        &planes[triple[0]],
                        &planes[triple[1]],
                        &planes[triple[2]],
                        &self.tolerance,
                    ) {
                        Some(point) => point,
                        None => {
                            report.singular_triples += 1;
                            continue;
                        }
                    };

                    let inside = active.iter().all(|&i| {
                        predicates::classify(&planes[i], &point, &self.tolerance)
                            != PlaneClassification::Front
                    });
                    if !inside {
                        continue;
                    }

                    report.candidate_vertices += 1;
                    match candidates
                        .iter_mut()
                        .find(|existing| self.tolerance.points_coincide(&existing.position, &point))
                    {
                        Some(existing) => existing.add_planes(&triple),
                        None => candidates.push(Candidate {
                            position: point,
                            planes: triple.to_vec(),
                        }),
                    }
                }
            }
        }

        candidates
    }

    /// Drop vertices that sit inside the tolerance band on the outer side of a
    /// plane that did not produce them. Such a plane cuts the vertex away by
    /// less than epsilon while its own vertices lie more than epsilon from it,
    /// so keeping both would leave two overlapping corners.
    fn clip_stale(
        &self,
        planes: &[Plane],
        active: &[usize],
        candidates: &mut Vec<Candidate>,
        report: &mut BuildReport,
    ) {
        let before = candidates.len();
        candidates.retain(|candidate| {
            active.iter().all(|&i| {
                candidate.planes.contains(&i)
                    || predicates::signed_distance(&planes[i], &candidate.position, &self.tolerance)
                        <= 0.0
            })
        });
        report.clipped_vertices += before - candidates.len();
    }
}

/// A merged vertex and the planes whose triples produced it
#[derive(Debug, Clone)]
struct Candidate {
    position: Point3<f64>,
    planes: Vec<usize>,
}

impl Candidate {
    fn add_planes(&mut self, planes: &[usize]) {
        for &plane in planes {
            if !self.planes.contains(&plane) {
                self.planes.push(plane);
            }
        }
    }
}

/// Sort the incident vertices of a plane counter-clockwise around the plane
/// normal, using the plane's own 2D parameterization
fn order_loop(plane: &Plane, positions: &[Point3<f64>], mut incident: Vec<usize>) -> Vec<usize> {
    let (u, v) = plane.basis();
    let count = incident.len() as f64;
    let center = incident
        .iter()
        .fold(nalgebra::Vector3::zeros(), |acc, &i| acc + positions[i].coords)
        / count;

    let angle = |i: usize| {
        let d = positions[i].coords - center;
        d.dot(&v).atan2(d.dot(&u))
    };
    incident.sort_by(|&a, &b| angle(a).total_cmp(&angle(b)));
    incident
}

/// Remove vertices no face refers to and remap the loops
fn compact(positions: Vec<Point3<f64>>, mut loops: Vec<FaceLoop>) -> (Vec<Point3<f64>>, Vec<FaceLoop>) {
    let mut remap = vec![usize::MAX; positions.len()];
    let mut kept = Vec::with_capacity(positions.len());

    for face_loop in &mut loops {
        for vertex in &mut face_loop.vertices {
            if remap[*vertex] == usize::MAX {
                remap[*vertex] = kept.len();
                kept.push(positions[*vertex]);
            }
            *vertex = remap[*vertex];
        }
    }

    (kept, loops)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn cube_planes(h: f64) -> Vec<Plane> {
        (0..3)
            .flat_map(|axis| [Plane::axis(axis, true, h), Plane::axis(axis, false, -h)])
            .collect()
    }

    #[test]
    fn test_build_cube() {
        let (geometry, report) = BrushBuilder::default().build(&cube_planes(1.0)).unwrap();

        assert_eq!(geometry.vertex_count(), 8);
        assert_eq!(geometry.edge_count(), 12);
        assert_eq!(geometry.face_count(), 6);
        assert!(report.dropped.is_empty());
        // Opposite face pairs are parallel
        assert!(report.singular_triples > 0);
        for face in geometry.faces() {
            assert_eq!(face.vertices.len(), 4);
        }
    }

    #[test]
    fn test_too_few_planes() {
        let planes = &cube_planes(1.0)[..3];
        let err = BrushBuilder::default().build(planes).unwrap_err();
        assert_eq!(
            err,
            BrushError::invalid(InvalidReason::TooFewPlanes { count: 3 })
        );
    }

    #[test]
    fn test_unbounded_rejected() {
        // Cube without its +x side
        let mut planes = cube_planes(1.0);
        planes.remove(0);
        let err = BrushBuilder::default().build(&planes).unwrap_err();
        assert!(err.is_invalid_plane_set());
    }

    #[test]
    fn test_empty_intersection_rejected() {
        // x <= -2 contradicts x >= -1
        let mut planes = cube_planes(1.0);
        planes[0] = Plane::axis(0, true, -2.0);
        let err = BrushBuilder::default().build(&planes).unwrap_err();
        assert_eq!(err, BrushError::invalid(InvalidReason::NoVertices));
    }

    #[test]
    fn test_redundant_plane_dropped() {
        let mut planes = cube_planes(1.0);
        planes.push(Plane::axis(0, true, 5.0));
        let (geometry, report) = BrushBuilder::default().build(&planes).unwrap();

        assert_eq!(geometry.face_count(), 6);
        assert_eq!(
            report.dropped,
            vec![DroppedPlane {
                index: 6,
                reason: DropReason::NoVertices
            }]
        );
    }

    #[test]
    fn test_plane_touching_an_edge_dropped() {
        let mut planes = cube_planes(1.0);
        // Touches the cube along the edge x = 1, y = 1
        planes.push(Plane::new(Vector3::new(1.0, 1.0, 0.0), 2.0).unwrap());
        let (geometry, report) = BrushBuilder::default().build(&planes).unwrap();

        assert_eq!(geometry.face_count(), 6);
        assert_eq!(report.dropped[0].reason, DropReason::TooFewVertices(2));
    }

    #[test]
    fn test_duplicate_plane_tie_break() {
        let mut planes = cube_planes(1.0);
        let nudged = Plane::new(Vector3::new(1.0, 0.0, 0.0), 1.0 - 1e-9).unwrap();
        planes.insert(0, nudged);
        let (geometry, report) = BrushBuilder::default().build(&planes).unwrap();

        assert_eq!(geometry.face_count(), 6);
        // The nudged plane has the smaller offset and wins over the original at index 1
        assert_eq!(
            report.dropped,
            vec![DroppedPlane {
                index: 1,
                reason: DropReason::Duplicate { of: 0 }
            }]
        );
    }

    #[test]
    fn test_opposed_coincident_planes_rejected() {
        let mut planes = cube_planes(1.0);
        planes.push(Plane::axis(0, false, 1.0));
        let err = BrushBuilder::default().build(&planes).unwrap_err();
        assert_eq!(
            err,
            BrushError::invalid(InvalidReason::CoincidentOpposedPlanes {
                first: 0,
                second: 6
            })
        );
    }

    #[test]
    fn test_pyramid_apex_deduplicated() {
        // Square pyramid: four slanted sides meet at one apex
        let mut planes = vec![Plane::axis(2, false, 0.0)];
        for (x, y) in [(1.0, 0.0), (-1.0, 0.0), (0.0, 1.0), (0.0, -1.0)] {
            planes.push(Plane::new(Vector3::new(x, y, 1.0), 1.0).unwrap());
        }
        let (geometry, _) = BrushBuilder::default().build(&planes).unwrap();

        assert_eq!(geometry.vertex_count(), 5);
        assert_eq!(geometry.edge_count(), 8);
        assert_eq!(geometry.face_count(), 5);
    }

    #[test]
    fn test_corner_cut_within_tolerance_band() {
        // Cuts that shave the corner off by a little more than epsilon leave
        // the corner within epsilon of the cut but its replacements further away
        let epsilon = Tolerance::DEFAULT_EPSILON;
        let diagonal = 3.0_f64.sqrt();
        for step in 0..=20 {
            let depth = epsilon * (0.5 + step as f64 * 0.1);
            // At exactly epsilon the merge test itself sits on the boundary
            if (depth - epsilon).abs() < epsilon * 0.05 {
                continue;
            }
            let mut planes = cube_planes(1.0);
            planes.push(Plane::new(Vector3::new(1.0, 1.0, 1.0), 3.0 - depth).unwrap());

            let (geometry, report) = BrushBuilder::default()
                .build(&planes)
                .unwrap_or_else(|err| panic!("depth {depth:e}: {err}"));
            assert_eq!(geometry.euler_characteristic(), 2, "depth {depth:e}");

            if depth > epsilon {
                assert_eq!(geometry.face_count(), 7, "depth {depth:e}");
                assert_eq!(geometry.vertex_count(), 10, "depth {depth:e}");
                assert_eq!(geometry.edge_count(), 15, "depth {depth:e}");
                let cut_corner = Point3::new(1.0, 1.0, 1.0);
                assert!(geometry.positions().all(|p| (p - cut_corner).norm() > depth * 0.5));
                if depth / diagonal <= epsilon {
                    assert_eq!(report.clipped_vertices, 1, "depth {depth:e}");
                }
            } else {
                assert_eq!(geometry.face_count(), 6, "depth {depth:e}");
                assert!(report.is_dropped(6));
            }
        }
    }

    #[test]
    fn test_loops_are_counter_clockwise() {
        let (geometry, _) = BrushBuilder::default().build(&cube_planes(2.0)).unwrap();
        for (i, face) in geometry.faces().iter().enumerate() {
            let loop_normal = geometry.face_loop_normal(i).unwrap();
            assert!(loop_normal.dot(face.plane.normal()) > 0.999);
        }
    }
}
