// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Structural checks on built brush geometry

use crate::brush::{Brush, BrushSettings};
use crate::error::BrushResult;
use crate::geometry::{signed_distance, BrushGeometry, Tolerance};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single violated topology property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TopologyProblem {
    EulerMismatch { characteristic: i64 },
    /// The edge is not walked start to end by its left face and end to
    /// start by its right face
    BrokenEdgeWinding { edge: usize },
    /// Fewer than three edges meet at the vertex
    LowValence { vertex: usize, edges: usize },
    NonPlanarFace { face: usize, deviation: f64 },
    /// The loop winding disagrees with the face plane's outward normal
    ReversedFace { face: usize },
    /// The vertex lies in front of a face plane
    NotConvex { vertex: usize, face: usize, distance: f64 },
}

impl fmt::Display for TopologyProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EulerMismatch { characteristic } => {
                write!(f, "V - E + F = {characteristic}, expected 2")
            }
            Self::BrokenEdgeWinding { edge } => write!(f, "edge {edge} has broken face winding"),
            Self::LowValence { vertex, edges } => {
                write!(f, "vertex {vertex} has only {edges} edges")
            }
            Self::NonPlanarFace { face, deviation } => {
                write!(f, "face {face} deviates {deviation:.3e} from its plane")
            }
            Self::ReversedFace { face } => write!(f, "face {face} is wound clockwise"),
            Self::NotConvex {
                vertex,
                face,
                distance,
            } => write!(f, "vertex {vertex} lies {distance:.3e} in front of face {face}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyReport {
    pub vertices: usize,
    pub edges: usize,
    pub faces: usize,
    pub problems: Vec<TopologyProblem>,
}

impl TopologyReport {
    pub fn is_valid(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Verify every structural invariant of a closed convex brush
pub fn check_topology(geometry: &BrushGeometry, tolerance: &Tolerance) -> TopologyReport {
    let mut problems = Vec::new();

    let characteristic = geometry.euler_characteristic();
    if characteristic != 2 {
        problems.push(TopologyProblem::EulerMismatch { characteristic });
    }

    let faces = geometry.faces();
    for (i, edge) in geometry.edges().iter().enumerate() {
        let walks = |face: usize, from: usize, to: usize| {
            faces.get(face).is_some_and(|f| {
                let n = f.vertices.len();
                (0..n).any(|k| f.vertices[k] == from && f.vertices[(k + 1) % n] == to)
            })
        };
        if !walks(edge.left_face, edge.start, edge.end)
            || !walks(edge.right_face, edge.end, edge.start)
        {
            problems.push(TopologyProblem::BrokenEdgeWinding { edge: i });
        }
    }

    for (i, vertex) in geometry.vertices().iter().enumerate() {
        if vertex.edges.len() < 3 {
            problems.push(TopologyProblem::LowValence {
                vertex: i,
                edges: vertex.edges.len(),
            });
        }
    }

    for (i, face) in faces.iter().enumerate() {
        let deviation = geometry
            .face_positions(i)
            .map(|p| signed_distance(&face.plane, p, tolerance).abs())
            .fold(0.0, f64::max);
        if deviation > tolerance.epsilon() {
            problems.push(TopologyProblem::NonPlanarFace { face: i, deviation });
        }

        let agrees = geometry
            .face_loop_normal(i)
            .is_some_and(|n| n.dot(face.plane.normal()) > 0.0);
        if !agrees {
            problems.push(TopologyProblem::ReversedFace { face: i });
        }

        for (v, vertex) in geometry.vertices().iter().enumerate() {
            let distance = signed_distance(&face.plane, &vertex.position, tolerance);
            if distance > tolerance.epsilon() {
                problems.push(TopologyProblem::NotConvex {
                    vertex: v,
                    face: i,
                    distance,
                });
            }
        }
    }

    TopologyReport {
        vertices: geometry.vertex_count(),
        edges: geometry.edge_count(),
        faces: geometry.face_count(),
        problems,
    }
}

/// Result of rebuilding a brush from only its face planes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundTripReport {
    pub original: (usize, usize, usize),
    pub rebuilt: (usize, usize, usize),
    /// Largest distance from an original vertex to its nearest rebuilt vertex
    pub max_vertex_deviation: f64,
}

impl RoundTripReport {
    pub fn matches(&self, tolerance: &Tolerance) -> bool {
        self.original == self.rebuilt && self.max_vertex_deviation <= tolerance.epsilon()
    }
}

/// Rebuild the brush from its face planes and compare the two solids
pub fn check_round_trip(brush: &Brush) -> BrushResult<RoundTripReport> {
    let settings = BrushSettings {
        tolerance: *brush.tolerance(),
        physical_margin: brush.settings().physical_margin,
    };
    let rebuilt = Brush::new(brush.face_planes(), settings)?;

    let counts = |g: &BrushGeometry| (g.vertex_count(), g.edge_count(), g.face_count());
    let max_vertex_deviation = brush
        .geometry()
        .positions()
        .map(|p| {
            rebuilt
                .geometry()
                .positions()
                .map(|q| (p - q).norm())
                .fold(f64::INFINITY, f64::min)
        })
        .fold(0.0, f64::max);

    Ok(RoundTripReport {
        original: counts(brush.geometry()),
        rebuilt: counts(rebuilt.geometry()),
        max_vertex_deviation,
    })
}
