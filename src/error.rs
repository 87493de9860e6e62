// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types for brush construction, editing and scene updates

use crate::scene::NodeId;
use thiserror::Error;

/// Result alias used throughout the kernel
pub type BrushResult<T> = Result<T, BrushError>;

/// Errors that can occur while building or editing a brush
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BrushError {
    /// The planes do not bound a closed convex solid.
    #[error("invalid plane set: {reason}")]
    InvalidPlaneSet {
        /// Why the construction was aborted.
        reason: InvalidReason,
    },

    /// A plane has a zero-length or non-finite normal.
    #[error("degenerate plane: normal has zero length or is not finite")]
    DegeneratePlane,

    /// A transform could not be inverted to carry plane normals.
    #[error("transform is singular and cannot be applied to planes")]
    SingularTransform,

    /// An edit referred to a plane that does not exist.
    #[error("plane index {index} out of range ({count} planes)")]
    PlaneIndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of planes in the set.
        count: usize,
    },
}

impl BrushError {
    pub fn invalid(reason: InvalidReason) -> Self {
        Self::InvalidPlaneSet { reason }
    }

    pub fn is_invalid_plane_set(&self) -> bool {
        matches!(self, Self::InvalidPlaneSet { .. })
    }
}

/// Reason a plane set was rejected
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidReason {
    #[error("at least 4 planes are required, got {count}")]
    TooFewPlanes { count: usize },

    #[error("planes {first} and {second} are coincident with opposite orientation")]
    CoincidentOpposedPlanes { first: usize, second: usize },

    #[error("the half-spaces have no common vertex")]
    NoVertices,

    #[error("only {count} planes bound the solid, at least 4 are required")]
    TooFewFaces { count: usize },

    #[error("boundary is open at {edges} edges (the solid is unbounded)")]
    OpenBoundary { edges: usize },

    #[error("edge {start}-{end} is shared by {faces} faces")]
    NonManifoldEdge { start: usize, end: usize, faces: usize },

    #[error("edge {start}-{end} is traversed in the same direction by both faces")]
    InconsistentWinding { start: usize, end: usize },

    #[error("euler characteristic violated: V={vertices} E={edges} F={faces}")]
    EulerMismatch {
        vertices: usize,
        edges: usize,
        faces: usize,
    },
}

/// Result alias for scene graph operations
pub type SceneResult<T> = Result<T, SceneError>;

/// Errors raised by scene graph edits
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    #[error("{parent} nodes cannot hold {child} nodes")]
    ChildNotAllowed {
        parent: &'static str,
        child: &'static str,
    },

    #[error("node {0} is not a {1}")]
    WrongKind(NodeId, &'static str),

    #[error("the world and the default layer cannot be removed")]
    PermanentNode,

    #[error(transparent)]
    Brush(#[from] BrushError),
}
