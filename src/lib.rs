// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Brushwork
//!
//! Geometry kernel for convex brushes in a level editor. A brush is the
//! intersection of a set of half-spaces; the kernel derives its vertices,
//! edges and faces, keeps them current as planes are edited, and answers
//! picking and containment queries against brushes, boxes and scene nodes.

pub mod brush;
pub mod cli;
pub mod config;
pub mod error;
pub mod geometry;
pub mod kernel;
pub mod query;
pub mod scene;
pub mod validation;

pub use brush::{Brush, BrushId, BrushSettings, FaceRecord, PlaneSet};
pub use config::KernelConfig;
pub use error::{BrushError, BrushResult, InvalidReason, SceneError, SceneResult};
pub use geometry::{BoundingBox, BrushGeometry, BrushBuilder, Plane, Ray, Tolerance};
pub use kernel::Kernel;
pub use query::{BoundsProvider, FaceHit, Intersectable, PickHit, Pickable, VertexHit};
pub use scene::{NodeId, NodeKind, SceneGraph};

/// Build a brush from planes with default settings
pub fn build(planes: impl Into<PlaneSet>) -> BrushResult<Brush> {
    Brush::new(planes, BrushSettings::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_cube() {
        let result = build(PlaneSet::cuboid(&BoundingBox::cube(8.0)));
        assert!(result.is_ok());
    }
}
