// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - planes, rays, bounds and the brush boundary representation

pub mod predicates;
mod plane;
mod ray;
mod bbox;
mod topology;
mod builder;

pub use predicates::{classify, intersect3, signed_distance, PlaneClassification, Tolerance};
pub use plane::Plane;
pub use ray::{Ray, RayDistance};
pub use bbox::BoundingBox;
pub use topology::{BrushEdge, BrushFace, BrushGeometry, BrushVertex, FaceLoop};
pub use builder::{BrushBuilder, BuildReport, DropReason, DroppedPlane};
