// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Spatial queries: ray picking and solid-solid relations
//!
//! Queries are written against small capability traits so brushes, boxes and
//! scene entities can be mixed freely.

mod capability;
mod pick;
mod relation;

pub use capability::{BoundsProvider, Intersectable, Pickable};
pub use pick::{FaceHit, HitTarget, PickHit, VertexHit};
pub use relation::{contains, intersects};
