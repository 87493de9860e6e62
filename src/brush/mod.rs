// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Brushes: convex solids bounded by planes
//!
//! A [`Brush`] owns its [`PlaneSet`] and the geometry built from it. The
//! geometry is replaced wholesale on every edit and is never observable in a
//! half-built state. Bounds are derived lazily and dropped whenever the
//! geometry changes.

mod cache;
mod edit;
mod plane_set;

pub use cache::Cached;
pub use plane_set::PlaneSet;

use crate::error::BrushResult;
use crate::geometry::{
    classify, BoundingBox, BrushBuilder, BrushEdge, BrushFace, BrushGeometry, BrushVertex,
    BuildReport, Plane, PlaneClassification, Tolerance,
};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_BRUSH_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of a brush, carried by pick hits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BrushId(pub u64);

impl BrushId {
    pub fn next() -> Self {
        Self(NEXT_BRUSH_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for BrushId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "brush#{}", self.0)
    }
}

/// Numerical settings a brush is built with
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrushSettings {
    pub tolerance: Tolerance,
    /// Distance the physical bounds extend past the logical bounds
    pub physical_margin: f64,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            tolerance: Tolerance::default(),
            physical_margin: 0.0,
        }
    }
}

/// Logical and physical bounds of a brush
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrushBounds {
    /// Tight box around the vertices
    pub logical: BoundingBox,
    /// Logical box grown by the physical margin
    pub physical: BoundingBox,
}

/// Finalized face for exporters: plane plus ordered vertex positions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceRecord {
    pub plane_index: usize,
    pub plane: Plane,
    pub vertices: Vec<Point3<f64>>,
}

/// Convex solid defined as the intersection of half-spaces
#[derive(Debug, Clone)]
pub struct Brush {
    id: BrushId,
    planes: PlaneSet,
    geometry: BrushGeometry,
    report: BuildReport,
    settings: BrushSettings,
    bounds: Cached<BrushBounds>,
}

impl Brush {
    /// Build a brush, failing with `InvalidPlaneSet` if the planes do not
    /// bound a closed convex solid
    pub fn new(planes: impl Into<PlaneSet>, settings: BrushSettings) -> BrushResult<Self> {
        Self::with_id(BrushId::next(), planes, settings)
    }

    pub fn with_id(
        id: BrushId,
        planes: impl Into<PlaneSet>,
        settings: BrushSettings,
    ) -> BrushResult<Self> {
        let planes = planes.into();
        let (geometry, report) = BrushBuilder::new(settings.tolerance).build(planes.planes())?;
        Ok(Self {
            id,
            planes,
            geometry,
            report,
            settings,
            bounds: Cached::new(),
        })
    }

    /// Axis-aligned box brush
    pub fn cuboid(bounds: &BoundingBox, settings: BrushSettings) -> BrushResult<Self> {
        Self::new(PlaneSet::cuboid(bounds), settings)
    }

    /// Copy with a fresh identity
    pub fn duplicate(&self) -> Self {
        let mut copy = self.clone();
        copy.id = BrushId::next();
        copy
    }

    pub fn id(&self) -> BrushId {
        self.id
    }

    pub fn settings(&self) -> &BrushSettings {
        &self.settings
    }

    pub fn tolerance(&self) -> &Tolerance {
        &self.settings.tolerance
    }

    /// Full plane set, including planes that were dropped as redundant
    pub fn planes(&self) -> &PlaneSet {
        &self.planes
    }

    /// Value snapshot of the plane set for undo
    pub fn snapshot(&self) -> PlaneSet {
        self.planes.clone()
    }

    pub fn geometry(&self) -> &BrushGeometry {
        &self.geometry
    }

    pub fn build_report(&self) -> &BuildReport {
        &self.report
    }

    pub fn vertices(&self) -> &[BrushVertex] {
        self.geometry.vertices()
    }

    pub fn edges(&self) -> &[BrushEdge] {
        self.geometry.edges()
    }

    pub fn faces(&self) -> &[BrushFace] {
        self.geometry.faces()
    }

    /// Only the planes that bound the solid, in plane set order
    pub fn face_planes(&self) -> Vec<Plane> {
        self.geometry.faces().iter().map(|f| f.plane).collect()
    }

    pub fn face_records(&self) -> Vec<FaceRecord> {
        (0..self.geometry.face_count())
            .map(|i| {
                let face = &self.geometry.faces()[i];
                FaceRecord {
                    plane_index: face.plane_index,
                    plane: face.plane,
                    vertices: self.geometry.face_positions(i).copied().collect(),
                }
            })
            .collect()
    }

    fn bounds(&self) -> &BrushBounds {
        self.bounds.get_or_compute(|| {
            let logical = self.geometry.bounding_box();
            BrushBounds {
                logical,
                physical: logical.expanded(self.settings.physical_margin.max(0.0)),
            }
        })
    }

    pub fn logical_bounds(&self) -> BoundingBox {
        self.bounds().logical
    }

    pub fn physical_bounds(&self) -> BoundingBox {
        self.bounds().physical
    }

    /// Inside-or-on every face plane
    pub fn contains_point(&self, point: &Point3<f64>) -> bool {
        let tol = self.tolerance();
        self.geometry
            .faces()
            .iter()
            .all(|f| classify(&f.plane, point, tol) != PlaneClassification::Front)
    }

    /// Whether the brush lies inside the given world bounds
    pub fn is_within(&self, world_bounds: &BoundingBox) -> bool {
        world_bounds.contains(&self.logical_bounds(), self.tolerance().epsilon())
    }

    pub fn volume(&self) -> f64 {
        self.geometry.volume()
    }

    fn replace_geometry(&mut self, geometry: BrushGeometry, report: BuildReport) {
        self.geometry = geometry;
        self.report = report;
        self.bounds.invalidate();
    }
}
