// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Single-plane edits
//!
//! Every edit rebuilds the geometry from the updated plane set. On success the
//! previous plane set is returned so the caller can hand it back to
//! [`Brush::restore`]; on failure the brush is left exactly as it was.

use super::{Brush, PlaneSet};
use crate::error::{BrushError, BrushResult};
use crate::geometry::{BrushBuilder, Plane};
use nalgebra::{Matrix4, Vector3};

impl Brush {
    /// Replace the whole plane set. Returns the previous set.
    pub fn rebuild(&mut self, planes: impl Into<PlaneSet>) -> BrushResult<PlaneSet> {
        let planes = planes.into();
        let (geometry, report) = BrushBuilder::new(self.settings.tolerance)
            .build(planes.planes())
            .map_err(|err| {
                log::debug!("{} rebuild rejected: {}", self.id, err);
                err
            })?;

        let previous = std::mem::replace(&mut self.planes, planes);
        self.replace_geometry(geometry, report);
        Ok(previous)
    }

    /// Restore a snapshot previously returned by an edit
    pub fn restore(&mut self, snapshot: PlaneSet) -> BrushResult<PlaneSet> {
        self.rebuild(snapshot)
    }

    /// Cut the brush with an additional half-space
    pub fn add_plane(&mut self, plane: Plane) -> BrushResult<PlaneSet> {
        let planes = self.planes.with_added(plane);
        self.rebuild(planes)
    }

    pub fn remove_plane(&mut self, index: usize) -> BrushResult<PlaneSet> {
        let planes = self.planes.with_removed(index)?;
        self.rebuild(planes)
    }

    /// Replace one plane with a new orientation and/or offset
    pub fn move_plane(&mut self, index: usize, plane: Plane) -> BrushResult<PlaneSet> {
        let planes = self.planes.with_replaced(index, plane)?;
        self.rebuild(planes)
    }

    /// Push a plane outwards (positive) or inwards (negative) along its normal
    pub fn offset_plane(&mut self, index: usize, distance: f64) -> BrushResult<PlaneSet> {
        let plane = self
            .planes
            .get(index)
            .map(|p| p.offset_by(distance))
            .ok_or(BrushError::PlaneIndexOutOfRange {
                index,
                count: self.planes.len(),
            })?;
        self.move_plane(index, plane)
    }

    pub fn translate(&mut self, delta: &Vector3<f64>) -> BrushResult<PlaneSet> {
        let planes = self.planes.translated(delta);
        self.rebuild(planes)
    }

    pub fn transform(&mut self, matrix: &Matrix4<f64>) -> BrushResult<PlaneSet> {
        let planes = self.planes.transformed(matrix)?;
        self.rebuild(planes)
    }

    /// Drop the planes that do not bound the solid
    pub fn simplify(&mut self) -> BrushResult<PlaneSet> {
        let planes = PlaneSet::new(self.face_planes());
        self.rebuild(planes)
    }
}
