// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Plane set value type
//!
//! A `PlaneSet` is both the input of a brush build and the undo snapshot of
//! an edit. Every edit produces a new value; restoring a snapshot means
//! rebuilding from the value that was handed out.

use crate::error::{BrushError, BrushResult};
use crate::geometry::{BoundingBox, Plane};
use nalgebra::{Matrix4, Vector3};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaneSet {
    planes: Vec<Plane>,
}

impl PlaneSet {
    pub fn new(planes: Vec<Plane>) -> Self {
        Self { planes }
    }

    /// The six side planes of an axis-aligned box
    pub fn cuboid(bounds: &BoundingBox) -> Self {
        Self::new(bounds.planes().to_vec())
    }

    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }

    pub fn len(&self) -> usize {
        self.planes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.planes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Plane> {
        self.planes.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Plane> {
        self.planes.iter()
    }

    fn check_index(&self, index: usize) -> BrushResult<()> {
        if index < self.planes.len() {
            Ok(())
        } else {
            Err(BrushError::PlaneIndexOutOfRange {
                index,
                count: self.planes.len(),
            })
        }
    }

    pub fn with_added(&self, plane: Plane) -> PlaneSet {
        let mut planes = self.planes.clone();
        planes.push(plane);
        Self::new(planes)
    }

    pub fn with_removed(&self, index: usize) -> BrushResult<PlaneSet> {
        self.check_index(index)?;
        let mut planes = self.planes.clone();
        planes.remove(index);
        Ok(Self::new(planes))
    }

    pub fn with_replaced(&self, index: usize, plane: Plane) -> BrushResult<PlaneSet> {
        self.check_index(index)?;
        let mut planes = self.planes.clone();
        planes[index] = plane;
        Ok(Self::new(planes))
    }

    pub fn translated(&self, delta: &Vector3<f64>) -> PlaneSet {
        Self::new(self.planes.iter().map(|p| p.translated(delta)).collect())
    }

    pub fn transformed(&self, matrix: &Matrix4<f64>) -> BrushResult<PlaneSet> {
        let planes = self
            .planes
            .iter()
            .map(|p| p.transformed(matrix))
            .collect::<BrushResult<Vec<_>>>()?;
        Ok(Self::new(planes))
    }
}

impl From<Vec<Plane>> for PlaneSet {
    fn from(planes: Vec<Plane>) -> Self {
        Self::new(planes)
    }
}

impl From<&[Plane]> for PlaneSet {
    fn from(planes: &[Plane]) -> Self {
        Self::new(planes.to_vec())
    }
}

impl<'a> IntoIterator for &'a PlaneSet {
    type Item = &'a Plane;
    type IntoIter = std::slice::Iter<'a, Plane>;

    fn into_iter(self) -> Self::IntoIter {
        self.planes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edits_leave_original_untouched() {
        let original = PlaneSet::cuboid(&BoundingBox::cube(1.0));
        let added = original.with_added(Plane::axis(0, true, 0.5));
        let removed = original.with_removed(0).unwrap();

        assert_eq!(original.len(), 6);
        assert_eq!(added.len(), 7);
        assert_eq!(removed.len(), 5);
        assert_eq!(original, PlaneSet::cuboid(&BoundingBox::cube(1.0)));
    }

    #[test]
    fn test_out_of_range_index() {
        let set = PlaneSet::cuboid(&BoundingBox::cube(1.0));
        assert_eq!(
            set.with_removed(6),
            Err(BrushError::PlaneIndexOutOfRange { index: 6, count: 6 })
        );
        assert!(set.with_replaced(9, Plane::axis(0, true, 1.0)).is_err());
    }

    #[test]
    fn test_serializes_as_plain_list() {
        let set = PlaneSet::new(vec![Plane::axis(2, true, 3.0)]);
        let json = serde_json::to_string(&set).unwrap();
        assert!(json.starts_with('['));
        let back: PlaneSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }
}
