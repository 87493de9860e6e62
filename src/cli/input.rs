// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Plane list input for the command line tools
//!
//! A brush file is a JSON array of planes. Each plane is either a normal and
//! offset, or three points wound counter-clockwise when seen from outside:
//!
//! ```json
//! [
//!   { "normal": [1, 0, 0], "offset": 16 },
//!   { "points": [[0, 0, 16], [16, 0, 16], [0, 16, 16]] }
//! ]
//! ```

use crate::brush::{FaceRecord, PlaneSet};
use crate::geometry::{BuildReport, Plane};
use crate::kernel::Kernel;
use crate::validation::{check_round_trip, check_topology, RoundTripReport, TopologyReport};
use anyhow::{Context, Result};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PlaneInput {
    NormalOffset { normal: [f64; 3], offset: f64 },
    Points { points: [[f64; 3]; 3] },
}

impl PlaneInput {
    pub fn to_plane(&self) -> Result<Plane> {
        let plane = match self {
            PlaneInput::NormalOffset { normal, offset } => {
                Plane::new(Vector3::from(*normal), *offset)?
            }
            PlaneInput::Points { points: [a, b, c] } => Plane::from_points(
                &Point3::from(*a),
                &Point3::from(*b),
                &Point3::from(*c),
            )?,
        };
        Ok(plane)
    }
}

pub fn parse_planes(json: &str) -> Result<PlaneSet> {
    let inputs: Vec<PlaneInput> =
        serde_json::from_str(json).context("Expected a JSON array of planes")?;
    let planes = inputs
        .iter()
        .enumerate()
        .map(|(i, input)| input.to_plane().with_context(|| format!("Plane {}", i)))
        .collect::<Result<Vec<_>>>()?;
    Ok(PlaneSet::new(planes))
}

/// Load a brush file
pub fn load_planes(path: impl AsRef<Path>) -> Result<PlaneSet> {
    let content = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read brush file: {:?}", path.as_ref()))?;
    parse_planes(&content).with_context(|| format!("Failed to parse brush file: {:?}", path.as_ref()))
}

/// Outcome of checking one brush file
#[derive(Debug, Clone)]
pub struct FileValidation {
    pub topology: TopologyReport,
    pub round_trip: RoundTripReport,
}

impl FileValidation {
    pub fn is_valid(&self, kernel: &Kernel) -> bool {
        self.topology.is_valid() && self.round_trip.matches(&kernel.config().tolerance())
    }
}

/// Load, build and check one brush file. Any failure along the way is an
/// error for this file only.
pub fn validate_file(kernel: &Kernel, path: impl AsRef<Path>) -> Result<FileValidation> {
    let brush = kernel.build_brush(load_planes(path.as_ref())?)?;
    let topology = check_topology(brush.geometry(), brush.tolerance());
    let round_trip = check_round_trip(&brush)
        .with_context(|| format!("Rebuild from face planes failed: {:?}", path.as_ref()))?;
    Ok(FileValidation {
        topology,
        round_trip,
    })
}

/// JSON summary printed by `inspect --json`
#[derive(Debug, Clone, Serialize)]
pub struct BrushSummary {
    pub vertices: Vec<Point3<f64>>,
    pub edge_count: usize,
    pub faces: Vec<FaceRecord>,
    pub report: BuildReport,
    pub volume: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_both_plane_forms() {
        let json = r#"[
            { "normal": [2, 0, 0], "offset": 4 },
            { "points": [[0, 0, 1], [1, 0, 1], [0, 1, 1]] }
        ]"#;
        let planes = parse_planes(json).unwrap();
        assert_eq!(planes.len(), 2);
        assert_eq!(planes.planes()[0].offset(), 2.0);
        assert_eq!(*planes.planes()[1].normal(), Vector3::z());
        assert_eq!(planes.planes()[1].offset(), 1.0);
    }

    #[test]
    fn test_validate_file_errors_stay_per_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let good = dir.path().join("cube.json");
        let flat = dir.path().join("flat.json");
        std::fs::write(
            &good,
            r#"[
                { "normal": [1, 0, 0], "offset": 1 }, { "normal": [-1, 0, 0], "offset": 1 },
                { "normal": [0, 1, 0], "offset": 1 }, { "normal": [0, -1, 0], "offset": 1 },
                { "normal": [0, 0, 1], "offset": 1 }, { "normal": [0, 0, -1], "offset": 1 }
            ]"#,
        )
        .unwrap();
        std::fs::write(
            &flat,
            r#"[
                { "normal": [1, 0, 0], "offset": 1 }, { "normal": [-1, 0, 0], "offset": -1 },
                { "normal": [0, 1, 0], "offset": 1 }, { "normal": [0, -1, 0], "offset": 1 },
                { "normal": [0, 0, 1], "offset": 1 }, { "normal": [0, 0, -1], "offset": 1 }
            ]"#,
        )
        .unwrap();

        let kernel = Kernel::default();
        let inputs = [dir.path().join("missing.json"), flat, good];
        let results: Vec<_> = inputs.iter().map(|path| validate_file(&kernel, path)).collect();

        assert!(format!("{:#}", results[0].as_ref().unwrap_err()).contains("Failed to read"));
        assert!(format!("{:#}", results[1].as_ref().unwrap_err()).contains("invalid plane set"));
        let cube = results[2].as_ref().unwrap();
        assert!(cube.is_valid(&kernel));
        assert_eq!(cube.topology.faces, 6);
    }

    #[test]
    fn test_degenerate_plane_is_reported() {
        let err = parse_planes(r#"[{ "normal": [0, 0, 0], "offset": 1 }]"#).unwrap_err();
        assert!(format!("{err:#}").contains("Plane 0"));
    }
}
