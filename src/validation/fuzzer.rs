// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Random convex brush generation
//! Produces plane sets that must always build into valid brushes

use super::checks::{check_topology, TopologyProblem};
use crate::brush::{Brush, BrushSettings};
use crate::geometry::{BoundingBox, Plane};
use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Fuzzer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuzzerConfig {
    pub count: usize,
    /// Tangent planes cut into each brush, on top of its bounding box
    pub max_cuts: usize,
    pub radius: f64,
    pub seed: u64,
}

impl Default for FuzzerConfig {
    fn default() -> Self {
        Self {
            count: 500,
            max_cuts: 12,
            radius: 64.0,
            seed: 0x5eed,
        }
    }
}

/// One generated plane set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuzzCase {
    pub name: String,
    pub planes: Vec<Plane>,
}

/// What went wrong with a fuzz case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FuzzFailure {
    /// The plane set was rejected
    Rejected(String),
    Topology(Vec<TopologyProblem>),
    /// Shuffling the planes changed the built solid
    OrderDependent,
}

/// Seeded generator of random convex brushes
pub struct Fuzzer {
    config: FuzzerConfig,
    rng: StdRng,
}

impl Fuzzer {
    pub fn new(config: FuzzerConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self { config, rng }
    }

    /// Random unit vector, uniform on the sphere
    fn random_direction(&mut self) -> Vector3<f64> {
        loop {
            let v = Vector3::new(
                self.rng.gen_range(-1.0..=1.0),
                self.rng.gen_range(-1.0..=1.0),
                self.rng.gen_range(-1.0..=1.0),
            );
            let norm = v.norm();
            if norm > 1e-3 && norm <= 1.0 {
                return v / norm;
            }
        }
    }

    /// Box around the sphere plus random tangent planes of the sphere
    pub fn generate(&mut self) -> Vec<Plane> {
        let r = self.config.radius;
        let half = self.rng.gen_range(r..=r * 1.5);
        let mut planes = BoundingBox::cube(half).planes().to_vec();

        let cuts = self.rng.gen_range(0..=self.config.max_cuts);
        for _ in 0..cuts {
            let normal = self.random_direction();
            if let Ok(plane) = Plane::new(normal, r) {
                planes.push(plane);
            }
        }
        planes
    }

    /// Same planes in a random order
    pub fn shuffled(&mut self, planes: &[Plane]) -> Vec<Plane> {
        let mut shuffled = planes.to_vec();
        shuffled.shuffle(&mut self.rng);
        shuffled
    }

    /// Generate the configured number of cases
    pub fn run(&mut self) -> Vec<FuzzCase> {
        (0..self.config.count)
            .map(|i| FuzzCase {
                name: format!("fuzz_{:05}", i),
                planes: self.generate(),
            })
            .collect()
    }

    /// Build the case, verify its topology and that plane order does not
    /// change the resulting solid
    pub fn check(&mut self, case: &FuzzCase, settings: BrushSettings) -> Result<(), FuzzFailure> {
        let brush = Brush::new(case.planes.clone(), settings)
            .map_err(|err| FuzzFailure::Rejected(err.to_string()))?;

        let report = check_topology(brush.geometry(), brush.tolerance());
        if !report.is_valid() {
            return Err(FuzzFailure::Topology(report.problems));
        }

        let shuffled = Brush::new(self.shuffled(&case.planes), settings)
            .map_err(|err| FuzzFailure::Rejected(err.to_string()))?;
        if !same_solid(&brush, &shuffled) {
            return Err(FuzzFailure::OrderDependent);
        }
        Ok(())
    }
}

/// Same counts and every vertex of one has a coincident vertex in the other
pub fn same_solid(a: &Brush, b: &Brush) -> bool {
    let (ga, gb) = (a.geometry(), b.geometry());
    if ga.vertex_count() != gb.vertex_count()
        || ga.edge_count() != gb.edge_count()
        || ga.face_count() != gb.face_count()
    {
        return false;
    }
    let tol = a.tolerance();
    ga.positions()
        .all(|p| gb.positions().any(|q| tol.points_coincide(p, q)))
}
