// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Kernel API tying configuration, brushes and the scene together

use crate::brush::{Brush, PlaneSet};
use crate::config::KernelConfig;
use crate::error::{BrushResult, SceneResult};
use crate::geometry::Ray;
use crate::query::{FaceHit, VertexHit};
use crate::scene::{NodeId, SceneGraph, ScenePick};
use anyhow::Result;

/// Main kernel: one scene built with one set of numerical settings
#[derive(Debug, Clone)]
pub struct Kernel {
    config: KernelConfig,
    scene: SceneGraph,
}

impl Kernel {
    /// Create a new kernel
    pub fn new(config: KernelConfig) -> Self {
        let scene = SceneGraph::new(config.clone());
        Self { config, scene }
    }

    /// Kernel configured from `brushwork.toml` and the environment
    pub fn load() -> Result<Self> {
        Ok(Self::new(KernelConfig::load()?))
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut SceneGraph {
        &mut self.scene
    }

    /// Build a detached brush with the kernel settings
    pub fn build_brush(&self, planes: impl Into<PlaneSet>) -> BrushResult<Brush> {
        Brush::new(planes, self.config.brush_settings())
    }

    /// Build a brush into the default layer
    pub fn add_brush(&mut self, planes: impl Into<PlaneSet>) -> SceneResult<NodeId> {
        let layer = self.scene.default_layer();
        self.scene.create_brush(layer, planes)
    }

    pub fn pick(&self, ray: &Ray) -> Vec<ScenePick> {
        self.scene.pick(ray)
    }

    pub fn pick_vertices(&self, ray: &Ray) -> Vec<(NodeId, VertexHit)> {
        self.scene.pick_vertices(ray)
    }

    /// Face under the ray, or the face whose edge passes closest to it
    /// within the configured proximity
    pub fn pick_closest_face(&self, ray: &Ray) -> Option<(NodeId, FaceHit)> {
        let nearest = |hits: Vec<(NodeId, FaceHit)>| {
            hits.into_iter()
                .min_by(|(ia, a), (ib, b)| a.distance.total_cmp(&b.distance).then(ia.cmp(ib)))
        };

        let direct = self
            .scene
            .brushes()
            .filter_map(|(id, brush)| brush.pick_brush(ray).map(|hit| (id, hit)))
            .collect();
        if let Some(hit) = nearest(direct) {
            return Some(hit);
        }

        let distance = self.config.proximate_face_distance;
        let near = self
            .scene
            .brushes()
            .filter_map(|(id, brush)| brush.pick_closest_face(ray, distance).map(|hit| (id, hit)))
            .collect();
        nearest(near)
    }
}

impl Default for Kernel {
    fn default() -> Self {
        Self::new(KernelConfig::default())
    }
}
