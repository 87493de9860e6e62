// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Kernel configuration

use crate::brush::BrushSettings;
use crate::geometry::Tolerance;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File picked up by [`KernelConfig::load`] from the working directory
pub const CONFIG_FILE: &str = "brushwork.toml";

/// Numerical and query settings shared by every brush and scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Distance below which two points or a point and a plane coincide
    pub epsilon: f64,
    /// World-space radius for vertex handle picking
    pub handle_radius: f64,
    /// Distance the physical bounds of a brush extend past its logical bounds
    pub physical_margin: f64,
    /// Max ray-to-edge distance when picking the closest face on a miss
    pub proximate_face_distance: f64,
    /// Brush count above which scene picking sweeps in parallel
    pub parallel_pick_threshold: usize,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            epsilon: Tolerance::DEFAULT_EPSILON,
            handle_radius: 3.0,
            physical_margin: 0.0,
            proximate_face_distance: 8.0,
            parallel_pick_threshold: 64,
        }
    }
}

impl KernelConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: KernelConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides
    pub fn load() -> Result<Self> {
        let mut config = if PathBuf::from(CONFIG_FILE).exists() {
            Self::from_file(CONFIG_FILE)?
        } else {
            Self::default()
        };

        if let Some(epsilon) = env_f64("BRUSHWORK_EPSILON")? {
            config.epsilon = epsilon;
        }
        if let Some(radius) = env_f64("BRUSHWORK_HANDLE_RADIUS")? {
            config.handle_radius = radius;
        }
        if let Some(margin) = env_f64("BRUSHWORK_PHYSICAL_MARGIN")? {
            config.physical_margin = margin;
        }

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            bail!("epsilon must be a positive finite number, got {}", self.epsilon);
        }
        if !self.handle_radius.is_finite() || self.handle_radius < 0.0 {
            bail!("handle_radius must be non-negative, got {}", self.handle_radius);
        }
        if !self.physical_margin.is_finite() {
            bail!("physical_margin must be finite, got {}", self.physical_margin);
        }
        if !self.proximate_face_distance.is_finite() || self.proximate_face_distance < 0.0 {
            bail!(
                "proximate_face_distance must be non-negative, got {}",
                self.proximate_face_distance
            );
        }
        Ok(())
    }

    pub fn tolerance(&self) -> Tolerance {
        Tolerance::new(self.epsilon)
    }

    /// Settings new brushes are built with
    pub fn brush_settings(&self) -> BrushSettings {
        BrushSettings {
            tolerance: self.tolerance(),
            physical_margin: self.physical_margin.max(0.0),
        }
    }
}

fn env_f64(name: &str) -> Result<Option<f64>> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{name} is not a number: {value:?}")),
        Err(_) => Ok(None),
    }
}
