// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Scene node definitions

use crate::brush::{Brush, Cached};
use crate::geometry::BoundingBox;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a node in its [`super::SceneGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Sort index reported by the default layer
pub const DEFAULT_LAYER_SORT_INDEX: i32 = -1;
/// Sort index reported by layers that were never given one
pub const UNSET_LAYER_SORT_INDEX: i32 = i32::MAX;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerData {
    pub name: String,
    pub(crate) sort_index: Option<i32>,
    pub omit_from_export: bool,
}

impl LayerData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sort_index: None,
            omit_from_export: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupData {
    pub name: String,
}

impl GroupData {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Entity placed in the world
///
/// An entity that holds brushes is a brush entity and is bounded by the union
/// of its brushes. Otherwise its world bounds are the definition bounds moved
/// to its origin, or just the origin when it has no definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityData {
    pub classname: String,
    pub origin: Point3<f64>,
    pub definition_bounds: Option<BoundingBox>,
}

impl EntityData {
    pub fn point(classname: impl Into<String>, origin: Point3<f64>, bounds: BoundingBox) -> Self {
        Self {
            classname: classname.into(),
            origin,
            definition_bounds: Some(bounds),
        }
    }

    pub fn brush_entity(classname: impl Into<String>) -> Self {
        Self {
            classname: classname.into(),
            origin: Point3::origin(),
            definition_bounds: None,
        }
    }

    /// World bounds when the entity holds no brushes
    pub fn point_bounds(&self) -> BoundingBox {
        self.definition_bounds
            .map(|bounds| bounds.translated(&self.origin.coords))
            .unwrap_or_else(|| BoundingBox::point(self.origin))
    }
}

/// Closed set of scene node kinds
#[derive(Debug, Clone)]
pub enum NodeKind {
    World,
    Layer(LayerData),
    Group(GroupData),
    Entity(EntityData),
    Brush(Brush),
}

impl NodeKind {
    pub fn kind_name(&self) -> &'static str {
        match self {
            NodeKind::World => "world",
            NodeKind::Layer(_) => "layer",
            NodeKind::Group(_) => "group",
            NodeKind::Entity(_) => "entity",
            NodeKind::Brush(_) => "brush",
        }
    }

    /// Parent/child rules of the hierarchy
    pub fn can_add_child(&self, child: &NodeKind) -> bool {
        match self {
            NodeKind::World => matches!(child, NodeKind::Layer(_)),
            NodeKind::Layer(_) | NodeKind::Group(_) => matches!(
                child,
                NodeKind::Group(_) | NodeKind::Entity(_) | NodeKind::Brush(_)
            ),
            NodeKind::Entity(_) => matches!(child, NodeKind::Brush(_)),
            NodeKind::Brush(_) => false,
        }
    }

    pub fn as_brush(&self) -> Option<&Brush> {
        match self {
            NodeKind::Brush(brush) => Some(brush),
            _ => None,
        }
    }
}

/// Logical and physical bounds of a node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeBounds {
    pub logical: BoundingBox,
    pub physical: BoundingBox,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) bounds: Cached<NodeBounds>,
}

impl Node {
    pub(crate) fn new(kind: NodeKind, parent: Option<NodeId>) -> Self {
        Self {
            kind,
            parent,
            children: Vec::new(),
            bounds: Cached::new(),
        }
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}
