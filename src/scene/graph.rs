// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Arena-backed scene graph
//!
//! Nodes live in a flat arena and refer to each other by [`NodeId`]. Bounds
//! are cached per node; any change below a node drops the cached bounds of
//! the node and all of its ancestors.

use super::node::{
    EntityData, GroupData, LayerData, Node, NodeBounds, NodeId, NodeKind,
    DEFAULT_LAYER_SORT_INDEX, UNSET_LAYER_SORT_INDEX,
};
use crate::brush::{Brush, PlaneSet};
use crate::config::KernelConfig;
use crate::error::{BrushResult, SceneError, SceneResult};
use crate::geometry::{BoundingBox, Ray};
use crate::query::{BoundsProvider, HitTarget, PickHit, Pickable, VertexHit};
use nalgebra::Point3;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Half extent of the default world bounds
pub const DEFAULT_WORLD_HALF_EXTENT: f64 = 16384.0;

pub const DEFAULT_LAYER_NAME: &str = "Default Layer";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueKind {
    /// A brush could not be built from its planes
    InvalidBrush,
    /// A brush reaches outside the world bounds
    OutsideWorldBounds,
    /// Some of a brush's planes do not touch the solid
    RedundantPlanes,
}

/// Problem surfaced to the user instead of failing the edit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub node: NodeId,
    pub kind: IssueKind,
    pub message: String,
}

/// Pick hit tagged with the node that was hit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenePick {
    pub node: NodeId,
    pub hit: PickHit,
}

/// Borrowed view of one node that exposes the query capabilities
#[derive(Debug, Clone, Copy)]
pub struct NodeView<'a> {
    graph: &'a SceneGraph,
    id: NodeId,
    node: &'a Node,
}

impl<'a> NodeView<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> &'a NodeKind {
        &self.node.kind
    }

    fn bounds(&self) -> NodeBounds {
        *self
            .node
            .bounds
            .get_or_compute(|| self.graph.compute_bounds(self.node))
    }
}

impl BoundsProvider for NodeView<'_> {
    fn logical_bounds(&self) -> BoundingBox {
        self.bounds().logical
    }

    fn physical_bounds(&self) -> BoundingBox {
        self.bounds().physical
    }
}

impl Pickable for NodeView<'_> {
    fn pick(&self, ray: &Ray) -> Option<PickHit> {
        match &self.node.kind {
            NodeKind::Brush(brush) => brush.pick(ray),
            NodeKind::Entity(_) if self.node.children.is_empty() => {
                let distance = self.logical_bounds().intersect_ray(ray)?;
                Some(PickHit {
                    target: HitTarget::Bounds,
                    point: ray.point_at(distance),
                    distance,
                })
            }
            _ => None,
        }
    }
}

/// World, layers, groups, entities and brushes
#[derive(Debug, Clone)]
pub struct SceneGraph {
    nodes: Vec<Option<Node>>,
    world: NodeId,
    default_layer: NodeId,
    world_bounds: BoundingBox,
    config: KernelConfig,
    rejected: Vec<Issue>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new(KernelConfig::default())
    }
}

impl SceneGraph {
    /// Empty world holding only its default layer
    pub fn new(config: KernelConfig) -> Self {
        let world = NodeId(0);
        let default_layer = NodeId(1);
        let mut world_node = Node::new(NodeKind::World, None);
        world_node.children.push(default_layer);
        let layer_node = Node::new(NodeKind::Layer(LayerData::new(DEFAULT_LAYER_NAME)), Some(world));

        Self {
            nodes: vec![Some(world_node), Some(layer_node)],
            world,
            default_layer,
            world_bounds: BoundingBox::cube(DEFAULT_WORLD_HALF_EXTENT),
            config,
            rejected: Vec::new(),
        }
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn world(&self) -> NodeId {
        self.world
    }

    pub fn default_layer(&self) -> NodeId {
        self.default_layer
    }

    pub fn world_bounds(&self) -> &BoundingBox {
        &self.world_bounds
    }

    pub fn set_world_bounds(&mut self, bounds: BoundingBox) {
        self.world_bounds = bounds;
    }

    pub fn node(&self, id: NodeId) -> SceneResult<&Node> {
        self.nodes
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(SceneError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> SceneResult<&mut Node> {
        self.nodes
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(SceneError::UnknownNode(id))
    }

    pub fn view(&self, id: NodeId) -> SceneResult<NodeView<'_>> {
        Ok(NodeView {
            graph: self,
            id,
            node: self.node(id)?,
        })
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node(id).is_ok()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.iter().flatten().count()
    }

    pub fn children(&self, id: NodeId) -> SceneResult<&[NodeId]> {
        Ok(self.node(id)?.children())
    }

    pub fn parent(&self, id: NodeId) -> SceneResult<Option<NodeId>> {
        Ok(self.node(id)?.parent())
    }

    /// Whether a node of kind `child` may be added under `parent`
    pub fn can_add_child(&self, parent: NodeId, child: &NodeKind) -> bool {
        self.node(parent)
            .map(|node| node.kind.can_add_child(child))
            .unwrap_or(false)
    }

    /// Attach a new node under `parent`
    pub fn insert(&mut self, parent: NodeId, kind: NodeKind) -> SceneResult<NodeId> {
        let parent_kind = &self.node(parent)?.kind;
        if !parent_kind.can_add_child(&kind) {
            return Err(SceneError::ChildNotAllowed {
                parent: parent_kind.kind_name(),
                child: kind.kind_name(),
            });
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(Node::new(kind, Some(parent))));
        self.node_mut(parent)?.children.push(id);
        self.invalidate_bounds(parent);
        Ok(id)
    }

    pub fn add_layer(&mut self, name: impl Into<String>) -> SceneResult<NodeId> {
        self.insert(self.world, NodeKind::Layer(LayerData::new(name)))
    }

    pub fn add_group(&mut self, parent: NodeId, name: impl Into<String>) -> SceneResult<NodeId> {
        self.insert(parent, NodeKind::Group(GroupData::new(name)))
    }

    pub fn add_entity(&mut self, parent: NodeId, entity: EntityData) -> SceneResult<NodeId> {
        self.insert(parent, NodeKind::Entity(entity))
    }

    pub fn add_brush(&mut self, parent: NodeId, brush: Brush) -> SceneResult<NodeId> {
        self.insert(parent, NodeKind::Brush(brush))
    }

    /// Build a brush with the scene settings and attach it. A rejected plane
    /// set is recorded as an issue on `parent` and returned as an error.
    pub fn create_brush(
        &mut self,
        parent: NodeId,
        planes: impl Into<PlaneSet>,
    ) -> SceneResult<NodeId> {
        self.node(parent)?;
        match Brush::new(planes, self.config.brush_settings()) {
            Ok(brush) => self.add_brush(parent, brush),
            Err(err) => {
                log::warn!("rejected brush under {}: {}", parent, err);
                self.rejected.push(Issue {
                    node: parent,
                    kind: IssueKind::InvalidBrush,
                    message: err.to_string(),
                });
                Err(err.into())
            }
        }
    }

    /// Detach and drop a node with its whole subtree
    pub fn remove(&mut self, id: NodeId) -> SceneResult<NodeKind> {
        if id == self.world || id == self.default_layer {
            return Err(SceneError::PermanentNode);
        }
        let parent = self.node(id)?.parent;
        if let Some(parent) = parent {
            self.node_mut(parent)?.children.retain(|&child| child != id);
            self.invalidate_bounds(parent);
        }

        let mut removed = None;
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            if let Some(node) = self.nodes.get_mut(current.0).and_then(Option::take) {
                pending.extend(node.children.iter().copied());
                if current == id {
                    removed = Some(node.kind);
                }
            }
        }
        self.rejected.retain(|issue| {
            self.nodes
                .get(issue.node.0)
                .map(Option::is_some)
                .unwrap_or(false)
        });

        log::debug!("removed {} and its subtree", id);
        removed.ok_or(SceneError::UnknownNode(id))
    }

    pub fn brush(&self, id: NodeId) -> SceneResult<&Brush> {
        self.node(id)?
            .kind
            .as_brush()
            .ok_or(SceneError::WrongKind(id, "brush"))
    }

    /// Run an edit against a brush node. On success the bounds of the brush
    /// and of every ancestor are invalidated; a failed edit changes nothing.
    pub fn update_brush<R>(
        &mut self,
        id: NodeId,
        edit: impl FnOnce(&mut Brush) -> BrushResult<R>,
    ) -> SceneResult<R> {
        let node = self.node_mut(id)?;
        let NodeKind::Brush(brush) = &mut node.kind else {
            return Err(SceneError::WrongKind(id, "brush"));
        };
        let result = edit(brush)?;
        self.invalidate_bounds(id);
        Ok(result)
    }

    /// Every live brush with its node id, in insertion order
    pub fn brushes(&self) -> impl Iterator<Item = (NodeId, &Brush)> + '_ {
        self.nodes.iter().enumerate().filter_map(|(i, node)| {
            node.as_ref()
                .and_then(|node| node.kind.as_brush())
                .map(|brush| (NodeId(i), brush))
        })
    }

    pub fn brush_count(&self) -> usize {
        self.brushes().count()
    }

    /// Layers in the order they were added
    pub fn layers(&self) -> Vec<NodeId> {
        self.node(self.world)
            .map(|world| world.children.clone())
            .unwrap_or_default()
    }

    /// Layers ordered by sort index; layers with equal index keep their order
    pub fn sorted_layers(&self) -> Vec<NodeId> {
        let mut layers = self.layers();
        layers.sort_by_key(|&id| self.layer_sort_index(id).unwrap_or(UNSET_LAYER_SORT_INDEX));
        layers
    }

    pub fn layer_sort_index(&self, id: NodeId) -> SceneResult<i32> {
        match &self.node(id)?.kind {
            NodeKind::Layer(_) if id == self.default_layer => Ok(DEFAULT_LAYER_SORT_INDEX),
            NodeKind::Layer(data) => Ok(data.sort_index.unwrap_or(UNSET_LAYER_SORT_INDEX)),
            _ => Err(SceneError::WrongKind(id, "layer")),
        }
    }

    /// The default layer always sorts first; setting its index is ignored
    pub fn set_layer_sort_index(&mut self, id: NodeId, index: i32) -> SceneResult<()> {
        let is_default = id == self.default_layer;
        match &mut self.node_mut(id)?.kind {
            NodeKind::Layer(_) if is_default => {
                log::debug!("ignoring sort index {} for the default layer", index);
                Ok(())
            }
            NodeKind::Layer(data) => {
                data.sort_index = Some(index);
                Ok(())
            }
            _ => Err(SceneError::WrongKind(id, "layer")),
        }
    }

    pub fn logical_bounds(&self, id: NodeId) -> SceneResult<BoundingBox> {
        Ok(self.view(id)?.logical_bounds())
    }

    pub fn physical_bounds(&self, id: NodeId) -> SceneResult<BoundingBox> {
        Ok(self.view(id)?.physical_bounds())
    }

    fn compute_bounds(&self, node: &Node) -> NodeBounds {
        match &node.kind {
            NodeKind::Brush(brush) => NodeBounds {
                logical: brush.logical_bounds(),
                physical: brush.physical_bounds(),
            },
            NodeKind::Entity(data) if node.children.is_empty() => {
                let bounds = data.point_bounds();
                NodeBounds {
                    logical: bounds,
                    physical: bounds,
                }
            }
            _ => self.union_of_children(node),
        }
    }

    fn union_of_children(&self, node: &Node) -> NodeBounds {
        let mut children = node
            .children
            .iter()
            .filter_map(|&child| self.view(child).ok())
            .map(|view| view.bounds());
        let Some(first) = children.next() else {
            let origin = BoundingBox::point(Point3::origin());
            return NodeBounds {
                logical: origin,
                physical: origin,
            };
        };
        children.fold(first, |acc, bounds| NodeBounds {
            logical: acc.logical.union(&bounds.logical),
            physical: acc.physical.union(&bounds.physical),
        })
    }

    /// Drop cached bounds of `id` and every ancestor
    fn invalidate_bounds(&mut self, id: NodeId) {
        let mut current = Some(id);
        while let Some(id) = current {
            match self.nodes.get_mut(id.0).and_then(Option::as_mut) {
                Some(node) => {
                    node.bounds.invalidate();
                    current = node.parent;
                }
                None => break,
            }
        }
    }

    /// Hit every brush and point entity along the ray, nearest first
    pub fn pick(&self, ray: &Ray) -> Vec<ScenePick> {
        let candidates: Vec<NodeView<'_>> = self
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(i, node)| {
                let node = node.as_ref()?;
                let pickable = match &node.kind {
                    NodeKind::Brush(_) => true,
                    NodeKind::Entity(_) => node.children.is_empty(),
                    _ => false,
                };
                pickable.then_some(NodeView {
                    graph: self,
                    id: NodeId(i),
                    node,
                })
            })
            .collect();

        let pick_one = |view: &NodeView<'_>| {
            view.pick(ray).map(|hit| ScenePick {
                node: view.id,
                hit,
            })
        };
        let mut hits: Vec<ScenePick> = if candidates.len() > self.config.parallel_pick_threshold {
            candidates.par_iter().filter_map(pick_one).collect()
        } else {
            candidates.iter().filter_map(pick_one).collect()
        };

        hits.sort_by(|a, b| {
            a.hit
                .distance
                .total_cmp(&b.hit.distance)
                .then(a.node.cmp(&b.node))
        });
        hits
    }

    /// Vertex handles near the ray across all brushes, nearest first
    pub fn pick_vertices(&self, ray: &Ray) -> Vec<(NodeId, VertexHit)> {
        let radius = self.config.handle_radius;
        let mut hits: Vec<(NodeId, VertexHit)> = self
            .brushes()
            .flat_map(|(id, brush)| {
                brush
                    .pick_vertices(ray, radius)
                    .into_iter()
                    .map(move |hit| (id, hit))
            })
            .collect();
        hits.sort_by(|(ia, a), (ib, b)| {
            a.distance
                .total_cmp(&b.distance)
                .then(ia.cmp(ib))
                .then(a.vertex.cmp(&b.vertex))
        });
        hits
    }

    /// Brushes and point entities whose volume contains the point
    pub fn find_nodes_containing(&self, point: &Point3<f64>) -> Vec<NodeId> {
        let eps = self.config.epsilon;
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, node)| {
                let node = node.as_ref()?;
                let inside = match &node.kind {
                    NodeKind::Brush(brush) => brush.contains_point(point),
                    NodeKind::Entity(data) if node.children.is_empty() => {
                        data.point_bounds().contains_point(point, eps)
                    }
                    _ => false,
                };
                inside.then_some(NodeId(i))
            })
            .collect()
    }

    /// Whether the brush `brush` overlaps the world bounds of `entity`
    pub fn brush_intersects_entity(&self, brush: NodeId, entity: NodeId) -> SceneResult<bool> {
        let view = self.entity_view(entity)?;
        Ok(self.brush(brush)?.intersects_entity(&view))
    }

    /// Whether the brush `brush` fully encloses the world bounds of `entity`
    pub fn brush_contains_entity(&self, brush: NodeId, entity: NodeId) -> SceneResult<bool> {
        let view = self.entity_view(entity)?;
        Ok(self.brush(brush)?.contains_entity(&view))
    }

    fn entity_view(&self, id: NodeId) -> SceneResult<NodeView<'_>> {
        let view = self.view(id)?;
        match view.kind() {
            NodeKind::Entity(_) => Ok(view),
            _ => Err(SceneError::WrongKind(id, "entity")),
        }
    }

    /// Rejected brushes plus problems found on the current brushes
    pub fn issues(&self) -> Vec<Issue> {
        let mut issues = self.rejected.clone();
        for (id, brush) in self.brushes() {
            if !brush.is_within(&self.world_bounds) {
                issues.push(Issue {
                    node: id,
                    kind: IssueKind::OutsideWorldBounds,
                    message: format!("{} extends outside the world bounds", brush.id()),
                });
            }
            let dropped = brush.build_report().dropped_count();
            if dropped > 0 {
                issues.push(Issue {
                    node: id,
                    kind: IssueKind::RedundantPlanes,
                    message: format!("{} has {} planes that do not bound it", brush.id(), dropped),
                });
            }
        }
        issues
    }
}
