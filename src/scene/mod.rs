// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Scene graph of layers, groups, entities and brushes

mod graph;
mod node;

pub use graph::{
    Issue, IssueKind, NodeView, SceneGraph, ScenePick, DEFAULT_LAYER_NAME,
    DEFAULT_WORLD_HALF_EXTENT,
};
pub use node::{
    EntityData, GroupData, LayerData, Node, NodeBounds, NodeId, NodeKind,
    DEFAULT_LAYER_SORT_INDEX, UNSET_LAYER_SORT_INDEX,
};
