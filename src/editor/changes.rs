// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Diagrammr-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Diagrammr and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Batched change descriptors reported by the canvas, and how they apply to node/edge lists.
//!
//! Selection changes are not applied here; the editor routes them into its own selection state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::EditorError;
use crate::model::{GraphEdge, GraphNode, Position};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NodeChange {
    /// A move. `dragging` is `Some(true)` for every intermediate frame of a drag gesture and
    /// `Some(false)` on the frame that ends it.
    Position {
        id: String,
        #[serde(default)]
        position: Option<Position>,
        #[serde(default)]
        dragging: Option<bool>,
    },
    Dimensions {
        id: String,
        #[serde(default)]
        dimensions: Option<Dimensions>,
    },
    Select {
        id: String,
        selected: bool,
    },
    Remove {
        id: String,
    },
    Add {
        item: GraphNode,
        #[serde(default)]
        index: Option<usize>,
    },
    Replace {
        id: String,
        item: GraphNode,
    },
}

impl NodeChange {
    pub fn is_drag_frame(&self) -> bool {
        matches!(
            self,
            Self::Position {
                dragging: Some(true),
                ..
            }
        )
    }

    /// Whether the change touches document state (anything but selection).
    pub fn edits_document(&self) -> bool {
        !matches!(self, Self::Select { .. })
    }

    /// Inserts, replacements and removals; these are history steps.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::Remove { .. } | Self::Add { .. } | Self::Replace { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EdgeChange {
    Select {
        id: String,
        selected: bool,
    },
    Remove {
        id: String,
    },
    Add {
        item: GraphEdge,
        #[serde(default)]
        index: Option<usize>,
    },
    Replace {
        id: String,
        item: GraphEdge,
    },
}

impl EdgeChange {
    pub fn edits_document(&self) -> bool {
        !matches!(self, Self::Select { .. })
    }
}

/// A new link drawn between two node ports on the canvas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub source_handle: Option<String>,
    #[serde(default)]
    pub target_handle: Option<String>,
}

impl Connection {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            source_handle: None,
            target_handle: None,
        }
    }

    pub(crate) fn matches(&self, edge: &GraphEdge) -> bool {
        edge.source == self.source
            && edge.target == self.target
            && edge.source_handle == self.source_handle
            && edge.target_handle == self.target_handle
    }
}

/// What a batch of canvas changes did to the document, beyond moves and measurements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppliedChanges {
    pub removed: Vec<String>,
    pub inserted: usize,
    pub replaced: usize,
}

impl AppliedChanges {
    /// Whether elements were inserted, replaced or removed.
    pub fn is_structural(&self) -> bool {
        !self.removed.is_empty() || self.inserted > 0 || self.replaced > 0
    }

    pub(crate) fn action(
        &self,
        delete: &'static str,
        add: &'static str,
        edit: &'static str,
    ) -> &'static str {
        match (self.removed.is_empty(), self.inserted > 0, self.replaced > 0) {
            (false, false, false) => delete,
            (true, true, false) => add,
            _ => edit,
        }
    }
}

pub(crate) fn check_new_node(nodes: &[GraphNode], node: &GraphNode) -> Result<(), EditorError> {
    if nodes.iter().any(|n| n.id == node.id) {
        return Err(EditorError::DuplicateNodeId {
            id: node.id.clone(),
        });
    }
    Ok(())
}

pub(crate) fn check_new_edge(
    nodes: &[GraphNode],
    edges: &[GraphEdge],
    edge: &GraphEdge,
) -> Result<(), EditorError> {
    if edges.iter().any(|e| e.id == edge.id) {
        return Err(EditorError::DuplicateEdgeId {
            id: edge.id.clone(),
        });
    }
    check_edge_endpoints(nodes, edge)
}

pub(crate) fn check_edge_endpoints(
    nodes: &[GraphNode],
    edge: &GraphEdge,
) -> Result<(), EditorError> {
    for endpoint in [&edge.source, &edge.target] {
        if !nodes.iter().any(|n| &n.id == endpoint) {
            return Err(EditorError::UnknownNode {
                edge: edge.id.clone(),
                node: endpoint.clone(),
            });
        }
    }
    if edge.source == edge.target {
        return Err(EditorError::SelfLoop {
            edge: edge.id.clone(),
            node: edge.source.clone(),
        });
    }
    Ok(())
}

fn skip(err: &EditorError) {
    tracing::warn!(error = %err, "canvas change skipped");
}

/// Applies document changes in order.
///
/// Inserts that would duplicate an id are skipped, and a replacement keeps the id it replaces.
pub fn apply_node_changes(changes: &[NodeChange], nodes: &mut Vec<GraphNode>) -> AppliedChanges {
    let mut applied = AppliedChanges::default();
    for change in changes {
        match change {
            NodeChange::Position { id, position, .. } => {
                if let (Some(position), Some(node)) = (position, find_node(nodes, id)) {
                    node.position = *position;
                }
            }
            NodeChange::Dimensions { id, dimensions } => {
                if let (Some(dimensions), Some(node)) = (dimensions, find_node(nodes, id)) {
                    node.style.width = Some(dimensions.width);
                    node.style.height = Some(dimensions.height);
                }
            }
            NodeChange::Select { .. } => {}
            NodeChange::Remove { id } => {
                if let Some(index) = nodes.iter().position(|n| &n.id == id) {
                    nodes.remove(index);
                    applied.removed.push(id.clone());
                }
            }
            NodeChange::Add { item, index } => {
                let mut item = item.clone();
                if item.id.is_empty() {
                    item.id = fresh_id("node");
                }
                match check_new_node(nodes, &item) {
                    Ok(()) => {
                        insert_at(nodes, item, *index);
                        applied.inserted += 1;
                    }
                    Err(err) => skip(&err),
                }
            }
            NodeChange::Replace { id, item } => {
                if let Some(node) = find_node(nodes, id) {
                    *node = GraphNode {
                        id: id.clone(),
                        ..item.clone()
                    };
                    applied.replaced += 1;
                }
            }
        }
    }
    applied
}

/// Applies document changes in order against the current `nodes`.
///
/// Inserts and replacements are held to the same rules as [`super::DiagramEditor::add_edge`];
/// offending changes are skipped. A replacement keeps the id it replaces.
pub fn apply_edge_changes(
    changes: &[EdgeChange],
    edges: &mut Vec<GraphEdge>,
    nodes: &[GraphNode],
) -> AppliedChanges {
    let mut applied = AppliedChanges::default();
    for change in changes {
        match change {
            EdgeChange::Select { .. } => {}
            EdgeChange::Remove { id } => {
                if let Some(index) = edges.iter().position(|e| &e.id == id) {
                    edges.remove(index);
                    applied.removed.push(id.clone());
                }
            }
            EdgeChange::Add { item, index } => {
                let mut item = item.clone();
                if item.id.is_empty() {
                    item.id = fresh_id("edge");
                }
                match check_new_edge(nodes, edges, &item) {
                    Ok(()) => {
                        insert_at(edges, item, *index);
                        applied.inserted += 1;
                    }
                    Err(err) => skip(&err),
                }
            }
            EdgeChange::Replace { id, item } => {
                let Some(index) = edges.iter().position(|e| &e.id == id) else {
                    continue;
                };
                let item = GraphEdge {
                    id: id.clone(),
                    ..item.clone()
                };
                match check_edge_endpoints(nodes, &item) {
                    Ok(()) => {
                        edges[index] = item;
                        applied.replaced += 1;
                    }
                    Err(err) => skip(&err),
                }
            }
        }
    }
    applied
}

pub(crate) fn fresh_id(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4())
}

fn find_node<'a>(nodes: &'a mut [GraphNode], id: &str) -> Option<&'a mut GraphNode> {
    nodes.iter_mut().find(|n| n.id == id)
}

fn insert_at<T>(items: &mut Vec<T>, item: T, index: Option<usize>) {
    match index {
        Some(index) if index <= items.len() => items.insert(index, item),
        _ => items.push(item),
    }
}
