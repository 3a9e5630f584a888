// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Diagrammr-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Diagrammr and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Conversions between the AI output, the editable graph and the persistence rows, plus
//! structural checks over a graph.
//!
//! Conversions are tolerant: a connection whose endpoints cannot be resolved is skipped and
//! reported in `dropped` instead of failing the whole diagram. Nothing here performs I/O.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;

use crate::model::{
    placeholder_element_id, AiGeneratedDiagram, ConnectionRecord, ConnectionStyling, DiagramId,
    ElementRecord, ElementStyling, GraphEdge, GraphNode, Position, StoredConnection, StoredElement,
};

const UNTITLED_ELEMENT: &str = "Untitled Element";
const NO_DESCRIPTION: &str = "No description";
const GRID_SPACING: f64 = 250.0;
const GRID_ORIGIN: f64 = 100.0;

/// Nodes and edges produced by a conversion, with the connections that had to be skipped.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GraphConversion {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub dropped: Vec<DroppedConnection>,
}

/// Rows ready for the persistence backend, with the edges that had to be skipped.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PersistenceBatch {
    pub elements: Vec<ElementRecord>,
    pub connections: Vec<ConnectionRecord>,
    #[serde(skip)]
    pub dropped: Vec<DroppedConnection>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    UnresolvedSource { reference: String },
    UnresolvedTarget { reference: String },
}

/// A connection left out of a conversion result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedConnection {
    /// Position of the connection in the input list.
    pub index: usize,
    /// Id of the dropped edge/connection when the input had one.
    pub id: Option<String>,
    pub reason: DropReason,
}

impl fmt::Display for DroppedConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "connection {}", self.index)?;
        if let Some(id) = &self.id {
            write!(f, " ({id})")?;
        }
        match &self.reason {
            DropReason::UnresolvedSource { reference } => {
                write!(f, " has unresolved source {reference}")
            }
            DropReason::UnresolvedTarget { reference } => {
                write!(f, " has unresolved target {reference}")
            }
        }
    }
}

fn record_drop(dropped: &mut Vec<DroppedConnection>, entry: DroppedConnection) {
    tracing::warn!(dropped = %entry, "skipping connection");
    dropped.push(entry);
}

/// Builds the editable graph from a validated AI diagram.
///
/// Node `node-<i>` corresponds to element `i` and edge `edge-<j>` to connection `j`, so output
/// order always equals input order.
pub fn ai_to_graph(diagram: &AiGeneratedDiagram) -> GraphConversion {
    let nodes: Vec<GraphNode> = diagram
        .elements
        .iter()
        .enumerate()
        .map(|(index, element)| {
            let mut node = GraphNode::new(
                format!("node-{index}"),
                element.element_type,
                element.position.into(),
                element.high_level_description.clone(),
                element.technical_description.clone(),
            );
            node.data.original_index = Some(index);
            node
        })
        .collect();

    let resolve = |index: i64| usize::try_from(index).ok().and_then(|i| nodes.get(i));

    let mut edges = Vec::with_capacity(diagram.connections.len());
    let mut dropped = Vec::new();
    for (index, connection) in diagram.connections.iter().enumerate() {
        let Some(source) = resolve(connection.source_element_index) else {
            record_drop(
                &mut dropped,
                DroppedConnection {
                    index,
                    id: None,
                    reason: DropReason::UnresolvedSource {
                        reference: connection.source_element_index.to_string(),
                    },
                },
            );
            continue;
        };
        let Some(target) = resolve(connection.target_element_index) else {
            record_drop(
                &mut dropped,
                DroppedConnection {
                    index,
                    id: None,
                    reason: DropReason::UnresolvedTarget {
                        reference: connection.target_element_index.to_string(),
                    },
                },
            );
            continue;
        };

        let mut edge = GraphEdge::new(
            format!("edge-{index}"),
            &source.id,
            &target.id,
            connection.connection_type,
        )
        .with_label(connection.label.clone());
        edge.data.original_index = Some(index);
        edges.push(edge);
    }

    tracing::debug!(
        nodes = nodes.len(),
        edges = edges.len(),
        dropped = dropped.len(),
        "converted AI diagram to graph"
    );
    GraphConversion {
        nodes,
        edges,
        dropped,
    }
}

/// Shapes the graph into backend rows for `diagram_id`.
///
/// Element references in the connections are `element-<i>` placeholders into `elements`; the
/// backend swaps them for real ids when it stores the batch.
pub fn graph_to_persistence(
    nodes: &[GraphNode],
    edges: &[GraphEdge],
    diagram_id: &DiagramId,
) -> PersistenceBatch {
    let mut element_index: HashMap<&str, usize> = HashMap::with_capacity(nodes.len());

    let elements = nodes
        .iter()
        .enumerate()
        .map(|(index, node)| {
            element_index.entry(node.id.as_str()).or_insert(index);

            let label = non_empty(&node.data.label);
            ElementRecord {
                diagram_id: diagram_id.clone(),
                element_type: node.element_type(),
                position_x: node.position.x.round() as i64,
                position_y: node.position.y.round() as i64,
                high_level_description: label.unwrap_or(UNTITLED_ELEMENT).to_owned(),
                technical_description: non_empty(&node.data.description)
                    .or(label)
                    .unwrap_or(NO_DESCRIPTION)
                    .to_owned(),
                custom_styling: ElementStyling {
                    width: Some(node.width()),
                    height: Some(node.height()),
                    background_color: node.style.background_color.clone(),
                    border_color: node.style.border_color.clone(),
                    border_radius: node.style.border_radius.clone(),
                    font_size: node.style.font_size.clone(),
                },
                animation_order: u32::try_from(index + 1).ok(),
            }
        })
        .collect();

    let mut connections = Vec::with_capacity(edges.len());
    let mut dropped = Vec::new();
    for (index, edge) in edges.iter().enumerate() {
        let Some(&source) = element_index.get(edge.source.as_str()) else {
            record_drop(
                &mut dropped,
                DroppedConnection {
                    index,
                    id: Some(edge.id.clone()),
                    reason: DropReason::UnresolvedSource {
                        reference: edge.source.clone(),
                    },
                },
            );
            continue;
        };
        let Some(&target) = element_index.get(edge.target.as_str()) else {
            record_drop(
                &mut dropped,
                DroppedConnection {
                    index,
                    id: Some(edge.id.clone()),
                    reason: DropReason::UnresolvedTarget {
                        reference: edge.target.clone(),
                    },
                },
            );
            continue;
        };

        connections.push(ConnectionRecord {
            diagram_id: diagram_id.clone(),
            source_element_id: placeholder_element_id(source),
            target_element_id: placeholder_element_id(target),
            connection_type: edge.connection_type(),
            label: edge.label.clone(),
            styling: ConnectionStyling {
                stroke: edge.style.stroke.clone(),
                stroke_width: edge.style.stroke_width,
                animated: Some(edge.animated),
                marker_end: edge.marker_end.clone(),
            },
        });
    }

    PersistenceBatch {
        elements,
        connections,
        dropped,
    }
}

/// Rebuilds the editable graph from stored rows.
///
/// Node ids are `node-<i>-<element id>` and edge ids `edge-<j>-<connection id>`. Stored styling
/// wins over the palette defaults.
pub fn persistence_to_graph(
    elements: &[StoredElement],
    connections: &[StoredConnection],
) -> GraphConversion {
    let mut node_ids: HashMap<&str, String> = HashMap::with_capacity(elements.len());

    let nodes: Vec<GraphNode> = elements
        .iter()
        .enumerate()
        .map(|(index, stored)| {
            let record = &stored.record;
            let node_id = format!("node-{index}-{}", stored.id);
            node_ids.insert(stored.id.as_str(), node_id.clone());

            let mut node = GraphNode::new(
                node_id,
                record.element_type,
                Position::new(record.position_x as f64, record.position_y as f64),
                record.high_level_description.clone(),
                record.technical_description.clone(),
            );
            node.data.element_id = Some(stored.id.clone());

            let custom = &record.custom_styling;
            if let Some(color) = &custom.background_color {
                node.style.background_color = Some(color.clone());
            }
            if let Some(color) = &custom.border_color {
                node.style.border_color = Some(color.clone());
            }
            if let Some(radius) = &custom.border_radius {
                node.style.border_radius = Some(radius.clone());
            }
            if let Some(size) = &custom.font_size {
                node.style.font_size = Some(size.clone());
            }
            if custom.width.is_some() {
                node.style.width = custom.width;
            }
            if custom.height.is_some() {
                node.style.height = custom.height;
            }
            node
        })
        .collect();

    let mut edges = Vec::with_capacity(connections.len());
    let mut dropped = Vec::new();
    for (index, stored) in connections.iter().enumerate() {
        let record = &stored.record;
        let Some(source) = node_ids.get(record.source_element_id.as_str()) else {
            record_drop(
                &mut dropped,
                DroppedConnection {
                    index,
                    id: Some(stored.id.clone()),
                    reason: DropReason::UnresolvedSource {
                        reference: record.source_element_id.clone(),
                    },
                },
            );
            continue;
        };
        let Some(target) = node_ids.get(record.target_element_id.as_str()) else {
            record_drop(
                &mut dropped,
                DroppedConnection {
                    index,
                    id: Some(stored.id.clone()),
                    reason: DropReason::UnresolvedTarget {
                        reference: record.target_element_id.clone(),
                    },
                },
            );
            continue;
        };

        let mut edge = GraphEdge::new(
            format!("edge-{index}-{}", stored.id),
            source,
            target,
            record.connection_type,
        )
        .with_label(record.label.clone());
        edge.data.connection_id = Some(stored.id.clone());

        let styling = &record.styling;
        if let Some(stroke) = &styling.stroke {
            edge.data.color = stroke.clone();
            edge.style.stroke = Some(stroke.clone());
            if let Some(marker) = edge.marker_end.as_mut() {
                marker.color = Some(stroke.clone());
            }
        }
        if styling.stroke_width.is_some() {
            edge.style.stroke_width = styling.stroke_width;
        }
        if let Some(animated) = styling.animated {
            edge.animated = animated;
        }
        if let Some(marker) = &styling.marker_end {
            edge.marker_end = Some(marker.clone());
        }
        edges.push(edge);
    }

    GraphConversion {
        nodes,
        edges,
        dropped,
    }
}

/// One structural problem found by [`validate_graph`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphIssue {
    #[error("Node at index {index} is missing an ID")]
    NodeMissingId { index: usize },
    #[error("Duplicate node ID: {id}")]
    DuplicateNodeId { id: String },
    #[error("Node {id} has invalid position")]
    InvalidPosition { id: String },
    #[error("Node {id} is missing a label")]
    MissingLabel { id: String },
    #[error("Edge at index {index} is missing an ID")]
    EdgeMissingId { index: usize },
    #[error("Duplicate edge ID: {id}")]
    DuplicateEdgeId { id: String },
    #[error("Edge {edge} has invalid source: {source_id}")]
    UnknownSource { edge: String, source_id: String },
    #[error("Edge {edge} has invalid target: {target_id}")]
    UnknownTarget { edge: String, target_id: String },
    #[error("Edge {edge} is a self-loop")]
    SelfLoop { edge: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GraphValidation {
    pub is_valid: bool,
    pub errors: Vec<GraphIssue>,
}

/// Reports every structural issue in the graph; callers decide whether to block or warn.
pub fn validate_graph(nodes: &[GraphNode], edges: &[GraphEdge]) -> GraphValidation {
    let mut errors = Vec::new();

    let mut node_ids: HashSet<&str> = HashSet::with_capacity(nodes.len());
    for (index, node) in nodes.iter().enumerate() {
        if node.id.is_empty() {
            errors.push(GraphIssue::NodeMissingId { index });
        } else if !node_ids.insert(node.id.as_str()) {
            errors.push(GraphIssue::DuplicateNodeId {
                id: node.id.clone(),
            });
        }

        if !node.position.is_finite() {
            errors.push(GraphIssue::InvalidPosition {
                id: node.id.clone(),
            });
        }

        if node.data.label.is_empty() {
            errors.push(GraphIssue::MissingLabel {
                id: node.id.clone(),
            });
        }
    }

    let mut edge_ids: HashSet<&str> = HashSet::with_capacity(edges.len());
    for (index, edge) in edges.iter().enumerate() {
        if edge.id.is_empty() {
            errors.push(GraphIssue::EdgeMissingId { index });
        } else if !edge_ids.insert(edge.id.as_str()) {
            errors.push(GraphIssue::DuplicateEdgeId {
                id: edge.id.clone(),
            });
        }

        if !node_ids.contains(edge.source.as_str()) {
            errors.push(GraphIssue::UnknownSource {
                edge: edge.id.clone(),
                source_id: edge.source.clone(),
            });
        }
        if !node_ids.contains(edge.target.as_str()) {
            errors.push(GraphIssue::UnknownTarget {
                edge: edge.id.clone(),
                target_id: edge.target.clone(),
            });
        }
        if edge.source == edge.target {
            errors.push(GraphIssue::SelfLoop {
                edge: edge.id.clone(),
            });
        }
    }

    GraphValidation {
        is_valid: errors.is_empty(),
        errors,
    }
}

/// Axis-aligned bounding box in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Bounding box over node positions and sizes; the zero rectangle for no nodes.
pub fn compute_bounds(nodes: &[GraphNode]) -> Bounds {
    if nodes.is_empty() {
        return Bounds::default();
    }

    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for node in nodes {
        min_x = min_x.min(node.position.x);
        min_y = min_y.min(node.position.y);
        max_x = max_x.max(node.position.x + node.width());
        max_y = max_y.max(node.position.y + node.height());
    }

    Bounds {
        x: min_x,
        y: min_y,
        width: max_x - min_x,
        height: max_y - min_y,
    }
}

/// Places nodes on a square-ish grid, row by row in input order.
pub fn grid_layout(nodes: &[GraphNode]) -> Vec<GraphNode> {
    let columns = (nodes.len() as f64).sqrt().ceil().max(1.0) as usize;
    nodes
        .iter()
        .enumerate()
        .map(|(index, node)| {
            let row = index / columns;
            let col = index % columns;
            let mut node = node.clone();
            node.position = Position::new(
                GRID_ORIGIN + col as f64 * GRID_SPACING,
                GRID_ORIGIN + row as f64 * GRID_SPACING,
            );
            node
        })
        .collect()
}

fn non_empty(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}
