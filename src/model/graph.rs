// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Diagrammr-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Diagrammr and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Editable graph model rendered by the canvas.
//!
//! Field names serialize in camelCase so the canvas can exchange nodes/edges as JSON directly.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ai::{ConnectionType, ElementPosition, ElementType};

pub const DEFAULT_NODE_WIDTH: f64 = 200.0;
pub const DEFAULT_NODE_HEIGHT: f64 = 80.0;
pub const DECISION_NODE_SIZE: f64 = 120.0;
pub const DEFAULT_FONT_SIZE: &str = "12px";
pub const DEFAULT_STROKE_WIDTH: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<ElementPosition> for Position {
    fn from(value: ElementPosition) -> Self {
        Self::new(value.x, value.y)
    }
}

/// Pan offset and zoom of the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

/// Rendering kind of a node; one per [`ElementType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    ProcessNode,
    DecisionNode,
    DataNode,
    SystemNode,
    UserActionNode,
}

impl NodeKind {
    pub fn for_element(element_type: ElementType) -> Self {
        match element_type {
            ElementType::Process => Self::ProcessNode,
            ElementType::Decision => Self::DecisionNode,
            ElementType::Data => Self::DataNode,
            ElementType::System => Self::SystemNode,
            ElementType::UserAction => Self::UserActionNode,
        }
    }

    /// Width and height used when the node carries no explicit size.
    pub fn default_size(self) -> (f64, f64) {
        match self {
            Self::DecisionNode => (DECISION_NODE_SIZE, DECISION_NODE_SIZE),
            _ => (DEFAULT_NODE_WIDTH, DEFAULT_NODE_HEIGHT),
        }
    }

    pub fn default_border_radius(self) -> &'static str {
        match self {
            Self::DecisionNode => "50%",
            _ => "8px",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ProcessNode => "processNode",
            Self::DecisionNode => "decisionNode",
            Self::DataNode => "dataNode",
            Self::SystemNode => "systemNode",
            Self::UserActionNode => "userActionNode",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rendering kind of an edge; one per [`ConnectionType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeKind {
    DataFlowEdge,
    ProcessFlowEdge,
    DependencyEdge,
    TriggerEdge,
}

impl EdgeKind {
    pub fn for_connection(connection_type: ConnectionType) -> Self {
        match connection_type {
            ConnectionType::DataFlow => Self::DataFlowEdge,
            ConnectionType::ProcessFlow => Self::ProcessFlowEdge,
            ConnectionType::Dependency => Self::DependencyEdge,
            ConnectionType::Trigger => Self::TriggerEdge,
        }
    }
}

/// Background / border / text colors of a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeColors {
    pub background: String,
    pub border: String,
    pub text: String,
}

impl NodeColors {
    pub fn for_element(element_type: ElementType) -> Self {
        let (background, border, text) = match element_type {
            ElementType::Process => ("#E3F2FD", "#1976D2", "#0D47A1"),
            ElementType::Decision => ("#FFF3E0", "#F57C00", "#E65100"),
            ElementType::Data => ("#E8F5E8", "#388E3C", "#1B5E20"),
            ElementType::System => ("#F3E5F5", "#7B1FA2", "#4A148C"),
            ElementType::UserAction => ("#FCE4EC", "#C2185B", "#880E4F"),
        };
        Self {
            background: background.to_owned(),
            border: border.to_owned(),
            text: text.to_owned(),
        }
    }
}

/// Stroke color for an edge, also used for its arrow marker.
pub fn edge_color(connection_type: ConnectionType) -> &'static str {
    match connection_type {
        ConnectionType::DataFlow => "#1976D2",
        ConnectionType::ProcessFlow => "#388E3C",
        ConnectionType::Dependency => "#F57C00",
        ConnectionType::Trigger => "#7B1FA2",
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

impl NodeStyle {
    pub fn for_element(element_type: ElementType) -> Self {
        let kind = NodeKind::for_element(element_type);
        let colors = NodeColors::for_element(element_type);
        let (width, height) = kind.default_size();
        Self {
            background_color: Some(colors.background),
            border_color: Some(colors.border),
            border_radius: Some(kind.default_border_radius().to_owned()),
            color: Some(colors.text),
            font_size: Some(DEFAULT_FONT_SIZE.to_owned()),
            width: Some(width),
            height: Some(height),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    pub label: String,
    pub description: String,
    pub element_type: ElementType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_index: Option<usize>,
    /// Backend id of the stored element this node was loaded from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_id: Option<String>,
    pub colors: NodeColors,
    #[serde(default)]
    pub is_editing: bool,
    #[serde(default)]
    pub show_details: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub position: Position,
    pub data: NodeData,
    #[serde(default)]
    pub style: NodeStyle,
    #[serde(default = "default_true")]
    pub draggable: bool,
    #[serde(default = "default_true")]
    pub selectable: bool,
    #[serde(default = "default_true")]
    pub deletable: bool,
}

impl GraphNode {
    /// A node styled with the palette of `element_type`.
    pub fn new(
        id: impl Into<String>,
        element_type: ElementType,
        position: Position,
        label: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: NodeKind::for_element(element_type),
            position,
            data: NodeData {
                label: label.into(),
                description: description.into(),
                element_type,
                original_index: None,
                element_id: None,
                colors: NodeColors::for_element(element_type),
                is_editing: false,
                show_details: false,
            },
            style: NodeStyle::for_element(element_type),
            draggable: true,
            selectable: true,
            deletable: true,
        }
    }

    pub fn element_type(&self) -> ElementType {
        self.data.element_type
    }

    /// Changes the semantic type, keeping kind and palette in step with it.
    ///
    /// Explicit width/height overrides survive; colors and radius are re-derived.
    pub fn set_element_type(&mut self, element_type: ElementType) {
        let width = self.style.width;
        let height = self.style.height;
        let kind_changed = self.kind != NodeKind::for_element(element_type);

        self.kind = NodeKind::for_element(element_type);
        self.data.element_type = element_type;
        self.data.colors = NodeColors::for_element(element_type);
        self.style = NodeStyle::for_element(element_type);
        if !kind_changed {
            self.style.width = width;
            self.style.height = height;
        }
    }

    pub fn width(&self) -> f64 {
        self.style.width.unwrap_or_else(|| self.kind.default_size().0)
    }

    pub fn height(&self) -> f64 {
        self.style.height.unwrap_or_else(|| self.kind.default_size().1)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EdgeStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    Arrow,
    ArrowClosed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeMarker {
    #[serde(rename = "type")]
    pub kind: MarkerKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeData {
    pub connection_type: ConnectionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_index: Option<usize>,
    /// Backend id of the stored connection this edge was loaded from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_id: Option<String>,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EdgeKind,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub data: EdgeData,
    #[serde(default)]
    pub style: EdgeStyle,
    #[serde(default)]
    pub animated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker_end: Option<EdgeMarker>,
}

impl GraphEdge {
    /// An edge styled for `connection_type`; data-flow edges are animated.
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        connection_type: ConnectionType,
    ) -> Self {
        let color = edge_color(connection_type);
        Self {
            id: id.into(),
            kind: EdgeKind::for_connection(connection_type),
            source: source.into(),
            target: target.into(),
            source_handle: None,
            target_handle: None,
            label: None,
            data: EdgeData {
                connection_type,
                original_index: None,
                connection_id: None,
                color: color.to_owned(),
            },
            style: EdgeStyle {
                stroke: Some(color.to_owned()),
                stroke_width: Some(DEFAULT_STROKE_WIDTH),
            },
            animated: connection_type == ConnectionType::DataFlow,
            marker_end: Some(EdgeMarker {
                kind: MarkerKind::ArrowClosed,
                color: Some(color.to_owned()),
            }),
        }
    }

    pub fn with_label(mut self, label: Option<String>) -> Self {
        self.label = label;
        self
    }

    pub fn connection_type(&self) -> ConnectionType {
        self.data.connection_type
    }

    /// Re-derives kind, colors and animation from a new connection type.
    pub fn set_connection_type(&mut self, connection_type: ConnectionType) {
        let restyled = GraphEdge::new("", "", "", connection_type);
        self.kind = restyled.kind;
        self.data.connection_type = connection_type;
        self.data.color = restyled.data.color;
        self.style = restyled.style;
        self.animated = restyled.animated;
        self.marker_end = restyled.marker_end;
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_nodes_are_square_and_round() {
        let node = GraphNode::new(
            "n1",
            ElementType::Decision,
            Position::new(10.0, 20.0),
            "Approved?",
            "Checks the approval flag",
        );
        assert_eq!(node.kind, NodeKind::DecisionNode);
        assert_eq!((node.width(), node.height()), (120.0, 120.0));
        assert_eq!(node.style.border_radius.as_deref(), Some("50%"));
        assert_eq!(node.data.colors.border, "#F57C00");
    }

    #[test]
    fn changing_element_type_restyles_node() {
        let mut node = GraphNode::new(
            "n1",
            ElementType::Process,
            Position::default(),
            "Step",
            "Step",
        );
        node.set_element_type(ElementType::Decision);

        assert_eq!(node.kind, NodeKind::DecisionNode);
        assert_eq!(node.element_type(), ElementType::Decision);
        assert_eq!(node.data.colors, NodeColors::for_element(ElementType::Decision));
        assert_eq!(node.height(), 120.0);
    }

    #[test]
    fn data_flow_edges_are_animated() {
        let edge = GraphEdge::new("e1", "a", "b", ConnectionType::DataFlow);
        assert!(edge.animated);
        assert_eq!(edge.kind, EdgeKind::DataFlowEdge);
        assert_eq!(edge.style.stroke.as_deref(), Some("#1976D2"));

        let mut edge = edge;
        edge.set_connection_type(ConnectionType::Dependency);
        assert!(!edge.animated);
        assert_eq!(edge.data.color, "#F57C00");
        assert_eq!(edge.id, "e1");
        assert_eq!(edge.source, "a");
    }

    #[test]
    fn node_json_uses_canvas_field_names() {
        let node = GraphNode::new(
            "node-0",
            ElementType::UserAction,
            Position::new(1.0, 2.0),
            "Click",
            "User clicks",
        );
        let json = serde_json::to_value(&node).expect("serialize");
        assert_eq!(json["type"], "userActionNode");
        assert_eq!(json["data"]["elementType"], "user_action");
        assert_eq!(json["data"]["isEditing"], false);
        assert_eq!(json["style"]["backgroundColor"], "#FCE4EC");

        let back: GraphNode = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, node);
    }

    #[test]
    fn edge_marker_serializes_as_arrowclosed() {
        let edge = GraphEdge::new("e", "a", "b", ConnectionType::Trigger);
        let json = serde_json::to_value(&edge).expect("serialize");
        assert_eq!(json["markerEnd"]["type"], "arrowclosed");
        assert_eq!(json["type"], "triggerEdge");
    }
}
