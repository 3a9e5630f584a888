// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Diagrammr-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Diagrammr and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Row shapes exchanged with the persistence backend.
//!
//! Records are what we send; `Stored*` are records the backend handed back with their ids.
//! Field names are snake_case to match the backend tables.

use serde::{Deserialize, Serialize};

use super::ai::{ConnectionType, ElementType};
use super::graph::EdgeMarker;
use super::ids::DiagramId;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementStyling {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(rename = "backgroundColor", skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(rename = "borderColor", skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(rename = "borderRadius", skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<String>,
    #[serde(rename = "fontSize", skip_serializing_if = "Option::is_none")]
    pub font_size: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementRecord {
    pub diagram_id: DiagramId,
    pub element_type: ElementType,
    pub position_x: i64,
    pub position_y: i64,
    pub high_level_description: String,
    pub technical_description: String,
    #[serde(default)]
    pub custom_styling: ElementStyling,
    /// 1-based presentation order.
    #[serde(default)]
    pub animation_order: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionStyling {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    #[serde(rename = "strokeWidth", skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animated: Option<bool>,
    #[serde(rename = "markerEnd", skip_serializing_if = "Option::is_none")]
    pub marker_end: Option<EdgeMarker>,
}

/// A connection whose endpoints are element references.
///
/// Before the backend assigns ids the references are `element-<i>` placeholders pointing at the
/// i-th element of the same batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    pub diagram_id: DiagramId,
    pub source_element_id: String,
    pub target_element_id: String,
    pub connection_type: ConnectionType,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub styling: ConnectionStyling,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredElement {
    pub id: String,
    #[serde(flatten)]
    pub record: ElementRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredConnection {
    pub id: String,
    #[serde(flatten)]
    pub record: ConnectionRecord,
}

/// Placeholder element reference used inside a batch that has not been stored yet.
pub fn placeholder_element_id(index: usize) -> String {
    format!("element-{index}")
}
