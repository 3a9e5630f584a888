// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Diagrammr-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Diagrammr and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Structured diagram output produced by the AI model, and the validation boundary it must pass
//! before it is allowed anywhere near the graph model.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const MAX_TITLE_CHARS: usize = 255;
pub const MAX_ELEMENTS: usize = 25;
pub const MAX_HIGH_LEVEL_CHARS: usize = 255;
pub const MAX_TECHNICAL_CHARS: usize = 2000;
pub const MAX_CONNECTION_LABEL_CHARS: usize = 100;
pub const MAX_COORDINATE: f64 = 2000.0;

/// Semantic kind of a diagram element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    Process,
    Decision,
    Data,
    System,
    UserAction,
}

impl ElementType {
    pub const ALL: [Self; 5] = [
        Self::Process,
        Self::Decision,
        Self::Data,
        Self::System,
        Self::UserAction,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Process => "process",
            Self::Decision => "decision",
            Self::Data => "data",
            Self::System => "system",
            Self::UserAction => "user_action",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Semantic kind of a directed connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionType {
    DataFlow,
    ProcessFlow,
    Dependency,
    Trigger,
}

impl ConnectionType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DataFlow => "data_flow",
            Self::ProcessFlow => "process_flow",
            Self::Dependency => "dependency",
            Self::Trigger => "trigger",
        }
    }
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canvas coordinates as emitted by the model (bounded to the 2000x2000 drawing area).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ElementPosition {
    #[schemars(range(min = 0, max = 2000))]
    pub x: f64,
    #[schemars(range(min = 0, max = 2000))]
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DiagramElement {
    #[serde(rename = "type")]
    pub element_type: ElementType,
    pub position: ElementPosition,
    /// Client-friendly description of what this element does.
    #[schemars(length(min = 1, max = 255))]
    pub high_level_description: String,
    /// Detailed technical explanation for developers.
    #[schemars(length(min = 1, max = 2000))]
    pub technical_description: String,
}

/// A connection between two elements, addressed by their position in `elements`.
///
/// Indices are signed on the wire so that a negative index becomes a validation violation
/// instead of an opaque parse error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DiagramConnection {
    #[schemars(range(min = 0))]
    pub source_element_index: i64,
    #[schemars(range(min = 0))]
    pub target_element_index: i64,
    pub connection_type: ConnectionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(length(max = 100))]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct AiGeneratedDiagram {
    /// Professional title for the technical diagram.
    #[schemars(length(min = 1, max = 255))]
    pub title: String,
    #[schemars(length(min = 1, max = 25))]
    pub elements: Vec<DiagramElement>,
    pub connections: Vec<DiagramConnection>,
}

impl AiGeneratedDiagram {
    /// Checks every bound the structured-output schema promises plus the index rules the schema
    /// cannot express. All violations are collected; nothing is accepted partially.
    pub fn validate(&self) -> Result<(), AiValidationError> {
        let mut violations = Vec::new();

        let title_chars = self.title.chars().count();
        if title_chars == 0 || title_chars > MAX_TITLE_CHARS {
            violations.push(AiViolation::TitleLength { chars: title_chars });
        }

        let element_count = self.elements.len();
        if element_count == 0 || element_count > MAX_ELEMENTS {
            violations.push(AiViolation::ElementCount {
                count: element_count,
            });
        }

        for (element, el) in self.elements.iter().enumerate() {
            for (axis, value) in [('x', el.position.x), ('y', el.position.y)] {
                if !(0.0..=MAX_COORDINATE).contains(&value) {
                    violations.push(AiViolation::CoordinateOutOfRange {
                        element,
                        axis,
                        value,
                    });
                }
            }

            let chars = el.high_level_description.chars().count();
            if chars == 0 || chars > MAX_HIGH_LEVEL_CHARS {
                violations.push(AiViolation::HighLevelDescriptionLength { element, chars });
            }

            let chars = el.technical_description.chars().count();
            if chars == 0 || chars > MAX_TECHNICAL_CHARS {
                violations.push(AiViolation::TechnicalDescriptionLength { element, chars });
            }
        }

        let in_range = |index: i64| usize::try_from(index).is_ok_and(|i| i < element_count);
        for (connection, conn) in self.connections.iter().enumerate() {
            if !in_range(conn.source_element_index) {
                violations.push(AiViolation::SourceIndexOutOfRange {
                    connection,
                    index: conn.source_element_index,
                    element_count,
                });
            }
            if !in_range(conn.target_element_index) {
                violations.push(AiViolation::TargetIndexOutOfRange {
                    connection,
                    index: conn.target_element_index,
                    element_count,
                });
            }
            if conn.source_element_index == conn.target_element_index {
                violations.push(AiViolation::SelfLoop {
                    connection,
                    index: conn.source_element_index,
                });
            }
            if let Some(label) = &conn.label {
                let chars = label.chars().count();
                if chars > MAX_CONNECTION_LABEL_CHARS {
                    violations.push(AiViolation::LabelLength { connection, chars });
                }
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(AiValidationError { violations })
        }
    }
}

/// One broken rule in an AI response.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AiViolation {
    #[error("title must be 1..=255 characters (got {chars})")]
    TitleLength { chars: usize },
    #[error("diagram must have 1..=25 elements (got {count})")]
    ElementCount { count: usize },
    #[error("element {element}: {axis} coordinate {value} outside [0, 2000]")]
    CoordinateOutOfRange {
        element: usize,
        axis: char,
        value: f64,
    },
    #[error("element {element}: high-level description must be 1..=255 characters (got {chars})")]
    HighLevelDescriptionLength { element: usize, chars: usize },
    #[error("element {element}: technical description must be 1..=2000 characters (got {chars})")]
    TechnicalDescriptionLength { element: usize, chars: usize },
    #[error("connection {connection}: source index {index} outside 0..{element_count}")]
    SourceIndexOutOfRange {
        connection: usize,
        index: i64,
        element_count: usize,
    },
    #[error("connection {connection}: target index {index} outside 0..{element_count}")]
    TargetIndexOutOfRange {
        connection: usize,
        index: i64,
        element_count: usize,
    },
    #[error("connection {connection}: self-referencing connection ({index} -> {index})")]
    SelfLoop { connection: usize, index: i64 },
    #[error("connection {connection}: label must be at most 100 characters (got {chars})")]
    LabelLength { connection: usize, chars: usize },
}

/// Aggregated validation failure; lists every violation found.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("AI response validation failed: {}", join_violations(.violations))]
pub struct AiValidationError {
    pub violations: Vec<AiViolation>,
}

fn join_violations(violations: &[AiViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, thiserror::Error)]
pub enum AiResponseError {
    #[error("AI response is not valid diagram JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] AiValidationError),
}

/// Parses a raw model response and runs it through [`AiGeneratedDiagram::validate`].
pub fn parse_ai_response(raw: &str) -> Result<AiGeneratedDiagram, AiResponseError> {
    let diagram: AiGeneratedDiagram = serde_json::from_str(raw)?;
    tracing::debug!(
        elements = diagram.elements.len(),
        connections = diagram.connections.len(),
        "validating AI response"
    );
    if let Err(err) = diagram.validate() {
        tracing::warn!(violations = err.violations.len(), "AI response rejected");
        return Err(err.into());
    }
    Ok(diagram)
}

/// JSON schema handed to the model provider as the structured-output contract.
pub fn structured_output_schema() -> serde_json::Value {
    schemars::schema_for!(AiGeneratedDiagram).to_value()
}
