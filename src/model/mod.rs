// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Diagrammr-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Diagrammr and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! Three shapes of the same diagram: the AI's flat index-addressed output, the editable graph the
//! canvas renders, and the row records the persistence backend stores.

pub mod ai;
pub mod graph;
pub mod ids;
pub mod persistence;

pub use ai::{
    parse_ai_response, structured_output_schema, AiGeneratedDiagram, AiResponseError,
    AiValidationError, AiViolation, ConnectionType, DiagramConnection, DiagramElement,
    ElementPosition, ElementType,
};
pub use graph::{
    edge_color, EdgeData, EdgeKind, EdgeMarker, EdgeStyle, GraphEdge, GraphNode, MarkerKind,
    NodeColors, NodeData, NodeKind, NodeStyle, Position, Viewport,
};
pub use ids::{DiagramId, Id, IdError, UserId};
pub use persistence::{
    placeholder_element_id, ConnectionRecord, ConnectionStyling, ElementRecord, ElementStyling,
    StoredConnection, StoredElement,
};
