// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Diagrammr-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Diagrammr and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Diagrammr: transcript-to-diagram conversion and a graph editor session.
//!
//! - [`model`]: the AI output, the editable graph and the persistence rows.
//! - [`convert`]: tolerant conversions between them, graph validation and bounds.
//! - [`editor`]: the editing session with selection, drag coalescing and undo/redo.
//! - [`generate`]: contracts for the model provider and the persistence backend.

pub mod convert;
pub mod editor;
pub mod generate;
pub mod model;
