// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Diagrammr-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Diagrammr and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Linear undo/redo history of full graph snapshots.

use chrono::{DateTime, Utc};

use crate::model::{GraphEdge, GraphNode, Viewport};

/// A complete, self-contained copy of the document state; never a diff.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramSnapshot {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub viewport: Viewport,
    pub timestamp: DateTime<Utc>,
    pub action: String,
}

impl DiagramSnapshot {
    pub fn capture(
        nodes: &[GraphNode],
        edges: &[GraphEdge],
        viewport: Viewport,
        action: impl Into<String>,
    ) -> Self {
        Self {
            nodes: nodes.to_vec(),
            edges: edges.to_vec(),
            viewport,
            timestamp: Utc::now(),
            action: action.into(),
        }
    }
}

/// Snapshots plus a cursor.
///
/// Invariants: the cursor is `None` exactly when the history is empty, otherwise it points at a
/// valid entry; the history never holds more than `max_size` entries.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<DiagramSnapshot>,
    cursor: Option<usize>,
    max_size: usize,
}

impl History {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: None,
            max_size: max_size.max(1),
        }
    }

    /// Drops any redo tail, appends `snapshot` and evicts the oldest entries past the cap.
    pub fn push(&mut self, snapshot: DiagramSnapshot) {
        let keep = self.cursor.map_or(0, |cursor| cursor + 1);
        self.entries.truncate(keep);
        self.entries.push(snapshot);

        if self.entries.len() > self.max_size {
            let overflow = self.entries.len() - self.max_size;
            self.entries.drain(..overflow);
        }
        self.cursor = Some(self.entries.len() - 1);
    }

    /// Moves the cursor one entry back and returns the entry it now points at.
    pub fn step_back(&mut self) -> Option<&DiagramSnapshot> {
        match self.cursor {
            Some(cursor) if cursor > 0 => {
                self.cursor = Some(cursor - 1);
                self.entries.get(cursor - 1)
            }
            _ => None,
        }
    }

    /// Moves the cursor one entry forward and returns the entry it now points at.
    pub fn step_forward(&mut self) -> Option<&DiagramSnapshot> {
        match self.cursor {
            Some(cursor) if cursor + 1 < self.entries.len() => {
                self.cursor = Some(cursor + 1);
                self.entries.get(cursor + 1)
            }
            _ => None,
        }
    }

    pub fn can_undo(&self) -> bool {
        matches!(self.cursor, Some(cursor) if cursor > 0)
    }

    pub fn can_redo(&self) -> bool {
        matches!(self.cursor, Some(cursor) if cursor + 1 < self.entries.len())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Cursor as a signed index, `-1` for an empty history.
    pub fn index(&self) -> isize {
        self.cursor.map_or(-1, |cursor| cursor as isize)
    }

    pub fn current(&self) -> Option<&DiagramSnapshot> {
        self.cursor.and_then(|cursor| self.entries.get(cursor))
    }

    pub fn entries(&self) -> &[DiagramSnapshot] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }
}
