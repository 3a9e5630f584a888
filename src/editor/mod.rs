// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Diagrammr-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Diagrammr and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Editor session: the graph being edited, its selection, view state and undo history.
//!
//! A [`DiagramEditor`] is an ordinary value owned by whoever drives the canvas. All mutation goes
//! through its methods; every observable change bumps [`DiagramEditor::rev`] so renderers can
//! poll for staleness.
//!
//! History holds full snapshots. Structural edits push a snapshot *after* mutating. When the
//! history is empty the pre-edit state is captured first, so the first edit after
//! [`DiagramEditor::new`] or [`DiagramEditor::clear_history`] can still be undone.

pub mod changes;
pub mod commands;
pub mod history;
pub mod settings;

#[cfg(test)]
mod tests;

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::convert::{graph_to_persistence, PersistenceBatch};
use crate::model::{
    ConnectionType, DiagramId, ElementType, GraphEdge, GraphNode, NodeStyle, Position, Viewport,
};

use changes::{check_new_edge, check_new_node, fresh_id};
pub use changes::{
    apply_edge_changes, apply_node_changes, AppliedChanges, Connection, Dimensions, EdgeChange,
    NodeChange,
};
pub use commands::{EditorCommand, SHORTCUTS};
pub use history::{DiagramSnapshot, History};
pub use settings::{
    CanvasSettings, CanvasSettingsPatch, ConfigError, EditorConfig, EditorSettings,
    EditorSettingsPatch, DEFAULT_MAX_HISTORY_SIZE,
};

const ACTION_LOAD: &str = "Load Diagram";
const ACTION_INITIAL: &str = "Initial State";
const ACTION_MOVE: &str = "Move Nodes";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditorError {
    #[error("node id {id} already exists")]
    DuplicateNodeId { id: String },
    #[error("edge id {id} already exists")]
    DuplicateEdgeId { id: String },
    #[error("edge {edge} references unknown node {node}")]
    UnknownNode { edge: String, node: String },
    #[error("edge {edge} connects node {node} to itself")]
    SelfLoop { edge: String, node: String },
    #[error("no diagram id set for this session")]
    MissingDiagramId,
}

/// Lifecycle of one editing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionStatus {
    /// Nothing loaded and nothing edited.
    Empty,
    /// Loaded and untouched since.
    Loaded,
    /// Has changes the backend has not seen.
    Dirty,
    /// Everything written; see [`DiagramEditor::mark_saved`].
    Saved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging,
}

/// Attribute update for a node. `None` leaves the field alone.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodePatch {
    pub label: Option<String>,
    pub description: Option<String>,
    pub position: Option<Position>,
    pub element_type: Option<ElementType>,
    pub style: Option<NodeStyle>,
    pub is_editing: Option<bool>,
    pub show_details: Option<bool>,
}

impl NodePatch {
    fn apply(&self, node: &mut GraphNode) {
        if let Some(element_type) = self.element_type {
            node.set_element_type(element_type);
        }
        if let Some(label) = &self.label {
            node.data.label = label.clone();
        }
        if let Some(description) = &self.description {
            node.data.description = description.clone();
        }
        if let Some(position) = self.position {
            node.position = position;
        }
        if let Some(style) = &self.style {
            node.style = style.clone();
        }
        if let Some(is_editing) = self.is_editing {
            node.data.is_editing = is_editing;
        }
        if let Some(show_details) = self.show_details {
            node.data.show_details = show_details;
        }
    }
}

/// Attribute update for an edge. `label: Some(None)` clears the label.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EdgePatch {
    pub label: Option<Option<String>>,
    pub connection_type: Option<ConnectionType>,
    pub animated: Option<bool>,
}

impl EdgePatch {
    fn apply(&self, edge: &mut GraphEdge) {
        if let Some(connection_type) = self.connection_type {
            edge.set_connection_type(connection_type);
        }
        if let Some(label) = &self.label {
            edge.label = label.clone();
        }
        if let Some(animated) = self.animated {
            edge.animated = animated;
        }
    }
}

#[derive(Debug, Clone)]
pub struct DiagramEditor {
    config: EditorConfig,
    diagram_id: Option<DiagramId>,
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    viewport: Viewport,
    canvas_settings: CanvasSettings,
    editor_settings: EditorSettings,
    selected_nodes: Vec<String>,
    selected_edges: Vec<String>,
    drag: DragState,
    loaded: bool,
    saved_since_load: bool,
    has_unsaved_changes: bool,
    last_saved: Option<DateTime<Utc>>,
    is_loading: bool,
    is_saving: bool,
    history: History,
    rev: u64,
}

impl Default for DiagramEditor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl DiagramEditor {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            diagram_id: None,
            nodes: Vec::new(),
            edges: Vec::new(),
            viewport: Viewport::default(),
            canvas_settings: config.canvas.clone(),
            editor_settings: config.editor.clone(),
            selected_nodes: Vec::new(),
            selected_edges: Vec::new(),
            drag: DragState::Idle,
            loaded: false,
            saved_since_load: false,
            has_unsaved_changes: false,
            last_saved: None,
            is_loading: false,
            is_saving: false,
            history: History::new(config.max_history_size),
            rev: 0,
            config,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn diagram_id(&self) -> Option<&DiagramId> {
        self.diagram_id.as_ref()
    }

    pub fn set_diagram_id(&mut self, diagram_id: DiagramId) {
        self.diagram_id = Some(diagram_id);
        self.bump_rev();
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&GraphEdge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn canvas_settings(&self) -> &CanvasSettings {
        &self.canvas_settings
    }

    pub fn editor_settings(&self) -> &EditorSettings {
        &self.editor_settings
    }

    pub fn selected_nodes(&self) -> &[String] {
        &self.selected_nodes
    }

    pub fn selected_edges(&self) -> &[String] {
        &self.selected_edges
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.has_unsaved_changes
    }

    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        self.last_saved
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn is_saving(&self) -> bool {
        self.is_saving
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn rev(&self) -> u64 {
        self.rev
    }

    fn bump_rev(&mut self) {
        self.rev = self.rev.saturating_add(1);
    }

    /// Replaces the whole graph and starts a fresh history at this point.
    ///
    /// Canvas settings go back to the configured baseline before `settings` is merged in;
    /// editor settings are user preferences and survive the load.
    pub fn load_diagram(
        &mut self,
        nodes: Vec<GraphNode>,
        edges: Vec<GraphEdge>,
        settings: Option<&CanvasSettingsPatch>,
    ) {
        self.nodes = nodes;
        self.edges = edges;
        self.selected_nodes.clear();
        self.selected_edges.clear();
        self.drag = DragState::Idle;
        self.canvas_settings = self.config.canvas.clone();
        if let Some(patch) = settings {
            self.canvas_settings.apply(patch);
        }

        self.loaded = true;
        self.saved_since_load = false;
        self.has_unsaved_changes = false;
        self.last_saved = Some(Utc::now());

        self.history.clear();
        self.push_history(ACTION_LOAD);
        tracing::debug!(
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            "diagram loaded"
        );
        self.bump_rev();
    }

    /// Inserts `node`, assigning a fresh `node-<uuid>` id when its id is empty.
    pub fn add_node(&mut self, mut node: GraphNode) -> Result<String, EditorError> {
        if node.id.is_empty() {
            node.id = fresh_id("node");
        }
        check_new_node(&self.nodes, &node)?;

        let id = node.id.clone();
        self.ensure_baseline();
        self.nodes.push(node);
        self.commit("Add Node");
        Ok(id)
    }

    /// Attribute update; not recorded in history. Returns `false` for an unknown id.
    pub fn update_node(&mut self, id: &str, patch: &NodePatch) -> bool {
        let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) else {
            return false;
        };
        patch.apply(node);
        self.has_unsaved_changes = true;
        self.bump_rev();
        true
    }

    pub fn delete_node(&mut self, id: &str) -> bool {
        self.remove_elements(&[id], &[] as &[&str], "Delete Node")
    }

    /// Removes the nodes and every edge attached to them. Returns `false` if none of the ids
    /// exist, in which case nothing is recorded.
    pub fn delete_nodes<S: AsRef<str>>(&mut self, ids: &[S]) -> bool {
        self.remove_elements(ids, &[] as &[&str], "Delete Nodes")
    }

    /// Inserts `edge`, assigning a fresh `edge-<uuid>` id when its id is empty.
    pub fn add_edge(&mut self, mut edge: GraphEdge) -> Result<String, EditorError> {
        if edge.id.is_empty() {
            edge.id = fresh_id("edge");
        }
        check_new_edge(&self.nodes, &self.edges, &edge)?;

        let id = edge.id.clone();
        self.ensure_baseline();
        self.edges.push(edge);
        self.commit("Add Edge");
        Ok(id)
    }

    pub fn update_edge(&mut self, id: &str, patch: &EdgePatch) -> bool {
        let Some(edge) = self.edges.iter_mut().find(|e| e.id == id) else {
            return false;
        };
        patch.apply(edge);
        self.has_unsaved_changes = true;
        self.bump_rev();
        true
    }

    pub fn delete_edge(&mut self, id: &str) -> bool {
        self.remove_elements(&[] as &[&str], &[id], "Delete Edge")
    }

    pub fn delete_edges<S: AsRef<str>>(&mut self, ids: &[S]) -> bool {
        self.remove_elements(&[] as &[&str], ids, "Delete Edges")
    }

    /// Deletes the current selection (nodes with their edges, plus selected edges) as one step.
    pub fn delete_selected(&mut self) -> bool {
        let nodes = std::mem::take(&mut self.selected_nodes);
        let edges = std::mem::take(&mut self.selected_edges);
        let removed =
            self.remove_elements(nodes.as_slice(), edges.as_slice(), "Delete Selection");
        if !removed {
            self.selected_nodes = nodes;
            self.selected_edges = edges;
        }
        removed
    }

    fn remove_elements<N: AsRef<str>, E: AsRef<str>>(
        &mut self,
        node_ids: &[N],
        edge_ids: &[E],
        action: &str,
    ) -> bool {
        let node_ids: HashSet<&str> = node_ids
            .iter()
            .map(|id| id.as_ref())
            .filter(|id| self.node(id).is_some())
            .collect();
        let edge_ids: HashSet<&str> = edge_ids
            .iter()
            .map(|id| id.as_ref())
            .filter(|id| self.edge(id).is_some())
            .collect();
        if node_ids.is_empty() && edge_ids.is_empty() {
            return false;
        }

        self.ensure_baseline();
        self.nodes.retain(|n| !node_ids.contains(n.id.as_str()));
        self.edges.retain(|e| {
            !edge_ids.contains(e.id.as_str())
                && !node_ids.contains(e.source.as_str())
                && !node_ids.contains(e.target.as_str())
        });
        self.prune_selection();
        self.commit(action);
        true
    }

    /// Applies a batch of canvas node changes.
    ///
    /// Drag frames (`dragging: true`) move nodes without touching history; the first batch
    /// without one ends the gesture and records a single "Move Nodes" step. Inserts, replacements
    /// and removals are one history step per batch, and removals cascade to attached edges.
    /// Dimension reports from the canvas do not dirty the session.
    pub fn on_nodes_change(&mut self, changes: &[NodeChange]) {
        let drag_frame = changes.iter().any(NodeChange::is_drag_frame);
        if drag_frame && self.drag == DragState::Idle {
            self.ensure_baseline();
            self.drag = DragState::Dragging;
            tracing::trace!("drag started");
        }

        for change in changes {
            if let NodeChange::Select { id, selected } = change {
                self.route_node_selection(id, *selected);
            }
        }

        if changes.iter().any(NodeChange::edits_document) {
            if changes.iter().any(NodeChange::is_structural) {
                self.ensure_baseline();
            }
            let applied = apply_node_changes(changes, &mut self.nodes);
            if !applied.removed.is_empty() {
                let removed = &applied.removed;
                self.edges.retain(|e| !removed.iter().any(|id| e.touches(id)));
                self.prune_selection();
            }
            if applied.is_structural() {
                if !drag_frame && self.drag == DragState::Dragging {
                    self.drag = DragState::Idle;
                    tracing::trace!("drag ended");
                }
                self.commit(applied.action("Delete Nodes", "Add Nodes", "Edit Nodes"));
                return;
            }
            if changes.iter().any(moves_node) {
                self.has_unsaved_changes = true;
            }
        }

        if !drag_frame && self.drag == DragState::Dragging {
            self.finish_drag();
        }
        self.bump_rev();
    }

    /// Ends an in-progress drag gesture; no-op when idle.
    pub fn end_drag(&mut self) -> bool {
        if self.drag == DragState::Idle {
            return false;
        }
        self.finish_drag();
        self.bump_rev();
        true
    }

    fn finish_drag(&mut self) {
        self.drag = DragState::Idle;
        tracing::trace!("drag ended");
        self.push_history(ACTION_MOVE);
    }

    /// Applies a batch of canvas edge changes; any insert, replacement or removal that lands is
    /// one history step. Edges that would dangle, loop or reuse an id are skipped.
    pub fn on_edges_change(&mut self, changes: &[EdgeChange]) {
        for change in changes {
            if let EdgeChange::Select { id, selected } = change {
                self.route_edge_selection(id, *selected);
            }
        }
        if changes.iter().any(EdgeChange::edits_document) {
            self.ensure_baseline();
            let applied = apply_edge_changes(changes, &mut self.edges, &self.nodes);
            if applied.is_structural() {
                self.prune_selection();
                self.commit(applied.action("Delete Edges", "Add Edges", "Edit Edges"));
                return;
            }
        }
        self.bump_rev();
    }

    /// Adds a process-flow edge for a link drawn on the canvas and returns its id.
    ///
    /// Links to unknown nodes, self-links and exact duplicates (same endpoints and handles) are
    /// refused with `None`.
    pub fn on_connect(&mut self, connection: Connection) -> Option<String> {
        let endpoints_known =
            self.node(&connection.source).is_some() && self.node(&connection.target).is_some();
        let rejection = if !endpoints_known {
            Some("unknown endpoint")
        } else if connection.source == connection.target {
            Some("self-loop")
        } else if self.edges.iter().any(|e| connection.matches(e)) {
            Some("duplicate")
        } else {
            None
        };
        if let Some(reason) = rejection {
            tracing::warn!(
                source = %connection.source,
                target = %connection.target,
                reason,
                "connection refused"
            );
            return None;
        }

        let id = fresh_id("edge");
        let mut edge = GraphEdge::new(
            id.clone(),
            connection.source,
            connection.target,
            ConnectionType::ProcessFlow,
        );
        edge.source_handle = connection.source_handle;
        edge.target_handle = connection.target_handle;

        self.ensure_baseline();
        self.edges.push(edge);
        self.commit("Connect Nodes");
        Some(id)
    }

    /// Selects the given nodes and clears any edge selection. Unknown ids are ignored.
    pub fn select_nodes<S: AsRef<str>>(&mut self, ids: &[S]) {
        self.selected_nodes = self.known_ids(ids, |editor, id| editor.node(id).is_some());
        self.selected_edges.clear();
        self.bump_rev();
    }

    /// Selects the given edges and clears any node selection. Unknown ids are ignored.
    pub fn select_edges<S: AsRef<str>>(&mut self, ids: &[S]) {
        self.selected_edges = self.known_ids(ids, |editor, id| editor.edge(id).is_some());
        self.selected_nodes.clear();
        self.bump_rev();
    }

    pub fn clear_selection(&mut self) {
        self.selected_nodes.clear();
        self.selected_edges.clear();
        self.bump_rev();
    }

    /// Selects every node and every edge.
    pub fn select_all(&mut self) {
        self.selected_nodes = self.nodes.iter().map(|n| n.id.clone()).collect();
        self.selected_edges = self.edges.iter().map(|e| e.id.clone()).collect();
        self.bump_rev();
    }

    fn known_ids<S: AsRef<str>>(
        &self,
        ids: &[S],
        exists: impl Fn(&Self, &str) -> bool,
    ) -> Vec<String> {
        let mut seen = HashSet::new();
        ids.iter()
            .map(|id| id.as_ref())
            .filter(|id| exists(self, *id) && seen.insert(*id))
            .map(str::to_owned)
            .collect()
    }

    fn route_node_selection(&mut self, id: &str, selected: bool) {
        if !selected {
            self.selected_nodes.retain(|n| n != id);
        } else if self.node(id).is_some() {
            self.selected_edges.clear();
            if !self.selected_nodes.iter().any(|n| n == id) {
                self.selected_nodes.push(id.to_owned());
            }
        }
    }

    fn route_edge_selection(&mut self, id: &str, selected: bool) {
        if !selected {
            self.selected_edges.retain(|e| e != id);
        } else if self.edge(id).is_some() {
            self.selected_nodes.clear();
            if !self.selected_edges.iter().any(|e| e == id) {
                self.selected_edges.push(id.to_owned());
            }
        }
    }

    fn prune_selection(&mut self) {
        let nodes: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        let edges: HashSet<&str> = self.edges.iter().map(|e| e.id.as_str()).collect();
        self.selected_nodes.retain(|id| nodes.contains(id.as_str()));
        self.selected_edges.retain(|id| edges.contains(id.as_str()));
    }

    /// Pan/zoom change from the canvas; mirrored into the canvas settings, never undoable.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.canvas_settings.follow_viewport(&viewport);
        self.bump_rev();
    }

    pub fn update_canvas_settings(&mut self, patch: &CanvasSettingsPatch) {
        self.canvas_settings.apply(patch);
        self.bump_rev();
    }

    pub fn update_editor_settings(&mut self, patch: &EditorSettingsPatch) {
        self.editor_settings.apply(patch);
        self.bump_rev();
    }

    /// Records the current graph and viewport as a new history step labelled `action`.
    pub fn save_to_history(&mut self, action: &str) {
        self.push_history(action);
        self.bump_rev();
    }

    fn push_history(&mut self, action: &str) {
        self.history.push(DiagramSnapshot::capture(
            &self.nodes,
            &self.edges,
            self.viewport,
            action,
        ));
        tracing::debug!(
            action,
            index = self.history.index(),
            len = self.history.len(),
            "history snapshot"
        );
    }

    fn ensure_baseline(&mut self) {
        if self.history.is_empty() {
            self.push_history(ACTION_INITIAL);
        }
    }

    fn commit(&mut self, action: &str) {
        self.has_unsaved_changes = true;
        self.push_history(action);
        self.bump_rev();
    }

    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.step_back().cloned() else {
            return false;
        };
        tracing::debug!(index = self.history.index(), "undo");
        self.restore(snapshot);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.step_forward().cloned() else {
            return false;
        };
        tracing::debug!(index = self.history.index(), "redo");
        self.restore(snapshot);
        true
    }

    fn restore(&mut self, snapshot: DiagramSnapshot) {
        self.nodes = snapshot.nodes;
        self.edges = snapshot.edges;
        self.viewport = snapshot.viewport;
        self.canvas_settings.follow_viewport(&snapshot.viewport);
        self.drag = DragState::Idle;
        self.prune_selection();
        self.has_unsaved_changes = true;
        self.bump_rev();
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.bump_rev();
    }

    /// Records that the backend now holds the current graph.
    pub fn mark_saved(&mut self) {
        self.has_unsaved_changes = false;
        self.saved_since_load = true;
        self.last_saved = Some(Utc::now());
        self.bump_rev();
    }

    pub fn mark_unsaved(&mut self) {
        self.has_unsaved_changes = true;
        self.bump_rev();
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
        self.bump_rev();
    }

    pub fn set_saving(&mut self, saving: bool) {
        self.is_saving = saving;
        self.bump_rev();
    }

    pub fn status(&self) -> SessionStatus {
        if self.has_unsaved_changes {
            SessionStatus::Dirty
        } else if !self.loaded {
            SessionStatus::Empty
        } else if self.saved_since_load {
            SessionStatus::Saved
        } else {
            SessionStatus::Loaded
        }
    }

    /// Returns to a brand-new session built from the same config. `rev` keeps counting.
    pub fn reset(&mut self) {
        let rev = self.rev;
        *self = Self::new(self.config.clone());
        self.rev = rev;
        self.bump_rev();
    }

    /// Runs a keyboard command. Mutating commands are ignored when `read_only`.
    ///
    /// Returns whether the command changed anything.
    pub fn execute(&mut self, command: EditorCommand, read_only: bool) -> bool {
        if read_only && command.is_mutating() {
            tracing::debug!(%command, "ignored in read-only mode");
            return false;
        }
        match command {
            EditorCommand::Undo => self.undo(),
            EditorCommand::Redo => self.redo(),
            EditorCommand::DeleteSelected => self.delete_selected(),
            EditorCommand::SelectAll => {
                self.select_all();
                true
            }
            EditorCommand::ClearSelection => {
                let had_selection =
                    !self.selected_nodes.is_empty() || !self.selected_edges.is_empty();
                self.clear_selection();
                had_selection
            }
        }
    }

    /// Current graph shaped for the backend of this session's diagram.
    pub fn persistence_batch(&self) -> Result<PersistenceBatch, EditorError> {
        let diagram_id = self
            .diagram_id
            .as_ref()
            .ok_or(EditorError::MissingDiagramId)?;
        Ok(graph_to_persistence(&self.nodes, &self.edges, diagram_id))
    }
}

fn moves_node(change: &NodeChange) -> bool {
    matches!(
        change,
        NodeChange::Position {
            position: Some(_),
            ..
        }
    )
}
