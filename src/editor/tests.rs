// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Diagrammr-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Diagrammr and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use rstest::{fixture, rstest};

use crate::convert::validate_graph;
use crate::model::{
    ConnectionType, DiagramId, ElementType, GraphEdge, GraphNode, Position, Viewport,
};

use super::{
    CanvasSettingsPatch, Connection, Dimensions, DiagramEditor, DragState, EdgeChange, EdgePatch,
    EditorCommand, EditorConfig, EditorError, NodeChange, NodePatch, SessionStatus,
};

fn node(id: &str, x: f64) -> GraphNode {
    GraphNode::new(
        id,
        ElementType::Process,
        Position::new(x, 0.0),
        id.to_uppercase(),
        "",
    )
}

fn edge(id: &str, source: &str, target: &str) -> GraphEdge {
    GraphEdge::new(id, source, target, ConnectionType::ProcessFlow)
}

fn drag_frame(id: &str, x: f64, dragging: Option<bool>) -> NodeChange {
    NodeChange::Position {
        id: id.to_owned(),
        position: Some(Position::new(x, x)),
        dragging,
    }
}

fn last_action(editor: &DiagramEditor) -> Option<&str> {
    editor.history().current().map(|s| s.action.as_str())
}

/// `a -> b -> c` plus a shortcut `a -> c`, freshly loaded.
#[fixture]
fn editor() -> DiagramEditor {
    let mut editor = DiagramEditor::default();
    editor.load_diagram(
        vec![node("a", 0.0), node("b", 250.0), node("c", 500.0)],
        vec![edge("e1", "a", "b"), edge("e2", "b", "c"), edge("e3", "a", "c")],
        None,
    );
    editor
}

#[rstest]
#[case("a")]
#[case("b")]
#[case("c")]
fn deleting_a_node_removes_every_attached_edge(mut editor: DiagramEditor, #[case] id: &str) {
    assert!(editor.delete_node(id));

    assert!(editor.node(id).is_none());
    assert_eq!(editor.nodes().len(), 2);
    assert!(editor.edges().iter().all(|e| !e.touches(id)));
    assert_eq!(editor.edges().len(), 1);
    assert_eq!(last_action(&editor), Some("Delete Node"));
}

#[rstest]
fn deleting_nodes_prunes_selection(mut editor: DiagramEditor) {
    editor.select_nodes(&["b", "a"]);
    assert!(editor.delete_nodes(&["a", "missing"]));

    assert_eq!(editor.selected_nodes(), ["b"]);
    let ids: Vec<&str> = editor.edges().iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, ["e2"]);
    assert_eq!(last_action(&editor), Some("Delete Nodes"));
}

#[rstest]
fn deleting_unknown_ids_records_nothing(mut editor: DiagramEditor) {
    let rev = editor.rev();
    assert!(!editor.delete_node("missing"));
    assert!(!editor.delete_edges(&["nope"]));
    assert_eq!(editor.history().len(), 1);
    assert_eq!(editor.status(), SessionStatus::Loaded);
    assert_eq!(editor.rev(), rev);
}

#[rstest]
fn deleting_an_edge_leaves_nodes_alone(mut editor: DiagramEditor) {
    editor.select_edges(&["e2", "e3"]);
    assert!(editor.delete_edge("e2"));

    assert_eq!(editor.nodes().len(), 3);
    assert_eq!(editor.edges().len(), 2);
    assert_eq!(editor.selected_edges(), ["e3"]);
    assert_eq!(last_action(&editor), Some("Delete Edge"));
}

#[rstest]
fn undo_and_redo_are_inverse(mut editor: DiagramEditor) {
    let snapshot = |editor: &DiagramEditor| {
        (
            editor.nodes().to_vec(),
            editor.edges().to_vec(),
            editor.viewport(),
        )
    };
    let mut states = vec![snapshot(&editor)];

    editor.add_node(node("d", 750.0)).expect("add node");
    states.push(snapshot(&editor));
    editor
        .add_edge(GraphEdge::new("e4", "c", "d", ConnectionType::DataFlow))
        .expect("add edge");
    states.push(snapshot(&editor));
    assert!(editor.delete_node("b"));
    states.push(snapshot(&editor));
    editor.on_connect(Connection::new("d", "a")).expect("connect");
    states.push(snapshot(&editor));

    for expected in states.iter().rev().skip(1) {
        assert!(editor.undo());
        assert_eq!(&snapshot(&editor), expected);
    }
    assert!(!editor.undo());
    assert!(!editor.can_undo());

    for expected in states.iter().skip(1) {
        assert!(editor.redo());
        assert_eq!(&snapshot(&editor), expected);
    }
    assert!(!editor.redo());
    assert!(!editor.can_redo());
}

#[rstest]
fn restored_state_does_not_alias_history(mut editor: DiagramEditor) {
    editor.add_node(node("d", 750.0)).expect("add node");
    assert!(editor.undo());

    let patch = NodePatch {
        label: Some("Renamed".to_owned()),
        ..NodePatch::default()
    };
    assert!(editor.update_node("a", &patch));
    assert_eq!(editor.history().entries()[0].nodes[0].data.label, "A");

    assert!(editor.redo());
    assert_eq!(editor.node("a").map(|n| n.data.label.as_str()), Some("A"));
    assert!(editor.node("d").is_some());
}

#[rstest]
fn a_new_edit_discards_the_redo_tail(mut editor: DiagramEditor) {
    editor.add_node(node("d", 750.0)).expect("add node");
    assert!(editor.undo());
    assert!(editor.can_redo());

    assert!(editor.delete_edge("e3"));
    assert!(!editor.can_redo());
    assert!(editor.node("d").is_none());
    assert_eq!(editor.history().len(), 2);
}

#[rstest]
#[case(1)]
#[case(3)]
#[case(5)]
fn history_never_exceeds_its_cap(#[case] max_history_size: usize) {
    let mut editor = DiagramEditor::new(EditorConfig {
        max_history_size,
        ..EditorConfig::default()
    });
    editor.load_diagram(vec![node("a", 0.0)], Vec::new(), None);

    for i in 0..12 {
        editor
            .add_node(node(&format!("n{i}"), i as f64))
            .expect("add node");
        let history = editor.history();
        assert!(history.len() <= max_history_size);
        assert_eq!(history.cursor(), Some(history.len() - 1));
        assert_eq!(editor.can_undo(), history.len() > 1);
        assert!(!editor.can_redo());
    }

    let mut undos = 0;
    while editor.undo() {
        undos += 1;
        let history = editor.history();
        assert_eq!(editor.can_undo(), history.index() > 0);
        assert!(editor.can_redo());
    }
    assert_eq!(undos, max_history_size - 1);
}

#[rstest]
#[case(1)]
#[case(4)]
#[case(25)]
fn a_drag_gesture_is_one_history_step(mut editor: DiagramEditor, #[case] frames: usize) {
    let before = editor.history().len();

    for frame in 0..frames {
        editor.on_nodes_change(&[drag_frame("a", frame as f64, Some(true))]);
        assert_eq!(editor.drag_state(), DragState::Dragging);
        assert_eq!(editor.history().len(), before);
    }
    editor.on_nodes_change(&[drag_frame("a", 999.0, Some(false))]);

    assert_eq!(editor.drag_state(), DragState::Idle);
    assert_eq!(editor.history().len(), before + 1);
    assert_eq!(last_action(&editor), Some("Move Nodes"));
    assert_eq!(
        editor.node("a").map(|n| n.position),
        Some(Position::new(999.0, 999.0))
    );
    assert_eq!(editor.status(), SessionStatus::Dirty);

    assert!(editor.undo());
    assert_eq!(
        editor.node("a").map(|n| n.position),
        Some(Position::new(0.0, 0.0))
    );
}

#[rstest]
fn a_batch_without_drag_frames_ends_the_drag(mut editor: DiagramEditor) {
    editor.on_nodes_change(&[drag_frame("b", 10.0, Some(true))]);
    editor.on_nodes_change(&[NodeChange::Select {
        id: "b".to_owned(),
        selected: true,
    }]);

    assert_eq!(editor.drag_state(), DragState::Idle);
    assert_eq!(editor.history().len(), 2);
    assert_eq!(editor.selected_nodes(), ["b"]);
}

#[rstest]
fn end_drag_commits_an_open_gesture_once(mut editor: DiagramEditor) {
    assert!(!editor.end_drag());

    editor.on_nodes_change(&[
        drag_frame("c", 1.0, Some(true)),
        drag_frame("b", 2.0, Some(true)),
    ]);
    assert!(editor.end_drag());
    assert!(!editor.end_drag());
    assert_eq!(editor.history().len(), 2);
}

#[test]
fn the_first_drag_on_an_unloaded_editor_is_undoable() {
    let mut editor = DiagramEditor::default();
    editor.add_node(node("a", 0.0)).expect("add node");
    editor.clear_history();

    editor.on_nodes_change(&[drag_frame("a", 40.0, Some(true))]);
    editor.on_nodes_change(&[drag_frame("a", 50.0, Some(false))]);

    assert!(editor.undo());
    assert_eq!(
        editor.node("a").map(|n| n.position),
        Some(Position::new(0.0, 0.0))
    );
}

#[rstest]
fn canvas_removals_cascade_and_can_be_undone(mut editor: DiagramEditor) {
    editor.select_nodes(&["a"]);
    editor.on_nodes_change(&[NodeChange::Remove {
        id: "a".to_owned(),
    }]);

    assert!(editor.node("a").is_none());
    let ids: Vec<&str> = editor.edges().iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, ["e2"]);
    assert!(editor.selected_nodes().is_empty());
    assert_eq!(last_action(&editor), Some("Delete Nodes"));
    assert_eq!(editor.status(), SessionStatus::Dirty);

    assert!(editor.undo());
    assert!(editor.node("a").is_some());
    assert_eq!(editor.edges().len(), 3);
}

#[rstest]
fn canvas_removal_stays_removed_after_undoing_a_later_edit(mut editor: DiagramEditor) {
    editor.on_nodes_change(&[NodeChange::Remove {
        id: "a".to_owned(),
    }]);
    editor.add_node(node("d", 750.0)).expect("add node");

    assert!(editor.undo());
    let ids: Vec<&str> = editor.nodes().iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, ["b", "c"]);
    assert_eq!(editor.edges().len(), 1);
}

#[rstest]
fn canvas_inserts_follow_the_store_rules(mut editor: DiagramEditor) {
    editor.on_nodes_change(&[
        NodeChange::Add {
            item: node("a", 900.0),
            index: None,
        },
        NodeChange::Replace {
            id: "a".to_owned(),
            item: node("z", 40.0),
        },
    ]);
    editor.on_edges_change(&[EdgeChange::Add {
        item: edge("e1", "ghost", "b"),
        index: None,
    }]);

    assert_eq!(editor.nodes().len(), 3);
    assert_eq!(editor.node("a").map(|n| n.position.x), Some(40.0));
    assert!(editor.node("z").is_none());
    assert_eq!(editor.edges().len(), 3);
    assert!(validate_graph(editor.nodes(), editor.edges()).is_valid);
    assert_eq!(last_action(&editor), Some("Edit Nodes"));
    assert_eq!(editor.history().len(), 2);
}

#[rstest]
#[case(edge("e1", "b", "a"))]
#[case(edge("e4", "ghost", "b"))]
#[case(edge("e4", "c", "c"))]
fn rejected_canvas_edges_change_nothing(mut editor: DiagramEditor, #[case] item: GraphEdge) {
    let rev = editor.rev();
    editor.on_edges_change(&[EdgeChange::Add { item, index: None }]);

    assert_eq!(editor.edges().len(), 3);
    assert_eq!(editor.history().len(), 1);
    assert_eq!(editor.status(), SessionStatus::Loaded);
    assert!(editor.rev() > rev);
}

#[rstest]
fn canvas_edge_inserts_are_undoable(mut editor: DiagramEditor) {
    editor.on_edges_change(&[EdgeChange::Add {
        item: edge("e4", "c", "b"),
        index: None,
    }]);

    assert!(editor.edge("e4").is_some());
    assert_eq!(last_action(&editor), Some("Add Edges"));
    assert!(editor.undo());
    assert!(editor.edge("e4").is_none());
}

#[rstest]
fn canvas_measurements_do_not_dirty_the_session(mut editor: DiagramEditor) {
    editor.on_nodes_change(&[NodeChange::Dimensions {
        id: "a".to_owned(),
        dimensions: Some(Dimensions {
            width: 210.0,
            height: 90.0,
        }),
    }]);

    assert_eq!(editor.node("a").map(GraphNode::width), Some(210.0));
    assert_eq!(editor.status(), SessionStatus::Loaded);
}

#[rstest]
fn edge_changes_update_edges_and_selection(mut editor: DiagramEditor) {
    editor.select_nodes(&["a"]);
    editor.on_edges_change(&[EdgeChange::Select {
        id: "e1".to_owned(),
        selected: true,
    }]);
    assert_eq!(editor.selected_edges(), ["e1"]);
    assert!(editor.selected_nodes().is_empty());
    assert_eq!(editor.status(), SessionStatus::Loaded);

    editor.on_edges_change(&[EdgeChange::Remove {
        id: "e1".to_owned(),
    }]);
    assert!(editor.edge("e1").is_none());
    assert!(editor.selected_edges().is_empty());
    assert_eq!(editor.nodes().len(), 3);
    assert_eq!(editor.status(), SessionStatus::Dirty);
    assert_eq!(last_action(&editor), Some("Delete Edges"));
}

#[rstest]
fn connecting_ports_adds_a_process_flow_edge(mut editor: DiagramEditor) {
    let connection = Connection {
        source: "c".to_owned(),
        target: "a".to_owned(),
        source_handle: Some("bottom".to_owned()),
        target_handle: None,
    };
    let id = editor.on_connect(connection).expect("connect");

    assert!(id.starts_with("edge-"));
    let edge = editor.edge(&id).expect("edge");
    assert_eq!(edge.connection_type(), ConnectionType::ProcessFlow);
    assert_eq!(edge.source_handle.as_deref(), Some("bottom"));
    assert_eq!(last_action(&editor), Some("Connect Nodes"));
}

#[rstest]
#[case(Connection::new("a", "ghost"))]
#[case(Connection::new("b", "b"))]
#[case(Connection::new("a", "b"))]
fn refused_connections_change_nothing(mut editor: DiagramEditor, #[case] connection: Connection) {
    assert_eq!(editor.on_connect(connection), None);
    assert_eq!(editor.edges().len(), 3);
    assert_eq!(editor.history().len(), 1);
}

#[rstest]
fn add_node_generates_ids_and_rejects_duplicates(mut editor: DiagramEditor) {
    let id = editor
        .add_node(node("", 10.0))
        .expect("add node with generated id");
    assert!(id.starts_with("node-"));
    assert!(editor.node(&id).is_some());
    assert_eq!(last_action(&editor), Some("Add Node"));

    assert_eq!(
        editor.add_node(node("a", 10.0)),
        Err(EditorError::DuplicateNodeId { id: "a".to_owned() })
    );
}

#[rstest]
#[case(edge("e1", "b", "a"), EditorError::DuplicateEdgeId { id: "e1".to_owned() })]
#[case(
    edge("e9", "a", "ghost"),
    EditorError::UnknownNode { edge: "e9".to_owned(), node: "ghost".to_owned() }
)]
#[case(
    edge("e9", "c", "c"),
    EditorError::SelfLoop { edge: "e9".to_owned(), node: "c".to_owned() }
)]
fn add_edge_rejects_broken_edges(
    mut editor: DiagramEditor,
    #[case] candidate: GraphEdge,
    #[case] expected: EditorError,
) {
    assert_eq!(editor.add_edge(candidate), Err(expected));
    assert_eq!(editor.edges().len(), 3);
    assert_eq!(editor.history().len(), 1);
}

#[rstest]
fn updates_change_attributes_without_history(mut editor: DiagramEditor) {
    let patch = NodePatch {
        element_type: Some(ElementType::Decision),
        description: Some("Routes approvals".to_owned()),
        ..NodePatch::default()
    };
    assert!(editor.update_node("b", &patch));
    assert!(!editor.update_node("missing", &patch));

    let updated = editor.node("b").expect("node");
    assert_eq!(updated.element_type(), ElementType::Decision);
    assert_eq!(updated.data.description, "Routes approvals");

    let patch = EdgePatch {
        label: Some(Some("yes".to_owned())),
        connection_type: Some(ConnectionType::DataFlow),
        ..EdgePatch::default()
    };
    assert!(editor.update_edge("e2", &patch));
    let updated = editor.edge("e2").expect("edge");
    assert_eq!(updated.label.as_deref(), Some("yes"));
    assert!(updated.animated);

    assert_eq!(editor.history().len(), 1);
    assert_eq!(editor.status(), SessionStatus::Dirty);
}

#[rstest]
fn selection_is_nodes_or_edges_never_both(mut editor: DiagramEditor) {
    editor.select_edges(&["e1"]);
    editor.select_nodes(&["a", "b", "ghost", "a"]);
    assert_eq!(editor.selected_nodes(), ["a", "b"]);
    assert!(editor.selected_edges().is_empty());

    editor.select_edges(&["e2", "e3"]);
    assert_eq!(editor.selected_edges(), ["e2", "e3"]);
    assert!(editor.selected_nodes().is_empty());

    editor.clear_selection();
    assert!(editor.selected_edges().is_empty());
    assert_eq!(editor.history().len(), 1);
}

#[rstest]
fn select_all_takes_nodes_and_edges(mut editor: DiagramEditor) {
    editor.select_all();
    assert_eq!(editor.selected_nodes().len(), 3);
    assert_eq!(editor.selected_edges().len(), 3);
}

#[rstest]
fn viewport_is_mirrored_into_canvas_settings(mut editor: DiagramEditor) {
    editor.set_viewport(Viewport {
        x: 40.0,
        y: -20.0,
        zoom: 1.5,
    });

    assert_eq!(editor.canvas_settings().zoom, 1.5);
    assert_eq!(editor.canvas_settings().pan, Position::new(40.0, -20.0));
    assert_eq!(editor.history().len(), 1);
    assert!(!editor.can_undo());
}

#[rstest]
fn loading_starts_a_fresh_session(mut editor: DiagramEditor) {
    editor.add_node(node("d", 750.0)).expect("add node");
    editor.select_all();
    editor.update_canvas_settings(&CanvasSettingsPatch {
        grid_size: Some(50.0),
        ..CanvasSettingsPatch::default()
    });

    editor.load_diagram(
        vec![node("x", 0.0)],
        Vec::new(),
        Some(&CanvasSettingsPatch {
            zoom: Some(2.0),
            ..CanvasSettingsPatch::default()
        }),
    );

    assert_eq!(editor.history().len(), 1);
    assert!(!editor.can_undo());
    assert!(editor.selected_nodes().is_empty());
    assert!(editor.selected_edges().is_empty());
    assert_eq!(editor.canvas_settings().zoom, 2.0);
    assert_eq!(editor.canvas_settings().grid_size, 20.0);
    assert_eq!(editor.status(), SessionStatus::Loaded);
    assert!(editor.last_saved().is_some());
}

#[test]
fn first_edit_of_a_blank_session_is_undoable() {
    let mut editor = DiagramEditor::default();
    editor.add_node(node("a", 0.0)).expect("add node");

    let actions: Vec<&str> = editor
        .history()
        .entries()
        .iter()
        .map(|s| s.action.as_str())
        .collect();
    assert_eq!(actions, ["Initial State", "Add Node"]);
    assert!(editor.undo());
    assert!(editor.nodes().is_empty());
}

#[test]
fn status_follows_the_session_lifecycle() {
    let mut editor = DiagramEditor::default();
    assert_eq!(editor.status(), SessionStatus::Empty);

    editor.load_diagram(vec![node("a", 0.0)], Vec::new(), None);
    assert_eq!(editor.status(), SessionStatus::Loaded);

    editor.add_node(node("b", 100.0)).expect("add node");
    assert_eq!(editor.status(), SessionStatus::Dirty);

    editor.mark_saved();
    assert_eq!(editor.status(), SessionStatus::Saved);
    assert!(!editor.has_unsaved_changes());

    editor.mark_unsaved();
    assert_eq!(editor.status(), SessionStatus::Dirty);

    editor.set_saving(true);
    editor.mark_saved();
    editor.set_saving(false);
    assert_eq!(editor.status(), SessionStatus::Saved);

    editor.reset();
    assert_eq!(editor.status(), SessionStatus::Empty);
    assert!(editor.nodes().is_empty());
    assert!(editor.history().is_empty());
}

#[rstest]
fn undo_dirties_a_saved_session(mut editor: DiagramEditor) {
    editor.add_node(node("d", 750.0)).expect("add node");
    editor.mark_saved();
    assert!(editor.undo());
    assert_eq!(editor.status(), SessionStatus::Dirty);
}

#[rstest]
fn rev_grows_with_every_observable_change(mut editor: DiagramEditor) {
    let mut last = editor.rev();
    let mut check = |editor: &DiagramEditor| {
        assert!(editor.rev() > last);
        last = editor.rev();
    };

    editor.select_nodes(&["a"]);
    check(&editor);
    editor.set_viewport(Viewport::default());
    check(&editor);
    editor.delete_node("a");
    check(&editor);
    editor.undo();
    check(&editor);
    editor.reset();
    check(&editor);
}

#[rstest]
fn keyboard_commands_drive_the_editor(mut editor: DiagramEditor) {
    let select_all = EditorCommand::from_chord("ctrl+a").expect("chord");
    assert!(editor.execute(select_all, true));
    assert_eq!(editor.selected_nodes().len(), 3);

    let delete = EditorCommand::from_chord("Delete").expect("chord");
    assert!(!editor.execute(delete, true));
    assert_eq!(editor.nodes().len(), 3);

    assert!(editor.execute(delete, false));
    assert!(editor.nodes().is_empty());
    assert!(editor.edges().is_empty());
    assert_eq!(editor.history().len(), 2);
    assert_eq!(last_action(&editor), Some("Delete Selection"));

    let undo = EditorCommand::from_chord("cmd+z").expect("chord");
    assert!(editor.execute(undo, false));
    assert_eq!(editor.nodes().len(), 3);
    assert_eq!(editor.edges().len(), 3);

    assert!(!editor.execute(EditorCommand::ClearSelection, false));
    assert!(!editor.execute(EditorCommand::DeleteSelected, false));
}

#[rstest]
fn persistence_batch_needs_a_diagram_id(mut editor: DiagramEditor) {
    assert_eq!(
        editor.persistence_batch().map(|b| b.elements.len()),
        Err(EditorError::MissingDiagramId)
    );

    editor.set_diagram_id(DiagramId::new("diagram-42").expect("diagram id"));
    let batch = editor.persistence_batch().expect("batch");
    assert_eq!(batch.elements.len(), 3);
    assert_eq!(batch.connections.len(), 3);
    assert!(batch.dropped.is_empty());
    assert!(batch.elements.iter().all(|e| e.diagram_id.as_str() == "diagram-42"));
}
