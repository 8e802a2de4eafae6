//! Level 2: Node Drag Tests
//!
//! Tests node dragging through the editor: drag events, position updates,
//! links following the node, click suppression and gesture gating.

mod common;

use common::harness::EditorHarness;
use common::assert_close;
use graph_canvas::drag::SECONDARY_BUTTON;
use graph_canvas::geometry::{logical_point, logical_vector};
use graph_canvas::{DragState, EditorEvent, NodeId, PointerEvent};
use proptest::prelude::*;

fn a() -> NodeId {
    NodeId::from("a")
}

// ============================================================================
// Drag events and positions
// ============================================================================

#[test]
fn test_drag_emits_start_move_end_update() {
    let mut harness = EditorHarness::new();
    harness.drag_node("a", (200.0, 150.0), &[(201.0, 150.0), (251.0, 170.0)]);

    let log = harness.events();
    assert_eq!(
        log.kinds(),
        vec!["node-drag-start", "node-drag-move", "node-drag-end", "node-update"]
    );
    assert_eq!(
        log.events[0],
        EditorEvent::NodeDragStart {
            node_id: a(),
            position: logical_point(100.0, 100.0),
        }
    );
    assert_eq!(
        log.events[1],
        EditorEvent::NodeDragMove {
            node_id: a(),
            position: logical_point(151.0, 120.0),
            movement: logical_vector(51.0, 20.0),
            transform: "translate(151px,120px)".to_string(),
        }
    );
}

#[test]
fn test_drag_end_writes_metadata() {
    let mut harness = EditorHarness::new();
    harness.drag_node("a", (200.0, 150.0), &[(201.0, 150.0), (251.0, 170.0)]);

    let node = harness.editor.diagram().node(&a()).unwrap();
    assert_eq!(node.position(), Some(logical_point(151.0, 120.0)));
    assert_eq!(node.metadata.width, Some(150.0));
    assert_eq!(harness.editor.node_transform(&a()).unwrap(), "translate(151px,120px)");

    let update = harness
        .events()
        .events
        .into_iter()
        .find_map(|e| match e {
            EditorEvent::NodeUpdate(node) => Some(node),
            _ => None,
        })
        .unwrap();
    assert_eq!(update.metadata.x, Some(151.0));
    assert_eq!(update.metadata.y, Some(120.0));

    let json = harness.editor.diagram().to_json().unwrap();
    assert!(json.contains("151"));
}

#[test]
fn test_drag_divides_by_scale() {
    let mut harness = EditorHarness::new();
    harness.editor.zoom(2.0);
    harness.drag_node("a", (0.0, 0.0), &[(0.0, 0.0), (100.0, 40.0)]);
    let node = harness.editor.diagram().node(&a()).unwrap();
    assert_eq!(node.position(), Some(logical_point(150.0, 120.0)));
}

#[test]
fn test_sub_threshold_moves_accumulate_into_one_event() {
    let mut harness = EditorHarness::new();
    harness.editor.node_pointer_down(&a(), PointerEvent::new(0.0, 0.0));
    harness.editor.pointer_move(PointerEvent::new(0.0, 0.0));
    harness.editor.pointer_move(PointerEvent::new(0.5, 0.0));
    assert_eq!(harness.events().kinds(), vec!["node-drag-start"]);

    harness.editor.pointer_move(PointerEvent::new(2.5, 0.0));
    let log = harness.events();
    assert_eq!(log.count("node-drag-move"), 1);
    match &log.events[0] {
        EditorEvent::NodeDragMove { movement, .. } => {
            assert_eq!(*movement, logical_vector(2.5, 0.0))
        }
        other => panic!("unexpected event {other:?}"),
    }
}

// ============================================================================
// Links follow the dragged node
// ============================================================================

#[test]
fn test_link_follows_node_during_drag() {
    let mut harness = EditorHarness::new();
    let before = harness.editor.link_path(&"l1".into()).unwrap().render_id;

    harness.editor.node_pointer_down(&a(), PointerEvent::new(200.0, 150.0));
    harness.editor.pointer_move(PointerEvent::new(201.0, 150.0));
    harness.editor.pointer_move(PointerEvent::new(251.0, 170.0));

    let (source, target) = harness.link_endpoints("l1").unwrap();
    assert_eq!(source, logical_point(301.0, 145.0));
    assert_eq!(target, logical_point(400.0, 225.0));
    assert_ne!(harness.editor.link_path(&"l1".into()).unwrap().render_id, before);
}

#[test]
fn test_remeasured_ports_agree_with_drag() {
    let mut harness = EditorHarness::new();
    harness.drag_node("a", (200.0, 150.0), &[(201.0, 150.0), (251.0, 170.0)]);
    let after_drag = harness.link_endpoints("l1").unwrap();

    // The surface re-reports ports at the new location; nothing changes
    let changed = harness.render_ports();
    assert!(changed.is_empty());
    assert_eq!(harness.link_endpoints("l1").unwrap(), after_drag);
}

// ============================================================================
// Clicks around drags
// ============================================================================

#[test]
fn test_release_without_movement_is_a_click() {
    let mut harness = EditorHarness::new();
    harness.editor.node_pointer_down(&a(), PointerEvent::new(200.0, 150.0));
    harness.editor.pointer_up(PointerEvent::new(200.0, 150.0));
    assert!(harness.events().is_empty());
    assert_eq!(harness.editor.drag_state(), DragState::Idle);

    assert!(harness.editor.node_click(&a(), false));
    assert_eq!(harness.events().kinds(), vec!["node-click"]);
}

#[test]
fn test_click_after_drag_is_suppressed_once() {
    let mut harness = EditorHarness::new();
    harness.drag_node("a", (200.0, 150.0), &[(201.0, 150.0), (251.0, 170.0)]);
    harness.events();

    assert!(!harness.editor.node_click(&a(), false));
    assert!(harness.events().is_empty());
    assert!(!harness.editor.selection().nodes.is_selected(&a()));

    assert!(harness.editor.node_click(&a(), false));
    assert_eq!(harness.events().kinds(), vec!["node-click"]);
}

#[test]
fn test_click_suppression_ends_with_render_pass() {
    let mut harness = EditorHarness::new();
    harness.drag_node("a", (200.0, 150.0), &[(201.0, 150.0), (251.0, 170.0)]);
    harness.editor.after_render_pass();
    harness.events();

    // The surface never delivered the trailing click; a later one counts
    let b = NodeId::from("b");
    assert!(harness.editor.node_click(&b, false));
    assert!(harness.editor.selection().nodes.is_selected(&b));
    assert_eq!(harness.events().kinds(), vec!["node-click"]);
}

// ============================================================================
// Gesture gating
// ============================================================================

#[test]
fn test_ctrl_press_does_not_start_drag() {
    let mut harness = EditorHarness::new();
    assert!(!harness.editor.node_pointer_down(&a(), PointerEvent::new(0.0, 0.0).with_ctrl()));
    assert_eq!(harness.editor.drag_state(), DragState::Idle);
}

#[test]
fn test_secondary_button_does_not_start_drag() {
    let mut harness = EditorHarness::new();
    let event = PointerEvent::new(0.0, 0.0).with_buttons(SECONDARY_BUTTON);
    assert!(!harness.editor.node_pointer_down(&a(), event));
}

#[test]
fn test_read_only_editor_does_not_drag() {
    let mut harness = EditorHarness::new();
    harness.editor.set_editable(false);
    harness.drag_node("a", (0.0, 0.0), &[(1.0, 1.0), (50.0, 50.0)]);
    assert!(harness.events().is_empty());
    assert_eq!(
        harness.editor.diagram().node(&a()).unwrap().position(),
        Some(logical_point(100.0, 100.0))
    );
}

#[test]
fn test_second_gesture_is_ignored_while_dragging() {
    let mut harness = EditorHarness::new();
    assert!(harness.editor.node_pointer_down(&a(), PointerEvent::new(0.0, 0.0)));
    assert!(!harness.editor.node_pointer_down(&NodeId::from("b"), PointerEvent::new(0.0, 0.0)));
    assert!(!harness.editor.canvas_pointer_down(PointerEvent::new(0.0, 0.0)));
    assert_eq!(harness.editor.drag_state(), DragState::Initiated);
}

#[test]
fn test_selection_locked_until_render_pass_after_drag() {
    let mut harness = EditorHarness::new();
    harness.editor.node_pointer_down(&a(), PointerEvent::new(0.0, 0.0));
    harness.editor.pointer_move(PointerEvent::new(1.0, 0.0));
    assert!(harness.editor.selection().is_locked());

    harness.editor.pointer_move(PointerEvent::new(30.0, 0.0));
    harness.editor.pointer_up(PointerEvent::new(30.0, 0.0));
    assert!(harness.editor.selection().is_locked(), "unlock waits for the next pass");
    assert!(!harness.editor.background_click());

    harness.editor.after_render_pass();
    assert!(!harness.editor.selection().is_locked());
    assert!(harness.editor.background_click());
}

#[test]
fn test_cancel_gesture_detaches_without_end_event() {
    let mut harness = EditorHarness::new();
    harness.editor.node_pointer_down(&a(), PointerEvent::new(0.0, 0.0));
    harness.editor.pointer_move(PointerEvent::new(1.0, 0.0));
    harness.editor.pointer_move(PointerEvent::new(20.0, 0.0));
    harness.events();

    assert!(harness.editor.cancel_gesture());
    assert_eq!(harness.editor.drag_state(), DragState::Idle);
    assert!(!harness.editor.selection().is_locked());

    // Later moves and releases go nowhere
    harness.editor.pointer_move(PointerEvent::new(80.0, 0.0));
    harness.editor.pointer_up(PointerEvent::new(80.0, 0.0));
    assert!(harness.events().is_empty());
    assert_eq!(
        harness.editor.diagram().node(&a()).unwrap().position(),
        Some(logical_point(120.0, 100.0))
    );
    assert!(!harness.editor.cancel_gesture());
}

proptest! {
    #[test]
    fn prop_drag_moves_node_by_pointer_delta_over_scale(
        dx in -500.0f32..500.0,
        dy in -500.0f32..500.0,
        scale in 0.1f32..10.0,
    ) {
        let mut harness = EditorHarness::new();
        harness.editor.zoom(scale);
        let scale = harness.editor.scale();
        harness.drag_node("a", (0.0, 0.0), &[(0.0, 0.0), (dx, dy)]);

        let position = harness.editor.diagram().node(&a()).unwrap().position().unwrap();
        prop_assert!((position.x - (100.0 + dx / scale)).abs() < 1e-2);
        prop_assert!((position.y - (100.0 + dy / scale)).abs() < 1e-2);
    }
}

#[test]
fn test_drag_position_is_close_after_many_small_moves() {
    let mut harness = EditorHarness::new();
    let path: Vec<(f32, f32)> = (0..=40).map(|i| (i as f32 * 0.3, i as f32 * 0.7)).collect();
    harness.drag_node("a", (0.0, 0.0), &path);
    let position = harness.editor.diagram().node(&a()).unwrap().position().unwrap();
    assert_close(position.x, 112.0);
    assert_close(position.y, 128.0);
}
