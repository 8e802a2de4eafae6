//! Common test utilities for integration tests.

#![allow(dead_code)]

pub mod harness;

use graph_canvas::layout::{Direction, LayeredLayout, LayoutGraph, NodePosition};
use graph_canvas::{Connector, Diagram, EditorEvent, Link, Node, Port, PortDirection};

/// Events drained from an editor, with lookup helpers.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    pub events: Vec<EditorEvent>,
}

impl EventLog {
    pub fn new(events: Vec<EditorEvent>) -> Self {
        Self { events }
    }

    /// Event kinds in emission order.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.events.iter().map(EditorEvent::kind).collect()
    }

    pub fn count(&self, kind: &str) -> usize {
        self.events.iter().filter(|e| e.kind() == kind).count()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Places nodes left to right, 300 apart, in input order.
pub struct RowLayout;

impl LayeredLayout for RowLayout {
    fn layout(&self, graph: &LayoutGraph, _direction: Direction) -> Vec<NodePosition> {
        (0..graph.sizes.len())
            .map(|index| NodePosition {
                index,
                x: index as f64 * 300.0,
                y: 0.0,
            })
            .collect()
    }
}

/// A node with one input port "in" and one output port "out".
pub fn node(id: &str) -> Node {
    Node::new(id, id.to_uppercase())
        .with_port(PortDirection::Input, Port::new("in"))
        .with_port(PortDirection::Output, Port::new("out"))
}

pub fn link(id: &str, from: &str, to: &str) -> Link {
    Link::new(id, Connector::new(from, "out"), Connector::new(to, "in"))
}

/// Node A at (100, 100) and node B at (400, 200), both 150x50, linked
/// A.out -> B.in by "l1".
pub fn two_node_diagram() -> Diagram {
    let mut diagram = Diagram::new("flow");
    diagram.nodes.push(node("a").with_position(100.0, 100.0).with_size(150.0, 50.0));
    diagram.nodes.push(node("b").with_position(400.0, 200.0).with_size(150.0, 50.0));
    diagram.links.push(link("l1", "a", "b"));
    diagram
}

pub fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-3,
        "expected {expected}, got {actual}"
    );
}
