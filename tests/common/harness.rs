//! Test harness standing in for a rendering surface.
//!
//! The harness plays the part of the UI: it "renders" nodes at their logical
//! positions under the current canvas transform and reports node sizes and
//! port positions in viewport coordinates, exactly as a real surface would.
//! Every node gets its input ports on the left edge and its output ports on
//! the right edge, 25 units below the top.

#![allow(dead_code)]

use super::{two_node_diagram, EventLog, RowLayout};
use graph_canvas::geometry::{
    container_rect, logical_point, screen_point, LogicalPoint, ScreenPoint, ScreenRect,
};
use graph_canvas::{
    Diagram, EditorConfig, GraphEditor, InitialScale, LinkId, NodeId, PointerEvent, PortDirection,
    PortMeasurement, PortRef, Surface,
};

/// Vertical offset of every port below its node's top edge.
pub const PORT_Y: f32 = 25.0;

/// The container sits at (10, 20) in the viewport and is 800x600.
pub fn default_container() -> ScreenRect {
    container_rect(10.0, 20.0, 800.0, 600.0)
}

pub struct TestSurface {
    pub rect: ScreenRect,
}

impl Surface for TestSurface {
    fn container_rect(&self) -> ScreenRect {
        self.rect
    }
}

pub struct EditorHarness {
    pub editor: GraphEditor<TestSurface>,
}

impl EditorHarness {
    /// The two-node diagram at scale 1, fully booted.
    pub fn new() -> Self {
        let mut harness = Self::with_diagram(two_node_diagram(), fixed_scale_config());
        harness.boot();
        harness
    }

    /// Load `diagram` without rendering anything yet.
    pub fn with_diagram(diagram: Diagram, config: EditorConfig) -> Self {
        let surface = TestSurface {
            rect: default_container(),
        };
        let mut editor = GraphEditor::with_layout(surface, config, Box::new(RowLayout));
        editor.load_diagram(diagram);
        Self { editor }
    }

    /// Run the whole first-render sequence: sizes, layout pass, ports,
    /// link pass. Events emitted on the way are discarded.
    pub fn boot(&mut self) {
        self.report_sizes();
        self.editor.after_render_pass();
        self.render_ports();
        self.editor.after_render_pass();
        self.editor.drain_events();
    }

    /// Report every node's size from its metadata (150x50 if missing).
    pub fn report_sizes(&mut self) {
        let sizes: Vec<(NodeId, f32, f32)> = self
            .editor
            .diagram()
            .nodes
            .iter()
            .map(|n| {
                (
                    n.id.clone(),
                    n.metadata.width.unwrap_or(150.0),
                    n.metadata.height.unwrap_or(50.0),
                )
            })
            .collect();
        for (id, w, h) in sizes {
            self.editor.report_node_size(&id, w, h);
        }
    }

    /// Report the port positions of every node as currently rendered.
    pub fn render_ports(&mut self) -> Vec<LinkId> {
        let ids: Vec<NodeId> = self.editor.diagram().nodes.iter().map(|n| n.id.clone()).collect();
        let mut changed = Vec::new();
        for id in ids {
            changed.extend(self.render_node_ports(&id));
        }
        changed
    }

    pub fn render_node_ports(&mut self, node_id: &NodeId) -> Vec<LinkId> {
        let Some(node) = self.editor.diagram().node(node_id) else {
            return Vec::new();
        };
        let mut measurements = Vec::new();
        for direction in [PortDirection::Input, PortDirection::Output] {
            for port in node.ports.get(direction) {
                let p = self.port_screen(node_id, direction, &port.name);
                measurements.push(PortMeasurement::new(direction, port.name.clone(), p.x, p.y));
            }
        }
        self.editor.report_port_positions(node_id, measurements)
    }

    /// Logical position where the surface draws a port.
    pub fn port_logical(&self, node_id: &NodeId, direction: PortDirection) -> LogicalPoint {
        let node = self.editor.diagram().node(node_id).expect("unknown node");
        let origin = node.position().unwrap_or(logical_point(0.0, 0.0));
        let width = node.metadata.width.unwrap_or(150.0);
        match direction {
            PortDirection::Input => logical_point(origin.x, origin.y + PORT_Y),
            PortDirection::Output => logical_point(origin.x + width, origin.y + PORT_Y),
        }
    }

    /// Viewport position of a port under the current transform.
    pub fn port_screen(
        &self,
        node_id: &NodeId,
        direction: PortDirection,
        _name: &str,
    ) -> ScreenPoint {
        self.to_viewport(self.port_logical(node_id, direction))
    }

    /// Logical point to viewport coordinates.
    pub fn to_viewport(&self, point: LogicalPoint) -> ScreenPoint {
        let relative = self.editor.transform().logical_to_screen(point);
        relative + self.editor.surface().container_rect().origin.to_vector()
    }

    pub fn events(&mut self) -> EventLog {
        EventLog::new(self.editor.drain_events())
    }

    /// Press on a node, move through `path` (viewport coordinates) and
    /// release at the last point.
    pub fn drag_node(&mut self, node_id: &str, from: (f32, f32), path: &[(f32, f32)]) {
        let id = NodeId::from(node_id);
        self.editor.node_pointer_down(&id, PointerEvent::new(from.0, from.1));
        for &(x, y) in path {
            self.editor.pointer_move(PointerEvent::new(x, y));
        }
        let (x, y) = path.last().copied().unwrap_or(from);
        self.editor.pointer_up(PointerEvent::new(x, y));
    }

    /// Press on the canvas, move through `path` and release.
    pub fn pan(&mut self, from: (f32, f32), path: &[(f32, f32)]) {
        self.editor.canvas_pointer_down(PointerEvent::new(from.0, from.1));
        for &(x, y) in path {
            self.editor.pointer_move(PointerEvent::new(x, y));
        }
        let (x, y) = path.last().copied().unwrap_or(from);
        self.editor.pointer_up(PointerEvent::new(x, y));
    }

    pub fn port(node_id: &str, direction: PortDirection, name: &str) -> PortRef {
        PortRef::new(node_id, direction, name)
    }

    pub fn link_endpoints(&self, link_id: &str) -> Option<(LogicalPoint, LogicalPoint)> {
        let rendered = self.editor.link_path(&LinkId::from(link_id))?;
        Some((rendered.endpoints.source, rendered.endpoints.target))
    }
}

pub fn fixed_scale_config() -> EditorConfig {
    EditorConfig {
        initial_scale: InitialScale::Fixed(1.0),
        ..EditorConfig::default()
    }
}

pub fn viewport(x: f32, y: f32) -> ScreenPoint {
    screen_point(x, y)
}
