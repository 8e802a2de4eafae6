//! The editor: one open diagram and everything needed to interact with it.
//!
//! [`GraphEditor`] ties the pieces together. The rendering surface feeds it
//! measurements and pointer input, then reads back the canvas transform,
//! node transforms and link paths, and drains [`EditorEvent`]s.
//!
//! # Lifecycle
//!
//! ```ignore
//! let mut editor = GraphEditor::new(surface, EditorConfig::default());
//! editor.load_diagram(diagram);
//!
//! // Render the nodes, then report what was measured.
//! for (id, width, height) in measured_nodes {
//!     editor.report_node_size(&id, width, height);
//! }
//! editor.after_render_pass(); // layout and initial scale
//!
//! for (id, ports) in measured_ports {
//!     editor.report_port_positions(&id, ports);
//! }
//! editor.after_render_pass(); // links become available
//!
//! for link in editor.link_paths() {
//!     draw(link.path.to_svg(), link.path.transform());
//! }
//! ```
//!
//! Work that has to wait for the next frame is queued and runs in
//! [`GraphEditor::after_render_pass`], which the surface calls once it has
//! rendered.

use std::collections::VecDeque;
use std::time::Instant;

use indexmap::IndexMap;

use crate::activation::{ActivationGate, Transition};
use crate::config::{EditorConfig, InitialScale};
use crate::diagram::{Connector, Diagram, Link, LinkId, NodeId, PortDirection, PortRef};
use crate::drag::{DragController, DragEvent, DragState, DragStrategy, PointerEvent};
use crate::events::{EditorEvent, HoverTarget};
use crate::geometry::{LogicalPoint, LogicalSize, Screen, ScreenPoint, ScreenRect, ScreenVector};
use crate::layout::{auto_scale, compute_bounds, layout_diagram, LayeredLayout, LayoutMode};
use crate::links::{LinkManager, RenderedLink};
use crate::registry::{PortMeasurement, PortRegistry};
use crate::route::{route, LinkPath};
use crate::selection::SelectionManager;
use crate::transform::{wheel_scale, Transform};

/// The rendering surface hosting the canvas.
pub trait Surface {
    /// Bounding rectangle of the canvas container in viewport coordinates.
    fn container_rect(&self) -> ScreenRect;
}

/// A fixed container rectangle.
impl Surface for ScreenRect {
    fn container_rect(&self) -> ScreenRect {
        *self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Continuation {
    LayoutGraph,
    BuildLinks,
    UnlockSelection,
}

/// A link being drawn from an output port towards the pointer.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeDraft {
    pub source: Connector,
    pub source_position: LogicalPoint,
    /// Last pointer position; `None` until the pointer moves.
    pub pointer: Option<LogicalPoint>,
}

pub struct GraphEditor<S: Surface> {
    surface: S,
    config: EditorConfig,
    diagram: Diagram,
    transform: Transform,
    registry: PortRegistry,
    links: LinkManager,
    selection: SelectionManager,
    drag: DragController,
    layout: Box<dyn LayeredLayout>,
    hover: IndexMap<HoverTarget, ActivationGate>,
    edge_draft: Option<EdgeDraft>,
    target_port: Option<Connector>,
    cancel_click: bool,
    initialized: bool,
    pending: VecDeque<Continuation>,
    events: Vec<EditorEvent>,
}

#[cfg(feature = "layout")]
impl<S: Surface> GraphEditor<S> {
    /// Create an editor that places nodes with [`SugiyamaLayout`](crate::layout::SugiyamaLayout).
    pub fn new(surface: S, config: EditorConfig) -> Self {
        Self::with_layout(surface, config, Box::new(crate::layout::SugiyamaLayout::default()))
    }
}

impl<S: Surface> GraphEditor<S> {
    pub fn with_layout(surface: S, config: EditorConfig, layout: Box<dyn LayeredLayout>) -> Self {
        Self {
            links: LinkManager::new(config.curve_style(), config.default_stroke_width),
            drag: DragController::new(config.drag_sensitivity),
            surface,
            config,
            diagram: Diagram::default(),
            transform: Transform::new(),
            registry: PortRegistry::new(),
            selection: SelectionManager::new(),
            layout,
            hover: IndexMap::new(),
            edge_draft: None,
            target_port: None,
            cancel_click: false,
            initialized: false,
            pending: VecDeque::new(),
            events: Vec::new(),
        }
    }

    // === Accessors ===

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn set_editable(&mut self, editable: bool) {
        self.config.editable = editable;
    }

    pub fn set_pan_enabled(&mut self, enabled: bool) {
        self.config.pan_enabled = enabled;
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn scale(&self) -> f32 {
        self.transform.scale()
    }

    pub fn offset(&self) -> ScreenVector {
        self.transform.offset()
    }

    pub fn registry(&self) -> &PortRegistry {
        &self.registry
    }

    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionManager {
        &mut self.selection
    }

    pub fn drag_state(&self) -> DragState {
        self.drag.state()
    }

    pub fn edge_draft(&self) -> Option<&EdgeDraft> {
        self.edge_draft.as_ref()
    }

    /// True once layout has run and links have been built.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Number of continuations waiting for the next render pass.
    pub fn pending_passes(&self) -> usize {
        self.pending.len()
    }

    // === Diagram lifecycle ===

    /// Replace the open diagram. All state derived from the previous one is
    /// dropped.
    pub fn load_diagram(&mut self, diagram: Diagram) {
        log::debug!(
            "load diagram {} ({} nodes, {} links)",
            diagram.id,
            diagram.nodes.len(),
            diagram.links.len()
        );
        self.diagram = diagram;
        self.transform.reset();
        self.registry.clear();
        self.links.clear();
        self.selection.reset();
        self.drag.cancel();
        self.hover.clear();
        self.edge_draft = None;
        self.target_port = None;
        self.cancel_click = false;
        self.initialized = false;
        self.pending.clear();

        if let InitialScale::Fixed(scale) = self.config.initial_scale {
            self.zoom(scale);
        }
        if self.diagram.nodes.is_empty() {
            self.queue(Continuation::LayoutGraph);
        }
    }

    /// Record the rendered size of a node. Once every node has been measured
    /// the layout runs on the next render pass.
    pub fn report_node_size(&mut self, node_id: &NodeId, width: f32, height: f32) -> bool {
        let Some(node) = self.diagram.node_mut(node_id) else {
            log::debug!("size reported for unknown node {node_id}");
            return false;
        };
        let size = LogicalSize::new(width, height);
        self.registry.report_node_size(node_id, size);

        if self.initialized {
            node.metadata.width = Some(width);
            node.metadata.height = Some(height);
        } else if self.registry.measured_node_count() >= self.diagram.nodes.len() {
            self.queue(Continuation::LayoutGraph);
        }
        true
    }

    /// Record the measured port positions of a node, in viewport
    /// coordinates. Links touching the node are re-routed once the editor is
    /// initialized. Returns the ids of links whose path changed.
    pub fn report_port_positions<I>(&mut self, node_id: &NodeId, measurements: I) -> Vec<LinkId>
    where
        I: IntoIterator<Item = PortMeasurement>,
    {
        if self.diagram.node(node_id).is_none() {
            log::debug!("ports reported for unknown node {node_id}");
            return Vec::new();
        }
        let origin = self.surface.container_rect().origin + self.transform.offset();
        self.registry
            .update_node_ports(node_id, measurements, origin, self.transform.scale());
        self.refresh_links()
    }

    /// Run the work deferred to this render pass. Work queued while running
    /// waits for the following pass.
    pub fn after_render_pass(&mut self) {
        let due = std::mem::take(&mut self.pending);
        for step in due {
            match step {
                Continuation::LayoutGraph => self.layout_graph(),
                Continuation::BuildLinks => self.build_links(),
                Continuation::UnlockSelection => {
                    self.selection.unlock_all();
                    self.cancel_click = false;
                }
            }
        }
    }

    fn queue(&mut self, step: Continuation) {
        if !self.pending.contains(&step) {
            self.pending.push_back(step);
        }
    }

    fn layout_graph(&mut self) {
        log::debug!("layout graph");
        let before: Vec<(NodeId, LogicalPoint)> = self
            .diagram
            .nodes
            .iter_mut()
            .map(|node| {
                if let Some(size) = self.registry.node_size(&node.id) {
                    node.metadata.width = Some(size.width);
                    node.metadata.height = Some(size.height);
                }
                (node.id.clone(), node.position().unwrap_or_else(LogicalPoint::origin))
            })
            .collect();

        layout_diagram(
            &mut self.diagram,
            self.layout.as_ref(),
            self.config.layout_direction,
            self.config.default_node_size(),
            LayoutMode::MissingOnly,
        );

        // Ports measured before layout moved along with their node.
        for (node, (id, old)) in self.diagram.nodes.iter().zip(before) {
            let new = node.position().unwrap_or_else(LogicalPoint::origin);
            if new != old {
                self.registry.translate_node(&id, new - old);
            }
        }

        if self.config.initial_scale == InitialScale::Auto {
            self.fit_to_container();
        }
        self.queue(Continuation::BuildLinks);
    }

    /// Scale and center the diagram to fit the container width.
    pub fn fit_to_container(&mut self) -> bool {
        let default_size = self.config.default_node_size();
        let Some(bounds) = compute_bounds(&self.diagram.nodes, default_size) else {
            return false;
        };
        let container = self.surface.container_rect();
        let fit = auto_scale(container, &bounds);
        self.transform.set(fit.scale, fit.offset);
        let clamped = self.config.clamp_scale(fit.scale);
        if clamped != self.transform.scale() {
            self.transform.zoom_centered(clamped, container);
        }
        log::debug!(
            "auto scale {} offset ({}, {})",
            self.scale(),
            self.offset().x,
            self.offset().y
        );
        self.events.push(EditorEvent::ScaleChanged(self.transform.scale()));
        true
    }

    fn build_links(&mut self) {
        log::debug!("build links");
        self.initialized = true;
        self.registry.take_dirty();
        self.links.update_all(&self.diagram.links, &self.registry);
    }

    fn refresh_links(&mut self) -> Vec<LinkId> {
        if !self.initialized {
            return Vec::new();
        }
        let dirty = self.registry.take_dirty();
        self.links.refresh_for_nodes(&self.diagram.links, &self.registry, &dirty)
    }

    /// Add a link, typically in response to [`EditorEvent::LinkCreated`].
    pub fn add_link(&mut self, link: Link) {
        if self.initialized {
            self.links.update_link(&link, &self.registry);
        }
        self.diagram.links.retain(|l| l.id != link.id);
        self.diagram.links.push(link);
    }

    pub fn remove_link(&mut self, link_id: &LinkId) -> Option<Link> {
        let index = self.diagram.links.iter().position(|l| &l.id == link_id)?;
        self.links.remove(link_id);
        self.selection.links.deselect(link_id, true);
        self.hover.shift_remove(&HoverTarget::Link(link_id.clone()));
        Some(self.diagram.links.remove(index))
    }

    // === Pointer gestures ===

    /// Pointer pressed on a node. Starts a node drag unless the editor is
    /// read-only, ctrl is held or another gesture is running.
    pub fn node_pointer_down(&mut self, node_id: &NodeId, event: PointerEvent) -> bool {
        if !self.config.editable {
            return false;
        }
        if self.drag.is_active() || self.edge_draft.is_some() {
            log::debug!("gesture already running, ignoring press on {node_id}");
            return false;
        }
        let Some(node) = self.diagram.node(node_id) else {
            return false;
        };
        let transform = node.transform().to_string();
        let strategy = match DragStrategy::node(node_id.clone(), &transform, self.scale()) {
            Ok(strategy) => strategy,
            Err(err) => {
                log::warn!("node {node_id} has an unreadable transform: {err}");
                return false;
            }
        };
        self.drag.begin_with(strategy, &event, |e| !e.ctrl_key)
    }

    /// Pointer pressed on the empty canvas. Starts a pan.
    pub fn canvas_pointer_down(&mut self, event: PointerEvent) -> bool {
        if !self.config.pan_enabled || self.drag.is_active() || self.edge_draft.is_some() {
            return false;
        }
        self.drag.begin(DragStrategy::pan(), &event)
    }

    pub fn pointer_move(&mut self, event: PointerEvent) {
        if let Some(draft) = self.edge_draft.as_mut() {
            let relative = event.position - self.surface.container_rect().origin.to_vector();
            draft.pointer = Some(self.transform.screen_to_logical(relative));
            return;
        }
        let Some(drag_event) = self.drag.pointer_move(&event) else {
            return;
        };
        match drag_event {
            DragEvent::NodeStart { node_id, position } => {
                self.lock_selection();
                self.events.push(EditorEvent::NodeDragStart { node_id, position });
            }
            DragEvent::NodeMove {
                node_id,
                position,
                movement,
                transform,
            } => {
                self.move_node(&node_id, position);
                self.events.push(EditorEvent::NodeDragMove {
                    node_id,
                    position,
                    movement,
                    transform,
                });
            }
            DragEvent::PanStart => self.lock_selection(),
            DragEvent::Pan { movement, selection } => self.apply_pan(movement, selection),
            DragEvent::NodeEnd { .. } | DragEvent::PanEnd { .. } => {}
        }
    }

    pub fn pointer_up(&mut self, event: PointerEvent) {
        if self.edge_draft.is_some() {
            self.finish_edge();
            return;
        }
        match self.drag.pointer_up(&event) {
            Some(DragEvent::NodeEnd {
                node_id,
                position,
                movement,
                transform,
            }) => {
                self.move_node(&node_id, position);
                self.cancel_click = true;
                self.events.push(EditorEvent::NodeDragEnd {
                    node_id: node_id.clone(),
                    position,
                    movement,
                    transform,
                });
                if let Some(node) = self.diagram.node(&node_id) {
                    self.events.push(EditorEvent::NodeUpdate(node.clone()));
                }
                self.queue(Continuation::UnlockSelection);
            }
            Some(DragEvent::PanEnd { movement, selection }) => {
                if movement != ScreenVector::zero() {
                    self.apply_pan(movement, selection);
                }
                self.queue(Continuation::UnlockSelection);
            }
            _ => {}
        }
    }

    /// Abort whatever gesture is running. Nodes stay where they were last
    /// moved to; no end or update events are emitted.
    pub fn cancel_gesture(&mut self) -> bool {
        let draft = self.edge_draft.take().is_some();
        self.target_port = None;
        let drag = self.drag.cancel();
        if drag {
            self.selection.unlock_all();
        }
        draft || drag
    }

    /// Lock selection for a starting gesture, dropping any unlock still
    /// queued by the previous one.
    fn lock_selection(&mut self) {
        self.pending.retain(|step| *step != Continuation::UnlockSelection);
        self.selection.lock_all();
    }

    fn move_node(&mut self, node_id: &NodeId, position: LogicalPoint) {
        let Some(node) = self.diagram.node_mut(node_id) else {
            return;
        };
        let old = node.position().unwrap_or_else(LogicalPoint::origin);
        node.set_position(position);
        self.registry.translate_node(node_id, position - old);
        self.refresh_links();
    }

    fn apply_pan(&mut self, movement: ScreenVector, selection: ScreenVector) {
        self.transform.pan(movement);
        self.events.push(EditorEvent::Pan {
            movement,
            offset: self.transform.offset(),
            selection,
        });
    }

    // === Clicks ===

    /// Click on a node: toggles its selection and reports the click, unless
    /// the click ends a drag.
    pub fn node_click(&mut self, node_id: &NodeId, ctrl_key: bool) -> bool {
        if std::mem::take(&mut self.cancel_click) {
            log::trace!("click on {node_id} after drag suppressed");
            return false;
        }
        let Some(node) = self.diagram.node(node_id) else {
            return false;
        };
        self.selection.nodes.toggle(node_id.clone(), node.clone(), ctrl_key);
        self.events.push(EditorEvent::NodeClick {
            node_id: node_id.clone(),
            ctrl_key,
        });
        true
    }

    pub fn link_click(&mut self, link_id: &LinkId, ctrl_key: bool) -> bool {
        if !self.config.editable {
            return false;
        }
        let Some(link) = self.diagram.link(link_id) else {
            return false;
        };
        self.selection.links.toggle(link_id.clone(), link.clone(), ctrl_key);
        self.events.push(EditorEvent::LinkSelected {
            link_id: link_id.clone(),
            selected: self.selection.links.is_selected(link_id),
        });
        true
    }

    /// Click on the empty canvas: clears node and link selection unless a
    /// gesture holds the lock. Port selection is kept.
    pub fn background_click(&mut self) -> bool {
        let nodes = self.selection.nodes.deselect_handler();
        let links = self.selection.links.deselect_handler();
        nodes && links
    }

    // === Ports and edge drawing ===

    pub fn port_enter(&mut self, port: PortRef) {
        if self.config.editable && port.direction == PortDirection::Input {
            self.target_port = Some(Connector::new(port.node_id.clone(), port.port_name.clone()));
        }
        self.events.push(EditorEvent::PortEntered(port));
    }

    pub fn port_leave(&mut self, port: PortRef) {
        if port.direction == PortDirection::Input {
            let leaving = self
                .target_port
                .as_ref()
                .is_some_and(|t| t.node_id == port.node_id && t.port_name == port.port_name);
            if leaving {
                self.target_port = None;
            }
        }
        self.events.push(EditorEvent::PortLeft(port));
    }

    /// Port pressed. Pressing an output port of an editable diagram starts
    /// drawing a link.
    pub fn port_pressed(&mut self, port: PortRef, event: PointerEvent) -> bool {
        if event.is_non_primary() {
            return false;
        }
        self.events.push(EditorEvent::PortPressed {
            port: port.clone(),
            ctrl_key: event.ctrl_key,
        });
        if !self.config.editable
            || port.direction != PortDirection::Output
            || self.drag.is_active()
        {
            return false;
        }
        let Some(source_position) =
            self.registry.get_port(&port.node_id, port.direction, &port.port_name)
        else {
            log::debug!("edge start from unmeasured port {port}");
            return false;
        };
        log::debug!("edge start from {port}");
        self.edge_draft = Some(EdgeDraft {
            source: Connector::new(port.node_id, port.port_name),
            source_position,
            pointer: None,
        });
        true
    }

    fn finish_edge(&mut self) {
        let Some(draft) = self.edge_draft.take() else {
            return;
        };
        let target = self.target_port.take();
        if let (Some(target), Some(_)) = (target, draft.pointer) {
            log::debug!(
                "link created {}.{} -> {}.{}",
                draft.source.node_id,
                draft.source.port_name,
                target.node_id,
                target.port_name
            );
            self.events.push(EditorEvent::LinkCreated {
                source: draft.source,
                target,
            });
        }
    }

    /// Path of the link being drawn, once the pointer has moved.
    pub fn edge_draft_path(&self) -> Option<LinkPath> {
        let draft = self.edge_draft.as_ref()?;
        let pointer = draft.pointer?;
        Some(route(
            draft.source_position,
            pointer,
            self.config.default_stroke_width,
            self.links.style(),
        ))
    }

    // === View ===

    /// Zoom one wheel notch around the pointer, given in viewport
    /// coordinates. Returns the new scale.
    pub fn wheel(&mut self, pointer: ScreenPoint, delta_x: f32, delta_y: f32) -> f32 {
        let current = self.scale();
        let target = self
            .config
            .clamp_scale(wheel_scale(current, delta_x, delta_y, self.config.zoom_factor));
        if target != current {
            let container = self.surface.container_rect();
            self.transform.zoom_at_client_point(target, pointer, container);
            self.events.push(EditorEvent::ScaleChanged(self.scale()));
        }
        self.scale()
    }

    /// Zoom around the container center.
    pub fn zoom(&mut self, scale: f32) -> f32 {
        let target = self.config.clamp_scale(scale);
        let container = self.surface.container_rect();
        self.transform.zoom_centered(target, container);
        self.events.push(EditorEvent::ScaleChanged(self.scale()));
        self.scale()
    }

    /// Move the canvas so the node's position sits at the container center.
    pub fn pan_to_node(&mut self, node_id: &NodeId) -> bool {
        let Some(position) = self.diagram.node(node_id).and_then(|n| n.position()) else {
            return false;
        };
        let container = self.surface.container_rect();
        let center: ScreenVector =
            euclid::vec2(container.size.width / 2.0, container.size.height / 2.0);
        let anchor = position.to_vector().cast_unit::<Screen>() * self.scale();
        self.transform.set_offset(center - anchor);
        true
    }

    // === Rendering output ===

    /// Canvas transform for HTML content.
    pub fn transform_string(&self) -> String {
        self.transform.to_css_transform()
    }

    /// Canvas transform for SVG content.
    pub fn svg_transform_string(&self) -> String {
        self.transform.to_svg_transform()
    }

    pub fn node_transform(&self, node_id: &NodeId) -> Option<String> {
        Some(self.diagram.node(node_id)?.transform().to_string())
    }

    pub fn link_path(&self, link_id: &LinkId) -> Option<&RenderedLink> {
        self.links.get(link_id)
    }

    /// Every link with both endpoints measured, in diagram order.
    pub fn link_paths(&self) -> impl Iterator<Item = &RenderedLink> {
        self.links.iter()
    }

    pub fn drain_events(&mut self) -> Vec<EditorEvent> {
        let events = std::mem::take(&mut self.events);
        for event in &events {
            log::trace!("event {}", event.kind());
        }
        events
    }

    // === Hover ===

    pub fn hover(&mut self, target: HoverTarget, now: Instant) {
        let window = self.config.activation_window();
        let gate = self
            .hover
            .entry(target.clone())
            .or_insert_with(|| ActivationGate::new(window));
        if gate.activate(now) == Some(Transition::Activated) {
            self.events.push(EditorEvent::Activation { target, active: true });
        }
    }

    pub fn unhover(&mut self, target: &HoverTarget, now: Instant) {
        if let Some(gate) = self.hover.get_mut(target) {
            gate.deactivate(now);
        }
    }

    pub fn is_hovered(&self, target: &HoverTarget) -> bool {
        self.hover.get(target).is_some_and(ActivationGate::is_active)
    }

    /// Apply due hover deactivations.
    pub fn tick(&mut self, now: Instant) {
        for (target, gate) in self.hover.iter_mut() {
            if gate.poll(now) == Some(Transition::Deactivated) {
                self.events.push(EditorEvent::Activation {
                    target: target.clone(),
                    active: false,
                });
            }
        }
    }
}
