//! Pointer gesture to drag movement.
//!
//! A gesture goes `Idle → Initiated → Dragging → Idle`:
//!
//! - pointer down starts a session (`Initiated`) unless it is a non-primary
//!   button or the caller's predicate vetoes it;
//! - the first pointer move switches to `Dragging` and reports the start;
//! - later moves are reported only once the movement since the last report
//!   exceeds the sensitivity threshold;
//! - pointer up reports the end and tears the session down.
//!
//! A gesture released while still `Initiated` produces no events at all
//! beyond what the caller did on pointer down, so it can be treated as a
//! click.
//!
//! What the movement means depends on the [`DragStrategy`]: a node drag
//! tracks an absolute logical position, a pan accumulates relative screen
//! deltas.

use crate::css::TransformList;
use crate::diagram::NodeId;
use crate::error::TransformParseError;
use crate::geometry::{Logical, LogicalPoint, LogicalVector, ScreenPoint, ScreenVector};

pub const PRIMARY_BUTTON: u8 = 1;
pub const SECONDARY_BUTTON: u8 = 2;

/// A pointer event from the rendering surface, in viewport coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub position: ScreenPoint,
    /// Bitmask of pressed buttons, see [`PRIMARY_BUTTON`] and friends.
    pub buttons: u8,
    pub ctrl_key: bool,
}

impl PointerEvent {
    /// A primary-button event at `(x, y)`.
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            position: euclid::point2(x, y),
            buttons: PRIMARY_BUTTON,
            ctrl_key: false,
        }
    }

    pub fn with_buttons(mut self, buttons: u8) -> Self {
        self.buttons = buttons;
        self
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl_key = true;
        self
    }

    /// True if buttons are pressed but the primary one is not.
    pub fn is_non_primary(&self) -> bool {
        self.buttons != 0 && self.buttons & PRIMARY_BUTTON == 0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragState {
    Idle,
    Initiated,
    Dragging,
}

/// Moves one node. Positions are logical; pointer deltas are divided by the
/// drag scale.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeDrag {
    node_id: NodeId,
    transform: TransformList,
    scale: f32,
    origin: LogicalPoint,
    position: LogicalPoint,
    last_reported: LogicalPoint,
}

impl NodeDrag {
    pub fn new(node_id: NodeId, transform: &str, scale: f32) -> Result<Self, TransformParseError> {
        let transform = TransformList::parse(transform)?;
        let origin = transform.position_or(euclid::point2(0.0, 0.0))?;
        Ok(Self {
            node_id,
            transform,
            scale: if scale > 0.0 && scale.is_finite() { scale } else { 1.0 },
            origin,
            position: origin,
            last_reported: origin,
        })
    }

    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    pub fn position(&self) -> LogicalPoint {
        self.position
    }

    /// The node's transform string with `translate` set to the current
    /// position; all other functions are kept.
    pub fn transform_string(&self) -> String {
        let mut transform = self.transform.clone();
        transform.set_translate_px(self.position.x, self.position.y);
        transform.to_string()
    }

    fn track(&mut self, pointer_delta: ScreenVector) -> LogicalVector {
        self.position = self.origin + (pointer_delta / self.scale).cast_unit::<Logical>();
        self.position - self.last_reported
    }
}

/// Moves the canvas. Only relative movement matters.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PanDrag {
    pending: ScreenVector,
    selection: ScreenVector,
}

impl PanDrag {
    /// Total reported movement of this gesture.
    pub fn selection(&self) -> ScreenVector {
        self.selection
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DragStrategy {
    Node(NodeDrag),
    Pan(PanDrag),
}

impl DragStrategy {
    pub fn node(node_id: NodeId, transform: &str, scale: f32) -> Result<Self, TransformParseError> {
        Ok(Self::Node(NodeDrag::new(node_id, transform, scale)?))
    }

    pub fn pan() -> Self {
        Self::Pan(PanDrag::default())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DragEvent {
    NodeStart {
        node_id: NodeId,
        position: LogicalPoint,
    },
    NodeMove {
        node_id: NodeId,
        position: LogicalPoint,
        movement: LogicalVector,
        transform: String,
    },
    NodeEnd {
        node_id: NodeId,
        position: LogicalPoint,
        movement: LogicalVector,
        transform: String,
    },
    PanStart,
    Pan {
        movement: ScreenVector,
        selection: ScreenVector,
    },
    PanEnd {
        /// Movement not yet reported by a `Pan` event.
        movement: ScreenVector,
        selection: ScreenVector,
    },
}

#[derive(Debug)]
struct DragSession {
    strategy: DragStrategy,
    dragging: bool,
    pointer_down: ScreenPoint,
    last_pointer: ScreenPoint,
}

/// Drives at most one drag session at a time.
#[derive(Debug)]
pub struct DragController {
    session: Option<DragSession>,
    sensitivity: f32,
}

impl Default for DragController {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl DragController {
    pub fn new(sensitivity: f32) -> Self {
        Self {
            session: None,
            sensitivity: sensitivity.max(0.0),
        }
    }

    pub fn state(&self) -> DragState {
        match &self.session {
            None => DragState::Idle,
            Some(s) if s.dragging => DragState::Dragging,
            Some(_) => DragState::Initiated,
        }
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn strategy(&self) -> Option<&DragStrategy> {
        self.session.as_ref().map(|s| &s.strategy)
    }

    /// Start a gesture. Returns `false` (and stays idle) for non-primary
    /// buttons.
    pub fn begin(&mut self, strategy: DragStrategy, event: &PointerEvent) -> bool {
        self.begin_with(strategy, event, |_| true)
    }

    /// Start a gesture unless `allow` rejects the event.
    pub fn begin_with<F>(&mut self, strategy: DragStrategy, event: &PointerEvent, allow: F) -> bool
    where
        F: FnOnce(&PointerEvent) -> bool,
    {
        if event.is_non_primary() {
            log::trace!("ignoring gesture start with buttons {:#b}", event.buttons);
            return false;
        }
        if !allow(event) {
            log::trace!("gesture start vetoed");
            return false;
        }
        if self.session.is_some() {
            log::debug!("replacing an unfinished drag session");
        }
        self.session = Some(DragSession {
            strategy,
            dragging: false,
            pointer_down: event.position,
            last_pointer: event.position,
        });
        true
    }

    /// Feed a pointer move. Events without an active session are ignored.
    pub fn pointer_move(&mut self, event: &PointerEvent) -> Option<DragEvent> {
        let sensitivity = self.sensitivity;
        let session = self.session.as_mut()?;
        let step = event.position - session.last_pointer;
        session.last_pointer = event.position;

        if !session.dragging {
            session.dragging = true;
            return Some(match &session.strategy {
                DragStrategy::Node(drag) => {
                    log::debug!("node {} drag start", drag.node_id);
                    DragEvent::NodeStart {
                        node_id: drag.node_id.clone(),
                        position: drag.origin,
                    }
                }
                DragStrategy::Pan(_) => {
                    log::debug!("pan start");
                    DragEvent::PanStart
                }
            });
        }

        let exceeds = |dx: f32, dy: f32| dx.abs() > sensitivity || dy.abs() > sensitivity;
        match &mut session.strategy {
            DragStrategy::Node(drag) => {
                let movement = drag.track(event.position - session.pointer_down);
                if !exceeds(movement.x, movement.y) {
                    return None;
                }
                drag.last_reported = drag.position;
                log::trace!("node {} at ({}, {})", drag.node_id, drag.position.x, drag.position.y);
                Some(DragEvent::NodeMove {
                    node_id: drag.node_id.clone(),
                    position: drag.position,
                    movement,
                    transform: drag.transform_string(),
                })
            }
            DragStrategy::Pan(pan) => {
                pan.pending += step;
                if !exceeds(pan.pending.x, pan.pending.y) {
                    return None;
                }
                let movement = std::mem::replace(&mut pan.pending, ScreenVector::zero());
                pan.selection += movement;
                Some(DragEvent::Pan {
                    movement,
                    selection: pan.selection,
                })
            }
        }
    }

    /// Finish the gesture. Only produces an event if dragging had started.
    pub fn pointer_up(&mut self, event: &PointerEvent) -> Option<DragEvent> {
        let mut session = self.session.take()?;
        if !session.dragging {
            log::trace!("gesture released before dragging");
            return None;
        }
        match &mut session.strategy {
            DragStrategy::Node(drag) => {
                let movement = drag.track(event.position - session.pointer_down);
                log::debug!("node {} drag end", drag.node_id);
                Some(DragEvent::NodeEnd {
                    node_id: drag.node_id.clone(),
                    position: drag.position,
                    movement,
                    transform: drag.transform_string(),
                })
            }
            DragStrategy::Pan(pan) => {
                let movement = pan.pending + (event.position - session.last_pointer);
                pan.selection += movement;
                log::debug!("pan end");
                Some(DragEvent::PanEnd {
                    movement,
                    selection: pan.selection,
                })
            }
        }
    }

    /// Drop the active session without reporting anything.
    pub fn cancel(&mut self) -> bool {
        let cancelled = self.session.take().is_some();
        if cancelled {
            log::debug!("drag cancelled");
        }
        cancelled
    }
}
