//! Notifications from the editor to the embedding application.
//!
//! The editor never calls back into the host. Everything it wants to report
//! is queued as an [`EditorEvent`] and handed out by
//! [`GraphEditor::drain_events`](crate::editor::GraphEditor::drain_events).

use crate::diagram::{Connector, LinkId, Node, NodeId, PortRef};
use crate::geometry::{LogicalPoint, LogicalVector, ScreenVector};

/// Something that can be hovered and highlighted.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum HoverTarget {
    Node(NodeId),
    Link(LinkId),
}

#[derive(Clone, Debug, PartialEq)]
pub enum EditorEvent {
    /// A node was clicked without being dragged.
    NodeClick { node_id: NodeId, ctrl_key: bool },
    NodeDragStart { node_id: NodeId, position: LogicalPoint },
    NodeDragMove {
        node_id: NodeId,
        position: LogicalPoint,
        movement: LogicalVector,
        /// Node transform string with the new `translate`.
        transform: String,
    },
    NodeDragEnd {
        node_id: NodeId,
        position: LogicalPoint,
        movement: LogicalVector,
        transform: String,
    },
    /// The node's metadata changed, e.g. its position after a drag.
    NodeUpdate(Node),
    /// A link was toggled in or out of the selection.
    LinkSelected { link_id: LinkId, selected: bool },
    /// The user drew a link from an output port to an input port. The host
    /// decides whether to add it to the diagram.
    LinkCreated { source: Connector, target: Connector },
    PortEntered(PortRef),
    PortLeft(PortRef),
    PortPressed { port: PortRef, ctrl_key: bool },
    ScaleChanged(f32),
    /// The canvas moved by `movement`; `offset` is the new canvas offset and
    /// `selection` the total movement of the current gesture.
    Pan {
        movement: ScreenVector,
        offset: ScreenVector,
        selection: ScreenVector,
    },
    /// Hover highlighting switched on or off.
    Activation { target: HoverTarget, active: bool },
}

impl EditorEvent {
    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NodeClick { .. } => "node-click",
            Self::NodeDragStart { .. } => "node-drag-start",
            Self::NodeDragMove { .. } => "node-drag-move",
            Self::NodeDragEnd { .. } => "node-drag-end",
            Self::NodeUpdate(_) => "node-update",
            Self::LinkSelected { .. } => "link-selected",
            Self::LinkCreated { .. } => "link-created",
            Self::PortEntered(_) => "port-entered",
            Self::PortLeft(_) => "port-left",
            Self::PortPressed { .. } => "port-pressed",
            Self::ScaleChanged(_) => "scale-changed",
            Self::Pan { .. } => "pan",
            Self::Activation { .. } => "activation",
        }
    }
}
