//! Diagram definitions: nodes, ports and links.
//!
//! These types mirror the JSON structure the embedding application hands to
//! the editor. The editor only ever adds geometry (`x`, `y`, `width`,
//! `height`) to node metadata; every other field round-trips unchanged,
//! including unknown metadata and port style fields.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::css::TransformList;
use crate::error::Result;
use crate::geometry::{logical_point, LogicalPoint, LogicalSize};

macro_rules! string_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(NodeId);
string_id!(LinkId);

/// Which side of a node a port sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortDirection {
    Input,
    Output,
}

impl std::fmt::Display for PortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Input => f.write_str("input"),
            Self::Output => f.write_str("output"),
        }
    }
}

fn default_port_radius() -> f32 {
    8.0
}

fn default_port_width() -> f32 {
    20.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub id: String,
    /// Unique within the owning node and direction.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_port_radius")]
    pub radius: f32,
    #[serde(default = "default_port_width")]
    pub width: f32,
    /// Color, stroke, css classes and so on. Opaque to the engine.
    #[serde(flatten)]
    pub style: Map<String, Value>,
}

impl Port {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            title: None,
            description: None,
            radius: default_port_radius(),
            width: default_port_width(),
            style: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ports {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub input: Vec<Port>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub output: Vec<Port>,
}

impl Ports {
    pub fn get(&self, direction: PortDirection) -> &[Port] {
        match direction {
            PortDirection::Input => &self.input,
            PortDirection::Output => &self.output,
        }
    }

    pub fn find(&self, direction: PortDirection, name: &str) -> Option<&Port> {
        self.get(direction).iter().find(|p| p.name == name)
    }
}

/// Node geometry plus arbitrary application fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub ports: Ports,
}

impl Node {
    pub fn new(id: impl Into<NodeId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            title: None,
            description: None,
            metadata: Metadata::default(),
            ports: Ports::default(),
        }
    }

    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.set_position(logical_point(x, y));
        self
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.metadata.width = Some(width);
        self.metadata.height = Some(height);
        self
    }

    pub fn with_port(mut self, direction: PortDirection, port: Port) -> Self {
        match direction {
            PortDirection::Input => self.ports.input.push(port),
            PortDirection::Output => self.ports.output.push(port),
        }
        self
    }

    /// Logical top-left corner, if the node has been placed.
    pub fn position(&self) -> Option<LogicalPoint> {
        Some(logical_point(self.metadata.x?, self.metadata.y?))
    }

    pub fn set_position(&mut self, position: LogicalPoint) {
        self.metadata.x = Some(position.x);
        self.metadata.y = Some(position.y);
    }

    /// Measured size, falling back to `default` per missing dimension.
    pub fn size_or(&self, default: LogicalSize) -> LogicalSize {
        LogicalSize::new(
            self.metadata.width.unwrap_or(default.width),
            self.metadata.height.unwrap_or(default.height),
        )
    }

    /// The CSS transform that places this node on the canvas.
    pub fn transform(&self) -> TransformList {
        let mut list = TransformList::new();
        let p = self.position().unwrap_or_else(|| logical_point(0.0, 0.0));
        list.set_translate_px(p.x, p.y);
        list
    }
}

/// One end of a link.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connector {
    #[serde(rename = "nodeId", alias = "id")]
    pub node_id: NodeId,
    #[serde(rename = "portName", alias = "port")]
    pub port_name: String,
}

impl Connector {
    pub fn new(node_id: impl Into<NodeId>, port_name: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            port_name: port_name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub id: LinkId,
    /// An output port.
    pub source: Connector,
    /// An input port.
    pub target: Connector,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f32>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl Link {
    pub fn new(id: impl Into<LinkId>, source: Connector, target: Connector) -> Self {
        Self {
            id: id.into(),
            source,
            target,
            stroke_width: None,
            metadata: Map::new(),
        }
    }
}

/// Identifies a port on a specific node, e.g. for port selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortRef {
    pub node_id: NodeId,
    pub direction: PortDirection,
    pub port_name: String,
}

impl PortRef {
    pub fn new(
        node_id: impl Into<NodeId>,
        direction: PortDirection,
        port_name: impl Into<String>,
    ) -> Self {
        Self {
            node_id: node_id.into(),
            direction,
            port_name: port_name.into(),
        }
    }
}

impl std::fmt::Display for PortRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.node_id, self.direction, self.port_name)
    }
}

/// A complete diagram as supplied by the embedding application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
    /// Links whose source is this id express containment by the diagram
    /// itself and are not laid out.
    pub id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl Diagram {
    pub fn new(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    pub fn node_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| &n.id == id)
    }

    pub fn link(&self, id: &LinkId) -> Option<&Link> {
        self.links.iter().find(|l| &l.id == id)
    }
}
