use std::collections::{HashMap, HashSet};

use crate::diagram::{NodeId, PortDirection};
use crate::geometry::{screen_to_logical, LogicalPoint, LogicalSize, LogicalVector, ScreenPoint};

/// A port position as measured by the rendering surface, in viewport pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct PortMeasurement {
    pub direction: PortDirection,
    pub port_name: String,
    pub position: ScreenPoint,
}

impl PortMeasurement {
    pub fn new(direction: PortDirection, port_name: impl Into<String>, x: f32, y: f32) -> Self {
        Self {
            direction,
            port_name: port_name.into(),
            position: euclid::point2(x, y),
        }
    }
}

/// Logical port positions of one node, keyed by port name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodePorts {
    pub input: HashMap<String, LogicalPoint>,
    pub output: HashMap<String, LogicalPoint>,
}

impl NodePorts {
    fn side(&self, direction: PortDirection) -> &HashMap<String, LogicalPoint> {
        match direction {
            PortDirection::Input => &self.input,
            PortDirection::Output => &self.output,
        }
    }

    fn side_mut(&mut self, direction: PortDirection) -> &mut HashMap<String, LogicalPoint> {
        match direction {
            PortDirection::Input => &mut self.input,
            PortDirection::Output => &mut self.output,
        }
    }
}

/// Spatial state of the open diagram: measured node sizes and port
/// positions.
///
/// Port positions are stored in logical coordinates, normalized at capture
/// time, so they stay valid across later pan and zoom changes. Nodes whose
/// ports were remeasured are remembered as dirty until [`take_dirty`]
/// hands them to the link layer.
///
/// [`take_dirty`]: PortRegistry::take_dirty
#[derive(Debug, Default)]
pub struct PortRegistry {
    node_sizes: HashMap<NodeId, LogicalSize>,
    ports: HashMap<NodeId, NodePorts>,
    dirty: HashSet<NodeId>,
}

impl PortRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every stored port of `node_id` with the given measurements.
    pub fn update_node_ports<I>(
        &mut self,
        node_id: &NodeId,
        measurements: I,
        container_offset: ScreenPoint,
        scale: f32,
    ) where
        I: IntoIterator<Item = PortMeasurement>,
    {
        let mut ports = NodePorts::default();
        for m in measurements {
            let logical = screen_to_logical(m.position, container_offset, scale);
            ports.side_mut(m.direction).insert(m.port_name, logical);
        }
        log::trace!(
            "node {node_id}: {} input / {} output ports measured",
            ports.input.len(),
            ports.output.len()
        );
        self.ports.insert(node_id.clone(), ports);
        self.dirty.insert(node_id.clone());
    }

    /// Position of a port, or `None` if it has not been measured yet.
    pub fn get_port(
        &self,
        node_id: &NodeId,
        direction: PortDirection,
        port_name: &str,
    ) -> Option<LogicalPoint> {
        self.ports.get(node_id)?.side(direction).get(port_name).copied()
    }

    /// Shift every port of a node that moved without being remeasured.
    pub fn translate_node(&mut self, node_id: &NodeId, delta: LogicalVector) {
        let Some(ports) = self.ports.get_mut(node_id) else {
            return;
        };
        for p in ports.input.values_mut().chain(ports.output.values_mut()) {
            *p += delta;
        }
        self.dirty.insert(node_id.clone());
    }

    pub fn node_ports(&self, node_id: &NodeId) -> Option<&NodePorts> {
        self.ports.get(node_id)
    }

    pub fn report_node_size(&mut self, node_id: &NodeId, size: LogicalSize) {
        self.node_sizes.insert(node_id.clone(), size);
    }

    pub fn node_size(&self, node_id: &NodeId) -> Option<LogicalSize> {
        self.node_sizes.get(node_id).copied()
    }

    pub fn measured_node_count(&self) -> usize {
        self.node_sizes.len()
    }

    /// Nodes whose ports changed since the last call.
    pub fn take_dirty(&mut self) -> HashSet<NodeId> {
        std::mem::take(&mut self.dirty)
    }

    pub fn clear(&mut self) {
        self.node_sizes.clear();
        self.ports.clear();
        self.dirty.clear();
    }
}
