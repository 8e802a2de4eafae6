//! Automatic placement and fit-to-view.
//!
//! Placement is delegated to a [`LayeredLayout`] implementation. With the
//! `layout` feature enabled, [`SugiyamaLayout`] provides one backed by the
//! `rust-sugiyama` crate. The layered algorithm works in `f64`; positions are
//! converted to `f32` logical coordinates when written back to nodes.
//!
//! [`compute_bounds`] and [`auto_scale`] derive the initial view: the scale
//! that fits the diagram width into the container, and the offset that
//! centers it horizontally with its top at the container's vertical center.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::diagram::{Diagram, Node, NodeId};
use crate::geometry::{logical_point, LogicalSize, ScreenRect, ScreenVector};

/// Layout direction for layered placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Direction {
    /// Layers flow top to bottom.
    #[default]
    TopToBottom,
    /// Layers flow left to right.
    LeftToRight,
}

/// Which nodes receive a computed position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutMode {
    /// Only nodes without a position.
    #[default]
    MissingOnly,
    /// Every node, overwriting existing positions.
    All,
}

/// Input for a layered layout: vertex sizes indexed by position, and edges
/// between vertex indices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutGraph {
    pub sizes: Vec<(f64, f64)>,
    pub edges: Vec<(u32, u32)>,
}

/// A positioned vertex returned by a [`LayeredLayout`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodePosition {
    /// Index into [`LayoutGraph::sizes`].
    pub index: usize,
    /// X coordinate of the top-left corner.
    pub x: f64,
    /// Y coordinate of the top-left corner.
    pub y: f64,
}

/// A layered-graph placement algorithm.
pub trait LayeredLayout {
    fn layout(&self, graph: &LayoutGraph, direction: Direction) -> Vec<NodePosition>;
}

/// Build the layout graph of a diagram.
///
/// Node sizes come from metadata, falling back to `default_size`. Links whose
/// source is the diagram itself, self loops, links to unknown nodes and
/// duplicate node pairs are left out.
pub fn layout_graph(diagram: &Diagram, default_size: LogicalSize) -> LayoutGraph {
    let sizes = diagram
        .nodes
        .iter()
        .map(|node| {
            let size = node.size_or(default_size);
            (size.width as f64, size.height as f64)
        })
        .collect();

    let index_of = |id: &NodeId| {
        diagram
            .nodes
            .iter()
            .position(|n: &Node| &n.id == id)
            .map(|i| i as u32)
    };
    let mut seen = HashSet::new();
    let edges = diagram
        .links
        .iter()
        .filter(|link| link.source.node_id != diagram.id)
        .filter_map(|link| Some((index_of(&link.source.node_id)?, index_of(&link.target.node_id)?)))
        .filter(|(src, dst)| src != dst)
        .filter(|edge| seen.insert(*edge))
        .collect();

    LayoutGraph { sizes, edges }
}

/// Place the diagram's nodes. Returns how many nodes were positioned.
pub fn layout_diagram(
    diagram: &mut Diagram,
    layout: &dyn LayeredLayout,
    direction: Direction,
    default_size: LogicalSize,
    mode: LayoutMode,
) -> usize {
    if mode == LayoutMode::MissingOnly && diagram.nodes.iter().all(|n| n.position().is_some()) {
        return 0;
    }
    let graph = layout_graph(diagram, default_size);
    let mut placed = 0;
    for p in layout.layout(&graph, direction) {
        let Some(node) = diagram.nodes.get_mut(p.index) else {
            continue;
        };
        if mode == LayoutMode::MissingOnly && node.position().is_some() {
            continue;
        }
        node.set_position(logical_point(p.x as f32, p.y as f32));
        placed += 1;
    }
    log::debug!("layout placed {placed} of {} nodes", diagram.nodes.len());
    placed
}

/// Extent of a set of nodes in logical coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub top: f32,
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
}

impl Bounds {
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }
}

/// Bounding box of every positioned node, including its size. `None` if no
/// node has a position yet.
pub fn compute_bounds<'a, I>(nodes: I, default_size: LogicalSize) -> Option<Bounds>
where
    I: IntoIterator<Item = &'a Node>,
{
    nodes.into_iter().fold(None, |acc, node| {
        let Some(position) = node.position() else {
            return acc;
        };
        let size = node.size_or(default_size);
        let (right, bottom) = (position.x + size.width, position.y + size.height);
        Some(match acc {
            None => Bounds {
                top: position.y,
                left: position.x,
                bottom,
                right,
            },
            Some(b) => Bounds {
                top: b.top.min(position.y),
                left: b.left.min(position.x),
                bottom: b.bottom.max(bottom),
                right: b.right.max(right),
            },
        })
    })
}

/// Scale and offset that fit `bounds` into a container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fit {
    pub scale: f32,
    pub offset: ScreenVector,
}

/// Fit the bounds' width to the container width, center horizontally and
/// put the top edge at the container's vertical center.
///
/// Zero-width bounds keep scale 1.
pub fn auto_scale(container: ScreenRect, bounds: &Bounds) -> Fit {
    let width = bounds.width();
    let scale = if width > 0.0 { container.size.width / width } else { 1.0 };
    let offset = euclid::vec2(
        container.size.width / 2.0 - (bounds.left + width / 2.0) * scale,
        container.size.height / 2.0 - bounds.top * scale,
    );
    Fit { scale, offset }
}

#[cfg(feature = "layout")]
pub use sugiyama::{SugiyamaConfig, SugiyamaLayout};

#[cfg(feature = "layout")]
mod sugiyama {
    use super::{Direction, LayeredLayout, LayoutGraph, NodePosition};

    /// Settings for [`SugiyamaLayout`].
    #[derive(Debug, Clone, Copy)]
    #[non_exhaustive]
    pub struct SugiyamaConfig {
        /// Minimum spacing between vertices. `0.0` uses the `rust-sugiyama`
        /// default.
        pub vertex_spacing: f64,
        /// Minimum edge length between layers. `0` uses the `rust-sugiyama`
        /// default.
        pub minimum_length: u32,
        pub dummy_vertices: bool,
    }

    impl Default for SugiyamaConfig {
        fn default() -> Self {
            Self {
                vertex_spacing: 120.0,
                minimum_length: 0,
                dummy_vertices: false,
            }
        }
    }

    /// Layered layout backed by `rust-sugiyama`.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SugiyamaLayout {
        pub config: SugiyamaConfig,
    }

    impl SugiyamaLayout {
        pub fn new(config: SugiyamaConfig) -> Self {
            Self { config }
        }
    }

    impl LayeredLayout for SugiyamaLayout {
        fn layout(&self, graph: &LayoutGraph, direction: Direction) -> Vec<NodePosition> {
            if graph.sizes.is_empty() {
                return Vec::new();
            }
            let horizontal = direction == Direction::LeftToRight;

            // Layers run along y; for a horizontal layout swap the axes going
            // in and coming back out.
            let vertices: Vec<(u32, (f64, f64))> = graph
                .sizes
                .iter()
                .enumerate()
                .map(|(i, &(w, h))| (i as u32, if horizontal { (h, w) } else { (w, h) }))
                .collect();

            let mut sg_config = rust_sugiyama::configure::Config {
                dummy_vertices: self.config.dummy_vertices,
                ..Default::default()
            };
            if self.config.vertex_spacing > 0.0 {
                sg_config.vertex_spacing = self.config.vertex_spacing;
            }
            if self.config.minimum_length > 0 {
                sg_config.minimum_length = self.config.minimum_length;
            }

            let subgraphs =
                rust_sugiyama::from_vertices_and_edges(&vertices, &graph.edges, &sg_config);

            let mut results = Vec::with_capacity(graph.sizes.len());
            for (layout, _width, _height) in &subgraphs {
                for &(index, (x, y)) in layout {
                    if index < graph.sizes.len() {
                        let (x, y) = if horizontal { (y, x) } else { (x, y) };
                        results.push(NodePosition { index, x, y });
                    }
                }
            }
            results
        }
    }

}
