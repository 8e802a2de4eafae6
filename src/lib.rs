//! # graph-canvas
//!
//! Interaction and layout engine for node-link diagram editors.
//!
//! The crate keeps the state behind an editor canvas: where the canvas is
//! panned and zoomed to, where every port sits, how links between ports are
//! routed, what is being dragged and what is selected. It renders nothing.
//! A rendering surface reports measurements and pointer input, and reads
//! back transform strings, link paths and events.
//!
//! ## Coordinate spaces
//!
//! Positions are tagged with their space using `euclid` units:
//! [`Screen`](geometry::Screen) for viewport pixels and
//! [`Logical`](geometry::Logical) for the canvas content. A logical point is
//! shown at `logical * scale + offset`; see [`Transform`].
//!
//! ## Core pieces
//!
//! - [`GraphEditor`] - one open diagram, driven by a [`Surface`]
//! - [`Transform`] - canvas scale and offset, focal-point zoom
//! - [`PortRegistry`] - port positions in logical coordinates
//! - [`LinkManager`] / [`route`](route::route) - organic link curves
//! - [`DragController`] - node dragging and canvas panning
//! - [`SelectionManager`] - node, link and port selection with locking
//! - [`LayeredLayout`] - pluggable placement, plus [`auto_scale`](layout::auto_scale)
//!
//! ## Features
//!
//! - `layout` (default): `SugiyamaLayout`, a [`LayeredLayout`] backed by
//!   `rust-sugiyama`.
//! - `slint`: helpers that mirror selection and link paths into Slint
//!   `VecModel`s.

pub mod activation;
pub mod config;
pub mod css;
pub mod diagram;
pub mod drag;
pub mod editor;
pub mod error;
pub mod events;
pub mod geometry;
pub mod layout;
pub mod links;
pub mod registry;
pub mod route;
pub mod selection;
#[cfg(feature = "slint")]
pub mod slint_models;
pub mod transform;

pub use activation::{ActivationGate, Transition};
pub use config::{EditorConfig, InitialScale};
pub use css::TransformList;
pub use diagram::{
    Connector, Diagram, Link, LinkId, Metadata, Node, NodeId, Port, PortDirection, PortRef, Ports,
};
pub use drag::{DragController, DragEvent, DragState, DragStrategy, PointerEvent};
pub use editor::{EdgeDraft, GraphEditor, Surface};
pub use error::{ConfigError, Error, Result, TransformParseError};
pub use events::{EditorEvent, HoverTarget};
pub use layout::{Bounds, Direction, LayeredLayout, LayoutMode};
#[cfg(feature = "layout")]
pub use layout::{SugiyamaConfig, SugiyamaLayout};
pub use links::{LinkManager, RenderedLink};
pub use registry::{PortMeasurement, PortRegistry};
pub use route::{CurveStyle, LinkPath};
pub use selection::{SelectionManager, Selector};
#[cfg(feature = "slint")]
pub use slint_models::{sync_selection_to_model, LinkPathProvider};
pub use transform::Transform;
