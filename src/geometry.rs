//! Typed coordinate spaces.
//!
//! The rendering surface measures everything in **screen** space (pixels
//! relative to the viewport). Nodes, ports and links live in **logical**
//! space, which is independent of the current pan and zoom. Both spaces use
//! `euclid` unit tags so a screen point can never be passed where a logical
//! point is expected without going through [`Transform`](crate::Transform)
//! or an explicit offset/scale conversion.

/// Unit tag for viewport (pixel) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {}

/// Unit tag for diagram coordinates, independent of pan and zoom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Logical {}

pub type ScreenPoint = euclid::Point2D<f32, Screen>;
pub type ScreenVector = euclid::Vector2D<f32, Screen>;
pub type ScreenRect = euclid::Rect<f32, Screen>;

pub type LogicalPoint = euclid::Point2D<f32, Logical>;
pub type LogicalVector = euclid::Vector2D<f32, Logical>;
pub type LogicalSize = euclid::Size2D<f32, Logical>;

pub fn screen_point(x: f32, y: f32) -> ScreenPoint {
    euclid::point2(x, y)
}

pub fn screen_vector(x: f32, y: f32) -> ScreenVector {
    euclid::vec2(x, y)
}

pub fn logical_point(x: f32, y: f32) -> LogicalPoint {
    euclid::point2(x, y)
}

pub fn logical_vector(x: f32, y: f32) -> LogicalVector {
    euclid::vec2(x, y)
}

/// The container (canvas) bounding rectangle in screen space.
pub fn container_rect(x: f32, y: f32, width: f32, height: f32) -> ScreenRect {
    euclid::rect(x, y, width, height)
}

/// Convert a measured screen position into scale-independent logical
/// coordinates: `(screen - container_offset) / scale`.
///
/// A non-positive or non-finite scale is treated as `1.0`.
pub fn screen_to_logical(
    point: ScreenPoint,
    container_offset: ScreenPoint,
    scale: f32,
) -> LogicalPoint {
    let s = if scale > 0.0 && scale.is_finite() { scale } else { 1.0 };
    ((point - container_offset) / s).cast_unit::<Logical>().to_point()
}

/// Inverse of [`screen_to_logical`].
pub fn logical_to_screen(
    point: LogicalPoint,
    container_offset: ScreenPoint,
    scale: f32,
) -> ScreenPoint {
    let s = if scale > 0.0 && scale.is_finite() { scale } else { 1.0 };
    container_offset + (point.to_vector() * s).cast_unit::<Screen>()
}
