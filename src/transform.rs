//! Canvas pan/zoom state.
//!
//! [`Transform`] owns the canvas `scale` and `offset`. Content is rendered as
//! `translate(offset) scale(scale)`, so a logical point lands on screen at
//! `logical * scale + offset`.

use crate::css::TransformList;
use crate::geometry::{LogicalPoint, Logical, Screen, ScreenPoint, ScreenRect, ScreenVector};

/// Smallest scale the model will ever hold.
pub const MIN_SCALE_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    scale: f32,
    offset: ScreenVector,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: ScreenVector::zero(),
        }
    }
}

impl Transform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn offset(&self) -> ScreenVector {
        self.offset
    }

    /// Replace scale and offset wholesale (e.g. after auto-fit).
    pub fn set(&mut self, scale: f32, offset: ScreenVector) {
        self.scale = sanitize_scale(scale);
        self.offset = offset;
    }

    pub fn set_offset(&mut self, offset: ScreenVector) {
        self.offset = offset;
    }

    /// Back to scale 1, offset 0.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Rescale while keeping the logical point under `focal_point` fixed.
    ///
    /// `focal_point` is in container-relative screen coordinates. Returns the
    /// scale actually applied (after clamping to a positive epsilon).
    pub fn zoom_to_focal_point(&mut self, target_scale: f32, focal_point: ScreenPoint) -> f32 {
        let target = sanitize_scale(target_scale);
        let relative = focal_point.to_vector() - self.offset;
        let scale_factor = target / self.scale;
        let adjustment = relative * scale_factor - relative;
        self.offset -= adjustment;
        self.scale = target;
        log::trace!("zoom to {target} around ({}, {})", focal_point.x, focal_point.y);
        target
    }

    /// Zoom around a point given in client (window) coordinates, converting
    /// it to container-relative coordinates first.
    pub fn zoom_at_client_point(
        &mut self,
        target_scale: f32,
        client_point: ScreenPoint,
        container: ScreenRect,
    ) -> f32 {
        let relative = client_point - container.origin.to_vector();
        self.zoom_to_focal_point(target_scale, relative)
    }

    /// Zoom around the container center.
    pub fn zoom_centered(&mut self, target_scale: f32, container: ScreenRect) -> f32 {
        let center = euclid::point2(container.size.width / 2.0, container.size.height / 2.0);
        self.zoom_to_focal_point(target_scale, center)
    }

    pub fn pan(&mut self, movement: ScreenVector) {
        self.offset += movement;
    }

    /// Container-relative screen point → logical point.
    pub fn screen_to_logical(&self, point: ScreenPoint) -> LogicalPoint {
        ((point.to_vector() - self.offset) / self.scale)
            .cast_unit::<Logical>()
            .to_point()
    }

    /// Logical point → container-relative screen point.
    pub fn logical_to_screen(&self, point: LogicalPoint) -> ScreenPoint {
        ((point.to_vector() * self.scale).cast_unit::<Screen>() + self.offset).to_point()
    }

    /// `translate(xpx,ypx) scale(s)` for HTML content.
    pub fn to_css_transform(&self) -> String {
        self.transform_list(true).write(",")
    }

    /// `translate(x,y) scale(s)` for SVG content (unitless).
    pub fn to_svg_transform(&self) -> String {
        self.transform_list(false).write(",")
    }

    fn transform_list(&self, with_units: bool) -> TransformList {
        let mut list = TransformList::new();
        list.set("scale", [self.scale.to_string()]);
        if with_units {
            list.set_translate_px(self.offset.x, self.offset.y);
        } else {
            list.set("translate", [self.offset.x.to_string(), self.offset.y.to_string()]);
        }
        list
    }
}

/// Clamp a requested scale into the valid range: positive and finite.
pub fn sanitize_scale(scale: f32) -> f32 {
    if scale.is_nan() || scale <= 0.0 {
        MIN_SCALE_EPSILON
    } else if scale.is_infinite() {
        f32::MAX
    } else {
        scale.max(MIN_SCALE_EPSILON)
    }
}

/// Scale reached by one wheel notch.
///
/// The wheel direction is taken from `delta_y`, or from `delta_x` when the
/// vertical delta is zero (horizontal scrolling devices).
pub fn wheel_scale(current: f32, delta_x: f32, delta_y: f32, zoom_factor: f32) -> f32 {
    let delta = if delta_y == 0.0 && delta_x != 0.0 { delta_x } else { delta_y };
    let wheel = if delta < 0.0 { 1.0 } else { -1.0 };
    current * (wheel * zoom_factor / 3.0).exp()
}
