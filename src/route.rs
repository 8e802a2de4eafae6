//! Link routing: control points and bounding boxes for connector curves.

use crate::geometry::{logical_point, LogicalPoint, LogicalSize, LogicalVector};

/// Targets less than this far to the right of the source count as backward.
const BACKWARD_TOLERANCE: f32 = 5.0;

/// Shape constants of the organic curve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurveStyle {
    /// Strength of backward loops. Control points move `dx * curve / 200`.
    pub curve: f32,
    /// Vertical spans shorter than half of this curl both control points
    /// upward instead of toward the direction of travel.
    pub node_size: f32,
}

impl Default for CurveStyle {
    fn default() -> Self {
        Self {
            curve: 300.0,
            node_size: 300.0,
        }
    }
}

/// The two bezier control points of a link.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlPoints {
    pub c1: LogicalPoint,
    pub c2: LogicalPoint,
}

/// Control points for a link running from `source` to `target`.
///
/// Forward links get a symmetric S-curve. Links whose target sits left of
/// (or barely right of) the source loop around with control points pushed
/// out proportionally to the horizontal distance.
pub fn organic_curve(
    source: LogicalPoint,
    target: LogicalPoint,
    style: &CurveStyle,
) -> ControlPoints {
    if target.x - BACKWARD_TOLERANCE < source.x {
        let f = (source.x - target.x) * style.curve / 200.0;
        if (target.y - source.y).abs() < style.node_size / 2.0 {
            ControlPoints {
                c1: logical_point(source.x + f, source.y - f),
                c2: logical_point(target.x - f, target.y - f),
            }
        } else {
            let toward = if target.y > source.y { f } else { -f };
            ControlPoints {
                c1: logical_point(source.x + f, source.y + toward),
                c2: logical_point(target.x - f, target.y - toward),
            }
        }
    } else {
        let mid_x = source.x + (target.x - source.x) / 2.0;
        ControlPoints {
            c1: logical_point(mid_x, source.y),
            c2: logical_point(mid_x, target.y),
        }
    }
}

/// Box enclosing both endpoints, padded by half the stroke width.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    /// Top-left corner in logical space; the path's local origin.
    pub origin: LogicalPoint,
    pub size: LogicalSize,
}

impl BoundingBox {
    pub fn around(source: LogicalPoint, target: LogicalPoint, stroke_width: f32) -> Self {
        let padding = stroke_width.max(0.0) / 2.0;
        let min = source.min(target);
        let max = source.max(target);
        Self {
            origin: logical_point(min.x - padding, min.y - padding),
            size: LogicalSize::new(max.x - min.x + 2.0 * padding, max.y - min.y + 2.0 * padding),
        }
    }

    /// Translate a logical point into box-local coordinates.
    pub fn to_local(&self, point: LogicalPoint) -> LogicalPoint {
        point - self.origin.to_vector()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
    MoveTo(LogicalPoint),
    CubicTo {
        ctrl1: LogicalPoint,
        ctrl2: LogicalPoint,
        to: LogicalPoint,
    },
}

/// A routed link: where to place it and what to draw, in box-local
/// coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkPath {
    pub bounds: BoundingBox,
    pub commands: Vec<PathCommand>,
}

impl LinkPath {
    /// `transformX` / `transformY` for the rendering surface.
    pub fn transform(&self) -> LogicalVector {
        self.bounds.origin.to_vector()
    }

    /// SVG path data, e.g. `"M 6 6 C 56 6 56 106 106 106"`.
    pub fn to_svg(&self) -> String {
        self.commands
            .iter()
            .map(|command| match command {
                PathCommand::MoveTo(p) => format!("M {} {}", p.x, p.y),
                PathCommand::CubicTo { ctrl1, ctrl2, to } => {
                    format!("C {} {} {} {} {} {}", ctrl1.x, ctrl1.y, ctrl2.x, ctrl2.y, to.x, to.y)
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl std::fmt::Display for LinkPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_svg())
    }
}

/// Route a link between two known port positions.
pub fn route(
    source: LogicalPoint,
    target: LogicalPoint,
    stroke_width: f32,
    style: &CurveStyle,
) -> LinkPath {
    let bounds = BoundingBox::around(source, target, stroke_width);
    let from = bounds.to_local(source);
    let to = bounds.to_local(target);
    let ControlPoints { c1, c2 } = organic_curve(from, to, style);
    LinkPath {
        bounds,
        commands: vec![
            PathCommand::MoveTo(from),
            PathCommand::CubicTo {
                ctrl1: c1,
                ctrl2: c2,
                to,
            },
        ],
    }
}
