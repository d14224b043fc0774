//! Affine kernels that map flat point lists onto isometric planes.
//!
//! Every kernel is a pure function: inputs are borrowed, a new point list of the
//! same length and order is returned.

use std::fmt;
use std::str::FromStr;

use crate::error::{IsometricError, Result};
use crate::types::{Point, Size};

/// cos(30°), the horizontal foreshortening of an isometric face
pub const COS_30: f64 = 0.866_025_403_784_438_6;
/// 1 / cos(30°)
pub const COS_30_INV: f64 = 1.154_700_538_379_251_5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl FromStr for Axis {
    type Err = IsometricError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "x" | "width" | "horizontal" => Ok(Axis::X),
            "y" | "height" | "vertical" => Ok(Axis::Y),
            _ => Err(IsometricError::InvalidArgument(format!("unknown axis: {s}"))),
        }
    }
}

/// One of the four conventional isometric faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaneType {
    Left,
    Right,
    TopLeft,
    TopRight,
}

impl PlaneType {
    pub const ALL: [PlaneType; 4] = [
        PlaneType::Left,
        PlaneType::Right,
        PlaneType::TopLeft,
        PlaneType::TopRight,
    ];

    /// Vertical skew applied after the horizontal scale, in degrees
    pub fn skew_angle(self) -> f64 {
        match self {
            PlaneType::Left | PlaneType::TopRight => 30.0,
            PlaneType::Right | PlaneType::TopLeft => -30.0,
        }
    }

    /// Added to the whole-shape rotation, in degrees
    pub fn rotation_delta(self) -> f64 {
        match self {
            PlaneType::Left | PlaneType::Right => 0.0,
            PlaneType::TopLeft => 60.0,
            PlaneType::TopRight => -60.0,
        }
    }

    /// Added to a label's rotation so text follows the new edge direction
    pub fn label_rotation_delta(self) -> f64 {
        match self {
            PlaneType::Left | PlaneType::TopLeft => 30.0,
            PlaneType::Right | PlaneType::TopRight => -30.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PlaneType::Left => "left",
            PlaneType::Right => "right",
            PlaneType::TopLeft => "topLeft",
            PlaneType::TopRight => "topRight",
        }
    }
}

impl fmt::Display for PlaneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PlaneType {
    type Err = IsometricError;

    /// Accepts `topLeft`, `top-left`, `top_left` and so on, case-insensitively
    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "left" => Ok(PlaneType::Left),
            "right" => Ok(PlaneType::Right),
            "topleft" => Ok(PlaneType::TopLeft),
            "topright" => Ok(PlaneType::TopRight),
            _ => Err(IsometricError::InvalidArgument(format!(
                "invalid plane type: {s}"
            ))),
        }
    }
}

/// Vertical shear anchored at `origin_x`: y' = y + (x - origin_x) * tan(angle)
pub fn skew_y(points: &[Point], angle_deg: f64, origin_x: f64) -> Vec<Point> {
    let tan = angle_deg.to_radians().tan();
    points
        .iter()
        .map(|p| Point::new(p.x, p.y + (p.x - origin_x) * tan))
        .collect()
}

/// Horizontal shear anchored at `origin_y`: x' = x + (y - origin_y) * tan(angle)
pub fn skew_x(points: &[Point], angle_deg: f64, origin_y: f64) -> Vec<Point> {
    let tan = angle_deg.to_radians().tan();
    points
        .iter()
        .map(|p| Point::new(p.x + (p.y - origin_y) * tan, p.y))
        .collect()
}

/// Multiply one component of a size, leaving the other unchanged
pub fn scale_axis(size: Size, axis: Axis, factor: f64) -> Size {
    match axis {
        Axis::X => Size::new(size.width * factor, size.height),
        Axis::Y => Size::new(size.width, size.height * factor),
    }
}

/// Scale one coordinate of every point about `anchor`
pub fn scale_points(points: &[Point], axis: Axis, factor: f64, anchor: Point) -> Vec<Point> {
    points
        .iter()
        .map(|p| match axis {
            Axis::X => Point::new(anchor.x + (p.x - anchor.x) * factor, p.y),
            Axis::Y => Point::new(p.x, anchor.y + (p.y - anchor.y) * factor),
        })
        .collect()
}

/// Map a flat outline onto `plane`.
///
/// x is scaled by cos 30° about `origin.x`, then the result is skewed vertically
/// by the plane's angle, anchored at the same `origin.x`. The plane's rotation
/// delta is not applied here; it belongs to the shape, not its points.
pub fn make_plane(points: &[Point], plane: PlaneType, origin: Point) -> Vec<Point> {
    let scaled = scale_points(points, Axis::X, COS_30, origin);
    skew_y(&scaled, plane.skew_angle(), origin.x)
}
