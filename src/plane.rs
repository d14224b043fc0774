//! Applying transforms to a whole selection.
//!
//! A selection is flattened to its leaves and one origin is taken from the
//! union of their bounds. Every leaf is transformed about that shared origin,
//! so a composite moves as a rigid unit instead of each piece skewing about
//! its own corner.

use log::debug;

use crate::bounds::combined_bounds;
use crate::error::Result;
use crate::flatten::flatten_mut;
use crate::transform::{Axis, PlaneType, make_plane, scale_axis, scale_points, skew_y};
use crate::types::{Drawable, LeafMut, Point};

/// Host-side configuration for a plane transform
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlaneOptions {
    /// Transform clones of the selection and leave the originals untouched
    pub duplicate: bool,
    /// Replaces the shared origin's x coordinate
    pub zero_offset: Option<f64>,
}

/// Map one leaf onto `plane` about `origin`.
///
/// Non-vector shapes keep their geometry; only their label turns. The plane's
/// rotation is left to [`rotate_leaf`], which needs a pivot shared by the
/// whole selection.
pub fn make_plane_leaf(leaf: &mut LeafMut<'_>, plane: PlaneType, origin: Point) {
    match leaf {
        LeafMut::Shape(shape) => {
            if shape.is_vector() {
                shape.points = make_plane(&shape.points, plane, origin);
                shape.refresh_geometry();
            }
            if let Some(label) = shape.label.as_mut() {
                label.rotation += plane.label_rotation_delta();
            }
        }
        LeafMut::Line(line) => {
            line.points = make_plane(&line.points, plane, origin);
        }
    }
}

/// Add `degrees` to a leaf's rotation, turning it about `pivot`
pub fn rotate_leaf(leaf: &mut LeafMut<'_>, degrees: f64, pivot: Point) {
    match leaf {
        LeafMut::Shape(shape) => shape.rotate_about(degrees, pivot),
        LeafMut::Line(line) => line.rotate_about(degrees, pivot),
    }
}

fn shared_origin(leaves: &[LeafMut<'_>], zero_offset: Option<f64>) -> Option<Point> {
    let bounds = combined_bounds(leaves.iter().map(LeafMut::as_leaf))?;
    let mut origin = bounds.origin();
    if let Some(x) = zero_offset {
        origin.x = x;
    }
    Some(origin)
}

/// Transform every leaf of `selection` onto `plane` about one shared origin.
///
/// Returns the number of leaves transformed. An empty selection, or one with no
/// measurable leaves, is left alone and yields 0.
pub fn apply_plane<'a>(
    selection: impl IntoIterator<Item = &'a mut Drawable>,
    plane: PlaneType,
    zero_offset: Option<f64>,
) -> usize {
    let mut leaves = flatten_mut(selection);
    let Some(origin) = shared_origin(&leaves, zero_offset) else {
        debug!("make plane {plane}: nothing to transform");
        return 0;
    };

    debug!(
        "make plane {plane}: {} leaves about ({}, {})",
        leaves.len(),
        origin.x,
        origin.y
    );
    for leaf in &mut leaves {
        make_plane_leaf(leaf, plane, origin);
    }

    // One pivot for every leaf keeps a composite rigid under the rotation
    let delta = plane.rotation_delta();
    if delta != 0.0 {
        if let Some(bounds) = combined_bounds(leaves.iter().map(LeafMut::as_leaf)) {
            let pivot = bounds.center();
            debug!("make plane {plane}: rotating {delta}° about ({}, {})", pivot.x, pivot.y);
            for leaf in &mut leaves {
                rotate_leaf(leaf, delta, pivot);
            }
        }
    }
    leaves.len()
}

/// [`apply_plane`] taking the plane by name.
///
/// An unknown name fails with `InvalidArgument` before anything is modified.
pub fn apply_plane_by_name<'a>(
    selection: impl IntoIterator<Item = &'a mut Drawable>,
    plane: &str,
    zero_offset: Option<f64>,
) -> Result<usize> {
    let plane: PlaneType = plane.parse()?;
    Ok(apply_plane(selection, plane, zero_offset))
}

/// Clone `selection`, transform the clones and hand them back to the host
pub fn duplicate_and_make_plane<'a>(
    selection: impl IntoIterator<Item = &'a Drawable>,
    plane: PlaneType,
    zero_offset: Option<f64>,
) -> Vec<Drawable> {
    let mut duplicates: Vec<Drawable> = selection.into_iter().cloned().collect();
    apply_plane(&mut duplicates, plane, zero_offset);
    duplicates
}

/// Vertical skew of a whole selection about the shared minX, without the
/// horizontal scale or any rotation
pub fn apply_skew_y<'a>(
    selection: impl IntoIterator<Item = &'a mut Drawable>,
    angle_deg: f64,
    zero_offset: Option<f64>,
) -> usize {
    let mut leaves = flatten_mut(selection);
    let Some(origin) = shared_origin(&leaves, zero_offset) else {
        return 0;
    };

    debug!("skew {angle_deg}°: {} leaves about x = {}", leaves.len(), origin.x);
    for leaf in &mut leaves {
        match leaf {
            LeafMut::Shape(shape) => {
                if shape.is_vector() {
                    shape.points = skew_y(&shape.points, angle_deg, origin.x);
                    shape.refresh_geometry();
                }
            }
            LeafMut::Line(line) => line.points = skew_y(&line.points, angle_deg, origin.x),
        }
    }
    leaves.len()
}

/// Scale the declared size of every leaf along `axis`.
///
/// Each leaf keeps its own geometry origin; contained points are re-mapped
/// proportionally inside the scaled box.
pub fn apply_scale<'a>(
    selection: impl IntoIterator<Item = &'a mut Drawable>,
    axis: Axis,
    factor: f64,
) -> usize {
    let mut leaves = flatten_mut(selection);
    for leaf in &mut leaves {
        match leaf {
            LeafMut::Shape(shape) => {
                let anchor = shape.geometry.origin;
                shape.geometry.size = scale_axis(shape.geometry.size, axis, factor);
                if shape.is_vector() {
                    shape.points = scale_points(&shape.points, axis, factor, anchor);
                    shape.refresh_geometry();
                }
            }
            LeafMut::Line(line) => {
                if let Some(b) = line.bounds() {
                    line.points = scale_points(&line.points, axis, factor, b.origin());
                }
            }
        }
    }
    debug!("scale {axis:?} by {factor}: {} leaves", leaves.len());
    leaves.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::COS_30;
    use crate::types::{Group, Leaf, Line, Shape};

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Shape {
        Shape::polygon(&[
            Point::new(x, y),
            Point::new(x + w, y),
            Point::new(x + w, y + h),
            Point::new(x, y + h),
        ])
    }

    #[test]
    fn test_make_plane_leaf_text_only_turns_label() {
        let mut shape = Shape::text("Front", Point::new(3.0, 4.0), 0.0);
        let before = shape.geometry;
        make_plane_leaf(
            &mut LeafMut::Shape(&mut shape),
            PlaneType::TopRight,
            Point::new(0.0, 0.0),
        );
        assert_eq!(shape.geometry, before);
        assert_eq!(shape.rotation, 0.0);
        assert_eq!(shape.label.as_ref().unwrap().rotation, -30.0);
    }

    #[test]
    fn test_apply_plane_text_rotates_in_place() {
        let mut sel: Vec<Drawable> = vec![Shape::text("Front", Point::new(3.0, 4.0), 0.0).into()];
        apply_plane(&mut sel, PlaneType::TopRight, None);
        let Drawable::Shape(s) = &sel[0] else {
            panic!("expected shape");
        };
        // A lone zero-size leaf is its own pivot
        assert_eq!(s.rotation, -60.0);
        assert_eq!(s.pivot, Some(Point::new(3.0, 4.0)));
        assert_eq!(s.geometry.origin, Point::new(3.0, 4.0));
    }

    #[test]
    fn test_top_plane_rotates_about_one_pivot() {
        let mut sel: Vec<Drawable> = vec![
            Group::new(vec![
                rect(0.0, 0.0, 10.0, 10.0).into(),
                rect(10.0, 0.0, 10.0, 10.0).into(),
            ])
            .into(),
            Line::new(vec![Point::new(0.0, 20.0), Point::new(20.0, 20.0)]).into(),
        ];
        apply_plane(&mut sel, PlaneType::TopLeft, None);

        let mut pivots = Vec::new();
        for leaf in crate::flatten::flatten(&sel) {
            match leaf {
                Leaf::Shape(s) => pivots.push(s.rotation_pivot()),
                Leaf::Line(l) => pivots.push(l.rotation_pivot()),
            }
        }
        assert_eq!(pivots.len(), 3);
        assert!(pivots.iter().all(|p| *p == pivots[0]));
    }

    #[test]
    fn test_opposite_top_planes_cancel_rotation() {
        let mut sel: Vec<Drawable> = vec![rect(0.0, 0.0, 10.0, 10.0).into()];
        apply_plane(&mut sel, PlaneType::TopLeft, None);
        apply_plane(&mut sel, PlaneType::TopRight, None);
        let Drawable::Shape(s) = &sel[0] else {
            panic!("expected shape");
        };
        assert_eq!(s.rotation, 0.0);
        assert_eq!(s.pivot, None);
    }

    #[test]
    fn test_apply_plane_empty_selection() {
        let mut empty: Vec<Drawable> = Vec::new();
        assert_eq!(apply_plane(&mut empty, PlaneType::Left, None), 0);

        let mut hollow: Vec<Drawable> = vec![Group::new(vec![Group::default().into()]).into()];
        let before = hollow.clone();
        assert_eq!(apply_plane(&mut hollow, PlaneType::Left, None), 0);
        assert_eq!(hollow, before);
    }

    #[test]
    fn test_zero_offset_overrides_origin() {
        let mut sel: Vec<Drawable> = vec![rect(10.0, 0.0, 10.0, 10.0).into()];
        apply_plane(&mut sel, PlaneType::Left, Some(0.0));
        let Drawable::Shape(s) = &sel[0] else {
            panic!("expected shape");
        };
        // x = 10 scales to 8.66 about 0 and is lifted by 8.66 * tan 30 = 5
        assert!((s.points[0].x - 10.0 * COS_30).abs() < 1e-9);
        assert!((s.points[0].y - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_apply_skew_y_keeps_rotation() {
        let mut sel: Vec<Drawable> = vec![
            rect(0.0, 0.0, 10.0, 10.0).into(),
            Line::new(vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)]).into(),
        ];
        assert_eq!(apply_skew_y(&mut sel, -30.0, None), 2);
        let Drawable::Line(l) = &sel[1] else {
            panic!("expected line");
        };
        assert!((l.points[1].y + 10.0 * 30f64.to_radians().tan()).abs() < 1e-9);
        assert_eq!(l.rotation, 0.0);
    }

    #[test]
    fn test_apply_scale_keeps_origin() {
        let mut sel: Vec<Drawable> = vec![rect(5.0, 5.0, 10.0, 20.0).into()];
        apply_scale(&mut sel, Axis::Y, 0.5);
        let Drawable::Shape(s) = &sel[0] else {
            panic!("expected shape");
        };
        assert_eq!(s.geometry.origin, Point::new(5.0, 5.0));
        assert!((s.geometry.size.height - 10.0).abs() < 1e-9);
        assert!((s.geometry.size.width - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_apply_scale_non_vector_scales_box() {
        let mut shape = Shape::text("t", Point::new(1.0, 1.0), 0.0);
        shape.geometry.size.width = 4.0;
        let mut sel: Vec<Drawable> = vec![shape.into()];
        apply_scale(&mut sel, Axis::X, 0.5);
        let Drawable::Shape(s) = &sel[0] else {
            panic!("expected shape");
        };
        assert_eq!(s.geometry.size.width, 2.0);
    }
}
