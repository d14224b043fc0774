use log::debug;
use quick_xml::escape::escape;

use super::SvgDocument;
use super::path::{f, generate_path_data};
use crate::bounds::{Bounds, curve_bounds, polyline_bounds};
use crate::flatten::flatten;
use crate::types::{Drawable, Label, Leaf, Line, Point, Shape};

const INDENT: &str = "    ";
/// Smallest viewBox extent; content that is flat along an axis is centred in it
const MIN_EXTENT: f64 = 100.0;

fn push_attributes(el: &mut String, attributes: &[(String, String)]) {
    for (key, value) in attributes {
        el.push_str(&format!(" {}=\"{}\"", key, escape(value.as_str())));
    }
}

fn push_id(el: &mut String, id: Option<&str>) {
    if let Some(id) = id {
        el.push_str(&format!(" id=\"{}\"", escape(id)));
    }
}

/// One `transform` attribute with a `rotate(deg px py)` for each non-zero
/// rotation. The last rotation listed is applied first.
fn push_rotations(el: &mut String, rotations: &[(f64, Point)]) {
    let parts: Vec<String> = rotations
        .iter()
        .filter(|(degrees, _)| degrees.abs() > 1e-12)
        .map(|(degrees, pivot)| {
            format!("rotate({} {} {})", f(*degrees), f(pivot.x), f(pivot.y))
        })
        .collect();
    if !parts.is_empty() {
        el.push_str(&format!(" transform=\"{}\"", parts.join(" ")));
    }
}

fn text_element(
    id: Option<&str>,
    label: &Label,
    anchor: Point,
    rotations: &[(f64, Point)],
) -> String {
    let mut el = format!("<text x=\"{}\" y=\"{}\"", f(anchor.x), f(anchor.y));
    push_id(&mut el, id);
    push_rotations(&mut el, rotations);
    el.push('>');
    el.push_str(&escape(label.text.as_str()));
    el.push_str("</text>");
    el
}

fn shape_to_svg_element(shape: &Shape, depth: usize) -> String {
    let center = shape.geometry.center();
    let turn = (shape.rotation, shape.rotation_pivot());

    if !shape.is_vector() {
        return match &shape.label {
            Some(label) => {
                let anchor = shape.geometry.origin;
                let mut el = text_element(
                    shape.id.as_deref(),
                    label,
                    anchor,
                    &[turn, (label.rotation, anchor)],
                );
                // attributes go before the closing '>' of the start tag
                if !shape.attributes.is_empty() {
                    let mut attrs = String::new();
                    push_attributes(&mut attrs, &shape.attributes);
                    if let Some(pos) = el.find('>') {
                        el.insert_str(pos, &attrs);
                    }
                }
                el
            }
            None => {
                debug!("shape without outline or label, skipping");
                String::new()
            }
        };
    }

    let mut el = format!(
        "<path d=\"{}\"",
        generate_path_data(&shape.points, shape.closed)
    );
    push_id(&mut el, shape.id.as_deref());
    push_attributes(&mut el, &shape.attributes);
    push_rotations(&mut el, &[turn]);
    el.push_str("/>");

    if let Some(label) = &shape.label {
        el.push('\n');
        el.push_str(&INDENT.repeat(depth));
        el.push_str(&text_element(
            None,
            label,
            center,
            &[turn, (label.rotation, center)],
        ));
    }
    el
}

fn line_to_svg_element(line: &Line) -> String {
    let points: Vec<String> = line
        .points
        .iter()
        .map(|p| format!("{},{}", f(p.x), f(p.y)))
        .collect();

    let mut el = format!("<polyline points=\"{}\"", points.join(" "));
    push_id(&mut el, line.id.as_deref());
    push_attributes(&mut el, &line.attributes);
    push_rotations(&mut el, &[(line.rotation, line.rotation_pivot())]);
    el.push_str("/>");
    el
}

/// Convert a drawable to an SVG element string
fn drawable_to_svg_element(drawable: &Drawable, depth: usize) -> String {
    match drawable {
        Drawable::Shape(shape) => shape_to_svg_element(shape, depth),
        Drawable::Line(line) => line_to_svg_element(line),
        Drawable::Group(group) => {
            let mut el = String::from("<g");
            push_id(&mut el, group.id.as_deref());
            push_attributes(&mut el, &group.attributes);

            let children: Vec<String> = group
                .children
                .iter()
                .map(|child| drawable_to_svg_element(child, depth + 1))
                .filter(|s| !s.is_empty())
                .collect();

            if children.is_empty() {
                el.push_str("/>");
                return el;
            }

            let inner = INDENT.repeat(depth + 1);
            el.push('>');
            for child in children {
                el.push('\n');
                el.push_str(&inner);
                el.push_str(&child);
            }
            el.push('\n');
            el.push_str(&INDENT.repeat(depth));
            el.push_str("</g>");
            el
        }
    }
}

/// Bounds of a leaf as drawn, with its rotation applied
fn rendered_bounds(leaf: Leaf<'_>) -> Option<Bounds> {
    match leaf {
        Leaf::Shape(shape) => {
            let xf = shape.rotation_xform();
            if shape.is_vector() {
                let points: Vec<Point> =
                    shape.points.iter().map(|p| xf.transform_point(*p)).collect();
                curve_bounds(&points)
            } else {
                let b = shape.geometry.bounds();
                let corners = [
                    Point::new(b.min_x, b.min_y),
                    Point::new(b.max_x, b.min_y),
                    Point::new(b.max_x, b.max_y),
                    Point::new(b.min_x, b.max_y),
                ];
                polyline_bounds(&corners.map(|p| xf.transform_point(p)))
            }
        }
        Leaf::Line(line) => {
            let xf = line.rotation_xform();
            let points: Vec<Point> =
                line.points.iter().map(|p| xf.transform_point(*p)).collect();
            polyline_bounds(&points)
        }
    }
}

/// `(min_x, min_y, width, height)` covering every leaf as drawn
fn view_box(doc: &SvgDocument) -> (f64, f64, f64, f64) {
    let Some(b) = flatten(&doc.drawables)
        .into_iter()
        .filter_map(rendered_bounds)
        .reduce(|mut acc, b| {
            acc.expand(&b);
            acc
        })
    else {
        return (0.0, 0.0, MIN_EXTENT, MIN_EXTENT);
    };

    let widen = |min: f64, extent: f64| {
        if extent > 0.0 {
            (min, extent)
        } else {
            (min - MIN_EXTENT / 2.0, MIN_EXTENT)
        }
    };
    let (min_x, w) = widen(b.min_x, b.width());
    let (min_y, h) = widen(b.min_y, b.height());
    (min_x, min_y, w, h)
}

/// Serialize a document, with the viewBox fitted to every leaf
pub fn document_to_svg(doc: &SvgDocument) -> String {
    let (min_x, min_y, w, h) = view_box(doc);

    let mut root = String::from("<svg");
    if !doc.attributes.iter().any(|(k, _)| k == "xmlns") {
        root.push_str(" xmlns=\"http://www.w3.org/2000/svg\"");
    }
    push_attributes(&mut root, &doc.attributes);
    root.push_str(&format!(
        " viewBox=\"{} {} {} {}\">",
        f(min_x),
        f(min_y),
        f(w),
        f(h)
    ));

    let elements: Vec<String> = doc
        .drawables
        .iter()
        .map(|d| drawable_to_svg_element(d, 1))
        .filter(|s| !s.is_empty())
        .collect();

    let mut svg = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?>\n");
    svg.push_str(&root);
    for el in elements {
        svg.push('\n');
        svg.push_str(INDENT);
        svg.push_str(&el);
    }
    svg.push_str("\n</svg>\n");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Group;

    #[test]
    fn test_empty_document_uses_default_view_box() {
        let svg = document_to_svg(&SvgDocument::default());
        assert!(svg.contains("viewBox=\"0 0 100 100\""));
        assert!(svg.contains("xmlns=\"http://www.w3.org/2000/svg\""));
    }

    #[test]
    fn test_rotated_shape_writes_pivot() {
        let mut shape = Shape::polygon(&[
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 4.0),
            Point::new(0.0, 4.0),
        ]);
        shape.rotation = 60.0;
        let el = shape_to_svg_element(&shape, 1);
        assert_eq!(
            el,
            "<path d=\"M0,0 L10,0 L10,4 L0,4 Z\" transform=\"rotate(60 5 2)\"/>"
        );
    }

    #[test]
    fn test_text_escapes_content() {
        let mut shape = Shape::text("a < b", Point::new(1.0, 2.0), 30.0);
        shape.attributes.push(("font-size".to_string(), "4".to_string()));
        let el = shape_to_svg_element(&shape, 1);
        assert_eq!(
            el,
            "<text x=\"1\" y=\"2\" transform=\"rotate(30 1 2)\" font-size=\"4\">a &lt; b</text>"
        );
    }

    #[test]
    fn test_view_box_covers_rotated_outline() {
        let mut shape = Shape::polygon(&[
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 4.0),
            Point::new(0.0, 4.0),
        ]);
        shape.rotation = 90.0;
        let doc = SvgDocument {
            drawables: vec![shape.into()],
            ..SvgDocument::default()
        };
        let (x, y, w, h) = view_box(&doc);
        assert_eq!(
            format!("{} {} {} {}", f(x), f(y), f(w), f(h)),
            "3 -3 4 10"
        );
    }

    #[test]
    fn test_text_only_document_is_padded() {
        let doc = SvgDocument {
            drawables: vec![Shape::text("Top", Point::new(22.0, 5.0), 0.0).into()],
            ..SvgDocument::default()
        };
        assert!(document_to_svg(&doc).contains("viewBox=\"-28 -45 100 100\""));
    }

    #[test]
    fn test_label_turns_with_shape_pivot() {
        let mut shape = Shape::polygon(&[
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 4.0),
        ]);
        shape.label = Some(Label::new("Side", 30.0));
        shape.rotation = 60.0;
        shape.pivot = Some(Point::new(0.0, 0.0));
        let el = shape_to_svg_element(&shape, 1);
        assert_eq!(
            el,
            "<path d=\"M0,0 L10,0 L10,4 Z\" transform=\"rotate(60 0 0)\"/>\n    \
             <text x=\"5\" y=\"2\" transform=\"rotate(60 0 0) rotate(30 5 2)\">Side</text>"
        );
    }

    #[test]
    fn test_nested_group_indentation() {
        let group: Drawable = Group::new(vec![
            Line::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)]).into(),
        ])
        .with_id("g")
        .into();
        let el = drawable_to_svg_element(&group, 1);
        assert_eq!(
            el,
            "<g id=\"g\">\n        <polyline points=\"0,0 1,1\"/>\n    </g>"
        );
    }
}
