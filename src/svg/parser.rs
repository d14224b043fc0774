use log::{debug, warn};
use quick_xml::Reader;
use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, Event};

use super::SvgDocument;
use super::path::{parse_numbers, parse_path_data, parse_points};
use crate::error::{IsometricError, Result};
use crate::types::{Drawable, Group, Line, Point, Shape, XForm, straight_chain};

/// Handle length of a cubic approximating a quarter circle of radius 1
const KAPPA: f64 = 0.552_284_749_830_793_4;

/// Attributes consumed as geometry for each element; the rest are carried through
fn geometric_attributes(element: &str) -> &'static [&'static str] {
    match element {
        "rect" => &["x", "y", "width", "height", "rx", "ry"],
        "circle" => &["cx", "cy", "r"],
        "ellipse" => &["cx", "cy", "rx", "ry"],
        "polygon" | "polyline" => &["points"],
        "line" => &["x1", "y1", "x2", "y2"],
        "path" => &["d"],
        "text" => &["x", "y", "dx", "dy"],
        _ => &[],
    }
}

/// Parse a transform list such as `translate(10 20) rotate(30)` into one XForm
pub fn parse_transform(s: &str) -> Result<XForm> {
    let mut total = XForm::identity();
    let mut rest = s.trim();

    while !rest.is_empty() {
        let open = rest
            .find('(')
            .ok_or_else(|| IsometricError::Unsupported(format!("transform '{s}'")))?;
        let close = rest[open..]
            .find(')')
            .map(|i| open + i)
            .ok_or_else(|| IsometricError::Unsupported(format!("transform '{s}'")))?;

        let name = rest[..open].trim();
        let args = parse_numbers(&rest[open + 1..close], "transform")?;
        let arg = |i: usize| args.get(i).copied();

        let xform = match (name, args.len()) {
            ("matrix", 6) => XForm {
                a: args[0],
                b: args[1],
                c: args[2],
                d: args[3],
                e: args[4],
                f: args[5],
            },
            ("translate", 1 | 2) => XForm::translate(args[0], arg(1).unwrap_or(0.0)),
            ("scale", 1 | 2) => XForm::scale(args[0], arg(1).unwrap_or(args[0])),
            ("rotate", 1) => XForm::rotate(args[0]),
            ("rotate", 3) => XForm::translate(args[1], args[2])
                .compose(&XForm::rotate(args[0]))
                .compose(&XForm::translate(-args[1], -args[2])),
            ("skewX", 1) => XForm::skew_x(args[0]),
            ("skewY", 1) => XForm::skew_y(args[0]),
            _ => {
                return Err(IsometricError::Unsupported(format!(
                    "transform {name} with {} arguments",
                    args.len()
                )));
            }
        };
        total = total.compose(&xform);
        rest = rest[close + 1..].trim_start_matches(|c: char| c.is_whitespace() || c == ',');
    }

    Ok(total)
}

fn element_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn read_attributes(e: &BytesStart) -> Vec<(String, String)> {
    e.attributes()
        .filter_map(|attr| match attr {
            Ok(attr) => Some(attr),
            Err(err) => {
                warn!("skipping malformed attribute on <{}>: {err}", element_name(e));
                None
            }
        })
        .map(|attr| {
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let raw = String::from_utf8_lossy(&attr.value);
            let value = unescape(&raw)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| raw.to_string());
            (key, value)
        })
        .collect()
}

/// Element attributes split into id, transform, geometry and passthrough
struct ElementAttributes {
    id: Option<String>,
    transform: Option<String>,
    geometry: Vec<(String, String)>,
    passthrough: Vec<(String, String)>,
}

impl ElementAttributes {
    fn split(element: &str, attrs: Vec<(String, String)>) -> Self {
        let geometric = geometric_attributes(element);
        let mut out = Self {
            id: None,
            transform: None,
            geometry: Vec::new(),
            passthrough: Vec::new(),
        };
        for (key, value) in attrs {
            match key.as_str() {
                "id" => out.id = Some(value),
                "transform" => out.transform = Some(value),
                k if geometric.contains(&k) => out.geometry.push((key, value)),
                _ => out.passthrough.push((key, value)),
            }
        }
        out
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.geometry
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Numeric geometry attribute; missing means 0, a `px` suffix is accepted.
    /// Text positions may be lists, in which case the first entry is used.
    fn number(&self, key: &str) -> Result<f64> {
        let Some(raw) = self.get(key) else {
            return Ok(0.0);
        };
        let value = raw.trim().trim_end_matches("px");
        parse_numbers(value, key)?
            .first()
            .copied()
            .ok_or_else(|| IsometricError::InvalidNumber {
                attribute: key.to_string(),
                value: raw.to_string(),
            })
    }

    fn xform(&self, parent: &XForm) -> Result<XForm> {
        match &self.transform {
            Some(t) => Ok(parent.compose(&parse_transform(t)?)),
            None => Ok(*parent),
        }
    }
}

fn ellipse_chain(cx: f64, cy: f64, rx: f64, ry: f64) -> Vec<Point> {
    let (kx, ky) = (rx * KAPPA, ry * KAPPA);
    vec![
        Point::new(cx + rx, cy),
        Point::new(cx + rx, cy + ky),
        Point::new(cx + kx, cy + ry),
        Point::new(cx, cy + ry),
        Point::new(cx - kx, cy + ry),
        Point::new(cx - rx, cy + ky),
        Point::new(cx - rx, cy),
        Point::new(cx - rx, cy - ky),
        Point::new(cx - kx, cy - ry),
        Point::new(cx, cy - ry),
        Point::new(cx + kx, cy - ry),
        Point::new(cx + rx, cy - ky),
        Point::new(cx + rx, cy),
    ]
}

fn apply(xform: &XForm, points: Vec<Point>) -> Vec<Point> {
    if xform.is_identity() {
        return points;
    }
    points.into_iter().map(|p| xform.transform_point(p)).collect()
}

fn vector_shape(attrs: &ElementAttributes, points: Vec<Point>, closed: bool) -> Drawable {
    let mut shape = Shape::from_points(points, closed);
    shape.id = attrs.id.clone();
    shape.attributes = attrs.passthrough.clone();
    shape.into()
}

fn line(attrs: &ElementAttributes, points: Vec<Point>) -> Drawable {
    let mut line = Line::new(points);
    line.id = attrs.id.clone();
    line.attributes = attrs.passthrough.clone();
    line.into()
}

/// Build the drawable for a leaf element, with `parent` and its own transform baked in
fn leaf_from_element(
    name: &str,
    attrs: Vec<(String, String)>,
    parent: &XForm,
) -> Result<Option<Drawable>> {
    if geometric_attributes(name).is_empty() {
        return Ok(None);
    }
    let attrs = ElementAttributes::split(name, attrs);
    let xf = attrs.xform(parent)?;

    let drawable = match name {
        "rect" => {
            let (x, y) = (attrs.number("x")?, attrs.number("y")?);
            let (w, h) = (attrs.number("width")?, attrs.number("height")?);
            if attrs.number("rx")? > 0.0 || attrs.number("ry")? > 0.0 {
                warn!("rounded rect corners are not preserved");
            }
            let corners = [
                Point::new(x, y),
                Point::new(x + w, y),
                Point::new(x + w, y + h),
                Point::new(x, y + h),
            ];
            let chain = apply(&xf, straight_chain(&corners, true));
            vector_shape(&attrs, chain, true)
        }
        "circle" => {
            let r = attrs.number("r")?;
            let chain = ellipse_chain(attrs.number("cx")?, attrs.number("cy")?, r, r);
            vector_shape(&attrs, apply(&xf, chain), true)
        }
        "ellipse" => {
            let chain = ellipse_chain(
                attrs.number("cx")?,
                attrs.number("cy")?,
                attrs.number("rx")?,
                attrs.number("ry")?,
            );
            vector_shape(&attrs, apply(&xf, chain), true)
        }
        "polygon" => {
            let corners = parse_points(attrs.get("points").unwrap_or_default())?;
            if corners.is_empty() {
                return Ok(None);
            }
            let chain = apply(&xf, straight_chain(&corners, true));
            vector_shape(&attrs, chain, true)
        }
        "polyline" => {
            let points = parse_points(attrs.get("points").unwrap_or_default())?;
            line(&attrs, apply(&xf, points))
        }
        "line" => {
            let points = vec![
                Point::new(attrs.number("x1")?, attrs.number("y1")?),
                Point::new(attrs.number("x2")?, attrs.number("y2")?),
            ];
            line(&attrs, apply(&xf, points))
        }
        "path" => {
            let mut subpaths = parse_path_data(attrs.get("d").unwrap_or_default())?;
            match subpaths.len() {
                0 => return Ok(None),
                1 => {
                    let sp = subpaths.remove(0);
                    vector_shape(&attrs, apply(&xf, sp.points), sp.closed)
                }
                n => {
                    debug!("splitting path with {n} subpaths into a group");
                    let children = subpaths
                        .into_iter()
                        .map(|sp| Drawable::from(Shape::from_points(apply(&xf, sp.points), sp.closed)))
                        .collect();
                    let mut group = Group::new(children);
                    group.id = attrs.id.clone();
                    group.attributes = attrs.passthrough.clone();
                    group.into()
                }
            }
        }
        _ => return Ok(None),
    };

    Ok(Some(drawable))
}

fn text_shape(attrs: Vec<(String, String)>, content: String, parent: &XForm) -> Result<Drawable> {
    let attrs = ElementAttributes::split("text", attrs);
    let xf = attrs.xform(parent)?;
    let anchor = xf.transform_point(Point::new(
        attrs.number("x")? + attrs.number("dx")?,
        attrs.number("y")? + attrs.number("dy")?,
    ));

    let mut shape = Shape::text(content, anchor, xf.rotation_degrees());
    shape.id = attrs.id;
    shape.attributes = attrs.passthrough;
    Ok(shape.into())
}

/// Collect character data up to the end of the current element.
///
/// Text is read untrimmed so the spaces around entity references survive;
/// only the outer whitespace of the whole string is dropped.
fn read_text(reader: &mut Reader<&[u8]>) -> Result<String> {
    reader.config_mut().trim_text(false);
    let text = collect_text(reader);
    reader.config_mut().trim_text(true);
    Ok(text?.trim().to_string())
}

fn collect_text(reader: &mut Reader<&[u8]>) -> Result<String> {
    let mut text = String::new();
    let mut buf = Vec::new();
    let mut depth = 1;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            Event::Text(e) => text.push_str(&String::from_utf8_lossy(&e)),
            Event::CData(e) => text.push_str(&String::from_utf8_lossy(&e)),
            Event::GeneralRef(r) => match r.resolve_char_ref()? {
                Some(ch) => text.push(ch),
                None => {
                    let name = String::from_utf8_lossy(&r);
                    match resolve_predefined_entity(&name) {
                        Some(resolved) => text.push_str(resolved),
                        None => warn!("dropping unknown entity &{name}; in text"),
                    }
                }
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(text)
}

/// Parse child elements until the enclosing element ends
fn parse_children(reader: &mut Reader<&[u8]>, parent: &XForm) -> Result<Vec<Drawable>> {
    let mut children = Vec::new();
    let mut buf = Vec::new();
    let mut skip_buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let name = element_name(&e);
                let attrs = read_attributes(&e);
                match name.as_str() {
                    "g" => {
                        let split = ElementAttributes::split("g", attrs);
                        let xf = split.xform(parent)?;
                        let mut group = Group::new(parse_children(reader, &xf)?);
                        group.id = split.id;
                        group.attributes = split.passthrough;
                        children.push(group.into());
                    }
                    "text" => {
                        let content = read_text(reader)?;
                        children.push(text_shape(attrs, content, parent)?);
                    }
                    _ => {
                        let leaf = leaf_from_element(&name, attrs, parent)?;
                        if leaf.is_none() {
                            warn!("skipping unsupported element <{name}>");
                        }
                        children.extend(leaf);
                        reader.read_to_end_into(e.name(), &mut skip_buf)?;
                        skip_buf.clear();
                    }
                }
            }
            Event::Empty(e) => {
                let name = element_name(&e);
                let attrs = read_attributes(&e);
                match name.as_str() {
                    "g" => {
                        let split = ElementAttributes::split("g", attrs);
                        let group = Group {
                            id: split.id,
                            attributes: split.passthrough,
                            ..Group::default()
                        };
                        children.push(group.into());
                    }
                    "text" => debug!("skipping empty <text>"),
                    _ => match leaf_from_element(&name, attrs, parent)? {
                        Some(leaf) => children.push(leaf),
                        None => warn!("skipping unsupported element <{name}>"),
                    },
                }
            }
            Event::End(_) | Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(children)
}

/// Parse an SVG document into a drawable tree
pub fn parse_svg(xml: &str) -> Result<SvgDocument> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if element_name(&e) == "svg" => {
                let attributes = root_attributes(&e);
                let drawables = parse_children(&mut reader, &XForm::identity())?;
                debug!("parsed {} top-level drawables", drawables.len());
                return Ok(SvgDocument {
                    attributes,
                    drawables,
                });
            }
            Event::Empty(e) if element_name(&e) == "svg" => {
                return Ok(SvgDocument {
                    attributes: root_attributes(&e),
                    drawables: Vec::new(),
                });
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Err(IsometricError::Unsupported(
        "document has no <svg> root element".to_string(),
    ))
}

/// Root attributes minus the ones recomputed on output
fn root_attributes(e: &BytesStart) -> Vec<(String, String)> {
    read_attributes(e)
        .into_iter()
        .filter(|(k, _)| !matches!(k.as_str(), "width" | "height" | "viewBox"))
        .collect()
}
