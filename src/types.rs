use crate::bounds::{Bounds, curve_bounds, polyline_bounds};

/// 2D point. Transforms always build new points rather than mutating in place.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise comparison within `eps`
    pub fn fuzzy_eq(&self, other: &Point, eps: f64) -> bool {
        (self.x - other.x).abs() <= eps && (self.y - other.y).abs() <= eps
    }
}

/// Axis-aligned extent
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Declared box of a leaf: top-left origin plus size
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Geometry {
    pub origin: Point,
    pub size: Size,
}

impl Geometry {
    pub fn new(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.origin.x + self.size.width / 2.0,
            self.origin.y + self.size.height / 2.0,
        )
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(
            self.origin.x,
            self.origin.y,
            self.origin.x + self.size.width,
            self.origin.y + self.size.height,
        )
    }
}

impl From<Bounds> for Geometry {
    fn from(b: Bounds) -> Self {
        Geometry::new(Point::new(b.min_x, b.min_y), Size::new(b.width(), b.height()))
    }
}

/// 2D affine transformation matrix [a, b, c, d, e, f]
/// Represents: | a  c  e |
///             | b  d  f |
///             | 0  0  1 |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct XForm {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for XForm {
    fn default() -> Self {
        Self::identity()
    }
}

impl XForm {
    pub fn identity() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }

    pub fn translate(tx: f64, ty: f64) -> Self {
        Self {
            e: tx,
            f: ty,
            ..Self::identity()
        }
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self {
            a: sx,
            d: sy,
            ..Self::identity()
        }
    }

    /// Rotation by `deg` degrees about `pivot`
    pub fn rotate_about(deg: f64, pivot: Point) -> Self {
        Self::translate(pivot.x, pivot.y)
            .compose(&Self::rotate(deg))
            .compose(&Self::translate(-pivot.x, -pivot.y))
    }

    /// Rotation by `deg` degrees about the coordinate origin
    pub fn rotate(deg: f64) -> Self {
        let (sin, cos) = deg.to_radians().sin_cos();
        Self {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            e: 0.0,
            f: 0.0,
        }
    }

    pub fn skew_x(deg: f64) -> Self {
        Self {
            c: deg.to_radians().tan(),
            ..Self::identity()
        }
    }

    pub fn skew_y(deg: f64) -> Self {
        Self {
            b: deg.to_radians().tan(),
            ..Self::identity()
        }
    }

    /// Compose two transforms: self * other
    pub fn compose(&self, other: &XForm) -> XForm {
        XForm {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// Transform a point
    pub fn transform_point(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }

    /// The single point this transform leaves in place. `None` when there is no
    /// such point (pure translations) or every point is fixed (identity).
    pub fn fixed_point(&self) -> Option<Point> {
        let det = (1.0 - self.a) * (1.0 - self.d) - self.b * self.c;
        if det.abs() < 1e-12 {
            return None;
        }
        Some(Point::new(
            ((1.0 - self.d) * self.e + self.c * self.f) / det,
            (self.b * self.e + (1.0 - self.a) * self.f) / det,
        ))
    }

    /// Angle in degrees that the x axis is rotated by
    pub fn rotation_degrees(&self) -> f64 {
        self.b.atan2(self.a).to_degrees()
    }
}

/// Text attached to a shape, with its own rotation in degrees
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub rotation: f64,
}

impl Label {
    pub fn new(text: impl Into<String>, rotation: f64) -> Self {
        Self {
            text: text.into(),
            rotation,
        }
    }
}

/// Leaf drawable with an outline, optional label, declared geometry and rotation.
///
/// `points` is a cubic Bezier chain `[anchor, ctrl, ctrl, anchor, ...]`; it is
/// empty for non-vector shapes such as plain text. `rotation` is in degrees and
/// applies about `pivot`, or about the geometry centre when no pivot is set.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub id: Option<String>,
    pub points: Vec<Point>,
    pub closed: bool,
    pub label: Option<Label>,
    pub geometry: Geometry,
    pub rotation: f64,
    pub pivot: Option<Point>,
    /// Host attributes carried through untouched (fill, stroke, class, ...)
    pub attributes: Vec<(String, String)>,
}

impl Shape {
    /// Build a vector shape from a cubic Bezier chain
    pub fn from_points(points: Vec<Point>, closed: bool) -> Self {
        let mut shape = Self {
            id: None,
            points,
            closed,
            label: None,
            geometry: Geometry::default(),
            rotation: 0.0,
            pivot: None,
            attributes: Vec::new(),
        };
        shape.refresh_geometry();
        shape
    }

    /// Closed shape whose edges are the straight lines between `corners`
    pub fn polygon(corners: &[Point]) -> Self {
        Self::from_points(straight_chain(corners, true), true)
    }

    /// Non-vector shape carrying only a label anchored at `anchor`
    pub fn text(text: impl Into<String>, anchor: Point, rotation: f64) -> Self {
        Self {
            id: None,
            points: Vec::new(),
            closed: false,
            label: Some(Label::new(text, rotation)),
            geometry: Geometry::new(anchor, Size::default()),
            rotation: 0.0,
            pivot: None,
            attributes: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn is_vector(&self) -> bool {
        !self.points.is_empty()
    }

    /// Recompute the declared geometry from the outline. Non-vector shapes keep theirs.
    pub fn refresh_geometry(&mut self) {
        if let Some(b) = curve_bounds(&self.points) {
            self.geometry = b.into();
        }
    }

    /// Anchor points of the chain, without the Bezier handles
    pub fn anchors(&self) -> impl Iterator<Item = &Point> {
        self.points.iter().step_by(3)
    }

    pub fn rotation_pivot(&self) -> Point {
        self.pivot.unwrap_or_else(|| self.geometry.center())
    }

    /// The shape's rotation as a transform of its points
    pub fn rotation_xform(&self) -> XForm {
        XForm::rotate_about(self.rotation, self.rotation_pivot())
    }

    /// Turn the shape by a further `delta` degrees about `about`
    pub fn rotate_about(&mut self, delta: f64, about: Point) {
        if delta == 0.0 {
            return;
        }
        match fold_rotation(self.rotation, self.rotation_pivot(), delta, about) {
            RotationFold::About { degrees, pivot } => {
                self.rotation = degrees;
                self.pivot = Some(pivot);
            }
            RotationFold::Shift(t) => {
                self.rotation = 0.0;
                self.pivot = None;
                if self.is_vector() {
                    self.points = shifted(&self.points, t);
                    self.refresh_geometry();
                } else {
                    self.geometry.origin = Point::new(
                        self.geometry.origin.x + t.x,
                        self.geometry.origin.y + t.y,
                    );
                }
            }
        }
    }
}

/// Leaf drawable defined directly by its point sequence
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub id: Option<String>,
    pub points: Vec<Point>,
    pub rotation: f64,
    pub pivot: Option<Point>,
    pub attributes: Vec<(String, String)>,
}

impl Line {
    pub fn new(points: Vec<Point>) -> Self {
        Self {
            id: None,
            points,
            rotation: 0.0,
            pivot: None,
            attributes: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn bounds(&self) -> Option<Bounds> {
        polyline_bounds(&self.points)
    }

    /// Rotation pivot; the centre of the points when none is set
    pub fn rotation_pivot(&self) -> Point {
        self.pivot
            .or_else(|| self.bounds().map(|b| b.center()))
            .unwrap_or_default()
    }

    pub fn rotation_xform(&self) -> XForm {
        XForm::rotate_about(self.rotation, self.rotation_pivot())
    }

    /// Turn the line by a further `delta` degrees about `about`
    pub fn rotate_about(&mut self, delta: f64, about: Point) {
        if delta == 0.0 {
            return;
        }
        match fold_rotation(self.rotation, self.rotation_pivot(), delta, about) {
            RotationFold::About { degrees, pivot } => {
                self.rotation = degrees;
                self.pivot = Some(pivot);
            }
            RotationFold::Shift(t) => {
                self.rotation = 0.0;
                self.pivot = None;
                self.points = shifted(&self.points, t);
            }
        }
    }
}

/// Net effect of a rotation applied on top of an existing one
#[derive(Debug, Clone, Copy, PartialEq)]
enum RotationFold {
    About { degrees: f64, pivot: Point },
    /// The angles cancel out and only a translation is left
    Shift(Point),
}

/// Combine `degrees` about `pivot` followed by `delta` about `about`
fn fold_rotation(degrees: f64, pivot: Point, delta: f64, about: Point) -> RotationFold {
    if degrees == 0.0 {
        return RotationFold::About {
            degrees: delta,
            pivot: about,
        };
    }

    let total = degrees + delta;
    let m = XForm::rotate_about(delta, about).compose(&XForm::rotate_about(degrees, pivot));
    let turn = total.rem_euclid(360.0);
    if turn.min(360.0 - turn) > 1e-9 {
        if let Some(pivot) = m.fixed_point() {
            return RotationFold::About {
                degrees: total,
                pivot,
            };
        }
    }
    RotationFold::Shift(Point::new(m.e, m.f))
}

fn shifted(points: &[Point], t: Point) -> Vec<Point> {
    points
        .iter()
        .map(|p| Point::new(p.x + t.x, p.y + t.y))
        .collect()
}

/// Container of drawables. Carries no geometry of its own.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Group {
    pub id: Option<String>,
    pub children: Vec<Drawable>,
    pub attributes: Vec<(String, String)>,
}

impl Group {
    pub fn new(children: Vec<Drawable>) -> Self {
        Self {
            id: None,
            children,
            attributes: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// All possible drawable types
#[derive(Debug, Clone, PartialEq)]
pub enum Drawable {
    Shape(Shape),
    Line(Line),
    Group(Group),
}

impl Drawable {
    pub fn id(&self) -> Option<&str> {
        match self {
            Drawable::Shape(s) => s.id.as_deref(),
            Drawable::Line(l) => l.id.as_deref(),
            Drawable::Group(g) => g.id.as_deref(),
        }
    }

    pub fn id_mut(&mut self) -> &mut Option<String> {
        match self {
            Drawable::Shape(s) => &mut s.id,
            Drawable::Line(l) => &mut l.id,
            Drawable::Group(g) => &mut g.id,
        }
    }

    /// Append `suffix` to this drawable's id and every descendant id
    pub fn suffix_ids(&mut self, suffix: &str) {
        let mut stack: Vec<&mut Drawable> = vec![self];
        while let Some(node) = stack.pop() {
            if let Some(id) = node.id_mut() {
                id.push_str(suffix);
            }
            if let Drawable::Group(g) = node {
                stack.extend(g.children.iter_mut());
            }
        }
    }
}

impl From<Shape> for Drawable {
    fn from(s: Shape) -> Self {
        Drawable::Shape(s)
    }
}

impl From<Line> for Drawable {
    fn from(l: Line) -> Self {
        Drawable::Line(l)
    }
}

impl From<Group> for Drawable {
    fn from(g: Group) -> Self {
        Drawable::Group(g)
    }
}

/// Borrowed terminal drawable, as produced by flattening
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Leaf<'a> {
    Shape(&'a Shape),
    Line(&'a Line),
}

impl<'a> Leaf<'a> {
    pub fn id(&self) -> Option<&'a str> {
        match *self {
            Leaf::Shape(s) => s.id.as_deref(),
            Leaf::Line(l) => l.id.as_deref(),
        }
    }

    /// Bounds of the leaf's own geometry. `None` for a line without points.
    pub fn bounds(&self) -> Option<Bounds> {
        match *self {
            Leaf::Shape(s) => Some(s.geometry.bounds()),
            Leaf::Line(l) => l.bounds(),
        }
    }
}

/// Mutably borrowed terminal drawable
#[derive(Debug, PartialEq)]
pub enum LeafMut<'a> {
    Shape(&'a mut Shape),
    Line(&'a mut Line),
}

impl LeafMut<'_> {
    pub fn as_leaf(&self) -> Leaf<'_> {
        match self {
            LeafMut::Shape(s) => Leaf::Shape(s),
            LeafMut::Line(l) => Leaf::Line(l),
        }
    }
}

/// Chain of degenerate cubics tracing straight edges through `corners`
pub(crate) fn straight_chain(corners: &[Point], closed: bool) -> Vec<Point> {
    let Some(&first) = corners.first() else {
        return Vec::new();
    };

    let mut chain = vec![first];
    let mut prev = first;
    for &p in &corners[1..] {
        chain.extend([prev, p, p]);
        prev = p;
    }

    if closed && corners.len() > 1 && prev != first {
        chain.extend([prev, first, first]);
    }
    chain
}
