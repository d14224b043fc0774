use crate::types::{Leaf, Point};

/// Bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn expand(&mut self, other: &Bounds) {
        self.min_x = self.min_x.min(other.min_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_x = self.max_x.max(other.max_x);
        self.max_y = self.max_y.max(other.max_y);
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Top-left corner, used as the transform origin
    pub fn origin(&self) -> Point {
        Point::new(self.min_x, self.min_y)
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }
}

/// Calculate Bezier curve extrema (t values where derivative is zero)
fn bezier_extrema(p0: Point, c0: Point, c1: Point, p1: Point) -> Vec<f64> {
    fn get_extrema(a: f64, b: f64, c: f64, d: f64) -> Vec<f64> {
        let mut res = Vec::new();
        let aa = -a + 3.0 * b - 3.0 * c + d;
        let bb = 2.0 * (a - 2.0 * b + c);
        let cc = b - a;

        if aa.abs() < 1e-8 {
            if bb.abs() > 1e-8 {
                let t = -cc / bb;
                if t > 0.0 && t < 1.0 {
                    res.push(t);
                }
            }
        } else {
            let disc = bb * bb - 4.0 * aa * cc;
            if disc >= 0.0 {
                let sqrt_d = disc.sqrt();
                let t1 = (-bb + sqrt_d) / (2.0 * aa);
                let t2 = (-bb - sqrt_d) / (2.0 * aa);
                if t1 > 0.0 && t1 < 1.0 {
                    res.push(t1);
                }
                if t2 > 0.0 && t2 < 1.0 {
                    res.push(t2);
                }
            }
        }
        res
    }

    let mut result = get_extrema(p0.x, c0.x, c1.x, p1.x);
    result.extend(get_extrema(p0.y, c0.y, c1.y, p1.y));
    result.sort_by(f64::total_cmp);
    result.dedup_by(|a, b| (*a - *b).abs() < 1e-10);
    result
}

/// Evaluate a cubic Bezier curve at parameter t
fn bezier_point(t: f64, p0: Point, c0: Point, c1: Point, p1: Point) -> Point {
    let mt = 1.0 - t;
    let mt2 = mt * mt;
    let mt3 = mt2 * mt;
    let t2 = t * t;
    let t3 = t2 * t;

    Point::new(
        mt3 * p0.x + 3.0 * mt2 * t * c0.x + 3.0 * mt * t2 * c1.x + t3 * p1.x,
        mt3 * p0.y + 3.0 * mt2 * t * c0.y + 3.0 * mt * t2 * c1.y + t3 * p1.y,
    )
}

/// Min/max over a plain point sequence
pub fn polyline_bounds(points: &[Point]) -> Option<Bounds> {
    let (first, rest) = points.split_first()?;
    let mut b = Bounds::new(first.x, first.y, first.x, first.y);
    for p in rest {
        b.expand(&Bounds::new(p.x, p.y, p.x, p.y));
    }
    Some(b)
}

/// Tight bounds of a cubic Bezier chain `[anchor, ctrl, ctrl, anchor, ...]`.
///
/// Handles do not count unless the curve actually reaches them. Trailing points
/// that do not complete a segment are treated as plain vertices.
pub fn curve_bounds(points: &[Point]) -> Option<Bounds> {
    if points.len() < 4 {
        return polyline_bounds(points);
    }

    let segments = (points.len() - 1) / 3;
    let mut on_curve: Vec<Point> = Vec::with_capacity(segments * 3 + 1);
    on_curve.push(points[0]);

    for seg in points[..segments * 3 + 1].windows(4).step_by(3) {
        let (p0, c0, c1, p1) = (seg[0], seg[1], seg[2], seg[3]);
        on_curve.push(p1);
        for t in bezier_extrema(p0, c0, c1, p1) {
            on_curve.push(bezier_point(t, p0, c0, c1, p1));
        }
    }
    on_curve.extend_from_slice(&points[segments * 3 + 1..]);

    polyline_bounds(&on_curve)
}

/// Union of the bounds of every leaf. `None` when no leaf has bounds, which
/// callers treat as "nothing to transform".
pub fn combined_bounds<'a>(leaves: impl IntoIterator<Item = Leaf<'a>>) -> Option<Bounds> {
    leaves
        .into_iter()
        .filter_map(|leaf| leaf.bounds())
        .reduce(|mut acc, b| {
            acc.expand(&b);
            acc
        })
}
