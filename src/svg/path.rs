use crate::error::{IsometricError, Result};
use crate::types::Point;

/// Format a number with at most 6 decimal places, treating -0 as 0
pub(crate) fn f(n: f64) -> String {
    let n = if n == 0.0 { 0.0 } else { n };
    let s = format!("{:.6}", n);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn invalid(attribute: &str, value: &str) -> IsometricError {
    IsometricError::InvalidNumber {
        attribute: attribute.to_string(),
        value: value.to_string(),
    }
}

/// End index of the number starting at `start`
fn scan_number(bytes: &[u8], start: usize) -> usize {
    let len = bytes.len();
    let mut i = start;

    if i < len && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
    }
    while i < len && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i < len && bytes[i] == b'.' {
        i += 1;
        while i < len && bytes[i].is_ascii_digit() {
            i += 1;
        }
    }
    if i < len && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < len && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        if j < len && bytes[j].is_ascii_digit() {
            while j < len && bytes[j].is_ascii_digit() {
                j += 1;
            }
            i = j;
        }
    }
    i
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Command(u8),
    Number(f64),
}

fn tokenize(s: &str, attribute: &str) -> Result<Vec<Token>> {
    let bytes = s.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if b.is_ascii_whitespace() || b == b',' {
            i += 1;
        } else if b.is_ascii_alphabetic() {
            tokens.push(Token::Command(b));
            i += 1;
        } else {
            let end = scan_number(bytes, i);
            let text = s.get(i..end).unwrap_or_default();
            let value: f64 = text.parse().map_err(|_| invalid(attribute, s))?;
            tokens.push(Token::Number(value));
            i = end;
        }
    }
    Ok(tokens)
}

/// Parse a whitespace/comma separated number list, as used by `points` and transform arguments
pub fn parse_numbers(s: &str, attribute: &str) -> Result<Vec<f64>> {
    tokenize(s, attribute)?
        .into_iter()
        .map(|t| match t {
            Token::Number(v) => Ok(v),
            Token::Command(_) => Err(invalid(attribute, s)),
        })
        .collect()
}

/// Parse a `points` attribute into coordinate pairs. A dangling odd coordinate is dropped.
pub fn parse_points(s: &str) -> Result<Vec<Point>> {
    let numbers = parse_numbers(s, "points")?;
    if numbers.len() % 2 != 0 {
        log::warn!("odd number of coordinates in points list, dropping the last one");
    }
    Ok(numbers
        .chunks_exact(2)
        .map(|c| Point::new(c[0], c[1]))
        .collect())
}

/// One continuous run of path data as a cubic Bezier chain
#[derive(Debug, Clone, PartialEq)]
pub struct Subpath {
    pub points: Vec<Point>,
    pub closed: bool,
}

#[derive(Default)]
struct SubpathBuilder {
    subpaths: Vec<Subpath>,
    chain: Vec<Point>,
    current: Point,
    start: Point,
}

impl SubpathBuilder {
    fn move_to(&mut self, p: Point) {
        self.finish();
        self.chain.push(p);
        self.current = p;
        self.start = p;
    }

    fn line_to(&mut self, p: Point) {
        let from = self.current;
        self.curve_to(from, p, p);
    }

    fn curve_to(&mut self, c1: Point, c2: Point, p: Point) {
        if self.chain.is_empty() {
            self.chain.push(self.current);
        }
        self.chain.extend([c1, c2, p]);
        self.current = p;
    }

    fn close(&mut self) {
        if self.chain.is_empty() {
            return;
        }
        if self.current != self.start {
            self.line_to(self.start);
        }
        self.subpaths.push(Subpath {
            points: std::mem::take(&mut self.chain),
            closed: true,
        });
        self.current = self.start;
    }

    fn finish(&mut self) {
        let chain = std::mem::take(&mut self.chain);
        if chain.len() > 1 {
            self.subpaths.push(Subpath {
                points: chain,
                closed: false,
            });
        }
    }
}

fn arity(cmd: u8) -> Option<usize> {
    match cmd.to_ascii_uppercase() {
        b'M' | b'L' => Some(2),
        b'H' | b'V' => Some(1),
        b'C' => Some(6),
        b'Z' => Some(0),
        _ => None,
    }
}

/// Parse SVG path data (commands M, L, H, V, C, Z in either case) into subpaths
pub fn parse_path_data(d: &str) -> Result<Vec<Subpath>> {
    let mut tokens = tokenize(d, "d")?.into_iter().peekable();
    let mut builder = SubpathBuilder::default();
    let mut cmd: Option<u8> = None;

    while let Some(&token) = tokens.peek() {
        if let Token::Command(c) = token {
            tokens.next();
            if arity(c).is_none() {
                return Err(IsometricError::Unsupported(format!(
                    "path command '{}'",
                    c as char
                )));
            }
            if c.eq_ignore_ascii_case(&b'Z') {
                builder.close();
                cmd = None;
                continue;
            }
            cmd = Some(c);
        }

        let c = cmd.ok_or_else(|| invalid("d", d))?;
        let n = arity(c).unwrap_or(0);
        let mut args = [0.0; 6];
        for slot in args.iter_mut().take(n) {
            match tokens.next() {
                Some(Token::Number(v)) => *slot = v,
                _ => return Err(invalid("d", d)),
            }
        }

        let relative = c.is_ascii_lowercase();
        let base = if relative {
            builder.current
        } else {
            Point::default()
        };
        let at = |x: f64, y: f64| Point::new(base.x + x, base.y + y);

        match c.to_ascii_uppercase() {
            b'M' => {
                builder.move_to(at(args[0], args[1]));
                // Further coordinate pairs after a moveto are implicit linetos
                cmd = Some(if relative { b'l' } else { b'L' });
            }
            b'L' => builder.line_to(at(args[0], args[1])),
            b'H' => {
                let x = if relative {
                    builder.current.x + args[0]
                } else {
                    args[0]
                };
                builder.line_to(Point::new(x, builder.current.y));
            }
            b'V' => {
                let y = if relative {
                    builder.current.y + args[0]
                } else {
                    args[0]
                };
                builder.line_to(Point::new(builder.current.x, y));
            }
            b'C' => builder.curve_to(
                at(args[0], args[1]),
                at(args[2], args[3]),
                at(args[4], args[5]),
            ),
            _ => {}
        }
    }

    builder.finish();
    Ok(builder.subpaths)
}

/// Generate path data from a cubic Bezier chain.
///
/// Degenerate cubics (handles on their endpoints) come out as `L`. On a closed
/// chain a final straight edge back to the start is folded into `Z`.
pub fn generate_path_data(points: &[Point], closed: bool) -> String {
    let Some(first) = points.first() else {
        return String::new();
    };

    let mut d = format!("M{},{}", f(first.x), f(first.y));
    let segments: Vec<&[Point]> = points[1..].chunks_exact(3).collect();
    let mut prev = *first;

    for (i, seg) in segments.iter().enumerate() {
        let (c1, c2, p) = (seg[0], seg[1], seg[2]);
        let straight = c1 == prev && c2 == p;

        if closed && straight && i + 1 == segments.len() && p == *first {
            break;
        }
        if straight {
            d.push_str(&format!(" L{},{}", f(p.x), f(p.y)));
        } else {
            d.push_str(&format!(
                " C{},{} {},{} {},{}",
                f(c1.x),
                f(c1.y),
                f(c2.x),
                f(c2.y),
                f(p.x),
                f(p.y)
            ));
        }
        prev = p;
    }

    if closed {
        d.push_str(" Z");
    }
    d
}
