//! Path traced by the turtle
//!
//! An ordered list of absolute move/line segments. Append-only while a script
//! runs; only a turtle reset empties it.

use std::fmt;

/// A point in plane coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// One drawing instruction
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    /// Lift the pen and start a new subpath here
    MoveTo(Point),
    /// Draw a straight line from the current point to here
    LineTo(Point),
}

impl Segment {
    pub fn point(&self) -> Point {
        match self {
            Segment::MoveTo(p) | Segment::LineTo(p) => *p,
        }
    }
}

/// Segments traced since the last reset
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Start a new subpath. A move directly after another move replaces it,
    /// since nothing was drawn in between.
    pub fn move_to(&mut self, point: Point) {
        if let Some(Segment::MoveTo(last)) = self.segments.last_mut() {
            *last = point;
        } else {
            self.segments.push(Segment::MoveTo(point));
        }
    }

    /// Draw to `point`. A line needs a subpath to continue, so an empty path
    /// is started at the origin first.
    pub fn line_to(&mut self, point: Point) {
        if self.segments.is_empty() {
            self.segments.push(Segment::MoveTo(Point::ORIGIN));
        }
        self.segments.push(Segment::LineTo(point));
    }

    pub fn clear(&mut self) {
        self.segments.clear();
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of drawn lines
    pub fn line_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::LineTo(_)))
            .count()
    }

    /// Total length of all drawn lines
    pub fn drawn_length(&self) -> f64 {
        let mut total = 0.0;
        let mut current = Point::ORIGIN;
        for segment in &self.segments {
            match *segment {
                Segment::MoveTo(p) => current = p,
                Segment::LineTo(p) => {
                    total += current.distance_to(p);
                    current = p;
                }
            }
        }
        total
    }

    /// Axis-aligned bounds `(min, max)` of every segment end point
    pub fn bounds(&self) -> Option<(Point, Point)> {
        let mut points = self.segments.iter().map(Segment::point);
        let first = points.next()?;
        Some(points.fold((first, first), |(min, max), p| {
            (
                Point::new(min.x.min(p.x), min.y.min(p.y)),
                Point::new(max.x.max(p.x), max.y.max(p.y)),
            )
        }))
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

/// One segment per line: `move    x    y` or `line    x    y`
impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            let (kind, p) = match segment {
                Segment::MoveTo(p) => ("move", p),
                Segment::LineTo(p) => ("line", p),
            };
            writeln!(f, "{} {:4.0} {:4.0}", kind, p.x, p.y)?;
        }
        Ok(())
    }
}
