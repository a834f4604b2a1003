//! Geometry Kernel
//!
//! Pure 2-D primitives used by graph construction: point distance,
//! orientation tests, segment intersection and endpoint proximity.
//! Nothing in here holds state.

use serde::{Deserialize, Serialize};

/// Absolute tolerance below which a cross product is treated as zero.
///
/// Every orientation and on-segment test goes through this value so that
/// intersection classification stays consistent.
pub const ORIENTATION_EPSILON: f64 = 1e-9;

/// Determinant magnitude below which two lines are considered parallel.
pub const PARALLEL_EPSILON: f64 = 1e-12;

/// A drawing coordinate. Never compared with `==`; use [`distance`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point halfway between `self` and `other`.
    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// One wire primitive. Undirected for topology purposes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub p1: Point,
    pub p2: Point,
}

impl Segment {
    pub fn new(p1: Point, p2: Point) -> Self {
        Self { p1, p2 }
    }

    pub fn length(&self) -> f64 {
        distance(&self.p1, &self.p2)
    }

    /// Whether `p` falls inside this segment's bounding box, padded by
    /// [`ORIENTATION_EPSILON`].
    fn bounds_contain(&self, p: &Point) -> bool {
        on_segment(&self.p1, p, &self.p2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Collinear,
    Clockwise,
    CounterClockwise,
}

/// Euclidean distance.
pub fn distance(a: &Point, b: &Point) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Orientation of the ordered triple `(a, b, c)`.
pub fn orientation(a: &Point, b: &Point, c: &Point) -> Orientation {
    let val = (b.y - a.y) * (c.x - b.x) - (b.x - a.x) * (c.y - b.y);
    if val.abs() < ORIENTATION_EPSILON {
        Orientation::Collinear
    } else if val > 0.0 {
        Orientation::Clockwise
    } else {
        Orientation::CounterClockwise
    }
}

/// `b` lies within the epsilon-padded bounding box spanned by `a` and `c`.
fn on_segment(a: &Point, b: &Point, c: &Point) -> bool {
    a.x.min(c.x) - ORIENTATION_EPSILON <= b.x
        && b.x <= a.x.max(c.x) + ORIENTATION_EPSILON
        && a.y.min(c.y) - ORIENTATION_EPSILON <= b.y
        && b.y <= a.y.max(c.y) + ORIENTATION_EPSILON
}

/// Orientation-based intersection test, including the collinear cases where
/// an endpoint of one segment lies on the other.
pub fn segments_intersect(s1: &Segment, s2: &Segment) -> bool {
    let (a, b, c, d) = (&s1.p1, &s1.p2, &s2.p1, &s2.p2);
    let o1 = orientation(a, b, c);
    let o2 = orientation(a, b, d);
    let o3 = orientation(c, d, a);
    let o4 = orientation(c, d, b);

    if o1 != o2 && o3 != o4 {
        return true;
    }

    (o1 == Orientation::Collinear && on_segment(a, c, b))
        || (o2 == Orientation::Collinear && on_segment(a, d, b))
        || (o3 == Orientation::Collinear && on_segment(c, a, d))
        || (o4 == Orientation::Collinear && on_segment(c, b, d))
}

/// Intersection of the two supporting lines, if it lies on both segments.
///
/// Returns `None` for parallel (or collinear) segments.
pub fn intersection_point(s1: &Segment, s2: &Segment) -> Option<Point> {
    let (x1, y1, x2, y2) = (s1.p1.x, s1.p1.y, s1.p2.x, s1.p2.y);
    let (x3, y3, x4, y4) = (s2.p1.x, s2.p1.y, s2.p2.x, s2.p2.y);

    let denom = (x1 - x2) * (y3 - y4) - (y1 - y2) * (x3 - x4);
    if denom.abs() < PARALLEL_EPSILON {
        return None;
    }

    let cross_a = x1 * y2 - y1 * x2;
    let cross_b = x3 * y4 - y3 * x4;
    let p = Point::new(
        (cross_a * (x3 - x4) - (x1 - x2) * cross_b) / denom,
        (cross_a * (y3 - y4) - (y1 - y2) * cross_b) / denom,
    );

    if s1.bounds_contain(&p) && s2.bounds_contain(&p) {
        Some(p)
    } else {
        None
    }
}

/// `p` is within `tau` of either endpoint of `s`.
pub fn is_endpoint_of(p: &Point, s: &Segment, tau: f64) -> bool {
    distance(p, &s.p1) <= tau || distance(p, &s.p2) <= tau
}

/// Two wires cross somewhere that is not near any of their endpoints.
///
/// Such a crossing is drawn, not connected. The default graph pipeline only
/// joins endpoints, so it never materialises these; the predicate is kept
/// for callers that need to tell junctions from visual crossings.
pub fn is_visual_crossing(s1: &Segment, s2: &Segment, tau: f64) -> bool {
    if !segments_intersect(s1, s2) {
        return false;
    }
    match intersection_point(s1, s2) {
        Some(ip) => !is_endpoint_of(&ip, s1, tau) && !is_endpoint_of(&ip, s2, tau),
        None => false,
    }
}
