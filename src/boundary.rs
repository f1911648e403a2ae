//! Geometry against the four edges of the unit square.
//!
//! All functions here work in the bottom-left origin convention: `TOP` is
//! the line `y = 1` and `BOTTOM` is `y = 0`.

use crate::error::GeometryError;
use crate::point::Point;

/// One of the four edges of the unit square.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Boundary {
    Top,
    Right,
    Bottom,
    Left,
}

impl Boundary {
    /// All boundaries in their natural order. Ties are broken in this order.
    pub const ALL: [Boundary; 4] = [Boundary::Top, Boundary::Right, Boundary::Bottom, Boundary::Left];

    /// The two corners of the square that define this boundary's line.
    pub fn line(self) -> (Point, Point) {
        match self {
            Boundary::Top => (Point::new(0.0, 1.0), Point::new(1.0, 1.0)),
            Boundary::Right => (Point::new(1.0, 0.0), Point::new(1.0, 1.0)),
            Boundary::Bottom => (Point::new(0.0, 0.0), Point::new(1.0, 0.0)),
            Boundary::Left => (Point::new(0.0, 0.0), Point::new(0.0, 1.0)),
        }
    }

    /// The constant coordinate along this boundary (`y` for TOP/BOTTOM, `x` for LEFT/RIGHT).
    pub fn axis_value(self) -> f64 {
        match self {
            Boundary::Top | Boundary::Right => 1.0,
            Boundary::Bottom | Boundary::Left => 0.0,
        }
    }

    /// Perpendicular distance from `point` to the infinite line through this boundary.
    pub fn distance_to(self, point: &Point) -> f64 {
        let (first, second) = self.line();
        let dx = second.x() - first.x();
        let dy = second.y() - first.y();
        let numerator = (dy * point.x() - dx * point.y() + second.x() * first.y() - second.y() * first.x()).abs();
        numerator / Point::distance(&first, &second)
    }

    /// The boundary closest to `point` among all four.
    pub fn nearest(point: &Point) -> Boundary {
        Boundary::ALL[1..]
            .iter()
            .fold(Boundary::ALL[0], |best, &b| nearer(point, best, b))
    }
}

/// Returns `b` only if it is strictly closer than `a`, so earlier candidates win ties.
fn nearer(point: &Point, a: Boundary, b: Boundary) -> Boundary {
    if b.distance_to(point) < a.distance_to(point) { b } else { a }
}

/// Returns the candidate with the smallest perpendicular distance to `point`.
///
/// Ties go to the candidate listed first. Returns `None` for an empty slice.
pub fn nearest_boundary(point: &Point, candidates: &[Boundary]) -> Option<Boundary> {
    let (&first, rest) = candidates.split_first()?;
    Some(rest.iter().fold(first, |best, &b| nearer(point, best, b)))
}

/// Quadrant of a direction vector, counter-clockwise from east.
///
/// Each axis belongs to exactly one quadrant so every non-zero vector is classified.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Quadrant {
    First,
    Second,
    Third,
    Fourth,
}

impl Quadrant {
    fn of(dx: f64, dy: f64) -> Option<Quadrant> {
        if dx > 0.0 && dy >= 0.0 {
            Some(Quadrant::First)
        } else if dx <= 0.0 && dy > 0.0 {
            Some(Quadrant::Second)
        } else if dx < 0.0 && dy <= 0.0 {
            Some(Quadrant::Third)
        } else if dx >= 0.0 && dy < 0.0 {
            Some(Quadrant::Fourth)
        } else {
            None
        }
    }

    fn next(self) -> Quadrant {
        match self {
            Quadrant::First => Quadrant::Second,
            Quadrant::Second => Quadrant::Third,
            Quadrant::Third => Quadrant::Fourth,
            Quadrant::Fourth => Quadrant::First,
        }
    }

    /// Vector approximating the axis segment that opens this quadrant, as seen from `origin`.
    fn reference_vector(self, origin: &Point) -> [f64; 2] {
        match self {
            Quadrant::First => [1.0, origin.y()],
            Quadrant::Second => [origin.x(), 1.0],
            Quadrant::Third => [-1.0, origin.y()],
            Quadrant::Fourth => [origin.x(), -1.0],
        }
    }

    /// `(boundary if the ray is nearer this quadrant's reference, boundary otherwise)`.
    fn boundaries(self) -> (Boundary, Boundary) {
        match self {
            Quadrant::First => (Boundary::Right, Boundary::Top),
            Quadrant::Second => (Boundary::Top, Boundary::Left),
            Quadrant::Third => (Boundary::Left, Boundary::Bottom),
            Quadrant::Fourth => (Boundary::Bottom, Boundary::Right),
        }
    }
}

fn angle_between(a: [f64; 2], b: [f64; 2]) -> f64 {
    let dot = a[0] * b[0] + a[1] * b[1];
    let magnitudes = a[0].hypot(a[1]) * b[0].hypot(b[1]);
    (dot / magnitudes).clamp(-1.0, 1.0).acos()
}

/// Decides which boundary a ray from `origin` through `direction` eventually crosses.
///
/// The ray's quadrant narrows the answer to two adjacent boundaries. The one
/// whose reference vector is angularly closer to the ray wins.
pub fn ray_boundary(origin: &Point, direction: &Point) -> Result<Boundary, GeometryError> {
    let dx = direction.x() - origin.x();
    let dy = direction.y() - origin.y();
    let quadrant = Quadrant::of(dx, dy).ok_or(GeometryError::CoincidentPoints {
        first: *origin,
        second: *direction,
    })?;

    let ray = [dx, dy];
    let own = angle_between(ray, quadrant.reference_vector(origin));
    let next = angle_between(ray, quadrant.next().reference_vector(origin));

    let (near, far) = quadrant.boundaries();
    Ok(if own < next { near } else { far })
}

/// Intersects the infinite line through `p1` and `p2` with `boundary`.
///
/// Axis-aligned lines skip the determinant and exit through whichever
/// boundary lies in their direction of travel. Any other intersection is
/// passed through [`rebound`] against `p2` since it may still leave the
/// square along the other axis.
pub fn intersection(p1: &Point, p2: &Point, boundary: Boundary) -> Result<Point, GeometryError> {
    let dx = p2.x() - p1.x();
    let dy = p2.y() - p1.y();

    match (dx != 0.0, dy != 0.0) {
        (true, true) => {
            let (b1, b2) = boundary.line();

            let line_cross = p1.x() * p2.y() - p1.y() * p2.x();
            let boundary_cross = b1.x() * b2.y() - b1.y() * b2.x();
            let bdx = b1.x() - b2.x();
            let bdy = b1.y() - b2.y();

            // Line direction is negated to match the p1 - p2 form of the determinant.
            let denominator = -dx * bdy + dy * bdx;
            let x = (line_cross * bdx + dx * boundary_cross) / denominator;
            let y = (line_cross * bdy + dy * boundary_cross) / denominator;

            let raw = Point::unclamped(x, y);
            Ok(rebound(&raw, p2)?.unwrap_or(raw))
        }
        (true, false) => {
            let x = if p2.x() < p1.x() { 0.0 } else { 1.0 };
            Ok(Point::unclamped(x, p2.y()))
        }
        (false, true) => {
            let y = if p2.y() < p1.y() { 0.0 } else { 1.0 };
            Ok(Point::unclamped(p2.x(), y))
        }
        (false, false) => Err(GeometryError::CoincidentPoints { first: *p1, second: *p2 }),
    }
}

/// Moves `candidate` back onto the square along the line through `reference`.
///
/// The x axis is corrected first (onto LEFT or RIGHT), then y (onto BOTTOM
/// or TOP) using the already corrected point. Returns `Ok(None)` when the
/// candidate needed no correction. A corrected point always lies in the
/// square, even when the line through `reference` misses it. A line parallel to the axis being
/// corrected has no solution there, so that coordinate is clamped instead.
pub fn rebound(candidate: &Point, reference: &Point) -> Result<Option<Point>, GeometryError> {
    let mut corrected = None;

    if !(0.0..=1.0).contains(&candidate.x()) {
        if candidate == reference {
            return Err(GeometryError::CoincidentPoints { first: *candidate, second: *reference });
        }
        let bound = nearer(candidate, Boundary::Left, Boundary::Right).axis_value();
        let y = if candidate.x() != reference.x() {
            let slope = (candidate.y() - reference.y()) / (candidate.x() - reference.x());
            slope * (bound - reference.x()) + reference.y()
        } else {
            candidate.y()
        };
        corrected = Some(Point::unclamped(bound, y));
    }

    let latest = corrected.unwrap_or(*candidate);

    if !(0.0..=1.0).contains(&latest.y()) {
        if latest == *reference {
            return Err(GeometryError::CoincidentPoints { first: latest, second: *reference });
        }
        let bound = nearer(&latest, Boundary::Bottom, Boundary::Top).axis_value();
        // A vertical line has an infinite slope, which correctly yields x = reference.x.
        let x = if latest.y() != reference.y() {
            let slope = (latest.y() - reference.y()) / (latest.x() - reference.x());
            (bound - reference.y()) / slope + reference.x()
        } else {
            latest.x()
        };
        // Still outside means the line misses the square, keep the nearest edge.
        corrected = Some(Point::unclamped(x.clamp(0.0, 1.0), bound));
    }

    Ok(corrected)
}
