use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use rand::Rng;

/// Number of decimal places every coordinate is rounded to.
pub const DECIMAL_PLACES: u32 = 4;

const SCALE: f64 = 10_000.0;

/// Rounds `value` to [`DECIMAL_PLACES`] without clamping it.
///
/// The exact binary value is rounded, not its scaled product: `0.30555` is
/// stored slightly below the tie and rounds to `0.3055` even though
/// `0.30555 * 10_000.0` evaluates to exactly `3055.5`. Exact ties round to
/// even.
///
/// `-0.0` comes out as `0.0` so that rounding never produces two
/// representations of the same coordinate.
pub fn round_coordinate(value: f64) -> f64 {
    let scaled = value * SCALE;
    let mut rounded = scaled.round();
    if (rounded - scaled).abs() == 0.5 {
        // Error of the product, exact under a fused multiply-add. Zero means
        // an exact tie such as 1/32, which rounds to even.
        let residual = value.mul_add(SCALE, -scaled);
        rounded = if residual < 0.0 {
            scaled.floor()
        } else if residual > 0.0 {
            scaled.ceil()
        } else {
            2.0 * (scaled / 2.0).round()
        };
    }
    rounded / SCALE + 0.0
}

/// Rounds `value` to [`DECIMAL_PLACES`] and clamps it into `[0, 1]`.
pub fn normalize(value: f64) -> f64 {
    round_coordinate(value).clamp(0.0, 1.0) + 0.0
}

/// A 2D point with coordinates rounded to a fixed precision.
///
/// Points built with [`Point::new`] always lie in the unit square. The
/// geometry in [`crate::boundary`] also needs to talk about candidates that
/// have left the square, those are built with [`Point::unclamped`] and are
/// still rounded. Equality and hashing compare the rounded coordinates, so
/// two independently computed points that agree to [`DECIMAL_PLACES`] are the
/// same point.
#[derive(Clone, Copy, Debug)]
pub struct Point {
    x: f64,
    y: f64,
}

impl Point {
    /// Creates a normalized point inside `[0, 1] x [0, 1]`.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: normalize(x),
            y: normalize(y),
        }
    }

    /// Creates a rounded point that may lie outside the unit square.
    pub fn unclamped(x: f64, y: f64) -> Self {
        Self {
            x: round_coordinate(x),
            y: round_coordinate(y),
        }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    /// Clamps the point into the unit square.
    pub fn normalized(&self) -> Self {
        Self::new(self.x, self.y)
    }

    pub fn is_within_unit_square(&self) -> bool {
        (0.0..=1.0).contains(&self.x) && (0.0..=1.0).contains(&self.y)
    }

    /// Converts between top-left and bottom-left origin conventions.
    ///
    /// The conversion is its own inverse.
    pub fn flip_origin(&self) -> Self {
        Self::unclamped(self.x, 1.0 - self.y)
    }

    /// Euclidean distance between two points, rounded.
    ///
    /// The result is not clamped: diagonals of the unit square are longer
    /// than 1 and [`crate::Boundary::distance_to`] divides by line lengths.
    pub fn distance(p1: &Point, p2: &Point) -> f64 {
        let dx = p2.x - p1.x;
        let dy = p2.y - p1.y;
        round_coordinate(dx.hypot(dy))
    }

    pub fn midpoint(p1: &Point, p2: &Point) -> Point {
        Point::new((p1.x + p2.x) * 0.5, (p1.y + p2.y) * 0.5)
    }

    /// Fixed-point representation used for equality and hashing.
    fn key(&self) -> (i64, i64) {
        ((self.x * SCALE).round() as i64, (self.y * SCALE).round() as i64)
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Point {}

impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<[f64; 2]> for Point {
    fn from(p: [f64; 2]) -> Self {
        Point::new(p[0], p[1])
    }
}

/// Draws `count` distinct, uniformly distributed sites from the unit square.
///
/// Distinctness is judged after rounding, which is what diagram construction
/// rejects.
pub fn random_sites<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<Point> {
    let mut seen = HashSet::with_capacity(count);
    let mut sites = Vec::with_capacity(count);
    while sites.len() < count {
        let p = Point::new(rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0));
        if seen.insert(p) {
            sites.push(p);
        }
    }
    sites
}
