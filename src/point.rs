/// A position in the plane.
///
/// `Debug` and `Display` live in `debug.rs`.
#[derive(Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn distance_sq(&self, other: &Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    /// True if `other` lies within `tolerance` of `self` (inclusive).
    #[inline]
    pub fn is_coincident(&self, other: &Point, tolerance: f64) -> bool {
        self.distance_sq(other) <= tolerance * tolerance
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}
