use crate::point::Point;

/// The infinite line through a [`Span`], keyed for exact comparison.
///
/// Two spans lie on the same line only when their keys compare equal with
/// exact floating point equality. No tolerance is applied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Line {
    Vertical { x: f64 },
    Sloped { slope: f64, intercept: f64 },
}

impl Line {
    /// Exact membership test: `x == x0` for vertical lines, otherwise
    /// `y == slope * x + intercept`.
    #[inline]
    pub fn passes_through(&self, p: &Point) -> bool {
        match *self {
            Line::Vertical { x } => p.x == x,
            Line::Sloped { slope, intercept } => p.y == slope * p.x + intercept,
        }
    }

    #[inline]
    fn y_at(&self, x: f64) -> Option<f64> {
        match *self {
            Line::Vertical { .. } => None,
            Line::Sloped { slope, intercept } => Some(slope * x + intercept),
        }
    }
}

/// The closed segment between two positions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Span {
    pub a: Point,
    pub b: Point,
}

impl Span {
    pub fn new(a: Point, b: Point) -> Self {
        Self { a, b }
    }

    pub fn line(&self) -> Line {
        let (a, b) = (self.a, self.b);
        if a.x == b.x {
            Line::Vertical { x: a.x }
        } else {
            let slope = (b.y - a.y) / (b.x - a.x);
            Line::Sloped {
                slope,
                intercept: a.y - slope * a.x,
            }
        }
    }

    #[inline]
    pub fn min_max_x(&self) -> (f64, f64) {
        (self.a.x.min(self.b.x), self.a.x.max(self.b.x))
    }

    #[inline]
    pub fn min_max_y(&self) -> (f64, f64) {
        (self.a.y.min(self.b.y), self.a.y.max(self.b.y))
    }

    /// Axis-aligned bounding box containment, inclusive on every side.
    #[inline]
    pub fn bounds_contain(&self, p: &Point) -> bool {
        let (min_x, max_x) = self.min_max_x();
        let (min_y, max_y) = self.min_max_y();
        min_x <= p.x && p.x <= max_x && min_y <= p.y && p.y <= max_y
    }

    /// True if `p` equals an endpoint, or lies exactly on the line and inside
    /// the bounding box.
    ///
    /// The on-line test is exact. A point computed off-line (for instance a
    /// projection onto a different line) is usually rejected even when it is
    /// visually on the segment.
    pub fn contains_point(&self, p: &Point) -> bool {
        if *p == self.a || *p == self.b {
            return true;
        }
        self.line().passes_through(p) && self.bounds_contain(p)
    }

    /// Intersection of the two infinite lines, kept only if it falls inside
    /// both bounding boxes.
    ///
    /// Parallel lines (including two verticals and collinear spans) have no
    /// intersection.
    pub fn intersection(&self, other: &Span) -> Option<Point> {
        let (x, y) = match (self.line(), other.line()) {
            (Line::Vertical { .. }, Line::Vertical { .. }) => return None,
            (Line::Vertical { x }, sloped) | (sloped, Line::Vertical { x }) => {
                (x, sloped.y_at(x)?)
            }
            (
                Line::Sloped {
                    slope: a1,
                    intercept: b1,
                },
                Line::Sloped {
                    slope: a2,
                    intercept: b2,
                },
            ) => {
                if a1 == a2 {
                    return None;
                }
                let x = (b2 - b1) / (a1 - a2);
                (x, a1 * x + b1)
            }
        };
        let p = Point::new(x, y);
        (self.bounds_contain(&p) && other.bounds_contain(&p)).then_some(p)
    }

    /// Perpendicular foot of `p` on the infinite line.
    pub fn projection(&self, p: &Point) -> Point {
        let (a, b) = (self.a, self.b);
        if a.x == b.x {
            return Point::new(a.x, p.y);
        }
        if a.y == b.y {
            return Point::new(p.x, a.y);
        }
        let a1 = (b.y - a.y) / (b.x - a.x);
        let b1 = a.y - a1 * a.x;
        let a2 = -1.0 / a1;
        let b2 = p.y - a2 * p.x;

        let x = (b2 - b1) / (a1 - a2);
        Point::new(x, a1 * x + b1)
    }

    /// Squared distance from `p` to the infinite line (not clamped to the
    /// span).
    #[inline]
    pub fn line_distance_sq(&self, p: &Point) -> f64 {
        self.projection(p).distance_sq(p)
    }

    /// True if `p` sits on the span itself: its projection is within
    /// `tolerance` of `p` and the projection is contained in the span.
    pub fn passes_near(&self, p: &Point, tolerance: f64) -> bool {
        let foot = self.projection(p);
        foot.is_coincident(p, tolerance) && self.contains_point(&foot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(ax: f64, ay: f64, bx: f64, by: f64) -> Span {
        Span::new(Point::new(ax, ay), Point::new(bx, by))
    }

    #[test]
    fn contains_endpoints_and_interior() {
        let s = span(0.0, 0.0, 10.0, 0.0);
        assert!(s.contains_point(&Point::new(0.0, 0.0)));
        assert!(s.contains_point(&Point::new(10.0, 0.0)));
        assert!(s.contains_point(&Point::new(4.0, 0.0)));
        assert!(!s.contains_point(&Point::new(11.0, 0.0)));
        assert!(!s.contains_point(&Point::new(4.0, 0.001)));

        let d = span(0.0, 0.0, 4.0, 8.0);
        assert!(d.contains_point(&Point::new(1.0, 2.0)));
        assert!(!d.contains_point(&Point::new(5.0, 10.0)));
    }

    #[test]
    fn contains_on_vertical_span() {
        let s = span(5.0, -5.0, 5.0, 5.0);
        assert!(s.contains_point(&Point::new(5.0, 0.0)));
        assert!(!s.contains_point(&Point::new(5.0, 6.0)));
        assert!(!s.contains_point(&Point::new(4.0, 0.0)));
    }

    #[test]
    fn intersection_of_crossing_spans() {
        let h = span(0.0, 0.0, 10.0, 0.0);
        let v = span(5.0, -5.0, 5.0, 5.0);
        assert_eq!(v.intersection(&h), Some(Point::new(5.0, 0.0)));
        assert_eq!(h.intersection(&v), Some(Point::new(5.0, 0.0)));

        let d1 = span(0.0, 0.0, 10.0, 10.0);
        let d2 = span(0.0, 10.0, 10.0, 0.0);
        assert_eq!(d1.intersection(&d2), Some(Point::new(5.0, 5.0)));
    }

    #[test]
    fn intersection_rejects_parallel_and_distant() {
        let h1 = span(0.0, 0.0, 10.0, 0.0);
        let h2 = span(0.0, 1.0, 10.0, 1.0);
        assert_eq!(h1.intersection(&h2), None);

        let v1 = span(0.0, 0.0, 0.0, 10.0);
        let v2 = span(1.0, 0.0, 1.0, 10.0);
        assert_eq!(v1.intersection(&v2), None);

        let far = span(20.0, -5.0, 20.0, 5.0);
        assert_eq!(h1.intersection(&far), None);
    }

    #[test]
    fn intersection_checks_both_bounding_boxes() {
        // The lines meet at (2.4, 2.4), past the end of `short`.
        let long = span(0.0, 0.0, 6.0, 6.0);
        let short = span(0.0, 6.0, 2.0, 3.0);
        assert_eq!(short.line(), Line::Sloped { slope: -1.5, intercept: 6.0 });
        assert_eq!(long.intersection(&short), None);

        let wide = span(0.0, 6.0, 4.0, 0.0);
        assert_eq!(long.intersection(&wide), Some(Point::new(2.4, 2.4)));
    }

    #[test]
    fn projection_special_cases_axis_aligned() {
        let h = span(0.0, 2.0, 10.0, 2.0);
        assert_eq!(h.projection(&Point::new(3.0, 7.0)), Point::new(3.0, 2.0));
        assert_eq!(h.line_distance_sq(&Point::new(3.0, 7.0)), 25.0);

        let v = span(2.0, 0.0, 2.0, 10.0);
        assert_eq!(v.projection(&Point::new(7.0, 3.0)), Point::new(2.0, 3.0));
        assert_eq!(v.line_distance_sq(&Point::new(-1.0, 3.0)), 9.0);

        let d = span(0.0, 0.0, 10.0, 10.0);
        assert_eq!(d.projection(&Point::new(0.0, 10.0)), Point::new(5.0, 5.0));
        assert_eq!(d.line_distance_sq(&Point::new(0.0, 10.0)), 50.0);
    }

    #[test]
    fn passes_near_requires_between() {
        let s = span(0.0, 0.0, 20.0, 0.0);
        assert!(s.passes_near(&Point::new(10.0, 0.0), 0.005));
        assert!(s.passes_near(&Point::new(10.0, 0.004), 0.005));
        assert!(!s.passes_near(&Point::new(10.0, 1.0), 0.005));
        assert!(!s.passes_near(&Point::new(30.0, 0.0), 0.005));
    }
}
