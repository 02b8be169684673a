use id_arena::Id;

use crate::{figure::Figure, geometry::Span, vertex::VertexId};

pub type SegmentId = Id<Segment>;

/// A straight segment between two figure vertices.
///
/// Basic segments live in the figure's arena and are addressed by
/// [`SegmentId`], so an endpoint rewritten through the figure is seen by every
/// holder of the id. Extended segments are plain values.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub a: VertexId,
    pub b: VertexId,
}

/// The vertex two segments meet at, plus the far endpoint of each.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Junction {
    pub common: VertexId,
    pub outer_self: VertexId,
    pub outer_other: VertexId,
}

impl Segment {
    pub fn new(a: VertexId, b: VertexId) -> Self {
        debug_assert!(a != b, "segment endpoints must differ");
        Self { a, b }
    }

    #[inline]
    pub fn set_b(&mut self, new: VertexId) {
        self.b = new;
    }

    #[inline]
    pub fn span(&self, figure: &Figure) -> Span {
        Span::new(figure[self.a].point, figure[self.b].point)
    }

    #[inline]
    pub fn has_endpoint(&self, id: VertexId) -> bool {
        self.a == id || self.b == id
    }

    /// True if this segment joins `u` and `v`, in either direction.
    #[inline]
    pub fn connects(&self, u: VertexId, v: VertexId) -> bool {
        (self.a == u && self.b == v) || (self.a == v && self.b == u)
    }

    /// Finds the vertex shared with `other`, checking `a-a`, `a-b`, `b-a`,
    /// `b-b` in that order. The first match wins.
    pub fn junction(&self, other: &Segment) -> Option<Junction> {
        let (common, outer_self, outer_other) = if self.a == other.a {
            (self.a, self.b, other.b)
        } else if self.a == other.b {
            (self.a, self.b, other.a)
        } else if self.b == other.a {
            (self.b, self.a, other.b)
        } else if self.b == other.b {
            (self.b, self.a, other.a)
        } else {
            return None;
        };
        Some(Junction {
            common,
            outer_self,
            outer_other,
        })
    }
}

#[cfg(test)]
mod tests {
    use id_arena::Arena;

    use super::*;
    use crate::{point::Point, vertex::Vertex};

    fn ids(n: usize) -> Vec<VertexId> {
        let mut arena = Arena::<Vertex>::new();
        (0..n)
            .map(|i| {
                arena.alloc_with_id(|id| {
                    Vertex::new(id, Point::new(i as f64, 0.0))
                })
            })
            .collect()
    }

    #[test]
    fn junction_reports_far_endpoints() {
        let v = ids(4);
        let s = Segment::new(v[0], v[1]);

        let j = s.junction(&Segment::new(v[2], v[1])).unwrap();
        assert_eq!(j.common, v[1]);
        assert_eq!(j.outer_self, v[0]);
        assert_eq!(j.outer_other, v[2]);

        let j = s.junction(&Segment::new(v[0], v[3])).unwrap();
        assert_eq!(j.common, v[0]);
        assert_eq!(j.outer_self, v[1]);
        assert_eq!(j.outer_other, v[3]);

        assert!(s.junction(&Segment::new(v[2], v[3])).is_none());
    }

    #[test]
    fn connects_ignores_direction() {
        let v = ids(3);
        let s = Segment::new(v[0], v[1]);
        assert!(s.connects(v[1], v[0]));
        assert!(s.connects(v[0], v[1]));
        assert!(!s.connects(v[0], v[2]));
    }
}
