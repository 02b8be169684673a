use id_arena::Id;

use crate::point::Point;

pub type VertexId = Id<Vertex>;

/// A figure vertex. Identity is the arena slot (`id`), coincidence is
/// positional within a tolerance; the two are never interchangeable.
#[derive(Clone, Copy)]
pub struct Vertex {
    pub id: VertexId,
    pub point: Point,
}

impl Vertex {
    pub fn new(id: VertexId, point: Point) -> Self {
        Self { id, point }
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.point.x
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.point.y
    }

    #[inline]
    pub fn is_coincident(&self, other: &Vertex, tolerance: f64) -> bool {
        self.id == other.id || self.point.is_coincident(&other.point, tolerance)
    }
}
