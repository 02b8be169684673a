use std::{
    error::Error,
    fmt::Display,
    io,
    ops::Index,
};

use id_arena::Arena;
use tracing::{debug, info};

use crate::{
    geometry::Span,
    persist::Malformed,
    point::Point,
    segment::{Segment, SegmentId},
    tolerance::Tolerances,
    vertex::{Vertex, VertexId},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FigureErr {
    /// The figure is locked against structural edits.
    InvalidState,
    MalformedFile(Malformed),
    Io(io::ErrorKind),
}

impl Display for FigureErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl Error for FigureErr {}

impl From<io::Error> for FigureErr {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => {
                FigureErr::MalformedFile(Malformed::Truncated)
            }
            kind => FigureErr::Io(kind),
        }
    }
}

impl From<Malformed> for FigureErr {
    fn from(malformed: Malformed) -> Self {
        FigureErr::MalformedFile(malformed)
    }
}

/// A segment endpoint: either an existing vertex, or a raw position that is
/// not (yet) part of the figure.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Anchor {
    Vertex(VertexId),
    Point(Point),
}

impl Anchor {
    /// Identity comparison. Raw positions are never identical to anything,
    /// not even to an equal raw position.
    #[inline]
    pub fn is(&self, id: VertexId) -> bool {
        matches!(self, Anchor::Vertex(own) if *own == id)
    }

    #[inline]
    pub fn is_same(&self, other: &Anchor) -> bool {
        match other {
            Anchor::Vertex(id) => self.is(*id),
            Anchor::Point(_) => false,
        }
    }

    #[inline]
    pub fn point(&self, figure: &Figure) -> Point {
        match *self {
            Anchor::Vertex(id) => figure[id].point,
            Anchor::Point(p) => p,
        }
    }
}

impl From<VertexId> for Anchor {
    fn from(id: VertexId) -> Self {
        Anchor::Vertex(id)
    }
}

impl From<Point> for Anchor {
    fn from(point: Point) -> Self {
        Anchor::Point(point)
    }
}

/// The planar figure: vertices, basic (user-authored) segments, and, while
/// locked, the derived extended segments.
///
/// Arena order is insertion order. Vertices and basic segments are only
/// created while unlocked and are never removed.
#[derive(Clone)]
pub struct Figure {
    vertices: Arena<Vertex>,
    segments: Arena<Segment>,
    extended: Vec<Segment>,
    locked: bool,
    tolerances: Tolerances,
}

impl Default for Figure {
    fn default() -> Self {
        Self::new(Tolerances::default())
    }
}

impl Figure {
    pub fn new(tolerances: Tolerances) -> Self {
        Self {
            vertices: Arena::new(),
            segments: Arena::new(),
            extended: Vec::new(),
            locked: false,
            tolerances,
        }
    }

    #[inline]
    pub fn tolerances(&self) -> Tolerances {
        self.tolerances
    }

    #[inline]
    pub fn coincidence(&self) -> f64 {
        self.tolerances.coincidence
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Forbid structural edits and drop any previously derived segments.
    pub fn lock(&mut self) {
        self.locked = true;
        self.extended.clear();
    }

    pub fn unlock(&mut self) {
        self.locked = false;
        self.extended.clear();
    }

    #[inline]
    fn ensure_unlocked(&self) -> Result<(), FigureErr> {
        if self.locked {
            Err(FigureErr::InvalidState)
        } else {
            Ok(())
        }
    }

    pub fn iter_vertices(&self) -> impl Iterator<Item = &Vertex> + '_ {
        self.vertices.iter().map(|(_, v)| v)
    }

    pub fn iter_segments(
        &self,
    ) -> impl Iterator<Item = (SegmentId, &Segment)> + '_ {
        self.segments.iter()
    }

    /// Ids of the basic segments, in insertion order.
    pub fn segment_ids(&self) -> Vec<SegmentId> {
        self.segments.iter().map(|(id, _)| id).collect()
    }

    #[inline]
    pub fn len_vertices(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn len_segments(&self) -> usize {
        self.segments.len()
    }

    #[inline]
    pub fn extended(&self) -> &[Segment] {
        &self.extended
    }

    pub fn push_extended(&mut self, batch: &[Segment]) {
        self.extended.extend_from_slice(batch);
    }

    #[inline]
    pub fn span(&self, id: SegmentId) -> Span {
        self.segments[id].span(self)
    }

    /// First vertex identical or coincident (within `ε`) to `p`.
    pub fn find_vertex(&self, p: &Point) -> Option<VertexId> {
        let tolerance = self.coincidence();
        self.vertices
            .iter()
            .find(|(_, v)| v.point.is_coincident(p, tolerance))
            .map(|(id, _)| id)
    }

    /// True if some basic segment joins `u` and `v`.
    pub fn connected(&self, u: VertexId, v: VertexId) -> bool {
        self.segments.iter().any(|(_, s)| s.connects(u, v))
    }

    /// True if `anchor` is an endpoint of the segment (by identity), or lies
    /// on it under [`Span::contains_point`].
    pub fn segment_contains(&self, id: SegmentId, anchor: &Anchor) -> bool {
        let segment = self.segments[id];
        if anchor.is(segment.a) || anchor.is(segment.b) {
            return true;
        }
        segment.span(self).contains_point(&anchor.point(self))
    }

    /// Resolve `anchor` to a vertex of this figure, allocating one when no
    /// existing vertex coincides with it.
    pub fn intern(&mut self, anchor: Anchor) -> Result<VertexId, FigureErr> {
        self.ensure_unlocked()?;
        match anchor {
            Anchor::Vertex(id) => Ok(id),
            Anchor::Point(p) => Ok(match self.find_vertex(&p) {
                Some(id) => id,
                None => self.push_vertex(p),
            }),
        }
    }

    /// Allocate a vertex without any dedup.
    pub(crate) fn push_vertex(&mut self, point: Point) -> VertexId {
        let id = self.vertices.alloc_with_id(|id| Vertex::new(id, point));
        debug!("new vertex {:?}", self.vertices[id]);
        id
    }

    /// Allocate a basic segment without any dedup.
    pub(crate) fn push_segment(&mut self, a: VertexId, b: VertexId) -> SegmentId {
        self.segments.alloc(Segment::new(a, b))
    }

    /// Append a basic segment between `a` and `b`.
    ///
    /// Endpoints are resolved through [`Figure::intern`], so new vertices are
    /// recorded even if the segment itself turns out to be a duplicate.
    /// Returns `Ok(None)` when the pair is already connected or both ends
    /// resolve to the same vertex.
    pub fn add_segment(
        &mut self,
        a: impl Into<Anchor>,
        b: impl Into<Anchor>,
    ) -> Result<Option<SegmentId>, FigureErr> {
        self.ensure_unlocked()?;
        let a = self.intern(a.into())?;
        let b = self.intern(b.into())?;
        if a == b || self.connected(a, b) {
            debug!("segment {:?}-{:?} already present", a.index(), b.index());
            return Ok(None);
        }
        let id = self.push_segment(a, b);
        info!(
            "added segment {}: {} -> {}",
            id.index(),
            self[a].point,
            self[b].point
        );
        Ok(Some(id))
    }

    /// Shorten segment `id` so it ends at `at`, returning its former end.
    ///
    /// The segment is rewritten in place; the caller is responsible for
    /// adding the remainder `at -> former end`.
    pub fn split_segment(
        &mut self,
        id: SegmentId,
        at: VertexId,
    ) -> Result<VertexId, FigureErr> {
        self.ensure_unlocked()?;
        let segment = &mut self.segments[id];
        debug_assert!(segment.a != at, "split would collapse segment");
        let former = segment.b;
        segment.set_b(at);
        debug!(
            "split segment {} at vertex {} (former end {})",
            id.index(),
            at.index(),
            former.index()
        );
        Ok(former)
    }
}

impl Index<VertexId> for Figure {
    type Output = Vertex;

    fn index(&self, id: VertexId) -> &Self::Output {
        &self.vertices[id]
    }
}

impl Index<SegmentId> for Figure {
    type Output = Segment;

    fn index(&self, id: SegmentId) -> &Self::Output {
        &self.segments[id]
    }
}
