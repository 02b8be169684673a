//! Enumerating the triangles closed by the extended segments.

use std::{
    hash::{Hash, Hasher},
    sync::atomic::{AtomicBool, Ordering},
};

use itertools::Itertools;
use tracing::{debug, info};

use crate::{dbg_triangle, figure::Figure, segment::Segment, vertex::VertexId};

/// Each valid triangle is found once per (apex, ordered side pair): three
/// apexes, two orders.
pub const SCAN_MULTIPLICITY: usize = 6;

/// Three figure vertices. Equality and hashing treat them as a set.
#[derive(Clone, Copy)]
pub struct Triangle {
    pub a: VertexId,
    pub b: VertexId,
    pub c: VertexId,
}

impl Triangle {
    pub fn new(a: VertexId, b: VertexId, c: VertexId) -> Self {
        Self { a, b, c }
    }

    #[inline]
    pub fn vertices(&self) -> [VertexId; 3] {
        [self.a, self.b, self.c]
    }

    #[inline]
    pub fn contains(&self, v: VertexId) -> bool {
        self.a == v || self.b == v || self.c == v
    }

    /// Vertex indices in ascending order, the canonical form of the set.
    pub fn key(&self) -> [usize; 3] {
        let mut key = self.vertices().map(|v| v.index());
        key.sort_unstable();
        key
    }
}

impl PartialEq for Triangle {
    fn eq(&self, other: &Self) -> bool {
        other.vertices().iter().all(|&v| self.contains(v))
            && self.vertices().iter().all(|&v| other.contains(v))
    }
}

impl Eq for Triangle {}

impl Hash for Triangle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

/// Distinct triangles in the order they were first seen.
#[derive(Clone, Debug, Default)]
pub struct TriangleSet {
    triangles: Vec<Triangle>,
}

impl TriangleSet {
    /// Add `triangle` unless one with the same three vertices is present.
    pub fn insert(&mut self, triangle: Triangle) -> bool {
        if self.triangles.contains(&triangle) {
            false
        } else {
            self.triangles.push(triangle);
            true
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Triangle> {
        self.triangles.iter()
    }
}

impl<'a> IntoIterator for &'a TriangleSet {
    type Item = &'a Triangle;
    type IntoIter = std::slice::Iter<'a, Triangle>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Nested scan over the extended segments.
///
/// For every ordered pair of distinct segments meeting at one vertex, looks
/// for a third segment closing the triangle. A candidate is dropped when any
/// vertex lies on its opposite side, which means the three points are
/// collinear and the "triangle" is a subdivided line.
pub struct TriangleScan<'f> {
    figure: &'f Figure,
    segments: &'f [Segment],
}

impl<'f> TriangleScan<'f> {
    pub fn new(figure: &'f Figure, segments: &'f [Segment]) -> Self {
        Self { figure, segments }
    }

    #[inline]
    fn lies_on(&self, segment: &Segment, v: VertexId) -> bool {
        segment
            .span(self.figure)
            .passes_near(&self.figure[v].point, self.figure.coincidence())
    }

    /// Report every accepted candidate to `on_found` together with the
    /// running number of distinct triangles. Duplicates are reported as they
    /// are found; removing them is up to the caller.
    ///
    /// Returns the number of distinct triangles, or `None` if cancelled.
    pub fn run(
        &self,
        cancel: &AtomicBool,
        mut on_found: impl FnMut(Triangle, usize),
    ) -> Option<usize> {
        let mut found = 0;
        for (i, t1) in self.segments.iter().enumerate() {
            if cancel.load(Ordering::Relaxed) {
                debug!("triangle scan cancelled after {} candidate(s)", found);
                return None;
            }
            for (j, t2) in self.segments.iter().enumerate() {
                if i == j {
                    continue;
                }
                let Some(junction) = t1.junction(t2) else {
                    continue;
                };
                let (common, missing_a, missing_b) = (
                    junction.common,
                    junction.outer_self,
                    junction.outer_other,
                );
                if missing_a == missing_b {
                    continue;
                }
                for t3 in self
                    .segments
                    .iter()
                    .filter(|t3| t3.connects(missing_a, missing_b))
                {
                    if self.lies_on(t3, common)
                        || self.lies_on(t2, missing_a)
                        || self.lies_on(t1, missing_b)
                    {
                        continue;
                    }
                    found += 1;
                    let triangle = Triangle::new(common, missing_a, missing_b);
                    debug!("found {:?}", dbg_triangle!(self.figure, &triangle));
                    on_found(triangle, found / SCAN_MULTIPLICITY);
                }
            }
        }
        let total = found / SCAN_MULTIPLICITY;
        info!("triangle scan complete: {} triangle(s)", total);
        Some(total)
    }
}

/// Run the scan synchronously and keep the distinct triangles.
pub fn find_triangles(figure: &Figure, segments: &[Segment]) -> TriangleSet {
    let never = AtomicBool::new(false);
    let mut set = TriangleSet::default();
    TriangleScan::new(figure, segments).run(&never, |triangle, _| {
        set.insert(triangle);
    });
    set
}

/// Distinct triangles as ascending index triples, sorted.
pub fn triangle_keys(set: &TriangleSet) -> Vec<[usize; 3]> {
    set.iter().map(Triangle::key).sorted().collect()
}
