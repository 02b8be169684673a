//! Growing the basic segments into the set of maximal straight lines.

use std::{
    collections::{HashMap, HashSet},
    sync::atomic::{AtomicBool, Ordering},
};

use tracing::{debug, info, trace};

use crate::{
    dbg_segment, info_label,
    figure::Figure,
    segment::Segment,
    vertex::VertexId,
};

/// Fixpoint builder for extended segments.
///
/// Every pass looks at each ordered pair of distinct segments meeting at one
/// vertex. If that vertex lies on the segment joining the two far ends, the
/// joining segment is a candidate. Accepted candidates of one pass are added
/// together; the build ends after a pass that accepts nothing.
pub struct Extender<'f> {
    figure: &'f Figure,
    segments: Vec<Segment>,
    /// Vertices each vertex is already joined to.
    joined: HashMap<VertexId, HashSet<VertexId>>,
    passes: usize,
}

impl<'f> Extender<'f> {
    /// Seed with the basic segments of `figure`, in insertion order.
    pub fn new(figure: &'f Figure) -> Self {
        let mut joined: HashMap<VertexId, HashSet<VertexId>> = figure
            .iter_vertices()
            .map(|v| (v.id, HashSet::new()))
            .collect();
        let segments: Vec<Segment> =
            figure.iter_segments().map(|(_, s)| *s).collect();
        for s in segments.iter() {
            Self::join(&mut joined, s);
        }
        Self {
            figure,
            segments,
            joined,
            passes: 0,
        }
    }

    fn join(joined: &mut HashMap<VertexId, HashSet<VertexId>>, s: &Segment) {
        joined
            .get_mut(&s.a)
            .expect("segment endpoint missing from vertex map")
            .insert(s.b);
        joined
            .get_mut(&s.b)
            .expect("segment endpoint missing from vertex map")
            .insert(s.a);
    }

    #[inline]
    fn is_joined(&self, u: VertexId, v: VertexId) -> bool {
        self.joined[&u].contains(&v) || self.joined[&v].contains(&u)
    }

    /// The segments collected so far (basic first, then each batch).
    #[inline]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Run one pass and return the accepted batch, which is also appended
    /// to [`Extender::segments`]. An empty batch means the fixpoint is
    /// reached. Returns `None` if `cancel` was raised mid-pass.
    pub fn pass(&mut self, cancel: &AtomicBool) -> Option<Vec<Segment>> {
        let tolerance = self.figure.coincidence();
        let mut batch = Vec::new();

        for (i, first) in self.segments.iter().enumerate() {
            if cancel.load(Ordering::Relaxed) {
                debug!("extension cancelled during pass {}", self.passes);
                return None;
            }
            for (j, second) in self.segments.iter().enumerate() {
                if i == j {
                    continue;
                }
                let Some(junction) = first.junction(second) else {
                    continue;
                };
                let (u, v) = (junction.outer_self, junction.outer_other);
                if u == v || self.is_joined(u, v) {
                    continue;
                }
                let candidate = Segment::new(u, v);
                let common = self.figure[junction.common].point;
                if candidate.span(self.figure).passes_near(&common, tolerance) {
                    trace!(
                        "extending {:?} + {:?} -> {:?}",
                        dbg_segment!(self.figure, first),
                        dbg_segment!(self.figure, second),
                        dbg_segment!(self.figure, &candidate)
                    );
                    Self::join(&mut self.joined, &candidate);
                    batch.push(candidate);
                }
            }
        }

        self.passes += 1;
        debug!("pass {} accepted {} segment(s)", self.passes, batch.len());
        self.segments.extend_from_slice(&batch);
        Some(batch)
    }

    /// Run passes until nothing more is accepted, handing each non-empty
    /// batch to `on_batch`. Returns `None` if cancelled.
    pub fn run(
        mut self,
        cancel: &AtomicBool,
        mut on_batch: impl FnMut(&[Segment]),
    ) -> Option<Vec<Segment>> {
        loop {
            let batch = self.pass(cancel)?;
            if batch.is_empty() {
                break;
            }
            on_batch(&batch);
        }
        info!(
            "{} extended {} basic segment(s) to {} in {} pass(es)",
            info_label!("fixpoint"),
            self.figure.len_segments(),
            self.segments.len(),
            self.passes
        );
        Some(self.segments)
    }
}

/// Build the full extended set for `figure` synchronously.
pub fn extend_segments(figure: &Figure) -> Vec<Segment> {
    let never = AtomicBool::new(false);
    Extender::new(figure)
        .run(&never, |_| {})
        .expect("extension without cancellation always completes")
}
