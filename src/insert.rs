//! Merging a freshly drawn segment into the figure.
//!
//! The phases run in order and any of them may end the insertion early:
//!
//! 1. snap each raw endpoint onto a nearby vertex or segment,
//! 2. drop degenerate and redundant segments,
//! 3. bind endpoints that land inside existing segments (T-junctions),
//! 4. walk along the new segment past collinear overlaps,
//! 5. split every piece at its crossings with existing segments.

use itertools::Itertools;
use procr_ansi_term::Color;
use tracing::{debug, info, trace};

use crate::{
    dbg_anchor, emit_info,
    figure::{Anchor, Figure, FigureErr},
    geometry::{Line, Span},
    point::Point,
    segment::SegmentId,
};

/// What became of an inserted segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Insertion {
    /// The figure grew by this many basic segments.
    Added(usize),
    /// Both endpoints are the same place.
    Degenerate,
    /// The figure already holds this segment.
    Redundant,
}

/// A piece of the new segment waiting to be committed.
#[derive(Clone, Copy, Debug)]
struct Piece {
    start: Anchor,
    end: Anchor,
}

#[derive(Clone, Copy, Debug)]
struct Crossing {
    segment: SegmentId,
    at: Point,
    distance_sq: f64,
}

/// Integrate the segment `a -> b` into `figure`.
pub fn insert_segment(
    figure: &mut Figure,
    a: Point,
    b: Point,
) -> Result<Insertion, FigureErr> {
    if figure.is_locked() {
        return Err(FigureErr::InvalidState);
    }
    let before = figure.len_segments();
    let mut inserter = Inserter {
        a: snap(figure, a),
        b: snap(figure, b),
        figure,
    };
    let outcome = inserter.run()?;
    if let Some(reason) = outcome {
        info!("insertion of {} -> {} skipped: {:?}", a, b, reason);
        return Ok(reason);
    }
    let added = inserter.figure.len_segments() - before;
    emit_info!(sty:Color::Green, fmt:"inserted {} -> {}: {} new segment(s)" | a, b, added);
    Ok(Insertion::Added(added))
}

/// Move a raw endpoint onto the nearest vertex or segment, if close enough.
///
/// Vertices win whenever they are within the vertex radius; a segment foot
/// is used only if it is within the edge radius and strictly closer than the
/// nearest vertex.
pub fn snap(figure: &Figure, p: Point) -> Anchor {
    let tolerances = figure.tolerances();
    let mut vertex = None;
    let mut vertex_dist = f64::MAX;
    let mut foot = None;
    let mut foot_dist = f64::MAX;

    for (_, segment) in figure.iter_segments() {
        for end in [segment.a, segment.b] {
            let d = p.distance_sq(&figure[end].point);
            if d < vertex_dist {
                vertex_dist = d;
                vertex = Some(end);
            }
        }
        let span = segment.span(figure);
        let d = span.line_distance_sq(&p);
        if d < foot_dist {
            let projection = span.projection(&p);
            if span.contains_point(&projection) {
                foot_dist = d;
                foot = Some(projection);
            }
        }
    }

    let anchor = match (vertex, foot) {
        (Some(id), _) if vertex_dist < tolerances.vertex_snap.powi(2) => {
            Anchor::Vertex(id)
        }
        (_, Some(q))
            if foot_dist < tolerances.edge_snap.powi(2)
                && foot_dist < vertex_dist =>
        {
            Anchor::Point(q)
        }
        _ => Anchor::Point(p),
    };
    trace!("snapped {} to {:?}", p, dbg_anchor!(figure, &anchor));
    anchor
}

struct Inserter<'f> {
    figure: &'f mut Figure,
    a: Anchor,
    b: Anchor,
}

impl<'f> Inserter<'f> {
    fn run(&mut self) -> Result<Option<Insertion>, FigureErr> {
        if let Some(reason) = self.check_redundant() {
            return Ok(Some(reason));
        }
        self.bind_endpoints()?;
        let Some(pieces) = self.resolve_overlaps() else {
            return Ok(Some(Insertion::Redundant));
        };
        debug!("pieces after overlap resolution: {}", pieces.len());
        for piece in pieces {
            self.commit_piece(piece)?;
        }
        Ok(None)
    }

    #[inline]
    fn point(&self, anchor: &Anchor) -> Point {
        anchor.point(self.figure)
    }

    #[inline]
    fn span(&self, start: &Anchor, end: &Anchor) -> Span {
        Span::new(self.point(start), self.point(end))
    }

    fn check_redundant(&self) -> Option<Insertion> {
        let (a, b) = (self.point(&self.a), self.point(&self.b));
        if a.is_coincident(&b, 0.0) {
            return Some(Insertion::Degenerate);
        }
        for (id, segment) in self.figure.iter_segments() {
            let ends = [
                self.figure[segment.a].point,
                self.figure[segment.b].point,
            ];
            let is_a = ends.iter().any(|e| a.is_coincident(e, 0.0));
            let is_b = ends.iter().any(|e| b.is_coincident(e, 0.0));
            if is_a && is_b {
                return Some(Insertion::Redundant);
            }
            if self.figure.segment_contains(id, &self.a)
                && self.figure.segment_contains(id, &self.b)
            {
                return Some(Insertion::Redundant);
            }
        }
        None
    }

    #[inline]
    fn set_end(&mut self, first: bool, end: Anchor) {
        if first {
            self.a = end;
        } else {
            self.b = end;
        }
    }

    /// Split existing segments that either endpoint lands inside of.
    ///
    /// After a split the endpoint is moved to the split segment's far end if
    /// the new segment runs over it.
    fn bind_endpoints(&mut self) -> Result<(), FigureErr> {
        let mut remainders = Vec::new();
        for id in self.figure.segment_ids() {
            for first in [true, false] {
                let end = if first { self.a } else { self.b };
                let segment = self.figure[id];
                if end.is(segment.a)
                    || end.is(segment.b)
                    || !self.figure.segment_contains(id, &end)
                {
                    continue;
                }
                let at = self.figure.intern(end)?;
                let mut end = Anchor::Vertex(at);
                if segment.has_endpoint(at) {
                    self.set_end(first, end);
                    continue;
                }
                let former = self.figure.split_segment(id, at)?;
                remainders.push((at, former));

                let current = if first {
                    self.span(&end, &self.b)
                } else {
                    self.span(&self.a, &end)
                };
                if current.contains_point(&self.figure[segment.a].point) {
                    end = Anchor::Vertex(segment.a);
                }
                if current.contains_point(&self.figure[former].point) {
                    end = Anchor::Vertex(former);
                }
                self.set_end(first, end);
            }
        }
        for (at, former) in remainders {
            self.figure.add_segment(at, former)?;
        }
        Ok(())
    }

    /// Walk from `a` to `b`, skipping stretches already covered by collinear
    /// segments. Returns `None` if the remaining stretch is already present.
    fn resolve_overlaps(&self) -> Option<Vec<Piece>> {
        let tolerance = self.figure.coincidence();
        let line = self.span(&self.a, &self.b).line();
        let mut pieces = Vec::new();
        let mut a = self.a;
        let b = self.b;

        loop {
            if a.is_same(&b)
                || self.point(&a).is_coincident(&self.point(&b), tolerance)
            {
                break;
            }
            let Some(closest) = self.closest_overlap(line, &a, &b)? else {
                pieces.push(Piece { start: a, end: b });
                break;
            };

            let current = self.span(&a, &b);
            let from = self.point(&a);
            let segment = self.figure[closest];
            let (end_a, end_b) = (
                self.figure[segment.a].point,
                self.figure[segment.b].point,
            );
            let (dist_a, dist_b) = (from.distance_sq(&end_a), from.distance_sq(&end_b));

            let next = if dist_a == 0.0 {
                segment.b
            } else if dist_b == 0.0 {
                segment.a
            } else {
                let in_a = current.contains_point(&end_a);
                let in_b = current.contains_point(&end_b);
                let next = match (in_a, in_b) {
                    (true, true) if dist_a <= dist_b => segment.a,
                    (true, true) => segment.b,
                    (true, false) => segment.a,
                    (false, true) => segment.b,
                    (false, false) => break,
                };
                if (in_a && in_b) || !self.figure.segment_contains(closest, &a) {
                    pieces.push(Piece {
                        start: a,
                        end: Anchor::Vertex(next),
                    });
                }
                next
            };
            trace!(
                "overlap with segment {}: advancing to vertex {}",
                closest.index(),
                next.index()
            );
            a = Anchor::Vertex(next);
        }
        Some(pieces)
    }

    /// The collinear segment with an endpoint nearest `a` inside `a -> b`.
    ///
    /// `Some(None)` means no overlap remains; `None` means the rest of the
    /// new segment is already covered.
    fn closest_overlap(
        &self,
        line: Line,
        a: &Anchor,
        b: &Anchor,
    ) -> Option<Option<SegmentId>> {
        let current = self.span(a, b);
        let from = self.point(a);
        let mut closest = None;
        let mut best = f64::MAX;

        for (id, segment) in self.figure.iter_segments() {
            let span = segment.span(self.figure);
            if span.line() != line {
                continue;
            }
            let dist_a = from.distance_sq(&span.a);
            let dist_b = from.distance_sq(&span.b);
            if dist_a == 0.0 || dist_b == 0.0 {
                let far = if dist_a == 0.0 { span.b } else { span.a };
                if current.contains_point(&far) {
                    return Some(Some(id));
                } else if self.figure.segment_contains(id, b) {
                    return None;
                } else {
                    continue;
                }
            }
            if current.contains_point(&span.a) && dist_a < best {
                best = dist_a;
                closest = Some(id);
            }
            if current.contains_point(&span.b) && dist_b < best {
                best = dist_b;
                closest = Some(id);
            }
        }
        Some(closest)
    }

    fn crossings(&self, piece: &Piece) -> Vec<Crossing> {
        let span = self.span(&piece.start, &piece.end);
        let origin = span.a;
        self.figure
            .iter_segments()
            .filter(|(_, s)| {
                !(piece.start.is(s.a)
                    || piece.start.is(s.b)
                    || piece.end.is(s.a)
                    || piece.end.is(s.b))
            })
            .filter_map(|(id, s)| {
                span.intersection(&s.span(self.figure)).map(|at| Crossing {
                    segment: id,
                    at,
                    distance_sq: origin.distance_sq(&at),
                })
            })
            .sorted_by(|c, d| c.distance_sq.total_cmp(&d.distance_sq))
            .collect()
    }

    /// Split `piece` and every segment it crosses at each crossing, then add
    /// the pieces as basic segments.
    fn commit_piece(&mut self, mut piece: Piece) -> Result<(), FigureErr> {
        let crossings = self.crossings(&piece);
        if !crossings.is_empty() {
            debug!(
                "piece {:?} -> {:?} crosses {} segment(s)",
                dbg_anchor!(&*self.figure, &piece.start),
                dbg_anchor!(&*self.figure, &piece.end),
                crossings.len()
            );
        }
        for crossing in crossings {
            let cross = self.figure.intern(Anchor::Point(crossing.at))?;
            let crossed = self.figure[crossing.segment];
            if !crossed.has_endpoint(cross) {
                let former = self.figure.split_segment(crossing.segment, cross)?;
                self.figure.add_segment(cross, former)?;
            }
            self.figure.add_segment(piece.start, cross)?;
            piece.start = Anchor::Vertex(cross);
        }
        self.figure.add_segment(piece.start, piece.end)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tolerance::Tolerances;

    fn insert(figure: &mut Figure, a: (f64, f64), b: (f64, f64)) -> Insertion {
        insert_segment(figure, a.into(), b.into()).unwrap()
    }

    fn has_segment(figure: &Figure, a: (f64, f64), b: (f64, f64)) -> bool {
        let (a, b) = (Point::from(a), Point::from(b));
        figure.iter_segments().any(|(_, s)| {
            let (p, q) = (figure[s.a].point, figure[s.b].point);
            (p == a && q == b) || (p == b && q == a)
        })
    }

    fn triangle() -> Figure {
        let mut figure = Figure::default();
        insert(&mut figure, (0.0, 0.0), (10.0, 0.0));
        insert(&mut figure, (10.0, 0.0), (5.0, 10.0));
        insert(&mut figure, (5.0, 10.0), (0.0, 0.0));
        figure
    }

    #[test]
    fn closed_triangle_shares_vertices() {
        let figure = triangle();
        assert_eq!(figure.len_segments(), 3);
        assert_eq!(figure.len_vertices(), 3);
    }

    #[test]
    fn duplicate_insert_is_noop() {
        let mut figure = triangle();
        assert_eq!(insert(&mut figure, (0.0, 0.0), (10.0, 0.0)), Insertion::Redundant);
        assert_eq!(insert(&mut figure, (10.0, 0.0), (0.0, 0.0)), Insertion::Redundant);
        assert_eq!(insert(&mut figure, (2.0, 0.0), (7.0, 0.0)), Insertion::Redundant);
        assert_eq!(figure.len_segments(), 3);
        assert_eq!(figure.len_vertices(), 3);
    }

    #[test]
    fn degenerate_insert_is_noop() {
        let mut figure = Figure::default();
        assert_eq!(insert(&mut figure, (1.0, 1.0), (1.0, 1.0)), Insertion::Degenerate);
        assert_eq!(figure.len_vertices(), 0);
    }

    #[test]
    fn crossing_splits_both_segments() {
        let mut figure = Figure::default();
        insert(&mut figure, (0.0, 0.0), (10.0, 0.0));
        assert_eq!(insert(&mut figure, (5.0, -5.0), (5.0, 5.0)), Insertion::Added(3));

        assert_eq!(figure.len_segments(), 4);
        assert_eq!(figure.len_vertices(), 5);
        let cross = figure.find_vertex(&Point::new(5.0, 0.0)).unwrap();
        assert!(figure.iter_segments().all(|(_, s)| s.has_endpoint(cross)));
        assert!(has_segment(&figure, (0.0, 0.0), (5.0, 0.0)));
        assert!(has_segment(&figure, (5.0, 0.0), (10.0, 0.0)));
        assert!(has_segment(&figure, (5.0, -5.0), (5.0, 0.0)));
        assert!(has_segment(&figure, (5.0, 0.0), (5.0, 5.0)));
    }

    #[test]
    fn crossings_are_split_in_order() {
        let mut figure = Figure::default();
        insert(&mut figure, (0.0, 0.0), (0.0, 10.0));
        insert(&mut figure, (10.0, 0.0), (10.0, 10.0));
        insert(&mut figure, (-5.0, 5.0), (15.0, 5.0));

        assert_eq!(figure.len_segments(), 7);
        assert!(has_segment(&figure, (-5.0, 5.0), (0.0, 5.0)));
        assert!(has_segment(&figure, (0.0, 5.0), (10.0, 5.0)));
        assert!(has_segment(&figure, (10.0, 5.0), (15.0, 5.0)));
        assert!(has_segment(&figure, (0.0, 0.0), (0.0, 5.0)));
        assert!(has_segment(&figure, (0.0, 5.0), (0.0, 10.0)));
    }

    #[test]
    fn t_junction_splits_existing_segment() {
        let mut figure = Figure::default();
        insert(&mut figure, (0.0, 0.0), (10.0, 0.0));
        insert(&mut figure, (4.0, 0.0), (4.0, 6.0));

        assert_eq!(figure.len_segments(), 3);
        assert_eq!(figure.len_vertices(), 4);
        assert!(has_segment(&figure, (0.0, 0.0), (4.0, 0.0)));
        assert!(has_segment(&figure, (4.0, 0.0), (10.0, 0.0)));
        assert!(has_segment(&figure, (4.0, 0.0), (4.0, 6.0)));
    }

    #[test]
    fn t_junction_split_preserves_coverage() {
        let mut figure = Figure::default();
        insert(&mut figure, (0.0, 0.0), (8.0, 4.0));
        insert(&mut figure, (4.0, 2.0), (4.0, 9.0));

        let pieces: Vec<Span> = figure
            .iter_segments()
            .map(|(_, s)| s.span(&figure))
            .filter(|span| span.line() == Line::Sloped { slope: 0.5, intercept: 0.0 })
            .collect();
        assert_eq!(pieces.len(), 2);
        let total: f64 = pieces.iter().map(|s| s.a.distance_sq(&s.b).sqrt()).sum();
        assert!((total - 80f64.sqrt()).abs() < 1e-9);
        assert!(has_segment(&figure, (0.0, 0.0), (4.0, 2.0)));
        assert!(has_segment(&figure, (4.0, 2.0), (8.0, 4.0)));
    }

    fn only_segments(figure: &Figure, expected: &[((f64, f64), (f64, f64))]) -> bool {
        figure.len_segments() == expected.len()
            && expected.iter().all(|&(a, b)| has_segment(figure, a, b))
    }

    #[test]
    fn start_inside_segment_moves_to_its_far_end() {
        let mut figure = Figure::default();
        insert(&mut figure, (0.0, 0.0), (10.0, 0.0));
        assert_eq!(insert(&mut figure, (5.0, 0.0), (15.0, 0.0)), Insertion::Added(2));

        assert_eq!(figure.len_vertices(), 4);
        assert!(only_segments(
            &figure,
            &[
                ((0.0, 0.0), (5.0, 0.0)),
                ((5.0, 0.0), (10.0, 0.0)),
                ((10.0, 0.0), (15.0, 0.0)),
            ]
        ));
    }

    #[test]
    fn start_inside_segment_moves_to_its_near_end() {
        let mut figure = Figure::default();
        insert(&mut figure, (0.0, 0.0), (10.0, 0.0));
        assert_eq!(insert(&mut figure, (5.0, 0.0), (-5.0, 0.0)), Insertion::Added(2));

        assert_eq!(figure.len_vertices(), 4);
        assert!(only_segments(
            &figure,
            &[
                ((0.0, 0.0), (5.0, 0.0)),
                ((5.0, 0.0), (10.0, 0.0)),
                ((-5.0, 0.0), (0.0, 0.0)),
            ]
        ));
    }

    #[test]
    fn end_inside_segment_moves_to_its_far_end() {
        let mut figure = Figure::default();
        insert(&mut figure, (0.0, 0.0), (10.0, 0.0));
        assert_eq!(insert(&mut figure, (15.0, 0.0), (5.0, 0.0)), Insertion::Added(2));

        assert_eq!(figure.len_vertices(), 4);
        assert!(only_segments(
            &figure,
            &[
                ((0.0, 0.0), (5.0, 0.0)),
                ((5.0, 0.0), (10.0, 0.0)),
                ((10.0, 0.0), (15.0, 0.0)),
            ]
        ));
    }

    #[test]
    fn nearby_vertex_beats_closer_segment_foot() {
        let mut figure = Figure::new(Tolerances::default().with_snap(1.0));
        insert(&mut figure, (0.0, 0.0), (10.0, 0.0));
        let end = figure.find_vertex(&Point::new(10.0, 0.0)).unwrap();

        assert_eq!(snap(&figure, Point::new(9.8, 0.1)), Anchor::Vertex(end));
        assert_eq!(insert(&mut figure, (9.8, 0.1), (9.8, 8.0)), Insertion::Added(1));

        assert_eq!(figure.len_vertices(), 3);
        assert!(figure.find_vertex(&Point::new(9.8, 0.0)).is_none());
        assert!(only_segments(
            &figure,
            &[((0.0, 0.0), (10.0, 0.0)), ((10.0, 0.0), (9.8, 8.0))]
        ));
    }

    #[test]
    fn overlap_walk_stops_on_covered_remainder() {
        // Two collinear segments where the second runs past the target; the
        // figure is built without splitting so the walk meets it directly.
        let mut figure = Figure::default();
        let origin = Anchor::Point(Point::new(0.0, 0.0));
        let s1 = figure
            .add_segment(origin, Point::new(4.0, 0.0))
            .unwrap()
            .unwrap();
        figure
            .add_segment(figure[s1].b, Point::new(20.0, 0.0))
            .unwrap()
            .unwrap();

        let inserter = Inserter {
            a: Anchor::Vertex(figure[s1].a),
            b: Anchor::Point(Point::new(10.0, 0.0)),
            figure: &mut figure,
        };
        assert!(inserter.resolve_overlaps().is_none());
    }

    #[test]
    fn overlap_walk_keeps_uncovered_remainder() {
        let mut figure = Figure::default();
        let s1 = figure
            .add_segment(Point::new(0.0, 0.0), Point::new(4.0, 0.0))
            .unwrap()
            .unwrap();
        figure
            .add_segment(figure[s1].b, Point::new(6.0, 0.0))
            .unwrap()
            .unwrap();

        let inserter = Inserter {
            a: Anchor::Vertex(figure[s1].a),
            b: Anchor::Point(Point::new(10.0, 0.0)),
            figure: &mut figure,
        };
        let pieces = inserter.resolve_overlaps().unwrap();
        assert_eq!(pieces.len(), 1);
        assert_eq!(inserter.point(&pieces[0].start), Point::new(6.0, 0.0));
        assert_eq!(inserter.point(&pieces[0].end), Point::new(10.0, 0.0));
    }

    #[test]
    fn collinear_extension_reuses_shared_vertex() {
        let mut figure = Figure::default();
        insert(&mut figure, (0.0, 0.0), (10.0, 0.0));
        assert_eq!(insert(&mut figure, (10.0, 0.0), (20.0, 0.0)), Insertion::Added(1));
        assert_eq!(figure.len_vertices(), 3);
        assert!(has_segment(&figure, (10.0, 0.0), (20.0, 0.0)));
    }

    #[test]
    fn overlap_keeps_only_uncovered_stretch() {
        let mut figure = Figure::default();
        insert(&mut figure, (0.0, 0.0), (10.0, 0.0));
        assert_eq!(insert(&mut figure, (0.0, 0.0), (20.0, 0.0)), Insertion::Added(1));
        assert_eq!(figure.len_segments(), 2);
        assert!(has_segment(&figure, (0.0, 0.0), (10.0, 0.0)));
        assert!(has_segment(&figure, (10.0, 0.0), (20.0, 0.0)));
    }

    #[test]
    fn overlap_through_covered_middle() {
        let mut figure = Figure::default();
        insert(&mut figure, (4.0, 0.0), (6.0, 0.0));
        assert_eq!(insert(&mut figure, (0.0, 0.0), (10.0, 0.0)), Insertion::Added(2));
        assert_eq!(figure.len_segments(), 3);
        assert!(has_segment(&figure, (0.0, 0.0), (4.0, 0.0)));
        assert!(has_segment(&figure, (4.0, 0.0), (6.0, 0.0)));
        assert!(has_segment(&figure, (6.0, 0.0), (10.0, 0.0)));
    }

    #[test]
    fn endpoint_snaps_to_nearby_vertex() {
        let mut figure = Figure::new(Tolerances::default().with_snap(1.0));
        insert(&mut figure, (0.0, 0.0), (10.0, 0.0));
        insert(&mut figure, (10.3, 0.4), (10.0, 10.0));
        assert_eq!(figure.len_vertices(), 3);
        assert!(has_segment(&figure, (10.0, 0.0), (10.0, 10.0)));
    }

    #[test]
    fn endpoint_snaps_onto_nearby_segment() {
        let mut figure = Figure::new(Tolerances::default().with_snap(1.0));
        insert(&mut figure, (0.0, 0.0), (10.0, 0.0));
        insert(&mut figure, (5.0, 0.5), (5.0, 8.0));
        assert_eq!(figure.len_segments(), 3);
        assert!(has_segment(&figure, (5.0, 0.0), (5.0, 8.0)));
        assert!(has_segment(&figure, (0.0, 0.0), (5.0, 0.0)));
    }

    #[test]
    fn locked_figure_rejects_insert() {
        let mut figure = triangle();
        figure.lock();
        assert_eq!(
            insert_segment(&mut figure, Point::new(0.0, 5.0), Point::new(9.0, 5.0)),
            Err(FigureErr::InvalidState)
        );
        assert_eq!(figure.len_segments(), 3);
    }
}
