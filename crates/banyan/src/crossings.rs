//! Edge-crossing count, the layout quality metric.
//!
//! Every unordered pair of tree edges is tested with the classic orientation predicate. Pairs
//! that share an endpoint meet there by construction and are never counted.

use crate::geom::Point;
use crate::tree::{NodeIdx, Tree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Collinear,
    Clockwise,
    CounterClockwise,
}

/// Rotational direction of the ordered triplet `(a, b, c)`.
pub fn orientation(a: Point, b: Point, c: Point) -> Orientation {
    let val = (b.y - a.y) * (c.x - b.x) - (b.x - a.x) * (c.y - b.y);
    if val == 0.0 {
        Orientation::Collinear
    } else if val > 0.0 {
        Orientation::Clockwise
    } else {
        Orientation::CounterClockwise
    }
}

/// Whether `q` lies in the axis-aligned bounding box of segment `pr`.
pub fn on_segment(p: Point, q: Point, r: Point) -> bool {
    q.x <= p.x.max(r.x) && q.x >= p.x.min(r.x) && q.y <= p.y.max(r.y) && q.y >= p.y.min(r.y)
}

/// Whether the closed segments `p1q1` and `p2q2` intersect (touching counts).
pub fn segments_intersect(p1: Point, q1: Point, p2: Point, q2: Point) -> bool {
    let o1 = orientation(p1, q1, p2);
    let o2 = orientation(p1, q1, q2);
    let o3 = orientation(p2, q2, p1);
    let o4 = orientation(p2, q2, q1);

    if o1 != o2 && o3 != o4 {
        return true;
    }

    (o1 == Orientation::Collinear && on_segment(p1, p2, q1))
        || (o2 == Orientation::Collinear && on_segment(p1, q2, q1))
        || (o3 == Orientation::Collinear && on_segment(p2, p1, q2))
        || (o4 == Orientation::Collinear && on_segment(p2, q1, q2))
}

/// A drawn edge: two endpoint identities and their coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment<K> {
    pub from: K,
    pub to: K,
    pub a: Point,
    pub b: Point,
}

impl<K: PartialEq> Segment<K> {
    pub fn shares_endpoint(&self, other: &Self) -> bool {
        self.from == other.from
            || self.from == other.to
            || self.to == other.from
            || self.to == other.to
    }

    pub fn crosses(&self, other: &Self) -> bool {
        !self.shares_endpoint(other) && segments_intersect(self.a, self.b, other.a, other.b)
    }
}

/// Parent-to-child segments of `tree` at the current positions.
pub fn tree_segments(tree: &Tree) -> Vec<Segment<NodeIdx>> {
    tree.edges()
        .into_iter()
        .map(|(p, c)| Segment {
            from: p,
            to: c,
            a: tree.position(p),
            b: tree.position(c),
        })
        .collect()
}

/// Index pairs `(i, j)`, `i < j`, of crossing segments.
pub fn crossing_pairs<K: PartialEq>(segments: &[Segment<K>]) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    for (i, s) in segments.iter().enumerate() {
        for (j, t) in segments.iter().enumerate().skip(i + 1) {
            if s.crosses(t) {
                out.push((i, j));
            }
        }
    }
    out
}

pub fn count_segment_crossings<K: PartialEq>(segments: &[Segment<K>]) -> usize {
    segments
        .iter()
        .enumerate()
        .map(|(i, s)| segments[i + 1..].iter().filter(|t| s.crosses(t)).count())
        .sum()
}

/// Number of crossing edge pairs in the tree's current layout.
pub fn count_crossings(tree: &Tree) -> usize {
    count_segment_crossings(&tree_segments(tree))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::point;

    fn seg(from: u32, to: u32, a: (f64, f64), b: (f64, f64)) -> Segment<u32> {
        Segment {
            from,
            to,
            a: point(a.0, a.1),
            b: point(b.0, b.1),
        }
    }

    #[test]
    fn orientation_signs() {
        let a = point(0.0, 0.0);
        assert_eq!(
            orientation(a, point(1.0, 1.0), point(2.0, 2.0)),
            Orientation::Collinear
        );
        // (b.y-a.y)*(c.x-b.x) - (b.x-a.x)*(c.y-b.y) = 1*1 - 1*(-1) = 2 > 0
        assert_eq!(
            orientation(a, point(1.0, 1.0), point(2.0, 0.0)),
            Orientation::Clockwise
        );
        assert_eq!(
            orientation(a, point(1.0, 1.0), point(1.0, 2.0)),
            Orientation::CounterClockwise
        );
    }

    #[test]
    fn x_pattern_crosses_once() {
        let s = [
            seg(0, 1, (0.0, 0.0), (10.0, 10.0)),
            seg(2, 3, (0.0, 10.0), (10.0, 0.0)),
        ];
        assert_eq!(count_segment_crossings(&s), 1);
        assert_eq!(crossing_pairs(&s), [(0, 1)]);
    }

    #[test]
    fn overlapping_collinear_segments_intersect() {
        assert!(segments_intersect(
            point(0.0, 0.0),
            point(10.0, 0.0),
            point(5.0, 0.0),
            point(15.0, 0.0)
        ));
    }

    #[test]
    fn disjoint_collinear_segments_do_not_intersect() {
        assert!(!segments_intersect(
            point(0.0, 0.0),
            point(4.0, 0.0),
            point(5.0, 0.0),
            point(15.0, 0.0)
        ));
    }

    #[test]
    fn parallel_segments_do_not_intersect() {
        assert!(!segments_intersect(
            point(0.0, 0.0),
            point(10.0, 0.0),
            point(0.0, 1.0),
            point(10.0, 1.0)
        ));
    }

    #[test]
    fn t_junction_touch_counts() {
        assert!(segments_intersect(
            point(0.0, 0.0),
            point(10.0, 0.0),
            point(5.0, 0.0),
            point(5.0, 8.0)
        ));
    }

    #[test]
    fn shared_endpoint_is_not_a_crossing() {
        // Geometrically overlapping, but both hang off node 0.
        let s = [
            seg(0, 1, (0.0, 0.0), (10.0, 0.0)),
            seg(0, 2, (0.0, 0.0), (5.0, 0.0)),
        ];
        assert_eq!(count_segment_crossings(&s), 0);

        // Parent of one is the child of the other.
        let s = [
            seg(0, 1, (0.0, 0.0), (10.0, 10.0)),
            seg(1, 2, (10.0, 10.0), (0.0, 10.0)),
        ];
        assert_eq!(count_segment_crossings(&s), 0);
    }
}
