// Segment-segment intersection classification and ring self-intersection scan.
// Used to tell whether a ring actually needed repair before overlaying it.

use geo::{Coord, LineString};
use rstar::{RTree, RTreeObject, AABB};

use crate::geometry::limits::MAX_SCAN_SEGMENTS;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegIntersection {
    None,
    // Proper interior intersection (not at endpoints within tolerance)
    Proper { t: f64, u: f64, x: f64, y: f64 },
    // Touch at endpoints (may be both endpoints). t/u may be 0 or 1 within tolerance
    Touch { t: f64, u: f64, x: f64, y: f64 },
    // Collinear overlapping span: parameter ranges on AB (inclusive, ordered)
    CollinearOverlap { t0: f64, t1: f64 },
}

#[inline]
fn orient(a: Coord<f64>, b: Coord<f64>, c: Coord<f64>) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

#[inline]
fn within_eps(x: f64, eps: f64) -> bool { x.abs() <= eps }

#[inline]
fn clamp01(x: f64) -> f64 { x.clamp(0.0, 1.0) }

// Project CD onto the dominant axis of AB and compute the overlapping t-range.
fn collinear_overlap(a: Coord<f64>, b: Coord<f64>, c: Coord<f64>, d: Coord<f64>, eps: f64) -> SegIntersection {
    let use_x = (b.x - a.x).abs() >= (b.y - a.y).abs();
    let (pa1, pa2, pc1, pc2) = if use_x { (a.x, b.x, c.x, d.x) } else { (a.y, b.y, c.y, d.y) };
    let len_ab = pa2 - pa1;
    if within_eps(len_ab, eps) {
        return SegIntersection::Touch { t: 0.0, u: 0.0, x: a.x, y: a.y };
    }
    let t_c1 = (pc1 - pa1) / len_ab;
    let t_c2 = (pc2 - pa1) / len_ab;
    let lo = t_c1.min(t_c2).max(0.0);
    let hi = t_c1.max(t_c2).min(1.0);
    if hi < lo - eps { return SegIntersection::None; }
    SegIntersection::CollinearOverlap { t0: lo, t1: hi.max(lo) }
}

pub fn intersect_segments(a: Coord<f64>, b: Coord<f64>, c: Coord<f64>, d: Coord<f64>,
                          eps_pos: f64, eps_denom: f64) -> SegIntersection {
    let o1 = orient(a, b, c);
    let o2 = orient(a, b, d);
    let o3 = orient(c, d, a);
    let o4 = orient(c, d, b);

    if within_eps(o1, eps_pos) && within_eps(o2, eps_pos) && within_eps(o3, eps_pos) && within_eps(o4, eps_pos) {
        return collinear_overlap(a, b, c, d, eps_pos);
    }

    let inter1 = (o1 > 0.0 && o2 < 0.0) || (o1 < 0.0 && o2 > 0.0) || within_eps(o1, eps_pos) || within_eps(o2, eps_pos);
    let inter2 = (o3 > 0.0 && o4 < 0.0) || (o3 < 0.0 && o4 > 0.0) || within_eps(o3, eps_pos) || within_eps(o4, eps_pos);
    if !(inter1 && inter2) {
        return SegIntersection::None;
    }

    let r_x = b.x - a.x; let r_y = b.y - a.y;
    let s_x = d.x - c.x; let s_y = d.y - c.y;
    let rxs = r_x * s_y - r_y * s_x;
    if within_eps(rxs, eps_denom) {
        return SegIntersection::None;
    }
    let q_p_x = c.x - a.x; let q_p_y = c.y - a.y;
    let t = (q_p_x * s_y - q_p_y * s_x) / rxs;
    let u = (q_p_x * r_y - q_p_y * r_x) / rxs;
    let x = a.x + t * r_x;
    let y = a.y + t * r_y;

    let is_touch = within_eps(t, eps_pos) || within_eps(1.0 - t, eps_pos) || within_eps(u, eps_pos) || within_eps(1.0 - u, eps_pos);
    if is_touch {
        SegIntersection::Touch { t: clamp01(t), u: clamp01(u), x, y }
    } else if t >= -eps_pos && t <= 1.0 + eps_pos && u >= -eps_pos && u <= 1.0 + eps_pos {
        SegIntersection::Proper { t, u, x, y }
    } else {
        SegIntersection::None
    }
}

struct SegEntry {
    idx: usize,
    env: AABB<[f64; 2]>,
}

impl RTreeObject for SegEntry {
    type Envelope = AABB<[f64; 2]>;
    #[inline] fn envelope(&self) -> Self::Envelope { self.env }
}

fn seg_envelope(a: Coord<f64>, b: Coord<f64>, eps: f64) -> AABB<[f64; 2]> {
    AABB::from_corners([a.x.min(b.x) - eps, a.y.min(b.y) - eps], [a.x.max(b.x) + eps, a.y.max(b.y) + eps])
}

// Segment pairs (i, j), i < j, whose eps-grown boxes intersect.
fn indexed_segment_pairs(segs: &[(Coord<f64>, Coord<f64>)], eps: f64) -> Vec<(usize, usize)> {
    let entries: Vec<SegEntry> = segs
        .iter()
        .enumerate()
        .map(|(idx, &(a, b))| SegEntry { idx, env: seg_envelope(a, b, eps) })
        .collect();
    let tree = RTree::bulk_load(entries);
    let mut pairs = Vec::new();
    for (i, &(a, b)) in segs.iter().enumerate() {
        for hit in tree.locate_in_envelope_intersecting(&seg_envelope(a, b, eps)) {
            if hit.idx > i {
                pairs.push((i, hit.idx));
            }
        }
    }
    pairs
}

fn pair_crosses(segs: &[(Coord<f64>, Coord<f64>)], i: usize, j: usize, eps_pos: f64, eps_denom: f64) -> bool {
    let n = segs.len();
    let adjacent = j == i + 1 || (i == 0 && j == n - 1);
    let (a, b) = segs[i];
    let (c, d) = segs[j];
    match intersect_segments(a, b, c, d, eps_pos, eps_denom) {
        SegIntersection::None => false,
        SegIntersection::Proper { .. } => true,
        SegIntersection::Touch { .. } => !adjacent,
        SegIntersection::CollinearOverlap { t0, t1 } => !adjacent || t1 - t0 > eps_pos,
    }
}

/// True when two non-adjacent segments of the ring cross or overlap.
///
/// Adjacent segments share a vertex by construction and are only flagged when
/// they fold back onto each other. Rings with more than `MAX_SCAN_SEGMENTS`
/// segments are scanned through a segment R-tree instead of pair by pair.
pub fn ring_self_intersects(ring: &LineString<f64>, eps_pos: f64, eps_denom: f64) -> bool {
    let segs: Vec<(Coord<f64>, Coord<f64>)> = ring.lines().map(|l| (l.start, l.end)).collect();
    let n = segs.len();
    if n < 3 {
        return false;
    }
    if n > MAX_SCAN_SEGMENTS {
        return indexed_segment_pairs(&segs, eps_pos)
            .into_iter()
            .any(|(i, j)| pair_crosses(&segs, i, j, eps_pos, eps_denom));
    }
    (0..n).any(|i| ((i + 1)..n).any(|j| pair_crosses(&segs, i, j, eps_pos, eps_denom)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{coord, line_string};

    const EP: f64 = 1e-9;
    const ED: f64 = 1e-15;

    #[test]
    fn proper_cross() {
        let r = intersect_segments(coord! { x: 0.0, y: 0.0 }, coord! { x: 2.0, y: 2.0 }, coord! { x: 0.0, y: 2.0 }, coord! { x: 2.0, y: 0.0 }, EP, ED);
        match r { SegIntersection::Proper{t,u,..} => { assert!(t>0.4 && t<0.6); assert!(u>0.4 && u<0.6); }, _ => panic!("expected proper") }
    }

    #[test]
    fn endpoint_touch() {
        let r = intersect_segments(coord! { x: 0.0, y: 0.0 }, coord! { x: 1.0, y: 0.0 }, coord! { x: 1.0, y: 0.0 }, coord! { x: 1.0, y: 1.0 }, EP, ED);
        match r { SegIntersection::Touch{x,y,..} => { assert!((x-1.0).abs()<1e-9 && y.abs()<1e-9); }, _ => panic!("expected touch") }
    }

    #[test]
    fn collinear_overlap_range() {
        let r = intersect_segments(coord! { x: 0.0, y: 0.0 }, coord! { x: 3.0, y: 0.0 }, coord! { x: 1.0, y: 0.0 }, coord! { x: 2.0, y: 0.0 }, EP, ED);
        match r { SegIntersection::CollinearOverlap{t0,t1} => { assert!(t0>=0.33 && t1<=0.67); }, _ => panic!("expected overlap") }
    }

    #[test]
    fn bowtie_is_flagged_square_is_not() {
        let bowtie = line_string![(x: 0.0, y: 0.0), (x: 2.0, y: 2.0), (x: 2.0, y: 0.0), (x: 0.0, y: 2.0), (x: 0.0, y: 0.0)];
        let square = line_string![(x: 0.0, y: 0.0), (x: 2.0, y: 0.0), (x: 2.0, y: 2.0), (x: 0.0, y: 2.0), (x: 0.0, y: 0.0)];
        assert!(ring_self_intersects(&bowtie, EP, ED));
        assert!(!ring_self_intersects(&square, EP, ED));
    }

    fn circle(n: usize, r: f64) -> Vec<Coord<f64>> {
        (0..n)
            .map(|k| {
                let a = k as f64 * std::f64::consts::TAU / n as f64;
                coord! { x: r * a.cos(), y: r * a.sin() }
            })
            .collect()
    }

    #[test]
    fn long_rings_are_scanned_too() {
        let mut pts = circle(MAX_SCAN_SEGMENTS + 500, 1000.0);
        pts.push(pts[0]);
        assert!(!ring_self_intersects(&LineString::new(pts.clone()), EP, ED));
        pts.swap(2000, 2001);
        assert!(ring_self_intersects(&LineString::new(pts), EP, ED));
    }
}
