// Order-independent union of many polygon sets.

use std::cmp::Ordering;

use geo::{Area, BooleanOps, BoundingRect, MultiPolygon};

/// Sort key that puts parts into a canonical order regardless of input order.
fn canonical_key(mp: &MultiPolygon<f64>) -> [f64; 5] {
    match mp.bounding_rect() {
        Some(r) => [r.min().x, r.min().y, r.max().x, r.max().y, mp.unsigned_area()],
        None => [f64::INFINITY; 5],
    }
}

fn canonical_cmp(a: &[f64; 5], b: &[f64; 5]) -> Ordering {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| x.total_cmp(y))
        .find(|o| *o != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

/// Union every part into one multipolygon.
///
/// Parts are sorted into a canonical order first and then merged pairwise in a
/// balanced tree, so the result does not depend on the caller's ordering and
/// intermediate operands stay small.
pub fn union_all(parts: Vec<MultiPolygon<f64>>) -> MultiPolygon<f64> {
    let mut keyed: Vec<([f64; 5], MultiPolygon<f64>)> = parts
        .into_iter()
        .filter(|p| !p.0.is_empty())
        .map(|p| (canonical_key(&p), p))
        .collect();
    keyed.sort_by(|a, b| canonical_cmp(&a.0, &b.0));
    let mut level: Vec<MultiPolygon<f64>> = keyed.into_iter().map(|(_, p)| p).collect();
    if level.is_empty() {
        return MultiPolygon::new(Vec::new());
    }
    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        let mut it = level.into_iter();
        while let Some(a) = it.next() {
            match it.next() {
                Some(b) => next.push(a.union(&b)),
                None => next.push(a),
            }
        }
        level = next;
    }
    level.pop().unwrap_or_else(|| MultiPolygon::new(Vec::new()))
}
