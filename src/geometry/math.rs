use geo::{Coord, LineString, MultiPolygon};

use super::tolerance::approx_eq;

pub fn seg_distance_sq(px: f64, py: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> (f64, f64) {
    let vx = x2 - x1; let vy = y2 - y1;
    let wx = px - x1; let wy = py - y1;
    let vv = vx*vx + vy*vy;
    let mut t = if vv > 0.0 { (wx*vx + wy*vy) / vv } else { 0.0 };
    if t < 0.0 { t = 0.0; } else if t > 1.0 { t = 1.0; }
    let projx = x1 + t * vx; let projy = y1 + t * vy;
    let dx = px - projx; let dy = py - projy;
    (dx*dx + dy*dy, t)
}

pub fn dist_point_to_seg_sq(px: f64, py: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let (d2, _) = seg_distance_sq(px, py, x1, y1, x2, y2);
    d2
}

/// Shoelace area of a ring; positive for counter-clockwise winding.
pub fn ring_signed_area(ring: &LineString<f64>) -> f64 {
    let pts = &ring.0;
    if pts.len() < 3 {
        return 0.0;
    }
    let mut a = 0.0f64;
    for i in 0..pts.len() {
        let j = (i + 1) % pts.len();
        a += pts[i].x * pts[j].y - pts[j].x * pts[i].y;
    }
    0.5 * a
}

/// Ring coordinates with consecutive duplicates removed. The closing vertex is kept.
pub fn dedup_ring(ring: &LineString<f64>, eps: f64) -> Vec<Coord<f64>> {
    let mut out: Vec<Coord<f64>> = Vec::with_capacity(ring.0.len());
    for c in ring.coords() {
        if let Some(prev) = out.last() {
            if approx_eq(prev.x, c.x, eps) && approx_eq(prev.y, c.y, eps) {
                continue;
            }
        }
        out.push(*c);
    }
    out
}

/// Squared distance from a point to the nearest segment of any ring in `mp`.
pub fn dist_point_to_boundary_sq(px: f64, py: f64, mp: &MultiPolygon<f64>) -> f64 {
    let mut best = f64::INFINITY;
    for poly in mp {
        for ring in std::iter::once(poly.exterior()).chain(poly.interiors()) {
            for line in ring.lines() {
                let d2 = dist_point_to_seg_sq(px, py, line.start.x, line.start.y, line.end.x, line.end.y);
                if d2 < best { best = d2; }
            }
        }
    }
    best
}
