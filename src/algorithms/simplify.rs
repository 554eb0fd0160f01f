//! Tolerance-based simplification of aggregate geometry.
//!
//! Only ever applied after dissolution: simplifying children before the union
//! opens slivers between neighbors.

use geo::{Area, LineString, MultiPolygon, Polygon, Simplify};

use crate::geometry::math::dist_point_to_boundary_sq;
use crate::geometry::tolerance::EPS_AREA;
use crate::model::AggregateFeature;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SimplifyStats {
    pub vertices_before: usize,
    pub vertices_after: usize,
    /// Polygons or holes that collapsed and were dropped.
    pub dropped_parts: usize,
}

pub fn vertex_count(mp: &MultiPolygon<f64>) -> usize {
    mp.iter()
        .map(|p| p.exterior().0.len() + p.interiors().iter().map(|r| r.0.len()).sum::<usize>())
        .sum()
}

fn ring_survives(ring: &LineString<f64>) -> bool {
    ring.0.len() >= 4 && Polygon::new(ring.clone(), Vec::new()).unsigned_area() > EPS_AREA
}

/// Douglas–Peucker simplification. Rings that collapse are dropped, so the
/// result never contains a ring with fewer than four coordinates.
pub fn simplify(mp: &MultiPolygon<f64>, tolerance: f64, stats: &mut SimplifyStats) -> MultiPolygon<f64> {
    stats.vertices_before += vertex_count(mp);
    let raw = mp.simplify(&tolerance);
    let mut kept = Vec::with_capacity(raw.0.len());
    for poly in raw {
        let (exterior, interiors) = poly.into_inner();
        if !ring_survives(&exterior) {
            stats.dropped_parts += 1 + interiors.len();
            continue;
        }
        let before = interiors.len();
        let interiors: Vec<LineString<f64>> = interiors.into_iter().filter(ring_survives).collect();
        stats.dropped_parts += before - interiors.len();
        kept.push(Polygon::new(exterior, interiors));
    }
    let out = MultiPolygon::new(kept);
    stats.vertices_after += vertex_count(&out);
    out
}

/// Simplified copy of an aggregate layer with the same attributes.
pub fn simplify_layer(layer: &[AggregateFeature], tolerance: f64) -> (Vec<AggregateFeature>, SimplifyStats) {
    let mut stats = SimplifyStats::default();
    let out = layer
        .iter()
        .map(|f| AggregateFeature {
            parent: f.parent.clone(),
            child_count: f.child_count,
            geometry: simplify(&f.geometry, tolerance, &mut stats),
        })
        .collect();
    (out, stats)
}

/// Largest distance from the simplified boundary to the original boundary,
/// sampled at `samples` points per simplified segment.
pub fn max_deviation(original: &MultiPolygon<f64>, simplified: &MultiPolygon<f64>, samples: usize) -> f64 {
    let samples = samples.max(1);
    let mut worst = 0.0f64;
    for poly in simplified {
        for ring in std::iter::once(poly.exterior()).chain(poly.interiors()) {
            for line in ring.lines() {
                for k in 0..=samples {
                    let t = k as f64 / samples as f64;
                    let px = line.start.x + t * (line.end.x - line.start.x);
                    let py = line.start.y + t * (line.end.y - line.start.y);
                    worst = worst.max(dist_point_to_boundary_sq(px, py, original).sqrt());
                }
            }
        }
    }
    worst
}
