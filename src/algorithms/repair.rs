//! Geometry repair.
//!
//! Polygons that are already valid pass through untouched, so features that
//! share a border keep sharing exactly the same coordinates. Invalid polygons
//! are overlaid with an empty clip set, the zero-width equivalent of a
//! zero-distance buffer: self-intersections are split at their crossing
//! points, spikes and collapsed rings disappear, and ring orientation is
//! normalized. Parts of one feature that overlap are unioned so they do not
//! cancel each other out.

use geo::{Area, BooleanOps, BoundingRect, Coord, Intersects, LineString, MultiPolygon, Polygon, Relate};

use crate::error::RepairError;
use crate::geometry::intersect::ring_self_intersects;
use crate::geometry::math::{dedup_ring, ring_signed_area};
use crate::geometry::overlay::union_all;
use crate::geometry::tolerance::{EPS_AREA, EPS_DENOM, EPS_POS};

fn ring_is_finite(ring: &LineString<f64>) -> bool {
    ring.coords().all(|c| c.x.is_finite() && c.y.is_finite())
}

fn is_finite(mp: &MultiPolygon<f64>) -> bool {
    mp.iter().all(|p| ring_is_finite(p.exterior()) && p.interiors().iter().all(ring_is_finite))
}

fn rings(poly: &Polygon<f64>) -> impl Iterator<Item = &LineString<f64>> {
    std::iter::once(poly.exterior()).chain(poly.interiors())
}

/// Ring with duplicate vertices removed, or `None` if too short to close.
fn clean_ring(ring: &LineString<f64>) -> Option<LineString<f64>> {
    let coords: Vec<Coord<f64>> = dedup_ring(ring, EPS_POS);
    // a closed triangle has 4 coords
    if coords.len() < 4 {
        return None;
    }
    Some(LineString::new(coords))
}

// Zero net area covers collapsed rings as well as figure-eights whose lobes
// cancel out; both are left to the overlay.
fn ring_needs_overlay(ring: &LineString<f64>) -> bool {
    ring_signed_area(ring).abs() <= EPS_AREA || ring_self_intersects(ring, EPS_POS, EPS_DENOM)
}

fn overlay_polygon(poly: Polygon<f64>) -> MultiPolygon<f64> {
    MultiPolygon::new(vec![poly]).union(&MultiPolygon::new(Vec::new()))
}

fn repair_polygon(poly: &Polygon<f64>) -> Vec<Polygon<f64>> {
    let Some(exterior) = clean_ring(poly.exterior()) else { return Vec::new() };
    let interiors: Vec<LineString<f64>> = poly.interiors().iter().filter_map(clean_ring).collect();
    let cleaned = Polygon::new(exterior, interiors);
    if rings(&cleaned).any(ring_needs_overlay) {
        overlay_polygon(cleaned).0
    } else {
        vec![cleaned]
    }
}

fn interiors_meet(a: &Polygon<f64>, b: &Polygon<f64>) -> bool {
    let boxes_meet = match (a.bounding_rect(), b.bounding_rect()) {
        (Some(ra), Some(rb)) => ra.intersects(&rb),
        _ => false,
    };
    if !boxes_meet {
        return false;
    }
    let m = a.relate(b);
    m.is_overlaps() || m.is_within() || m.is_contains()
}

fn parts_overlap(parts: &[Polygon<f64>]) -> bool {
    (0..parts.len()).any(|i| ((i + 1)..parts.len()).any(|j| interiors_meet(&parts[i], &parts[j])))
}

fn repair_finite(mp: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    let parts: Vec<Polygon<f64>> = mp
        .iter()
        .flat_map(repair_polygon)
        .filter(|p| p.unsigned_area() > EPS_AREA)
        .collect();
    if parts_overlap(&parts) {
        return union_all(parts.into_iter().map(|p| MultiPolygon::new(vec![p])).collect());
    }
    MultiPolygon::new(parts)
}

/// Repair a geometry into a valid multipolygon covering the same area.
///
/// Valid input comes back with the same coordinates. Fails on non-finite
/// coordinates and on input without any area. Repair is idempotent: a repaired
/// geometry comes back unchanged up to float noise.
pub fn repair(mp: &MultiPolygon<f64>) -> Result<MultiPolygon<f64>, RepairError> {
    if !is_finite(mp) {
        return Err(RepairError::NonFinite);
    }
    let fixed = repair_finite(mp);
    if fixed.0.is_empty() || fixed.unsigned_area() <= EPS_AREA {
        return Err(RepairError::Degenerate);
    }
    Ok(fixed)
}

/// Best-effort repair for dissolution input: rings with non-finite
/// coordinates are dropped instead of failing the whole feature.
pub fn repair_lossy(mp: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    if is_finite(mp) {
        return repair_finite(mp);
    }
    let kept: Vec<Polygon<f64>> = mp
        .iter()
        .filter(|p| ring_is_finite(p.exterior()))
        .map(|p| {
            let interiors = p.interiors().iter().filter(|r| ring_is_finite(r)).cloned().collect();
            Polygon::new(p.exterior().clone(), interiors)
        })
        .collect();
    repair_finite(&MultiPolygon::new(kept))
}

/// Whether the input is visibly invalid: non-finite, degenerate or
/// self-crossing rings, or parts whose interiors overlap.
pub fn needs_repair(mp: &MultiPolygon<f64>) -> bool {
    if !is_finite(mp) {
        return true;
    }
    let bad_ring = mp.iter().flat_map(rings).any(|r| match clean_ring(r) {
        Some(ring) => ring_needs_overlay(&ring),
        None => true,
    });
    bad_ring || parts_overlap(&mp.0)
}
