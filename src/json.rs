//! Layer documents in, reports out.
//!
//! A layer document is the in-memory hand-off from whatever loaded the
//! polygons (database query, vector file reader):
//!
//! ```json
//! { "features": [ { "id": "_x31_2", "name": "...", "parent": "Realm",
//!                   "polygons": [ [ [[x, y], ...], [[x, y], ...] ] ] } ] }
//! ```
//!
//! Each polygon is a list of rings, exterior first.

use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::IngestError;
use crate::geometry::limits;
use crate::model::{AggregateFeature, RawFeature};
use crate::TopologyReport;

#[derive(Deserialize)]
#[serde(untagged)]
enum IdDe {
    Text(String),
    Int(i64),
}

#[derive(Deserialize)]
struct FeatureDe {
    id: IdDe,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    parent: Option<String>,
    polygons: Vec<Vec<Vec<[f64; 2]>>>,
}

#[derive(Deserialize)]
struct LayerDe {
    features: Vec<FeatureDe>,
}

#[derive(Serialize)]
struct AggregateSer<'a> {
    parent: &'a str,
    child_count: usize,
    polygons: Vec<Vec<Vec<[f64; 2]>>>,
}

#[derive(Serialize)]
struct AggregateLayerSer<'a> {
    features: Vec<AggregateSer<'a>>,
}

fn cap(limit: &'static str, got: usize, max: usize) -> Result<(), IngestError> {
    if got > max {
        return Err(IngestError::LimitExceeded { limit, got, max });
    }
    Ok(())
}

fn ring_from(points: Vec<[f64; 2]>) -> LineString<f64> {
    LineString::new(points.into_iter().map(|[x, y]| Coord { x, y }).collect())
}

fn ring_to(ring: &LineString<f64>) -> Vec<[f64; 2]> {
    ring.coords().map(|c| [c.x, c.y]).collect()
}

fn polygons_to(mp: &MultiPolygon<f64>) -> Vec<Vec<Vec<[f64; 2]>>> {
    mp.iter()
        .map(|p| std::iter::once(p.exterior()).chain(p.interiors()).map(ring_to).collect())
        .collect()
}

/// Parse a layer document into raw features, enforcing ingestion limits.
pub fn layer_from_value(v: Value) -> Result<Vec<RawFeature>, IngestError> {
    let doc: LayerDe = serde_json::from_value(v).map_err(|e| IngestError::Malformed(e.to_string()))?;
    cap("features", doc.features.len(), limits::MAX_FEATURES)?;
    let mut total_vertices = 0usize;
    let mut out = Vec::with_capacity(doc.features.len());
    for f in doc.features {
        let id = match f.id {
            IdDe::Text(s) => s,
            IdDe::Int(n) => n.to_string(),
        };
        cap("identifier length", id.len(), limits::MAX_ID_LEN)?;
        let rings: usize = f.polygons.iter().map(Vec::len).sum();
        cap("rings per feature", rings, limits::MAX_RINGS_PER_FEATURE)?;
        let vertices: usize = f.polygons.iter().flatten().map(Vec::len).sum();
        cap("vertices per feature", vertices, limits::MAX_VERTICES_PER_FEATURE)?;
        total_vertices += vertices;
        cap("total vertices", total_vertices, limits::MAX_VERTICES_TOTAL)?;
        let in_bounds = f
            .polygons
            .iter()
            .flatten()
            .flatten()
            .all(|[x, y]| limits::in_coord_bounds(*x) && limits::in_coord_bounds(*y));
        if !in_bounds {
            return Err(IngestError::CoordOutOfBounds { id });
        }
        let mut polys = Vec::with_capacity(f.polygons.len());
        for rings in f.polygons {
            let mut it = rings.into_iter();
            let Some(exterior) = it.next() else { continue };
            polys.push(Polygon::new(ring_from(exterior), it.map(ring_from).collect()));
        }
        out.push(RawFeature { id, name: f.name, parent: f.parent, geometry: MultiPolygon::new(polys) });
    }
    Ok(out)
}

/// Aggregate layer in the input polygon schema plus `child_count`.
pub fn aggregates_to_value(layer: &[AggregateFeature]) -> Result<Value, serde_json::Error> {
    let doc = AggregateLayerSer {
        features: layer
            .iter()
            .map(|f| AggregateSer { parent: &f.parent, child_count: f.child_count, polygons: polygons_to(&f.geometry) })
            .collect(),
    };
    serde_json::to_value(doc)
}

/// Topology report as JSON text. Code keys appear in ascending numeric order.
pub fn topology_to_string(report: &TopologyReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}
