//! Pairwise adjacency between decoded polygons.
//!
//! The exhaustive O(n²) scan over every unordered pair is the reference
//! behavior. The R-tree strategy only prunes pairs whose bounding boxes are
//! disjoint; boxes that merely touch are kept, so both strategies must and do
//! produce the same neighbor set.

use std::collections::BTreeMap;

use geo::{BoundingRect, Intersects, MultiPolygon, Relate};
use rstar::{RTree, RTreeObject, AABB};
use serde::{Deserialize, Serialize};

use crate::model::DecodedFeature;

/// Code -> ascending neighbor codes. Symmetric and irreflexive.
pub type NeighborSet = BTreeMap<u64, Vec<u64>>;

/// Above this many features `CandidateStrategy::Auto` switches to the R-tree.
pub const AUTO_INDEX_THRESHOLD: usize = 64;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjacencyPredicate {
    /// Boundaries meet or interiors overlap.
    #[default]
    TouchesOrIntersects,
    /// Boundaries meet and interiors stay disjoint.
    Touches,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateStrategy {
    Exhaustive,
    Indexed,
    #[default]
    Auto,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdjacencyOptions {
    pub predicate: AdjacencyPredicate,
    pub strategy: CandidateStrategy,
}

struct BoxEntry {
    idx: usize,
    env: AABB<[f64; 2]>,
}

impl RTreeObject for BoxEntry {
    type Envelope = AABB<[f64; 2]>;
    #[inline] fn envelope(&self) -> Self::Envelope { self.env }
}

fn envelope_of(mp: &MultiPolygon<f64>) -> Option<AABB<[f64; 2]>> {
    mp.bounding_rect().map(|r| AABB::from_corners([r.min().x, r.min().y], [r.max().x, r.max().y]))
}

/// Every unordered pair `(i, j)` with `i < j`.
pub fn candidate_pairs_exhaustive(n: usize) -> Vec<(usize, usize)> {
    let mut pairs = Vec::with_capacity(n.saturating_sub(1) * n / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            pairs.push((i, j));
        }
    }
    pairs
}

/// Pairs `(i, j)` with `i < j` whose bounding boxes intersect (touching included).
pub fn candidate_pairs_indexed(features: &[DecodedFeature]) -> Vec<(usize, usize)> {
    let envs: Vec<Option<AABB<[f64; 2]>>> = features.iter().map(|f| envelope_of(&f.geometry)).collect();
    let entries: Vec<BoxEntry> = envs
        .iter()
        .enumerate()
        .filter_map(|(idx, env)| env.map(|env| BoxEntry { idx, env }))
        .collect();
    let tree = RTree::bulk_load(entries);
    let mut pairs = Vec::new();
    for (i, env) in envs.iter().enumerate() {
        let Some(env) = env else { continue };
        for hit in tree.locate_in_envelope_intersecting(env) {
            if hit.idx > i {
                pairs.push((i, hit.idx));
            }
        }
    }
    pairs.sort_unstable();
    pairs
}

fn related(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>, predicate: AdjacencyPredicate) -> bool {
    match predicate {
        AdjacencyPredicate::TouchesOrIntersects => a.intersects(b),
        AdjacencyPredicate::Touches => a.relate(b).is_touches(),
    }
}

fn use_index(strategy: CandidateStrategy, n: usize) -> bool {
    match strategy {
        CandidateStrategy::Exhaustive => false,
        CandidateStrategy::Indexed => true,
        CandidateStrategy::Auto => n > AUTO_INDEX_THRESHOLD,
    }
}

#[cfg(feature = "threads")]
fn matching_pairs(features: &[DecodedFeature], pairs: Vec<(usize, usize)>, predicate: AdjacencyPredicate) -> Vec<(usize, usize)> {
    use rayon::prelude::*;
    pairs
        .into_par_iter()
        .filter(|&(i, j)| related(&features[i].geometry, &features[j].geometry, predicate))
        .collect()
}

#[cfg(not(feature = "threads"))]
fn matching_pairs(features: &[DecodedFeature], pairs: Vec<(usize, usize)>, predicate: AdjacencyPredicate) -> Vec<(usize, usize)> {
    pairs
        .into_iter()
        .filter(|&(i, j)| related(&features[i].geometry, &features[j].geometry, predicate))
        .collect()
}

/// Build the neighbor relation for features with unique numeric codes.
///
/// Every feature gets an entry; isolated features map to an empty list.
pub fn build_neighbors(features: &[DecodedFeature], opts: &AdjacencyOptions) -> NeighborSet {
    let pairs = if use_index(opts.strategy, features.len()) {
        candidate_pairs_indexed(features)
    } else {
        candidate_pairs_exhaustive(features.len())
    };
    let candidates = pairs.len();
    let hits = matching_pairs(features, pairs, opts.predicate);
    tracing::debug!(features = features.len(), candidates, hits = hits.len(), "adjacency pairs evaluated");

    let mut neighbors: NeighborSet = features.iter().map(|f| (f.code, Vec::new())).collect();
    for (i, j) in hits {
        let (a, b) = (features[i].code, features[j].code);
        if a == b {
            continue;
        }
        neighbors.entry(a).or_default().push(b);
        neighbors.entry(b).or_default().push(a);
    }
    for list in neighbors.values_mut() {
        list.sort_unstable();
        list.dedup();
    }
    neighbors
}

/// Codes with no neighbors, ascending.
pub fn isolated(neighbors: &NeighborSet) -> Vec<u64> {
    neighbors.iter().filter(|(_, v)| v.is_empty()).map(|(k, _)| *k).collect()
}
