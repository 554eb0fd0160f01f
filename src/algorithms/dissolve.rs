//! Group-wise dissolution of child polygons into one aggregate per parent key.

use std::collections::BTreeMap;

use geo::MultiPolygon;
use serde::{Deserialize, Serialize};

use crate::algorithms::repair::repair_lossy;
use crate::geometry::overlay::union_all;
use crate::model::{AggregateFeature, RawFeature};

/// Parent keys that mark a child as belonging to no group.
pub const DEFAULT_EXCLUDED_PARENT: &str = "N/A";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DissolveOptions {
    pub excluded_parent_keys: Vec<String>,
}

impl Default for DissolveOptions {
    fn default() -> Self {
        DissolveOptions { excluded_parent_keys: vec![DEFAULT_EXCLUDED_PARENT.to_string()] }
    }
}

impl DissolveOptions {
    fn is_excluded(&self, key: &str) -> bool {
        key.trim().is_empty() || self.excluded_parent_keys.iter().any(|k| k == key)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DissolveStats {
    /// Children without a usable parent key.
    pub excluded_children: usize,
    /// Parent keys whose members left no area after repair.
    pub empty_groups: Vec<String>,
}

#[derive(Clone, Debug, Default)]
pub struct DissolveOutcome {
    /// One aggregate per non-empty parent key, ascending by key.
    pub aggregates: Vec<AggregateFeature>,
    pub stats: DissolveStats,
}

/// Child geometries per parent key, ascending by key.
pub fn partition<'a>(children: &'a [RawFeature], opts: &DissolveOptions) -> (BTreeMap<&'a str, Vec<&'a MultiPolygon<f64>>>, usize) {
    let mut groups: BTreeMap<&str, Vec<&MultiPolygon<f64>>> = BTreeMap::new();
    let mut excluded = 0usize;
    for child in children {
        match child.parent.as_deref() {
            Some(key) if !opts.is_excluded(key) => groups.entry(key).or_default().push(&child.geometry),
            _ => excluded += 1,
        }
    }
    (groups, excluded)
}

/// Union of one group's members, each repaired first.
///
/// A single member comes back as its own repaired geometry.
pub fn dissolve_group(members: &[&MultiPolygon<f64>]) -> MultiPolygon<f64> {
    let repaired: Vec<MultiPolygon<f64>> = members.iter().map(|m| repair_lossy(m)).collect();
    if repaired.len() == 1 {
        return repaired.into_iter().next().unwrap_or_else(|| MultiPolygon::new(Vec::new()));
    }
    union_all(repaired)
}

#[cfg(feature = "threads")]
fn dissolve_groups(groups: Vec<(&str, Vec<&MultiPolygon<f64>>)>) -> Vec<(String, usize, MultiPolygon<f64>)> {
    use rayon::prelude::*;
    groups
        .into_par_iter()
        .map(|(key, members)| (key.to_string(), members.len(), dissolve_group(&members)))
        .collect()
}

#[cfg(not(feature = "threads"))]
fn dissolve_groups(groups: Vec<(&str, Vec<&MultiPolygon<f64>>)>) -> Vec<(String, usize, MultiPolygon<f64>)> {
    groups
        .into_iter()
        .map(|(key, members)| (key.to_string(), members.len(), dissolve_group(&members)))
        .collect()
}

/// Dissolve children into one aggregate per parent key.
pub fn dissolve(children: &[RawFeature], opts: &DissolveOptions) -> DissolveOutcome {
    let (groups, excluded_children) = partition(children, opts);
    if excluded_children > 0 {
        tracing::debug!(excluded_children, "children without a parent key left out of dissolution");
    }
    let mut stats = DissolveStats { excluded_children, empty_groups: Vec::new() };
    let mut aggregates = Vec::with_capacity(groups.len());
    for (parent, child_count, geometry) in dissolve_groups(groups.into_iter().collect()) {
        if geometry.0.is_empty() {
            tracing::warn!(%parent, child_count, "group has no area after repair, skipped");
            stats.empty_groups.push(parent);
            continue;
        }
        aggregates.push(AggregateFeature { parent, child_count, geometry });
    }
    DissolveOutcome { aggregates, stats }
}
