//! Region name resolution for the completeness branch.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::algorithms::completeness::normalize_name;
use crate::algorithms::decode::Decoder;
use crate::model::RawFeature;

/// Default category filtered out of the discovered names.
pub const DEFAULT_OCEAN_SENTINEL: &str = "Ocean";

/// Manual identifier -> canonical name table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NameTable {
    entries: BTreeMap<String, String>,
}

impl NameTable {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        NameTable { entries: entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }

    pub fn get(&self, key: &str) -> Option<&str> { self.entries.get(key).map(String::as_str) }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NameResolution {
    /// Raw id -> resolved name, sentinel names included.
    pub names: BTreeMap<String, String>,
    /// Distinct resolved names without the sentinel.
    pub discovered: BTreeSet<String>,
    /// Raw ids for which no name could be found.
    pub unnamed: Vec<String>,
}

/// Name for one feature: table by raw id, then table by decoded code, then the
/// feature's own name attribute.
pub fn resolve_name(feature: &RawFeature, table: &NameTable, decoder: &Decoder) -> Option<String> {
    let decoded = decoder.decode_text(&feature.id);
    table
        .get(&feature.id)
        .or_else(|| table.get(&decoded))
        .or(feature.name.as_deref())
        .map(normalize_name)
        .filter(|n| !n.is_empty())
}

pub fn resolve_names(features: &[RawFeature], table: &NameTable, decoder: &Decoder, ocean_sentinel: &str) -> NameResolution {
    let sentinel = normalize_name(ocean_sentinel);
    let mut out = NameResolution::default();
    for f in features {
        match resolve_name(f, table, decoder) {
            Some(name) => {
                if name != sentinel {
                    out.discovered.insert(name.clone());
                }
                out.names.insert(f.id.clone(), name);
            }
            None => {
                tracing::debug!(raw_id = %f.id, "no name for feature");
                out.unnamed.push(f.id.clone());
            }
        }
    }
    out
}
