pub mod config;
pub mod error;
pub mod model;
pub mod geometry {
    pub mod intersect;
    pub mod limits;
    pub mod math;
    pub mod overlay;
    pub mod tolerance;
}
pub mod algorithms {
    pub mod adjacency;
    pub mod centroid;
    pub mod completeness;
    pub mod decode;
    pub mod dissolve;
    pub mod names;
    pub mod repair;
    pub mod simplify;
}
pub mod json;

use std::collections::{BTreeMap, HashMap};

use algorithms::adjacency::{build_neighbors, isolated, NeighborSet};
use algorithms::centroid::{bucket_members, centroids};
use algorithms::completeness::{validate, CompletenessReport, ReferenceSet};
use algorithms::decode::Decoder;
use algorithms::dissolve::{dissolve, DissolveStats};
use algorithms::names::{resolve_names, NameResolution, NameTable};
use algorithms::repair::{needs_repair, repair};
use algorithms::simplify::{simplify_layer, SimplifyStats};
use config::EngineConfig;
use error::ConfigError;
use model::{AggregateFeature, Centroid, Code, DecodedFeature, RawFeature, RegionBucket, SkipReason, Skipped};
use serde::Serialize;

/// Feature left out of adjacency and centroids because repair failed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Unrepairable {
    pub raw_id: String,
    pub code: u64,
    pub reason: String,
}

/// Decoded and repaired features plus everything that did not make it.
#[derive(Clone, Debug, Default)]
pub struct Prepared {
    pub features: Vec<DecodedFeature>,
    pub skipped: Vec<Skipped>,
    pub unrepairable: Vec<Unrepairable>,
    /// Inputs that were visibly invalid before repair.
    pub repaired: usize,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct TopologyReport {
    pub neighbors: NeighborSet,
    pub centroids: BTreeMap<u64, Centroid>,
    pub buckets: BTreeMap<RegionBucket, Vec<u64>>,
    pub isolated: Vec<u64>,
    pub skipped: Vec<Skipped>,
    pub unrepairable: Vec<Unrepairable>,
}

#[derive(Clone, Debug, Default)]
pub struct AggregationOutput {
    pub aggregates: Vec<AggregateFeature>,
    pub simplified: Vec<AggregateFeature>,
    pub dissolve: DissolveStats,
    pub simplify: SimplifyStats,
}

/// Batch engine. Holds only configuration; every run works on the snapshot it
/// is given and returns a complete result.
pub struct Engine {
    config: EngineConfig,
    decoder: Decoder,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Engine, ConfigError> {
        let config = config.validated()?;
        let decoder = config.decoder()?;
        Ok(Engine { config, decoder })
    }

    pub fn config(&self) -> &EngineConfig { &self.config }

    pub fn decoder(&self) -> &Decoder { &self.decoder }

    /// Decode identifiers and repair geometry. Text codes and duplicate codes
    /// are skipped; features whose repair fails are listed as unrepairable.
    /// A code is claimed by the first feature that repairs successfully.
    pub fn prepare(&self, features: &[RawFeature]) -> Prepared {
        let mut out = Prepared::default();
        let mut seen: HashMap<u64, &str> = HashMap::new();
        for f in features {
            let code = match self.decoder.decode(&f.id) {
                Code::Numeric(n) => n,
                Code::Text(text) => {
                    tracing::debug!(raw_id = %f.id, decoded = %text, "non-numeric code skipped");
                    out.skipped.push(Skipped { raw_id: f.id.clone(), reason: SkipReason::DecodeAmbiguity { code: text } });
                    continue;
                }
            };
            if let Some(kept) = seen.get(&code) {
                tracing::warn!(raw_id = %f.id, code, kept = %kept, "duplicate code skipped");
                out.skipped.push(Skipped {
                    raw_id: f.id.clone(),
                    reason: SkipReason::DuplicateCode { code, kept: kept.to_string() },
                });
                continue;
            }
            if needs_repair(&f.geometry) {
                tracing::trace!(raw_id = %f.id, code, "geometry needs repair");
                out.repaired += 1;
            }
            match repair(&f.geometry) {
                Ok(geometry) => {
                    seen.insert(code, &f.id);
                    out.features.push(DecodedFeature { raw_id: f.id.clone(), code, geometry });
                }
                Err(e) => {
                    tracing::warn!(raw_id = %f.id, code, error = %e, "unrepairable geometry excluded from topology");
                    out.unrepairable.push(Unrepairable { raw_id: f.id.clone(), code, reason: e.to_string() });
                }
            }
        }
        out
    }

    /// Neighbor relation, centroids and east/west buckets of a layer.
    pub fn topology(&self, features: &[RawFeature]) -> TopologyReport {
        let prepared = self.prepare(features);
        let neighbors = build_neighbors(&prepared.features, &self.config.adjacency);
        let centroids = centroids(&prepared.features);
        let buckets = bucket_members(&centroids, &self.config.thresholds);
        let isolated = isolated(&neighbors);
        tracing::info!(
            features = features.len(),
            coded = prepared.features.len(),
            skipped = prepared.skipped.len(),
            unrepairable = prepared.unrepairable.len(),
            repaired = prepared.repaired,
            isolated = isolated.len(),
            "topology built"
        );
        TopologyReport {
            neighbors,
            centroids,
            buckets,
            isolated,
            skipped: prepared.skipped,
            unrepairable: prepared.unrepairable,
        }
    }

    /// Dissolve children per parent key, then simplify the aggregates.
    pub fn aggregate(&self, children: &[RawFeature]) -> AggregationOutput {
        let outcome = dissolve(children, &self.config.dissolve_options());
        let (simplified, simplify) = simplify_layer(&outcome.aggregates, self.config.simplify_tolerance);
        tracing::info!(
            children = children.len(),
            groups = outcome.aggregates.len(),
            excluded = outcome.stats.excluded_children,
            empty_groups = outcome.stats.empty_groups.len(),
            vertices_before = simplify.vertices_before,
            vertices_after = simplify.vertices_after,
            "aggregation built"
        );
        AggregationOutput { aggregates: outcome.aggregates, simplified, dissolve: outcome.stats, simplify }
    }

    pub fn resolve_names(&self, features: &[RawFeature], table: &NameTable) -> NameResolution {
        resolve_names(features, table, &self.decoder, &self.config.ocean_sentinel)
    }

    /// Reference names missing from the layer, plus names the reference lacks.
    pub fn validate(&self, features: &[RawFeature], table: &NameTable, reference: &ReferenceSet) -> CompletenessReport {
        let names = self.resolve_names(features, table);
        let report = validate(names.discovered.iter().map(String::as_str), reference);
        tracing::info!(
            discovered = names.discovered.len(),
            unnamed = names.unnamed.len(),
            missing = report.missing.len(),
            unexpected = report.unexpected.len(),
            "completeness checked"
        );
        report
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine { config: EngineConfig::default(), decoder: Decoder::default() }
    }
}
