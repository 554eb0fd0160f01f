use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::algorithms::adjacency::AdjacencyOptions;
use crate::algorithms::centroid::Thresholds;
use crate::algorithms::decode::{Decoder, EscapeTable, OverrideTable};
use crate::algorithms::dissolve::{DissolveOptions, DEFAULT_EXCLUDED_PARENT};
use crate::algorithms::names::DEFAULT_OCEAN_SENTINEL;
use crate::error::ConfigError;
use crate::geometry::tolerance::DEFAULT_SIMPLIFY_TOLERANCE;

/// Engine configuration. Every field has a default, so `{}` is a valid document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub thresholds: Thresholds,
    pub simplify_tolerance: f64,
    pub ocean_sentinel: String,
    pub excluded_parent_keys: Vec<String>,
    /// Escape token -> digit. `None` selects the `_x3N_` table.
    pub escape_tokens: Option<BTreeMap<String, char>>,
    /// Decoded (or raw) identifier -> replacement identifier.
    pub overrides: BTreeMap<String, String>,
    pub adjacency: AdjacencyOptions,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            thresholds: Thresholds::default(),
            simplify_tolerance: DEFAULT_SIMPLIFY_TOLERANCE,
            ocean_sentinel: DEFAULT_OCEAN_SENTINEL.to_string(),
            excluded_parent_keys: vec![DEFAULT_EXCLUDED_PARENT.to_string()],
            escape_tokens: None,
            overrides: BTreeMap::new(),
            adjacency: AdjacencyOptions::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: EngineConfig = serde_json::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validated()
    }

    pub fn validated(self) -> Result<Self, ConfigError> {
        self.thresholds.validated()?;
        if !self.simplify_tolerance.is_finite() || self.simplify_tolerance < 0.0 {
            return Err(ConfigError::InvalidTolerance(self.simplify_tolerance));
        }
        self.escape_table()?;
        Ok(self)
    }

    pub fn escape_table(&self) -> Result<EscapeTable, ConfigError> {
        match &self.escape_tokens {
            Some(tokens) => EscapeTable::new(tokens.iter().map(|(t, d)| (t.clone(), *d))),
            None => Ok(EscapeTable::default()),
        }
    }

    pub fn decoder(&self) -> Result<Decoder, ConfigError> {
        Ok(Decoder::new(self.escape_table()?, OverrideTable::new(self.overrides.clone())))
    }

    pub fn dissolve_options(&self) -> DissolveOptions {
        DissolveOptions { excluded_parent_keys: self.excluded_parent_keys.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::adjacency::{AdjacencyPredicate, CandidateStrategy};

    #[test]
    fn empty_document_is_default() {
        assert_eq!(EngineConfig::from_json_str("{}").unwrap(), EngineConfig::default());
    }

    #[test]
    fn partial_document_overrides_fields() {
        let cfg = EngineConfig::from_json_str(
            r#"{"thresholds": {"low": -100.0}, "simplify_tolerance": 0.5,
                "adjacency": {"predicate": "touches", "strategy": "exhaustive"},
                "overrides": {"123_1_": "124"}}"#,
        )
        .unwrap();
        assert_eq!(cfg.thresholds.low, -100.0);
        assert_eq!(cfg.thresholds.high, 30.0);
        assert_eq!(cfg.simplify_tolerance, 0.5);
        assert_eq!(cfg.adjacency.predicate, AdjacencyPredicate::Touches);
        assert_eq!(cfg.adjacency.strategy, CandidateStrategy::Exhaustive);
        assert_eq!(cfg.decoder().unwrap().decode("_x31_23_1_").as_numeric(), Some(124));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            EngineConfig::from_json_str(r#"{"simplify_tolerance": -1.0}"#),
            Err(ConfigError::InvalidTolerance(_))
        ));
        assert!(matches!(
            EngineConfig::from_json_str(r#"{"thresholds": {"low": 10.0, "high": -10.0}}"#),
            Err(ConfigError::InvertedThresholds { .. })
        ));
        assert!(matches!(
            EngineConfig::from_json_str(r##"{"escape_tokens": {"#": "1", "#1": "2"}}"##),
            Err(ConfigError::AmbiguousEscapeTokens { .. })
        ));
        assert!(matches!(EngineConfig::from_json_str("[1]"), Err(ConfigError::Parse(_))));
    }
}
