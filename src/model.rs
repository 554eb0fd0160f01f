use std::cmp::Ordering;
use std::fmt;

use geo::MultiPolygon;
use serde::{Deserialize, Serialize};

/// A feature as handed over by the layer loader: raw identifier, optional
/// display name, optional parent key and its geometry (possibly invalid).
#[derive(Clone, Debug, PartialEq)]
pub struct RawFeature {
    pub id: String,
    pub name: Option<String>,
    pub parent: Option<String>,
    pub geometry: MultiPolygon<f64>,
}

impl RawFeature {
    pub fn new(id: impl Into<String>, geometry: MultiPolygon<f64>) -> Self {
        RawFeature { id: id.into(), name: None, parent: None, geometry }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }
}

/// Canonical decoded identifier.
///
/// Numeric codes order by value and always sort before text codes; text codes
/// order lexicographically.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Code {
    Numeric(u64),
    Text(String),
}

impl Code {
    pub fn as_numeric(&self) -> Option<u64> {
        match self {
            Code::Numeric(n) => Some(*n),
            Code::Text(_) => None,
        }
    }

    pub fn is_numeric(&self) -> bool { matches!(self, Code::Numeric(_)) }
}

impl Ord for Code {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Code::Numeric(a), Code::Numeric(b)) => a.cmp(b),
            (Code::Numeric(_), Code::Text(_)) => Ordering::Less,
            (Code::Text(_), Code::Numeric(_)) => Ordering::Greater,
            (Code::Text(a), Code::Text(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for Code {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Code::Numeric(n) => write!(f, "{n}"),
            Code::Text(s) => f.write_str(s),
        }
    }
}

/// Repaired, numeric-keyed feature consumed by adjacency and centroid passes.
#[derive(Clone, Debug)]
pub struct DecodedFeature {
    pub raw_id: String,
    pub code: u64,
    pub geometry: MultiPolygon<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Centroid {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionBucket {
    Western,
    Middle,
    Eastern,
}

impl RegionBucket {
    pub const ALL: [RegionBucket; 3] = [RegionBucket::Western, RegionBucket::Middle, RegionBucket::Eastern];

    pub fn label(self) -> &'static str {
        match self {
            RegionBucket::Western => "western",
            RegionBucket::Middle => "middle",
            RegionBucket::Eastern => "eastern",
        }
    }
}

/// One dissolved group: parent key, number of children and the unioned geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct AggregateFeature {
    pub parent: String,
    pub child_count: usize,
    pub geometry: MultiPolygon<f64>,
}

/// Why a feature was left out of the numeric-keyed outputs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// Decoded code is not purely numeric.
    DecodeAmbiguity { code: String },
    /// Another feature already decoded to the same code.
    DuplicateCode { code: u64, kept: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skipped {
    pub raw_id: String,
    #[serde(flatten)]
    pub reason: SkipReason,
}
