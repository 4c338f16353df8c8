//! Feeder configuration types.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Model-type group read when none is configured.
pub const DEFAULT_MODEL_TYPE: &str = "end2end";

/// Algorithm identifier reported to the calibration engine.
///
/// The feeder never runs the algorithm itself; the engine queries this once
/// and picks its own range-estimation strategy from it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationAlgorithm {
    /// Entropy (KL-divergence) range search.
    #[default]
    Entropy,
    /// Plain observed min/max ranges.
    MinMax,
    /// Legacy percentile search kept for older engines.
    Legacy,
}

impl fmt::Display for CalibrationAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// What to do with the engine's calibration cache blob.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePolicy {
    /// Always recalibrate: report no cached data, discard writes.
    #[default]
    Discard,
    /// Persist the blob to a file and report it back on the next run.
    File(PathBuf),
}

/// Target shape table: input name to the "optimal" shape the engine demands.
///
/// Every input later requested through the batch protocol must be present
/// here; a missing entry is a fatal configuration error at call time.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeSpec {
    shapes: BTreeMap<String, Vec<usize>>,
}

impl ShapeSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with_shape(mut self, name: impl Into<String>, shape: &[usize]) -> Self {
        self.insert(name, shape.to_vec());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, shape: Vec<usize>) {
        self.shapes.insert(name.into(), shape);
    }

    pub fn get(&self, name: &str) -> Option<&[usize]> {
        self.shapes.get(name).map(Vec::as_slice)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.shapes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

/// Construction options for [`CalibrationFeeder`](super::CalibrationFeeder).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FeederOptions {
    /// Model-type group to read under `calib_data`.
    pub model_type: String,
    /// Algorithm identifier reported to the engine.
    pub algorithm: CalibrationAlgorithm,
    /// Calibration-cache passthrough policy.
    pub cache: CachePolicy,
    /// Opaque extension options: stored and exposed, never interpreted.
    pub extra: HashMap<String, serde_json::Value>,
}

impl Default for FeederOptions {
    fn default() -> Self {
        Self {
            model_type: DEFAULT_MODEL_TYPE.to_string(),
            algorithm: CalibrationAlgorithm::default(),
            cache: CachePolicy::default(),
            extra: HashMap::new(),
        }
    }
}

impl FeederOptions {
    /// Options for a specific model-type group, defaults otherwise.
    pub fn for_model_type(model_type: impl Into<String>) -> Self {
        Self {
            model_type: model_type.into(),
            ..Self::default()
        }
    }
}
