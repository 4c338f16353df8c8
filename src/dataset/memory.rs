//! Map-backed sample store.

use std::collections::BTreeMap;

use ndarray::ArrayD;

use super::store::{Result, SampleStore, StoreError};

/// In-memory calibration store.
///
/// Doubles as the recording side of the dataset layout: samples are appended
/// with [`record`](Self::record) and can be persisted with
/// [`save_samples`](super::save_samples). Groups iterate in name order, so
/// the "first input group" the feeder derives its metadata from is stable.
#[derive(Clone, Debug, Default)]
pub struct InMemoryStore {
    groups: BTreeMap<String, BTreeMap<String, Vec<ArrayD<f32>>>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one sample to `calib_data/<model_type>/<input>`.
    ///
    /// Returns the index the sample was recorded at.
    pub fn record(&mut self, model_type: &str, input: &str, sample: ArrayD<f32>) -> usize {
        let samples = self
            .groups
            .entry(model_type.to_string())
            .or_default()
            .entry(input.to_string())
            .or_default();
        samples.push(sample);
        samples.len() - 1
    }

    fn group(&self, model_type: &str) -> Result<&BTreeMap<String, Vec<ArrayD<f32>>>> {
        self.groups
            .get(model_type)
            .ok_or_else(|| StoreError::UnknownGroup(model_type.to_string()))
    }
}

impl SampleStore for InMemoryStore {
    fn model_types(&self) -> Vec<String> {
        self.groups.keys().cloned().collect()
    }

    fn input_names(&self, model_type: &str) -> Result<Vec<String>> {
        Ok(self.group(model_type)?.keys().cloned().collect())
    }

    fn sample_count(&self, model_type: &str, input: &str) -> Result<usize> {
        let samples = self
            .group(model_type)?
            .get(input)
            .ok_or_else(|| StoreError::UnknownGroup(input.to_string()))?;
        Ok(samples.len())
    }

    fn sample(&self, model_type: &str, input: &str, index: usize) -> Result<ArrayD<f32>> {
        let samples = self
            .group(model_type)?
            .get(input)
            .ok_or_else(|| StoreError::UnknownGroup(input.to_string()))?;
        samples
            .get(index)
            .cloned()
            .ok_or_else(|| StoreError::MissingSample {
                input: input.to_string(),
                index,
            })
    }
}
