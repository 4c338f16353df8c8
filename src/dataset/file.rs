//! File-backed sample store over the safetensors container format.
//!
//! The hierarchy is encoded in tensor names: one tensor per sample, named
//! `calib_data/<model_type>/<input_name>/<index>`. The whole file is parsed
//! eagerly at open; the store is read-only afterwards and the file handle is
//! released before `open` returns.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ndarray::{ArrayD, IxDyn};
use safetensors::tensor::{Dtype, TensorView};
use safetensors::SafeTensors;

use super::store::{Result, SampleStore, StoreError, CALIB_DATA_GROUP};
use super::InMemoryStore;

type Groups = BTreeMap<String, BTreeMap<String, Vec<ArrayD<f32>>>>;

/// Read-only calibration store backed by a `.safetensors` file.
#[derive(Clone, Debug)]
pub struct SafetensorsStore {
    groups: Groups,
    path: PathBuf,
}

impl SafetensorsStore {
    /// Open and parse a recorded calibration dataset.
    ///
    /// Fails if the file holds no `calib_data/...` tensors, if any tensor
    /// name does not follow the layout, if a payload is not f32, or if the
    /// sample indices of a group are not contiguous from zero.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let archive = SafeTensors::deserialize(&data)
            .map_err(|e| StoreError::Malformed(format!("{e}")))?;

        let mut indexed: BTreeMap<(String, String), BTreeMap<usize, ArrayD<f32>>> =
            BTreeMap::new();
        for (name, view) in archive.tensors() {
            let (model_type, input, index) = parse_key(&name)?;
            let sample = decode_f32(&name, &view)?;
            indexed
                .entry((model_type, input))
                .or_default()
                .insert(index, sample);
        }
        if indexed.is_empty() {
            return Err(StoreError::MissingRoot);
        }

        let mut groups: Groups = BTreeMap::new();
        for ((model_type, input), samples) in indexed {
            let count = samples.len();
            let ordered: Vec<ArrayD<f32>> = (0..count)
                .map(|index| {
                    samples.get(&index).cloned().ok_or_else(|| {
                        StoreError::Malformed(format!(
                            "group {input:?} has {count} samples but index {index} is missing"
                        ))
                    })
                })
                .collect::<Result<_>>()?;
            groups
                .entry(model_type)
                .or_default()
                .insert(input, ordered);
        }

        Ok(Self {
            groups,
            path: path.to_path_buf(),
        })
    }

    /// Path this store was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn group(&self, model_type: &str) -> Result<&BTreeMap<String, Vec<ArrayD<f32>>>> {
        self.groups
            .get(model_type)
            .ok_or_else(|| StoreError::UnknownGroup(model_type.to_string()))
    }
}

impl SampleStore for SafetensorsStore {
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

/// Persist every sample of `store` to a `.safetensors` file in the
/// `calib_data/<model_type>/<input>/<index>` layout read by
/// [`SafetensorsStore::open`].
pub fn save_samples(store: &InMemoryStore, path: impl AsRef<Path>) -> Result<()> {
    let mut payloads: Vec<(String, Vec<usize>, Vec<u8>)> = Vec::new();
    for model_type in store.model_types() {
        for input in store.input_names(&model_type)? {
            for index in 0..store.sample_count(&model_type, &input)? {
                let sample = store.sample(&model_type, &input, index)?;
                let key = format!("{CALIB_DATA_GROUP}/{model_type}/{input}/{index}");
                let shape = sample.shape().to_vec();
                let values: Vec<f32> = sample.iter().copied().collect();
                payloads.push((key, shape, bytemuck::cast_slice(&values).to_vec()));
            }
        }
    }

    let views: Vec<(String, TensorView<'_>)> = payloads
        .iter()
        .map(|(key, shape, bytes)| {
            let view = TensorView::new(Dtype::F32, shape.clone(), bytes)
                .map_err(|e| StoreError::Malformed(format!("{e}")))?;
            Ok((key.clone(), view))
        })
        .collect::<Result<_>>()?;
    let data = safetensors::serialize(views, &None)
        .map_err(|e| StoreError::Malformed(format!("{e}")))?;
    std::fs::write(path, data)?;
    Ok(())
}

fn parse_key(name: &str) -> Result<(String, String, usize)> {
    let parts: Vec<&str> = name.split('/').collect();
    if parts.len() != 4 {
        return Err(StoreError::Malformed(format!(
            "tensor name {name:?} does not follow {CALIB_DATA_GROUP}/<model_type>/<input>/<index>"
        )));
    }
    let (root, model_type, input, index) = (parts[0], parts[1], parts[2], parts[3]);
    if root != CALIB_DATA_GROUP {
        return Err(StoreError::Malformed(format!(
            "tensor name {name:?} is outside the {CALIB_DATA_GROUP:?} root"
        )));
    }
    let index: usize = index.parse().map_err(|_| {
        StoreError::Malformed(format!("tensor name {name:?} has a non-numeric index"))
    })?;
    Ok((model_type.to_string(), input.to_string(), index))
}

fn decode_f32(name: &str, view: &TensorView<'_>) -> Result<ArrayD<f32>> {
    if view.dtype() != Dtype::F32 {
        return Err(StoreError::Unsupported(format!(
            "tensor {name:?} has dtype {:?}, expected F32",
            view.dtype()
        )));
    }
    let values: Vec<f32> = view
        .data()
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();
    ArrayD::from_shape_vec(IxDyn(view.shape()), values).map_err(|e| {
        StoreError::Malformed(format!("tensor {name:?} payload mismatches its shape: {e}"))
    })
}
