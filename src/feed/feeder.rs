//! The calibration feeder and the engine-facing batch protocol.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::Path;

use crate::dataset::{SafetensorsStore, SampleStore};
use crate::device::{DeviceArena, DeviceBuffer};
use crate::error::{Error, Result};
use crate::shape::tile_to;

use super::types::{CachePolicy, CalibrationAlgorithm, FeederOptions, ShapeSpec};

/// Pull-based batch protocol consumed by a calibration engine.
///
/// The engine is the sole caller: it drives [`next_batch`](Self::next_batch)
/// sequentially on one thread until it returns `Ok(None)`, and consumes each
/// call's addresses before issuing the next call. Addresses point into
/// buffers that are overwritten by the following batch, so they must never be
/// retained across calls.
pub trait BatchSource {
    /// Feed the next batch for the requested inputs.
    ///
    /// Returns the device addresses in `names` order, or `Ok(None)` once the
    /// dataset is exhausted. Exhaustion is terminal and idempotent: every
    /// later call returns `Ok(None)` without touching any buffer.
    fn next_batch(&mut self, names: &[&str]) -> Result<Option<Vec<u64>>>;

    /// Leading batch dimension shared by every fed batch. Fixed at
    /// construction.
    fn batch_size(&self) -> usize;

    /// Algorithm identifier. Fixed at construction.
    fn algorithm(&self) -> CalibrationAlgorithm;

    /// Previously persisted calibration cache, if the policy keeps one.
    /// `None` tells the engine to run a fresh calibration pass.
    fn read_calibration_cache(&mut self) -> Option<Vec<u8>>;

    /// Hand the engine's freshly computed cache blob to the policy. Must
    /// accept any blob without failing.
    fn write_calibration_cache(&mut self, blob: &[u8]);
}

/// Feeds fixed-shape calibration batches from a [`SampleStore`] into device
/// buffers allocated from a [`DeviceArena`].
///
/// Each recorded sample is reconciled to its input's target shape by tiling
/// and cropping, written into a per-input buffer that is allocated on first
/// use and overwritten in place afterwards, and handed to the engine as a
/// raw device address. One cursor is shared by all inputs: every successful
/// [`next_batch`](BatchSource::next_batch) call advances it by exactly one.
///
/// Not thread-safe by design: the batch protocol assumes a single sequential
/// caller, so the feeder carries no synchronization.
#[derive(Debug)]
pub struct CalibrationFeeder<S: SampleStore, A: DeviceArena> {
    store: S,
    arena: A,
    shapes: ShapeSpec,
    options: FeederOptions,
    buffers: HashMap<String, A::Buffer>,
    dataset_length: usize,
    batch_size: usize,
    count: usize,
}

impl<S: SampleStore, A: DeviceArena> CalibrationFeeder<S, A> {
    /// Validate the store against the configuration and build a feeder.
    ///
    /// The store is consumed; it is released when the feeder is dropped, on
    /// every exit path including validation failure. Dataset length and batch
    /// size are derived from the first input group and cross-checked against
    /// every other group: a group with a different sample count or leading
    /// sample dimension fails construction. No device memory is allocated
    /// here; buffers appear lazily on first use per input.
    pub fn new(store: S, shapes: ShapeSpec, arena: A, options: FeederOptions) -> Result<Self> {
        for name in shapes.names() {
            let shape = shapes.get(name).unwrap_or(&[]);
            if shape.is_empty() || shape.contains(&0) {
                return Err(Error::InvalidShape {
                    input: name.to_string(),
                    detail: format!("{shape:?} must be non-empty with positive dimensions"),
                });
            }
        }

        let model_type = options.model_type.clone();
        if !store.model_types().iter().any(|t| t == &model_type) {
            return Err(Error::MissingGroup(model_type));
        }

        let inputs = store.input_names(&model_type)?;
        let first = inputs
            .first()
            .cloned()
            .ok_or_else(|| Error::EmptyGroup(model_type.clone()))?;

        let dataset_length = store.sample_count(&model_type, &first)?;
        if dataset_length == 0 {
            return Err(Error::EmptyGroup(first));
        }
        let batch_size = leading_dim(&store, &model_type, &first)?;

        for input in inputs.iter().skip(1) {
            let count = store.sample_count(&model_type, input)?;
            if count != dataset_length {
                return Err(Error::InconsistentGroup {
                    input: input.clone(),
                    reference: first.clone(),
                    detail: format!("{count} samples, expected {dataset_length}"),
                });
            }
            let leading = leading_dim(&store, &model_type, input)?;
            if leading != batch_size {
                return Err(Error::InconsistentGroup {
                    input: input.clone(),
                    reference: first.clone(),
                    detail: format!("leading dimension {leading}, expected {batch_size}"),
                });
            }
        }

        Ok(Self {
            store,
            arena,
            shapes,
            options,
            buffers: HashMap::new(),
            dataset_length,
            batch_size,
            count: 0,
        })
    }

    /// Number of batches the dataset holds.
    pub fn dataset_length(&self) -> usize {
        self.dataset_length
    }

    /// Batches fed so far.
    pub fn cursor(&self) -> usize {
        self.count
    }

    /// Model-type group this feeder reads.
    pub fn model_type(&self) -> &str {
        &self.options.model_type
    }

    /// Opaque extension options handed in at construction.
    pub fn extra(&self) -> &HashMap<String, serde_json::Value> {
        &self.options.extra
    }

    /// Read-only view of the cached device buffer for one input, if it has
    /// been fed at least once. Diagnostics and tests only; the engine works
    /// from the addresses returned by the batch protocol.
    pub fn buffer(&self, name: &str) -> Option<&A::Buffer> {
        self.buffers.get(name)
    }
}

impl<A: DeviceArena> CalibrationFeeder<SafetensorsStore, A> {
    /// Open a recorded dataset file and build a feeder over it.
    pub fn open(
        path: impl AsRef<Path>,
        shapes: ShapeSpec,
        arena: A,
        options: FeederOptions,
    ) -> Result<Self> {
        let store = SafetensorsStore::open(path)?;
        Self::new(store, shapes, arena, options)
    }
}

impl<S: SampleStore, A: DeviceArena> BatchSource for CalibrationFeeder<S, A> {
    fn next_batch(&mut self, names: &[&str]) -> Result<Option<Vec<u64>>> {
        if self.count >= self.dataset_length {
            return Ok(None);
        }

        // Resolve every target shape up front so an unknown name fails the
        // call before any store or device access.
        let mut targets = Vec::with_capacity(names.len());
        for &name in names {
            let target = self
                .shapes
                .get(name)
                .ok_or_else(|| Error::UnknownInput(name.to_string()))?;
            targets.push((name, target));
        }

        let index = self.count;
        let mut addresses = Vec::with_capacity(targets.len());
        for (name, target) in targets {
            let sample = self.store.sample(&self.options.model_type, name, index)?;
            let batch = tile_to(&sample, target).map_err(|source| Error::Reconcile {
                input: name.to_string(),
                source,
            })?;
            let host: Vec<f32> = batch.iter().copied().collect();

            let buffer = match self.buffers.entry(name.to_string()) {
                Entry::Occupied(slot) => slot.into_mut(),
                Entry::Vacant(slot) => slot.insert(self.arena.allocate(host.len())?),
            };
            buffer.write(&host)?;
            addresses.push(buffer.address());
        }

        self.count += 1;
        Ok(Some(addresses))
    }

    fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn algorithm(&self) -> CalibrationAlgorithm {
        self.options.algorithm
    }

    fn read_calibration_cache(&mut self) -> Option<Vec<u8>> {
        match &self.options.cache {
            CachePolicy::Discard => None,
            CachePolicy::File(path) => std::fs::read(path).ok(),
        }
    }

    fn write_calibration_cache(&mut self, blob: &[u8]) {
        if let CachePolicy::File(path) = &self.options.cache {
            // Best effort: the protocol forbids failing on a cache write.
            let _ = std::fs::write(path, blob);
        }
    }
}

fn leading_dim<S: SampleStore>(store: &S, model_type: &str, input: &str) -> Result<usize> {
    let sample = store.sample(model_type, input, 0)?;
    sample
        .shape()
        .first()
        .copied()
        .ok_or_else(|| Error::InvalidSample {
            input: input.to_string(),
            detail: "rank-0 sample has no leading batch dimension".to_string(),
        })
}
