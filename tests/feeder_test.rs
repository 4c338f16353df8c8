//! Integration test: a miniature calibration engine driving the feeder
//! against a file-backed dataset store.

use std::collections::HashMap;

use calibrar::dataset::{save_samples, InMemoryStore, SampleStore};
use calibrar::device::{DeviceBuffer, HostArena};
use calibrar::{
    BatchSource, CalibrationAlgorithm, CalibrationFeeder, FeederOptions, ShapeSpec,
};
use ndarray::{ArrayD, IxDyn};

/// Stand-in for the engine's range estimation: running min/max per input.
#[derive(Default)]
struct RangeCollector {
    ranges: HashMap<String, (f32, f32)>,
}

impl RangeCollector {
    fn observe(&mut self, input: &str, data: &[f32]) {
        let lo = data.iter().copied().fold(f32::INFINITY, f32::min);
        let hi = data.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let entry = self.ranges.entry(input.to_string()).or_insert((lo, hi));
        entry.0 = entry.0.min(lo);
        entry.1 = entry.1.max(hi);
    }
}

fn sample(shape: &[usize], offset: f32) -> ArrayD<f32> {
    let count: usize = shape.iter().product();
    ArrayD::from_shape_vec(
        IxDyn(shape),
        (0..count).map(|i| offset + i as f32).collect(),
    )
    .expect("shape matches value count")
}

fn record_dataset() -> InMemoryStore {
    let mut store = InMemoryStore::new();
    for i in 0..3 {
        store.record("end2end", "input", sample(&[1, 2, 4, 4], i as f32 * 100.0));
        store.record("end2end", "mask", sample(&[1, 8], i as f32 * -10.0));
    }
    store
}

#[test]
fn test_engine_loop_over_file_backed_store() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("calib.safetensors");
    save_samples(&record_dataset(), &path).expect("dataset persists");

    // Targets are whole multiples of the recorded shapes, so reconciliation
    // only tiles and the value range of each batch matches its sample.
    let shapes = ShapeSpec::new()
        .with_shape("input", &[2, 2, 4, 4])
        .with_shape("mask", &[2, 8]);
    let mut feeder =
        CalibrationFeeder::open(&path, shapes, HostArena::new(), FeederOptions::default())
            .expect("dataset reopens");

    assert_eq!(feeder.dataset_length(), 3);
    assert_eq!(feeder.batch_size(), 1);
    assert_eq!(feeder.algorithm(), CalibrationAlgorithm::Entropy);
    assert!(feeder.read_calibration_cache().is_none());

    let names = ["input", "mask"];
    let mut collector = RangeCollector::default();
    let mut batches = 0;
    let mut addresses_seen: Option<Vec<u64>> = None;

    while let Some(addresses) = feeder.next_batch(&names).expect("batch feeds") {
        assert_eq!(addresses.len(), names.len());
        match &addresses_seen {
            // Buffers are cached per input: addresses repeat across calls.
            Some(previous) => assert_eq!(previous, &addresses),
            None => addresses_seen = Some(addresses),
        }
        for name in names {
            let buffer = feeder.buffer(name).expect("buffer cached after feeding");
            let mut host = vec![0.0f32; buffer.len()];
            buffer.read(&mut host).expect("host read");
            collector.observe(name, &host);
        }
        batches += 1;
    }
    assert_eq!(batches, 3);

    // Tiling repeats sample values, so the collected ranges equal the raw
    // dataset's ranges.
    let raw = record_dataset();
    for name in names {
        let mut lo = f32::INFINITY;
        let mut hi = f32::NEG_INFINITY;
        for index in 0..3 {
            let s = raw.sample("end2end", name, index).expect("raw sample");
            lo = s.iter().copied().fold(lo, f32::min);
            hi = s.iter().copied().fold(hi, f32::max);
        }
        assert_eq!(collector.ranges[name], (lo, hi));
    }

    // The engine hands back its computed cache; the default policy discards.
    feeder.write_calibration_cache(b"computed-scales");
    assert!(feeder.read_calibration_cache().is_none());
}

#[test]
fn test_engine_holds_only_the_protocol_surface() {
    let mut store = InMemoryStore::new();
    store.record("end2end", "input", sample(&[1, 4], 0.0));
    store.record("end2end", "input", sample(&[1, 4], 10.0));

    let shapes = ShapeSpec::new().with_shape("input", &[1, 4]);
    let feeder =
        CalibrationFeeder::new(store, shapes, HostArena::new(), FeederOptions::default())
            .expect("construction succeeds");

    // The engine sees nothing but the trait.
    let mut source: Box<dyn BatchSource> = Box::new(feeder);
    assert_eq!(source.batch_size(), 1);

    let mut batches = 0;
    while source.next_batch(&["input"]).expect("batch feeds").is_some() {
        batches += 1;
    }
    assert_eq!(batches, 2);
    assert!(source.next_batch(&["input"]).expect("exhaustion repeats").is_none());
}
