//! Shape reconciliation: tile + crop.
//!
//! Recorded calibration samples were captured at whatever shapes the capture
//! pipeline produced, but the engine demands an exact target shape per input.
//! The policy is periodic repetition (tile) along every axis until the target
//! is covered, then truncation (crop) of each oversized axis to its leading
//! elements. Repetition keeps the sample's value distribution intact, which
//! is the quantity calibration estimates ranges from.

use ndarray::{concatenate, ArrayD, ArrayViewD, Axis, Slice};
use thiserror::Error;

/// Reconciliation failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    #[error("Sample rank {sample} does not match target rank {target}")]
    RankMismatch { sample: usize, target: usize },

    #[error("Sample axis {0} has zero length")]
    EmptyAxis(usize),

    #[error("Target axis {0} has zero length")]
    EmptyTargetAxis(usize),
}

/// Tile `sample` along every axis until it covers `target`, then crop each
/// oversized axis down to the leading `target` elements.
///
/// The result has exactly the target shape, and every element equals the
/// sample element at the same index taken modulo the sample shape. Rank
/// disagreement between sample and target is rejected rather than mis-indexed.
pub fn tile_to(sample: &ArrayD<f32>, target: &[usize]) -> Result<ArrayD<f32>, ReconcileError> {
    if sample.ndim() != target.len() {
        return Err(ReconcileError::RankMismatch {
            sample: sample.ndim(),
            target: target.len(),
        });
    }
    for (axis, &len) in sample.shape().iter().enumerate() {
        if len == 0 {
            return Err(ReconcileError::EmptyAxis(axis));
        }
    }
    for (axis, &len) in target.iter().enumerate() {
        if len == 0 {
            return Err(ReconcileError::EmptyTargetAxis(axis));
        }
    }

    let mut out = sample.clone();
    for (axis, &want) in target.iter().enumerate() {
        let have = out.shape()[axis];
        let reps = want.div_ceil(have);
        if reps > 1 {
            let views: Vec<ArrayViewD<'_, f32>> = (0..reps).map(|_| out.view()).collect();
            out = concatenate(Axis(axis), &views).expect("repeated views share a shape");
        }
        if out.shape()[axis] != want {
            out = out.slice_axis(Axis(axis), Slice::from(0..want)).to_owned();
        }
    }
    Ok(out)
}
