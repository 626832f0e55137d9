//! Batch signal conditioning: DC removal, bandpass filtering, normalization
//!
//! All three steps operate independently per row, so a batch of `n` signals
//! goes in and a batch of `n` signals of the same length comes out. The
//! whole stage is a pure function of its inputs; no state survives a call.

use crate::filters::{BandpassConfig, ZeroPhaseBandpass};
use ecg_core::{EcgResult, SignalBatch};
use tracing::{debug, warn};

/// Subtract a signal's own arithmetic mean from every sample.
pub fn remove_dc(row: &[f64]) -> Vec<f64> {
    let mean = row.iter().sum::<f64>() / row.len() as f64;
    row.iter().map(|x| x - mean).collect()
}

/// Linearly rescale a signal to the closed range [0, 1] using its own
/// min and max.
///
/// A constant signal has no range to rescale; the reference behavior
/// upstream was a silent division by zero. Here the defined fallback is an
/// all-zero output, and the condition is logged.
pub fn normalize_unit(row: &[f64]) -> Vec<f64> {
    let min = row.iter().fold(f64::INFINITY, |a, &b| a.min(b));
    let max = row.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
    let range = max - min;

    if range == 0.0 {
        warn!("constant signal in normalization, falling back to zeros");
        return vec![0.0; row.len()];
    }

    row.iter().map(|x| (x - min) / range).collect()
}

/// Run the full conditioning chain over a batch.
///
/// Per row: DC removal, zero-phase Butterworth bandpass, [0, 1]
/// normalization. Filter coefficients are designed once from
/// `(config, fs)` and shared by every row.
///
/// Fails with `InvalidInput` if `fs` is not positive, if the cutoffs are
/// invalid against the Nyquist frequency, or if rows are too short for the
/// forward-backward filter pass.
pub fn preprocess_batch(
    batch: &SignalBatch,
    fs: f64,
    config: &BandpassConfig,
) -> EcgResult<SignalBatch> {
    let filter = ZeroPhaseBandpass::design(config, fs)?;

    debug!(
        batch = %batch.id,
        rows = batch.n_rows(),
        samples = batch.row_len(),
        fs,
        low = config.lowcut_hz,
        high = config.highcut_hz,
        "preprocessing batch"
    );

    batch.map_rows(|row| {
        let centered = remove_dc(row);
        let filtered = filter.apply(&centered)?;
        Ok(normalize_unit(&filtered))
    })
}
