//! SignalBatch: container for a batch of fixed-length ECG recordings

use crate::error::{EcgError, EcgResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A batch of 1-D signals stored row-major.
///
/// Every row is one independent recording and all rows share the same
/// sample count. Row order is significant and is preserved by every
/// pipeline stage: index `i` in equals index `i` out.
#[derive(Debug, Clone)]
pub struct SignalBatch {
    /// Unique identifier for this batch, carried through log output
    pub id: Uuid,
    /// Row-major signal data
    data: Vec<f64>,
    /// Samples per row
    row_len: usize,
}

impl SignalBatch {
    /// Build a batch from individual rows.
    ///
    /// Fails with `InvalidInput` if the rows do not all share the same
    /// length or if the batch would be empty.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> EcgResult<Self> {
        let first_len = match rows.first() {
            Some(row) => row.len(),
            None => {
                return Err(EcgError::InvalidInput {
                    reason: "batch must contain at least one signal".to_string(),
                })
            }
        };

        if first_len == 0 {
            return Err(EcgError::InvalidInput {
                reason: "signals must contain at least one sample".to_string(),
            });
        }

        let mut data = Vec::with_capacity(rows.len() * first_len);
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != first_len {
                return Err(EcgError::InvalidInput {
                    reason: format!(
                        "row {} has {} samples, expected {}",
                        idx,
                        row.len(),
                        first_len
                    ),
                });
            }
            data.extend_from_slice(row);
        }

        Ok(SignalBatch {
            id: Uuid::new_v4(),
            data,
            row_len: first_len,
        })
    }

    /// Build a batch from an already-flat row-major buffer.
    pub fn from_flat(data: Vec<f64>, row_len: usize) -> EcgResult<Self> {
        if row_len == 0 || data.is_empty() || data.len() % row_len != 0 {
            return Err(EcgError::InvalidInput {
                reason: format!(
                    "flat buffer of {} samples does not divide into rows of {}",
                    data.len(),
                    row_len
                ),
            });
        }

        Ok(SignalBatch {
            id: Uuid::new_v4(),
            data,
            row_len,
        })
    }

    /// Number of signals in the batch
    pub fn n_rows(&self) -> usize {
        self.data.len() / self.row_len
    }

    /// Samples per signal
    pub fn row_len(&self) -> usize {
        self.row_len
    }

    /// Get one signal by row index
    pub fn row(&self, index: usize) -> EcgResult<&[f64]> {
        if index >= self.n_rows() {
            return Err(EcgError::InvalidInput {
                reason: format!("row index {} out of bounds (0-{})", index, self.n_rows() - 1),
            });
        }
        let start = index * self.row_len;
        Ok(&self.data[start..start + self.row_len])
    }

    /// Iterate over all signals in row order
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.row_len)
    }

    /// Apply a per-row transformation, producing a new batch with the same
    /// row count and row order.
    ///
    /// The id of the source batch is kept so the derived batch can be
    /// correlated with it in log output. Fails with `InvalidInput` if the
    /// transform changes the sample count of any row.
    pub fn map_rows<F>(&self, mut transform: F) -> EcgResult<SignalBatch>
    where
        F: FnMut(&[f64]) -> EcgResult<Vec<f64>>,
    {
        let mut data = Vec::with_capacity(self.data.len());
        for (idx, row) in self.rows().enumerate() {
            let out = transform(row)?;
            if out.len() != self.row_len {
                return Err(EcgError::InvalidInput {
                    reason: format!(
                        "transform changed row {} length from {} to {}",
                        idx,
                        self.row_len,
                        out.len()
                    ),
                });
            }
            data.extend_from_slice(&out);
        }

        Ok(SignalBatch {
            id: self.id,
            data,
            row_len: self.row_len,
        })
    }

    /// Calculate basic statistics for one row
    pub fn row_stats(&self, index: usize) -> EcgResult<RowStats> {
        Ok(RowStats::calculate(self.row(index)?))
    }
}

/// Basic statistics for a single signal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowStats {
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub peak_to_peak: f64,
}

impl RowStats {
    pub fn calculate(data: &[f64]) -> Self {
        if data.is_empty() {
            return Self {
                mean: 0.0,
                std_dev: 0.0,
                min: 0.0,
                max: 0.0,
                peak_to_peak: 0.0,
            };
        }

        let n = data.len() as f64;
        let mean = data.iter().sum::<f64>() / n;
        let variance = data.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;

        let min = data.iter().fold(f64::INFINITY, |a, &b| a.min(b));
        let max = data.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));

        Self {
            mean,
            std_dev: variance.sqrt(),
            min,
            max,
            peak_to_peak: max - min,
        }
    }
}
