//! k-NN classifier adapter for LBBB detection
//!
//! The model is a pre-fitted nearest-neighbor classifier, serialized as a
//! JSON artifact and loaded once at startup. The adapter performs no
//! training; it validates the feature schema, forwards feature rows to the
//! stored neighbors, and maps raw class codes to binary labels.

use crate::wavelet::{WaveletFeatures, FEATURE_DIM};
use ecg_core::{EcgError, EcgResult};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

/// Binary classification outcome per signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    /// No conduction abnormality detected
    Normal,
    /// Left Bundle Branch Block detected
    Lbbb,
}

impl Label {
    /// Map a raw model class code to a label; any nonzero code is positive.
    pub fn from_code(code: u8) -> Self {
        if code == 0 {
            Label::Normal
        } else {
            Label::Lbbb
        }
    }

    pub fn as_code(&self) -> u8 {
        match self {
            Label::Normal => 0,
            Label::Lbbb => 1,
        }
    }

    pub fn is_abnormal(&self) -> bool {
        matches!(self, Label::Lbbb)
    }
}

/// Serialized form of the pre-trained model artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnnModel {
    /// Number of neighbors consulted per query
    pub k: usize,
    /// Feature dimensionality the model was trained with
    pub feature_dim: usize,
    /// Stored training feature vectors
    pub samples: Vec<Vec<f64>>,
    /// Raw class code per training sample
    pub labels: Vec<u8>,
}

/// Inference-only wrapper around a loaded [`KnnModel`]
#[derive(Debug, Clone)]
pub struct KnnClassifier {
    model: KnnModel,
}

impl KnnClassifier {
    /// Wrap a model, validating its internal consistency.
    pub fn new(model: KnnModel) -> EcgResult<Self> {
        if model.k == 0 {
            return Err(EcgError::ModelError {
                reason: "k must be at least 1".to_string(),
            });
        }
        if model.samples.is_empty() {
            return Err(EcgError::ModelError {
                reason: "model contains no training samples".to_string(),
            });
        }
        if model.samples.len() != model.labels.len() {
            return Err(EcgError::ModelError {
                reason: format!(
                    "{} samples but {} labels",
                    model.samples.len(),
                    model.labels.len()
                ),
            });
        }
        if let Some(bad) = model
            .samples
            .iter()
            .position(|s| s.len() != model.feature_dim)
        {
            return Err(EcgError::ModelError {
                reason: format!(
                    "training sample {} has {} features, expected {}",
                    bad,
                    model.samples[bad].len(),
                    model.feature_dim
                ),
            });
        }
        Ok(Self { model })
    }

    /// Load the model artifact from a JSON file.
    ///
    /// Intended to run once at process start, with the classifier then
    /// injected into the pipeline.
    pub fn from_file<P: AsRef<Path>>(path: P) -> EcgResult<Self> {
        let file = File::open(path.as_ref()).map_err(|e| EcgError::ModelError {
            reason: format!("cannot open '{}': {}", path.as_ref().display(), e),
        })?;
        let model: KnnModel =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| EcgError::ModelError {
                reason: format!("cannot parse model artifact: {}", e),
            })?;
        Self::new(model)
    }

    /// Feature dimensionality the model expects
    pub fn feature_dim(&self) -> usize {
        self.model.feature_dim
    }

    /// Classify one label per feature row, order-preserving.
    ///
    /// Fails with `SchemaMismatch` before touching the model if the feature
    /// width does not match the dimensionality it was trained with.
    pub fn predict(&self, features: &[WaveletFeatures]) -> EcgResult<Vec<Label>> {
        if self.model.feature_dim != FEATURE_DIM {
            return Err(EcgError::SchemaMismatch {
                expected: self.model.feature_dim,
                actual: FEATURE_DIM,
            });
        }

        debug!(rows = features.len(), k = self.model.k, "classifying feature matrix");

        Ok(features
            .iter()
            .map(|row| self.predict_one(&row.as_array()))
            .collect())
    }

    // Majority vote over the k nearest stored samples; ties resolve to
    // Normal.
    fn predict_one(&self, query: &[f64]) -> Label {
        let mut dists: Vec<(f64, u8)> = self
            .model
            .samples
            .iter()
            .zip(self.model.labels.iter())
            .map(|(sample, &label)| (euclidean_distance(query, sample), label))
            .collect();

        dists.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let effective_k = self.model.k.min(dists.len());
        let positive_votes = dists[..effective_k]
            .iter()
            .filter(|(_, label)| *label != 0)
            .count();

        if positive_votes * 2 > effective_k {
            Label::Lbbb
        } else {
            Label::Normal
        }
    }
}

fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}
