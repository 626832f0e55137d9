//! End-to-end classification pipeline
//!
//! Chains the three stages: conditioning, wavelet feature extraction, and
//! k-NN inference. The pipeline holds only immutable configuration and the
//! loaded classifier, so a single instance can serve independent batches
//! from multiple workers without coordination.

use crate::classifier::{KnnClassifier, Label};
use crate::config::PipelineConfig;
use crate::preprocess::preprocess_batch;
use crate::wavelet::{extract_features, WaveletFeatures};
use ecg_core::{EcgResult, SignalBatch};
use tracing::debug;

/// Result of one pipeline invocation
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// One feature vector per input signal, in input row order
    pub features: Vec<WaveletFeatures>,
    /// One label per input signal, in input row order
    pub labels: Vec<Label>,
}

/// LBBB classification pipeline
#[derive(Debug, Clone)]
pub struct LbbbPipeline {
    config: PipelineConfig,
    classifier: KnnClassifier,
}

impl LbbbPipeline {
    /// Build a pipeline with default configuration around a loaded
    /// classifier.
    pub fn new(classifier: KnnClassifier) -> Self {
        Self {
            config: PipelineConfig::default(),
            classifier,
        }
    }

    /// Build a pipeline with explicit configuration.
    pub fn with_config(classifier: KnnClassifier, config: PipelineConfig) -> EcgResult<Self> {
        config.validate()?;
        Ok(Self { config, classifier })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Condition a batch without classifying, for callers that only want
    /// the cleaned signals back.
    pub fn preprocess(&self, batch: &SignalBatch, fs: f64) -> EcgResult<SignalBatch> {
        preprocess_batch(batch, fs, &self.config.preprocess)
    }

    /// Run the full pipeline: raw batch in, features and labels out.
    ///
    /// Row `i` of the output corresponds to row `i` of the input at every
    /// stage. Each invocation is a pure function of `(batch, fs)` and the
    /// immutable configuration; nothing is retained between calls.
    pub fn run(&self, batch: &SignalBatch, fs: f64) -> EcgResult<PipelineOutput> {
        let cleaned = preprocess_batch(batch, fs, &self.config.preprocess)?;
        let features = extract_features(&cleaned, &self.config.features)?;
        let labels = self.classifier.predict(&features)?;

        debug!(
            batch = %batch.id,
            rows = batch.n_rows(),
            positives = labels.iter().filter(|l| l.is_abnormal()).count(),
            "pipeline run complete"
        );

        Ok(PipelineOutput { features, labels })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::KnnModel;
    use crate::config::DEFAULT_SAMPLING_RATE_HZ;
    use std::f64::consts::PI;

    fn test_classifier() -> KnnClassifier {
        // Neighbors spread around plausible feature magnitudes of
        // normalized signals; labels alternate so both classes exist.
        let samples: Vec<Vec<f64>> = (0..6)
            .map(|i| vec![0.5 + i as f64 * 0.1, 0.2, 0.0, -1.0])
            .collect();
        let labels = vec![0, 1, 0, 1, 0, 1];
        KnnClassifier::new(KnnModel {
            k: 3,
            feature_dim: 4,
            samples,
            labels,
        })
        .unwrap()
    }

    fn noisy_sine_batch() -> SignalBatch {
        let fs = DEFAULT_SAMPLING_RATE_HZ;
        let rows: Vec<Vec<f64>> = (0..2)
            .map(|r| {
                (0..1000)
                    .map(|i| {
                        let t = i as f64 / fs;
                        5.0 + (2.0 * PI * (5.0 + r as f64) * t).sin()
                            + 0.5 * (2.0 * PI * 60.0 * t).sin()
                    })
                    .collect()
            })
            .collect();
        SignalBatch::from_rows(rows).unwrap()
    }

    #[test]
    fn test_run_shapes() {
        let pipeline = LbbbPipeline::new(test_classifier());
        let batch = noisy_sine_batch();

        let output = pipeline.run(&batch, DEFAULT_SAMPLING_RATE_HZ).unwrap();
        assert_eq!(output.features.len(), 2);
        assert_eq!(output.labels.len(), 2);
        assert!(output.labels.iter().all(|l| l.as_code() <= 1));
    }

    #[test]
    fn test_run_is_deterministic() {
        let pipeline = LbbbPipeline::new(test_classifier());
        let batch = noisy_sine_batch();

        let first = pipeline.run(&batch, DEFAULT_SAMPLING_RATE_HZ).unwrap();
        let second = pipeline.run(&batch, DEFAULT_SAMPLING_RATE_HZ).unwrap();
        assert_eq!(first.features, second.features);
        assert_eq!(first.labels, second.labels);
    }

    #[test]
    fn test_with_config_validates() {
        let mut config = PipelineConfig::default();
        config.features.level = 0;
        assert!(LbbbPipeline::with_config(test_classifier(), config).is_err());
    }

    #[test]
    fn test_invalid_sampling_rate_surfaces() {
        let pipeline = LbbbPipeline::new(test_classifier());
        let batch = noisy_sine_batch();
        assert!(pipeline.run(&batch, -5.0).is_err());
    }
}
