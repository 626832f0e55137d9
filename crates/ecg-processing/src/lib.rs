//! ECG-Processing: LBBB classification pipeline for ECG batches
//!
//! Signal conditioning, wavelet feature extraction, and k-NN inference.

pub mod classifier;
pub mod config;
pub mod filters;
pub mod pipeline;
pub mod preprocess;
pub mod wavelet;

pub use classifier::{KnnClassifier, KnnModel, Label};
pub use config::{FeatureConfig, PipelineConfig, DEFAULT_SAMPLING_RATE_HZ};
pub use filters::{BandpassConfig, ZeroPhaseBandpass};
pub use pipeline::{LbbbPipeline, PipelineOutput};
pub use preprocess::{normalize_unit, preprocess_batch, remove_dc};
pub use wavelet::{
    dwt_max_level, extract_features, wavedec, Decomposition, WaveletFeatures, WaveletKind,
    FEATURE_DIM,
};
