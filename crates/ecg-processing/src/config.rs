//! Configuration for the classification pipeline
//!
//! The conditioning band, filter order, wavelet, and decomposition depth
//! are configuration with documented defaults rather than constants buried
//! in the stages, so callers and property tests can sweep them.

use crate::filters::BandpassConfig;
use crate::wavelet::WaveletKind;
use ecg_core::{EcgError, EcgResult};
use serde::{Deserialize, Serialize};

/// Domain convention for this class of recordings (Hz). Callers that do not
/// know better pass this as the sampling rate.
pub const DEFAULT_SAMPLING_RATE_HZ: f64 = 360.0;

/// Wavelet feature extraction parameters.
///
/// Defaults: `db3`, 2 decomposition levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Wavelet family used for the decomposition
    pub wavelet: WaveletKind,
    /// Decomposition depth
    pub level: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            wavelet: WaveletKind::Db3,
            level: 2,
        }
    }
}

impl FeatureConfig {
    pub fn new(wavelet: WaveletKind, level: usize) -> Self {
        Self { wavelet, level }
    }

    pub fn validate(&self) -> EcgResult<()> {
        if self.level == 0 {
            return Err(EcgError::InvalidInput {
                reason: "decomposition level must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Full pipeline configuration: conditioning plus feature extraction
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub preprocess: BandpassConfig,
    pub features: FeatureConfig,
}

impl PipelineConfig {
    /// Validate the parts that do not depend on the sampling rate; the
    /// cutoff/Nyquist relation is checked per call when `fs` is known.
    pub fn validate(&self) -> EcgResult<()> {
        if self.preprocess.order == 0 {
            return Err(EcgError::InvalidInput {
                reason: "filter order must be at least 1".to_string(),
            });
        }
        if self.preprocess.lowcut_hz >= self.preprocess.highcut_hz {
            return Err(EcgError::InvalidInput {
                reason: format!(
                    "low cutoff {} Hz must be below high cutoff {} Hz",
                    self.preprocess.lowcut_hz, self.preprocess.highcut_hz
                ),
            });
        }
        self.features.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.preprocess.lowcut_hz, 0.5);
        assert_eq!(config.preprocess.highcut_hz, 40.0);
        assert_eq!(config.preprocess.order, 4);
        assert_eq!(config.features.wavelet, WaveletKind::Db3);
        assert_eq!(config.features.level, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_configs_rejected() {
        let mut config = PipelineConfig::default();
        config.features.level = 0;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.preprocess.lowcut_hz = 50.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = PipelineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
