//! Zero-phase Butterworth bandpass filtering
//!
//! Filter coefficients depend only on `(lowcut, highcut, order, fs)` and are
//! designed once per configuration, then reused across every row of a batch.
//! Application is forward-backward (two passes over the signal), so the
//! output carries no phase distortion and keeps the original sample count.

use ecg_core::{EcgError, EcgResult};
use sci_rs::signal::filter::design::{
    butter_dyn, DigitalFilter, FilterBandType, FilterOutputType, Sos, SosFormatFilter,
};
use sci_rs::signal::filter::sosfiltfilt_dyn;
use serde::{Deserialize, Serialize};

/// Bandpass filter parameters.
///
/// Defaults are the standard ECG conditioning band: 0.5 Hz highpass edge to
/// suppress baseline wander, 40 Hz lowpass edge to suppress powerline and
/// muscle noise, 4th-order Butterworth response.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandpassConfig {
    /// Low cutoff frequency (Hz)
    pub lowcut_hz: f64,
    /// High cutoff frequency (Hz)
    pub highcut_hz: f64,
    /// Butterworth filter order
    pub order: usize,
}

impl Default for BandpassConfig {
    fn default() -> Self {
        Self {
            lowcut_hz: 0.5,
            highcut_hz: 40.0,
            order: 4,
        }
    }
}

impl BandpassConfig {
    pub fn new(lowcut_hz: f64, highcut_hz: f64, order: usize) -> Self {
        Self {
            lowcut_hz,
            highcut_hz,
            order,
        }
    }

    /// Validate the configuration against a sampling rate.
    ///
    /// The filter design is mathematically invalid unless
    /// `0 < lowcut < highcut < fs / 2`.
    pub fn validate(&self, fs: f64) -> EcgResult<()> {
        if !fs.is_finite() || fs <= 0.0 {
            return Err(EcgError::InvalidInput {
                reason: format!("sampling rate must be positive, got {}", fs),
            });
        }
        if self.order == 0 {
            return Err(EcgError::InvalidInput {
                reason: "filter order must be at least 1".to_string(),
            });
        }
        if !(self.lowcut_hz > 0.0 && self.lowcut_hz.is_finite()) {
            return Err(EcgError::InvalidInput {
                reason: format!("low cutoff must be positive, got {}", self.lowcut_hz),
            });
        }
        if self.lowcut_hz >= self.highcut_hz {
            return Err(EcgError::InvalidInput {
                reason: format!(
                    "low cutoff {} Hz must be below high cutoff {} Hz",
                    self.lowcut_hz, self.highcut_hz
                ),
            });
        }
        let nyquist = fs / 2.0;
        if self.highcut_hz >= nyquist {
            return Err(EcgError::InvalidInput {
                reason: format!(
                    "high cutoff {} Hz must be below the Nyquist frequency {} Hz",
                    self.highcut_hz, nyquist
                ),
            });
        }
        Ok(())
    }
}

/// Designed Butterworth bandpass in cascaded second-order sections,
/// applied as a zero-phase (forward-backward) filter.
#[derive(Debug, Clone)]
pub struct ZeroPhaseBandpass {
    sections: Vec<Sos<f64>>,
}

impl ZeroPhaseBandpass {
    /// Design the filter for a given configuration and sampling rate.
    pub fn design(config: &BandpassConfig, fs: f64) -> EcgResult<Self> {
        config.validate(fs)?;

        let filter = butter_dyn(
            config.order,
            vec![config.lowcut_hz, config.highcut_hz],
            Some(FilterBandType::Bandpass),
            Some(false),
            Some(FilterOutputType::Sos),
            Some(fs),
        );
        let DigitalFilter::Sos(SosFormatFilter { sos }) = filter else {
            return Err(EcgError::InvalidInput {
                reason: "Butterworth design did not produce second-order sections".to_string(),
            });
        };

        Ok(Self { sections: sos })
    }

    /// Number of cascaded second-order sections
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Minimum signal length the forward-backward pass can handle.
    ///
    /// The edge extension used to suppress startup transients needs
    /// `3 * (2 * sections + 1)` samples on each side.
    pub fn min_signal_len(&self) -> usize {
        3 * (2 * self.sections.len() + 1) + 1
    }

    /// Filter one signal forward and backward.
    ///
    /// Output length equals input length.
    pub fn apply(&self, signal: &[f64]) -> EcgResult<Vec<f64>> {
        if signal.len() < self.min_signal_len() {
            return Err(EcgError::InvalidInput {
                reason: format!(
                    "signal of {} samples is too short for zero-phase filtering (minimum {})",
                    signal.len(),
                    self.min_signal_len()
                ),
            });
        }
        Ok(sosfiltfilt_dyn(signal.iter(), &self.sections))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn sine(freq: f64, fs: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * PI * freq * i as f64 / fs).sin())
            .collect()
    }

    fn rms(data: &[f64]) -> f64 {
        (data.iter().map(|x| x * x).sum::<f64>() / data.len() as f64).sqrt()
    }

    #[test]
    fn test_config_validation() {
        let config = BandpassConfig::default();
        assert!(config.validate(360.0).is_ok());

        assert!(config.validate(0.0).is_err());
        assert!(config.validate(-360.0).is_err());

        // High cutoff at or above Nyquist
        assert!(config.validate(79.0).is_err());

        let inverted = BandpassConfig::new(40.0, 0.5, 4);
        assert!(inverted.validate(360.0).is_err());

        let zero_order = BandpassConfig::new(0.5, 40.0, 0);
        assert!(zero_order.validate(360.0).is_err());
    }

    #[test]
    fn test_output_length_preserved() {
        let filter = ZeroPhaseBandpass::design(&BandpassConfig::default(), 360.0).unwrap();
        let signal = sine(10.0, 360.0, 1000);
        let filtered = filter.apply(&signal).unwrap();
        assert_eq!(filtered.len(), signal.len());
    }

    #[test]
    fn test_passband_preserved_stopband_attenuated() {
        let fs = 360.0;
        let filter = ZeroPhaseBandpass::design(&BandpassConfig::default(), fs).unwrap();

        let in_band = filter.apply(&sine(10.0, fs, 2000)).unwrap();
        let out_of_band = filter.apply(&sine(60.0, fs, 2000)).unwrap();

        // 10 Hz sits in the middle of the 0.5-40 Hz band
        assert!(rms(&in_band) > 0.6);
        // 60 Hz is well past the 40 Hz edge of an 8-pole response
        assert!(rms(&out_of_band) < 0.1);
    }

    #[test]
    fn test_zero_phase_keeps_peak_position() {
        let fs = 360.0;
        let filter = ZeroPhaseBandpass::design(&BandpassConfig::default(), fs).unwrap();

        // Symmetric Gaussian pulse centered at sample 500
        let signal: Vec<f64> = (0..1000)
            .map(|i| (-((i as f64 - 500.0) / 30.0).powi(2)).exp())
            .collect();
        let filtered = filter.apply(&signal).unwrap();

        let peak_in = 500;
        let peak_out = filtered
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i)
            .unwrap();

        assert!(
            (peak_out as i64 - peak_in as i64).abs() <= 2,
            "peak moved from {} to {}",
            peak_in,
            peak_out
        );
    }

    #[test]
    fn test_short_signal_rejected() {
        let filter = ZeroPhaseBandpass::design(&BandpassConfig::default(), 360.0).unwrap();
        let short = vec![1.0; filter.min_signal_len() - 1];
        assert!(filter.apply(&short).is_err());
    }
}
