//! Line Decoder — Waveform to bit decision demodulation
//!
//! Partitions the received waveform into bit periods and decides each bit by
//! comparing a window average against the amplitude midpoint. NRZ and NRZT
//! average the full period (the NRZT ramps average out close to the plateau,
//! an approximation rather than an exact inverse of the encoder); RZ averages
//! only the middle third where the pulse lives.
//!
//! A trailing window shorter than one bit period is either rejected
//! ([`TrailingPolicy::Strict`]) or averaged over however many samples remain
//! ([`TrailingPolicy::Lenient`]), producing one extra decided bit from a
//! short window.
//!
//! ## Example
//!
//! ```rust
//! use linesim_core::line_decoder::LineDecoder;
//! use linesim_core::line_encoder::LineEncoder;
//! use linesim_core::modulation::{ModulationParams, ModulationScheme};
//!
//! let params = ModulationParams::new(ModulationScheme::Nrz, 0.0, 1.0, 30).unwrap();
//! let wave = LineEncoder::new(params).modulate(&[true, false, true]).unwrap();
//! let bits = LineDecoder::new(params).demodulate(&wave).unwrap();
//! assert_eq!(bits, vec![true, false, true]);
//! ```

use crate::error::ChainError;
use crate::modulation::{ModulationParams, ModulationScheme};
use crate::pipeline::Transform;
use serde::{Deserialize, Serialize};

/// Policy for a trailing window shorter than one bit period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrailingPolicy {
    /// Fail when the sample count is not a multiple of the bit period.
    Strict,
    /// Decide one extra bit from the partial window's remaining samples.
    #[default]
    Lenient,
}

/// Waveform-to-bit demodulator mirroring [`LineEncoder`](crate::line_encoder::LineEncoder).
#[derive(Debug, Clone)]
pub struct LineDecoder {
    params: ModulationParams,
    trailing: TrailingPolicy,
}

impl LineDecoder {
    /// Create a decoder with the default (lenient) trailing policy.
    pub fn new(params: ModulationParams) -> Self {
        Self {
            params,
            trailing: TrailingPolicy::default(),
        }
    }

    /// Create a decoder with an explicit trailing policy.
    pub fn with_policy(params: ModulationParams, trailing: TrailingPolicy) -> Self {
        Self { params, trailing }
    }

    /// The modulation parameters this decoder was built with.
    pub fn params(&self) -> &ModulationParams {
        &self.params
    }

    /// The trailing-window policy.
    pub fn trailing_policy(&self) -> TrailingPolicy {
        self.trailing
    }

    /// Demodulate a waveform into a bit sequence.
    ///
    /// Fails with [`ChainError::InvalidSignal`] on an empty input, or on a
    /// sample count that is not a multiple of the bit period under
    /// [`TrailingPolicy::Strict`].
    pub fn demodulate(&self, samples: &[f64]) -> Result<Vec<bool>, ChainError> {
        if samples.is_empty() {
            return Err(ChainError::InvalidSignal(
                "cannot demodulate an empty sample sequence".to_string(),
            ));
        }
        let spb = self.params.samples_per_bit();
        if self.trailing == TrailingPolicy::Strict && samples.len() % spb != 0 {
            return Err(ChainError::InvalidSignal(format!(
                "sample count {} is not a multiple of the bit period {}",
                samples.len(),
                spb
            )));
        }

        let threshold = self.params.threshold();
        let mut bits = Vec::with_capacity(samples.len().div_ceil(spb));
        for window in samples.chunks(spb) {
            match self.window_mean(window) {
                Some(mean) => bits.push(mean >= threshold),
                // A partial RZ window with no middle-third sample carries no
                // pulse energy to decide on; drop it.
                None => continue,
            }
        }
        Ok(bits)
    }

    /// Mean of the decision region of one window, or `None` when the window
    /// holds no decision-region sample.
    fn window_mean(&self, window: &[f64]) -> Option<f64> {
        let region: &[f64] = match self.params.scheme() {
            ModulationScheme::Nrz | ModulationScheme::Nrzt => window,
            ModulationScheme::Rz => {
                let (first, middle, _) = self.params.thirds();
                if window.len() <= first {
                    return None;
                }
                &window[first..window.len().min(first + middle)]
            }
        };
        if region.is_empty() {
            return None;
        }
        Some(region.iter().sum::<f64>() / region.len() as f64)
    }
}

impl Transform for LineDecoder {
    type In = f64;
    type Out = bool;

    fn apply(&mut self, input: &[f64]) -> Result<Vec<bool>, ChainError> {
        self.demodulate(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line_encoder::LineEncoder;

    fn params(scheme: ModulationScheme, spb: usize) -> ModulationParams {
        ModulationParams::new(scheme, 0.0, 1.0, spb).unwrap()
    }

    #[test]
    fn test_empty_input_rejected() {
        let decoder = LineDecoder::new(params(ModulationScheme::Nrz, 30));
        let err = decoder.demodulate(&[]).unwrap_err();
        assert!(matches!(err, ChainError::InvalidSignal(_)));
    }

    #[test]
    fn test_nrz_round_trip() {
        let p = params(ModulationScheme::Nrz, 30);
        let bits = vec![false, true, true, true, false, false, false, true, true, true, false, false, true];
        let wave = LineEncoder::new(p).modulate(&bits).unwrap();
        assert_eq!(LineDecoder::new(p).demodulate(&wave).unwrap(), bits);
    }

    #[test]
    fn test_rz_round_trip() {
        let p = params(ModulationScheme::Rz, 9);
        let bits = vec![true, false, true, true, false];
        let wave = LineEncoder::new(p).modulate(&bits).unwrap();
        assert_eq!(LineDecoder::new(p).demodulate(&wave).unwrap(), bits);
    }

    #[test]
    fn test_rz_round_trip_non_divisible_period() {
        let p = params(ModulationScheme::Rz, 10);
        let bits = vec![true, true, false, true];
        let wave = LineEncoder::new(p).modulate(&bits).unwrap();
        assert_eq!(LineDecoder::new(p).demodulate(&wave).unwrap(), bits);
    }

    #[test]
    fn test_nrzt_round_trip() {
        // Full-window averaging over NRZT ramps is an approximation; with
        // well-separated amplitudes it still recovers every bit.
        let p = params(ModulationScheme::Nrzt, 30);
        let bits = vec![false, true, true, false, false, true, false, true, true];
        let wave = LineEncoder::new(p).modulate(&bits).unwrap();
        assert_eq!(LineDecoder::new(p).demodulate(&wave).unwrap(), bits);
    }

    #[test]
    fn test_nrzt_bipolar_round_trip() {
        let p = ModulationParams::new(ModulationScheme::Nrzt, -1.0, 1.0, 30).unwrap();
        let bits = vec![true, false, true, false, false, true];
        let wave = LineEncoder::new(p).modulate(&bits).unwrap();
        assert_eq!(LineDecoder::new(p).demodulate(&wave).unwrap(), bits);
    }

    #[test]
    fn test_threshold_decision_is_inclusive() {
        // A window mean exactly at the midpoint decides true.
        let decoder = LineDecoder::new(params(ModulationScheme::Nrz, 2));
        assert_eq!(decoder.demodulate(&[0.5, 0.5]).unwrap(), vec![true]);
        assert_eq!(decoder.demodulate(&[0.49, 0.49]).unwrap(), vec![false]);
    }

    #[test]
    fn test_lenient_trailing_window_decides_extra_bit() {
        let decoder = LineDecoder::new(params(ModulationScheme::Nrz, 4));
        // 4 full samples plus a 2-sample tail.
        let bits = decoder.demodulate(&[1.0, 1.0, 1.0, 1.0, 0.9, 0.7]).unwrap();
        assert_eq!(bits, vec![true, true]);
    }

    #[test]
    fn test_strict_trailing_window_rejected() {
        let decoder =
            LineDecoder::with_policy(params(ModulationScheme::Nrz, 4), TrailingPolicy::Strict);
        let err = decoder.demodulate(&[1.0; 6]).unwrap_err();
        assert!(matches!(err, ChainError::InvalidSignal(_)));
    }

    #[test]
    fn test_strict_accepts_exact_multiple() {
        let decoder =
            LineDecoder::with_policy(params(ModulationScheme::Nrz, 3), TrailingPolicy::Strict);
        assert_eq!(decoder.demodulate(&[1.0; 6]).unwrap(), vec![true, true]);
    }

    #[test]
    fn test_rz_trailing_window_without_pulse_region_is_dropped() {
        let decoder = LineDecoder::new(params(ModulationScheme::Rz, 9));
        // One full RZ one-bit, then a 2-sample tail that never reaches the
        // middle third: no decision region, no extra bit.
        let mut wave = vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0];
        wave.extend_from_slice(&[0.0, 0.0]);
        assert_eq!(decoder.demodulate(&wave).unwrap(), vec![true]);
    }

    #[test]
    fn test_rz_trailing_window_with_partial_pulse_region() {
        let decoder = LineDecoder::new(params(ModulationScheme::Rz, 9));
        // Tail reaches one sample into the middle third.
        let wave = vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0];
        assert_eq!(decoder.demodulate(&wave).unwrap(), vec![true, true]);
    }
}
