//! Line Encoder — Bit sequence to waveform modulation
//!
//! Maps a logical bit sequence to a sampled waveform using the configured
//! line code. NRZ holds the bit level for the whole period, RZ carries the
//! pulse only in the middle third (its off level is literal zero, independent
//! of amin), and NRZT ramps through the amplitude midpoint whenever two
//! neighbouring bits differ, which removes abrupt transitions at the cost of
//! one bit of look-behind and look-ahead.
//!
//! ## Example
//!
//! ```rust
//! use linesim_core::line_encoder::LineEncoder;
//! use linesim_core::modulation::{ModulationParams, ModulationScheme};
//!
//! let params = ModulationParams::new(ModulationScheme::Nrz, 0.0, 1.0, 3).unwrap();
//! let encoder = LineEncoder::new(params);
//! let wave = encoder.modulate(&[true, false]).unwrap();
//! assert_eq!(wave, vec![1.0, 1.0, 1.0, 0.0, 0.0, 0.0]);
//! ```

use crate::error::ChainError;
use crate::modulation::{ModulationParams, ModulationScheme};
use crate::pipeline::Transform;

/// Bit-to-waveform modulator for one line-coding scheme.
#[derive(Debug, Clone)]
pub struct LineEncoder {
    params: ModulationParams,
}

impl LineEncoder {
    /// Create an encoder for the given parameters.
    pub fn new(params: ModulationParams) -> Self {
        Self { params }
    }

    /// The modulation parameters this encoder was built with.
    pub fn params(&self) -> &ModulationParams {
        &self.params
    }

    /// Modulate a bit sequence into a waveform.
    ///
    /// The output holds `samples_per_bit` samples per input bit. Fails with
    /// [`ChainError::InvalidSignal`] on an empty input.
    pub fn modulate(&self, bits: &[bool]) -> Result<Vec<f64>, ChainError> {
        if bits.is_empty() {
            return Err(ChainError::InvalidSignal(
                "cannot modulate an empty bit sequence".to_string(),
            ));
        }
        let mut wave = Vec::with_capacity(bits.len() * self.params.samples_per_bit());
        for (i, &bit) in bits.iter().enumerate() {
            match self.params.scheme() {
                ModulationScheme::Nrz => self.push_nrz(&mut wave, bit),
                ModulationScheme::Rz => self.push_rz(&mut wave, bit),
                ModulationScheme::Nrzt => {
                    let prev = if i > 0 { Some(bits[i - 1]) } else { None };
                    let next = bits.get(i + 1).copied();
                    self.push_nrzt(&mut wave, bit, prev, next);
                }
            }
        }
        Ok(wave)
    }

    fn push_nrz(&self, wave: &mut Vec<f64>, bit: bool) {
        let level = self.params.level(bit);
        for _ in 0..self.params.samples_per_bit() {
            wave.push(level);
        }
    }

    fn push_rz(&self, wave: &mut Vec<f64>, bit: bool) {
        let (first, middle, last) = self.params.thirds();
        // RZ pulses between literal zero and amax; amin plays no role.
        let pulse = if bit { self.params.amax() } else { 0.0 };
        for _ in 0..first {
            wave.push(0.0);
        }
        for _ in 0..middle {
            wave.push(pulse);
        }
        for _ in 0..last {
            wave.push(0.0);
        }
    }

    fn push_nrzt(&self, wave: &mut Vec<f64>, bit: bool, prev: Option<bool>, next: Option<bool>) {
        let (first, middle, last) = self.params.thirds();
        let level = self.params.level(bit);
        let mid = self.params.threshold();

        // First third: ramp up from the midpoint only when the previous bit
        // differs; a missing neighbour counts as equal (flat).
        let ramp_in = prev.is_some_and(|p| p != bit);
        for i in 0..first {
            let amplitude = if ramp_in {
                mid + (level - mid) * (i as f64 / first as f64)
            } else {
                level
            };
            wave.push(amplitude);
        }

        // Middle third: flat plateau at the bit level.
        for _ in 0..middle {
            wave.push(level);
        }

        // Last third: mirror of the first, driven by the successor bit.
        let ramp_out = next.is_some_and(|n| n != bit);
        for i in 0..last {
            let amplitude = if ramp_out {
                level + (mid - level) * (i as f64 / last as f64)
            } else {
                level
            };
            wave.push(amplitude);
        }
    }
}

impl Transform for LineEncoder {
    type In = bool;
    type Out = f64;

    fn apply(&mut self, input: &[bool]) -> Result<Vec<f64>, ChainError> {
        self.modulate(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(scheme: ModulationScheme, spb: usize) -> ModulationParams {
        ModulationParams::new(scheme, 0.0, 1.0, spb).unwrap()
    }

    #[test]
    fn test_empty_input_rejected() {
        let encoder = LineEncoder::new(params(ModulationScheme::Nrz, 30));
        let err = encoder.modulate(&[]).unwrap_err();
        assert!(matches!(err, ChainError::InvalidSignal(_)));
    }

    #[test]
    fn test_nrz_levels() {
        let encoder = LineEncoder::new(params(ModulationScheme::Nrz, 4));
        let wave = encoder.modulate(&[true, false, true]).unwrap();
        assert_eq!(wave.len(), 12);
        assert_eq!(&wave[0..4], &[1.0; 4]);
        assert_eq!(&wave[4..8], &[0.0; 4]);
        assert_eq!(&wave[8..12], &[1.0; 4]);
    }

    #[test]
    fn test_nrz_bipolar_levels() {
        let p = ModulationParams::new(ModulationScheme::Nrz, -1.0, 1.0, 2).unwrap();
        let wave = LineEncoder::new(p).modulate(&[false, true]).unwrap();
        assert_eq!(wave, vec![-1.0, -1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_rz_one_pulses_in_middle_third() {
        let encoder = LineEncoder::new(params(ModulationScheme::Rz, 9));
        let wave = encoder.modulate(&[true]).unwrap();
        assert_eq!(wave, vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_rz_zero_is_all_zero_even_with_nonzero_amin() {
        // RZ's off level is literal zero, not amin.
        let p = ModulationParams::new(ModulationScheme::Rz, -1.0, 1.0, 6).unwrap();
        let wave = LineEncoder::new(p).modulate(&[false]).unwrap();
        assert_eq!(wave, vec![0.0; 6]);
    }

    #[test]
    fn test_rz_non_divisible_period_keeps_full_length() {
        let encoder = LineEncoder::new(params(ModulationScheme::Rz, 10));
        let wave = encoder.modulate(&[true, false]).unwrap();
        // 3 + 3 + 4 per bit, never truncated to 9.
        assert_eq!(wave.len(), 20);
        assert_eq!(&wave[0..3], &[0.0; 3]);
        assert_eq!(&wave[3..6], &[1.0; 3]);
        assert_eq!(&wave[6..10], &[0.0; 4]);
    }

    #[test]
    fn test_nrzt_isolated_bit_is_flat() {
        // A single bit has no neighbours, so both ramps collapse to plateaus.
        let encoder = LineEncoder::new(params(ModulationScheme::Nrzt, 9));
        let wave = encoder.modulate(&[true]).unwrap();
        assert_eq!(wave, vec![1.0; 9]);
    }

    #[test]
    fn test_nrzt_equal_neighbours_stay_flat() {
        let encoder = LineEncoder::new(params(ModulationScheme::Nrzt, 6));
        let wave = encoder.modulate(&[true, true, true]).unwrap();
        assert_eq!(wave, vec![1.0; 18]);
    }

    #[test]
    fn test_nrzt_transition_ramps_through_midpoint() {
        let encoder = LineEncoder::new(params(ModulationScheme::Nrzt, 9));
        let wave = encoder.modulate(&[true, false]).unwrap();
        assert_eq!(wave.len(), 18);
        // First bit: flat lead-in (no predecessor), plateau, then a ramp
        // down toward the midpoint because the next bit differs.
        assert_eq!(&wave[0..6], &[1.0; 6]);
        assert_eq!(wave[6], 1.0);
        assert!((wave[7] - (1.0 - 0.5 / 3.0)).abs() < 1e-12);
        assert!((wave[8] - (1.0 - 1.0 / 3.0)).abs() < 1e-12);
        // Second bit: ramp up from the midpoint toward amin.
        assert!((wave[9] - 0.5).abs() < 1e-12);
        assert!((wave[10] - (0.5 - 0.5 / 3.0)).abs() < 1e-12);
        assert!((wave[11] - (0.5 - 1.0 / 3.0)).abs() < 1e-12);
        // Plateau at amin.
        assert_eq!(&wave[12..15], &[0.0; 3]);
        // Flat tail (no successor).
        assert_eq!(&wave[15..18], &[0.0; 3]);
    }

    #[test]
    fn test_nrzt_middle_third_always_at_level() {
        let encoder = LineEncoder::new(params(ModulationScheme::Nrzt, 30));
        let bits = [false, true, true, false, true];
        let wave = encoder.modulate(&bits).unwrap();
        for (i, &bit) in bits.iter().enumerate() {
            let level = if bit { 1.0 } else { 0.0 };
            for j in 10..20 {
                assert_eq!(wave[i * 30 + j], level, "bit {i} sample {j}");
            }
        }
    }

    #[test]
    fn test_output_length_is_bits_times_period() {
        for spb in [3, 4, 7, 30] {
            for scheme in [ModulationScheme::Nrz, ModulationScheme::Nrzt, ModulationScheme::Rz] {
                let encoder = LineEncoder::new(params(scheme, spb));
                let wave = encoder.modulate(&[true, false, false, true]).unwrap();
                assert_eq!(wave.len(), 4 * spb, "{scheme} spb={spb}");
            }
        }
        // NRZ alone allows sub-third periods.
        let encoder = LineEncoder::new(params(ModulationScheme::Nrz, 1));
        assert_eq!(encoder.modulate(&[true, false]).unwrap(), vec![1.0, 0.0]);
    }
}
