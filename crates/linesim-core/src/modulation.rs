//! Modulation Parameters — Line code selection and waveform geometry
//!
//! Holds the line-coding scheme (NRZ, NRZT, RZ) together with the amplitude
//! range and the number of samples emitted per bit. Construction validates
//! the amplitude ordering and the sample count, so every downstream block
//! can trust a `ModulationParams` it is handed.
//!
//! ## Example
//!
//! ```rust
//! use linesim_core::modulation::{ModulationParams, ModulationScheme};
//!
//! let params = ModulationParams::new(ModulationScheme::Nrz, 0.0, 1.0, 30).unwrap();
//! assert_eq!(params.threshold(), 0.5);
//! assert_eq!(params.thirds(), (10, 10, 10));
//!
//! // A bit period that does not divide by 3 still sums to the full period.
//! let params = ModulationParams::new(ModulationScheme::Rz, 0.0, 1.0, 10).unwrap();
//! assert_eq!(params.thirds(), (3, 3, 4));
//! ```

use crate::error::ChainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Line-coding scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModulationScheme {
    /// Non Return to Zero: amax for 1, amin for 0, flat over the whole bit.
    Nrz,
    /// NRZ with linear Transitions: ramps through the midpoint whenever two
    /// neighbouring bits differ, flat plateaus otherwise.
    Nrzt,
    /// Return to Zero: the middle third carries amax for a 1 and literal
    /// zero for a 0; the outer thirds are always zero.
    Rz,
}

impl ModulationScheme {
    /// Canonical scheme name as used on the command line and in CSV output.
    pub fn name(&self) -> &'static str {
        match self {
            ModulationScheme::Nrz => "NRZ",
            ModulationScheme::Nrzt => "NRZT",
            ModulationScheme::Rz => "RZ",
        }
    }
}

impl fmt::Display for ModulationScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModulationScheme {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "NRZ" => Ok(ModulationScheme::Nrz),
            "NRZT" => Ok(ModulationScheme::Nrzt),
            "RZ" => Ok(ModulationScheme::Rz),
            other => Err(ChainError::UnknownModulation(other.to_string())),
        }
    }
}

/// Validated modulation parameters shared by the line encoder and decoder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModulationParams {
    scheme: ModulationScheme,
    amin: f64,
    amax: f64,
    samples_per_bit: usize,
}

impl ModulationParams {
    /// Create validated parameters.
    ///
    /// Fails with [`ChainError::InvalidAmplitudeRange`] unless amax > amin
    /// strictly, and with [`ChainError::InvalidSignal`] for a zero bit
    /// period. NRZT and RZ partition each bit period into three segments,
    /// so they additionally need at least 3 samples per bit; below that the
    /// middle third is empty and an RZ waveform would carry no pulse at all.
    pub fn new(
        scheme: ModulationScheme,
        amin: f64,
        amax: f64,
        samples_per_bit: usize,
    ) -> Result<Self, ChainError> {
        if !(amax > amin) {
            return Err(ChainError::InvalidAmplitudeRange { amin, amax });
        }
        if samples_per_bit == 0 {
            return Err(ChainError::InvalidSignal(
                "samples_per_bit must be greater than zero".to_string(),
            ));
        }
        if samples_per_bit < 3
            && matches!(scheme, ModulationScheme::Nrzt | ModulationScheme::Rz)
        {
            return Err(ChainError::InvalidSignal(format!(
                "{scheme} needs at least 3 samples per bit, got {samples_per_bit}"
            )));
        }
        Ok(Self {
            scheme,
            amin,
            amax,
            samples_per_bit,
        })
    }

    /// The line-coding scheme.
    pub fn scheme(&self) -> ModulationScheme {
        self.scheme
    }

    /// Amplitude encoding a logical 0 (except for RZ, whose off level is 0.0).
    pub fn amin(&self) -> f64 {
        self.amin
    }

    /// Amplitude encoding a logical 1.
    pub fn amax(&self) -> f64 {
        self.amax
    }

    /// Number of samples emitted per bit.
    pub fn samples_per_bit(&self) -> usize {
        self.samples_per_bit
    }

    /// Decision threshold, the midpoint of the amplitude range.
    pub fn threshold(&self) -> f64 {
        (self.amax + self.amin) / 2.0
    }

    /// Amplitude level for a bit.
    pub fn level(&self, bit: bool) -> f64 {
        if bit {
            self.amax
        } else {
            self.amin
        }
    }

    /// Partition of one bit period into three contiguous segments.
    ///
    /// The first two segments get `samples_per_bit / 3` samples each and the
    /// third gets the remainder, so the sizes always sum to exactly
    /// `samples_per_bit` even when it is not divisible by 3.
    pub fn thirds(&self) -> (usize, usize, usize) {
        let third = self.samples_per_bit / 3;
        (third, third, self.samples_per_bit - 2 * third)
    }
}

impl Default for ModulationParams {
    /// NRZ over [0, 1] at 30 samples per bit.
    fn default() -> Self {
        Self {
            scheme: ModulationScheme::Nrz,
            amin: 0.0,
            amax: 1.0,
            samples_per_bit: 30,
        }
    }
}
