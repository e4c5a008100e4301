//! Probes — Textual observation points on the chain
//!
//! Probes are downstream consumers like any other: they implement the same
//! [`Sink`](crate::pipeline::Sink) contract as transforming stages, but log a
//! labelled rendering of what flows past instead of producing output. A
//! stage treats them opaquely; connecting or disconnecting a probe never
//! changes the chain's result.

use crate::error::ChainError;
use crate::pipeline::Sink;
use tracing::info;

/// Maximum number of bits a probe renders before eliding the rest.
const MAX_RENDERED_BITS: usize = 200;

/// Logs a bit sequence as a `0`/`1` string.
#[derive(Debug, Clone)]
pub struct BitProbe {
    label: String,
}

impl BitProbe {
    /// Create a probe with a display label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    fn render(bits: &[bool]) -> String {
        let mut s: String = bits
            .iter()
            .take(MAX_RENDERED_BITS)
            .map(|&b| if b { '1' } else { '0' })
            .collect();
        if bits.len() > MAX_RENDERED_BITS {
            s.push('…');
        }
        s
    }
}

impl Sink<bool> for BitProbe {
    fn receive(&mut self, input: &[bool]) -> Result<(), ChainError> {
        info!(
            probe = %self.label,
            bits = input.len(),
            "{}",
            Self::render(input)
        );
        Ok(())
    }
}

/// Logs a summary of a waveform: length, extrema and mean.
#[derive(Debug, Clone)]
pub struct WaveformProbe {
    label: String,
}

impl WaveformProbe {
    /// Create a probe with a display label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl Sink<f64> for WaveformProbe {
    fn receive(&mut self, input: &[f64]) -> Result<(), ChainError> {
        let min = input.iter().copied().fold(f64::INFINITY, f64::min);
        let max = input.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = input.iter().sum::<f64>() / input.len().max(1) as f64;
        info!(
            probe = %self.label,
            samples = input.len(),
            min,
            max,
            mean,
            "waveform"
        );
        Ok(())
    }
}
