//! BER Evaluation — Bit error rate and SNR sweep bookkeeping
//!
//! Compares the transmitted and received bit sequences and reports the
//! fraction of mismatches, plus a small accumulator for building an
//! SNR-vs-BER curve and exporting it as CSV.
//!
//! ## Example
//!
//! ```rust
//! use linesim_core::ber::{bit_error_rate, LengthPolicy};
//!
//! let sent = vec![true, false, true, true];
//! let mut received = sent.clone();
//! received[1] = true;
//! let ber = bit_error_rate(&sent, &received, LengthPolicy::Truncate).unwrap();
//! assert!((ber - 0.25).abs() < 1e-12);
//! ```

use crate::error::ChainError;
use serde::{Deserialize, Serialize};

/// Policy for comparing sequences of unequal length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LengthPolicy {
    /// Unequal lengths are an error.
    Strict,
    /// Compare up to the shorter length; the denominator stays the sent
    /// length, so dropped trailing bits do not count as errors.
    #[default]
    Truncate,
}

/// Bit error rate between a sent and a received sequence.
///
/// Pure function: counts positions where the sequences disagree and divides
/// by the sent length. Fails with [`ChainError::InvalidSignal`] when either
/// sequence is empty, or on a length mismatch under
/// [`LengthPolicy::Strict`].
pub fn bit_error_rate(
    sent: &[bool],
    received: &[bool],
    policy: LengthPolicy,
) -> Result<f64, ChainError> {
    if sent.is_empty() {
        return Err(ChainError::InvalidSignal(
            "sent sequence is empty".to_string(),
        ));
    }
    if received.is_empty() {
        return Err(ChainError::InvalidSignal(
            "received sequence is empty, no comparison possible".to_string(),
        ));
    }
    if policy == LengthPolicy::Strict && sent.len() != received.len() {
        return Err(ChainError::InvalidSignal(format!(
            "length mismatch: sent {} bits, received {}",
            sent.len(),
            received.len()
        )));
    }
    let errors = count_errors(sent, received);
    Ok(errors as f64 / sent.len() as f64)
}

/// Number of mismatched positions up to the shorter length.
pub fn count_errors(sent: &[bool], received: &[bool]) -> usize {
    sent.iter()
        .zip(received.iter())
        .filter(|(a, b)| a != b)
        .count()
}

/// One measured point of an SNR-vs-BER curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BerPoint {
    /// Target SNR in dB.
    pub snr_db: f64,
    /// Mean BER over all runs at this SNR.
    pub ber: f64,
    /// Total bits compared.
    pub bits_tested: u64,
    /// Total mismatches.
    pub errors: u64,
}

/// Accumulates BER measurements across an SNR sweep.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BerSweep {
    label: String,
    points: Vec<BerPoint>,
}

impl BerSweep {
    /// Create a sweep labelled with the modulation scheme name.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            points: Vec::new(),
        }
    }

    /// The sweep label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Record a measurement point.
    pub fn add_point(&mut self, snr_db: f64, ber: f64, bits_tested: u64, errors: u64) {
        self.points.push(BerPoint {
            snr_db,
            ber,
            bits_tested,
            errors,
        });
    }

    /// All recorded points, in insertion order.
    pub fn points(&self) -> &[BerPoint] {
        &self.points
    }

    /// Render the sweep as CSV with a header row.
    pub fn to_csv(&self) -> String {
        let mut csv = String::from("modulation,snr_db,ber,bits,errors\n");
        for p in &self.points {
            csv.push_str(&format!(
                "{},{:.2},{:.10},{},{}\n",
                self.label, p.snr_db, p.ber, p.bits_tested, p.errors
            ));
        }
        csv
    }
}
